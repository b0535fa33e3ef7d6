//! 核心数据模型定义

use crate::error::TriageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 入院登记表可选的科室列表
pub const DEPARTMENTS: [&str; 8] = [
    "Emergency",
    "General Medicine",
    "Cardiology",
    "Neurology",
    "Pediatrics",
    "Orthopedics",
    "Obstetrics & Gynecology",
    "Oncology",
];

/// 登记表默认科室
pub const DEFAULT_DEPARTMENT: &str = "Emergency";

/// 是否为登记表列出的科室，忽略大小写
pub fn is_known_department(name: &str) -> bool {
    let name = name.trim();
    DEPARTMENTS.iter().any(|known| known.eq_ignore_ascii_case(name))
}

/// 患者优先级
///
/// 变体顺序即排序顺序：`Critical > High > Medium > Low`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Priority {
    Low,      // 低
    Medium,   // 中
    High,     // 高
    Critical, // 危急
}

impl Priority {
    /// 排名：critical=3, high=2, medium=1, low=0
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
            Priority::Critical => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            other => Err(TriageError::Validation(format!("未知优先级: {}", other))),
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = TriageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.as_str().to_string()
    }
}

/// 患者排队状态
///
/// 状态之间的转换不受限制，任何状态都可以直接设置为其他状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PatientStatus {
    Waiting,    // 候诊
    InProgress, // 就诊中
    Completed,  // 已完成
    Cancelled,  // 已取消
}

impl PatientStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PatientStatus::Waiting => "waiting",
            PatientStatus::InProgress => "in-progress",
            PatientStatus::Completed => "completed",
            PatientStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for PatientStatus {
    fn default() -> Self {
        PatientStatus::Waiting
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientStatus {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "waiting" => Ok(PatientStatus::Waiting),
            "inprogress" => Ok(PatientStatus::InProgress),
            "completed" => Ok(PatientStatus::Completed),
            "cancelled" | "canceled" => Ok(PatientStatus::Cancelled),
            _ => Err(TriageError::Validation(format!("未知状态: {}", s.trim()))),
        }
    }
}

impl TryFrom<String> for PatientStatus {
    type Error = TriageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PatientStatus> for String {
    fn from(status: PatientStatus) -> Self {
        status.as_str().to_string()
    }
}

/// 队列中的患者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,             // 创建后不可变
    pub name: String,
    pub wait_time: u32,         // 自到达起的等待分钟数
    pub priority: Priority,
    pub department: String,
    pub arrival_time: String,   // 展示用到达时间，创建后不可变
    pub status: PatientStatus,
}

/// 入院登记表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientIntake {
    pub id: Option<String>,
    pub name: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub contact_number: Option<String>,
    pub priority: Priority,
    pub department: String,
    pub chief_complaint: Option<String>,
    pub notes: Option<String>,
}

impl PatientIntake {
    pub fn new(name: impl Into<String>, priority: Priority, department: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority,
            department: department.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// 患者信息的部分更新
///
/// `id` 与 `arrival_time` 不在可更新字段之列；等待时间只由
/// `PatientQueue::advance_wait_times` 推进。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub priority: Option<Priority>,
    pub department: Option<String>,
    pub status: Option<PatientStatus>,
}

impl PatientUpdate {
    pub fn status(status: PatientStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.priority.is_none()
            && self.department.is_none()
            && self.status.is_none()
    }

    /// 将更新应用到患者记录上
    pub fn apply_to(&self, patient: &mut Patient) {
        if let Some(name) = &self.name {
            patient.name = name.clone();
        }
        if let Some(priority) = self.priority {
            patient.priority = priority;
        }
        if let Some(department) = &self.department {
            patient.department = department.clone();
        }
        if let Some(status) = self.status {
            patient.status = status;
        }
    }
}

/// 床位状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BedStatus {
    Available,   // 空闲
    Occupied,    // 已占用
    Maintenance, // 维护中
    Reserved,    // 已预留
    Cleaning,    // 清洁中
}

impl BedStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BedStatus::Available => "Available",
            BedStatus::Occupied => "Occupied",
            BedStatus::Maintenance => "Maintenance",
            BedStatus::Reserved => "Reserved",
            BedStatus::Cleaning => "Cleaning",
        }
    }
}

impl Default for BedStatus {
    fn default() -> Self {
        BedStatus::Available
    }
}

impl fmt::Display for BedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BedStatus {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(BedStatus::Available),
            "occupied" => Ok(BedStatus::Occupied),
            "maintenance" => Ok(BedStatus::Maintenance),
            "reserved" => Ok(BedStatus::Reserved),
            "cleaning" => Ok(BedStatus::Cleaning),
            _ => Err(TriageError::Validation(format!("未知床位状态: {}", s.trim()))),
        }
    }
}

impl TryFrom<String> for BedStatus {
    type Error = TriageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BedStatus> for String {
    fn from(status: BedStatus) -> Self {
        status.as_str().to_string()
    }
}

/// 病床
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bed {
    pub id: String,
    pub status: BedStatus,
    /// 所属病区
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_time: Option<String>,
}
