//! 远程 `patients` 与 `beds` 表的行模型

use serde::{Deserialize, Serialize};
use triage_core::{
    Bed, BedStatus, Patient, PatientIntake, PatientStatus, PatientUpdate, Priority, TriageError,
    DEFAULT_DEPARTMENT,
};

/// `patients` 表的一行，除 `id` 与 `name` 外均可为空
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub wait_time: Option<i64>,
    #[serde(default)]
    pub priority: Option<String>, // 存储为字符串，转换为Priority枚举
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>, // 存储为字符串，转换为PatientStatus枚举
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub chief_complaint: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl PatientRow {
    /// 构造插入用的行，登记表中的附加信息一并写入
    pub fn for_insert(patient: &Patient, intake: &PatientIntake) -> Self {
        Self {
            id: patient.id.clone(),
            name: patient.name.clone(),
            wait_time: Some(i64::from(patient.wait_time)),
            priority: Some(patient.priority.to_string()),
            department: Some(patient.department.clone()),
            arrival_time: Some(patient.arrival_time.clone()),
            status: Some(patient.status.to_string()),
            age: intake.age.map(i64::from),
            gender: intake.gender.clone(),
            contact_number: intake.contact_number.clone(),
            chief_complaint: intake.chief_complaint.clone(),
            notes: intake.notes.clone(),
            created_at: None,
            updated_at: None,
        }
    }

    /// 将部分更新应用到行上
    pub fn apply(&mut self, patch: &PatientPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(priority) = patch.priority {
            self.priority = Some(priority.to_string());
        }
        if let Some(department) = &patch.department {
            self.department = Some(department.clone());
        }
        if let Some(status) = patch.status {
            self.status = Some(status.to_string());
        }
        if let Some(updated_at) = &patch.updated_at {
            self.updated_at = Some(updated_at.clone());
        }
    }
}

impl TryFrom<PatientRow> for Patient {
    type Error = TriageError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let priority = match row.priority.as_deref() {
            Some(raw) => raw.parse::<Priority>()?,
            None => Priority::default(),
        };
        let status = match row.status.as_deref() {
            Some(raw) => raw.parse::<PatientStatus>()?,
            None => PatientStatus::default(),
        };
        let wait_time = row
            .wait_time
            .map(|minutes| u32::try_from(minutes.max(0)).unwrap_or(u32::MAX))
            .unwrap_or(0);

        Ok(Patient {
            id: row.id,
            name: row.name,
            wait_time,
            priority,
            department: row.department.unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string()),
            arrival_time: row.arrival_time.unwrap_or_default(),
            status,
        })
    }
}

/// 更新请求体，仅序列化被修改的列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PatientStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<&PatientUpdate> for PatientPatch {
    fn from(update: &PatientUpdate) -> Self {
        Self {
            name: update.name.clone(),
            priority: update.priority,
            department: update.department.clone(),
            status: update.status,
            updated_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// `beds` 表的一行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BedRow {
    pub id: String,
    pub status: String, // 存储为字符串，转换为BedStatus枚举
    pub department: String,
    #[serde(default)]
    pub patient_id: Option<String>,
    /// 表中没有此列，由视图或旧数据提供时才会出现
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub admission_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<&Bed> for BedRow {
    fn from(bed: &Bed) -> Self {
        Self {
            id: bed.id.clone(),
            status: bed.status.to_string(),
            department: bed.department.clone(),
            patient_id: bed.patient_id.clone(),
            patient_name: bed.patient_name.clone(),
            admission_time: bed.admission_time.clone(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl TryFrom<BedRow> for Bed {
    type Error = TriageError;

    fn try_from(row: BedRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<BedStatus>()?;
        Ok(Bed {
            id: row.id,
            status,
            department: row.department,
            patient_id: row.patient_id.filter(|id| !id.trim().is_empty()),
            patient_name: row.patient_name,
            admission_time: row.admission_time,
        })
    }
}
