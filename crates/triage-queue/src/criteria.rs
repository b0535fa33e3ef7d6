//! 队列过滤条件

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use triage_core::{Patient, PatientStatus, Priority};

/// 表示"全部"的下拉框标签
const WILDCARD_LABELS: [&str; 6] = [
    "",
    "all",
    "all departments",
    "all priorities",
    "all status",
    "all wards",
];

/// 单个过滤字段的取值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection<T> {
    /// 通配，匹配全部
    Any,
    /// 精确匹配
    Only(T),
    /// 无法识别的取值，不匹配任何记录
    Unrecognized(String),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::Any
    }
}

impl<T: FromStr> Selection<T> {
    /// 从界面输入解析过滤值
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_wildcard(trimmed) {
            return Selection::Any;
        }
        match trimmed.parse::<T>() {
            Ok(value) => Selection::Only(value),
            Err(_) => Selection::Unrecognized(trimmed.to_string()),
        }
    }
}

impl<T> Selection<T> {
    pub fn is_any(&self) -> bool {
        matches!(self, Selection::Any)
    }

    /// 判断取值是否被选中
    pub fn admits<U>(&self, value: &U) -> bool
    where
        T: PartialEq<U>,
        U: ?Sized,
    {
        match self {
            Selection::Any => true,
            Selection::Only(expected) => expected == value,
            Selection::Unrecognized(_) => false,
        }
    }
}

fn is_wildcard(raw: &str) -> bool {
    let lowered = raw.to_ascii_lowercase();
    WILDCARD_LABELS.contains(&lowered.as_str())
}

/// 队列过滤条件
///
/// 所有非通配字段必须同时满足。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCriteria {
    /// 姓名或ID的子串，不区分大小写，空串为通配
    pub search_text: String,
    pub department: Selection<String>,
    pub priority: Selection<Priority>,
    pub status: Selection<PatientStatus>,
}

impl QueueCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Selection::Only(department.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Selection::Only(priority);
        self
    }

    pub fn with_status(mut self, status: PatientStatus) -> Self {
        self.status = Selection::Only(status);
        self
    }

    /// 从界面下拉框的原始字符串构造
    pub fn from_labels(search_text: &str, department: &str, priority: &str, status: &str) -> Self {
        Self {
            search_text: search_text.to_string(),
            department: Selection::parse(department),
            priority: Selection::parse(priority),
            status: Selection::parse(status),
        }
    }

    /// 是否所有字段都为通配
    pub fn is_wildcard(&self) -> bool {
        self.search_text.is_empty()
            && self.department.is_any()
            && self.priority.is_any()
            && self.status.is_any()
    }

    /// 清空全部过滤条件
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn matches(&self, patient: &Patient) -> bool {
        if !self.search_text.is_empty() {
            let needle = self.search_text.to_lowercase();
            if !patient.name.to_lowercase().contains(&needle)
                && !patient.id.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        self.department.admits(patient.department.as_str())
            && self.priority.admits(&patient.priority)
            && self.status.admits(&patient.status)
    }
}

/// 按条件过滤，保持原有相对顺序
pub fn filter_patients<'a, I>(roster: I, criteria: &QueueCriteria) -> Vec<&'a Patient>
where
    I: IntoIterator<Item = &'a Patient>,
{
    roster.into_iter().filter(|patient| criteria.matches(patient)).collect()
}
