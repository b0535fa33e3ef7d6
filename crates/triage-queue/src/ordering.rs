//! 队列排序

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use triage_core::Patient;

/// 排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    WaitTime,
    #[default]
    Priority,
}

impl SortKey {
    /// 解析排序字段，无法识别时回退到默认值
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "waittime" | "wait" => SortKey::WaitTime,
            "priority" => SortKey::Priority,
            other => {
                tracing::debug!("Unknown sort key '{}', falling back to default", other);
                SortKey::default()
            }
        }
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => SortDirection::Ascending,
            "desc" | "descending" => SortDirection::Descending,
            other => {
                tracing::debug!("Unknown sort direction '{}', falling back to default", other);
                SortDirection::default()
            }
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// 排序选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueueOrdering {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl QueueOrdering {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn from_labels(key: &str, direction: &str) -> Self {
        Self {
            key: SortKey::parse_or_default(key),
            direction: SortDirection::parse_or_default(direction),
        }
    }

    /// 比较两名患者；键相同时返回 `Equal`
    pub fn compare(&self, a: &Patient, b: &Patient) -> Ordering {
        let ascending = match self.key {
            SortKey::WaitTime => a.wait_time.cmp(&b.wait_time),
            SortKey::Priority => a.priority.rank().cmp(&b.priority.rank()),
        };

        match self.direction {
            SortDirection::Ascending => ascending,
            SortDirection::Descending => ascending.reverse(),
        }
    }
}

/// 稳定排序：键相同的患者保持过滤后的相对顺序
pub fn sort_patients(patients: &mut [&Patient], ordering: &QueueOrdering) {
    patients.sort_by(|a, b| ordering.compare(a, b));
}
