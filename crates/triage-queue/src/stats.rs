//! 队列统计

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use triage_core::{Patient, PatientStatus, Priority};

/// 队列统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueStats {
    pub total: usize,
    pub waiting: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub by_priority: HashMap<Priority, usize>,
    /// 平均等待分钟数，队列为空时为 `None`
    pub average_wait_minutes: Option<f64>,
}

impl QueueStats {
    pub fn count_by_status(&self, status: PatientStatus) -> usize {
        match status {
            PatientStatus::Waiting => self.waiting,
            PatientStatus::InProgress => self.in_progress,
            PatientStatus::Completed => self.completed,
            PatientStatus::Cancelled => self.cancelled,
        }
    }

    pub fn count_by_priority(&self, priority: Priority) -> usize {
        self.by_priority.get(&priority).copied().unwrap_or(0)
    }

    /// 四舍五入后的平均等待时间，无数据时为0
    pub fn rounded_average_wait(&self) -> u32 {
        self.average_wait_minutes
            .map(|avg| avg.round() as u32)
            .unwrap_or(0)
    }
}

/// 统计整个名册（不受过滤条件影响）
pub fn summarize<'a, I>(roster: I) -> QueueStats
where
    I: IntoIterator<Item = &'a Patient>,
{
    let mut stats = QueueStats::default();
    let mut total_wait: u64 = 0;

    for patient in roster {
        stats.total += 1;
        total_wait += u64::from(patient.wait_time);

        match patient.status {
            PatientStatus::Waiting => stats.waiting += 1,
            PatientStatus::InProgress => stats.in_progress += 1,
            PatientStatus::Completed => stats.completed += 1,
            PatientStatus::Cancelled => stats.cancelled += 1,
        }

        *stats.by_priority.entry(patient.priority).or_insert(0) += 1;
    }

    if stats.total > 0 {
        stats.average_wait_minutes = Some(total_wait as f64 / stats.total as f64);
    }

    stats
}
