//! 床位管理
//!
//! 与患者队列相同的过滤方式：通配标签、精确匹配与不区分大小写的搜索

use crate::criteria::Selection;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use triage_core::utils::format_arrival_time;
use triage_core::{Bed, BedStatus};

/// 床位占用时缺少患者信息的占位姓名
const PLACEHOLDER_OCCUPANT: &str = "New Patient";

/// 床位过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedCriteria {
    /// 床位ID、患者姓名或病区的子串，空串为通配
    pub search_text: String,
    pub ward: Selection<String>,
    pub status: Selection<BedStatus>,
}

impl BedCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn with_ward(mut self, ward: impl Into<String>) -> Self {
        self.ward = Selection::Only(ward.into());
        self
    }

    pub fn with_status(mut self, status: BedStatus) -> Self {
        self.status = Selection::Only(status);
        self
    }

    /// 从 "All Wards" / "All Status" 等下拉框标签构造
    pub fn from_labels(search_text: &str, ward: &str, status: &str) -> Self {
        Self {
            search_text: search_text.to_string(),
            ward: Selection::parse(ward),
            status: Selection::parse(status),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.search_text.is_empty() && self.ward.is_any() && self.status.is_any()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn matches(&self, bed: &Bed) -> bool {
        if !self.search_text.is_empty() {
            let needle = self.search_text.to_lowercase();
            let hit = bed.id.to_lowercase().contains(&needle)
                || bed.department.to_lowercase().contains(&needle)
                || bed
                    .patient_name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        self.ward.admits(bed.department.as_str()) && self.status.admits(&bed.status)
    }
}

/// 按条件过滤床位，保持原有顺序
pub fn filter_beds<'a, I>(beds: I, criteria: &BedCriteria) -> Vec<&'a Bed>
where
    I: IntoIterator<Item = &'a Bed>,
{
    beds.into_iter().filter(|bed| criteria.matches(bed)).collect()
}

/// 床位统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BedStats {
    pub total: usize,
    pub by_status: HashMap<BedStatus, usize>,
}

impl BedStats {
    pub fn count(&self, status: BedStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    pub fn available(&self) -> usize {
        self.count(BedStatus::Available)
    }

    pub fn occupied(&self) -> usize {
        self.count(BedStatus::Occupied)
    }

    pub fn maintenance(&self) -> usize {
        self.count(BedStatus::Maintenance)
    }
}

/// 统计全部床位（不受过滤条件影响）
pub fn summarize_beds<'a, I>(beds: I) -> BedStats
where
    I: IntoIterator<Item = &'a Bed>,
{
    let mut stats = BedStats::default();
    for bed in beds {
        stats.total += 1;
        *stats.by_status.entry(bed.status).or_insert(0) += 1;
    }
    stats
}

/// 床位看板，持有会话内的全部床位
#[derive(Debug, Clone, Default)]
pub struct BedBoard {
    beds: Vec<Bed>,
}

impl BedBoard {
    pub fn new() -> Self {
        Self { beds: Vec::new() }
    }

    pub fn with_beds(beds: Vec<Bed>) -> Self {
        let mut board = Self::new();
        board.replace_beds(beds);
        board
    }

    pub fn beds(&self) -> &[Bed] {
        &self.beds
    }

    pub fn len(&self) -> usize {
        self.beds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beds.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Bed> {
        self.beds.iter().find(|bed| bed.id == id)
    }

    pub fn view(&self, criteria: &BedCriteria) -> Vec<&Bed> {
        filter_beds(&self.beds, criteria)
    }

    pub fn stats(&self) -> BedStats {
        summarize_beds(&self.beds)
    }

    /// 整体替换床位列表，重复ID只保留第一条
    pub fn replace_beds(&mut self, beds: Vec<Bed>) {
        let mut seen = HashSet::with_capacity(beds.len());
        self.beds = beds
            .into_iter()
            .filter(|bed| {
                let fresh = seen.insert(bed.id.clone());
                if !fresh {
                    tracing::warn!("Dropping duplicate bed record {}", bed.id);
                }
                fresh
            })
            .collect();
        tracing::debug!("Bed board replaced with {} beds", self.beds.len());
    }

    /// 更新床位状态
    ///
    /// 变为空闲时清除占用信息；变为占用且无患者信息时填入占位姓名与当前时间。
    pub fn update_status(&mut self, id: &str, status: BedStatus) -> bool {
        let Some(bed) = self.beds.iter_mut().find(|bed| bed.id == id) else {
            tracing::warn!("Bed {} not found, status update to {} ignored", id, status);
            return false;
        };

        let old_status = bed.status;
        bed.status = status;
        match status {
            BedStatus::Available => {
                bed.patient_id = None;
                bed.patient_name = None;
                bed.admission_time = None;
            }
            BedStatus::Occupied if bed.patient_name.is_none() => {
                bed.patient_name = Some(PLACEHOLDER_OCCUPANT.to_string());
                bed.admission_time = Some(format_arrival_time(&chrono::Local::now()));
            }
            _ => {}
        }

        tracing::info!("Updated bed {} status from {} to {}", id, old_status, status);
        true
    }
}
