//! 名册数据源
//!
//! 队列引擎唯一的外部边界：读取完整名册与床位、写入新增或更新的患者

use crate::rows::{BedRow, PatientPatch, PatientRow};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use triage_core::{Bed, Patient, PatientIntake, Result, TriageError};

/// 名册数据源接口
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// 数据源名称
    fn name(&self) -> &str;

    /// 读取完整名册
    async fn fetch_roster(&self) -> Result<Vec<Patient>>;

    /// 写入新登记的患者
    async fn insert_patient(&self, patient: &Patient, intake: &PatientIntake) -> Result<()>;

    /// 写入患者的部分更新
    async fn update_patient(&self, id: &str, patch: &PatientPatch) -> Result<()>;

    /// 读取全部床位
    async fn fetch_beds(&self) -> Result<Vec<Bed>>;
}

#[async_trait]
impl<T: RosterSource + ?Sized> RosterSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_roster(&self) -> Result<Vec<Patient>> {
        (**self).fetch_roster().await
    }

    async fn insert_patient(&self, patient: &Patient, intake: &PatientIntake) -> Result<()> {
        (**self).insert_patient(patient, intake).await
    }

    async fn update_patient(&self, id: &str, patch: &PatientPatch) -> Result<()> {
        (**self).update_patient(id, patch).await
    }

    async fn fetch_beds(&self) -> Result<Vec<Bed>> {
        (**self).fetch_beds().await
    }
}

/// 将表中的行转换为患者记录，跳过无效行
pub(crate) fn rows_to_roster(source: &str, rows: Vec<PatientRow>) -> Vec<Patient> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id.clone();
            match Patient::try_from(row) {
                Ok(patient) => Some(patient),
                Err(e) => {
                    warn!("Skipping patient row {} from {}: {}", id, source, e);
                    None
                }
            }
        })
        .collect()
}

pub(crate) fn rows_to_beds(source: &str, rows: Vec<BedRow>) -> Vec<Bed> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id.clone();
            match Bed::try_from(row) {
                Ok(bed) => Some(bed),
                Err(e) => {
                    warn!("Skipping bed row {} from {}: {}", id, source, e);
                    None
                }
            }
        })
        .collect()
}

/// 进程内数据源
#[derive(Debug, Default)]
pub struct MemoryRosterSource {
    rows: RwLock<Vec<PatientRow>>,
    beds: RwLock<Vec<BedRow>>,
}

impl MemoryRosterSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以现有患者记录初始化
    pub fn with_patients(patients: &[Patient]) -> Self {
        let intake = PatientIntake::default();
        let rows = patients
            .iter()
            .map(|patient| PatientRow::for_insert(patient, &intake))
            .collect();
        Self::with_rows(rows)
    }

    pub fn with_rows(rows: Vec<PatientRow>) -> Self {
        Self {
            rows: RwLock::new(rows),
            beds: RwLock::default(),
        }
    }

    /// 附带床位数据
    pub fn with_beds(self, beds: &[Bed]) -> Self {
        Self {
            beds: RwLock::new(beds.iter().map(BedRow::from).collect()),
            ..self
        }
    }

    /// 当前存储的行快照
    pub async fn rows(&self) -> Vec<PatientRow> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl RosterSource for MemoryRosterSource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_roster(&self) -> Result<Vec<Patient>> {
        let rows = self.rows.read().await.clone();
        debug!("Fetched {} rows from memory store", rows.len());
        Ok(rows_to_roster(self.name(), rows))
    }

    async fn insert_patient(&self, patient: &Patient, intake: &PatientIntake) -> Result<()> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|row| row.id == patient.id) {
            return Err(TriageError::Conflict(format!("Patient {} already stored", patient.id)));
        }
        rows.push(PatientRow::for_insert(patient, intake));
        Ok(())
    }

    async fn update_patient(&self, id: &str, patch: &PatientPatch) -> Result<()> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|row| row.id == id) {
            Some(row) => {
                row.apply(patch);
                Ok(())
            }
            None => Err(TriageError::NotFound(format!("Patient {} not stored", id))),
        }
    }

    async fn fetch_beds(&self) -> Result<Vec<Bed>> {
        let rows = self.beds.read().await.clone();
        debug!("Fetched {} bed rows from memory store", rows.len());
        Ok(rows_to_beds(self.name(), rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::utils::{sample_beds, sample_roster};
    use triage_core::{PatientStatus, PatientUpdate};

    #[tokio::test]
    async fn test_memory_source_round_trips_roster() {
        let roster = sample_roster();
        let source = MemoryRosterSource::with_patients(&roster);

        let fetched = source.fetch_roster().await.unwrap();
        assert_eq!(fetched, roster);
    }

    #[tokio::test]
    async fn test_memory_source_skips_invalid_rows() {
        let source = MemoryRosterSource::with_rows(vec![
            PatientRow {
                id: "P-1".to_string(),
                name: "Valid".to_string(),
                priority: Some("high".to_string()),
                ..Default::default()
            },
            PatientRow {
                id: "P-2".to_string(),
                name: "Broken".to_string(),
                status: Some("updated".to_string()),
                ..Default::default()
            },
        ]);

        let fetched = source.fetch_roster().await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id, "P-1");
    }

    #[tokio::test]
    async fn test_memory_source_insert_and_update() {
        let source = MemoryRosterSource::new();
        let patient = sample_roster().remove(0);
        let intake = PatientIntake {
            chief_complaint: Some("Chest pain".to_string()),
            ..Default::default()
        };

        source.insert_patient(&patient, &intake).await.unwrap();
        assert!(source.insert_patient(&patient, &intake).await.is_err());

        let patch = PatientPatch::from(&PatientUpdate::status(PatientStatus::Completed));
        source.update_patient(&patient.id, &patch).await.unwrap();
        assert!(source.update_patient("P-missing", &patch).await.is_err());

        let rows = source.rows().await;
        assert_eq!(rows[0].status.as_deref(), Some("completed"));
        assert_eq!(rows[0].chief_complaint.as_deref(), Some("Chest pain"));
    }

    #[tokio::test]
    async fn test_memory_source_serves_beds() {
        let source = MemoryRosterSource::new();
        assert!(source.fetch_beds().await.unwrap().is_empty());

        let source = MemoryRosterSource::with_patients(&sample_roster()).with_beds(&sample_beds());
        assert_eq!(source.fetch_beds().await.unwrap(), sample_beds());
        assert_eq!(source.fetch_roster().await.unwrap().len(), 5);
    }
}
