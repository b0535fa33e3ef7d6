//! 队列服务
//!
//! 将内存中的患者队列与外部数据源结合：本地修改立即生效，远程写入失败只记录日志，不回滚

use crate::rows::PatientPatch;
use crate::source::RosterSource;
use tracing::{info, warn};
use triage_core::{Bed, BedStatus, Patient, PatientIntake, PatientStatus, PatientUpdate, Result};
use triage_queue::{BedBoard, BedCriteria, BedStats, PatientQueue, QueueCriteria, QueueOrdering, QueueStats};

/// 队列服务
pub struct QueueService<S: RosterSource> {
    queue: PatientQueue,
    beds: BedBoard,
    source: S,
}

impl<S: RosterSource> QueueService<S> {
    pub fn new(source: S) -> Self {
        Self {
            queue: PatientQueue::new(),
            beds: BedBoard::new(),
            source,
        }
    }

    pub fn beds(&self) -> &BedBoard {
        &self.beds
    }

    pub fn queue(&self) -> &PatientQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut PatientQueue {
        &mut self.queue
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// 从数据源重新拉取名册
    ///
    /// 成功时整体替换本地名册；失败时保留原名册并返回 `false`。
    pub async fn refresh(&mut self) -> bool {
        match self.source.fetch_roster().await {
            Ok(patients) => {
                info!("Refreshed roster from {} with {} patients", self.source.name(), patients.len());
                self.queue.replace_roster(patients);
                true
            }
            Err(e) => {
                warn!(
                    "Failed to refresh roster from {}, keeping {} cached patients: {}",
                    self.source.name(),
                    self.queue.len(),
                    e
                );
                false
            }
        }
    }

    /// 登记新患者并写入数据源
    pub async fn admit(&mut self, intake: PatientIntake) -> Result<Patient> {
        let patient = self.queue.add_patient(intake.clone())?;

        if let Err(e) = self.source.insert_patient(&patient, &intake).await {
            warn!("Failed to persist patient {} to {}: {}", patient.id, self.source.name(), e);
        }

        Ok(patient)
    }

    /// 更新患者状态，ID不存在时返回 `false` 且不访问数据源
    pub async fn set_status(&mut self, id: &str, status: PatientStatus) -> bool {
        self.amend(id, PatientUpdate::status(status)).await
    }

    /// 应用部分更新并写入数据源
    pub async fn amend(&mut self, id: &str, update: PatientUpdate) -> bool {
        if !self.queue.update_patient(id, &update) {
            return false;
        }

        let patch = PatientPatch::from(&update);
        if let Err(e) = self.source.update_patient(id, &patch).await {
            warn!("Failed to persist update for patient {} to {}: {}", id, self.source.name(), e);
        }
        true
    }

    pub fn view(&self, criteria: &QueueCriteria, ordering: &QueueOrdering) -> Vec<&Patient> {
        self.queue.view(criteria, ordering)
    }

    pub fn stats(&self) -> QueueStats {
        self.queue.stats()
    }

    /// 从数据源重新拉取床位
    ///
    /// 占用床位缺少患者姓名时按 `patient_id` 从当前名册补全；失败时保留原床位列表。
    pub async fn refresh_beds(&mut self) -> bool {
        match self.source.fetch_beds().await {
            Ok(beds) => {
                info!("Refreshed beds from {} with {} beds", self.source.name(), beds.len());
                let beds: Vec<Bed> = beds
                    .into_iter()
                    .map(|bed| self.resolve_occupant(bed))
                    .collect();
                self.beds.replace_beds(beds);
                true
            }
            Err(e) => {
                warn!(
                    "Failed to refresh beds from {}, keeping {} cached beds: {}",
                    self.source.name(),
                    self.beds.len(),
                    e
                );
                false
            }
        }
    }

    fn resolve_occupant(&self, mut bed: Bed) -> Bed {
        if bed.patient_name.is_none() {
            bed.patient_name = bed
                .patient_id
                .as_deref()
                .and_then(|id| self.queue.get(id))
                .map(|patient| patient.name.clone());
        }
        bed
    }

    /// 更新床位状态，只修改本地床位看板
    pub fn set_bed_status(&mut self, id: &str, status: BedStatus) -> bool {
        self.beds.update_status(id, status)
    }

    pub fn bed_view(&self, criteria: &BedCriteria) -> Vec<&Bed> {
        self.beds.view(criteria)
    }

    pub fn bed_stats(&self) -> BedStats {
        self.beds.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryRosterSource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use triage_core::utils::{sample_beds, sample_roster};
    use triage_core::{Priority, TriageError};

    /// 可切换失败的数据源
    #[derive(Default)]
    struct FlakySource {
        inner: MemoryRosterSource,
        failing: AtomicBool,
    }

    impl FlakySource {
        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn check(&self) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(TriageError::Store("store offline".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl RosterSource for FlakySource {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn fetch_roster(&self) -> Result<Vec<Patient>> {
            self.check()?;
            self.inner.fetch_roster().await
        }

        async fn insert_patient(&self, patient: &Patient, intake: &PatientIntake) -> Result<()> {
            self.check()?;
            self.inner.insert_patient(patient, intake).await
        }

        async fn update_patient(&self, id: &str, patch: &PatientPatch) -> Result<()> {
            self.check()?;
            self.inner.update_patient(id, patch).await
        }

        async fn fetch_beds(&self) -> Result<Vec<Bed>> {
            self.check()?;
            self.inner.fetch_beds().await
        }
    }

    #[tokio::test]
    async fn test_refresh_replaces_roster() {
        let mut service = QueueService::new(MemoryRosterSource::with_patients(&sample_roster()));
        assert!(service.refresh().await);
        assert_eq!(service.stats().total, 5);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_cached_roster() {
        let source = FlakySource {
            inner: MemoryRosterSource::with_patients(&sample_roster()),
            ..Default::default()
        };
        let mut service = QueueService::new(source);
        assert!(service.refresh().await);

        service.source().set_failing(true);
        assert!(!service.refresh().await);
        assert_eq!(service.queue().len(), 5);
    }

    #[tokio::test]
    async fn test_admit_is_optimistic_when_store_fails() {
        let source = FlakySource::default();
        source.set_failing(true);
        let mut service = QueueService::new(source);

        let patient = service
            .admit(PatientIntake::new("New Patient", Priority::Critical, "ICU"))
            .await
            .unwrap();

        assert_eq!(service.queue().len(), 1);
        assert_eq!(patient.status, PatientStatus::Waiting);
        assert!(service.source().inner.rows().await.is_empty());
    }

    #[tokio::test]
    async fn test_admit_persists_intake_details() {
        let mut service = QueueService::new(MemoryRosterSource::new());
        let intake = PatientIntake {
            notes: Some("Allergic to penicillin".to_string()),
            ..PatientIntake::new("Ann Lee", Priority::High, "Pediatrics")
        };

        let patient = service.admit(intake).await.unwrap();
        let rows = service.source().rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, patient.id);
        assert_eq!(rows[0].notes.as_deref(), Some("Allergic to penicillin"));
    }

    #[tokio::test]
    async fn test_set_status_persists_and_ignores_unknown_ids() {
        let mut service = QueueService::new(MemoryRosterSource::with_patients(&sample_roster()));
        service.refresh().await;

        assert!(service.set_status("P-12349", PatientStatus::InProgress).await);
        assert!(!service.set_status("P-unknown", PatientStatus::Completed).await);

        let rows = service.source().rows().await;
        let stored = rows.iter().find(|row| row.id == "P-12349").unwrap();
        assert_eq!(stored.status.as_deref(), Some("in-progress"));
        assert_eq!(service.stats().in_progress, 2);
    }

    #[tokio::test]
    async fn test_late_refresh_overwrites_local_edits() {
        let mut service = QueueService::new(MemoryRosterSource::with_patients(&sample_roster()));
        service.refresh().await;

        // 仅修改本地，不写入数据源
        service.queue_mut().update_status("P-12345", PatientStatus::Completed);
        service.refresh().await;

        assert_eq!(service.queue().get("P-12345").unwrap().status, PatientStatus::Waiting);
    }

    #[tokio::test]
    async fn test_refresh_beds_resolves_occupant_names() {
        let mut beds = sample_beds();
        beds[1].patient_name = None; // B-1002 -> P-12347
        beds[3].patient_name = None; // B-1004 -> P-10001, 不在名册中
        let source = MemoryRosterSource::with_patients(&sample_roster()).with_beds(&beds);

        let mut service = QueueService::new(source);
        assert!(service.refresh().await);
        assert!(service.refresh_beds().await);

        let board = service.beds();
        assert_eq!(board.get("B-1002").unwrap().patient_name.as_deref(), Some("Robert Johnson"));
        assert!(board.get("B-1004").unwrap().patient_name.is_none());
        assert_eq!(service.bed_stats().occupied(), 2);

        let icu = service.bed_view(&BedCriteria::from_labels("", "ICU", "All Status"));
        assert_eq!(icu.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_bed_refresh_keeps_cached_beds() {
        let source = FlakySource {
            inner: MemoryRosterSource::new().with_beds(&sample_beds()),
            ..Default::default()
        };
        let mut service = QueueService::new(source);
        assert!(service.refresh_beds().await);

        service.source().set_failing(true);
        assert!(!service.refresh_beds().await);
        assert_eq!(service.beds().len(), 8);

        assert!(service.set_bed_status("B-1002", BedStatus::Available));
        assert_eq!(service.bed_stats().available(), 4);
    }
}
