//! 患者队列管理
//!
//! 持有会话内的患者名册，所有修改都经由此处的方法完成

use crate::criteria::{filter_patients, QueueCriteria};
use crate::ordering::{sort_patients, QueueOrdering};
use crate::stats::{summarize, QueueStats};
use std::collections::HashSet;
use triage_core::utils::{format_arrival_time, generate_patient_id, is_valid_patient_id};
use triage_core::{Patient, PatientIntake, PatientStatus, PatientUpdate, Result, TriageError};

/// 生成ID时的最大重试次数
const MAX_ID_ATTEMPTS: usize = 16;

/// 患者队列
#[derive(Debug, Clone, Default)]
pub struct PatientQueue {
    roster: Vec<Patient>,
}

impl PatientQueue {
    /// 创建空队列
    pub fn new() -> Self {
        Self { roster: Vec::new() }
    }

    /// 以现有名册创建队列
    pub fn with_roster(patients: Vec<Patient>) -> Self {
        let mut queue = Self::new();
        queue.replace_roster(patients);
        queue
    }

    pub fn patients(&self) -> &[Patient] {
        &self.roster
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.roster.iter().find(|patient| patient.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Patient> {
        self.roster.iter_mut().find(|patient| patient.id == id)
    }

    /// 过滤并排序后的展示序列
    pub fn view(&self, criteria: &QueueCriteria, ordering: &QueueOrdering) -> Vec<&Patient> {
        let mut patients = filter_patients(&self.roster, criteria);
        sort_patients(&mut patients, ordering);
        patients
    }

    /// 整个名册的统计
    pub fn stats(&self) -> QueueStats {
        summarize(&self.roster)
    }

    /// 登记新患者
    ///
    /// 未提供ID时生成一个不冲突的新ID；提供的ID格式非法时返回 `Validation`，
    /// 已存在时返回 `Conflict`。
    pub fn add_patient(&mut self, intake: PatientIntake) -> Result<Patient> {
        let id = match intake.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                if !is_valid_patient_id(id) {
                    return Err(TriageError::Validation(format!("非法患者ID: {}", id)));
                }
                if self.get(id).is_some() {
                    return Err(TriageError::Conflict(format!("Patient {} already exists", id)));
                }
                id.to_string()
            }
            None => self.fresh_id()?,
        };

        let patient = Patient {
            id,
            name: intake.name,
            wait_time: 0,
            priority: intake.priority,
            department: intake.department,
            arrival_time: format_arrival_time(&chrono::Local::now()),
            status: PatientStatus::Waiting,
        };

        self.roster.push(patient.clone());

        tracing::info!(
            "Added patient {} to queue with priority {} in {}",
            patient.id,
            patient.priority,
            patient.department
        );
        Ok(patient)
    }

    fn fresh_id(&self) -> Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = generate_patient_id();
            if self.get(&candidate).is_none() {
                return Ok(candidate);
            }
        }
        Err(TriageError::Internal("Unable to generate a unique patient id".to_string()))
    }

    /// 更新患者状态
    ///
    /// ID不存在时名册保持不变，返回 `false`。
    pub fn update_status(&mut self, id: &str, status: PatientStatus) -> bool {
        match self.get_mut(id) {
            Some(patient) => {
                let old_status = patient.status;
                patient.status = status;
                tracing::info!("Updated patient {} status from {} to {}", id, old_status, status);
                true
            }
            None => {
                tracing::warn!("Patient {} not found, status update to {} ignored", id, status);
                false
            }
        }
    }

    /// 应用部分更新；ID与到达时间保持不变
    pub fn update_patient(&mut self, id: &str, update: &PatientUpdate) -> bool {
        match self.get_mut(id) {
            Some(patient) => {
                update.apply_to(patient);
                tracing::info!("Updated patient {}", id);
                true
            }
            None => {
                tracing::warn!("Patient {} not found, update ignored", id);
                false
            }
        }
    }

    /// 用远程拉取的名册整体替换当前名册
    ///
    /// 重复ID只保留第一条记录。
    pub fn replace_roster(&mut self, patients: Vec<Patient>) {
        let mut seen = HashSet::with_capacity(patients.len());
        let mut roster = Vec::with_capacity(patients.len());

        for patient in patients {
            if seen.insert(patient.id.clone()) {
                roster.push(patient);
            } else {
                tracing::warn!("Dropping duplicate patient record {}", patient.id);
            }
        }

        tracing::debug!("Roster replaced with {} patients", roster.len());
        self.roster = roster;
    }

    /// 推进等待时间，仅对候诊中的患者生效
    pub fn advance_wait_times(&mut self, minutes: u32) {
        for patient in self
            .roster
            .iter_mut()
            .filter(|patient| patient.status == PatientStatus::Waiting)
        {
            patient.wait_time = patient.wait_time.saturating_add(minutes);
        }
    }
}
