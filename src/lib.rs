//! # Triage
//!
//! 医院患者分诊队列的统一入口，重新导出各子模块

pub use triage_core;
pub use triage_queue;
pub use triage_sync;

pub use triage_core::{Bed, BedStatus, Patient, PatientIntake, PatientStatus, PatientUpdate, Priority, Result, TriageError};
pub use triage_queue::{BedBoard, BedCriteria, BedStats, PatientQueue, QueueCriteria, QueueOrdering, QueueStats, SortDirection, SortKey};
pub use triage_sync::{MemoryRosterSource, QueueService, RestRosterSource, RosterSource};
