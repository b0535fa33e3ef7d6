//! # 分诊数据同步模块
//!
//! 提供患者名册与外部数据存储之间的读写，包括：
//! - 数据源接口，统一内存与远程存储
//! - 远程 `patients` 与 `beds` 表的行模型与转换
//! - REST数据源，直接访问后端服务的表接口
//! - 队列服务，协调本地队列与数据源

pub mod rest;
pub mod rows;
pub mod service;
pub mod source;

pub use rest::{RestRosterSource, RestSourceConfig};
pub use rows::{BedRow, PatientPatch, PatientRow};
pub use service::QueueService;
pub use source::{MemoryRosterSource, RosterSource};
