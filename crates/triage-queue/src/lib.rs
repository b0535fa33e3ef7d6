//! # 患者队列模块
//!
//! 提供分诊队列的核心逻辑，包括：
//! - 过滤条件：按搜索词、科室、优先级和状态筛选患者
//! - 排序：按等待时间或优先级稳定排序
//! - 统计：按状态计数与平均等待时间
//! - 队列管理：名册的登记、更新与整体替换
//! - 床位：按病区、状态与搜索词筛选床位并计数

pub mod beds;
pub mod criteria;
pub mod ordering;
pub mod queue;
pub mod stats;

// 重新导出主要类型
pub use beds::{filter_beds, summarize_beds, BedBoard, BedCriteria, BedStats};
pub use criteria::{filter_patients, QueueCriteria, Selection};
pub use ordering::{sort_patients, QueueOrdering, SortDirection, SortKey};
pub use queue::PatientQueue;
pub use stats::{summarize, QueueStats};
