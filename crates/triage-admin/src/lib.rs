//! # 分诊管理模块
//!
//! 提供配置管理与日志初始化等运维功能，并根据配置构造名册数据源

pub mod config;
pub mod logging;

use anyhow::{Context, Result};
use triage_core::utils::{sample_beds, sample_roster};
use triage_sync::{MemoryRosterSource, RestRosterSource, RosterSource};

pub use config::{
    ConfigManager, ConfigValidator, LogFormat, LoggingConfig, QueueConfig, StoreBackend,
    StoreConfig, TriageConfig,
};
pub use logging::init_logging;

/// 根据存储配置构造名册数据源
pub fn build_source(config: &StoreConfig) -> Result<Box<dyn RosterSource>> {
    match config.backend {
        StoreBackend::Memory => {
            let source = if config.seed_sample_roster {
                MemoryRosterSource::with_patients(&sample_roster()).with_beds(&sample_beds())
            } else {
                MemoryRosterSource::new()
            };
            tracing::info!("Using in-memory roster store");
            Ok(Box::new(source))
        }
        StoreBackend::Rest => {
            let source = RestRosterSource::new(config.rest_source_config())
                .context("Failed to configure REST roster store")?;
            Ok(Box::new(source))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_is_seeded() {
        let source = build_source(&StoreConfig::default()).unwrap();
        assert_eq!(source.name(), "memory");
        assert_eq!(source.fetch_roster().await.unwrap().len(), 5);
        assert_eq!(source.fetch_beds().await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_memory_backend_without_seed_is_empty() {
        let config = StoreConfig {
            seed_sample_roster: false,
            ..Default::default()
        };
        let source = build_source(&config).unwrap();
        assert!(source.fetch_roster().await.unwrap().is_empty());
        assert!(source.fetch_beds().await.unwrap().is_empty());
    }

    #[test]
    fn test_rest_backend_without_url_fails() {
        let config = StoreConfig {
            backend: StoreBackend::Rest,
            ..Default::default()
        };
        assert!(build_source(&config).is_err());
    }
}
