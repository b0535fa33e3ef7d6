//! 日志初始化

use crate::config::{LogFormat, LoggingConfig};
use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// 构造日志过滤器，`RUST_LOG` 优先于配置中的级别
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log level: {}", config.level)),
    }
}

/// 安装全局日志订阅器
///
/// 已有订阅器时保持原样，返回 `false`。
pub fn init_logging(config: &LoggingConfig) -> Result<bool> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match config.format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    match installed {
        Ok(()) => {
            tracing::debug!("Logging initialised at level {}", config.level);
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            level: "triage=verbose".to_string(),
            ..Default::default()
        };
        assert!(build_filter(&config).is_err());
    }

    #[test]
    fn test_second_init_is_a_noop() {
        let config = LoggingConfig::default();
        init_logging(&config).unwrap();
        assert!(!init_logging(&config).unwrap());
    }
}
