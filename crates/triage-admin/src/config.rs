//! 配置管理
//!
//! 从可选的TOML文件与 `TRIAGE__` 前缀的环境变量加载配置，并提供验证与保存

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info};
use triage_queue::QueueOrdering;
use triage_sync::RestSourceConfig;

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    /// 配置数据
    config: Arc<RwLock<TriageConfig>>,
    /// 配置文件路径
    config_path: Option<String>,
    /// 配置验证器
    validator: ConfigValidator,
}

/// 分诊系统完整配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// 数据存储配置
    pub store: StoreConfig,
    /// 队列展示配置
    pub queue: QueueConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 存储后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Rest,
}

/// 数据存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// 后端服务地址
    pub base_url: String,
    /// 访问密钥
    pub api_key: String,
    /// 患者表名
    pub table: String,
    /// 床位表名
    pub bed_table: String,
    /// 请求超时秒数
    pub timeout_secs: u64,
    /// 内存后端是否预置演示名册与床位
    pub seed_sample_roster: bool,
}

impl StoreConfig {
    pub fn rest_source_config(&self) -> RestSourceConfig {
        RestSourceConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            table: self.table.clone(),
            bed_table: self.bed_table.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            base_url: String::new(),
            api_key: String::new(),
            table: "patients".to_string(),
            bed_table: "beds".to_string(),
            timeout_secs: 10,
            seed_sample_roster: true,
        }
    }
}

/// 队列展示配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub default_sort_key: String,
    pub default_sort_direction: String,
}

impl QueueConfig {
    /// 默认排序，无法识别的取值回退到优先级降序
    pub fn ordering(&self) -> QueueOrdering {
        QueueOrdering::from_labels(&self.default_sort_key, &self.default_sort_direction)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            default_sort_key: "priority".to_string(),
            default_sort_direction: "desc".to_string(),
        }
    }
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Full,
        }
    }
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    validation_rules: Vec<ValidationRule>,
}

/// 验证规则
#[derive(Debug)]
struct ValidationRule {
    field_path: &'static str,
    validator: fn(&TriageConfig) -> Result<()>,
}

impl ConfigManager {
    /// 加载配置；未指定文件时只读取环境变量与默认值
    pub fn new(config_path: Option<&str>) -> Result<Self> {
        let config = Self::load_config(config_path)?;
        let validator = ConfigValidator::new();
        validator.validate(&config)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path: config_path.map(str::to_string),
            validator,
        })
    }

    fn load_config(config_path: Option<&str>) -> Result<TriageConfig> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("TRIAGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// 配置来源描述，供日志初始化之后输出
    pub fn source_description(&self) -> String {
        match &self.config_path {
            Some(path) => format!("file {} with environment overrides", path),
            None => "defaults and environment".to_string(),
        }
    }

    /// 获取配置快照
    pub async fn get_config(&self) -> TriageConfig {
        let config = self.config.read().await;
        config.clone()
    }

    /// 更新配置，验证通过后写回配置文件
    pub async fn update_config(&self, new_config: TriageConfig) -> Result<()> {
        self.validator.validate(&new_config)?;

        {
            let mut config = self.config.write().await;
            *config = new_config;
        }

        self.save_config().await?;

        info!("Configuration updated successfully");
        Ok(())
    }

    async fn save_config(&self) -> Result<()> {
        let Some(path) = &self.config_path else {
            return Ok(());
        };

        let config = self.config.read().await;
        let config_str = toml::to_string_pretty(&*config)
            .context("Failed to serialize configuration")?;

        tokio::fs::write(path, config_str)
            .await
            .context("Failed to write configuration file")?;

        info!("Configuration saved to: {}", path);
        Ok(())
    }

    /// 重新从文件加载配置
    pub async fn reload_config(&self) -> Result<()> {
        let new_config = Self::load_config(self.config_path.as_deref())?;
        self.validator.validate(&new_config)?;

        let mut config = self.config.write().await;
        *config = new_config;

        info!("Configuration reloaded from {}", self.source_description());
        Ok(())
    }
}

impl ConfigValidator {
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "store.base_url",
                validator: |config| {
                    if config.store.backend == StoreBackend::Rest && config.store.base_url.trim().is_empty() {
                        Err(anyhow::anyhow!("REST backend requires a base_url"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "store.api_key",
                validator: |config| {
                    if config.store.backend == StoreBackend::Rest && config.store.api_key.trim().is_empty() {
                        Err(anyhow::anyhow!("REST backend requires an api_key"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "store.timeout_secs",
                validator: |config| {
                    if config.store.timeout_secs == 0 {
                        Err(anyhow::anyhow!("Store timeout cannot be 0"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "store.table",
                validator: |config| {
                    if config.store.table.trim().is_empty() {
                        Err(anyhow::anyhow!("Store table cannot be empty"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "store.bed_table",
                validator: |config| {
                    if config.store.bed_table.trim().is_empty() {
                        Err(anyhow::anyhow!("Bed table cannot be empty"))
                    } else {
                        Ok(())
                    }
                },
            },
        ];

        Self { validation_rules }
    }

    pub fn validate(&self, config: &TriageConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(e.context(format!("Invalid configuration value: {}", rule.field_path)));
            }
        }

        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
