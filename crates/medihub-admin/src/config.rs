//! 配置管理
//!
//! 配置按以下顺序叠加：内置默认值、配置文件（默认 `medihub.toml`，可缺省）、
//! 环境变量。环境变量以 `MEDIHUB_` 开头，层级之间用 `__` 分隔，例如
//! `MEDIHUB_STORE__MODE=remote`、`MEDIHUB_STORE__REMOTE__ENDPOINT=https://...`。

use crate::logging::build_filter;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

/// 默认配置文件
pub const DEFAULT_CONFIG_FILE: &str = "medihub.toml";

/// 环境变量前缀
pub const ENV_PREFIX: &str = "MEDIHUB";

/// MediHub完整配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediHubConfig {
    /// 记录存储
    pub store: StoreConfig,
    /// 模拟延迟
    pub latency: LatencyConfig,
    /// 页面参数
    pub views: ViewConfig,
    /// 日志
    pub logging: LoggingConfig,
}

/// 存储模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    /// 内存模拟数据
    #[default]
    Mock,
    /// 远程记录服务
    Remote,
}

/// 存储配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub mode: StoreMode,
    pub remote: RemoteStoreConfig,
}

/// 远程存储配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteStoreConfig {
    /// 服务地址
    pub endpoint: String,
    /// 项目ID
    pub project_id: String,
    /// 公钥
    pub public_key: String,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

impl RemoteStoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RemoteStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            project_id: String::new(),
            public_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// 模拟延迟配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    /// 模拟模式下是否在每次调用前等待
    pub enabled: bool,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// 页面配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// 列表每页条数
    pub page_size: usize,
    /// 仪表盘最近活动条数
    pub recent_activity_limit: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            recent_activity_limit: 8,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别或过滤指令，如 `info`、`medihub_store=debug`
    pub level: String,
    /// 输出事件的 target
    pub with_target: bool,
    /// 彩色输出
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: false,
            ansi: true,
        }
    }
}

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    /// 配置数据
    config: MediHubConfig,
    /// 配置文件路径
    config_path: PathBuf,
    /// 配置验证器
    validator: ConfigValidator,
}

impl ConfigManager {
    /// 加载配置。未指定路径时使用 `medihub.toml`，文件不存在则只用默认值和环境变量
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(config_path, None)
    }

    /// 加载配置，环境变量来源可替换（`None` 时读取进程环境）
    pub fn load_with_env(
        config_path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let required = config_path.is_some();
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let config = Self::load_config(&config_path, required, env)?;
        let validator = ConfigValidator::new();
        validator.validate(&config)?;

        Ok(Self {
            config,
            config_path,
            validator,
        })
    }

    /// 从文件和环境变量加载配置
    fn load_config(
        config_path: &Path,
        required: bool,
        env: Option<HashMap<String, String>>,
    ) -> Result<MediHubConfig> {
        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env);

        let settings = Config::builder()
            .add_source(File::from(config_path).required(required))
            .add_source(environment)
            .build()
            .with_context(|| format!("Failed to read configuration from {}", config_path.display()))?;

        let config: MediHubConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        if config_path.exists() {
            info!("Configuration loaded from: {}", config_path.display());
        } else {
            debug!("No configuration file at {}, using defaults", config_path.display());
        }
        Ok(config)
    }

    /// 获取配置
    pub fn config(&self) -> &MediHubConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 用命令行参数覆盖后重新验证
    pub fn update<F>(&mut self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut MediHubConfig),
    {
        let mut updated = self.config.clone();
        apply(&mut updated);
        self.validator.validate(&updated)?;
        self.config = updated;
        Ok(())
    }

    /// 当前生效配置的TOML形式
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(&self.config).context("Failed to serialize configuration")
    }

    /// 保存配置到文件
    pub async fn save(&self, path: &Path) -> Result<()> {
        let config_str = self.to_toml()?;
        tokio::fs::write(path, config_str)
            .await
            .context("Failed to write configuration file")?;

        info!("Configuration saved to: {}", path.display());
        Ok(())
    }
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    /// 验证规则
    validation_rules: Vec<ValidationRule>,
}

/// 验证规则
#[derive(Debug)]
struct ValidationRule {
    /// 字段路径
    field_path: &'static str,
    /// 验证函数
    validator: fn(&MediHubConfig) -> Result<()>,
}

impl ConfigValidator {
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "views.page_size",
                validator: |config| {
                    anyhow::ensure!(config.views.page_size > 0, "Page size cannot be 0");
                    Ok(())
                },
            },
            ValidationRule {
                field_path: "store.remote",
                validator: |config| {
                    if config.store.mode != StoreMode::Remote {
                        return Ok(());
                    }
                    let remote = &config.store.remote;
                    anyhow::ensure!(!remote.endpoint.trim().is_empty(), "Remote endpoint is required");
                    anyhow::ensure!(!remote.project_id.trim().is_empty(), "Remote project id is required");
                    anyhow::ensure!(!remote.public_key.trim().is_empty(), "Remote public key is required");
                    anyhow::ensure!(remote.timeout_secs > 0, "Remote timeout cannot be 0");
                    Ok(())
                },
            },
            ValidationRule {
                field_path: "logging.level",
                validator: |config| build_filter(&config.logging).map(|_| ()),
            },
        ];

        Self { validation_rules }
    }

    /// 验证配置
    pub fn validate(&self, config: &MediHubConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(e.context(format!("Invalid configuration value: {}", rule.field_path)));
            }
        }

        debug!("Configuration validation passed");
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
