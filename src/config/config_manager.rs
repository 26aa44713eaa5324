// ==========================================
// 铁路车皮配载系统 - 配置管理器
// ==========================================
// 职责: 配置加载、定位、校验
// 来源优先级: 显式路径 > RAKE_ALLOCATION_CONFIG > 用户配置目录 > 内置默认
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::planning_config::PlanningConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "RAKE_ALLOCATION_CONFIG";

/// 用户配置目录下的相对路径
const CONFIG_DIR_NAME: &str = "rake-allocation";
const CONFIG_FILE_NAME: &str = "config.json";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    config: PlanningConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 使用内置默认配置（参考部署）
    pub fn with_defaults() -> Self {
        Self {
            config: PlanningConfig::default(),
            source: None,
        }
    }

    /// 使用调用方构造的配置（会执行校验）
    pub fn from_config(config: PlanningConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source: None,
        })
    }

    /// 从 JSON 文件加载配置
    ///
    /// # 参数
    /// - path: 配置文件路径
    ///
    /// # 返回
    /// - Ok(ConfigManager): 加载并校验通过
    /// - Err: 读取/解析/校验失败
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config: PlanningConfig = serde_json::from_str(&raw)?;
        config.validate()?;

        info!(
            path = %path.display(),
            rakes = config.fleet.rakes.len(),
            platforms = config.fleet.platforms.len(),
            "配置加载完成"
        );

        Ok(Self {
            config,
            source: Some(path.to_path_buf()),
        })
    }

    /// 按优先级定位配置文件,均不存在时使用内置默认
    pub fn from_env_or_default() -> ConfigResult<Self> {
        match Self::locate_config_file() {
            Some(path) => Self::load(&path),
            None => {
                debug!("未找到配置文件,使用内置默认配置");
                Ok(Self::with_defaults())
            }
        }
    }

    /// 定位配置文件
    fn locate_config_file() -> Option<PathBuf> {
        // 允许通过环境变量显式指定配置路径（便于调试/测试/CI）
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }

        default_config_path().filter(|p| p.exists())
    }

    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }

    pub fn into_config(self) -> PlanningConfig {
        self.config
    }

    /// 配置来源（None 表示内置默认）
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 配置快照（JSON）
    ///
    /// 用于随方案输出,保证方案可复现
    pub fn snapshot_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string(&self.config)?)
    }
}

/// 用户配置目录下的默认配置路径
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
