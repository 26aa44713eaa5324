// ==========================================
// 铁路车皮配载系统 - 配置层
// ==========================================
// 职责: 车队定义、查找表、费率等配置注入
// 存储: JSON 文件 (缺省使用内置参考部署)
// ==========================================

pub mod config_manager;
pub mod error;
pub mod planning_config;

// 重导出核心配置
pub use config_manager::{default_config_path, ConfigManager, CONFIG_PATH_ENV};
pub use error::{ConfigError, ConfigResult};
pub use planning_config::{
    CostRates, FleetConfig, KpiParameters, OrderDefaults, PlanningConfig, PlatformSpec,
    RakeSpec, RiskCoefficients, RoutingConfig,
};
