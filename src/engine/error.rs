// ==========================================
// 铁路车皮配载系统 - 引擎层错误类型
// ==========================================
// 红线: 输入缺陷行不是错误,只剔除并告警
// ==========================================

use crate::config::error::ConfigError;
use thiserror::Error;

/// 配载计算错误类型
#[derive(Error, Debug)]
pub enum PlanError {
    /// 整体输入不是记录列表,计算中止
    #[error("输入格式错误: {0}")]
    MalformedInput(String),

    /// 车队/查找表配置不可用
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result 类型别名
pub type PlanResult<T> = Result<T, PlanError>;
