// ==========================================
// 铁路车皮配载系统 - 延误风险领域模型
// ==========================================
// 用途: 外部风险模型的输入特征与输出标注
// 红线: 风险标注是事后注释,不回写配载明细与成本
// ==========================================

use crate::domain::types::RiskFlag;
use serde::{Deserialize, Serialize};

// ==========================================
// RiskFeatures - 风险模型特征
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFeatures {
    pub distance_km: f64,
    pub transit_hours: f64,
    pub priority: f64,           // 优先级秩 (1/2/3)
    pub weight_t: f64,
    pub congestion: f64,         // 线路拥堵系数 (0~1)
    pub historical_delay_pct: f64,
    pub hours_until_due: f64,
    pub mode_flag: f64,          // 铁路=1, 公路=0
    pub season_factor: f64,
}

// ==========================================
// RiskAssessment - 风险评估结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_flag: RiskFlag,
    pub cost_multiplier: f64,
    pub delay_probability: f64,
}

// ==========================================
// RiskAnnotation - 明细风险标注
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAnnotation {
    pub seq_no: u32,
    pub order_id: String,
    pub assessment: RiskAssessment,
}
