// ==========================================
// 铁路车皮配载系统 - 延误风险引擎
// ==========================================
// 职责: 为每条配载明细生成延误风险标注
// 输入: 配载明细 + 查找表 + 模型系数
// 输出: RiskAnnotation 列表
// 红线: 事后标注,不改变配载决策与已存成本
// ==========================================

use crate::config::{RiskCoefficients, RoutingConfig};
use crate::domain::plan::RakePlanItem;
use crate::domain::risk::{RiskAnnotation, RiskAssessment, RiskFeatures};
use crate::domain::types::{RiskFlag, TransportMode};
use chrono::{Datelike, NaiveDateTime};
use tracing::debug;

// ==========================================
// RiskModel - 风险模型接口
// ==========================================
// 外部可替换 (例如训练得到的模型),引擎只依赖该接口
pub trait RiskModel: Send + Sync {
    /// 对一组特征打分
    fn assess(&self, features: &RiskFeatures) -> RiskAssessment;
}

// ==========================================
// LogisticRiskModel - 固定系数逻辑回归
// ==========================================
pub struct LogisticRiskModel {
    coefficients: RiskCoefficients,
}

impl LogisticRiskModel {
    pub fn new(coefficients: RiskCoefficients) -> Self {
        Self { coefficients }
    }

    /// 线性得分 z = intercept + Σ w·x
    fn score(&self, f: &RiskFeatures) -> f64 {
        let c = &self.coefficients;
        c.intercept
            + c.distance_km * f.distance_km
            + c.transit_hours * f.transit_hours
            + c.priority * f.priority
            + c.weight_t * f.weight_t
            + c.congestion * f.congestion
            + c.historical_delay_pct * f.historical_delay_pct
            + c.hours_until_due * f.hours_until_due
            + c.mode_flag * f.mode_flag
            + c.season_factor * f.season_factor
    }

    /// 概率 → 风险等级
    fn classify(&self, probability: f64) -> RiskFlag {
        if probability < self.coefficients.medium_threshold {
            RiskFlag::Low
        } else if probability < self.coefficients.high_threshold {
            RiskFlag::Medium
        } else {
            RiskFlag::High
        }
    }
}

impl RiskModel for LogisticRiskModel {
    fn assess(&self, features: &RiskFeatures) -> RiskAssessment {
        let delay_probability = sigmoid(self.score(features));

        RiskAssessment {
            risk_flag: self.classify(delay_probability),
            cost_multiplier: 1.0 + delay_probability * self.coefficients.max_cost_uplift,
            delay_probability,
        }
    }
}

impl Default for LogisticRiskModel {
    fn default() -> Self {
        Self::new(RiskCoefficients::default())
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

// ==========================================
// 特征提取与批量标注
// ==========================================

/// 从配载明细提取风险特征
///
/// # 规则
/// - 拥堵系数按目的地查表,缺省取 default_congestion
/// - 季节因子按发车月份,季风月取 monsoon_season_factor
/// - hours_until_due 以计划时刻为起点,可为负
pub fn extract_features(
    item: &RakePlanItem,
    planned_at: NaiveDateTime,
    routing: &RoutingConfig,
    coefficients: &RiskCoefficients,
) -> RiskFeatures {
    let congestion = routing
        .destination_congestion
        .get(&item.destination)
        .copied()
        .unwrap_or(coefficients.default_congestion);

    let season_factor = if coefficients.monsoon_months.contains(&item.departure.month()) {
        coefficients.monsoon_season_factor
    } else {
        1.0
    };

    RiskFeatures {
        distance_km: item.distance_km,
        transit_hours: item.transit_hours as f64,
        priority: item.priority.rank() as f64,
        weight_t: item.quantity_t,
        congestion,
        historical_delay_pct: coefficients.historical_delay_pct_default,
        hours_until_due: (item.due_date - planned_at).num_minutes() as f64 / 60.0,
        mode_flag: match item.mode {
            TransportMode::Rail => 1.0,
            TransportMode::Road => 0.0,
        },
        season_factor,
    }
}

/// 为全部明细生成风险标注
pub fn annotate_items(
    model: &dyn RiskModel,
    items: &[RakePlanItem],
    planned_at: NaiveDateTime,
    routing: &RoutingConfig,
    coefficients: &RiskCoefficients,
) -> Vec<RiskAnnotation> {
    items
        .iter()
        .map(|item| {
            let features = extract_features(item, planned_at, routing, coefficients);
            let assessment = model.assess(&features);
            debug!(
                seq_no = item.seq_no,
                order_id = %item.order_id,
                risk_flag = %assessment.risk_flag,
                delay_probability = assessment.delay_probability,
                "风险标注"
            );
            RiskAnnotation {
                seq_no: item.seq_no,
                order_id: item.order_id.clone(),
                assessment,
            }
        })
        .collect()
}
