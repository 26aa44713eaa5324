// ==========================================
// 铁路车皮配载系统 - 配载说明生成器
// ==========================================
// 职责: 由配载事实生成摘要句与原因句
// 红线: 只描述决策,不反向影响配载
// ==========================================

use crate::domain::fleet::{Platform, Rake, Wagon};
use crate::domain::order::Order;
use crate::domain::plan::AllocationExplanation;
use crate::domain::types::Priority;

/// 缺省车列高利用率阈值 (%)
const DEFAULT_HIGH_RAKE_UTILIZATION_PCT: f64 = 85.0;

// ==========================================
// ExplanationGenerator - 配载说明生成器
// ==========================================
pub struct ExplanationGenerator {
    high_rake_utilization_pct: f64,
}

impl ExplanationGenerator {
    /// # 参数
    /// - `high_rake_utilization_pct`: 车列利用率达到该值时在原因中说明
    pub fn new(high_rake_utilization_pct: f64) -> Self {
        Self {
            high_rake_utilization_pct,
        }
    }

    /// 铁路配载说明
    ///
    /// 原因规则（按顺序追加）:
    /// 1) High 优先级
    /// 2) 车皮利用率与吊车能力（总是追加）
    /// 3) 车列利用率 ≥ 高利用率阈值 (缺省 85%)
    /// 4) 无延误时说明满足 SLA
    /// 5) 以上均不成立时回落为 "optimal capacity utilization"
    #[allow(clippy::too_many_arguments)]
    pub fn explain_rail(
        &self,
        order: &Order,
        quantity_t: f64,
        rake: &Rake,
        wagon: &Wagon,
        platform: &Platform,
        wagon_utilization_pct: f64,
        rake_utilization_pct: f64,
        days_late: i64,
    ) -> AllocationExplanation {
        let mut reasons = Vec::new();

        if order.priority == Priority::High {
            reasons.push("high-priority order served first".to_string());
        }
        reasons.push(format!(
            "wagon utilization {:.1}% within the {:.0}t crane limit of {}",
            wagon_utilization_pct, platform.crane_capacity_t, platform.crane_id
        ));
        if rake_utilization_pct >= self.high_rake_utilization_pct {
            reasons.push(format!("rake utilization at {:.1}%", rake_utilization_pct));
        }
        if days_late == 0 {
            reasons.push("meets SLA".to_string());
        }

        let sentence = format!(
            "ORDER #{} ({:.1}t of {} for {} to {}) allocated to WAGON {} of RAKE {} at PLATFORM {} ({}).",
            order.order_id,
            quantity_t,
            display_product(order),
            order.customer_name,
            order.destination,
            wagon.wagon_id,
            rake.rake_id,
            platform.platform_id,
            platform.loading_point,
        );

        AllocationExplanation {
            sentence,
            reason: join_reasons(reasons),
        }
    }

    /// 公路配载说明
    ///
    /// # 参数
    /// - `forced`: 订单仅接受铁路,因无运力被强制转公路
    pub fn explain_road(
        &self,
        order: &Order,
        quantity_t: f64,
        days_late: i64,
        forced: bool,
    ) -> AllocationExplanation {
        let mut reasons = Vec::new();

        if forced {
            reasons.push(format!(
                "no rail slot left and road used as last resort despite preferred mode {}",
                order.preferred_mode
            ));
        } else {
            reasons.push(format!(
                "no feasible rail slot, diverted to road (preferred mode {})",
                order.preferred_mode
            ));
        }
        if order.priority == Priority::High {
            reasons.push("high-priority order kept moving".to_string());
        }
        if days_late == 0 {
            reasons.push("meets SLA".to_string());
        }

        let sentence = format!(
            "ORDER #{} ({:.1}t of {} for {} to {}) diverted to ROAD.",
            order.order_id,
            quantity_t,
            display_product(order),
            order.customer_name,
            order.destination,
        );

        AllocationExplanation {
            sentence,
            reason: join_reasons(reasons),
        }
    }
}

impl Default for ExplanationGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_HIGH_RAKE_UTILIZATION_PCT)
    }
}

fn display_product(order: &Order) -> &str {
    if !order.material_name.is_empty() {
        &order.material_name
    } else if !order.product_type.is_empty() {
        &order.product_type
    } else {
        "steel"
    }
}

/// 拼接原因句: 首字母大写, 句号结尾
fn join_reasons(reasons: Vec<String>) -> String {
    if reasons.is_empty() {
        return "Optimal capacity utilization.".to_string();
    }

    let joined = reasons.join("; ");
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => "Optimal capacity utilization.".to_string(),
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::PreferredMode;
    use chrono::NaiveDate;

    fn order(priority: Priority) -> Order {
        Order {
            order_id: "ORD-7".to_string(),
            customer_id: "C1".to_string(),
            customer_name: "Acme Steel".to_string(),
            material_id: "M1".to_string(),
            material_name: "HR Coil".to_string(),
            product_type: "HR_COIL".to_string(),
            destination: "DELHI".to_string(),
            quantity_t: 40.0,
            distance_km: 1250.0,
            priority,
            due_date: NaiveDate::from_ymd_opt(2026, 3, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            preferred_mode: PreferredMode::Rail,
            penalty_rate_per_day: 600.0,
        }
    }

    fn fleet() -> (Rake, Wagon, Platform) {
        (
            Rake {
                rake_id: "RAKE-01".to_string(),
                wagon_count: 10,
                total_capacity_t: 590.0,
                home_location: "BOKARO".to_string(),
            },
            Wagon {
                wagon_id: "RAKE-01-W01".to_string(),
                rake_id: "RAKE-01".to_string(),
                index: 1,
                max_capacity_t: 59.0,
            },
            Platform {
                platform_id: "PLT-1".to_string(),
                loading_point: "LP-A".to_string(),
                crane_id: "CRN-1".to_string(),
                crane_capacity_t: 30.0,
            },
        )
    }

    #[test]
    fn test_rail_explanation_all_rules() {
        let generator = ExplanationGenerator::default();
        let (rake, wagon, platform) = fleet();
        let exp = generator.explain_rail(
            &order(Priority::High),
            30.0,
            &rake,
            &wagon,
            &platform,
            50.8,
            90.0,
            0,
        );

        assert!(exp.sentence.starts_with("ORDER #ORD-7"));
        assert!(exp.sentence.contains("allocated to WAGON RAKE-01-W01 of RAKE RAKE-01"));
        assert!(exp.reason.starts_with("High-priority order"));
        assert!(exp.reason.contains("wagon utilization 50.8%"));
        assert!(exp.reason.contains("30t crane limit"));
        assert!(exp.reason.contains("rake utilization at 90.0%"));
        assert!(exp.reason.ends_with("meets SLA."));
    }

    #[test]
    fn test_rail_explanation_minimal() {
        let generator = ExplanationGenerator::default();
        let (rake, wagon, platform) = fleet();
        let exp = generator.explain_rail(
            &order(Priority::Low),
            10.0,
            &rake,
            &wagon,
            &platform,
            16.9,
            20.0,
            2,
        );

        assert!(exp.reason.starts_with("Wagon utilization 16.9%"));
        assert!(!exp.reason.contains("rake utilization"));
        assert!(!exp.reason.contains("meets SLA"));
    }

    #[test]
    fn test_road_explanation() {
        let generator = ExplanationGenerator::default();
        let exp = generator.explain_road(&order(Priority::Medium), 40.0, 0, true);
        assert!(exp.sentence.contains("diverted to ROAD"));
        assert!(exp.reason.contains("last resort"));
    }

    #[test]
    fn test_join_reasons_fallback() {
        assert_eq!(join_reasons(vec![]), "Optimal capacity utilization.");
    }
}
