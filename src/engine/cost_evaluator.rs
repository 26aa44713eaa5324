// ==========================================
// 铁路车皮配载系统 - 成本与 SLA 评估引擎
// ==========================================
// 职责: 单条配载的时效、延误、利用率、成本计算
// 输入: 订单 + 配载吨位 + 车皮/车列容量 + 计划时刻
// 输出: Evaluation (未取整)
// 红线: 纯函数,不依赖配载以外的任何状态
// ==========================================

use crate::config::CostRates;
use crate::domain::order::Order;
use crate::domain::plan::{CostBreakdown, RakePlanItem};
use crate::domain::types::{SlaStatus, TransportMode};
use chrono::{Duration, NaiveDateTime, NaiveTime};

const SECONDS_PER_DAY: i64 = 86_400;

// ==========================================
// Timing - 发车/到达时刻
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub transit_hours: i64,
}

// ==========================================
// Evaluation - 单条配载评估结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub timing: Timing,
    pub days_late: i64,
    pub sla_status: SlaStatus,
    pub wagon_utilization_pct: f64,
    pub rake_utilization_pct: f64,
    pub cost: CostBreakdown,
}

// ==========================================
// CostSlaEvaluator - 成本与 SLA 评估引擎
// ==========================================
pub struct CostSlaEvaluator {
    rates: CostRates,
}

impl CostSlaEvaluator {
    pub fn new(rates: CostRates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &CostRates {
        &self.rates
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 评估铁路配载
    ///
    /// # 参数
    /// - `order`: 订单
    /// - `quantity_t`: 本次配载吨位
    /// - `wagon_capacity_t`: 车皮最大载重
    /// - `rake_load_after_t`: 含本次配载的车列累计吨位
    /// - `rake_capacity_t`: 车列总载重
    /// - `planned_at`: 计划时刻
    pub fn evaluate_rail(
        &self,
        order: &Order,
        quantity_t: f64,
        wagon_capacity_t: f64,
        rake_load_after_t: f64,
        rake_capacity_t: f64,
        planned_at: NaiveDateTime,
    ) -> Evaluation {
        let timing = self.rail_timing(planned_at, order.distance_km);
        let days_late = days_late(timing.arrival, order.due_date);
        let wagon_utilization_pct = percentage(quantity_t, wagon_capacity_t);
        let rake_utilization_pct = percentage(rake_load_after_t, rake_capacity_t);
        let cost = self.rail_cost(
            quantity_t,
            order.distance_km,
            days_late,
            order.penalty_rate_per_day,
            rake_utilization_pct,
        );

        Evaluation {
            timing,
            days_late,
            sla_status: SlaStatus::from_days_late(days_late),
            wagon_utilization_pct,
            rake_utilization_pct,
            cost,
        }
    }

    /// 评估公路配载（无车皮/车列利用率）
    pub fn evaluate_road(
        &self,
        order: &Order,
        quantity_t: f64,
        planned_at: NaiveDateTime,
    ) -> Evaluation {
        let timing = self.road_timing(planned_at);
        let days_late = days_late(timing.arrival, order.due_date);

        Evaluation {
            timing,
            days_late,
            sla_status: SlaStatus::from_days_late(days_late),
            wagon_utilization_pct: 0.0,
            rake_utilization_pct: 0.0,
            cost: self.road_cost(quantity_t, order.distance_km),
        }
    }

    /// 由已提交明细自身字段重算成本
    ///
    /// 结果应与明细中存储的成本完全一致
    pub fn recompute_cost(&self, item: &RakePlanItem, order: &Order) -> CostBreakdown {
        match item.mode {
            TransportMode::Rail => self.rail_cost(
                item.quantity_t,
                item.distance_km,
                item.days_late,
                order.penalty_rate_per_day,
                item.rake_utilization_pct,
            ),
            TransportMode::Road => self.road_cost(item.quantity_t, item.distance_km),
        }
    }

    // ==========================================
    // 时效计算
    // ==========================================

    /// 铁路: 计划日固定时刻发车, 在途 ceil(运距 / 速度) 小时
    pub fn rail_timing(&self, planned_at: NaiveDateTime, distance_km: f64) -> Timing {
        let departure_time = NaiveTime::from_hms_opt(self.rates.rail_departure_hour, 0, 0)
            .unwrap_or(NaiveTime::MIN);
        let departure = planned_at.date().and_time(departure_time);
        let transit_hours = (distance_km / self.rates.rail_speed_kmph).ceil().max(0.0) as i64;

        Timing {
            departure,
            arrival: departure + Duration::hours(transit_hours),
            transit_hours,
        }
    }

    /// 公路: 计划时刻 + N 小时发车, 在途固定天数
    pub fn road_timing(&self, planned_at: NaiveDateTime) -> Timing {
        let departure = planned_at + Duration::hours(self.rates.road_departure_lead_hours);
        let transit_hours = self.rates.road_transit_days * 24;

        Timing {
            departure,
            arrival: departure + Duration::hours(transit_hours),
            transit_hours,
        }
    }

    // ==========================================
    // 成本计算
    // ==========================================

    /// 铁路成本
    ///
    /// - transport = 吨位 × 运距 × 铁路费率
    /// - loading = 吨位 × 装车费率
    /// - penalty = 延误天数 × 罚金费率 × 吨位
    /// - idle_freight = 车列利用率低于阈值时 transport × 空载比例
    pub fn rail_cost(
        &self,
        quantity_t: f64,
        distance_km: f64,
        days_late: i64,
        penalty_rate_per_day: f64,
        rake_utilization_pct: f64,
    ) -> CostBreakdown {
        let transport = quantity_t * distance_km * self.rates.rail_rate_per_tkm;
        let loading = quantity_t * self.rates.loading_rate_per_t;
        let penalty = if days_late > 0 {
            days_late as f64 * penalty_rate_per_day * quantity_t
        } else {
            0.0
        };
        let idle_freight = if rake_utilization_pct < self.rates.idle_utilization_threshold_pct {
            transport * self.rates.idle_freight_ratio
        } else {
            0.0
        };

        CostBreakdown {
            transport,
            loading,
            penalty,
            idle_freight,
            total: transport + loading + penalty + idle_freight,
        }
    }

    /// 公路成本（不计罚金与空载运费）
    pub fn road_cost(&self, quantity_t: f64, distance_km: f64) -> CostBreakdown {
        let transport = quantity_t * distance_km * self.rates.road_rate_per_tkm;
        let loading = quantity_t * self.rates.loading_rate_per_t;

        CostBreakdown {
            transport,
            loading,
            penalty: 0.0,
            idle_freight: 0.0,
            total: transport + loading,
        }
    }
}

/// 延误天数 = max(0, ceil((到达 - 交货期) / 1 天))
pub fn days_late(arrival: NaiveDateTime, due_date: NaiveDateTime) -> i64 {
    let late_seconds = (arrival - due_date).num_seconds();
    if late_seconds <= 0 {
        0
    } else {
        (late_seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
    }
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    part / whole * 100.0
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Priority, PreferredMode};
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn test_order(distance_km: f64, due: NaiveDateTime) -> Order {
        Order {
            order_id: "O1".to_string(),
            customer_id: "C1".to_string(),
            customer_name: "Customer".to_string(),
            material_id: "M1".to_string(),
            material_name: "HR Coil".to_string(),
            product_type: "HR_COIL".to_string(),
            destination: "DELHI".to_string(),
            quantity_t: 40.0,
            distance_km,
            priority: Priority::Medium,
            due_date: due,
            preferred_mode: PreferredMode::Rail,
            penalty_rate_per_day: 600.0,
        }
    }

    #[test]
    fn test_rail_timing() {
        let evaluator = CostSlaEvaluator::new(CostRates::default());
        let timing = evaluator.rail_timing(at(2, 8), 1250.0);
        assert_eq!(timing.departure, at(2, 10));
        assert_eq!(timing.transit_hours, 25);
        assert_eq!(timing.arrival, at(3, 11));

        // 运距不整除时向上取整
        assert_eq!(evaluator.rail_timing(at(2, 8), 1251.0).transit_hours, 26);
    }

    #[test]
    fn test_road_timing() {
        let evaluator = CostSlaEvaluator::new(CostRates::default());
        let timing = evaluator.road_timing(at(2, 8));
        assert_eq!(timing.departure, at(2, 10));
        assert_eq!(timing.arrival, at(4, 10));
        assert_eq!(timing.transit_hours, 48);
    }

    #[test]
    fn test_days_late() {
        assert_eq!(days_late(at(3, 11), at(5, 0)), 0);
        assert_eq!(days_late(at(5, 0), at(5, 0)), 0);
        assert_eq!(days_late(at(5, 1), at(5, 0)), 1);
        assert_eq!(days_late(at(6, 0), at(5, 0)), 1);
        assert_eq!(days_late(at(6, 1), at(5, 0)), 2);
    }

    #[test]
    fn test_rail_cost_on_time_high_utilization() {
        let evaluator = CostSlaEvaluator::new(CostRates::default());
        let cost = evaluator.rail_cost(40.0, 1250.0, 0, 600.0, 90.0);
        assert_eq!(cost.transport, 70_000.0);
        assert_eq!(cost.loading, 2_000.0);
        assert_eq!(cost.penalty, 0.0);
        assert_eq!(cost.idle_freight, 0.0);
        assert_eq!(cost.total, 72_000.0);
    }

    #[test]
    fn test_rail_cost_late_low_utilization() {
        let evaluator = CostSlaEvaluator::new(CostRates::default());
        let cost = evaluator.rail_cost(10.0, 100.0, 2, 600.0, 50.0);
        assert_eq!(cost.transport, 1_400.0);
        assert_eq!(cost.loading, 500.0);
        assert_eq!(cost.penalty, 12_000.0);
        assert!((cost.idle_freight - 140.0).abs() < 1e-9);
        assert!((cost.total - 14_040.0).abs() < 1e-9);
    }

    #[test]
    fn test_road_cost() {
        let evaluator = CostSlaEvaluator::new(CostRates::default());
        let cost = evaluator.road_cost(20.0, 500.0);
        assert_eq!(cost.transport, 18_000.0);
        assert_eq!(cost.loading, 1_000.0);
        assert_eq!(cost.penalty, 0.0);
        assert_eq!(cost.total, 19_000.0);
    }

    #[test]
    fn test_evaluate_rail_status() {
        let evaluator = CostSlaEvaluator::new(CostRates::default());

        // 到达 3 日 11:00, 交货期 3 日 00:00 → 晚 11 小时 → 1 天 → At-Risk
        let order = test_order(1250.0, at(3, 0));
        let eval = evaluator.evaluate_rail(&order, 30.0, 59.0, 30.0, 590.0, at(2, 8));
        assert_eq!(eval.days_late, 1);
        assert_eq!(eval.sla_status, SlaStatus::AtRisk);
        assert!((eval.wagon_utilization_pct - 50.847).abs() < 0.01);
        assert!((eval.rake_utilization_pct - 5.085).abs() < 0.01);
        assert_eq!(eval.cost.penalty, 600.0 * 30.0);

        // 交货期充裕 → On-time
        let order = test_order(1250.0, at(5, 0));
        let eval = evaluator.evaluate_rail(&order, 30.0, 59.0, 30.0, 590.0, at(2, 8));
        assert_eq!(eval.sla_status, SlaStatus::OnTime);
    }

    #[test]
    fn test_evaluate_road_late() {
        let evaluator = CostSlaEvaluator::new(CostRates::default());
        let order = test_order(500.0, at(2, 0));
        let eval = evaluator.evaluate_road(&order, 20.0, at(2, 8));
        // 到达 4 日 10:00, 交货期 2 日 00:00 → 3 天
        assert_eq!(eval.days_late, 3);
        assert_eq!(eval.sla_status, SlaStatus::Late);
        assert_eq!(eval.cost.penalty, 0.0);
        assert_eq!(eval.wagon_utilization_pct, 0.0);
    }
}
