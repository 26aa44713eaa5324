// ==========================================
// 铁路车皮配载系统 - 指标汇总引擎
// ==========================================
// 职责: 将全部配载明细汇总为方案指标
// 输入: 配载明细 + 订单履约 + 不可交付余量
// 输出: KpiSummary (未取整)
// 红线: 只读汇总,不修改明细
// ==========================================

use crate::config::KpiParameters;
use crate::domain::plan::{KpiSummary, OrderFulfillment, RakePlanItem, UnallocatedOrder};
use crate::domain::types::{FulfillmentStatus, SlaStatus};
use std::collections::BTreeSet;

// ==========================================
// KpiAggregator - 指标汇总引擎
// ==========================================
pub struct KpiAggregator {
    params: KpiParameters,
}

impl KpiAggregator {
    pub fn new(params: KpiParameters) -> Self {
        Self { params }
    }

    /// 汇总方案指标
    ///
    /// # 规则
    /// - 平均车列利用率只统计铁路明细
    /// - baseline_cost = total_cost × baseline_multiplier
    /// - demurrage_savings = demurrage_multiplier × Σ(车列利用率 ≥ 阈值的明细空载运费)
    ///
    /// # 参数
    /// - `total_orders`: 参与配载的有效订单数
    pub fn summarize(
        &self,
        items: &[RakePlanItem],
        fulfillments: &[OrderFulfillment],
        unallocated: &[UnallocatedOrder],
        total_orders: usize,
    ) -> KpiSummary {
        let rail_items: Vec<&RakePlanItem> = items.iter().filter(|i| i.is_rail()).collect();

        let rakes_used = items
            .iter()
            .filter_map(|i| i.rake_id.as_deref())
            .collect::<BTreeSet<_>>()
            .len();

        let avg_rake_utilization_pct = if rail_items.is_empty() {
            0.0
        } else {
            rail_items.iter().map(|i| i.rake_utilization_pct).sum::<f64>() / rail_items.len() as f64
        };

        let total_cost: f64 = items.iter().map(|i| i.cost.total).sum();
        let baseline_cost = total_cost * self.params.baseline_multiplier;
        let high_util_idle: f64 = items
            .iter()
            .filter(|i| i.rake_utilization_pct >= self.params.high_utilization_pct)
            .map(|i| i.cost.idle_freight)
            .sum();

        let count_sla = |status: SlaStatus| items.iter().filter(|i| i.sla_status == status).count();

        KpiSummary {
            total_orders,
            total_allocations: items.len(),
            rail_allocations: rail_items.len(),
            road_allocations: items.len() - rail_items.len(),
            undeliverable_orders: fulfillments
                .iter()
                .filter(|f| f.status == FulfillmentStatus::Undeliverable)
                .count(),
            rakes_used,
            rail_tonnage_t: rail_items.iter().map(|i| i.quantity_t).sum(),
            road_tonnage_t: items.iter().filter(|i| !i.is_rail()).map(|i| i.quantity_t).sum(),
            undelivered_tonnage_t: unallocated.iter().map(|u| u.remaining_t).sum(),
            avg_rake_utilization_pct,
            on_time_count: count_sla(SlaStatus::OnTime),
            at_risk_count: count_sla(SlaStatus::AtRisk),
            late_count: count_sla(SlaStatus::Late),
            total_cost,
            baseline_cost,
            estimated_savings: baseline_cost - total_cost,
            demurrage_savings: self.params.demurrage_multiplier * high_util_idle,
        }
    }
}

impl Default for KpiAggregator {
    fn default() -> Self {
        Self::new(KpiParameters::default())
    }
}
