// ==========================================
// 铁路车皮配载系统 - 配载方案领域模型
// ==========================================
// 红线: RakePlanItem 由配载引擎创建后不可修改
// 红线: 内部保留未取整数值,取整只发生在报表视图
// ==========================================

use crate::domain::model::DroppedRow;
use crate::domain::risk::RiskAnnotation;
use crate::domain::types::{FulfillmentStatus, Priority, SlaStatus, TransportMode};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// CostBreakdown - 成本构成
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub transport: f64,    // 运费
    pub loading: f64,      // 装车费
    pub penalty: f64,      // 延误罚金
    pub idle_freight: f64, // 空载运费 (低利用率)
    pub total: f64,        // 合计
}

impl CostBreakdown {
    /// 取整到元（报表展示用）
    pub fn rounded(&self) -> Self {
        Self {
            transport: self.transport.round(),
            loading: self.loading.round(),
            penalty: self.penalty.round(),
            idle_freight: self.idle_freight.round(),
            total: self.total.round(),
        }
    }
}

// ==========================================
// AllocationExplanation - 配载说明
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationExplanation {
    pub sentence: String, // 摘要句: ORDER #X ... allocated to WAGON Y of RAKE Z
    pub reason: String,   // 原因句
}

// ==========================================
// RakePlanItem - 配载明细
// ==========================================
// 一个 (订单, 车皮) 组合一条; 公路明细无车列/车皮/站台
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RakePlanItem {
    // ===== 序号与订单 =====
    pub seq_no: u32,
    pub order_id: String,
    pub customer_name: String,
    pub destination: String,
    pub product_type: String,
    pub priority: Priority,

    // ===== 配载落位 =====
    pub mode: TransportMode,
    pub quantity_t: f64,
    pub rake_id: Option<String>,
    pub wagon_id: Option<String>,
    pub wagon_index: Option<u32>,
    pub platform_id: Option<String>,
    pub loading_point: Option<String>,
    pub crane_id: Option<String>,
    pub forced_road: bool, // 仅铁路订单被强制转公路

    // ===== 利用率 =====
    pub wagon_utilization_pct: f64,
    pub rake_utilization_pct: f64,

    // ===== 时效 =====
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub due_date: NaiveDateTime,
    pub transit_hours: i64,
    pub distance_km: f64,
    pub days_late: i64,
    pub sla_status: SlaStatus,

    // ===== 成本与说明 =====
    pub cost: CostBreakdown,
    pub explanation: AllocationExplanation,
}

impl RakePlanItem {
    /// 是否铁路明细
    pub fn is_rail(&self) -> bool {
        self.mode == TransportMode::Rail
    }
}

// ==========================================
// UnallocatedOrder - 不可交付余量
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnallocatedOrder {
    pub order_id: String,
    pub remaining_t: f64,
    pub reason: String,
}

// ==========================================
// OrderFulfillment - 订单履约汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFulfillment {
    pub order_id: String,
    pub ordered_t: f64,
    pub rail_t: f64,
    pub road_t: f64,
    pub undelivered_t: f64,
    pub rail_percent: f64,
    pub allocation_count: usize,
    pub status: FulfillmentStatus,
}

impl OrderFulfillment {
    /// 是否降级（含公路或不可交付部分）
    pub fn is_degraded(&self) -> bool {
        matches!(
            self.status,
            FulfillmentStatus::RoadAllocated
                | FulfillmentStatus::Mixed
                | FulfillmentStatus::Undeliverable
        )
    }
}

// ==========================================
// KpiSummary - 方案指标汇总
// ==========================================
// 说明: baseline_cost / demurrage_savings 为启发式估算,不是独立可验证的真值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    // ===== 计数 =====
    pub total_orders: usize,
    pub total_allocations: usize,
    pub rail_allocations: usize,
    pub road_allocations: usize,
    pub undeliverable_orders: usize,
    pub rakes_used: usize,

    // ===== 吨位 =====
    pub rail_tonnage_t: f64,
    pub road_tonnage_t: f64,
    pub undelivered_tonnage_t: f64,

    // ===== 利用率 =====
    pub avg_rake_utilization_pct: f64,

    // ===== SLA =====
    pub on_time_count: usize,
    pub at_risk_count: usize,
    pub late_count: usize,

    // ===== 成本 =====
    pub total_cost: f64,
    pub baseline_cost: f64,
    pub estimated_savings: f64,
    pub demurrage_savings: f64,
}

// ==========================================
// AllocationPlan - 配载方案
// ==========================================
// 红线: 下游 (报表/界面) 只读,不可修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub plan_id: String,
    pub planned_at: NaiveDateTime,
    pub items: Vec<RakePlanItem>,
    pub unallocated: Vec<UnallocatedOrder>,
    pub fulfillments: Vec<OrderFulfillment>,
    pub kpi: KpiSummary,
    pub risk_annotations: Vec<RiskAnnotation>,
    pub dropped_rows: Vec<DroppedRow>,
    pub fallback_applied: bool, // 是否触发全公路兜底
}

impl AllocationPlan {
    /// 每条明细的 (摘要句, 原因句)
    pub fn explanations(&self) -> Vec<(&str, &str)> {
        self.items
            .iter()
            .map(|item| (item.explanation.sentence.as_str(), item.explanation.reason.as_str()))
            .collect()
    }

    /// 某订单的全部明细
    pub fn items_for_order<'a>(
        &'a self,
        order_id: &'a str,
    ) -> impl Iterator<Item = &'a RakePlanItem> + 'a {
        self.items.iter().filter(move |item| item.order_id == order_id)
    }

    /// 某订单的履约汇总
    pub fn fulfillment(&self, order_id: &str) -> Option<&OrderFulfillment> {
        self.fulfillments.iter().find(|f| f.order_id == order_id)
    }

    /// 是否为降级方案（存在公路分流、不可交付或兜底）
    pub fn is_degraded(&self) -> bool {
        self.fallback_applied || self.fulfillments.iter().any(|f| f.is_degraded())
    }

    /// 生成报表视图（金额取整到元,百分比保留一位小数）
    pub fn to_report(&self) -> PlanReport {
        PlanReport {
            plan_id: self.plan_id.clone(),
            planned_at: self.planned_at,
            fallback_applied: self.fallback_applied,
            allocations: self
                .items
                .iter()
                .map(|item| ReportLine {
                    seq_no: item.seq_no,
                    order_id: item.order_id.clone(),
                    destination: item.destination.clone(),
                    mode: item.mode,
                    quantity_t: round1(item.quantity_t),
                    rake_id: item.rake_id.clone(),
                    wagon_id: item.wagon_id.clone(),
                    platform_id: item.platform_id.clone(),
                    wagon_utilization_pct: round1(item.wagon_utilization_pct),
                    rake_utilization_pct: round1(item.rake_utilization_pct),
                    sla_status: item.sla_status,
                    days_late: item.days_late,
                    cost: item.cost.rounded(),
                    sentence: item.explanation.sentence.clone(),
                    reason: item.explanation.reason.clone(),
                })
                .collect(),
            unallocated: self.unallocated.clone(),
            fulfillments: self.fulfillments.clone(),
            kpi: KpiSummary {
                avg_rake_utilization_pct: round1(self.kpi.avg_rake_utilization_pct),
                rail_tonnage_t: round1(self.kpi.rail_tonnage_t),
                road_tonnage_t: round1(self.kpi.road_tonnage_t),
                undelivered_tonnage_t: round1(self.kpi.undelivered_tonnage_t),
                total_cost: self.kpi.total_cost.round(),
                baseline_cost: self.kpi.baseline_cost.round(),
                estimated_savings: self.kpi.estimated_savings.round(),
                demurrage_savings: self.kpi.demurrage_savings.round(),
                ..self.kpi.clone()
            },
            risk_annotations: self.risk_annotations.clone(),
            dropped_rows: self.dropped_rows.clone(),
        }
    }
}

// ==========================================
// PlanReport - 报表视图 (已取整)
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub plan_id: String,
    pub planned_at: NaiveDateTime,
    pub fallback_applied: bool,
    pub allocations: Vec<ReportLine>,
    pub unallocated: Vec<UnallocatedOrder>,
    pub fulfillments: Vec<OrderFulfillment>,
    pub kpi: KpiSummary,
    pub risk_annotations: Vec<RiskAnnotation>,
    pub dropped_rows: Vec<DroppedRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportLine {
    pub seq_no: u32,
    pub order_id: String,
    pub destination: String,
    pub mode: TransportMode,
    pub quantity_t: f64,
    pub rake_id: Option<String>,
    pub wagon_id: Option<String>,
    pub platform_id: Option<String>,
    pub wagon_utilization_pct: f64,
    pub rake_utilization_pct: f64,
    pub sla_status: SlaStatus,
    pub days_late: i64,
    pub cost: CostBreakdown,
    pub sentence: String,
    pub reason: String,
}

/// 保留一位小数
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
