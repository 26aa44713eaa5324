// ==========================================
// 铁路车皮配载系统 - 配载编排器
// ==========================================
// 用途: 协调各引擎的执行顺序
// 流程: 资源模型 → 订单排序 → 车皮配载 → (空方案兜底) → 指标汇总 → 风险标注
// 红线: 单次计算独占配载上下文,编排器本身不持有可变状态
// ==========================================

use crate::config::PlanningConfig;
use crate::domain::model::InternalModel;
use crate::domain::plan::AllocationPlan;
use crate::engine::allocator::RakeAllocator;
use crate::engine::cost_evaluator::CostSlaEvaluator;
use crate::engine::error::PlanResult;
use crate::engine::explanation::ExplanationGenerator;
use crate::engine::kpi::KpiAggregator;
use crate::engine::model_builder::ResourceModelBuilder;
use crate::engine::risk::{annotate_items, LogisticRiskModel, RiskModel};
use crate::engine::sequencer::OrderSequencer;
use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// PlanOrchestrator - 配载编排器
// ==========================================
pub struct PlanOrchestrator {
    config: PlanningConfig,
    sequencer: OrderSequencer,
    allocator: RakeAllocator,
    kpi: KpiAggregator,
    risk_model: Box<dyn RiskModel>,
}

impl PlanOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - `config`: 配置 (创建时校验)
    ///
    /// # 返回
    /// - Err(PlanError::Config): 配置校验失败
    pub fn new(config: PlanningConfig) -> PlanResult<Self> {
        config.validate()?;

        let allocator = RakeAllocator::new(
            CostSlaEvaluator::new(config.costs.clone()),
            ExplanationGenerator::new(config.kpi.high_utilization_pct),
        );

        Ok(Self {
            sequencer: OrderSequencer::new(),
            allocator,
            kpi: KpiAggregator::new(config.kpi.clone()),
            risk_model: Box::new(LogisticRiskModel::new(config.risk.clone())),
            config,
        })
    }

    /// 替换风险模型
    pub fn with_risk_model(mut self, risk_model: Box<dyn RiskModel>) -> Self {
        self.risk_model = risk_model;
        self
    }

    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &CostSlaEvaluator {
        self.allocator.evaluator()
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 由原始订单记录生成配载方案
    ///
    /// # 参数
    /// - `raw`: 原始订单记录 (JSON 数组)
    /// - `planned_at`: 计划时刻
    ///
    /// # 返回
    /// - Err(PlanError::MalformedInput): 输入不是记录数组
    pub fn plan(&self, raw: &Value, planned_at: NaiveDateTime) -> PlanResult<AllocationPlan> {
        let model = ResourceModelBuilder::new(&self.config).build(raw, planned_at)?;
        Ok(self.plan_model(&model, planned_at))
    }

    /// 由已构建的模型生成配载方案
    #[instrument(skip(self, model), fields(orders = model.orders.len()))]
    pub fn plan_model(&self, model: &InternalModel, planned_at: NaiveDateTime) -> AllocationPlan {
        let plan_id = Uuid::new_v4().to_string();
        info!(plan_id = %plan_id, %planned_at, "开始执行配载流程");

        // ==========================================
        // 步骤1: 订单排序
        // ==========================================
        let sequenced = self.sequencer.sort(model.orders.clone());
        debug!(
            first = ?sequenced.first().map(|o| o.order_id.as_str()),
            "步骤1: 订单排序完成"
        );

        // ==========================================
        // 步骤2: 车皮配载
        // ==========================================
        let mut outcome = self.allocator.allocate(model, &sequenced, planned_at);

        // ==========================================
        // 步骤3: 空方案兜底 (有效订单却无任何配载)
        // ==========================================
        let fallback_applied = !sequenced.is_empty() && outcome.items.is_empty();
        if fallback_applied {
            warn!(
                plan_id = %plan_id,
                orders = sequenced.len(),
                "配载结果为空, 改用全公路兜底方案"
            );
            outcome = self.allocator.allocate_all_road(&sequenced, planned_at);
        }

        // ==========================================
        // 步骤4: 指标汇总
        // ==========================================
        let kpi = self.kpi.summarize(
            &outcome.items,
            &outcome.fulfillments,
            &outcome.unallocated,
            sequenced.len(),
        );

        // ==========================================
        // 步骤5: 风险标注
        // ==========================================
        let risk_annotations = annotate_items(
            self.risk_model.as_ref(),
            &outcome.items,
            planned_at,
            &self.config.routing,
            &self.config.risk,
        );

        info!(
            plan_id = %plan_id,
            allocations = kpi.total_allocations,
            rail = kpi.rail_allocations,
            road = kpi.road_allocations,
            undeliverable = kpi.undeliverable_orders,
            total_cost = kpi.total_cost,
            fallback_applied,
            "配载流程完成"
        );

        AllocationPlan {
            plan_id,
            planned_at,
            items: outcome.items,
            unallocated: outcome.unallocated,
            fulfillments: outcome.fulfillments,
            kpi,
            risk_annotations,
            dropped_rows: model.dropped_rows.clone(),
            fallback_applied,
        }
    }
}
