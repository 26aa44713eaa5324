// ==========================================
// 铁路车皮配载系统 - 引擎层
// ==========================================
// 职责: 实现配载业务规则
// 红线: 引擎不做文件读写, 每条配载必须附带说明
// ==========================================

pub mod allocator;
pub mod cost_evaluator;
pub mod error;
pub mod explanation;
pub mod kpi;
pub mod model_builder;
pub mod orchestrator;
pub mod risk;
pub mod sequencer;

// 重导出核心引擎
pub use allocator::{AllocationOutcome, AllocatorContext, RakeAllocator, CAPACITY_EPSILON};
pub use cost_evaluator::{days_late, CostSlaEvaluator, Evaluation, Timing};
pub use error::{PlanError, PlanResult};
pub use explanation::ExplanationGenerator;
pub use kpi::KpiAggregator;
pub use model_builder::ResourceModelBuilder;
pub use orchestrator::PlanOrchestrator;
pub use risk::{annotate_items, extract_features, LogisticRiskModel, RiskModel};
pub use sequencer::OrderSequencer;
