// ==========================================
// 铁路车皮配载系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含引擎逻辑,不含文件读写
// ==========================================

pub mod fleet;
pub mod model;
pub mod order;
pub mod plan;
pub mod risk;
pub mod types;

// 重导出核心类型
pub use fleet::{Platform, Rake, Wagon};
pub use model::{normalize_code, DroppedRow, InternalModel, PlanningConstraints};
pub use order::Order;
pub use plan::{
    AllocationExplanation, AllocationPlan, CostBreakdown, KpiSummary, OrderFulfillment,
    PlanReport, RakePlanItem, ReportLine, UnallocatedOrder,
};
pub use risk::{RiskAnnotation, RiskAssessment, RiskFeatures};
pub use types::{FulfillmentStatus, Priority, PreferredMode, RiskFlag, SlaStatus, TransportMode};
