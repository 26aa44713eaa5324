// ==========================================
// 铁路车皮配载系统 - 核心库
// ==========================================
// 系统定位: 决策支持系统 (配载方案供调度人工确认)
// 主流程: 订单记录 → 资源模型 → 排序 → 车皮配载 → 指标/风险标注
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 车队与费率
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    FulfillmentStatus, Priority, PreferredMode, RiskFlag, SlaStatus, TransportMode,
};

// 领域实体
pub use domain::{
    AllocationPlan, InternalModel, KpiSummary, Order, OrderFulfillment, Platform, PlanReport,
    Rake, RakePlanItem, UnallocatedOrder, Wagon,
};

// 配置
pub use config::{ConfigManager, PlanningConfig};

// 引擎
pub use engine::{
    CostSlaEvaluator, KpiAggregator, OrderSequencer, PlanError, PlanOrchestrator, RakeAllocator,
    ResourceModelBuilder,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "铁路车皮配载系统";
