// ==========================================
// 铁路车皮配载系统 - 订单领域模型
// ==========================================
// 红线: 订单构建后不可变,剩余量由配载引擎单独维护
// ==========================================

use crate::domain::types::{Priority, PreferredMode};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Order - 客户订单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // ===== 主键 =====
    pub order_id: String, // 订单号

    // ===== 客户与物料 =====
    pub customer_id: String,   // 客户ID
    pub customer_name: String, // 客户名称
    pub material_id: String,   // 物料ID
    pub material_name: String, // 物料名称
    pub product_type: String,  // 产品类型 (决定装车点)

    // ===== 运输需求 =====
    pub destination: String, // 目的地 (大写归一)
    pub quantity_t: f64,     // 订单吨位 (> 0)
    pub distance_km: f64,    // 运距 (公里)

    // ===== 交付约束 =====
    pub priority: Priority,             // 优先级
    pub due_date: NaiveDateTime,        // 交货期
    pub preferred_mode: PreferredMode,  // 期望运输方式
    pub penalty_rate_per_day: f64,      // 每天每吨延误罚金
}

impl Order {
    /// 是否允许公路运输
    pub fn allows_road(&self) -> bool {
        self.preferred_mode.allows_road()
    }
}
