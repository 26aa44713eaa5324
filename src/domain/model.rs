// ==========================================
// 铁路车皮配载系统 - 内部计算模型
// ==========================================
// 职责: 承载一次配载计算所需的全部只读输入
// 输入: 资源模型构建器输出
// 红线: 模型在计算期间只读,可变状态由 AllocatorContext 独占
// ==========================================

use crate::domain::fleet::{Platform, Rake, Wagon};
use crate::domain::order::Order;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// PlanningConstraints - 配载约束开关
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanningConstraints {
    /// 是否允许同一车列装载多个目的地
    #[serde(default)]
    pub allow_multi_destination: bool,

    /// 仅铁路订单无运力时是否强制转公路（否则记为不可交付）
    #[serde(default)]
    pub road_last_resort: bool,
}

// ==========================================
// DroppedRow - 被剔除的输入行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedRow {
    pub row_index: usize,
    pub order_id: Option<String>,
    pub reason: String,
}

// ==========================================
// InternalModel - 内部计算模型
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalModel {
    pub orders: Vec<Order>,
    pub rakes: Vec<Rake>,
    pub wagons: Vec<Wagon>,
    pub platforms: Vec<Platform>,
    pub constraints: PlanningConstraints,

    // ===== 产品类型 → 装车点 =====
    pub loading_points: HashMap<String, String>,
    pub default_loading_point: String,

    // ===== 输入缺陷 =====
    pub dropped_rows: Vec<DroppedRow>,
}

impl InternalModel {
    /// 产品类型对应的装车点
    pub fn loading_point_for(&self, product_type: &str) -> &str {
        self.loading_points
            .get(&normalize_code(product_type))
            .map(String::as_str)
            .unwrap_or(self.default_loading_point.as_str())
    }

    /// 产品类型对应的装车站台（装车点与站台一一对应）
    pub fn platform_for(&self, product_type: &str) -> Option<&Platform> {
        let loading_point = self.loading_point_for(product_type);
        self.platforms
            .iter()
            .find(|p| p.loading_point == loading_point)
    }

    /// 按订单号查找订单
    pub fn order(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.order_id == order_id)
    }

    /// 车列下属车皮
    pub fn wagons_of<'a>(&'a self, rake_id: &'a str) -> impl Iterator<Item = &'a Wagon> + 'a {
        self.wagons.iter().filter(move |w| w.rake_id == rake_id)
    }
}

/// 编码归一: 去空白、转大写、空格与连字符统一为下划线
pub fn normalize_code(raw: &str) -> String {
    raw.trim()
        .to_ascii_uppercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}
