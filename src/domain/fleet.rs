// ==========================================
// 铁路车皮配载系统 - 车队与站台领域模型
// ==========================================
// 用途: 车列 (Rake) / 车皮 (Wagon) / 装车站台 (Platform)
// 来源: 配置注入,不由输入数据推导
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Rake - 车列
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rake {
    pub rake_id: String,        // 车列ID
    pub wagon_count: u32,       // 车皮数
    pub total_capacity_t: f64,  // 总载重 (吨)
    pub home_location: String,  // 始发地
}

// ==========================================
// Wagon - 车皮
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wagon {
    pub wagon_id: String,      // 车皮ID
    pub rake_id: String,       // 所属车列
    pub index: u32,            // 车列内序号 (从 1 开始)
    pub max_capacity_t: f64,   // 最大载重 (吨)
}

// ==========================================
// Platform - 装车站台
// ==========================================
// 红线: 吊车能力是单次装车的硬上限,与车皮余量无关
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub platform_id: String,      // 站台ID
    pub loading_point: String,    // 装车点
    pub crane_id: String,         // 吊车ID
    pub crane_capacity_t: f64,    // 吊车单次能力 (吨)
}
