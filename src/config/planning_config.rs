// ==========================================
// 铁路车皮配载系统 - 配载参数配置
// ==========================================
// 职责: 车队/站台定义、查找表、成本费率、订单默认值
// 红线: 配载引擎内不出现部署相关常量,全部由此注入
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::model::{normalize_code, PlanningConstraints};
use crate::domain::types::{Priority, PreferredMode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

// ==========================================
// PlanningConfig - 配载参数总表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanningConfig {
    #[serde(default)]
    pub fleet: FleetConfig,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub costs: CostRates,

    #[serde(default)]
    pub order_defaults: OrderDefaults,

    #[serde(default)]
    pub constraints: PlanningConstraints,

    #[serde(default)]
    pub kpi: KpiParameters,

    #[serde(default)]
    pub risk: RiskCoefficients,
}

impl PlanningConfig {
    /// 校验配置
    ///
    /// # 规则
    /// - 至少一个车列、一个站台
    /// - 车列/站台/装车点不可重复
    /// - 容量类参数必须为正
    /// - 查找表引用的装车点必须存在对应站台
    pub fn validate(&self) -> ConfigResult<()> {
        if self.fleet.rakes.is_empty() {
            return Err(ConfigError::Validation("车队为空: 至少需要一个车列".to_string()));
        }
        if self.fleet.platforms.is_empty() {
            return Err(ConfigError::Validation("站台为空: 至少需要一个装车站台".to_string()));
        }

        let mut rake_ids = HashSet::new();
        for rake in &self.fleet.rakes {
            if !rake_ids.insert(rake.rake_id.as_str()) {
                return Err(ConfigError::Validation(format!("车列ID重复: {}", rake.rake_id)));
            }
            if rake.wagon_count == 0 {
                return Err(ConfigError::Validation(format!("车列 {} 车皮数为 0", rake.rake_id)));
            }
            if !(rake.wagon_capacity_t > 0.0) {
                return Err(ConfigError::Validation(format!(
                    "车列 {} 车皮载重必须为正: {}",
                    rake.rake_id, rake.wagon_capacity_t
                )));
            }
            if let Some(total) = rake.total_capacity_t {
                if !(total > 0.0) {
                    return Err(ConfigError::Validation(format!(
                        "车列 {} 总载重必须为正: {}",
                        rake.rake_id, total
                    )));
                }
            }
        }

        let mut platform_ids = HashSet::new();
        let mut loading_points = HashSet::new();
        for platform in &self.fleet.platforms {
            if !platform_ids.insert(platform.platform_id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "站台ID重复: {}",
                    platform.platform_id
                )));
            }
            if !loading_points.insert(platform.loading_point.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "装车点重复: {} (装车点与站台必须一一对应)",
                    platform.loading_point
                )));
            }
            if !(platform.crane_capacity_t > 0.0) {
                return Err(ConfigError::Validation(format!(
                    "站台 {} 吊车能力必须为正: {}",
                    platform.platform_id, platform.crane_capacity_t
                )));
            }
        }

        if !loading_points.contains(self.routing.default_loading_point.as_str()) {
            return Err(ConfigError::Validation(format!(
                "默认装车点无对应站台: {}",
                self.routing.default_loading_point
            )));
        }
        for (product_type, loading_point) in &self.routing.product_loading_points {
            if !loading_points.contains(loading_point.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "产品类型 {} 指向未知装车点: {}",
                    product_type, loading_point
                )));
            }
        }

        if !(self.costs.rail_speed_kmph > 0.0) {
            return Err(ConfigError::Validation(format!(
                "铁路速度必须为正: {}",
                self.costs.rail_speed_kmph
            )));
        }
        if self.costs.rail_departure_hour > 23 {
            return Err(ConfigError::Validation(format!(
                "铁路发车时刻超出范围: {}",
                self.costs.rail_departure_hour
            )));
        }

        Ok(())
    }

    /// 产品类型 → 装车点 (键已归一)
    pub fn normalized_loading_points(&self) -> std::collections::HashMap<String, String> {
        self.routing
            .product_loading_points
            .iter()
            .map(|(k, v)| (normalize_code(k), v.clone()))
            .collect()
    }

    /// 目的地运距（未配置时返回默认运距）
    pub fn distance_for(&self, destination: &str) -> f64 {
        let key = destination.trim().to_ascii_uppercase();
        self.routing
            .destination_distances_km
            .get(&key)
            .copied()
            .unwrap_or(self.routing.default_distance_km)
    }
}

// ==========================================
// FleetConfig - 车队与站台定义
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub rakes: Vec<RakeSpec>,
    pub platforms: Vec<PlatformSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RakeSpec {
    pub rake_id: String,
    pub wagon_count: u32,
    pub wagon_capacity_t: f64,
    #[serde(default)]
    pub home_location: String,
    /// 未指定时取 wagon_count × wagon_capacity_t
    #[serde(default)]
    pub total_capacity_t: Option<f64>,
}

impl RakeSpec {
    pub fn effective_total_capacity_t(&self) -> f64 {
        self.total_capacity_t
            .unwrap_or(self.wagon_count as f64 * self.wagon_capacity_t)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub platform_id: String,
    pub loading_point: String,
    pub crane_id: String,
    pub crane_capacity_t: f64,
}

impl Default for FleetConfig {
    /// 参考部署: 3 个车列 × 10 节 59 吨车皮, 3 个站台
    fn default() -> Self {
        let rakes = (1..=3)
            .map(|i| RakeSpec {
                rake_id: format!("RAKE-{:02}", i),
                wagon_count: 10,
                wagon_capacity_t: 59.0,
                home_location: "BOKARO".to_string(),
                total_capacity_t: None,
            })
            .collect();

        let platforms = vec![
            PlatformSpec {
                platform_id: "PLT-1".to_string(),
                loading_point: "LP-A".to_string(),
                crane_id: "CRN-1".to_string(),
                crane_capacity_t: 30.0,
            },
            PlatformSpec {
                platform_id: "PLT-2".to_string(),
                loading_point: "LP-B".to_string(),
                crane_id: "CRN-2".to_string(),
                crane_capacity_t: 35.0,
            },
            PlatformSpec {
                platform_id: "PLT-3".to_string(),
                loading_point: "LP-C".to_string(),
                crane_id: "CRN-3".to_string(),
                crane_capacity_t: 40.0,
            },
        ];

        Self { rakes, platforms }
    }
}

// ==========================================
// RoutingConfig - 查找表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// 产品类型 → 装车点
    pub product_loading_points: BTreeMap<String, String>,
    /// 未知产品类型的装车点
    pub default_loading_point: String,
    /// 目的地 (大写) → 运距
    pub destination_distances_km: BTreeMap<String, f64>,
    pub default_distance_km: f64,
    /// 目的地 (大写) → 线路拥堵系数 (风险模型用)
    pub destination_congestion: BTreeMap<String, f64>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        let product_loading_points = [
            ("HR_COIL", "LP-A"),
            ("CR_COIL", "LP-B"),
            ("PLATE", "LP-B"),
            ("WIRE_ROD", "LP-C"),
            ("BILLET", "LP-C"),
            ("TMT_BAR", "LP-C"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let destination_distances_km = [
            ("DELHI", 1250.0),
            ("MUMBAI", 1700.0),
            ("KOLKATA", 300.0),
            ("CHENNAI", 1650.0),
            ("BANGALORE", 1900.0),
            ("HYDERABAD", 1200.0),
            ("PUNE", 1600.0),
            ("AHMEDABAD", 1750.0),
            ("LUCKNOW", 900.0),
            ("JAMSHEDPUR", 150.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let destination_congestion = [("DELHI", 0.7), ("MUMBAI", 0.8), ("KOLKATA", 0.6)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        Self {
            product_loading_points,
            default_loading_point: "LP-A".to_string(),
            destination_distances_km,
            default_distance_km: 1000.0,
            destination_congestion,
        }
    }
}

// ==========================================
// CostRates - 成本与时效参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostRates {
    pub rail_rate_per_tkm: f64,         // 铁路运费 (元/吨公里)
    pub road_rate_per_tkm: f64,         // 公路运费 (元/吨公里)
    pub loading_rate_per_t: f64,        // 装车费 (元/吨)
    pub idle_freight_ratio: f64,        // 空载运费占运费比例
    pub idle_utilization_threshold_pct: f64, // 低于该车列利用率计空载运费
    pub rail_speed_kmph: f64,           // 铁路平均速度
    pub rail_departure_hour: u32,       // 铁路发车时刻 (计划日)
    pub road_departure_lead_hours: i64, // 公路发车 = 计划时刻 + N 小时
    pub road_transit_days: i64,         // 公路在途天数
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            rail_rate_per_tkm: 1.4,
            road_rate_per_tkm: 1.8,
            loading_rate_per_t: 50.0,
            idle_freight_ratio: 0.1,
            idle_utilization_threshold_pct: 70.0,
            rail_speed_kmph: 50.0,
            rail_departure_hour: 10,
            road_departure_lead_hours: 2,
            road_transit_days: 2,
        }
    }
}

// ==========================================
// OrderDefaults - 可选字段默认值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDefaults {
    pub priority: Priority,
    pub due_in_days: i64,
    pub preferred_mode: PreferredMode,
    pub penalty_rate_per_day: f64,
}

impl Default for OrderDefaults {
    fn default() -> Self {
        Self {
            priority: Priority::Medium,
            due_in_days: 3,
            preferred_mode: PreferredMode::Rail,
            penalty_rate_per_day: 600.0,
        }
    }
}

// ==========================================
// KpiParameters - 指标估算参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiParameters {
    pub baseline_multiplier: f64,   // 基线成本 = 总成本 × 该系数
    pub demurrage_multiplier: f64,  // 滞期节省 = 该系数 × 高利用率明细空载运费之和
    pub high_utilization_pct: f64,  // 高利用率阈值
}

impl Default for KpiParameters {
    fn default() -> Self {
        Self {
            baseline_multiplier: 1.15,
            demurrage_multiplier: 1.5,
            high_utilization_pct: 85.0,
        }
    }
}

// ==========================================
// RiskCoefficients - 风险模型系数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskCoefficients {
    pub intercept: f64,
    pub distance_km: f64,
    pub transit_hours: f64,
    pub priority: f64,
    pub weight_t: f64,
    pub congestion: f64,
    pub historical_delay_pct: f64,
    pub hours_until_due: f64,
    pub mode_flag: f64,
    pub season_factor: f64,

    // ===== 输出映射 =====
    pub medium_threshold: f64,      // 概率 ≥ 该值为 MEDIUM
    pub high_threshold: f64,        // 概率 ≥ 该值为 HIGH
    pub max_cost_uplift: f64,       // cost_multiplier = 1 + p × max_cost_uplift

    // ===== 特征默认值 =====
    pub default_congestion: f64,
    pub historical_delay_pct_default: f64,
    pub monsoon_months: Vec<u32>,
    pub monsoon_season_factor: f64,
}

impl Default for RiskCoefficients {
    fn default() -> Self {
        Self {
            intercept: -3.0,
            distance_km: 0.0008,
            transit_hours: 0.01,
            priority: 0.1,
            weight_t: 0.005,
            congestion: 1.5,
            historical_delay_pct: 0.03,
            hours_until_due: -0.01,
            mode_flag: -0.2,
            season_factor: 0.5,
            medium_threshold: 0.3,
            high_threshold: 0.6,
            max_cost_uplift: 0.25,
            default_congestion: 0.5,
            historical_delay_pct_default: 10.0,
            monsoon_months: vec![6, 7, 8, 9],
            monsoon_season_factor: 1.2,
        }
    }
}
