// ==========================================
// 铁路车皮配载系统 - 领域类型定义
// ==========================================
// 职责: 优先级、运输方式、SLA 状态等枚举
// 红线: 等级制,不是评分制
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 订单优先级 (Priority)
// ==========================================
// 排序秩: High=1, Medium=2, Low=3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// 排序秩（越小越优先）
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    /// 从原始字符串解析（大小写不敏感）
    ///
    /// 无法识别的取值一律按 Medium 处理
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" | "h" | "1" => Priority::High,
            "low" | "l" | "3" => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
            Priority::Low => write!(f, "Low"),
        }
    }
}

// ==========================================
// 客户期望运输方式 (Preferred Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredMode {
    Rail,   // 仅铁路
    Road,   // 公路
    Either, // 均可
}

impl PreferredMode {
    /// 是否允许公路兜底
    pub fn allows_road(&self) -> bool {
        matches!(self, PreferredMode::Road | PreferredMode::Either)
    }

    /// 从原始字符串解析，未知取值返回 None（由调用方落默认值）
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rail" => Some(PreferredMode::Rail),
            "road" => Some(PreferredMode::Road),
            "either" | "any" | "both" | "rail/road" => Some(PreferredMode::Either),
            _ => None,
        }
    }
}

impl fmt::Display for PreferredMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferredMode::Rail => write!(f, "rail"),
            PreferredMode::Road => write!(f, "road"),
            PreferredMode::Either => write!(f, "either"),
        }
    }
}

// ==========================================
// 实际运输方式 (Transport Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportMode {
    Rail,
    Road,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Rail => write!(f, "RAIL"),
            TransportMode::Road => write!(f, "ROAD"),
        }
    }
}

// ==========================================
// SLA 状态 (SLA Status)
// ==========================================
// 阈值: days_late == 0 → On-time; == 1 → At-Risk; > 1 → Late
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlaStatus {
    #[serde(rename = "On-time")]
    OnTime,
    #[serde(rename = "At-Risk")]
    AtRisk,
    #[serde(rename = "Late")]
    Late,
}

impl SlaStatus {
    /// 由延误天数判定
    pub fn from_days_late(days_late: i64) -> Self {
        match days_late {
            d if d <= 0 => SlaStatus::OnTime,
            1 => SlaStatus::AtRisk,
            _ => SlaStatus::Late,
        }
    }
}

impl fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlaStatus::OnTime => write!(f, "On-time"),
            SlaStatus::AtRisk => write!(f, "At-Risk"),
            SlaStatus::Late => write!(f, "Late"),
        }
    }
}

// ==========================================
// 订单履约状态 (Fulfillment Status)
// ==========================================
// 状态机: Pending → RailAllocated | RoadAllocated | Mixed | Undeliverable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentStatus {
    Pending,
    RailAllocated,
    RoadAllocated,
    Mixed,
    Undeliverable,
}

impl FulfillmentStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FulfillmentStatus::Pending)
    }
}

impl fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FulfillmentStatus::Pending => write!(f, "PENDING"),
            FulfillmentStatus::RailAllocated => write!(f, "RAIL_ALLOCATED"),
            FulfillmentStatus::RoadAllocated => write!(f, "ROAD_ALLOCATED"),
            FulfillmentStatus::Mixed => write!(f, "MIXED"),
            FulfillmentStatus::Undeliverable => write!(f, "UNDELIVERABLE"),
        }
    }
}

// ==========================================
// 风险标记 (Risk Flag)
// ==========================================
// 顺序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskFlag {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskFlag::Low => write!(f, "LOW"),
            RiskFlag::Medium => write!(f, "MEDIUM"),
            RiskFlag::High => write!(f, "HIGH"),
        }
    }
}
