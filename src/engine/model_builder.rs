// ==========================================
// 铁路车皮配载系统 - 资源模型构建器
// ==========================================
// 职责: 原始订单行 → 内部实体 + 车队/站台供给
// 输入: 原始记录数组 (serde_json::Value) + 配置
// 输出: InternalModel
// 红线: 缺必填字段的行剔除并告警,不中止计算
// 红线: 只有整体输入不是记录数组时才失败
// ==========================================

use crate::config::PlanningConfig;
use crate::domain::fleet::{Platform, Rake, Wagon};
use crate::domain::model::{normalize_code, DroppedRow, InternalModel};
use crate::domain::order::Order;
use crate::domain::types::{Priority, PreferredMode};
use crate::engine::allocator::CAPACITY_EPSILON;
use crate::engine::error::{PlanError, PlanResult};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

// ===== 字段别名 =====
const ORDER_ID_KEYS: &[&str] = &["order_id", "orderId", "order_no"];
const CUSTOMER_ID_KEYS: &[&str] = &["customer_id", "customerId"];
const CUSTOMER_NAME_KEYS: &[&str] = &["customer_name", "customerName", "customer"];
const MATERIAL_ID_KEYS: &[&str] = &["material_id", "materialId"];
const MATERIAL_NAME_KEYS: &[&str] = &["material_name", "materialName"];
const PRODUCT_TYPE_KEYS: &[&str] = &["product_type", "productType", "product"];
const DESTINATION_KEYS: &[&str] = &["destination", "dest"];
const QUANTITY_KEYS: &[&str] = &["quantity_tonnes", "quantity_t", "quantity"];
const PRIORITY_KEYS: &[&str] = &["priority"];
const DUE_DATE_KEYS: &[&str] = &["due_date", "dueDate", "deadline"];
const MODE_KEYS: &[&str] = &["preferred_mode", "preferredMode", "mode"];
const PENALTY_KEYS: &[&str] = &["penalty_rate_per_day", "penalty_rate", "penalty_per_day"];
const DISTANCE_KEYS: &[&str] = &["distance_km", "distance"];

// ==========================================
// ResourceModelBuilder - 资源模型构建器
// ==========================================
pub struct ResourceModelBuilder<'a> {
    config: &'a PlanningConfig,
}

impl<'a> ResourceModelBuilder<'a> {
    pub fn new(config: &'a PlanningConfig) -> Self {
        Self { config }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 构建内部计算模型
    ///
    /// # 参数
    /// - `raw`: 原始订单记录（必须为数组）
    /// - `now`: 计划时刻（用于缺省交货期）
    ///
    /// # 返回
    /// - Ok(InternalModel): 有效订单 + 车队 + 站台 + 被剔除行
    /// - Err(PlanError::MalformedInput): 输入不是记录数组
    #[instrument(skip(self, raw))]
    pub fn build(&self, raw: &Value, now: NaiveDateTime) -> PlanResult<InternalModel> {
        let rows = raw.as_array().ok_or_else(|| {
            PlanError::MalformedInput(format!("期望订单记录数组, 实际为 {}", value_kind(raw)))
        })?;

        self.config.validate()?;

        let mut orders = Vec::with_capacity(rows.len());
        let mut dropped_rows = Vec::new();
        let mut seen_ids = HashSet::new();

        for (row_index, row) in rows.iter().enumerate() {
            match self.build_order(row, now) {
                Ok(order) => {
                    if !seen_ids.insert(order.order_id.clone()) {
                        warn!(row_index, order_id = %order.order_id, "订单号重复, 剔除该行");
                        dropped_rows.push(DroppedRow {
                            row_index,
                            order_id: Some(order.order_id),
                            reason: "订单号重复".to_string(),
                        });
                        continue;
                    }
                    orders.push(order);
                }
                Err((order_id, reason)) => {
                    warn!(row_index, order_id = ?order_id, reason = %reason, "订单行被剔除");
                    dropped_rows.push(DroppedRow {
                        row_index,
                        order_id,
                        reason,
                    });
                }
            }
        }

        let (rakes, wagons) = self.provision_fleet();
        let platforms = self.provision_platforms();

        info!(
            orders = orders.len(),
            dropped = dropped_rows.len(),
            rakes = rakes.len(),
            wagons = wagons.len(),
            platforms = platforms.len(),
            "资源模型构建完成"
        );

        Ok(InternalModel {
            orders,
            rakes,
            wagons,
            platforms,
            constraints: self.config.constraints.clone(),
            loading_points: self.config.normalized_loading_points(),
            default_loading_point: self.config.routing.default_loading_point.clone(),
            dropped_rows,
        })
    }

    /// 按配置供给车列与车皮
    ///
    /// 车皮ID: {rake_id}-W{序号:02}, 序号从 1 开始
    pub fn provision_fleet(&self) -> (Vec<Rake>, Vec<Wagon>) {
        let mut rakes = Vec::with_capacity(self.config.fleet.rakes.len());
        let mut wagons = Vec::new();

        for spec in &self.config.fleet.rakes {
            rakes.push(Rake {
                rake_id: spec.rake_id.clone(),
                wagon_count: spec.wagon_count,
                total_capacity_t: spec.effective_total_capacity_t(),
                home_location: spec.home_location.clone(),
            });

            for index in 1..=spec.wagon_count {
                wagons.push(Wagon {
                    wagon_id: format!("{}-W{:02}", spec.rake_id, index),
                    rake_id: spec.rake_id.clone(),
                    index,
                    max_capacity_t: spec.wagon_capacity_t,
                });
            }
        }

        (rakes, wagons)
    }

    /// 按配置供给装车站台
    pub fn provision_platforms(&self) -> Vec<Platform> {
        self.config
            .fleet
            .platforms
            .iter()
            .map(|spec| Platform {
                platform_id: spec.platform_id.clone(),
                loading_point: spec.loading_point.clone(),
                crane_id: spec.crane_id.clone(),
                crane_capacity_t: spec.crane_capacity_t,
            })
            .collect()
    }

    // ==========================================
    // 单行构建
    // ==========================================

    /// 构建单个订单
    ///
    /// # 返回
    /// - Err((订单号, 剔除原因))
    fn build_order(
        &self,
        row: &Value,
        now: NaiveDateTime,
    ) -> Result<Order, (Option<String>, String)> {
        let obj = row
            .as_object()
            .ok_or_else(|| (None, format!("行不是记录对象: {}", value_kind(row))))?;

        let order_id = get_string(obj, ORDER_ID_KEYS);

        // ===== 必填字段 =====
        let order_id_value = order_id
            .clone()
            .ok_or_else(|| (None, "缺少必填字段 order_id".to_string()))?;
        let customer_name = get_string(obj, CUSTOMER_NAME_KEYS)
            .ok_or_else(|| (order_id.clone(), "缺少必填字段 customer_name".to_string()))?;
        let destination = get_string(obj, DESTINATION_KEYS)
            .map(|d| d.to_ascii_uppercase())
            .ok_or_else(|| (order_id.clone(), "缺少必填字段 destination".to_string()))?;
        let quantity_t = match get_f64(obj, QUANTITY_KEYS) {
            FieldValue::Missing => {
                return Err((order_id, "缺少必填字段 quantity_tonnes".to_string()))
            }
            FieldValue::Invalid(raw) => {
                return Err((order_id, format!("quantity_tonnes 无法解析: {}", raw)))
            }
            FieldValue::Present(q) => q,
        };
        // 不超过容量精度的吨位无法进入配载循环
        if !quantity_t.is_finite() || quantity_t <= CAPACITY_EPSILON {
            return Err((order_id, format!("quantity_tonnes 必须为正: {}", quantity_t)));
        }

        // ===== 可选字段 (落默认值) =====
        let defaults = &self.config.order_defaults;

        let priority = get_string(obj, PRIORITY_KEYS)
            .map(|p| Priority::parse_lenient(&p))
            .unwrap_or(defaults.priority);

        let due_date = match get_string(obj, DUE_DATE_KEYS) {
            Some(raw) => parse_datetime(&raw).unwrap_or_else(|| {
                debug!(order_id = %order_id_value, raw = %raw, "交货期无法解析, 使用默认值");
                now + Duration::days(defaults.due_in_days)
            }),
            None => now + Duration::days(defaults.due_in_days),
        };

        let preferred_mode = get_string(obj, MODE_KEYS)
            .and_then(|m| PreferredMode::parse(&m))
            .unwrap_or(defaults.preferred_mode);

        let penalty_rate_per_day = match get_f64(obj, PENALTY_KEYS) {
            FieldValue::Present(p) if p.is_finite() && p >= 0.0 => p,
            _ => defaults.penalty_rate_per_day,
        };

        let distance_km = match get_f64(obj, DISTANCE_KEYS) {
            FieldValue::Present(d) if d.is_finite() && d >= 0.0 => d,
            _ => self.config.distance_for(&destination),
        };

        let customer_id =
            get_string(obj, CUSTOMER_ID_KEYS).unwrap_or_else(|| customer_name.clone());
        let material_id = get_string(obj, MATERIAL_ID_KEYS).unwrap_or_default();
        let product_type = get_string(obj, PRODUCT_TYPE_KEYS)
            .map(|p| normalize_code(&p))
            .unwrap_or_default();
        let material_name = get_string(obj, MATERIAL_NAME_KEYS)
            .unwrap_or_else(|| product_type.clone());

        Ok(Order {
            order_id: order_id_value,
            customer_id,
            customer_name,
            material_id,
            material_name,
            product_type,
            destination,
            quantity_t,
            distance_km,
            priority,
            due_date,
            preferred_mode,
            penalty_rate_per_day,
        })
    }
}

// ==========================================
// 字段提取辅助
// ==========================================

enum FieldValue {
    Missing,
    Invalid(String),
    Present(f64),
}

/// 提取字符串字段（数字/布尔值转字符串,空白视为缺失）
fn get_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key) {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// 提取数值字段（允许字符串形式的数字）
fn get_f64(obj: &Map<String, Value>, keys: &[&str]) -> FieldValue {
    for key in keys {
        match obj.get(*key) {
            Some(Value::Number(n)) => {
                return match n.as_f64() {
                    Some(v) => FieldValue::Present(v),
                    None => FieldValue::Invalid(n.to_string()),
                }
            }
            Some(Value::String(s)) if !s.trim().is_empty() => {
                return match s.trim().parse::<f64>() {
                    Ok(v) => FieldValue::Present(v),
                    Err(_) => FieldValue::Invalid(s.clone()),
                }
            }
            _ => continue,
        }
    }
    FieldValue::Missing
}

/// 解析日期时间（仅日期时取当日 00:00）
fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y", "%Y%m%d"];
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
