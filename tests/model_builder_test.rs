// ==========================================
// ResourceModelBuilder 集成测试
// ==========================================
// 测试目标: 验证原始记录 → 内部计算模型
// 覆盖范围: 字段别名、默认值、剔除行、车队供给、装车点映射
// ==========================================

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rake_allocation::config::{PlanningConfig, RakeSpec};
use rake_allocation::engine::{PlanError, ResourceModelBuilder};
use rake_allocation::{Priority, PreferredMode};
use serde_json::json;

fn planned_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

// ==========================================
// 字段映射
// ==========================================

#[test]
fn test_field_aliases_and_normalization() {
    let config = PlanningConfig::default();
    let raw = json!([{
        "orderId": "A-1",
        "customerName": "Acme",
        "dest": " mumbai ",
        "quantity": "42.5",
        "priority": "HIGH",
        "dueDate": "2026-03-06T12:30:00",
        "preferredMode": "Either",
        "productType": "cr-coil",
        "penalty_rate": 750
    }]);

    let model = ResourceModelBuilder::new(&config)
        .build(&raw, planned_at())
        .unwrap();
    let order = &model.orders[0];

    assert_eq!(order.order_id, "A-1");
    assert_eq!(order.customer_name, "Acme");
    assert_eq!(order.destination, "MUMBAI");
    assert_eq!(order.quantity_t, 42.5);
    assert_eq!(order.priority, Priority::High);
    assert_eq!(order.preferred_mode, PreferredMode::Either);
    assert_eq!(order.product_type, "CR_COIL");
    assert_eq!(order.penalty_rate_per_day, 750.0);
    assert_eq!(order.distance_km, 1700.0);
    assert_eq!(
        order.due_date,
        NaiveDate::from_ymd_opt(2026, 3, 6)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    );

    // CR_COIL → LP-B → PLT-2
    let platform = model.platform_for(&order.product_type).unwrap();
    assert_eq!(platform.platform_id, "PLT-2");
    assert_eq!(platform.crane_capacity_t, 35.0);
}

#[test]
fn test_optional_defaults() {
    let config = PlanningConfig::default();
    let raw = json!([{
        "order_id": "D-1", "customer_name": "Acme", "destination": "Atlantis",
        "quantity_tonnes": 10, "priority": "urgent", "preferred_mode": "air"
    }]);

    let model = ResourceModelBuilder::new(&config)
        .build(&raw, planned_at())
        .unwrap();
    let order = &model.orders[0];

    assert_eq!(order.priority, Priority::Medium);
    assert_eq!(order.preferred_mode, PreferredMode::Rail);
    assert_eq!(order.due_date, planned_at() + Duration::days(3));
    assert_eq!(order.penalty_rate_per_day, 600.0);
    assert_eq!(order.distance_km, 1000.0);

    // 未知产品类型落默认装车点
    assert_eq!(model.loading_point_for(&order.product_type), "LP-A");
    assert_eq!(model.platform_for("UNOBTAINIUM").unwrap().platform_id, "PLT-1");
}

// ==========================================
// 剔除与异常
// ==========================================

#[test]
fn test_defective_rows_dropped_run_continues() {
    let config = PlanningConfig::default();
    let raw = json!([
        {"order_id": "OK-1", "customer_name": "A", "destination": "Delhi", "quantity_tonnes": 5},
        "not a record",
        {"customer_name": "A", "destination": "Delhi", "quantity_tonnes": 5},
        {"order_id": "ZERO", "customer_name": "A", "destination": "Delhi", "quantity_tonnes": 0},
        {"order_id": "OK-1", "customer_name": "B", "destination": "Pune", "quantity_tonnes": 8},
        {"order_id": "OK-2", "customer_name": "B", "destination": "Pune", "quantity_tonnes": 8}
    ]);

    let model = ResourceModelBuilder::new(&config)
        .build(&raw, planned_at())
        .unwrap();

    let ids: Vec<&str> = model.orders.iter().map(|o| o.order_id.as_str()).collect();
    assert_eq!(ids, vec!["OK-1", "OK-2"]);

    let dropped: Vec<usize> = model.dropped_rows.iter().map(|d| d.row_index).collect();
    assert_eq!(dropped, vec![1, 2, 3, 4]);
    assert_eq!(model.dropped_rows[0].order_id, None);
    assert_eq!(model.dropped_rows[2].order_id.as_deref(), Some("ZERO"));
}

#[test]
fn test_quantity_below_capacity_precision_dropped() {
    let config = PlanningConfig::default();
    let raw = json!([
        {"order_id": "BIG", "customer_name": "A", "destination": "Delhi", "quantity_tonnes": 20},
        {"order_id": "TINY", "customer_name": "A", "destination": "Delhi", "quantity_tonnes": 0.0000005},
        {"order_id": "EDGE", "customer_name": "A", "destination": "Delhi", "quantity_tonnes": 0.000001}
    ]);

    let model = ResourceModelBuilder::new(&config)
        .build(&raw, planned_at())
        .unwrap();

    let ids: Vec<&str> = model.orders.iter().map(|o| o.order_id.as_str()).collect();
    assert_eq!(ids, vec!["BIG"]);

    let dropped: Vec<Option<&str>> = model
        .dropped_rows
        .iter()
        .map(|d| d.order_id.as_deref())
        .collect();
    assert_eq!(dropped, vec![Some("TINY"), Some("EDGE")]);
    assert!(model.dropped_rows[0].reason.contains("quantity_tonnes"));
}

#[test]
fn test_non_array_input_aborts() {
    let config = PlanningConfig::default();
    let result = ResourceModelBuilder::new(&config).build(&json!("orders"), planned_at());
    assert!(matches!(result, Err(PlanError::MalformedInput(_))));
}

#[test]
fn test_invalid_config_aborts() {
    let mut config = PlanningConfig::default();
    config.fleet.platforms.clear();
    let result = ResourceModelBuilder::new(&config).build(&json!([]), planned_at());
    assert!(matches!(result, Err(PlanError::Config(_))));
}

// ==========================================
// 车队供给
// ==========================================

#[test]
fn test_fleet_from_config() {
    let mut config = PlanningConfig::default();
    config.fleet.rakes = vec![
        RakeSpec {
            rake_id: "BOXN-7".to_string(),
            wagon_count: 3,
            wagon_capacity_t: 61.0,
            home_location: "ROURKELA".to_string(),
            total_capacity_t: None,
        },
        RakeSpec {
            rake_id: "BOXN-8".to_string(),
            wagon_count: 2,
            wagon_capacity_t: 59.0,
            home_location: "ROURKELA".to_string(),
            total_capacity_t: Some(100.0),
        },
    ];

    let model = ResourceModelBuilder::new(&config)
        .build(&json!([]), planned_at())
        .unwrap();

    assert_eq!(model.rakes.len(), 2);
    assert_eq!(model.wagons.len(), 5);
    assert_eq!(model.rakes[0].total_capacity_t, 183.0);
    assert_eq!(model.rakes[1].total_capacity_t, 100.0);

    let ids: Vec<&str> = model.wagons_of("BOXN-7").map(|w| w.wagon_id.as_str()).collect();
    assert_eq!(ids, vec!["BOXN-7-W01", "BOXN-7-W02", "BOXN-7-W03"]);
    assert!(model.wagons_of("BOXN-7").all(|w| w.max_capacity_t == 61.0));
    assert_eq!(model.platforms.len(), 3);
}
