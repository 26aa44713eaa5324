// ==========================================
// PlanOrchestrator 集成测试
// ==========================================
// 测试目标: 验证完整配载流程 (构建 → 排序 → 配载 → 指标 → 风险)
// 覆盖范围: 多目的地批次、空方案兜底、剔除行、报表取整、配置文件
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use rake_allocation::config::{ConfigManager, PlanningConfig};
use rake_allocation::engine::{PlanOrchestrator, ResourceModelBuilder};
use rake_allocation::logging;
use rake_allocation::{FulfillmentStatus, PlanError, PreferredMode, SlaStatus, TransportMode};
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;

// ==========================================
// 测试辅助函数
// ==========================================

fn planned_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn default_orchestrator() -> PlanOrchestrator {
    PlanOrchestrator::new(PlanningConfig::default()).expect("默认配置应当有效")
}

/// 参考批次: 三个目的地, 四种产品
fn reference_batch() -> Value {
    json!([
        {"order_id": "O1", "customer_name": "Tata Projects", "product_type": "HR Coil",
         "destination": "Delhi", "quantity_tonnes": 40, "priority": "High"},
        {"order_id": "O2", "customer_name": "L&T", "product_type": "CR Coil",
         "destination": "Mumbai", "quantity_tonnes": 100, "priority": "Medium",
         "preferred_mode": "either"},
        {"order_id": "O3", "customer_name": "Shapoorji", "product_type": "Plate",
         "destination": "Kolkata", "quantity_tonnes": 20, "priority": "Low"},
        {"order_id": "O4", "customer_name": "Jindal", "product_type": "Wire Rod",
         "destination": "Delhi", "quantity_tonnes": 50, "priority": "Medium",
         "preferred_mode": "road"}
    ])
}

// ==========================================
// 完整流程测试
// ==========================================

#[test]
fn test_reference_batch_all_rail() {
    // 初始化日志系统
    logging::init_test();

    let plan = default_orchestrator()
        .plan(&reference_batch(), planned_at())
        .unwrap();

    assert!(!plan.fallback_applied);
    assert!(plan.unallocated.is_empty());
    assert!(plan.items.iter().all(|i| i.mode == TransportMode::Rail));
    assert_eq!(plan.kpi.total_orders, 4);
    assert_eq!(plan.kpi.rakes_used, 3);
    assert_eq!(plan.kpi.rail_allocations, plan.items.len());
    assert_eq!(plan.kpi.road_allocations, 0);
    assert!((plan.kpi.rail_tonnage_t - 210.0).abs() < 1e-6);

    // 每个订单 100% 铁路
    assert_eq!(plan.fulfillments.len(), 4);
    for f in &plan.fulfillments {
        assert!(f.status.is_terminal());
        assert_eq!(f.status, FulfillmentStatus::RailAllocated);
        assert!((f.rail_percent - 100.0).abs() < 1e-9);
    }

    // 同目的地共用车列
    let rake_of = |order_id: &str| {
        plan.items_for_order(order_id)
            .next()
            .and_then(|i| i.rake_id.clone())
            .unwrap()
    };
    assert_eq!(rake_of("O1"), rake_of("O4"));
    assert_ne!(rake_of("O1"), rake_of("O2"));
    assert_ne!(rake_of("O2"), rake_of("O3"));

    // 站台按产品类型
    assert!(plan
        .items_for_order("O2")
        .all(|i| i.platform_id.as_deref() == Some("PLT-2") && i.quantity_t <= 35.0));
    assert!(plan
        .items_for_order("O4")
        .all(|i| i.platform_id.as_deref() == Some("PLT-3")));

    // 第一条明细属于高优先级订单
    assert_eq!(plan.items[0].order_id, "O1");
    assert_eq!(plan.items[0].seq_no, 1);
}

#[test]
fn test_kpi_formulas() {
    let plan = default_orchestrator()
        .plan(&reference_batch(), planned_at())
        .unwrap();

    let total: f64 = plan.items.iter().map(|i| i.cost.total).sum();
    assert!((plan.kpi.total_cost - total).abs() < 1e-6);
    assert!((plan.kpi.baseline_cost - total * 1.15).abs() < 1e-6);
    assert!((plan.kpi.estimated_savings - (plan.kpi.baseline_cost - total)).abs() < 1e-6);

    let rail: Vec<_> = plan.items.iter().filter(|i| i.is_rail()).collect();
    let avg = rail.iter().map(|i| i.rake_utilization_pct).sum::<f64>() / rail.len() as f64;
    assert!((plan.kpi.avg_rake_utilization_pct - avg).abs() < 1e-9);

    // 低利用率车列均计空载运费, 无明细达到 85%
    assert!(plan.items.iter().all(|i| i.cost.idle_freight > 0.0));
    assert_eq!(plan.kpi.demurrage_savings, 0.0);
    assert_eq!(plan.kpi.on_time_count, plan.items.len());
}

#[test]
fn test_explanations_one_per_item() {
    let plan = default_orchestrator()
        .plan(&reference_batch(), planned_at())
        .unwrap();

    let explanations = plan.explanations();
    assert_eq!(explanations.len(), plan.items.len());
    for (sentence, reason) in explanations {
        assert!(sentence.starts_with("ORDER #"));
        assert!(reason.ends_with('.'));
    }
    assert!(plan.items[0].explanation.reason.starts_with("High-priority"));
}

#[test]
fn test_risk_annotation_per_item() {
    let plan = default_orchestrator()
        .plan(&reference_batch(), planned_at())
        .unwrap();

    assert_eq!(plan.risk_annotations.len(), plan.items.len());
    for (annotation, item) in plan.risk_annotations.iter().zip(&plan.items) {
        assert_eq!(annotation.seq_no, item.seq_no);
        let p = annotation.assessment.delay_probability;
        assert!(p > 0.0 && p < 1.0);
        assert!((annotation.assessment.cost_multiplier - (1.0 + p * 0.25)).abs() < 1e-12);
    }
}

// ==========================================
// 降级与异常路径
// ==========================================

#[test]
fn test_degenerate_plan_falls_back_to_road() {
    let orchestrator = default_orchestrator();
    let mut model = ResourceModelBuilder::new(orchestrator.config())
        .build(&reference_batch(), planned_at())
        .unwrap();
    // 无可用车列且全部仅铁路: 配载结果为空
    model.rakes.clear();
    model.wagons.clear();
    for order in &mut model.orders {
        order.preferred_mode = PreferredMode::Rail;
    }

    let plan = orchestrator.plan_model(&model, planned_at());

    assert!(plan.fallback_applied);
    assert!(plan.is_degraded());
    assert!(plan.unallocated.is_empty());
    assert_eq!(plan.items.len(), 4);
    assert!(plan.items.iter().all(|i| i.mode == TransportMode::Road));
    for order in &model.orders {
        let item = plan.items_for_order(&order.order_id).next().unwrap();
        assert_eq!(item.quantity_t, order.quantity_t);
    }
    assert_eq!(plan.kpi.road_allocations, 4);
    assert_eq!(plan.kpi.rakes_used, 0);
    assert!(plan.items.iter().all(|i| i.forced_road));
}

#[test]
fn test_empty_batch_has_no_fallback() {
    let plan = default_orchestrator().plan(&json!([]), planned_at()).unwrap();
    assert!(!plan.fallback_applied);
    assert!(plan.items.is_empty());
    assert_eq!(plan.kpi.total_orders, 0);
}

#[test]
fn test_dropped_rows_surface_in_plan() {
    let raw = json!([
        {"order_id": "OK", "customer_name": "A", "destination": "Pune", "quantity_tonnes": 10},
        {"order_id": "NO-DEST", "customer_name": "A", "quantity_tonnes": 10},
        {"order_id": "BAD-QTY", "customer_name": "A", "destination": "Pune", "quantity_tonnes": "ten"}
    ]);

    let plan = default_orchestrator().plan(&raw, planned_at()).unwrap();

    assert_eq!(plan.items.len(), 1);
    assert_eq!(plan.dropped_rows.len(), 2);
    assert_eq!(plan.dropped_rows[0].row_index, 1);
    assert_eq!(plan.dropped_rows[1].order_id.as_deref(), Some("BAD-QTY"));
}

#[test]
fn test_negligible_quantity_surfaces_as_dropped_row() {
    logging::init_test();

    let raw = json!([
        {"order_id": "BIG", "customer_name": "A", "destination": "Delhi", "quantity_tonnes": 20},
        {"order_id": "TINY", "customer_name": "A", "destination": "Delhi", "quantity_tonnes": 0.0000005}
    ]);

    let plan = default_orchestrator().plan(&raw, planned_at()).unwrap();

    assert_eq!(plan.kpi.total_orders, 1);
    assert_eq!(plan.dropped_rows.len(), 1);
    assert_eq!(plan.dropped_rows[0].order_id.as_deref(), Some("TINY"));
    assert!(plan.items_for_order("TINY").next().is_none());
    assert!(plan.fulfillments.iter().all(|f| f.order_id != "TINY"));
    // 每个参与配载的订单都落入终态
    assert!(plan.fulfillments.iter().all(|f| f.status.is_terminal()));
}

#[test]
fn test_non_list_input_is_rejected() {
    let result = default_orchestrator().plan(&json!({"order_id": "O1"}), planned_at());
    assert!(matches!(result, Err(PlanError::MalformedInput(_))));
}

#[test]
fn test_rail_only_undeliverable_is_degraded() {
    let mut config = PlanningConfig::default();
    config.fleet.rakes.truncate(1);
    config.fleet.rakes[0].wagon_count = 1;
    let orchestrator = PlanOrchestrator::new(config).unwrap();

    let raw = json!([
        {"order_id": "O1", "customer_name": "A", "destination": "Delhi",
         "quantity_tonnes": 59, "priority": "High", "product_type": "Billet"},
        {"order_id": "O2", "customer_name": "B", "destination": "Delhi",
         "quantity_tonnes": 30, "preferred_mode": "rail"}
    ]);
    let plan = orchestrator.plan(&raw, planned_at()).unwrap();

    assert!(!plan.fallback_applied);
    assert!(plan.is_degraded());
    assert_eq!(plan.kpi.undeliverable_orders, 1);
    assert_eq!(plan.kpi.undelivered_tonnage_t, 30.0);
    assert_eq!(
        plan.fulfillment("O2").map(|f| f.status),
        Some(FulfillmentStatus::Undeliverable)
    );
}

// ==========================================
// 报表与配置
// ==========================================

#[test]
fn test_report_rounds_values() {
    let plan = default_orchestrator()
        .plan(&reference_batch(), planned_at())
        .unwrap();
    let report = plan.to_report();

    assert_eq!(report.plan_id, plan.plan_id);
    assert_eq!(report.allocations.len(), plan.items.len());
    for (line, item) in report.allocations.iter().zip(&plan.items) {
        assert_eq!(line.cost.total, item.cost.total.round());
        assert_eq!(line.rake_utilization_pct, (item.rake_utilization_pct * 10.0).round() / 10.0);
        assert_eq!(line.sentence, item.explanation.sentence);
    }
    assert_eq!(report.kpi.total_cost, plan.kpi.total_cost.round());

    let text = serde_json::to_string(&report).unwrap();
    assert!(text.contains("\"On-time\""));
    assert!(text.contains("\"RAIL\""));
    assert_eq!(plan.items[0].sla_status, SlaStatus::OnTime);
}

#[test]
fn test_orchestrator_from_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "fleet": {{
                "rakes": [{{"rake_id": "R-X", "wagon_count": 2, "wagon_capacity_t": 25.0}}]
            }},
            "constraints": {{"road_last_resort": true}}
        }}"#
    )
    .unwrap();

    let manager = ConfigManager::load(file.path()).unwrap();
    assert_eq!(manager.source(), Some(file.path()));
    let orchestrator = PlanOrchestrator::new(manager.into_config()).unwrap();

    let raw = json!([
        {"order_id": "O1", "customer_name": "A", "destination": "Lucknow", "quantity_tonnes": 70}
    ]);
    let plan = orchestrator.plan(&raw, planned_at()).unwrap();

    let rail_t: f64 = plan.items.iter().filter(|i| i.is_rail()).map(|i| i.quantity_t).sum();
    assert_eq!(rail_t, 50.0);
    let road: Vec<_> = plan.items.iter().filter(|i| !i.is_rail()).collect();
    assert_eq!(road.len(), 1);
    assert!(road[0].forced_road);
    assert_eq!(road[0].quantity_t, 20.0);
    assert_eq!(plan.fulfillment("O1").map(|f| f.status), Some(FulfillmentStatus::Mixed));
}
