// ==========================================
// 铁路车皮配载系统 - 命令行入口
// ==========================================
// 用法: rake-allocation <orders.json|orders.csv> [config.json]
// 输出: 配载报表 (JSON, stdout); 日志写 stderr
// ==========================================

use anyhow::{bail, Context, Result};
use chrono::Local;
use rake_allocation::config::ConfigManager;
use rake_allocation::importer::parse_order_file;
use rake_allocation::{logging, PlanOrchestrator, APP_NAME, VERSION};
use std::path::PathBuf;

fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let Some(orders_path) = args.next().map(PathBuf::from) else {
        bail!("用法: rake-allocation <orders.json|orders.csv> [config.json]");
    };
    let config_path = args.next().map(PathBuf::from);

    tracing::info!("==================================================");
    tracing::info!("{} - 决策支持系统", APP_NAME);
    tracing::info!("系统版本: {}", VERSION);
    tracing::info!("==================================================");

    // 配置: 命令行指定 > 环境变量 > 默认路径 > 内置默认
    let manager = match &config_path {
        Some(path) => ConfigManager::load(path)
            .with_context(|| format!("加载配置失败: {}", path.display()))?,
        None => ConfigManager::from_env_or_default().context("加载配置失败")?,
    };
    match manager.source() {
        Some(source) => tracing::info!(path = %source.display(), "使用配置文件"),
        None => tracing::info!("使用内置默认配置"),
    }

    let raw = parse_order_file(&orders_path)
        .with_context(|| format!("读取订单文件失败: {}", orders_path.display()))?;

    let orchestrator = PlanOrchestrator::new(manager.into_config()).context("配置校验失败")?;
    let plan = orchestrator
        .plan(&raw, Local::now().naive_local())
        .context("配载计算失败")?;

    if plan.is_degraded() {
        tracing::warn!(
            fallback_applied = plan.fallback_applied,
            undeliverable = plan.kpi.undeliverable_orders,
            road = plan.kpi.road_allocations,
            "方案含公路分流或不可交付订单, 请人工确认"
        );
    }

    let report = serde_json::to_string_pretty(&plan.to_report()).context("报表序列化失败")?;
    println!("{}", report);

    Ok(())
}
