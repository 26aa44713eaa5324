// ==========================================
// 铁路车皮配载系统 - 车皮配载引擎
// ==========================================
// 职责: 按排序后的订单逐一寻找 (车列, 车皮, 站台) 落位
// 输入: 内部计算模型 + 排序后订单 + 计划时刻
// 输出: 配载明细 + 不可交付余量 + 订单履约汇总
// 红线: 单次装车不超过车皮余量,也不超过站台吊车能力
// 红线: 禁止多目的地时,一个车列只装一个目的地
// ==========================================

use crate::domain::fleet::{Platform, Wagon};
use crate::domain::model::InternalModel;
use crate::domain::order::Order;
use crate::domain::plan::{OrderFulfillment, RakePlanItem, UnallocatedOrder};
use crate::domain::types::{FulfillmentStatus, TransportMode};
use crate::engine::cost_evaluator::CostSlaEvaluator;
use crate::engine::explanation::ExplanationGenerator;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument, warn};

/// 吨位比较容差
pub const CAPACITY_EPSILON: f64 = 1e-6;

// ==========================================
// AllocatorContext - 配载上下文
// ==========================================
// 一次配载计算独占的可变状态: 车皮累计装载、车列已承诺目的地
// 红线: 不得作为全局/静态状态共享
pub struct AllocatorContext<'m> {
    model: &'m InternalModel,
    rake_slots: Vec<RakeSlot>,
    wagon_loads: Vec<f64>,
    next_seq_no: u32,
}

/// 单个车列的运行状态
struct RakeSlot {
    rake_idx: usize,
    wagon_idxs: Vec<usize>,
    destinations: BTreeSet<String>,
    load_t: f64,
}

/// 候选落位
#[derive(Debug, Clone, Copy)]
struct Candidate {
    slot_pos: usize,
    wagon_idx: usize,
    spare_t: f64,
    feasible_t: f64,
}

impl<'m> AllocatorContext<'m> {
    /// 创建配载上下文
    ///
    /// 车列按 rake_id 升序、车皮按车列内序号升序排列,
    /// 候选并列时取遍历中的第一个,即 rake_id 最小、车皮序号最小者
    pub fn new(model: &'m InternalModel) -> Self {
        let mut rake_order: Vec<usize> = (0..model.rakes.len()).collect();
        rake_order.sort_by(|&a, &b| model.rakes[a].rake_id.cmp(&model.rakes[b].rake_id));

        let rake_slots = rake_order
            .into_iter()
            .map(|rake_idx| {
                let rake_id = &model.rakes[rake_idx].rake_id;
                let mut wagon_idxs: Vec<usize> = model
                    .wagons
                    .iter()
                    .enumerate()
                    .filter(|(_, w)| &w.rake_id == rake_id)
                    .map(|(i, _)| i)
                    .collect();
                wagon_idxs.sort_by_key(|&i| model.wagons[i].index);

                RakeSlot {
                    rake_idx,
                    wagon_idxs,
                    destinations: BTreeSet::new(),
                    load_t: 0.0,
                }
            })
            .collect();

        Self {
            model,
            rake_slots,
            wagon_loads: vec![0.0; model.wagons.len()],
            next_seq_no: 1,
        }
    }

    pub fn model(&self) -> &'m InternalModel {
        self.model
    }

    /// 车皮当前累计装载
    pub fn wagon_load(&self, wagon_id: &str) -> Option<f64> {
        self.model
            .wagons
            .iter()
            .position(|w| w.wagon_id == wagon_id)
            .map(|i| self.wagon_loads[i])
    }

    /// 车列当前累计装载
    pub fn rake_load(&self, rake_id: &str) -> Option<f64> {
        self.slot(rake_id).map(|s| s.load_t)
    }

    /// 车列已承诺的目的地
    pub fn rake_destinations(&self, rake_id: &str) -> Vec<String> {
        self.slot(rake_id)
            .map(|s| s.destinations.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn slot(&self, rake_id: &str) -> Option<&RakeSlot> {
        self.rake_slots
            .iter()
            .find(|s| self.model.rakes[s.rake_idx].rake_id == rake_id)
    }

    fn take_seq_no(&mut self) -> u32 {
        let seq_no = self.next_seq_no;
        self.next_seq_no += 1;
        seq_no
    }
}

// ==========================================
// AllocationOutcome - 配载结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AllocationOutcome {
    pub items: Vec<RakePlanItem>,
    pub unallocated: Vec<UnallocatedOrder>,
    pub fulfillments: Vec<OrderFulfillment>,
}

// ==========================================
// RakeAllocator - 车皮配载引擎
// ==========================================
pub struct RakeAllocator {
    evaluator: CostSlaEvaluator,
    explainer: ExplanationGenerator,
}

impl RakeAllocator {
    pub fn new(evaluator: CostSlaEvaluator, explainer: ExplanationGenerator) -> Self {
        Self {
            evaluator,
            explainer,
        }
    }

    pub fn evaluator(&self) -> &CostSlaEvaluator {
        &self.evaluator
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 配载全部订单（新建上下文）
    pub fn allocate(
        &self,
        model: &InternalModel,
        orders: &[Order],
        planned_at: NaiveDateTime,
    ) -> AllocationOutcome {
        let mut ctx = AllocatorContext::new(model);
        self.allocate_with_context(&mut ctx, orders, planned_at)
    }

    /// 配载全部订单
    ///
    /// 规则（逐订单,剩余量 > 0 时循环）:
    /// 1) 遍历未满的车列
    /// 2) 禁止多目的地时,跳过已承诺其他目的地的车列
    /// 3) 遍历有余量的车皮,可装量 = min(剩余量, 车皮余量, 吊车能力, 车列余量)
    /// 4) 取车皮余量最大的候选（并列取 rake_id、车皮序号最小者）
    /// 5) 无候选: 允许公路则整单余量转公路; 否则记为不可交付
    /// 6) 有候选: 提交装载并生成明细
    ///
    /// # 参数
    /// - `ctx`: 配载上下文（会被修改）
    /// - `orders`: 已排序订单
    /// - `planned_at`: 计划时刻
    #[instrument(skip(self, ctx, orders), fields(orders_count = orders.len()))]
    pub fn allocate_with_context(
        &self,
        ctx: &mut AllocatorContext<'_>,
        orders: &[Order],
        planned_at: NaiveDateTime,
    ) -> AllocationOutcome {
        let model = ctx.model;
        let mut outcome = AllocationOutcome::default();

        for order in orders {
            let first_item = outcome.items.len();
            let mut remaining = order.quantity_t;
            let platform = model.platform_for(&order.product_type);

            while remaining > CAPACITY_EPSILON {
                let candidate =
                    platform.and_then(|p| self.best_candidate(ctx, order, p, remaining));

                match (candidate, platform) {
                    (Some(candidate), Some(platform)) => {
                        let item = self.commit(ctx, order, platform, candidate, planned_at);
                        remaining -= item.quantity_t;
                        outcome.items.push(item);
                    }
                    _ => {
                        self.handle_no_rail_slot(ctx, order, remaining, planned_at, &mut outcome);
                        remaining = 0.0;
                    }
                }
            }

            let fulfillment = self.summarize_order(order, &outcome, first_item);
            debug!(
                order_id = %order.order_id,
                status = %fulfillment.status,
                rail_t = fulfillment.rail_t,
                road_t = fulfillment.road_t,
                undelivered_t = fulfillment.undelivered_t,
                "订单配载完成"
            );
            outcome.fulfillments.push(fulfillment);
        }

        info!(
            items = outcome.items.len(),
            unallocated = outcome.unallocated.len(),
            "配载计算完成"
        );

        outcome
    }

    /// 全部订单整单走公路（空方案兜底）
    pub fn allocate_all_road(
        &self,
        orders: &[Order],
        planned_at: NaiveDateTime,
    ) -> AllocationOutcome {
        let mut outcome = AllocationOutcome::default();

        for (i, order) in orders.iter().enumerate() {
            let seq_no = (i + 1) as u32;
            let item = self.road_item(
                order,
                order.quantity_t,
                !order.allows_road(),
                seq_no,
                planned_at,
            );
            outcome.fulfillments.push(OrderFulfillment {
                order_id: order.order_id.clone(),
                ordered_t: order.quantity_t,
                rail_t: 0.0,
                road_t: order.quantity_t,
                undelivered_t: 0.0,
                rail_percent: 0.0,
                allocation_count: 1,
                status: FulfillmentStatus::RoadAllocated,
            });
            outcome.items.push(item);
        }

        outcome
    }

    // ==========================================
    // 候选搜索
    // ==========================================

    /// 在全部车列中寻找车皮余量最大的可行落位
    fn best_candidate(
        &self,
        ctx: &AllocatorContext<'_>,
        order: &Order,
        platform: &Platform,
        remaining: f64,
    ) -> Option<Candidate> {
        let model = ctx.model;
        let mut best: Option<Candidate> = None;

        for (slot_pos, slot) in ctx.rake_slots.iter().enumerate() {
            let rake = &model.rakes[slot.rake_idx];
            let rake_spare = rake.total_capacity_t - slot.load_t;
            if rake_spare <= CAPACITY_EPSILON {
                continue;
            }

            // 目的地合并约束
            if !model.constraints.allow_multi_destination
                && !slot.destinations.is_empty()
                && !slot.destinations.contains(&order.destination)
            {
                continue;
            }

            for &wagon_idx in &slot.wagon_idxs {
                let wagon = &model.wagons[wagon_idx];
                let spare_t = wagon.max_capacity_t - ctx.wagon_loads[wagon_idx];
                if spare_t <= CAPACITY_EPSILON {
                    continue;
                }

                let feasible_t = remaining
                    .min(spare_t)
                    .min(platform.crane_capacity_t)
                    .min(rake_spare);
                if feasible_t <= CAPACITY_EPSILON {
                    continue;
                }

                // 严格大于: 并列时保留先遍历到的候选
                if best.map_or(true, |b| spare_t > b.spare_t) {
                    best = Some(Candidate {
                        slot_pos,
                        wagon_idx,
                        spare_t,
                        feasible_t,
                    });
                }
            }
        }

        best
    }

    // ==========================================
    // 提交与明细生成
    // ==========================================

    /// 提交装载并生成铁路明细
    fn commit(
        &self,
        ctx: &mut AllocatorContext<'_>,
        order: &Order,
        platform: &Platform,
        candidate: Candidate,
        planned_at: NaiveDateTime,
    ) -> RakePlanItem {
        let model = ctx.model;
        let quantity_t = candidate.feasible_t;

        ctx.wagon_loads[candidate.wagon_idx] += quantity_t;
        let slot = &mut ctx.rake_slots[candidate.slot_pos];
        slot.load_t += quantity_t;
        slot.destinations.insert(order.destination.clone());
        let rake_load_after_t = slot.load_t;
        let rake = &model.rakes[slot.rake_idx];
        let wagon: &Wagon = &model.wagons[candidate.wagon_idx];

        let eval = self.evaluator.evaluate_rail(
            order,
            quantity_t,
            wagon.max_capacity_t,
            rake_load_after_t,
            rake.total_capacity_t,
            planned_at,
        );
        let explanation = self.explainer.explain_rail(
            order,
            quantity_t,
            rake,
            wagon,
            platform,
            eval.wagon_utilization_pct,
            eval.rake_utilization_pct,
            eval.days_late,
        );

        debug!(
            order_id = %order.order_id,
            rake_id = %rake.rake_id,
            wagon_id = %wagon.wagon_id,
            quantity_t,
            spare_before_t = candidate.spare_t,
            "车皮装载提交"
        );

        RakePlanItem {
            seq_no: ctx.take_seq_no(),
            order_id: order.order_id.clone(),
            customer_name: order.customer_name.clone(),
            destination: order.destination.clone(),
            product_type: order.product_type.clone(),
            priority: order.priority,
            mode: TransportMode::Rail,
            quantity_t,
            rake_id: Some(rake.rake_id.clone()),
            wagon_id: Some(wagon.wagon_id.clone()),
            wagon_index: Some(wagon.index),
            platform_id: Some(platform.platform_id.clone()),
            loading_point: Some(platform.loading_point.clone()),
            crane_id: Some(platform.crane_id.clone()),
            forced_road: false,
            wagon_utilization_pct: eval.wagon_utilization_pct,
            rake_utilization_pct: eval.rake_utilization_pct,
            departure: eval.timing.departure,
            arrival: eval.timing.arrival,
            due_date: order.due_date,
            transit_hours: eval.timing.transit_hours,
            distance_km: order.distance_km,
            days_late: eval.days_late,
            sla_status: eval.sla_status,
            cost: eval.cost,
            explanation,
        }
    }

    /// 无铁路落位: 转公路或记为不可交付
    fn handle_no_rail_slot(
        &self,
        ctx: &mut AllocatorContext<'_>,
        order: &Order,
        remaining: f64,
        planned_at: NaiveDateTime,
        outcome: &mut AllocationOutcome,
    ) {
        let road_last_resort = ctx.model.constraints.road_last_resort;

        if order.allows_road() || road_last_resort {
            let forced = !order.allows_road();
            let seq_no = ctx.take_seq_no();
            if forced {
                warn!(
                    order_id = %order.order_id,
                    remaining_t = remaining,
                    "仅铁路订单无运力, 强制转公路"
                );
            } else {
                info!(order_id = %order.order_id, remaining_t = remaining, "无铁路运力, 余量转公路");
            }
            outcome
                .items
                .push(self.road_item(order, remaining, forced, seq_no, planned_at));
        } else {
            warn!(
                order_id = %order.order_id,
                remaining_t = remaining,
                preferred_mode = %order.preferred_mode,
                "仅铁路订单无运力, 余量不可交付"
            );
            outcome.unallocated.push(UnallocatedOrder {
                order_id: order.order_id.clone(),
                remaining_t: remaining,
                reason: format!(
                    "NO_RAIL_CAPACITY: no feasible rail slot for {:.1}t to {} and preferred mode {} forbids road",
                    remaining, order.destination, order.preferred_mode
                ),
            });
        }
    }

    /// 生成公路明细（整笔,不再拆分）
    fn road_item(
        &self,
        order: &Order,
        quantity_t: f64,
        forced: bool,
        seq_no: u32,
        planned_at: NaiveDateTime,
    ) -> RakePlanItem {
        let eval = self.evaluator.evaluate_road(order, quantity_t, planned_at);
        let explanation = self
            .explainer
            .explain_road(order, quantity_t, eval.days_late, forced);

        RakePlanItem {
            seq_no,
            order_id: order.order_id.clone(),
            customer_name: order.customer_name.clone(),
            destination: order.destination.clone(),
            product_type: order.product_type.clone(),
            priority: order.priority,
            mode: TransportMode::Road,
            quantity_t,
            rake_id: None,
            wagon_id: None,
            wagon_index: None,
            platform_id: None,
            loading_point: None,
            crane_id: None,
            forced_road: forced,
            wagon_utilization_pct: eval.wagon_utilization_pct,
            rake_utilization_pct: eval.rake_utilization_pct,
            departure: eval.timing.departure,
            arrival: eval.timing.arrival,
            due_date: order.due_date,
            transit_hours: eval.timing.transit_hours,
            distance_km: order.distance_km,
            days_late: eval.days_late,
            sla_status: eval.sla_status,
            cost: eval.cost,
            explanation,
        }
    }

    /// 汇总单个订单的履约情况
    fn summarize_order(
        &self,
        order: &Order,
        outcome: &AllocationOutcome,
        first_item: usize,
    ) -> OrderFulfillment {
        let items = &outcome.items[first_item..];
        let rail_t: f64 = items.iter().filter(|i| i.is_rail()).map(|i| i.quantity_t).sum();
        let road_t: f64 = items.iter().filter(|i| !i.is_rail()).map(|i| i.quantity_t).sum();
        let undelivered_t: f64 = outcome
            .unallocated
            .iter()
            .filter(|u| u.order_id == order.order_id)
            .map(|u| u.remaining_t)
            .sum();

        let status = if undelivered_t > CAPACITY_EPSILON {
            FulfillmentStatus::Undeliverable
        } else if rail_t > CAPACITY_EPSILON && road_t > CAPACITY_EPSILON {
            FulfillmentStatus::Mixed
        } else if road_t > CAPACITY_EPSILON {
            FulfillmentStatus::RoadAllocated
        } else if rail_t > CAPACITY_EPSILON {
            FulfillmentStatus::RailAllocated
        } else {
            FulfillmentStatus::Pending
        };

        OrderFulfillment {
            order_id: order.order_id.clone(),
            ordered_t: order.quantity_t,
            rail_t,
            road_t,
            undelivered_t,
            rail_percent: if order.quantity_t > 0.0 {
                rail_t / order.quantity_t * 100.0
            } else {
                0.0
            },
            allocation_count: items.len(),
            status,
        }
    }
}
