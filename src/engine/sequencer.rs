// ==========================================
// 铁路车皮配载系统 - 订单排序引擎
// ==========================================
// 职责: 确定订单进入配载的先后顺序
// 输入: 有效订单列表
// 输出: 排序后的订单列表
// 红线: 每次计算只排序一次,配载过程中不重排、不回溯
// ==========================================

use crate::domain::order::Order;
use std::cmp::Ordering;

// ==========================================
// OrderSequencer - 订单排序引擎
// ==========================================
pub struct OrderSequencer {
    // 无状态引擎,不需要注入依赖
}

impl OrderSequencer {
    pub fn new() -> Self {
        Self {}
    }

    /// 排序订单列表
    ///
    /// 排序键:
    /// 1) 优先级秩升序 (High=1, Medium=2, Low=3)
    /// 2) 交货期升序
    ///
    /// 稳定排序: 两键均相同时保持输入顺序
    pub fn sort(&self, mut orders: Vec<Order>) -> Vec<Order> {
        orders.sort_by(|a, b| self.compare(a, b));
        orders
    }

    /// 比较两个订单的先后
    ///
    /// # 返回
    /// Ordering::Less 表示 a 先于 b
    pub fn compare(&self, a: &Order, b: &Order) -> Ordering {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| a.due_date.cmp(&b.due_date))
    }
}

impl Default for OrderSequencer {
    fn default() -> Self {
        Self::new()
    }
}
