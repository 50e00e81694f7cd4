//! 從資料來源讀取、尚未合併的原始資料

use std::collections::HashMap;
use uuid::Uuid;

use crate::movement::PhysicalMovement;
use crate::order::{OrderLineItem, PurchaseOrder};
use crate::product::Product;
use crate::transaction::AccountingTransaction;

/// 原始資料快照
///
/// `*_available` 為 false 表示該部分讀取失敗、以空集合降級處理。
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    pub movements: Vec<PhysicalMovement>,
    pub transactions: Vec<AccountingTransaction>,
    pub products: HashMap<Uuid, Product>,
    pub orders: HashMap<Uuid, PurchaseOrder>,
    /// 依採購單分組的明細（保留讀取順序）
    pub line_items: HashMap<Uuid, Vec<OrderLineItem>>,
    pub accounting_available: bool,
    pub orders_available: bool,
    pub line_items_available: bool,
}

impl RawSnapshot {
    /// 創建空快照
    pub fn empty() -> Self {
        Self {
            movements: Vec::new(),
            transactions: Vec::new(),
            products: HashMap::new(),
            orders: HashMap::new(),
            line_items: HashMap::new(),
            accounting_available: true,
            orders_available: true,
            line_items_available: true,
        }
    }

    /// 建構器模式：設置實體異動
    pub fn with_movements(mut self, movements: Vec<PhysicalMovement>) -> Self {
        self.movements = movements;
        self
    }

    /// 建構器模式：設置會計交易
    pub fn with_transactions(mut self, transactions: Vec<AccountingTransaction>) -> Self {
        self.transactions = transactions;
        self
    }

    /// 建構器模式：設置商品
    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products.into_iter().map(|p| (p.id, p)).collect();
        self
    }

    /// 建構器模式：設置採購單
    pub fn with_orders(mut self, orders: Vec<PurchaseOrder>) -> Self {
        self.orders = orders.into_iter().map(|o| (o.id, o)).collect();
        self
    }

    /// 建構器模式：設置明細
    pub fn with_line_items(mut self, items: Vec<OrderLineItem>) -> Self {
        self.line_items = group_line_items(items);
        self
    }

    /// 標記會計交易讀取失敗
    pub fn without_accounting(mut self) -> Self {
        self.transactions.clear();
        self.accounting_available = false;
        self
    }

    /// 是否有任何部分降級
    pub fn is_degraded(&self) -> bool {
        !(self.accounting_available && self.orders_available && self.line_items_available)
    }
}

/// 依採購單分組明細，組內保持原順序
pub fn group_line_items(items: Vec<OrderLineItem>) -> HashMap<Uuid, Vec<OrderLineItem>> {
    let mut grouped: HashMap<Uuid, Vec<OrderLineItem>> = HashMap::new();
    for item in items {
        grouped.entry(item.order_id).or_default().push(item);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_group_line_items_keeps_order() {
        let order_id = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let items = vec![
            OrderLineItem::new(order_id, first, 1, Decimal::ONE),
            OrderLineItem::new(Uuid::new_v4(), Uuid::new_v4(), 1, Decimal::ONE),
            OrderLineItem::new(order_id, second, 1, Decimal::ONE),
        ];

        let grouped = group_line_items(items);
        let lines = &grouped[&order_id];
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_id, first);
        assert_eq!(lines[1].product_id, second);
    }

    #[test]
    fn test_degraded_flags() {
        let snapshot = RawSnapshot::empty();
        assert!(!snapshot.is_degraded());
        assert!(snapshot.without_accounting().is_degraded());
    }
}
