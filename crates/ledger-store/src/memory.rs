//! 記憶體資料來源
//!
//! 用於測試與離線核對，可注入失敗與延遲，並記錄各查詢的呼叫次數。

use async_trait::async_trait;
use ledger_core::{AccountingTransaction, OrderLineItem, PhysicalMovement, Product, PurchaseOrder};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::query::{MovementQuery, TransactionQuery};
use crate::store::InventoryStore;

/// 資料來源操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Movements,
    Transactions,
    Products,
    Orders,
    LineItems,
}

/// 各操作的呼叫次數
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub movements: usize,
    pub transactions: usize,
    pub products: usize,
    pub orders: usize,
    pub line_items: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.movements + self.transactions + self.products + self.orders + self.line_items
    }
}

#[derive(Debug, Default)]
struct Counters {
    movements: AtomicUsize,
    transactions: AtomicUsize,
    products: AtomicUsize,
    orders: AtomicUsize,
    line_items: AtomicUsize,
}

/// 記憶體資料來源
#[derive(Debug, Default)]
pub struct InMemoryStore {
    movements: Vec<PhysicalMovement>,
    transactions: Vec<AccountingTransaction>,
    products: Vec<Product>,
    orders: Vec<PurchaseOrder>,
    line_items: Vec<OrderLineItem>,
    failures: HashSet<StoreOperation>,
    transaction_delay: Option<Duration>,
    counters: Counters,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_movements(mut self, movements: Vec<PhysicalMovement>) -> Self {
        self.movements = movements;
        self
    }

    pub fn with_transactions(mut self, transactions: Vec<AccountingTransaction>) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    pub fn with_orders(mut self, orders: Vec<PurchaseOrder>) -> Self {
        self.orders = orders;
        self
    }

    pub fn with_line_items(mut self, items: Vec<OrderLineItem>) -> Self {
        self.line_items = items;
        self
    }

    /// 指定操作一律回傳錯誤
    pub fn failing_on(mut self, operation: StoreOperation) -> Self {
        self.failures.insert(operation);
        self
    }

    /// 會計交易查詢延遲回應
    pub fn with_transaction_delay(mut self, delay: Duration) -> Self {
        self.transaction_delay = Some(delay);
        self
    }

    /// 目前的呼叫次數
    pub fn call_counts(&self) -> CallCounts {
        CallCounts {
            movements: self.counters.movements.load(Ordering::Relaxed),
            transactions: self.counters.transactions.load(Ordering::Relaxed),
            products: self.counters.products.load(Ordering::Relaxed),
            orders: self.counters.orders.load(Ordering::Relaxed),
            line_items: self.counters.line_items.load(Ordering::Relaxed),
        }
    }

    fn record_call(&self, operation: StoreOperation) -> StoreResult<()> {
        let counter = match operation {
            StoreOperation::Movements => &self.counters.movements,
            StoreOperation::Transactions => &self.counters.transactions,
            StoreOperation::Products => &self.counters.products,
            StoreOperation::Orders => &self.counters.orders,
            StoreOperation::LineItems => &self.counters.line_items,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if self.failures.contains(&operation) {
            return Err(StoreError::Unavailable(format!("{operation:?} 已設定為失敗")));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for InMemoryStore {
    async fn query_physical_movements(&self, query: &MovementQuery) -> StoreResult<Vec<PhysicalMovement>> {
        self.record_call(StoreOperation::Movements)?;
        Ok(self
            .movements
            .iter()
            .filter(|m| query.contains(&m.created_at))
            .filter(|m| query.direction.map_or(true, |d| m.direction == Some(d)))
            .cloned()
            .collect())
    }

    async fn query_accounting_transactions(
        &self,
        query: &TransactionQuery,
    ) -> StoreResult<Vec<AccountingTransaction>> {
        self.record_call(StoreOperation::Transactions)?;
        if let Some(delay) = self.transaction_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .transactions
            .iter()
            .filter(|tx| tx.kind == query.kind && tx.status == query.status)
            .filter(|tx| query.contains(&tx.created_at))
            .cloned()
            .collect())
    }

    async fn query_products_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>> {
        self.record_call(StoreOperation::Products)?;
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        Ok(self.products.iter().filter(|p| wanted.contains(&p.id)).cloned().collect())
    }

    async fn query_orders_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<PurchaseOrder>> {
        self.record_call(StoreOperation::Orders)?;
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        Ok(self.orders.iter().filter(|o| wanted.contains(&o.id)).cloned().collect())
    }

    async fn query_order_line_items_by_order_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<OrderLineItem>> {
        self.record_call(StoreOperation::LineItems)?;
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        Ok(self
            .line_items
            .iter()
            .filter(|item| wanted.contains(&item.order_id))
            .cloned()
            .collect())
    }
}
