//! 資料來源介面

use async_trait::async_trait;
use ledger_core::{AccountingTransaction, OrderLineItem, PhysicalMovement, Product, PurchaseOrder};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::query::{MovementQuery, TransactionQuery};

/// 庫存資料來源
///
/// 以 ID 查詢的方法一律接收整批 ID，呼叫端不得逐筆查詢。
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// 查詢實體異動
    async fn query_physical_movements(&self, query: &MovementQuery) -> StoreResult<Vec<PhysicalMovement>>;

    /// 查詢會計交易
    async fn query_accounting_transactions(
        &self,
        query: &TransactionQuery,
    ) -> StoreResult<Vec<AccountingTransaction>>;

    /// 批次查詢商品
    async fn query_products_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>>;

    /// 批次查詢採購單
    async fn query_orders_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<PurchaseOrder>>;

    /// 批次查詢採購單明細
    async fn query_order_line_items_by_order_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<OrderLineItem>>;
}
