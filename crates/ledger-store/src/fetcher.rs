//! 記錄讀取
//!
//! 兩個主要來源同時讀取；兩者都完成後才收集 ID，每種關聯實體只發一次批次查詢。
//! 實體異動或商品讀取失敗為致命錯誤，其餘讀取失敗以空集合降級。

use ledger_core::snapshot::group_line_items;
use ledger_core::{
    AccountingTransaction, LedgerConfig, LedgerError, OrderLineItem, PhysicalMovement,
    Product, PurchaseOrder, RawSnapshot,
};
use std::collections::BTreeSet;
use std::time::Duration;
use uuid::Uuid;

use crate::query::{MovementQuery, TransactionQuery};
use crate::store::InventoryStore;

/// 記錄讀取器
pub struct RecordFetcher<'a, S: InventoryStore + ?Sized> {
    store: &'a S,
    config: &'a LedgerConfig,
}

impl<'a, S: InventoryStore + ?Sized> RecordFetcher<'a, S> {
    pub fn new(store: &'a S, config: &'a LedgerConfig) -> Self {
        Self { store, config }
    }

    /// 讀取實體異動（失敗為致命錯誤）
    pub async fn fetch_physical_movements(
        &self,
        query: &MovementQuery,
    ) -> ledger_core::Result<Vec<PhysicalMovement>> {
        self.store.query_physical_movements(query).await.map_err(|e| {
            tracing::error!(error = %e, "讀取實體異動失敗");
            LedgerError::FetchFailed {
                source_name: "physical_movements",
                message: e.to_string(),
            }
        })
    }

    /// 讀取已確認的採購分納交易（含逾時）
    ///
    /// 回傳錯誤時由呼叫端記錄並以空集合繼續。
    pub async fn fetch_accounting_transactions(
        &self,
        query: &TransactionQuery,
    ) -> ledger_core::Result<Vec<AccountingTransaction>> {
        let millis = self.config.accounting_fetch_timeout_ms;
        let fetched = tokio::time::timeout(
            Duration::from_millis(millis),
            self.store.query_accounting_transactions(query),
        )
        .await
        .map_err(|_| LedgerError::Timeout {
            source_name: "accounting_transactions",
            millis,
        })?
        .map_err(|e| LedgerError::FetchFailed {
            source_name: "accounting_transactions",
            message: e.to_string(),
        })?;

        // 資料來源未必套用條件，這裡再過濾一次
        Ok(fetched
            .into_iter()
            .filter(|tx| tx.is_confirmed_purchase() && query.contains(&tx.created_at))
            .collect())
    }

    /// 讀取整份快照
    ///
    /// 兩個來源都讀取完整歷史：累計庫存與異動的分納序號都依賴範圍外的資料，
    /// 日期範圍只在篩選時套用。
    pub async fn fetch_snapshot(&self) -> ledger_core::Result<RawSnapshot> {
        let movement_query = MovementQuery::all();
        let transaction_query = TransactionQuery::confirmed_purchases();

        // fan-out：兩個來源互不相依
        let (movements, transactions) = tokio::join!(
            self.fetch_physical_movements(&movement_query),
            self.fetch_accounting_transactions(&transaction_query),
        );

        // fan-in：兩者都完成後才繼續
        let movements = movements?;
        let (transactions, accounting_available) = match transactions {
            Ok(transactions) => (transactions, true),
            Err(e) => {
                tracing::warn!(error = %e, "讀取會計交易失敗，僅使用實體異動");
                (Vec::new(), false)
            }
        };

        tracing::debug!(
            "讀取完成：異動 {} 筆，分納交易 {} 筆",
            movements.len(),
            transactions.len()
        );

        let order_ids: Vec<Uuid> = distinct(transactions.iter().filter_map(|tx| tx.parent_order_id));

        let (orders, line_items) = tokio::join!(
            self.lookup_orders(&order_ids),
            self.lookup_line_items(&order_ids),
        );
        let (orders, orders_available) = orders;
        let (line_items, line_items_available) = line_items;

        let product_ids: Vec<Uuid> = distinct(
            movements
                .iter()
                .map(|m| m.product_id)
                .chain(line_items.iter().map(|item| item.product_id)),
        );
        let products = self.lookup_products(&product_ids).await?;

        Ok(RawSnapshot {
            movements,
            transactions,
            products: products.into_iter().map(|p| (p.id, p)).collect(),
            orders: orders.into_iter().map(|o| (o.id, o)).collect(),
            line_items: group_line_items(line_items),
            accounting_available,
            orders_available,
            line_items_available,
        })
    }

    /// 批次查詢商品（失敗為致命錯誤）
    async fn lookup_products(&self, ids: &[Uuid]) -> ledger_core::Result<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.store.query_products_by_ids(ids).await.map_err(|e| {
            tracing::error!(error = %e, count = ids.len(), "批次查詢商品失敗");
            LedgerError::FetchFailed {
                source_name: "products",
                message: e.to_string(),
            }
        })
    }

    /// 批次查詢採購單（失敗時降級）
    async fn lookup_orders(&self, ids: &[Uuid]) -> (Vec<PurchaseOrder>, bool) {
        if ids.is_empty() {
            return (Vec::new(), true);
        }
        match self.store.query_orders_by_ids(ids).await {
            Ok(orders) => (orders, true),
            Err(e) => {
                tracing::warn!(error = %e, count = ids.len(), "批次查詢採購單失敗，分類資訊將缺漏");
                (Vec::new(), false)
            }
        }
    }

    /// 批次查詢採購單明細（失敗時降級）
    async fn lookup_line_items(&self, ids: &[Uuid]) -> (Vec<OrderLineItem>, bool) {
        if ids.is_empty() {
            return (Vec::new(), true);
        }
        match self.store.query_order_line_items_by_order_ids(ids).await {
            Ok(items) => (items, true),
            Err(e) => {
                tracing::warn!(error = %e, count = ids.len(), "批次查詢採購單明細失敗，分納將無代表商品");
                (Vec::new(), false)
            }
        }
    }
}

/// 單次掃描收集不重複的 ID（排序後輸出，確保查詢參數穩定）
fn distinct(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    ids.collect::<BTreeSet<Uuid>>().into_iter().collect()
}
