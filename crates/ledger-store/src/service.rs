//! 統合庫存服務
//!
//! 對外入口：讀取 → 核對 → 篩選分頁，另提供完整性驗證與交貨進度。

use ledger_calc::{
    DeliveryProgress, IntegrityReport, LedgerWarning, ReconciliationEngine, ReconciliationStats,
    StockDiscrepancy, UnifiedInventory,
};
use ledger_core::{FilterSpec, LedgerConfig, RawSnapshot, UnifiedInventoryRecord};
use serde::Serialize;
use std::sync::Arc;

use crate::fetcher::RecordFetcher;
use crate::store::InventoryStore;

/// 篩選後的一頁統合記錄
#[derive(Debug, Clone, Serialize)]
pub struct UnifiedInventoryView {
    pub records: Vec<UnifiedInventoryRecord>,
    /// 篩選後的總筆數（分頁前）
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub warnings: Vec<LedgerWarning>,
    pub stats: ReconciliationStats,
}

impl UnifiedInventoryView {
    /// 是否以降級模式產生
    pub fn is_degraded(&self) -> bool {
        !(self.stats.accounting_available
            && self.stats.orders_available
            && self.stats.line_items_available)
    }
}

/// 統合庫存服務
pub struct UnifiedInventoryService<S: InventoryStore + ?Sized> {
    store: Arc<S>,
    engine: ReconciliationEngine,
}

impl<S: InventoryStore + ?Sized> UnifiedInventoryService<S> {
    /// 創建服務（配置不合法時回傳錯誤）
    pub fn new(store: Arc<S>, config: LedgerConfig) -> ledger_core::Result<Self> {
        let engine = ReconciliationEngine::new(config)?;
        Ok(Self { store, engine })
    }

    pub fn config(&self) -> &LedgerConfig {
        self.engine.config()
    }

    /// 取得篩選、排序、分頁後的統合記錄
    ///
    /// 與 `load` 後再 `query_snapshot` 的結果相同。
    pub async fn get_unified_inventory(&self, spec: &FilterSpec) -> ledger_core::Result<UnifiedInventoryView> {
        tracing::info!(?spec, "查詢統合庫存");
        let inventory = self.load().await?;
        self.query_snapshot(&inventory, spec)
    }

    /// 讀取並核對完整資料（不套用篩選），供後續多次查詢
    pub async fn load(&self) -> ledger_core::Result<UnifiedInventory> {
        let snapshot = self.fetch().await?;
        Ok(self.engine.reconcile(&snapshot))
    }

    /// 對已載入的核對結果套用篩選
    pub fn query_snapshot(
        &self,
        inventory: &UnifiedInventory,
        spec: &FilterSpec,
    ) -> ledger_core::Result<UnifiedInventoryView> {
        let page = self.engine.query(inventory, spec)?;
        tracing::debug!("篩選結果 {} 筆，回傳第 {} 頁", page.total, page.page);

        Ok(UnifiedInventoryView {
            records: page.items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages,
            warnings: inventory.warnings.clone(),
            stats: inventory.stats.clone(),
        })
    }

    /// 完整性驗證（純計算）
    pub fn validate_integrity(&self, records: &[UnifiedInventoryRecord]) -> IntegrityReport {
        let report = self.engine.validate_integrity(records);
        if !report.inconsistencies.is_empty() {
            tracing::warn!(
                "完整性驗證：一致 {} 筆，不一致 {} 筆",
                report.consistent.len(),
                report.inconsistencies.len()
            );
        }
        report
    }

    /// 各採購單的累計交貨進度
    pub async fn delivery_progress(&self) -> ledger_core::Result<Vec<DeliveryProgress>> {
        let snapshot = self.fetch().await?;
        Ok(self.engine.delivery_progress(&snapshot))
    }

    /// 商品帳面庫存與異動累計的差異
    pub async fn stock_discrepancies(&self) -> ledger_core::Result<Vec<StockDiscrepancy>> {
        let snapshot = self.fetch().await?;
        Ok(self.engine.stock_discrepancies(&snapshot))
    }

    async fn fetch(&self) -> ledger_core::Result<RawSnapshot> {
        RecordFetcher::new(self.store.as_ref(), self.engine.config())
            .fetch_snapshot()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryStore, StoreOperation};
    use chrono::{TimeZone, Utc};
    use ledger_calc::WarningSeverity;
    use ledger_core::{
        AccountingTransaction, DeliveryType, LedgerError, MovementDirection, OrderLineItem,
        PhysicalMovement, Product, PurchaseOrder, RecordType, RecordTypeFilter,
    };
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn store() -> InMemoryStore {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let product = Product::new(Uuid::new_v4(), "六角ボルト", "HB-10").with_current_stock(50);
        let order = PurchaseOrder::new(Uuid::new_v4(), "PO202401010001", Decimal::from(50_000));

        InMemoryStore::new()
            .with_products(vec![product.clone()])
            .with_orders(vec![order.clone()])
            .with_line_items(vec![OrderLineItem::new(order.id, product.id, 10, Decimal::from(5_000))])
            .with_movements(vec![
                PhysicalMovement::new(product.id, MovementDirection::In, 10, Decimal::from(100), t0),
                PhysicalMovement::new(
                    product.id,
                    MovementDirection::Out,
                    3,
                    Decimal::from(100),
                    t0 + chrono::Duration::hours(1),
                ),
            ])
            .with_transactions(vec![
                AccountingTransaction::new(order.id, Decimal::from(30_000), t0 + chrono::Duration::days(1))
                    .with_installment_no(1),
                AccountingTransaction::new(order.id, Decimal::from(20_000), t0 + chrono::Duration::days(2))
                    .with_installment_no(2),
            ])
    }

    #[tokio::test]
    async fn test_get_unified_inventory_merges_sources() {
        let service = UnifiedInventoryService::new(Arc::new(store()), LedgerConfig::new()).unwrap();

        let view = service.get_unified_inventory(&FilterSpec::new()).await.unwrap();

        assert_eq!(view.total, 4);
        assert!(!view.is_degraded());
        // 新到舊：兩筆分納在前
        assert_eq!(view.records[0].record_type(), RecordType::AmountOnlyTransaction);
        assert!(view
            .records
            .iter()
            .filter(|r| r.record_type() == RecordType::AmountOnlyTransaction)
            .all(|r| r.delivery_type() == Some(DeliveryType::Partial)));
    }

    #[tokio::test]
    async fn test_degraded_when_accounting_unavailable() {
        let store = Arc::new(store().failing_on(StoreOperation::Transactions));
        let service = UnifiedInventoryService::new(store, LedgerConfig::new()).unwrap();

        let view = service.get_unified_inventory(&FilterSpec::new()).await.unwrap();

        assert_eq!(view.total, 2);
        assert!(view.records.iter().all(|r| r.is_movement()));
        assert!(view.is_degraded());
        assert!(view
            .warnings
            .iter()
            .any(|w| w.component == "fetcher" && w.severity == WarningSeverity::Error));
    }

    #[tokio::test]
    async fn test_product_failure_is_fatal() {
        let store = Arc::new(store().failing_on(StoreOperation::Products));
        let service = UnifiedInventoryService::new(store, LedgerConfig::new()).unwrap();

        let result = service.get_unified_inventory(&FilterSpec::new()).await;

        assert!(matches!(result, Err(LedgerError::FetchFailed { source_name: "products", .. })));
    }

    #[tokio::test]
    async fn test_load_then_query_without_refetch() {
        let store = Arc::new(store());
        let service = UnifiedInventoryService::new(store.clone(), LedgerConfig::new()).unwrap();

        let inventory = service.load().await.unwrap();
        let movements = service
            .query_snapshot(
                &inventory,
                &FilterSpec::new().with_record_type(RecordTypeFilter::InventoryMovement),
            )
            .unwrap();
        let installments = service
            .query_snapshot(&inventory, &FilterSpec::new().with_installment_no("2"))
            .unwrap();

        assert_eq!(movements.total, 2);
        assert_eq!(installments.total, 1);
        assert_eq!(store.call_counts().movements, 1);
    }

    #[tokio::test]
    async fn test_direct_and_cached_queries_agree() {
        // 分納在範圍外（1/2），連結它的入庫在範圍內（1/3）
        let jst = chrono::FixedOffset::east_opt(9 * 3600).unwrap();
        let product = Product::new(Uuid::new_v4(), "六角ボルト", "HB-10");
        let order = PurchaseOrder::new(Uuid::new_v4(), "PO202401010001", Decimal::from(50_000));
        let installment = AccountingTransaction::new(
            order.id,
            Decimal::from(30_000),
            jst.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap().with_timezone(&Utc),
        )
        .with_installment_no(1);
        let receipt = PhysicalMovement::new(
            product.id,
            MovementDirection::In,
            6,
            Decimal::from(5_000),
            jst.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap().with_timezone(&Utc),
        )
        .with_linked_transaction(installment.id);

        let store = InMemoryStore::new()
            .with_products(vec![product.clone()])
            .with_orders(vec![order.clone()])
            .with_line_items(vec![OrderLineItem::new(order.id, product.id, 10, Decimal::from(5_000))])
            .with_movements(vec![receipt.clone()])
            .with_transactions(vec![installment]);
        let service = UnifiedInventoryService::new(Arc::new(store), LedgerConfig::new()).unwrap();
        let spec = FilterSpec::new()
            .with_date_range(chrono::NaiveDate::from_ymd_opt(2024, 1, 3), None)
            .with_installment_no("1");

        let direct = service.get_unified_inventory(&spec).await.unwrap();
        let inventory = service.load().await.unwrap();
        let cached = service.query_snapshot(&inventory, &spec).unwrap();

        assert_eq!(direct.total, 1);
        assert_eq!(direct.records, cached.records);
        assert_eq!(direct.records[0].id, receipt.id);
        assert_eq!(direct.records[0].installment_no(), Some(1));
    }

    #[tokio::test]
    async fn test_delivery_progress_and_discrepancies() {
        let service = UnifiedInventoryService::new(Arc::new(store()), LedgerConfig::new()).unwrap();

        let progress = service.delivery_progress().await.unwrap();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].delivered_total, Decimal::from(50_000));
        assert_eq!(progress[0].remaining, Some(Decimal::ZERO));

        // 帳面 50，異動累計 7
        let discrepancies = service.stock_discrepancies().await.unwrap();
        assert_eq!(discrepancies.len(), 1);
        assert_eq!(discrepancies[0].computed_stock, 7);
    }

    #[tokio::test]
    async fn test_validate_integrity_splits_records() {
        let service = UnifiedInventoryService::new(Arc::new(store()), LedgerConfig::new()).unwrap();
        let inventory = service.load().await.unwrap();

        let report = service.validate_integrity(&inventory.records);

        assert_eq!(report.total(), inventory.records.len());
        assert!(report.inconsistencies.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LedgerConfig::new().with_utc_offset_minutes(24 * 60);
        let result = UnifiedInventoryService::new(Arc::new(InMemoryStore::new()), config);
        assert!(result.is_err());
    }
}
