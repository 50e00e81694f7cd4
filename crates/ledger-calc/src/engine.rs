//! 核對主流程

use ledger_core::{
    FilterSpec, LedgerConfig, PagedResult, PurchaseOrder, RawSnapshot, SortField, SortOrder,
    UnifiedInventoryRecord,
};

use crate::classifier::{DeliveryClassifier, DeliveryProgress};
use crate::filtering::FilterEngine;
use crate::integrity::{IntegrityReport, IntegrityValidator, StockDiscrepancy};
use crate::normalizer::RecordNormalizer;
use crate::running_stock::RunningStockCalculator;
use crate::{LedgerWarning, ReconciliationStats, UnifiedInventory};

/// 核對引擎（無狀態，同樣輸入得到同樣輸出）
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    config: LedgerConfig,
}

impl ReconciliationEngine {
    /// 創建新的核對引擎
    pub fn new(config: LedgerConfig) -> ledger_core::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 主核對入口：正規化 → 分類 → 合併 → 累計庫存
    pub fn reconcile(&self, snapshot: &RawSnapshot) -> UnifiedInventory {
        tracing::info!(
            "開始核對：異動 {} 筆，分納交易 {} 筆，商品 {} 筆，採購單 {} 筆",
            snapshot.movements.len(),
            snapshot.transactions.len(),
            snapshot.products.len(),
            snapshot.orders.len()
        );

        let start_time = std::time::Instant::now();
        let mut result = UnifiedInventory::empty();

        // Step 1: 正規化與合併規則
        tracing::debug!("Step 1: 正規化");
        let normalized = RecordNormalizer::normalize(snapshot);
        let mut records = normalized.records;

        if !normalized.dropped_movements.is_empty() {
            result.add_warning(LedgerWarning::warning(
                "normalizer",
                format!(
                    "{} 筆異動的商品無法解析，已排除",
                    normalized.dropped_movements.len()
                ),
            ));
        }
        if !normalized.dropped_transactions.is_empty() {
            result.add_warning(LedgerWarning::info(
                "normalizer",
                format!(
                    "{} 筆分納交易無商品且金額非正，已排除",
                    normalized.dropped_transactions.len()
                ),
            ));
        }

        // Step 2: 全納／分納分類
        tracing::debug!("Step 2: 交貨分類");
        let review_count = DeliveryClassifier::decorate(&mut records, &snapshot.orders, &self.config);
        if review_count > 0 {
            result.add_warning(LedgerWarning::warning(
                "classifier",
                format!("{review_count} 筆分納的採購單總額缺漏，需確認"),
            ));
        }

        // Step 3: 累計庫存（使用完整異動歷史，包含被排除的異動）
        tracing::debug!("Step 3: 累計庫存");
        let balances = RunningStockCalculator::balance_map(&snapshot.movements);
        let applied = RunningStockCalculator::apply(&mut records, &balances);
        tracing::debug!("累計庫存寫入 {} 筆", applied);

        // Step 4: 依時間新到舊
        FilterEngine::sort(&mut records, SortField::CreatedAt, SortOrder::Desc);

        let movements_kept = records.iter().filter(|r| r.is_movement()).count();
        let transactions_kept = records.len() - movements_kept;

        if !snapshot.accounting_available {
            result.add_warning(LedgerWarning::error(
                "fetcher",
                "無法讀取會計交易，僅顯示實體異動",
            ));
        }
        if !snapshot.orders_available {
            result.add_warning(LedgerWarning::warning("fetcher", "無法讀取採購單，分類資訊不完整"));
        }
        if !snapshot.line_items_available {
            result.add_warning(LedgerWarning::warning("fetcher", "無法讀取採購單明細，分納無代表商品"));
        }

        result.stats = ReconciliationStats {
            movements_fetched: snapshot.movements.len(),
            transactions_fetched: snapshot.transactions.len(),
            movements_kept,
            transactions_kept,
            movements_dropped: normalized.dropped_movements.len(),
            transactions_dropped: normalized.dropped_transactions.len(),
            accounting_available: snapshot.accounting_available,
            orders_available: snapshot.orders_available,
            line_items_available: snapshot.line_items_available,
            calculation_time_ms: Some(start_time.elapsed().as_millis()),
        };
        result.records = records;

        tracing::info!("核對完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "統合記錄數量: {}（異動 {}，分納 {}）",
            result.records.len(),
            movements_kept,
            transactions_kept
        );

        result
    }

    /// 對既有核對結果套用篩選（不重新讀取）
    pub fn query(
        &self,
        inventory: &UnifiedInventory,
        spec: &FilterSpec,
    ) -> ledger_core::Result<PagedResult<UnifiedInventoryRecord>> {
        FilterEngine::apply(&inventory.records, spec, &self.config)
    }

    /// 完整性驗證
    pub fn validate_integrity(&self, records: &[UnifiedInventoryRecord]) -> IntegrityReport {
        IntegrityValidator::validate(records)
    }

    /// 各採購單的累計交貨進度（依採購單號排序）
    pub fn delivery_progress(&self, snapshot: &RawSnapshot) -> Vec<DeliveryProgress> {
        let mut orders: Vec<&PurchaseOrder> = snapshot.orders.values().collect();
        orders.sort_by(|a, b| a.order_no.cmp(&b.order_no).then_with(|| a.id.cmp(&b.id)));

        orders
            .into_iter()
            .map(|order| DeliveryClassifier::delivery_progress(order, &snapshot.transactions, &self.config))
            .collect()
    }

    /// 商品帳面庫存與異動累計的差異
    pub fn stock_discrepancies(&self, snapshot: &RawSnapshot) -> Vec<StockDiscrepancy> {
        let closing = RunningStockCalculator::final_balances(&snapshot.movements);
        IntegrityValidator::check_stock_levels(&snapshot.products, &closing, &self.config)
    }

    /// 獲取配置引用
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use ledger_core::{
        AccountingTransaction, DeliveryType, MovementDirection, OrderLineItem, PhysicalMovement,
        Product, RecordType,
    };
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn engine() -> ReconciliationEngine {
        ReconciliationEngine::new(LedgerConfig::new()).unwrap()
    }

    fn fixture() -> (RawSnapshot, Product, PurchaseOrder) {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let product = Product::new(Uuid::new_v4(), "ボルト", "BLT-01").with_current_stock(12);
        let order = PurchaseOrder::new(Uuid::new_v4(), "PO202401010001", Decimal::from(50_000));

        let tx1 = AccountingTransaction::new(order.id, Decimal::from(30_000), t0 + Duration::hours(4))
            .with_installment_no(1);
        let tx2 = AccountingTransaction::new(order.id, Decimal::from(20_000), t0 + Duration::hours(5))
            .with_installment_no(2);

        let movements = vec![
            PhysicalMovement::new(product.id, MovementDirection::In, 10, Decimal::from(100), t0 + Duration::hours(1)),
            PhysicalMovement::new(product.id, MovementDirection::Out, 3, Decimal::from(100), t0 + Duration::hours(2)),
            PhysicalMovement::new(product.id, MovementDirection::In, 5, Decimal::from(100), t0 + Duration::hours(3))
                .with_linked_transaction(tx1.id),
            // 商品不存在的異動
            PhysicalMovement::new(Uuid::new_v4(), MovementDirection::In, 1, Decimal::ONE, t0),
        ];

        let snapshot = RawSnapshot::empty()
            .with_movements(movements)
            .with_transactions(vec![tx1, tx2])
            .with_products(vec![product.clone()])
            .with_orders(vec![order.clone()])
            .with_line_items(vec![OrderLineItem::new(order.id, product.id, 500, Decimal::from(100))]);

        (snapshot, product, order)
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = LedgerConfig::new().with_full_delivery_tolerance(Decimal::from(-1));
        assert!(ReconciliationEngine::new(config).is_err());
    }

    #[test]
    fn test_reconcile_pipeline() {
        let (snapshot, _, _) = fixture();
        let result = engine().reconcile(&snapshot);

        assert_eq!(result.records.len(), 5);
        assert_eq!(result.stats.movements_dropped, 1);
        assert_eq!(result.stats.movements_kept, 3);
        assert_eq!(result.stats.transactions_kept, 2);
        assert!(!result.is_degraded());

        // 新到舊
        let timestamps: Vec<i64> = result.records.iter().map(|r| r.unified_timestamp).collect();
        assert!(timestamps.windows(2).all(|w| w[0] >= w[1]));

        let cumulative: Vec<i64> = result
            .records
            .iter()
            .filter_map(|r| r.cumulative_stock_at_time())
            .collect();
        assert_eq!(cumulative, vec![12, 7, 10]);

        let deliveries: Vec<DeliveryType> =
            result.records.iter().filter_map(|r| r.delivery_type()).collect();
        assert_eq!(deliveries, vec![DeliveryType::Partial, DeliveryType::Partial]);

        let linked = result
            .records
            .iter()
            .find(|r| r.is_movement() && r.installment_no().is_some())
            .unwrap();
        assert_eq!(linked.installment_no(), Some(1));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let (snapshot, _, _) = fixture();
        let engine = engine();
        let first = engine.reconcile(&snapshot);
        let second = engine.reconcile(&snapshot);
        assert_eq!(first.records, second.records);
    }

    #[test]
    fn test_degraded_snapshot() {
        let (snapshot, _, _) = fixture();
        let result = engine().reconcile(&snapshot.without_accounting());

        assert!(result.is_degraded());
        assert!(result.records.iter().all(|r| r.record_type() == RecordType::InventoryMovement));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.component == "fetcher" && w.severity == crate::WarningSeverity::Error));
    }

    #[test]
    fn test_query_reuses_reconciled_records() {
        let (snapshot, _, _) = fixture();
        let engine = engine();
        let result = engine.reconcile(&snapshot);

        let page = engine
            .query(&result, &FilterSpec::new().with_search_term("分納"))
            .unwrap();
        assert_eq!(page.total, 2);

        let page = engine.query(&result, &FilterSpec::new()).unwrap();
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_delivery_progress_and_stock_check() {
        let (snapshot, _, order) = fixture();
        let engine = engine();

        let progress = engine.delivery_progress(&snapshot);
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].order_id, order.id);
        assert_eq!(progress[0].ratio, Some(Decimal::ONE));

        // 帳面 12 與期末累計 12 一致
        assert!(engine.stock_discrepancies(&snapshot).is_empty());
    }
}
