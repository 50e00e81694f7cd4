//! 記錄正規化：把兩種來源轉成統合記錄並套用合併規則

use ledger_core::{
    AccountingTransaction, DeliveryType, MovementDetails, OrderLineItem, PhysicalMovement,
    Product, RawSnapshot, RecordKind, TransactionDetails, UnifiedInventoryRecord,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

/// 正規化結果
#[derive(Debug, Clone)]
pub struct NormalizedRecords {
    /// 通過合併規則的記錄（輸入順序：異動在前、交易在後）
    pub records: Vec<UnifiedInventoryRecord>,
    /// 因商品無法解析而排除的異動ID
    pub dropped_movements: Vec<Uuid>,
    /// 因商品無法解析且金額非正而排除的交易ID
    pub dropped_transactions: Vec<Uuid>,
}

/// 記錄正規化器
pub struct RecordNormalizer;

impl RecordNormalizer {
    /// 正規化整份快照
    ///
    /// 分納分類由 [`crate::DeliveryClassifier::decorate`] 之後填入，此處先以
    /// `AmountOnly` 建立。
    pub fn normalize(snapshot: &RawSnapshot) -> NormalizedRecords {
        let installment_by_transaction: HashMap<Uuid, i32> = snapshot
            .transactions
            .iter()
            .filter_map(|tx| tx.installment_no.map(|no| (tx.id, no)))
            .collect();

        let mut records = Vec::with_capacity(snapshot.movements.len() + snapshot.transactions.len());
        let mut dropped_movements = Vec::new();
        let mut dropped_transactions = Vec::new();

        for movement in &snapshot.movements {
            let record = Self::normalize_movement(movement, &snapshot.products, &installment_by_transaction);
            if Self::should_keep(&record) {
                records.push(record);
            } else {
                tracing::warn!(
                    movement_id = %movement.id,
                    product_id = %movement.product_id,
                    "異動的商品無法解析，已排除"
                );
                dropped_movements.push(movement.id);
            }
        }

        for transaction in &snapshot.transactions {
            let record = Self::normalize_transaction(
                transaction,
                &snapshot.orders,
                &snapshot.line_items,
                &snapshot.products,
            );
            if Self::should_keep(&record) {
                records.push(record);
            } else {
                tracing::warn!(
                    transaction_id = %transaction.id,
                    "交易無商品且金額非正，已排除"
                );
                dropped_transactions.push(transaction.id);
            }
        }

        NormalizedRecords {
            records,
            dropped_movements,
            dropped_transactions,
        }
    }

    /// 實體異動 → 統合記錄
    pub fn normalize_movement(
        movement: &PhysicalMovement,
        products: &HashMap<Uuid, Product>,
        installment_by_transaction: &HashMap<Uuid, i32>,
    ) -> UnifiedInventoryRecord {
        let linked_installment_no = movement
            .linked_transaction_id
            .and_then(|id| installment_by_transaction.get(&id).copied());

        UnifiedInventoryRecord {
            id: movement.id,
            unified_timestamp: ledger_core::epoch_millis(&movement.created_at),
            created_at: movement.created_at,
            total_amount: movement.total_amount,
            memo: movement.memo.clone(),
            product: products.get(&movement.product_id).map(Product::snapshot),
            data_integrity_status: None,
            kind: RecordKind::InventoryMovement(MovementDetails {
                direction: movement.direction,
                quantity: movement.quantity,
                unit_price: movement.unit_price,
                cumulative_stock_at_time: None,
                linked_transaction_id: movement.linked_transaction_id,
                linked_delivery_date: movement.linked_delivery_date,
                linked_installment_no,
            }),
        }
    }

    /// 會計交易 → 統合記錄（商品取採購單的代表商品）
    pub fn normalize_transaction(
        transaction: &AccountingTransaction,
        orders: &HashMap<Uuid, ledger_core::PurchaseOrder>,
        line_items: &HashMap<Uuid, Vec<OrderLineItem>>,
        products: &HashMap<Uuid, Product>,
    ) -> UnifiedInventoryRecord {
        let order = transaction.parent_order_id.and_then(|id| orders.get(&id));

        let product = order
            .and_then(|order| line_items.get(&order.id))
            .and_then(|items| Self::primary_line_item(items))
            .and_then(|item| products.get(&item.product_id))
            .map(Product::snapshot);

        UnifiedInventoryRecord {
            id: transaction.id,
            unified_timestamp: ledger_core::epoch_millis(&transaction.created_at),
            created_at: transaction.created_at,
            total_amount: transaction.total_amount,
            memo: transaction.memo.clone(),
            product,
            data_integrity_status: None,
            kind: RecordKind::AmountOnlyTransaction(TransactionDetails {
                order_id: transaction.parent_order_id,
                order_no: order.map(|o| o.order_no.clone()),
                installment_no: transaction.installment_no,
                accounting_amount: transaction.total_amount,
                transaction_no: transaction.transaction_no.clone(),
                delivery_type: DeliveryType::AmountOnly,
                requires_review: false,
            }),
        }
    }

    /// 代表商品：數量 × 單價最大的明細，同額取先出現者
    pub fn primary_line_item(items: &[OrderLineItem]) -> Option<&OrderLineItem> {
        let mut best: Option<&OrderLineItem> = None;
        for item in items {
            match best {
                Some(current) if item.line_total() <= current.line_total() => {}
                _ => best = Some(item),
            }
        }
        best
    }

    /// 合併規則：有商品，或是金額為正的分納交易
    ///
    /// 分納交易在整張採購單層級仍有意義；實體異動沒有商品則屬資料錯誤。
    pub fn should_keep(record: &UnifiedInventoryRecord) -> bool {
        if record.product.is_some() {
            return true;
        }
        match &record.kind {
            RecordKind::InventoryMovement(_) => false,
            RecordKind::AmountOnlyTransaction(_) => record.total_amount > Decimal::ZERO,
        }
    }
}
