//! 統合庫存記錄
//!
//! 把實體庫存異動與只有金額的分納交易合併成同一個形狀。兩種來源以
//! [`RecordKind`] 區分，所有使用端（篩選、排序、驗證）都以 `match` 窮舉處理。

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::movement::MovementDirection;
use crate::product::ProductSnapshot;

/// 記錄類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    /// 實體庫存異動
    InventoryMovement,
    /// 只有金額的分納交易
    AmountOnlyTransaction,
}

/// 來源系統
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSystem {
    Inventory,
    Accounting,
}

/// 交貨分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    /// 全納
    Full,
    /// 分納
    Partial,
    /// 無法解析採購單，只有金額
    AmountOnly,
}

/// 資料完整性狀態（由驗證器設定，建構時為空）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityStatus {
    Consistent,
    MinorDiscrepancy,
    MajorConflict,
}

/// 實體異動專屬欄位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementDetails {
    pub direction: Option<MovementDirection>,
    pub quantity: i64,
    pub unit_price: Decimal,
    /// 套用此筆異動後的累計庫存
    pub cumulative_stock_at_time: Option<i64>,
    pub linked_transaction_id: Option<Uuid>,
    pub linked_delivery_date: Option<NaiveDate>,
    /// 關聯交易的分納回次
    pub linked_installment_no: Option<i32>,
}

/// 分納交易專屬欄位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub order_id: Option<Uuid>,
    pub order_no: Option<String>,
    pub installment_no: Option<i32>,
    pub accounting_amount: Decimal,
    pub transaction_no: Option<String>,
    pub delivery_type: DeliveryType,
    /// 採購單總額缺漏或為零，需人工確認
    pub requires_review: bool,
}

/// 記錄內容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record_type", rename_all = "snake_case")]
pub enum RecordKind {
    InventoryMovement(MovementDetails),
    AmountOnlyTransaction(TransactionDetails),
}

/// 統合庫存記錄（衍生資料，不落地）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedInventoryRecord {
    /// 來源記錄ID
    pub id: Uuid,

    /// 統一排序鍵（epoch 毫秒）
    pub unified_timestamp: i64,

    pub created_at: DateTime<Utc>,

    pub total_amount: Decimal,

    pub memo: Option<String>,

    /// 商品快照（無法解析時為 None）
    pub product: Option<ProductSnapshot>,

    pub data_integrity_status: Option<IntegrityStatus>,

    #[serde(flatten)]
    pub kind: RecordKind,
}

impl UnifiedInventoryRecord {
    pub fn record_type(&self) -> RecordType {
        match self.kind {
            RecordKind::InventoryMovement(_) => RecordType::InventoryMovement,
            RecordKind::AmountOnlyTransaction(_) => RecordType::AmountOnlyTransaction,
        }
    }

    pub fn source_system(&self) -> SourceSystem {
        match self.kind {
            RecordKind::InventoryMovement(_) => SourceSystem::Inventory,
            RecordKind::AmountOnlyTransaction(_) => SourceSystem::Accounting,
        }
    }

    /// 可解析的商品名稱
    pub fn product_name(&self) -> Option<&str> {
        self.product.as_ref().and_then(|p| p.display_name())
    }

    pub fn product_code(&self) -> Option<&str> {
        self.product.as_ref().map(|p| p.code.as_str())
    }

    pub fn product_id(&self) -> Option<Uuid> {
        self.product.as_ref().map(|p| p.id)
    }

    /// 分納回次（實體異動取關聯交易的回次）
    pub fn installment_no(&self) -> Option<i32> {
        match &self.kind {
            RecordKind::InventoryMovement(details) => details.linked_installment_no,
            RecordKind::AmountOnlyTransaction(details) => details.installment_no,
        }
    }

    pub fn order_no(&self) -> Option<&str> {
        match &self.kind {
            RecordKind::InventoryMovement(_) => None,
            RecordKind::AmountOnlyTransaction(details) => details.order_no.as_deref(),
        }
    }

    pub fn cumulative_stock_at_time(&self) -> Option<i64> {
        match &self.kind {
            RecordKind::InventoryMovement(details) => details.cumulative_stock_at_time,
            RecordKind::AmountOnlyTransaction(_) => None,
        }
    }

    pub fn delivery_type(&self) -> Option<DeliveryType> {
        match &self.kind {
            RecordKind::InventoryMovement(_) => None,
            RecordKind::AmountOnlyTransaction(details) => Some(details.delivery_type),
        }
    }

    pub fn is_movement(&self) -> bool {
        matches!(self.kind, RecordKind::InventoryMovement(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn transaction_record() -> UnifiedInventoryRecord {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        UnifiedInventoryRecord {
            id: Uuid::new_v4(),
            unified_timestamp: at.timestamp_millis(),
            created_at: at,
            total_amount: Decimal::from(20000),
            memo: Some("分納入力(1回目)".to_string()),
            product: None,
            data_integrity_status: None,
            kind: RecordKind::AmountOnlyTransaction(TransactionDetails {
                order_id: None,
                order_no: Some("PO202403010001".to_string()),
                installment_no: Some(1),
                accounting_amount: Decimal::from(20000),
                transaction_no: None,
                delivery_type: DeliveryType::Partial,
                requires_review: false,
            }),
        }
    }

    #[test]
    fn test_derived_discriminants() {
        let record = transaction_record();
        assert_eq!(record.record_type(), RecordType::AmountOnlyTransaction);
        assert_eq!(record.source_system(), SourceSystem::Accounting);
        assert_eq!(record.installment_no(), Some(1));
        assert_eq!(record.order_no(), Some("PO202403010001"));
        assert_eq!(record.cumulative_stock_at_time(), None);
        assert!(!record.is_movement());
    }

    #[test]
    fn test_serialized_with_record_type_tag() {
        let json = serde_json::to_value(transaction_record()).unwrap();
        assert_eq!(json["record_type"], "amount_only_transaction");
        assert_eq!(json["delivery_type"], "partial");
        assert_eq!(json["installment_no"], 1);
    }
}
