//! 會計交易（分納）模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 交易種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// 採購
    Purchase,
    /// 銷售
    Sale,
    /// 其他
    Other,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Purchase => "purchase",
            TransactionKind::Sale => "sale",
            TransactionKind::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "purchase" => TransactionKind::Purchase,
            "sale" => TransactionKind::Sale,
            _ => TransactionKind::Other,
        }
    }
}

/// 確認狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    /// 草稿
    Draft,
    /// 已確認
    Confirmed,
    /// 已取消
    Cancelled,
}

impl ConfirmationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfirmationStatus::Draft => "draft",
            ConfirmationStatus::Confirmed => "confirmed",
            ConfirmationStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "confirmed" => ConfirmationStatus::Confirmed,
            "cancelled" => ConfirmationStatus::Cancelled,
            _ => ConfirmationStatus::Draft,
        }
    }
}

/// 會計交易：一次已確認的分納（部分交貨/付款）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountingTransaction {
    /// 交易ID
    pub id: Uuid,

    /// 所屬採購單
    pub parent_order_id: Option<Uuid>,

    /// 金額
    #[serde(default)]
    pub total_amount: Decimal,

    /// 分納回次（1, 2, 3, ...；由外部依採購單遞增指派）
    pub installment_no: Option<i32>,

    /// 建立時間
    pub created_at: DateTime<Utc>,

    /// 交易編號
    pub transaction_no: Option<String>,

    /// 備註
    pub memo: Option<String>,

    /// 確認狀態
    pub status: ConfirmationStatus,

    /// 交易種類
    pub kind: TransactionKind,
}

impl AccountingTransaction {
    /// 創建新的已確認採購分納
    pub fn new(parent_order_id: Uuid, total_amount: Decimal, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_order_id: Some(parent_order_id),
            total_amount,
            installment_no: None,
            created_at,
            transaction_no: None,
            memo: None,
            status: ConfirmationStatus::Confirmed,
            kind: TransactionKind::Purchase,
        }
    }

    /// 建構器模式：設置ID
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// 建構器模式：設置分納回次
    pub fn with_installment_no(mut self, installment_no: i32) -> Self {
        self.installment_no = Some(installment_no);
        self
    }

    /// 建構器模式：設置交易編號
    pub fn with_transaction_no(mut self, transaction_no: impl Into<String>) -> Self {
        self.transaction_no = Some(transaction_no.into());
        self
    }

    /// 建構器模式：設置備註
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// 建構器模式：設置狀態
    pub fn with_status(mut self, status: ConfirmationStatus) -> Self {
        self.status = status;
        self
    }

    /// 建構器模式：設置種類
    pub fn with_kind(mut self, kind: TransactionKind) -> Self {
        self.kind = kind;
        self
    }

    /// 是否為分納用途的交易（已確認的採購）
    pub fn is_confirmed_purchase(&self) -> bool {
        self.kind == TransactionKind::Purchase && self.status == ConfirmationStatus::Confirmed
    }
}
