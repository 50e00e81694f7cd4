//! 實體庫存異動模型

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 異動方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementDirection {
    /// 入庫
    In,
    /// 出庫
    Out,
}

impl MovementDirection {
    /// 帶符號的數量（入庫為正，出庫為負）
    pub fn signed(self, quantity: i64) -> i64 {
        match self {
            MovementDirection::In => quantity,
            MovementDirection::Out => -quantity,
        }
    }

    /// 資料庫欄位值
    pub fn as_str(self) -> &'static str {
        match self {
            MovementDirection::In => "in",
            MovementDirection::Out => "out",
        }
    }

    /// 解析資料庫欄位值，無法辨識時回傳 None
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "in" => Some(MovementDirection::In),
            "out" => Some(MovementDirection::Out),
            _ => None,
        }
    }
}

/// 實體庫存異動（建立後不可變）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalMovement {
    /// 異動ID
    pub id: Uuid,

    /// 商品ID
    pub product_id: Uuid,

    /// 方向（資料來源不可信，可能缺漏）
    pub direction: Option<MovementDirection>,

    /// 數量（正整數；缺漏時為 0）
    #[serde(default)]
    pub quantity: i64,

    /// 單價
    #[serde(default)]
    pub unit_price: Decimal,

    /// 金額
    #[serde(default)]
    pub total_amount: Decimal,

    /// 備註
    pub memo: Option<String>,

    /// 建立時間
    pub created_at: DateTime<Utc>,

    /// 關聯的會計交易
    pub linked_transaction_id: Option<Uuid>,

    /// 預定交貨日
    pub linked_delivery_date: Option<NaiveDate>,
}

impl PhysicalMovement {
    /// 創建新的異動，金額 = 數量 × 單價
    pub fn new(
        product_id: Uuid,
        direction: MovementDirection,
        quantity: i64,
        unit_price: Decimal,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            direction: Some(direction),
            quantity,
            unit_price,
            total_amount: unit_price * Decimal::from(quantity),
            memo: None,
            created_at,
            linked_transaction_id: None,
            linked_delivery_date: None,
        }
    }

    /// 建構器模式：設置ID
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// 建構器模式：設置備註
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// 建構器模式：設置獨立記錄的金額
    pub fn with_total_amount(mut self, total_amount: Decimal) -> Self {
        self.total_amount = total_amount;
        self
    }

    /// 建構器模式：關聯會計交易
    pub fn with_linked_transaction(mut self, transaction_id: Uuid) -> Self {
        self.linked_transaction_id = Some(transaction_id);
        self
    }

    /// 建構器模式：設置預定交貨日
    pub fn with_delivery_date(mut self, date: NaiveDate) -> Self {
        self.linked_delivery_date = Some(date);
        self
    }

    /// 對庫存的帶符號影響，方向缺漏時不影響
    pub fn signed_quantity(&self) -> i64 {
        self.direction
            .map(|direction| direction.signed(self.quantity))
            .unwrap_or(0)
    }
}
