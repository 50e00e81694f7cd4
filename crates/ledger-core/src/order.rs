//! 採購單與明細模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 採購單（核心僅作為交貨比例與代表商品的參照）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// 採購單ID
    pub id: Uuid,

    /// 採購單號（如 PO202401010001）
    pub order_no: String,

    /// 含稅總額（可能缺漏）
    pub total_amount: Option<Decimal>,

    /// 供應商
    pub partner_id: Option<Uuid>,

    /// 狀態
    #[serde(default)]
    pub status: String,
}

impl PurchaseOrder {
    /// 創建新的採購單
    pub fn new(id: Uuid, order_no: impl Into<String>, total_amount: Decimal) -> Self {
        Self {
            id,
            order_no: order_no.into(),
            total_amount: Some(total_amount),
            partner_id: None,
            status: "confirmed".to_string(),
        }
    }

    /// 建構器模式：設置供應商
    pub fn with_partner(mut self, partner_id: Uuid) -> Self {
        self.partner_id = Some(partner_id);
        self
    }

    /// 建構器模式：設置狀態
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// 可用於比較的總額（缺漏或為零時回傳 None）
    pub fn comparable_total(&self) -> Option<Decimal> {
        self.total_amount.filter(|total| !total.is_zero())
    }
}

/// 採購單明細
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub order_id: Uuid,
    pub product_id: Uuid,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub unit_price: Decimal,
}

impl OrderLineItem {
    pub fn new(order_id: Uuid, product_id: Uuid, quantity: i64, unit_price: Decimal) -> Self {
        Self {
            order_id,
            product_id,
            quantity,
            unit_price,
        }
    }

    /// 明細金額 = 數量 × 單價
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}
