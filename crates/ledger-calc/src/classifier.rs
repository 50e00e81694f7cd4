//! 交貨分類（全納／分納）與採購單交貨進度

use ledger_core::{
    AccountingTransaction, DeliveryType, LedgerConfig, PurchaseOrder, RecordKind,
    UnifiedInventoryRecord,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// 單筆交易的分類結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub delivery_type: DeliveryType,
    /// 採購單總額缺漏或為零，無法比較
    pub requires_review: bool,
}

/// 差異嚴重度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancySeverity {
    /// 容許差額內
    None,
    Minor,
    Major,
    Critical,
}

impl DiscrepancySeverity {
    /// 依差額絕對值分級
    pub fn from_difference(difference: Decimal, config: &LedgerConfig) -> Self {
        let difference = difference.abs();
        if difference <= config.full_delivery_tolerance {
            DiscrepancySeverity::None
        } else if difference <= config.minor_discrepancy_threshold {
            DiscrepancySeverity::Minor
        } else if difference <= config.major_discrepancy_threshold {
            DiscrepancySeverity::Major
        } else {
            DiscrepancySeverity::Critical
        }
    }
}

/// 採購單交貨進度狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// 尚無分納
    NotStarted,
    /// 分納中
    InProgress,
    /// 累計已達總額（容許差額內）
    Complete,
    /// 累計超過總額
    OverDelivered,
}

/// 採購單的累計交貨進度
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryProgress {
    pub order_id: Uuid,
    pub order_no: String,
    pub order_total: Option<Decimal>,
    pub delivered_total: Decimal,
    /// 剩餘金額（總額缺漏時為 None）
    pub remaining: Option<Decimal>,
    /// 累計 / 總額（總額缺漏或為零時為 None）
    pub ratio: Option<Decimal>,
    pub installments: usize,
    pub status: ProgressStatus,
    pub severity: DiscrepancySeverity,
    pub requires_review: bool,
}

/// 交貨分類器
pub struct DeliveryClassifier;

impl DeliveryClassifier {
    /// 分類一筆交易
    ///
    /// - 無採購單：`AmountOnly`
    /// - 採購單總額缺漏或為零：`Partial` 並標記需確認
    /// - `|總額 - 交易金額| <= 容許差額`：`Full`，否則 `Partial`
    pub fn classify(
        transaction_amount: Decimal,
        order: Option<&PurchaseOrder>,
        config: &LedgerConfig,
    ) -> Classification {
        let Some(order) = order else {
            return Classification {
                delivery_type: DeliveryType::AmountOnly,
                requires_review: false,
            };
        };

        let Some(order_total) = order.comparable_total() else {
            tracing::debug!("採購單 {} 無總額，預設為分納並待確認", order.order_no);
            return Classification {
                delivery_type: DeliveryType::Partial,
                requires_review: true,
            };
        };

        let difference = (order_total - transaction_amount).abs();
        let delivery_type = if difference <= config.full_delivery_tolerance {
            DeliveryType::Full
        } else {
            DeliveryType::Partial
        };

        Classification {
            delivery_type,
            requires_review: false,
        }
    }

    /// 分類一筆會計交易
    pub fn classify_transaction(
        transaction: &AccountingTransaction,
        order: Option<&PurchaseOrder>,
        config: &LedgerConfig,
    ) -> Classification {
        Self::classify(transaction.total_amount, order, config)
    }

    /// 為統合記錄中的分納交易填入分類，回傳需確認的筆數
    pub fn decorate(
        records: &mut [UnifiedInventoryRecord],
        orders: &HashMap<Uuid, PurchaseOrder>,
        config: &LedgerConfig,
    ) -> usize {
        let mut review_count = 0;
        for record in records.iter_mut() {
            match &mut record.kind {
                RecordKind::AmountOnlyTransaction(details) => {
                    let order = details.order_id.and_then(|id| orders.get(&id));
                    let classification = Self::classify(details.accounting_amount, order, config);
                    details.delivery_type = classification.delivery_type;
                    details.requires_review = classification.requires_review;
                    if classification.requires_review {
                        review_count += 1;
                    }
                }
                RecordKind::InventoryMovement(_) => {}
            }
        }
        review_count
    }

    /// 計算採購單的累計交貨進度
    ///
    /// 只計入屬於該採購單的交易，其餘忽略。
    pub fn delivery_progress(
        order: &PurchaseOrder,
        transactions: &[AccountingTransaction],
        config: &LedgerConfig,
    ) -> DeliveryProgress {
        let related: Vec<&AccountingTransaction> = transactions
            .iter()
            .filter(|tx| tx.parent_order_id == Some(order.id))
            .collect();

        let delivered_total: Decimal = related.iter().map(|tx| tx.total_amount).sum();
        let order_total = order.comparable_total();
        let remaining = order_total.map(|total| total - delivered_total);
        let ratio = order_total.map(|total| (delivered_total / total).round_dp(4));

        let status = match remaining {
            _ if related.is_empty() => ProgressStatus::NotStarted,
            Some(remaining) if remaining.abs() <= config.full_delivery_tolerance => {
                ProgressStatus::Complete
            }
            Some(remaining) if remaining < Decimal::ZERO => ProgressStatus::OverDelivered,
            _ => ProgressStatus::InProgress,
        };

        let severity = match (status, remaining) {
            (ProgressStatus::OverDelivered, Some(remaining)) => {
                DiscrepancySeverity::from_difference(remaining, config)
            }
            _ => DiscrepancySeverity::None,
        };

        DeliveryProgress {
            order_id: order.id,
            order_no: order.order_no.clone(),
            order_total,
            delivered_total,
            remaining,
            ratio,
            installments: related.len(),
            status,
            severity,
            requires_review: order_total.is_none(),
        }
    }
}
