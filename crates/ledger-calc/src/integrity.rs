//! 資料完整性驗證
//!
//! 只做診斷用的分割，不會排除或修改主要篩選結果中的記錄。

use ledger_core::{
    IntegrityStatus, LedgerConfig, Product, RecordKind, UnifiedInventoryRecord,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::classifier::DiscrepancySeverity;

/// 完整性問題
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityIssue {
    /// 異動數量為零或缺漏
    MissingQuantity,
    /// 異動方向缺漏
    MissingDirection,
    /// 分納金額為零或缺漏
    MissingAccountingAmount,
    /// 分納回次缺漏
    MissingInstallmentNo,
    /// 無法解析商品名稱
    MissingProductName,
    /// 採購單總額缺漏，無法判定全納／分納
    UnverifiableOrderTotal,
}

impl IntegrityIssue {
    /// 是否屬於重大衝突（其餘為待確認的輕微差異）
    pub fn is_major(self) -> bool {
        !matches!(self, IntegrityIssue::UnverifiableOrderTotal)
    }
}

/// 驗證結果：兩個集合互斥且涵蓋全部輸入
#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub consistent: Vec<UnifiedInventoryRecord>,
    pub inconsistencies: Vec<UnifiedInventoryRecord>,
}

impl IntegrityReport {
    pub fn total(&self) -> usize {
        self.consistent.len() + self.inconsistencies.len()
    }
}

/// 商品帳面庫存與異動累計不一致
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockDiscrepancy {
    pub product_id: Uuid,
    pub product_code: String,
    pub recorded_stock: i64,
    pub computed_stock: i64,
    pub difference: i64,
    pub severity: DiscrepancySeverity,
}

/// 完整性驗證器
pub struct IntegrityValidator;

impl IntegrityValidator {
    /// 分割為一致／不一致兩組並設定狀態
    pub fn validate(records: &[UnifiedInventoryRecord]) -> IntegrityReport {
        let mut consistent = Vec::new();
        let mut inconsistencies = Vec::new();

        for record in records {
            let issues = Self::issues_for(record);
            let mut record = record.clone();

            if issues.is_empty() {
                record.data_integrity_status = Some(IntegrityStatus::Consistent);
                consistent.push(record);
            } else {
                let status = if issues.iter().any(|issue| issue.is_major()) {
                    IntegrityStatus::MajorConflict
                } else {
                    IntegrityStatus::MinorDiscrepancy
                };
                tracing::debug!(record_id = %record.id, ?issues, "完整性檢查未通過");
                record.data_integrity_status = Some(status);
                inconsistencies.push(record);
            }
        }

        tracing::info!(
            "完整性檢查：一致 {} 筆，不一致 {} 筆",
            consistent.len(),
            inconsistencies.len()
        );

        IntegrityReport {
            consistent,
            inconsistencies,
        }
    }

    /// 列出單筆記錄的所有問題
    pub fn issues_for(record: &UnifiedInventoryRecord) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        match &record.kind {
            RecordKind::InventoryMovement(details) => {
                if details.quantity <= 0 {
                    issues.push(IntegrityIssue::MissingQuantity);
                }
                if details.direction.is_none() {
                    issues.push(IntegrityIssue::MissingDirection);
                }
            }
            RecordKind::AmountOnlyTransaction(details) => {
                if details.accounting_amount <= Decimal::ZERO {
                    issues.push(IntegrityIssue::MissingAccountingAmount);
                }
                if details.installment_no.is_none() {
                    issues.push(IntegrityIssue::MissingInstallmentNo);
                }
                if details.requires_review {
                    issues.push(IntegrityIssue::UnverifiableOrderTotal);
                }
            }
        }

        if record.product_name().is_none() {
            issues.push(IntegrityIssue::MissingProductName);
        }

        issues
    }

    /// 比對商品帳面庫存與異動期末累計，只回傳超出容許差額者
    pub fn check_stock_levels(
        products: &HashMap<Uuid, Product>,
        closing_balances: &HashMap<Uuid, i64>,
        config: &LedgerConfig,
    ) -> Vec<StockDiscrepancy> {
        let mut discrepancies: Vec<StockDiscrepancy> = products
            .values()
            .filter_map(|product| {
                let computed_stock = closing_balances.get(&product.id).copied().unwrap_or(0);
                let difference = product.current_stock - computed_stock;
                let severity = DiscrepancySeverity::from_difference(Decimal::from(difference), config);
                (severity != DiscrepancySeverity::None).then(|| StockDiscrepancy {
                    product_id: product.id,
                    product_code: product.code.clone(),
                    recorded_stock: product.current_stock,
                    computed_stock,
                    difference,
                    severity,
                })
            })
            .collect();

        discrepancies.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.product_code.cmp(&b.product_code))
        });

        if !discrepancies.is_empty() {
            tracing::warn!("帳面庫存與異動累計不一致：{} 項商品", discrepancies.len());
        }

        discrepancies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ledger_core::{
        DeliveryType, MovementDetails, MovementDirection, ProductSnapshot, TransactionDetails,
    };
    use proptest::prelude::*;

    fn snapshot(name: &str) -> ProductSnapshot {
        ProductSnapshot {
            id: Uuid::new_v4(),
            name: name.to_string(),
            code: "P-1".to_string(),
            current_stock: 0,
        }
    }

    fn movement_record(quantity: i64, direction: Option<MovementDirection>, product: Option<ProductSnapshot>) -> UnifiedInventoryRecord {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        UnifiedInventoryRecord {
            id: Uuid::new_v4(),
            unified_timestamp: at.timestamp_millis(),
            created_at: at,
            total_amount: Decimal::from(quantity * 10),
            memo: None,
            product,
            data_integrity_status: None,
            kind: RecordKind::InventoryMovement(MovementDetails {
                direction,
                quantity,
                unit_price: Decimal::from(10),
                cumulative_stock_at_time: None,
                linked_transaction_id: None,
                linked_delivery_date: None,
                linked_installment_no: None,
            }),
        }
    }

    fn transaction_record(amount: i64, installment_no: Option<i32>, product: Option<ProductSnapshot>, requires_review: bool) -> UnifiedInventoryRecord {
        let at = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        UnifiedInventoryRecord {
            id: Uuid::new_v4(),
            unified_timestamp: at.timestamp_millis(),
            created_at: at,
            total_amount: Decimal::from(amount),
            memo: None,
            product,
            data_integrity_status: None,
            kind: RecordKind::AmountOnlyTransaction(TransactionDetails {
                order_id: None,
                order_no: None,
                installment_no,
                accounting_amount: Decimal::from(amount),
                transaction_no: None,
                delivery_type: DeliveryType::Partial,
                requires_review,
            }),
        }
    }

    #[test]
    fn test_valid_records_are_consistent() {
        let records = vec![
            movement_record(5, Some(MovementDirection::In), Some(snapshot("ボルト"))),
            transaction_record(1000, Some(1), Some(snapshot("ボルト")), false),
        ];

        let report = IntegrityValidator::validate(&records);
        assert_eq!(report.consistent.len(), 2);
        assert!(report.inconsistencies.is_empty());
        assert!(report
            .consistent
            .iter()
            .all(|r| r.data_integrity_status == Some(IntegrityStatus::Consistent)));
    }

    #[test]
    fn test_movement_rules() {
        let zero_qty = movement_record(0, Some(MovementDirection::In), Some(snapshot("A")));
        let no_direction = movement_record(3, None, Some(snapshot("A")));

        assert_eq!(
            IntegrityValidator::issues_for(&zero_qty),
            vec![IntegrityIssue::MissingQuantity]
        );
        assert_eq!(
            IntegrityValidator::issues_for(&no_direction),
            vec![IntegrityIssue::MissingDirection]
        );
    }

    #[test]
    fn test_transaction_rules() {
        let no_product = transaction_record(1000, Some(1), None, false);
        let no_installment = transaction_record(1000, None, Some(snapshot("A")), false);
        let zero_amount = transaction_record(0, Some(1), Some(snapshot("A")), false);

        let report = IntegrityValidator::validate(&[no_product, no_installment, zero_amount]);
        assert!(report.consistent.is_empty());
        assert_eq!(report.inconsistencies.len(), 3);
        assert!(report
            .inconsistencies
            .iter()
            .all(|r| r.data_integrity_status == Some(IntegrityStatus::MajorConflict)));
    }

    #[test]
    fn test_review_flag_is_minor() {
        let record = transaction_record(1000, Some(1), Some(snapshot("A")), true);
        let report = IntegrityValidator::validate(&[record]);

        assert_eq!(report.inconsistencies.len(), 1);
        assert_eq!(
            report.inconsistencies[0].data_integrity_status,
            Some(IntegrityStatus::MinorDiscrepancy)
        );
    }

    #[test]
    fn test_blank_product_name_is_missing() {
        let record = movement_record(3, Some(MovementDirection::Out), Some(snapshot("  ")));
        assert_eq!(
            IntegrityValidator::issues_for(&record),
            vec![IntegrityIssue::MissingProductName]
        );
    }

    #[test]
    fn test_check_stock_levels() {
        let config = LedgerConfig::new();
        let ok = Product::new(Uuid::new_v4(), "OK", "A-OK").with_current_stock(12);
        let minor = Product::new(Uuid::new_v4(), "MINOR", "B-MINOR").with_current_stock(20);
        let critical = Product::new(Uuid::new_v4(), "CRIT", "C-CRIT").with_current_stock(50_000);

        let products: HashMap<Uuid, Product> = [ok.clone(), minor.clone(), critical.clone()]
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let closing: HashMap<Uuid, i64> = [(ok.id, 12), (minor.id, 15)].into();

        let discrepancies = IntegrityValidator::check_stock_levels(&products, &closing, &config);
        assert_eq!(discrepancies.len(), 2);
        assert_eq!(discrepancies[0].product_id, critical.id);
        assert_eq!(discrepancies[0].severity, DiscrepancySeverity::Critical);
        assert_eq!(discrepancies[1].difference, 5);
        assert_eq!(discrepancies[1].severity, DiscrepancySeverity::Minor);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// 一致與不一致兩組互斥且涵蓋全部
        #[test]
        fn prop_partition_is_exhaustive(
            specs in prop::collection::vec(
                (any::<bool>(), -5i64..50, any::<bool>(), any::<bool>(), any::<bool>()),
                0..40,
            )
        ) {
            let records: Vec<UnifiedInventoryRecord> = specs
                .iter()
                .map(|&(is_movement, amount, has_optional, has_product, review)| {
                    let product = has_product.then(|| snapshot("P"));
                    if is_movement {
                        let direction = has_optional.then_some(MovementDirection::In);
                        movement_record(amount, direction, product)
                    } else {
                        let installment = has_optional.then_some(1);
                        transaction_record(amount, installment, product, review)
                    }
                })
                .collect();

            let report = IntegrityValidator::validate(&records);
            prop_assert_eq!(report.total(), records.len());

            let consistent: std::collections::HashSet<Uuid> =
                report.consistent.iter().map(|r| r.id).collect();
            prop_assert!(report.inconsistencies.iter().all(|r| !consistent.contains(&r.id)));
        }
    }
}
