//! 統合庫存查詢示例

use chrono::{TimeZone, Utc};
use ledger::ledger_core::{
    AccountingTransaction, MovementDirection, OrderLineItem, PhysicalMovement, Product,
    PurchaseOrder, SortField, SortOrder,
};
use ledger::{FilterSpec, InMemoryStore, LedgerConfig, UnifiedInventoryService};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== 統合庫存查詢示例 ===\n");

    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let bolt = Product::new(Uuid::new_v4(), "六角ボルト M10", "HB-M10").with_current_stock(120);
    let order = PurchaseOrder::new(Uuid::new_v4(), "PO202401010001", Decimal::from(50_000));

    let store = InMemoryStore::new()
        .with_products(vec![bolt.clone()])
        .with_orders(vec![order.clone()])
        .with_line_items(vec![OrderLineItem::new(order.id, bolt.id, 100, Decimal::from(500))])
        .with_movements(vec![
            PhysicalMovement::new(bolt.id, MovementDirection::In, 100, Decimal::from(500), t0)
                .with_memo("PO202401010001 入庫"),
            PhysicalMovement::new(
                bolt.id,
                MovementDirection::Out,
                20,
                Decimal::from(500),
                t0 + chrono::Duration::days(3),
            ),
        ])
        .with_transactions(vec![
            AccountingTransaction::new(order.id, Decimal::from(30_000), t0 + chrono::Duration::days(1))
                .with_installment_no(1),
            AccountingTransaction::new(order.id, Decimal::from(20_000), t0 + chrono::Duration::days(5))
                .with_installment_no(2),
        ]);

    let service = UnifiedInventoryService::new(Arc::new(store), LedgerConfig::new())?;

    let view = service
        .get_unified_inventory(&FilterSpec::new().with_sort(SortField::CreatedAt, SortOrder::Asc))
        .await?;

    println!("統合記錄（{} 筆）:", view.total);
    for record in &view.records {
        println!(
            "  - {} {:?} 商品: {} 金額: {} 累計庫存: {:?} 交貨: {:?}",
            record.created_at.format("%Y-%m-%d"),
            record.record_type(),
            record.product_name().unwrap_or("-"),
            record.total_amount,
            record.cumulative_stock_at_time(),
            record.delivery_type(),
        );
    }

    println!("\n交貨進度:");
    for progress in service.delivery_progress().await? {
        println!(
            "  - {} 累計 {} / {:?}（{:?}）",
            progress.order_no, progress.delivered_total, progress.order_total, progress.status
        );
    }

    let report = service.validate_integrity(&view.records);
    println!(
        "\n完整性：一致 {} 筆，不一致 {} 筆",
        report.consistent.len(),
        report.inconsistencies.len()
    );

    Ok(())
}
