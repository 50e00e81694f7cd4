//! PostgreSQL 資料來源
//!
//! 以 `= ANY($1)` 一次查詢整批 ID；列舉欄位以文字儲存，讀取時轉換。
//! 欄位名稱依既有資料表，列結構到領域模型的對應集中在各 `From` 實作。

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ledger_core::{
    AccountingTransaction, ConfirmationStatus, MovementDirection, OrderLineItem, PhysicalMovement,
    Product, PurchaseOrder, TransactionKind,
};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::query::{MovementQuery, TransactionQuery};
use crate::store::InventoryStore;

#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    product_id: Uuid,
    direction: Option<String>,
    quantity: i64,
    unit_price: Decimal,
    total_amount: Decimal,
    memo: Option<String>,
    created_at: DateTime<Utc>,
    linked_transaction_id: Option<Uuid>,
    linked_delivery_date: Option<NaiveDate>,
}

impl From<MovementRow> for PhysicalMovement {
    fn from(row: MovementRow) -> Self {
        PhysicalMovement {
            id: row.id,
            product_id: row.product_id,
            direction: row.direction.as_deref().and_then(MovementDirection::parse),
            quantity: row.quantity,
            unit_price: row.unit_price,
            total_amount: row.total_amount,
            memo: row.memo,
            created_at: row.created_at,
            linked_transaction_id: row.linked_transaction_id,
            linked_delivery_date: row.linked_delivery_date,
        }
    }
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    parent_order_id: Option<Uuid>,
    total_amount: Decimal,
    installment_sequence: Option<i32>,
    created_at: DateTime<Utc>,
    transaction_no: Option<String>,
    memo: Option<String>,
    confirmation_status: String,
    transaction_kind: String,
}

impl From<TransactionRow> for AccountingTransaction {
    fn from(row: TransactionRow) -> Self {
        AccountingTransaction {
            id: row.id,
            parent_order_id: row.parent_order_id,
            total_amount: row.total_amount,
            installment_no: row.installment_sequence,
            created_at: row.created_at,
            transaction_no: row.transaction_no,
            memo: row.memo,
            status: ConfirmationStatus::parse(&row.confirmation_status),
            kind: TransactionKind::parse(&row.transaction_kind),
        }
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    display_name: String,
    code: String,
    current_stock: Option<i64>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product::new(row.id, row.display_name, row.code)
            .with_current_stock(row.current_stock.unwrap_or(0))
    }
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    order_no: String,
    total_amount: Option<Decimal>,
    partner_id: Option<Uuid>,
    status: String,
}

impl From<OrderRow> for PurchaseOrder {
    fn from(row: OrderRow) -> Self {
        PurchaseOrder {
            id: row.id,
            order_no: row.order_no,
            total_amount: row.total_amount,
            partner_id: row.partner_id,
            status: row.status,
        }
    }
}

#[derive(Debug, FromRow)]
struct LineItemRow {
    order_id: Uuid,
    product_id: Uuid,
    quantity: i64,
    unit_price: Decimal,
}

impl From<LineItemRow> for OrderLineItem {
    fn from(row: LineItemRow) -> Self {
        OrderLineItem::new(row.order_id, row.product_id, row.quantity, row.unit_price)
    }
}

/// PostgreSQL 資料來源
#[derive(Debug, Clone)]
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn query_physical_movements(&self, query: &MovementQuery) -> StoreResult<Vec<PhysicalMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, product_id, direction, quantity, unit_price, total_amount,
                   memo, created_at, linked_transaction_id, linked_delivery_date
            FROM inventory_movements
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at < $2)
              AND ($3::text IS NULL OR direction = $3)
            ORDER BY created_at, id
            "#,
        )
        .bind(query.start)
        .bind(query.end)
        .bind(query.direction.map(MovementDirection::as_str))
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!("讀取 inventory_movements {} 筆", rows.len());
        Ok(rows.into_iter().map(PhysicalMovement::from).collect())
    }

    async fn query_accounting_transactions(
        &self,
        query: &TransactionQuery,
    ) -> StoreResult<Vec<AccountingTransaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, parent_order_id, total_amount, installment_sequence, created_at,
                   transaction_no, memo, confirmation_status, transaction_kind
            FROM transactions
            WHERE transaction_kind = $1
              AND confirmation_status = $2
              AND ($3::timestamptz IS NULL OR created_at >= $3)
              AND ($4::timestamptz IS NULL OR created_at < $4)
            ORDER BY created_at, id
            "#,
        )
        .bind(query.kind.as_str())
        .bind(query.status.as_str())
        .bind(query.start)
        .bind(query.end)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!("讀取 transactions {} 筆", rows.len());
        Ok(rows.into_iter().map(AccountingTransaction::from).collect())
    }

    async fn query_products_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, display_name, code, current_stock FROM products WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn query_orders_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<PurchaseOrder>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, order_no, total_amount, partner_id, status FROM purchase_orders WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PurchaseOrder::from).collect())
    }

    async fn query_order_line_items_by_order_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<OrderLineItem>> {
        let rows = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT order_id, product_id, quantity, unit_price
            FROM purchase_order_items
            WHERE order_id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderLineItem::from).collect())
    }
}
