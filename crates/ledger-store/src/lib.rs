//! # Ledger Store
//!
//! 資料來源邊界：非同步讀取、批次查詢與對外的統合庫存服務

pub mod error;
pub mod fetcher;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod query;
pub mod service;
pub mod store;

// Re-export 主要類型
pub use error::{StoreError, StoreResult};
pub use fetcher::RecordFetcher;
pub use memory::{CallCounts, InMemoryStore, StoreOperation};
#[cfg(feature = "postgres")]
pub use postgres::PgInventoryStore;
pub use query::{MovementQuery, TransactionQuery};
pub use service::{UnifiedInventoryService, UnifiedInventoryView};
pub use store::InventoryStore;
