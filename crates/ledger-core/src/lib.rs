//! # Ledger Core
//!
//! 核心資料模型與類型定義（實體庫存異動、分納會計交易、採購單、統合記錄）

pub mod config;
pub mod filter;
pub mod movement;
pub mod order;
pub mod product;
pub mod record;
pub mod snapshot;
pub mod transaction;

// Re-export 主要類型
pub use config::LedgerConfig;
pub use filter::{
    DateRange, FilterSpec, PagedResult, Pagination, RecordTypeFilter, SortField, SortOrder,
};
pub use movement::{MovementDirection, PhysicalMovement};
pub use order::{OrderLineItem, PurchaseOrder};
pub use product::{Product, ProductSnapshot};
pub use record::{
    DeliveryType, IntegrityStatus, MovementDetails, RecordKind, RecordType, SourceSystem,
    TransactionDetails, UnifiedInventoryRecord,
};
pub use snapshot::RawSnapshot;
pub use transaction::{AccountingTransaction, ConfirmationStatus, TransactionKind};

/// 帳務核對錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("讀取 {source_name} 失敗: {message}")]
    FetchFailed {
        source_name: &'static str,
        message: String,
    },

    #[error("讀取 {source_name} 逾時（{millis} ms）")]
    Timeout {
        source_name: &'static str,
        millis: u64,
    },

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("無效的篩選條件: {0}")]
    InvalidFilter(String),

    #[error("計算錯誤: {0}")]
    CalculationError(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// 將時間轉為統一排序鍵（epoch 毫秒）
pub fn epoch_millis(at: &chrono::DateTime<chrono::Utc>) -> i64 {
    at.timestamp_millis()
}
