//! 資料來源錯誤

use ledger_core::LedgerError;
use thiserror::Error;

/// 資料來源錯誤類型
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("查詢失敗: {0}")]
    Query(String),

    #[error("資料來源無法使用: {0}")]
    Unavailable(String),

    #[error("資料解析失敗: {0}")]
    Decode(String),

    #[cfg(feature = "postgres")]
    #[error("資料庫錯誤: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for LedgerError {
    fn from(error: StoreError) -> Self {
        LedgerError::FetchFailed {
            source_name: "store",
            message: error.to_string(),
        }
    }
}
