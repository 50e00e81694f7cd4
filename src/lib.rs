//! # Ledger
//!
//! 實體庫存異動與會計分納交易的統合帳務核對
//!
//! - [`ledger_core`]：資料模型、篩選條件、配置與錯誤類型
//! - [`ledger_calc`]：正規化、交貨分類、累計庫存、篩選排序、完整性驗證
//! - [`ledger_store`]：資料來源介面、批次讀取與 [`UnifiedInventoryService`]

pub use ledger_calc;
pub use ledger_core;
pub use ledger_store;

pub use ledger_calc::{
    DeliveryProgress, IntegrityReport, LedgerWarning, ReconciliationEngine, StockDiscrepancy,
    UnifiedInventory,
};
pub use ledger_core::{FilterSpec, LedgerConfig, LedgerError, Result, UnifiedInventoryRecord};
pub use ledger_store::{InMemoryStore, InventoryStore, UnifiedInventoryService, UnifiedInventoryView};
