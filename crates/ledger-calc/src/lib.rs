//! # Ledger Calculation Engine
//!
//! 統合庫存／分納核對引擎（純同步計算，不存取資料來源）

pub mod classifier;
pub mod engine;
pub mod filtering;
pub mod integrity;
pub mod normalizer;
pub mod running_stock;

// Re-export 主要類型
pub use classifier::{
    Classification, DeliveryClassifier, DeliveryProgress, DiscrepancySeverity, ProgressStatus,
};
pub use engine::ReconciliationEngine;
pub use filtering::FilterEngine;
pub use integrity::{IntegrityIssue, IntegrityReport, IntegrityValidator, StockDiscrepancy};
pub use normalizer::RecordNormalizer;
pub use running_stock::{MovementBalance, RunningStockCalculator};

use ledger_core::UnifiedInventoryRecord;
use serde::Serialize;

/// 核對結果
#[derive(Debug, Clone, Serialize)]
pub struct UnifiedInventory {
    /// 合併後的記錄（依時間新到舊）
    pub records: Vec<UnifiedInventoryRecord>,

    /// 警告信息
    pub warnings: Vec<LedgerWarning>,

    /// 統計
    pub stats: ReconciliationStats,
}

impl UnifiedInventory {
    /// 創建空的核對結果
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            warnings: Vec::new(),
            stats: ReconciliationStats::default(),
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: LedgerWarning) {
        self.warnings.push(warning);
    }

    /// 是否以降級模式產生（部分來源缺漏）
    pub fn is_degraded(&self) -> bool {
        !(self.stats.accounting_available
            && self.stats.orders_available
            && self.stats.line_items_available)
    }
}

/// 核對統計
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationStats {
    pub movements_fetched: usize,
    pub transactions_fetched: usize,
    pub movements_kept: usize,
    pub transactions_kept: usize,
    pub movements_dropped: usize,
    pub transactions_dropped: usize,
    pub accounting_available: bool,
    pub orders_available: bool,
    pub line_items_available: bool,
    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl Default for ReconciliationStats {
    fn default() -> Self {
        Self {
            movements_fetched: 0,
            transactions_fetched: 0,
            movements_kept: 0,
            transactions_kept: 0,
            movements_dropped: 0,
            transactions_dropped: 0,
            accounting_available: true,
            orders_available: true,
            line_items_available: true,
            calculation_time_ms: None,
        }
    }
}

/// 核對警告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerWarning {
    /// 發生的元件（如 fetcher、normalizer）
    pub component: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl LedgerWarning {
    pub fn new(component: impl Into<String>, message: impl Into<String>, severity: WarningSeverity) -> Self {
        Self {
            component: component.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn info(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(component, message, WarningSeverity::Info)
    }

    pub fn warning(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(component, message, WarningSeverity::Warning)
    }

    pub fn error(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(component, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
