//! 核對引擎配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{LedgerError, Result};

/// 核對引擎參數配置
///
/// 容許值與差異分級目前是依實際資料經驗取得的數值，尚未對應到明文的業務規則，
/// 因此全部開放設定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// 全納判定容許差額（貨幣單位）
    pub full_delivery_tolerance: Decimal,

    /// 輕微差異上限（超過容許差額、未超過此值為 Minor）
    pub minor_discrepancy_threshold: Decimal,

    /// 重大差異上限（超過此值為 Critical）
    pub major_discrepancy_threshold: Decimal,

    /// 「當地時間」相對 UTC 的分鐘數，用於日期篩選的日界
    pub utc_offset_minutes: i32,

    /// 會計交易讀取逾時（毫秒）
    pub accounting_fetch_timeout_ms: u64,

    /// 搜尋字串等於其中之一時，所有分納交易都視為符合
    pub installment_search_terms: Vec<String>,

    /// 備註中採購單號 token 的最少位數（`PO` + 數字）
    pub po_token_min_digits: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            full_delivery_tolerance: Decimal::ONE,
            minor_discrepancy_threshold: Decimal::from(100),
            major_discrepancy_threshold: Decimal::from(10_000),
            utc_offset_minutes: 9 * 60, // JST
            accounting_fetch_timeout_ms: 10_000,
            installment_search_terms: vec!["分納".to_string(), "分納入力".to_string()],
            po_token_min_digits: 9,
        }
    }
}

impl LedgerConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 載入配置（未提供的欄位取預設值）並驗證
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LedgerError::InvalidConfig(format!("JSON 解析失敗: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置全納容許差額
    pub fn with_full_delivery_tolerance(mut self, tolerance: Decimal) -> Self {
        self.full_delivery_tolerance = tolerance;
        self
    }

    /// 建構器模式：設置差異分級門檻
    pub fn with_discrepancy_thresholds(mut self, minor: Decimal, major: Decimal) -> Self {
        self.minor_discrepancy_threshold = minor;
        self.major_discrepancy_threshold = major;
        self
    }

    /// 建構器模式：設置當地時間偏移（分鐘）
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// 建構器模式：設置會計交易讀取逾時
    pub fn with_accounting_fetch_timeout_ms(mut self, millis: u64) -> Self {
        self.accounting_fetch_timeout_ms = millis;
        self
    }

    /// 建構器模式：設置分納搜尋關鍵字
    pub fn with_installment_search_terms(mut self, terms: Vec<String>) -> Self {
        self.installment_search_terms = terms;
        self
    }

    /// 建構器模式：設置採購單號最少位數
    pub fn with_po_token_min_digits(mut self, digits: usize) -> Self {
        self.po_token_min_digits = digits;
        self
    }

    /// 當地時區
    pub fn local_offset(&self) -> Result<chrono::FixedOffset> {
        chrono::FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            LedgerError::InvalidConfig(format!("無效的時區偏移: {} 分鐘", self.utc_offset_minutes))
        })
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        if self.full_delivery_tolerance < Decimal::ZERO {
            return Err(LedgerError::InvalidConfig(
                "全納容許差額不可為負".to_string(),
            ));
        }

        if self.minor_discrepancy_threshold < self.full_delivery_tolerance
            || self.major_discrepancy_threshold < self.minor_discrepancy_threshold
        {
            return Err(LedgerError::InvalidConfig(format!(
                "差異門檻必須遞增：容許 {} ≤ 輕微 {} ≤ 重大 {}",
                self.full_delivery_tolerance,
                self.minor_discrepancy_threshold,
                self.major_discrepancy_threshold
            )));
        }

        if self.utc_offset_minutes.abs() > 14 * 60 {
            return Err(LedgerError::InvalidConfig(format!(
                "時區偏移超出範圍: {} 分鐘",
                self.utc_offset_minutes
            )));
        }

        if self.po_token_min_digits == 0 {
            return Err(LedgerError::InvalidConfig(
                "採購單號位數至少為 1".to_string(),
            ));
        }

        Ok(())
    }

    /// 搜尋字串是否為「顯示全部分納」的分類關鍵字
    pub fn is_installment_search_term(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        self.installment_search_terms
            .iter()
            .any(|candidate| candidate.trim().to_lowercase() == term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::new();

        assert_eq!(config.full_delivery_tolerance, Decimal::ONE);
        assert_eq!(config.minor_discrepancy_threshold, Decimal::from(100));
        assert_eq!(config.major_discrepancy_threshold, Decimal::from(10_000));
        assert_eq!(config.utc_offset_minutes, 540);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = LedgerConfig::new()
            .with_full_delivery_tolerance(Decimal::from(5))
            .with_discrepancy_thresholds(Decimal::from(50), Decimal::from(5_000))
            .with_utc_offset_minutes(0)
            .with_accounting_fetch_timeout_ms(250);

        assert_eq!(config.full_delivery_tolerance, Decimal::from(5));
        assert_eq!(config.major_discrepancy_threshold, Decimal::from(5_000));
        assert_eq!(config.accounting_fetch_timeout_ms, 250);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        let negative = LedgerConfig::new().with_full_delivery_tolerance(Decimal::from(-1));
        assert!(negative.validate().is_err());

        let inverted = LedgerConfig::new()
            .with_discrepancy_thresholds(Decimal::from(10_000), Decimal::from(100));
        assert!(inverted.validate().is_err());

        let offset = LedgerConfig::new().with_utc_offset_minutes(15 * 60);
        assert!(offset.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config = LedgerConfig::from_json_str(r#"{"utc_offset_minutes": 0}"#).unwrap();
        assert_eq!(config.utc_offset_minutes, 0);
        assert_eq!(config.full_delivery_tolerance, Decimal::ONE);

        assert!(LedgerConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_installment_search_terms() {
        let config = LedgerConfig::new();
        assert!(config.is_installment_search_term("分納"));
        assert!(config.is_installment_search_term(" 分納入力 "));
        assert!(!config.is_installment_search_term("分納入力(2回目)"));
    }
}
