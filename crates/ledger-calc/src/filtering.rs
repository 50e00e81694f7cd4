//! 統合記錄的篩選、排序與分頁
//!
//! 純函式：只處理記憶體中的記錄，可對同一份記錄重複呼叫。

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};
use ledger_core::{
    FilterSpec, LedgerConfig, PagedResult, RecordKind, SortField, SortOrder,
    UnifiedInventoryRecord,
};
use std::cmp::Ordering;

/// 日期篩選換算後的時間邊界（epoch 毫秒，起點含、終點不含）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeBounds {
    pub start_inclusive: Option<i64>,
    pub end_exclusive: Option<i64>,
}

impl TimeBounds {
    pub fn contains(&self, timestamp: i64) -> bool {
        self.start_inclusive.map_or(true, |start| timestamp >= start)
            && self.end_exclusive.map_or(true, |end| timestamp < end)
    }
}

/// 篩選引擎
pub struct FilterEngine;

impl FilterEngine {
    /// 篩選、排序並分頁
    pub fn apply(
        records: &[UnifiedInventoryRecord],
        spec: &FilterSpec,
        config: &LedgerConfig,
    ) -> ledger_core::Result<PagedResult<UnifiedInventoryRecord>> {
        let mut matched = Self::filter(records, spec, config)?;
        Self::sort(&mut matched, spec.sort_by, spec.sort_order);

        tracing::debug!("篩選結果: {} / {} 筆", matched.len(), records.len());
        Ok(PagedResult::from_items(matched, spec.pagination))
    }

    /// 只篩選，保留輸入順序
    pub fn filter(
        records: &[UnifiedInventoryRecord],
        spec: &FilterSpec,
        config: &LedgerConfig,
    ) -> ledger_core::Result<Vec<UnifiedInventoryRecord>> {
        let bounds = Self::local_day_bounds(spec.start_date, spec.end_date, config.local_offset()?);
        Ok(records
            .iter()
            .filter(|record| Self::matches(record, spec, &bounds, config))
            .cloned()
            .collect())
    }

    /// 單筆記錄是否符合所有條件
    pub fn matches(
        record: &UnifiedInventoryRecord,
        spec: &FilterSpec,
        bounds: &TimeBounds,
        config: &LedgerConfig,
    ) -> bool {
        if !spec.record_type.accepts(record.record_type()) {
            return false;
        }

        if let Some(direction) = spec.movement_type {
            match &record.kind {
                RecordKind::InventoryMovement(details) => {
                    if details.direction != Some(direction) {
                        return false;
                    }
                }
                // 方向條件不適用於分納交易
                RecordKind::AmountOnlyTransaction(_) => {}
            }
        }

        if !bounds.contains(record.unified_timestamp) {
            return false;
        }

        if let Some(installment_no) = spec.installment_no() {
            if record.installment_no() != Some(installment_no) {
                return false;
            }
        }

        if let Some(order_no) = spec.order_no() {
            let needle = order_no.to_lowercase();
            let in_order = record
                .order_no()
                .is_some_and(|value| value.to_lowercase().contains(&needle));
            let in_memo = record
                .memo
                .as_deref()
                .is_some_and(|memo| memo.to_lowercase().contains(&needle));
            if !(in_order || in_memo) {
                return false;
            }
        }

        if let Some(term) = spec.search_term() {
            if !Self::matches_search(record, term, config) {
                return false;
            }
        }

        true
    }

    /// 自由文字搜尋
    ///
    /// 「分納」等分類關鍵字會讓所有分納交易直接符合，不看備註內容。
    pub fn matches_search(record: &UnifiedInventoryRecord, term: &str, config: &LedgerConfig) -> bool {
        if config.is_installment_search_term(term) {
            match &record.kind {
                RecordKind::AmountOnlyTransaction(_) => return true,
                RecordKind::InventoryMovement(_) => {}
            }
        }

        let needle = term.to_lowercase();
        let contains = |value: &str| value.to_lowercase().contains(&needle);

        if record.product_name().is_some_and(contains) || record.product_code().is_some_and(contains) {
            return true;
        }

        match record.memo.as_deref() {
            Some(memo) => Self::matches_po_token(memo, term, config.po_token_min_digits) || contains(memo),
            None => false,
        }
    }

    /// 搜尋字串中的採購單號與備註中的採購單號相同（不分大小寫，不看前後文字）
    pub fn matches_po_token(memo: &str, term: &str, min_digits: usize) -> bool {
        let term = term.to_uppercase();
        let wanted = extract_po_tokens(&term, min_digits);
        if wanted.is_empty() {
            return false;
        }

        let memo = memo.to_uppercase();
        extract_po_tokens(&memo, min_digits)
            .into_iter()
            .any(|token| wanted.contains(&token))
    }

    /// 排序；同值時依時間新到舊、再依ID，確保結果穩定
    pub fn sort(records: &mut [UnifiedInventoryRecord], sort_by: SortField, sort_order: SortOrder) {
        records.sort_by(|a, b| {
            let primary = match sort_by {
                SortField::CreatedAt => a.unified_timestamp.cmp(&b.unified_timestamp),
                SortField::ProductName => {
                    case_insensitive_compare(a.product_name().unwrap_or(""), b.product_name().unwrap_or(""))
                }
            };
            let primary = match sort_order {
                SortOrder::Asc => primary,
                SortOrder::Desc => primary.reverse(),
            };
            primary
                .then_with(|| b.unified_timestamp.cmp(&a.unified_timestamp))
                .then_with(|| a.id.cmp(&b.id))
        });
    }

    /// 當地日界：起日 00:00（含）到迄日隔天 00:00（不含）
    pub fn local_day_bounds(
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        offset: FixedOffset,
    ) -> TimeBounds {
        let midnight = |date: NaiveDate| {
            offset
                .from_local_datetime(&date.and_time(NaiveTime::MIN))
                .single()
                .map(|at| at.timestamp_millis())
        };

        TimeBounds {
            start_inclusive: start_date.and_then(midnight),
            end_exclusive: end_date.and_then(|date| date.succ_opt()).and_then(midnight),
        }
    }
}

/// 取出備註中的採購單號 token（`PO` 後接至少 `min_digits` 位數字）
pub fn extract_po_tokens(text: &str, min_digits: usize) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] == b'P' && bytes[i + 1] == b'O' {
            let digits_start = i + 2;
            let mut end = digits_start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end - digits_start >= min_digits {
                tokens.push(&text[i..end]);
                i = end;
                continue;
            }
        }
        i += 1;
    }

    tokens
}

/// 不分大小寫的字串比較，同值時再比較原字串
///
/// 依字碼順序，不做日文讀音排序。
pub fn case_insensitive_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
