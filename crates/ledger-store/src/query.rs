//! 查詢條件

use chrono::{DateTime, Utc};
use ledger_core::{ConfirmationStatus, MovementDirection, TransactionKind};

/// 實體異動查詢條件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementQuery {
    /// 起始時間（含）
    pub start: Option<DateTime<Utc>>,
    /// 結束時間（不含）
    pub end: Option<DateTime<Utc>>,
    pub direction: Option<MovementDirection>,
}

impl MovementQuery {
    /// 完整歷史（不限時間）
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_direction(mut self, direction: MovementDirection) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// 會計交易查詢條件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub kind: TransactionKind,
    pub status: ConfirmationStatus,
}

impl TransactionQuery {
    /// 分納用途：已確認的採購交易
    pub fn confirmed_purchases() -> Self {
        Self {
            start: None,
            end: None,
            kind: TransactionKind::Purchase,
            status: ConfirmationStatus::Confirmed,
        }
    }

    pub fn with_range(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// 時間是否落在範圍內
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| *at >= start) && self.end.map_or(true, |end| *at < end)
    }
}

impl MovementQuery {
    /// 時間是否落在範圍內
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| *at >= start) && self.end.map_or(true, |end| *at < end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_range_is_half_open() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let query = TransactionQuery::confirmed_purchases().with_range(Some(start), Some(end));

        assert!(query.contains(&start));
        assert!(!query.contains(&end));
        assert!(MovementQuery::all().contains(&end));
    }
}
