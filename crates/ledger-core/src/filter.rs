//! 篩選、排序與分頁條件

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::movement::MovementDirection;
use crate::record::RecordType;

/// 記錄類型篩選
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordTypeFilter {
    #[default]
    All,
    InventoryMovement,
    AmountOnlyTransaction,
}

impl RecordTypeFilter {
    pub fn accepts(self, record_type: RecordType) -> bool {
        match self {
            RecordTypeFilter::All => true,
            RecordTypeFilter::InventoryMovement => record_type == RecordType::InventoryMovement,
            RecordTypeFilter::AmountOnlyTransaction => {
                record_type == RecordType::AmountOnlyTransaction
            }
        }
    }
}

/// 排序欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    ProductName,
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// 日期範圍（以當地日期表示，兩端皆含）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_unbounded(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none()
    }
}

/// 分頁參數（頁碼從 1 開始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// 起始位置（頁碼過大時飽和，結果為空頁）
    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.per_page.max(1))
    }
}

/// 分頁結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    /// 篩選後的總筆數（分頁前）
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

impl<T> PagedResult<T> {
    /// 依分頁參數切出一頁；未指定分頁時整批為一頁
    pub fn from_items(items: Vec<T>, pagination: Option<Pagination>) -> Self {
        let total = items.len();
        match pagination {
            None => Self {
                items,
                total,
                page: 1,
                per_page: total,
                total_pages: usize::from(total > 0),
            },
            Some(pagination) => {
                let per_page = pagination.per_page.max(1);
                let items = items
                    .into_iter()
                    .skip(pagination.offset())
                    .take(per_page)
                    .collect();
                Self {
                    items,
                    total,
                    page: pagination.page.max(1),
                    per_page,
                    total_pages: total.div_ceil(per_page),
                }
            }
        }
    }
}

/// 統合記錄的篩選與排序條件（全部選填，彼此為 AND）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// 自由文字搜尋
    pub search_term: Option<String>,

    pub record_type: RecordTypeFilter,

    /// 只套用在實體異動上
    pub movement_type: Option<MovementDirection>,

    pub start_date: Option<NaiveDate>,

    pub end_date: Option<NaiveDate>,

    /// 分納回次，非數字時忽略
    pub installment_no: Option<String>,

    pub order_no: Option<String>,

    pub sort_by: SortField,

    pub sort_order: SortOrder,

    pub pagination: Option<Pagination>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置搜尋字串
    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    /// 建構器模式：設置記錄類型
    pub fn with_record_type(mut self, record_type: RecordTypeFilter) -> Self {
        self.record_type = record_type;
        self
    }

    /// 建構器模式：設置異動方向
    pub fn with_movement_type(mut self, direction: MovementDirection) -> Self {
        self.movement_type = Some(direction);
        self
    }

    /// 建構器模式：設置日期範圍
    pub fn with_date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// 建構器模式：設置分納回次
    pub fn with_installment_no(mut self, installment_no: impl Into<String>) -> Self {
        self.installment_no = Some(installment_no.into());
        self
    }

    /// 建構器模式：設置採購單號
    pub fn with_order_no(mut self, order_no: impl Into<String>) -> Self {
        self.order_no = Some(order_no.into());
        self
    }

    /// 建構器模式：設置排序
    pub fn with_sort(mut self, sort_by: SortField, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    /// 建構器模式：設置分頁
    pub fn with_pagination(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination::new(page, per_page));
        self
    }

    pub fn date_range(&self) -> DateRange {
        DateRange {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// 非空白的搜尋字串
    pub fn search_term(&self) -> Option<&str> {
        non_blank(self.search_term.as_deref())
    }

    pub fn order_no(&self) -> Option<&str> {
        non_blank(self.order_no.as_deref())
    }

    /// 可解析為整數的分納回次
    pub fn installment_no(&self) -> Option<i32> {
        non_blank(self.installment_no.as_deref()).and_then(|value| value.parse().ok())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
