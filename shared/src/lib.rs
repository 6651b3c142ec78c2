use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anything with an integer database id.
///
/// The CRUD container relies on this to patch the matching entry of a loaded
/// list after an item mutation.
pub trait Identified {
    fn id(&self) -> i64;
}

/// Paginated list envelope returned by list endpoints:
/// `{count, next, previous, results}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Total number of records across all pages.
    pub count: u64,
    /// URL of the next page, if any.
    pub next: Option<String>,
    /// URL of the previous page, if any.
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Whether a category applies to income, expenses, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Income,
    Expense,
    Both,
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryType::Income => write!(f, "income"),
            CategoryType::Expense => write!(f, "expense"),
            CategoryType::Both => write!(f, "both"),
        }
    }
}

/// Full category record as returned by detail endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    /// Id of the parent category, if this is a subcategory.
    pub parent: Option<i64>,
    pub icon: Option<String>,
    pub color: Option<String>,
    /// Whether this category was seeded by the server rather than the user.
    pub is_default: bool,
    pub description: Option<String>,
}

impl Identified for Category {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Projection of [`Category`] used in list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    pub parent: Option<i64>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl CategorySummary {
    /// Copy every projected field from a full category record.
    ///
    /// Used to keep an already-listed entry consistent after the server
    /// confirms an update, without re-fetching the list.
    pub fn sync_from(&mut self, category: &Category) {
        self.name = category.name.clone();
        self.category_type = category.category_type;
        self.parent = category.parent;
        self.icon = category.icon.clone();
        self.color = category.color.clone();
    }
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            category_type: category.category_type,
            parent: category.parent,
            icon: category.icon.clone(),
            color: category.color.clone(),
        }
    }
}

impl Identified for CategorySummary {
    fn id(&self) -> i64 {
        self.id
    }
}

/// A category plus its direct subcategories, as returned by the hierarchy
/// endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryHierarchy {
    #[serde(flatten)]
    pub category: CategorySummary,
    pub subcategories: Vec<CategorySummary>,
}

/// Filters accepted by the category list endpoint.
///
/// All fields are optional; unset fields are omitted from the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryFilters {
    #[serde(rename = "type")]
    pub category_type: Option<CategoryType>,
    pub parent: Option<i64>,
    pub search: Option<String>,
    pub is_default: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl CategoryFilters {
    /// Overlay `other` on top of `self`: set fields in `other` win, unset
    /// fields keep the current value.
    pub fn merge(&mut self, other: CategoryFilters) {
        if other.category_type.is_some() {
            self.category_type = other.category_type;
        }
        if other.parent.is_some() {
            self.parent = other.parent;
        }
        if other.search.is_some() {
            self.search = other.search;
        }
        if other.is_default.is_some() {
            self.is_default = other.is_default;
        }
        if other.page.is_some() {
            self.page = other.page;
        }
        if other.page_size.is_some() {
            self.page_size = other.page_size;
        }
    }

    /// Render the set fields as query parameters.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(t) = self.category_type {
            params.push(("type".to_string(), t.to_string()));
        }
        if let Some(parent) = self.parent {
            params.push(("parent".to_string(), parent.to_string()));
        }
        if let Some(search) = &self.search {
            params.push(("search".to_string(), search.clone()));
        }
        if let Some(is_default) = self.is_default {
            params.push(("is_default".to_string(), is_default.to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            params.push(("page_size".to_string(), page_size.to_string()));
        }
        params
    }
}

/// Payload for creating a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial payload for updating a category; unset fields are left untouched
/// by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub category_type: Option<CategoryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One row of the per-category statistics report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStatistics {
    pub category_id: i64,
    pub category_name: String,
    pub transaction_count: u64,
    pub total_amount: f64,
}

/// One point of a category's spend-over-time trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTrendPoint {
    /// Period label, e.g. "2026-08".
    pub period: String,
    pub total: f64,
    pub transaction_count: u64,
}

/// Date-bounded query for category transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<u32>,
}

impl DateRangeQuery {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(start) = self.start_date {
            params.push(("start_date".to_string(), start.to_string()));
        }
        if let Some(end) = self.end_date {
            params.push(("end_date".to_string(), end.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// Date-bounded query for the statistics report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl StatisticsQuery {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(start) = self.start_date {
            params.push(("start_date".to_string(), start.to_string()));
        }
        if let Some(end) = self.end_date {
            params.push(("end_date".to_string(), end.to_string()));
        }
        params
    }
}

/// Transaction record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// Description of the transaction (max 256 characters).
    pub description: String,
    /// Positive for income, negative for expense.
    pub amount: f64,
    /// Id of the category this transaction is filed under, if any.
    pub category: Option<i64>,
    /// Transaction date (RFC 3339).
    pub date: String,
}

impl Identified for Transaction {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Payload for creating a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionCreate {
    pub description: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<i64>,
    /// Optional date override (RFC 3339); the server uses the current time
    /// if not provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Partial payload for updating a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Filters accepted by the transaction list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionFilters {
    pub category: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl TransactionFilters {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(category) = self.category {
            params.push(("category".to_string(), category.to_string()));
        }
        if let Some(start) = self.start_date {
            params.push(("start_date".to_string(), start.to_string()));
        }
        if let Some(end) = self.end_date {
            params.push(("end_date".to_string(), end.to_string()));
        }
        if let Some(search) = &self.search {
            params.push(("search".to_string(), search.clone()));
        }
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            params.push(("page_size".to_string(), page_size.to_string()));
        }
        params
    }
}
