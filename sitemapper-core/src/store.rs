// Data-access contract the sitemap builder reads through.

use crate::error::DataError;
use crate::model::{ObjectRecord, Page};

/// A queryable field with a backing column name.
pub trait Column: Copy {
    fn column(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageField {
    Id,
    ParentId,
    ClassName,
    Robots,
    Sort,
}

impl Column for PageField {
    fn column(&self) -> &'static str {
        match self {
            PageField::Id => "id",
            PageField::ParentId => "parent_id",
            PageField::ClassName => "class_name",
            PageField::Robots => "robots",
            PageField::Sort => "sort",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectField {
    Id,
    Title,
    Priority,
}

impl Column for ObjectField {
    fn column(&self) -> &'static str {
        match self {
            ObjectField::Id => "id",
            ObjectField::Title => "title",
            ObjectField::Priority => "priority",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy<F> {
    pub field: F,
    pub direction: Direction,
}

impl<F: Column> OrderBy<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Int(i64),
    Text(String),
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(PageField, FilterValue),
    /// Matches when the field differs from the value, including when it is unset.
    Not(PageField, FilterValue),
    /// Set exclusion, with the same unset handling as `Not`.
    NotIn(PageField, Vec<FilterValue>),
    IsNull(PageField),
}

/// Filter predicates and ordering for a page fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageQuery {
    pub filters: Vec<Filter>,
    pub order: Option<OrderBy<PageField>>,
}

impl PageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: PageField, value: impl Into<FilterValue>) -> Self {
        self.filters.push(Filter::Eq(field, value.into()));
        self
    }

    pub fn exclude(mut self, field: PageField, value: impl Into<FilterValue>) -> Self {
        self.filters.push(Filter::Not(field, value.into()));
        self
    }

    pub fn exclude_any<I, V>(mut self, field: PageField, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        let values: Vec<FilterValue> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.filters.push(Filter::NotIn(field, values));
        }
        self
    }

    pub fn is_null(mut self, field: PageField) -> Self {
        self.filters.push(Filter::IsNull(field));
        self
    }

    pub fn order_by(mut self, order: OrderBy<PageField>) -> Self {
        self.order = Some(order);
        self
    }
}

/// Handle to an auxiliary content type the store has confirmed it can query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId {
    key: i64,
    name: String,
}

impl SourceId {
    pub fn new(key: i64, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
        }
    }

    pub fn key(&self) -> i64 {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

pub trait ContentStore {
    fn pages(&self, query: &PageQuery) -> Result<Vec<Page>, DataError>;

    fn children(&self, parent_id: i64, order: OrderBy<PageField>) -> Result<Vec<Page>, DataError> {
        self.pages(
            &PageQuery::new()
                .filter(PageField::ParentId, parent_id)
                .order_by(order),
        )
    }

    /// Fails with [`DataError::UnknownSource`] when no such content type is registered.
    fn resolve_source(&self, name: &str) -> Result<SourceId, DataError>;

    fn objects(
        &self,
        source: &SourceId,
        order: Option<OrderBy<ObjectField>>,
    ) -> Result<Vec<ObjectRecord>, DataError>;
}
