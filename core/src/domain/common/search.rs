//! Typed search parameters shared by every repository.
//!
//! Callers describe what they want (exact-match criteria, a free-text term,
//! sort, pagination, tenant restriction) and the search engine in
//! `infrastructure::search` turns it into a query. Column names are resolved
//! against the per-resource `SearchConfig`; unknown names are an error, never
//! a silent no-op.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::domain::common::entities::app_errors::DaoError;

/// A value usable in an exact-match criterion.
#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaValue {
    Text(String),
    Int(i64),
    Bool(bool),
    Uuid(Uuid),
}

impl fmt::Display for CriteriaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriteriaValue::Text(value) => write!(f, "{value}"),
            CriteriaValue::Int(value) => write!(f, "{value}"),
            CriteriaValue::Bool(value) => write!(f, "{value}"),
            CriteriaValue::Uuid(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for CriteriaValue {
    fn from(value: &str) -> Self {
        CriteriaValue::Text(value.to_string())
    }
}

impl From<String> for CriteriaValue {
    fn from(value: String) -> Self {
        CriteriaValue::Text(value)
    }
}

impl From<i32> for CriteriaValue {
    fn from(value: i32) -> Self {
        CriteriaValue::Int(value.into())
    }
}

impl From<i64> for CriteriaValue {
    fn from(value: i64) -> Self {
        CriteriaValue::Int(value)
    }
}

impl From<bool> for CriteriaValue {
    fn from(value: bool) -> Self {
        CriteriaValue::Bool(value)
    }
}

impl From<Uuid> for CriteriaValue {
    fn from(value: Uuid) -> Self {
        CriteriaValue::Uuid(value)
    }
}

/// Exact-match filters, ANDed together by the engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Criteria {
    entries: Vec<(String, CriteriaValue)>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, column: impl Into<String>, value: impl Into<CriteriaValue>) -> Self {
        self.entries.push((column.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, CriteriaValue)] {
        &self.entries
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (column, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{column}={value}")?;
        }
        Ok(())
    }
}

/// Sort direction, ascending unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl FromStr for Direction {
    type Err = DaoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            other => Err(DaoError::invalid_direction(other)),
        }
    }
}

/// Combined search request: criteria, free-text term, sort and pagination.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchParams {
    pub criteria: Criteria,
    pub search: Option<String>,
    pub order: Option<String>,
    pub direction: Direction,
    pub limit: Option<u64>,
    pub offset: u64,
    pub tenant_uuids: Option<Vec<Uuid>>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, column: impl Into<String>, value: impl Into<CriteriaValue>) -> Self {
        self.criteria = self.criteria.and(column, value);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order = Some(column.into());
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Restrict results to the given tenants. An empty set matches nothing.
    pub fn tenants(mut self, tenant_uuids: impl IntoIterator<Item = Uuid>) -> Self {
        self.tenant_uuids = Some(tenant_uuids.into_iter().collect());
        self
    }
}

/// A page of results plus the total count of matching rows before
/// pagination was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<T> {
    pub total: u64,
    pub items: Vec<T>,
}

impl<T> SearchResult<T> {
    pub fn new(total: u64, items: Vec<T>) -> Self {
        Self { total, items }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SearchResult<U> {
        SearchResult {
            total: self.total,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_builder_accumulates() {
        let criteria = Criteria::new()
            .and("context", "default")
            .and("enabled", true)
            .and("position", 2);
        assert_eq!(criteria.entries().len(), 3);
        assert_eq!(
            criteria.entries()[0],
            ("context".to_string(), CriteriaValue::Text("default".to_string()))
        );
        assert_eq!(criteria.to_string(), "context=default, enabled=true, position=2");
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("asc".parse::<Direction>().unwrap(), Direction::Asc);
        assert_eq!("desc".parse::<Direction>().unwrap(), Direction::Desc);

        let err = "sideways".parse::<Direction>().unwrap_err();
        assert_eq!(err.to_string(), "invalid sort direction: sideways");
    }

    #[test]
    fn test_params_builder() {
        let tenant = Uuid::new_v4();
        let params = SearchParams::new()
            .filter("context", "default")
            .search("ton")
            .order_by("name")
            .direction(Direction::Desc)
            .limit(10)
            .offset(5)
            .tenants([tenant]);

        assert_eq!(params.criteria.entries().len(), 1);
        assert_eq!(params.search.as_deref(), Some("ton"));
        assert_eq!(params.order.as_deref(), Some("name"));
        assert_eq!(params.direction, Direction::Desc);
        assert_eq!(params.limit, Some(10));
        assert_eq!(params.offset, 5);
        assert_eq!(params.tenant_uuids, Some(vec![tenant]));
    }

    #[test]
    fn test_result_map_preserves_total() {
        let result = SearchResult::new(12, vec![1, 2, 3]);
        let mapped = result.map(|n| n.to_string());
        assert_eq!(mapped.total, 12);
        assert_eq!(mapped.items, vec!["1", "2", "3"]);
    }
}
