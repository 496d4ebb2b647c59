//! Typed search requests
//!
//! A [`Query`] is an ordered list of [`Filter`]s over one entity's fields,
//! conjunctive unless an [`LogicalOperator`] override is set for the whole
//! set. Together with a [`Pagination`] it serializes to the body of an
//! advanced-search call:
//!
//! ```text
//! { "filters": [...], "operator"?: "and"|"or", "page": 1, "size": 20, "sort"?: [...] }
//! ```
//!
//! Nothing here evaluates filters. The remote service is the only authority on
//! which entities match.

mod fields;
mod filter;
mod page;

pub use fields::{EntityField, FieldType, Searchable};
pub use filter::{Filter, FilterOperator, FilterValue, LogicalOperator};
pub use page::{PageableResult, Pagination, SortDirection, SortOrder};

use serde::Serialize;

use crate::errors::{PorticoError, Result};

/// Ordered set of filters over the fields `F`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query<F> {
    filters: Vec<Filter<F>>,
    operator: Option<LogicalOperator>,
}

impl<F: EntityField> Query<F> {
    /// Query from already-validated filters
    pub fn build(filters: impl IntoIterator<Item = Filter<F>>) -> Self {
        Self {
            filters: filters.into_iter().collect(),
            operator: None,
        }
    }

    /// Start a builder that validates as it goes
    pub fn builder() -> QueryBuilder<F> {
        QueryBuilder::new()
    }

    /// Override how the filters combine
    pub fn with_operator(mut self, operator: LogicalOperator) -> Self {
        self.operator = Some(operator);
        self
    }

    /// Filters in insertion order
    pub fn filters(&self) -> &[Filter<F>] {
        &self.filters
    }

    /// Operator override, if any
    pub fn operator(&self) -> Option<LogicalOperator> {
        self.operator
    }

    /// Number of filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the query matches everything
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Request body for this query at `pagination`
    pub fn to_request<'a>(&'a self, pagination: &'a Pagination) -> SearchRequest<'a, F> {
        SearchRequest {
            filters: &self.filters,
            operator: self.operator,
            pagination,
        }
    }
}

impl<F: EntityField> Default for Query<F> {
    fn default() -> Self {
        Self::build(Vec::new())
    }
}

/// Build a query from validated filters.
pub fn build_query<F: EntityField>(filters: impl IntoIterator<Item = Filter<F>>) -> Query<F> {
    Query::build(filters)
}

/// Accumulating query builder.
///
/// Each step validates its filter; the first failure is kept and returned
/// from [`build`](Self::build), and later steps are skipped.
#[derive(Debug)]
pub struct QueryBuilder<F> {
    filters: Vec<Filter<F>>,
    operator: Option<LogicalOperator>,
    error: Option<PorticoError>,
}

impl<F: EntityField> QueryBuilder<F> {
    /// Empty builder
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            operator: None,
            error: None,
        }
    }

    fn push(mut self, filter: Result<Filter<F>>) -> Self {
        if self.error.is_some() {
            return self;
        }
        match filter {
            Ok(filter) => self.filters.push(filter),
            Err(err) => self.error = Some(err),
        }
        self
    }

    /// Add an already-built filter
    pub fn filter(self, filter: Filter<F>) -> Self {
        self.push(Ok(filter))
    }

    /// Add `field == value`
    pub fn eq(self, field: F, value: impl Into<FilterValue>) -> Self {
        self.push(Filter::eq(field, value))
    }

    /// Add `field < value`
    pub fn lt(self, field: F, value: impl Into<FilterValue>) -> Self {
        self.push(Filter::lt(field, value))
    }

    /// Add `field > value`
    pub fn gt(self, field: F, value: impl Into<FilterValue>) -> Self {
        self.push(Filter::gt(field, value))
    }

    /// Add `field ∈ values`
    pub fn is_in<V: Into<FilterValue>>(self, field: F, values: impl IntoIterator<Item = V>) -> Self {
        self.push(Filter::is_in(field, values))
    }

    /// Combine filters with `operator` instead of the remote default
    pub fn operator(mut self, operator: LogicalOperator) -> Self {
        self.operator = Some(operator);
        self
    }

    /// Finish, returning the first validation error if any step failed
    pub fn build(self) -> Result<Query<F>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(Query {
            filters: self.filters,
            operator: self.operator,
        })
    }
}

impl<F: EntityField> Default for QueryBuilder<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable advanced-search body
#[derive(Debug, Serialize)]
#[serde(bound(serialize = "F: EntityField"))]
pub struct SearchRequest<'a, F> {
    filters: &'a [Filter<F>],
    #[serde(skip_serializing_if = "Option::is_none")]
    operator: Option<LogicalOperator>,
    #[serde(flatten)]
    pagination: &'a Pagination,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::errors::ErrorKind;
    use serde_json::json;

    crate::search_fields! {
        enum UserField {
            Status => "status": Text,
            Age => "age": Integer,
            Verified => "verified": Boolean,
        }
    }

    #[test]
    fn test_single_filter_request_body() {
        let query = build_query([Filter::eq(UserField::Status, "ACTIVE").expect("valid")]);
        let pagination = Pagination::first_page(10).expect("valid");
        let body = serde_json::to_value(query.to_request(&pagination)).expect("serialize");
        assert_eq!(
            body,
            json!({
                "filters": [{"field": "status", "operator": "eq", "value": "ACTIVE"}],
                "page": 1,
                "size": 10
            })
        );
    }

    #[test]
    fn test_operator_override_serialized() {
        let query = Query::builder()
            .eq(UserField::Status, "ACTIVE")
            .gt(UserField::Age, 30)
            .operator(LogicalOperator::Or)
            .build()
            .expect("valid");
        let pagination = Pagination::new(2, 5).expect("valid");
        let body = serde_json::to_value(query.to_request(&pagination)).expect("serialize");
        assert_eq!(body["operator"], "or");
        assert_eq!(body["page"], 2);
        assert_eq!(body["filters"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["filters"][1], json!({"field": "age", "operator": "gt", "value": 30}));
    }

    #[test]
    fn test_builder_keeps_first_error() {
        let err = Query::builder()
            .eq(UserField::Status, "ACTIVE")
            .lt(UserField::Verified, false)
            .eq(UserField::Age, "old")
            .build()
            .expect_err("unordered field");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.message().contains("verified"));
    }

    #[test]
    fn test_empty_query_sends_empty_filter_list() {
        let query = Query::<UserField>::default();
        let pagination = Pagination::first_page(3).expect("valid");
        let body = serde_json::to_value(query.to_request(&pagination)).expect("serialize");
        assert_eq!(body["filters"], json!([]));
        assert!(body.get("operator").is_none());
        assert!(body.get("sort").is_none());
    }
}
