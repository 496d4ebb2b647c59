//! Pagination, sorting, and paged results

use serde::{Deserialize, Serialize};

use super::fields::EntityField;
use crate::errors::{PorticoError, Result};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

/// One sort key, applied by the remote in sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    /// Wire name of the field
    pub field: String,
    /// Direction for this key
    pub direction: SortDirection,
}

/// Page selection for a search.
///
/// `page` is 1-based and `size` bounds the number of results. Both are at
/// least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    page: u32,
    size: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sort: Vec<SortOrder>,
}

impl Pagination {
    /// Select `page` of `size` results.
    pub fn new(page: u32, size: u32) -> Result<Self> {
        if page == 0 {
            return Err(PorticoError::validation("Page numbers start at 1"));
        }
        if size == 0 {
            return Err(PorticoError::validation("Page size must be at least 1"));
        }
        Ok(Self {
            page,
            size,
            sort: Vec::new(),
        })
    }

    /// First page of `size` results
    pub fn first_page(size: u32) -> Result<Self> {
        Self::new(1, size)
    }

    /// Append a sort key; earlier keys take precedence.
    pub fn sorted_by<F: EntityField>(mut self, field: F, direction: SortDirection) -> Self {
        self.sort.push(SortOrder {
            field: field.name().to_string(),
            direction,
        });
        self
    }

    /// The page after this one, keeping size and sort
    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self.clone()
        }
    }

    /// 1-based page number
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Page size
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Sort keys in precedence order
    pub fn sort(&self) -> &[SortOrder] {
        &self.sort
    }
}

/// A page of entities plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageableResult<T> {
    /// Number of pages at the requested size
    pub total_pages: u64,
    /// Number of matching entities across all pages
    pub total_elements: u64,
    /// Whether this is the first page
    pub first: bool,
    /// Whether this is the last page
    pub last: bool,
    /// Requested page size
    pub size: u32,
    /// Entities on this page
    pub content: Vec<T>,
}

impl<T> PageableResult<T> {
    /// Number of entities on this page
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether this page holds no entities
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Transform the entities, keeping the metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageableResult<U> {
        PageableResult {
            total_pages: self.total_pages,
            total_elements: self.total_elements,
            first: self.first,
            last: self.last,
            size: self.size,
            content: self.content.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::errors::ErrorKind;

    crate::search_fields! {
        enum Field {
            Name => "name": Text,
            CreatedAt => "createdAt": Timestamp,
        }
    }

    #[test]
    fn test_zero_page_or_size_rejected() {
        assert_eq!(
            Pagination::new(0, 10).expect_err("page 0").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Pagination::new(1, 0).expect_err("size 0").kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_sort_keys_keep_order() {
        let pagination = Pagination::first_page(25)
            .expect("valid")
            .sorted_by(Field::CreatedAt, SortDirection::Desc)
            .sorted_by(Field::Name, SortDirection::Asc);
        let json = serde_json::to_value(&pagination).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "page": 1,
                "size": 25,
                "sort": [
                    {"field": "createdAt", "direction": "desc"},
                    {"field": "name", "direction": "asc"}
                ]
            })
        );
        assert_eq!(pagination.next().page(), 2);
        assert_eq!(pagination.next().sort().len(), 2);
    }

    #[test]
    fn test_pageable_result_wire_format() {
        let body = r#"{
            "totalPages": 2,
            "totalElements": 3,
            "first": true,
            "last": false,
            "size": 2,
            "content": ["a", "b"]
        }"#;
        let page: PageableResult<String> = serde_json::from_str(body).expect("parse");
        assert_eq!(page.total_elements, 3);
        assert!(page.first && !page.last);
        assert_eq!(page.map(|s| s.len()).content, vec![1, 1]);
    }
}
