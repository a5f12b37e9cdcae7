//! Common types used throughout pagewalk
//!
//! This module contains the value types passed between the traversal engine
//! and the pagination strategies.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Default cursor representation: an opaque token handed out by the API
pub type Cursor = String;

// ============================================================================
// Index Data
// ============================================================================

/// Offset/total coordinates of a page, as reported by offset-paginated APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexData<N> {
    /// Index of the first item on the page
    pub offset: N,
    /// Total number of items in the resource
    pub total: N,
}

impl<N> IndexData<N> {
    /// Create index data
    pub fn new(offset: N, total: N) -> Self {
        Self { offset, total }
    }
}

// ============================================================================
// Pagination Information
// ============================================================================

/// Page coordinates for offset/page-number pagination (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetInformation {
    /// Number of the page this information was extracted from
    pub current_page: u32,
    /// Number of pages in the resource
    pub total_pages: u32,
}

impl OffsetInformation {
    /// Create offset information
    pub fn new(current_page: u32, total_pages: u32) -> Self {
        Self {
            current_page,
            total_pages,
        }
    }

    /// Whether a page after the current one exists
    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Continuation token for cursor pagination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorInformation<C = Cursor> {
    /// Cursor of the next page; `None` on the last page
    pub next_cursor: Option<C>,
}

impl<C> CursorInformation<C> {
    /// Create cursor information
    pub fn new(next_cursor: Option<C>) -> Self {
        Self { next_cursor }
    }

    /// Whether a page after the current one exists
    pub fn has_next_page(&self) -> bool {
        self.next_cursor.is_some()
    }
}

// ============================================================================
// Pages
// ============================================================================

/// A parsed page together with the pagination information derived from it
///
/// The page body sits behind an `Arc` so the item stream of a page can hold it
/// while the engine keeps the same page around to request its successor.
#[derive(Debug)]
pub struct TransformedPage<T, P> {
    /// The page after flavor-specific parsing
    pub transformed_page: Arc<T>,
    /// Pagination coordinates derived from the page
    pub pagination_information: P,
}

impl<T, P> TransformedPage<T, P> {
    /// Create a transformed page
    pub fn new(transformed_page: T, pagination_information: P) -> Self {
        Self {
            transformed_page: Arc::new(transformed_page),
            pagination_information,
        }
    }
}

impl<T, P: Clone> Clone for TransformedPage<T, P> {
    fn clone(&self) -> Self {
        Self {
            transformed_page: Arc::clone(&self.transformed_page),
            pagination_information: self.pagination_information.clone(),
        }
    }
}

/// Per-iteration state of a traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationContext<T> {
    /// The current transformed page
    pub current_page: T,
    /// Whether another page should be fetched after this one
    pub next_page_exists: bool,
}

impl<T> PaginationContext<T> {
    /// Create a pagination context
    pub fn new(current_page: T, next_page_exists: bool) -> Self {
        Self {
            current_page,
            next_page_exists,
        }
    }

    /// Context for the last page of a resource
    pub fn last(current_page: T) -> Self {
        Self::new(current_page, false)
    }
}
