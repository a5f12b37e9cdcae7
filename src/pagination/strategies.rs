//! Strategy interfaces
//!
//! Each pagination flavor is assembled from single-method capabilities. The
//! handlers own them behind `Arc<dyn ...>` and never mutate them.

use super::engine::ItemStream;
use crate::error::Result;
use crate::http::{PageRequest, RawPage};
use crate::types::{Cursor, IndexData, OffsetInformation, TransformedPage};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

// ============================================================================
// Shared
// ============================================================================

/// Lists the items of a transformed page
pub trait ItemExtractor<T, I>: Send + Sync {
    /// Items of `page`, in the order they should be yielded
    fn extract_items<'a>(&'a self, page: Arc<T>, cancel: &CancellationToken) -> ItemStream<'a, I>;
}

/// Parses a raw page into the flavor's page type
#[async_trait]
pub trait PageTransformer<T>: Send + Sync {
    /// Transform a fetched page
    async fn transform(&self, page: RawPage, cancel: &CancellationToken) -> Result<T>;
}

// ============================================================================
// Offset / Page Number
// ============================================================================

/// Builds the request for a 1-indexed page number
#[async_trait]
pub trait PageRequestGenerator: Send + Sync {
    /// Request for page `page_number` of the resource at `base_url`
    async fn generate(
        &self,
        base_url: &Url,
        page_number: u32,
        cancel: &CancellationToken,
    ) -> Result<PageRequest>;
}

/// Parses a raw page and reads its page coordinates
#[async_trait]
pub trait PaginationInformationExtractor<T>: Send + Sync {
    /// Transform the page and extract its current page / total pages
    async fn extract(
        &self,
        page: RawPage,
        cancel: &CancellationToken,
    ) -> Result<TransformedPage<T, OffsetInformation>>;
}

/// Reads offset/total coordinates from a transformed page
#[async_trait]
pub trait IndexDataExtractor<T, N>: Send + Sync {
    /// Offset of the page's first item and the resource's total item count
    async fn extract_index_data(&self, page: &T, cancel: &CancellationToken)
        -> Result<IndexData<N>>;
}

// ============================================================================
// Cursor
// ============================================================================

/// Builds the request for the page at a cursor
#[async_trait]
pub trait CursorPageRequestGenerator<C = Cursor>: Send + Sync {
    /// Request for the page at `cursor`, or the first page when `None`
    async fn generate(
        &self,
        base_url: &Url,
        cursor: Option<&C>,
        cancel: &CancellationToken,
    ) -> Result<PageRequest>;
}

/// Reads the continuation cursor from a transformed page
#[async_trait]
pub trait CursorExtractor<T, C = Cursor>: Send + Sync {
    /// Cursor of the next page; `None` when `page` is the last one
    async fn extract_cursor(&self, page: &T, cancel: &CancellationToken) -> Result<Option<C>>;
}

// ============================================================================
// Sequential
// ============================================================================

/// Fetches pages that carry their own continuation state
#[async_trait]
pub trait PageRetriever<C>: Send + Sync {
    /// Page following `last_page`, or the first page when `None`
    async fn get(&self, last_page: Option<&C>, cancel: &CancellationToken) -> Result<C>;
}

/// Decides whether another page follows
#[async_trait]
pub trait NextPageChecker<C>: Send + Sync {
    /// Whether a page after `page` exists
    async fn next_page_exists(&self, page: &C, cancel: &CancellationToken) -> Result<bool>;
}
