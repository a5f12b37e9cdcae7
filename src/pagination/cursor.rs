//! Cursor pagination
//!
//! Each page hands out an opaque token locating the next one. The first
//! request carries no cursor; traversal ends on the first page without one.

use super::engine::{ItemStream, PaginationHooks};
use super::strategies::{CursorExtractor, CursorPageRequestGenerator, ItemExtractor, PageTransformer};
use crate::error::Result;
use crate::http::{RawPage, Transport};
use crate::types::{Cursor, CursorInformation, PaginationContext, TransformedPage};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Pagination handler for cursor based resources
pub struct CursorBasedPaginationHandler<T, I, C = Cursor> {
    transport: Arc<dyn Transport>,
    page_request_generator: Arc<dyn CursorPageRequestGenerator<C>>,
    page_transformer: Arc<dyn PageTransformer<T>>,
    cursor_extractor: Arc<dyn CursorExtractor<T, C>>,
    item_extractor: Arc<dyn ItemExtractor<T, I>>,
}

impl<T, I, C> CursorBasedPaginationHandler<T, I, C> {
    /// Create a handler from its strategies
    pub fn new(
        transport: Arc<dyn Transport>,
        page_request_generator: Arc<dyn CursorPageRequestGenerator<C>>,
        page_transformer: Arc<dyn PageTransformer<T>>,
        cursor_extractor: Arc<dyn CursorExtractor<T, C>>,
        item_extractor: Arc<dyn ItemExtractor<T, I>>,
    ) -> Self {
        Self {
            transport,
            page_request_generator,
            page_transformer,
            cursor_extractor,
            item_extractor,
        }
    }
}

#[async_trait]
impl<T, I, C> PaginationHooks for CursorBasedPaginationHandler<T, I, C>
where
    T: Send + Sync + 'static,
    I: Send + 'static,
    C: Send + Sync + 'static,
{
    type Page = RawPage;
    type Transformed = TransformedPage<T, CursorInformation<C>>;
    type Item = I;

    async fn get_page(
        &self,
        last_page: Option<&Self::Transformed>,
        cancel: &CancellationToken,
    ) -> Result<RawPage> {
        let cursor = last_page.and_then(|page| page.pagination_information.next_cursor.as_ref());

        let request = self
            .page_request_generator
            .generate(self.transport.base_url(), cursor, cancel)
            .await?;

        self.transport.send(request, cancel).await
    }

    async fn extract_context(
        &self,
        page: RawPage,
        cancel: &CancellationToken,
    ) -> Result<PaginationContext<Self::Transformed>> {
        let transformed = self.page_transformer.transform(page, cancel).await?;
        let next_cursor = self
            .cursor_extractor
            .extract_cursor(&transformed, cancel)
            .await?;

        let information = CursorInformation::new(next_cursor);
        let next_page_exists = information.has_next_page();
        Ok(PaginationContext::new(
            TransformedPage::new(transformed, information),
            next_page_exists,
        ))
    }

    fn extract_items<'a>(
        &'a self,
        page: &Arc<Self::Transformed>,
        cancel: &CancellationToken,
    ) -> ItemStream<'a, I> {
        self.item_extractor
            .extract_items(Arc::clone(&page.transformed_page), cancel)
    }
}
