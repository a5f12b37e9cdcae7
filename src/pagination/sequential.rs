//! Generic sequential pagination
//!
//! The page itself is the pagination context: a retriever produces each page
//! from its predecessor and a checker decides whether to keep going. Useful
//! when the continuation state does not fit the offset or cursor shapes, or
//! when pages do not come from the HTTP transport at all.

use super::engine::{ItemStream, PaginationHooks};
use super::strategies::{ItemExtractor, NextPageChecker, PageRetriever};
use crate::error::Result;
use crate::types::PaginationContext;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Pagination handler driven by a page retriever and a next-page checker
pub struct SequentialPaginationHandler<C, I> {
    page_retriever: Arc<dyn PageRetriever<C>>,
    next_page_checker: Arc<dyn NextPageChecker<C>>,
    item_extractor: Arc<dyn ItemExtractor<C, I>>,
}

impl<C, I> SequentialPaginationHandler<C, I> {
    /// Create a handler from its strategies
    pub fn new(
        page_retriever: Arc<dyn PageRetriever<C>>,
        next_page_checker: Arc<dyn NextPageChecker<C>>,
        item_extractor: Arc<dyn ItemExtractor<C, I>>,
    ) -> Self {
        Self {
            page_retriever,
            next_page_checker,
            item_extractor,
        }
    }
}

#[async_trait]
impl<C, I> PaginationHooks for SequentialPaginationHandler<C, I>
where
    C: Send + Sync + 'static,
    I: Send + 'static,
{
    type Page = C;
    type Transformed = C;
    type Item = I;

    async fn get_page(&self, last_page: Option<&C>, cancel: &CancellationToken) -> Result<C> {
        self.page_retriever.get(last_page, cancel).await
    }

    async fn extract_context(
        &self,
        page: C,
        cancel: &CancellationToken,
    ) -> Result<PaginationContext<C>> {
        let next_page_exists = self.next_page_checker.next_page_exists(&page, cancel).await?;
        Ok(PaginationContext::new(page, next_page_exists))
    }

    fn extract_items<'a>(
        &'a self,
        page: &Arc<C>,
        cancel: &CancellationToken,
    ) -> ItemStream<'a, I> {
        self.item_extractor.extract_items(Arc::clone(page), cancel)
    }
}
