//! Traversal engine
//!
//! Retrieves every item of a paginated resource by walking from one page to
//! the next for as long as more pages are available:
//!
//! 1. Fetch the next page, given the previous transformed page (none at first).
//! 2. Extract the pagination context: the transformed page and whether
//!    another page follows it.
//! 3. Yield every item of the transformed page, checking cancellation before
//!    each one.
//! 4. Repeat while the context says a next page exists.
//!
//! Exactly one page is in flight at a time and only the most recent page is
//! retained.

use crate::error::{Error, Result};
use crate::types::PaginationContext;
use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Lazy sequence of items, or the error that ended it
pub type ItemStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// The three flavor-specific steps of a traversal
#[async_trait]
pub trait PaginationHooks: Send + Sync {
    /// Page as returned by the fetch step
    type Page: Send;
    /// Page after context extraction
    type Transformed: Send + Sync;
    /// Items yielded to the consumer
    type Item: Send;

    /// Fetch the page following `last_page`, or the first page when `None`
    async fn get_page(
        &self,
        last_page: Option<&Self::Transformed>,
        cancel: &CancellationToken,
    ) -> Result<Self::Page>;

    /// Derive the transformed page and the next-page flag from a fetched page
    async fn extract_context(
        &self,
        page: Self::Page,
        cancel: &CancellationToken,
    ) -> Result<PaginationContext<Self::Transformed>>;

    /// Items of a transformed page, in page order
    fn extract_items<'a>(
        &'a self,
        page: &Arc<Self::Transformed>,
        cancel: &CancellationToken,
    ) -> ItemStream<'a, Self::Item>;
}

/// Retrieves all items from a paginated resource
pub trait PaginationHandler<T>: Send + Sync {
    /// Start a fresh traversal
    ///
    /// The returned stream is single-pass. It ends with `None` once the last
    /// page is exhausted, yields `Err(Error::Cancelled)` once if `cancel`
    /// fires, and yields the first hook failure once. Nothing follows an
    /// error.
    fn get_all_items(&self, cancel: CancellationToken) -> ItemStream<'_, T>;
}

impl<H: PaginationHooks> PaginationHandler<H::Item> for H {
    fn get_all_items(&self, cancel: CancellationToken) -> ItemStream<'_, H::Item> {
        let traversal = Traversal::new(self, cancel);
        let items = stream::unfold(traversal, |mut traversal| async move {
            let next = traversal.advance().await;
            next.map(|item| (item, traversal))
        });
        // `Unfold` must not be polled after it ends
        Box::pin(items.fuse())
    }
}

/// Drain a traversal into a vector, failing on the first error
pub async fn collect_all_items<T, H>(handler: &H, cancel: CancellationToken) -> Result<Vec<T>>
where
    H: PaginationHandler<T> + ?Sized,
{
    let mut stream = handler.get_all_items(cancel);
    let mut items = Vec::new();
    while let Some(item) = stream.next().await {
        items.push(item?);
    }
    Ok(items)
}

struct Traversal<'a, H: PaginationHooks> {
    hooks: &'a H,
    cancel: CancellationToken,
    last_page: Option<Arc<H::Transformed>>,
    next_page_exists: bool,
    items: Option<ItemStream<'a, H::Item>>,
    pages_fetched: u64,
    items_on_page: u64,
    finished: bool,
}

impl<'a, H: PaginationHooks> Traversal<'a, H> {
    fn new(hooks: &'a H, cancel: CancellationToken) -> Self {
        Self {
            hooks,
            cancel,
            last_page: None,
            next_page_exists: true,
            items: None,
            pages_fetched: 0,
            items_on_page: 0,
            finished: false,
        }
    }

    async fn advance(&mut self) -> Option<Result<H::Item>> {
        if self.finished {
            return None;
        }

        loop {
            if let Some(items) = self.items.as_mut() {
                match items.next().await {
                    Some(Ok(item)) => {
                        if self.cancel.is_cancelled() {
                            return self.fail(Error::Cancelled);
                        }
                        self.items_on_page += 1;
                        return Some(Ok(item));
                    }
                    Some(Err(e)) => return self.fail(e),
                    None => {
                        trace!(
                            page = self.pages_fetched,
                            items = self.items_on_page,
                            "Page exhausted"
                        );
                        self.items = None;
                    }
                }
            }

            if !self.next_page_exists {
                self.finished = true;
                return None;
            }

            if self.cancel.is_cancelled() {
                return self.fail(Error::Cancelled);
            }

            if let Err(e) = self.fetch_next_page().await {
                return self.fail(e);
            }
        }
    }

    async fn fetch_next_page(&mut self) -> Result<()> {
        let hooks = self.hooks;
        let page = hooks
            .get_page(self.last_page.as_deref(), &self.cancel)
            .await?;
        let context = hooks.extract_context(page, &self.cancel).await?;

        self.pages_fetched += 1;
        self.items_on_page = 0;
        debug!(
            page = self.pages_fetched,
            next_page_exists = context.next_page_exists,
            "Fetched page"
        );

        let current = Arc::new(context.current_page);
        self.items = Some(hooks.extract_items(&current, &self.cancel));
        self.last_page = Some(current);
        self.next_page_exists = context.next_page_exists;
        Ok(())
    }

    fn fail(&mut self, error: Error) -> Option<Result<H::Item>> {
        if !error.is_cancelled() {
            debug!(page = self.pages_fetched, error = %error, "Traversal failed");
        }
        self.finished = true;
        self.items = None;
        self.last_page = None;
        Some(Err(error))
    }
}
