//! Fluent handler builders
//!
//! Each flavor has a builder with one `with_*` setter per strategy. Setters
//! replace whatever was set before. `build` checks that every required
//! strategy is present and can be called repeatedly; each call assembles a
//! new handler from the same strategy instances.

use super::cursor::CursorBasedPaginationHandler;
use super::offset::OffsetBasedPaginationHandler;
use super::sequential::SequentialPaginationHandler;
use super::strategies::{
    CursorExtractor, CursorPageRequestGenerator, ItemExtractor, NextPageChecker,
    PageRequestGenerator, PageRetriever, PageTransformer, PaginationInformationExtractor,
};
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::types::Cursor;
use std::sync::Arc;

/// Pull a required strategy out of a builder slot
fn require<S: ?Sized>(
    slot: &Option<Arc<S>>,
    builder: &'static str,
    strategy: &'static str,
    setter: &'static str,
) -> Result<Arc<S>> {
    slot.clone()
        .ok_or_else(|| Error::missing_strategy(builder, strategy, setter))
}

// ============================================================================
// Shared Base
// ============================================================================

/// Collaborators shared by every HTTP-backed builder
#[derive(Clone, Default)]
pub struct HandlerBuilderBase {
    transport: Option<Arc<dyn Transport>>,
}

impl HandlerBuilderBase {
    /// Set the transport pages are fetched through
    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) {
        self.transport = Some(transport);
    }

    /// The configured transport, if any
    pub fn transport(&self) -> Option<&Arc<dyn Transport>> {
        self.transport.as_ref()
    }

    fn require_transport(&self, builder: &'static str) -> Result<Arc<dyn Transport>> {
        require(&self.transport, builder, "transport", "with_transport")
    }
}

// ============================================================================
// Offset
// ============================================================================

/// Builder for [`OffsetBasedPaginationHandler`]
pub struct OffsetBasedPaginationHandlerBuilder<T, I> {
    base: HandlerBuilderBase,
    page_request_generator: Option<Arc<dyn PageRequestGenerator>>,
    pagination_information_extractor: Option<Arc<dyn PaginationInformationExtractor<T>>>,
    item_extractor: Option<Arc<dyn ItemExtractor<T, I>>>,
}

impl<T, I> Default for OffsetBasedPaginationHandlerBuilder<T, I> {
    fn default() -> Self {
        Self {
            base: HandlerBuilderBase::default(),
            page_request_generator: None,
            pagination_information_extractor: None,
            item_extractor: None,
        }
    }
}

impl<T, I> OffsetBasedPaginationHandlerBuilder<T, I> {
    const NAME: &'static str = "OffsetBasedPaginationHandlerBuilder";

    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the transport pages are fetched through
    #[must_use]
    pub fn with_transport(self, transport: impl Transport + 'static) -> Self {
        self.with_shared_transport(Arc::new(transport))
    }

    /// Set a transport that is shared with other handlers
    #[must_use]
    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.base.set_transport(transport);
        self
    }

    /// Set the strategy building the request for each page number
    #[must_use]
    pub fn with_page_request_generation(
        mut self,
        generator: impl PageRequestGenerator + 'static,
    ) -> Self {
        self.page_request_generator = Some(Arc::new(generator));
        self
    }

    /// Set the page request generator built by `factory`
    #[must_use]
    pub fn with_page_request_generation_from<S, F>(self, factory: F) -> Self
    where
        S: PageRequestGenerator + 'static,
        F: FnOnce() -> S,
    {
        self.with_page_request_generation(factory())
    }

    /// Set the strategy reading page coordinates from each page
    #[must_use]
    pub fn with_pagination_information_extraction(
        mut self,
        extractor: impl PaginationInformationExtractor<T> + 'static,
    ) -> Self {
        self.pagination_information_extractor = Some(Arc::new(extractor));
        self
    }

    /// Set the pagination information extractor built by `factory`
    #[must_use]
    pub fn with_pagination_information_extraction_from<S, F>(self, factory: F) -> Self
    where
        S: PaginationInformationExtractor<T> + 'static,
        F: FnOnce() -> S,
    {
        self.with_pagination_information_extraction(factory())
    }

    /// Set the strategy listing the items of each page
    #[must_use]
    pub fn with_item_extraction(mut self, extractor: impl ItemExtractor<T, I> + 'static) -> Self {
        self.item_extractor = Some(Arc::new(extractor));
        self
    }

    /// Set the item extractor built by `factory`
    #[must_use]
    pub fn with_item_extraction_from<S, F>(self, factory: F) -> Self
    where
        S: ItemExtractor<T, I> + 'static,
        F: FnOnce() -> S,
    {
        self.with_item_extraction(factory())
    }

    /// Assemble the handler
    pub fn build(&self) -> Result<OffsetBasedPaginationHandler<T, I>> {
        let page_request_generator = require(
            &self.page_request_generator,
            Self::NAME,
            "page request generator",
            "with_page_request_generation",
        )?;
        let pagination_information_extractor = require(
            &self.pagination_information_extractor,
            Self::NAME,
            "pagination information extractor",
            "with_pagination_information_extraction",
        )?;
        let item_extractor = require(
            &self.item_extractor,
            Self::NAME,
            "item extractor",
            "with_item_extraction",
        )?;
        let transport = self.base.require_transport(Self::NAME)?;

        Ok(OffsetBasedPaginationHandler::new(
            transport,
            page_request_generator,
            pagination_information_extractor,
            item_extractor,
        ))
    }
}

// ============================================================================
// Cursor
// ============================================================================

/// Builder for [`CursorBasedPaginationHandler`]
pub struct CursorBasedPaginationHandlerBuilder<T, I, C = Cursor> {
    base: HandlerBuilderBase,
    page_request_generator: Option<Arc<dyn CursorPageRequestGenerator<C>>>,
    page_transformer: Option<Arc<dyn PageTransformer<T>>>,
    cursor_extractor: Option<Arc<dyn CursorExtractor<T, C>>>,
    item_extractor: Option<Arc<dyn ItemExtractor<T, I>>>,
}

impl<T, I, C> Default for CursorBasedPaginationHandlerBuilder<T, I, C> {
    fn default() -> Self {
        Self {
            base: HandlerBuilderBase::default(),
            page_request_generator: None,
            page_transformer: None,
            cursor_extractor: None,
            item_extractor: None,
        }
    }
}

impl<T, I, C> CursorBasedPaginationHandlerBuilder<T, I, C> {
    const NAME: &'static str = "CursorBasedPaginationHandlerBuilder";

    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the transport pages are fetched through
    #[must_use]
    pub fn with_transport(self, transport: impl Transport + 'static) -> Self {
        self.with_shared_transport(Arc::new(transport))
    }

    /// Set a transport that is shared with other handlers
    #[must_use]
    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.base.set_transport(transport);
        self
    }

    /// Set the strategy building the request for each cursor
    #[must_use]
    pub fn with_page_request_generation(
        mut self,
        generator: impl CursorPageRequestGenerator<C> + 'static,
    ) -> Self {
        self.page_request_generator = Some(Arc::new(generator));
        self
    }

    /// Set the cursor page request generator built by `factory`
    #[must_use]
    pub fn with_page_request_generation_from<S, F>(self, factory: F) -> Self
    where
        S: CursorPageRequestGenerator<C> + 'static,
        F: FnOnce() -> S,
    {
        self.with_page_request_generation(factory())
    }

    /// Set the strategy parsing each fetched page
    #[must_use]
    pub fn with_page_transformation(mut self, transformer: impl PageTransformer<T> + 'static) -> Self {
        self.page_transformer = Some(Arc::new(transformer));
        self
    }

    /// Set the page transformer built by `factory`
    #[must_use]
    pub fn with_page_transformation_from<S, F>(self, factory: F) -> Self
    where
        S: PageTransformer<T> + 'static,
        F: FnOnce() -> S,
    {
        self.with_page_transformation(factory())
    }

    /// Set the strategy reading the next cursor from each page
    #[must_use]
    pub fn with_cursor_extraction(mut self, extractor: impl CursorExtractor<T, C> + 'static) -> Self {
        self.cursor_extractor = Some(Arc::new(extractor));
        self
    }

    /// Set the cursor extractor built by `factory`
    #[must_use]
    pub fn with_cursor_extraction_from<S, F>(self, factory: F) -> Self
    where
        S: CursorExtractor<T, C> + 'static,
        F: FnOnce() -> S,
    {
        self.with_cursor_extraction(factory())
    }

    /// Set the strategy listing the items of each page
    #[must_use]
    pub fn with_item_extraction(mut self, extractor: impl ItemExtractor<T, I> + 'static) -> Self {
        self.item_extractor = Some(Arc::new(extractor));
        self
    }

    /// Set the item extractor built by `factory`
    #[must_use]
    pub fn with_item_extraction_from<S, F>(self, factory: F) -> Self
    where
        S: ItemExtractor<T, I> + 'static,
        F: FnOnce() -> S,
    {
        self.with_item_extraction(factory())
    }

    /// Assemble the handler
    pub fn build(&self) -> Result<CursorBasedPaginationHandler<T, I, C>> {
        let page_request_generator = require(
            &self.page_request_generator,
            Self::NAME,
            "cursor page request generator",
            "with_page_request_generation",
        )?;
        let page_transformer = require(
            &self.page_transformer,
            Self::NAME,
            "page transformer",
            "with_page_transformation",
        )?;
        let cursor_extractor = require(
            &self.cursor_extractor,
            Self::NAME,
            "cursor extractor",
            "with_cursor_extraction",
        )?;
        let item_extractor = require(
            &self.item_extractor,
            Self::NAME,
            "item extractor",
            "with_item_extraction",
        )?;
        let transport = self.base.require_transport(Self::NAME)?;

        Ok(CursorBasedPaginationHandler::new(
            transport,
            page_request_generator,
            page_transformer,
            cursor_extractor,
            item_extractor,
        ))
    }
}

// ============================================================================
// Sequential
// ============================================================================

/// Builder for [`SequentialPaginationHandler`]
pub struct SequentialPaginationHandlerBuilder<C, I> {
    page_retriever: Option<Arc<dyn PageRetriever<C>>>,
    next_page_checker: Option<Arc<dyn NextPageChecker<C>>>,
    item_extractor: Option<Arc<dyn ItemExtractor<C, I>>>,
}

impl<C, I> Default for SequentialPaginationHandlerBuilder<C, I> {
    fn default() -> Self {
        Self {
            page_retriever: None,
            next_page_checker: None,
            item_extractor: None,
        }
    }
}

impl<C, I> SequentialPaginationHandlerBuilder<C, I> {
    const NAME: &'static str = "SequentialPaginationHandlerBuilder";

    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strategy fetching each page from its predecessor
    #[must_use]
    pub fn with_page_retrieval(mut self, retriever: impl PageRetriever<C> + 'static) -> Self {
        self.page_retriever = Some(Arc::new(retriever));
        self
    }

    /// Set the page retriever built by `factory`
    #[must_use]
    pub fn with_page_retrieval_from<S, F>(self, factory: F) -> Self
    where
        S: PageRetriever<C> + 'static,
        F: FnOnce() -> S,
    {
        self.with_page_retrieval(factory())
    }

    /// Set the strategy deciding whether another page follows
    #[must_use]
    pub fn with_next_page_check(mut self, checker: impl NextPageChecker<C> + 'static) -> Self {
        self.next_page_checker = Some(Arc::new(checker));
        self
    }

    /// Set the next page checker built by `factory`
    #[must_use]
    pub fn with_next_page_check_from<S, F>(self, factory: F) -> Self
    where
        S: NextPageChecker<C> + 'static,
        F: FnOnce() -> S,
    {
        self.with_next_page_check(factory())
    }

    /// Set the strategy listing the items of each page
    #[must_use]
    pub fn with_item_extraction(mut self, extractor: impl ItemExtractor<C, I> + 'static) -> Self {
        self.item_extractor = Some(Arc::new(extractor));
        self
    }

    /// Set the item extractor built by `factory`
    #[must_use]
    pub fn with_item_extraction_from<S, F>(self, factory: F) -> Self
    where
        S: ItemExtractor<C, I> + 'static,
        F: FnOnce() -> S,
    {
        self.with_item_extraction(factory())
    }

    /// Assemble the handler
    pub fn build(&self) -> Result<SequentialPaginationHandler<C, I>> {
        let page_retriever = require(
            &self.page_retriever,
            Self::NAME,
            "page retriever",
            "with_page_retrieval",
        )?;
        let next_page_checker = require(
            &self.next_page_checker,
            Self::NAME,
            "next page checker",
            "with_next_page_check",
        )?;
        let item_extractor = require(
            &self.item_extractor,
            Self::NAME,
            "item extractor",
            "with_item_extraction",
        )?;

        Ok(SequentialPaginationHandler::new(
            page_retriever,
            next_page_checker,
            item_extractor,
        ))
    }
}
