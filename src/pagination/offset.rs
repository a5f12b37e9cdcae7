//! Offset / page-number pagination
//!
//! Pages are addressed by a 1-indexed page number. The first request asks for
//! page 1, every following request for `current_page + 1`, until the current
//! page reaches the reported total.

use super::engine::{ItemStream, PaginationHooks};
use super::strategies::{
    IndexDataExtractor, ItemExtractor, PageRequestGenerator, PageTransformer,
    PaginationInformationExtractor,
};
use crate::error::{Error, Result};
use crate::http::{RawPage, Transport};
use crate::types::{IndexData, OffsetInformation, PaginationContext, TransformedPage};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Pagination handler for offset/page-number based resources
pub struct OffsetBasedPaginationHandler<T, I> {
    transport: Arc<dyn Transport>,
    page_request_generator: Arc<dyn PageRequestGenerator>,
    pagination_information_extractor: Arc<dyn PaginationInformationExtractor<T>>,
    item_extractor: Arc<dyn ItemExtractor<T, I>>,
}

impl<T, I> OffsetBasedPaginationHandler<T, I> {
    /// Create a handler from its strategies
    pub fn new(
        transport: Arc<dyn Transport>,
        page_request_generator: Arc<dyn PageRequestGenerator>,
        pagination_information_extractor: Arc<dyn PaginationInformationExtractor<T>>,
        item_extractor: Arc<dyn ItemExtractor<T, I>>,
    ) -> Self {
        Self {
            transport,
            page_request_generator,
            pagination_information_extractor,
            item_extractor,
        }
    }
}

/// Reject coordinates that would stall or misdrive the traversal
fn validate(information: &OffsetInformation) -> Result<()> {
    if information.current_page == 0 {
        warn!("Extracted current_page is 0");
        return Err(Error::invalid_pagination(
            "current_page",
            information.current_page,
        ));
    }
    if information.total_pages == 0 {
        warn!("Extracted total_pages is 0");
        return Err(Error::invalid_pagination(
            "total_pages",
            information.total_pages,
        ));
    }
    Ok(())
}

#[async_trait]
impl<T, I> PaginationHooks for OffsetBasedPaginationHandler<T, I>
where
    T: Send + Sync + 'static,
    I: Send + 'static,
{
    type Page = RawPage;
    type Transformed = TransformedPage<T, OffsetInformation>;
    type Item = I;

    async fn get_page(
        &self,
        last_page: Option<&Self::Transformed>,
        cancel: &CancellationToken,
    ) -> Result<RawPage> {
        let page_number = last_page.map_or(1, |page| {
            page.pagination_information.current_page.saturating_add(1)
        });

        let request = self
            .page_request_generator
            .generate(self.transport.base_url(), page_number, cancel)
            .await?;

        self.transport.send(request, cancel).await
    }

    async fn extract_context(
        &self,
        page: RawPage,
        cancel: &CancellationToken,
    ) -> Result<PaginationContext<Self::Transformed>> {
        let page = self
            .pagination_information_extractor
            .extract(page, cancel)
            .await?;

        validate(&page.pagination_information)?;

        let next_page_exists = page.pagination_information.has_next_page();
        Ok(PaginationContext::new(page, next_page_exists))
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

// ============================================================================
// Index Data Adapter
// ============================================================================

/// Derives page coordinates from offset/total bodies
///
/// For APIs that report `{ offset, total }` instead of page numbers. With a
/// page size `limit`, `current_page = offset / limit + 1` and
/// `total_pages = max(1, ceil(total / limit))`; an empty resource still has
/// one (empty) page.
pub struct IndexDataPaginationInformationExtractor<T, N> {
    page_transformer: Arc<dyn PageTransformer<T>>,
    index_data_extractor: Arc<dyn IndexDataExtractor<T, N>>,
    page_size: u32,
}

impl<T, N> IndexDataPaginationInformationExtractor<T, N> {
    /// Create the adapter; `page_size` must match the limit sent with each request
    pub fn new(
        page_transformer: impl PageTransformer<T> + 'static,
        index_data_extractor: impl IndexDataExtractor<T, N> + 'static,
        page_size: u32,
    ) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::config("page_size must be greater than 0"));
        }

        Ok(Self {
            page_transformer: Arc::new(page_transformer),
            index_data_extractor: Arc::new(index_data_extractor),
            page_size,
        })
    }
}

/// Convert offset/total coordinates to page coordinates
pub fn offset_information<N: Into<u64>>(
    index: IndexData<N>,
    page_size: u32,
) -> Result<OffsetInformation> {
    let limit = u64::from(page_size.max(1));
    let offset: u64 = index.offset.into();
    let total: u64 = index.total.into();

    let current_page = offset / limit + 1;
    let total_pages = total.div_ceil(limit).max(1);

    let to_u32 = |field: &str, value: u64| {
        u32::try_from(value)
            .map_err(|_| Error::decode(format!("{field} {value} does not fit a page number")))
    };

    Ok(OffsetInformation::new(
        to_u32("current_page", current_page)?,
        to_u32("total_pages", total_pages)?,
    ))
}

#[async_trait]
impl<T, N> PaginationInformationExtractor<T> for IndexDataPaginationInformationExtractor<T, N>
where
    T: Send + Sync + 'static,
    N: Into<u64> + Send + 'static,
{
    async fn extract(
        &self,
        page: RawPage,
        cancel: &CancellationToken,
    ) -> Result<TransformedPage<T, OffsetInformation>> {
        let transformed = self.page_transformer.transform(page, cancel).await?;
        let index = self
            .index_data_extractor
            .extract_index_data(&transformed, cancel)
            .await?;

        let information = offset_information(index, self.page_size)?;
        Ok(TransformedPage::new(transformed, information))
    }
}
