//! Pagination module
//!
//! Supports: Offset/Page Number, Cursor, Generic Sequential
//!
//! # Overview
//!
//! The traversal engine drives "fetch page → extract context → yield items →
//! decide whether to continue" as a lazy, cancellable stream. Each flavor
//! fills the engine's hooks from small strategy objects, assembled with a
//! fluent builder:
//!
//! ```rust,ignore
//! use pagewalk::pagination::json::{JsonItemExtractor, JsonPaginationInformation, QueryPageRequestGenerator};
//! use pagewalk::pagination::{OffsetBasedPaginationHandlerBuilder, PaginationHandler};
//!
//! let handler = OffsetBasedPaginationHandlerBuilder::new()
//!     .with_transport(HttpClient::new("https://api.example.com/items")?)
//!     .with_page_request_generation(QueryPageRequestGenerator::new("page"))
//!     .with_pagination_information_extraction(JsonPaginationInformation::new("page", "total_pages"))
//!     .with_item_extraction(JsonItemExtractor::with_path("data"))
//!     .build()?;
//!
//! let mut items = handler.get_all_items(CancellationToken::new());
//! while let Some(item) = items.next().await {
//!     println!("{}", item?);
//! }
//! ```

mod builder;
mod cursor;
mod engine;
pub mod json;
mod offset;
mod sequential;
mod strategies;

pub use builder::{
    CursorBasedPaginationHandlerBuilder, HandlerBuilderBase, OffsetBasedPaginationHandlerBuilder,
    SequentialPaginationHandlerBuilder,
};
pub use cursor::CursorBasedPaginationHandler;
pub use engine::{collect_all_items, ItemStream, PaginationHandler, PaginationHooks};
pub use offset::{
    offset_information, IndexDataPaginationInformationExtractor, OffsetBasedPaginationHandler,
};
pub use sequential::SequentialPaginationHandler;
pub use strategies::{
    CursorExtractor, CursorPageRequestGenerator, IndexDataExtractor, ItemExtractor,
    NextPageChecker, PageRequestGenerator, PageRetriever, PageTransformer,
    PaginationInformationExtractor,
};
