// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pagewalk
//!
//! Lazy, cancellable traversal of paginated HTTP APIs.
//!
//! A traversal fetches one page at a time, yields its items in order and
//! decides from each page whether another one follows. Consumers see a single
//! asynchronous stream of items and never handle pages themselves.
//!
//! ## Features
//!
//! - **Offset pagination**: page numbers or offset/limit, with page counters
//!   read from each response
//! - **Cursor pagination**: opaque continuation tokens
//! - **Sequential pagination**: the page itself decides what comes next
//! - **Fluent builders**: one small strategy per step, checked at build time
//! - **Cooperative cancellation**: via `tokio_util::sync::CancellationToken`
//! - **Auth**: bearer, API key and cached OAuth2 client credentials
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewalk::config::SourceConfig;
//! use pagewalk::pagination::collect_all_items;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> pagewalk::Result<()> {
//!     let source = SourceConfig::from_file("sources/albums.yaml")?;
//!     let handler = source.build_handler()?;
//!
//!     let albums = collect_all_items(handler.as_ref(), CancellationToken::new()).await?;
//!     println!("{} albums", albums.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │            PaginationHandler::get_all_items(cancel)          │
//! │                 → Stream<Item = Result<Item>>                │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                     Traversal engine (hooks)
//!                               │
//! ┌───────────────┬─────────────┴─────┬──────────────────────────┐
//! │    Offset     │      Cursor       │        Sequential        │
//! ├───────────────┼───────────────────┼──────────────────────────┤
//! │ Page requests │ Cursor requests   │ Page retriever           │
//! │ Page counters │ Page transformer  │ Next page checker        │
//! │ Items         │ Cursor, Items     │ Items                    │
//! └───────┬───────┴─────────┬─────────┴──────────────────────────┘
//!         └──── Transport (HttpClient + Authenticator) ────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: document strategy struct fields and error variants

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for pagewalk
pub mod error;

/// Pagination data model
pub mod types;

/// Authentication and token caching
pub mod auth;

/// HTTP transport
pub mod http;

/// Traversal engine, flavors, strategies and builders
pub mod pagination;

/// YAML source definitions
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use pagination::{collect_all_items, ItemStream, PaginationHandler};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
