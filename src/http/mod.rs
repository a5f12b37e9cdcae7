//! HTTP transport module
//!
//! Provides the transport seam between the traversal engine and the network.
//!
//! # Features
//!
//! - **Transport trait**: the only network-facing interface the engine uses
//! - **Page requests**: plain values built by request generators
//! - **Raw pages**: buffered responses handed to extractors
//! - **Authentication**: integration with the auth module

mod client;
mod request;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use request::{PageRequest, RawPage, Transport};
