//! Authentication module
//!
//! Supports: Bearer, API Key, OAuth2 Client Credentials
//!
//! The `Authenticator` attaches credentials to outgoing page requests and
//! keeps refreshed tokens in a `TokenStore`, optionally persisted to disk.

mod authenticator;
mod store;
mod types;

pub use authenticator::Authenticator;
pub use store::{FileTokenStore, InMemoryTokenStore, TokenStore};
pub use types::{AuthConfig, CachedToken};
