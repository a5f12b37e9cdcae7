//! Source definitions
//!
//! A source describes one paginated JSON resource in YAML: where it lives,
//! how to authenticate, where the records sit in each page and which
//! pagination flavor walks it.
//!
//! ```yaml
//! base_url: "https://api.spotify.com/v1/"
//! path: "artists/0TnOYISbd1XYRBk9myaseg/albums"
//! records_path: "items"
//! auth:
//!   type: oauth2_client_credentials
//!   token_url: "https://accounts.spotify.com/api/token"
//!   client_id: "..."
//!   client_secret: "..."
//! token_cache: ".pagewalk/spotify-token.json"
//! pagination:
//!   type: offset_limit
//!   limit: 20
//! ```

use crate::auth::{AuthConfig, Authenticator, FileTokenStore};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::pagination::json::{
    CursorQueryRequestGenerator, JsonCursorExtractor, JsonIndexData, JsonItemExtractor,
    JsonPageTransformer, JsonPaginationInformation, OffsetLimitRequestGenerator,
    QueryPageRequestGenerator,
};
use crate::pagination::{
    CursorBasedPaginationHandlerBuilder, IndexDataPaginationInformationExtractor,
    OffsetBasedPaginationHandlerBuilder, PaginationHandler,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

// ============================================================================
// Top-Level Source Config
// ============================================================================

/// Complete source definition loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL for API requests
    pub base_url: String,

    /// Resource path, resolved against `base_url`
    #[serde(default)]
    pub path: Option<String>,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// File keeping fetched OAuth2 tokens between runs
    #[serde(default)]
    pub token_cache: Option<PathBuf>,

    /// Dot path (or JSONPath with wildcards) to the records of a page.
    /// The whole body is used when absent.
    #[serde(default)]
    pub records_path: Option<String>,

    /// How to walk from one page to the next
    pub pagination: PaginationConfig,
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: None,
            headers: BTreeMap::new(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

// ============================================================================
// Pagination Config
// ============================================================================

/// Pagination flavor and its parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaginationConfig {
    /// `?page=N`, with page coordinates read from each body
    PageNumber {
        #[serde(default = "default_page_param")]
        page_param: String,
        #[serde(default)]
        page_size_param: Option<String>,
        #[serde(default)]
        page_size: Option<u32>,
        current_page_path: String,
        total_pages_path: String,
    },

    /// `?offset=X&limit=Y`, with offset and total read from each body
    OffsetLimit {
        #[serde(default = "default_offset_param")]
        offset_param: String,
        #[serde(default = "default_limit_param")]
        limit_param: String,
        limit: u32,
        #[serde(default = "default_offset_param")]
        offset_path: String,
        #[serde(default = "default_total_path")]
        total_path: String,
    },

    /// Opaque continuation token read from each body
    Cursor {
        cursor_param: String,
        cursor_path: String,
        /// Extra query parameters sent with every page
        #[serde(default)]
        query: BTreeMap<String, String>,
    },
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_offset_param() -> String {
    "offset".to_string()
}

fn default_limit_param() -> String {
    "limit".to_string()
}

fn default_total_path() -> String {
    "total".to_string()
}

// ============================================================================
// Loading
// ============================================================================

impl SourceConfig {
    /// Load and validate a source definition from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read source file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a source definition from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the definition for values no traversal could work with
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::config("base_url cannot be empty"));
        }
        let base = Url::parse(&self.base_url)
            .map_err(|e| Error::config(format!("Invalid base_url '{}': {e}", self.base_url)))?;
        if let Some(path) = &self.path {
            base.join(path)
                .map_err(|e| Error::config(format!("Invalid path '{path}': {e}")))?;
        }

        if self.http.timeout_secs == 0 {
            return Err(Error::config("http.timeout_secs must be greater than 0"));
        }

        if matches!(self.records_path.as_deref(), Some("")) {
            return Err(Error::config("records_path cannot be empty"));
        }

        if self.token_cache.is_some()
            && !matches!(self.auth, AuthConfig::Oauth2ClientCredentials { .. })
        {
            return Err(Error::config(
                "token_cache requires oauth2_client_credentials auth",
            ));
        }

        self.pagination.validate()
    }

    /// Build the HTTP transport described by this source
    pub fn http_client(&self) -> Result<HttpClient> {
        let mut builder = HttpClientConfig::builder()
            .base_url(self.base_url.as_str())
            .timeout(Duration::from_secs(self.http.timeout_secs));
        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent.as_str());
        }
        for (name, value) in &self.http.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut client = HttpClient::with_config(builder.build())?;

        if self.auth != AuthConfig::None {
            let mut authenticator =
                Authenticator::with_client(self.auth.clone(), client.inner().clone());
            if let Some(path) = &self.token_cache {
                authenticator = authenticator.with_token_store(Arc::new(FileTokenStore::new(path)));
            }
            client.set_authenticator(authenticator);
        }

        Ok(client)
    }

    /// Assemble a pagination handler yielding the records of this source
    pub fn build_handler(&self) -> Result<Box<dyn PaginationHandler<Value>>> {
        self.validate()?;
        let client = self.http_client()?;
        let items = match &self.records_path {
            Some(path) => JsonItemExtractor::with_path(path.as_str()),
            None => JsonItemExtractor::new(),
        };

        debug!(base_url = %self.base_url, path = ?self.path, "Building source handler");

        match &self.pagination {
            PaginationConfig::PageNumber {
                page_param,
                page_size_param,
                page_size,
                current_page_path,
                total_pages_path,
            } => {
                let mut generator = QueryPageRequestGenerator::new(page_param.as_str());
                if let Some(path) = &self.path {
                    generator = generator.with_path(path.as_str());
                }
                if let (Some(param), Some(size)) = (page_size_param, page_size) {
                    generator = generator.with_page_size(param.as_str(), *size);
                }

                let handler = OffsetBasedPaginationHandlerBuilder::new()
                    .with_transport(client)
                    .with_page_request_generation(generator)
                    .with_pagination_information_extraction(JsonPaginationInformation::new(
                        current_page_path.as_str(),
                        total_pages_path.as_str(),
                    ))
                    .with_item_extraction(items)
                    .build()?;
                Ok(Box::new(handler))
            }

            PaginationConfig::OffsetLimit {
                offset_param,
                limit_param,
                limit,
                offset_path,
                total_path,
            } => {
                let mut generator = OffsetLimitRequestGenerator::new(
                    offset_param.as_str(),
                    limit_param.as_str(),
                    *limit,
                );
                if let Some(path) = &self.path {
                    generator = generator.with_path(path.as_str());
                }

                let information = IndexDataPaginationInformationExtractor::new(
                    JsonPageTransformer,
                    JsonIndexData::new(offset_path.as_str(), total_path.as_str()),
                    *limit,
                )?;

                let handler = OffsetBasedPaginationHandlerBuilder::new()
                    .with_transport(client)
                    .with_page_request_generation(generator)
                    .with_pagination_information_extraction(information)
                    .with_item_extraction(items)
                    .build()?;
                Ok(Box::new(handler))
            }

            PaginationConfig::Cursor {
                cursor_param,
                cursor_path,
                query,
            } => {
                let mut generator = CursorQueryRequestGenerator::new(cursor_param.as_str());
                if let Some(path) = &self.path {
                    generator = generator.with_path(path.as_str());
                }
                for (key, value) in query {
                    generator = generator.with_query(key.as_str(), value.as_str());
                }

                let handler = CursorBasedPaginationHandlerBuilder::new()
                    .with_transport(client)
                    .with_page_request_generation(generator)
                    .with_page_transformation(JsonPageTransformer)
                    .with_cursor_extraction(JsonCursorExtractor::new(cursor_path.as_str()))
                    .with_item_extraction(items)
                    .build()?;
                Ok(Box::new(handler))
            }
        }
    }
}

impl PaginationConfig {
    /// Flavor name as written in YAML
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PageNumber { .. } => "page_number",
            Self::OffsetLimit { .. } => "offset_limit",
            Self::Cursor { .. } => "cursor",
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::PageNumber {
                page_param,
                page_size_param,
                page_size,
                current_page_path,
                total_pages_path,
            } => {
                require_non_empty("page_param", page_param)?;
                require_non_empty("current_page_path", current_page_path)?;
                require_non_empty("total_pages_path", total_pages_path)?;
                match (page_size_param, page_size) {
                    (Some(_), None) | (None, Some(_)) => Err(Error::config(
                        "page_size_param and page_size must be set together",
                    )),
                    (_, Some(0)) => Err(Error::config("page_size must be greater than 0")),
                    _ => Ok(()),
                }
            }
            Self::OffsetLimit {
                offset_param,
                limit_param,
                limit,
                offset_path,
                total_path,
            } => {
                require_non_empty("offset_param", offset_param)?;
                require_non_empty("limit_param", limit_param)?;
                require_non_empty("offset_path", offset_path)?;
                require_non_empty("total_path", total_path)?;
                if *limit == 0 {
                    return Err(Error::config("limit must be greater than 0"));
                }
                Ok(())
            }
            Self::Cursor {
                cursor_param,
                cursor_path,
                ..
            } => {
                require_non_empty("cursor_param", cursor_param)?;
                require_non_empty("cursor_path", cursor_path)
            }
        }
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::config(format!("pagination.{field} cannot be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_parse_minimal_source() {
        let yaml = r#"
base_url: "https://api.example.com/items"
pagination:
  type: page_number
  current_page_path: "meta.page"
  total_pages_path: "meta.pages"
"#;

        let config = SourceConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.base_url, "https://api.example.com/items");
        assert_eq!(config.http, HttpConfig::default());
        assert_eq!(config.auth, AuthConfig::None);
        assert!(config.records_path.is_none());
        assert_eq!(
            config.pagination,
            PaginationConfig::PageNumber {
                page_param: "page".to_string(),
                page_size_param: None,
                page_size: None,
                current_page_path: "meta.page".to_string(),
                total_pages_path: "meta.pages".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_offset_limit_defaults() {
        let yaml = r#"
base_url: "https://api.spotify.com/v1/"
path: "artists/123/albums"
records_path: "items"
auth:
  type: oauth2_client_credentials
  token_url: "https://accounts.spotify.com/api/token"
  client_id: "id"
  client_secret: "secret"
token_cache: "/tmp/token.json"
pagination:
  type: offset_limit
  limit: 20
"#;

        let config = SourceConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.pagination.kind(), "offset_limit");
        match &config.pagination {
            PaginationConfig::OffsetLimit {
                offset_param,
                limit_param,
                limit,
                offset_path,
                total_path,
            } => {
                assert_eq!(offset_param, "offset");
                assert_eq!(limit_param, "limit");
                assert_eq!(*limit, 20);
                assert_eq!(offset_path, "offset");
                assert_eq!(total_path, "total");
            }
            other => panic!("Expected OffsetLimit pagination, got {other:?}"),
        }
        assert_eq!(config.token_cache, Some(PathBuf::from("/tmp/token.json")));
    }

    #[test]
    fn test_parse_cursor_with_query_and_headers() {
        let yaml = r#"
base_url: "https://api.twitch.tv/helix/"
path: "games/top"
records_path: "data"
http:
  timeout_secs: 5
  user_agent: "games-client"
  headers:
    Client-Id: "abc"
auth:
  type: bearer
  token: "t0ken"
pagination:
  type: cursor
  cursor_param: "after"
  cursor_path: "pagination.cursor"
  query:
    first: "100"
"#;

        let config = SourceConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.user_agent.as_deref(), Some("games-client"));
        assert_eq!(config.http.headers.get("Client-Id").map(String::as_str), Some("abc"));
        assert_eq!(
            config.auth,
            AuthConfig::Bearer {
                token: "t0ken".to_string()
            }
        );
        match config.pagination {
            PaginationConfig::Cursor { query, .. } => {
                assert_eq!(query.get("first").map(String::as_str), Some("100"));
            }
            other => panic!("Expected Cursor pagination, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_pagination_type_is_rejected() {
        let yaml = r#"
base_url: "https://api.example.com"
pagination:
  type: link_header
"#;

        let err = SourceConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test_case("base_url: \"\"\npagination: {type: cursor, cursor_param: a, cursor_path: b}", "base_url cannot be empty"; "empty base url")]
    #[test_case("base_url: \"not a url\"\npagination: {type: cursor, cursor_param: a, cursor_path: b}", "Invalid base_url"; "invalid base url")]
    #[test_case("base_url: \"https://x.io\"\nhttp: {timeout_secs: 0}\npagination: {type: cursor, cursor_param: a, cursor_path: b}", "timeout_secs"; "zero timeout")]
    #[test_case("base_url: \"https://x.io\"\npagination: {type: offset_limit, limit: 0}", "limit must be greater than 0"; "zero limit")]
    #[test_case("base_url: \"https://x.io\"\npagination: {type: cursor, cursor_param: \"\", cursor_path: b}", "pagination.cursor_param"; "empty cursor param")]
    #[test_case("base_url: \"https://x.io\"\npagination: {type: page_number, page_size: 10, current_page_path: a, total_pages_path: b}", "set together"; "page size without param")]
    #[test_case("base_url: \"https://x.io\"\ntoken_cache: t.json\npagination: {type: cursor, cursor_param: a, cursor_path: b}", "token_cache"; "token cache without oauth2")]
    fn test_validation_errors(yaml: &str, expected: &str) {
        let err = SourceConfig::from_yaml(yaml).unwrap_err();
        assert!(err.is_configuration());
        assert!(
            err.to_string().contains(expected),
            "'{err}' should mention '{expected}'"
        );
    }

    #[test]
    fn test_from_file_missing() {
        let err = SourceConfig::from_file("/nonexistent/source.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read source file"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.yaml");
        fs::write(
            &path,
            "base_url: https://api.example.com\npagination: {type: cursor, cursor_param: after, cursor_path: next}\n",
        )
        .unwrap();

        let config = SourceConfig::from_file(&path).unwrap();
        assert_eq!(config.pagination.kind(), "cursor");
    }

    #[test]
    fn test_http_client_from_source() {
        let config = SourceConfig::from_yaml(
            "base_url: https://api.example.com/v1/\nhttp: {timeout_secs: 7, headers: {X-Test: one}}\npagination: {type: cursor, cursor_param: a, cursor_path: b}\n",
        )
        .unwrap();

        let client = config.http_client().unwrap();
        assert_eq!(client.config().timeout, Duration::from_secs(7));
        assert_eq!(
            client.config().default_headers.get("X-Test").map(String::as_str),
            Some("one")
        );
    }

    #[test]
    fn test_build_handler_for_each_flavor() {
        for pagination in [
            "{type: page_number, current_page_path: page, total_pages_path: pages}",
            "{type: offset_limit, limit: 50}",
            "{type: cursor, cursor_param: after, cursor_path: next}",
        ] {
            let yaml = format!("base_url: https://api.example.com\npagination: {pagination}\n");
            let config = SourceConfig::from_yaml(&yaml).unwrap();
            assert!(config.build_handler().is_ok(), "failed for {pagination}");
        }
    }
}
