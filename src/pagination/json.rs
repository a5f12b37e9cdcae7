//! JSON strategies
//!
//! Ready-made strategies for APIs that answer with JSON bodies. Paths use
//! simple dot notation (`data.items`, `$.paging.next`, `results[0]`);
//! record paths containing `*` are evaluated with jsonpath-rust.

use super::engine::ItemStream;
use super::strategies::{
    CursorExtractor, CursorPageRequestGenerator, IndexDataExtractor, ItemExtractor,
    PageRequestGenerator, PageTransformer, PaginationInformationExtractor,
};
use crate::error::{Error, Result, ResultExt};
use crate::http::{PageRequest, RawPage};
use crate::types::{IndexData, OffsetInformation, TransformedPage};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use url::Url;

// ============================================================================
// Path Helpers
// ============================================================================

/// Resolve a dot-notation path, with optional `[index]` segments
pub fn extract_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index = part[bracket_pos + 1..].trim_end_matches(']');

            if !name.is_empty() {
                current = current.get(name)?;
            }
            current = current.get(index.parse::<usize>().ok()?)?;
        } else {
            current = current.get(part)?;
        }
    }

    Some(current)
}

/// Read a non-negative integer, accepting numeric strings
fn extract_u64(value: &Value, path: &str) -> Result<u64> {
    let field = extract_path(value, path)
        .ok_or_else(|| Error::decode(format!("Missing '{path}' in page")))?;

    let number = match field {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    };

    number.ok_or_else(|| {
        Error::decode(format!(
            "Expected a non-negative integer at '{path}', got {field}"
        ))
    })
}

/// Read a page counter, accepting numeric strings
///
/// Negative counters are invalid pagination information, like zero ones.
fn extract_counter(value: &Value, path: &str, field: &'static str) -> Result<u32> {
    let raw = extract_path(value, path)
        .ok_or_else(|| Error::decode(format!("Missing '{path}' in page")))?;

    let number = match raw {
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(number), _) => Some(i128::from(number)),
            (None, Some(number)) => Some(i128::from(number)),
            (None, None) => None,
        },
        Value::String(s) => s.trim().parse::<i128>().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::decode(format!("Expected an integer at '{path}', got {raw}")))?;

    if number < 0 {
        warn!(field, path, value = %number, "Extracted negative page counter");
        let value = i64::try_from(number).unwrap_or(i64::MIN);
        return Err(Error::invalid_pagination(field, value));
    }

    u32::try_from(number)
        .map_err(|_| Error::decode(format!("Value {number} at '{path}' is too large")))
}

/// Extract records using jsonpath-rust
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath: {e}")))?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}

fn resolve_url(base_url: &Url, path: Option<&str>) -> Result<Url> {
    match path {
        Some(path) => Ok(base_url.join(path)?),
        None => Ok(base_url.clone()),
    }
}

// ============================================================================
// Request Generators
// ============================================================================

/// Requests pages with a page-number query parameter (`?page=3`)
#[derive(Debug, Clone)]
pub struct QueryPageRequestGenerator {
    path: Option<String>,
    page_param: String,
    page_size: Option<(String, u32)>,
}

impl QueryPageRequestGenerator {
    /// Create a generator sending the page number as `page_param`
    pub fn new(page_param: impl Into<String>) -> Self {
        Self {
            path: None,
            page_param: page_param.into(),
            page_size: None,
        }
    }

    /// Resolve requests against this path instead of the base URL itself
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Also send a page size parameter
    #[must_use]
    pub fn with_page_size(mut self, param: impl Into<String>, size: u32) -> Self {
        self.page_size = Some((param.into(), size));
        self
    }
}

#[async_trait]
impl PageRequestGenerator for QueryPageRequestGenerator {
    async fn generate(
        &self,
        base_url: &Url,
        page_number: u32,
        _cancel: &CancellationToken,
    ) -> Result<PageRequest> {
        let url = resolve_url(base_url, self.path.as_deref())?;
        let mut request = PageRequest::get(url).query(&self.page_param, page_number.to_string());
        if let Some((param, size)) = &self.page_size {
            request = request.query(param, size.to_string());
        }
        Ok(request)
    }
}

/// Requests pages with offset/limit query parameters (`?offset=40&limit=20`)
#[derive(Debug, Clone)]
pub struct OffsetLimitRequestGenerator {
    path: Option<String>,
    offset_param: String,
    limit_param: String,
    limit: u32,
}

impl OffsetLimitRequestGenerator {
    /// Create a generator; page `n` starts at offset `(n - 1) * limit`
    pub fn new(offset_param: impl Into<String>, limit_param: impl Into<String>, limit: u32) -> Self {
        Self {
            path: None,
            offset_param: offset_param.into(),
            limit_param: limit_param.into(),
            limit,
        }
    }

    /// Resolve requests against this path instead of the base URL itself
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Number of items requested per page
    pub fn limit(&self) -> u32 {
        self.limit
    }
}

#[async_trait]
impl PageRequestGenerator for OffsetLimitRequestGenerator {
    async fn generate(
        &self,
        base_url: &Url,
        page_number: u32,
        _cancel: &CancellationToken,
    ) -> Result<PageRequest> {
        let url = resolve_url(base_url, self.path.as_deref())?;
        let offset = u64::from(page_number.saturating_sub(1)) * u64::from(self.limit);
        Ok(PageRequest::get(url)
            .query(&self.offset_param, offset.to_string())
            .query(&self.limit_param, self.limit.to_string()))
    }
}

/// Requests pages with a cursor query parameter, omitted on the first page
#[derive(Debug, Clone)]
pub struct CursorQueryRequestGenerator {
    path: Option<String>,
    cursor_param: String,
    extra_query: Vec<(String, String)>,
}

impl CursorQueryRequestGenerator {
    /// Create a generator sending the cursor as `cursor_param`
    pub fn new(cursor_param: impl Into<String>) -> Self {
        Self {
            path: None,
            cursor_param: cursor_param.into(),
            extra_query: Vec::new(),
        }
    }

    /// Resolve requests against this path instead of the base URL itself
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Send a fixed query parameter with every request (e.g. a page size)
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_query.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
impl CursorPageRequestGenerator<String> for CursorQueryRequestGenerator {
    async fn generate(
        &self,
        base_url: &Url,
        cursor: Option<&String>,
        _cancel: &CancellationToken,
    ) -> Result<PageRequest> {
        let url = resolve_url(base_url, self.path.as_deref())?;
        let mut request = PageRequest::get(url);
        for (key, value) in &self.extra_query {
            request = request.query(key, value);
        }
        if let Some(cursor) = cursor {
            request = request.query(&self.cursor_param, cursor);
        }
        Ok(request)
    }
}

// ============================================================================
// Page Parsing
// ============================================================================

/// Parses page bodies as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPageTransformer;

#[async_trait]
impl PageTransformer<Value> for JsonPageTransformer {
    async fn transform(&self, page: RawPage, _cancel: &CancellationToken) -> Result<Value> {
        page.json::<Value>()
            .with_context(|| format!("Page from {} is not valid JSON", page.url))
    }
}

/// Reads current page / total pages from JSON bodies
#[derive(Debug, Clone)]
pub struct JsonPaginationInformation {
    current_page_path: String,
    total_pages_path: String,
}

impl JsonPaginationInformation {
    /// Create an extractor reading the two counters from the given paths
    pub fn new(current_page_path: impl Into<String>, total_pages_path: impl Into<String>) -> Self {
        Self {
            current_page_path: current_page_path.into(),
            total_pages_path: total_pages_path.into(),
        }
    }
}

#[async_trait]
impl PaginationInformationExtractor<Value> for JsonPaginationInformation {
    async fn extract(
        &self,
        page: RawPage,
        _cancel: &CancellationToken,
    ) -> Result<TransformedPage<Value, OffsetInformation>> {
        let body: Value = page.json()?;
        let information = OffsetInformation::new(
            extract_counter(&body, &self.current_page_path, "current_page")?,
            extract_counter(&body, &self.total_pages_path, "total_pages")?,
        );
        Ok(TransformedPage::new(body, information))
    }
}

/// Reads offset/total coordinates from JSON bodies
#[derive(Debug, Clone)]
pub struct JsonIndexData {
    offset_path: String,
    total_path: String,
}

impl JsonIndexData {
    /// Create an extractor reading offset and total from the given paths
    pub fn new(offset_path: impl Into<String>, total_path: impl Into<String>) -> Self {
        Self {
            offset_path: offset_path.into(),
            total_path: total_path.into(),
        }
    }
}

#[async_trait]
impl IndexDataExtractor<Value, u64> for JsonIndexData {
    async fn extract_index_data(
        &self,
        page: &Value,
        _cancel: &CancellationToken,
    ) -> Result<IndexData<u64>> {
        Ok(IndexData::new(
            extract_u64(page, &self.offset_path)?,
            extract_u64(page, &self.total_path)?,
        ))
    }
}

/// Reads the next cursor from JSON bodies
///
/// A missing field, `null`, or an empty string all mean "no next page".
#[derive(Debug, Clone)]
pub struct JsonCursorExtractor {
    path: String,
}

impl JsonCursorExtractor {
    /// Create an extractor reading the cursor from `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CursorExtractor<Value, String> for JsonCursorExtractor {
    async fn extract_cursor(
        &self,
        page: &Value,
        _cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        let cursor = match extract_path(page, &self.path) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Null | Value::String(_)) | None => None,
            Some(other) => {
                return Err(Error::decode(format!(
                    "Expected a cursor at '{}', got {other}",
                    self.path
                )))
            }
        };
        Ok(cursor)
    }
}

// ============================================================================
// Item Extraction
// ============================================================================

/// Yields the records of a JSON page
///
/// Without a path the body itself is the record list. An array yields each
/// element, a missing or `null` field yields nothing, anything else yields
/// one record.
#[derive(Debug, Clone, Default)]
pub struct JsonItemExtractor {
    records_path: Option<String>,
}

impl JsonItemExtractor {
    /// Treat the whole body as the record list
    pub fn new() -> Self {
        Self::default()
    }

    /// Read records from `path`
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            records_path: Some(path.into()),
        }
    }
}

fn records_at<'v>(page: &'v Value, path: Option<&str>) -> Option<&'v Value> {
    match path {
        Some(path) => extract_path(page, path),
        None => Some(page),
    }
}

impl ItemExtractor<Value, Value> for JsonItemExtractor {
    fn extract_items<'a>(
        &'a self,
        page: Arc<Value>,
        _cancel: &CancellationToken,
    ) -> ItemStream<'a, Value> {
        let path = self.records_path.as_deref();

        if let Some(path) = path.filter(|p| p.contains('*')) {
            match extract_with_jsonpath(&page, path) {
                Ok(records) => return Box::pin(stream::iter(records.into_iter().map(Ok::<_, Error>))),
                Err(e) => return Box::pin(stream::once(async move { Err::<Value, _>(e) })),
            }
        }

        let count = match records_at(&page, path) {
            Some(Value::Array(records)) => records.len(),
            Some(Value::Null) | None => 0,
            Some(_) => 1,
        };

        // Records are cloned out of the shared page one at a time
        Box::pin(stream::iter(0..count).map(move |index| {
            let record = match records_at(&page, path) {
                Some(Value::Array(records)) => records[index].clone(),
                Some(record) => record.clone(),
                None => Value::Null,
            };
            Ok::<_, Error>(record)
        }))
    }
}
