//! Auth0 Client
//!
//! Main client for the Auth0 Management API, combining the tenant base URL,
//! the access token and the HTTP layer.

use super::http::Auth0HttpClient;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Largest page size the Management API accepts
pub const MAX_PER_PAGE: u64 = 100;

/// Main Auth0 Management API client
#[derive(Clone)]
pub struct Auth0Client {
    pub http: Auth0HttpClient,
    pub domain: String,
    base_url: Url,
    token: String,
}

impl std::fmt::Debug for Auth0Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth0Client")
            .field("domain", &self.domain)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// One page of a list endpoint
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    /// Offset of the first item, as reported by the server
    pub start: u64,
    pub has_next: bool,
}

impl Auth0Client {
    /// Create a new client for a tenant domain
    ///
    /// A domain carrying an explicit `http://` or `https://` scheme is used as
    /// the API origin verbatim, anything else is treated as a bare hostname.
    pub fn new(domain: &str, token: &str) -> Result<Self> {
        let base_url = management_base_url(domain)?;
        let http = Auth0HttpClient::new()?;

        Ok(Self {
            http,
            domain: domain.to_string(),
            base_url,
            token: token.to_string(),
        })
    }

    /// Build a Management API URL for a path relative to `/api/v2/`
    pub fn management_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("Invalid Management API path: {}", path))
    }

    /// Make a GET request to the Management API
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let mut url = self.management_url(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        self.http.get(&url, &self.token).await
    }

    /// Fetch one page of a list endpoint
    ///
    /// `collection` is the key holding the items when totals are included,
    /// e.g. `clients` for `/clients`.
    pub async fn list_page<T: DeserializeOwned>(
        &self,
        path: &str,
        collection: &str,
        query: &[(&str, String)],
        page: u64,
    ) -> Result<PaginatedResult<T>> {
        let mut params: Vec<(&str, String)> = query.to_vec();
        params.push(("page", page.to_string()));
        params.push(("per_page", MAX_PER_PAGE.to_string()));
        params.push(("include_totals", "true".to_string()));

        let response = self.get(path, &params).await?;
        parse_page(response, collection)
            .with_context(|| format!("Failed to decode page {} of {}", page, path))
    }

    /// Fetch every item of a list endpoint (auto-paginate)
    pub async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        collection: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut all_items = Vec::new();
        let mut page = 0;
        let mut previous_start: Option<u64> = None;

        loop {
            let result = self.list_page(path, collection, query, page).await?;

            // A server that ignores `page` keeps answering with the same offset
            if previous_start.is_some_and(|prev| result.start <= prev) {
                tracing::warn!(
                    "{} pagination stuck at offset {}, stopping after page {}",
                    path,
                    result.start,
                    page
                );
                break;
            }
            previous_start = Some(result.start);
            all_items.extend(result.items);

            if !result.has_next {
                break;
            }
            page += 1;
        }

        tracing::debug!("Listed {} {} across {} page(s)", all_items.len(), collection, page + 1);
        Ok(all_items)
    }
}

/// Resolve the `/api/v2/` base URL for a tenant domain
pub fn management_base_url(domain: &str) -> Result<Url> {
    let domain = domain.trim().trim_end_matches('/');
    let origin = if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    };

    Url::parse(&format!("{}/api/v2/", origin))
        .with_context(|| format!("Invalid tenant domain: {}", domain))
}

/// Split a list response into items and the next-page flag
///
/// With `include_totals=true` the API answers `{start, limit, total, <collection>: [...]}`;
/// a bare array is accepted as a single complete page.
fn parse_page<T: DeserializeOwned>(response: Value, collection: &str) -> Result<PaginatedResult<T>> {
    let (raw_items, start, has_next) = match response {
        Value::Array(items) => (items, 0, false),
        Value::Object(mut map) => {
            let items = match map.remove(collection) {
                Some(Value::Array(items)) => items,
                Some(_) => return Err(anyhow::anyhow!("`{}` is not an array", collection)),
                None => Vec::new(),
            };
            let field = |key: &str| map.get(key).and_then(|v| v.as_u64()).unwrap_or(0);
            let (start, limit, total) = (field("start"), field("limit"), field("total"));
            let has_next = !items.is_empty()
                && start.checked_add(limit).is_some_and(|end| end < total);
            (items, start, has_next)
        }
        _ => return Err(anyhow::anyhow!("Unexpected list response shape")),
    };

    let items = serde_json::from_value(Value::Array(raw_items))?;
    Ok(PaginatedResult {
        items,
        start,
        has_next,
    })
}
