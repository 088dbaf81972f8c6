//! Table store client for the hosted PostgREST API
//!
//! Reads whole tables page by page. Each request carries the project API key
//! both as `apikey` and as a bearer token.
//!
//! The server may return fewer rows than asked for (PostgREST caps responses
//! at its `max-rows`), so a short page never ends the read. Only an empty page
//! does.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use shared::PageRequest;

use crate::config::StoreConfig;
use crate::error::{AppError, AppResult};

/// Store API client
#[derive(Clone)]
pub struct StoreClient {
    client: Client,
    api_key: String,
    base_url: String,
    page_size: usize,
    order_by: Option<String>,
}

impl StoreClient {
    /// Create a new StoreClient from configuration
    pub fn new(config: &StoreConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.url.trim_end_matches('/').to_string(),
            page_size: config.page_size.max(1),
            order_by: Some(config.order_by.trim())
                .filter(|column| !column.is_empty())
                .map(str::to_string),
        })
    }

    /// Create a new StoreClient with custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size: PageRequest::default().limit,
            order_by: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sort pages by this column so offsets stay stable between requests
    pub fn with_order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    /// URL for one page of a table
    pub fn page_url(&self, table: &str, page: PageRequest) -> String {
        let mut url = format!(
            "{}/rest/v1/{}?select=*&limit={}&offset={}",
            self.base_url, table, page.limit, page.offset
        );
        if let Some(column) = &self.order_by {
            url.push_str(&format!("&order={}.asc", column));
        }
        url
    }

    /// Fetch every row of a table
    pub async fn fetch_table(&self, table: &str) -> AppResult<Vec<Value>> {
        let rows = read_all_pages(PageRequest::first(self.page_size), |page| {
            self.fetch_page(table, page)
        })
        .await?;

        tracing::debug!(table, rows = rows.len(), "table fetched");
        Ok(rows)
    }

    async fn fetch_page(&self, table: &str, page: PageRequest) -> AppResult<Vec<Value>> {
        let url = self.page_url(table, page);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    AppError::StoreUnavailable(format!("{}: {}", table, e))
                } else {
                    AppError::Store(format!("request for {} failed: {}", table, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                    AppError::StoreUnavailable(format!("{}: {}", table, status))
                }
                _ => AppError::Store(format!("{} returned {} - {}", table, status, body)),
            });
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| AppError::Store(format!("Failed to parse {} rows: {}", table, e)))?;

        match data {
            Value::Array(rows) => Ok(rows),
            other => Err(AppError::Store(format!(
                "{} did not return a row array: {}",
                table, other
            ))),
        }
    }
}

/// Request pages until one comes back empty, advancing by the rows actually
/// returned
async fn read_all_pages<F, Fut>(first: PageRequest, mut fetch: F) -> AppResult<Vec<Value>>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = AppResult<Vec<Value>>>,
{
    let mut rows = Vec::new();
    let mut page = first;

    loop {
        let batch = fetch(page).await?;
        if batch.is_empty() {
            break;
        }
        page = page.advance(batch.len());
        rows.extend(batch);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Serves `total` rows, never more than `max_rows` per response
    fn capped_table(
        total: usize,
        max_rows: usize,
        requests: &mut Vec<PageRequest>,
        page: PageRequest,
    ) -> AppResult<Vec<Value>> {
        requests.push(page);
        let end = total.min(page.offset + page.limit.min(max_rows));
        Ok((page.offset..end).map(|i| json!({ "row": i })).collect())
    }

    #[tokio::test]
    async fn test_server_row_cap_does_not_truncate() {
        let mut requests = Vec::new();
        let rows = read_all_pages(PageRequest::first(5000), |page| {
            std::future::ready(capped_table(2500, 1000, &mut requests, page))
        })
        .await
        .unwrap();

        assert_eq!(rows.len(), 2500);
        assert_eq!(rows[1000], json!({ "row": 1000 }));
        assert_eq!(rows[2499], json!({ "row": 2499 }));
        let offsets: Vec<usize> = requests.iter().map(|p| p.offset).collect();
        assert_eq!(offsets, vec![0, 1000, 2000, 2500]);
    }

    #[tokio::test]
    async fn test_empty_table_takes_one_request() {
        let mut requests = Vec::new();
        let rows = read_all_pages(PageRequest::first(1000), |page| {
            std::future::ready(capped_table(0, 1000, &mut requests, page))
        })
        .await
        .unwrap();

        assert!(rows.is_empty());
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn test_page_error_is_returned() {
        let result = read_all_pages(PageRequest::first(10), |_| {
            std::future::ready(Err(AppError::StoreUnavailable("sales: 503".to_string())))
        })
        .await;
        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    }

    #[test]
    fn test_page_url() {
        let client = StoreClient::with_base_url(
            "anon".to_string(),
            "https://example.supabase.co/".to_string(),
        )
        .with_page_size(500);
        let page = PageRequest::first(500).next();
        assert_eq!(
            client.page_url("purchase_data", page),
            "https://example.supabase.co/rest/v1/purchase_data?select=*&limit=500&offset=500"
        );

        let ordered = client.with_order_by("id");
        assert_eq!(
            ordered.page_url("sales", PageRequest::first(500)),
            "https://example.supabase.co/rest/v1/sales?select=*&limit=500&offset=0&order=id.asc"
        );
    }

    #[test]
    fn test_new_from_config() {
        let config = StoreConfig {
            url: "https://example.supabase.co".to_string(),
            api_key: "anon".to_string(),
            page_size: 0,
            timeout_secs: 5,
            order_by: "id".to_string(),
        };
        let client = StoreClient::new(&config).unwrap();
        assert_eq!(client.page_size, 1);
        assert_eq!(client.order_by.as_deref(), Some("id"));

        let unordered = StoreClient::new(&StoreConfig {
            order_by: " ".to_string(),
            ..config
        })
        .unwrap();
        assert_eq!(unordered.order_by, None);
    }
}
