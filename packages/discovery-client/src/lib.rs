//! Typed REST client for the product-discovery task runner.
//!
//! Covers the full backend contract: submitting a discovery search, polling
//! task status, reading committed products back from the store, historical
//! search records, per-product detail, deep-search follow-up tasks, and
//! category configuration.
//!
//! # Example
//!
//! ```rust,ignore
//! use discovery_client::{DiscoveryClient, SearchParams, SearchRequest, SearchSubmission};
//!
//! let client = DiscoveryClient::new("http://localhost:3000");
//!
//! let submission = client.start_search(&SearchRequest {
//!     prompt: "Find newly launched AI products...".into(),
//!     search_params: SearchParams {
//!         keywords: vec!["AI app".into()],
//!         start_date: "2025-06-01".into(),
//!         end_date: "2025-07-01".into(),
//!         categories: vec![],
//!     },
//! }).await?;
//!
//! if let SearchSubmission::Started { task_id, .. } = submission {
//!     let status = client.task_status(&task_id).await?;
//!     println!("{}", status.status);
//! }
//! ```

pub mod error;
pub mod parse;
pub mod types;

pub use error::{ClientError, Result};
pub use types::{
    Category, CategorySettings, DeepSearchStarted, DeepSearchStatus, Metrics, Post, Product,
    ProductDetail, ProductDetailResponse, SearchInfo, SearchParams, SearchRecord, SearchRequest,
    SearchResponse, SearchResult, SearchSubmission, TaskStatus, TaskStatusResponse, TaskStep,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::{
    MessageResponse, ProductsResponse, PromptResponse, RecordsResponse, ResetCategoriesResponse,
};

pub struct DiscoveryClient {
    client: reqwest::Client,
    base_url: String,
}

impl DiscoveryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(resp.json().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.client.get(self.url(path)).send().await?;
        Self::decode(resp).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        Self::decode(resp).await
    }

    /// Submit a discovery search. Returns immediately with either a task to
    /// poll or a redirect to already-stored results.
    pub async fn start_search(&self, request: &SearchRequest) -> Result<SearchSubmission> {
        tracing::info!(
            keywords = ?request.search_params.keywords,
            start_date = %request.search_params.start_date,
            end_date = %request.search_params.end_date,
            "Submitting discovery search"
        );

        let resp: SearchResponse = self.post_json("/api/search", request).await?;

        if let Some(error) = resp.error {
            return Err(ClientError::Backend(error));
        }
        if resp.redirect_to_results.unwrap_or(false) {
            return Ok(SearchSubmission::RedirectToResults {
                message: resp.message.unwrap_or_default(),
            });
        }
        match resp.task_id {
            Some(task_id) => Ok(SearchSubmission::Started {
                task_id,
                live_url: resp.live_url.filter(|u| !u.is_empty()),
            }),
            None => Err(ClientError::Backend(
                "search response carried neither task_id nor redirect".into(),
            )),
        }
    }

    /// Fetch the current status of a search task.
    ///
    /// Loosely shaped result envelopes are salvaged into the typed `result`
    /// field; see [`TaskStatusResponse::from_raw`].
    pub async fn task_status(&self, task_id: &str) -> Result<TaskStatusResponse> {
        let raw: serde_json::Value = self.get_json(&format!("/api/task/{task_id}/status")).await?;
        Ok(TaskStatusResponse::from_raw(raw)?)
    }

    /// Fetch products committed to the store for a task. May lag behind the
    /// task's `finished` flag while the backend flushes its write path.
    pub async fn task_products(&self, task_id: &str) -> Result<Vec<Product>> {
        let resp: ProductsResponse = self.get_json(&format!("/api/task/{task_id}/products")).await?;
        Ok(resp.products)
    }

    /// List historical search records, optionally filtered by status and
    /// keyword substring.
    pub async fn search_records(
        &self,
        status: Option<&str>,
        keyword: Option<&str>,
    ) -> Result<Vec<SearchRecord>> {
        let mut query = Vec::new();
        if let Some(status) = status {
            query.push(("status", status));
        }
        if let Some(keyword) = keyword {
            query.push(("keyword", keyword));
        }
        let resp = self
            .client
            .get(self.url("/api/search-records"))
            .query(&query)
            .send()
            .await?;
        let records: RecordsResponse = Self::decode(resp).await?;
        Ok(records.records)
    }

    /// Products belonging to a historical search record.
    pub async fn record_products(&self, record_id: i64) -> Result<Vec<Product>> {
        let resp: ProductsResponse = self
            .get_json(&format!("/api/search-records/{record_id}/products"))
            .await?;
        Ok(resp.products)
    }

    /// Delete a search record and its products. Returns the backend's
    /// confirmation message.
    pub async fn delete_record(&self, record_id: i64) -> Result<Option<String>> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/search-records/{record_id}")))
            .send()
            .await?;
        let msg: MessageResponse = Self::decode(resp).await?;
        Ok(msg.message)
    }

    /// Aggregated detail and related posts for one product.
    pub async fn product_detail(&self, product_id: i64) -> Result<ProductDetailResponse> {
        self.get_json(&format!("/api/products/{product_id}")).await
    }

    /// Kick off a deep search for a product's related posts.
    pub async fn start_deep_search(&self, product_id: i64) -> Result<DeepSearchStarted> {
        tracing::info!(product_id, "Starting deep search");
        let resp = self
            .client
            .post(self.url(&format!("/api/products/{product_id}/deep-search")))
            .send()
            .await?;
        Self::decode(resp).await
    }

    /// Poll a deep-search task.
    pub async fn deep_search_status(
        &self,
        task_id: &str,
        product_id: i64,
    ) -> Result<DeepSearchStatus> {
        let resp = self
            .client
            .get(self.url(&format!("/api/deep-search/{task_id}/status")))
            .query(&[("product_id", product_id)])
            .send()
            .await?;
        Self::decode(resp).await
    }

    /// Current category settings.
    pub async fn categories(&self) -> Result<CategorySettings> {
        self.get_json("/api/categories").await
    }

    /// Persist category settings.
    pub async fn save_categories(&self, settings: &CategorySettings) -> Result<Option<String>> {
        let msg: MessageResponse = self.post_json("/api/categories", settings).await?;
        Ok(msg.message)
    }

    /// Reset category settings to backend defaults. Returns the new settings.
    pub async fn reset_categories(&self) -> Result<CategorySettings> {
        let resp = self
            .client
            .post(self.url("/api/categories/reset"))
            .send()
            .await?;
        let reset: ResetCategoriesResponse = Self::decode(resp).await?;
        Ok(reset.settings)
    }

    /// The backend's default search prompt.
    pub async fn default_prompt(&self) -> Result<String> {
        let resp: PromptResponse = self.get_json("/api/prompt").await?;
        Ok(resp.prompt)
    }
}
