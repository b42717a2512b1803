use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use discovery_client::{
    DeepSearchStarted, DeepSearchStatus, DiscoveryClient, Product, SearchResult,
    TaskStatusResponse, TaskStep,
};

/// Backend seam for the primary poll/resolve flow (to allow mocking).
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// One status fetch for a task.
    async fn status(&self, task_id: &str) -> Result<TaskStatusResponse>;

    /// Products committed to the persistent store for a task. The store's
    /// write path lags the status flag, so an empty answer right after
    /// `finished` is not authoritative.
    async fn stored_products(&self, task_id: &str) -> Result<Vec<Product>>;
}

#[async_trait]
impl TaskApi for DiscoveryClient {
    async fn status(&self, task_id: &str) -> Result<TaskStatusResponse> {
        Ok(self.task_status(task_id).await?)
    }

    async fn stored_products(&self, task_id: &str) -> Result<Vec<Product>> {
        Ok(self.task_products(task_id).await?)
    }
}

/// Backend seam for the secondary deep-search flow.
#[async_trait]
pub trait DeepSearchApi: Send + Sync {
    async fn start(&self, product_id: i64) -> Result<DeepSearchStarted>;
    async fn status(&self, task_id: &str, product_id: i64) -> Result<DeepSearchStatus>;
}

#[async_trait]
impl DeepSearchApi for DiscoveryClient {
    async fn start(&self, product_id: i64) -> Result<DeepSearchStarted> {
        Ok(self.start_deep_search(product_id).await?)
    }

    async fn status(&self, task_id: &str, product_id: i64) -> Result<DeepSearchStatus> {
        Ok(self.deep_search_status(task_id, product_id).await?)
    }
}

/// Severity of an advisory banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryKind {
    Info,
    Warning,
    Error,
}

/// A non-blocking banner shown next to the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub message: String,
    /// When set, the driver clears advisories after this long.
    pub auto_dismiss: Option<Duration>,
}

impl Advisory {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: AdvisoryKind::Info,
            message: message.into(),
            auto_dismiss: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: AdvisoryKind::Warning,
            message: message.into(),
            auto_dismiss: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: AdvisoryKind::Error,
            message: message.into(),
            auto_dismiss: None,
        }
    }

    pub fn dismiss_after(mut self, timeout: Duration) -> Self {
        self.auto_dismiss = Some(timeout);
        self
    }
}

/// Where the rendered products came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Committed to the persistent store.
    Store,
    /// The status response's secondary parsed-products field.
    Parsed,
    /// The inline result payload.
    Inline,
    /// Reconstructed by the backend from partial execution logs.
    Recovered,
}

/// Observer for everything the reconciler makes visible.
///
/// Stands in for the page DOM: a console front end, a test recorder, or a
/// real view layer all implement this. Methods take `&self`; implementations
/// own their interior mutability.
pub trait Ui: Send + Sync {
    /// Clear all state left by a previous task. Called before the first
    /// network request of a new one.
    fn reset(&self);

    /// Replace the visible status line.
    fn show_status(&self, text: &str);

    /// Publish the live browser-session URL, overwriting any earlier value.
    fn publish_live_url(&self, url: &str);

    /// Replace the whole displayed execution trace.
    fn replace_trace(&self, steps: &[TaskStep]);

    /// Append new entries to the displayed trace without touching prior ones.
    fn append_trace(&self, steps: &[TaskStep]);

    /// Render interim products discovered while the task is still running,
    /// replacing any previous interim rendering.
    fn show_intermediate(&self, result: &SearchResult);

    /// Render the final product list.
    fn show_products(&self, result: &SearchResult, provenance: Provenance);

    /// Show an advisory banner.
    fn show_advisory(&self, advisory: &Advisory);

    /// Remove all advisory banners.
    fn clear_advisories(&self);

    /// Enable or disable the submit control.
    fn set_submit_enabled(&self, enabled: bool);
}
