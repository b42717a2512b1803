//! Test doubles shared by the unit tests in this crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use discovery_client::{
    DeepSearchStarted, DeepSearchStatus, Product, SearchResult, TaskStatusResponse, TaskStep,
};

use crate::traits::{Advisory, DeepSearchApi, Provenance, TaskApi, Ui};

/// Scripted [`TaskApi`]. Each queue yields its entries in order and then
/// repeats the last one, so a short script can drive a long poll.
pub struct MockApi {
    statuses: Mutex<VecDeque<TaskStatusResponse>>,
    store: Mutex<VecDeque<Vec<Product>>>,
    status_queries: AtomicU32,
    store_queries: AtomicU32,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(VecDeque::new()),
            store: Mutex::new(VecDeque::new()),
            status_queries: AtomicU32::new(0),
            store_queries: AtomicU32::new(0),
        }
    }

    pub fn with_statuses(self, statuses: Vec<TaskStatusResponse>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn with_store_answers(self, answers: Vec<Vec<Product>>) -> Self {
        *self.store.lock().unwrap() = answers.into();
        self
    }

    pub fn status_queries(&self) -> u32 {
        self.status_queries.load(Ordering::SeqCst)
    }

    pub fn store_queries(&self) -> u32 {
        self.store_queries.load(Ordering::SeqCst)
    }

    fn next<T: Clone>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
        let mut queue = queue.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl TaskApi for MockApi {
    async fn status(&self, _task_id: &str) -> Result<TaskStatusResponse> {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.statuses).ok_or_else(|| anyhow!("no scripted status"))
    }

    async fn stored_products(&self, _task_id: &str) -> Result<Vec<Product>> {
        self.store_queries.fetch_add(1, Ordering::SeqCst);
        Ok(Self::next(&self.store).unwrap_or_default())
    }
}

/// Scripted [`DeepSearchApi`].
pub struct MockDeepApi {
    statuses: Mutex<VecDeque<Result<DeepSearchStatus>>>,
}

impl MockDeepApi {
    pub fn new(statuses: Vec<Result<DeepSearchStatus>>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
        }
    }
}

#[async_trait]
impl DeepSearchApi for MockDeepApi {
    async fn start(&self, product_id: i64) -> Result<DeepSearchStarted> {
        Ok(DeepSearchStarted {
            task_id: "deep-1".to_string(),
            product_id,
        })
    }

    async fn status(&self, _task_id: &str, _product_id: i64) -> Result<DeepSearchStatus> {
        let mut queue = self.statuses.lock().unwrap();
        match queue.len() {
            0 => Err(anyhow!("no scripted deep-search status")),
            _ => queue.pop_front().unwrap(),
        }
    }
}

/// Everything the reconciler told the UI, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    Reset,
    ShowStatus(String),
    PublishLiveUrl(String),
    ReplaceTrace(usize),
    AppendTrace(usize),
    ShowIntermediate(usize),
    ShowProducts {
        count: usize,
        provenance: Provenance,
    },
    ShowAdvisory(Advisory),
    ClearAdvisories,
    SetSubmitEnabled(bool),
}

/// [`Ui`] that records calls and mirrors the displayed trace.
pub struct RecordingUi {
    calls: Mutex<Vec<UiCall>>,
    trace: Mutex<Vec<TaskStep>>,
    last_products: Mutex<Option<(SearchResult, Provenance)>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            trace: Mutex::new(Vec::new()),
            last_products: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> Vec<UiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn advisories(&self) -> Vec<Advisory> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                UiCall::ShowAdvisory(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    /// Number of products in the most recent render.
    pub fn products_shown(&self) -> usize {
        self.last_products
            .lock()
            .unwrap()
            .as_ref()
            .map(|(r, _)| r.products.len())
            .unwrap_or(0)
    }

    pub fn last_provenance(&self) -> Option<Provenance> {
        self.last_products.lock().unwrap().as_ref().map(|(_, p)| *p)
    }

    /// Length of the trace as currently displayed.
    pub fn trace_len(&self) -> usize {
        self.trace.lock().unwrap().len()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                UiCall::ShowStatus(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn live_urls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                UiCall::PublishLiveUrl(u) => Some(u),
                _ => None,
            })
            .collect()
    }

    pub fn reset_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, UiCall::Reset))
            .count()
    }

    pub fn last_submit_enabled(&self) -> Option<bool> {
        self.calls()
            .into_iter()
            .rev()
            .find_map(|c| match c {
                UiCall::SetSubmitEnabled(e) => Some(e),
                _ => None,
            })
    }

    fn record(&self, call: UiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Ui for RecordingUi {
    fn reset(&self) {
        self.trace.lock().unwrap().clear();
        *self.last_products.lock().unwrap() = None;
        self.record(UiCall::Reset);
    }

    fn show_status(&self, text: &str) {
        self.record(UiCall::ShowStatus(text.to_string()));
    }

    fn publish_live_url(&self, url: &str) {
        self.record(UiCall::PublishLiveUrl(url.to_string()));
    }

    fn replace_trace(&self, steps: &[TaskStep]) {
        *self.trace.lock().unwrap() = steps.to_vec();
        self.record(UiCall::ReplaceTrace(steps.len()));
    }

    fn append_trace(&self, steps: &[TaskStep]) {
        self.trace.lock().unwrap().extend_from_slice(steps);
        self.record(UiCall::AppendTrace(steps.len()));
    }

    fn show_intermediate(&self, result: &SearchResult) {
        self.record(UiCall::ShowIntermediate(result.products.len()));
    }

    fn show_products(&self, result: &SearchResult, provenance: Provenance) {
        *self.last_products.lock().unwrap() = Some((result.clone(), provenance));
        self.record(UiCall::ShowProducts {
            count: result.products.len(),
            provenance,
        });
    }

    fn show_advisory(&self, advisory: &Advisory) {
        self.record(UiCall::ShowAdvisory(advisory.clone()));
    }

    fn clear_advisories(&self) {
        self.record(UiCall::ClearAdvisories);
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.record(UiCall::SetSubmitEnabled(enabled));
    }
}
