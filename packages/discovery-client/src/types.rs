use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a search task.
///
/// The backend is free to introduce new status strings; unknown values are
/// carried verbatim in `Other` rather than rejected, so deserialization never
/// fails on a newer backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Created,
    Running,
    Finished,
    Failed,
    Stopped,
    PartialSuccess,
    Other(String),
}

impl TaskStatus {
    /// Terminal statuses stop polling and trigger result resolution.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Finished
                | TaskStatus::Failed
                | TaskStatus::Stopped
                | TaskStatus::PartialSuccess
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Created => "created",
            TaskStatus::Running => "running",
            TaskStatus::Finished => "finished",
            TaskStatus::Failed => "failed",
            TaskStatus::Stopped => "stopped",
            TaskStatus::PartialSuccess => "partial_success",
            TaskStatus::Other(s) => s,
        }
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "created" => TaskStatus::Created,
            "running" => TaskStatus::Running,
            "finished" => TaskStatus::Finished,
            "failed" => TaskStatus::Failed,
            "stopped" => TaskStatus::Stopped,
            "partial_success" => TaskStatus::PartialSuccess,
            _ => TaskStatus::Other(s),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engagement metrics attached to a discovery post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub retweets: u64,
    #[serde(default)]
    pub replies: u64,
    #[serde(default)]
    pub views: u64,
}

/// A discovered product as consumed by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Official website, when one was found.
    #[serde(default)]
    pub url: Option<String>,
    /// Link to the post the product was discovered in.
    #[serde(default)]
    pub post_url: Option<String>,
    #[serde(default)]
    pub metrics: Metrics,
    /// Database id, present once the product has been persisted.
    #[serde(default)]
    pub id: Option<i64>,
}

/// One entry of the task's execution trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStep {
    #[serde(default)]
    pub step: Option<u32>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thinking: Option<String>,
    #[serde(default)]
    pub next_goal: Option<String>,
    #[serde(default)]
    pub evaluation_previous_goal: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl TaskStep {
    /// True when the step carries anything worth rendering. The agent runtime
    /// occasionally emits placeholder entries with every field empty.
    pub fn is_informative(&self) -> bool {
        [
            &self.action,
            &self.description,
            &self.thinking,
            &self.next_goal,
            &self.evaluation_previous_goal,
            &self.url,
        ]
        .iter()
        .any(|field| field.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }

    /// Headline text for the step.
    pub fn headline(&self) -> &str {
        self.action
            .as_deref()
            .or(self.next_goal.as_deref())
            .unwrap_or("Step")
    }

    /// Body text for the step.
    pub fn detail(&self) -> Option<&str> {
        self.description
            .as_deref()
            .or(self.thinking.as_deref())
            .or(self.evaluation_previous_goal.as_deref())
    }
}

/// Structured result payload produced by the task runner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub total_found: Option<u64>,
}

/// Response of `GET /api/task/{id}/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub status: TaskStatus,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub steps: Option<Vec<TaskStep>>,
    #[serde(default)]
    pub result: Option<SearchResult>,
    #[serde(default)]
    pub parsed_products: Option<SearchResult>,
    #[serde(default)]
    pub execution_error: Option<String>,
    #[serde(default)]
    pub intermediate_progress: Option<SearchResult>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub recovered_from_logs: Option<bool>,
}

impl TaskStatusResponse {
    /// Bare status response, useful as a starting point in tests.
    pub fn with_status(status: TaskStatus) -> Self {
        Self {
            status,
            live_url: None,
            steps: None,
            result: None,
            parsed_products: None,
            execution_error: None,
            intermediate_progress: None,
            message: None,
            recovered_from_logs: None,
        }
    }

    /// Decode a raw status payload.
    ///
    /// The runner's result envelope is not reliable: the payload may be a
    /// structured object, a JSON object serialized as a string, loosely
    /// formatted text, or live under an alternate field entirely. Whatever
    /// the typed `result` field cannot hold directly is salvaged through
    /// [`crate::parse::parse_search_result`].
    pub fn from_raw(mut raw: serde_json::Value) -> serde_json::Result<Self> {
        let result_field = raw
            .as_object_mut()
            .and_then(|fields| fields.remove("result"));
        let mut resp: Self = serde_json::from_value(raw.clone())?;

        if let Some(value) = result_field {
            resp.result = serde_json::from_value::<SearchResult>(value.clone())
                .ok()
                .filter(|r| !r.products.is_empty() || r.summary.is_some() || r.note.is_some());
            if resp.result.is_none() {
                if let Some(fields) = raw.as_object_mut() {
                    fields.insert("result".to_string(), value);
                }
            }
        }
        if resp.result.is_none() {
            resp.result = crate::parse::parse_search_result(&raw);
        }
        Ok(resp)
    }
}

/// Structured search parameters persisted alongside the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    pub keywords: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Body of `POST /api/search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub prompt: String,
    pub search_params: SearchParams,
}

/// Raw response of `POST /api/search`; see [`SearchSubmission`] for the
/// interpreted form.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub redirect_to_results: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Interpreted outcome of a search submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchSubmission {
    /// A task was created; poll it for progress.
    Started {
        task_id: String,
        live_url: Option<String>,
    },
    /// The backend already holds results for an equivalent search.
    RedirectToResults { message: String },
}

/// A historical search record.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRecord {
    pub id: i64,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    pub status: String,
    #[serde(default)]
    pub total_products: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Search metadata attached to a product detail view.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchInfo {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub task_id: String,
}

/// Aggregated product record from `GET /api/products/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDetail {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub official_url: Option<String>,
    #[serde(default)]
    pub total_posts: u64,
    #[serde(default)]
    pub total_likes: u64,
    #[serde(default)]
    pub total_retweets: u64,
    #[serde(default)]
    pub total_replies: u64,
    #[serde(default)]
    pub total_views: u64,
    #[serde(default)]
    pub deep_search_completed: bool,
    #[serde(default)]
    pub search_info: Option<SearchInfo>,
}

/// A post related to a product.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub post_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub post_url: Option<String>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub retweets: u64,
    #[serde(default)]
    pub replies: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub is_original: bool,
}

/// Response of `GET /api/products/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDetailResponse {
    pub product: ProductDetail,
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// Response of `POST /api/products/{id}/deep-search`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeepSearchStarted {
    pub task_id: String,
    pub product_id: i64,
}

/// Response of `GET /api/deep-search/{task_id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeepSearchStatus {
    pub status: String,
    #[serde(default)]
    pub posts_found: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl DeepSearchStatus {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }

    pub fn is_failed(&self) -> bool {
        self.status == "failed"
    }
}

/// A product category toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub value: String,
    pub label: String,
    pub enabled: bool,
}

/// Preset and user-defined category settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorySettings {
    #[serde(default)]
    pub preset: Vec<Category>,
    #[serde(default)]
    pub custom: Vec<Category>,
}

// Wire wrappers for list endpoints.

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RecordsResponse {
    #[serde(default)]
    pub records: Vec<SearchRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PromptResponse {
    pub prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResetCategoriesResponse {
    pub settings: CategorySettings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_status_with_structured_result_decodes_directly() {
        let raw = json!({
            "status": "finished",
            "result": {"products": [{"name": "Sketchy"}], "summary": "one hit"}
        });
        let resp = TaskStatusResponse::from_raw(raw).unwrap();
        assert_eq!(resp.result.unwrap().products[0].name, "Sketchy");
    }

    #[test]
    fn raw_status_with_stringified_result_is_salvaged() {
        let raw = json!({
            "status": "finished",
            "result": "{\"products\":[{\"name\":\"VoiceKit\"}]}"
        });
        let resp = TaskStatusResponse::from_raw(raw).unwrap();
        assert_eq!(resp.status, TaskStatus::Finished);
        assert_eq!(resp.result.unwrap().products[0].name, "VoiceKit");
    }

    #[test]
    fn raw_status_salvages_alternate_envelope_fields() {
        let raw = json!({
            "status": "finished",
            "output": {"products": [{"name": "Draftly"}]}
        });
        let resp = TaskStatusResponse::from_raw(raw).unwrap();
        assert_eq!(resp.result.unwrap().products[0].name, "Draftly");
    }

    #[test]
    fn raw_status_without_any_result_stays_none() {
        let raw = json!({"status": "running", "live_url": "https://viewer/1"});
        let resp = TaskStatusResponse::from_raw(raw).unwrap();
        assert!(resp.result.is_none());
        assert_eq!(resp.live_url.as_deref(), Some("https://viewer/1"));
    }

    #[test]
    fn unknown_status_round_trips_verbatim() {
        let status: TaskStatus = serde_json::from_str("\"paused_for_captcha\"").unwrap();
        assert_eq!(status, TaskStatus::Other("paused_for_captcha".into()));
        assert!(!status.is_terminal());
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            "\"paused_for_captcha\""
        );
    }

    #[test]
    fn terminal_statuses() {
        for s in ["finished", "failed", "stopped", "partial_success"] {
            assert!(TaskStatus::from(s.to_string()).is_terminal(), "{s}");
        }
        for s in ["created", "running", "queued"] {
            assert!(!TaskStatus::from(s.to_string()).is_terminal(), "{s}");
        }
    }

    #[test]
    fn status_response_tolerates_sparse_payloads() {
        let resp: TaskStatusResponse = serde_json::from_str(r#"{"status":"running"}"#).unwrap();
        assert_eq!(resp.status, TaskStatus::Running);
        assert!(resp.steps.is_none());
        assert!(resp.result.is_none());
    }

    #[test]
    fn placeholder_steps_are_not_informative() {
        let step: TaskStep = serde_json::from_str(r#"{"step": 3}"#).unwrap();
        assert!(!step.is_informative());

        let step: TaskStep =
            serde_json::from_str(r#"{"action": "search", "url": "https://nitter.net"}"#).unwrap();
        assert!(step.is_informative());
        assert_eq!(step.headline(), "search");
    }
}
