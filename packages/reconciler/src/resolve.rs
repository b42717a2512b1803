//! Result resolution.
//!
//! Runs exactly once per task, on the first terminal status. Candidate result
//! sources are evaluated in a fixed precedence, stopping at the first that
//! yields at least one product or an authoritative empty answer:
//!
//! 1. `finished` → the persistent store, with bounded retries. The backend's
//!    write path is not synchronous with the status flag flipping, so an
//!    empty store immediately after `finished` may be a race, not a fact.
//! 2. The status response's secondary parsed-products field.
//! 3. An explicit execution-error field → recoverable error advisory.
//! 4. An inline result payload on `finished`/`partial_success`.
//! 5. `finished` with nothing anywhere → "completed but no results" advisory.
//! 6. `failed` → error advisory with retry guidance.
//! 7. `stopped` (or a dataless partial) → "interrupted" advisory.

use std::sync::Arc;

use discovery_client::{SearchResult, TaskStatus, TaskStatusResponse};
use tracing::{debug, info, warn};

use crate::config::PollConfig;
use crate::traits::{Advisory, Provenance, TaskApi, Ui};

/// Final outcome of one polling run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Products were found and rendered.
    Products {
        result: SearchResult,
        provenance: Provenance,
    },
    /// The backend reported an execution error; recoverable, retry advised.
    ExecutionError(String),
    /// The task finished but produced nothing; not an error.
    NoResults,
    /// The task failed outright.
    Failed,
    /// The task was interrupted before completion.
    Interrupted,
    /// The tick budget ran out while the task was still live.
    TimedOut,
    /// A newer search replaced this one before it finished.
    Superseded,
}

/// Resolve the final product list for a task that just went terminal.
pub async fn resolve<A: TaskApi + ?Sized>(
    api: &A,
    ui: &Arc<dyn Ui>,
    config: &PollConfig,
    task_id: &str,
    resp: &TaskStatusResponse,
) -> Outcome {
    // 1. The store is authoritative for finished tasks, but its write path
    //    lags the status flag. Retry before trusting an empty answer.
    if resp.status == TaskStatus::Finished {
        for attempt in 1..=config.store_retry_attempts {
            match api.stored_products(task_id).await {
                Ok(products) if !products.is_empty() => {
                    info!(
                        task_id,
                        count = products.len(),
                        attempt,
                        "Loaded committed products from store"
                    );
                    let result = SearchResult {
                        total_found: Some(products.len() as u64),
                        products,
                        summary: None,
                        note: None,
                    };
                    ui.show_status(&format!(
                        "Search completed, {} products stored",
                        result.products.len()
                    ));
                    ui.show_products(&result, Provenance::Store);
                    return Outcome::Products {
                        result,
                        provenance: Provenance::Store,
                    };
                }
                Ok(_) => {
                    debug!(task_id, attempt, "Store has no products yet");
                }
                Err(error) => {
                    warn!(task_id, attempt, %error, "Store lookup failed");
                }
            }
            if attempt < config.store_retry_attempts {
                ui.show_status(&format!(
                    "Waiting for products to be saved... ({attempt}/{})",
                    config.store_retry_attempts
                ));
                tokio::time::sleep(config.store_retry_interval).await;
            }
        }
        debug!(task_id, "Store stayed empty, falling through to response payloads");
    }

    // 2. Secondary parsed-products field.
    if let Some(parsed) = resp
        .parsed_products
        .as_ref()
        .filter(|r| !r.products.is_empty())
    {
        info!(task_id, count = parsed.products.len(), "Rendering parsed products");
        ui.show_status("Search completed");
        ui.show_products(parsed, Provenance::Parsed);
        return Outcome::Products {
            result: parsed.clone(),
            provenance: Provenance::Parsed,
        };
    }

    // 3. Explicit execution error: recoverable, not a silent failure.
    if let Some(error) = resp.execution_error.as_deref().filter(|e| !e.is_empty()) {
        ui.show_status("Task ran into a problem");
        ui.show_advisory(&Advisory::error(format!(
            "Task execution ran into a problem: {error}. Try the search again."
        )));
        return Outcome::ExecutionError(error.to_string());
    }

    // 4. Inline result payload.
    if matches!(
        resp.status,
        TaskStatus::Finished | TaskStatus::PartialSuccess
    ) {
        if let Some(result) = resp.result.as_ref() {
            let recovered = resp.recovered_from_logs.unwrap_or(false);
            let provenance = if recovered {
                Provenance::Recovered
            } else {
                Provenance::Inline
            };
            ui.show_products(result, provenance);
            if resp.status == TaskStatus::PartialSuccess {
                let message = resp
                    .message
                    .clone()
                    .unwrap_or_else(|| {
                        "Task was interrupted, but partial data was recovered".to_string()
                    });
                ui.show_advisory(
                    &Advisory::warning(message).dismiss_after(config.advisory_timeout),
                );
                schedule_advisory_dismissal(ui, config);
            }
            ui.show_status("Search completed");
            return Outcome::Products {
                result: result.clone(),
                provenance,
            };
        }
    }

    // 5–7. Nothing held data; classify the terminal status itself.
    match resp.status {
        TaskStatus::Finished => {
            ui.show_status("Task completed but produced no results");
            ui.show_advisory(&Advisory::info(
                "The search completed but no products were saved. Try again with \
                 different keywords or a wider date range.",
            ));
            Outcome::NoResults
        }
        TaskStatus::Failed => {
            ui.show_status("Task failed");
            ui.show_advisory(&Advisory::error(
                "Task execution failed. Check connectivity and try the search again.",
            ));
            Outcome::Failed
        }
        _ => {
            // `stopped`, or a partial success that carried no data.
            ui.show_status("Task interrupted");
            ui.show_advisory(&Advisory::warning(
                "Task execution was interrupted before it could finish.",
            ));
            Outcome::Interrupted
        }
    }
}

/// Clear advisories once the auto-dismiss window elapses.
fn schedule_advisory_dismissal(ui: &Arc<dyn Ui>, config: &PollConfig) {
    let ui = Arc::clone(ui);
    let timeout = config.advisory_timeout;
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        ui.clear_advisories();
    });
}
