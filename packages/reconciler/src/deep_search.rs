//! Secondary per-product poll/resolve flow.
//!
//! Deep search re-runs the agent against a single already-discovered product
//! to collect its related posts. Structurally the same poll loop as the
//! primary flow at a smaller budget, with a two-outcome terminal set.

use anyhow::Result;
use tracing::{info, warn};

use crate::config::PollConfig;
use crate::traits::{Advisory, DeepSearchApi, Ui};

/// Terminal outcome of a deep-search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepSearchOutcome {
    Completed { posts_found: u64 },
    Failed,
    /// Budget exhausted while still running; the task may finish later.
    TimedOut,
}

/// Start a deep search for `product_id` and poll it to a terminal outcome.
pub async fn run_deep_search<A: DeepSearchApi + ?Sized>(
    api: &A,
    product_id: i64,
    config: &PollConfig,
    ui: &dyn Ui,
) -> Result<DeepSearchOutcome> {
    let started = api.start(product_id).await?;
    info!(product_id, task_id = %started.task_id, "Deep search started");
    ui.show_status("Deep search started...");

    for attempt in 1..=config.max_ticks {
        tokio::time::sleep(config.poll_interval).await;

        match api.status(&started.task_id, product_id).await {
            Ok(status) if status.is_completed() => {
                let posts_found = status.posts_found.unwrap_or(0);
                info!(product_id, posts_found, "Deep search completed");
                ui.show_status(&format!(
                    "Deep search completed, found {posts_found} related posts"
                ));
                return Ok(DeepSearchOutcome::Completed { posts_found });
            }
            Ok(status) if status.is_failed() => {
                ui.show_status("Deep search failed");
                ui.show_advisory(&Advisory::error(
                    status
                        .error
                        .unwrap_or_else(|| "Deep search failed".to_string()),
                ));
                return Ok(DeepSearchOutcome::Failed);
            }
            Ok(_) => {
                ui.show_status(&format!(
                    "Deep search running... ({attempt}/{})",
                    config.max_ticks
                ));
            }
            // Transient; keep polling.
            Err(error) => {
                warn!(product_id, attempt, %error, "Deep search status fetch failed");
            }
        }
    }

    ui.show_advisory(&Advisory::warning(
        "Deep search timed out, but it may still be running. Refresh later to \
         check for new posts.",
    ));
    Ok(DeepSearchOutcome::TimedOut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockDeepApi, RecordingUi};
    use crate::traits::AdvisoryKind;
    use std::time::Duration;

    use anyhow::anyhow;
    use discovery_client::DeepSearchStatus;

    fn status(s: &str, posts_found: Option<u64>) -> Result<DeepSearchStatus> {
        Ok(DeepSearchStatus {
            status: s.to_string(),
            posts_found,
            error: None,
        })
    }

    fn fast_config() -> PollConfig {
        PollConfig::deep_search().with_poll_interval(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn completes_after_running_ticks() {
        let api = MockDeepApi::new(vec![
            status("running", None),
            status("running", None),
            status("completed", Some(7)),
        ]);
        let ui = RecordingUi::new();

        let outcome = run_deep_search(&api, 42, &fast_config(), &ui).await.unwrap();

        assert_eq!(outcome, DeepSearchOutcome::Completed { posts_found: 7 });
        assert!(ui.statuses().last().unwrap().contains("7 related posts"));
    }

    #[tokio::test]
    async fn transient_fetch_errors_are_retried() {
        let api = MockDeepApi::new(vec![
            Err(anyhow!("connection reset")),
            status("completed", Some(1)),
        ]);
        let ui = RecordingUi::new();

        let outcome = run_deep_search(&api, 42, &fast_config(), &ui).await.unwrap();
        assert_eq!(outcome, DeepSearchOutcome::Completed { posts_found: 1 });
    }

    #[tokio::test]
    async fn failure_surfaces_an_error_advisory() {
        let api = MockDeepApi::new(vec![status("failed", None)]);
        let ui = RecordingUi::new();

        let outcome = run_deep_search(&api, 42, &fast_config(), &ui).await.unwrap();

        assert_eq!(outcome, DeepSearchOutcome::Failed);
        assert_eq!(ui.advisories()[0].kind, AdvisoryKind::Error);
    }

    #[tokio::test]
    async fn budget_exhaustion_times_out_with_guidance() {
        let api = MockDeepApi::new(
            std::iter::repeat_with(|| status("running", None))
                .take(10)
                .collect(),
        );
        let ui = RecordingUi::new();
        let config = fast_config().with_max_ticks(3);

        let outcome = run_deep_search(&api, 42, &config, &ui).await.unwrap();

        assert_eq!(outcome, DeepSearchOutcome::TimedOut);
        assert_eq!(ui.advisories()[0].kind, AdvisoryKind::Warning);
    }
}
