//! Async driver for the polling state machine.
//!
//! Owns the single polling timer per reconciler. Feeds timer ticks and fetch
//! results into [`step`](crate::state::step) and executes the effects that
//! come out. A new search cancels the previous task's token before anything
//! else happens, so state never bleeds between consecutive searches and late
//! responses from a superseded task are discarded instead of applied.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PollConfig;
use crate::resolve::{resolve, Outcome};
use crate::state::{step, Effect, PollEvent, PollerState};
use crate::traits::{TaskApi, Ui};

/// Drives one in-flight search task at a time.
pub struct Reconciler<A: TaskApi + ?Sized> {
    api: Arc<A>,
    config: PollConfig,
    active: Mutex<Option<CancellationToken>>,
}

impl<A: TaskApi + ?Sized> Reconciler<A> {
    pub fn new(api: Arc<A>, config: PollConfig) -> Self {
        Self {
            api,
            config,
            active: Mutex::new(None),
        }
    }

    /// Cancel any in-flight polling run. Idempotent.
    pub fn reset(&self) {
        if let Some(token) = self.active.lock().unwrap().take() {
            token.cancel();
        }
    }

    /// Poll `task_id` until a terminal outcome, driving `ui` along the way.
    ///
    /// Cancels any previous run and resets the UI before the first fetch.
    pub async fn run(&self, task_id: &str, ui: Arc<dyn Ui>) -> Outcome {
        let token = self.begin();
        info!(task_id, "Starting status polling");
        ui.reset();
        ui.set_submit_enabled(false);
        poll_loop(
            Arc::clone(&self.api),
            self.config.clone(),
            task_id.to_string(),
            ui,
            token,
        )
        .await
    }

    /// Spawned variant of [`run`](Self::run) for callers that want to keep
    /// the reconciler available for a superseding search.
    pub fn start(&self, task_id: &str, ui: Arc<dyn Ui>) -> JoinHandle<Outcome>
    where
        A: 'static,
    {
        let token = self.begin();
        info!(task_id, "Starting status polling (background)");
        ui.reset();
        ui.set_submit_enabled(false);
        let api = Arc::clone(&self.api);
        let config = self.config.clone();
        let task_id = task_id.to_string();
        tokio::spawn(poll_loop(api, config, task_id, ui, token))
    }

    /// Swap in a fresh cancellation token, cancelling the previous run.
    fn begin(&self) -> CancellationToken {
        let mut active = self.active.lock().unwrap();
        if let Some(token) = active.take() {
            token.cancel();
        }
        let token = CancellationToken::new();
        *active = Some(token.clone());
        token
    }
}

async fn poll_loop<A: TaskApi + ?Sized>(
    api: Arc<A>,
    config: PollConfig,
    task_id: String,
    ui: Arc<dyn Ui>,
    token: CancellationToken,
) -> Outcome {
    let mut state = PollerState::polling(&task_id);
    let mut interval = tokio::time::interval(config.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                debug!(task_id, "Polling superseded by a newer search");
                return Outcome::Superseded;
            }
            _ = interval.tick() => {}
        }

        // Effects are worked off to completion before the next timer tick, so
        // a tick never overlaps an outstanding status fetch.
        let mut events = VecDeque::from([PollEvent::Tick]);
        while let Some(event) = events.pop_front() {
            let (next, effects) = step(state, event, &config);
            state = next;

            for effect in effects {
                // A superseding search may land at any await point; nothing
                // from this run may touch the UI after its token is cancelled.
                if token.is_cancelled() {
                    debug!(task_id, "Polling superseded, discarding remaining effects");
                    return Outcome::Superseded;
                }
                match effect {
                    Effect::FetchStatus => {
                        let event = match api.status(&task_id).await {
                            Ok(resp) => PollEvent::Status(resp),
                            Err(error) => {
                                warn!(task_id, %error, "Status fetch failed, retrying next tick");
                                PollEvent::FetchFailed(error.to_string())
                            }
                        };
                        events.push_back(event);
                    }
                    Effect::ShowStatus(text) => ui.show_status(&text),
                    Effect::PublishLiveUrl(url) => ui.publish_live_url(&url),
                    Effect::ReplaceTrace(steps) => ui.replace_trace(&steps),
                    Effect::AppendTrace(steps) => ui.append_trace(&steps),
                    Effect::ShowIntermediate(result) => ui.show_intermediate(&result),
                    // The timer is this loop; stopping it happens by
                    // returning, which Resolve and BudgetExhausted both do.
                    Effect::StopTimer => {}
                    Effect::Resolve(resp) => {
                        let outcome = resolve(api.as_ref(), &ui, &config, &task_id, &resp).await;
                        ui.set_submit_enabled(true);
                        info!(task_id, ?outcome, "Task resolved");
                        return outcome;
                    }
                    Effect::BudgetExhausted => {
                        // Deliberately no teardown: the backend task may still
                        // complete, and the live panels stay useful.
                        ui.show_status(
                            "Task execution time exceeded, but it may still be running \
                             in the background. Refresh manually to check for results.",
                        );
                        ui.set_submit_enabled(true);
                        info!(task_id, "Polling budget exhausted");
                        return Outcome::TimedOut;
                    }
                }
            }
        }
    }
}
