//! Pure polling state machine.
//!
//! `step` is a pure transition function `(state, event) -> (state, effects)`.
//! All IO (fetching, rendering, timer control) lives in the driver, which
//! feeds events in and executes the effects that come out. This keeps the
//! ordering rules (terminal-once, tick budget, trace merging) testable
//! without a timer or a network.

use discovery_client::{SearchResult, TaskStatus, TaskStatusResponse, TaskStep};

use crate::config::PollConfig;

/// Poller lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum PollerState {
    /// No task in flight. All events are ignored.
    Idle,
    Polling {
        task_id: String,
        /// Status fetches performed so far, counted against the budget.
        ticks_used: u32,
        /// Number of trace entries currently rendered.
        displayed_steps: usize,
    },
    /// A terminal status was observed. All further events are ignored, which
    /// makes the timer stop idempotent.
    Terminal {
        task_id: String,
        status: TaskStatus,
    },
}

impl PollerState {
    pub fn polling(task_id: impl Into<String>) -> Self {
        PollerState::Polling {
            task_id: task_id.into(),
            ticks_used: 0,
            displayed_steps: 0,
        }
    }
}

/// Inputs to the machine.
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// The polling timer fired.
    Tick,
    /// A status fetch completed.
    Status(TaskStatusResponse),
    /// A status fetch failed. Transient; retried on the next tick.
    FetchFailed(String),
}

/// Outputs of the machine, executed by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch the task's status.
    FetchStatus,
    /// Update the visible status line.
    ShowStatus(String),
    /// Publish (or republish) the live-preview URL.
    PublishLiveUrl(String),
    /// Re-render the whole execution trace.
    ReplaceTrace(Vec<TaskStep>),
    /// Render only these new trace entries.
    AppendTrace(Vec<TaskStep>),
    /// Render interim products discovered while the task is still running.
    ShowIntermediate(SearchResult),
    /// Stop the polling timer. Emitted exactly once per task.
    StopTimer,
    /// Run result resolution against this terminal response.
    Resolve(Box<TaskStatusResponse>),
    /// The tick budget ran out while the task was still live. Re-enable the
    /// submit control but leave every informational panel in place.
    BudgetExhausted,
}

/// How the displayed trace should change given a fresh trace snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceUpdate {
    /// First trace seen, or the trace shrank (the backend restarted the task
    /// under the same id): re-render wholesale.
    Replace,
    /// The trace grew: render only entries from this index on.
    AppendFrom(usize),
    /// Same length as displayed: leave the rendering untouched.
    NoChange,
}

/// Decide how to reconcile a new trace snapshot with what is displayed.
pub fn merge_trace(displayed: usize, new_len: usize) -> TraceUpdate {
    if displayed == 0 || new_len < displayed {
        TraceUpdate::Replace
    } else if new_len > displayed {
        TraceUpdate::AppendFrom(displayed)
    } else {
        TraceUpdate::NoChange
    }
}

/// Fixed status-to-text mapping. Unknown statuses pass through verbatim so a
/// newer backend never breaks the display.
pub fn status_text(status: &TaskStatus) -> String {
    match status {
        TaskStatus::Created => "Task created, initializing browser...".to_string(),
        TaskStatus::Running => {
            "AI is searching, this can take several minutes...".to_string()
        }
        TaskStatus::Finished => "Search completed".to_string(),
        TaskStatus::Failed => "Task failed".to_string(),
        TaskStatus::Stopped => "Task stopped".to_string(),
        TaskStatus::PartialSuccess => {
            "Task interrupted, partial data recovered".to_string()
        }
        TaskStatus::Other(s) => s.clone(),
    }
}

/// Advance the machine by one event.
pub fn step(
    state: PollerState,
    event: PollEvent,
    config: &PollConfig,
) -> (PollerState, Vec<Effect>) {
    match state {
        // A task that already ended, or no task at all: late timer ticks and
        // stale responses are dropped here.
        PollerState::Idle | PollerState::Terminal { .. } => (state, vec![]),

        PollerState::Polling {
            task_id,
            ticks_used,
            displayed_steps,
        } => match event {
            PollEvent::Tick => {
                let ticks_used = ticks_used + 1;
                if ticks_used > config.max_ticks {
                    (PollerState::Idle, vec![Effect::StopTimer, Effect::BudgetExhausted])
                } else {
                    (
                        PollerState::Polling {
                            task_id,
                            ticks_used,
                            displayed_steps,
                        },
                        vec![Effect::FetchStatus],
                    )
                }
            }

            PollEvent::FetchFailed(_) => (
                // Transient: keep polling, no visible change.
                PollerState::Polling {
                    task_id,
                    ticks_used,
                    displayed_steps,
                },
                vec![],
            ),

            PollEvent::Status(resp) => {
                let mut effects = vec![Effect::ShowStatus(status_text(&resp.status))];

                if let Some(url) = resp.live_url.as_deref().filter(|u| !u.is_empty()) {
                    effects.push(Effect::PublishLiveUrl(url.to_string()));
                }

                let mut displayed_steps = displayed_steps;
                if let Some(steps) = resp.steps.as_deref() {
                    if !steps.is_empty() && steps.iter().any(TaskStep::is_informative) {
                        match merge_trace(displayed_steps, steps.len()) {
                            TraceUpdate::Replace => {
                                effects.push(Effect::ReplaceTrace(steps.to_vec()));
                                displayed_steps = steps.len();
                            }
                            TraceUpdate::AppendFrom(from) => {
                                effects.push(Effect::AppendTrace(steps[from..].to_vec()));
                                displayed_steps = steps.len();
                            }
                            TraceUpdate::NoChange => {}
                        }
                    }
                }

                if resp.status == TaskStatus::Running {
                    if let Some(progress) = resp
                        .intermediate_progress
                        .as_ref()
                        .filter(|r| !r.products.is_empty())
                    {
                        effects.push(Effect::ShowIntermediate(progress.clone()));
                    }
                }

                if resp.status.is_terminal() {
                    let status = resp.status.clone();
                    effects.push(Effect::StopTimer);
                    effects.push(Effect::Resolve(Box::new(resp)));
                    (PollerState::Terminal { task_id, status }, effects)
                } else {
                    (
                        PollerState::Polling {
                            task_id,
                            ticks_used,
                            displayed_steps,
                        },
                        effects,
                    )
                }
            }
        },
    }
}
