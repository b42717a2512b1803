//! Task-status polling and result reconciliation.
//!
//! One search task at a time is polled against the discovery backend until it
//! reaches a terminal status or exhausts its tick budget. Terminal tasks go
//! through result resolution, which picks the final product list from
//! whichever source actually holds data (the persistent store, the parsed
//! payload, or the inline result), tolerating the backend's lagging write
//! path with bounded retries.
//!
//! The decision logic is a pure state machine in [`state`]; all IO lives in
//! the [`Reconciler`] driver behind the [`TaskApi`] and [`Ui`] seams, so the
//! ordering rules are unit-testable without a backend.

pub mod config;
pub mod deep_search;
pub mod reconciler;
pub mod resolve;
pub mod state;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use config::PollConfig;
pub use deep_search::{run_deep_search, DeepSearchOutcome};
pub use reconciler::Reconciler;
pub use resolve::Outcome;
pub use state::{merge_trace, status_text, Effect, PollEvent, PollerState, TraceUpdate};
pub use traits::{Advisory, AdvisoryKind, DeepSearchApi, Provenance, TaskApi, Ui};
