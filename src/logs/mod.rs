//! Delivery Log Aggregator
//!
//! Holds the last-fetched batch of delivery attempt records and derives
//! everything the log surfaces display from it: the distinct-task index,
//! the outcome-filtered row set, per-task timelines and the single expanded
//! detail row. Derived state is rebuilt from the raw batch on every change,
//! never patched in place.

pub mod explorer;
pub mod filter;
pub mod sequence;
pub mod tasks;

pub use explorer::{
    derive_view, FetchOutcome, LogExplorer, LogQuery, LogRow, LogView, PendingFetch, SearchMode,
};
pub use filter::OutcomeFilter;
pub use sequence::{FetchTicket, RequestSequencer};
pub use tasks::{distinct_tasks, TaskRef, TaskSummary, TaskTimeline};
