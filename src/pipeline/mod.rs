//! Pipeline stages and the weekly run.
//!
//! - `filter`: trailing window and podium cut-off
//! - `dedup`: drop results that were already announced
//! - `summary`: group and render the announcement
//! - `run`: fetch → extract → filter → dedup → build → deliver → persist

pub mod dedup;
pub mod filter;
pub mod run;
pub mod summary;

pub use dedup::{UnseenResults, filter_unseen, merge};
pub use filter::filter_podiums;
pub use run::{RunOutcome, run_weekly};
pub use summary::{EventGroup, build_summary, group_by_event};
