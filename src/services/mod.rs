//! Service layer for the podium reporter.
//!
//! This module contains:
//! - Result row extraction (`RowExtractor`)
//! - Date normalization (`normalizer::parse_date`)
//! - Results page fetching (`ResultSource`, `ZwiftPowerSource`)
//! - Summary delivery (`Notifier`, `DiscordNotifier`, `LogNotifier`)

pub mod extractor;
pub mod normalizer;
mod notifier;
mod source;

pub use extractor::{CandidateRow, RowExtractor};
pub use notifier::{DiscordNotifier, LogNotifier, Notifier};
pub use source::{ResultSource, ZwiftPowerSource};
