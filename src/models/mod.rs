// src/models/mod.rs

//! Domain models for the podium reporter.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod result;
mod summary;

// Re-export all public types
pub use config::{
    Config, ENV_ALWAYS_NOTIFY, ENV_COOKIE, ENV_TEAM_ID, ENV_WEBHOOK_URL, ExtractorConfig,
    HttpConfig, MAX_WINDOW_DAYS, NotifierConfig, RunConfig, SourceConfig, StateConfig,
    SummaryConfig, WindowConfig,
};
pub use result::{ResultIdentity, ResultRecord, SeenSet, UNKNOWN_CATEGORY, UNKNOWN_RIDER};
pub use summary::Summary;
