// src/services/extractor.rs

//! Result row extraction.
//!
//! The team page has no stable schema, so rows are recognized by what they
//! contain rather than by where things are. Every table row with enough cells
//! is scanned in document order:
//!
//! 1. first cell that is only digits → position
//! 2. first cell that contains a date → date text
//! 3. first link to an event page → event name and link
//! 4. first link to a rider profile → rider name (optional)
//! 5. first cell with an isolated category letter → category (optional)
//!
//! A row missing any of 1–3 is skipped. Skips are expected and never abort the
//! rest of the page.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ExtractorConfig, ResultRecord, UNKNOWN_CATEGORY, UNKNOWN_RIDER};
use crate::services::normalizer::parse_date;
use crate::utils::resolve_url;

static DATE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}[-/]\d{1,2}[-/]\d{1,2}|\d{1,2}[-/]\d{1,2}[-/]\d{4}")
        .expect("static date pattern")
});

static CATEGORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([ABCD])\b").expect("static category pattern"));

/// A row that carried every required signal, before date normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    pub position: u32,
    pub date_text: String,
    pub event_name: String,
    pub event_link: String,
    pub rider_name: Option<String>,
    pub category: Option<String>,
}

impl CandidateRow {
    /// Turn the candidate into a typed record.
    ///
    /// Returns `None` when the date text matches none of the known formats.
    pub fn normalize(self) -> Option<ResultRecord> {
        let occurred_at = parse_date(&self.date_text)?;
        Some(ResultRecord {
            event_name: self.event_name,
            event_link: self.event_link,
            occurred_at,
            rider_name: self
                .rider_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNKNOWN_RIDER.to_string()),
            position: self.position,
            category: self
                .category
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
        })
    }
}

/// Extracts result rows from a team results page.
pub struct RowExtractor {
    table_sel: Selector,
    row_sel: Selector,
    cell_sel: Selector,
    link_sel: Selector,
    min_cells: usize,
    event_marker: String,
    rider_pattern: Regex,
    base_url: Url,
}

impl RowExtractor {
    /// Create an extractor resolving links against `base_url`.
    pub fn new(config: &ExtractorConfig, base_url: &str) -> Result<Self> {
        if config.event_marker.is_empty() {
            return Err(AppError::config("extractor.event_marker is empty"));
        }

        Ok(Self {
            table_sel: parse_selector("table")?,
            row_sel: parse_selector("tr")?,
            cell_sel: parse_selector("td")?,
            link_sel: parse_selector("a[href]")?,
            min_cells: config.min_cells,
            event_marker: config.event_marker.clone(),
            rider_pattern: Regex::new(&config.rider_pattern)?,
            base_url: Url::parse(base_url)?,
        })
    }

    /// Extract every result record found on the page.
    pub fn extract(&self, html: &str) -> Vec<ResultRecord> {
        let document = Html::parse_document(html);

        let mut candidates = 0usize;
        let records: Vec<ResultRecord> = self
            .candidates(&document)
            .inspect(|_| candidates += 1)
            .filter_map(CandidateRow::normalize)
            .collect();

        log::debug!(
            "Extracted {} results from {} candidate rows",
            records.len(),
            candidates
        );
        records
    }

    /// Whether the page has at least one row that looks like a result.
    pub fn has_candidates(&self, html: &str) -> bool {
        let document = Html::parse_document(html);
        self.candidates(&document).next().is_some()
    }

    /// Lazily yield candidate rows in document order.
    pub fn candidates<'a>(
        &'a self,
        document: &'a Html,
    ) -> impl Iterator<Item = CandidateRow> + 'a {
        document
            .select(&self.table_sel)
            .flat_map(move |table| table.select(&self.row_sel))
            .filter_map(move |row| self.candidate(row))
    }

    /// Scan a single row, short-circuiting on the first missing required field.
    fn candidate(&self, row: ElementRef<'_>) -> Option<CandidateRow> {
        let cells: Vec<String> = row
            .select(&self.cell_sel)
            .map(|td| cell_text(&td))
            .collect();
        if cells.len() < self.min_cells {
            return None;
        }

        let position = cells
            .iter()
            .find(|t| is_position_cell(t))
            .and_then(|t| parse_position(t))?;
        let date_text = cells.iter().find(|t| looks_like_date(t))?.clone();
        let (event_name, event_link) = self.find_event(row)?;

        Some(CandidateRow {
            position,
            date_text,
            event_name,
            event_link,
            rider_name: self.find_rider(row),
            category: cells.iter().find_map(|t| find_category(t)).map(str::to_string),
        })
    }

    fn find_event(&self, row: ElementRef<'_>) -> Option<(String, String)> {
        let anchor = row
            .select(&self.link_sel)
            .find(|a| href(a).is_some_and(|h| h.contains(&self.event_marker)))?;
        let link = resolve_url(&self.base_url, href(&anchor)?)?;
        Some((cell_text(&anchor), link))
    }

    fn find_rider(&self, row: ElementRef<'_>) -> Option<String> {
        row.select(&self.link_sel)
            .find(|a| href(a).is_some_and(|h| self.rider_pattern.is_match(h)))
            .map(|a| cell_text(&a))
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn href<'a>(anchor: &ElementRef<'a>) -> Option<&'a str> {
    anchor.value().attr("href")
}

/// Text of an element: trimmed text nodes joined by single spaces.
pub fn cell_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the whole cell is a bare number.
pub fn is_position_cell(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

/// Parse a position cell. Zero is not a placement.
pub fn parse_position(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok().filter(|p| *p > 0)
}

/// Whether the cell contains something shaped like a date.
pub fn looks_like_date(text: &str) -> bool {
    DATE_SHAPE.is_match(text)
}

/// First isolated category letter in the cell, if any.
///
/// This also matches a standalone capital letter inside other text (a rider
/// initial, for example).
pub fn find_category(text: &str) -> Option<&str> {
    CATEGORY
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
