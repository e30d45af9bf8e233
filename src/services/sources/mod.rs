// src/services/sources/mod.rs

//! Listing source adapters.
//!
//! Every adapter turns one external listing into normalized [`Posting`]s.
//! Rows that cannot be normalized are skipped one by one; a failure of the
//! whole fetch is reported as `SourceUnavailable`.

mod csv_export;
mod grid;
mod html_table;
mod json_api;

use async_trait::async_trait;
use scraper::{ElementRef, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Posting, SourceConfig};
use crate::utils::http::fetch_text;
use crate::utils::url::resolve_url;

pub use csv_export::{CsvExportSource, parse_csv};
pub use grid::{GridSource, parse_grid};
pub use html_table::{HtmlTableSource, parse_table};
pub use json_api::{JsonApiSource, parse_json};

/// A source of job postings.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Fetch and normalize all postings currently listed.
    async fn fetch(&self) -> Result<Vec<Posting>>;
}

/// Build the adapter for a configured source.
pub fn build_source(config: &SourceConfig, client: reqwest::Client) -> Box<dyn SourceAdapter> {
    match config {
        SourceConfig::Html(c) => Box::new(HtmlTableSource::new(c.clone(), client)),
        SourceConfig::Grid(c) => Box::new(GridSource::new(c.clone(), client)),
        SourceConfig::Json(c) => Box::new(JsonApiSource::new(c.clone(), client)),
        SourceConfig::Csv(c) => Box::new(CsvExportSource::new(c.clone(), client)),
    }
}

/// Download a source body, tagging failures with the source name.
async fn fetch_body(client: &reqwest::Client, name: &str, url: &str) -> Result<String> {
    log::debug!("Fetching {name} from {url}");
    fetch_text(client, url)
        .await
        .map_err(|e| AppError::source_unavailable(name, e))
}

/// Log how many rows a source had to drop.
fn report_skipped(name: &str, kept: usize, skipped: usize) {
    if skipped > 0 {
        log::debug!("{name}: kept {kept} rows, skipped {skipped} malformed rows");
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Resolve a scraped link against the source URL, dropping blank values.
fn resolve_link(base_url: &Url, href: Option<String>) -> Option<String> {
    href.map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .map(|h| resolve_url(base_url, &h))
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>()
}
