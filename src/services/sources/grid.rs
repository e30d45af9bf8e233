//! Spreadsheet embed rendered as a grid of cells.
//!
//! Two layouts are supported. With `row_attr` set, each cell carries its
//! row and column index as attributes (`data-rowindex`, `data-columnindex`).
//! Without it, cells appear in document order and every `columns` cells
//! form one row.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{SourceAdapter, element_text, fetch_body, parse_selector, report_skipped};
use crate::error::{AppError, Result};
use crate::models::{GridSourceConfig, Posting};
use crate::utils::url::{is_well_formed, resolve_url};

/// Adapter for spreadsheet embeds.
pub struct GridSource {
    config: GridSourceConfig,
    client: reqwest::Client,
}

impl GridSource {
    pub fn new(config: GridSourceConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl SourceAdapter for GridSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch(&self) -> Result<Vec<Posting>> {
        let body = fetch_body(&self.client, &self.config.name, &self.config.url).await?;
        parse_grid(&body, &self.config)
            .map_err(|e| AppError::source_unavailable(&self.config.name, e))
    }
}

#[derive(Debug, Default)]
struct Cell {
    text: String,
    href: Option<String>,
}

type Row = HashMap<usize, Cell>;

/// Parse postings out of a rendered grid.
pub fn parse_grid(html: &str, config: &GridSourceConfig) -> Result<Vec<Posting>> {
    let document = Html::parse_document(html);
    let cell_sel = parse_selector(&config.cell_selector)?;
    let anchor_sel = parse_selector("a[href]")?;
    let base_url = Url::parse(&config.url)?;

    let cells = document.select(&cell_sel);
    let rows: Vec<Row> = match &config.row_attr {
        Some(row_attr) => {
            let mut by_row: BTreeMap<usize, Row> = BTreeMap::new();
            for element in cells {
                let row = attr_index(&element, row_attr);
                let column = attr_index(&element, &config.column_attr);
                if let (Some(row), Some(column)) = (row, column) {
                    by_row
                        .entry(row)
                        .or_default()
                        .insert(column, read_cell(&element, &anchor_sel));
                }
            }
            by_row.into_values().collect()
        }
        None => {
            let cells: Vec<Cell> = cells.map(|el| read_cell(&el, &anchor_sel)).collect();
            let mut rows = Vec::with_capacity(cells.len() / config.columns.max(1));
            let mut current = Row::new();
            for (i, cell) in cells.into_iter().enumerate() {
                current.insert(i % config.columns.max(1), cell);
                if current.len() == config.columns.max(1) {
                    rows.push(std::mem::take(&mut current));
                }
            }
            if !current.is_empty() {
                // Incomplete trailing row; kept so parse_row can judge it.
                rows.push(current);
            }
            rows
        }
    };

    let mut postings = Vec::new();
    let mut skipped = 0;
    for row in &rows {
        match parse_row(row, config, &base_url) {
            Some(posting) => postings.push(posting),
            None => skipped += 1,
        }
    }

    report_skipped(&config.name, postings.len(), skipped);
    Ok(postings)
}

fn attr_index(element: &ElementRef, attr: &str) -> Option<usize> {
    element.value().attr(attr)?.trim().parse().ok()
}

fn read_cell(element: &ElementRef, anchor_sel: &Selector) -> Cell {
    Cell {
        text: element_text(element),
        href: element
            .select(anchor_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string),
    }
}

fn parse_row(row: &Row, config: &GridSourceConfig, base_url: &Url) -> Option<Posting> {
    let text = |column: Option<usize>| column.and_then(|c| row.get(&c)).map(|c| c.text.clone());

    let position = text(Some(config.position_column))?;
    let company = text(Some(config.company_column))?;
    let posting = Posting::from_raw(&position, &company)?;

    let link = match config.link_column.and_then(|c| row.get(&c)) {
        Some(cell) => cell.href.clone().or_else(|| {
            let text = cell.text.trim();
            is_well_formed(text).then(|| text.to_string())
        }),
        None => row
            .iter()
            .collect::<BTreeMap<_, _>>()
            .into_values()
            .find_map(|cell| cell.href.clone()),
    };
    let link = link.map(|href| resolve_url(base_url, href.trim()));

    Some(
        posting
            .with_link(link)
            .with_location(text(config.location_column))
            .with_model(text(config.model_column))
            .with_date(text(config.date_column)),
    )
}
