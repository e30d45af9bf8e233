//! Listing source definitions.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// One configured listing source, tagged by `kind` in TOML.
///
/// ```toml
/// [[sources]]
/// kind = "json"
/// name = "greenhouse"
/// url = "https://boards-api.greenhouse.io/v1/boards/acme/jobs"
/// items = "/jobs"
/// position = "/title"
/// company = "/company/name"
/// link = "/absolute_url"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Html(HtmlSourceConfig),
    Grid(GridSourceConfig),
    Json(JsonSourceConfig),
    Csv(CsvSourceConfig),
}

impl SourceConfig {
    pub fn name(&self) -> &str {
        match self {
            Self::Html(c) => &c.name,
            Self::Grid(c) => &c.name,
            Self::Json(c) => &c.name,
            Self::Csv(c) => &c.name,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Html(c) => &c.url,
            Self::Grid(c) => &c.url,
            Self::Json(c) => &c.url,
            Self::Csv(c) => &c.url,
        }
    }

    /// Check that the source can be built.
    pub fn validate(&self) -> Result<()> {
        let name = self.name();
        if name.trim().is_empty() {
            return Err(AppError::validation("source name is empty"));
        }
        url::Url::parse(self.url())
            .map_err(|e| AppError::validation(format!("source '{name}': invalid url: {e}")))?;

        let required: Vec<(&str, &str)> = match self {
            Self::Html(c) => vec![
                ("row_selector", c.row_selector.as_str()),
                ("position_selector", c.position_selector.as_str()),
                ("company_selector", c.company_selector.as_str()),
            ],
            Self::Grid(c) => {
                if c.row_attr.is_none() && c.columns == 0 {
                    return Err(AppError::validation(format!(
                        "source '{name}': columns must be > 0 without row_attr"
                    )));
                }
                vec![("cell_selector", c.cell_selector.as_str())]
            }
            Self::Json(c) => vec![
                ("position", c.position.as_str()),
                ("company", c.company.as_str()),
            ],
            Self::Csv(c) => vec![
                ("position", c.position.as_str()),
                ("company", c.company.as_str()),
            ],
        };

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "source '{name}': {field} is empty"
                )));
            }
        }
        Ok(())
    }
}

/// Static HTML table parsed with CSS selectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtmlSourceConfig {
    pub name: String,
    pub url: String,

    /// CSS selector for one listing row
    pub row_selector: String,

    /// Selectors below are evaluated inside a row
    pub position_selector: String,
    pub company_selector: String,

    /// Element carrying the link; defaults to the position element
    #[serde(default)]
    pub link_selector: Option<String>,

    #[serde(default = "defaults::link_attr")]
    pub link_attr: String,

    #[serde(default)]
    pub location_selector: Option<String>,
    #[serde(default)]
    pub model_selector: Option<String>,
    #[serde(default)]
    pub date_selector: Option<String>,
}

/// Spreadsheet embed rendered as a flat list of grid cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSourceConfig {
    pub name: String,
    pub url: String,

    #[serde(default = "defaults::cell_selector")]
    pub cell_selector: String,

    /// Attribute holding the row index of a cell. When absent, cells are
    /// chunked in document order into rows of `columns` cells.
    #[serde(default)]
    pub row_attr: Option<String>,

    #[serde(default = "defaults::column_attr")]
    pub column_attr: String,

    #[serde(default = "defaults::columns")]
    pub columns: usize,

    #[serde(default)]
    pub position_column: usize,
    #[serde(default = "defaults::company_column")]
    pub company_column: usize,
    #[serde(default = "defaults::link_column")]
    pub link_column: Option<usize>,
    #[serde(default = "defaults::location_column")]
    pub location_column: Option<usize>,
    #[serde(default = "defaults::model_column")]
    pub model_column: Option<usize>,
    #[serde(default = "defaults::date_column")]
    pub date_column: Option<usize>,
}

/// JSON API; fields are JSON pointers (RFC 6901) relative to one item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSourceConfig {
    pub name: String,
    pub url: String,

    /// Pointer to the array of items; empty means the document is the array
    #[serde(default)]
    pub items: String,

    pub position: String,
    pub company: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// CSV export with a header row; fields are header names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvSourceConfig {
    pub name: String,
    pub url: String,

    #[serde(default = "defaults::delimiter")]
    pub delimiter: char,

    pub position: String,
    pub company: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

mod defaults {
    pub fn link_attr() -> String {
        "href".into()
    }

    // Airtable embed layout: Position, Date, Link, Model, Location, Company
    pub fn cell_selector() -> String {
        "div[data-testid^='gridCell-']".into()
    }
    pub fn column_attr() -> String {
        "data-columnindex".into()
    }
    pub fn columns() -> usize {
        6
    }
    pub fn company_column() -> usize {
        5
    }
    pub fn link_column() -> Option<usize> {
        Some(2)
    }
    pub fn location_column() -> Option<usize> {
        Some(4)
    }
    pub fn model_column() -> Option<usize> {
        Some(3)
    }
    pub fn date_column() -> Option<usize> {
        Some(1)
    }

    pub fn delimiter() -> char {
        ','
    }
}
