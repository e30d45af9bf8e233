//! Posting data structure and identifier derivation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::IdentifierPolicy;
use crate::utils::url::{is_well_formed, normalize_link};

/// A job posting scraped from a source. Never persisted directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Posting {
    /// Position title
    pub position: String,

    /// Company as written by the source (may carry suffixes or team names)
    pub company: String,

    /// Link to the posting, if the source had one
    #[serde(default)]
    pub link: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    /// Work model or season (e.g. "Remote", "Summer 2026")
    #[serde(default)]
    pub model: Option<String>,

    /// Date as displayed by the source
    #[serde(default)]
    pub date: Option<String>,
}

impl Posting {
    /// Build a posting from raw cell text.
    ///
    /// Returns `None` when position or company is empty after whitespace
    /// normalization; such rows are treated as malformed.
    pub fn from_raw(position: &str, company: &str) -> Option<Self> {
        let position = clean_text(position);
        let company = clean_text(company);
        if position.is_empty() || company.is_empty() {
            return None;
        }
        Some(Self {
            position,
            company,
            ..Self::default()
        })
    }

    /// Attach an optional field, dropping empty values.
    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = non_empty(link);
        self
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = non_empty(location);
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = non_empty(model);
        self
    }

    pub fn with_date(mut self, date: Option<String>) -> Self {
        self.date = non_empty(date);
        self
    }

    /// Derive the dedup key for this posting under `policy`.
    ///
    /// Composite keys join the fields with `@`; an `@` inside a field is
    /// percent-encoded so different field splits never share a key.
    pub fn identifier(&self, policy: IdentifierPolicy) -> PostingId {
        let composite = || {
            format!(
                "{}@{}",
                escape_key_part(&self.position),
                escape_key_part(&self.company)
            )
        };
        let link = self.link.as_deref();

        let id = match policy {
            IdentifierPolicy::Link => match link {
                Some(link) => link.to_string(),
                None => composite(),
            },
            IdentifierPolicy::NormalizedLink => match link {
                Some(link) => normalize_link(link),
                None => composite(),
            },
            IdentifierPolicy::Composite => composite(),
            IdentifierPolicy::CompositeWithLink => match link {
                Some(link) => format!("{}@{}", composite(), normalize_link(link)),
                None => composite(),
            },
            IdentifierPolicy::Auto => match link {
                Some(link) if is_well_formed(link) => normalize_link(link),
                _ => composite(),
            },
        };
        PostingId(id)
    }

    /// Render the notification text from a template.
    ///
    /// Supported placeholders:
    /// - `{tier}`, `{position}`, `{company}`
    /// - `{link}`, `{location}`, `{model}`, `{date}`
    ///
    /// Missing optional fields render as an empty string, except `{link}`
    /// which renders as "No link available".
    pub fn format(&self, template: &str, tier: &str) -> String {
        template
            .replace("{tier}", tier)
            .replace("{position}", &self.position)
            .replace("{company}", &self.company)
            .replace("{link}", self.link.as_deref().unwrap_or("No link available"))
            .replace("{location}", self.location.as_deref().unwrap_or(""))
            .replace("{model}", self.model.as_deref().unwrap_or(""))
            .replace("{date}", self.date.as_deref().unwrap_or(""))
            .trim_end()
            .to_string()
    }
}

/// Stable key used to decide whether a posting was already notified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostingId(pub String);

impl PostingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PostingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PostingId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for PostingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collapse every whitespace run to one space and trim the ends.
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn escape_key_part(s: &str) -> String {
    s.replace('%', "%25").replace('@', "%40")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| clean_text(&v)).filter(|v| !v.is_empty())
}
