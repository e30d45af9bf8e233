//! JSON API listing.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::{SourceAdapter, fetch_body, report_skipped, resolve_link};
use crate::error::{AppError, Result};
use crate::models::{JsonSourceConfig, Posting};

/// Adapter for JSON job APIs.
pub struct JsonApiSource {
    config: JsonSourceConfig,
    client: reqwest::Client,
}

impl JsonApiSource {
    pub fn new(config: JsonSourceConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl SourceAdapter for JsonApiSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch(&self) -> Result<Vec<Posting>> {
        let body = fetch_body(&self.client, &self.config.name, &self.config.url).await?;
        parse_json(&body, &self.config)
            .map_err(|e| AppError::source_unavailable(&self.config.name, e))
    }
}

/// Parse postings out of an API response body.
pub fn parse_json(body: &str, config: &JsonSourceConfig) -> Result<Vec<Posting>> {
    let base_url = Url::parse(&config.url)?;
    let document: Value = serde_json::from_str(body)?;
    let items = if config.items.is_empty() {
        Some(&document)
    } else {
        document.pointer(&config.items)
    }
    .and_then(Value::as_array)
    .ok_or_else(|| {
        AppError::validation(format!("'{}' does not point to an array", config.items))
    })?;

    let mut postings = Vec::new();
    let mut skipped = 0;
    for item in items {
        match parse_item(item, config, &base_url) {
            Some(posting) => postings.push(posting),
            None => skipped += 1,
        }
    }

    report_skipped(&config.name, postings.len(), skipped);
    Ok(postings)
}

fn parse_item(item: &Value, config: &JsonSourceConfig, base_url: &Url) -> Option<Posting> {
    let field = |pointer: Option<&str>| pointer.and_then(|p| text_at(item, p));

    let position = field(Some(config.position.as_str()))?;
    let company = field(Some(config.company.as_str()))?;

    Some(
        Posting::from_raw(&position, &company)?
            .with_link(resolve_link(base_url, field(config.link.as_deref())))
            .with_location(field(config.location.as_deref()))
            .with_model(field(config.model.as_deref()))
            .with_date(field(config.date.as_deref())),
    )
}

/// Scalar at `pointer` rendered as text.
fn text_at(item: &Value, pointer: &str) -> Option<String> {
    match item.pointer(pointer)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JsonSourceConfig {
        JsonSourceConfig {
            name: "api".into(),
            url: "https://api.example.com/jobs".into(),
            items: "/data/jobs".into(),
            position: "/title".into(),
            company: "/company/name".into(),
            link: Some("/url".into()),
            location: Some("/location/name".into()),
            model: None,
            date: Some("/posted".into()),
        }
    }

    #[test]
    fn test_parse_nested_items() {
        let body = r#"{
            "data": {"jobs": [
                {"title": "SWE Intern", "company": {"name": "Acme Inc"},
                 "url": "https://x/1", "location": {"name": "NYC"}, "posted": 20261018},
                {"title": "No company"},
                {"title": "Analyst", "company": {"name": "Initech"}, "url": null}
            ]}
        }"#;

        let postings = parse_json(body, &config()).unwrap();
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].link.as_deref(), Some("https://x/1"));
        assert_eq!(postings[0].location.as_deref(), Some("NYC"));
        assert_eq!(postings[0].date.as_deref(), Some("20261018"));
        assert_eq!(postings[1].company, "Initech");
        assert!(postings[1].link.is_none());
    }

    #[test]
    fn test_root_array() {
        let mut config = config();
        config.items = String::new();
        let body = r#"[{"title": "SWE", "company": {"name": "Acme"}}]"#;
        assert_eq!(parse_json(body, &config).unwrap().len(), 1);
    }

    #[test]
    fn test_relative_links_resolve_against_source() {
        let body = r#"{"data": {"jobs": [
            {"title": "SWE", "company": {"name": "Acme"}, "url": "/careers/42?gh_jid=42"},
            {"title": "PM", "company": {"name": "Acme"}, "url": "  "}
        ]}}"#;

        let postings = parse_json(body, &config()).unwrap();
        assert_eq!(
            postings[0].link.as_deref(),
            Some("https://api.example.com/careers/42?gh_jid=42")
        );
        assert!(postings[1].link.is_none());
    }

    #[test]
    fn test_items_not_array_fails() {
        assert!(parse_json(r#"{"data": {"jobs": {}}}"#, &config()).is_err());
        assert!(parse_json("<html>", &config()).is_err());
    }
}
