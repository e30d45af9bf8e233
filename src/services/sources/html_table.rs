//! Static HTML listing parsed with CSS selectors.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{SourceAdapter, element_text, fetch_body, parse_selector, report_skipped};
use crate::error::{AppError, Result};
use crate::models::{HtmlSourceConfig, Posting};
use crate::utils::url::resolve_url;

/// Adapter for table-style job boards.
pub struct HtmlTableSource {
    config: HtmlSourceConfig,
    client: reqwest::Client,
}

impl HtmlTableSource {
    pub fn new(config: HtmlSourceConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl SourceAdapter for HtmlTableSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch(&self) -> Result<Vec<Posting>> {
        let body = fetch_body(&self.client, &self.config.name, &self.config.url).await?;
        parse_table(&body, &self.config)
            .map_err(|e| AppError::source_unavailable(&self.config.name, e))
    }
}

struct RowSelectors {
    position: Selector,
    company: Selector,
    link: Option<Selector>,
    location: Option<Selector>,
    model: Option<Selector>,
    date: Option<Selector>,
}

/// Parse postings out of a listing page.
pub fn parse_table(html: &str, config: &HtmlSourceConfig) -> Result<Vec<Posting>> {
    let document = Html::parse_document(html);
    let optional = |s: &Option<String>| s.as_deref().map(parse_selector).transpose();

    let row_sel = parse_selector(&config.row_selector)?;
    let selectors = RowSelectors {
        position: parse_selector(&config.position_selector)?,
        company: parse_selector(&config.company_selector)?,
        link: optional(&config.link_selector)?,
        location: optional(&config.location_selector)?,
        model: optional(&config.model_selector)?,
        date: optional(&config.date_selector)?,
    };
    let base_url = Url::parse(&config.url)?;

    let mut postings = Vec::new();
    let mut skipped = 0;
    for row in document.select(&row_sel) {
        match parse_row(&row, &selectors, &config.link_attr, &base_url) {
            Some(posting) => postings.push(posting),
            None => skipped += 1,
        }
    }

    report_skipped(&config.name, postings.len(), skipped);
    Ok(postings)
}

fn parse_row(
    row: &ElementRef,
    selectors: &RowSelectors,
    link_attr: &str,
    base_url: &Url,
) -> Option<Posting> {
    let position_elem = row.select(&selectors.position).next()?;
    let company_elem = row.select(&selectors.company).next()?;
    let posting = Posting::from_raw(&element_text(&position_elem), &element_text(&company_elem))?;

    let text_of = |sel: &Option<Selector>| {
        sel.as_ref()
            .and_then(|s| row.select(s).next())
            .map(|el| element_text(&el))
    };

    let link_elem = match &selectors.link {
        Some(sel) => row.select(sel).next(),
        None => Some(position_elem),
    };
    let link = link_elem
        .and_then(|el| el.value().attr(link_attr))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| resolve_url(base_url, href));

    Some(
        posting
            .with_link(link)
            .with_location(text_of(&selectors.location))
            .with_model(text_of(&selectors.model))
            .with_date(text_of(&selectors.date)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HtmlSourceConfig {
        HtmlSourceConfig {
            name: "board".into(),
            url: "https://jobs.example.com/list".into(),
            row_selector: "table.jobs tr.job".into(),
            position_selector: "td.role a".into(),
            company_selector: "td.company".into(),
            link_selector: None,
            link_attr: "href".into(),
            location_selector: Some("td.location".into()),
            model_selector: None,
            date_selector: Some("td.date".into()),
        }
    }

    const PAGE: &str = r#"
        <table class="jobs">
          <tr class="header"><th>Role</th><th>Company</th></tr>
          <tr class="job">
            <td class="role"><a href="/p/1?src=list">SWE Intern</a></td>
            <td class="company">Acme Inc</td>
            <td class="location">Remote</td>
            <td class="date">Oct 18</td>
          </tr>
          <tr class="job">
            <td class="role"><a href="/p/2">Broken row</a></td>
          </tr>
          <tr class="job">
            <td class="role"><a href="https://other.example.com/3">Data Analyst</a></td>
            <td class="company">  Initech
            </td>
          </tr>
        </table>
    "#;

    #[test]
    fn test_parse_rows_and_skip_malformed() {
        let postings = parse_table(PAGE, &config()).unwrap();
        assert_eq!(postings.len(), 2);

        let first = &postings[0];
        assert_eq!(first.position, "SWE Intern");
        assert_eq!(first.company, "Acme Inc");
        assert_eq!(
            first.link.as_deref(),
            Some("https://jobs.example.com/p/1?src=list")
        );
        assert_eq!(first.location.as_deref(), Some("Remote"));
        assert_eq!(first.date.as_deref(), Some("Oct 18"));

        let second = &postings[1];
        assert_eq!(second.company, "Initech");
        assert_eq!(second.link.as_deref(), Some("https://other.example.com/3"));
        assert!(second.location.is_none());
    }

    #[test]
    fn test_invalid_selector_fails_whole_source() {
        let mut config = config();
        config.row_selector = "[[bad".into();
        assert!(parse_table(PAGE, &config).is_err());
    }

    #[test]
    fn test_no_rows() {
        let postings = parse_table("<html><body></body></html>", &config()).unwrap();
        assert!(postings.is_empty());
    }
}
