//! CSV export of a shared spreadsheet.

use async_trait::async_trait;
use csv::{ReaderBuilder, StringRecord};
use url::Url;

use super::{SourceAdapter, fetch_body, report_skipped, resolve_link};
use crate::error::{AppError, Result};
use crate::models::{CsvSourceConfig, Posting};

/// Adapter for CSV exports.
pub struct CsvExportSource {
    config: CsvSourceConfig,
    client: reqwest::Client,
}

impl CsvExportSource {
    pub fn new(config: CsvSourceConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl SourceAdapter for CsvExportSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch(&self) -> Result<Vec<Posting>> {
        let body = fetch_body(&self.client, &self.config.name, &self.config.url).await?;
        parse_csv(&body, &self.config)
            .map_err(|e| AppError::source_unavailable(&self.config.name, e))
    }
}

struct Columns {
    position: usize,
    company: usize,
    link: Option<usize>,
    location: Option<usize>,
    model: Option<usize>,
    date: Option<usize>,
}

/// Parse postings out of CSV text with a header row.
pub fn parse_csv(body: &str, config: &CsvSourceConfig) -> Result<Vec<Posting>> {
    let delimiter = u8::try_from(config.delimiter).map_err(|_| {
        AppError::validation(format!("delimiter {:?} is not ASCII", config.delimiter))
    })?;
    let base_url = Url::parse(&config.url)?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader.headers()?.clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
    };
    let require = |name: &str| {
        find(name).ok_or_else(|| AppError::validation(format!("missing CSV column '{name}'")))
    };
    let optional = |name: &Option<String>| name.as_deref().and_then(|n| find(n));

    let columns = Columns {
        position: require(&config.position)?,
        company: require(&config.company)?,
        link: optional(&config.link),
        location: optional(&config.location),
        model: optional(&config.model),
        date: optional(&config.date),
    };

    let mut postings = Vec::new();
    let mut skipped = 0;
    for record in reader.records() {
        let posting = record
            .ok()
            .and_then(|r| parse_record(&r, &columns, &base_url));
        match posting {
            Some(posting) => postings.push(posting),
            None => skipped += 1,
        }
    }

    report_skipped(&config.name, postings.len(), skipped);
    Ok(postings)
}

fn parse_record(record: &StringRecord, columns: &Columns, base_url: &Url) -> Option<Posting> {
    let field = |index: Option<usize>| index.and_then(|i| record.get(i)).map(str::to_string);

    Some(
        Posting::from_raw(record.get(columns.position)?, record.get(columns.company)?)?
            .with_link(resolve_link(base_url, field(columns.link)))
            .with_location(field(columns.location))
            .with_model(field(columns.model))
            .with_date(field(columns.date)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CsvSourceConfig {
        CsvSourceConfig {
            name: "sheet".into(),
            url: "https://docs.example.com/export?format=csv".into(),
            delimiter: ',',
            position: "Position".into(),
            company: "Company".into(),
            link: Some("Link".into()),
            location: Some("Location".into()),
            model: Some("Season".into()),
            date: None,
        }
    }

    #[test]
    fn test_parse_with_quotes_and_short_rows() {
        let body = "Position,Company,Link,Location\n\
                    \"SWE Intern, Backend\",Acme Inc,https://x/1,\"New York, NY\"\n\
                    Broken\n\
                    Analyst,Initech,,\n";

        let postings = parse_csv(body, &config()).unwrap();
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].position, "SWE Intern, Backend");
        assert_eq!(postings[0].location.as_deref(), Some("New York, NY"));
        assert!(postings[0].model.is_none());
        assert!(postings[1].link.is_none());
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let body = "position ,COMPANY\nSWE,Acme\n";
        assert_eq!(parse_csv(body, &config()).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_required_column_fails() {
        let body = "Role,Company\nSWE,Acme\n";
        assert!(parse_csv(body, &config()).is_err());
    }

    #[test]
    fn test_relative_links_resolve_against_source() {
        let body = "Position,Company,Link\nSWE,Acme,/jobs/7\n";
        let postings = parse_csv(body, &config()).unwrap();
        assert_eq!(
            postings[0].link.as_deref(),
            Some("https://docs.example.com/jobs/7")
        );
    }

    #[test]
    fn test_tab_delimiter() {
        let mut config = config();
        config.delimiter = '\t';
        let body = "Position\tCompany\nSWE\tAcme\n";
        assert_eq!(parse_csv(body, &config).unwrap()[0].company, "Acme");
    }
}
