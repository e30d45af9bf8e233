// src/pipeline/validate.rs

use std::path::Path;

use crate::error::Result;
use crate::models::Config;
use crate::services::CompanyMatcher;
use crate::utils::log::{header, summary};

/// Counts reported by a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSummary {
    pub sources: usize,
    pub rules: usize,
}

/// Validate configuration and the company list.
///
/// Unlike a run, a missing or unreadable company list is an error here.
pub async fn run_validate(config: &Config, base_path: &Path) -> Result<ValidationSummary> {
    header("Validating configuration");

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {e}");
        return Err(e);
    }

    let companies = config.companies_path(base_path);
    let matcher = match CompanyMatcher::load(&companies).await {
        Ok(matcher) => matcher,
        Err(e) => {
            log::error!("Company list invalid: {e}");
            return Err(e);
        }
    };
    if matcher.is_empty() {
        log::warn!("{} contains no rules", companies.display());
    }

    let result = ValidationSummary {
        sources: config.sources.len(),
        rules: matcher.len(),
    };
    let mut items = vec![
        ("Sources", result.sources.to_string()),
        ("Company rules", result.rules.to_string()),
        ("Identifier", format!("{:?}", config.store.identifier)),
        ("Notifier configured", config.notifier.is_configured().to_string()),
    ];
    for source in &config.sources {
        items.push(("Source", format!("{} ({})", source.name(), source.url())));
    }
    summary("Validation passed", &items);

    Ok(result)
}
