// src/services/matcher.rs

//! Company matcher.
//!
//! Rules come from a plain-text list, one `name|tier` per line:
//!
//! ```text
//! # name|tier
//! acme|Tier 1
//! initech|Tier 2
//! ```
//!
//! Rules are tried in file order and the first one whose name occurs in the
//! company text as a whole word wins, so ordering in the file matters.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::clean_text;

/// A company name and its tier label.
#[derive(Debug, Clone)]
pub struct CompanyRule {
    /// Lower-cased company name
    pub name: String,
    pub tier: String,
    pattern: Regex,
}

impl CompanyRule {
    fn new(name: &str, tier: &str) -> Option<Self> {
        let name = clean_text(name).to_lowercase();
        if name.is_empty() {
            return None;
        }
        // No word character may touch the name on either side.
        let expr = format!(r"(?:^|\W){}(?:\W|$)", regex::escape(&name));
        match Regex::new(&expr) {
            Ok(pattern) => Some(Self {
                name,
                tier: tier.trim().to_string(),
                pattern,
            }),
            Err(e) => {
                log::warn!("Skipping company rule '{}': {}", name, e);
                None
            }
        }
    }

    fn matches(&self, company_lower: &str) -> bool {
        self.pattern.is_match(company_lower)
    }
}

/// Ordered set of company rules.
#[derive(Debug, Clone, Default)]
pub struct CompanyMatcher {
    rules: Vec<CompanyRule>,
}

impl CompanyMatcher {
    /// Parse rules from file content.
    ///
    /// Blank lines, `#` comments, lines without `|` and lines with an empty
    /// name are skipped. A repeated name keeps its first position and takes
    /// the tier of its last occurrence.
    pub fn parse(content: &str) -> Self {
        let mut rules: Vec<CompanyRule> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, tier)) = line.split_once('|') else {
                log::debug!("Skipping malformed company line: {line}");
                continue;
            };
            let Some(rule) = CompanyRule::new(name, tier) else {
                continue;
            };

            match index.get(&rule.name) {
                Some(&i) => rules[i].tier = rule.tier,
                None => {
                    index.insert(rule.name.clone(), rules.len());
                    rules.push(rule);
                }
            }
        }

        Self { rules }
    }

    /// Load rules from a file.
    ///
    /// A missing file is `ConfigMissing`; an unreadable one is `StoreCorrupt`.
    pub async fn load(path: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::config_missing(path)),
            Err(e) => Err(AppError::store_corrupt(path, e)),
        }
    }

    /// Load rules, treating any failure as an empty rule set.
    ///
    /// With no rules nothing matches, so nothing is notified.
    pub async fn load_or_empty(path: &Path) -> Self {
        match Self::load(path).await {
            Ok(matcher) => {
                log::info!(
                    "Loaded {} companies from {}",
                    matcher.len(),
                    path.display()
                );
                matcher
            }
            Err(e) => {
                log::warn!("{e}. No company will match this run.");
                Self::default()
            }
        }
    }

    /// First rule, in file order, whose name is a whole word of `company`.
    pub fn find(&self, company: &str) -> Option<&CompanyRule> {
        let company_lower = company.to_lowercase();
        self.rules.iter().find(|rule| rule.matches(&company_lower))
    }

    pub fn rules(&self) -> &[CompanyRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
