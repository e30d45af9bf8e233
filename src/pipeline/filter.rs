//! Per-posting accept/skip decision.
//!
//! Order matters: the dedup check comes first, then relevance, and only
//! relevant postings are recorded, so irrelevant rows never grow the store.

use chrono::{DateTime, Local};

use crate::models::{IdentifierPolicy, Posting, PostingId, RunReport, SeenRecord};
use crate::services::{CompanyMatcher, CompanyRule};
use crate::storage::SeenSet;

/// Outcome for one scraped posting.
#[derive(Debug)]
pub enum Decision<'a> {
    /// Identifier already in the store
    Duplicate,
    /// Company matches no rule
    Irrelevant,
    /// New posting for a tracked company
    Accept(&'a CompanyRule),
}

/// Decide what to do with `posting` without touching the store.
pub fn decide<'a>(
    id: &PostingId,
    posting: &Posting,
    seen: &SeenSet,
    matcher: &'a CompanyMatcher,
) -> Decision<'a> {
    if seen.has(id) {
        return Decision::Duplicate;
    }
    match matcher.find(&posting.company) {
        Some(rule) => Decision::Accept(rule),
        None => Decision::Irrelevant,
    }
}

/// A posting that passed both checks and was recorded.
#[derive(Debug, Clone)]
pub struct Accepted {
    pub id: PostingId,
    pub posting: Posting,
    pub tier: String,
}

/// Run every posting through [`decide`], recording accepted ones in `seen`.
///
/// Recording happens before the next posting is judged, so the same
/// posting listed twice in one fetch is accepted once.
pub fn filter_new(
    postings: Vec<Posting>,
    seen: &mut SeenSet,
    matcher: &CompanyMatcher,
    policy: IdentifierPolicy,
    now: DateTime<Local>,
    report: &mut RunReport,
) -> Vec<Accepted> {
    let mut accepted = Vec::new();

    for posting in postings {
        let id = posting.identifier(policy);
        let tier = match decide(&id, &posting, seen, matcher) {
            Decision::Duplicate => {
                report.duplicates += 1;
                continue;
            }
            Decision::Irrelevant => {
                report.irrelevant += 1;
                continue;
            }
            Decision::Accept(rule) => {
                log::debug!(
                    "Matched company: {} -> rule '{}'",
                    posting.company,
                    rule.name
                );
                rule.tier.clone()
            }
        };

        seen.record(id.clone(), SeenRecord::new(&posting, &id, now));
        accepted.push(Accepted { id, posting, tier });
    }

    accepted
}
