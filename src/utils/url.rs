// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Resolve a potentially relative URL against a base URL.
///
/// Falls back to the raw `href` when it cannot be joined.
pub fn resolve_url(base: &Url, href: &str) -> String {
    match base.join(href) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Parse an absolute `http`/`https` URL.
pub fn parse_web_url(link: &str) -> Option<Url> {
    let parsed = Url::parse(link.trim()).ok()?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Some(parsed),
        _ => None,
    }
}

/// Whether `link` is an absolute web URL.
pub fn is_well_formed(link: &str) -> bool {
    parse_web_url(link).is_some()
}

/// Query parameters that only track where a click came from.
const TRACKING_PARAMS: &[&str] = &["ref", "src", "source", "fbclid", "gclid"];

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}

/// Drop the fragment and tracking parameters so the same posting shared
/// through different channels keeps one identifier.
///
/// Other query parameters are kept: many boards identify the posting
/// itself in the query (`?gh_jid=`, `?token=`, `?id=`).
///
/// # Examples
/// ```
/// use jobwatch::utils::url::normalize_link;
///
/// assert_eq!(
///     normalize_link("https://jobs.example.com/p/42?utm_source=feed#apply"),
///     "https://jobs.example.com/p/42"
/// );
/// assert_eq!(
///     normalize_link("https://jobs.example.com/apply?gh_jid=7&ref=mail"),
///     "https://jobs.example.com/apply?gh_jid=7"
/// );
/// ```
pub fn normalize_link(link: &str) -> String {
    let Some(mut url) = parse_web_url(link) else {
        return link.trim().to_string();
    };
    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_path() {
        let base = Url::parse("https://example.com/jobs/").unwrap();
        assert_eq!(
            resolve_url(&base, "view/7"),
            "https://example.com/jobs/view/7"
        );
        assert_eq!(resolve_url(&base, "/root"), "https://example.com/root");
    }

    #[test]
    fn test_resolve_absolute_url() {
        let base = Url::parse("https://example.com/jobs/").unwrap();
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_normalize_strips_tracking_query() {
        assert_eq!(
            normalize_link("https://x.io/job/1?ref=abc"),
            "https://x.io/job/1"
        );
        assert_eq!(
            normalize_link("https://x.io/job/1?UTM_Campaign=fall&fbclid=zz#top"),
            "https://x.io/job/1"
        );
    }

    #[test]
    fn test_normalize_keeps_identifying_query() {
        assert_eq!(
            normalize_link("https://x.io/embed/job_app?for=acme&utm_source=li&token=111"),
            "https://x.io/embed/job_app?for=acme&token=111"
        );
    }

    #[test]
    fn test_normalize_keeps_port_and_path() {
        assert_eq!(
            normalize_link("http://x.io:8080/a/b/?gclid=1"),
            "http://x.io:8080/a/b/"
        );
    }

    #[test]
    fn test_normalize_leaves_garbage_untouched() {
        assert_eq!(normalize_link("  not a url "), "not a url");
        assert_eq!(normalize_link("mailto:hr@x.io"), "mailto:hr@x.io");
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed("https://x/1"));
        assert!(!is_well_formed("/relative/path"));
        assert!(!is_well_formed("No link available"));
        assert!(!is_well_formed("ftp://files.example.com/a"));
    }
}
