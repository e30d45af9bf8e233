//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::SourceConfig;

/// Environment variable overriding `notifier.token`.
pub const TOKEN_ENV: &str = "TELEGRAM_TOKEN";

/// Environment variable overriding `notifier.chat_id`.
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// File locations, relative to the data directory
    #[serde(default)]
    pub paths: PathsConfig,

    /// Dedup store behavior
    #[serde(default)]
    pub store: StoreConfig,

    /// Audit log rotation
    #[serde(default)]
    pub audit: AuditConfig,

    /// HTTP client settings for sources
    #[serde(default)]
    pub http: HttpConfig,

    /// Notification delivery
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Message rendering
    #[serde(default)]
    pub message: MessageConfig,

    /// Listing sources, fetched in order
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Override notifier credentials from the environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(std::env::var(TOKEN_ENV).ok(), std::env::var(CHAT_ID_ENV).ok());
    }

    fn apply_overrides(&mut self, token: Option<String>, chat_id: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.notifier.token = Some(token);
        }
        if let Some(chat_id) = chat_id.filter(|c| !c.trim().is_empty()) {
            self.notifier.chat_id = Some(chat_id);
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.notifier.timeout_secs == 0 {
            return Err(AppError::validation("notifier.timeout_secs must be > 0"));
        }
        if self.message.template.trim().is_empty() {
            return Err(AppError::validation("message.template is empty"));
        }
        if self.sources.is_empty() {
            return Err(AppError::validation("No sources defined"));
        }
        for source in &self.sources {
            source.validate()?;
        }
        Ok(())
    }

    pub fn companies_path(&self, base: &Path) -> PathBuf {
        base.join(&self.paths.companies)
    }

    pub fn seen_path(&self, base: &Path) -> PathBuf {
        base.join(&self.paths.seen)
    }

    pub fn audit_log_path(&self, base: &Path) -> PathBuf {
        base.join(&self.paths.audit_log)
    }
}

/// File locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// `name|tier` company list
    #[serde(default = "defaults::companies")]
    pub companies: String,

    /// Dedup store (JSON)
    #[serde(default = "defaults::seen")]
    pub seen: String,

    /// Append-only audit log
    #[serde(default = "defaults::audit_log")]
    pub audit_log: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            companies: defaults::companies(),
            seen: defaults::seen(),
            audit_log: defaults::audit_log(),
        }
    }
}

/// How a posting is turned into its dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierPolicy {
    /// Raw link; composite when the posting has none
    Link,
    /// Link without tracking parameters or fragment; composite when absent
    NormalizedLink,
    /// `position@company`
    Composite,
    /// `position@company@normalized_link`
    CompositeWithLink,
    /// Normalized link when it is an absolute web URL, else composite
    #[default]
    Auto,
}

/// Dedup store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Clear the whole store when its file is older than this (0 disables)
    #[serde(default = "defaults::max_age_hours")]
    pub max_age_hours: u64,

    #[serde(default)]
    pub identifier: IdentifierPolicy,
}

impl StoreConfig {
    pub fn max_age(&self) -> Option<Duration> {
        hours(self.max_age_hours)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_age_hours: defaults::max_age_hours(),
            identifier: IdentifierPolicy::default(),
        }
    }
}

/// Audit log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Truncate the log when it is older than this (0 disables)
    #[serde(default = "defaults::max_age_hours")]
    pub rotate_after_hours: u64,
}

impl AuditConfig {
    pub fn rotate_after(&self) -> Option<Duration> {
        hours(self.rotate_after_hours)
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            rotate_after_hours: defaults::max_age_hours(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Telegram delivery settings. Delivery is disabled unless both
/// `token` and `chat_id` are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Bot token
    #[serde(default)]
    pub token: Option<String>,

    /// Destination chat
    #[serde(default)]
    pub chat_id: Option<String>,

    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    #[serde(default = "defaults::notify_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "defaults::disable_preview")]
    pub disable_web_page_preview: bool,
}

impl NotifierConfig {
    pub fn is_configured(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.token) && set(&self.chat_id)
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            token: None,
            chat_id: None,
            api_base: defaults::api_base(),
            timeout_secs: defaults::notify_timeout(),
            disable_web_page_preview: defaults::disable_preview(),
        }
    }
}

/// Notification message settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageConfig {
    /// See [`crate::models::Posting::format`] for placeholders
    #[serde(default = "defaults::template")]
    pub template: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            template: defaults::template(),
        }
    }
}

/// `value` hours; 0 and values too large to represent both mean "never".
fn hours(value: u64) -> Option<Duration> {
    value
        .checked_mul(3600)
        .filter(|_| value > 0)
        .map(Duration::from_secs)
}

mod defaults {
    // Path defaults
    pub fn companies() -> String {
        "companies.txt".into()
    }
    pub fn seen() -> String {
        "seen.json".into()
    }
    pub fn audit_log() -> String {
        "checked_jobs.log".into()
    }

    // Store / audit defaults
    pub fn max_age_hours() -> u64 {
        48
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; jobwatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Notifier defaults
    pub fn api_base() -> String {
        "https://api.telegram.org".into()
    }
    pub fn notify_timeout() -> u64 {
        10
    }
    pub fn disable_preview() -> bool {
        true
    }

    // Message defaults
    pub fn template() -> String {
        "[{tier}] {position} at {company}\n{link}".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JsonSourceConfig, SourceConfig};

    fn with_source() -> Config {
        let mut config = Config::default();
        config.sources.push(SourceConfig::Json(JsonSourceConfig {
            name: "api".into(),
            url: "https://api.example.com/jobs".into(),
            items: "/jobs".into(),
            position: "/title".into(),
            company: "/company".into(),
            link: Some("/url".into()),
            location: None,
            model: None,
            date: None,
        }));
        config
    }

    #[test]
    fn validate_config_with_source_ok() {
        assert!(with_source().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_sources() {
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = with_source();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn defaults_from_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.paths.seen, "seen.json");
        assert_eq!(config.store.max_age_hours, 48);
        assert_eq!(config.store.identifier, IdentifierPolicy::Auto);
        assert_eq!(config.store.max_age(), Some(Duration::from_secs(48 * 3600)));
        assert!(!config.notifier.is_configured());
    }

    #[test]
    fn zero_hours_disables_expiry() {
        let config: Config = toml::from_str(
            r#"
            [store]
            max_age_hours = 0
            identifier = "composite"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.max_age(), None);
        assert_eq!(config.store.identifier, IdentifierPolicy::Composite);
    }

    #[test]
    fn huge_hours_never_expire() {
        let store = StoreConfig {
            max_age_hours: u64::MAX,
            ..StoreConfig::default()
        };
        assert_eq!(store.max_age(), None);

        let audit = AuditConfig {
            rotate_after_hours: u64::MAX / 3600,
        };
        assert_eq!(
            audit.rotate_after(),
            Some(Duration::from_secs(u64::MAX / 3600 * 3600))
        );
    }

    #[test]
    fn overrides_fill_credentials() {
        let mut config = Config::default();
        config.apply_overrides(Some("123:abc".into()), Some(" ".into()));
        assert_eq!(config.notifier.token.as_deref(), Some("123:abc"));
        assert!(config.notifier.chat_id.is_none());
        assert!(!config.notifier.is_configured());

        config.apply_overrides(None, Some("42".into()));
        assert!(config.notifier.is_configured());
    }

    #[test]
    fn load_or_default_on_missing_file() {
        let config = Config::load_or_default("/definitely/not/here.toml");
        assert!(config.sources.is_empty());
    }
}
