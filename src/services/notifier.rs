// src/services/notifier.rs

//! Notification delivery.
//!
//! Delivery is best effort: callers log failures and move on.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::NotifierConfig;

/// A destination for notification messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one plain-text message.
    async fn notify(&self, message: &str) -> Result<()>;
}

/// Build the notifier described by `config`.
///
/// Missing credentials give a [`DisabledNotifier`] instead of an error.
pub fn build_notifier(config: &NotifierConfig) -> Result<Box<dyn Notifier>> {
    match (config.token.as_deref(), config.chat_id.as_deref()) {
        (Some(token), Some(chat_id)) if config.is_configured() => {
            Ok(Box::new(TelegramNotifier::new(config, token, chat_id)?))
        }
        _ => {
            log::warn!("Telegram not configured, notifications will only be logged");
            Ok(Box::new(DisabledNotifier))
        }
    }
}

/// Sends messages through the Telegram Bot API.
pub struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: String,
    chat_id: String,
    disable_web_page_preview: bool,
}

impl TelegramNotifier {
    pub fn new(config: &NotifierConfig, token: &str, chat_id: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                config.api_base.trim_end_matches('/'),
                token.trim()
            ),
            chat_id: chat_id.trim().to_string(),
            disable_web_page_preview: config.disable_web_page_preview,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        let preview = if self.disable_web_page_preview {
            "true"
        } else {
            "false"
        };
        let form = [
            ("chat_id", self.chat_id.as_str()),
            ("text", message),
            ("disable_web_page_preview", preview),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::notify_failed(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::notify_failed(format!(
                "Telegram returned {status}: {}",
                body.trim()
            )));
        }

        log::debug!("Telegram message sent");
        Ok(())
    }
}

/// Stand-in used when delivery is not configured.
///
/// Every call reports a failure so the run summary shows nothing was sent.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        log::info!("(not sent) {}", message.replace('\n', " | "));
        Err(AppError::notify_failed("notifier not configured"))
    }
}
