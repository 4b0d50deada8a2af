//! Report delivery.
//!
//! `LineNotifier` pushes text messages through the LINE Messaging API;
//! `LogNotifier` writes the report to the log when LINE is not configured.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{AppError, Result};

const LINE_PUSH_URL: &str = "https://api.line.me/v2/bot/message/push";

/// LINE accepts 5000 characters per text message.
pub const MESSAGE_CHAR_LIMIT: usize = 4000;

/// Delivery seam for finished reports.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct PushMessage<'a> {
    to: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

/// Split `text` into chunks of at most `limit` characters.
///
/// Chunks break after a newline where possible; a single line longer than
/// `limit` is cut at the limit. Concatenating the chunks gives `text` back.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let len = line.chars().count();

        if current_len + len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if len <= limit {
            current.push_str(line);
            current_len += len;
            continue;
        }

        let chars: Vec<char> = line.chars().collect();
        for piece in chars.chunks(limit) {
            if piece.len() == limit {
                chunks.push(piece.iter().collect());
            } else {
                current = piece.iter().collect();
                current_len = piece.len();
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// LINE push-message notifier.
pub struct LineNotifier {
    client: Client,
    access_token: String,
    user_id: String,
}

impl LineNotifier {
    pub fn new(access_token: String, user_id: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            access_token,
            user_id,
        })
    }
}

#[async_trait]
impl Notifier for LineNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let chunks = split_message(text, MESSAGE_CHAR_LIMIT);
        let total = chunks.len();

        for (i, chunk) in chunks.iter().enumerate() {
            let body = PushMessage {
                to: &self.user_id,
                messages: vec![TextMessage { kind: "text", text: chunk }],
            };

            let response = self
                .client
                .post(LINE_PUSH_URL)
                .bearer_auth(&self.access_token)
                .json(&body)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let detail = response.text().await.unwrap_or_default();
                return Err(AppError::ExternalApi(format!("LINE push returned {}: {}", status, detail)));
            }

            info!("Sent LINE message part {}/{}", i + 1, total);
        }

        Ok(())
    }
}

/// Fallback notifier that logs the report.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        warn!("LINE is not configured; logging report instead");
        info!("Report:\n{}", text);
        Ok(())
    }
}
