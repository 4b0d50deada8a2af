//! Analyst EPS estimates looked up through Gemini with Google Search grounding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};

const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Search-capable models, tried in order while one is out of quota.
const DEFAULT_MODELS: [&str; 2] = ["gemini-2.5-flash", "gemini-2.0-flash"];

/// Source of analyst EPS estimates for a symbol with fresh revenue.
#[async_trait]
pub trait EstimateSource: Send + Sync {
    /// Short estimate summary, `None` when nothing usable was found.
    async fn eps_estimate(&self, symbol: &str, name: &str) -> Option<String>;
}

/// Used when no Gemini key is configured.
pub struct NoEstimates;

#[async_trait]
impl EstimateSource for NoEstimates {
    async fn eps_estimate(&self, _symbol: &str, _name: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, `None` when blank.
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

fn estimate_prompt(symbol: &str, name: &str) -> String {
    format!(
        "Search the web for analyst EPS forecasts for Taiwan-listed stock {symbol} ({name}) \
         published within the last month. Give this year's and next year's EPS estimates in TWD.\n\
         Reply with figures only, one line per year, followed by the source:\n\
         <year> EPS: <value> (<raised|cut|unchanged>, when stated)\n\
         Source: [<publisher>](<url>)\n\
         If no clear figure is found reply exactly: No EPS estimates found"
    )
}

/// Gemini `generateContent` client with model fallback.
pub struct GeminiEstimates {
    client: Client,
    api_key: String,
    models: Vec<String>,
}

impl GeminiEstimates {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
        })
    }

    /// One model call; `Ok(None)` means the model is exhausted or gave no text.
    async fn generate(&self, model: &str, prompt: &str) -> Result<Option<String>> {
        let url = format!("{}/{}:generateContent", GEMINI_URL, model);
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "tools": [{ "google_search": {} }],
        });

        debug!("Requesting EPS estimate from {}", model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::ExternalApi(format!("Gemini {} returned {}", model, status)));
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.text())
    }
}

#[async_trait]
impl EstimateSource for GeminiEstimates {
    async fn eps_estimate(&self, symbol: &str, name: &str) -> Option<String> {
        let prompt = estimate_prompt(symbol, name);

        for model in &self.models {
            match self.generate(model, &prompt).await {
                Ok(Some(text)) => {
                    info!("EPS estimate for {} from {}", symbol, model);
                    return Some(text);
                }
                Ok(None) => warn!("{} gave no estimate for {}, trying next model", model, symbol),
                Err(e) => {
                    warn!("EPS estimate for {} failed: {}", symbol, e);
                    return None;
                }
            }
        }

        warn!("No estimate model available for {}", symbol);
        None
    }
}
