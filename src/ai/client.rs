//! HTTP client for the Gemini generateContent API.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

/// Longest status-body excerpt carried into an error.
const DETAIL_LIMIT: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("could not build the HTTP client: {0}")]
    Client(String),
    #[error("invalid AI endpoint: {0}")]
    BadEndpoint(String),
    #[error("AI provider key is not configured")]
    MissingKey,
    #[error("could not reach the AI provider: {0}")]
    Connect(String),
    #[error("AI provider timed out after {0}s")]
    Timeout(u64),
    #[error("AI request failed: {0}")]
    Transport(String),
    #[error("AI provider returned status {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("AI reply contained no candidate text")]
    EmptyReply,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .find_map(|part| part.text)
    }
}

/// Client for one configured model. Cheap to clone; the inner reqwest
/// client is shared.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, AiError> {
        Url::parse(base_url).map_err(|err| AiError::BadEndpoint(format!("{}: {}", base_url, err)))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AiError::Client(err.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a prompt and return the first candidate's text.
    ///
    /// Transport failures, timeouts, and non-2xx statuses are errors; a
    /// 2xx body that does not match the response envelope is returned
    /// verbatim so the caller's reply parser can have a go at it.
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    pub async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        if self.api_key.trim().is_empty() {
            return Err(AiError::MissingKey);
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    AiError::Timeout(self.timeout.as_secs())
                } else if err.is_connect() {
                    AiError::Connect(err.to_string())
                } else {
                    AiError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AiError::Transport(err.to_string()))?;

        if !status.is_success() {
            let detail: String = body.chars().take(DETAIL_LIMIT).collect();
            warn!("AI provider rejected request with status {}", status);
            return Err(AiError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        match serde_json::from_str::<GenerateResponse>(&body) {
            Ok(envelope) => match envelope.first_text() {
                Some(text) => Ok(text),
                None => Err(AiError::EmptyReply),
            },
            Err(err) => {
                debug!("response body did not match the generate envelope: {}", err);
                Ok(body)
            }
        }
    }
}
