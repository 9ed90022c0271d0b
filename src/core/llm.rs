use crate::core::config::LlmConfig;
use serde_json::json;
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum CallError {
    /// No API key configured. Not retryable and not worth iterating models
    /// over; the run falls back to templates immediately.
    MissingApiKey,
    /// HTTP 429. The only error class that earns a backoff retry.
    RateLimited,
    Api { status: u16, body: String },
    Transport(String),
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::MissingApiKey => write!(f, "API key not configured"),
            CallError::RateLimited => write!(f, "rate limited (429)"),
            CallError::Api { status, body } => write!(f, "API error {}: {}", status, body),
            CallError::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

pub trait TextBackend {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, CallError>;
}

/// Gemini-style `generateContent` endpoint: model name templated into the
/// URL, key in the query string, text nested under candidates/content/parts.
pub struct GeminiBackend {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: Option<String>,
}

impl GeminiBackend {
    pub fn new(config: LlmConfig, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            config,
            api_key,
        }
    }
}

impl TextBackend for GeminiBackend {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, CallError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(CallError::MissingApiKey)?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.api_url().trim_end_matches('/'),
            model,
            key
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.config.temperature(),
                "maxOutputTokens": self.config.max_output_tokens(),
            },
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;

        let status = res.status();
        if status.as_u16() == 429 {
            return Err(CallError::RateLimited);
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(CallError::Api {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let response: serde_json::Value = res
            .json()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;
        let text = response["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        Ok(text)
    }
}

/// Iterates candidate models fastest-first, retrying each at most
/// `max_retries` times on rate limits with exponential backoff. Exhaustion is
/// an expected outcome, reported as `None` rather than an error.
pub struct ResilientCaller<B> {
    backend: B,
    models: Vec<String>,
    max_retries: u32,
    retry_base: Duration,
}

impl<B: TextBackend> ResilientCaller<B> {
    pub fn new(backend: B, models: Vec<String>, max_retries: u32, retry_base: Duration) -> Self {
        Self {
            backend,
            models,
            max_retries,
            retry_base,
        }
    }

    pub async fn generate(&self, prompt: &str) -> Option<String> {
        for model in &self.models {
            for attempt in 0..=self.max_retries {
                match self.backend.complete(model, prompt).await {
                    Ok(text) => {
                        let text = text.trim();
                        if !text.is_empty() {
                            return Some(text.to_string());
                        }
                        log::warn!("{} attempt {}: empty response", model, attempt + 1);
                    }
                    Err(CallError::MissingApiKey) => {
                        log::warn!("API key not configured, skipping generation");
                        return None;
                    }
                    Err(CallError::RateLimited) => {
                        if attempt < self.max_retries {
                            let delay = self.retry_base * 2u32.pow(attempt);
                            log::info!("{} rate limited, retrying in {:?}", model, delay);
                            tokio::time::sleep(delay).await;
                        } else {
                            log::warn!("{} rate limited, retries exhausted", model);
                        }
                    }
                    Err(e) => {
                        log::warn!("{} attempt {} failed: {}", model, attempt + 1, e);
                        break;
                    }
                }
            }
            log::info!("Moving past model {}", model);
        }
        log::warn!("All models exhausted without a usable response");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Pops scripted results in order; once the script runs dry it keeps
    /// returning the configured filler.
    struct ScriptedBackend {
        script: Mutex<Vec<Result<String, CallError>>>,
        filler: fn() -> Result<String, CallError>,
        calls: AtomicU32,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<String, CallError>>, filler: fn() -> Result<String, CallError>) -> Self {
            let mut script = script;
            script.reverse();
            Self {
                script: Mutex::new(script),
                filler,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TextBackend for ScriptedBackend {
        async fn complete(&self, _model: &str, _prompt: &str) -> Result<String, CallError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| (self.filler)())
        }
    }

    fn make_caller(backend: ScriptedBackend, models: &[&str], retries: u32) -> ResilientCaller<ScriptedBackend> {
        ResilientCaller::new(
            backend,
            models.iter().map(|m| m.to_string()).collect(),
            retries,
            Duration::from_millis(1),
        )
    }

    #[tokio::test]
    async fn rate_limits_burn_all_attempts_on_every_model() {
        let caller = make_caller(
            ScriptedBackend::new(vec![], || Err(CallError::RateLimited)),
            &["fast", "slow"],
            2,
        );
        assert_eq!(caller.generate("p").await, None);
        // R+1 attempts per model, both models exhausted.
        assert_eq!(caller.backend.calls(), 6);
    }

    #[tokio::test]
    async fn non_rate_limit_errors_skip_straight_to_the_next_model() {
        let caller = make_caller(
            ScriptedBackend::new(
                vec![
                    Err(CallError::Transport("connection refused".to_string())),
                    Ok("hello".to_string()),
                ],
                || Err(CallError::RateLimited),
            ),
            &["fast", "slow"],
            2,
        );
        assert_eq!(caller.generate("p").await, Some("hello".to_string()));
        assert_eq!(caller.backend.calls(), 2);
    }

    #[tokio::test]
    async fn empty_responses_are_failed_attempts_without_backoff() {
        let caller = make_caller(
            ScriptedBackend::new(vec![], || Ok(String::new())),
            &["only"],
            1,
        );
        assert_eq!(caller.generate("p").await, None);
        assert_eq!(caller.backend.calls(), 2);
    }

    #[tokio::test]
    async fn missing_api_key_aborts_without_model_iteration() {
        let caller = make_caller(
            ScriptedBackend::new(vec![], || Err(CallError::MissingApiKey)),
            &["fast", "slow"],
            2,
        );
        assert_eq!(caller.generate("p").await, None);
        assert_eq!(caller.backend.calls(), 1);
    }

    #[tokio::test]
    async fn successful_responses_are_trimmed() {
        let caller = make_caller(
            ScriptedBackend::new(vec![Ok("  text \n".to_string())], || Ok(String::new())),
            &["only"],
            0,
        );
        assert_eq!(caller.generate("p").await, Some("text".to_string()));
    }

    #[tokio::test]
    async fn rate_limit_then_success_stays_on_the_same_model() {
        let caller = make_caller(
            ScriptedBackend::new(
                vec![Err(CallError::RateLimited), Ok("second try".to_string())],
                || Ok(String::new()),
            ),
            &["only"],
            2,
        );
        assert_eq!(caller.generate("p").await, Some("second try".to_string()));
        assert_eq!(caller.backend.calls(), 2);
    }
}
