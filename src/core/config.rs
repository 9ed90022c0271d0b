use anyhow::Result;
use serde::Deserialize;
use std::fs;

/// Environment variable holding the generative API key. Its absence is not an
/// error: the run degrades to the template fallback.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub llm: Option<LlmConfig>,
    pub corpus: Option<CorpusConfig>,
    pub posts: Option<PostsConfig>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LlmConfig {
    pub api_url: Option<String>,
    pub models: Option<Vec<String>>,
    pub max_retries: Option<u32>,
    pub retry_base_ms: Option<u64>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorpusConfig {
    pub export_files: Option<Vec<String>>,
    pub style_samples: Option<usize>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PostsConfig {
    pub dir: Option<String>,
    pub recent_window: Option<usize>,
}

impl Config {
    pub fn llm(&self) -> LlmConfig {
        self.llm.clone().unwrap_or_default()
    }

    pub fn corpus(&self) -> CorpusConfig {
        self.corpus.clone().unwrap_or_default()
    }

    pub fn posts(&self) -> PostsConfig {
        self.posts.clone().unwrap_or_default()
    }
}

impl LlmConfig {
    pub fn api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string())
    }

    /// Candidate models, fastest/cheapest first.
    pub fn models(&self) -> Vec<String> {
        self.models.clone().unwrap_or_else(|| {
            vec![
                "gemini-2.0-flash".to_string(),
                "gemini-1.5-flash".to_string(),
                "gemini-1.5-flash-8b".to_string(),
            ]
        })
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(2)
    }

    pub fn retry_base_ms(&self) -> u64 {
        self.retry_base_ms.unwrap_or(5000)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(0.85)
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens.unwrap_or(4096)
    }
}

impl CorpusConfig {
    pub fn export_files(&self) -> Vec<String> {
        self.export_files.clone().unwrap_or_else(|| {
            vec!["gensnotes_1.md".to_string(), "gensnotes_2.md".to_string()]
        })
    }

    pub fn style_samples(&self) -> usize {
        self.style_samples.unwrap_or(3)
    }
}

impl PostsConfig {
    pub fn dir(&self) -> String {
        self.dir
            .clone()
            .unwrap_or_else(|| "src/content/posts".to_string())
    }

    pub fn recent_window(&self) -> usize {
        self.recent_window.unwrap_or(20)
    }
}

pub fn load_config(path: &str) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Starter config written on first run so the defaults are discoverable.
pub fn starter_config() -> &'static str {
    r#"[llm]
# api_url = "https://generativelanguage.googleapis.com/v1beta"
models = ["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-flash-8b"]
max_retries = 2
retry_base_ms = 5000
temperature = 0.85
max_output_tokens = 4096

[corpus]
export_files = ["gensnotes_1.md", "gensnotes_2.md"]
style_samples = 3

[posts]
dir = "src/content/posts"
recent_window = 20
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.llm().max_retries(), 2);
        assert_eq!(config.llm().models().len(), 3);
        assert_eq!(config.corpus().style_samples(), 3);
        assert_eq!(config.posts().recent_window(), 20);
        assert_eq!(config.posts().dir(), "src/content/posts");
    }

    #[test]
    fn starter_config_parses() {
        let config: Config = toml::from_str(starter_config()).unwrap();
        assert_eq!(config.llm().retry_base_ms(), 5000);
        assert_eq!(
            config.corpus().export_files(),
            vec!["gensnotes_1.md", "gensnotes_2.md"]
        );
    }

    #[test]
    fn explicit_values_win() {
        let config: Config = toml::from_str(
            r#"
[llm]
models = ["only-model"]
max_retries = 5

[posts]
recent_window = 7
"#,
        )
        .unwrap();
        assert_eq!(config.llm().models(), vec!["only-model"]);
        assert_eq!(config.llm().max_retries(), 5);
        assert_eq!(config.posts().recent_window(), 7);
    }
}
