use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "gemma3:4b";

/// Runtime configuration loaded from environment variables (and `.env` if present).
/// Command-line flags override the model and prompt file.
#[derive(Debug, Clone)]
pub struct Config {
    pub ollama_url: String,
    pub model: String,
    /// Optional JSON file that extends or overrides the built-in prompt catalog.
    pub prompts_file: Option<PathBuf>,
    pub llm_timeout_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            ollama_url: env_or("OLLAMA_URL", DEFAULT_OLLAMA_URL),
            model: env_or("SCORER_MODEL", DEFAULT_MODEL),
            prompts_file: std::env::var("SCORER_PROMPTS").ok().map(PathBuf::from),
            llm_timeout_secs: parse_timeout_secs(&env_or("LLM_TIMEOUT_SECS", "120"))?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// A zero timeout would fail every model request, so it is rejected up front.
fn parse_timeout_secs(raw: &str) -> Result<u64> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?;
    if secs == 0 {
        bail!("LLM_TIMEOUT_SECS must be greater than zero");
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_parses_seconds() {
        assert_eq!(parse_timeout_secs("120").unwrap(), 120);
        assert_eq!(parse_timeout_secs(" 30 ").unwrap(), 30);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = parse_timeout_secs("0").unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_non_numeric_timeout_rejected() {
        assert!(parse_timeout_secs("two minutes").is_err());
        assert!(parse_timeout_secs("-5").is_err());
    }
}
