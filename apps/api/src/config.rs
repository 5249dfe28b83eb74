use anyhow::{Context, Result};

use crate::content::PrepareOptions;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Used when a request does not carry its own brand color.
    pub brand_color: String,
    pub avatar_timeout_secs: u64,
    pub max_chars_per_slide: usize,
    pub max_word_length: usize,
    pub request_timeout_secs: u64,
    /// Requests per client per minute on the `/api` routes. 0 disables the limit.
    pub rate_limit_per_minute: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 3001,
            rust_log: "info".to_string(),
            brand_color: "#6366F1".to_string(),
            avatar_timeout_secs: 10,
            max_chars_per_slide: 600,
            max_word_length: 24,
            request_timeout_secs: 60,
            rate_limit_per_minute: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            brand_color: std::env::var("BRAND_COLOR").unwrap_or(defaults.brand_color),
            avatar_timeout_secs: parse_env("AVATAR_TIMEOUT_SECS", defaults.avatar_timeout_secs)?,
            max_chars_per_slide: parse_env("MAX_CHARS_PER_SLIDE", defaults.max_chars_per_slide)?,
            max_word_length: parse_env("MAX_WORD_LENGTH", defaults.max_word_length)?,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            rate_limit_per_minute: parse_env("RATE_LIMIT_PER_MINUTE", defaults.rate_limit_per_minute)?,
        })
    }

    pub fn prepare_options(&self) -> PrepareOptions {
        PrepareOptions {
            max_chars_per_slide: self.max_chars_per_slide,
            max_word_length: self.max_word_length,
            ..PrepareOptions::default()
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let value: u16 = parse_env("CAROUSEL_TEST_UNSET_VARIABLE", 3001).unwrap();
        assert_eq!(value, 3001);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("CAROUSEL_TEST_BAD_PORT", "eighty");
        let result: Result<u16> = parse_env("CAROUSEL_TEST_BAD_PORT", 3001);
        assert!(result.unwrap_err().to_string().contains("CAROUSEL_TEST_BAD_PORT"));
    }

    #[test]
    fn test_prepare_options_follow_config() {
        let config = Config {
            max_chars_per_slide: 400,
            ..Config::default()
        };
        assert_eq!(config.prepare_options().max_chars_per_slide, 400);
        assert_eq!(config.prepare_options().max_word_length, 24);
    }
}
