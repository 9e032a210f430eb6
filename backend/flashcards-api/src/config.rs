use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::services::progress_tracker::DEFAULT_LIVES;
use crate::services::session_builder::DEFAULT_SESSION_SIZE;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the service exposing `/api/flashcards`.
    pub card_api_url: String,
    /// When set, cards are read from JSON files under this directory instead.
    pub cards_dir: Option<String>,
    pub session_size: usize,
    pub starting_lives: u32,
    pub fetch_timeout_secs: u64,
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            card_api_url: "http://localhost:3000".to_string(),
            cards_dir: None,
            session_size: DEFAULT_SESSION_SIZE,
            starting_lives: DEFAULT_LIVES,
            fetch_timeout_secs: 5,
            bind_addr: "0.0.0.0:8081".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Root .env, falling back to the local one when it is missing
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/*.toml + ENV overrides (prefix: APP)
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let defaults = Config::default();

        let card_api_url = settings
            .get_string("cards.api_url")
            .or_else(|_| env::var("CARD_API_URL"))
            .unwrap_or(defaults.card_api_url);

        let cards_dir = settings
            .get_string("cards.dir")
            .or_else(|_| env::var("CARDS_DIR"))
            .ok()
            .filter(|dir| !dir.trim().is_empty());

        let session_size = settings
            .get::<usize>("study.session_size")
            .ok()
            .or_else(|| env_number("SESSION_SIZE"))
            .unwrap_or(defaults.session_size);

        let starting_lives = settings
            .get::<u32>("study.starting_lives")
            .ok()
            .or_else(|| env_number("STARTING_LIVES"))
            .unwrap_or(defaults.starting_lives);

        let fetch_timeout_secs = settings
            .get::<u64>("cards.fetch_timeout_secs")
            .ok()
            .or_else(|| env_number("CARD_FETCH_TIMEOUT_SECS"))
            .unwrap_or(defaults.fetch_timeout_secs);

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or(defaults.bind_addr);

        let config = Config {
            card_api_url,
            cards_dir,
            session_size,
            starting_lives,
            fetch_timeout_secs,
            bind_addr,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.session_size == 0 {
            return Err(config::ConfigError::Message(
                "study.session_size must be at least 1".to_string(),
            ));
        }
        if self.starting_lives == 0 {
            return Err(config::ConfigError::Message(
                "study.starting_lives must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 6] = [
        "CARD_API_URL",
        "CARDS_DIR",
        "SESSION_SIZE",
        "STARTING_LIVES",
        "CARD_FETCH_TIMEOUT_SECS",
        "BIND_ADDR",
    ];

    fn clear_env() {
        std::env::set_var("SKIP_ROOT_ENV", "1");
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_without_overrides() {
        clear_env();
        let config = Config::load().unwrap();

        assert_eq!(config.session_size, 10);
        assert_eq!(config.starting_lives, 3);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
        assert!(config.cards_dir.is_none());
    }

    #[test]
    #[serial]
    fn env_vars_override_defaults() {
        clear_env();
        std::env::set_var("SESSION_SIZE", "5");
        std::env::set_var("STARTING_LIVES", "1");
        std::env::set_var("CARDS_DIR", "/srv/flashcards");

        let config = Config::load().unwrap();
        assert_eq!(config.session_size, 5);
        assert_eq!(config.starting_lives, 1);
        assert_eq!(config.cards_dir.as_deref(), Some("/srv/flashcards"));

        clear_env();
    }

    #[test]
    #[serial]
    fn zero_lives_is_rejected() {
        clear_env();
        std::env::set_var("STARTING_LIVES", "0");

        assert!(Config::load().is_err());

        clear_env();
    }
}
