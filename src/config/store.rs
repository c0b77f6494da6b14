use crate::config::toml_config::TomlConfig;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, TrackerError};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

pub const URL_ENV: &str = "SUPABASE_URL";
pub const KEY_ENV: &str = "SUPABASE_KEY";
pub const TIMEOUT_ENV: &str = "STORE_TIMEOUT_SECONDS";

/// Connection settings for the store, after merging all sources.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct StoreOverrides {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::resolve_with(&StoreOverrides::default(), None, |name| std::env::var(name).ok())
    }

    /// Merge command line, config file and process environment, in that order of precedence.
    pub fn resolve(overrides: &StoreOverrides, file: Option<&TomlConfig>) -> Result<Self> {
        Self::resolve_with(overrides, file, |name| std::env::var(name).ok())
    }

    pub fn resolve_with<F>(overrides: &StoreOverrides, file: Option<&TomlConfig>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = overrides
            .url
            .clone()
            .or_else(|| file.map(|f| f.store.url.clone()))
            .or_else(|| env(URL_ENV))
            .ok_or_else(|| TrackerError::MissingConfigError {
                field: format!("store.url (or {})", URL_ENV),
            })?;

        let api_key = overrides
            .api_key
            .clone()
            .or_else(|| file.map(|f| f.store.api_key.clone()))
            .or_else(|| env(KEY_ENV))
            .ok_or_else(|| TrackerError::MissingConfigError {
                field: format!("store.api_key (or {})", KEY_ENV),
            })?;

        let timeout_seconds = match file.and_then(|f| f.store.timeout_seconds) {
            Some(seconds) => seconds,
            None => match env(TIMEOUT_ENV) {
                Some(raw) => raw.trim().parse::<u64>().map_err(|_| TrackerError::InvalidConfigValueError {
                    field: TIMEOUT_ENV.to_string(),
                    value: raw.clone(),
                    reason: "expected a whole number of seconds".to_string(),
                })?,
                None => DEFAULT_TIMEOUT_SECONDS,
            },
        };

        let config = Self {
            url,
            api_key,
            timeout_seconds,
        };
        config.validate()?;
        Ok(config)
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("api_key", &"***")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl Validate for StoreConfig {
    fn validate(&self) -> Result<()> {
        validate_url("store.url", &self.url)?;
        validate_non_empty_string("store.api_key", &self.api_key)?;
        validate_range("store.timeout_seconds", self.timeout_seconds, 1, 300)?;
        Ok(())
    }
}

impl ConfigProvider for StoreConfig {
    fn store_url(&self) -> &str {
        &self.url
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn file_config() -> TomlConfig {
        TomlConfig::from_toml_str(
            r#"
[store]
url = "https://file.supabase.co"
api_key = "file-key"
timeout_seconds = 5
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_environment_only() {
        let env = env_of(&[(URL_ENV, "https://env.supabase.co"), (KEY_ENV, "env-key")]);
        let config = StoreConfig::resolve_with(&StoreOverrides::default(), None, env).unwrap();
        assert_eq!(config.url, "https://env.supabase.co");
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.request_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECONDS));
    }

    #[test]
    fn test_precedence() {
        let env = env_of(&[(URL_ENV, "https://env.supabase.co"), (KEY_ENV, "env-key")]);
        let file = file_config();
        let overrides = StoreOverrides {
            url: Some("http://localhost:54321".to_string()),
            api_key: None,
        };

        let config = StoreConfig::resolve_with(&overrides, Some(&file), env).unwrap();
        assert_eq!(config.url, "http://localhost:54321");
        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.timeout_seconds, 5);
    }

    #[test]
    fn test_missing_key() {
        let env = env_of(&[(URL_ENV, "https://env.supabase.co")]);
        let err = StoreConfig::resolve_with(&StoreOverrides::default(), None, env).unwrap_err();
        assert!(matches!(err, TrackerError::MissingConfigError { .. }));
    }

    #[test]
    fn test_invalid_values() {
        let env = env_of(&[(URL_ENV, "ftp://env"), (KEY_ENV, "k")]);
        assert!(StoreConfig::resolve_with(&StoreOverrides::default(), None, env).is_err());

        let env = env_of(&[(URL_ENV, "https://x.co"), (KEY_ENV, "k"), (TIMEOUT_ENV, "soon")]);
        assert!(StoreConfig::resolve_with(&StoreOverrides::default(), None, env).is_err());

        let env = env_of(&[(URL_ENV, "https://x.co"), (KEY_ENV, "  ")]);
        assert!(StoreConfig::resolve_with(&StoreOverrides::default(), None, env).is_err());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let rendered = format!("{:?}", StoreConfig::new("https://x.co", "super-secret"));
        assert!(!rendered.contains("super-secret"));
    }
}
