use crate::error::LiveError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "OPSGUARD_CONFIG_PATH";
pub const URL_ENV: &str = "OPSGUARD_ES_URL";
pub const API_KEY_ENV: &str = "OPSGUARD_ES_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexNames {
    pub logs: String,
    pub metrics: String,
    pub incidents: String,
    pub business: String,
    /// `_cat/indices` pattern used for the document count.
    pub pattern: String,
}

impl Default for IndexNames {
    fn default() -> Self {
        Self {
            logs: "logs-opsguard-incidents".to_string(),
            metrics: "metrics-opsguard-system".to_string(),
            incidents: "incidents-opsguard-history".to_string(),
            business: "business-opsguard-metrics".to_string(),
            pattern: "*opsguard*".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LiveConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub indices: IndexNames,
}

impl LiveConfig {
    pub fn new(url: &str, api_key: &str) -> Self {
        Self {
            url: normalize_url(url),
            api_key: api_key.trim().to_string(),
            indices: IndexNames::default(),
        }
    }

    /// Live mode needs both an endpoint and a credential.
    pub fn is_complete(&self) -> bool {
        !self.url.is_empty() && !self.api_key.is_empty()
    }

    /// Key with everything but the last four characters masked.
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), tail)
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    config_dir().join("opsguard/live.toml")
}

fn config_dir() -> PathBuf {
    if let Ok(path) = env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(path);
    }
    home_dir().join(".config")
}

fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Missing file is not an error.
pub fn load(path: &Path) -> Result<Option<LiveConfig>, LiveError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    let mut config: LiveConfig = toml::from_str(&contents)?;
    config.url = normalize_url(&config.url);
    Ok(Some(config))
}

pub fn save(path: &Path, config: &LiveConfig) -> Result<(), LiveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// File at [`config_path`] overlaid with the env overrides. `None` means
/// demo mode.
pub fn resolve() -> Result<Option<LiveConfig>, LiveError> {
    let path = config_path();
    let file = load(&path)?;
    let config = apply_overrides(file, env::var(URL_ENV).ok(), env::var(API_KEY_ENV).ok());
    tracing::debug!(
        path = %path.display(),
        configured = config.is_some(),
        "live config resolved"
    );
    Ok(config)
}

pub fn apply_overrides(
    base: Option<LiveConfig>,
    url: Option<String>,
    api_key: Option<String>,
) -> Option<LiveConfig> {
    let mut config = base.unwrap_or_default();
    if let Some(url) = url.filter(|value| !value.trim().is_empty()) {
        config.url = normalize_url(&url);
    }
    if let Some(key) = api_key.filter(|value| !value.trim().is_empty()) {
        config.api_key = key.trim().to_string();
    }
    config.is_complete().then_some(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_then_load_preserves_config() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested/live.toml");
        let mut config = LiveConfig::new("https://es.example.cloud/", "secret-key");
        config.indices.pattern = "opsguard-*".to_string();

        save(&path, &config).expect("save");
        let loaded = load(&path).expect("load").expect("present");
        assert_eq!(loaded, config);
        assert_eq!(loaded.url, "https://es.example.cloud");
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempdir().expect("tempdir");
        assert!(load(&dir.path().join("absent.toml")).expect("load").is_none());
    }

    #[test]
    fn partial_file_fills_default_indices() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("live.toml");
        fs::write(&path, "url = \"http://localhost:9200\"\napi_key = \"k\"\n").expect("write");
        let loaded = load(&path).expect("load").expect("present");
        assert_eq!(loaded.indices, IndexNames::default());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("live.toml");
        fs::write(&path, "url = [").expect("write");
        assert!(matches!(load(&path), Err(LiveError::ConfigParse(_))));
    }

    #[test]
    fn env_overrides_win_over_file() {
        let file = LiveConfig::new("http://file:9200", "file-key");
        let merged = apply_overrides(
            Some(file),
            Some("http://env:9200/".to_string()),
            Some("  ".to_string()),
        )
        .expect("complete");
        assert_eq!(merged.url, "http://env:9200");
        assert_eq!(merged.api_key, "file-key");
    }

    #[test]
    fn incomplete_config_means_demo_mode() {
        assert!(apply_overrides(None, Some("http://env:9200".to_string()), None).is_none());
        assert!(apply_overrides(None, None, None).is_none());
        assert!(apply_overrides(None, Some("u".into()), Some("k".into())).is_some());
    }

    #[test]
    fn key_is_masked() {
        assert_eq!(LiveConfig::new("u", "abcdefgh").masked_key(), "****efgh");
        assert_eq!(LiveConfig::new("u", "abc").masked_key(), "***");
    }
}
