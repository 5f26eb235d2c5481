use std::{env, fs, path::PathBuf};

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "config.json";
pub const LOCAL_DB_FILE: &str = "cinedex.db";

pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const DEFAULT_POSTER_SIZE: &str = "w500";
pub const DEFAULT_PROFILE_SIZE: &str = "w185";
pub const DEFAULT_DEBOUNCE_MS: u64 = 600;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub image_base_url: String,
    pub api_token: Option<String>,
    pub cache_dir: Option<String>,
    pub poster_size: String,
    pub profile_size: String,
    pub debounce_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            api_token: None,
            cache_dir: None,
            poster_size: DEFAULT_POSTER_SIZE.to_string(),
            profile_size: DEFAULT_PROFILE_SIZE.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    api_base_url: Option<String>,
    image_base_url: Option<String>,
    #[serde(alias = "api_key")]
    api_token: Option<String>,
    cache_dir: Option<String>,
    poster_size: Option<String>,
    profile_size: Option<String>,
    debounce_ms: Option<u64>,
}

static CONFIG: Lazy<AppConfig> = Lazy::new(load_config);

/// Process-wide config, read on first use.
pub fn config() -> &'static AppConfig {
    &CONFIG
}

pub fn load_config() -> AppConfig {
    let cfg_path = resolve_relative_path(CONFIG_FILE);
    let mut cfg = match fs::read_to_string(&cfg_path) {
        Ok(raw) => match parse_config(&raw) {
            Ok(cfg) => {
                info!("Loaded config from {}", cfg_path.display());
                cfg
            }
            Err(err) => {
                warn!("Failed to parse {CONFIG_FILE} ({err}). Using defaults.");
                AppConfig::default()
            }
        },
        Err(_) => {
            info!("No {CONFIG_FILE} found; using defaults");
            AppConfig::default()
        }
    };

    apply_env_overrides(&mut cfg, |key| env::var(key).ok());

    if cfg.api_token.is_none() {
        warn!("No TMDB token configured; set TMDB_API_KEY or `api_token` in {CONFIG_FILE}.");
    }
    cfg
}

pub(crate) fn parse_config(raw: &str) -> Result<AppConfig, serde_json::Error> {
    let parsed: RawConfig = serde_json::from_str(raw)?;
    let mut cfg = AppConfig::default();

    if let Some(url) = non_empty(parsed.api_base_url) {
        cfg.api_base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(url) = non_empty(parsed.image_base_url) {
        cfg.image_base_url = url.trim_end_matches('/').to_string();
    }
    cfg.api_token = non_empty(parsed.api_token);
    cfg.cache_dir = non_empty(parsed.cache_dir);
    if let Some(size) = non_empty(parsed.poster_size) {
        cfg.poster_size = size;
    }
    if let Some(size) = non_empty(parsed.profile_size) {
        cfg.profile_size = size;
    }
    if let Some(ms) = parsed.debounce_ms {
        cfg.debounce_ms = ms;
    }
    Ok(cfg)
}

pub(crate) fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = non_empty(lookup("TMDB_API_KEY")) {
        cfg.api_token = Some(token);
    }
    if let Some(url) = non_empty(lookup("TMDB_API_BASE_URL")) {
        cfg.api_base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(url) = non_empty(lookup("TMDB_IMAGE_BASE_URL")) {
        cfg.image_base_url = url.trim_end_matches('/').to_string();
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Relative paths resolve against the working directory, falling back to
/// the executable's folder when the file only exists there.
pub fn resolve_relative_path(rel: &str) -> PathBuf {
    let local = PathBuf::from(rel);
    if local.is_absolute() || local.exists() {
        return local;
    }
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(rel)))
        .filter(|p| p.exists())
        .unwrap_or(local)
}

pub fn local_db_path() -> PathBuf {
    crate::app::cache::cache_dir().join(LOCAL_DB_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let cfg = parse_config("{}").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn trims_trailing_slashes_and_blank_values() {
        let cfg = parse_config(
            r#"{
                "api_base_url": "http://localhost:9000/3/",
                "api_key": "  ",
                "poster_size": "w342",
                "debounce_ms": 250
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.api_base_url, "http://localhost:9000/3");
        assert_eq!(cfg.api_token, None);
        assert_eq!(cfg.poster_size, "w342");
        assert_eq!(cfg.profile_size, DEFAULT_PROFILE_SIZE);
        assert_eq!(cfg.debounce_ms, 250);
    }

    #[test]
    fn env_overrides_win_over_file() {
        let mut cfg = parse_config(r#"{"api_token": "from-file"}"#).unwrap();
        apply_env_overrides(&mut cfg, |key| match key {
            "TMDB_API_KEY" => Some("from-env".into()),
            "TMDB_IMAGE_BASE_URL" => Some("https://img.example/t/p/".into()),
            _ => None,
        });
        assert_eq!(cfg.api_token.as_deref(), Some("from-env"));
        assert_eq!(cfg.image_base_url, "https://img.example/t/p");
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_config("{ not json").is_err());
    }
}
