//! Runtime settings
//!
//! Loaded once at startup from the process environment, after `.env` has been
//! applied. Credentials are only checked when the collaborator that needs them
//! is built, so `search` works without any provider keys.

use crate::error::AppError;
use crate::search::fuzzy::DEFAULT_THRESHOLD;
use chrono_tz::Tz;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_CITY: &str = "budapest";
pub const DEFAULT_CATEGORY: &str = "restaurants";
pub const DEFAULT_MAX_ACTIONS: usize = 3;
pub const DEFAULT_TIMEZONE: &str = "Europe/Budapest";
pub const DEFAULT_DISPLAY_LIMIT: usize = 1;
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TRIPADVISOR_BASE_URL: &str = "https://api.content.tripadvisor.com/api/v1";
pub const DEFAULT_SERPAPI_BASE_URL: &str = "https://serpapi.com";
pub const DEFAULT_TABLE: &str = "establishments";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Which storage collaborator to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Pretty-printed JSON array on local disk
    Json,
    /// Supabase table over its REST interface
    Supabase,
    /// Process memory, lost on exit
    Memory,
}

impl FromStr for StoreKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "file" => Ok(StoreKind::Json),
            "supabase" => Ok(StoreKind::Supabase),
            "memory" => Ok(StoreKind::Memory),
            other => Err(AppError::ConfigError(format!(
                "Unknown store '{}', expected json, supabase or memory",
                other
            ))),
        }
    }
}

/// All settings the services are built from
#[derive(Debug, Clone)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub serpapi_api_key: Option<String>,
    pub serpapi_base_url: String,
    pub tripadvisor_api_key: Option<String>,
    pub tripadvisor_base_url: String,
    pub city: String,
    pub category: String,
    pub max_actions: usize,
    pub timezone: Tz,
    pub display_limit: usize,
    /// Token-set similarity (0-100) a field needs to count as a fuzzy match
    pub fuzzy_threshold: u8,
    pub store: StoreKind,
    pub store_path: PathBuf,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub supabase_table: String,
    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            serpapi_api_key: None,
            serpapi_base_url: DEFAULT_SERPAPI_BASE_URL.to_string(),
            tripadvisor_api_key: None,
            tripadvisor_base_url: DEFAULT_TRIPADVISOR_BASE_URL.to_string(),
            city: DEFAULT_CITY.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            max_actions: DEFAULT_MAX_ACTIONS,
            timezone: chrono_tz::Europe::Budapest,
            display_limit: DEFAULT_DISPLAY_LIMIT,
            fuzzy_threshold: DEFAULT_THRESHOLD,
            store: StoreKind::Json,
            store_path: default_store_path(),
            supabase_url: None,
            supabase_key: None,
            supabase_table: DEFAULT_TABLE.to_string(),
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `.env` and the process environment
    pub fn from_env() -> Result<Self, AppError> {
        // A missing .env file is normal in production
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let max_actions = match get("EATLIST_MAX_ACTIONS") {
            Some(v) => parse_positive("EATLIST_MAX_ACTIONS", &v)?,
            None => defaults.max_actions,
        };
        let display_limit = match get("EATLIST_DISPLAY_LIMIT") {
            Some(v) => parse_positive("EATLIST_DISPLAY_LIMIT", &v)?,
            None => defaults.display_limit,
        };
        let fuzzy_threshold = match get("EATLIST_FUZZY_THRESHOLD") {
            Some(v) => match parse_positive("EATLIST_FUZZY_THRESHOLD", &v)? {
                n @ 1..=100 => n as u8,
                _ => {
                    return Err(AppError::ConfigError(format!(
                        "EATLIST_FUZZY_THRESHOLD must be between 1 and 100, got '{}'",
                        v
                    )))
                }
            },
            None => defaults.fuzzy_threshold,
        };
        let timezone = match get("EATLIST_TIMEZONE") {
            Some(v) => v.trim().parse::<Tz>().map_err(|_| {
                AppError::ConfigError(format!("Unknown timezone '{}'", v))
            })?,
            None => defaults.timezone,
        };
        let base_url = |key: &str, default: String| match get(key) {
            Some(v) => parse_base_url(key, &v),
            None => Ok(default),
        };
        let openai_base_url = base_url("OPENAI_BASE_URL", defaults.openai_base_url)?;
        let serpapi_base_url = base_url("SERPAPI_BASE_URL", defaults.serpapi_base_url)?;
        let tripadvisor_base_url = base_url("TRIPADVISOR_BASE_URL", defaults.tripadvisor_base_url)?;
        let supabase_url = get("SUPABASE_URL")
            .map(|v| parse_base_url("SUPABASE_URL", &v))
            .transpose()?;

        let store = match get("EATLIST_STORE") {
            Some(v) => v.parse()?,
            None => defaults.store,
        };

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url,
            serpapi_api_key: get("SERPAPI_API_KEY"),
            serpapi_base_url,
            tripadvisor_api_key: get("TRIPADVISOR_API_KEY"),
            tripadvisor_base_url,
            city: get("EATLIST_CITY")
                .map(|c| c.trim().to_lowercase())
                .unwrap_or(defaults.city),
            category: get("EATLIST_CATEGORY")
                .map(|c| c.trim().to_lowercase())
                .unwrap_or(defaults.category),
            max_actions,
            timezone,
            display_limit,
            fuzzy_threshold,
            store,
            store_path: get("EATLIST_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            supabase_url,
            supabase_key: get("SUPABASE_KEY"),
            supabase_table: get("SUPABASE_TABLE").unwrap_or(defaults.supabase_table),
            bind: get("EATLIST_BIND").unwrap_or(defaults.bind),
        })
    }
}

/// Fetch a credential, naming the variable when it is missing
pub fn require<'a>(value: &'a Option<String>, var: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .ok_or_else(|| AppError::ConfigError(format!("{} is not set", var)))
}

/// Accept only absolute http(s) URLs; the trailing slash is dropped
fn parse_base_url(key: &str, value: &str) -> Result<String, AppError> {
    let url = url::Url::parse(value.trim())
        .map_err(|e| AppError::ConfigError(format!("{} is not a valid URL: {}", key, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::ConfigError(format!(
            "{} must use http or https, got '{}'",
            key,
            url.scheme()
        )));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn parse_positive(key: &str, value: &str) -> Result<usize, AppError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::ConfigError(format!(
            "{} must be a positive integer, got '{}'",
            key, value
        ))),
    }
}

/// `<data dir>/eatlist/stores.json`, or `./stores.json` without a data dir
fn default_store_path() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join("eatlist").join("stores.json"),
        None => PathBuf::from("stores.json"),
    }
}
