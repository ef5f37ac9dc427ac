use crate::batcher::BatchMode;
use crate::client::TimeUnit;
use crate::model::ConfigError;
use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

pub const CLIENT_ID_VAR: &str = "NAVER_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "NAVER_CLIENT_SECRET";

/// Upper bound the search endpoints accept for `display`.
pub const MAX_ITEM_DISPLAY: u32 = 100;

/// One week; longer lifetimes would keep stale trend data around indefinitely.
pub const MAX_CACHE_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    pub name: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub batch_mode: BatchMode,
    pub start_date: NaiveDate,
    /// Defaults to the current day when absent.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub time_unit: TimeUnit,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub ages: Vec<String>,
    #[serde(default)]
    pub shop_query: Option<String>,
    #[serde(default)]
    pub blog_query: Option<String>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_item_display")]
    pub item_display: u32,
}

impl DashboardConfig {
    /// First non-blank keyword; the shop and blog tabs fall back to it.
    pub fn main_keyword(&self) -> Option<&str> {
        self.keywords
            .iter()
            .map(|k| k.trim())
            .find(|k| !k.is_empty())
    }

    pub fn shop_query(&self) -> Option<&str> {
        self.shop_query.as_deref().or_else(|| self.main_keyword())
    }

    pub fn blog_query(&self) -> Option<&str> {
        self.blog_query.as_deref().or_else(|| self.main_keyword())
    }

    pub fn end_date_or(&self, today: NaiveDate) -> NaiveDate {
        self.end_date.unwrap_or(today)
    }

    pub fn item_display(&self) -> u32 {
        self.item_display.clamp(1, MAX_ITEM_DISPLAY)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("dashboard name is empty".into()));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ConfigError::Invalid(format!(
                    "dashboard '{}': end_date {} precedes start_date {}",
                    self.name, end, self.start_date
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_ttl")]
    pub cache_ttl_seconds: u64,
    #[serde(default = "default_interval")]
    pub check_interval_seconds: u64,
    pub dashboards: Vec<DashboardConfig>,
}

impl AppConfig {
    /// Cache lifetime as a chrono duration. Bounds are checked by [`parse_config`].
    pub fn cache_ttl(&self) -> Result<Duration, ConfigError> {
        i64::try_from(self.cache_ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "cache_ttl_seconds {} is out of range",
                    self.cache_ttl_seconds
                ))
            })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("request_timeout_seconds must be positive".into()));
        }
        if self.cache_ttl_seconds == 0 || self.cache_ttl_seconds > MAX_CACHE_TTL_SECONDS {
            return Err(ConfigError::Invalid(format!(
                "cache_ttl_seconds must be within 1..={}, got {}",
                MAX_CACHE_TTL_SECONDS, self.cache_ttl_seconds
            )));
        }
        for dashboard in &self.dashboards {
            dashboard.validate()?;
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://openapi.naver.com".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_ttl() -> u64 {
    600
}

fn default_interval() -> u64 {
    600
}

fn default_top_n() -> usize {
    10
}

fn default_item_display() -> u32 {
    MAX_ITEM_DISPLAY
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Client id and secret sent as fixed headers on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    /// Reads both values from the process environment. Blank values count as missing.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Some(Self {
            client_id: non_blank(CLIENT_ID_VAR)?,
            client_secret: non_blank(CLIENT_SECRET_VAR)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}
