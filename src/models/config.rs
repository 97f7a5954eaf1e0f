// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{MAX_COUNT, ParsingType};

/// Environment variable holding the RapidAPI key.
pub const RAPIDAPI_KEY_ENV: &str = "RAPIDAPI_KEY";

/// Environment variable holding the VK API access token.
pub const VK_ACCESS_TOKEN_ENV: &str = "VK_ACCESS_TOKEN";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Reference time zone for publish and parsing dates
    #[serde(default = "defaults::timezone")]
    pub timezone: String,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Fixed per-platform delays
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Depth defaults and batch size
    #[serde(default)]
    pub counts: CountConfig,

    /// Output table names
    #[serde(default)]
    pub tables: TableConfig,

    /// Input sheet column discovery
    #[serde(default)]
    pub sheet: SheetConfig,

    /// Provider base URLs
    #[serde(default)]
    pub endpoints: EndpointConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.request_timeout_secs == 0 {
            return Err(AppError::validation("http.request_timeout_secs must be > 0"));
        }
        if self.http.connect_timeout_secs == 0 {
            return Err(AppError::validation("http.connect_timeout_secs must be > 0"));
        }
        if self.counts.batch_size == 0 {
            return Err(AppError::validation("counts.batch_size must be > 0"));
        }
        if self.counts.account_default > MAX_COUNT || self.counts.single_account_default > MAX_COUNT
        {
            return Err(AppError::validation(format!(
                "account depth defaults must not exceed {MAX_COUNT}"
            )));
        }
        if self.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(AppError::validation(format!(
                "timezone '{}' is not a known IANA zone",
                self.timezone
            )));
        }
        for (name, value) in [
            ("tables.data_table", &self.tables.data_table),
            ("tables.account_table", &self.tables.account_table),
            ("tables.progress_table", &self.tables.progress_table),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("{name} is empty")));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: defaults::timezone(),
            http: HttpConfig::default(),
            throttle: ThrottleConfig::default(),
            counts: CountConfig::default(),
            tables: TableConfig::default(),
            sheet: SheetConfig::default(),
            endpoints: EndpointConfig::default(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Connection setup timeout in seconds
    #[serde(default = "defaults::connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            connect_timeout_secs: defaults::connect_timeout(),
            request_timeout_secs: defaults::request_timeout(),
        }
    }
}

/// Fixed delays that keep third-party rate limits happy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    #[serde(default = "defaults::instagram_item_delay")]
    pub instagram_item_ms: u64,

    #[serde(default = "defaults::vk_item_delay")]
    pub vk_item_ms: u64,

    #[serde(default)]
    pub youtube_item_ms: u64,

    #[serde(default)]
    pub tiktok_item_ms: u64,

    /// Delay between account pages, all platforms
    #[serde(default = "defaults::page_delay")]
    pub page_delay_ms: u64,
}

impl ThrottleConfig {
    /// Delay before each single-item fetch on the given platform.
    pub fn item_delay(&self, parsing_type: ParsingType) -> Duration {
        let ms = match parsing_type {
            ParsingType::Instagram => self.instagram_item_ms,
            ParsingType::VK => self.vk_item_ms,
            ParsingType::YouTube => self.youtube_item_ms,
            ParsingType::TikTok => self.tiktok_item_ms,
            ParsingType::Telegram | ParsingType::Unknown => 0,
        };
        Duration::from_millis(ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// No delays at all (tests, dry runs).
    pub fn none() -> Self {
        Self {
            instagram_item_ms: 0,
            vk_item_ms: 0,
            youtube_item_ms: 0,
            tiktok_item_ms: 0,
            page_delay_ms: 0,
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            instagram_item_ms: defaults::instagram_item_delay(),
            vk_item_ms: defaults::vk_item_delay(),
            youtube_item_ms: 0,
            tiktok_item_ms: 0,
            page_delay_ms: defaults::page_delay(),
        }
    }
}

/// Depth defaults per call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountConfig {
    /// Depth used when the sheet's depth cell is empty or invalid
    #[serde(default = "defaults::sheet_count")]
    pub sheet_default: i64,

    /// Depth for account jobs when the row asks for `<= 0`
    #[serde(default = "defaults::account_count")]
    pub account_default: usize,

    /// Depth for a single-account request
    #[serde(default = "defaults::single_account_count")]
    pub single_account_default: usize,

    /// Items per orchestrator batch
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,
}

impl Default for CountConfig {
    fn default() -> Self {
        Self {
            sheet_default: defaults::sheet_count(),
            account_default: defaults::account_count(),
            single_account_default: defaults::single_account_count(),
            batch_size: defaults::batch_size(),
        }
    }
}

/// Output table names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default = "defaults::data_table")]
    pub data_table: String,

    #[serde(default = "defaults::account_table")]
    pub account_table: String,

    #[serde(default = "defaults::progress_table")]
    pub progress_table: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            data_table: defaults::data_table(),
            account_table: defaults::account_table(),
            progress_table: defaults::progress_table(),
        }
    }
}

/// Keywords used to locate input columns in the header row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// 1-based header row; data starts on the next row
    #[serde(default = "defaults::header_row")]
    pub header_row: usize,

    #[serde(default = "defaults::link_keyword")]
    pub link_keyword: String,

    #[serde(default = "defaults::video_keyword")]
    pub video_keyword: String,

    #[serde(default = "defaults::account_keyword")]
    pub account_keyword: String,

    #[serde(default = "defaults::select_keyword")]
    pub select_keyword: String,

    #[serde(default = "defaults::depth_keyword")]
    pub depth_keyword: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            header_row: defaults::header_row(),
            link_keyword: defaults::link_keyword(),
            video_keyword: defaults::video_keyword(),
            account_keyword: defaults::account_keyword(),
            select_keyword: defaults::select_keyword(),
            depth_keyword: defaults::depth_keyword(),
        }
    }
}

/// Provider base URLs. RapidAPI host headers are derived from these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "defaults::instagram_base")]
    pub instagram: String,

    #[serde(default = "defaults::vk_api_base")]
    pub vk_api: String,

    #[serde(default = "defaults::vk_api_version")]
    pub vk_api_version: String,

    #[serde(default = "defaults::vk_clips_base")]
    pub vk_clips: String,

    #[serde(default = "defaults::youtube_base")]
    pub youtube: String,

    #[serde(default = "defaults::tiktok_base")]
    pub tiktok: String,
}

impl EndpointConfig {
    /// Point every provider at one base URL (mock servers).
    pub fn all_at(base: &str) -> Self {
        Self {
            instagram: base.to_string(),
            vk_api: base.to_string(),
            vk_api_version: defaults::vk_api_version(),
            vk_clips: base.to_string(),
            youtube: base.to_string(),
            tiktok: base.to_string(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            instagram: defaults::instagram_base(),
            vk_api: defaults::vk_api_base(),
            vk_api_version: defaults::vk_api_version(),
            vk_clips: defaults::vk_clips_base(),
            youtube: defaults::youtube_base(),
            tiktok: defaults::tiktok_base(),
        }
    }
}

/// API credentials. Missing values surface per call, not at startup.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub rapidapi_key: Option<String>,
    pub vk_access_token: Option<String>,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Self {
        Self {
            rapidapi_key: non_empty_env(RAPIDAPI_KEY_ENV),
            vk_access_token: non_empty_env(VK_ACCESS_TOKEN_ENV),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

mod defaults {
    pub fn timezone() -> String {
        "Europe/Moscow".into()
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; social-crawler/0.1)".into()
    }
    pub fn connect_timeout() -> u64 {
        10
    }
    pub fn request_timeout() -> u64 {
        60
    }

    // Throttle defaults
    pub fn instagram_item_delay() -> u64 {
        550
    }
    pub fn vk_item_delay() -> u64 {
        250
    }
    pub fn page_delay() -> u64 {
        500
    }

    // Count defaults
    pub fn sheet_count() -> i64 {
        20
    }
    pub fn account_count() -> usize {
        12
    }
    pub fn single_account_count() -> usize {
        20
    }
    pub fn batch_size() -> usize {
        50
    }

    // Table defaults
    pub fn data_table() -> String {
        "Сырые данные".into()
    }
    pub fn account_table() -> String {
        "Данные аккаунтов".into()
    }
    pub fn progress_table() -> String {
        "Прогресс".into()
    }

    // Sheet defaults
    pub fn header_row() -> usize {
        2
    }
    pub fn link_keyword() -> String {
        "ссылка".into()
    }
    pub fn video_keyword() -> String {
        "видео".into()
    }
    pub fn account_keyword() -> String {
        "аккаунт".into()
    }
    pub fn select_keyword() -> String {
        "парсинг".into()
    }
    pub fn depth_keyword() -> String {
        "глубина".into()
    }

    // Endpoint defaults
    pub fn instagram_base() -> String {
        "https://real-time-instagram-scraper-api1.p.rapidapi.com".into()
    }
    pub fn vk_api_base() -> String {
        "https://api.vk.com/method".into()
    }
    pub fn vk_api_version() -> String {
        "5.199".into()
    }
    pub fn vk_clips_base() -> String {
        "https://vk-scraper.p.rapidapi.com/api/v1".into()
    }
    pub fn youtube_base() -> String {
        "https://yt-api.p.rapidapi.com".into()
    }
    pub fn tiktok_base() -> String {
        "https://tiktok-scraper7.p.rapidapi.com".into()
    }
}
