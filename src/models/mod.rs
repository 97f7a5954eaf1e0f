// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! Inputs, output rows and configuration, organized by their primary purpose.

mod config;
mod input;
mod parsing_type;
mod row;

// Re-export all public types
pub use config::{
    Config, CountConfig, Credentials, EndpointConfig, HttpConfig, RAPIDAPI_KEY_ENV, SheetConfig,
    TableConfig, ThrottleConfig, VK_ACCESS_TOKEN_ENV,
};
pub use input::{AccountInfo, GroupInfoPair, MAX_COUNT, UrlInfo, clamp_count};
pub use parsing_type::ParsingType;
pub use row::{AccountRow, Cell, Published, RawMetrics, ResultRow};
