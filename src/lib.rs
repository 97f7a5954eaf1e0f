// src/lib.rs

//! Social Crawler Library
//!
//! Collects engagement metrics (views, likes, comments, shares) for
//! Instagram, VK, YouTube and TikTok content and writes normalized rows
//! into spreadsheet-like tables.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

pub use error::{AppError, Result};
pub use pipeline::{JobContext, JobHandle, JobReport, JobRunner};
