// src/models/row.rs

//! Canonical output rows and the raw counters they are built from.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single table cell.
pub type Cell = Value;

/// Publish moment as delivered by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Published {
    /// Unix seconds
    Unix(i64),
    /// Provider-formatted date text, passed through as is
    Text(String),
    /// Nothing known; rendered as `"unknown"`
    #[default]
    Unknown,
}

/// Provider-neutral raw counters for one item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawMetrics {
    /// Canonical item URL, when the provider knows it (account listings)
    pub url: Option<String>,
    pub description: String,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub published: Published,
}

/// Canonical output record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub url: String,
    pub description: String,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub er: String,
    pub virality: String,
    pub parsing_date: String,
    pub publish_date: String,
}

impl ResultRow {
    /// Whether this row is a zero-metric substitute for a failed fetch.
    pub fn is_placeholder(&self) -> bool {
        self.publish_date == "unknown" && self.views == 0 && self.likes == 0
    }

    /// Cells in data-table column order.
    pub fn to_cells(&self) -> Vec<Cell> {
        vec![
            Value::from(self.url.clone()),
            Value::from(self.views),
            Value::from(self.likes),
            Value::from(self.comments),
            Value::from(self.shares),
            Value::from(self.er.clone()),
            Value::from(self.virality.clone()),
            Value::from(self.parsing_date.clone()),
            Value::from(self.publish_date.clone()),
            Value::from(self.description.clone()),
        ]
    }
}

/// A row collected for an account, tagged with the account it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRow {
    pub account_url: String,
    #[serde(flatten)]
    pub row: ResultRow,
}

impl AccountRow {
    pub fn new(account_url: impl Into<String>, row: ResultRow) -> Self {
        Self {
            account_url: account_url.into(),
            row,
        }
    }

    /// Cells in account-table column order.
    pub fn to_cells(&self) -> Vec<Cell> {
        let row = &self.row;
        vec![
            Value::from(self.account_url.clone()),
            Value::from(row.url.clone()),
            Value::from(row.views),
            Value::from(row.likes),
            Value::from(row.comments),
            Value::from(row.shares),
            Value::from(row.er.clone()),
            Value::from(row.virality.clone()),
            Value::from(row.parsing_date.clone()),
            Value::from(row.publish_date.clone()),
            Value::from(row.description.clone()),
        ]
    }
}
