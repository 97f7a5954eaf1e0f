// src/services/rapid.rs

//! RapidAPI request helper.

use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::RAPIDAPI_KEY_ENV;
use crate::utils::http::{ApiClient, build_url};
use crate::utils::url::host_of;

/// A RapidAPI-hosted endpoint: base URL, host header and key.
#[derive(Debug, Clone)]
pub struct RapidClient {
    api: ApiClient,
    key: Option<String>,
    base: String,
    host: String,
}

impl RapidClient {
    pub fn new(api: ApiClient, key: Option<String>, base: impl Into<String>) -> Self {
        let base = base.into();
        let host = host_of(&base).unwrap_or_default();
        Self {
            api,
            key,
            base,
            host,
        }
    }

    /// GET `path` under the base URL with RapidAPI headers.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let key = self
            .key
            .as_deref()
            .ok_or(AppError::MissingApiKey(RAPIDAPI_KEY_ENV))?;
        let url = build_url(&self.base, path, params)?;

        self.api
            .get_json(
                url,
                &[
                    ("x-rapidapi-key", key),
                    ("x-rapidapi-host", self.host.as_str()),
                    ("Accept", "application/json"),
                ],
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HttpConfig;

    #[tokio::test]
    async fn test_missing_key_fails_fast() {
        let api = ApiClient::new(&HttpConfig::default()).unwrap();
        let client = RapidClient::new(api, None, "https://yt-api.p.rapidapi.com");
        let err = client
            .get::<serde_json::Value>("/video/info", &[("id", "x")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingApiKey(_)));
    }

    #[test]
    fn test_host_derived_from_base() {
        let api = ApiClient::new(&HttpConfig::default()).unwrap();
        let client = RapidClient::new(api, Some("k".into()), "https://vk-scraper.p.rapidapi.com/api/v1");
        assert_eq!(client.host, "vk-scraper.p.rapidapi.com");
    }
}
