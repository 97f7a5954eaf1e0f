// src/services/registry.rs

//! Platform-to-provider lookup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Config, Credentials, ParsingType};
use crate::services::{
    InstagramProvider, PlatformProvider, TikTokProvider, VkProvider, YouTubeProvider,
};
use crate::utils::http::ApiClient;

/// Maps each supported platform to its provider.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ParsingType, Arc<dyn PlatformProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider sharing one HTTP client.
    pub fn from_config(config: &Config, credentials: &Credentials) -> Result<Self> {
        let api = ApiClient::new(&config.http)?;

        let mut registry = Self::new();
        registry.register(Arc::new(InstagramProvider::new(
            api.clone(),
            config,
            credentials,
        )));
        registry.register(Arc::new(VkProvider::new(api.clone(), config, credentials)));
        registry.register(Arc::new(YouTubeProvider::new(
            api.clone(),
            config,
            credentials,
        )));
        registry.register(Arc::new(TikTokProvider::new(api, config, credentials)));

        log::debug!("Registered providers: {:?}", registry.platforms());
        Ok(registry)
    }

    /// Add or replace the provider for its platform.
    pub fn register(&mut self, provider: Arc<dyn PlatformProvider>) {
        self.providers.insert(provider.parsing_type(), provider);
    }

    pub fn get(&self, parsing_type: ParsingType) -> Option<Arc<dyn PlatformProvider>> {
        self.providers.get(&parsing_type).cloned()
    }

    /// Registered platforms in a stable order.
    pub fn platforms(&self) -> Vec<ParsingType> {
        let mut platforms: Vec<_> = self.providers.keys().copied().collect();
        platforms.sort_by_key(|p| p.as_str());
        platforms
    }
}
