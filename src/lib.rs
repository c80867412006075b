//! Parrot Gateway
//!
//! A chat gateway over multiple hosted LLM providers with support for:
//! - A static provider/model catalog with per-request client construction
//! - Plain streaming chat, a tool-calling agent mode, and structured output
//! - Credential format validation and live connectivity probing

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::collections::HashMap;

use api::AppState;
use domain::registry;
use infrastructure::agent::ToolSettings;
use infrastructure::http::HttpClient;
use tracing::info;

/// Create the application state from configuration and environment
///
/// Per-provider default keys and tool keys are read once here; a
/// request-supplied credential always takes precedence over these.
pub fn create_app_state(config: &AppConfig) -> AppState {
    let provider_keys: HashMap<&'static str, String> = registry::providers()
        .iter()
        .filter_map(|provider| {
            std::env::var(provider.api_key_env)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (provider.id, v))
        })
        .collect();

    if !provider_keys.is_empty() {
        info!(
            count = provider_keys.len(),
            "loaded default provider credentials from environment"
        );
    }

    AppState::new(
        config.chat.clone(),
        provider_keys,
        ToolSettings::from_env(),
        HttpClient::new(),
    )
}
