use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ChatConfig;
use crate::infrastructure::agent::ToolSettings;
use crate::infrastructure::http::HttpClient;

/// Shared application state
///
/// Holds configuration only: clients are created per request and never live
/// here, so no credential outlasts its request.
#[derive(Clone)]
pub struct AppState {
    pub chat: ChatConfig,
    /// Default provider credentials found in the environment at startup;
    /// a request-supplied key always takes precedence
    pub provider_keys: Arc<HashMap<&'static str, String>>,
    pub tool_settings: Arc<ToolSettings>,
    pub http: HttpClient,
}

impl AppState {
    pub fn new(
        chat: ChatConfig,
        provider_keys: HashMap<&'static str, String>,
        tool_settings: ToolSettings,
        http: HttpClient,
    ) -> Self {
        Self {
            chat,
            provider_keys: Arc::new(provider_keys),
            tool_settings: Arc::new(tool_settings),
            http,
        }
    }
}

#[cfg(test)]
impl Default for AppState {
    fn default() -> Self {
        Self::new(
            ChatConfig::default(),
            HashMap::new(),
            ToolSettings::default(),
            HttpClient::new(),
        )
    }
}
