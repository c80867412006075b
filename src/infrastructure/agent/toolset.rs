use std::sync::Arc;

use tracing::debug;

use crate::domain::Tool;
use crate::infrastructure::http::HttpClient;
use crate::infrastructure::tools::{
    ArxivSearchTool, CalculatorTool, CryptoPriceTool, ExaAnswerTool, ExaSearchAndContentTool,
    ExaSearchTool, ExchangeRateTool, HackerNewsSearchTool, OpenMeteoWeatherTool,
    SerpApiSearchTool, TavilySearchTool, WikipediaSearchTool, WorldTimeTool,
};

/// Credentials for the optionally-keyed tools, read once at startup
#[derive(Debug, Clone, Default)]
pub struct ToolSettings {
    pub exa_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
    pub serpapi_api_key: Option<String>,
    pub coingecko_api_key: Option<String>,
}

impl ToolSettings {
    pub fn from_env() -> Self {
        Self {
            exa_api_key: env_key("EXA_API_KEY"),
            tavily_api_key: env_key("TAVILY_API_KEY"),
            serpapi_api_key: env_key("SERPAPI_API_KEY"),
            coingecko_api_key: env_key("COINGECKO_DEMO_API_KEY"),
        }
    }
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Assemble the toolset for one agent request
///
/// Built-in tools are always present. Keyed tools join only when their
/// credential is configured; a keyless tool is omitted, never inserted in a
/// broken state. A request-supplied Exa key overrides the configured one.
pub fn assemble_toolset(
    settings: &ToolSettings,
    exa_key_override: Option<&str>,
    http: &HttpClient,
) -> Vec<Arc<dyn Tool>> {
    let mut tools: Vec<Arc<dyn Tool>> = vec![Arc::new(CalculatorTool::new())];

    let exa_key = exa_key_override
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| settings.exa_api_key.clone());

    if let Some(key) = exa_key {
        tools.push(Arc::new(ExaSearchTool::new(http.clone(), key.clone())));
        tools.push(Arc::new(ExaSearchAndContentTool::new(
            http.clone(),
            key.clone(),
        )));
        tools.push(Arc::new(ExaAnswerTool::new(http.clone(), key)));
    }

    if let Some(key) = &settings.tavily_api_key {
        tools.push(Arc::new(TavilySearchTool::new(http.clone(), key.clone())));
    }

    if let Some(key) = &settings.serpapi_api_key {
        tools.push(Arc::new(SerpApiSearchTool::new(http.clone(), key.clone())));
    }

    tools.push(Arc::new(WikipediaSearchTool::new(http.clone())));
    tools.push(Arc::new(OpenMeteoWeatherTool::new(http.clone())));
    tools.push(Arc::new(WorldTimeTool::new(http.clone())));
    tools.push(Arc::new(ExchangeRateTool::new(http.clone())));
    tools.push(Arc::new(CryptoPriceTool::new(
        http.clone(),
        settings.coingecko_api_key.clone(),
    )));
    tools.push(Arc::new(ArxivSearchTool::new(http.clone())));
    tools.push(Arc::new(HackerNewsSearchTool::new(http.clone())));

    debug!(count = tools.len(), "assembled toolset");
    tools
}
