//! Tool adapters
//!
//! Each adapter wraps one external API behind the never-fails `Tool`
//! contract: failures come back as descriptive text the agent can read,
//! never as errors.

mod arxiv;
mod calculator;
mod crypto;
mod exa;
mod fx;
mod hackernews;
mod serpapi;
mod tavily;
mod time;
mod weather;
mod wikipedia;

pub use arxiv::ArxivSearchTool;
pub use calculator::CalculatorTool;
pub use crypto::CryptoPriceTool;
pub use exa::{ExaAnswerTool, ExaSearchAndContentTool, ExaSearchTool};
pub use fx::ExchangeRateTool;
pub use hackernews::HackerNewsSearchTool;
pub use serpapi::SerpApiSearchTool;
pub use tavily::TavilySearchTool;
pub use time::WorldTimeTool;
pub use weather::OpenMeteoWeatherTool;
pub use wikipedia::WikipediaSearchTool;

use crate::infrastructure::http::{HttpClientTrait, HttpError};

/// Percent-encode a query-string component (RFC 3986 unreserved set)
pub(crate) fn url_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());

    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            _ => {
                encoded.push_str(&format!("%{:02X}", byte));
            }
        }
    }

    encoded
}

/// A place resolved through the Open-Meteo geocoder
#[derive(Debug, Clone)]
pub(crate) struct Location {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

/// Resolve a city name to coordinates and timezone; `None` when unknown
pub(crate) async fn geocode<C: HttpClientTrait>(
    client: &C,
    place: &str,
) -> Result<Option<Location>, HttpError> {
    let url = format!(
        "https://geocoding-api.open-meteo.com/v1/search?name={}&count=1&language=en&format=json",
        url_encode(place.trim())
    );

    let json = client.get_json(&url, vec![]).await?;

    let Some(result) = json["results"].get(0) else {
        return Ok(None);
    };

    Ok(Some(Location {
        name: result["name"].as_str().unwrap_or_default().to_string(),
        country: result["country"].as_str().unwrap_or_default().to_string(),
        latitude: result["latitude"].as_f64().unwrap_or_default(),
        longitude: result["longitude"].as_f64().unwrap_or_default(),
        timezone: result["timezone"].as_str().unwrap_or_default().to_string(),
    }))
}

/// Truncate to a character limit, appending an ellipsis when cut
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}
