use async_trait::async_trait;

use super::{geocode, url_encode};
use crate::domain::Tool;
use crate::infrastructure::http::HttpClientTrait;

/// Current weather via the Open-Meteo public API (no key required)
#[derive(Debug)]
pub struct OpenMeteoWeatherTool<C: HttpClientTrait> {
    client: C,
}

impl<C: HttpClientTrait> OpenMeteoWeatherTool<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: HttpClientTrait> Tool for OpenMeteoWeatherTool<C> {
    fn name(&self) -> &'static str {
        "open_meteo_weather"
    }

    fn description(&self) -> &'static str {
        "Get current weather for a place. Input should be a city name like 'Hyderabad' or \
         'Paris'. Returns temperature (\u{b0}C), humidity (%), wind (m/s), and a short summary."
    }

    async fn invoke(&self, input: &str) -> String {
        let location = match geocode(&self.client, input).await {
            Ok(Some(location)) => location,
            Ok(None) => return format!("No location found for {}.", input),
            Err(e) => return format!("Weather lookup failed: {}", e),
        };

        let url = format!(
            "https://api.open-meteo.com/v1/forecast?latitude={}&longitude={}&current=temperature_2m,relative_humidity_2m,wind_speed_10m,weather_code&timezone={}",
            location.latitude,
            location.longitude,
            url_encode(&location.timezone)
        );

        match self.client.get_json(&url, vec![]).await {
            Ok(json) => {
                let current = &json["current"];
                format!(
                    "Location: {}, {} (tz: {})\nTemperature: {} \u{b0}C\nHumidity: {} %\nWind: {} m/s\nWeatherCode: {}",
                    location.name,
                    location.country,
                    location.timezone,
                    current["temperature_2m"],
                    current["relative_humidity_2m"],
                    current["wind_speed_10m"],
                    current["weather_code"],
                )
            }
            Err(e) => format!("Weather lookup failed: {}", e),
        }
    }
}
