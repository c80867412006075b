use async_trait::async_trait;

use super::{geocode, url_encode};
use crate::domain::Tool;
use crate::infrastructure::http::HttpClientTrait;

/// Current local time for a city, resolved through its timezone
#[derive(Debug)]
pub struct WorldTimeTool<C: HttpClientTrait> {
    client: C,
}

impl<C: HttpClientTrait> WorldTimeTool<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: HttpClientTrait> Tool for WorldTimeTool<C> {
    fn name(&self) -> &'static str {
        "world_time"
    }

    fn description(&self) -> &'static str {
        "Get the current local time for a city. Input should be a city name like \
         'Hyderabad' or 'Tokyo'."
    }

    async fn invoke(&self, input: &str) -> String {
        let location = match geocode(&self.client, input).await {
            Ok(Some(location)) => location,
            Ok(None) => return format!("No location found for {}.", input),
            Err(e) => return format!("Time lookup failed: {}", e),
        };

        let url = format!(
            "https://worldtimeapi.org/api/timezone/{}",
            url_encode(&location.timezone)
        );

        match self.client.get_json(&url, vec![]).await {
            Ok(json) => format!(
                "Local time in {}, {} ({}): {}",
                location.name,
                location.country,
                location.timezone,
                json["datetime"].as_str().unwrap_or_default(),
            ),
            Err(e) => format!("Time lookup failed: {}", e),
        }
    }
}
