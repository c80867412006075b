use async_trait::async_trait;

use super::url_encode;
use crate::domain::Tool;
use crate::infrastructure::http::HttpClientTrait;

/// Google results via SerpAPI (keyed)
#[derive(Debug)]
pub struct SerpApiSearchTool<C: HttpClientTrait> {
    client: C,
    api_key: String,
}

impl<C: HttpClientTrait> SerpApiSearchTool<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> Tool for SerpApiSearchTool<C> {
    fn name(&self) -> &'static str {
        "serpapi_search"
    }

    fn description(&self) -> &'static str {
        "A search engine. Useful for when you need to answer questions about current \
         events. Input should be a search query."
    }

    async fn invoke(&self, input: &str) -> String {
        let url = format!(
            "https://serpapi.com/search.json?q={}&api_key={}",
            url_encode(input.trim()),
            self.api_key
        );

        match self.client.get_json(&url, vec![]).await {
            Ok(json) => {
                let results = json["organic_results"]
                    .as_array()
                    .cloned()
                    .unwrap_or_default();
                if results.is_empty() {
                    return "No results".to_string();
                }

                results
                    .iter()
                    .take(3)
                    .enumerate()
                    .map(|(i, r)| {
                        let title = r["title"].as_str().unwrap_or_default();
                        let link = r["link"].as_str().unwrap_or_default();
                        let snippet = r["snippet"].as_str().unwrap_or_default();
                        format!("{}. {}\n   {}\n   {}", i + 1, title, link, snippet)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Err(e) => format!("Search failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::mock::MockHttpClient;

    const SEARCH_URL: &str = "https://serpapi.com/search.json?q=rust%20lang&api_key=serp-key";

    #[tokio::test]
    async fn test_search_results() {
        let http = MockHttpClient::new().with_json_response(
            SEARCH_URL,
            serde_json::json!({
                "organic_results": [{
                    "title": "Rust Programming Language",
                    "link": "https://www.rust-lang.org",
                    "snippet": "A language empowering everyone"
                }]
            }),
        );

        let tool = SerpApiSearchTool::new(http, "serp-key");
        let output = tool.invoke("rust lang").await;

        assert!(output.contains("Rust Programming Language"));
        assert!(output.contains("https://www.rust-lang.org"));
    }

    #[tokio::test]
    async fn test_network_failure_is_text() {
        let http = MockHttpClient::new().with_error(SEARCH_URL, "offline");

        let tool = SerpApiSearchTool::new(http, "serp-key");
        assert!(tool.invoke("rust lang").await.starts_with("Search failed:"));
    }
}
