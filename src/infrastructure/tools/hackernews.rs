use async_trait::async_trait;

use super::url_encode;
use crate::domain::Tool;
use crate::infrastructure::http::HttpClientTrait;

/// Hacker News story search via the Algolia API
#[derive(Debug)]
pub struct HackerNewsSearchTool<C: HttpClientTrait> {
    client: C,
}

impl<C: HttpClientTrait> HackerNewsSearchTool<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: HttpClientTrait> Tool for HackerNewsSearchTool<C> {
    fn name(&self) -> &'static str {
        "hn_search"
    }

    fn description(&self) -> &'static str {
        "Search Hacker News via Algolia. Input should be a query string. Returns top \
         stories with titles and URLs."
    }

    async fn invoke(&self, input: &str) -> String {
        let url = format!(
            "https://hn.algolia.com/api/v1/search?query={}",
            url_encode(input.trim())
        );

        match self.client.get_json(&url, vec![]).await {
            Ok(json) => {
                let hits = json["hits"].as_array().cloned().unwrap_or_default();
                if hits.is_empty() {
                    return "No results".to_string();
                }

                hits.iter()
                    .take(5)
                    .enumerate()
                    .map(|(i, hit)| {
                        let title = hit["title"].as_str().unwrap_or_default();
                        let url = hit["url"]
                            .as_str()
                            .or_else(|| hit["story_url"].as_str())
                            .unwrap_or_default();
                        format!("{}. {}\n   {}", i + 1, title, url)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Err(e) => format!("HN search failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::mock::MockHttpClient;

    const SEARCH_URL: &str = "https://hn.algolia.com/api/v1/search?query=rust";

    #[tokio::test]
    async fn test_search_results() {
        let http = MockHttpClient::new().with_json_response(
            SEARCH_URL,
            serde_json::json!({
                "hits": [
                    {"title": "Rust 2.0", "url": "https://example.com/rust2"},
                    {"title": "Ask HN", "story_url": "https://example.com/ask"}
                ]
            }),
        );

        let tool = HackerNewsSearchTool::new(http);
        let output = tool.invoke("rust").await;

        assert!(output.contains("1. Rust 2.0\n   https://example.com/rust2"));
        assert!(output.contains("2. Ask HN\n   https://example.com/ask"));
    }

    #[tokio::test]
    async fn test_no_results() {
        let http =
            MockHttpClient::new().with_json_response(SEARCH_URL, serde_json::json!({"hits": []}));

        let tool = HackerNewsSearchTool::new(http);
        assert_eq!(tool.invoke("rust").await, "No results");
    }

    #[tokio::test]
    async fn test_network_failure_is_text() {
        let http = MockHttpClient::new().with_error(SEARCH_URL, "socket closed");

        let tool = HackerNewsSearchTool::new(http);
        assert!(tool.invoke("rust").await.starts_with("HN search failed:"));
    }
}
