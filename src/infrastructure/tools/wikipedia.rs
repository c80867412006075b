use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::url_encode;
use crate::domain::Tool;
use crate::infrastructure::http::HttpClientTrait;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));

/// Wikipedia article search via the MediaWiki API (no key required)
#[derive(Debug)]
pub struct WikipediaSearchTool<C: HttpClientTrait> {
    client: C,
}

impl<C: HttpClientTrait> WikipediaSearchTool<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: HttpClientTrait> Tool for WikipediaSearchTool<C> {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    fn description(&self) -> &'static str {
        "Look up a topic on Wikipedia. Input should be a search term. Returns summaries \
         of the top matching articles."
    }

    async fn invoke(&self, input: &str) -> String {
        let url = format!(
            "https://en.wikipedia.org/w/api.php?action=query&list=search&srsearch={}&srlimit=3&format=json",
            url_encode(input.trim())
        );

        match self.client.get_json(&url, vec![]).await {
            Ok(json) => {
                let results = json["query"]["search"]
                    .as_array()
                    .cloned()
                    .unwrap_or_default();
                if results.is_empty() {
                    return "No results".to_string();
                }

                let formatted: Vec<String> = results
                    .iter()
                    .take(3)
                    .enumerate()
                    .map(|(i, r)| {
                        let title = r["title"].as_str().unwrap_or_default();
                        let snippet =
                            TAG_RE.replace_all(r["snippet"].as_str().unwrap_or_default(), "");
                        format!("{}. {}\n   {}", i + 1, title, snippet)
                    })
                    .collect();

                format!("Wikipedia results:\n{}", formatted.join("\n"))
            }
            Err(e) => format!("Wikipedia lookup failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::mock::MockHttpClient;

    const SEARCH_URL: &str = "https://en.wikipedia.org/w/api.php?action=query&list=search&srsearch=rust&srlimit=3&format=json";

    #[tokio::test]
    async fn test_search_strips_markup() {
        let http = MockHttpClient::new().with_json_response(
            SEARCH_URL,
            serde_json::json!({
                "query": {"search": [{
                    "title": "Rust (programming language)",
                    "snippet": "<span class=\"searchmatch\">Rust</span> is a language"
                }]}
            }),
        );

        let tool = WikipediaSearchTool::new(http);
        let output = tool.invoke("rust").await;

        assert!(output.contains("1. Rust (programming language)"));
        assert!(output.contains("Rust is a language"));
        assert!(!output.contains("<span"));
    }

    #[tokio::test]
    async fn test_no_results() {
        let http = MockHttpClient::new()
            .with_json_response(SEARCH_URL, serde_json::json!({"query": {"search": []}}));

        let tool = WikipediaSearchTool::new(http);
        assert_eq!(tool.invoke("rust").await, "No results");
    }

    #[tokio::test]
    async fn test_network_failure_is_text() {
        let http = MockHttpClient::new().with_error(SEARCH_URL, "proxy error");

        let tool = WikipediaSearchTool::new(http);
        assert!(tool
            .invoke("rust")
            .await
            .starts_with("Wikipedia lookup failed:"));
    }
}
