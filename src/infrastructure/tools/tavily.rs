use async_trait::async_trait;

use super::truncate;
use crate::domain::Tool;
use crate::infrastructure::http::HttpClientTrait;

const SEARCH_URL: &str = "https://api.tavily.com/search";

/// Web search via the Tavily API (keyed)
#[derive(Debug)]
pub struct TavilySearchTool<C: HttpClientTrait> {
    client: C,
    api_key: String,
}

impl<C: HttpClientTrait> TavilySearchTool<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> Tool for TavilySearchTool<C> {
    fn name(&self) -> &'static str {
        "tavily_search"
    }

    fn description(&self) -> &'static str {
        "A search engine optimized for comprehensive, accurate, and trusted results. \
         Useful for answering questions about current events. Input should be a search query."
    }

    async fn invoke(&self, input: &str) -> String {
        let body = serde_json::json!({
            "api_key": self.api_key,
            "query": input,
            "max_results": 3,
        });

        let response = self
            .client
            .post_json(SEARCH_URL, vec![("Content-Type", "application/json")], &body)
            .await;

        match response {
            Ok(json) => {
                let results = json["results"].as_array().cloned().unwrap_or_default();
                if results.is_empty() {
                    return "No results".to_string();
                }

                results
                    .iter()
                    .take(3)
                    .enumerate()
                    .map(|(i, r)| {
                        let title = r["title"].as_str().unwrap_or_default();
                        let url = r["url"].as_str().unwrap_or_default();
                        let content = truncate(r["content"].as_str().unwrap_or_default(), 200);
                        format!("{}. {}\n   {}\n   {}", i + 1, title, url, content)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Err(e) => format!("Tavily search failed: {}", e),
        }
    }
}
