use async_trait::async_trait;

use super::truncate;
use crate::domain::Tool;
use crate::infrastructure::http::HttpClientTrait;

const SEARCH_URL: &str = "https://api.exa.ai/search";
const ANSWER_URL: &str = "https://api.exa.ai/answer";

/// Web search via the Exa neural search API
#[derive(Debug)]
pub struct ExaSearchTool<C: HttpClientTrait> {
    client: C,
    api_key: String,
}

impl<C: HttpClientTrait> ExaSearchTool<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> Tool for ExaSearchTool<C> {
    fn name(&self) -> &'static str {
        "exa_search"
    }

    fn description(&self) -> &'static str {
        "Search the web for current information. Useful for finding recent news, facts, \
         or data. Input should be a search query."
    }

    async fn invoke(&self, input: &str) -> String {
        let body = serde_json::json!({
            "query": input,
            "numResults": 5,
            "type": "neural",
            "useAutoprompt": true,
        });

        let response = self
            .client
            .post_json(SEARCH_URL, exa_headers(&self.api_key), &body)
            .await;

        match response {
            Ok(json) => {
                let results = json["results"].as_array().cloned().unwrap_or_default();
                if results.is_empty() {
                    return "No search results found for the given query.".to_string();
                }

                let formatted: Vec<String> = results
                    .iter()
                    .enumerate()
                    .map(|(i, r)| {
                        let title = r["title"].as_str().unwrap_or_default();
                        let url = r["url"].as_str().unwrap_or_default();
                        let content = match r["text"].as_str() {
                            Some(text) => format!("   Content: {}\n", truncate(text, 200)),
                            None => String::new(),
                        };
                        format!("{}. {}\n   URL: {}\n{}", i + 1, title, url, content)
                    })
                    .collect();

                format!(
                    "Search results for \"{}\":\n\n{}",
                    input,
                    formatted.join("\n")
                )
            }
            Err(e) => format!("Error performing search: {}", e),
        }
    }
}

/// Exa search that also retrieves page content for detailed research
#[derive(Debug)]
pub struct ExaSearchAndContentTool<C: HttpClientTrait> {
    client: C,
    api_key: String,
}

impl<C: HttpClientTrait> ExaSearchAndContentTool<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> Tool for ExaSearchAndContentTool<C> {
    fn name(&self) -> &'static str {
        "exa_search_with_content"
    }

    fn description(&self) -> &'static str {
        "Search the web and retrieve full content of results. Useful for detailed research \
         and analysis. Input should be a search query."
    }

    async fn invoke(&self, input: &str) -> String {
        let body = serde_json::json!({
            "query": input,
            "numResults": 3,
            "type": "neural",
            "useAutoprompt": true,
            "contents": {"text": true},
        });

        let response = self
            .client
            .post_json(SEARCH_URL, exa_headers(&self.api_key), &body)
            .await;

        match response {
            Ok(json) => {
                let results = json["results"].as_array().cloned().unwrap_or_default();
                if results.is_empty() {
                    return "No search results found for the given query.".to_string();
                }

                let formatted: Vec<String> = results
                    .iter()
                    .enumerate()
                    .map(|(i, r)| {
                        let title = r["title"].as_str().unwrap_or_default();
                        let url = r["url"].as_str().unwrap_or_default();
                        let content = match r["text"].as_str() {
                            Some(text) => truncate(text, 500),
                            None => "No content available".to_string(),
                        };
                        format!("{}. {}\n   URL: {}\n   Content: {}\n", i + 1, title, url, content)
                    })
                    .collect();

                format!(
                    "Detailed search results for \"{}\":\n\n{}",
                    input,
                    formatted.join("\n")
                )
            }
            Err(e) => format!("Error performing search: {}", e),
        }
    }
}

/// Direct question answering backed by Exa web search
#[derive(Debug)]
pub struct ExaAnswerTool<C: HttpClientTrait> {
    client: C,
    api_key: String,
}

impl<C: HttpClientTrait> ExaAnswerTool<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> Tool for ExaAnswerTool<C> {
    fn name(&self) -> &'static str {
        "exa_answer"
    }

    fn description(&self) -> &'static str {
        "Get direct answers to questions using web search. Useful for factual questions \
         and current information. Input should be a question."
    }

    async fn invoke(&self, input: &str) -> String {
        let body = serde_json::json!({"query": input, "text": true});

        let response = self
            .client
            .post_json(ANSWER_URL, exa_headers(&self.api_key), &body)
            .await;

        match response {
            Ok(json) => {
                let answer = json["answer"].as_str().unwrap_or_default();
                let citations = json["citations"]
                    .as_array()
                    .map(|cites| {
                        cites
                            .iter()
                            .filter_map(|c| c["title"].as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "No citations available".to_string());

                format!("Answer: {}\n\nSources: {}", answer, citations)
            }
            Err(e) => format!("Error getting answer: {}", e),
        }
    }
}

fn exa_headers(api_key: &str) -> Vec<(&str, &str)> {
    vec![("x-api-key", api_key), ("Content-Type", "application/json")]
}
