use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::url_encode;
use crate::domain::Tool;
use crate::infrastructure::http::HttpClientTrait;

static ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<entry>.*?<title>(.*?)</title>.*?<id>(.*?)</id>.*?</entry>")
        .expect("valid arxiv entry pattern")
});

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid pattern"));

/// Academic paper search against the arXiv Atom feed
#[derive(Debug)]
pub struct ArxivSearchTool<C: HttpClientTrait> {
    client: C,
}

impl<C: HttpClientTrait> ArxivSearchTool<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: HttpClientTrait> Tool for ArxivSearchTool<C> {
    fn name(&self) -> &'static str {
        "arxiv_search"
    }

    fn description(&self) -> &'static str {
        "Search arXiv for academic papers. Input should be a query string; returns top 3 \
         results with titles and links."
    }

    async fn invoke(&self, input: &str) -> String {
        let url = format!(
            "http://export.arxiv.org/api/query?search_query=all:{}&start=0&max_results=3",
            url_encode(input.trim())
        );

        match self.client.get_text(&url, vec![]).await {
            Ok(feed) => {
                let items: Vec<String> = ENTRY_RE
                    .captures_iter(&feed)
                    .take(3)
                    .map(|caps| {
                        let title = WHITESPACE_RE.replace_all(caps[1].trim(), " ");
                        let link = caps[2].trim();
                        format!("- {}\n  {}", title, link)
                    })
                    .collect();

                if items.is_empty() {
                    return "No results".to_string();
                }

                format!("Top arXiv results:\n{}", items.join("\n"))
            }
            Err(e) => format!("arXiv search failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::mock::MockHttpClient;

    const QUERY_URL: &str =
        "http://export.arxiv.org/api/query?search_query=all:attention&start=0&max_results=3";

    #[tokio::test]
    async fn test_parses_atom_entries() {
        let feed = "<feed>\
            <entry><title>Attention Is\n  All You Need</title>\
            <id>http://arxiv.org/abs/1706.03762</id></entry>\
            <entry><title>Second Paper</title>\
            <id>http://arxiv.org/abs/2000.00001</id></entry>\
            </feed>";

        let http = MockHttpClient::new().with_text_response(QUERY_URL, feed);
        let tool = ArxivSearchTool::new(http);

        let output = tool.invoke("attention").await;
        assert!(output.starts_with("Top arXiv results:"));
        assert!(output.contains("- Attention Is All You Need\n  http://arxiv.org/abs/1706.03762"));
        assert!(output.contains("Second Paper"));
    }

    #[tokio::test]
    async fn test_no_entries() {
        let http = MockHttpClient::new().with_text_response(QUERY_URL, "<feed></feed>");
        let tool = ArxivSearchTool::new(http);

        assert_eq!(tool.invoke("attention").await, "No results");
    }

    #[tokio::test]
    async fn test_network_failure_is_text() {
        let http = MockHttpClient::new().with_error(QUERY_URL, "503 from upstream");
        let tool = ArxivSearchTool::new(http);

        assert!(tool
            .invoke("attention")
            .await
            .starts_with("arXiv search failed:"));
    }
}
