use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::Tool;
use crate::infrastructure::http::HttpClientTrait;

static CONVERT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(\d+(?:\.\d+)?)\s+)?([A-Za-z]{3})\s+to\s+([A-Za-z]{3})$")
        .expect("valid fx pattern")
});

/// Currency conversion via exchangerate.host (no key required)
#[derive(Debug)]
pub struct ExchangeRateTool<C: HttpClientTrait> {
    client: C,
}

impl<C: HttpClientTrait> ExchangeRateTool<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: HttpClientTrait> Tool for ExchangeRateTool<C> {
    fn name(&self) -> &'static str {
        "fx_convert"
    }

    fn description(&self) -> &'static str {
        "Convert currency. Input formats: 'USD to INR', '100 USD to EUR'. Returns \
         converted amount."
    }

    async fn invoke(&self, input: &str) -> String {
        let Some(captures) = CONVERT_RE.captures(input.trim()) else {
            return "Invalid format. Try '100 USD to EUR' or 'USD to INR'.".to_string();
        };

        let amount: f64 = captures
            .get(1)
            .map(|m| m.as_str().parse().unwrap_or(1.0))
            .unwrap_or(1.0);
        let from = captures[2].to_uppercase();
        let to = captures[3].to_uppercase();

        let url = format!(
            "https://api.exchangerate.host/convert?from={}&to={}&amount={}",
            from, to, amount
        );

        match self.client.get_json(&url, vec![]).await {
            Ok(json) => match json["result"].as_f64() {
                Some(result) => format!("{} {} = {} {}", amount, from, result, to),
                None => "Conversion failed.".to_string(),
            },
            Err(e) => format!("FX conversion failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::mock::MockHttpClient;

    const CONVERT_URL: &str = "https://api.exchangerate.host/convert?from=USD&to=EUR&amount=100";

    #[tokio::test]
    async fn test_conversion() {
        let http = MockHttpClient::new()
            .with_json_response(CONVERT_URL, serde_json::json!({"result": 92.5}));

        let tool = ExchangeRateTool::new(http);
        assert_eq!(tool.invoke("100 usd to eur").await, "100 USD = 92.5 EUR");
    }

    #[tokio::test]
    async fn test_defaults_to_one_unit() {
        let url = "https://api.exchangerate.host/convert?from=USD&to=INR&amount=1";
        let http =
            MockHttpClient::new().with_json_response(url, serde_json::json!({"result": 83.2}));

        let tool = ExchangeRateTool::new(http);
        assert_eq!(tool.invoke("USD to INR").await, "1 USD = 83.2 INR");
    }

    #[tokio::test]
    async fn test_invalid_format() {
        let tool = ExchangeRateTool::new(MockHttpClient::new());
        assert_eq!(
            tool.invoke("dollars into euros please").await,
            "Invalid format. Try '100 USD to EUR' or 'USD to INR'."
        );
    }

    #[tokio::test]
    async fn test_missing_result_field() {
        let http =
            MockHttpClient::new().with_json_response(CONVERT_URL, serde_json::json!({"ok": false}));

        let tool = ExchangeRateTool::new(http);
        assert_eq!(tool.invoke("100 USD to EUR").await, "Conversion failed.");
    }

    #[tokio::test]
    async fn test_network_failure_is_text() {
        let http = MockHttpClient::new().with_error(CONVERT_URL, "unreachable");

        let tool = ExchangeRateTool::new(http);
        assert!(tool
            .invoke("100 USD to EUR")
            .await
            .starts_with("FX conversion failed:"));
    }
}
