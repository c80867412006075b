use async_trait::async_trait;

use super::url_encode;
use crate::domain::Tool;
use crate::infrastructure::http::HttpClientTrait;

/// Crypto spot prices via the CoinGecko simple price API
///
/// Works without a key; a demo key raises the rate limit when configured.
#[derive(Debug)]
pub struct CryptoPriceTool<C: HttpClientTrait> {
    client: C,
    api_key: Option<String>,
}

impl<C: HttpClientTrait> CryptoPriceTool<C> {
    pub fn new(client: C, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }
}

#[async_trait]
impl<C: HttpClientTrait> Tool for CryptoPriceTool<C> {
    fn name(&self) -> &'static str {
        "crypto_price"
    }

    fn description(&self) -> &'static str {
        "Get crypto price. Input 'bitcoin usd' or 'ethereum eur'. Uses CoinGecko simple \
         price API."
    }

    async fn invoke(&self, input: &str) -> String {
        let mut parts = input.trim().split_whitespace();
        let (Some(coin_raw), Some(vs_raw)) = (parts.next(), parts.next()) else {
            return "Format: '<coin> <fiat>', e.g., 'bitcoin usd'.".to_string();
        };

        let coin = coin_raw.to_lowercase();
        let vs = vs_raw.to_lowercase();

        let url = format!(
            "https://api.coingecko.com/api/v3/simple/price?ids={}&vs_currencies={}",
            url_encode(&coin),
            url_encode(&vs)
        );

        let headers = match &self.api_key {
            Some(key) => vec![("x-cg-demo-api-key", key.as_str())],
            None => vec![],
        };

        match self.client.get_json(&url, headers).await {
            Ok(json) => {
                let price = &json[&coin][&vs];
                if price.is_null() {
                    "Price not available.".to_string()
                } else {
                    format!("{} = {} {}", coin, price, vs)
                }
            }
            Err(e) => format!("Crypto lookup failed: {}", e),
        }
    }
}
