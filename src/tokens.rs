//! Token types and the tradable-token registry.

use alloy_primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use serde::{ Deserialize, Serialize };
use serde_json::Value;
use std::time::Duration;

use crate::chains::{ Chain, NATIVE_TOKEN_ADDRESS };
use crate::errors::{ Error, Result };

/// A tradable token on one chain. The address is the primary key; the
/// chain's native currency uses the zero-address sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub is_native: bool,
}

impl Token {
    /// The chain's native currency (18 decimals, zero address).
    pub fn native(chain: Chain) -> Token {
        let currency = chain.info().currency;
        Token {
            address: NATIVE_TOKEN_ADDRESS,
            symbol: currency.to_string(),
            name: format!("Native {}", currency),
            decimals: 18,
            is_native: true,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.symbol, self.address)
    }
}

/// Full tradable token list for a chain, owned by the external SDK.
#[async_trait]
pub trait TokenRegistry: Send + Sync {
    async fn all_tokens(&self, chain: Chain) -> Result<Vec<Token>>;
}

/// HTTP-backed registry hitting the SDK token-list endpoint.
pub struct HttpTokenRegistry {
    client: Client,
    base_url: String,
}

impl HttpTokenRegistry {
    pub fn new(base_url: String, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| Error::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    fn parse_token(value: &Value) -> Option<Token> {
        Some(Token {
            address: value["address"].as_str()?.parse().ok()?,
            symbol: value["symbol"].as_str()?.to_string(),
            name: value["name"].as_str()?.to_string(),
            decimals: value["decimals"].as_u64()? as u8,
            is_native: false,
        })
    }
}

#[async_trait]
impl TokenRegistry for HttpTokenRegistry {
    async fn all_tokens(&self, chain: Chain) -> Result<Vec<Token>> {
        let url = format!("{}/tokens", self.base_url);

        let response = self.client
            .get(&url)
            .query(&[("chainId", chain.id().to_string())])
            .send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Token(format!("token list fetch failed ({}): {}", status, error_text)));
        }

        let tokens: Vec<Value> = response.json().await?;

        // Entries missing any required field are skipped, not fatal.
        Ok(tokens.iter().filter_map(Self::parse_token).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_native_token() {
        let matic = Token::native(Chain::Polygon);
        assert_eq!(matic.address, NATIVE_TOKEN_ADDRESS);
        assert_eq!(matic.symbol, "MATIC");
        assert_eq!(matic.name, "Native MATIC");
        assert_eq!(matic.decimals, 18);
        assert!(matic.is_native);

        let eth = Token::native(Chain::Arbitrum);
        assert_eq!(eth.symbol, "ETH");
    }

    #[test]
    fn test_parse_token() {
        let value = json!({
            "address": "0x2791bca1f2de4661ed88a30c99a7a9449aa84174",
            "symbol": "USDC",
            "name": "USD Coin",
            "decimals": 6
        });
        let token = HttpTokenRegistry::parse_token(&value).unwrap();
        assert_eq!(token.symbol, "USDC");
        assert_eq!(token.decimals, 6);
        assert!(!token.is_native);
    }

    #[test]
    fn test_parse_token_skips_malformed() {
        assert!(HttpTokenRegistry::parse_token(&json!({ "symbol": "X" })).is_none());
        assert!(
            HttpTokenRegistry::parse_token(
                &json!({ "address": "not-an-address", "symbol": "X", "name": "X", "decimals": 18 })
            ).is_none()
        );
    }
}
