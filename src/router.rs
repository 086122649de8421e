//! Route finding and materialization (external SDK boundary).
//!
//! A route is an opaque plan for converting one token into another. It is
//! valid only for the exact (tokenIn, tokenOut, amount, direction, chain)
//! tuple it was computed for and must be discarded the moment any of those
//! change; the controller enforces that with request sequence numbers.

use alloy_primitives::{ Address, U256 };
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{ json, Value };
use std::time::Duration;

use crate::chains::Chain;
use crate::errors::{ Error, Result };
use crate::tokens::Token;

/// One execution step of a multi-step route.
#[derive(Debug, Clone)]
pub struct RouteStep {
    pub pool: String,
    pub token_in: Address,
    pub token_out: Address,
}

/// One side of a route with its estimated raw amount.
#[derive(Debug, Clone)]
pub struct RouteLeg {
    pub token: Token,
    pub amount: U256,
}

/// A computed swap plan. `raw` keeps the untouched SDK payload so the
/// materializer can round-trip it, the same way quote responses are passed
/// back to swap endpoints.
#[derive(Debug, Clone)]
pub struct Route {
    pub chain: Chain,
    pub is_exact_input: bool,
    pub token_in: RouteLeg,
    pub token_out: RouteLeg,
    pub steps: Vec<RouteStep>,
    pub raw: Value,
}

#[async_trait]
pub trait RouteFinder: Send + Sync {
    async fn find_route(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount: U256,
        chain: Chain,
        is_exact_input: bool
    ) -> Result<Route>;
}

/// Materializes a route into executable router calldata for an account.
#[async_trait]
pub trait RouteExecutor: Send + Sync {
    async fn build_calldata(&self, route: &Route, account: Address) -> Result<Vec<u8>>;
}

/// HTTP-backed route finder/materializer hitting the SDK API.
pub struct HttpRouter {
    client: Client,
    base_url: String,
}

impl HttpRouter {
    pub fn new(base_url: String, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| Error::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    fn parse_route(
        body: Value,
        token_in: &Token,
        token_out: &Token,
        chain: Chain,
        is_exact_input: bool
    ) -> Result<Route> {
        let amount_in = parse_amount(&body["tokenIn"]["amount"])?;
        let amount_out = parse_amount(&body["tokenOut"]["amount"])?;

        let steps = body["steps"]
            .as_array()
            .map(|steps| {
                steps
                    .iter()
                    .filter_map(|step| {
                        Some(RouteStep {
                            pool: step["pool"].as_str()?.to_string(),
                            token_in: step["tokenIn"].as_str()?.parse().ok()?,
                            token_out: step["tokenOut"].as_str()?.parse().ok()?,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Route {
            chain,
            is_exact_input,
            token_in: RouteLeg { token: token_in.clone(), amount: amount_in },
            token_out: RouteLeg { token: token_out.clone(), amount: amount_out },
            steps,
            raw: body,
        })
    }
}

fn parse_amount(value: &Value) -> Result<U256> {
    let text = value
        .as_str()
        .ok_or_else(|| Error::Route("route is missing an amount".to_string()))?;
    U256::from_str_radix(text, 10).map_err(|e|
        Error::Route(format!("bad route amount '{}': {}", text, e))
    )
}

#[async_trait]
impl RouteFinder for HttpRouter {
    async fn find_route(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount: U256,
        chain: Chain,
        is_exact_input: bool
    ) -> Result<Route> {
        let url = format!("{}/route", self.base_url);
        let params = [
            ("tokenIn", format!("{}", token_in.address)),
            ("tokenOut", format!("{}", token_out.address)),
            ("amount", amount.to_string()),
            ("chainId", chain.id().to_string()),
            ("isExactInput", is_exact_input.to_string()),
        ];

        let response = self.client.get(&url).query(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Route(format!("route lookup failed ({}): {}", status, error_text)));
        }

        let body: Value = response.json().await?;
        Self::parse_route(body, token_in, token_out, chain, is_exact_input)
    }
}

#[async_trait]
impl RouteExecutor for HttpRouter {
    async fn build_calldata(&self, route: &Route, account: Address) -> Result<Vec<u8>> {
        let url = format!("{}/route/calldata", self.base_url);
        let request = json!({
            "route": route.raw,
            "account": format!("{}", account),
        });

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Route(format!("route materialization failed ({}): {}", status, error_text)));
        }

        let body: Value = response.json().await?;
        let calldata = body["calldata"]
            .as_str()
            .ok_or_else(|| Error::Route("missing calldata in materializer reply".to_string()))?;

        alloy_primitives::hex
            ::decode(calldata)
            .map_err(|e| Error::Route(format!("bad calldata hex: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usdc() -> Token {
        Token {
            address: "0x2791bca1f2de4661ed88a30c99a7a9449aa84174".parse().unwrap(),
            symbol: "USDC".to_string(),
            name: "USD Coin".to_string(),
            decimals: 6,
            is_native: false,
        }
    }

    #[test]
    fn test_parse_route() {
        let weth = Token {
            address: "0x7ceb23fd6bc0add59e62ac25578270cff1b9f619".parse().unwrap(),
            symbol: "WETH".to_string(),
            name: "Wrapped Ether".to_string(),
            decimals: 18,
            is_native: false,
        };

        let body = json!({
            "tokenIn": { "address": format!("{}", usdc().address), "amount": "250000000" },
            "tokenOut": { "address": format!("{}", weth.address), "amount": "71000000000000000" },
            "steps": [
                {
                    "pool": "usdc-weth",
                    "tokenIn": format!("{}", usdc().address),
                    "tokenOut": format!("{}", weth.address)
                }
            ]
        });

        let route = HttpRouter::parse_route(body, &usdc(), &weth, Chain::Polygon, true).unwrap();
        assert_eq!(route.token_in.amount, U256::from(250_000_000u64));
        assert_eq!(route.token_out.amount, U256::from(71_000_000_000_000_000u64));
        assert_eq!(route.steps.len(), 1);
        assert!(route.is_exact_input);
    }

    #[test]
    fn test_parse_route_empty_steps() {
        let body = json!({
            "tokenIn": { "amount": "1" },
            "tokenOut": { "amount": "1" },
            "steps": []
        });
        let route = HttpRouter::parse_route(body, &usdc(), &usdc(), Chain::Polygon, false).unwrap();
        assert!(route.steps.is_empty());
    }

    #[test]
    fn test_parse_route_missing_amount() {
        let body = json!({ "tokenOut": { "amount": "1" } });
        assert!(HttpRouter::parse_route(body, &usdc(), &usdc(), Chain::Polygon, true).is_err());
    }
}
