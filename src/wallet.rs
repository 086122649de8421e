//! Wallet/account provider boundary.
//!
//! The app never holds keys. A connected wallet exposes its chain id and
//! account, accepts transaction requests for signing and submission, and
//! lets the caller wait for a confirmation receipt. The bundled
//! implementation talks JSON-RPC to a wallet bridge (`eth_sendTransaction`
//! plus receipt polling).

use alloy_primitives::{ Address, U256 };
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{ json, Value };
use std::time::Duration;

use crate::errors::{ Error, Result };
use crate::logger::{ self, LogTag };

/// A transaction to be signed and submitted by the wallet.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub to: Address,
    pub data: Vec<u8>,
    /// Attached native-currency value, if any.
    pub value: Option<U256>,
}

/// Confirmation receipt for a submitted transaction.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub tx_hash: String,
    pub block_number: u64,
    pub success: bool,
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Chain the wallet is currently on, if connected.
    fn chain_id(&self) -> Option<u64>;

    /// Connected account, if any.
    fn account(&self) -> Option<Address>;

    /// Sign and submit; returns the transaction hash.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<String>;

    /// Block until the transaction is confirmed.
    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<Receipt>;
}

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const RECEIPT_POLL_ATTEMPTS: u32 = 90;

/// JSON-RPC wallet bridge. Chain id and account are read once at connect
/// time; reconnect to pick up account or chain changes.
pub struct RpcWallet {
    client: Client,
    url: String,
    chain_id: u64,
    account: Address,
}

impl RpcWallet {
    pub async fn connect(url: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| Error::Http(format!("failed to create HTTP client: {}", e)))?;

        let chain_hex = rpc_request(&client, url, "eth_chainId", json!([])).await?;
        let chain_id = parse_hex_u64(
            chain_hex.as_str().ok_or_else(|| Error::Wallet("bad eth_chainId reply".to_string()))?
        )?;

        let accounts = rpc_request(&client, url, "eth_accounts", json!([])).await?;
        let account = accounts
            .as_array()
            .and_then(|a| a.first())
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::Wallet("wallet exposes no accounts".to_string()))?
            .parse::<Address>()
            .map_err(|e| Error::Wallet(format!("bad account address: {}", e)))?;

        logger::info(
            LogTag::Wallet,
            &format!("💼 Connected: account {} on chain {}", account, chain_id)
        );

        Ok(Self { client, url: url.to_string(), chain_id, account })
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    fn chain_id(&self) -> Option<u64> {
        Some(self.chain_id)
    }

    fn account(&self) -> Option<Address> {
        Some(self.account)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<String> {
        let mut params = json!({
            "from": format!("{}", self.account),
            "to": format!("{}", tx.to),
            "data": format!("0x{}", alloy_primitives::hex::encode(&tx.data)),
        });
        if let Some(value) = tx.value {
            params["value"] = json!(format!("0x{:x}", value));
        }

        let result = rpc_request(&self.client, &self.url, "eth_sendTransaction", json!([params])).await?;
        let tx_hash = result
            .as_str()
            .ok_or_else(|| Error::Wallet("eth_sendTransaction returned no hash".to_string()))?
            .to_string();

        logger::info(LogTag::Wallet, &format!("📤 Submitted transaction {}", tx_hash));
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<Receipt> {
        for _ in 0..RECEIPT_POLL_ATTEMPTS {
            let result = rpc_request(
                &self.client,
                &self.url,
                "eth_getTransactionReceipt",
                json!([tx_hash])
            ).await?;

            if !result.is_null() {
                let block_number = result["blockNumber"]
                    .as_str()
                    .map(parse_hex_u64)
                    .transpose()?
                    .unwrap_or(0);
                let success = result["status"].as_str() == Some("0x1");
                return Ok(Receipt { tx_hash: tx_hash.to_string(), block_number, success });
            }

            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }

        Err(
            Error::TransactionFailed {
                reason: format!("no receipt for {} after {} polls", tx_hash, RECEIPT_POLL_ATTEMPTS),
            }
        )
    }
}

async fn rpc_request(client: &Client, url: &str, method: &str, params: Value) -> Result<Value> {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params
    });

    let response: Value = client
        .post(url)
        .json(&body)
        .send().await?
        .json().await?;

    if let Some(err) = response.get("error") {
        return Err(Error::Wallet(format!("{} failed: {}", method, err)));
    }

    Ok(response.get("result").cloned().unwrap_or(Value::Null))
}

fn parse_hex_u64(hex: &str) -> Result<u64> {
    u64
        ::from_str_radix(hex.trim_start_matches("0x"), 16)
        .map_err(|e| Error::Wallet(format!("bad hex quantity '{}': {}", hex, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_u64() {
        assert_eq!(parse_hex_u64("0x89").unwrap(), 137);
        assert_eq!(parse_hex_u64("0xa4b1").unwrap(), 42161);
        assert!(parse_hex_u64("nope").is_err());
    }
}
