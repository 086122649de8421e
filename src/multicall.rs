//! Batched on-chain reads via Multicall3.
//!
//! One `aggregate3` round trip fetches every token's balance and allowance
//! plus the native balance. Per-call failures are tolerated: a failed read
//! degrades to zero and is never surfaced as an error.

use alloy_primitives::{ Address, U256 };
use alloy_sol_types::{ sol, SolCall };
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{ json, Value };
use std::collections::HashMap;
use std::time::Duration;

use crate::chains::{ Chain, MULTICALL3_ADDRESS };
use crate::errors::{ Error, Result };
use crate::logger::{ self, LogTag };

sol! {
    struct Call3 {
        address target;
        bool allowFailure;
        bytes callData;
    }

    struct MulticallResult {
        bool success;
        bytes returnData;
    }

    function aggregate3(Call3[] calldata calls) external payable returns (MulticallResult[] memory returnData);

    function getEthBalance(address addr) external view returns (uint256 balance);
}

/// One read in a batch: (target, calldata, allow-partial-failure).
#[derive(Debug, Clone)]
pub struct BatchCall {
    pub target: Address,
    pub call_data: Vec<u8>,
    pub allow_failure: bool,
}

/// Per-call outcome, in the same order as the submitted batch.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub success: bool,
    pub return_data: Vec<u8>,
}

impl CallOutcome {
    /// Decode a uint256 result, degrading to zero on failure or malformed
    /// return data.
    pub fn uint_or_zero(&self) -> U256 {
        if !self.success {
            return U256::ZERO;
        }
        crate::erc20::decode_uint(&self.return_data).unwrap_or(U256::ZERO)
    }
}

/// Batched on-chain reader plus a single-call escape hatch for targeted
/// re-reads (e.g. one allowance after an approve).
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn aggregate3(&self, chain: Chain, calls: Vec<BatchCall>) -> Result<Vec<CallOutcome>>;

    async fn call(&self, chain: Chain, to: Address, data: Vec<u8>) -> Result<Vec<u8>>;
}

pub fn encode_eth_balance(account: Address) -> Vec<u8> {
    getEthBalanceCall { addr: account }.abi_encode()
}

/// JSON-RPC `eth_call`-backed reader.
pub struct RpcChainReader {
    client: Client,
    /// chain id -> RPC endpoint
    endpoints: HashMap<u64, String>,
}

impl RpcChainReader {
    pub fn new(endpoints: HashMap<u64, String>, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| Error::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, endpoints })
    }

    fn endpoint(&self, chain: Chain) -> Result<&str> {
        self.endpoints
            .get(&chain.id())
            .map(|s| s.as_str())
            .ok_or(Error::UnsupportedChain(chain.id()))
    }

    async fn eth_call(&self, chain: Chain, to: Address, data: &[u8]) -> Result<Vec<u8>> {
        let url = self.endpoint(chain)?;
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": format!("{}", to), "data": format!("0x{}", alloy_primitives::hex::encode(data)) },
                "latest"
            ]
        });

        let response: Value = self.client
            .post(url)
            .json(&body)
            .send().await?
            .json().await?;

        if let Some(err) = response.get("error") {
            return Err(Error::Rpc(format!("eth_call failed: {}", err)));
        }

        let result = response["result"]
            .as_str()
            .ok_or_else(|| Error::Rpc("eth_call returned no result".to_string()))?;

        alloy_primitives::hex
            ::decode(result)
            .map_err(|e| Error::Rpc(format!("bad eth_call result: {}", e)))
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn aggregate3(&self, chain: Chain, calls: Vec<BatchCall>) -> Result<Vec<CallOutcome>> {
        let count = calls.len();
        let encoded = (aggregate3Call {
            calls: calls
                .into_iter()
                .map(|c| Call3 {
                    target: c.target,
                    allowFailure: c.allow_failure,
                    callData: c.call_data.into(),
                })
                .collect(),
        }).abi_encode();

        logger::debug(LogTag::Rpc, &format!("aggregate3: {} calls on {}", count, chain));

        let raw = self.eth_call(chain, MULTICALL3_ADDRESS, &encoded).await?;
        let decoded = aggregate3Call
            ::abi_decode_returns(&raw)
            .map_err(|e| Error::Rpc(format!("bad aggregate3 return data: {}", e)))?;

        Ok(
            decoded
                .into_iter()
                .map(|r| CallOutcome {
                    success: r.success,
                    return_data: r.returnData.to_vec(),
                })
                .collect()
        )
    }

    async fn call(&self, chain: Chain, to: Address, data: Vec<u8>) -> Result<Vec<u8>> {
        self.eth_call(chain, to, &data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use alloy_sol_types::SolValue;

    #[test]
    fn test_uint_or_zero_degrades() {
        let failed = CallOutcome { success: false, return_data: U256::from(5u64).abi_encode() };
        assert_eq!(failed.uint_or_zero(), U256::ZERO);

        let garbage = CallOutcome { success: true, return_data: vec![1, 2, 3] };
        assert_eq!(garbage.uint_or_zero(), U256::ZERO);

        let ok = CallOutcome { success: true, return_data: U256::from(5u64).abi_encode() };
        assert_eq!(ok.uint_or_zero(), U256::from(5u64));
    }

    #[test]
    fn test_aggregate3_encoding() {
        let call = BatchCall {
            target: address!("1111111111111111111111111111111111111111"),
            call_data: crate::erc20::encode_balance_of(
                address!("2222222222222222222222222222222222222222")
            ),
            allow_failure: true,
        };
        let encoded = (aggregate3Call {
            calls: vec![Call3 {
                target: call.target,
                allowFailure: call.allow_failure,
                callData: call.call_data.into(),
            }],
        }).abi_encode();

        // aggregate3 selector: 0x82ad56cb
        assert_eq!(&encoded[..4], &[0x82, 0xad, 0x56, 0xcb]);
    }

    #[test]
    fn test_get_eth_balance_selector() {
        // Multicall3.getEthBalance selector: 0x4d2301cc
        assert_eq!(getEthBalanceCall::SELECTOR, [0x4d, 0x23, 0x01, 0xcc]);
    }

    #[test]
    fn test_missing_endpoint() {
        let reader = RpcChainReader::new(HashMap::new(), 5).unwrap();
        assert!(reader.endpoint(Chain::Polygon).is_err());
    }
}
