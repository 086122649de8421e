//! ERC-20 call encoding.
//!
//! Standard token interface, ABI-encoded with alloy `sol!` types. Only the
//! three calls the controller needs: `balanceOf`, `allowance`, `approve`.

use alloy_primitives::{ Address, U256 };
use alloy_sol_types::{ sol, SolCall, SolValue };

use crate::errors::{ Error, Result };

sol! {
    function balanceOf(address account) external view returns (uint256);
    function allowance(address owner, address spender) external view returns (uint256);
    function approve(address spender, uint256 amount) external returns (bool);
}

pub fn encode_balance_of(account: Address) -> Vec<u8> {
    balanceOfCall { account }.abi_encode()
}

pub fn encode_allowance(owner: Address, spender: Address) -> Vec<u8> {
    allowanceCall { owner, spender }.abi_encode()
}

pub fn encode_approve(spender: Address, amount: U256) -> Vec<u8> {
    approveCall { spender, amount }.abi_encode()
}

/// Decode a single uint256 return value.
pub fn decode_uint(data: &[u8]) -> Result<U256> {
    U256::abi_decode(data).map_err(|e| Error::Rpc(format!("bad uint256 return data: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const HOLDER: Address = address!("1111111111111111111111111111111111111111");
    const SPENDER: Address = address!("2222222222222222222222222222222222222222");

    #[test]
    fn test_selectors() {
        // Known ERC-20 selectors
        assert_eq!(balanceOfCall::SELECTOR, [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(allowanceCall::SELECTOR, [0xdd, 0x62, 0xed, 0x3e]);
        assert_eq!(approveCall::SELECTOR, [0x09, 0x5e, 0xa7, 0xb3]);
    }

    #[test]
    fn test_encode_balance_of() {
        let data = encode_balance_of(HOLDER);
        assert_eq!(&data[..4], &balanceOfCall::SELECTOR);
        // address is right-aligned in a 32-byte word
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[16..36], HOLDER.as_slice());
    }

    #[test]
    fn test_encode_approve_unlimited() {
        let data = encode_approve(SPENDER, U256::MAX);
        assert_eq!(data.len(), 4 + 64);
        // max uint256 is all 0xff
        assert!(data[36..68].iter().all(|&b| b == 0xff));
    }

    #[test]
    fn test_decode_uint() {
        let encoded = U256::from(123_456u64).abi_encode();
        assert_eq!(decode_uint(&encoded).unwrap(), U256::from(123_456u64));
        assert!(decode_uint(&[0u8; 3]).is_err());
    }
}
