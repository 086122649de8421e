//! Terminal front-end for a multi-chain token swap SDK.
//!
//! The heart of the crate is [`controller::SwapController`], an explicit
//! state machine over the swap intent: token selection, debounced route
//! lookup, allowance approval and swap execution. Everything external
//! (token registry, on-chain reads, route finding, the wallet) sits behind
//! traits so the controller is testable without a network.

pub mod amounts;
pub mod app;
pub mod chains;
pub mod config;
pub mod controller;
pub mod erc20;
pub mod errors;
pub mod logger;
pub mod multicall;
pub mod router;
pub mod tokens;
pub mod wallet;
pub mod walletconnect;
