//! The swap-intent state machine.
//!
//! Owns all mutable UI state: connection, token list, balance/allowance
//! maps, selected tokens, amount strings, direction flag and the computed
//! route. User input arrives as explicit [`Event`]s through [`SwapController::dispatch`],
//! which performs the guarded synchronous transitions and tells the host
//! which asynchronous operation to run next ([`Command`]). The async
//! operations themselves (`refresh`, `fetch_route`, `approve`, `swap`) are
//! phase-guarded methods on the controller.
//!
//! The controller is single-task by design: one cooperative event loop
//! drives it, operations suspend on provider calls and resume without any
//! shared-state locking.

pub mod debounce;
pub mod derived;

use alloy_primitives::{ Address, U256 };
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::amounts;
use crate::erc20;
use crate::errors::{ Error, Result };
use crate::logger::{ self, LogTag };
use crate::multicall::{ self, BatchCall, ChainReader };
use crate::router::{ Route, RouteExecutor, RouteFinder };
use crate::tokens::{ Token, TokenRegistry };
use crate::wallet::{ TransactionRequest, WalletProvider };
use crate::chains::{ MULTICALL3_ADDRESS, NATIVE_TOKEN_ADDRESS };

pub use debounce::{ Debouncer, ROUTE_DEBOUNCE };
pub use derived::{ ButtonAction, ButtonLabel, ButtonState };

/// Machine states. `Idle` is pre-first-refresh; `Ready` means interactive.
/// The four remaining states are the busy phases of the original flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    LoadingTokens,
    Ready,
    LoadingRoute,
    Approving,
    Swapping,
}

/// All mutable controller state. Derived UI state lives in
/// [`derived`] as pure accessors over this struct.
#[derive(Debug)]
pub struct SwapState {
    pub mounted: bool,
    pub chain_id: Option<u64>,
    pub account: Option<Address>,
    pub tokens: Vec<Token>,
    pub balances: HashMap<Address, U256>,
    pub allowances: HashMap<Address, U256>,
    pub from_token_address: Option<Address>,
    pub to_token_address: Option<Address>,
    pub from_amount: String,
    pub to_amount: String,
    /// true: the from-amount is user-authoritative ("exact input");
    /// false: the to-amount is ("exact output").
    pub is_exact_input: bool,
    pub route: Option<Route>,
    pub phase: Phase,
    /// Bumped whenever any element of the route tuple (tokens, authoritative
    /// amount, direction, chain) changes; completions carrying an older
    /// sequence are discarded.
    pub route_seq: u64,
    /// One-shot user-facing notice (e.g. swap success), taken by the host.
    pub notice: Option<String>,
}

impl Default for SwapState {
    fn default() -> Self {
        Self {
            mounted: false,
            chain_id: None,
            account: None,
            tokens: Vec::new(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
            from_token_address: None,
            to_token_address: None,
            from_amount: String::new(),
            to_amount: String::new(),
            is_exact_input: true,
            route: None,
            phase: Phase::Idle,
            route_seq: 0,
            notice: None,
        }
    }
}

/// User/environment input, dispatched synchronously.
#[derive(Debug, Clone)]
pub enum Event {
    Mounted,
    ConnectionChanged {
        chain_id: Option<u64>,
        account: Option<Address>,
    },
    FromTokenSelected(Option<Address>),
    ToTokenSelected(Option<Address>),
    FromAmountEdited(String),
    ToAmountEdited(String),
    ActionPressed,
}

/// Asynchronous follow-up the host must run after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    RefreshTokens,
    ScheduleRouteFetch,
    Approve,
    Swap,
}

/// Payload of a debounced route request. Carries the sequence and direction
/// it was issued for so superseded requests can be dropped at fire time.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest {
    pub seq: u64,
    pub is_exact_input: bool,
}

pub struct SwapController {
    state: SwapState,
    registry: Arc<dyn TokenRegistry>,
    reader: Arc<dyn ChainReader>,
    finder: Arc<dyn RouteFinder>,
    executor: Arc<dyn RouteExecutor>,
    wallet: Arc<dyn WalletProvider>,
    debouncer: Debouncer<RouteRequest>,
}

impl SwapController {
    pub fn new(
        registry: Arc<dyn TokenRegistry>,
        reader: Arc<dyn ChainReader>,
        finder: Arc<dyn RouteFinder>,
        executor: Arc<dyn RouteExecutor>,
        wallet: Arc<dyn WalletProvider>
    ) -> Self {
        Self {
            state: SwapState::default(),
            registry,
            reader,
            finder,
            executor,
            wallet,
            debouncer: Debouncer::new(ROUTE_DEBOUNCE),
        }
    }

    pub fn state(&self) -> &SwapState {
        &self.state
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.state.notice.take()
    }

    /// The route tuple changed: any computed route is stale from this
    /// moment on.
    fn invalidate_route(&mut self) {
        self.state.route = None;
        self.state.route_seq += 1;
    }

    /// Synchronous guarded transitions. Returns the async follow-ups the
    /// host must run, in order.
    pub fn dispatch(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::Mounted => {
                self.state.mounted = true;
                Vec::new()
            }

            Event::ConnectionChanged { chain_id, account } => {
                self.state.chain_id = chain_id;
                self.state.account = account;
                self.invalidate_route();
                self.debouncer.cancel();

                let ready_to_refresh =
                    self.state.is_chain_valid() &&
                    self.state.account.is_some() &&
                    self.state.router_address().is_some();
                if ready_to_refresh {
                    vec![Command::RefreshTokens]
                } else {
                    Vec::new()
                }
            }

            Event::FromTokenSelected(address) => {
                self.state.from_token_address = address;
                // mutual exclusivity: the same token may not sit on both sides
                if address.is_some() && self.state.to_token_address == address {
                    self.state.to_token_address = None;
                }
                self.invalidate_route();
                vec![Command::ScheduleRouteFetch]
            }

            Event::ToTokenSelected(address) => {
                self.state.to_token_address = address;
                if address.is_some() && self.state.from_token_address == address {
                    self.state.from_token_address = None;
                }
                self.invalidate_route();
                vec![Command::ScheduleRouteFetch]
            }

            Event::FromAmountEdited(value) => {
                self.state.from_amount = amounts::sanitize(&value);
                self.state.to_amount.clear();
                self.state.is_exact_input = true;
                self.invalidate_route();
                vec![Command::ScheduleRouteFetch]
            }

            Event::ToAmountEdited(value) => {
                self.state.to_amount = amounts::sanitize(&value);
                self.state.from_amount.clear();
                self.state.is_exact_input = false;
                self.invalidate_route();
                vec![Command::ScheduleRouteFetch]
            }

            Event::ActionPressed => {
                let button = self.state.button();
                if button.disabled {
                    return Vec::new();
                }
                match button.action {
                    ButtonAction::Approve => vec![Command::Approve],
                    ButtonAction::Swap => vec![Command::Swap],
                }
            }
        }
    }

    /// Arm the debounced route fetch if the preconditions hold: both tokens
    /// resolved, authoritative amount non-empty, token list not mid-refresh.
    pub fn schedule_route_fetch(&mut self) {
        if self.state.is_loading_tokens() {
            return;
        }
        if self.state.from_token().is_none() || self.state.to_token().is_none() {
            return;
        }
        let amount = if self.state.is_exact_input {
            &self.state.from_amount
        } else {
            &self.state.to_amount
        };
        if amount.is_empty() {
            return;
        }

        self.debouncer.trigger(RouteRequest {
            seq: self.state.route_seq,
            is_exact_input: self.state.is_exact_input,
        });
    }

    /// Deadline the host should sleep until, if a route fetch is pending.
    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// A route request whose quiet window has elapsed, if any.
    pub fn take_due_route_request(&mut self) -> Option<RouteRequest> {
        self.debouncer.take_ready()
    }

    /// Full token/balance/allowance refresh. Transient selection state is
    /// reset on completion regardless of outcome ("start over" policy).
    pub async fn refresh(&mut self) {
        if self.state.is_loading_tokens() {
            logger::warn(LogTag::Tokens, "Refresh already in flight, ignoring");
            return;
        }
        let (Some(chain), Some(account), Some(router)) = (
            self.state.chain(),
            self.state.account,
            self.state.router_address(),
        ) else {
            return;
        };

        self.state.phase = Phase::LoadingTokens;

        match self.registry.all_tokens(chain).await {
            Ok(list) => {
                logger::info(
                    LogTag::Tokens,
                    &format!("Loaded {} tokens for {}", list.len(), chain)
                );

                let mut tokens = vec![Token::native(chain)];
                tokens.extend(list.clone());
                self.state.tokens = tokens;

                if let Err(e) = self.read_balances(chain, account, router, &list).await {
                    // whole-batch failure degrades silently: stale maps, no UI error
                    logger::error(LogTag::Rpc, &format!("Balance/allowance read failed: {}", e));
                }
            }
            Err(e) => {
                logger::error(LogTag::Tokens, &format!("Token list fetch failed: {}", e));
            }
        }

        // start-over policy: clear all transient selection state
        self.state.from_token_address = None;
        self.state.to_token_address = None;
        self.state.from_amount.clear();
        self.state.to_amount.clear();
        self.invalidate_route();
        self.debouncer.cancel();
        self.state.phase = Phase::Ready;
    }

    /// One aggregate3 round trip: (balance, allowance) per listed token plus
    /// the native balance. Individually failed reads degrade to zero.
    async fn read_balances(
        &mut self,
        chain: crate::chains::Chain,
        account: Address,
        router: Address,
        listed: &[Token]
    ) -> Result<()> {
        let mut calls = Vec::with_capacity(listed.len() * 2 + 1);
        for token in listed {
            calls.push(BatchCall {
                target: token.address,
                call_data: erc20::encode_balance_of(account),
                allow_failure: true,
            });
            calls.push(BatchCall {
                target: token.address,
                call_data: erc20::encode_allowance(account, router),
                allow_failure: true,
            });
        }
        calls.push(BatchCall {
            target: MULTICALL3_ADDRESS,
            call_data: multicall::encode_eth_balance(account),
            allow_failure: true,
        });

        let outcomes = self.reader.aggregate3(chain, calls).await?;
        if outcomes.len() != listed.len() * 2 + 1 {
            return Err(Error::Rpc(format!("aggregate3 returned {} results, expected {}", outcomes.len(), listed.len() * 2 + 1)));
        }

        let mut balances = HashMap::with_capacity(listed.len() + 1);
        let mut allowances = HashMap::with_capacity(listed.len() + 1);
        for (i, token) in listed.iter().enumerate() {
            balances.insert(token.address, outcomes[i * 2].uint_or_zero());
            allowances.insert(token.address, outcomes[i * 2 + 1].uint_or_zero());
        }
        balances.insert(NATIVE_TOKEN_ADDRESS, outcomes[outcomes.len() - 1].uint_or_zero());
        // the native token never needs approval
        allowances.insert(NATIVE_TOKEN_ADDRESS, U256::MAX);

        self.state.balances = balances;
        self.state.allowances = allowances;
        Ok(())
    }

    /// Execute a due route request. Requests carrying a superseded sequence
    /// or the inactive direction are discarded, before and after the
    /// provider call.
    pub async fn fetch_route(&mut self, request: RouteRequest) {
        if request.seq != self.state.route_seq {
            logger::debug(LogTag::Route, "Discarding superseded route request");
            return;
        }
        if request.is_exact_input != self.state.is_exact_input {
            logger::debug(LogTag::Route, "Discarding route request for inactive direction");
            return;
        }
        if self.state.is_loading_tokens() {
            return;
        }
        let (Some(token_in), Some(token_out), Some(chain)) = (
            self.state.from_token().cloned(),
            self.state.to_token().cloned(),
            self.state.chain(),
        ) else {
            return;
        };

        let is_exact_input = request.is_exact_input;
        let amount_text = if is_exact_input {
            self.state.from_amount.clone()
        } else {
            self.state.to_amount.clone()
        };
        if amount_text.is_empty() {
            return;
        }

        let decimals = if is_exact_input { token_in.decimals } else { token_out.decimals };
        let amount = match amounts::parse_units(&amount_text, decimals) {
            Ok(amount) => amount,
            Err(e) => {
                logger::debug(LogTag::Route, &format!("Unparseable amount: {}", e));
                return;
            }
        };

        // zero in, zero out: no route needed
        if amount.is_zero() {
            if is_exact_input {
                self.state.to_amount = "0".to_string();
            } else {
                self.state.from_amount = "0".to_string();
            }
            return;
        }

        self.state.phase = Phase::LoadingRoute;

        let result = self.finder.find_route(&token_in, &token_out, amount, chain, is_exact_input).await;

        if request.seq != self.state.route_seq {
            logger::debug(LogTag::Route, "Dropping stale route response");
            if self.state.phase == Phase::LoadingRoute {
                self.state.phase = Phase::Ready;
            }
            return;
        }

        match result {
            Ok(route) => {
                logger::info(
                    LogTag::Route,
                    &format!(
                        "Route found: {} -> {} in {} steps",
                        amounts::format_units(route.token_in.amount, route.token_in.token.decimals),
                        amounts::format_units(route.token_out.amount, route.token_out.token.decimals),
                        route.steps.len()
                    )
                );
                // the derived side's display amount comes from the route
                if is_exact_input {
                    self.state.to_amount = amounts::format_units(
                        route.token_out.amount,
                        route.token_out.token.decimals
                    );
                } else {
                    self.state.from_amount = amounts::format_units(
                        route.token_in.amount,
                        route.token_in.token.decimals
                    );
                }
                self.state.route = Some(route);
            }
            Err(e) => {
                logger::error(LogTag::Route, &format!("Route lookup failed: {}", e));
                self.state.route = None;
            }
        }

        self.state.phase = Phase::Ready;
    }

    /// Unlimited-approval transaction for the selected from-token, followed
    /// by a targeted allowance re-read for that token only.
    pub async fn approve(&mut self) {
        if self.state.is_busy() {
            return;
        }
        let (Some(chain), Some(router), Some(account), Some(token)) = (
            self.state.chain(),
            self.state.router_address(),
            self.wallet.account(),
            self.state.from_token().cloned(),
        ) else {
            return;
        };

        self.state.phase = Phase::Approving;
        logger::info(LogTag::Swap, &format!("Approving {} for router {}", token.symbol, router));

        let result: Result<U256> = async {
            let tx_hash = self.wallet.send_transaction(TransactionRequest {
                to: token.address,
                data: erc20::encode_approve(router, U256::MAX),
                value: None,
            }).await?;

            let receipt = self.wallet.wait_for_receipt(&tx_hash).await?;
            if !receipt.success {
                return Err(Error::TransactionFailed {
                    reason: format!("approve reverted in block {}", receipt.block_number),
                });
            }

            // re-read this token's allowance only, not a full refresh
            let data = self.reader.call(
                chain,
                token.address,
                erc20::encode_allowance(account, router)
            ).await?;
            erc20::decode_uint(&data)
        }.await;

        match result {
            Ok(allowance) => {
                self.state.allowances.insert(token.address, allowance);
                logger::success(
                    LogTag::Swap,
                    &format!("Approved {}, allowance now {}", token.symbol, allowance)
                );
            }
            Err(e) => {
                logger::error(LogTag::Swap, &format!("Approve failed: {}", e));
            }
        }

        self.state.phase = Phase::Ready;
    }

    /// Materialize the current route, submit it and, on confirmation, run a
    /// full refresh and signal success.
    pub async fn swap(&mut self) {
        if self.state.is_busy() {
            return;
        }
        let (Some(route), Some(router), Some(account)) = (
            self.state.route.clone(),
            self.state.router_address(),
            self.wallet.account(),
        ) else {
            return;
        };
        if route.steps.is_empty() {
            return;
        }

        self.state.phase = Phase::Swapping;
        logger::info(
            LogTag::Swap,
            &format!(
                "Swapping {} {} -> {} ({} steps)",
                amounts::format_units(route.token_in.amount, route.token_in.token.decimals),
                route.token_in.token.symbol,
                route.token_out.token.symbol,
                route.steps.len()
            )
        );

        let result: Result<()> = async {
            let data = self.executor.build_calldata(&route, account).await?;

            // attach native value only when the input side is the chain's
            // native asset
            let value = route.token_in.token.is_native.then_some(route.token_in.amount);

            let tx_hash = self.wallet.send_transaction(TransactionRequest {
                to: router,
                data,
                value,
            }).await?;

            let receipt = self.wallet.wait_for_receipt(&tx_hash).await?;
            if !receipt.success {
                return Err(Error::TransactionFailed {
                    reason: format!("swap reverted in block {}", receipt.block_number),
                });
            }
            Ok(())
        }.await;

        match result {
            Ok(()) => {
                logger::success(LogTag::Swap, "Swapped successfully!");
                self.state.notice = Some("Swapped successfully!".to_string());
                self.state.phase = Phase::Ready;
                // simple demo policy: refetch everything
                self.refresh().await;
            }
            Err(e) => {
                logger::error(LogTag::Swap, &format!("Swap failed: {}", e));
                self.state.phase = Phase::Ready;
            }
        }
    }
}
