//! Derived UI state: pure functions of the controller state, recomputed on
//! every render, no side effects.

use alloy_primitives::Address;

use crate::amounts;
use crate::chains::{ self, Chain };
use crate::tokens::Token;

use super::{ Phase, SwapState };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonLabel {
    LoadingTokens,
    LoadingRoute,
    Approving,
    Swapping,
    NoRoutesFound,
    Approve,
    SwapExactInput,
    SwapExactOutput,
}

impl std::fmt::Display for ButtonLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ButtonLabel::LoadingTokens => "Loading tokens list...",
            ButtonLabel::LoadingRoute => "Loading route...",
            ButtonLabel::Approving => "Approving token usage...",
            ButtonLabel::Swapping => "Swapping tokens...",
            ButtonLabel::NoRoutesFound => "No routes found",
            ButtonLabel::Approve => "Approve token usage",
            ButtonLabel::SwapExactInput => "Swap (exact input)",
            ButtonLabel::SwapExactOutput => "Swap (exact output)",
        };
        write!(f, "{}", text)
    }
}

/// Where a click on the action button routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Approve,
    Swap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonState {
    pub label: ButtonLabel,
    pub action: ButtonAction,
    pub disabled: bool,
}

impl SwapState {
    /// True iff a chain id is present and a member of the supported set.
    pub fn is_chain_valid(&self) -> bool {
        chains::is_supported(self.chain_id)
    }

    pub fn chain(&self) -> Option<Chain> {
        self.chain_id.and_then(Chain::from_id)
    }

    pub fn router_address(&self) -> Option<Address> {
        self.chain().map(|c| c.info().router_address)
    }

    pub fn token(&self, address: Address) -> Option<&Token> {
        self.tokens.iter().find(|t| t.address == address)
    }

    pub fn from_token(&self) -> Option<&Token> {
        self.from_token_address.and_then(|a| self.token(a))
    }

    pub fn to_token(&self) -> Option<&Token> {
        self.to_token_address.and_then(|a| self.token(a))
    }

    pub fn is_loading_tokens(&self) -> bool {
        self.phase == Phase::LoadingTokens
    }

    pub fn is_loading_route(&self) -> bool {
        self.phase == Phase::LoadingRoute
    }

    pub fn is_approving(&self) -> bool {
        self.phase == Phase::Approving
    }

    pub fn is_swapping(&self) -> bool {
        self.phase == Phase::Swapping
    }

    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle && self.phase != Phase::Ready
    }

    /// True iff a from-token is selected, its entered amount is positive and
    /// its stored allowance is strictly below the parsed amount. The native
    /// token's allowance is stored as unbounded, so it never needs approval.
    pub fn approval_needed(&self) -> bool {
        let Some(address) = self.from_token_address else {
            return false;
        };
        if !amounts::is_positive(&self.from_amount) {
            return false;
        }
        let Some(allowance) = self.allowances.get(&address) else {
            return false;
        };
        let decimals = self.token(address).map(|t| t.decimals).unwrap_or(18);
        match amounts::parse_units(&self.from_amount, decimals) {
            Ok(required) => *allowance < required,
            Err(_) => false,
        }
    }

    /// Both tokens selected and both amount fields positive.
    pub fn all_filled(&self) -> bool {
        self.from_token_address.is_some() &&
            self.to_token_address.is_some() &&
            amounts::is_positive(&self.from_amount) &&
            amounts::is_positive(&self.to_amount)
    }

    pub fn has_route_steps(&self) -> bool {
        self.route.as_ref().is_some_and(|r| !r.steps.is_empty())
    }

    /// Action button label, click target and disabled flag.
    pub fn button(&self) -> ButtonState {
        let label = match self.phase {
            Phase::LoadingTokens => ButtonLabel::LoadingTokens,
            Phase::LoadingRoute => ButtonLabel::LoadingRoute,
            Phase::Approving => ButtonLabel::Approving,
            Phase::Swapping => ButtonLabel::Swapping,
            Phase::Idle | Phase::Ready => {
                if !self.has_route_steps() {
                    ButtonLabel::NoRoutesFound
                } else if self.approval_needed() {
                    ButtonLabel::Approve
                } else if self.is_exact_input {
                    ButtonLabel::SwapExactInput
                } else {
                    ButtonLabel::SwapExactOutput
                }
            }
        };

        let action = if self.approval_needed() {
            ButtonAction::Approve
        } else {
            ButtonAction::Swap
        };

        let disabled =
            !self.mounted ||
            !self.is_chain_valid() ||
            !self.all_filled() ||
            self.is_busy() ||
            !self.has_route_steps();

        ButtonState { label, action, disabled }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::NATIVE_TOKEN_ADDRESS;
    use crate::router::{ Route, RouteLeg, RouteStep };
    use alloy_primitives::{ address, U256 };
    use serde_json::json;

    const USDC: Address = address!("2791bca1f2de4661ed88a30c99a7a9449aa84174");
    const WETH: Address = address!("7ceb23fd6bc0add59e62ac25578270cff1b9f619");

    fn usdc() -> Token {
        Token {
            address: USDC,
            symbol: "USDC".to_string(),
            name: "USD Coin".to_string(),
            decimals: 6,
            is_native: false,
        }
    }

    fn weth() -> Token {
        Token {
            address: WETH,
            symbol: "WETH".to_string(),
            name: "Wrapped Ether".to_string(),
            decimals: 18,
            is_native: false,
        }
    }

    fn route_with_steps(steps: usize) -> Route {
        Route {
            chain: Chain::Polygon,
            is_exact_input: true,
            token_in: RouteLeg { token: usdc(), amount: U256::from(1_000_000u64) },
            token_out: RouteLeg { token: weth(), amount: U256::from(1u64) },
            steps: (0..steps)
                .map(|i| RouteStep {
                    pool: format!("pool-{}", i),
                    token_in: USDC,
                    token_out: WETH,
                })
                .collect(),
            raw: json!({}),
        }
    }

    /// A ready-to-swap state: mounted, valid chain, tokens, amounts, route.
    fn ready_state() -> SwapState {
        let mut state = SwapState::default();
        state.mounted = true;
        state.chain_id = Some(137);
        state.tokens = vec![Token::native(Chain::Polygon), usdc(), weth()];
        state.from_token_address = Some(USDC);
        state.to_token_address = Some(WETH);
        state.from_amount = "1".to_string();
        state.to_amount = "0.0003".to_string();
        state.allowances.insert(USDC, U256::MAX);
        state.route = Some(route_with_steps(1));
        state.phase = Phase::Ready;
        state
    }

    #[test]
    fn test_chain_validity() {
        let mut state = SwapState::default();
        assert!(!state.is_chain_valid());
        state.chain_id = Some(137);
        assert!(state.is_chain_valid());
        state.chain_id = Some(1);
        assert!(!state.is_chain_valid());
    }

    #[test]
    fn test_approval_needed_thresholds() {
        let mut state = ready_state();

        // allowance below the parsed amount: approval required
        state.allowances.insert(USDC, U256::from(999_999u64));
        assert!(state.approval_needed());

        // allowance exactly equal: no approval
        state.allowances.insert(USDC, U256::from(1_000_000u64));
        assert!(!state.approval_needed());
    }

    #[test]
    fn test_approval_never_needed_for_native() {
        let mut state = ready_state();
        state.from_token_address = Some(NATIVE_TOKEN_ADDRESS);
        state.allowances.insert(NATIVE_TOKEN_ADDRESS, U256::MAX);
        state.from_amount = "1000000".to_string();
        assert!(!state.approval_needed());
    }

    #[test]
    fn test_approval_false_without_allowance_entry() {
        let mut state = ready_state();
        state.allowances.clear();
        assert!(!state.approval_needed());
    }

    #[test]
    fn test_all_filled() {
        let mut state = ready_state();
        assert!(state.all_filled());

        state.to_amount = "0".to_string();
        assert!(!state.all_filled());

        state.to_amount = "0.0003".to_string();
        state.from_token_address = None;
        assert!(!state.all_filled());
    }

    #[test]
    fn test_button_disabled_without_route_steps() {
        let mut state = ready_state();
        assert!(!state.button().disabled);

        state.route = Some(route_with_steps(0));
        let button = state.button();
        assert!(button.disabled);
        assert_eq!(button.label, ButtonLabel::NoRoutesFound);

        state.route = None;
        assert!(state.button().disabled);
    }

    #[test]
    fn test_button_label_priority() {
        let mut state = ready_state();

        state.phase = Phase::LoadingTokens;
        assert_eq!(state.button().label, ButtonLabel::LoadingTokens);
        assert!(state.button().disabled);

        state.phase = Phase::LoadingRoute;
        assert_eq!(state.button().label, ButtonLabel::LoadingRoute);

        state.phase = Phase::Approving;
        assert_eq!(state.button().label, ButtonLabel::Approving);

        state.phase = Phase::Swapping;
        assert_eq!(state.button().label, ButtonLabel::Swapping);

        state.phase = Phase::Ready;
        assert_eq!(state.button().label, ButtonLabel::SwapExactInput);

        state.is_exact_input = false;
        assert_eq!(state.button().label, ButtonLabel::SwapExactOutput);

        state.allowances.insert(USDC, U256::ZERO);
        let button = state.button();
        assert_eq!(button.label, ButtonLabel::Approve);
        assert_eq!(button.action, ButtonAction::Approve);
    }

    #[test]
    fn test_button_disabled_before_mount_and_on_bad_chain() {
        let mut state = ready_state();
        state.mounted = false;
        assert!(state.button().disabled);

        state.mounted = true;
        state.chain_id = Some(1);
        assert!(state.button().disabled);
    }
}
