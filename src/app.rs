//! Interactive terminal front-end.
//!
//! A thin host around [`SwapController`]: reads commands from stdin, feeds
//! them to the controller as events, runs the returned commands and fires
//! the debounced route fetch when its quiet window elapses. All behavior
//! lives in the controller; this module only translates lines to events
//! and state to text.

use std::time::Duration;

use tokio::io::{ AsyncBufReadExt, BufReader };

use crate::amounts;
use crate::controller::{ Command, Event, SwapController };
use crate::errors::Result;
use crate::logger::{ self, LogTag };

const HELP: &str = "\
Commands:
  tokens              list tradable tokens with balances
  from <symbol|->     select the token to sell (- clears)
  to <symbol|->       select the token to buy (- clears)
  amount <value>      set the sell amount (exact input)
  receive <value>     set the buy amount (exact output)
  state               show the current swap state
  refresh             refetch tokens, balances and allowances
  press               press the action button (approve or swap)
  help                this text
  quit                exit";

enum Flow {
    Continue,
    Quit,
}

pub async fn run(controller: &mut SwapController) -> Result<()> {
    println!("{}", HELP);
    render(controller);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let deadline = controller.debounce_deadline();
        // select! still evaluates disabled branches, so feed it a far-off
        // instant when nothing is pending
        let sleep_until = deadline
            .map(tokio::time::Instant::from_std)
            .unwrap_or_else(|| tokio::time::Instant::now() + Duration::from_secs(3600));

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match handle_line(controller, line.trim()).await {
                    Flow::Continue => {}
                    Flow::Quit => break,
                }
            }
            _ = tokio::time::sleep_until(sleep_until), if deadline.is_some() => {
                if let Some(request) = controller.take_due_route_request() {
                    controller.fetch_route(request).await;
                    render(controller);
                }
            }
        }
    }

    logger::info(LogTag::System, "Bye");
    Ok(())
}

async fn handle_line(controller: &mut SwapController, line: &str) -> Flow {
    let mut parts = line.splitn(2, ' ');
    let command = parts.next().unwrap_or("");
    let argument = parts.next().unwrap_or("").trim();

    match command {
        "" => {}
        "help" => println!("{}", HELP),
        "quit" | "exit" => {
            return Flow::Quit;
        }
        "state" => render(controller),
        "tokens" => render_tokens(controller),
        "refresh" => {
            controller.refresh().await;
            render(controller);
        }
        "from" => {
            match resolve_token(controller, argument) {
                Ok(address) => {
                    let commands = controller.dispatch(Event::FromTokenSelected(address));
                    run_commands(controller, commands).await;
                    render(controller);
                }
                Err(message) => println!("{}", message),
            }
        }
        "to" => {
            match resolve_token(controller, argument) {
                Ok(address) => {
                    let commands = controller.dispatch(Event::ToTokenSelected(address));
                    run_commands(controller, commands).await;
                    render(controller);
                }
                Err(message) => println!("{}", message),
            }
        }
        "amount" => {
            let commands = controller.dispatch(Event::FromAmountEdited(argument.to_string()));
            run_commands(controller, commands).await;
        }
        "receive" => {
            let commands = controller.dispatch(Event::ToAmountEdited(argument.to_string()));
            run_commands(controller, commands).await;
        }
        "press" => {
            let commands = controller.dispatch(Event::ActionPressed);
            if commands.is_empty() {
                println!("Button is disabled: [{}]", controller.state().button().label);
            }
            run_commands(controller, commands).await;
            render(controller);
        }
        other => println!("Unknown command '{}', try 'help'", other),
    }

    Flow::Continue
}

async fn run_commands(controller: &mut SwapController, commands: Vec<Command>) {
    for command in commands {
        match command {
            Command::RefreshTokens => controller.refresh().await,
            Command::ScheduleRouteFetch => controller.schedule_route_fetch(),
            Command::Approve => controller.approve().await,
            Command::Swap => controller.swap().await,
        }
    }

    if let Some(notice) = controller.take_notice() {
        println!("*** {} ***", notice);
    }
}

/// Map a symbol argument to a token address; `-` clears the selection.
fn resolve_token(
    controller: &SwapController,
    argument: &str
) -> std::result::Result<Option<alloy_primitives::Address>, String> {
    if argument.is_empty() {
        return Err("usage: from|to <symbol|->".to_string());
    }
    if argument == "-" {
        return Ok(None);
    }
    controller
        .state()
        .tokens.iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(argument))
        .map(|t| Some(t.address))
        .ok_or_else(|| format!("Unknown token '{}', try 'tokens'", argument))
}

fn render(controller: &SwapController) {
    let state = controller.state();

    let chain = match state.chain() {
        Some(chain) => chain.to_string(),
        None =>
            match state.chain_id {
                Some(id) => format!("unsupported chain {}", id),
                None => "not connected".to_string(),
            }
    };
    println!("chain:   {}", chain);

    let side = |address: Option<alloy_primitives::Address>, amount: &str| {
        let token = address
            .and_then(|a| state.token(a))
            .map(|t| t.symbol.clone())
            .unwrap_or_else(|| "?".to_string());
        format!("{} {}", if amount.is_empty() { "-" } else { amount }, token)
    };
    println!(
        "swap:    {} -> {}{}",
        side(state.from_token_address, &state.from_amount),
        side(state.to_token_address, &state.to_amount),
        if state.is_exact_input { " (exact input)" } else { " (exact output)" }
    );

    if let Some(route) = &state.route {
        println!("route:   {} steps", route.steps.len());
    }

    let button = state.button();
    println!(
        "button:  [{}]{}",
        button.label,
        if button.disabled { " (disabled)" } else { "" }
    );
}

fn render_tokens(controller: &SwapController) {
    let state = controller.state();
    if state.tokens.is_empty() {
        println!("No tokens loaded (connect a wallet on a supported chain)");
        return;
    }

    for token in &state.tokens {
        let balance = state.balances
            .get(&token.address)
            .map(|b| amounts::format_fixed(*b, token.decimals, 3))
            .unwrap_or_else(|| "?".to_string());
        println!("{:>12}  {:<8} {}", balance, token.symbol, token.name);
    }
}
