use std::collections::HashMap;
use std::process;
use std::sync::Arc;

use clap::Parser;

use swapdesk::app;
use swapdesk::chains::Chain;
use swapdesk::config::Config;
use swapdesk::controller::{ Event, SwapController };
use swapdesk::logger::{ self, LogTag };
use swapdesk::multicall::RpcChainReader;
use swapdesk::router::HttpRouter;
use swapdesk::tokens::HttpTokenRegistry;
use swapdesk::wallet::{ RpcWallet, WalletProvider };
use swapdesk::walletconnect;

#[derive(Parser, Debug)]
#[command(name = "swapdesk", about = "Terminal swap SDK example")]
struct Args {
    /// Path to the configuration file
    #[arg(long, default_value = "config.json")]
    config: String,

    /// Show debug output
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init(args.verbose);

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            logger::error(LogTag::System, &format!("Configuration error: {}", e));
            process::exit(1);
        }
    };

    if let Err(e) = walletconnect::init(&config) {
        logger::error(LogTag::System, &format!("Wallet-connect init failed: {}", e));
        process::exit(1);
    }

    // A missing wallet is not fatal: the UI runs disabled, like a page
    // rendered before any wallet is connected.
    let wallet: Arc<dyn WalletProvider> = match
        RpcWallet::connect(&config.wallet_rpc_url, config.timeout_seconds).await
    {
        Ok(wallet) => Arc::new(wallet),
        Err(e) => {
            logger::warn(
                LogTag::Wallet,
                &format!("No wallet at {}: {}", config.wallet_rpc_url, e)
            );
            Arc::new(DisconnectedWallet)
        }
    };

    let endpoints: HashMap<u64, String> = [Chain::Polygon, Chain::Arbitrum]
        .into_iter()
        .map(|chain| (chain.id(), config.rpc_url(chain)))
        .collect();

    let registry = HttpTokenRegistry::new(config.sdk_base_url.clone(), config.timeout_seconds);
    let reader = RpcChainReader::new(endpoints, config.timeout_seconds);
    let router = HttpRouter::new(config.sdk_base_url.clone(), config.timeout_seconds);
    let (registry, reader, router) = match (registry, reader, router) {
        (Ok(registry), Ok(reader), Ok(router)) => (registry, reader, Arc::new(router)),
        _ => {
            logger::error(LogTag::System, "Failed to construct HTTP clients");
            process::exit(1);
        }
    };

    let mut controller = SwapController::new(
        Arc::new(registry),
        Arc::new(reader),
        router.clone(),
        router,
        wallet.clone()
    );

    controller.dispatch(Event::Mounted);
    let commands = controller.dispatch(Event::ConnectionChanged {
        chain_id: wallet.chain_id(),
        account: wallet.account(),
    });
    for command in commands {
        if command == swapdesk::controller::Command::RefreshTokens {
            controller.refresh().await;
        }
    }

    if let Err(e) = app::run(&mut controller).await {
        logger::error(LogTag::System, &format!("Fatal: {}", e));
        process::exit(1);
    }
}

/// Placeholder provider used when no wallet bridge is reachable. Every
/// query answers "not connected" and transactions are rejected.
struct DisconnectedWallet;

#[async_trait::async_trait]
impl WalletProvider for DisconnectedWallet {
    fn chain_id(&self) -> Option<u64> {
        None
    }

    fn account(&self) -> Option<alloy_primitives::Address> {
        None
    }

    async fn send_transaction(
        &self,
        _tx: swapdesk::wallet::TransactionRequest
    ) -> swapdesk::errors::Result<String> {
        Err(swapdesk::errors::Error::Wallet("no wallet connected".to_string()))
    }

    async fn wait_for_receipt(
        &self,
        _tx_hash: &str
    ) -> swapdesk::errors::Result<swapdesk::wallet::Receipt> {
        Err(swapdesk::errors::Error::Wallet("no wallet connected".to_string()))
    }
}
