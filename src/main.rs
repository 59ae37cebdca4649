//! TON Reward Server — entry point.
//!
//! Startup order matters: configuration and key material are validated,
//! the wallet backend is constructed and its jetton wallet resolved, and
//! the transaction ledger is opened — all before the listener binds. Any
//! failure up to that point exits non-zero without serving a request.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use ton_reward_server::config::{AppConfig, EnvConfig, WalletBackend};
use ton_reward_server::gateway::{self, state::AppState};
use ton_reward_server::ledger::TransferLedger;
use ton_reward_server::reward::{JettonContext, RewardService, TransferExecutor};
use ton_reward_server::wallet::WalletHandle;
use ton_reward_server::wallet::simulated::SimulatedWallet;
use ton_reward_server::wallet::toncenter::{ToncenterProvider, ToncenterWallet};
use ton_reward_server::{logging, money};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env).context("loading config file")?;
    let _log_guard = logging::init_logging(&app_config);

    info!("Starting TON reward server in {} mode", env);

    let env_config =
        EnvConfig::from_env(app_config.wallet.backend).context("reading environment")?;

    let wallet: WalletHandle = match app_config.wallet.backend {
        WalletBackend::Simulated => {
            let balance = app_config.wallet.simulated_balance_nano()?;
            info!(
                balance_ton = %money::format_nano(balance),
                "using simulated wallet backend"
            );
            Arc::new(SimulatedWallet::new(env_config.wallet_key.clone(), balance))
        }
        WalletBackend::Toncenter => {
            let url = env_config
                .rpc_url
                .clone()
                .context("TONCENTER_RPC_URL is required for the toncenter backend")?;
            let provider = ToncenterProvider::new(&url, env_config.rpc_api_key.clone())
                .context("building toncenter client")?;
            warn!(
                url = %url,
                "toncenter backend: balance/seqno reads are live, broadcasts are held at \
                 the signing boundary until a wallet-contract library is linked"
            );
            Arc::new(ToncenterWallet::new(
                provider,
                env_config.wallet_key.clone(),
                env_config.wallet_address.clone(),
                env_config.jetton_wallet.clone(),
            ))
        }
    };

    // Resolve the service jetton wallet once, now. Re-probing per request
    // is exactly the pattern this service exists to avoid.
    let jetton = match &env_config.jetton_master {
        None => {
            info!("no JETTON_MASTER_ADDRESS configured, plain coin transfer mode");
            None
        }
        Some(master) => {
            let service_jetton_wallet = wallet
                .jetton_wallet_address()
                .await
                .context("resolving service jetton wallet")?;
            info!(
                master = %master,
                jetton_wallet = %service_jetton_wallet,
                "jetton transfer mode"
            );
            Some(JettonContext {
                service_jetton_wallet,
                forward_nano: app_config.wallet.forward_nano()?,
            })
        }
    };

    let ledger = Arc::new(
        TransferLedger::open(&app_config.ledger.path)
            .with_context(|| format!("opening transaction ledger {}", app_config.ledger.path))?,
    );
    info!(
        path = %app_config.ledger.path,
        records = ledger.len().await,
        "transaction ledger ready"
    );

    let executor = TransferExecutor::new(
        wallet.clone(),
        env_config.wallet_address.clone(),
        jetton,
        app_config.wallet.fee_nano()?,
        app_config.wallet.token_symbol.clone(),
    );
    let service = Arc::new(RewardService::new(executor, ledger));

    let state = Arc::new(AppState::new(
        service,
        wallet,
        env_config.wallet_address.clone(),
        app_config.wallet.token_symbol.clone(),
    ));

    println!("🔐 TON wallet ready: {}", env_config.wallet_address);

    let port = get_port_override().unwrap_or(app_config.gateway.port);
    gateway::run_server(&app_config.gateway.host, port, state).await;

    Ok(())
}
