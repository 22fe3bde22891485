mod app;
mod components;
mod config;
mod data;
mod events;
mod logging;
mod theme;
mod utils;

use std::sync::Arc;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::app::App;
use crate::config::Config;
use crate::data::TicketService;
use crate::data::contract::{ContractDescriptor, EVENT_TICKET_ADDRESS};
use crate::data::listing::Index;
use crate::data::provider::{ChainClient, Wallet};

fn wallet_from_config(config: &Config) -> Result<Wallet> {
    if let Some(ref key) = config.private_key {
        let signer: PrivateKeySigner = key
            .trim()
            .parse()
            .map_err(|e| eyre!("invalid private key: {e}"))?;
        return Ok(Wallet::Signer(signer));
    }
    if let Some(ref account) = config.account {
        let address = utils::parse_address(account)
            .ok_or_else(|| eyre!("invalid account address '{account}'"))?;
        return Ok(Wallet::WatchOnly(address));
    }
    Ok(Wallet::Disconnected)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;

    let config = Config::parse();
    let log_path = logging::init(config.log_file.clone(), &config.log_level)?;

    let chain = data::chains::get_chain_config(&config.chain).ok_or_else(|| {
        eyre!(
            "unknown chain '{}', expected one of: {}",
            config.chain,
            data::chains::supported_chains().join(", ")
        )
    })?;
    let rpc_url = config.rpc_url.clone().unwrap_or_else(|| chain.rpc_url.clone());

    let contract: Address = match config.contract {
        Some(ref address) => utils::parse_address(address)
            .ok_or_else(|| eyre!("invalid contract address '{address}'"))?,
        None => EVENT_TICKET_ADDRESS,
    };

    let wallet = wallet_from_config(&config)?;
    if config.private_key.is_some() && config.account.is_some() {
        warn!("--account ignored because a private key was given");
    }

    eprintln!("Connecting to {rpc_url}...");
    let client = ChainClient::connect(&rpc_url, contract, wallet)
        .await
        .wrap_err_with(|| format!("connecting to {rpc_url}"))?;
    let chain_id = client.chain_id();
    if chain_id != chain.chain_id {
        warn!(expected = chain.chain_id, actual = chain_id, "RPC chain differs from preset");
    }
    info!(
        chain_id,
        contract = %client.contract(),
        account = ?client.account(),
        log = %log_path.display(),
        "connected"
    );

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let _ = event_tx.send(events::AppEvent::Connected {
        chain_id,
        account: client.account(),
        can_sign: client.can_sign(),
    });

    let index = Index {
        mode: config.index,
        event_scan_limit: config.event_scan_limit,
        ticket_scan_limit: config.ticket_scan_limit,
        from_block: config.from_block,
        page_size: config.page_size.max(1),
    };
    let service = Arc::new(TicketService::new(
        client,
        index,
        config.read_concurrency.max(1),
        event_tx,
    ));

    let descriptor = ContractDescriptor::new(contract, chain.explorer_url.clone());
    let mut app = App::with_service(service, event_rx, descriptor, &chain, config.tick_rate_ms);

    let terminal = ratatui::init();
    let result = app.run(terminal).await;
    ratatui::restore();

    result
}
