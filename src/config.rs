use std::path::PathBuf;

use clap::Parser;

use crate::data::listing::IndexMode;

#[derive(Parser, Debug)]
#[command(name = "a10d-tickets", about = "Terminal client for NFT event tickets on Ethereum")]
pub struct Config {
    /// Chain preset (sepolia, anvil)
    #[arg(long, default_value = "sepolia")]
    pub chain: String,

    /// RPC endpoint URL, overrides the preset's
    #[arg(short, long, env = "TICKET_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Ticketing contract address, overrides the deployed default
    #[arg(long, env = "TICKET_CONTRACT")]
    pub contract: Option<String>,

    /// Hex private key used to sign transactions
    #[arg(long, env = "TICKET_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Read-only account to show tickets for (ignored with --private-key)
    #[arg(long)]
    pub account: Option<String>,

    /// How event and ticket ids are discovered
    #[arg(long, value_enum, default_value_t = IndexMode::Scan)]
    pub index: IndexMode,

    /// First block searched for logs in `logs` mode
    #[arg(long, default_value = "0")]
    pub from_block: u64,

    /// Highest event id read in `scan` mode
    #[arg(long, default_value = "20")]
    pub event_scan_limit: u64,

    /// Highest token id read in `scan` mode
    #[arg(long, default_value = "50")]
    pub ticket_scan_limit: u64,

    /// Events shown per page
    #[arg(long, default_value = "10")]
    pub page_size: usize,

    /// Maximum contract reads in flight at once
    #[arg(long, default_value = "8")]
    pub read_concurrency: usize,

    /// Tick rate in milliseconds for UI refresh
    #[arg(long, default_value = "100")]
    pub tick_rate_ms: u64,

    /// Log file path (the terminal is owned by the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log filter, e.g. `info` or `a10d_tickets=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}
