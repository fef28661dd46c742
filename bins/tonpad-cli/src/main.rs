//! tonpad — command-line TON wallet form.
//!
//! Derives a wallet v4r2 address from a 24-word mnemonic, shows its balance,
//! NFT and jetton counts and the TON/USD price, and sends single transfers.

mod config;
mod form;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use zeroize::Zeroizing;

use tonpad_client::Providers;
use tonpad_core::address::{FriendlyFormat, Network};
use tonpad_core::mnemonic;
use tonpad_wallet::{AddressRenderings, PriceTicker, Session, TransferOutcome, derive_wallet};

use crate::config::Config;

/// TON wallet form on the command line.
#[derive(Parser)]
#[command(name = "tonpad")]
#[command(version, about = "Derive a TON wallet from a mnemonic, watch it, send from it.")]
struct Cli {
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Network override (mainnet or testnet). Defaults to TONPAD_NETWORK or testnet.
    #[arg(long, global = true)]
    network: Option<String>,

    /// Report NFT and jetton counts as zero instead of querying tonapi.
    #[arg(long, global = true)]
    no_assets: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new 24-word mnemonic and show its address.
    New,
    /// Derive the address and show balance, assets and price.
    Connect(ConnectArgs),
    /// Send TON from the mnemonic's wallet.
    Send(SendArgs),
    /// Show the TON/USD price.
    Price(PriceArgs),
    /// Interactive wallet form.
    Form,
}

#[derive(Args)]
struct ConnectArgs {
    /// Mnemonic phrase. If not provided, will prompt securely.
    #[arg(short, long)]
    mnemonic: Option<String>,
}

#[derive(Args)]
struct SendArgs {
    /// Recipient address (user-friendly or raw).
    #[arg(short, long)]
    to: String,

    /// Amount to send in TON (e.g., 0.05).
    #[arg(short, long)]
    amount: String,

    /// Mnemonic phrase. If not provided, will prompt securely.
    #[arg(short, long)]
    mnemonic: Option<String>,
}

#[derive(Args)]
struct PriceArgs {
    /// Keep polling until interrupted.
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::from_env().context("Invalid TONPAD_* configuration")?;
    if let Some(network) = &cli.network {
        config.client.network = parse_network(network)?;
    }
    if cli.no_assets {
        config.client.asset_index_enabled = false;
    }
    info!(network = %config.client.network, "tonpad v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::New => wallet_new(&config),
        Commands::Connect(args) => wallet_connect(&config, args).await,
        Commands::Send(args) => wallet_send(&config, args).await,
        Commands::Price(args) => price(&config, args).await,
        Commands::Form => {
            let providers = Providers::from_config(&config.client);
            let session = Session::new(&providers, &config.session);
            form::run(&session).await
        }
    }
}

/// Generate a fresh mnemonic and print it with its addresses.
fn wallet_new(config: &Config) -> Result<()> {
    let phrase = Zeroizing::new(mnemonic::generate());
    let (_, wallet) = derive_wallet(&phrase).context("Generated mnemonic failed to derive")?;

    println!("\n=== WALLET CREATED ===");
    println!("Network: {}", config.client.network);
    println!("\nMNEMONIC (BACKUP THIS, 24 WORDS):");
    println!("  {}", phrase.as_str());
    println!(
        "\nAddress: {}",
        wallet
            .address()
            .to_friendly(FriendlyFormat::display_for(config.client.network))
    );
    print_renderings(&AddressRenderings::of(wallet.address()));
    println!("\nWARNING: This mnemonic will NOT be shown again.");
    println!("The wallet contract is deployed by its first outgoing transfer; fund it first.");
    Ok(())
}

/// Resolve the wallet and print its details.
async fn wallet_connect(config: &Config, args: ConnectArgs) -> Result<()> {
    let phrase = mnemonic_input(args.mnemonic)?;
    let providers = Providers::from_config(&config.client);
    let session = Session::new(&providers, &config.session);
    session.set_mnemonic(phrase.as_str());

    let resolved = session.connect().await?;
    let price = match providers.prices.usd_price().await {
        Ok(p) => Some(p),
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch TON price");
            None
        }
    };

    let view = session.snapshot();
    println!("Wallet Address: {}", resolved.display_address);
    println!("Raw: {}", resolved.address.to_raw());
    print_renderings(&AddressRenderings::of(&resolved.address));
    println!("Balance: {} TON", view.balance_display().unwrap_or_default());
    if let Some(price) = price {
        let balance = view.wallet.as_ref().map(|w| w.balance()).unwrap_or(0.0);
        println!("Value: {:.4}$", balance * price);
        println!("TON Price: ${price}");
    }
    println!("NFTs: {}", resolved.assets.nfts);
    println!("Jettons: {}", resolved.assets.jettons);
    Ok(())
}

/// Send one transfer.
async fn wallet_send(config: &Config, args: SendArgs) -> Result<()> {
    let phrase = mnemonic_input(args.mnemonic)?;
    let providers = Providers::from_config(&config.client);
    let session = Session::new(&providers, &config.session);
    session.set_mnemonic(phrase.as_str());
    session.set_destination(args.to);
    session.set_amount(args.amount);

    match session.send().await? {
        TransferOutcome::Sent { .. } => {
            if let Some(notice) = session.take_notice() {
                println!("{notice}");
            }
            println!("Submitted; not waiting for confirmation.");
        }
        TransferOutcome::NotDeployed { address } => {
            println!("Wallet {address} is not deployed; nothing was sent.");
        }
    }
    Ok(())
}

/// Print the price once, or keep printing it until Ctrl-C.
async fn price(config: &Config, args: PriceArgs) -> Result<()> {
    let providers = Providers::from_config(&config.client);
    if !args.watch {
        let price = providers
            .prices
            .usd_price()
            .await
            .context("Failed to fetch TON price")?;
        println!("TON Price: ${price}");
        return Ok(());
    }

    let ticker = PriceTicker::spawn(
        Arc::clone(&providers.prices),
        config.session.price_period,
        |quote| {
            if let (Some(price), Some(at)) = (quote.usd_per_unit, quote.fetched_at) {
                println!("{} TON Price: ${price}", at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
        },
    );
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    ticker.stop();
    Ok(())
}

fn print_renderings(r: &AddressRenderings) {
    println!("  bounceable (testnet):     {}", r.bounceable_testnet);
    println!("  non-bounceable (testnet): {}", r.non_bounceable_testnet);
    println!("  bounceable (mainnet):     {}", r.bounceable_mainnet);
    println!("  non-bounceable (mainnet): {}", r.non_bounceable_mainnet);
}

/// Use the given phrase or prompt for it without echo.
fn mnemonic_input(arg: Option<String>) -> Result<Zeroizing<String>> {
    let phrase = match arg {
        Some(p) => p,
        None => rpassword::prompt_password("Enter your mnemonic phrase: ")
            .context("Failed to read mnemonic")?,
    };
    if phrase.trim().is_empty() {
        bail!("Mnemonic is empty");
    }
    Ok(Zeroizing::new(phrase))
}

fn parse_network(s: &str) -> Result<Network> {
    s.parse().map_err(anyhow::Error::msg)
}
