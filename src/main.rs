//! Solana Vanity Mint CLI
//!
//! Usage:
//!   vanity_mint search -p cbr                      # Find a mint address starting with "cbr"
//!   vanity_mint create -w <wallet> --name Cyber --symbol CBR --description .. --image logo.png
//!   vanity_mint list
//!   vanity_mint mint --id 1 -w <wallet>

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vanity_mint::config::{Command, PinataArgs, SearchArgs};
use vanity_mint::token::{
    FileStore, PartialSigner, PinataClient, TokenMetadata, TokenRecord, TokenRecordStore,
    TokenService,
};
use vanity_mint::{Address, Config, MintError, SearchParams, SearchRunner, SecretCodec};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    let filter = if config.verbose {
        "vanity_mint=debug,info"
    } else {
        "vanity_mint=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let codec = config.codec()?;

    match config.command {
        Command::Search { search, encrypt } => {
            tokio::task::spawn_blocking(move || cmd_search(&search, encrypt.then_some(&codec)))
                .await?
        }
        Command::Create {
            wallet,
            name,
            symbol,
            description,
            image,
            search,
            pinata,
        } => {
            let metadata = TokenMetadata::new(name, symbol, description);
            cmd_create(&config.store, codec, &wallet, metadata, &image, &search, &pinata).await
        }
        Command::List => cmd_list(&config.store).await,
        Command::Mint { id, wallet, pinata } => {
            cmd_mint(&config.store, codec, id, &wallet, &pinata).await
        }
    }
}

/// Run a vanity search in the foreground with progress reports
fn cmd_search(args: &SearchArgs, codec: Option<&SecretCodec>) -> Result<()> {
    let params = args.to_params()?;
    let runner = SearchRunner::spawn(&params)?;

    println!("Solana Vanity Mint Search");
    println!("=========================");
    println!("Prefix:     {}", runner.pattern().requested());
    println!("Compared:   {}", runner.pattern().pattern());
    println!("Difficulty: {}", runner.pattern().difficulty_description());
    println!(
        "Budget:     {} attempts, {:.0}s",
        format_number(params.max_attempts),
        params.timeout.as_secs_f64()
    );
    println!();

    ctrlc_handler(runner.stop_flag_clone())?;
    println!("Searching... (Press Ctrl+C to stop)\n");

    let report_interval = args.report_interval();
    let outcome = loop {
        match runner.wait_for_result(report_interval) {
            Some(outcome) => break outcome,
            None => print_progress(&runner),
        }
    };

    let found = match outcome {
        Ok(found) => found,
        Err(MintError::Cancelled { attempts }) => {
            println!("\nStopped by user after {} attempts.", format_number(attempts));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("=== Match ===");
    println!("Address:  {}", found.keypair.address());
    println!("Attempts: {}", format_number(found.attempts));
    println!("Time:     {:.2}s", found.elapsed.as_secs_f64());
    println!("Speed:    {}/s", format_number(found.attempts_per_second() as u64));

    match codec {
        Some(codec) => println!("Encrypted Secret: {}", codec.encrypt_keypair(&found.keypair)?),
        None => println!("Secret Key: {}", found.keypair.secret_base58().as_str()),
    }

    runner.join();
    Ok(())
}

async fn open_service(
    store: &Path,
    codec: SecretCodec,
    pinata: &PinataArgs,
    search: SearchParams,
) -> Result<TokenService> {
    let store = FileStore::open(store)
        .await
        .with_context(|| format!("opening token store {}", store.display()))?;
    let metadata = PinataClient::new(pinata.to_config())?;

    Ok(TokenService::new(
        Arc::new(metadata),
        Arc::new(store),
        Arc::new(PartialSigner),
        codec,
        search,
    ))
}

/// Upload metadata, search for a mint keypair and store it
async fn cmd_create(
    store: &Path,
    codec: SecretCodec,
    wallet: &str,
    metadata: TokenMetadata,
    image: &Path,
    search: &SearchArgs,
    pinata: &PinataArgs,
) -> Result<()> {
    let wallet: Address = wallet.parse()?;
    let params = search.to_params()?;
    let image_bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("reading image {}", image.display()))?;
    let file_name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let service = open_service(store, codec, pinata, params).await?;
    let created = service
        .create_token_info(&wallet, &metadata, image_bytes, &file_name)
        .await?;

    println!("=== Token Created ===");
    println!("Id:           {}", created.id);
    println!("Token:        {}", created.token_address);
    println!("Metadata URI: {}", created.metadata_uri);
    println!(
        "Search:       {} attempts in {:.2}s",
        format_number(created.attempts),
        created.elapsed.as_secs_f64()
    );
    Ok(())
}

/// List stored token records
async fn cmd_list(store: &Path) -> Result<()> {
    let store = FileStore::open(store).await?;
    let records = store.list_all().await?;

    if records.is_empty() {
        println!("No tokens stored.");
        return Ok(());
    }

    for record in &records {
        print_record(record);
    }
    println!("{} token(s)", records.len());
    Ok(())
}

/// Rebuild a stored mint keypair and sign its mint
async fn cmd_mint(
    store: &Path,
    codec: SecretCodec,
    id: u64,
    wallet: &str,
    pinata: &PinataArgs,
) -> Result<()> {
    let payer: Address = wallet.parse()?;
    let service = open_service(store, codec, pinata, SearchParams::default()).await?;
    let receipt = service.mint_token(id, &payer).await?;

    if receipt.is_confirmed() {
        println!("=== Token Minted ===");
    } else {
        println!("=== Mint Signed (awaiting payer signature and submission) ===");
    }
    println!("Mint:      {}", receipt.mint);
    println!("Signature: {}", receipt.signature);
    Ok(())
}

fn print_record(record: &TokenRecord) {
    println!("#{} {}", record.id, record.token_address);
    println!("  Wallet:   {}", record.wallet_address);
    println!("  Metadata: {}", record.metadata_uri);
    println!("  Created:  {}", record.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Minted:   {}", if record.is_minted { "yes" } else { "no" });
}

fn print_progress(runner: &SearchRunner) {
    println!(
        "[{:>4}s] Tried {} keypairs ({}/s)",
        runner.elapsed().as_secs(),
        format_number(runner.total_attempts()),
        format_number(runner.attempts_per_second() as u64)
    );
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(stop_flag: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::Relaxed);
    })
    .context("setting Ctrl-C handler")
}
