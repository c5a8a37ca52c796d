//! Runtime configuration for the vanity mint tool.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::crypto::{KeyDerivation, SecretCodec};
use crate::error::Result;
use crate::search::{SearchParams, DEFAULT_MAX_ATTEMPTS, DEFAULT_PREFIX};
use crate::token::PinataConfig;

/// Solana vanity mint generator
#[derive(Parser, Debug, Clone)]
#[command(name = "vanity_mint", author, version, about, long_about = None)]
pub struct Config {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Token record store (JSON file)
    #[arg(long, global = true, env = "VANITY_MINT_STORE", default_value = "tokens.json")]
    pub store: PathBuf,

    /// Passphrase protecting stored mint secrets
    #[arg(long, global = true, env = "PRIVATE_KEY_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Passphrase key derivation: padded or hkdf
    #[arg(long, global = true, env = "VANITY_MINT_KDF", default_value = "padded")]
    pub kdf: KeyDerivation,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Search for a vanity keypair and print it
    Search {
        #[command(flatten)]
        search: SearchArgs,

        /// Print the secret encrypted under the configured passphrase
        #[arg(short, long)]
        encrypt: bool,
    },

    /// Upload metadata, find a vanity mint keypair and store it encrypted
    Create {
        /// Wallet address that owns the token
        #[arg(short, long)]
        wallet: String,

        /// Token name
        #[arg(long)]
        name: String,

        /// Token symbol
        #[arg(long)]
        symbol: String,

        /// Token description
        #[arg(long)]
        description: String,

        /// Token image file
        #[arg(long)]
        image: PathBuf,

        #[command(flatten)]
        search: SearchArgs,

        #[command(flatten)]
        pinata: PinataArgs,
    },

    /// List stored token records, newest first
    List,

    /// Rebuild a stored mint keypair and produce its mint signature
    Mint {
        /// Token record id
        #[arg(long)]
        id: u64,

        /// Wallet paying for and co-signing the mint
        #[arg(short, long)]
        wallet: String,

        #[command(flatten)]
        pinata: PinataArgs,
    },
}

/// Vanity search options
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Address prefix to search for (base58, case-insensitive)
    #[arg(short, long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Number of prefix characters that must match (default: whole prefix)
    #[arg(short = 'm', long)]
    pub match_length: Option<usize>,

    /// Give up after this many keypairs
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u64,

    /// Give up after this many seconds
    #[arg(short, long, default_value = "30")]
    pub timeout: f64,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "5")]
    pub report_interval: u64,
}

/// IPFS pinning options
#[derive(Args, Debug, Clone)]
pub struct PinataArgs {
    /// Pinata JWT used for uploads
    #[arg(long, env = "PINATA_JWT", hide_env_values = true)]
    pub pinata_jwt: Option<String>,

    /// Gateway used in published URIs
    #[arg(long, env = "PINATA_GATEWAY", default_value = "https://ipfs.io")]
    pub gateway: String,

    /// Gateway used to read metadata back
    #[arg(long, env = "PINATA_FETCH_GATEWAY", default_value = "https://gateway.pinata.cloud")]
    pub fetch_gateway: String,
}

impl Config {
    /// Builds the secret codec. A missing passphrase only fails at use.
    pub fn codec(&self) -> Result<SecretCodec> {
        SecretCodec::new(self.secret.as_deref(), self.kdf)
    }
}

impl SearchArgs {
    /// Validates the options and converts them to search parameters.
    pub fn to_params(&self) -> std::result::Result<SearchParams, ConfigError> {
        let timeout = Duration::try_from_secs_f64(self.timeout)
            .ok()
            .filter(|t| !t.is_zero())
            .ok_or_else(|| {
                ConfigError::InvalidBudget(format!(
                    "timeout must be a positive number of seconds, got {}",
                    self.timeout
                ))
            })?;

        let match_length = self
            .match_length
            .unwrap_or_else(|| self.prefix.chars().count());

        let params = SearchParams::new(self.prefix.clone())
            .with_match_length(match_length)
            .with_max_attempts(self.max_attempts)
            .with_timeout(timeout);

        // Compile once so errors surface before any work starts.
        params.pattern()?;
        Ok(params)
    }

    /// Returns the progress report interval.
    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval.max(1))
    }
}

impl PinataArgs {
    pub fn to_config(&self) -> PinataConfig {
        let config = PinataConfig::new(self.gateway.clone(), self.fetch_gateway.clone());
        match &self.pinata_jwt {
            Some(jwt) => config.with_jwt(jwt.clone()),
            None => config,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid search budget: {0}")]
    InvalidBudget(String),

    #[error("Missing configuration: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_search_args(prefix: &str) -> SearchArgs {
        SearchArgs {
            prefix: prefix.into(),
            match_length: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: 30.0,
            report_interval: 5,
        }
    }

    #[test]
    fn test_valid_prefix() {
        let params = make_search_args("cbr").to_params().unwrap();
        assert_eq!(params.prefix_match_length, 3);
        assert_eq!(params.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_prefix() {
        assert!(make_search_args("c0r").to_params().is_err());

        let mut args = make_search_args("cb");
        args.match_length = Some(3);
        assert!(args.to_params().is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut args = make_search_args("cbr");
        args.timeout = 0.0;
        assert!(args.to_params().is_err());
        args.timeout = -1.0;
        assert!(args.to_params().is_err());
        args.timeout = f64::NAN;
        assert!(args.to_params().is_err());
        args.timeout = 0.01;
        assert_eq!(args.to_params().unwrap().timeout, Duration::from_millis(10));
    }

    #[test]
    fn test_parse_cli() {
        let config = Config::try_parse_from([
            "vanity_mint",
            "--kdf",
            "hkdf",
            "search",
            "--prefix",
            "cybr",
            "-m",
            "3",
        ])
        .unwrap();

        assert_eq!(config.kdf, KeyDerivation::Hkdf);
        match config.command {
            Command::Search { search, encrypt } => {
                assert!(!encrypt);
                assert_eq!(search.to_params().unwrap().prefix_match_length, 3);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
