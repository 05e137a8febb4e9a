use std::{collections::BTreeMap, fs, path::Path};

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    address::Address,
    asset::{InMemoryToken, TokenError, TokenMode},
    logging::LogFormat,
    native::NativeError,
    processor::in_memory_processor::InMemoryProcessor,
    units::{DECIMALS, UnitsError, parse_units},
    vault::{Vault, VaultError},
};

/// Address the vault is deployed at when the config does not name one.
pub const DEFAULT_VAULT_ADDRESS: Address = Address::new([
    0x5f, 0xbd, 0xb2, 0x31, 0x56, 0x78, 0xaf, 0xec, 0xb3, 0x67, 0xf0, 0x32, 0xd9, 0x3f, 0x64, 0x2f,
    0x64, 0x18, 0x0a, 0xa3,
]);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Units(#[from] UnitsError),
    #[error(transparent)]
    Vault(#[from] VaultError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Native(#[from] NativeError),
    #[error("Token {0} is configured twice")]
    DuplicateToken(Address),
}

/// Initial world the operations are replayed against.
///
/// Balances are given in whole units.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_vault_address")]
    pub vault: Address,
    pub owner: Address,
    #[serde(default)]
    pub wallets: BTreeMap<Address, Decimal>,
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub address: Address,
    /// Raw behaviour mode, see [`TokenMode`].
    #[serde(default)]
    pub mode: u8,
    #[serde(default)]
    pub balances: BTreeMap<Address, Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_vault_address() -> Address {
    DEFAULT_VAULT_ADDRESS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LedgerConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Deploys the vault and funds wallets and tokens.
    pub fn build_processor(&self) -> Result<InMemoryProcessor, ConfigError> {
        let mut processor = InMemoryProcessor::new(Vault::new(self.vault, self.owner)?);
        for (holder, balance) in &self.wallets {
            processor
                .wallets
                .fund(*holder, parse_units(*balance, DECIMALS)?)?;
        }
        for token_config in &self.tokens {
            let mut token = InMemoryToken::with_mode(TokenMode::try_from(token_config.mode)?);
            for (holder, balance) in &token_config.balances {
                token.mint(*holder, parse_units(*balance, DECIMALS)?)?;
            }
            if processor
                .tokens
                .insert(token_config.address, token)
                .is_some()
            {
                return Err(ConfigError::DuplicateToken(token_config.address));
            }
        }
        Ok(processor)
    }
}
