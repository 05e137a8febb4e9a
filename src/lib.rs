/// Account identifiers.
pub mod address;

/// Whole-unit / base-unit conversion. The ledger itself only sees base units.
pub mod units;

/// Per-depositor balances for native currency and tokens.
pub mod balance;

/// Single-owner authorization.
pub mod access;

/// Active/paused operational state.
pub mod pause;

/// Interface of external token contracts, plus an in-memory token.
pub mod asset;

/// Native-currency holdings outside the vault.
pub mod native;

/// Checks how much an external token really moved.
pub mod verifier;

/// Events emitted by the vault.
pub mod events;

/// The custodial vault: deposit, withdrawal, pause and ownership entry points.
/// Ties [`balance`], [`access`], [`pause`] and [`verifier`] together.
pub mod vault;

/// Ledger commands parsed from raw operation fields, later executed by [`processor`].
pub mod command;

/// Operation processor interface, plus "in memory" implementation that
/// owns the vault and the world around it.
pub mod processor;

/// Scenario configuration loaded from TOML.
pub mod config;

pub mod logging;

/// Bootstraps the core logic for the binary. Lives in the library so the
/// integration tests can drive it.
pub mod bin_utils;
