//! Bootstraps [`crate`] within the binary: reads a scenario config and an
//! operation list, replays it and prints the resulting balances.

use std::{
    collections::BTreeSet,
    io::{Read, Write},
};

use crate::{
    address::Address,
    asset::TokenContract,
    config::LedgerConfig,
    events::{EventKind, VaultEvent},
    processor::{OperationProcessor, ProcessError, in_memory_processor::InMemoryProcessor},
    units::{Amount, DECIMALS, format_units},
};
use anyhow::Result;
use csv_parser::CsvOperationParser;
use csv_printer::{BalanceRow, NATIVE_ASSET, print_balances};
use thiserror::Error;
use tracing::info;
pub mod csv_parser;
pub mod csv_printer;

#[derive(Debug, Error)]
pub enum RowError {
    #[error("Malformed row: {0}")]
    Malformed(#[from] csv::Error),
    #[error(transparent)]
    Rejected(#[from] ProcessError),
}

pub struct Service<'w, R, W: 'w> {
    pub config: LedgerConfig,
    pub input: R,
    pub output: &'w mut W,
    pub error_printer: Box<dyn FnMut(u64, RowError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvOperationParser::new(self.input)?;

        let mut processor = self.config.build_processor()?;

        for (line, row) in parser {
            let result = row.map_err(RowError::from).and_then(|row| {
                let (caller, kind, fields) = row.into_parts();
                processor
                    .process_operation(caller, kind, fields)
                    .map_err(RowError::from)
            });
            if let Err(err) = result {
                (self.error_printer)(line, err);
            }
        }
        let events = processor.vault.events();
        let depositors: BTreeSet<&Address> = events.iter().map(VaultEvent::depositor).collect();
        info!(
            ether_deposits = events.filter(EventKind::EtherDeposited).count(),
            token_deposits = events.filter(EventKind::TokenDeposited).count(),
            depositors = depositors.len(),
            held = processor.vault.ether_balance(),
            tracked = processor.vault.balances().total_ether(),
            paused = processor.vault.is_paused(),
            "operations replayed"
        );

        print_balances(self.output, balance_rows(&processor).into_iter())
    }
}

/// Tracked balances per asset, each followed by the vault's own custody row.
/// Native currency comes first, then tokens by address.
fn balance_rows(processor: &InMemoryProcessor) -> Vec<BalanceRow> {
    let vault = &processor.vault;
    let custodian = vault.address();

    let mut native: Vec<(Address, Amount)> = vault
        .balances()
        .ether_entries()
        .map(|(holder, amount)| (*holder, *amount))
        .collect();
    native.sort();
    native.push((custodian, vault.ether_balance()));

    let mut assets: Vec<&Address> = processor.tokens.keys().collect();
    assets.sort();

    let mut rows = to_rows(NATIVE_ASSET, native);
    for asset in assets {
        let mut tracked: Vec<(Address, Amount)> = vault
            .balances()
            .token_entries()
            .filter(|(a, _, _)| *a == asset)
            .map(|(_, holder, amount)| (*holder, *amount))
            .collect();
        tracked.sort();
        tracked.push((custodian, processor.tokens[asset].balance_of(&custodian)));
        rows.extend(to_rows(&asset.to_string(), tracked));
    }
    rows
}

fn to_rows(asset: &str, entries: Vec<(Address, Amount)>) -> Vec<BalanceRow> {
    entries
        .into_iter()
        .map(|(holder, amount)| BalanceRow {
            asset: asset.to_string(),
            holder,
            amount: format_units(amount, DECIMALS),
        })
        .collect()
}
