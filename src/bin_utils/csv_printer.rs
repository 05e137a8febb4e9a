use std::io::Write;

use crate::address::Address;
use csv::Writer;
use serde::Serialize;

/// Label used in the `asset` column for native currency.
pub const NATIVE_ASSET: &str = "native";

#[derive(Debug, Serialize)]
pub struct BalanceRow {
    pub asset: String,
    pub holder: Address,
    /// Whole units.
    pub amount: String,
}

pub fn print_balances<W>(
    output: &mut W,
    rows: impl Iterator<Item = BalanceRow>,
) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for row in rows {
        if let Err(err) = writer.serialize(row) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    // Ensure all data is flushed to the output
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}
