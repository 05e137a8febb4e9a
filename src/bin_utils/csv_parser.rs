use std::io::Read;

use crate::{
    address::Address,
    command::{OperationFields, OperationKind},
};
use csv::{StringRecord, StringRecordsIntoIter, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct OperationRow {
    /// Empty for a plain value transfer.
    #[serde(rename = "op")]
    pub kind: Option<OperationKind>,
    pub caller: Address,
    pub value: Option<Decimal>,
    pub asset: Option<Address>,
    pub amount: Option<Decimal>,
    pub account: Option<Address>,
    pub mode: Option<u8>,
}

impl OperationRow {
    pub fn into_parts(self) -> (Address, Option<OperationKind>, OperationFields) {
        let fields = OperationFields {
            value: self.value,
            asset: self.asset,
            amount: self.amount,
            account: self.account,
            mode: self.mode,
        };
        (self.caller, self.kind, fields)
    }
}

/// Parses an operation list in CSV format, yielding each row with its line number.
pub struct CsvOperationParser<R> {
    headers: StringRecord,
    records: StringRecordsIntoIter<R>,
}

impl<R> CsvOperationParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> csv::Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);
        let headers = reader.headers()?.clone();

        Ok(Self {
            headers,
            records: reader.into_records(),
        })
    }
}

impl<R> Iterator for CsvOperationParser<R>
where
    R: Read,
{
    type Item = (u64, csv::Result<OperationRow>);

    fn next(&mut self) -> Option<Self::Item> {
        let item = match self.records.next()? {
            Ok(record) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                (line, record.deserialize(Some(&self.headers)))
            }
            Err(err) => (err.position().map(|p| p.line()).unwrap_or_default(), Err(err)),
        };
        Some(item)
    }
}
