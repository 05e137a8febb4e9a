use std::{cell::RefCell, rc::Rc, str::from_utf8};

use custody_ledger::{
    bin_utils::{RowError, Service},
    config::LedgerConfig,
    processor::ProcessError,
    vault::VaultError,
};

const CONFIG: &str = include_str!("scenario.toml");
const OPERATIONS: &str = include_str!("operations.csv");

#[test]
fn replay_operations() {
    let rejected = Rc::new(RefCell::new(Vec::new()));
    let errors = Rc::clone(&rejected);

    let mut output = Vec::new();
    let service = Service {
        config: LedgerConfig::from_toml_str(CONFIG).unwrap(),
        input: OPERATIONS.as_bytes(),
        output: &mut output,
        error_printer: Box::new(move |line, err| errors.borrow_mut().push((line, err))),
    };
    service.run().unwrap();

    let lines: Vec<&str> = from_utf8(&output).unwrap().lines().collect();
    assert_eq!(
        lines,
        vec![
            "asset,holder,amount",
            "native,0x2000000000000000000000000000000000000002,2.5",
            "native,0x3000000000000000000000000000000000000003,2",
            "native,0x5fbdb2315678afecb367f032d93f642f64180aa3,4",
            "0x7000000000000000000000000000000000000007,0x2000000000000000000000000000000000000002,100",
            "0x7000000000000000000000000000000000000007,0x5fbdb2315678afecb367f032d93f642f64180aa3,100",
        ]
    );

    let rejected = rejected.borrow();
    let lines: Vec<u64> = rejected.iter().map(|(line, _)| *line).collect();
    assert_eq!(lines, vec![4, 5, 9, 12, 15, 16, 17, 19, 21, 22]);

    let vault_errors: Vec<&VaultError> = rejected
        .iter()
        .filter_map(|(_, err)| match err {
            RowError::Rejected(ProcessError::VaultErr(err)) => Some(err),
            _ => None,
        })
        .collect();
    assert!(matches!(
        vault_errors[..],
        [
            VaultError::ZeroAmount,
            VaultError::Unauthorized { .. },
            VaultError::ExceedsMaxDeposit { .. },
            VaultError::TransferMismatch { .. },
            VaultError::Paused,
            VaultError::Paused,
            VaultError::AlreadyPaused,
            VaultError::Unauthorized { .. },
            VaultError::InvalidAsset,
        ]
    ));
    assert!(matches!(
        rejected[8],
        (21, RowError::Rejected(ProcessError::CommandErr(_)))
    ));
}

#[test]
fn malformed_rows_are_reported() {
    let rejected = Rc::new(RefCell::new(Vec::new()));
    let errors = Rc::clone(&rejected);

    let mut output = Vec::new();
    let service = Service {
        config: LedgerConfig::from_toml_str(CONFIG).unwrap(),
        input: "op,caller,value\nexplode,0x2000000000000000000000000000000000000002,\ndeposit_ether,not-an-address,1\n"
            .as_bytes(),
        output: &mut output,
        error_printer: Box::new(move |line, err| errors.borrow_mut().push((line, err))),
    };
    service.run().unwrap();

    let rejected = rejected.borrow();
    assert_eq!(rejected.len(), 2);
    assert!(
        rejected
            .iter()
            .all(|(_, err)| matches!(err, RowError::Malformed(_)))
    );
    // nothing deposited: only the custody rows remain
    let text = from_utf8(&output).unwrap();
    assert!(text.contains("native,0x5fbdb2315678afecb367f032d93f642f64180aa3,0"));
}

#[test]
fn report_large_balances() {
    let config = r#"
owner = "0x1000000000000000000000000000000000000001"

[wallets]
"0x2000000000000000000000000000000000000002" = "250000000000.5"
"#;
    let operations = "\
op,caller,value,asset,amount,account,mode
deposit_ether,0x2000000000000000000000000000000000000002,100000000000,,,,
,0x2000000000000000000000000000000000000002,0.25,,,,
";
    let rejected = Rc::new(RefCell::new(Vec::new()));
    let errors = Rc::clone(&rejected);

    let mut output = Vec::new();
    let service = Service {
        config: LedgerConfig::from_toml_str(config).unwrap(),
        input: operations.as_bytes(),
        output: &mut output,
        error_printer: Box::new(move |line, err| errors.borrow_mut().push((line, err))),
    };
    service.run().unwrap();

    assert!(rejected.borrow().is_empty());
    let lines: Vec<&str> = from_utf8(&output).unwrap().lines().collect();
    assert_eq!(
        lines,
        vec![
            "asset,holder,amount",
            "native,0x2000000000000000000000000000000000000002,100000000000.25",
            "native,0x5fbdb2315678afecb367f032d93f642f64180aa3,100000000000.25",
        ]
    );
}
