use std::fs::File;

use anyhow::{Context, Result};
use custody_ledger::{bin_utils::Service, config::LedgerConfig, logging::init_logging};
use tracing::warn;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let config_path = args
        .next()
        .context("Expected a config file as the first argument")?;
    let operations_path = args
        .next()
        .context("Expected an operations file as the second argument")?;

    let config = LedgerConfig::from_toml_file(&config_path)
        .with_context(|| format!("Failed to load `{config_path}`"))?;
    init_logging(config.log.format, &config.log.level);

    let file = File::open(&operations_path)
        .with_context(|| format!("Failed to open `{operations_path}`"))?;

    let service = Service {
        config,
        input: file,
        output: &mut std::io::stdout(),
        error_printer: Box::new(|line, err| warn!(line, %err, "operation rejected")),
    };
    service.run()
}
