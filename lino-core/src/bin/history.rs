//! Balance history viewer over the local ledger mirror
//!
//! ```text
//! lino-history <account> [all | recent N | range FROM TO]
//! ```
//!
//! Configuration comes from `LINO_CONFIG` (TOML file) if set, otherwise
//! from `LINO_*` environment variables.

use anyhow::{bail, Context};
use lino_core::{
    AccountKey, BalanceHistoryDetail, Config, LedgerClient, LedgerHistoryReader, Storage,
};

enum Mode {
    All,
    Recent(i64),
    Range(i64, i64),
}

fn parse_args(args: &[String]) -> anyhow::Result<(AccountKey, Mode)> {
    let account = match args.first() {
        Some(account) => AccountKey::new(account.as_str()),
        None => bail!("usage: lino-history <account> [all | recent N | range FROM TO]"),
    };

    let number = |i: usize| -> anyhow::Result<i64> {
        let raw = args.get(i).context("missing number")?;
        raw.parse().with_context(|| format!("not a number: {}", raw))
    };

    let mode = match args.get(1).map(String::as_str) {
        None | Some("all") => Mode::All,
        Some("recent") => Mode::Recent(number(2)?),
        Some("range") => Mode::Range(number(2)?, number(3)?),
        Some(other) => bail!("unknown mode {}", other),
    };

    Ok((account, mode))
}

fn print_record(record: &BalanceHistoryDetail) {
    let when = record
        .created_at_utc()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| record.created_at.to_string());
    let sign = if record.detail_type.is_income() { "+" } else { "-" };

    println!(
        "{}  {:?}  {} -> {}  {}{} LNO  balance {} LNO  {}",
        when,
        record.detail_type,
        record.from,
        record.to,
        sign,
        record.amount,
        record.balance,
        record.memo
    );
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (account, mode) = parse_args(&args)?;

    let config = match std::env::var("LINO_CONFIG") {
        Ok(path) => Config::from_file(&path).with_context(|| format!("loading {}", path))?,
        Err(_) => Config::from_env()?,
    };

    let storage = Storage::open(&config).context("opening ledger mirror")?;
    let reader = LedgerHistoryReader::with_config(LedgerClient::new(storage), &config.history);

    let records = match mode {
        Mode::All => reader.get_all(&account)?,
        Mode::Recent(n) => reader.get_recent(&account, n)?,
        Mode::Range(from, to) => reader.get_range(&account, from, to)?,
    };

    tracing::info!(account = %account, records = records.len(), "History loaded");

    for record in &records {
        print_record(record);
    }

    Ok(())
}
