use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context};
use colored::Colorize;
use hcl_ledger::{
    InMemoryLedger, LedgerReader, LedgerWriter, StreamValidator, TamperHook, ValidationReport,
};
use hcl_types::{Record, Timestamp};
use serde::Serialize;

use crate::cli::*;
use crate::config::CliConfig;

const RULE: &str = "----------------------------------------";

pub fn run_command(cli: Cli, config: &CliConfig) -> anyhow::Result<ExitCode> {
    Ok(if execute(cli, config)? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Runs one subcommand. `Ok(false)` means the command ran but the ledger
/// failed verification.
fn execute(cli: Cli, config: &CliConfig) -> anyhow::Result<bool> {
    let path = cli.ledger.unwrap_or_else(|| config.ledger.path.clone());
    let format = cli.format;

    match cli.command {
        Command::Demo(args) => cmd_demo(args, format),
        Command::Init(args) => cmd_init(args, &path, format),
        Command::Append(args) => cmd_append(args, &path, format),
        Command::Show(args) => cmd_show(args, &path, format),
        Command::Log(args) => cmd_log(args, &path, format),
        Command::Verify(_) => cmd_verify(&path, format),
        Command::Tamper(args) => cmd_tamper(args, &path, format),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DemoReport {
    records: Vec<Record>,
    valid_before_tampering: bool,
    tampered: Record,
    valid_after_tampering: bool,
}

/// Build the three-record demonstration chain, verify it, tamper with one
/// record, and verify again.
fn run_demo(args: DemoArgs) -> anyhow::Result<DemoReport> {
    let ledger = InMemoryLedger::new();
    ledger.create_genesis()?;
    for transfer in ["Alice sends 10 ETH to Bob", "Bob sends 5 ETH to Charlie"] {
        ledger.append(vec![transfer.to_string()])?;
    }

    let records = ledger.records()?;
    let valid_before_tampering = ledger.is_chain_valid()?;

    let tampered = ledger
        .tamper(args.target, vec![args.forged])
        .with_context(|| format!("cannot tamper with block #{}", args.target))?;
    let valid_after_tampering = ledger.is_chain_valid()?;

    Ok(DemoReport {
        records,
        valid_before_tampering,
        tampered,
        valid_after_tampering,
    })
}

fn cmd_demo(args: DemoArgs, format: OutputFormat) -> anyhow::Result<bool> {
    let report = run_demo(args)?;
    if format == OutputFormat::Json {
        print_json(&report)?;
        return Ok(true);
    }

    println!("{} HashChain ledger created (in-memory)", "✓".green().bold());
    println!("{RULE}");

    for (len, record) in (1..).zip(&report.records) {
        if record.is_genesis() {
            println!("Genesis block created. Chain length: {len}");
            print_record("Genesis Block", record, false);
        } else {
            println!("Block #{} added. Chain length: {len}", record.index);
            print_record(&format!("Block #{}", record.index), record, true);
        }
        println!("{RULE}");
    }

    println!(
        "Chain validity before tampering: {}",
        validity(report.valid_before_tampering)
    );
    println!("{RULE}");

    let tampered = &report.tampered;
    println!(
        "Block #{} tampered. Chain length: {}",
        tampered.index,
        report.records.len()
    );
    print_record(&format!("Block #{} (Tampered)", tampered.index), tampered, false);
    println!("{RULE}");
    println!(
        "Chain validity after tampering: {}",
        validity(report.valid_after_tampering)
    );
    println!("{RULE}");

    Ok(true)
}

fn cmd_init(args: InitArgs, path: &Path, format: OutputFormat) -> anyhow::Result<bool> {
    if path.exists() && !args.force {
        bail!(
            "ledger already exists at {} (use --force to replace it)",
            path.display()
        );
    }

    let ledger = InMemoryLedger::new();
    let genesis = ledger.create_genesis_with(args.payload)?;
    save_ledger(&ledger, path)?;

    match format {
        OutputFormat::Text => {
            println!(
                "{} Initialized ledger at {}",
                "✓".green().bold(),
                path.display().to_string().bold()
            );
            print_record("Genesis Block", &genesis, false);
        }
        OutputFormat::Json => print_json(&genesis)?,
    }
    Ok(true)
}

fn cmd_append(args: AppendArgs, path: &Path, format: OutputFormat) -> anyhow::Result<bool> {
    let ledger = load_ledger(path)?;
    let record = ledger.append(args.entries)?;
    save_ledger(&ledger, path)?;

    match format {
        OutputFormat::Text => {
            println!(
                "Block #{} added. Chain length: {}",
                record.index,
                ledger.len()?
            );
            print_record(&format!("Block #{}", record.index), &record, true);
        }
        OutputFormat::Json => print_json(&record)?,
    }
    Ok(true)
}

fn cmd_show(args: ShowArgs, path: &Path, format: OutputFormat) -> anyhow::Result<bool> {
    let ledger = load_ledger(path)?;
    let record = ledger.get(args.index)?;

    match format {
        OutputFormat::Text => {
            print_record(&format!("Block #{}", record.index), &record, !record.is_genesis())
        }
        OutputFormat::Json => print_json(&record)?,
    }
    Ok(true)
}

fn cmd_log(args: LogArgs, path: &Path, format: OutputFormat) -> anyhow::Result<bool> {
    let ledger = load_ledger(path)?;
    let records = ledger.records()?;
    let start = records.len().saturating_sub(args.limit);
    let shown = &records[start..];

    if format == OutputFormat::Json {
        print_json(&shown)?;
        return Ok(true);
    }

    for record in shown {
        if args.oneline {
            println!(
                "{} {} {}",
                format!("#{}", record.index).yellow(),
                record.hash.short_hex().dimmed(),
                record.payload.join(" | ")
            );
        } else {
            print_record(&format!("Block #{}", record.index), record, !record.is_genesis());
        }
    }
    Ok(true)
}

#[derive(Serialize)]
struct VerifyOutput<'a> {
    valid: bool,
    #[serde(flatten)]
    report: &'a ValidationReport,
}

fn cmd_verify(path: &Path, format: OutputFormat) -> anyhow::Result<bool> {
    let ledger = load_ledger(path)?;
    let report = StreamValidator::validate(&ledger)?;
    let valid = report.is_valid();

    match format {
        OutputFormat::Text if valid => {
            println!(
                "{} Chain integrity verified ({} records)",
                "✓".green().bold(),
                report.record_count
            );
            println!("  Genesis link: {}", "valid".green());
            println!("  Indices: {}", "sequential".green());
            println!("  Hash chain: {}", "valid".green());
        }
        OutputFormat::Text => {
            println!(
                "{} Chain integrity check failed ({} records, {} violations)",
                "✗".red().bold(),
                report.record_count,
                report.violations.len()
            );
            for violation in &report.violations {
                println!(
                    "  {} {:?}: {}",
                    format!("#{}", violation.index).yellow(),
                    violation.kind,
                    violation.description
                );
            }
        }
        OutputFormat::Json => print_json(&VerifyOutput {
            valid,
            report: &report,
        })?,
    }
    Ok(valid)
}

fn cmd_tamper(args: TamperArgs, path: &Path, format: OutputFormat) -> anyhow::Result<bool> {
    let ledger = load_ledger(path)?;
    let record = ledger.tamper(args.index, args.entries)?;
    save_ledger(&ledger, path)?;

    match format {
        OutputFormat::Text => {
            println!(
                "{} Block #{} tampered; its stored hash was left unchanged",
                "!".red().bold(),
                record.index
            );
            print_record(&format!("Block #{} (Tampered)", record.index), &record, false);
        }
        OutputFormat::Json => print_json(&record)?,
    }
    Ok(true)
}

fn load_ledger(path: &Path) -> anyhow::Result<InMemoryLedger> {
    if !path.exists() {
        bail!("no ledger at {}; run `hcl init` first", path.display());
    }
    InMemoryLedger::load(path)
        .with_context(|| format!("failed to load ledger from {}", path.display()))
}

fn save_ledger(ledger: &InMemoryLedger, path: &Path) -> anyhow::Result<()> {
    ledger
        .save(path)
        .with_context(|| format!("failed to save ledger to {}", path.display()))
}

fn print_record(label: &str, record: &Record, with_previous: bool) {
    println!("{}:", label.bold());
    println!("  Index: {}", record.index);
    println!("  Timestamp: {}", format_timestamp(record.timestamp));
    println!("  Hash: {}", format!("0x{}", record.hash).cyan());
    if with_previous {
        println!("  PreviousHash: 0x{}", record.previous_hash);
    }
    if !record.payload.is_empty() {
        println!("  Payload: {}", record.payload.join(" | "));
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn validity(valid: bool) -> colored::ColoredString {
    if valid {
        "true".green().bold()
    } else {
        "false".red().bold()
    }
}

fn format_timestamp(timestamp: Timestamp) -> String {
    let utc = i64::try_from(timestamp.as_secs())
        .ok()
        .and_then(|secs| chrono::DateTime::<chrono::Utc>::from_timestamp(secs, 0));
    match utc {
        Some(dt) => format!("{timestamp} ({})", dt.format("%Y-%m-%d %H:%M:%S UTC")),
        None => timestamp.to_string(),
    }
}
