mod logic;
mod storage;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use log::info;
use maw_game::{EmbeddedCatalog, MawEngine, MawHost};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use logic::{
    LogicTester, PickStrategy, ScenarioResult, build_scenarios, resolve_dates, resolve_policies,
    resolve_salts, resolve_tiers,
};
use storage::JsonFileStorage;

/// Slot name used by `--save`.
const SAVE_SLOT: &str = "maw";

#[derive(Debug, Parser)]
#[command(name = "maw-tester", version)]
#[command(about = "Headless QA for the Maw - simulates daily sessions and checks determinism")]
struct Args {
    /// Player salts to simulate (comma-separated); `gen:N` derives N salts
    #[arg(long, default_value = "abc123")]
    seeds: String,

    /// Session dates, `YYYY-MM-DD` or `start..end` (comma-separated)
    #[arg(long, default_value = "2026-02-06")]
    dates: String,

    /// Tiers to play (comma-separated, or `all`)
    #[arg(long, default_value = "1")]
    tiers: String,

    /// Boon pick policies (comma-separated, or `all`)
    #[arg(long, default_value = "first")]
    policies: String,

    /// List all available policies and exit
    #[arg(long)]
    list_policies: bool,

    /// Iterations per scenario (each varies the party-wipe rolls)
    #[arg(long, default_value_t = 5)]
    iterations: u32,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory to persist the final engine state into as JSON
    #[arg(long)]
    save: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_policies(&args)? {
        return Ok(());
    }

    announce_banner(&args);

    let start_time = Instant::now();
    let salts = resolve_salts(&split_csv(&args.seeds))?;
    let dates = resolve_dates(&split_csv(&args.dates))?;
    let tiers = resolve_tiers(&split_csv(&args.tiers))?;
    let policies = resolve_policies(&split_csv(&args.policies))?;
    let scenarios = build_scenarios(&salts, &dates, &tiers, &policies);
    info!(
        "{} scenario(s) x {} iteration(s)",
        scenarios.len(),
        args.iterations
    );

    let tester = LogicTester::new(args.verbose);
    let (results, last_engine) = tester.run_all(&scenarios, args.iterations);

    write_reports(&args, &results, start_time)?;

    if let (Some(dir), Some(engine)) = (&args.save, last_engine.as_ref()) {
        save_engine(dir, engine)?;
    }

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn maybe_list_policies(args: &Args) -> Result<bool> {
    if !args.list_policies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available policies:")?;
    for policy in PickStrategy::ALL {
        writeln!(
            output_target.writer(),
            "  {:10} - {}",
            policy.label(),
            policy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner(args: &Args) {
    // Machine-readable reports on stdout stay clean.
    if args.output.is_none() && args.report != "console" {
        return;
    }
    println!("{}", "🕳️  Maw Automated Tester".bright_cyan().bold());
    println!("{}", "=========================".cyan());
}

fn save_engine(dir: &Path, engine: &MawEngine) -> Result<()> {
    let storage = JsonFileStorage::new(dir);
    let target = storage.root().join(format!("{SAVE_SLOT}.json"));
    let host = MawHost::new(EmbeddedCatalog, storage);
    host.save_engine(SAVE_SLOT, engine)
        .with_context(|| format!("saving final state to {}", target.display()))?;
    info!("final state saved to {}", target.display());
    Ok(())
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            logic::reports::generate_json_report(&mut output_target, results)?;
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Maw Session Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            let duration = start_time.elapsed();
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(&mut output_target, results, duration)?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
