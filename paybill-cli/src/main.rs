use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{info, warn};
use paybill_core::{aggregate, filter_by_date, normalize};
use paybill_ingest::TableExtractor;
use paybill_sheets::read_records;
use std::path::{Path, PathBuf};

mod config;
mod report;
mod state;

use config::{AGGREGATED_FILE, Config, FILTERED_FILE};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PAYBILL_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "paybill", version = VERSION, about = "Member contribution reports from bank statement PDFs")]
struct Cli {
    /// Config file (default: ~/.paybill/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract transactions from a statement PDF, filter by posting date and export CSV
    Extract {
        pdf: PathBuf,

        /// Statement password, if the PDF is protected
        #[arg(long)]
        password: Option<String>,

        /// First posting date to keep, YYYY-MM-DD (default: earliest in the statement)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last posting date to keep, YYYY-MM-DD (default: latest in the statement)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Output CSV (default: Filtered_Data.csv in the configured output_dir)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print the preview as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sum credits per member from an exported or hand-validated CSV/XLSX
    Aggregate {
        file: PathBuf,

        /// Output CSV (default: Aggregated_Data.csv in the configured output_dir)
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config unless one exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Extract {
            pdf,
            password,
            from,
            to,
            out,
            json,
        } => {
            let cfg = config::load_config(config_path)?;
            run_extract(&cfg, &pdf, password.as_deref(), from, to, out, json)?;
        }

        Command::Aggregate { file, out, json } => {
            let cfg = config::load_config(config_path)?;
            run_aggregate(&cfg, &file, out, json)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(config_path)?,
            ConfigCommand::Show => {
                let cfg = config::load_config(config_path)?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn run_extract(
    cfg: &Config,
    pdf: &Path,
    password: Option<&str>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    out: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let bytes = std::fs::read(pdf).with_context(|| format!("read {}", pdf.display()))?;
    let extractor = TableExtractor::from_config(&cfg.extract).context("invalid excluded_keywords")?;

    let raw = match extractor.extract(&bytes, password) {
        Ok(raw) => raw,
        Err(e) if e.is_warning() => {
            warn!("{}: {}", pdf.display(), e);
            return Ok(());
        }
        Err(e) => return Err(anyhow::Error::new(e).context(format!("extract {}", pdf.display()))),
    };
    let records = normalize(raw).with_context(|| format!("normalize {}", pdf.display()))?;

    let bounds = records.posting_date_bounds();
    let (Some(start), Some(end)) = (from.or(bounds.map(|b| b.0)), to.or(bounds.map(|b| b.1))) else {
        warn!("{}: no readable posting dates; pass --from and --to", pdf.display());
        return Ok(());
    };
    if start > end {
        warn!("--from {} is after --to {}; nothing will match", start, end);
    }

    let total = records.len();
    let filtered = filter_by_date(records, start, end);
    info!("{} of {} rows posted between {} and {}", filtered.len(), total, start, end);

    report::preview_transactions(&filtered, cfg.export.preview_rows, json)?;

    let path = cfg.export.output_path(out, FILTERED_FILE);
    report::save_transactions(&filtered, &path)?;
    println!("Wrote {} rows to {}", filtered.len(), path.display());
    Ok(())
}

fn run_aggregate(cfg: &Config, file: &Path, out: Option<PathBuf>, json: bool) -> Result<()> {
    let raw = read_records(file).with_context(|| format!("read {}", file.display()))?;
    let records = normalize(raw).with_context(|| format!("normalize {}", file.display()))?;
    let summary = aggregate(&records).with_context(|| format!("aggregate {}", file.display()))?;
    info!("{} members across {} rows", summary.len(), records.len());

    report::preview_aggregates(&summary, cfg.export.preview_rows, json)?;

    let path = cfg.export.output_path(out, AGGREGATED_FILE);
    report::save_aggregates(&summary, &path)?;
    println!("Wrote {} members to {}", summary.len(), path.display());
    Ok(())
}
