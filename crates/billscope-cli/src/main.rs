mod display;

use std::path::{Path, PathBuf};

use anyhow::Context;
use billscope_analysis::{AnalysisConfig, Pipeline, StatisticsBundle, bundle};
use billscope_classify::{BillLoader, ColumnMap, LoadOutcome};
use billscope_core::KeywordTable;
use billscope_store::CsvExport;
use clap::{Args, Parser, Subcommand};
use tracing::info;

/// Child online safety bill analysis.
///
/// Classifies legislative bills against a versioned keyword table and reports
/// per-state provision coverage, consensus, and federal/state activity.
#[derive(Parser, Debug)]
#[command(name = "billscope", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the analysis and write the statistics bundle.
    Analyze(AnalyzeArgs),
    /// Show or export the keyword table.
    Keywords(KeywordsArgs),
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// State bill export (CSV).
    #[arg(long)]
    state_bills: PathBuf,

    /// Federal bill export (CSV). Rows without a jurisdiction become federal.
    #[arg(long)]
    federal_bills: Option<PathBuf>,

    #[command(flatten)]
    keywords: KeywordSource,

    /// Analysis config (JSON). Defaults apply when omitted.
    #[arg(long, env = "BILLSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Write the bundle JSON here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Also write scores, consensus, and bills as Parquet into this directory.
    #[arg(long)]
    parquet_dir: Option<PathBuf>,

    /// Stage the exports in DuckDB before loading.
    #[cfg(feature = "duckdb")]
    #[arg(long)]
    duckdb: bool,
}

#[derive(Args, Debug)]
struct KeywordsArgs {
    #[command(flatten)]
    keywords: KeywordSource,

    /// Print the table as JSON.
    #[arg(long)]
    export: bool,
}

#[derive(Args, Debug)]
struct KeywordSource {
    /// Keyword table (JSON). The built-in table is used when omitted.
    #[arg(long, env = "BILLSCOPE_KEYWORDS")]
    keywords: Option<PathBuf>,
}

impl KeywordSource {
    fn load(&self) -> anyhow::Result<KeywordTable> {
        match &self.keywords {
            Some(path) => KeywordTable::from_path(path)
                .with_context(|| format!("loading keyword table {}", path.display())),
            None => KeywordTable::builtin().context("loading built-in keyword table"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => analyze(&args),
        Commands::Keywords(args) => keywords(&args),
    }
}

fn analyze(args: &AnalyzeArgs) -> anyhow::Result<()> {
    info!("billscope v{}", env!("CARGO_PKG_VERSION"));

    let table = args.keywords.load()?;
    let config = match &args.config {
        Some(path) => AnalysisConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    let pipeline = Pipeline::new(table, config).context("building pipeline")?;
    let federal_label = pipeline.config().federal_label.as_str();
    info!(
        table = pipeline.table().version(),
        fingerprint = pipeline.table().fingerprint(),
        federal_label,
        "pipeline ready"
    );

    let state = BillLoader::new(ColumnMap::default());
    let mut outcome = load_export(args, &state, &args.state_bills, "state_bills")?;

    if let Some(path) = &args.federal_bills {
        let federal = BillLoader::new(ColumnMap::default()).with_default_jurisdiction(federal_label);
        outcome = outcome.merge(load_export(args, &federal, path, "federal_bills")?);
    }

    let bundle = pipeline.run(&outcome).context("running analysis")?;
    let json = bundle.to_json_pretty().context("serialising bundle")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote statistics bundle");
            display::print_summary(&bundle)?;
        }
        None => println!("{json}"),
    }

    if let Some(dir) = &args.parquet_dir {
        write_tables(dir, &bundle, &outcome)?;
    }
    Ok(())
}

fn keywords(args: &KeywordsArgs) -> anyhow::Result<()> {
    let table = args.keywords.load()?;
    if args.export {
        println!("{}", table.to_json_pretty()?);
    } else {
        display::print_keyword_table(&table);
    }
    Ok(())
}

/// Read one export and load it, counting rows the reader rejected as skipped.
fn load_export(
    args: &AnalyzeArgs,
    loader: &BillLoader,
    path: &Path,
    table: &str,
) -> anyhow::Result<LoadOutcome> {
    let export = read_export(args, path, table)?;
    let outcome = loader
        .load(&export.batches)
        .with_context(|| format!("loading {}", path.display()))?;
    Ok(outcome.with_malformed_rows(export.malformed_rows))
}

#[cfg(feature = "duckdb")]
fn read_export(args: &AnalyzeArgs, path: &Path, table: &str) -> anyhow::Result<CsvExport> {
    if !args.duckdb {
        return billscope_store::read_csv(path)
            .with_context(|| format!("reading {}", path.display()));
    }
    let store = billscope_store::DuckStore::open().context("opening DuckDB")?;
    store
        .load_bills_csv(table, path)
        .with_context(|| format!("staging {} in DuckDB", path.display()))?;

    let statuses = store.status_counts(table, &ColumnMap::default().status)?;
    eprintln!("  Raw statuses in {}", path.display());
    eprintln!("{}", arrow::util::pretty::pretty_format_batches(&statuses)?);

    Ok(CsvExport {
        batches: store.bills(table)?,
        malformed_rows: store.rejected_rows()?,
    })
}

#[cfg(not(feature = "duckdb"))]
fn read_export(_args: &AnalyzeArgs, path: &Path, _table: &str) -> anyhow::Result<CsvExport> {
    billscope_store::read_csv(path).with_context(|| format!("reading {}", path.display()))
}

fn write_tables(dir: &Path, bundle: &StatisticsBundle, outcome: &LoadOutcome) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let tables = [
        ("jurisdiction_scores.parquet", bundle.scores_batch()?),
        ("provision_consensus.parquet", bundle.consensus_batch()?),
        ("bills.parquet", bundle::bills_batch(&outcome.records)?),
    ];
    for (name, batch) in &tables {
        let path = dir.join(name);
        billscope_store::write_parquet(&path, batch)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    eprintln!("  Wrote {} tables to {}", tables.len(), dir.display());
    Ok(())
}
