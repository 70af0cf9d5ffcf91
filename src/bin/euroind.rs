use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use euro_indicators::dataset::{self, CanonicalDataset};
use euro_indicators::metrics::{self, KpiCards, format_value};
use euro_indicators::pipeline::{self, BuildOutput, IndicatorStatus};
use euro_indicators::{AppConfig, CountryRegistry, Fetcher, IndicatorRegistry, YearRange};
use euro_indicators::{stats, storage, viz};
use log::info;
use std::path::PathBuf;

const NO_DATA: &str = "No data available for current selection";

#[derive(Parser, Debug)]
#[command(
    name = "euroind",
    version,
    about = "Explore World Bank development indicators for European countries"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// First year to fetch (default 2000, or EUROIND_START_YEAR)
    #[arg(long, global = true)]
    start_year: Option<i32>,
    /// Last year to fetch (default 2024, or EUROIND_END_YEAR)
    #[arg(long, global = true)]
    end_year: Option<i32>,
    /// API base url (default https://api.worldbank.org/v2)
    #[arg(long, global = true)]
    api_base: Option<String>,
    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in countries and indicators (no network access).
    List,
    /// KPI cards for one country: latest value, YoY change, CAGR, rank.
    Kpi(KpiArgs),
    /// Time series for selected countries.
    Series(SelectArgs),
    /// Cross-country comparison of the latest value in range.
    Compare(RangeArgs),
    /// Map snapshot: all countries at the latest year in range.
    Map(RangeArgs),
    /// Grouped summary statistics per country.
    Stats(SelectArgs),
    /// Export all rows of one indicator.
    Export(ExportArgs),
    /// Render an SVG chart.
    Chart(ChartArgs),
    /// Per-indicator outcome of the dataset build.
    Report {
        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
struct RangeArgs {
    /// Indicator display name (see `euroind list`)
    #[arg(short, long)]
    indicator: Option<String>,
    /// First year of the selection (inclusive)
    #[arg(long)]
    from: Option<i32>,
    /// Last year of the selection (inclusive)
    #[arg(long)]
    to: Option<i32>,
}

#[derive(Args, Debug, Clone)]
struct SelectArgs {
    #[command(flatten)]
    range: RangeArgs,
    /// Country names separated by comma or semicolon (e.g., "Germany,France")
    #[arg(short, long)]
    countries: Option<String>,
}

#[derive(Args, Debug)]
struct KpiArgs {
    #[command(flatten)]
    range: RangeArgs,
    /// Country for the KPI cards (default Germany)
    #[arg(short, long)]
    country: Option<String>,
    /// Print raw metrics as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Indicator display name (see `euroind list`)
    #[arg(short, long)]
    indicator: Option<String>,
    /// Output directory
    #[arg(long, default_value = ".")]
    dir: PathBuf,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutFormat::Csv)]
    format: OutFormat,
}

#[derive(ValueEnum, Clone, Debug)]
enum ChartKind {
    /// Time series of the selected countries
    Line,
    /// Latest value per country
    Bar,
}

#[derive(Args, Debug)]
struct ChartArgs {
    #[command(flatten)]
    select: SelectArgs,
    /// Output path (.svg)
    #[arg(long)]
    out: PathBuf,
    #[arg(long, value_enum, default_value_t = ChartKind::Line)]
    kind: ChartKind,
    /// Width of the chart (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the chart (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
}

/// Everything a query subcommand needs after startup.
struct Session {
    cfg: AppConfig,
    indicators: IndicatorRegistry,
    built: BuildOutput,
}

impl Session {
    fn dataset(&self) -> &CanonicalDataset {
        &self.built.dataset
    }

    fn indicator(&self, requested: Option<&str>) -> Result<String> {
        let name = requested.unwrap_or(&self.cfg.default_indicator);
        if !self.indicators.contains(name) {
            bail!("unknown indicator {:?} (see `euroind list`)", name);
        }
        Ok(name.to_string())
    }

    fn range(&self, args: &RangeArgs) -> YearRange {
        let default = dataset::default_selection(self.dataset(), self.cfg.years);
        YearRange::new(
            args.from.unwrap_or(default.start),
            args.to.unwrap_or(default.end),
        )
    }

    fn countries(&self, list: Option<&str>) -> Vec<String> {
        match list {
            Some(s) => parse_list(s),
            None => self.cfg.default_countries.clone(),
        }
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(g: &GlobalArgs) -> Result<AppConfig> {
    // Flags override the environment; the merged result is validated once.
    let mut cfg = AppConfig::from_env_unvalidated()?;
    if let Some(base) = &g.api_base {
        cfg.api_base = base.trim_end_matches('/').to_string();
    }
    if let Some(y) = g.start_year {
        cfg.years.start = y;
    }
    if let Some(y) = g.end_year {
        cfg.years.end = y;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn start_session(cfg: AppConfig) -> Result<Session> {
    let countries = CountryRegistry::europe();
    let indicators = IndicatorRegistry::dashboard();
    let fetcher = Fetcher::from_config(&cfg)?;
    let built = pipeline::build_dataset(&fetcher, &countries, &indicators, cfg.years, cfg.per_page);
    info!(
        "dataset ready: {} rows, {} failed indicator(s)",
        built.dataset.len(),
        built.report.failed().count()
    );
    Ok(Session {
        cfg,
        indicators,
        built,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);
    let cfg = load_config(&cli.global)?;

    if let Command::List = cli.cmd {
        return cmd_list();
    }
    let session = start_session(cfg)?;
    match cli.cmd {
        Command::List => Ok(()),
        Command::Kpi(args) => cmd_kpi(&session, &args),
        Command::Series(args) => cmd_series(&session, &args),
        Command::Compare(args) => cmd_compare(&session, &args),
        Command::Map(args) => cmd_map(&session, &args),
        Command::Stats(args) => cmd_stats(&session, &args),
        Command::Export(args) => cmd_export(&session, &args),
        Command::Chart(args) => cmd_chart(&session, &args),
        Command::Report { json } => cmd_report(&session, json),
    }
}

fn cmd_list() -> Result<()> {
    println!("Indicators:");
    for (name, code) in IndicatorRegistry::dashboard().iter() {
        println!("  {name:<42} {code}");
    }
    println!("Countries:");
    for (name, code) in CountryRegistry::europe().iter() {
        println!("  {name:<42} {code}");
    }
    Ok(())
}

fn cmd_kpi(s: &Session, args: &KpiArgs) -> Result<()> {
    let indicator = s.indicator(args.range.indicator.as_deref())?;
    let country = args.country.clone().unwrap_or_else(|| s.cfg.kpi_country.clone());
    let range = s.range(&args.range);
    let m = metrics::compute_metrics(s.dataset(), &indicator, &country, range);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&m)?);
        return Ok(());
    }
    if m.is_unavailable() {
        println!("{NO_DATA}");
    }
    let cards = KpiCards::from_metrics(&indicator, &m);
    println!("{indicator} • {country}");
    println!("  Latest Value               {:<20} {}", cards.latest_value, cards.latest_year);
    println!("  vs. Previous Year          {:<20} {}", cards.yoy_pct, cards.yoy_abs);
    println!("  CAGR in Range              {:<20} {}", cards.cagr, cards.range);
    println!("  Europe Rank (Latest Year)  {:<20} {}", cards.rank, cards.rank_context);
    Ok(())
}

fn cmd_series(s: &Session, args: &SelectArgs) -> Result<()> {
    let indicator = s.indicator(args.range.indicator.as_deref())?;
    let countries = s.countries(args.countries.as_deref());
    let range = s.range(&args.range);
    let rows = dataset::filter(s.dataset(), &indicator, &countries, range);
    if rows.is_empty() {
        println!("{NO_DATA}");
        return Ok(());
    }
    println!("Evolution of {indicator} ({range})");
    for r in rows {
        println!(
            "  {:<24} {}  {}",
            r.country,
            r.year,
            format_value(&indicator, r.value)
        );
    }
    Ok(())
}

fn cmd_compare(s: &Session, args: &RangeArgs) -> Result<()> {
    let indicator = s.indicator(args.indicator.as_deref())?;
    let range = s.range(args);
    let rows = dataset::latest_per_country(s.dataset(), &indicator, range);
    if rows.is_empty() {
        println!("{NO_DATA}");
        return Ok(());
    }
    println!("Cross-Country Comparison: {indicator} ({range})");
    for (i, r) in rows.iter().enumerate() {
        println!(
            "  {:>2}. {:<24} {:<20} ({})",
            i + 1,
            r.country,
            format_value(&indicator, r.value),
            r.year
        );
    }
    Ok(())
}

fn cmd_map(s: &Session, args: &RangeArgs) -> Result<()> {
    let indicator = s.indicator(args.indicator.as_deref())?;
    let range = s.range(args);
    let Some((year, rows)) = dataset::map_snapshot(s.dataset(), &indicator, range) else {
        println!("{NO_DATA}");
        return Ok(());
    };
    println!("{indicator} — {year}");
    for r in rows {
        println!(
            "  {}  {:<24} {}",
            r.iso3,
            r.country,
            format_value(&indicator, r.value)
        );
    }
    Ok(())
}

fn cmd_stats(s: &Session, args: &SelectArgs) -> Result<()> {
    let indicator = s.indicator(args.range.indicator.as_deref())?;
    let countries = s.countries(args.countries.as_deref());
    let range = s.range(&args.range);
    let rows = dataset::filter(s.dataset(), &indicator, &countries, range);
    let summaries = stats::grouped_summary(rows);
    if summaries.is_empty() {
        println!("{NO_DATA}");
        return Ok(());
    }
    for sm in summaries {
        println!(
            "{} • {}  count={} missing={}  min={} max={} mean={} median={}",
            sm.key.country,
            sm.key.indicator,
            sm.count,
            sm.missing,
            format_value(&indicator, sm.min),
            format_value(&indicator, sm.max),
            format_value(&indicator, sm.mean),
            format_value(&indicator, sm.median)
        );
    }
    Ok(())
}

fn cmd_export(s: &Session, args: &ExportArgs) -> Result<()> {
    let indicator = s.indicator(args.indicator.as_deref())?;
    let path = match args.format {
        OutFormat::Csv => storage::save_indicator_csv(s.dataset(), &indicator, &args.dir)?,
        OutFormat::Json => {
            let path = args
                .dir
                .join(storage::export_file_name(&indicator))
                .with_extension("json");
            storage::save_json(dataset::indicator_rows(s.dataset(), &indicator), &path)?;
            path
        }
    };
    let n = dataset::indicator_rows(s.dataset(), &indicator).len();
    eprintln!("Saved {} rows to {}", n, path.display());
    Ok(())
}

fn cmd_chart(s: &Session, args: &ChartArgs) -> Result<()> {
    let indicator = s.indicator(args.select.range.indicator.as_deref())?;
    let range = s.range(&args.select.range);
    match args.kind {
        ChartKind::Line => {
            let countries = s.countries(args.select.countries.as_deref());
            let rows = dataset::filter(s.dataset(), &indicator, &countries, range);
            viz::plot_time_series(rows, &indicator, range, &args.out, args.width, args.height)?;
        }
        ChartKind::Bar => {
            let rows = dataset::latest_per_country(s.dataset(), &indicator, range);
            viz::plot_comparison(rows, &indicator, &args.out, args.width, args.height)?;
        }
    }
    eprintln!("Wrote chart to {}", args.out.display());
    Ok(())
}

fn cmd_report(s: &Session, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&s.built.report)?);
        return Ok(());
    }
    for o in &s.built.report.outcomes {
        let status = match &o.status {
            IndicatorStatus::Loaded {
                rows,
                pages,
                dropped_rows,
            } => format!("{rows} rows, {pages} page(s), {dropped_rows} dropped"),
            IndicatorStatus::Empty { .. } => "no data".to_string(),
            IndicatorStatus::Failed { reason } => format!("FAILED: {reason}"),
        };
        println!("{:<42} {:<18} {}", o.indicator, o.code, status);
    }
    println!(
        "total: {} rows across {} indicator(s)",
        s.dataset().len(),
        s.dataset().indicators().len()
    );
    Ok(())
}
