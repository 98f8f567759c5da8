use analytics::{AnalyticsEngine, PerformanceReport};
use beta::estimate_betas;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use configuration::{load_config_from, Config};
use core_types::{BetaMap, DailyResult, ExchangeRateSeries, PriceTable};
use indicatif::{ProgressBar, ProgressStyle};
use market_data::{
    constant_rates, daily_returns, fill_missing, forward_fill_rates, load_price_table,
    load_rate_series, trending_prices, validate_price_table, SyntheticSeries,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use simulator::{SimulationObserver, SimulationRun, Simulator};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// The main entry point for the Meridian portfolio simulator.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => {
            if let Err(e) = handle_simulate(args) {
                eprintln!("Error during simulation: {e:#}");
                std::process::exit(1);
            }
        }
        Commands::Betas(args) => {
            if let Err(e) = handle_betas(args) {
                eprintln!("Error during beta estimation: {e:#}");
                std::process::exit(1);
            }
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A market-neutral long/short equity portfolio simulator.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full portfolio simulation and report its performance.
    Simulate(SimulateArgs),

    /// Estimate and print per-ticker betas without simulating.
    Betas(BetasArgs),
}

#[derive(Parser)]
struct SimulateArgs {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Optional wide-format price CSV (date,TICKER,...). Without it, a
    /// deterministic synthetic market is fabricated from the configuration.
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Optional date,rate CSV of USD/CAD rates. Without it, the constant
    /// rate from the configuration is used on every date.
    #[arg(long)]
    rates: Option<PathBuf>,

    /// Directory for the daily results and transaction log CSVs.
    #[arg(long, default_value = "output")]
    output: PathBuf,
}

#[derive(Parser)]
struct BetasArgs {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Optional wide-format price CSV; synthetic prices otherwise.
    #[arg(long)]
    prices: Option<PathBuf>,
}

// ==============================================================================
// Simulate Command Logic
// ==============================================================================

fn handle_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let config = load_config_from(&args.config)?;
    config.validate()?;

    let prices = prepare_prices(&config, args.prices.as_deref())?;
    let betas = estimate_market_betas(&config, &prices)?;
    let rates = prepare_rates(&config, &prices, args.rates.as_deref())?;

    println!(
        "Simulating {} trading days from {} to {}",
        prices.len(),
        config.simulation.start_date,
        config.simulation.end_date
    );

    let observer = ProgressObserver::new()?;
    let simulator = Simulator::from_config(config).with_observer(Box::new(observer));
    let run = simulator.run(&prices, &betas, &rates)?;

    let report = AnalyticsEngine::new().calculate(&run.results, &run.transactions)?;
    print_report(&report, &run);
    write_outputs(&args.output, &run)?;
    println!("Results written to {}", args.output.display());

    Ok(())
}

fn handle_betas(args: BetasArgs) -> anyhow::Result<()> {
    let config = load_config_from(&args.config)?;
    config.validate()?;

    let prices = prepare_prices(&config, args.prices.as_deref())?;
    let betas = estimate_market_betas(&config, &prices)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Ticker", "Sleeve", "Beta"]);
    for ticker in &config.portfolio.tickers_long {
        table.add_row(vec![ticker.clone(), "long".into(), beta_cell(&betas, ticker)]);
    }
    for ticker in &config.portfolio.tickers_short {
        table.add_row(vec![ticker.clone(), "short".into(), beta_cell(&betas, ticker)]);
    }
    println!("{table}");

    Ok(())
}

fn beta_cell(betas: &BetaMap, ticker: &str) -> String {
    match betas.get(ticker) {
        Some(beta) => beta.round_dp(4).to_string(),
        None => "n/a".to_string(),
    }
}

// ==============================================================================
// Input Preparation
// ==============================================================================

/// Loads (or fabricates), repairs, clamps, and validates the price table.
fn prepare_prices(config: &Config, path: Option<&Path>) -> anyhow::Result<PriceTable> {
    let table = match path {
        Some(path) => fill_missing(&load_price_table(path)?),
        None => synthetic_prices(config),
    };

    let start = config.simulation.start_date;
    let end = config.simulation.end_date;
    let clamped: PriceTable = table
        .rows()
        .filter(|(date, _)| **date >= start && **date <= end)
        .map(|(date, row)| (*date, row.clone()))
        .collect();

    let mut required = config.held_tickers();
    required.push(config.portfolio.market_index.clone());
    validate_price_table(&clamped, &required, config.simulation.min_trading_days)?;

    Ok(clamped)
}

fn estimate_market_betas(config: &Config, prices: &PriceTable) -> anyhow::Result<BetaMap> {
    let returns = daily_returns(prices)?;
    let betas = estimate_betas(&returns, &config.portfolio.market_index)?;
    Ok(betas)
}

fn prepare_rates(
    config: &Config,
    prices: &PriceTable,
    path: Option<&Path>,
) -> anyhow::Result<ExchangeRateSeries> {
    let dates: Vec<NaiveDate> = prices.dates().copied().collect();
    let rates = match path {
        Some(path) => forward_fill_rates(&load_rate_series(path)?, &dates)?,
        None => constant_rates(dates, config.simulation.exchange_rate),
    };
    Ok(rates)
}

/// Fabricates a deterministic market from the configured universe: long
/// tickers drift up, short tickers drift down, and every series loads on the
/// shared market wave so its estimated beta is its configured sensitivity.
fn synthetic_prices(config: &Config) -> PriceTable {
    let mut series = Vec::new();
    for (i, ticker) in config.portfolio.tickers_long.iter().enumerate() {
        let offset = Decimal::from(i as u32);
        series.push(SyntheticSeries::new(
            ticker,
            dec!(100) + offset * dec!(40),
            dec!(0.0006) + offset * dec!(0.0001),
            dec!(1.1) + offset * dec!(0.05),
        ));
    }
    for (i, ticker) in config.portfolio.tickers_short.iter().enumerate() {
        let offset = Decimal::from(i as u32);
        series.push(SyntheticSeries::new(
            ticker,
            dec!(120) + offset * dec!(35),
            dec!(-0.0004) - offset * dec!(0.0001),
            dec!(1.3) + offset * dec!(0.05),
        ));
    }
    series.push(SyntheticSeries::new(
        &config.portfolio.market_index,
        dec!(5000),
        Decimal::ZERO,
        Decimal::ONE,
    ));

    let days = business_day_count(config.simulation.start_date, config.simulation.end_date);
    trending_prices(&series, config.simulation.start_date, days)
}

fn business_day_count(start: NaiveDate, end: NaiveDate) -> usize {
    let mut count = 0;
    let mut date = start;
    while date <= end {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            count += 1;
        }
        date = date + Days::new(1);
    }
    count
}

// ==============================================================================
// Output
// ==============================================================================

/// Streams the simulation loop onto a console progress bar.
struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    fn new() -> anyhow::Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
                .progress_chars("#>-"),
        );
        Ok(Self { bar })
    }
}

impl SimulationObserver for ProgressObserver {
    fn simulation_started(&self, total_days: usize) {
        self.bar.set_length(total_days as u64);
    }

    fn day_completed(&self, result: &DailyResult) {
        self.bar.set_message(result.date.to_string());
        self.bar.inc(1);
    }

    fn simulation_completed(&self) {
        self.bar.finish_with_message("Simulation complete!");
    }
}

fn print_report(report: &PerformanceReport, run: &SimulationRun) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Run ID".to_string(), run.run_id.to_string()]);
    table.add_row(vec![
        "Period".to_string(),
        format!("{} to {}", report.period_start, report.period_end),
    ]);
    table.add_row(vec!["Trading Days".to_string(), report.trading_days.to_string()]);
    table.add_row(vec![
        "Total Return %".to_string(),
        report.total_return_pct.round_dp(4).to_string(),
    ]);
    table.add_row(vec![
        "Annualized Return %".to_string(),
        report.annualized_return_pct.round_dp(4).to_string(),
    ]);
    table.add_row(vec![
        "Annualized Volatility %".to_string(),
        report.annualized_volatility_pct.round_dp(4).to_string(),
    ]);
    table.add_row(vec![
        "Sharpe Ratio".to_string(),
        report
            .sharpe_ratio
            .map(|s| s.round_dp(4).to_string())
            .unwrap_or_else(|| "n/a".to_string()),
    ]);
    table.add_row(vec![
        "Max Drawdown %".to_string(),
        report.max_drawdown_pct.round_dp(4).to_string(),
    ]);
    table.add_row(vec![
        "Average Beta".to_string(),
        report.average_beta.round_dp(4).to_string(),
    ]);
    table.add_row(vec![
        "Max |Beta|".to_string(),
        report.max_abs_beta.round_dp(4).to_string(),
    ]);
    table.add_row(vec![
        "Management Fees".to_string(),
        report.total_management_fees.round_dp(2).to_string(),
    ]);
    table.add_row(vec![
        "Transaction Costs".to_string(),
        report.total_transaction_costs.round_dp(2).to_string(),
    ]);
    table.add_row(vec!["Rebalances".to_string(), report.rebalance_count.to_string()]);
    table.add_row(vec![
        "Shares Traded".to_string(),
        report.total_shares_traded.round_dp(0).to_string(),
    ]);
    table.add_row(vec![
        "Final Value (USD)".to_string(),
        report.final_value_usd.round_dp(2).to_string(),
    ]);
    table.add_row(vec![
        "Final Value (CAD)".to_string(),
        report.final_value_cad.round_dp(2).to_string(),
    ]);
    println!("{table}");
}

fn write_outputs(output: &Path, run: &SimulationRun) -> anyhow::Result<()> {
    std::fs::create_dir_all(output)?;

    let mut daily = csv::Writer::from_path(output.join("daily_results.csv"))?;
    for result in &run.results {
        daily.serialize(result)?;
    }
    daily.flush()?;

    let mut trades = csv::Writer::from_path(output.join("transactions.csv"))?;
    for trade in &run.transactions {
        trades.serialize(trade)?;
    }
    trades.flush()?;

    Ok(())
}
