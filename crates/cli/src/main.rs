mod config;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use supertrend_core::{BandSide, Num, PriceSeries, Trend};
use supertrend_indicators::{SuperTrend, SuperTrendConfig};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::FileConfig;

#[derive(Parser)]
#[command(name = "supertrend")]
#[command(about = "Compute the SuperTrend indicator over OHLC price data")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SuperTrend at the last bar
    Latest {
        #[command(flatten)]
        args: IndicatorArgs,
    },

    /// Print the SuperTrend at every bar
    Series {
        #[command(flatten)]
        args: IndicatorArgs,

        /// Emit a JSON array instead of tab-separated lines
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct IndicatorArgs {
    /// Path to CSV data file
    #[arg(short, long)]
    data: PathBuf,

    /// TOML file with a [supertrend] table
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// ATR lookback length
    #[arg(short, long, env = "SUPERTREND_PERIOD")]
    period: Option<usize>,

    /// ATR multiplier for the band width
    #[arg(short, long, env = "SUPERTREND_MULTIPLIER")]
    multiplier: Option<Decimal>,

    /// Arithmetic used for the computation
    #[arg(long, value_enum, default_value_t = Precision::Decimal)]
    precision: Precision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Precision {
    /// Exact decimal arithmetic
    Decimal,
    /// 64-bit floating point
    Float,
}

#[derive(Serialize)]
struct SeriesRow<N> {
    index: usize,
    timestamp: Option<DateTime<Utc>>,
    trend: Trend,
    value: N,
    upper: N,
    lower: N,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Latest { args } => {
            let (series, config) = prepare(&args)?;
            match args.precision {
                Precision::Decimal => print_latest(&series, config.period, config.multiplier)?,
                Precision::Float => print_latest(
                    &series.to_f64(),
                    config.period,
                    Num::to_f64(config.multiplier),
                )?,
            }
        }
        Commands::Series { args, json } => {
            let (series, config) = prepare(&args)?;
            match args.precision {
                Precision::Decimal => {
                    print_series(&series, config.period, config.multiplier, json)?
                }
                Precision::Float => print_series(
                    &series.to_f64(),
                    config.period,
                    Num::to_f64(config.multiplier),
                    json,
                )?,
            }
        }
    }

    Ok(())
}

fn prepare(args: &IndicatorArgs) -> Result<(PriceSeries<Decimal>, SuperTrendConfig)> {
    let file = args.config.as_deref().map(FileConfig::load).transpose()?;
    let config = config::resolve(file, args.period, args.multiplier);
    tracing::info!(
        data = %args.data.display(),
        period = config.period,
        multiplier = %config.multiplier,
        precision = ?args.precision,
        "Computing SuperTrend"
    );
    let series = supertrend_data::load_series(&args.data)?;
    Ok((series, config))
}

fn print_latest<N: Num>(series: &PriceSeries<N>, period: usize, multiplier: N) -> Result<()> {
    let mut st = SuperTrend::new(series, period, multiplier)?;
    println!("{}", st.report()?);
    Ok(())
}

fn print_series<N: Num + Serialize>(
    series: &PriceSeries<N>,
    period: usize,
    multiplier: N,
    json: bool,
) -> Result<()> {
    let mut st = SuperTrend::new(series, period, multiplier)?;
    let points = st.points()?;

    let mut rows = Vec::with_capacity(points.len());
    for (index, point) in points.into_iter().enumerate() {
        rows.push(SeriesRow {
            index,
            timestamp: st.series().timestamp(index),
            trend: point.trend,
            value: point.value,
            upper: st.final_band(index, BandSide::Upper)?.current,
            lower: st.final_band(index, BandSide::Lower)?.current,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("index\ttimestamp\ttrend\tvalue\tupper\tlower");
    for row in &rows {
        let timestamp = row
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            row.index, timestamp, row.trend, row.value, row.upper, row.lower
        );
    }
    Ok(())
}
