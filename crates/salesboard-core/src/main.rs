//! CLI entry point for the sales dashboard engine.

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use clap::Parser;
use polars::prelude::*;
use salesboard_core::{
    DashboardConfig, FilterSet, SummaryMetrics, charts, format_count, format_inr, geo,
    loader::{self, LoadedReport},
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Marketplace sales dashboard, terminal edition",
    long_about = "Loads a marketplace order-export CSV, applies the sidebar filters\n\
                  as flags, and prints the metric panel and chart tables.\n\n\
                  EXAMPLES:\n  \
                  # Everything, default report file\n  \
                  salesboard\n\n  \
                  # One category over a date window\n  \
                  salesboard -i 'Amazon Sale Report.csv' --category Kurta --from 2022-04-01 --to 2022-04-30\n\n  \
                  # Machine-readable output\n  \
                  salesboard --json | jq .metrics.total_revenue"
)]
struct Args {
    /// Path to the sale report CSV
    #[arg(short, long, default_value = salesboard_core::config::DEFAULT_REPORT_PATH)]
    input: String,

    /// Start of the date range (inclusive, YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// End of the date range (inclusive, YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Keep only these categories (repeatable; omit for all)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Keep only these order statuses (repeatable; omit for all)
    #[arg(long = "status")]
    statuses: Vec<String>,

    /// Keep only these fulfilment channels (repeatable; omit for all)
    #[arg(long = "fulfilment")]
    fulfilments: Vec<String>,

    /// Rows shown in the raw-data preview (0 disables the preview)
    #[arg(long, default_value = "10")]
    preview: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and the result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of the human-readable panel
    ///
    /// Disables all logs; only the final JSON document is written.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let config = DashboardConfig::builder().csv_path(&args.input).build()?;

    let report = loader::load_report_with(&config.csv_path, config.infer_schema_length)
        .map_err(|e| anyhow!("{e}"))?;

    let filter = FilterSet {
        start_date: args.from,
        end_date: args.to,
        categories: args.categories.clone(),
        statuses: args.statuses.clone(),
        fulfilments: args.fulfilments.clone(),
    };
    let filtered = filter.apply(&report).map_err(|e| anyhow!("{e}"))?;
    info!(
        "Filters kept {} of {} rows",
        filtered.height(),
        report.df.height()
    );

    let metrics = SummaryMetrics::compute(&filtered, &report.bindings)?;
    let categories = charts::revenue_by_category(&filtered, &report.bindings, config.top_categories)?;
    let daily = charts::daily_revenue(&filtered, &report.bindings)?;
    let products = charts::top_products(&filtered, &report.bindings, config.top_products)?;
    let cities = charts::city_revenue(&filtered, &report.bindings, config.top_cities)?
        .map(geo::map_city_revenue);

    if args.json {
        let payload = serde_json::json!({
            "report": &report.info,
            "bindings": &report.bindings,
            "metrics": &metrics,
            "revenue_by_category": &categories,
            "daily_revenue": &daily,
            "top_products": &products,
            "city_map": &cities,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    print_dashboard(&report, &filtered, &metrics, &args, categories, daily, products, cities);
    Ok(())
}

/// Human-readable dashboard panel. Uses `println!` intentionally: this is
/// the program's output, not logging.
#[allow(clippy::too_many_arguments)]
fn print_dashboard(
    report: &LoadedReport,
    filtered: &DataFrame,
    metrics: &SummaryMetrics,
    args: &Args,
    categories: Option<Vec<charts::RevenueSlice>>,
    daily: Option<Vec<charts::DailyRevenuePoint>>,
    products: Option<charts::ProductChart>,
    cities: Option<geo::CityRevenueMap>,
) {
    println!("{}", "=".repeat(72));
    println!("AMAZON SALE REPORT DASHBOARD");
    println!("{}", "=".repeat(72));
    println!(
        "Source: {} ({} rows x {} columns, {} duplicates removed)",
        report.info.name,
        report.info.row_count,
        report.info.column_count,
        report.info.duplicates_removed
    );
    println!();

    println!("KEY METRICS");
    println!("{}", "-".repeat(40));
    println!("  Total Orders     {}", format_count(metrics.total_orders));
    println!("  Total Revenue    {}", format_inr(metrics.total_revenue));
    println!(
        "  Avg Order Value  {}",
        metrics
            .avg_order_value
            .map(format_inr)
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "  Total Units      {}",
        metrics
            .total_units
            .map(|units| format_count(units.round() as usize))
            .unwrap_or_else(|| "-".to_string())
    );
    println!();

    print_slice_table("REVENUE BY CATEGORY", categories.as_deref());
    if let Some(points) = &daily {
        println!("DAILY REVENUE");
        println!("{}", "-".repeat(40));
        if points.is_empty() {
            println!("  (no data)");
        }
        for point in points {
            println!("  {:<12} {:>14}", point.date, format_inr(point.revenue));
        }
        println!();
    } else {
        print_section_skipped("DAILY REVENUE");
    }

    match &products {
        Some(chart) => {
            print_slice_table(
                &format!("TOP PRODUCTS ({})", chart.column),
                Some(chart.slices.as_slice()),
            );
        }
        None => print_section_skipped("TOP PRODUCTS"),
    }

    match &cities {
        Some(map) => {
            println!("CITY REVENUE MAP");
            println!("{}", "-".repeat(40));
            if map.points.is_empty() && map.unmapped.is_empty() {
                println!("  (no data)");
            }
            for point in &map.points {
                println!(
                    "  {:<20} {:>8.4} {:>9.4} {:>14}",
                    point.city,
                    point.lat,
                    point.lon,
                    format_inr(point.revenue)
                );
            }
            if !map.unmapped.is_empty() {
                println!("  Unmapped cities:");
                for slice in &map.unmapped {
                    println!("    {:<20} {:>14}", slice.label, format_inr(slice.revenue));
                }
            }
            println!();
        }
        None => print_section_skipped("CITY REVENUE MAP"),
    }

    if args.preview > 0 {
        println!("RAW DATA PREVIEW (first {} rows)", args.preview);
        println!("{}", "-".repeat(40));
        println!("{}", filtered.head(Some(args.preview)));
    }
    println!("{}", "=".repeat(72));
}

fn print_slice_table(title: &str, slices: Option<&[charts::RevenueSlice]>) {
    println!("{title}");
    println!("{}", "-".repeat(40));
    match slices {
        Some([]) => println!("  (no data)"),
        Some(slices) => {
            for slice in slices {
                println!("  {:<24} {:>14}", slice.label, format_inr(slice.revenue));
            }
        }
        None => println!("  (column not found, section skipped)"),
    }
    println!();
}

fn print_section_skipped(title: &str) {
    println!("{title}");
    println!("{}", "-".repeat(40));
    println!("  (column not found, section skipped)");
    println!();
}
