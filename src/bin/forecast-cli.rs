use std::fs;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use chrono::Duration;
use clap::Parser;
use colored::Colorize;
use dotenvy::dotenv;

use expense_forecaster::cli_utils::{
    format_amount, format_json, format_record, format_table, formatting::print_header,
    formatting::print_section, print_error, print_info, print_success, print_warning,
};
use expense_forecaster::forecasting::config::ForecastArgs;
use expense_forecaster::forecasting::processor_enums::{
    ForecastProcessorInput, ForecastProcessorOutput, ForecastReport,
};
use expense_forecaster::ingestion::{collect_records, operations::normalize, types::ExpensePayload};
use expense_forecaster::utils::app_config::{AppConfig, StoreArgs, UpstreamArgs};
use expense_forecaster::utils::traits::ActionProcessor;

#[derive(Parser, Debug)]
#[command(
    name = "forecast-cli",
    about = "Offline expense forecasting",
    long_about = "Merges a JSON file of expenses into the local history, refreshes the model and prints the forecast"
)]
struct CliArgs {
    /// JSON payload: {"expenses": [...]}, a list of {"date", "amount"} records, or {"token": ...}
    #[arg(long)]
    input: Option<PathBuf>,

    /// Print the persisted history instead of forecasting
    #[arg(long)]
    history: bool,

    /// Emit JSON instead of tables
    #[arg(long)]
    json: bool,

    #[clap(flatten)]
    store: StoreArgs,

    #[clap(flatten)]
    forecast: ForecastArgs,

    #[clap(flatten)]
    upstream: UpstreamArgs,
}

#[tokio::main]
async fn main() {
    let _ = dotenv();
    let args = CliArgs::parse();

    if let Err(e) = run(args).await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(args: CliArgs) -> Result<()> {
    let app_config = AppConfig::from_args(&args.store, &args.forecast, &args.upstream)?;

    if args.history {
        let output = ForecastProcessorInput::History
            .process(&app_config, &app_config.forecast)
            .await?;
        if let ForecastProcessorOutput::History(series) = output {
            if args.json {
                println!("{}", format_json(&series.points()));
            } else {
                print_header("Expense history");
                let rows = series
                    .iter()
                    .map(|(d, v)| vec![d.to_string(), format_amount(*v)])
                    .collect::<Vec<_>>();
                format_table(&["Date", "Expense"], &rows);
            }
        }
        return Ok(());
    }

    let input = args
        .input
        .ok_or_else(|| anyhow!("--input is required unless --history is given"))?;
    let raw = fs::read_to_string(&input)
        .map_err(|e| anyhow!("Failed to read {}: {}", input.display(), e))?;
    let payload: ExpensePayload =
        serde_json::from_str(&raw).map_err(|e| anyhow!("Unrecognised payload: {}", e))?;

    let records = collect_records(payload, app_config.upstream.as_ref()).await?;
    let summary = normalize(&records)?;
    print_info(&format!(
        "{} rows accepted, {} dropped, {} distinct days",
        summary.accepted,
        summary.dropped,
        summary.series.len()
    ));
    if summary.dropped > 0 {
        print_warning("Some rows had an unparsable date or amount and were skipped");
    }

    let output = ForecastProcessorInput::Refresh(summary.series)
        .process(&app_config, &app_config.forecast)
        .await?;
    let ForecastProcessorOutput::Refresh(report) = output else {
        return Err(anyhow!("Unexpected response type"));
    };

    if args.json {
        println!("{}", format_json(&report));
    } else {
        print_report(&report);
    }
    print_success(if report.retrained {
        "Model retrained and saved"
    } else {
        "Forecast served from the saved model"
    });

    Ok(())
}

fn print_report(report: &ForecastReport) {
    print_header("Expense forecast");
    format_record(vec![
        ("Trained through", report.trained_through.to_string()),
        ("Observations", report.observations.to_string()),
        ("Next day", format_amount(report.next_day[0])),
        ("Next week total", format_amount(report.next_week_total())),
        ("Next month total", format_amount(report.next_month_total()).bold().to_string()),
    ]);

    print_section("Next 7 days");
    let rows = report
        .next_week
        .iter()
        .enumerate()
        .map(|(h, v)| {
            let date = report.trained_through + Duration::days(h as i64 + 1);
            vec![date.to_string(), format_amount(*v)]
        })
        .collect::<Vec<_>>();
    format_table(&["Date", "Forecast"], &rows);
}
