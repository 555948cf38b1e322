use anyhow::Context;
use position_planner::{Config, OutputFormat, PlanReport, PlanRequest, PositionLedger};
use std::io::{self, Read};

fn main() {
    // Initialize tracing; stdout carries the report, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> anyhow::Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read plan request from stdin")?;
    let request: PlanRequest =
        serde_json::from_str(&input).context("failed to parse plan request")?;

    let mut ledger = PositionLedger::new();
    ledger.reserve_trade_ids(config.seed_ids.iter().copied());
    let report = PlanReport::build(&request, config, &mut ledger)
        .with_context(|| format!("failed to plan {}", request.symbol))?;

    let stdout = io::stdout().lock();
    match config.output_format {
        OutputFormat::Json => report.write_json(stdout),
        OutputFormat::Csv => report.write_csv(stdout),
    }
    .context("failed to write report")?;

    tracing::info!(trade = %report.trade_id, "Report written");
    Ok(())
}
