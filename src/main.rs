use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use stratsim::api::{CoinGeckoClient, OfflinePriceLookup, PriceLookup};
use stratsim::library::StrategyLibrary;
use stratsim::report::{self, ReportFormat, ReportOptions};
use stratsim::{BacktestRunner, Settings, SimulationParameters};

#[derive(Parser)]
#[command(
    name = "stratsim",
    about = "Seeded trading-strategy backtest simulator",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a simulated backtest and render a report
    Run(RunArgs),
    /// Manage the strategy library
    Strategies {
        #[command(subcommand)]
        action: StrategyAction,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Path to the strategy script file
    #[arg(long, conflicts_with_all = ["script_text", "strategy"])]
    script: Option<PathBuf>,
    /// Strategy script passed directly
    #[arg(long, conflicts_with = "strategy")]
    script_text: Option<String>,
    /// Name or id of a strategy stored in the library
    #[arg(long)]
    strategy: Option<String>,
    /// JSON file with simulation parameters; script flags still apply
    #[arg(long)]
    params: Option<PathBuf>,
    #[arg(long, default_value = "BTCUSD")]
    symbol: String,
    #[arg(long, default_value = "1D")]
    timeframe: String,
    #[arg(long, default_value = "2020-01-01")]
    start_date: String,
    /// End date; empty means today
    #[arg(long, default_value = "")]
    end_date: String,
    #[arg(long, default_value_t = 10000.0)]
    initial_capital: f64,
    #[arg(long, default_value_t = 100.0)]
    position_size: f64,
    #[arg(long, default_value_t = 0.1)]
    commission: f64,
    /// Report format: html, json or csv
    #[arg(long, default_value = "json")]
    format: String,
    /// Write the report to this path instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
    /// Skip the external price lookup and use the synthetic range
    #[arg(long)]
    offline: bool,
    /// Leave chart data out of the report
    #[arg(long)]
    no_charts: bool,
    /// Leave the trade list out of the report
    #[arg(long)]
    no_trades: bool,
}

#[derive(Subcommand)]
enum StrategyAction {
    /// List stored strategies
    List,
    /// Print one strategy as JSON
    Show { id: String },
    /// Add a strategy from a script file
    Add {
        name: String,
        script: PathBuf,
        #[arg(long)]
        tags: Vec<String>,
    },
    /// Remove a strategy by id or name
    Delete { id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();

    match run_command(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Structured failure envelope; no partial results
            let envelope = serde_json::json!({
                "status": "error",
                "message": e.to_string(),
                "backtest_results": {},
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| e.to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("stratsim=info")),
        )
        .init();
}

async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run(args) => run_backtest(args).await,
        Command::Strategies { action } => manage_library(action),
    }
}

fn build_params(args: &RunArgs) -> anyhow::Result<SimulationParameters> {
    let mut params = match &args.params {
        Some(path) => SimulationParameters::from_file(path)?,
        None => SimulationParameters {
            symbol: args.symbol.clone(),
            timeframe: args.timeframe.clone(),
            start_date: args.start_date.clone(),
            end_date: args.end_date.clone(),
            initial_capital: args.initial_capital,
            position_size: args.position_size,
            commission_percent: args.commission,
            script: String::new(),
        },
    };

    if let Some(name) = &args.strategy {
        let record = StrategyLibrary::open_default()
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("strategy '{}' not found in the library", name))?;
        params.script = record.script;
    } else if let Some(path) = &args.script {
        params.script = std::fs::read_to_string(path)?;
    } else if let Some(text) = &args.script_text {
        params.script = text.clone();
    }

    Ok(params)
}

async fn run_backtest(args: RunArgs) -> anyhow::Result<()> {
    let settings = Settings::load()?;
    let params = build_params(&args)?;
    let format: ReportFormat = args
        .format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let price_lookup: Arc<dyn PriceLookup> = if args.offline {
        Arc::new(OfflinePriceLookup)
    } else {
        Arc::new(CoinGeckoClient::from_settings(&settings))
    };

    let runner = BacktestRunner::new(settings, price_lookup);
    let result = runner.run(&params).await?;

    tracing::info!(
        "Executed '{}' in simulation mode for {} on {} timeframe",
        result.strategy_name,
        result.symbol,
        result.timeframe
    );

    let options = ReportOptions {
        include_charts: !args.no_charts,
        include_trades: !args.no_trades,
    };

    match &args.output {
        Some(path) => report::write_report(&result, format, &options, path)?,
        None => println!("{}", report::render(&result, format, &options)?),
    }

    Ok(())
}

fn manage_library(action: StrategyAction) -> anyhow::Result<()> {
    let library = StrategyLibrary::open_default();

    match action {
        StrategyAction::List => {
            let records = library.list();
            if records.is_empty() {
                println!("No strategies stored.");
            }
            for record in records {
                println!("{}  {}  [{}]", record.id, record.name, record.tags.join(", "));
            }
        }
        StrategyAction::Show { id } => match library.get(&id) {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => anyhow::bail!("strategy '{}' not found", id),
        },
        StrategyAction::Add { name, script, tags } => {
            let text = std::fs::read_to_string(&script)?;
            let record = library.add(&name, &text, serde_json::json!({}), tags)?;
            println!("Added '{}' with id {}", record.name, record.id);
        }
        StrategyAction::Delete { id } => {
            library.delete(&id)?;
            println!("Deleted '{}'", id);
        }
    }

    Ok(())
}
