//! fibsizer command line: size trades from explicit levels, OCR text or screenshots.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use fibsizer::capture::{CaptureOutcome, CaptureRegion, CaptureSession, FileCapture, TesseractOcr};
use fibsizer::fib::{is_inverted, parse_fib_levels, resolve_levels};
use fibsizer::models::{Direction, FibPriceMap, FibRatio, PriceLevels, TradePlan};
use fibsizer::trading::{AccountConfig, Calculator, FeeKind};

/// Position sizing CLI.
#[derive(Parser)]
#[command(name = "fibsizer")]
#[command(about = "Risk-bounded position sizing from Fibonacci chart levels", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FIBSIZER_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Account overrides, each also settable through its FIBSIZER_* variable.
#[derive(Args, Debug, Default)]
struct AccountArgs {
    /// Account capital in quote currency
    #[arg(long, env = "FIBSIZER_CAPITAL")]
    capital: Option<Decimal>,

    /// Percentage of capital to risk
    #[arg(long = "risk", env = "FIBSIZER_RISK_PERCENT")]
    risk_percent: Option<Decimal>,

    /// Leverage multiplier
    #[arg(long, env = "FIBSIZER_LEVERAGE")]
    leverage: Option<Decimal>,

    /// Maker fee in percent (0.02 = 0.02%)
    #[arg(long, env = "FIBSIZER_MAKER_FEE")]
    maker_fee: Option<Decimal>,

    /// Taker fee in percent
    #[arg(long, env = "FIBSIZER_TAKER_FEE")]
    taker_fee: Option<Decimal>,

    /// Fee type on entry (maker or taker)
    #[arg(long, env = "FIBSIZER_ENTRY_FEE")]
    entry_fee: Option<FeeKind>,

    /// Fee type on exit (maker or taker)
    #[arg(long, env = "FIBSIZER_EXIT_FEE")]
    exit_fee: Option<FeeKind>,
}

impl AccountArgs {
    fn resolve(&self) -> Result<AccountConfig> {
        let mut config = AccountConfig::from_env()?;

        if let Some(v) = self.capital {
            config.capital = v;
        }
        if let Some(v) = self.risk_percent {
            config.risk_percent = v;
        }
        if let Some(v) = self.leverage {
            config.leverage = v;
        }
        if let Some(v) = self.maker_fee {
            config.maker_fee = v;
        }
        if let Some(v) = self.taker_fee {
            config.taker_fee = v;
        }
        if let Some(v) = self.entry_fee {
            config.entry_fee_kind = v;
        }
        if let Some(v) = self.exit_fee {
            config.exit_fee_kind = v;
        }

        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Size a trade from explicit levels
    Calc {
        /// Entry price
        #[arg(short, long)]
        entry: Decimal,

        /// Take-profit price
        #[arg(short, long)]
        target: Decimal,

        /// Stop-loss price
        #[arg(short, long)]
        stop: Decimal,

        /// Short instead of long
        #[arg(long)]
        short: bool,

        #[command(flatten)]
        account: AccountArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Extract Fibonacci levels from OCR text (file or stdin)
    Parse {
        /// Text file to read; "-" or omitted reads stdin
        input: Option<PathBuf>,

        /// Resolve levels for a short instead of a long
        #[arg(long)]
        short: bool,

        /// Also size the trade on the resolved levels
        #[arg(long)]
        calc: bool,

        #[command(flatten)]
        account: AccountArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Run OCR on a chart screenshot and extract Fibonacci levels
    Capture {
        /// Screenshot file (PNG or JPEG)
        #[arg(short, long)]
        image: PathBuf,

        /// Region to scan as x,y,width,height
        #[arg(short, long)]
        region: Option<CaptureRegion>,

        /// Path to the tesseract executable
        #[arg(long, env = "FIBSIZER_TESSERACT", default_value = "tesseract")]
        tesseract: PathBuf,

        /// OCR language
        #[arg(long, default_value = "eng")]
        lang: String,

        /// Resolve levels for a short instead of a long
        #[arg(long)]
        short: bool,

        /// Also size the trade on the resolved levels
        #[arg(long)]
        calc: bool,

        #[command(flatten)]
        account: AccountArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the effective account configuration
    Config {
        #[command(flatten)]
        account: AccountArgs,
    },
}

/// Machine-readable result of a parse or capture run.
#[derive(Serialize)]
struct LevelsReport {
    direction: Direction,
    fib_prices: FibPriceMap,
    inverted: bool,
    levels: PriceLevels,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<TradePlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Calc {
            entry,
            target,
            stop,
            short,
            account,
            json,
        } => {
            let mut calc = Calculator::new(account.resolve()?);
            calc.set_direction(direction_for(short));
            calc.set_levels(PriceLevels::new(entry, target, stop));

            let plan = calc.calculate()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_levels(calc.levels());
                println!("{}", plan);
            }
        }

        Commands::Parse {
            input,
            short,
            calc,
            account,
            json,
        } => {
            let text = read_input(input.as_deref()).await?;
            let prices = parse_fib_levels(&text);
            info!(found = prices.len(), "Parsed OCR text");

            report_levels(prices, direction_for(short), calc, &account, json)?;
        }

        Commands::Capture {
            image,
            region,
            tesseract,
            lang,
            short,
            calc,
            account,
            json,
        } => {
            let session = CaptureSession::new(
                Arc::new(FileCapture::new(image)),
                Arc::new(TesseractOcr::new(tesseract).with_language(lang)),
            );
            session.set_scan_region(region).await;

            let outcome = session.capture_and_extract().await;
            let status = session.status().await;

            match outcome {
                CaptureOutcome::Succeeded(_) => {
                    if let Some(at) = session.last_success_at().await {
                        info!(at = %at, "Capture complete");
                    }
                    if !json {
                        println!("{}", status);
                    }
                    report_levels(session.fib_prices().await, direction_for(short), calc, &account, json)?;
                }
                _ => {
                    // Capture problems are reported, not treated as process failures
                    if json {
                        println!("{}", serde_json::json!({ "status": status.to_string() }));
                    } else {
                        println!("{}", status);
                    }
                }
            }
        }

        Commands::Config { account } => {
            let config = account.resolve()?;

            println!("\n=== Account Configuration ===\n");
            println!("  Capital:          ${}", config.capital);
            println!("  Risk:             {}% (${})", config.risk_percent, config.risk_amount());
            println!("  Leverage:         {}x", config.leverage);
            println!("  Maker Fee:        {}%", config.maker_fee);
            println!("  Taker Fee:        {}%", config.taker_fee);
            println!("  Entry Fee Type:   {}", config.entry_fee_kind.as_str());
            println!("  Exit Fee Type:    {}", config.exit_fee_kind.as_str());
            println!("  Round-trip Fees:  {}%", config.total_fee_rate() * dec!(100));
        }
    }

    Ok(())
}

fn direction_for(short: bool) -> Direction {
    if short {
        Direction::Short
    } else {
        Direction::Long
    }
}

async fn read_input(path: Option<&std::path::Path>) -> Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => tokio::fs::read_to_string(p)
            .await
            .with_context(|| format!("Failed to read {}", p.display())),
        _ => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Print (or serialize) the recognized prices, the resolved levels and optionally the plan.
fn report_levels(
    prices: FibPriceMap,
    direction: Direction,
    size_trade: bool,
    account: &AccountArgs,
    json: bool,
) -> Result<()> {
    let levels = resolve_levels(&prices, direction);
    let inverted = is_inverted(&prices);

    let (plan, error) = if size_trade {
        if !levels.is_complete() {
            warn!(levels = ?levels, "Some levels were not recognized");
        }
        let mut calc = Calculator::new(account.resolve()?);
        calc.set_direction(direction);
        calc.set_levels(levels);
        match calc.calculate() {
            Ok(plan) => (Some(plan), None),
            Err(e) => (None, Some(e.to_string())),
        }
    } else {
        (None, None)
    };

    if json {
        let report = LevelsReport {
            direction,
            fib_prices: prices,
            inverted,
            levels,
            plan,
            error,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n{:>6} {:>14}", "RATIO", "PRICE");
    println!("{}", "-".repeat(21));
    for ratio in FibRatio::ALL {
        match prices.get(ratio) {
            Some(price) => println!("{:>6} {:>14}", ratio.label(), price),
            None => println!("{:>6} {:>14}", ratio.label(), "-"),
        }
    }
    println!("\n{} found ({} layout)", prices.len(), if inverted { "inverted" } else { "normal" });

    println!("\n--- {} Levels ---", direction);
    print_levels(levels);

    if let Some(plan) = plan {
        println!("{}", plan);
    }
    if let Some(error) = error {
        println!("\nCannot size trade: {}", error);
    }

    Ok(())
}

fn print_levels(levels: PriceLevels) {
    println!("Entry:   {}", format_level(levels.entry));
    println!("Target:  {}", format_level(levels.target));
    println!("Stop:    {}", format_level(levels.stop));
}

fn format_level(price: Decimal) -> String {
    if price.is_zero() {
        "-".to_string()
    } else {
        price.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_account_flags_read_environment() {
        let cli = Cli::command();
        let calc = cli.find_subcommand("calc").unwrap();
        let env_of = |id: &str| {
            calc.get_arguments()
                .find(|arg| arg.get_id().as_str() == id)
                .and_then(|arg| arg.get_env())
                .map(|env| env.to_string_lossy().into_owned())
        };

        assert_eq!(env_of("capital").as_deref(), Some("FIBSIZER_CAPITAL"));
        assert_eq!(env_of("risk_percent").as_deref(), Some("FIBSIZER_RISK_PERCENT"));
        assert_eq!(env_of("leverage").as_deref(), Some("FIBSIZER_LEVERAGE"));
        assert_eq!(env_of("maker_fee").as_deref(), Some("FIBSIZER_MAKER_FEE"));
        assert_eq!(env_of("taker_fee").as_deref(), Some("FIBSIZER_TAKER_FEE"));
        assert_eq!(env_of("entry_fee").as_deref(), Some("FIBSIZER_ENTRY_FEE"));
        assert_eq!(env_of("exit_fee").as_deref(), Some("FIBSIZER_EXIT_FEE"));
    }

    #[test]
    fn test_capture_region_flag() {
        let cli = Cli::try_parse_from(["fibsizer", "capture", "--image", "chart.png", "--region", "0,0,10,10"]).unwrap();

        match cli.command {
            Commands::Capture { region, .. } => assert_eq!(
                region,
                Some(CaptureRegion { x: 0, y: 0, width: 10, height: 10 })
            ),
            _ => panic!("expected capture"),
        }
    }
}
