//! # birr-fx - Command-line currency converter
//!
//! ## Usage
//! ```bash
//! # 100 Birr in US dollars
//! birr-fx convert 100 ETB USD
//!
//! # Same pair, reversed
//! birr-fx convert 100 ETB USD --swap
//!
//! # Show the rate board
//! birr-fx rates
//!
//! # Use a custom table and print JSON
//! birr-fx --rates rates.json --json convert 25 EUR GBP
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::{debug, info};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, reload};

use birr_fx::config::CONFIG_ENV_VAR;
use birr_fx::pricing::JsonFileRateProvider;
use birr_fx::prelude::*;

mod config_loader;

use config_loader::CliConfig;

/// Currency converter using a fixed base-currency rate table
#[derive(Parser, Debug)]
#[command(name = "birr-fx")]
#[command(version)]
#[command(about = "Convert amounts between currencies of a fixed rate table", long_about = None)]
struct Args {
    /// Enable debug logging to stderr
    #[arg(long, default_value = "false")]
    log: bool,

    /// Output results as JSON
    #[arg(long, default_value = "false")]
    json: bool,

    /// JSON file with an FxConfig object or a rate table array
    #[arg(long)]
    rates: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert an amount from one currency to another
    Convert {
        /// Amount to convert; anything that is not a non-negative number counts as 0
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Source currency code (defaults to the configured source)
        from: Option<String>,
        /// Target currency code (defaults to the configured target)
        to: Option<String>,
        /// Exchange source and target before converting
        #[arg(long, default_value = "false")]
        swap: bool,
        /// Print the step-by-step calculation
        #[arg(long, default_value = "false")]
        explain: bool,
    },
    /// List every currency and its rate in base units
    Rates,
}

#[derive(Tabled)]
struct BoardRow {
    #[tabled(rename = "")]
    symbol: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Rate")]
    rate: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let (filter, filter_handle) = reload::Layer::new(log_filter(args.log)?);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli_config = CliConfig::load();
    if !args.log && cli_config.enable_logging.unwrap_or(false) {
        filter_handle.reload(log_filter(true)?)?;
    }

    let rates_path = args.rates.clone().or_else(|| cli_config.rates_file.clone());
    let config = load_config(rates_path.as_deref()).await?;
    let converter = CurrencyConverter::from_config(&config);

    match args.command {
        Commands::Convert { amount, from, to, swap, explain } => {
            let request = conversion_request(&amount, from, to, &cli_config, &config);
            let conversion = if swap {
                converter.swap_and_convert(&request)?
            } else {
                converter.convert_request(&request)?
            };

            if args.json {
                println!("{}", serde_json::to_string_pretty(&conversion)?);
            } else if explain {
                print!("{}", conversion.explain());
            } else {
                println!("{}", conversion.summary_dp(config.display_precision));
            }
        }
        Commands::Rates => {
            let board = converter.table().board();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else {
                let rows: Vec<BoardRow> = board
                    .iter()
                    .map(|quote| BoardRow {
                        symbol: quote.symbol.clone().unwrap_or_default(),
                        code: quote.code.to_string(),
                        name: quote.display_name.clone(),
                        rate: quote.format_rate(),
                    })
                    .collect();
                println!("Base currency: {}", converter.table().base().option_label());
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
        }
    }

    Ok(())
}

/// `birr_fx=debug` when verbose, otherwise warnings only; `RUST_LOG` directives still apply.
fn log_filter(verbose: bool) -> Result<EnvFilter, ParseError> {
    let level = if verbose { "birr_fx=debug" } else { "birr_fx=warn" };
    Ok(EnvFilter::from_default_env().add_directive(level.parse()?))
}

/// Fills in missing codes from the user config, then from the rate configuration.
fn conversion_request(
    amount: &str,
    from: Option<String>,
    to: Option<String>,
    cli_config: &CliConfig,
    config: &FxConfig,
) -> ConversionRequest {
    let from = from
        .or_else(|| cli_config.default_from.clone())
        .unwrap_or_else(|| config.get_default_from());
    let to = to
        .or_else(|| cli_config.default_to.clone())
        .unwrap_or_else(|| config.get_default_to());
    ConversionRequest::new(amount, from, to)
}

/// Resolves the configuration: explicit file, then `BIRR_FX_CONFIG`, then the built-in sample.
async fn load_config(path: Option<&Path>) -> Result<FxConfig, FxError> {
    if let Some(path) = path {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FxError::Configuration(format!("Failed to read {}: {}", path.display(), e)))?;
        if content.trim_start().starts_with('[') {
            return FxConfig::from_provider(&JsonFileRateProvider::new(path)).await;
        }
        return FxConfig::try_from_json(path);
    }

    if std::env::var_os(CONFIG_ENV_VAR).is_some() {
        return FxConfig::from_env();
    }

    debug!("Using built-in sample rates");
    let config = FxConfig::default();
    info!(currencies = config.rates.len(), base = %config.rates.base_code(), "rate table ready");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert_args(argv: &[&str]) -> (String, Option<String>, Option<String>) {
        let args = Args::try_parse_from(argv).expect("arguments should parse");
        match args.command {
            Commands::Convert { amount, from, to, .. } => (amount, from, to),
            Commands::Rates => panic!("expected the convert subcommand"),
        }
    }

    #[test]
    fn test_negative_amount_is_accepted_and_converts_to_zero() {
        let (amount, from, to) = convert_args(&["birr-fx", "convert", "-5", "ETB", "USD"]);
        assert_eq!(amount, "-5");

        let config = FxConfig::default();
        let request = conversion_request(&amount, from, to, &CliConfig::default(), &config);
        let conversion = CurrencyConverter::from_config(&config).convert_request(&request).unwrap();
        assert!(conversion.result.is_zero());
        assert_eq!(conversion.summary(), "0.00 ETB = 0.00 USD");
    }

    #[test]
    fn test_missing_codes_come_from_user_config_then_rates() {
        let (amount, from, to) = convert_args(&["birr-fx", "convert", "10"]);
        let config = FxConfig::default();

        let cli_config = CliConfig {
            default_from: Some("EUR".to_string()),
            ..CliConfig::default()
        };
        let conversion = CurrencyConverter::from_config(&config)
            .convert_request(&conversion_request(&amount, from, to, &cli_config, &config))
            .unwrap();
        assert_eq!(conversion.from.as_str(), "EUR");
        assert_eq!(conversion.to.as_str(), "USD");
    }

    #[test]
    fn test_log_filter_levels() {
        assert!(log_filter(true).unwrap().to_string().contains("birr_fx=debug"));
        assert!(log_filter(false).unwrap().to_string().contains("birr_fx=warn"));
    }
}
