use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use payoutcalc::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct PayoutArgs {
    /// Account size in USD
    #[arg(short, long, default_value_t = 0.0)]
    account_size: f64,

    /// Profit target in percent (0-100)
    #[arg(short, long, default_value_t = 0.0)]
    profit: f64,

    /// Your profit split in percent (50-100), defaults to the configured split
    #[arg(short, long)]
    split: Option<f64>,

    /// Payout currency code, defaults to the configured currency
    #[arg(short = 'x', long)]
    currency: Option<String>,
}

impl From<PayoutArgs> for payoutcalc::CalcArgs {
    fn from(args: PayoutArgs) -> payoutcalc::CalcArgs {
        payoutcalc::CalcArgs {
            account_size: args.account_size,
            profit_percent: args.profit,
            split_percent: args.split,
            currency: args.currency,
        }
    }
}

impl From<Commands> for payoutcalc::AppCommand {
    fn from(cmd: Commands) -> payoutcalc::AppCommand {
        match cmd {
            Commands::Calc(args) => payoutcalc::AppCommand::Calc(args.into()),
            Commands::Rates => payoutcalc::AppCommand::Rates,
            Commands::Interactive(args) => payoutcalc::AppCommand::Interactive(args.into()),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Calculate a payout
    Calc(PayoutArgs),
    /// Display the exchange rate table
    Rates,
    /// Recalculate the payout as you change inputs
    Interactive(PayoutArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => payoutcalc::cli::setup::setup(),
        Some(cmd) => payoutcalc::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
