use anyhow::Result;
use clap::{Parser, Subcommand};

// CLI Commands (cmd_ prefix)
mod cmd_index;
mod cmd_lookup;
mod cmd_server;

// Helper modules (no cmd_ prefix)
mod logger;
mod progress;
mod utils;

use utils::GlobalArgs;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format custom help template with grouped commands
fn format_help_template() -> &'static str {
    concat!(
        "{about-with-newline}\n\n",
        "{usage-heading}\n  {usage}\n\n",
        "Options:\n{options}\n\n",
        "Lookups:\n",
        "  banks     List bank names known to the index\n",
        "  bank      Show all branches of a bank\n",
        "  ifsc      Show the branch for an IFSC code\n",
        "\n",
        "Index:\n",
        "  index     Show, build or rebuild the bank index\n",
        "\n",
        "Server:\n",
        "  server    Start HTTP server\n",
        "\n",
        "See 'rbi-ifsc <COMMAND> --help' for more information on a specific command.\n"
    )
}

#[derive(Parser)]
#[command(bin_name = "rbi-ifsc")]
#[command(version = VERSION)]
#[command(about = concat!("rbi-ifsc v", env!("CARGO_PKG_VERSION"), " - IFSC lookup over RBI branch spreadsheets"))]
#[command(long_about = concat!(
    "rbi-ifsc v", env!("CARGO_PKG_VERSION"), " - IFSC lookup over RBI branch spreadsheets\n\n",
    "Discovers the per-bank branch spreadsheets published by the Reserve Bank\n",
    "of India, indexes bank names and IFSC prefixes once, and answers lookups\n",
    "by fetching only the spreadsheet a query needs."
))]
#[command(author)]
#[command(propagate_version = true)]
#[command(help_template = format_help_template())]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Server(cmd_server::ServerCommand),
    Index(cmd_index::IndexCommand),
    Banks(cmd_lookup::BanksCommand),
    Bank(cmd_lookup::BankCommand),
    Ifsc(cmd_lookup::IfscCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logger::init_logger(cli.global.verbose, cli.global.quiet);

    match cli.command {
        Commands::Server(cmd) => cmd_server::run(cmd, &cli.global)?,
        Commands::Index(cmd) => cmd_index::run(cmd, &cli.global)?,
        Commands::Banks(cmd) => cmd_lookup::run_banks(cmd, &cli.global)?,
        Commands::Bank(cmd) => cmd_lookup::run_bank(cmd, &cli.global)?,
        Commands::Ifsc(cmd) => cmd_lookup::run_ifsc(cmd, &cli.global)?,
    }

    Ok(())
}

/// Macro to create clap help templates with examples
/// This works around the limitation that {bin} doesn't work in after_help
#[macro_export]
macro_rules! clap_help {
    (examples: $examples:literal) => {{
        const BIN: &str = env!("CARGO_PKG_NAME");
        concat!(
            "{about-with-newline}\n",
            "{usage-heading} {usage}\n\n",
            "{all-args}\n\n",
            "Examples:\n",
            $examples
        ).replace("{bin}", BIN)
    }};
}
