use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod utils;

/// Command-line interface for the NDN forwarding core
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Sets the level of verbosity
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the forwarding table (FIB) of a throwaway in-process forwarder
    Fib {
        #[clap(subcommand)]
        cmd: FibCommands,
    },

    /// Inject an Interest into an in-process forwarder and print the Data it's satisfied with
    Interest {
        /// Name to request (NDN URI format)
        name: String,

        /// Timeout in milliseconds
        #[clap(short, long, default_value = "4000")]
        timeout: u64,
    },

    /// Run a forwarder that serves one piece of Data for a fixed prefix until Ctrl+C
    Publish {
        /// Name to publish under (NDN URI format)
        name: String,

        /// Content to publish (string)
        content: String,

        /// Freshness period in milliseconds
        #[clap(short, long, default_value = "60000")]
        freshness: u64,
    },
}

#[derive(Subcommand)]
enum FibCommands {
    /// Add a route to the FIB and show the longest-prefix match it produces
    Add {
        /// Name prefix (NDN URI format)
        prefix: String,

        /// Next-hop face ID
        face: u64,

        /// Route cost/metric
        #[clap(short, long, default_value = "10")]
        cost: u32,
    },

    /// Remove a route from the FIB
    Remove {
        /// Name prefix (NDN URI format)
        prefix: String,
    },

    /// Show the routes inserted earlier in the same invocation
    Show {
        /// Routes to seed the FIB with before showing it, as prefix:face:cost
        #[clap(long, value_delimiter = ',')]
        seed: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "info" }),
    )
    .init();

    // The forwarder's tables use `Rc`/`RefCell`, so the whole reactor must
    // run on a single thread inside a `LocalSet` (see ndnfw-forwarder::lib).
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();

    local.block_on(&rt, async move {
        match cli.command {
            Commands::Fib { cmd } => commands::fib::handle_command(cmd).await,
            Commands::Interest { name, timeout } => {
                commands::interest::send_interest(name, timeout).await
            }
            Commands::Publish {
                name,
                content,
                freshness,
            } => commands::publish::publish_data(name, content, freshness).await,
        }
    })
}
