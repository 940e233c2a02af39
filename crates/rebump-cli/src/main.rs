mod bridge;
mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{
    bump::BumpArgs, response::ResponseSubcommand, run::RunArgs, schedule::ScheduleSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rebump",
    about = "Cooldown-driven bump scheduler — parse status replies, reschedule follow-up commands",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data root holding .rebump/ state (default: current directory)
    #[arg(long, global = true, env = "REBUMP_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the one-shot command schedule
    Schedule {
        #[command(subcommand)]
        subcommand: ScheduleSubcommand,
    },

    /// Run one full bump cycle: trigger, capture, parse, reschedule
    Bump(BumpArgs),

    /// Tick loop executing due scheduled commands until stopped
    Run(RunArgs),

    /// Manage response templates
    Response {
        #[command(subcommand)]
        subcommand: ResponseSubcommand,
    },

    /// Exercise the cooldown parser against sample text
    Selftest {
        /// Text to parse (default: the built-in bilingual sample)
        #[arg(long)]
        text: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Run(_) | Commands::Bump(_) => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = cli.root.unwrap_or_else(|| PathBuf::from("."));

    let result = match cli.command {
        Commands::Schedule { subcommand } => cmd::schedule::run(&root, subcommand, cli.json),
        Commands::Bump(args) => cmd::bump::run(&root, args, cli.json),
        Commands::Run(args) => cmd::run::run(&root, args),
        Commands::Response { subcommand } => cmd::response::run(&root, subcommand, cli.json),
        Commands::Selftest { text } => cmd::selftest::run(text.as_deref(), cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
