use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "workplan", version, about = "Workplan CLI")]
struct Cli {
    /// Log scheduling decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a schedule for a backlog file
    Schedule(commands::schedule::ScheduleArgs),
    /// Work settings management
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
}

fn init_tracing(verbose: bool) {
    let fallback_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Schedule(args) => commands::schedule::run(args),
        Commands::Settings { action } => commands::settings::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
