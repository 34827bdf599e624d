use clap::{Parser, Subcommand};

mod commands;
mod output;
mod tty;

use commands::{classify, error, send, watch, GlobalArgs};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "bridge-callback")]
#[command(version = VERSION)]
#[command(about = "Report deployment step transitions to a bridge server")]
struct Cli {
    /// Log debug detail (unclassified tasks, every dispatched event)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read lifecycle events as JSON lines and report step transitions
    Watch(watch::WatchArgs),
    /// Show which deployment step each task name maps to
    Classify(classify::ClassifyArgs),
    /// Send a single callback to the bridge server
    Send(send::SendArgs),
    /// List error codes or explain one
    Error(error::ErrorArgs),
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let global = GlobalArgs {};

    let (json_result, exit_code) = match cli.command {
        Commands::Watch(args) => output::map_cmd_result_to_json(watch::run(args, &global)),
        Commands::Classify(args) => output::map_cmd_result_to_json(classify::run(args, &global)),
        Commands::Send(args) => output::map_cmd_result_to_json(send::run(args, &global)),
        Commands::Error(args) => output::map_cmd_result_to_json(error::run(args, &global)),
    };

    if let Err(err) = output::print_json_result(json_result) {
        eprintln!("{}", err);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
