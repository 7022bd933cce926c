//! dscbridge CLI — drive PowerShell DSC resources from declarative desired state.

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "dscbridge",
    version,
    about = "Drive PowerShell DSC resources through Invoke-DscResource"
)]
struct Cli {
    /// Debug logging, including the generated script (secrets redacted)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: dscbridge::cli::Commands,
}

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over -v; logs go to stderr so stdout stays JSON
    let default_level = if cli.verbose { "dscbridge=debug" } else { "dscbridge=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dscbridge::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
