//! Trazar CLI entry point.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "trazar",
    version,
    about = "Build declarative cloud resource graphs for an external reconciler"
)]
struct Cli {
    #[command(subcommand)]
    command: trazar::cli::Commands,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = trazar::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
