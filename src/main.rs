use clap::Parser;
use riskview::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
