use clap::Parser;
use lunatrader::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
