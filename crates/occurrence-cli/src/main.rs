use std::process::ExitCode;

use anyhow::Result;

mod cli;

fn main() -> Result<ExitCode> {
    cli::run()
}
