use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    mensa_on::logging::init().context("init logging")?;

    let cli = mensa_on::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        mensa_on::cli::Command::Feed(args) => {
            mensa_on::build::run(args).context("feed")?;
        }
        mensa_on::cli::Command::Canteens(args) => {
            mensa_on::registry::run(args).context("canteens")?;
        }
        mensa_on::cli::Command::Legend(args) => {
            mensa_on::legend::run(args).context("legend")?;
        }
    }

    Ok(())
}
