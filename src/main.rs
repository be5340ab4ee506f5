#[cfg(feature = "cli")]
use carbfix::{cli::Command, Cli};
#[cfg(feature = "cli")]
use clap::Parser;
use color_eyre::eyre::{Report, Result};

fn main() -> Result<(), Report> {
    #[cfg(feature = "cli")]
    {
        // ------------------------------------------------------------------------
        // CLI Setup

        // Parse CLI parameters
        let args = Cli::parse();

        // initialize color_eyre crate for colorized logs
        color_eyre::install()?;

        // Set logging/verbosity level via RUST_LOG
        std::env::set_var("RUST_LOG", args.verbosity.to_string());

        // initialize env_logger crate for logging/verbosity level
        env_logger::init();

        // check which CLI command we're running (predict, kofam, rules)
        match args.command {
            // Predict pathways from a KO list
            Command::Predict(args) => _ = carbfix::predict(&args)?,
            // Select KO assignments from KofamScan results
            Command::Kofam(args) => _ = carbfix::kofam(&args)?,
            // Validate and export pathway rules
            Command::Rules(args) => _ = carbfix::rules(&args)?,
        }
    }

    Ok(())
}
