//! [Command-line interface](Cli) (CLI) of the main binary.

use crate::{KofamArgs, PredictArgs, RulesArgs};
use clap::{Parser, Subcommand, ValueEnum};
use indoc::indoc;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

// ----------------------------------------------------------------------------
// CLI Entry Point
// ----------------------------------------------------------------------------

/// The command-line interface (CLI).
/// ---
/// The CLI is intended for parsing user input from the command-line in the main function. This is achieved with the `parse` function, which parses the command line arguments from [`std::env::args`](https://doc.rust-lang.org/std/env/fn.args.html).
/// ```no_run
/// use clap::Parser;
/// let args = carbfix::Cli::parse();
/// ```
/// The command-line arguments from `std::env::args` are simply a vector of space separated strings. Here is a manual example of setting the command-line input:
/// ```rust
/// use carbfix::{Cli, cli::Command};
/// use clap::Parser;
///
/// let input = ["carbfix", "kofam", "--input", "kofamscan.tsv", "--output-dir", "output", "--top", "2"];
/// let args = Cli::parse_from(input);
/// match args.command {
///   Command::Kofam(args) => assert_eq!(args.top, 2),
///   _                    => assert!(false),
/// }
/// ```
#[derive(Debug, Deserialize, Parser, Serialize)]
#[clap(name = "carbfix", author, version)]
#[clap(about = "carbfix predicts carbon-fixation pathways from KEGG Orthology (KO) annotations.")]
#[clap(after_help = indoc! {"
    Typical workflow:
      carbfix kofam   --input kofamscan.tsv --output-dir output
      carbfix predict --ko-list output/ko_list.tsv --output output/pathways.tsv
"})]
pub struct Cli {
    #[clap(subcommand)]
    /// Pass CLI arguments to a particular [Command].
    #[clap(help = "Set the command.")]
    pub command: Command,

    /// Set the output [Verbosity] level.
    #[clap(short = 'v', long)]
    #[clap(value_enum, default_value_t = Verbosity::default())]
    #[clap(hide_possible_values = false)]
    #[clap(global = true)]
    #[clap(help = "Set the output verbosity level.")]
    pub verbosity: Verbosity,
}

/// CLI [commands](#variants). Used to decide which runtime [Command](#variants) the CLI arguments should be passed to.
#[derive(Debug, Deserialize, Serialize, Subcommand)]
pub enum Command {
    /// Pass CLI arguments to the pathway [predict](crate::predict()) method.
    /// ## Examples
    /// ```rust
    /// use carbfix::{Cli, cli::Command};
    /// use clap::Parser;
    /// let input = ["carbfix", "predict", "--ko-list", "ko_list.tsv", "--output", "pathways.tsv"];
    /// let args = Cli::parse_from(input);
    /// assert!(matches!(args.command, Command::Predict(_)));
    /// ```
    #[clap(about = "Predict carbon-fixation pathways from a KO list.")]
    #[clap(arg_required_else_help = true)]
    Predict(PredictArgs),

    /// Pass CLI arguments to the KofamScan [kofam](crate::kofam()) method.
    #[clap(about = "Select KO assignments from KofamScan results.")]
    #[clap(arg_required_else_help = true)]
    Kofam(KofamArgs),

    /// Pass CLI arguments to the [rules](crate::rules()) method.
    #[clap(about = "Validate and export pathway rules.")]
    Rules(RulesArgs),
}

// -----------------------------------------------------------------------------
// Verbosity
// -----------------------------------------------------------------------------

/// The output verbosity level.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ValueEnum)]
pub enum Verbosity {
    #[default]
    Info,
    Warn,
    Debug,
    Error,
}

impl Display for Verbosity {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        // Convert to lowercase for RUST_LOG env var compatibility
        let lowercase = format!("{:?}", self).to_lowercase();
        write!(f, "{lowercase}")
    }
}
