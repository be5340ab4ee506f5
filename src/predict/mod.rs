//! Predict carbon-fixation pathways from a list of KO IDs.


use crate::{utils, Table};
use carbfix_rules::{RuleSet, Verdict};
#[cfg(feature = "cli")]
use clap::Parser;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

// ----------------------------------------------------------------------------
// PredictArgs
// ----------------------------------------------------------------------------

/// Predict carbon-fixation pathways from a list of KO IDs.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
pub struct PredictArgs {
    /// Input KO list, one KO ID per line.
    ///
    /// Only the first tab-separated column is used, so the gene detail table
    /// written by `carbfix kofam` can also be used.
    #[cfg_attr(feature = "cli", clap(short = 'k', long, required = true))]
    pub ko_list: PathBuf,

    /// Pathway rules (JSON). If not provided, the built-in rules are used.
    #[cfg_attr(feature = "cli", clap(short = 'r', long))]
    pub rules: Option<PathBuf>,

    /// Output file of pathway verdicts.
    ///
    /// If the parent directory does not exist, it will be created.
    #[cfg_attr(feature = "cli", clap(short = 'o', long, required = true))]
    pub output: PathBuf,
}

/// Predict carbon-fixation pathways, writing one `<pathway>\t<Y|N>` line per pathway.
///
/// ## Examples
///
/// ```rust
/// use carbfix::{predict, PredictArgs};
///
/// let dir = tempfile::tempdir()?;
/// let ko_list = dir.path().join("ko_list.tsv");
/// std::fs::write(&ko_list, "K00855\nK01601\n")?;
///
/// let args = PredictArgs { ko_list, output: dir.path().join("pathways.tsv"), ..Default::default() };
/// let verdicts = predict(&args)?;
/// assert!(verdicts[0].present);
/// assert_eq!(std::fs::read_to_string(&args.output)?.lines().count(), 7);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn predict(args: &PredictArgs) -> Result<Vec<Verdict>, Report> {
    debug!("Arguments:\n{}", serde_json::to_string_pretty(args)?);

    // rules first, a configuration error should fail before any input is read
    let rules = load_rules(args.rules.as_deref())?;

    info!("Reading KO list: {:?}", args.ko_list);
    let observed = read_ko_list(&args.ko_list)?;
    info!("Observed KO IDs: {}", observed.len());

    let verdicts = rules.evaluate(&observed);
    for verdict in verdicts.iter().filter(|v| v.present) {
        if let Some(alternative) = rules.get(&verdict.pathway).satisfied_by(&observed) {
            debug!("{} satisfied by: {}", verdict.pathway, alternative.iter().join(", "));
        }
    }

    info!("Writing pathway verdicts: {:?}", args.output);
    let output = verdicts.iter().map(|v| format!("{v}\n")).join("");
    utils::write_file(&args.output, &output)?;

    info!("Pathway verdicts:\n{}", verdict_table(&verdicts).to_markdown());

    Ok(verdicts)
}

/// Load the pathway rules from `path`, or the built-in rules.
pub fn load_rules(path: Option<&Path>) -> Result<RuleSet, Report> {
    match path {
        Some(path) => {
            info!("Loading pathway rules: {path:?}");
            RuleSet::read(path)
        }
        None => {
            info!("Loading built-in pathway rules.");
            RuleSet::builtin()
        }
    }
}

/// Read the set of KO IDs from a KO list file.
pub fn read_ko_list<P>(path: &P) -> Result<BTreeSet<String>, Report>
where
    P: AsRef<Path> + Debug,
{
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| eyre!("Failed to read KO list: {path:?}"))?;
    Ok(parse_ko_list(&content))
}

/// Parse the set of KO IDs from KO list text.
///
/// Blank lines, `#` comments, and a `KO` header are ignored. Only the first
/// tab-separated field of each line is used.
///
/// ```rust
/// use carbfix::predict::parse_ko_list;
///
/// let kos = parse_ko_list("KO\tgene\nK01601\tgene_2\n\nK00855\nK00855\n");
/// assert_eq!(kos.into_iter().collect::<Vec<_>>(), ["K00855", "K01601"]);
/// ```
pub fn parse_ko_list(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split('\t').next())
        .map(str::trim)
        .filter(|ko| !ko.is_empty() && *ko != "KO")
        .map(String::from)
        .collect()
}

/// Summary table of the verdicts, for logging.
fn verdict_table(verdicts: &[Verdict]) -> Table<&'static str> {
    let mut table = Table::new();
    table.headers = vec!["pathway", "present"];
    table.rows = verdicts.iter().map(|v| vec![v.pathway.name(), v.mark()]).collect();
    table
}

// ----------------------------------------------------------------------------
// RulesArgs
// ----------------------------------------------------------------------------

/// Validate pathway rules and export them in the mapping form.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
pub struct RulesArgs {
    /// Pathway rules (JSON) to validate. If not provided, the built-in rules are used.
    #[cfg_attr(feature = "cli", clap(short = 'r', long))]
    pub rules: Option<PathBuf>,

    /// Output file. If not provided, the rules are printed to stdout.
    #[cfg_attr(feature = "cli", clap(short = 'o', long))]
    pub output: Option<PathBuf>,
}

/// Validate pathway rules and write them as JSON in the mapping form.
///
/// Rules in the `pathway_list` form are compiled into lists of alternative KO sets.
pub fn rules(args: &RulesArgs) -> Result<RuleSet, Report> {
    let rules = load_rules(args.rules.as_deref())?;
    for (pathway, rule) in rules.iter() {
        debug!("{pathway}: {rule}");
    }

    let json = format!("{}\n", rules.to_json()?);
    match &args.output {
        Some(path) => {
            info!("Writing pathway rules: {path:?}");
            utils::write_file(path, &json)?;
        }
        None => print!("{json}"),
    }

    Ok(rules)
}
