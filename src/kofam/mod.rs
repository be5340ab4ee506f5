//! Select KO assignments from [KofamScan](https://github.com/takaram/kofam_scan) results.
//!
//! KofamScan's `detail-tsv` output has one row per candidate (gene, KO) hit:
//!
//! | marker | gene name | KO     | threshold | score | E-value | KO definition |
//! |--------|-----------|--------|-----------|-------|---------|---------------|
//! | *      | gene_1    | K00855 | 213.37    | 401.2 | 4.1e-121| phosphoribulokinase |
//!
//! The marker `*` flags hits whose score is above the KO's threshold.

mod output;
mod select;
#[cfg(test)]
mod tests;

#[doc(inline)]
pub use output::{Outputs, FULL_DETAIL, GENE_DETAIL, KO_LIST};
#[doc(inline)]
pub use select::{select, Assignment, Policy};

#[cfg(feature = "cli")]
use clap::Parser;
use color_eyre::eyre::{eyre, ContextCompat, Report, Result, WrapErr};
use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

// ----------------------------------------------------------------------------
// KofamArgs
// ----------------------------------------------------------------------------

/// Select KO assignments from KofamScan results.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
pub struct KofamArgs {
    /// KofamScan results, in the tab-separated `detail-tsv` format.
    #[cfg_attr(feature = "cli", clap(short = 'i', long, required = true))]
    pub input: PathBuf,

    /// Output directory.
    ///
    /// If the directory does not exist, it will be created.
    #[cfg_attr(feature = "cli", clap(short = 'o', long, required = true))]
    pub output_dir: PathBuf,

    /// Number of top-scoring hits to select per gene, when no hit is above threshold.
    ///
    /// Use 0 to only select hits that are above threshold.
    #[cfg_attr(feature = "cli", clap(short = 't', long, default_value_t = KofamArgs::default().top))]
    pub top: usize,

    /// Minimum score/threshold ratio of hits selected when no hit is above threshold.
    ///
    /// Must be between 0 and 1 (exclusive).
    #[cfg_attr(feature = "cli", clap(short = 'r', long))]
    pub min_score_ratio: Option<f64>,

    /// Only show the first N hits of each gene in the full detail table.
    ///
    /// Selected hits are always shown.
    #[cfg_attr(feature = "cli", clap(long))]
    pub detail_top: Option<usize>,

    /// Write the KO list as sorted, unique KO IDs instead of one line per selected gene hit.
    #[cfg_attr(feature = "cli", clap(short = 'u', long))]
    pub unique: bool,
}

impl Default for KofamArgs {
    fn default() -> Self {
        KofamArgs {
            input: PathBuf::new(),
            output_dir: PathBuf::new(),
            top: 1,
            min_score_ratio: None,
            detail_top: None,
            unique: false,
        }
    }
}

/// Select KO assignments from KofamScan results and write the [`Outputs`].
///
/// ## Examples
///
/// ```rust
/// use carbfix::{kofam, KofamArgs};
///
/// let dir = tempfile::tempdir()?;
/// let input = dir.path().join("kofamscan.tsv");
/// std::fs::write(&input, "*\tgene_1\tK00855\t213.37\t401.2\t4.1e-121\tphosphoribulokinase\n")?;
///
/// let args = KofamArgs { input, output_dir: dir.path().join("output"), ..Default::default() };
/// let assignments = kofam(&args)?;
/// assert_eq!(assignments[0].kos(), ["K00855"]);
/// assert_eq!(std::fs::read_to_string(args.output_dir.join("ko_list.tsv"))?, "K00855\n");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn kofam(args: &KofamArgs) -> Result<Vec<Assignment>, Report> {
    debug!("Arguments:\n{}", serde_json::to_string_pretty(args)?);

    // reject a bad policy before reading any rows
    let policy = Policy::new(args.top, args.min_score_ratio)?;
    debug!("Selection policy: {policy:?}");

    info!("Reading KofamScan results: {:?}", args.input);
    let parsed = read_hits(&args.input)?;
    if parsed.skipped > 0 {
        warn!("Skipped {} malformed rows in: {:?}", parsed.skipped, args.input);
    }

    let assignments = group_by_gene(parsed.hits)
        .into_iter()
        .map(|(gene, hits)| select(&gene, hits, &policy))
        .collect_vec();

    let selected = assignments.iter().filter(|a| !a.selected.is_empty()).count();
    info!("Genes with a KO assignment: {selected} / {}", assignments.len());

    let outputs = Outputs::new(&assignments, args.unique, args.detail_top)?;
    info!("Writing outputs: {:?}", args.output_dir);
    outputs.write(&args.output_dir)?;

    Ok(assignments)
}

// ----------------------------------------------------------------------------
// Hit
// ----------------------------------------------------------------------------

/// One candidate KO assignment of a gene, a single row of KofamScan output.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Hit {
    /// True if the score is above the KO's threshold (marked with `*`).
    pub marked: bool,
    /// Gene name.
    pub gene: String,
    /// KO ID.
    pub ko: String,
    /// KO score threshold, KofamScan leaves this blank for some KOs.
    pub threshold: Option<f64>,
    /// HMM score.
    pub score: f64,
    /// Threshold as written in the input, `-` when missing.
    pub threshold_text: String,
    /// Score as written in the input.
    pub score_text: String,
    /// E-value, as written in the input.
    pub evalue: String,
    /// KO definition.
    pub definition: Option<String>,
}

impl Hit {
    /// Returns a new [`Hit`] without E-value or definition.
    pub fn new(gene: &str, ko: &str, threshold: Option<f64>, score: f64, marked: bool) -> Self {
        Hit {
            marked,
            gene: gene.to_string(),
            ko: ko.to_string(),
            threshold,
            score,
            threshold_text: threshold.map(|t| t.to_string()).unwrap_or_else(|| String::from("-")),
            score_text: score.to_string(),
            evalue: String::from("-"),
            definition: None,
        }
    }

    /// Returns the `score / threshold` ratio, or [`None`] if the threshold is missing or not positive.
    ///
    /// ```rust
    /// use carbfix::kofam::Hit;
    ///
    /// assert_eq!(Hit::new("g", "K00001", Some(200.0), 100.0, false).score_ratio(), Some(0.5));
    /// assert_eq!(Hit::new("g", "K00001", Some(0.0), 100.0, false).score_ratio(), None);
    /// assert_eq!(Hit::new("g", "K00001", None, 100.0, false).score_ratio(), None);
    /// ```
    pub fn score_ratio(&self) -> Option<f64> {
        self.threshold.filter(|threshold| *threshold > 0.0).map(|threshold| self.score / threshold)
    }

    /// Parse a [`Hit`] from the columns of one KofamScan row.
    ///
    /// ```rust
    /// use carbfix::kofam::Hit;
    ///
    /// let hit = Hit::from_columns(&["", "gene_1", "K00001", "", "12.5", "0.003"])?;
    /// assert!(!hit.marked);
    /// assert_eq!(hit.threshold, None);
    /// assert_eq!(hit.threshold_text, "-");
    ///
    /// assert!(Hit::from_columns(&["*", "gene_1", "K00001", "10.0", "high", "0.003"]).is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn from_columns<S>(columns: &[S]) -> Result<Self, Report>
    where
        S: AsRef<str>,
    {
        let column = |i: usize| columns.get(i).map(|c| c.as_ref().trim());

        if columns.len() < 6 {
            return Err(eyre!("Expected at least 6 columns, found {}.", columns.len()));
        }

        let gene = column(1).filter(|g| !g.is_empty()).wrap_err("Missing gene name.")?;
        let ko = column(2).filter(|k| !k.is_empty()).wrap_err("Missing KO ID.")?;

        let threshold = match column(3) {
            None | Some("") | Some("-") => None,
            Some(t) => Some(t.parse::<f64>().wrap_err_with(|| eyre!("Invalid threshold: {t:?}"))?),
        };
        let score_text = column(4).unwrap_or_default();
        let score =
            score_text.parse::<f64>().wrap_err_with(|| eyre!("Invalid score: {score_text:?}"))?;
        let evalue = column(5).unwrap_or_default();
        let _: f64 = evalue.parse().wrap_err_with(|| eyre!("Invalid E-value: {evalue:?}"))?;

        Ok(Hit {
            marked: column(0) == Some("*"),
            gene: gene.to_string(),
            ko: ko.to_string(),
            threshold,
            score,
            threshold_text: column(3).filter(|_| threshold.is_some()).unwrap_or("-").to_string(),
            score_text: score_text.to_string(),
            evalue: evalue.to_string(),
            definition: column(6).filter(|d| !d.is_empty()).map(String::from),
        })
    }
}

// ----------------------------------------------------------------------------
// Parsing
// ----------------------------------------------------------------------------

/// Hits parsed from KofamScan results.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedHits {
    /// Well-formed hits, in input order.
    pub hits: Vec<Hit>,
    /// Number of malformed rows that were skipped.
    pub skipped: usize,
}

/// Read hits from a KofamScan results file.
pub fn read_hits<P>(path: &P) -> Result<ParsedHits, Report>
where
    P: AsRef<Path> + Debug,
{
    let file = File::open(path).wrap_err_with(|| eyre!("Failed to read KofamScan results: {path:?}"))?;
    parse_hits(BufReader::new(file)).wrap_err_with(|| eyre!("Failed to parse KofamScan results: {path:?}"))
}

/// Parse hits from tab-separated KofamScan results.
///
/// Blank lines and `#` comment lines (the KofamScan header) are ignored. Rows with
/// too few columns, or with values that are not numbers, are skipped and counted.
///
/// ```rust
/// use carbfix::kofam::parse_hits;
///
/// let input = "# gene name\tKO\n*\tgene_1\tK00855\t213.37\t401.2\t4.1e-121\tphosphoribulokinase\n\tgene_2\tK01601\n";
/// let parsed = parse_hits(input.as_bytes())?;
/// assert_eq!(parsed.hits.len(), 1);
/// assert_eq!(parsed.skipped, 1);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn parse_hits<R: Read>(reader: R) -> Result<ParsedHits, Report> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut parsed = ParsedHits::default();

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(e).wrap_err("Failed to read row.");
            }
            Err(e) => {
                debug!("Skipping unreadable row: {e}");
                parsed.skipped += 1;
                continue;
            }
        };
        // a whitespace-only line is blank, not malformed
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        match Hit::from_columns(&record.iter().collect_vec()) {
            Ok(hit) => parsed.hits.push(hit),
            Err(e) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                debug!("Skipping malformed row on line {line}: {e}");
                parsed.skipped += 1;
            }
        }
    }

    Ok(parsed)
}

/// Group hits by gene, genes in order of first appearance.
///
/// ```rust
/// use carbfix::kofam::{group_by_gene, Hit};
///
/// let hits = ["b", "a", "b"].map(|gene| Hit::new(gene, "K00001", None, 1.0, false));
/// let groups = group_by_gene(hits);
/// assert_eq!(groups[0].0, "b");
/// assert_eq!(groups[0].1.len(), 2);
/// assert_eq!(groups[1].0, "a");
/// ```
pub fn group_by_gene<I>(hits: I) -> Vec<(String, Vec<Hit>)>
where
    I: IntoIterator<Item = Hit>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<Hit>)> = Vec::new();

    for hit in hits {
        match index.get(&hit.gene) {
            Some(&i) => groups[i].1.push(hit),
            None => {
                index.insert(hit.gene.clone(), groups.len());
                groups.push((hit.gene.clone(), vec![hit]));
            }
        }
    }

    groups
}
