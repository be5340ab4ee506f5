//! The three views of one selection pass: KO list, gene detail, and full detail.

use crate::kofam::{Assignment, Hit};
use crate::{utils, Table};
use color_eyre::eyre::{Report, Result};
use itertools::Itertools;
use std::fmt::Debug;
use std::path::Path;

/// File name of the selected KO list.
pub const KO_LIST: &str = "ko_list.tsv";
/// File name of the selected (gene, KO) table.
pub const GENE_DETAIL: &str = "gene_detail.tsv";
/// File name of the table of all hits.
pub const FULL_DETAIL: &str = "full_detail.tsv";

const GENE_DETAIL_HEADERS: &[&str] =
    &["KO", "gene", "threshold", "score", "E-value", "marker", "KO_definition"];
const FULL_DETAIL_HEADERS: &[&str] =
    &["gene", "rank", "KO", "threshold", "score", "E-value", "marker", "KO_definition", "selected"];

/// Outputs rendered from the same [`Assignment`]s, so that they always agree.
#[derive(Clone, Debug, PartialEq)]
pub struct Outputs {
    /// Selected KO IDs, one per line.
    pub ko_list: Vec<String>,
    /// One row per selected (gene, KO).
    pub gene_detail: Table<String>,
    /// One row per candidate hit, with a selected `Y`/`N` column.
    pub full_detail: Table<String>,
}

impl Outputs {
    /// Render the outputs of gene [`Assignment`]s.
    ///
    /// ## Arguments
    ///
    /// - `unique` - Write the KO list as sorted unique KO IDs, rather than one line per selected hit.
    /// - `detail_top` - Only show hits up to this rank (1-based, input order) in the full
    ///   detail table. Selected hits are always shown.
    pub fn new(
        assignments: &[Assignment],
        unique: bool,
        detail_top: Option<usize>,
    ) -> Result<Self, Report> {
        let selected = assignments.iter().flat_map(|a| a.selected_hits()).map(|hit| hit.ko.clone());
        let ko_list = match unique {
            true => selected.sorted().dedup().collect(),
            false => selected.collect(),
        };

        let mut gene_detail = Table::new();
        gene_detail.headers = GENE_DETAIL_HEADERS.iter().map(|h| h.to_string()).collect();
        for hit in assignments.iter().flat_map(|a| a.selected_hits()) {
            let mut row = vec![hit.ko.clone(), hit.gene.clone()];
            row.extend(hit_columns(hit));
            gene_detail.add_row(row)?;
        }

        let mut full_detail = Table::new();
        full_detail.headers = FULL_DETAIL_HEADERS.iter().map(|h| h.to_string()).collect();
        for assignment in assignments {
            for (i, hit) in assignment.hits.iter().enumerate() {
                let rank = i + 1;
                let selected = assignment.is_selected(i);
                if !selected && detail_top.is_some_and(|top| rank > top) {
                    continue;
                }
                let mut row = vec![hit.gene.clone(), rank.to_string(), hit.ko.clone()];
                row.extend(hit_columns(hit));
                row.push(if selected { "Y" } else { "N" }.to_string());
                full_detail.add_row(row)?;
            }
        }

        Ok(Outputs { ko_list, gene_detail, full_detail })
    }

    /// Write the outputs into `output_dir`, which is created if needed.
    ///
    /// Either all three files are written, or none are.
    pub fn write<P>(&self, output_dir: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        let dir = output_dir.as_ref();
        let ko_list = self.ko_list.iter().map(|ko| format!("{ko}\n")).join("");
        utils::write_files(&[
            (dir.join(KO_LIST), ko_list),
            (dir.join(GENE_DETAIL), self.gene_detail.to_tsv()),
            (dir.join(FULL_DETAIL), self.full_detail.to_tsv()),
        ])
    }
}

/// Threshold, score, E-value, marker, and KO definition columns of a hit.
fn hit_columns(hit: &Hit) -> [String; 5] {
    [
        hit.threshold_text.clone(),
        hit.score_text.clone(),
        hit.evalue.clone(),
        if hit.marked { "*" } else { "" }.to_string(),
        hit.definition.clone().unwrap_or_default(),
    ]
}
