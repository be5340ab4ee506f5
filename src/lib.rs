//! `carbfix` predicts which **carbon-fixation** pathways a genome carries from its KEGG
//! Orthology (KO) annotations.
//!
//! It has two stages:
//!
//! 1. `carbfix kofam` selects the KO assignment(s) of each gene from [KofamScan](https://github.com/takaram/kofam_scan)
//!    results. Hits above the KO threshold (marked with `*`) win. Otherwise the top-scoring
//!    hits are kept, optionally filtered by their score/threshold ratio.
//!
//! 1. `carbfix predict` evaluates the selected KO IDs against rules for seven pathways:
//!
//!    | Name      | Pathway                                      |
//!    |-----------|----------------------------------------------|
//!    | `CBB`     | Calvin-Benson-Bassham cycle                  |
//!    | `rTCA`    | Reductive citric acid cycle                  |
//!    | `WL`      | Wood-Ljungdahl pathway                       |
//!    | `3HP`     | 3-hydroxypropionate bi-cycle                 |
//!    | `3HP/4HB` | 3-hydroxypropionate/4-hydroxybutyrate cycle  |
//!    | `DC/4HB`  | Dicarboxylate/4-hydroxybutyrate cycle        |
//!    | `rGly`    | Reductive glycine pathway                    |
//!
//! ## Usage
//!
//! ```console
//! carbfix kofam --input kofamscan.tsv --output-dir output/ --min-score-ratio 0.5
//! carbfix predict --ko-list output/ko_list.tsv --output output/pathways.tsv
//! ```
//!
//! The pathway output has one line per pathway, in the order above:
//!
//! ```text
//! CBB     Y
//! rTCA    N
//! WL      N
//! 3HP     N
//! 3HP/4HB N
//! DC/4HB  N
//! rGly    N
//! ```
//!
//! Custom rules can be supplied with `--rules`, and the built-in rules exported with `carbfix rules`.

#[cfg(feature = "cli")]
pub mod cli;
pub mod kofam;
pub mod predict;
pub mod table;
pub mod utils;

#[doc(inline)]
#[cfg(feature = "cli")]
pub use crate::cli::Cli;
#[doc(inline)]
pub use crate::kofam::{kofam, KofamArgs};
#[doc(inline)]
pub use crate::predict::{predict, rules, PredictArgs, RulesArgs};
#[doc(inline)]
pub use crate::table::Table;
#[doc(inline)]
pub use carbfix_rules::{Pathway, Rule, RuleSet, Verdict};
