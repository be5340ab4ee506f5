//! Select KO assignments for one gene from its KofamScan hits.

use crate::kofam::Hit;
use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Policy
// ----------------------------------------------------------------------------

/// How hits are selected when none of a gene's hits are above threshold.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Policy {
    top_n: usize,
    min_score_ratio: Option<f64>,
}

impl Default for Policy {
    fn default() -> Self {
        Policy { top_n: 1, min_score_ratio: None }
    }
}

impl Policy {
    /// Returns a new [`Policy`].
    ///
    /// ## Arguments
    ///
    /// - `top_n` - Maximum number of unmarked hits to keep per gene, `0` keeps only marked hits.
    /// - `min_score_ratio` - Optional minimum `score / threshold` of unmarked hits, within (0, 1).
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use carbfix::kofam::Policy;
    ///
    /// assert!(Policy::new(1, Some(0.5)).is_ok());
    /// assert!(Policy::new(0, None).is_ok());
    /// assert!(Policy::new(1, Some(1.0)).is_err());
    /// assert!(Policy::new(1, Some(0.0)).is_err());
    /// ```
    pub fn new(top_n: usize, min_score_ratio: Option<f64>) -> Result<Self, Report> {
        if let Some(ratio) = min_score_ratio {
            if !(ratio > 0.0 && ratio < 1.0) {
                return Err(eyre!("Minimum score ratio must be between 0 and 1 (exclusive): {ratio}"))
                    .suggestion("Omit the minimum score ratio to disable ratio filtering.");
            }
        }
        Ok(Policy { top_n, min_score_ratio })
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn min_score_ratio(&self) -> Option<f64> {
        self.min_score_ratio
    }

    /// Returns true if the hit passes the score ratio filter (always, when unset).
    ///
    /// A hit without a positive threshold has no ratio and never passes an active filter.
    pub fn passes_ratio(&self, hit: &Hit) -> bool {
        match self.min_score_ratio {
            None => true,
            Some(min) => hit.score_ratio().is_some_and(|ratio| ratio >= min),
        }
    }
}

// ----------------------------------------------------------------------------
// Assignment
// ----------------------------------------------------------------------------

/// The KO assignment of one gene: all of its hits, and which of them were selected.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Assignment {
    /// Gene name.
    pub gene: String,
    /// Candidate hits, in input order.
    pub hits: Vec<Hit>,
    /// Indices into `hits` of the selected hits, in selection order.
    pub selected: Vec<usize>,
}

impl Assignment {
    /// Returns true if the hit at `index` was selected.
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Returns the selected hits, in selection order.
    pub fn selected_hits(&self) -> impl Iterator<Item = &Hit> {
        self.selected.iter().map(|&i| &self.hits[i])
    }

    /// Returns the selected KO IDs, in selection order.
    pub fn kos(&self) -> Vec<&str> {
        self.selected_hits().map(|hit| hit.ko.as_str()).collect()
    }
}

/// Select the KO assignment(s) of a gene from its candidate hits.
///
/// - If any hit is marked (above threshold), exactly the marked hits are selected, in input order.
/// - Otherwise, hits are ranked by descending score (ties keep input order), hits failing
///   the score ratio filter are dropped, and the first `top_n` are selected.
///
/// ## Examples
///
/// ```rust
/// use carbfix::kofam::{select, Hit, Policy};
///
/// let hits = vec![
///     Hit::new("gene_1", "K00001", Some(332.67), 798.5, false),
///     Hit::new("gene_1", "K00002", Some(173.77), 311.3, false),
/// ];
/// let policy = Policy::new(1, Some(0.5))?;
/// let assignment = select("gene_1", hits, &policy);
/// assert_eq!(assignment.kos(), ["K00001"]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn select(gene: &str, hits: Vec<Hit>, policy: &Policy) -> Assignment {
    let marked = hits.iter().positions(|hit| hit.marked).collect_vec();

    let selected = if !marked.is_empty() {
        marked
    } else {
        hits.iter()
            .enumerate()
            // sorted_by is stable, equal scores keep their input order
            .sorted_by(|(_, a), (_, b)| b.score.total_cmp(&a.score))
            .filter(|(_, hit)| policy.passes_ratio(hit))
            .take(policy.top_n)
            .map(|(i, _)| i)
            .collect_vec()
    };

    Assignment { gene: gene.to_string(), hits, selected }
}
