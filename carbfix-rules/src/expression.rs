//! Nested boolean rule [`Expression`]s and their compilation to disjunctive normal form.

use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum number of alternative KO sets an [`Expression`] may compile to.
pub const MAX_ALTERNATIVES: usize = 10_000;

/// The boolean [`Operator`] of an [`Expression`] node.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Every term must hold.
    AllOf,
    /// At least one term must hold.
    OneOf,
    /// At least `min` terms must hold (all terms when `min` is unset).
    AtLeast,
}

/// A node of a nested pathway definition.
///
/// A node holds either an `id_list` of KO IDs (a leaf, where each KO ID is one term)
/// or a `list` of sub-expressions (a composite, where each sub-expression is one term).
/// Other keys, such as a node name or description, are ignored.
///
/// ```rust
/// use carbfix_rules::expression::{Expression, Operator};
///
/// let json = r#"{
///   "type": "all_of",
///   "list": [
///     { "type": "all_of", "id_list": ["K00855"] },
///     { "type": "one_of", "id_list": ["K01601", "K01602"] }
///   ]
/// }"#;
/// let expression: Expression = serde_json::from_str(json)?;
/// assert_eq!(expression.operator, Operator::AllOf);
/// assert_eq!(expression.to_alternatives()?.len(), 2);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Expression {
    /// Node operator, stored as `type` in rule files.
    #[serde(rename = "type")]
    pub operator: Operator,
    /// Minimum number of terms for [`Operator::AtLeast`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    /// KO IDs of a leaf node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_list: Option<Vec<String>>,
    /// Sub-expressions of a composite node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<Expression>>,
}

impl Expression {
    /// Returns a leaf [`Expression`] over KO IDs.
    pub fn leaf<S: Into<String>>(operator: Operator, ids: impl IntoIterator<Item = S>) -> Self {
        Expression {
            operator,
            min: None,
            id_list: Some(ids.into_iter().map(Into::into).collect()),
            list: None,
        }
    }

    /// Returns a composite [`Expression`] over sub-expressions.
    pub fn composite(operator: Operator, list: Vec<Expression>) -> Self {
        Expression { operator, min: None, id_list: None, list: Some(list) }
    }

    /// Returns the expression as a list of alternative KO sets.
    ///
    /// Duplicate alternatives and alternatives that are supersets of another
    /// alternative are removed, neither changes which KO sets satisfy the expression.
    ///
    /// Fails if any step of the compilation exceeds [`MAX_ALTERNATIVES`].
    pub fn to_alternatives(&self) -> Result<Vec<BTreeSet<String>>, Report> {
        let terms: Vec<Vec<BTreeSet<String>>> = match (&self.id_list, &self.list) {
            (Some(ids), None) => {
                ids.iter().map(|id| vec![BTreeSet::from([id.trim().to_string()])]).collect()
            }
            (None, Some(list)) => {
                list.iter().map(Expression::to_alternatives).collect::<Result<_, Report>>()?
            }
            (Some(_), Some(_)) => {
                return Err(eyre!("Expression has both 'id_list' and 'list': {self:?}"))
            }
            (None, None) => return Err(eyre!("Expression has neither 'id_list' nor 'list': {self:?}")),
        };

        let required = match self.operator {
            Operator::AllOf => terms.len(),
            Operator::OneOf => 1,
            Operator::AtLeast => self.min.unwrap_or(terms.len()),
        };

        let choices = binomial(terms.len(), required);
        if choices > MAX_ALTERNATIVES {
            return Err(too_many(choices));
        }

        let mut alternatives = Vec::new();
        for chosen in terms.iter().combinations(required) {
            alternatives.extend(product(&chosen)?);
            if alternatives.len() > MAX_ALTERNATIVES {
                return Err(too_many(alternatives.len()));
            }
        }

        Ok(absorb(alternatives))
    }
}

/// Every way of satisfying all `terms` at once, one alternative from each.
fn product(terms: &[&Vec<BTreeSet<String>>]) -> Result<Vec<BTreeSet<String>>, Report> {
    terms.iter().try_fold(vec![BTreeSet::new()], |acc, term| {
        let size = acc.len().saturating_mul(term.len());
        if size > MAX_ALTERNATIVES {
            return Err(too_many(size));
        }
        let acc: Vec<BTreeSet<String>> = acc
            .iter()
            .cartesian_product(term.iter())
            .map(|(left, right)| left.union(right).cloned().collect())
            .collect();
        Ok(acc)
    })
}

/// Number of `k`-sized combinations of `n` terms, saturating at [`usize::MAX`].
fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    // exact at every step, the running value is itself a binomial coefficient
    (0..k)
        .try_fold(1usize, |acc, i| acc.checked_mul(n - i).map(|value| value / (i + 1)))
        .unwrap_or(usize::MAX)
}

fn too_many(size: usize) -> Report {
    eyre!("Expression expands to {size} alternative KO sets, the limit is {MAX_ALTERNATIVES}.")
        .suggestion("Split the pathway definition into smaller expressions.")
}

/// Drops duplicate alternatives and alternatives that contain another alternative.
fn absorb(mut alternatives: Vec<BTreeSet<String>>) -> Vec<BTreeSet<String>> {
    // smallest first, so every subset is kept before its supersets are checked
    alternatives.sort_by_key(BTreeSet::len);
    let mut kept: Vec<BTreeSet<String>> = Vec::new();
    for alternative in alternatives {
        if !kept.iter().any(|k| k.is_subset(&alternative)) {
            kept.push(alternative);
        }
    }
    kept
}
