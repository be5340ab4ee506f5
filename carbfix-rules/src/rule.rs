use crate::Expression;
use color_eyre::eyre::{eyre, Report, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// A pathway presence [`Rule`] in disjunctive normal form.
///
/// The rule is satisfied when at least one of its alternatives (a set of KO IDs)
/// is entirely contained in the observed KO IDs. A rule always has at least one
/// alternative, and no alternative is empty.
///
/// ## Examples
///
/// ```rust
/// use carbfix_rules::Rule;
/// use std::collections::BTreeSet;
///
/// let rule = Rule::new([vec!["K15230", "K15231"], vec!["K15232", "K15233", "K15234"]])?;
///
/// let observed = BTreeSet::from(["K15230".to_string(), "K15231".to_string()]);
/// assert!(rule.evaluate(&observed));
///
/// let observed = BTreeSet::from(["K15230".to_string(), "K15234".to_string()]);
/// assert!(!rule.evaluate(&observed));
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct Rule {
    alternatives: Vec<BTreeSet<String>>,
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let alternatives =
            self.alternatives.iter().map(|alt| format!("({})", alt.iter().join(" & "))).join(" | ");
        write!(f, "{alternatives}")
    }
}

impl Rule {
    /// Returns a new [`Rule`] from a list of alternative KO ID lists.
    ///
    /// Fails if there are no alternatives or if any alternative is empty.
    ///
    /// ```rust
    /// use carbfix_rules::Rule;
    ///
    /// assert!(Rule::new([vec!["K00855", "K01601"]]).is_ok());
    /// assert!(Rule::new(Vec::<Vec<&str>>::new()).is_err());
    /// assert!(Rule::new([vec!["K00855"], vec![]]).is_err());
    /// ```
    pub fn new<I, A, S>(alternatives: I) -> Result<Self, Report>
    where
        I: IntoIterator<Item = A>,
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let alternatives = alternatives
            .into_iter()
            .map(|alt| alt.into_iter().map(Into::into).map(|ko: String| ko.trim().to_string()).collect())
            .collect_vec();
        Rule::from_sets(alternatives)
    }

    fn from_sets(alternatives: Vec<BTreeSet<String>>) -> Result<Self, Report> {
        if alternatives.is_empty() {
            return Err(eyre!("Rule has no alternative KO sets."));
        }
        if let Some(i) = alternatives.iter().position(|alt| alt.is_empty()) {
            return Err(eyre!("Rule alternative {} is an empty KO set.", i + 1));
        }
        if let Some(ko) = alternatives.iter().flatten().find(|ko| ko.is_empty()) {
            return Err(eyre!("Rule contains an empty KO ID: {ko:?}"));
        }
        Ok(Rule { alternatives })
    }

    /// Returns the alternative KO sets, in rule order.
    pub fn alternatives(&self) -> &[BTreeSet<String>] {
        &self.alternatives
    }

    /// Returns true if any alternative is a subset of the `observed` KO IDs.
    pub fn evaluate(&self, observed: &BTreeSet<String>) -> bool {
        self.satisfied_by(observed).is_some()
    }

    /// Returns the first alternative that is fully contained in the `observed` KO IDs.
    pub fn satisfied_by(&self, observed: &BTreeSet<String>) -> Option<&BTreeSet<String>> {
        self.alternatives.iter().find(|alt| alt.is_subset(observed))
    }
}

impl TryFrom<Vec<Vec<String>>> for Rule {
    type Error = Report;
    fn try_from(alternatives: Vec<Vec<String>>) -> Result<Self, Report> {
        Rule::new(alternatives)
    }
}

impl From<Rule> for Vec<Vec<String>> {
    fn from(rule: Rule) -> Self {
        rule.alternatives.into_iter().map(|alt| alt.into_iter().collect()).collect()
    }
}

impl TryFrom<&Expression> for Rule {
    type Error = Report;

    /// Compiles a nested [`Expression`] into a [`Rule`].
    ///
    /// ```rust
    /// use carbfix_rules::{Expression, Rule};
    ///
    /// let json = r#"{"type": "at_least", "min": 2, "id_list": ["K1", "K2", "K3"]}"#;
    /// let expression: Expression = serde_json::from_str(json)?;
    /// let rule = Rule::try_from(&expression)?;
    /// assert_eq!(rule.alternatives().len(), 3);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    fn try_from(expression: &Expression) -> Result<Self, Report> {
        Rule::from_sets(expression.to_alternatives()?)
    }
}
