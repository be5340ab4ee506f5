use crate::{Expression, Pathway, Rule, BUILTIN_RULES};
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;
use std::str::FromStr;
use strum::IntoEnumIterator;

// ----------------------------------------------------------------------------
// Verdict
// ----------------------------------------------------------------------------

/// The presence [`Verdict`] of one [`Pathway`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Verdict {
    pub pathway: Pathway,
    pub present: bool,
}

impl Verdict {
    /// Returns `"Y"` if the pathway is present, otherwise `"N"`.
    pub fn mark(&self) -> &'static str {
        if self.present {
            "Y"
        } else {
            "N"
        }
    }
}

impl Display for Verdict {
    /// Tab-separated pathway name and mark, ex. `CBB\tY`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.pathway, self.mark())
    }
}

// ----------------------------------------------------------------------------
// Rule Set
// ----------------------------------------------------------------------------

/// One [`Rule`] for every [`Pathway`].
///
/// ## Examples
///
/// ```rust
/// use carbfix_rules::{Pathway, RuleSet};
/// use std::collections::BTreeSet;
///
/// let rules = RuleSet::builtin()?;
/// let observed: BTreeSet<String> = ["K00855", "K01601"].map(String::from).into();
///
/// let present: Vec<_> = rules.evaluate(&observed).into_iter().filter(|v| v.present).collect();
/// assert_eq!(present.len(), 1);
/// assert_eq!(present[0].pathway, Pathway::CalvinBensonBassham);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeMap<Pathway, Rule>,
}

/// A pathway entry in the `pathway_list` form of a rules file.
#[derive(Debug, Deserialize)]
struct PathwayEntry {
    pathway_name: String,
    definition: Expression,
}

impl RuleSet {
    /// Returns a new [`RuleSet`], checking that every [`Pathway`] has a rule.
    pub fn new(rules: BTreeMap<Pathway, Rule>) -> Result<Self, Report> {
        let missing = Pathway::iter().filter(|p| !rules.contains_key(p)).collect_vec();
        if !missing.is_empty() {
            return Err(eyre!("Pathway rules are missing: {}", missing.iter().join(", "))
                .suggestion(format!("Rules are required for: {}", Pathway::iter().join(", "))));
        }
        Ok(RuleSet { rules })
    }

    /// Returns the built-in [`RuleSet`].
    pub fn builtin() -> Result<Self, Report> {
        RuleSet::from_json(BUILTIN_RULES).wrap_err("Failed to load built-in pathway rules.")
    }

    /// Parses a [`RuleSet`] from JSON, in either the mapping or the `pathway_list` form.
    ///
    /// ```rust
    /// use carbfix_rules::RuleSet;
    ///
    /// // every pathway needs a rule
    /// assert!(RuleSet::from_json(r#"{"CBB": [["K00855", "K01601"]]}"#).is_err());
    /// ```
    pub fn from_json(json: &str) -> Result<Self, Report> {
        let value: serde_json::Value =
            serde_json::from_str(json).wrap_err("Failed to parse pathway rules as JSON.")?;

        let rules = match value.get("pathway_list") {
            Some(list) => {
                let entries: Vec<PathwayEntry> = serde_json::from_value(list.clone())
                    .wrap_err("Failed to deserialize 'pathway_list' of pathway rules.")?;
                RuleSet::from_entries(entries)?
            }
            None => {
                let mapping: BTreeMap<String, serde_json::Value> = serde_json::from_value(value)
                    .wrap_err("Pathway rules must be a JSON object.")?;
                RuleSet::from_mapping(mapping)?
            }
        };

        RuleSet::new(rules)
    }

    fn from_mapping(
        mapping: BTreeMap<String, serde_json::Value>,
    ) -> Result<BTreeMap<Pathway, Rule>, Report> {
        mapping
            .into_iter()
            .map(|(name, alternatives)| {
                let pathway = Pathway::from_str(&name)?;
                let rule: Rule = serde_json::from_value(alternatives)
                    .wrap_err_with(|| format!("Invalid rule for pathway: {name}"))?;
                Ok((pathway, rule))
            })
            .collect()
    }

    fn from_entries(entries: Vec<PathwayEntry>) -> Result<BTreeMap<Pathway, Rule>, Report> {
        let mut rules = BTreeMap::new();
        for entry in entries {
            let pathway = Pathway::from_str(&entry.pathway_name)?;
            let rule = Rule::try_from(&entry.definition)
                .wrap_err_with(|| format!("Invalid definition for pathway: {pathway}"))?;
            if rules.insert(pathway, rule).is_some() {
                return Err(eyre!("Pathway is defined more than once: {pathway}"));
            }
        }
        Ok(rules)
    }

    /// Reads a [`RuleSet`] from a JSON file.
    ///
    /// ```rust
    /// use carbfix_rules::{RuleSet, BUILTIN_RULES};
    ///
    /// let file = tempfile::NamedTempFile::new()?;
    /// std::fs::write(file.path(), BUILTIN_RULES)?;
    /// assert_eq!(RuleSet::read(file.path())?, RuleSet::builtin()?);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn read<P>(path: P) -> Result<Self, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let json = std::fs::read_to_string(&path)
            .wrap_err_with(|| eyre!("Failed to read pathway rules: {path:?}"))?;
        RuleSet::from_json(&json).wrap_err_with(|| eyre!("Invalid pathway rules: {path:?}"))
    }

    /// Returns the [`RuleSet`] as pretty JSON in the mapping form.
    pub fn to_json(&self) -> Result<String, Report> {
        serde_json::to_string_pretty(self).wrap_err("Failed to serialize pathway rules.")
    }

    /// Returns the [`Rule`] of a [`Pathway`].
    pub fn get(&self, pathway: &Pathway) -> &Rule {
        // every pathway is present, checked by RuleSet::new
        &self.rules[pathway]
    }

    /// Returns the pathways and their rules in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&Pathway, &Rule)> {
        self.rules.iter()
    }

    /// Returns a [`Verdict`] for every [`Pathway`], in canonical order.
    pub fn evaluate(&self, observed: &BTreeSet<String>) -> Vec<Verdict> {
        self.rules
            .iter()
            .map(|(pathway, rule)| Verdict { pathway: *pathway, present: rule.evaluate(observed) })
            .collect()
    }
}
