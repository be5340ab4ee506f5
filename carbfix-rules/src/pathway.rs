use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};

/// A carbon-fixation [`Pathway`].
///
/// Variants are declared in the canonical output order, which is also their
/// [`Ord`] order and the order of [`Pathway::iter`](strum::IntoEnumIterator::iter).
///
/// ```rust
/// use carbfix_rules::Pathway;
/// use strum::IntoEnumIterator;
///
/// let names: Vec<_> = Pathway::iter().map(|p| p.to_string()).collect();
/// assert_eq!(names, ["CBB", "rTCA", "WL", "3HP", "3HP/4HB", "DC/4HB", "rGly"]);
/// ```
#[derive(Clone, Copy, Debug, Deserialize, EnumIter, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Pathway {
    /// Calvin-Benson-Bassham cycle.
    #[serde(rename = "CBB")]
    CalvinBensonBassham,
    /// Reductive tricarboxylic acid cycle.
    #[serde(rename = "rTCA")]
    ReductiveTca,
    /// Wood-Ljungdahl (reductive acetyl-CoA) pathway.
    #[serde(rename = "WL")]
    WoodLjungdahl,
    /// 3-hydroxypropionate bicycle.
    #[serde(rename = "3HP")]
    Hydroxypropionate,
    /// 3-hydroxypropionate/4-hydroxybutyrate cycle.
    #[serde(rename = "3HP/4HB")]
    HydroxypropionateHydroxybutyrate,
    /// Dicarboxylate/4-hydroxybutyrate cycle.
    #[serde(rename = "DC/4HB")]
    DicarboxylateHydroxybutyrate,
    /// Reductive glycine pathway.
    #[serde(rename = "rGly")]
    ReductiveGlycine,
}

impl Pathway {
    /// Returns the short identifier used in rule files and verdict output.
    pub fn name(&self) -> &'static str {
        match self {
            Pathway::CalvinBensonBassham => "CBB",
            Pathway::ReductiveTca => "rTCA",
            Pathway::WoodLjungdahl => "WL",
            Pathway::Hydroxypropionate => "3HP",
            Pathway::HydroxypropionateHydroxybutyrate => "3HP/4HB",
            Pathway::DicarboxylateHydroxybutyrate => "DC/4HB",
            Pathway::ReductiveGlycine => "rGly",
        }
    }
}

impl Display for Pathway {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Pathway {
    type Err = Report;

    /// Returns a [`Pathway`] converted from its short identifier.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use carbfix_rules::Pathway;
    /// use std::str::FromStr;
    ///
    /// assert_eq!(Pathway::CalvinBensonBassham, Pathway::from_str("CBB")?);
    /// assert_eq!(Pathway::HydroxypropionateHydroxybutyrate, Pathway::from_str("3HP/4HB")?);
    /// assert!(Pathway::from_str("cbb").is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    fn from_str(name: &str) -> Result<Self, Report> {
        Pathway::iter().find(|p| p.name() == name).ok_or_else(|| {
            eyre!("Unknown pathway name: {name:?}")
                .suggestion(format!("Please choose from: {}", Pathway::iter().join(", ")))
        })
    }
}
