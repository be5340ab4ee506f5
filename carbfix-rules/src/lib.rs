#![doc = include_str!("../README.md")]

pub mod expression;
mod pathway;
mod rule;
mod rule_set;

#[doc(inline)]
pub use expression::{Expression, Operator};
#[doc(inline)]
pub use pathway::Pathway;
#[doc(inline)]
pub use rule::Rule;
#[doc(inline)]
pub use rule_set::{RuleSet, Verdict};

/// Built-in pathway rules, in the mapping form.
pub const BUILTIN_RULES: &str = include_str!("../data/carbon_fixation.json");
