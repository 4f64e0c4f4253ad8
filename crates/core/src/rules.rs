//! Ordered extraction rules.
//!
//! Each priority chain in the engine is a static slice of [`Rule`]s. A rule is a pure
//! function from a read-only context to an optional [`Patch`]; the chain is evaluated in
//! table order and the first rule that fires wins.

use crate::config::Weights;
use crate::models::ExtractedInfo;

/// Partial update produced by a rule. `None` fields leave the record untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    pub year: Option<String>,
    pub month: Option<String>,
    pub grade: Option<String>,
    pub subject: Option<String>,
    pub subject_main: Option<String>,
    pub subject_sub: Option<String>,
    /// Extra confidence on top of the rule's own weight.
    pub bonus: f32,
}

impl Patch {
    pub fn year(value: impl Into<String>) -> Self {
        Self {
            year: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn month(value: impl Into<String>) -> Self {
        Self {
            month: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn subject(value: impl Into<String>) -> Self {
        Self {
            subject: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn with_year(mut self, value: Option<String>) -> Self {
        if value.is_some() {
            self.year = value;
        }
        self
    }

    pub fn with_month(mut self, value: Option<String>) -> Self {
        if value.is_some() {
            self.month = value;
        }
        self
    }

    pub fn with_bonus(mut self, bonus: f32) -> Self {
        self.bonus += bonus;
        self
    }

    /// Writes the set fields into `info` and adds `weight` plus the bonus to its confidence.
    pub fn apply_to(self, info: &mut ExtractedInfo, weight: f32) {
        if let Some(v) = self.year {
            info.year = v;
        }
        if let Some(v) = self.month {
            info.month = v;
        }
        if let Some(v) = self.grade {
            info.grade = v;
        }
        if let Some(v) = self.subject {
            info.subject = v;
        }
        if let Some(v) = self.subject_main {
            info.subject_main = v;
        }
        if let Some(v) = self.subject_sub {
            info.subject_sub = v;
        }
        info.add_confidence(weight + self.bonus);
    }
}

pub struct Rule<C: ?Sized> {
    pub name: &'static str,
    pub weight: fn(&Weights) -> f32,
    pub matcher: fn(&C) -> Option<Patch>,
}

/// Outcome of evaluating a chain: which rule fired and what it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired {
    pub rule: &'static str,
    pub weight: f32,
    pub patch: Patch,
}

impl Fired {
    pub fn apply_to(self, info: &mut ExtractedInfo) {
        self.patch.apply_to(info, self.weight);
    }
}

pub fn first_match<C: ?Sized>(rules: &[Rule<C>], ctx: &C, weights: &Weights) -> Option<Fired> {
    rules.iter().find_map(|rule| {
        (rule.matcher)(ctx).map(|patch| Fired {
            rule: rule.name,
            weight: (rule.weight)(weights),
            patch,
        })
    })
}

/// Every rule that would fire, in table order. Used to audit a chain against a sample.
pub fn evaluate<C: ?Sized>(rules: &[Rule<C>], ctx: &C) -> Vec<&'static str> {
    rules
        .iter()
        .filter(|rule| (rule.matcher)(ctx).is_some())
        .map(|rule| rule.name)
        .collect()
}
