//! Option overrides a recipe applies to its dependencies.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::RecipeError;

/// The value assigned to a package option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

/// `package:option=value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionOverride {
    pub package: String,
    pub option: String,
    pub value: OptionValue,
}

impl fmt::Display for OptionOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}={}", self.package, self.option, self.value)
    }
}

/// Every option assignment a recipe makes, in the order it makes them.
///
/// Assignments are kept as written so that conflicts stay visible; use
/// [`DependencyOptions::effective`] for the merged view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyOptions {
    assignments: Vec<OptionOverride>,
}

impl DependencyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &mut self,
        package: impl Into<String>,
        option: impl Into<String>,
        value: impl Into<OptionValue>,
    ) {
        self.assignments.push(OptionOverride {
            package: package.into(),
            option: option.into(),
            value: value.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionOverride> {
        self.assignments.iter()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Assignments targeting `package`.
    pub fn for_package<'a>(&'a self, package: &'a str) -> impl Iterator<Item = &'a OptionOverride> {
        self.assignments.iter().filter(move |o| o.package == package)
    }

    /// The value `package:option` ends up with, if any.
    pub fn get(&self, package: &str, option: &str) -> Option<&OptionValue> {
        self.assignments
            .iter()
            .rev()
            .find(|o| o.package == package && o.option == option)
            .map(|o| &o.value)
    }

    /// Pairs of assignments that give the same option different values.
    pub fn conflicts(&self) -> Vec<(&OptionOverride, &OptionOverride)> {
        let mut first_seen: BTreeMap<(&str, &str), &OptionOverride> = BTreeMap::new();
        let mut conflicts = Vec::new();
        for assignment in &self.assignments {
            let key = (assignment.package.as_str(), assignment.option.as_str());
            match first_seen.entry(key) {
                Entry::Occupied(first) => {
                    if first.get().value != assignment.value {
                        conflicts.push((*first.get(), assignment));
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(assignment);
                }
            }
        }
        conflicts
    }

    /// Merge all assignments, keyed by `(package, option)`.
    ///
    /// Repeating an assignment with the same value is fine; a different
    /// value is an error.
    pub fn effective(&self) -> Result<BTreeMap<(String, String), OptionValue>, RecipeError> {
        if let Some((first, second)) = self.conflicts().into_iter().next() {
            return Err(RecipeError::OptionConflict {
                package: first.package.clone(),
                option: first.option.clone(),
                first: first.value.clone(),
                second: second.value.clone(),
            });
        }

        Ok(self
            .assignments
            .iter()
            .map(|o| ((o.package.clone(), o.option.clone()), o.value.clone()))
            .collect())
    }
}
