//! Recipe validation.
//!
//! `check_recipe` validates a single revision; `check_history` compares
//! consecutive revisions. Both report every problem they find instead of
//! stopping at the first.

use std::collections::BTreeSet;

use crate::core::requirement::validate_package_name;
use crate::core::{Recipe, SettingsAxis};
use crate::util::diagnostic::Diagnostic;

/// Validate one recipe.
pub fn check_recipe(recipe: &Recipe) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let located = |diag: Diagnostic| diag.with_location(recipe.path.clone());

    // Settings axes
    let mut seen_axes = BTreeSet::new();
    for axis in &recipe.settings {
        if !seen_axes.insert(*axis) {
            diagnostics.push(located(Diagnostic::error(format!(
                "settings axis `{}` is declared more than once",
                axis
            ))));
        }
    }
    for axis in SettingsAxis::ALL {
        if !seen_axes.contains(&axis) {
            diagnostics.push(located(
                Diagnostic::error(format!("settings axis `{}` is not declared", axis))
                    .with_suggestion(format!(
                        "Declare settings = [{}]",
                        SettingsAxis::ALL
                            .iter()
                            .map(|a| format!("\"{}\"", a))
                            .collect::<Vec<_>>()
                            .join(", ")
                    )),
            ));
        }
    }

    // Requirements
    let mut seen_requirements = BTreeSet::new();
    for req in &recipe.requirements {
        if let Err(e) = validate_package_name(req.name()) {
            diagnostics.push(located(Diagnostic::from_miette(&e)));
        }
        if !seen_requirements.insert(req.name()) {
            diagnostics.push(located(
                Diagnostic::error(format!("`{}` is required more than once", req.name()))
                    .with_suggestion("Keep a single requirement per package"),
            ));
        }
        if req.is_forced() && req.constraint().exact().is_none() {
            diagnostics.push(located(
                Diagnostic::warning(format!("forced requirement `{}` is a range", req))
                    .with_context("a forced pin normally names one version"),
            ));
        }
    }

    // Options
    for (first, second) in recipe.options.conflicts() {
        diagnostics.push(located(
            Diagnostic::error(format!(
                "option `{}:{}` is assigned conflicting values",
                first.package, first.option
            ))
            .with_context(format!("first assignment: {}", first))
            .with_context(format!("second assignment: {}", second))
            .with_suggestion("Remove one of the assignments"),
        ));
    }
    let mut unknown_packages = BTreeSet::new();
    for assignment in recipe.options.iter() {
        if !recipe.requires(&assignment.package)
            && unknown_packages.insert(assignment.package.as_str())
        {
            diagnostics.push(located(
                Diagnostic::warning(format!(
                    "options are set for `{}`, which is not a requirement",
                    assignment.package
                ))
                .with_context(format!("assignment: {}", assignment)),
            ));
        }
    }

    // Generators
    if recipe.generators.is_empty() && !recipe.has_generate_step() {
        diagnostics.push(located(Diagnostic::warning(
            "no generators are declared and there is no generate step",
        )));
    }
    let mut seen_generators = BTreeSet::new();
    for generator in &recipe.generators {
        if !seen_generators.insert(*generator) {
            diagnostics.push(located(Diagnostic::warning(format!(
                "generator `{}` is listed more than once",
                generator
            ))));
        }
    }

    tracing::debug!(
        "checked revision {}: {} diagnostics",
        recipe.revision,
        diagnostics.len()
    );
    diagnostics
}

/// Compare consecutive revisions.
///
/// Revision numbers must increase, and an exact pin that goes down from
/// one revision to the next is reported as a pin regression.
pub fn check_history(recipes: &[Recipe]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for pair in recipes.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);

        if next.revision <= prev.revision {
            diagnostics.push(
                Diagnostic::error(format!(
                    "revision {} follows revision {}",
                    next.revision, prev.revision
                ))
                .with_location(next.path.clone()),
            );
        }

        for req in &next.requirements {
            let Some(new_pin) = req.constraint().exact() else {
                continue;
            };
            let Some(old_pin) = prev
                .requirement(req.name())
                .and_then(|r| r.constraint().exact())
            else {
                continue;
            };

            if new_pin < old_pin {
                diagnostics.push(
                    Diagnostic::warning(format!("pin regression for `{}`", req.name()))
                        .with_location(next.path.clone())
                        .with_context(format!("revision {} pins {}", prev.revision, old_pin))
                        .with_context(format!("revision {} pins {}", next.revision, new_pin))
                        .with_suggestion(format!(
                            "Pin `{}` to {} or newer unless the downgrade is intended",
                            req.name(),
                            old_pin
                        )),
                );
            }
        }
    }

    diagnostics
}
