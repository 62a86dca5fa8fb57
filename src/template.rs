//! Path template resolution.
//!
//! A template such as `/report/salesrange/{mineral}` carries `{name}` placeholders
//! that are replaced with caller-supplied values before a request is issued.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::query::ParamValues;
use crate::types::ParamSpec;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

/// Result of substituting values into a path template
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: String,
    /// Required placeholders that are still unresolved, in template order.
    pub missing: Vec<String>,
    /// Declared url params that never appear in the template.
    pub stray: Vec<String>,
}

impl ResolvedPath {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Placeholder names in order of first appearance, without duplicates.
pub fn placeholder_names(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Substitute every placeholder that has a non-blank value; report the required ones left over.
pub fn resolve_path(template: &str, values: &ParamValues, specs: &[ParamSpec]) -> ResolvedPath {
    let names = placeholder_names(template);

    // Single pass over the template; substituted values are never rescanned.
    let path = PLACEHOLDER
        .replace_all(template, |caps: &Captures| match filled(values, &caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned();

    let missing = names
        .iter()
        .filter(|name| filled(values, name).is_none())
        .filter(|name| specs.iter().any(|s| s.required && &s.name == *name))
        .cloned()
        .collect();

    let stray = specs
        .iter()
        .filter(|s| !names.contains(&s.name))
        .map(|s| s.name.clone())
        .collect();

    ResolvedPath {
        path,
        missing,
        stray,
    }
}

fn filled<'a>(values: &'a ParamValues, name: &str) -> Option<&'a str> {
    values.get(name).filter(|v| !v.trim().is_empty())
}
