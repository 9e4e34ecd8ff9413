use std::collections::BTreeMap;

use crate::rules::{builtin_rule_targets, normalize_rule_id};

/// Document element names that say nothing about where an issue is.
pub const DEFAULT_ROOT_ELEMENTS: &[&str] = &[
    "Invoice",
    "CreditNote",
    "StandardBusinessDocument",
    "ApplicationResponse",
    "Order",
    "DespatchAdvice",
];

/// Tuning for the issue mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperOptions {
    /// Names never used as an issue target.
    pub root_elements: Vec<String>,
    /// Upper-cased rule id to target element names.
    pub rule_targets: BTreeMap<String, Vec<String>>,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            root_elements: DEFAULT_ROOT_ELEMENTS
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            rule_targets: builtin_rule_targets(),
        }
    }
}

impl MapperOptions {
    /// Replace the root element list.
    #[must_use]
    pub fn with_root_elements(mut self, roots: Vec<String>) -> Self {
        self.root_elements = roots;
        self
    }

    /// Add or override rule targets; ids are matched case-insensitively.
    #[must_use]
    pub fn with_rule_targets<I>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        for (id, names) in targets {
            self.rule_targets.insert(normalize_rule_id(&id), names);
        }
        self
    }

    pub fn targets_for(&self, rule_id: &str) -> Option<&[String]> {
        self.rule_targets
            .get(&normalize_rule_id(rule_id))
            .map(Vec::as_slice)
    }

    pub fn is_root(&self, name: &str) -> bool {
        self.root_elements.iter().any(|root| root == name)
    }
}
