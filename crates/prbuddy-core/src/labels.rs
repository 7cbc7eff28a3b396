// SPDX-License-Identifier: Apache-2.0

//! Label aggregation across selected issues.
//!
//! Labels are compared as exact strings: `Bug` and `bug` are different labels,
//! and surrounding whitespace is significant.

use serde::Serialize;

use crate::github::issues::Issue;

/// Ordered, duplicate-free set of label names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelSet(Vec<String>);

impl LabelSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `label` unless it is already present. Returns true if added.
    pub fn insert(&mut self, label: &str) -> bool {
        if self.contains(label) {
            return false;
        }
        self.0.push(label.to_string());
        true
    }

    /// Returns true if `label` is present.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when there are no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Labels in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterates labels in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<'a> FromIterator<&'a str> for LabelSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

/// Unions the labels of `issues`, first-seen order.
#[must_use]
pub fn aggregate(issues: &[Issue]) -> LabelSet {
    issues
        .iter()
        .flat_map(|issue| issue.labels.iter().map(String::as_str))
        .collect()
}
