use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::CheckStatus;

/// Outcome of every check for one run, keyed by check id.
///
/// Iteration is sorted by id so summaries and logs are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckResults {
    results: BTreeMap<&'static str, bool>,
}

impl CheckResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &'static str, passed: bool) {
        self.results.insert(id, passed);
    }

    pub fn get(&self, id: &str) -> Option<bool> {
        self.results.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.results.iter().map(|(id, passed)| (*id, *passed))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.values().filter(|passed| **passed).count()
    }

    pub fn outcomes(&self) -> Vec<CheckOutcome> {
        self.iter()
            .map(|(id, passed)| CheckOutcome {
                id: id.to_string(),
                passed,
                status: CheckStatus::from_passed(passed),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub id: String,
    pub passed: bool,
    pub status: CheckStatus,
}
