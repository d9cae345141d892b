use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Keyword assignments for one site root.
///
/// `map` is append-only: a page keeps the first keyword it was given.
/// Every keyword in `map` is also present in `used_set`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationState {
    #[serde(default)]
    pub map: IndexMap<String, String>,
    #[serde(default)]
    pub used_set: Vec<String>,
}

impl AllocationState {
    pub fn keyword_for(&self, page: &str) -> Option<&str> {
        self.map.get(page).map(String::as_str)
    }

    /// Records a new assignment. Returns `false` and leaves the state untouched
    /// when the page already has a keyword.
    pub fn record(&mut self, page: &str, keyword: &str) -> bool {
        if self.map.contains_key(page) {
            return false;
        }
        self.map.insert(page.to_string(), keyword.to_string());
        self.used_set.push(keyword.to_string());
        true
    }

    pub fn used_lookup(&self) -> HashSet<&str> {
        self.used_set.iter().map(String::as_str).collect()
    }
}
