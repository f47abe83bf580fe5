//! src/counters.rs
use std::collections::BTreeMap;

/// Named monotonic counters. Each task attempt keeps its own set; the job
/// sums the sets of successful attempts once every task has completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    values: BTreeMap<&'static str, u64>,
}

impl Counters {
    pub fn increment(&mut self, name: &'static str, by: u64) {
        *self.values.entry(name).or_default() += by;
    }

    /// Unset counters read as zero.
    pub fn get(&self, name: &str) -> u64 {
        self.values.get(name).copied().unwrap_or_default()
    }

    pub fn merge(&mut self, other: &Counters) {
        for (name, value) in &other.values {
            self.increment(*name, *value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.values.iter().map(|(name, value)| (*name, *value))
    }
}
