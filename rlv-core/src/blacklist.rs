//! Case-insensitive set of disabled behavior names (spec.md §3 "Blacklist").

use std::collections::HashSet;

#[derive(Debug, Default, Clone)]
pub struct Blacklist {
    names: HashSet<String>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I: IntoIterator<Item = S>, S: AsRef<str>>(names: I) -> Self {
        let mut bl = Self::new();
        for n in names {
            bl.add(n.as_ref());
        }
        bl
    }

    pub fn add(&mut self, name: &str) {
        self.names.insert(name.to_ascii_lowercase());
    }

    pub fn remove(&mut self, name: &str) {
        self.names.remove(&name.to_ascii_lowercase());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_lowercase())
    }

    /// Names matching `substr` (case-insensitive), `,`-joined in insertion
    /// order — used by `@getblacklist` (spec.md §4.6).
    pub fn matching(&self, substr: &str) -> Vec<&str> {
        let needle = substr.to_ascii_lowercase();
        let mut out: Vec<&str> = self
            .names
            .iter()
            .filter(|n| n.contains(&needle))
            .map(|s| s.as_str())
            .collect();
        out.sort_unstable();
        out
    }

    /// Every disabled name, sorted — used by `@versionnumbl`.
    pub fn all_sorted(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.names.iter().map(|s| s.as_str()).collect();
        out.sort_unstable();
        out
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}
