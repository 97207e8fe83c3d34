//! Script variables
//!
//! Holds the values produced by assignment lines (`name=command ...`).
//! One store lives for a whole run and may be shared by several scripts
//! executed in sequence, so values assigned in one script are visible to
//! the next.

use std::collections::HashMap;

/// Mapping of variable names to their last assigned textual value.
///
/// Insertion order is kept so diagnostic dumps are deterministic; lookup
/// goes through an index for O(1) access.
#[derive(Default)]
pub struct Variables {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, replacing any previous binding.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(&idx) = self.index.get(&name) {
            self.entries[idx].1 = value;
        } else {
            let idx = self.entries.len();
            self.entries.push((name.clone(), value));
            self.index.insert(name, idx);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(|&idx| self.entries[idx].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut vars = Variables::new();
        vars.set("a", "HELLO");
        assert_eq!(vars.get("a"), Some("HELLO"));
        assert!(vars.contains("a"));
        assert!(!vars.contains("b"));
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut vars = Variables::new();
        vars.set("a", "1");
        vars.set("b", "2");
        vars.set("a", "3");
        assert_eq!(vars.get("a"), Some("3"));
        let order: Vec<&str> = vars.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(vars.len(), 2);
    }
}
