//! Named parameters and the per-build placeholder session.

use crate::error::{BuildError, BuildResult};
use crate::value::Value;
use std::collections::HashSet;

/// An ordered mapping from placeholder name to bound value.
///
/// Insertion order equals the order the placeholders appear in the emitted SQL
/// text. Names are unique; an existing entry is never overwritten or removed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamSet {
    entries: Vec<(String, Value)>,
    names: HashSet<String>,
}

impl ParamSet {
    /// Create a new empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` under `name`.
    ///
    /// Fails with [`BuildError::DuplicateParameter`] if the name is taken.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> BuildResult<()> {
        let name = name.into();
        if !self.names.insert(name.clone()) {
            return Err(BuildError::DuplicateParameter(name));
        }
        self.entries.push((name, value));
        Ok(())
    }

    /// Look up a bound value by name (without the leading `:`).
    pub fn get(&self, name: &str) -> Option<&Value> {
        if !self.names.contains(name) {
            return None;
        }
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, value)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Placeholder names in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Bound values in binding order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Drop every entry bound after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        for (name, _) in self.entries.drain(len.min(self.entries.len())..) {
            self.names.remove(&name);
        }
    }

    /// Move every entry of `other` into this set, refusing duplicates.
    pub fn extend(&mut self, other: ParamSet) -> BuildResult<()> {
        for (name, value) in other.entries {
            self.insert(name, value)?;
        }
        Ok(())
    }
}

impl IntoIterator for ParamSet {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// The scope across which placeholder names are unique.
///
/// A session owns a monotonically increasing counter and the accumulated
/// [`ParamSet`]. One session belongs to exactly one query build; it is never
/// shared between builders.
#[derive(Clone, Debug, Default)]
pub struct Session {
    counter: u64,
    params: ParamSet,
}

impl Session {
    /// Create a fresh session with the counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counter value (the number of names minted so far).
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Parameters bound so far.
    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    /// Mint a placeholder for `column`, bind `value`, and return the
    /// placeholder text (including the leading `:`).
    pub fn bind(&mut self, prefix: &str, column: &str, value: Value) -> String {
        loop {
            self.counter += 1;
            let name = format!("{prefix}_{}_{}", self.counter, placeholder_suffix(column));
            // Raw fragments may have claimed a name with the same shape.
            if self.params.contains(&name) {
                continue;
            }
            let placeholder = format!(":{name}");
            // Unreachable failure: uniqueness was checked above.
            let _ = self.params.insert(name, value);
            return placeholder;
        }
    }

    /// Bind a caller-named parameter (from a raw fragment).
    pub fn bind_named(&mut self, name: &str, value: Value) -> BuildResult<()> {
        let name = name.strip_prefix(':').unwrap_or(name);
        self.params.insert(name, value)
    }

    /// Forget parameters bound after the first `len`. The counter is kept.
    pub(crate) fn rollback_params(&mut self, len: usize) {
        self.params.truncate(len);
    }

    /// Hand off the accumulated parameters. The counter is kept, so names
    /// minted afterwards never repeat earlier ones.
    pub fn take_params(&mut self) -> ParamSet {
        std::mem::take(&mut self.params)
    }

    /// Full session reset: counter back to zero and parameters dropped.
    pub fn reset(&mut self) {
        self.counter = 0;
        self.params = ParamSet::new();
    }
}

/// Column name with every character outside `[A-Za-z0-9_]` replaced by `_`.
fn placeholder_suffix(column: &str) -> String {
    column
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_order() {
        let mut params = ParamSet::new();
        params.insert("b", Value::Int(2)).unwrap();
        params.insert("a", Value::Int(1)).unwrap();
        let names: Vec<&str> = params.names().collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(params.get("a"), Some(&Value::Int(1)));
    }

    #[test]
    fn insert_refuses_duplicates() {
        let mut params = ParamSet::new();
        params.insert("a", Value::Int(1)).unwrap();
        let err = params.insert("a", Value::Int(9)).unwrap_err();
        assert_eq!(err, BuildError::DuplicateParameter("a".into()));
        assert_eq!(params.get("a"), Some(&Value::Int(1)));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn truncate_prunes_names() {
        let mut params = ParamSet::new();
        params.insert("a", Value::Int(1)).unwrap();
        params.insert("b", Value::Int(2)).unwrap();
        params.truncate(1);
        assert_eq!(params.len(), 1);
        assert!(!params.contains("b"));
        params.insert("b", Value::Int(3)).unwrap();
        params.truncate(10);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn session_names_are_monotonic() {
        let mut session = Session::new();
        assert_eq!(session.bind("p", "status", Value::Int(1)), ":p_1_status");
        assert_eq!(session.bind("in", "users.id", Value::Int(2)), ":in_2_users_id");
        assert_eq!(session.counter(), 2);
    }

    #[test]
    fn take_params_keeps_counter() {
        let mut session = Session::new();
        session.bind("p", "a", Value::Int(1));
        let taken = session.take_params();
        assert_eq!(taken.len(), 1);
        assert!(session.params().is_empty());
        assert_eq!(session.bind("p", "a", Value::Int(1)), ":p_2_a");
    }

    #[test]
    fn reset_clears_counter() {
        let mut session = Session::new();
        session.bind("p", "a", Value::Int(1));
        session.reset();
        assert_eq!(session.counter(), 0);
        assert!(session.params().is_empty());
        assert_eq!(session.bind("p", "a", Value::Int(1)), ":p_1_a");
    }

    #[test]
    fn minted_names_skip_raw_collisions() {
        let mut session = Session::new();
        session.bind_named(":p_1_a", Value::Int(0)).unwrap();
        assert_eq!(session.bind("p", "a", Value::Int(1)), ":p_2_a");
    }
}
