//! Sequential WHERE-clause accumulator.
//!
//! Conditions appended one after another are joined with `AND` unless a
//! connector is given. A standalone `AND`/`OR` token set with
//! [`WhereClause::token`] overrides the connector for the next condition only.

use crate::compiler::Compiler;
use crate::condition::{Condition, Logic};
use crate::error::BuildResult;
use crate::param::Session;

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    connector: Logic,
    condition: Condition,
}

/// Ordered list of conditions with their connectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    entries: Vec<Entry>,
    pending: Option<Logic>,
}

impl WhereClause {
    /// Create an empty clause.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no condition has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Append with the default connector (or a pending token, if set).
    pub fn push(&mut self, condition: Condition) {
        let connector = self.pending.take().unwrap_or(Logic::And);
        self.entries.push(Entry {
            connector,
            condition,
        });
    }

    /// Append joined with `AND`.
    pub fn and(&mut self, condition: Condition) {
        self.pending = None;
        self.entries.push(Entry {
            connector: Logic::And,
            condition,
        });
    }

    /// Append joined with `OR`.
    pub fn or(&mut self, condition: Condition) {
        self.pending = None;
        self.entries.push(Entry {
            connector: Logic::Or,
            condition,
        });
    }

    /// Set a one-shot connector for the next [`push`](Self::push).
    pub fn token(&mut self, logic: Logic) {
        self.pending = Some(logic);
    }

    /// Drop all conditions. Sessions are untouched.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pending = None;
    }

    /// Compile to a fragment (without the `WHERE` keyword).
    ///
    /// The first connector is ignored. Logical groups are parenthesized.
    pub fn compile(&self, compiler: &Compiler, session: &mut Session) -> BuildResult<String> {
        let mut out = String::new();
        let bound = session.params().len();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push_str(entry.connector.separator());
            }
            if let Err(err) = compiler.write_nested(&entry.condition, session, &mut out) {
                session.rollback_params(bound);
                return Err(err);
            }
        }
        Ok(out)
    }
}
