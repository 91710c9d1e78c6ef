//! Condition compiler: condition tree -> parameterized SQL fragment.
//!
//! [`Compiler::compile`] is a recursive-descent transform. It emits a boolean
//! expression with named placeholders and binds every value into the
//! [`Session`]; the session's counter guarantees that no two placeholders in
//! one query build share a name.
//!
//! Placeholder names follow `prefix_counter_suffix`:
//!
//! | prefix | used for |
//! |--------|----------|
//! | `p`    | equality, comparisons, LIKE patterns |
//! | `in`   | each element of an `IN` / `NOT IN` list |
//! | `bet`  | `BETWEEN` bounds |
//! | `nbet` | `NOT BETWEEN` bounds |
//!
//! The prefix is only for readability in logs; uniqueness comes from the
//! counter.

use crate::condition::{Condition, Logic, Op};
use crate::config::CompilerConfig;
use crate::dialect::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::ident::Ident;
use crate::param::Session;
use crate::value::{ConditionValue, Value};

/// Translates [`Condition`] trees into SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compiler {
    /// Active SQL dialect.
    pub dialect: Dialect,
    /// Rewrite `LIKE` to `ILIKE` on PostgreSQL-family dialects.
    pub adapt_dialect: bool,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::from_config(&CompilerConfig::default())
    }
}

impl Compiler {
    /// Create a compiler for `dialect` with dialect adaptation enabled.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            adapt_dialect: true,
        }
    }

    /// Create a compiler from loaded configuration.
    pub fn from_config(config: &CompilerConfig) -> Self {
        Self {
            dialect: config.dialect,
            adapt_dialect: config.adapt_dialect,
        }
    }

    /// Toggle the LIKE -> ILIKE rewrite.
    pub fn adapt_dialect(mut self, enabled: bool) -> Self {
        self.adapt_dialect = enabled;
        self
    }

    /// Compile `condition`, binding its values into `session`.
    ///
    /// The returned fragment is not wrapped in parentheses; nested logical
    /// groups inside it are.
    pub fn compile(&self, condition: &Condition, session: &mut Session) -> BuildResult<String> {
        let mut out = String::new();
        let bound = session.params().len();
        let result = self.write_condition(condition, session, &mut out);
        if let Err(ref _err) = result {
            // No SQL was produced, so nothing may stay bound.
            session.rollback_params(bound);
            #[cfg(feature = "tracing")]
            tracing::warn!(target: "condql.compile", error = %_err, "rejected condition");
        }
        result.map(|()| out)
    }

    fn write_condition(
        &self,
        condition: &Condition,
        session: &mut Session,
        out: &mut String,
    ) -> BuildResult<()> {
        match condition {
            Condition::Map(entries) => {
                if entries.is_empty() {
                    return Err(BuildError::malformed("empty column map"));
                }
                for (i, (column, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" AND ");
                    }
                    self.write_equality(column, value, session, out);
                }
                Ok(())
            }
            Condition::Equality { column, value } => {
                self.write_equality(column, value, session, out);
                Ok(())
            }
            Condition::IsNull { column } => {
                column.write_sql(out);
                out.push_str(" IS NULL");
                Ok(())
            }
            Condition::Comparison { column, op, value } => {
                self.write_comparison(column, *op, value, session, out)
            }
            Condition::Like {
                column,
                pattern,
                negated,
            } => self.write_like(column, pattern, *negated, session, out),
            Condition::Logical { logic, conditions } => {
                self.write_logical(*logic, conditions, session, out)
            }
            Condition::Raw { sql, params } => {
                for (name, value) in params {
                    session.bind_named(name, value.clone())?;
                }
                out.push_str(sql);
                Ok(())
            }
        }
    }

    fn write_equality(
        &self,
        column: &Ident,
        value: &ConditionValue,
        session: &mut Session,
        out: &mut String,
    ) {
        match value {
            ConditionValue::Null => {
                column.write_sql(out);
                out.push_str(" IS NULL");
            }
            ConditionValue::Scalar(v) => {
                let placeholder = session.bind("p", &column.to_sql(), v.clone());
                column.write_sql(out);
                out.push_str(" = ");
                out.push_str(&placeholder);
            }
            ConditionValue::List(values) => write_membership(column, false, values, session, out),
        }
    }

    fn write_comparison(
        &self,
        column: &Ident,
        op: Op,
        value: &ConditionValue,
        session: &mut Session,
        out: &mut String,
    ) -> BuildResult<()> {
        match op {
            Op::In | Op::NotIn => {
                let ConditionValue::List(values) = value else {
                    return Err(BuildError::malformed(format!(
                        "{op} on '{column}' expects a list value, got {}",
                        value.shape()
                    )));
                };
                write_membership(column, op == Op::NotIn, values, session, out);
                Ok(())
            }
            Op::Between | Op::NotBetween => {
                let bounds = match value {
                    ConditionValue::List(values) if values.len() == 2 => values,
                    ConditionValue::List(values) => {
                        return Err(BuildError::malformed(format!(
                            "{op} on '{column}' expects exactly 2 values, got {}",
                            values.len()
                        )));
                    }
                    other => {
                        return Err(BuildError::malformed(format!(
                            "{op} on '{column}' expects a 2-element list, got {}",
                            other.shape()
                        )));
                    }
                };
                let prefix = if op == Op::Between { "bet" } else { "nbet" };
                let col = column.to_sql();
                let from = session.bind(prefix, &col, bounds[0].clone());
                let to = session.bind(prefix, &col, bounds[1].clone());
                out.push_str(&col);
                out.push(' ');
                out.push_str(op.as_sql());
                out.push(' ');
                out.push_str(&from);
                out.push_str(" AND ");
                out.push_str(&to);
                Ok(())
            }
            _ => {
                let bound = match value {
                    ConditionValue::Null => Value::Null,
                    ConditionValue::Scalar(v) => v.clone(),
                    ConditionValue::List(_) => {
                        return Err(BuildError::malformed(format!(
                            "{op} on '{column}' expects a single value, got a list"
                        )));
                    }
                };
                let placeholder = session.bind("p", &column.to_sql(), bound);
                column.write_sql(out);
                out.push(' ');
                out.push_str(op.as_sql());
                out.push(' ');
                out.push_str(&placeholder);
                Ok(())
            }
        }
    }

    fn write_like(
        &self,
        column: &Ident,
        pattern: &Value,
        negated: bool,
        session: &mut Session,
        out: &mut String,
    ) -> BuildResult<()> {
        let text = pattern.to_text().ok_or_else(|| {
            BuildError::malformed(format!("LIKE pattern for '{column}' cannot be null"))
        })?;
        let text = if text.contains('%') {
            text
        } else {
            format!("%{text}%")
        };

        let keyword = match (negated, self.case_insensitive_like()) {
            (false, false) => "LIKE",
            (false, true) => "ILIKE",
            (true, false) => "NOT LIKE",
            (true, true) => "NOT ILIKE",
        };

        let placeholder = session.bind("p", &column.to_sql(), Value::Text(text));
        column.write_sql(out);
        out.push(' ');
        out.push_str(keyword);
        out.push(' ');
        out.push_str(&placeholder);
        Ok(())
    }

    fn write_logical(
        &self,
        logic: Logic,
        conditions: &[Condition],
        session: &mut Session,
        out: &mut String,
    ) -> BuildResult<()> {
        if conditions.is_empty() {
            return Err(BuildError::malformed(format!(
                "{} group has no conditions",
                logic.as_sql()
            )));
        }
        for (i, child) in conditions.iter().enumerate() {
            if i > 0 {
                out.push_str(logic.separator());
            }
            self.write_nested(child, session, out)?;
        }
        Ok(())
    }

    /// Write a child of a group, parenthesizing nested groups.
    pub(crate) fn write_nested(
        &self,
        condition: &Condition,
        session: &mut Session,
        out: &mut String,
    ) -> BuildResult<()> {
        if condition.is_group() {
            out.push('(');
            self.write_condition(condition, session, out)?;
            out.push(')');
            Ok(())
        } else {
            self.write_condition(condition, session, out)
        }
    }

    fn case_insensitive_like(&self) -> bool {
        self.adapt_dialect && self.dialect.is_postgres_family()
    }
}

/// `column IN (:in_1_col, :in_2_col, ...)`, or a constant for empty lists.
fn write_membership(
    column: &Ident,
    negated: bool,
    values: &[Value],
    session: &mut Session,
    out: &mut String,
) {
    if values.is_empty() {
        // Nothing is IN an empty set; everything is NOT IN it.
        out.push_str(if negated { "1=1" } else { "1=0" });
        return;
    }
    let col = column.to_sql();
    out.push_str(&col);
    out.push_str(if negated { " NOT IN (" } else { " IN (" });
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let placeholder = session.bind("in", &col, value.clone());
        out.push_str(&placeholder);
    }
    out.push(')');
}
