//! Named -> positional placeholder rewriting.
//!
//! Executors such as `tokio-postgres` only understand positional parameters.
//! [`to_positional`] rewrites every `:name` placeholder into `$n` (Postgres) or
//! `?` (MySQL / SQLite) and lines the bound values up in the matching order.
//! Quoted strings, quoted identifiers and `::` casts are left untouched.

use crate::dialect::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::param::ParamSet;
use crate::value::Value;
use tokio_postgres::types::ToSql;

/// SQL text with positional placeholders plus the values to bind, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionalQuery {
    pub sql: String,
    pub values: Vec<Value>,
}

impl PositionalQuery {
    /// Get all values as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
    }
}

/// Rewrite `sql` for `dialect`, resolving names against `params`.
///
/// With `$n` placeholders a name used twice reuses its index; with `?` the
/// value is bound once per occurrence.
pub fn to_positional(sql: &str, params: &ParamSet, dialect: Dialect) -> BuildResult<PositionalQuery> {
    let numbered = dialect.numbered_placeholders();
    let mut out = String::with_capacity(sql.len());
    let mut values: Vec<Value> = Vec::new();
    let mut assigned: Vec<(&str, usize)> = Vec::new();

    let mut chars = sql.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                out.push(c);
                // Copy through the closing quote; doubled quotes stay inside.
                while let Some((_, inner)) = chars.next() {
                    out.push(inner);
                    if inner == c {
                        if chars.peek().map(|(_, n)| *n) == Some(c) {
                            if let Some((_, escaped)) = chars.next() {
                                out.push(escaped);
                            }
                            continue;
                        }
                        break;
                    }
                }
            }
            ':' => match chars.peek().map(|(_, n)| *n) {
                Some(':') => {
                    out.push_str("::");
                    chars.next();
                }
                Some(n) if n == '_' || n.is_ascii_alphabetic() => {
                    let start = i + 1;
                    let mut end = start;
                    while let Some(&(j, n)) = chars.peek() {
                        if n == '_' || n.is_ascii_alphanumeric() {
                            end = j + n.len_utf8();
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    let name = &sql[start..end];
                    let value = params.get(name).ok_or_else(|| {
                        BuildError::malformed(format!("placeholder ':{name}' has no bound value"))
                    })?;

                    if numbered {
                        let idx = match assigned.iter().find(|(n, _)| *n == name) {
                            Some((_, idx)) => *idx,
                            None => {
                                values.push(value.clone());
                                assigned.push((name, values.len()));
                                values.len()
                            }
                        };
                        out.push('$');
                        out.push_str(&idx.to_string());
                    } else {
                        values.push(value.clone());
                        out.push('?');
                    }
                }
                _ => out.push(c),
            },
            _ => out.push(c),
        }
    }

    Ok(PositionalQuery { sql: out, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, Value)]) -> ParamSet {
        let mut set = ParamSet::new();
        for (n, v) in pairs {
            set.insert(*n, v.clone()).unwrap();
        }
        set
    }

    #[test]
    fn numbered_for_postgres() {
        let p = params(&[("p_1_a", Value::Int(1)), ("in_2_b", Value::Int(2))]);
        let q = to_positional("a = :p_1_a AND b IN (:in_2_b)", &p, Dialect::Postgres).unwrap();
        assert_eq!(q.sql, "a = $1 AND b IN ($2)");
        assert_eq!(q.values, [Value::Int(1), Value::Int(2)]);
        assert_eq!(q.params_ref().len(), 2);
    }

    #[test]
    fn question_marks_for_mysql() {
        let p = params(&[("x", Value::from("v"))]);
        let q = to_positional("a = :x OR b = :x", &p, Dialect::MySql).unwrap();
        assert_eq!(q.sql, "a = ? OR b = ?");
        assert_eq!(q.values.len(), 2);
    }

    #[test]
    fn repeated_name_reuses_index() {
        let p = params(&[("x", Value::Int(5))]);
        let q = to_positional("a = :x OR b = :x", &p, Dialect::Postgres).unwrap();
        assert_eq!(q.sql, "a = $1 OR b = $1");
        assert_eq!(q.values, [Value::Int(5)]);
    }

    #[test]
    fn skips_casts_and_literals() {
        let p = params(&[("x", Value::Int(1))]);
        let q = to_positional(
            "a::text = ':not_a_param' AND \"col:x\" = :x AND t = 'it''s :x'",
            &p,
            Dialect::Postgres,
        )
        .unwrap();
        assert_eq!(
            q.sql,
            "a::text = ':not_a_param' AND \"col:x\" = $1 AND t = 'it''s :x'"
        );
    }

    #[test]
    fn unknown_placeholder_is_error() {
        let err = to_positional("a = :missing", &ParamSet::new(), Dialect::Sqlite).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn lone_colon_passes_through() {
        let q = to_positional("SELECT ':' || x, a : b", &ParamSet::new(), Dialect::MySql).unwrap();
        assert_eq!(q.sql, "SELECT ':' || x, a : b");
    }
}
