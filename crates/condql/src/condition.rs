//! Condition trees for dynamic WHERE clauses.
//!
//! A [`Condition`] describes a SQL predicate before any text is generated.
//! Typed constructors validate identifiers up front; [`Condition::from_json`]
//! accepts the loosely-typed shapes used by request-driven filters:
//!
//! ```ignore
//! use condql::Condition;
//! use serde_json::json;
//!
//! // {"status": [1, 2], "deleted_at": null}  -> status IN (...) AND deleted_at IS NULL
//! // ["LIKE", "title", "foo"]                 -> title LIKE '%foo%'
//! // ["age", ">=", 18]                        -> age >= 18
//! // ["OR", {"a": 1}, ["AND", {"b": 2}, {"c": 3}]]
//! let cond = Condition::from_json(&json!(["OR", {"a": 1}, ["AND", {"b": 2}, {"c": 3}]]))?;
//! # Ok::<(), condql::BuildError>(())
//! ```

use crate::error::{BuildError, BuildResult};
use crate::ident::{Ident, IntoIdent};
use crate::value::{ConditionValue, Value};
use std::fmt;
use std::str::FromStr;

/// Comparison operator of an operator triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `=`
    Eq,
    /// `!=` (also parsed from `<>`)
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IN (list)`
    In,
    /// `NOT IN (list)`
    NotIn,
    /// `BETWEEN a AND b`
    Between,
    /// `NOT BETWEEN a AND b`
    NotBetween,
}

impl Op {
    /// SQL spelling of the operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Like => "LIKE",
            Op::NotLike => "NOT LIKE",
            Op::In => "IN",
            Op::NotIn => "NOT IN",
            Op::Between => "BETWEEN",
            Op::NotBetween => "NOT BETWEEN",
        }
    }
}

/// Collapse runs of whitespace and uppercase, so `not  like` == `NOT LIKE`.
fn normalize_token(token: &str) -> String {
    token
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

impl FromStr for Op {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "=" => Ok(Op::Eq),
            "!=" | "<>" => Ok(Op::Ne),
            "<" => Ok(Op::Lt),
            "<=" => Ok(Op::Lte),
            ">" => Ok(Op::Gt),
            ">=" => Ok(Op::Gte),
            "LIKE" => Ok(Op::Like),
            "NOT LIKE" => Ok(Op::NotLike),
            "IN" => Ok(Op::In),
            "NOT IN" => Ok(Op::NotIn),
            "BETWEEN" => Ok(Op::Between),
            "NOT BETWEEN" => Ok(Op::NotBetween),
            _ => Err(BuildError::unknown_operator(s)),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Boolean connective of a logical group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    /// The separator used when joining compiled children.
    pub fn separator(self) -> &'static str {
        match self {
            Logic::And => " AND ",
            Logic::Or => " OR ",
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

impl FromStr for Logic {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "AND" => Ok(Logic::And),
            "OR" => Ok(Logic::Or),
            _ => Err(BuildError::unknown_operator(s)),
        }
    }
}

/// A recursive condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Hash form: implicit AND of per-column equalities, in insertion order.
    Map(Vec<(Ident, ConditionValue)>),
    /// `column = value`; a list means membership, null means `IS NULL`.
    Equality { column: Ident, value: ConditionValue },
    /// `column IS NULL`
    IsNull { column: Ident },
    /// Operator triple `[column, op, value]`.
    Comparison {
        column: Ident,
        op: Op,
        value: ConditionValue,
    },
    /// Search form `[LIKE|NOT LIKE, column, value]` with auto-wildcards.
    Like {
        column: Ident,
        pattern: Value,
        negated: bool,
    },
    /// `[AND|OR, ...children]`
    Logical {
        logic: Logic,
        conditions: Vec<Condition>,
    },
    /// Pre-formed SQL with its own named parameters, opaque to the compiler.
    ///
    /// # Safety
    /// Be careful with SQL injection when using raw conditions.
    Raw { sql: String, params: Vec<(String, Value)> },
}

impl Condition {
    // ==================== Constructors ====================

    /// Hash form from `(column, value)` pairs.
    pub fn map<I, C, V>(entries: I) -> BuildResult<Self>
    where
        I: IntoIterator<Item = (C, V)>,
        C: IntoIdent,
        V: Into<ConditionValue>,
    {
        let entries = entries
            .into_iter()
            .map(|(c, v)| Ok((c.into_ident()?, v.into())))
            .collect::<BuildResult<Vec<_>>>()?;
        Ok(Condition::Map(entries))
    }

    /// Equality: `column = value` (list -> `IN`, null -> `IS NULL`).
    pub fn eq<I: IntoIdent>(column: I, value: impl Into<ConditionValue>) -> BuildResult<Self> {
        Ok(Condition::Equality {
            column: column.into_ident()?,
            value: value.into(),
        })
    }

    /// `column IS NULL`
    pub fn is_null<I: IntoIdent>(column: I) -> BuildResult<Self> {
        Ok(Condition::IsNull {
            column: column.into_ident()?,
        })
    }

    /// Operator triple with an already-parsed operator.
    pub fn cmp<I: IntoIdent>(
        column: I,
        op: Op,
        value: impl Into<ConditionValue>,
    ) -> BuildResult<Self> {
        Ok(Condition::Comparison {
            column: column.into_ident()?,
            op,
            value: value.into(),
        })
    }

    /// Operator triple from a textual operator token, e.g. `"not in"`.
    pub fn op<I: IntoIdent>(
        column: I,
        op: &str,
        value: impl Into<ConditionValue>,
    ) -> BuildResult<Self> {
        Self::cmp(column, op.parse()?, value)
    }

    /// `column IN (values...)`
    pub fn in_list<I, T>(column: I, values: impl IntoIterator<Item = T>) -> BuildResult<Self>
    where
        I: IntoIdent,
        T: Into<Value>,
    {
        Self::cmp(column, Op::In, ConditionValue::list(values))
    }

    /// `column NOT IN (values...)`
    pub fn not_in<I, T>(column: I, values: impl IntoIterator<Item = T>) -> BuildResult<Self>
    where
        I: IntoIdent,
        T: Into<Value>,
    {
        Self::cmp(column, Op::NotIn, ConditionValue::list(values))
    }

    /// `column BETWEEN from AND to`
    pub fn between<I: IntoIdent>(
        column: I,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> BuildResult<Self> {
        Self::cmp(
            column,
            Op::Between,
            ConditionValue::List(vec![from.into(), to.into()]),
        )
    }

    /// `column NOT BETWEEN from AND to`
    pub fn not_between<I: IntoIdent>(
        column: I,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> BuildResult<Self> {
        Self::cmp(
            column,
            Op::NotBetween,
            ConditionValue::List(vec![from.into(), to.into()]),
        )
    }

    /// Search form: `column LIKE %value%` unless `value` already has a `%`.
    pub fn like<I: IntoIdent>(column: I, value: impl Into<Value>) -> BuildResult<Self> {
        Ok(Condition::Like {
            column: column.into_ident()?,
            pattern: value.into(),
            negated: false,
        })
    }

    /// Search form: `column NOT LIKE %value%`.
    pub fn not_like<I: IntoIdent>(column: I, value: impl Into<Value>) -> BuildResult<Self> {
        Ok(Condition::Like {
            column: column.into_ident()?,
            pattern: value.into(),
            negated: true,
        })
    }

    /// `(a AND b AND ...)`
    pub fn and(conditions: Vec<Condition>) -> Self {
        Condition::Logical {
            logic: Logic::And,
            conditions,
        }
    }

    /// `(a OR b OR ...)`
    pub fn or(conditions: Vec<Condition>) -> Self {
        Condition::Logical {
            logic: Logic::Or,
            conditions,
        }
    }

    /// Raw SQL fragment without parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Condition::Raw {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Raw SQL fragment with its own named parameters (`:name` in the text).
    pub fn raw_with<I, N, V>(sql: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        Condition::Raw {
            sql: sql.into(),
            params: params
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }

    /// Whether this node is a logical group (and therefore parenthesized
    /// when nested).
    pub fn is_group(&self) -> bool {
        matches!(self, Condition::Logical { .. })
    }

    // ==================== Dynamic input ====================

    /// Parse the loosely-typed condition shapes.
    ///
    /// - object: hash form
    /// - string: raw fragment, no params
    /// - `["AND"|"OR", ...]`: logical group
    /// - `["LIKE"|"NOT LIKE", column, value]`: search form
    /// - `[column, op, value]`: operator triple; a 3-element list whose middle
    ///   element is an operator is always read this way
    pub fn from_json(json: &serde_json::Value) -> BuildResult<Self> {
        match json {
            serde_json::Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let column = Ident::parse(key)?;
                    let value = ConditionValue::from_json(value).ok_or_else(|| {
                        BuildError::malformed(format!(
                            "value for '{key}' must be a scalar, null, or a list of scalars"
                        ))
                    })?;
                    entries.push((column, value));
                }
                Ok(Condition::Map(entries))
            }
            serde_json::Value::String(sql) => Ok(Condition::raw(sql.clone())),
            serde_json::Value::Array(items) => Self::from_json_list(items),
            other => Err(BuildError::malformed(format!(
                "expected an object, a list, or a string, got {other}"
            ))),
        }
    }

    fn from_json_list(items: &[serde_json::Value]) -> BuildResult<Self> {
        let Some(first) = items.first() else {
            return Err(BuildError::malformed("empty condition list"));
        };
        let head = first.as_str().ok_or_else(|| {
            BuildError::malformed(format!(
                "first element of a condition list must be a string, got {first}"
            ))
        })?;

        // `[column, op, value]` wins over a head that doubles as a keyword,
        // so columns named `in`, `like` or `or` still work as triples.
        if let [column, serde_json::Value::String(op), value] = items
            && let Ok(op) = op.parse::<Op>()
        {
            return Self::from_json_triple(column, op, value);
        }

        if let Ok(logic) = head.parse::<Logic>() {
            let conditions = items[1..]
                .iter()
                .map(Self::from_json)
                .collect::<BuildResult<Vec<_>>>()?;
            return Ok(Condition::Logical { logic, conditions });
        }

        if let Ok(op @ (Op::Like | Op::NotLike)) = head.parse::<Op>() {
            let [_, column, value] = items else {
                return Err(BuildError::malformed(format!(
                    "{op} search expects [{op}, column, value], got {} elements",
                    items.len()
                )));
            };
            let column = json_column(column)?;
            let pattern = Value::from_json_scalar(value).ok_or_else(|| {
                BuildError::malformed(format!("{op} pattern for '{column}' must be a scalar"))
            })?;
            return Ok(Condition::Like {
                column,
                pattern,
                negated: op == Op::NotLike,
            });
        }

        if items.len() < 3 {
            return Err(BuildError::malformed(format!(
                "operator triple expects [column, op, value], got {} elements",
                items.len()
            )));
        }
        if items.len() > 3 {
            return Err(BuildError::malformed(format!(
                "operator triple expects exactly 3 elements, got {}",
                items.len()
            )));
        }

        let op = items[1]
            .as_str()
            .ok_or_else(|| {
                BuildError::malformed(format!("operator for {} must be a string", items[0]))
            })?
            .parse::<Op>()?;
        Self::from_json_triple(&items[0], op, &items[2])
    }

    fn from_json_triple(
        column: &serde_json::Value,
        op: Op,
        value: &serde_json::Value,
    ) -> BuildResult<Self> {
        let column = json_column(column)?;
        let value = ConditionValue::from_json(value).ok_or_else(|| {
            BuildError::malformed(format!(
                "value for '{column}' must be a scalar, null, or a list of scalars"
            ))
        })?;
        Ok(Condition::Comparison { column, op, value })
    }
}

fn json_column(json: &serde_json::Value) -> BuildResult<Ident> {
    match json {
        serde_json::Value::String(s) => Ident::parse(s),
        other => Err(BuildError::malformed(format!(
            "column name must be a string, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn op_parse_is_case_insensitive() {
        assert_eq!("not like".parse::<Op>().unwrap(), Op::NotLike);
        assert_eq!("Not   In".parse::<Op>().unwrap(), Op::NotIn);
        assert_eq!("<>".parse::<Op>().unwrap(), Op::Ne);
        assert_eq!("between".parse::<Op>().unwrap(), Op::Between);
    }

    #[test]
    fn op_parse_rejects_unknown() {
        let err = "REGEXP".parse::<Op>().unwrap_err();
        assert_eq!(err, BuildError::UnknownOperator("REGEXP".into()));
    }

    #[test]
    fn constructors_validate_columns() {
        assert!(Condition::eq("id", 1).is_ok());
        assert!(Condition::eq("id; --", 1).unwrap_err().is_invalid_identifier());
        assert!(Condition::like("bad col", "x").is_err());
        assert!(Condition::map([("ok", 1), ("not ok", 2)]).is_err());
    }

    #[test]
    fn json_object_is_map_in_key_order() {
        let cond = Condition::from_json(&json!({"status": [1, 2], "deleted_at": null})).unwrap();
        let Condition::Map(entries) = cond else {
            panic!("expected map form");
        };
        let names: Vec<String> = entries.iter().map(|(c, _)| c.to_sql()).collect();
        assert_eq!(names, ["status", "deleted_at"]);
        assert_eq!(entries[1].1, ConditionValue::Null);
    }

    #[test]
    fn json_logical_group() {
        let cond = Condition::from_json(&json!(["or", {"a": 1}, "b IS NOT NULL"])).unwrap();
        assert_eq!(
            cond,
            Condition::or(vec![
                Condition::map([("a", 1)]).unwrap(),
                Condition::raw("b IS NOT NULL"),
            ])
        );
    }

    #[test]
    fn json_like_form() {
        let cond = Condition::from_json(&json!(["NOT LIKE", "title", "foo"])).unwrap();
        assert_eq!(cond, Condition::not_like("title", "foo").unwrap());
    }

    #[test]
    fn json_triple() {
        let cond = Condition::from_json(&json!(["age", "between", [18, 65]])).unwrap();
        assert_eq!(cond, Condition::between("age", 18, 65).unwrap());
    }

    #[test]
    fn json_triple_on_keyword_named_column() {
        let cond = Condition::from_json(&json!(["in", "=", 1])).unwrap();
        assert_eq!(cond, Condition::op("in", "=", 1).unwrap());
        let cond = Condition::from_json(&json!(["like", "!=", "x"])).unwrap();
        assert_eq!(cond, Condition::op("like", "!=", "x").unwrap());
        // Groups and search forms are unaffected.
        let cond = Condition::from_json(&json!(["OR", "a IS NULL", "b IS NULL"])).unwrap();
        assert!(cond.is_group());
        let cond = Condition::from_json(&json!(["LIKE", "title", "x"])).unwrap();
        assert_eq!(cond, Condition::like("title", "x").unwrap());
    }

    #[test]
    fn json_short_triple_is_malformed() {
        let err = Condition::from_json(&json!(["age", ">"])).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn json_unknown_operator() {
        let err = Condition::from_json(&json!(["age", "~~", 1])).unwrap_err();
        assert!(err.is_unknown_operator());
    }

    #[test]
    fn json_rejects_nested_values() {
        assert!(Condition::from_json(&json!({"a": {"b": 1}})).unwrap_err().is_malformed());
        assert!(Condition::from_json(&json!(["a", "IN", [[1]]])).unwrap_err().is_malformed());
        assert!(Condition::from_json(&json!(42)).unwrap_err().is_malformed());
        assert!(Condition::from_json(&json!([])).unwrap_err().is_malformed());
    }
}
