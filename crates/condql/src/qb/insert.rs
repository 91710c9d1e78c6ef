//! INSERT query builder.

use crate::compiler::Compiler;
use crate::dialect::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::ident::{Ident, IntoIdent};
use crate::param::Session;
use crate::qb::traits::SqlQb;
use crate::value::Value;

/// INSERT query builder.
#[derive(Clone, Debug)]
pub struct InsertQb {
    compiler: Compiler,
    session: Session,
    /// Table name
    table: Option<Ident>,
    /// Column/value pairs in insertion order
    columns: Vec<(Ident, Value)>,
    /// RETURNING columns
    returning_cols: Vec<Ident>,
    build_error: Option<BuildError>,
}

impl InsertQb {
    /// Create a new INSERT query builder.
    pub fn new(table: &str) -> Self {
        let (table, build_error) = match Ident::parse(table) {
            Ok(t) => (Some(t), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            compiler: Compiler::default(),
            session: Session::new(),
            table,
            columns: Vec::new(),
            returning_cols: Vec::new(),
            build_error,
        }
    }

    /// Use `compiler`'s dialect (decides whether RETURNING is allowed).
    pub fn compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    /// Shorthand for switching the dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.compiler.dialect = dialect;
        self
    }

    fn record(&mut self, err: BuildError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
    }

    /// Set a column value.
    pub fn set<C: IntoIdent>(mut self, column: C, value: impl Into<Value>) -> Self {
        match column.into_ident() {
            Ok(ident) => self.columns.push((ident, value.into())),
            Err(e) => self.record(e),
        }
        self
    }

    /// Set an optional column value (None => skip).
    pub fn set_opt<C: IntoIdent, T: Into<Value>>(self, column: C, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Set several columns at once, in iteration order.
    pub fn values<I, C, V>(self, entries: I) -> Self
    where
        I: IntoIterator<Item = (C, V)>,
        C: IntoIdent,
        V: Into<Value>,
    {
        entries
            .into_iter()
            .fold(self, |qb, (column, value)| qb.set(column, value))
    }

    /// Set columns from a JSON object.
    ///
    /// Nested arrays or objects are not column values and are rejected.
    pub fn values_json(mut self, json: &serde_json::Value) -> Self {
        let Some(obj) = json.as_object() else {
            self.record(BuildError::malformed("INSERT values must be a JSON object"));
            return self;
        };
        for (column, value) in obj {
            match Value::from_json_scalar(value) {
                Some(v) => self = self.set(column, v),
                None => {
                    self.record(BuildError::malformed(format!(
                        "INSERT value for '{column}' must be a scalar"
                    )));
                    return self;
                }
            }
        }
        self
    }

    /// Set RETURNING columns (Postgres / SQLite).
    pub fn returning(mut self, cols: &[&str]) -> Self {
        for col in cols {
            match Ident::parse(col) {
                Ok(ident) => self.returning_cols.push(ident),
                Err(e) => self.record(e),
            }
        }
        self
    }
}

impl SqlQb for InsertQb {
    const KIND: &'static str = "insert";

    fn assemble(&self, session: &mut Session) -> BuildResult<String> {
        if let Some(err) = &self.build_error {
            return Err(err.clone());
        }
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| BuildError::validation("INSERT without a table"))?;
        if self.columns.is_empty() {
            return Err(BuildError::validation(format!(
                "INSERT INTO {table} has no columns"
            )));
        }
        if !self.returning_cols.is_empty() && self.compiler.dialect == Dialect::MySql {
            return Err(BuildError::validation("RETURNING is not supported by mysql"));
        }

        let mut cols = Vec::with_capacity(self.columns.len());
        let mut placeholders = Vec::with_capacity(self.columns.len());
        for (column, value) in &self.columns {
            cols.push(column.to_sql());
            placeholders.push(session.bind("ins", &column.to_sql(), value.clone()));
        }

        let mut sql = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            cols.join(", "),
            placeholders.join(", ")
        );
        if !self.returning_cols.is_empty() {
            let ret: Vec<String> = self.returning_cols.iter().map(Ident::to_sql).collect();
            sql.push_str(" RETURNING ");
            sql.push_str(&ret.join(", "));
        }
        Ok(sql)
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn reset(&mut self) {
        self.columns.clear();
        self.returning_cols.clear();
        if self.table.is_some() {
            self.build_error = None;
        }
    }
}
