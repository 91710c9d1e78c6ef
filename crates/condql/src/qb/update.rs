//! UPDATE query builder.

use crate::compiler::Compiler;
use crate::dialect::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::ident::{Ident, IntoIdent};
use crate::param::Session;
use crate::qb::traits::SqlQb;
use crate::value::Value;
use crate::where_clause::WhereClause;

/// One `SET` entry.
#[derive(Clone, Debug)]
enum SetExpr {
    /// `column = :set_n_column`
    Param(Ident, Value),
    /// `column = <expr>`, text copied verbatim
    Raw(Ident, String),
}

/// UPDATE query builder.
#[derive(Clone, Debug)]
pub struct UpdateQb {
    compiler: Compiler,
    session: Session,
    /// Table name
    table: Option<Ident>,
    /// SET clauses
    set_exprs: Vec<SetExpr>,
    /// WHERE conditions
    where_clause: WhereClause,
    /// RETURNING columns
    returning_cols: Vec<Ident>,
    /// Whether to allow UPDATE without WHERE (dangerous!)
    allow_all: bool,
    build_error: Option<BuildError>,
}

impl UpdateQb {
    /// Create a new UPDATE query builder.
    pub fn new(table: &str) -> Self {
        let (table, build_error) = match Ident::parse(table) {
            Ok(t) => (Some(t), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            compiler: Compiler::default(),
            session: Session::new(),
            table,
            set_exprs: Vec::new(),
            where_clause: WhereClause::new(),
            returning_cols: Vec::new(),
            allow_all: false,
            build_error,
        }
    }

    /// Use `compiler` for WHERE conditions.
    pub fn compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    /// Shorthand for switching the compiler's dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.compiler.dialect = dialect;
        self
    }

    /// Allow UPDATE without WHERE conditions (dangerous!).
    ///
    /// By default such a statement is refused at build time.
    pub fn allow_all(mut self, allow: bool) -> Self {
        self.allow_all = allow;
        self
    }

    fn record(&mut self, err: BuildError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
    }

    // ==================== SET ====================

    /// Set a column to a bound value.
    pub fn set<C: IntoIdent>(mut self, column: C, value: impl Into<Value>) -> Self {
        match column.into_ident() {
            Ok(ident) => self.set_exprs.push(SetExpr::Param(ident, value.into())),
            Err(e) => self.record(e),
        }
        self
    }

    /// Set a column if value is Some.
    pub fn set_opt<C: IntoIdent, T: Into<Value>>(self, column: C, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Set a column to a raw SQL expression (e.g. `NOW()`, `count + 1`).
    pub fn set_raw(mut self, column: &str, expr: &str) -> Self {
        match Ident::parse(column) {
            Ok(ident) => self.set_exprs.push(SetExpr::Raw(ident, expr.to_string())),
            Err(e) => self.record(e),
        }
        self
    }

    // ==================== WHERE conditions ====================

    impl_where_methods!();

    // ==================== RETURNING ====================

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

impl SqlQb for UpdateQb {
    const KIND: &'static str = "update";

    fn assemble(&self, session: &mut Session) -> BuildResult<String> {
        if let Some(err) = &self.build_error {
            return Err(err.clone());
        }
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| BuildError::validation("UPDATE without a table"))?;
        if self.set_exprs.is_empty() {
            return Err(BuildError::validation(format!(
                "UPDATE {table} has no SET clauses"
            )));
        }
        if self.where_clause.is_empty() && !self.allow_all {
            return Err(BuildError::validation(format!(
                "UPDATE {table} without WHERE; call allow_all(true) to update every row"
            )));
        }
        if !self.returning_cols.is_empty() && self.compiler.dialect == Dialect::MySql {
            return Err(BuildError::validation("RETURNING is not supported by mysql"));
        }

        let mut sets = Vec::with_capacity(self.set_exprs.len());
        for expr in &self.set_exprs {
            match expr {
                SetExpr::Param(column, value) => {
                    let column = column.to_sql();
                    let placeholder = session.bind("set", &column, value.clone());
                    sets.push(format!("{column} = {placeholder}"));
                }
                SetExpr::Raw(column, raw) => sets.push(format!("{column} = {raw}")),
            }
        }

        let mut sql = format!("UPDATE {table} SET {}", sets.join(", "));
        if !self.where_clause.is_empty() {
            let where_sql = self.where_clause.compile(&self.compiler, session)?;
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }
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
        self.set_exprs.clear();
        self.where_clause.clear();
        self.returning_cols.clear();
        if self.table.is_some() {
            self.build_error = None;
        }
    }
}
