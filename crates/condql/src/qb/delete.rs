//! DELETE query builder.

use crate::compiler::Compiler;
use crate::dialect::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::ident::Ident;
use crate::param::Session;
use crate::qb::traits::SqlQb;
use crate::where_clause::WhereClause;

/// DELETE query builder.
#[derive(Clone, Debug)]
pub struct DeleteQb {
    compiler: Compiler,
    session: Session,
    /// Table name
    table: Option<Ident>,
    /// WHERE conditions
    where_clause: WhereClause,
    /// RETURNING columns
    returning_cols: Vec<Ident>,
    /// Whether to allow DELETE without WHERE (dangerous!)
    allow_all: bool,
    build_error: Option<BuildError>,
}

impl DeleteQb {
    /// Create a new DELETE query builder.
    pub fn new(table: &str) -> Self {
        let (table, build_error) = match Ident::parse(table) {
            Ok(t) => (Some(t), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            compiler: Compiler::default(),
            session: Session::new(),
            table,
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

    /// Allow DELETE without WHERE conditions (dangerous!).
    ///
    /// By default such a statement is refused at build time.
    pub fn allow_all(mut self, allow: bool) -> Self {
        self.allow_all = allow;
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
                Err(e) => {
                    if self.build_error.is_none() {
                        self.build_error = Some(e);
                    }
                }
            }
        }
        self
    }
}

impl SqlQb for DeleteQb {
    const KIND: &'static str = "delete";

    fn assemble(&self, session: &mut Session) -> BuildResult<String> {
        if let Some(err) = &self.build_error {
            return Err(err.clone());
        }
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| BuildError::validation("DELETE without a table"))?;
        if self.where_clause.is_empty() && !self.allow_all {
            return Err(BuildError::validation(format!(
                "DELETE FROM {table} without WHERE; call allow_all(true) to delete every row"
            )));
        }
        if !self.returning_cols.is_empty() && self.compiler.dialect == Dialect::MySql {
            return Err(BuildError::validation("RETURNING is not supported by mysql"));
        }

        let mut sql = format!("DELETE FROM {table}");
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
        self.where_clause.clear();
        self.returning_cols.clear();
        if self.table.is_some() {
            self.build_error = None;
        }
    }
}
