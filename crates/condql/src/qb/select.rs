//! SELECT query builder.

use crate::compiler::Compiler;
use crate::condition::Condition;
use crate::dialect::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::ident::Ident;
use crate::param::Session;
use crate::qb::traits::{BuiltQuery, SqlQb, build_with};
use crate::where_clause::WhereClause;

/// SELECT query builder.
#[derive(Clone, Debug)]
pub struct SelectQb {
    compiler: Compiler,
    session: Session,
    /// Validated table name (None if validation failed)
    table: Option<Ident>,
    /// SELECT list (default ["*"])
    select_cols: Vec<String>,
    /// JOIN clauses
    join_clauses: Vec<String>,
    /// WHERE conditions
    where_clause: WhereClause,
    /// GROUP BY columns
    group_by: Vec<Ident>,
    /// HAVING conditions
    having_clause: WhereClause,
    /// ORDER BY clauses
    order_clauses: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    /// First invalid input seen, reported by `build()`
    build_error: Option<BuildError>,
}

impl SelectQb {
    /// Create a new SELECT query builder for a table.
    pub fn new(table: &str) -> Self {
        let mut qb = Self {
            compiler: Compiler::default(),
            session: Session::new(),
            table: None,
            select_cols: vec!["*".to_string()],
            join_clauses: Vec::new(),
            where_clause: WhereClause::new(),
            group_by: Vec::new(),
            having_clause: WhereClause::new(),
            order_clauses: Vec::new(),
            limit: None,
            offset: None,
            build_error: None,
        };
        match Ident::parse(table) {
            Ok(t) => qb.table = Some(t),
            Err(e) => qb.build_error = Some(e),
        }
        qb
    }

    /// Use `compiler` for WHERE/HAVING conditions.
    pub fn compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    /// Shorthand for switching the compiler's dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.compiler.dialect = dialect;
        self
    }

    fn record(&mut self, err: BuildError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
    }

    // ==================== SELECT columns ====================

    /// Set SELECT columns (validated identifiers).
    pub fn columns(mut self, cols: &[&str]) -> Self {
        let mut parsed = Vec::with_capacity(cols.len());
        for col in cols {
            match Ident::parse(col) {
                Ok(ident) => parsed.push(ident.to_sql()),
                Err(e) => {
                    self.record(e);
                    return self;
                }
            }
        }
        if !parsed.is_empty() {
            self.select_cols = parsed;
        }
        self
    }

    /// Set the SELECT list verbatim (aggregates, expressions).
    ///
    /// # Safety
    /// The text is not validated; never pass user input here.
    pub fn select_raw(mut self, expr: &str) -> Self {
        self.select_cols = vec![expr.to_string()];
        self
    }

    // ==================== JOIN ====================

    fn join(mut self, kind: &str, table: &str, left: &str, right: &str) -> Self {
        match (Ident::parse(table), Ident::parse(left), Ident::parse(right)) {
            (Ok(t), Ok(l), Ok(r)) => self
                .join_clauses
                .push(format!("{kind} JOIN {t} ON {l} = {r}")),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => self.record(e),
        }
        self
    }

    /// Add INNER JOIN table ON left = right.
    pub fn inner_join(self, table: &str, left: &str, right: &str) -> Self {
        self.join("INNER", table, left, right)
    }

    /// Add LEFT JOIN table ON left = right.
    pub fn left_join(self, table: &str, left: &str, right: &str) -> Self {
        self.join("LEFT", table, left, right)
    }

    /// Add RIGHT JOIN table ON left = right.
    pub fn right_join(self, table: &str, left: &str, right: &str) -> Self {
        self.join("RIGHT", table, left, right)
    }

    // ==================== WHERE conditions ====================

    impl_where_methods!();

    // ==================== Grouping & ordering ====================

    /// Set GROUP BY columns.
    pub fn group_by(mut self, cols: &[&str]) -> Self {
        for col in cols {
            match Ident::parse(col) {
                Ok(ident) => self.group_by.push(ident),
                Err(e) => self.record(e),
            }
        }
        self
    }

    /// Add a HAVING condition (joined with AND).
    pub fn having(mut self, condition: Condition) -> Self {
        self.having_clause.push(condition);
        self
    }

    /// Add ORDER BY column with direction `ASC` or `DESC` (case-insensitive).
    pub fn order_by(mut self, column: &str, direction: &str) -> Self {
        let dir = direction.trim().to_ascii_uppercase();
        if dir != "ASC" && dir != "DESC" {
            self.record(BuildError::validation(format!(
                "invalid ORDER BY direction '{direction}'"
            )));
            return self;
        }
        match Ident::parse(column) {
            Ok(ident) => self.order_clauses.push(format!("{ident} {dir}")),
            Err(e) => self.record(e),
        }
        self
    }

    /// Add ORDER BY column ASC.
    pub fn order_by_asc(self, column: &str) -> Self {
        self.order_by(column, "ASC")
    }

    /// Add ORDER BY column DESC.
    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, "DESC")
    }

    // ==================== Pagination ====================

    /// Set LIMIT.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Pagination helper.
    ///
    /// `page` is 1-based (clamped to >= 1).
    /// `per_page` is clamped to >= 1.
    pub fn paginate(mut self, page: u64, per_page: u64) -> Self {
        let p = page.max(1);
        let size = per_page.max(1);
        match (p - 1).checked_mul(size) {
            Some(offset) => {
                self.limit = Some(size);
                self.offset = Some(offset);
            }
            None => self.record(BuildError::validation(format!(
                "page {page} with {per_page} rows per page overflows OFFSET"
            ))),
        }
        self
    }

    // ==================== Build ====================

    fn assemble_with(&self, session: &mut Session, is_count: bool) -> BuildResult<String> {
        if let Some(err) = &self.build_error {
            return Err(err.clone());
        }
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| BuildError::validation("SELECT without a table"))?;

        let select_part = if is_count {
            "COUNT(*)".to_string()
        } else {
            self.select_cols.join(", ")
        };
        let mut sql = format!("SELECT {select_part} FROM {table}");

        for join in &self.join_clauses {
            sql.push(' ');
            sql.push_str(join);
        }

        if !self.where_clause.is_empty() {
            let where_sql = self.where_clause.compile(&self.compiler, session)?;
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        if !self.group_by.is_empty() {
            let cols: Vec<String> = self.group_by.iter().map(Ident::to_sql).collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&cols.join(", "));
        }

        if !self.having_clause.is_empty() {
            let having_sql = self.having_clause.compile(&self.compiler, session)?;
            sql.push_str(" HAVING ");
            sql.push_str(&having_sql);
        }

        if is_count && (!self.group_by.is_empty() || !self.having_clause.is_empty()) {
            // Count groups, not rows.
            let inner = sql.replacen("SELECT COUNT(*)", "SELECT 1", 1);
            return Ok(format!("SELECT COUNT(*) FROM ({inner}) AS t"));
        }

        if !is_count {
            if !self.order_clauses.is_empty() {
                sql.push_str(" ORDER BY ");
                sql.push_str(&self.order_clauses.join(", "));
            }
            if let Some(limit) = self.limit {
                sql.push_str(&format!(" LIMIT {limit}"));
            }
            if let Some(offset) = self.offset {
                sql.push_str(&format!(" OFFSET {offset}"));
            }
        }

        Ok(sql)
    }

    /// Build the COUNT(*) variant of this query (no ORDER BY / LIMIT).
    pub fn build_count(&mut self) -> BuildResult<BuiltQuery> {
        build_with(self, "select_count", |qb, session| qb.assemble_with(session, true))
    }
}

impl SqlQb for SelectQb {
    const KIND: &'static str = "select";

    fn assemble(&self, session: &mut Session) -> BuildResult<String> {
        self.assemble_with(session, false)
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn reset(&mut self) {
        self.select_cols = vec!["*".to_string()];
        self.join_clauses.clear();
        self.where_clause.clear();
        self.group_by.clear();
        self.having_clause.clear();
        self.order_clauses.clear();
        self.limit = None;
        self.offset = None;
        if self.table.is_some() {
            self.build_error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_select() {
        let qb = SelectQb::new("users");
        assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM users");
    }

    #[test]
    fn test_select_with_columns() {
        let qb = SelectQb::new("users").columns(&["id", "name", "email"]);
        assert_eq!(qb.to_sql().unwrap(), "SELECT id, name, email FROM users");
    }

    #[test]
    fn test_select_with_where() {
        let qb = SelectQb::new("users")
            .where_eq("status", "active")
            .where_op("age", ">", 18);
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT * FROM users WHERE status = :p_1_status AND age > :p_2_age"
        );
    }

    #[test]
    fn test_select_with_join() {
        let qb = SelectQb::new("users")
            .inner_join("orders", "users.id", "orders.user_id")
            .where_eq("users.status", "active");
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT * FROM users INNER JOIN orders ON users.id = orders.user_id WHERE users.status = :p_1_users_status"
        );
    }

    #[test]
    fn test_select_with_order_and_limit() {
        let qb = SelectQb::new("users")
            .order_by("created_at", "desc")
            .limit(10)
            .offset(20);
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT * FROM users ORDER BY created_at DESC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_invalid_order_direction() {
        let qb = SelectQb::new("users").order_by("id", "DESC; DROP TABLE users");
        assert!(matches!(qb.to_sql(), Err(BuildError::Validation(_))));
    }

    #[test]
    fn test_invalid_table() {
        let qb = SelectQb::new("users u");
        assert!(qb.to_sql().unwrap_err().is_invalid_identifier());
    }

    #[test]
    fn test_group_by_having() {
        let qb = SelectQb::new("orders")
            .select_raw("user_id, COUNT(*) AS order_count")
            .group_by(&["user_id"])
            .having(Condition::raw_with("COUNT(*) > :min_orders", [("min_orders", 5)]));
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT user_id, COUNT(*) AS order_count FROM orders GROUP BY user_id HAVING COUNT(*) > :min_orders"
        );
    }

    #[test]
    fn test_count_sql() {
        let mut qb = SelectQb::new("users")
            .where_eq("status", "active")
            .order_by_desc("id")
            .limit(5);
        let built = qb.build_count().unwrap();
        assert_eq!(built.sql, "SELECT COUNT(*) FROM users WHERE status = :p_1_status");
    }

    #[test]
    fn test_count_with_group_by() {
        let mut qb = SelectQb::new("orders").group_by(&["user_id"]);
        let built = qb.build_count().unwrap();
        assert_eq!(
            built.sql,
            "SELECT COUNT(*) FROM (SELECT 1 FROM orders GROUP BY user_id) AS t"
        );
    }

    #[test]
    fn test_paginate() {
        let qb = SelectQb::new("users").paginate(2, 10);
        assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM users LIMIT 10 OFFSET 10");
    }

    #[test]
    fn test_paginate_overflow_is_rejected() {
        let qb = SelectQb::new("users").paginate(u64::MAX, 2);
        assert!(matches!(qb.to_sql(), Err(BuildError::Validation(_))));

        let qb = SelectQb::new("users").paginate(u64::MAX, 1);
        assert_eq!(
            qb.to_sql().unwrap(),
            format!("SELECT * FROM users LIMIT 1 OFFSET {}", u64::MAX - 1)
        );
    }

    #[test]
    fn test_count_advances_session() {
        let mut qb = SelectQb::new("users").where_eq("id", 1);
        qb.build_count().unwrap();
        let built = qb.build_count().unwrap();
        assert_eq!(built.sql, "SELECT COUNT(*) FROM users WHERE id = :p_2_id");
        assert_eq!(built.params.len(), 1);
    }

    #[test]
    fn test_optional_conditions() {
        let status: Option<&str> = Some("active");
        let name: Option<&str> = None;
        let qb = SelectQb::new("users")
            .where_eq_opt("status", status)
            .where_eq_opt("name", name);
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT * FROM users WHERE status = :p_1_status"
        );
    }

    #[test]
    fn test_to_sql_does_not_advance_session() {
        let mut qb = SelectQb::new("users").where_eq("id", 1);
        assert_eq!(qb.to_sql().unwrap(), qb.to_sql().unwrap());
        assert_eq!(qb.session().counter(), 0);
        qb.build().unwrap();
        assert_eq!(qb.session().counter(), 1);
    }
}
