//! Trait definitions and shared output type for query builders.

use crate::bind::{PositionalQuery, to_positional};
use crate::dialect::Dialect;
use crate::error::BuildResult;
use crate::param::{ParamSet, Session};

/// Maximum SQL length (in bytes) written to log events.
#[cfg(feature = "tracing")]
const LOG_SQL_MAX_BYTES: usize = 200;

/// The result of building a query: SQL with named placeholders plus the
/// parameters they refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: ParamSet,
}

impl BuiltQuery {
    /// Create a new built query.
    pub fn new(sql: String, params: ParamSet) -> Self {
        Self { sql, params }
    }

    /// Rewrite named placeholders into the positional style of `dialect`.
    pub fn to_positional(&self, dialect: Dialect) -> BuildResult<PositionalQuery> {
        to_positional(&self.sql, &self.params, dialect)
    }
}

/// Base trait for all query builders.
pub trait SqlQb {
    /// Statement kind, used in log events.
    const KIND: &'static str;

    /// Assemble SQL against `session`, binding values into it.
    fn assemble(&self, session: &mut Session) -> BuildResult<String>;

    /// The builder's own session.
    fn session_mut(&mut self) -> &mut Session;

    /// The builder's own session.
    fn session(&self) -> &Session;

    /// Clear structural state (conditions, columns, ordering) but keep the
    /// session counter, so later placeholders never repeat earlier ones.
    fn reset(&mut self);

    /// Build the query, advancing the session counter.
    fn build(&mut self) -> BuildResult<BuiltQuery> {
        build_with(self, Self::KIND, |qb, session| qb.assemble(session))
    }

    /// Debug helper: the SQL this builder would produce next, without
    /// advancing its session.
    fn to_sql(&self) -> BuildResult<String> {
        let mut preview = self.session().clone();
        self.assemble(&mut preview)
    }

    /// Throw away the session entirely (counter back to zero).
    fn new_session(&mut self) {
        self.session_mut().reset();
    }
}

/// Assemble against the builder's own session, hand the params off and log
/// the result. The session counter survives, so the next build mints fresh
/// names.
pub(crate) fn build_with<Q: SqlQb + ?Sized>(
    qb: &mut Q,
    kind: &'static str,
    assemble: impl FnOnce(&Q, &mut Session) -> BuildResult<String>,
) -> BuildResult<BuiltQuery> {
    let mut session = std::mem::take(qb.session_mut());
    let result = assemble(&*qb, &mut session);
    let params = session.take_params();
    *qb.session_mut() = session;
    let built = BuiltQuery::new(result?, params);
    log_built(kind, &built);
    Ok(built)
}

#[cfg(feature = "tracing")]
fn log_built(kind: &'static str, built: &BuiltQuery) {
    let sql = truncate_sql_bytes(&built.sql, LOG_SQL_MAX_BYTES);
    tracing::debug!(
        target: "condql.sql",
        query_type = kind,
        param_count = built.params.len(),
        truncated = sql.len() < built.sql.len(),
        sql = %sql,
    );
}

#[cfg(not(feature = "tracing"))]
fn log_built(_kind: &'static str, _built: &BuiltQuery) {}

#[cfg(feature = "tracing")]
fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
