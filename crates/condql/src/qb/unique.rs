//! Uniqueness probe: "does another row already hold this value?"

use crate::compiler::Compiler;
use crate::condition::{Condition, Op};
use crate::dialect::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::ident::Ident;
use crate::param::Session;
use crate::qb::traits::SqlQb;
use crate::value::Value;

/// Builds `SELECT COUNT(*) FROM t WHERE col = :p AND id != :p`.
///
/// A count of zero means the value is free. `except` excludes the row being
/// edited, so updating a record to its own current value is not a conflict.
#[derive(Clone, Debug)]
pub struct UniqueCheck {
    compiler: Compiler,
    session: Session,
    table: Option<Ident>,
    column: Option<Ident>,
    value: Value,
    except: Option<(Ident, Value)>,
    build_error: Option<BuildError>,
}

impl UniqueCheck {
    /// Probe `table.column` for `value`.
    pub fn new(table: &str, column: &str, value: impl Into<Value>) -> Self {
        let mut check = Self {
            compiler: Compiler::default(),
            session: Session::new(),
            table: None,
            column: None,
            value: value.into(),
            except: None,
            build_error: None,
        };
        match (Ident::parse(table), Ident::parse(column)) {
            (Ok(t), Ok(c)) => {
                check.table = Some(t);
                check.column = Some(c);
            }
            (Err(e), _) | (_, Err(e)) => check.build_error = Some(e),
        }
        check
    }

    /// Use `compiler` for the condition.
    pub fn compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    /// Shorthand for switching the compiler's dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.compiler.dialect = dialect;
        self
    }

    /// Ignore the row whose `column` equals `value` (usually the primary key).
    pub fn except(mut self, column: &str, value: impl Into<Value>) -> Self {
        match Ident::parse(column) {
            Ok(ident) => self.except = Some((ident, value.into())),
            Err(e) => {
                if self.build_error.is_none() {
                    self.build_error = Some(e);
                }
            }
        }
        self
    }
}

impl SqlQb for UniqueCheck {
    const KIND: &'static str = "unique_check";

    fn assemble(&self, session: &mut Session) -> BuildResult<String> {
        if let Some(err) = &self.build_error {
            return Err(err.clone());
        }
        let (Some(table), Some(column)) = (&self.table, &self.column) else {
            return Err(BuildError::validation("unique check without table or column"));
        };

        let mut conditions = vec![Condition::eq(column, self.value.clone())?];
        if let Some((key, value)) = &self.except {
            conditions.push(Condition::cmp(key, Op::Ne, value.clone())?);
        }
        let where_sql = self.compiler.compile(&Condition::and(conditions), session)?;
        Ok(format!("SELECT COUNT(*) FROM {table} WHERE {where_sql}"))
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn reset(&mut self) {
        self.except = None;
    }
}
