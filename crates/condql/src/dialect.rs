//! SQL dialects.
//!
//! The compiler only consults the dialect for the LIKE -> ILIKE rewrite; the
//! positional rewrite uses it to pick `$n` or `?` placeholders.

use crate::error::BuildError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// A SQL variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Dialect {
    /// MySQL / MariaDB
    #[default]
    MySql,
    /// PostgreSQL
    Postgres,
    /// SQLite
    Sqlite,
}

impl Dialect {
    /// Whether this dialect understands `ILIKE`.
    pub fn is_postgres_family(self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Canonical driver name, as used in DSNs and env files.
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Postgres => "pgsql",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Whether positional placeholders are numbered (`$1`) or anonymous (`?`).
    pub fn numbered_placeholders(self) -> bool {
        self.is_postgres_family()
    }
}

impl FromStr for Dialect {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "pgsql" | "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            other => Err(BuildError::config(format!("unknown SQL dialect '{other}'"))),
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = BuildError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
