//! Query builders over the condition compiler.
//!
//! Each builder owns one [`Session`](crate::Session), so every placeholder it
//! mints is unique for the builder's lifetime, across rebuilds and
//! [`reset`](SqlQb::reset)s.
//!
//! # Usage
//!
//! ```ignore
//! use condql::qb::{self, SqlQb};
//!
//! let built = qb::select("users")
//!     .where_eq("status", "active")
//!     .where_in("role", ["admin", "editor"])
//!     .order_by("created_at", "DESC")
//!     .limit(20)
//!     .build()?;
//! // SELECT * FROM users WHERE status = :p_1_status
//! //   AND role IN (:in_2_role, :in_3_role) ORDER BY created_at DESC LIMIT 20
//!
//! let positional = built.to_positional(condql::Dialect::Postgres)?;
//! client.query(&positional.sql, &positional.params_ref()).await?;
//! ```

#[macro_use]
mod where_methods;

mod delete;
mod insert;
mod select;
mod traits;
mod unique;
mod update;

pub use delete::DeleteQb;
pub use insert::InsertQb;
pub use select::SelectQb;
pub use traits::{BuiltQuery, SqlQb};
pub use unique::UniqueCheck;
pub use update::UpdateQb;

use crate::compiler::Compiler;
use crate::value::Value;

/// Create a SELECT query builder for the given table.
pub fn select(table: &str) -> SelectQb {
    SelectQb::new(table)
}

/// Create an INSERT query builder for the given table.
pub fn insert(table: &str) -> InsertQb {
    InsertQb::new(table)
}

/// Create an UPDATE query builder for the given table.
pub fn update(table: &str) -> UpdateQb {
    UpdateQb::new(table)
}

/// Create a DELETE query builder for the given table.
pub fn delete(table: &str) -> DeleteQb {
    DeleteQb::new(table)
}

/// Create a uniqueness probe for `table.column = value`.
pub fn unique_check(table: &str, column: &str, value: impl Into<Value>) -> UniqueCheck {
    UniqueCheck::new(table, column, value)
}

/// Builders preconfigured with this compiler's dialect settings.
impl Compiler {
    pub fn select(&self, table: &str) -> SelectQb {
        SelectQb::new(table).compiler(*self)
    }

    pub fn insert(&self, table: &str) -> InsertQb {
        InsertQb::new(table).compiler(*self)
    }

    pub fn update(&self, table: &str) -> UpdateQb {
        UpdateQb::new(table).compiler(*self)
    }

    pub fn delete(&self, table: &str) -> DeleteQb {
        DeleteQb::new(table).compiler(*self)
    }

    pub fn unique_check(&self, table: &str, column: &str, value: impl Into<Value>) -> UniqueCheck {
        UniqueCheck::new(table, column, value).compiler(*self)
    }
}

#[cfg(test)]
mod tests;
