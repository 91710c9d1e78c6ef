//! # condql
//!
//! Compile structured filter conditions into parameterized SQL `WHERE`
//! fragments with collision-free named placeholders.
//!
//! ## Features
//!
//! - **Recursive conditions**: column maps, operator triples, LIKE search
//!   forms, and nested AND/OR groups
//! - **Named placeholders**: `:p_1_status`, `:in_2_role`, unique per session
//! - **Dialect aware**: LIKE becomes ILIKE on Postgres when adaptation is on
//! - **Safe identifiers**: column and table names are validated, never quoted
//!   blindly
//! - **Query builders**: SELECT / INSERT / UPDATE / DELETE and a uniqueness
//!   probe over the same compiler
//! - **Positional rewrite**: hand `$n` or `?` SQL plus values to an executor
//!
//! ## Compiling a condition
//!
//! ```
//! use condql::{Compiler, Condition, Dialect, Session};
//!
//! let cond = Condition::from_json(&serde_json::json!([
//!     "AND",
//!     {"status": "active"},
//!     ["OR", ["role", "=", "admin"], ["LIKE", "name", "ann"]]
//! ]))?;
//!
//! let mut session = Session::new();
//! let sql = Compiler::new(Dialect::Postgres).compile(&cond, &mut session)?;
//! assert_eq!(
//!     sql,
//!     "status = :p_1_status AND (role = :p_2_role OR name ILIKE :p_3_name)"
//! );
//! assert_eq!(session.params().len(), 3);
//! # Ok::<(), condql::BuildError>(())
//! ```
//!
//! ## Query Builder (qb)
//!
//! ```ignore
//! use condql::qb::{self, SqlQb};
//!
//! let built = qb::select("users")
//!     .where_eq("status", "active")
//!     .order_by("created_at", "DESC")
//!     .limit(10)
//!     .build()?;
//! let query = built.to_positional(condql::Dialect::Postgres)?;
//! let rows = client.query(&query.sql, &query.params_ref()).await?;
//! ```

pub mod bind;
pub mod compiler;
pub mod condition;
pub mod config;
pub mod dialect;
pub mod error;
pub mod ident;
pub mod param;
pub mod qb;
pub mod value;
pub mod where_clause;

pub use bind::{PositionalQuery, to_positional};
pub use compiler::Compiler;
pub use condition::{Condition, Logic, Op};
pub use config::CompilerConfig;
pub use dialect::Dialect;
pub use error::{BuildError, BuildResult};
pub use ident::{Ident, IntoIdent};
pub use param::{ParamSet, Session};
pub use value::{ConditionValue, Value};
pub use where_clause::WhereClause;

// Re-export qb module for easy access
pub use qb::{
    BuiltQuery, DeleteQb, InsertQb, SelectQb, SqlQb, UniqueCheck, UpdateQb, delete, insert,
    select, unique_check, update,
};
