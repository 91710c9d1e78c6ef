//! Strict SQL identifier handling.
//!
//! Values are always bound as parameters, but identifiers (tables, columns) are
//! interpolated into the SQL text, so they are the real injection surface.
//! [`Ident`] accepts dotted names whose parts match `[A-Za-z_][A-Za-z0-9_]*`
//! and nothing else.
//!
//! # Example
//! ```ignore
//! use condql::Ident;
//!
//! let c = Ident::parse("users.created_at")?;
//! assert!(Ident::parse("name; DROP TABLE users").is_err());
//! # Ok::<(), condql::BuildError>(())
//! ```

use crate::error::{BuildError, BuildResult};
use std::fmt;

/// A validated SQL identifier (column, table, or `table.column`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    parts: Vec<String>,
}

impl Ident {
    /// Parse and validate an identifier string.
    pub fn parse(s: &str) -> BuildResult<Self> {
        if s.is_empty() {
            return Err(BuildError::invalid_identifier("identifier cannot be empty"));
        }

        let mut parts = Vec::new();
        for part in s.split('.') {
            validate_part(s, part)?;
            parts.push(part.to_string());
        }

        Ok(Self { parts })
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        self.parts.join(".")
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(part);
        }
    }
}

fn validate_part(whole: &str, part: &str) -> BuildResult<()> {
    let mut chars = part.chars();
    match chars.next() {
        None => {
            return Err(BuildError::invalid_identifier(format!(
                "empty segment in '{whole}'"
            )));
        }
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        Some(c) => {
            return Err(BuildError::invalid_identifier(format!(
                "invalid start character '{c}' in '{whole}'"
            )));
        }
    }
    if let Some(c) = chars.find(|c| !(*c == '_' || c.is_ascii_alphanumeric())) {
        return Err(BuildError::invalid_identifier(format!(
            "invalid character '{c}' in '{whole}'"
        )));
    }
    Ok(())
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_sql(&mut out);
        f.write_str(&out)
    }
}

/// Convert an input into an [`Ident`].
///
/// This is mainly for ergonomics in builder APIs.
pub trait IntoIdent {
    fn into_ident(self) -> BuildResult<Ident>;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> BuildResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> BuildResult<Ident> {
        Ok(self.clone())
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> BuildResult<Ident> {
        Ident::parse(self)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> BuildResult<Ident> {
        Ident::parse(&self)
    }
}

impl IntoIdent for &String {
    fn into_ident(self) -> BuildResult<Ident> {
        Ident::parse(self)
    }
}
