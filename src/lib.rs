//! # Quarry: typed query ASTs in, parameterized SQL out
//!
//! Quarry compiles a database-agnostic query AST into SQL text for
//! PostgreSQL, MySQL or SQLite, together with the ordered parameters its
//! placeholders bind. Runtime values never reach the SQL text.
//!
//! ## Quick Example
//!
//! ```
//! use quarry::prelude::*;
//!
//! let query = Select::from_table("users").filter(gt(col("age"), param(18)));
//!
//! let pg = query.to_sql().unwrap();
//! assert_eq!(pg.text, "SELECT * FROM \"users\" WHERE \"age\" > $1");
//! assert_eq!(pg.parameters, vec![Value::Int(18)]);
//!
//! let mysql = query.to_sql_with_dialect(Dialect::MySQL).unwrap();
//! assert_eq!(mysql.text, "SELECT * FROM `users` WHERE `age` > ?");
//! ```
//!
//! ## Layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`ast`] | Query, expression and value types |
//! | [`fragment`] | Composable SQL fragments and the `sql!` macro |
//! | [`transpiler`] | Dialect generators and the shared translation |
//! | [`marshal`] | Value conversion to and from database wire forms |
//! | [`config`] | TOML configuration |

pub mod ast;
pub mod config;
pub mod error;
pub mod fragment;
pub mod marshal;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::builders::*;
    pub use crate::ast::*;
    pub use crate::config::QuarryConfig;
    pub use crate::error::*;
    pub use crate::fragment::{CompiledSql, PlaceholderStyle, Sql};
    pub use crate::marshal::{FieldType, ScalarType};
    pub use crate::sql;
    pub use crate::transpiler::{Dialect, DialectAdapter, SqlGenerator, ToSql};
}

/// Compile `query` for `dialect`.
///
/// # Example
///
/// ```
/// use quarry::ast::builders::*;
/// use quarry::ast::Delete;
/// use quarry::transpiler::Dialect;
///
/// let query = Delete::from_table("sessions").filter(lt(col("expires_at"), param(0)));
/// let sql = quarry::compile(&query.into(), Dialect::SQLite).unwrap();
/// assert_eq!(sql.text, "DELETE FROM \"sessions\" WHERE \"expires_at\" < ?1");
/// ```
pub fn compile(
    query: &ast::Query,
    dialect: transpiler::Dialect,
) -> error::QuarryResult<fragment::CompiledSql> {
    use transpiler::DialectAdapter;
    dialect.generator().translate_query(query)
}
