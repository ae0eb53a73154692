//! SQL transpiler for the Quarry AST.
//!
//! Compiles statements into dialect-specific SQL text plus the ordered
//! parameters its placeholders refer to.

pub mod clauses;
pub mod dialect;
pub mod dml;
pub mod escape;
pub mod expr;
pub mod sql;
pub mod traits;

#[cfg(test)]
mod tests;

use crate::ast::{Delete, Expression, Insert, Query, Select, Update};
use crate::error::QuarryResult;
use crate::fragment::{CompiledSql, Sql};

pub use dialect::Dialect;
pub use escape::{DEFAULT_IDENTIFIER_PATTERN, IdentifierEscaper};
pub use traits::{DialectAdapter, SqlGenerator};

/// Trait for compiling AST nodes with one of the built-in dialects.
pub trait ToSql {
    /// Compile for the default dialect (PostgreSQL).
    fn to_sql(&self) -> QuarryResult<CompiledSql> {
        self.to_sql_with_dialect(Dialect::default())
    }

    /// Compile for a specific dialect.
    fn to_sql_with_dialect(&self, dialect: Dialect) -> QuarryResult<CompiledSql>;
}

fn compile_with<F>(dialect: Dialect, build: F) -> QuarryResult<CompiledSql>
where
    F: FnOnce(&dyn SqlGenerator) -> QuarryResult<Sql>,
{
    let generator = dialect.generator();
    Ok(build(&*generator)?.into_compiled(generator.placeholder_style()))
}

impl ToSql for Query {
    fn to_sql_with_dialect(&self, dialect: Dialect) -> QuarryResult<CompiledSql> {
        dialect.generator().translate_query(self)
    }
}

impl ToSql for Select {
    fn to_sql_with_dialect(&self, dialect: Dialect) -> QuarryResult<CompiledSql> {
        compile_with(dialect, |g| dml::select::build_select(g, self))
    }
}

impl ToSql for Insert {
    fn to_sql_with_dialect(&self, dialect: Dialect) -> QuarryResult<CompiledSql> {
        compile_with(dialect, |g| dml::insert::build_insert(g, self))
    }
}

impl ToSql for Update {
    fn to_sql_with_dialect(&self, dialect: Dialect) -> QuarryResult<CompiledSql> {
        compile_with(dialect, |g| dml::update::build_update(g, self))
    }
}

impl ToSql for Delete {
    fn to_sql_with_dialect(&self, dialect: Dialect) -> QuarryResult<CompiledSql> {
        compile_with(dialect, |g| dml::delete::build_delete(g, self))
    }
}

impl ToSql for Expression {
    fn to_sql_with_dialect(&self, dialect: Dialect) -> QuarryResult<CompiledSql> {
        compile_with(dialect, |g| expr::translate_expression(g, self))
    }
}
