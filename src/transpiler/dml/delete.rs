//! DELETE SQL generation.

use crate::ast::Delete;
use crate::error::QuarryResult;
use crate::fragment::Sql;
use crate::sql;
use crate::transpiler::clauses::{self, statement};
use crate::transpiler::expr::translate_expression;
use crate::transpiler::traits::{SqlGenerator, unsupported};

/// Generate DELETE SQL.
pub fn build_delete<G>(generator: &G, delete: &Delete) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    let mut parts = vec![sql!(
        "DELETE FROM ",
        clauses::table_ref(generator, &delete.from)?
    )];

    if let Some(using) = &delete.using {
        if !generator.supports_delete_using() {
            return unsupported(generator, "DELETE ... USING");
        }
        parts.push(sql!("USING ", clauses::from_clause(generator, using)?));
    }

    if let Some(predicate) = &delete.where_clause {
        parts.push(sql!("WHERE ", translate_expression(generator, predicate)?));
    }

    parts.push(clauses::returning(generator, &delete.returning)?);

    Ok(statement(parts))
}
