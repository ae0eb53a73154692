//! UPDATE SQL generation.

use crate::ast::Update;
use crate::error::QuarryResult;
use crate::fragment::Sql;
use crate::sql;
use crate::transpiler::clauses::{self, statement};
use crate::transpiler::expr::translate_expression;
use crate::transpiler::traits::{SqlGenerator, unsupported};

/// Generate UPDATE SQL.
///
/// Joins follow the FROM item, or sit between the target and SET on
/// dialects with multi-table UPDATE syntax.
pub fn build_update<G>(generator: &G, update: &Update) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    let joins = update
        .joins
        .iter()
        .map(|j| clauses::join_clause(generator, j.join_type, &j.target, j.condition.as_ref()))
        .collect::<QuarryResult<Vec<_>>>()?;
    let joins_first = generator.update_joins_before_set();

    let mut parts = vec![sql!("UPDATE ", clauses::table_ref(generator, &update.table)?)];
    if joins_first {
        parts.extend(joins.iter().cloned());
    }

    parts.push(sql!("SET ", clauses::assignments(generator, &update.sets)?));

    match &update.from {
        Some(_) if !generator.supports_update_from() => {
            return unsupported(generator, "UPDATE ... FROM");
        }
        Some(from) => {
            parts.push(sql!("FROM ", clauses::from_clause(generator, from)?));
            if !joins_first {
                parts.extend(joins);
            }
        }
        None if !joins_first && !joins.is_empty() => {
            return unsupported(generator, "UPDATE joins without a FROM item");
        }
        None => {}
    }

    if let Some(predicate) = &update.where_clause {
        parts.push(sql!("WHERE ", translate_expression(generator, predicate)?));
    }

    parts.push(clauses::returning(generator, &update.returning)?);

    Ok(statement(parts))
}
