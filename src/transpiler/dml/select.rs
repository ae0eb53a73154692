//! SELECT SQL generation.

use crate::ast::Select;
use crate::error::QuarryResult;
use crate::fragment::Sql;
use crate::sql;
use crate::transpiler::clauses::{self, statement};
use crate::transpiler::dml::cte::build_with;
use crate::transpiler::expr::{translate_all, translate_expression};
use crate::transpiler::traits::SqlGenerator;

/// Generate SELECT SQL.
///
/// Clause order is fixed; absent clauses leave no trace in the output.
pub fn build_select<G>(generator: &G, select: &Select) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    let mut parts = vec![build_with(generator, &select.with)?];

    parts.push(Sql::raw(if select.distinct {
        "SELECT DISTINCT"
    } else {
        "SELECT"
    }));
    parts.push(clauses::fields(generator, &select.fields)?);
    parts.push(sql!("FROM ", clauses::from_clause(generator, &select.from)?));

    for join in &select.joins {
        parts.push(clauses::join_clause(
            generator,
            join.join_type,
            &join.target,
            join.condition.as_ref(),
        )?);
    }

    if let Some(predicate) = &select.where_clause {
        parts.push(sql!("WHERE ", translate_expression(generator, predicate)?));
    }

    if !select.group_by.is_empty() {
        let keys = translate_all(generator, &select.group_by)?;
        parts.push(sql!("GROUP BY ", Sql::join(keys, ", ")));
    }

    if let Some(predicate) = &select.having {
        parts.push(sql!("HAVING ", translate_expression(generator, predicate)?));
    }

    if !select.order_by.is_empty() {
        parts.push(sql!("ORDER BY ", clauses::order_by(generator, &select.order_by)?));
    }

    let limit = select
        .limit
        .as_ref()
        .map(|e| translate_expression(generator, e))
        .transpose()?;
    let offset = select
        .offset
        .as_ref()
        .map(|e| translate_expression(generator, e))
        .transpose()?;
    parts.push(generator.limit_offset(limit, offset));

    Ok(statement(parts))
}
