//! Clause-level building blocks shared by the statement builders.

use crate::ast::{
    Assignment, FromClause, Join, JoinCondition, JoinType, NullsOrder, OrderBy, SelectField,
    SortOrder, TableRef,
};
use crate::error::QuarryResult;
use crate::fragment::Sql;
use crate::sql;
use crate::transpiler::dml::select::build_select;
use crate::transpiler::expr::{column_ref, translate_expression};
use crate::transpiler::traits::{SqlGenerator, unsupported};

/// `"schema"."table" AS "alias"`
pub fn table_ref<G>(generator: &G, table: &TableRef) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    let ids = generator.identifiers();
    let mut out = Sql::raw(ids.escape_qualified(table.schema.as_deref(), &table.name)?);
    if let Some(alias) = &table.alias {
        out.push(" AS ");
        out.push(Sql::raw(ids.escape(alias)?));
    }
    Ok(out)
}

pub fn from_clause<G>(generator: &G, from: &FromClause) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    match from {
        FromClause::Table(table) => table_ref(generator, table),
        FromClause::SubqueryFrom { select, alias } => Ok(sql!(
            build_select(generator, select)?.parenthesized(),
            " AS ",
            Sql::raw(generator.identifiers().escape(alias)?)
        )),
        FromClause::Join(join) => nested_join(generator, join),
    }
}

/// `left TYPE JOIN right cond`. A join on the right side keeps its parentheses.
fn nested_join<G>(generator: &G, join: &Join) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    let left = from_clause(generator, &join.left)?;
    Ok(sql!(
        left,
        " ",
        join_clause(generator, join.join_type, &join.right, join.condition.as_ref())?
    ))
}

/// `TYPE JOIN target cond`: one entry of a `joins` list, or the right side of
/// a nested join.
pub fn join_clause<G>(
    generator: &G,
    join_type: JoinType,
    target: &FromClause,
    condition: Option<&JoinCondition>,
) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    if join_type == JoinType::Full && !generator.supports_full_join() {
        return unsupported(generator, "FULL JOIN");
    }
    let mut target_sql = from_clause(generator, target)?;
    if matches!(target, FromClause::Join(_)) {
        target_sql = target_sql.parenthesized();
    }
    let mut out = sql!(Sql::raw(join_type.keyword()), " JOIN ", target_sql);
    match (join_type, condition) {
        (JoinType::Cross, None) => {}
        (JoinType::Cross, Some(_)) => return unsupported(generator, "CROSS JOIN with a condition"),
        (other, None) => {
            return unsupported(generator, &format!("{} JOIN without a condition", other.keyword()));
        }
        (_, Some(JoinCondition::On { expression })) => {
            out.push(" ON ");
            out.push(translate_expression(generator, expression)?);
        }
        (_, Some(JoinCondition::Using { columns })) => {
            if columns.is_empty() {
                return unsupported(generator, "USING with no columns");
            }
            let escaped = columns
                .iter()
                .map(|c| generator.identifiers().escape(c).map(Sql::raw))
                .collect::<QuarryResult<Vec<_>>>()?;
            out.push(" USING ");
            out.push(Sql::join(escaped, ", ").parenthesized());
        }
    }
    Ok(out)
}

/// Projection list. An empty projection selects every column.
pub fn fields<G>(generator: &G, fields: &[SelectField]) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    if fields.is_empty() {
        return Ok(Sql::raw("*"));
    }
    let items = fields
        .iter()
        .map(|f| select_field(generator, f))
        .collect::<QuarryResult<Vec<_>>>()?;
    Ok(Sql::join(items, ", "))
}

fn select_field<G>(generator: &G, field: &SelectField) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    let ids = generator.identifiers();
    let (mut out, alias) = match field {
        SelectField::Wildcard { table: None } => return Ok(Sql::raw("*")),
        SelectField::Wildcard { table: Some(t) } => return Ok(sql!(Sql::raw(ids.escape(t)?), ".*")),
        SelectField::ColumnSelect { column, alias } => (column_ref(generator, column)?, alias),
        SelectField::ExpressionSelect { expression, alias } => {
            (translate_expression(generator, expression)?, alias)
        }
    };
    if let Some(alias) = alias {
        out.push(" AS ");
        out.push(Sql::raw(ids.escape(alias)?));
    }
    Ok(out)
}

pub fn order_by<G>(generator: &G, items: &[OrderBy]) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        let mut part = translate_expression(generator, &item.expression)?;
        part.push(match item.direction {
            SortOrder::Asc => " ASC",
            SortOrder::Desc => " DESC",
        });
        if let Some(nulls) = item.nulls {
            if !generator.supports_nulls_order() {
                return unsupported(generator, "NULLS FIRST/LAST");
            }
            part.push(match nulls {
                NullsOrder::First => " NULLS FIRST",
                NullsOrder::Last => " NULLS LAST",
            });
        }
        parts.push(part);
    }
    Ok(Sql::join(parts, ", "))
}

/// `RETURNING …`, or nothing when the list is empty.
pub fn returning<G>(generator: &G, items: &[SelectField]) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    if items.is_empty() {
        return Ok(Sql::empty());
    }
    if !generator.supports_returning() {
        return unsupported(generator, "RETURNING");
    }
    Ok(sql!("RETURNING ", fields(generator, items)?))
}

/// `"col" = expr, …` for SET lists.
pub fn assignments<G>(generator: &G, sets: &[Assignment]) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    if sets.is_empty() {
        return unsupported(generator, "an empty SET list");
    }
    let items = sets
        .iter()
        .map(|a| {
            Ok(sql!(
                column_ref(generator, &a.column)?,
                " = ",
                translate_expression(generator, &a.value)?
            ))
        })
        .collect::<QuarryResult<Vec<_>>>()?;
    Ok(Sql::join(items, ", "))
}

/// Join non-empty clause fragments with single spaces.
pub fn statement(parts: Vec<Sql>) -> Sql {
    Sql::join(parts.into_iter().filter(|p| !p.is_empty()), " ")
}
