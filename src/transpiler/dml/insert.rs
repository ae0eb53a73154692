//! INSERT SQL generation, including conflict handling.

use crate::ast::{ConflictAction, ConflictClause, Insert, InsertSource};
use crate::error::QuarryResult;
use crate::fragment::Sql;
use crate::sql;
use crate::transpiler::clauses::{self, statement};
use crate::transpiler::dml::select::build_select;
use crate::transpiler::expr::{translate_all, translate_expression};
use crate::transpiler::traits::{SqlGenerator, unsupported};

/// Generate INSERT SQL.
pub fn build_insert<G>(generator: &G, insert: &Insert) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    let ids = generator.identifiers();
    let mut head = sql!(
        Sql::raw(generator.insert_keyword(insert.on_conflict.as_ref())),
        " ",
        clauses::table_ref(generator, &insert.table)?
    );
    if !insert.fields.is_empty() {
        // Insert column lists are never qualified.
        let columns = insert
            .fields
            .iter()
            .map(|c| ids.escape(&c.name).map(Sql::raw))
            .collect::<QuarryResult<Vec<_>>>()?;
        head.push(" ");
        head.push(Sql::join(columns, ", ").parenthesized());
    }

    let mut parts = vec![head];

    match &insert.values {
        InsertSource::Values { rows } => {
            if rows.is_empty() {
                return unsupported(generator, "INSERT without rows");
            }
            let mut translated = Vec::with_capacity(rows.len());
            for row in rows {
                if !insert.fields.is_empty() && row.len() != insert.fields.len() {
                    return unsupported(
                        generator,
                        &format!(
                            "a VALUES row of {} items for {} columns",
                            row.len(),
                            insert.fields.len()
                        ),
                    );
                }
                translated.push(translate_all(generator, row)?);
            }
            parts.push(sql!("VALUES ", Sql::bulk(translated)));
        }
        InsertSource::Select(select) => parts.push(build_select(generator, select)?),
    }

    if let Some(conflict) = &insert.on_conflict {
        parts.push(generator.on_conflict(conflict)?);
    }

    parts.push(clauses::returning(generator, &insert.returning)?);

    Ok(statement(parts))
}

/// `ON CONFLICT [(target)] DO NOTHING | DO UPDATE SET … [WHERE …]`
pub fn on_conflict_clause<G>(generator: &G, clause: &ConflictClause) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    let mut out = Sql::raw("ON CONFLICT");
    if !clause.target.is_empty() {
        let target = clause
            .target
            .iter()
            .map(|c| generator.identifiers().escape(&c.name).map(Sql::raw))
            .collect::<QuarryResult<Vec<_>>>()?;
        out.push(" ");
        out.push(Sql::join(target, ", ").parenthesized());
    }
    match &clause.action {
        ConflictAction::DoNothing => out.push(" DO NOTHING"),
        ConflictAction::DoUpdate { .. } if clause.target.is_empty() => {
            return unsupported(generator, "ON CONFLICT DO UPDATE without a conflict target");
        }
        ConflictAction::DoUpdate { sets, where_clause } => {
            out.push(" DO UPDATE SET ");
            out.push(clauses::assignments(generator, sets)?);
            if let Some(predicate) = where_clause {
                out.push(" WHERE ");
                out.push(translate_expression(generator, predicate)?);
            }
        }
    }
    Ok(out)
}
