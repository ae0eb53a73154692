//! WITH clause generation.

use crate::ast::Cte;
use crate::error::QuarryResult;
use crate::fragment::Sql;
use crate::sql;
use crate::transpiler::dml::select::build_select;
use crate::transpiler::traits::SqlGenerator;

/// `WITH [RECURSIVE] "name" ("c1", …) AS (SELECT …), …`, or nothing.
///
/// One recursive CTE makes the whole list `WITH RECURSIVE`.
pub fn build_with<G>(generator: &G, ctes: &[Cte]) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    if ctes.is_empty() {
        return Ok(Sql::empty());
    }
    let ids = generator.identifiers();
    let mut defs = Vec::with_capacity(ctes.len());
    for cte in ctes {
        let mut def = Sql::raw(ids.escape(&cte.name)?);
        if !cte.columns.is_empty() {
            let columns = cte
                .columns
                .iter()
                .map(|c| ids.escape(c).map(Sql::raw))
                .collect::<QuarryResult<Vec<_>>>()?;
            def.push(" ");
            def.push(Sql::join(columns, ", ").parenthesized());
        }
        def.push(" AS ");
        def.push(build_select(generator, &cte.select)?.parenthesized());
        defs.push(def);
    }
    let keyword = if ctes.iter().any(|c| c.recursive) {
        "WITH RECURSIVE "
    } else {
        "WITH "
    };
    Ok(sql!(keyword, Sql::join(defs, ", ")))
}
