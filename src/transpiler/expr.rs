//! Expression translation.
//!
//! Values become placeholders, identifiers go through the dialect's escaper,
//! and operands are parenthesized wherever the SQL grammar would otherwise
//! regroup them.

use crate::ast::{BinaryOperator, ColumnRef, Expression, UnaryOperator, Value, WhenClause};
use crate::error::{QuarryError, QuarryResult};
use crate::fragment::Sql;
use crate::sql;
use crate::transpiler::dml::select::build_select;
use crate::transpiler::escape::validate_type_name;
use crate::transpiler::traits::{SqlGenerator, unsupported};

/// Precedence shared by comparisons, which never chain without parentheses.
const COMPARISON: u8 = 3;

/// Translate one expression tree.
pub fn translate_expression<G>(generator: &G, expr: &Expression) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    match expr {
        Expression::Column(column) => column_ref(generator, column),
        Expression::Literal { value } | Expression::Parameter { value } => {
            Ok(Sql::param(value.clone()))
        }
        Expression::BinaryOp { op, left, right } => binary(generator, *op, left, right),
        Expression::UnaryOp { op, operand } => unary(generator, *op, operand),
        Expression::FunctionCall {
            name,
            args,
            distinct,
        } => {
            let name = generator.identifiers().validate(name)?;
            let mut out = sql!(Sql::raw(name), "(");
            if *distinct {
                out.push("DISTINCT ");
            }
            out.push(Sql::join(translate_all(generator, args)?, ", "));
            out.push(")");
            Ok(out)
        }
        Expression::Case {
            operand,
            whens,
            else_result,
        } => case(generator, operand.as_deref(), whens, else_result.as_deref()),
        Expression::Subquery { select } => Ok(build_select(generator, select)?.parenthesized()),
        Expression::Array { elements } => {
            Ok(generator.array_literal(translate_all(generator, elements)?))
        }
        Expression::Cast { expr, target_type } => {
            let target_type = validate_type_name(target_type)?;
            let compound = matches!(
                **expr,
                Expression::BinaryOp { .. } | Expression::UnaryOp { .. }
            );
            Ok(generator.cast(translate_expression(generator, expr)?, compound, target_type))
        }
        Expression::Star => Ok(Sql::raw("*")),
        Expression::Excluded { column } => generator.excluded(column),
    }
}

pub fn translate_all<G>(generator: &G, exprs: &[Expression]) -> QuarryResult<Vec<Sql>>
where
    G: SqlGenerator + ?Sized,
{
    exprs
        .iter()
        .map(|e| translate_expression(generator, e))
        .collect()
}

pub fn column_ref<G>(generator: &G, column: &ColumnRef) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    let escaped = generator
        .identifiers()
        .escape_qualified(column.table.as_deref(), &column.name)?;
    Ok(Sql::raw(escaped))
}

/// Stand-in for membership in an empty list.
pub(crate) fn empty_membership(negated: bool) -> Sql {
    Sql::raw(if negated { "1 = 1" } else { "1 = 0" })
}

fn binary<G>(
    generator: &G,
    op: BinaryOperator,
    left: &Expression,
    right: &Expression,
) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    let symbol = generator.binary_operator(op).ok_or_else(|| {
        tracing::trace!(
            operator = op.name(),
            dialect = %generator.dialect(),
            "no operator mapping"
        );
        QuarryError::UnsupportedOperator(op.name().to_string())
    })?;
    if matches!(op, BinaryOperator::In | BinaryOperator::NotIn) {
        return membership(generator, op, symbol, left, right);
    }
    let lhs = operand(generator, op, left, false)?;
    let rhs = operand(generator, op, right, true)?;
    Ok(generator.binary_expression(op, lhs, symbol, rhs))
}

/// Translate a child of `parent`, wrapping it when its own operator binds
/// looser or would regroup.
fn operand<G>(
    generator: &G,
    parent: BinaryOperator,
    child: &Expression,
    is_right: bool,
) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    let sql = translate_expression(generator, child)?;
    let parent_prec = parent.precedence();
    let wrap = match (child, child.precedence()) {
        (_, None) => false,
        (Expression::BinaryOp { op, .. }, _) if mixes_concat(parent, *op) => true,
        (_, Some(p)) if p < parent_prec => true,
        (_, Some(p)) if p > parent_prec => false,
        // Equal precedence from here on.
        _ if parent_prec == COMPARISON => true,
        (Expression::UnaryOp { .. }, _) => false,
        (Expression::BinaryOp { op, .. }, _) => {
            is_right && !(*op == parent && parent.is_associative())
        }
        _ => false,
    };
    Ok(if wrap { sql.parenthesized() } else { sql })
}

/// `||` ranks above arithmetic on SQLite and below it on Postgres, so
/// concatenation mixed with arithmetic is always grouped explicitly.
fn mixes_concat(parent: BinaryOperator, child: BinaryOperator) -> bool {
    let arithmetic = |op: BinaryOperator| op.precedence() > COMPARISON;
    (parent == BinaryOperator::Concat) != (child == BinaryOperator::Concat)
        && arithmetic(parent)
        && arithmetic(child)
}

fn membership<G>(
    generator: &G,
    op: BinaryOperator,
    symbol: &str,
    left: &Expression,
    right: &Expression,
) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    let negated = op == BinaryOperator::NotIn;
    let lhs = operand(generator, op, left, false)?;
    match right {
        Expression::Subquery { select } => Ok(sql!(
            lhs,
            " ",
            Sql::raw(symbol),
            " ",
            build_select(generator, select)?.parenthesized()
        )),
        Expression::Array { elements } if elements.is_empty() => Ok(empty_membership(negated)),
        Expression::Array { elements } => Ok(sql!(
            lhs,
            " ",
            Sql::raw(symbol),
            " ",
            Sql::join(translate_all(generator, elements)?, ", ").parenthesized()
        )),
        Expression::Parameter {
            value: Value::Array(items),
        }
        | Expression::Literal {
            value: Value::Array(items),
        } => Ok(generator.in_array_param(lhs, items, negated)),
        other => Ok(sql!(
            lhs,
            " ",
            Sql::raw(symbol),
            " ",
            translate_expression(generator, other)?.parenthesized()
        )),
    }
}

fn unary<G>(generator: &G, op: UnaryOperator, operand: &Expression) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    let inner = translate_expression(generator, operand)?;
    let prec = operand.precedence();
    Ok(match op {
        UnaryOperator::Not => {
            let wrap = matches!(operand, Expression::BinaryOp { op, .. } if op.precedence() <= 2);
            sql!("NOT ", wrap_if(inner, wrap))
        }
        UnaryOperator::Negate => {
            let wrap = matches!(
                operand,
                Expression::BinaryOp { .. } | Expression::UnaryOp { .. }
            );
            sql!("-", wrap_if(inner, wrap))
        }
        UnaryOperator::IsNull => {
            sql!(wrap_if(inner, prec.is_some_and(|p| p <= COMPARISON)), " IS NULL")
        }
        UnaryOperator::IsNotNull => {
            sql!(wrap_if(inner, prec.is_some_and(|p| p <= COMPARISON)), " IS NOT NULL")
        }
        UnaryOperator::Exists => match operand {
            Expression::Subquery { .. } => sql!("EXISTS ", inner),
            other => {
                return unsupported(
                    generator,
                    &format!("EXISTS over a {} operand", other.tag()),
                );
            }
        },
    })
}

fn case<G>(
    generator: &G,
    operand: Option<&Expression>,
    whens: &[WhenClause],
    else_result: Option<&Expression>,
) -> QuarryResult<Sql>
where
    G: SqlGenerator + ?Sized,
{
    if whens.is_empty() {
        return Err(QuarryError::unsupported("CASE without WHEN arms"));
    }
    let mut out = Sql::raw("CASE");
    if let Some(operand) = operand {
        out.push(" ");
        out.push(translate_expression(generator, operand)?);
    }
    for arm in whens {
        out.push(" WHEN ");
        out.push(translate_expression(generator, &arm.when)?);
        out.push(" THEN ");
        out.push(translate_expression(generator, &arm.then)?);
    }
    if let Some(else_result) = else_result {
        out.push(" ELSE ");
        out.push(translate_expression(generator, else_result)?);
    }
    out.push(" END");
    Ok(out)
}

fn wrap_if(sql: Sql, wrap: bool) -> Sql {
    if wrap { sql.parenthesized() } else { sql }
}
