//! Dialect hooks and the adapter interface built on them.

use crate::ast::{BinaryOperator, ConflictClause, Query, Value};
use crate::error::{QuarryError, QuarryResult};
use crate::fragment::{CompiledSql, PlaceholderStyle, Sql};
use crate::marshal::{FieldType, Marshaller};
use crate::sql;
use crate::transpiler::dialect::Dialect;
use crate::transpiler::escape::IdentifierEscaper;
use crate::transpiler::{dml, expr};

/// Operator spellings shared by every supported dialect.
pub fn standard_operator(op: BinaryOperator) -> Option<&'static str> {
    match op {
        BinaryOperator::Eq => Some("="),
        BinaryOperator::Ne => Some("!="),
        BinaryOperator::Gt => Some(">"),
        BinaryOperator::Gte => Some(">="),
        BinaryOperator::Lt => Some("<"),
        BinaryOperator::Lte => Some("<="),
        BinaryOperator::And => Some("AND"),
        BinaryOperator::Or => Some("OR"),
        BinaryOperator::Like => Some("LIKE"),
        BinaryOperator::In => Some("IN"),
        BinaryOperator::NotIn => Some("NOT IN"),
        BinaryOperator::Add => Some("+"),
        BinaryOperator::Subtract => Some("-"),
        BinaryOperator::Multiply => Some("*"),
        BinaryOperator::Divide => Some("/"),
        BinaryOperator::Modulo => Some("%"),
        BinaryOperator::Concat => Some("||"),
        BinaryOperator::ILike
        | BinaryOperator::ArrayContains
        | BinaryOperator::ArrayOverlap
        | BinaryOperator::RegexMatch => None,
    }
}

/// `LIMIT x OFFSET y`, either part optional.
pub fn limit_offset_clause(limit: Option<Sql>, offset: Option<Sql>) -> Sql {
    let mut out = Sql::empty();
    if let Some(limit) = limit {
        out.push("LIMIT ");
        out.push(limit);
    }
    if let Some(offset) = offset {
        if !out.is_empty() {
            out.push_raw(" ");
        }
        out.push("OFFSET ");
        out.push(offset);
    }
    out
}

/// Trait for dialect-specific SQL generation.
///
/// The shared translation in [`crate::transpiler::dml`] walks the AST and asks
/// the generator only where dialects disagree.
pub trait SqlGenerator: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Escaper used for every table, column, alias and CTE name.
    fn identifiers(&self) -> &IdentifierEscaper;

    fn placeholder_style(&self) -> PlaceholderStyle;

    /// SQL spelling of `op`, or `None` if the dialect has no equivalent.
    fn binary_operator(&self, op: BinaryOperator) -> Option<&'static str> {
        standard_operator(op)
    }

    /// `lhs <symbol> rhs`, with both operands already translated and grouped.
    fn binary_expression(&self, _op: BinaryOperator, lhs: Sql, symbol: &str, rhs: Sql) -> Sql {
        sql!(lhs, " ", Sql::raw(symbol), " ", rhs)
    }

    /// Type conversion. `compound` is set when `expr` is an operator expression.
    fn cast(&self, expr: Sql, _compound: bool, target_type: &str) -> Sql {
        sql!("CAST(", expr, " AS ", Sql::raw(target_type), ")")
    }

    /// Array constructor from already-translated elements.
    fn array_literal(&self, elements: Vec<Sql>) -> Sql;

    /// `operand [NOT] IN <param>` where the parameter holds a list of values.
    /// Default: one placeholder per element.
    fn in_array_param(&self, operand: Sql, items: &[Value], negated: bool) -> Sql {
        if items.is_empty() {
            return expr::empty_membership(negated);
        }
        let keyword = if negated { " NOT IN (" } else { " IN (" };
        let placeholders = Sql::join(items.iter().cloned().map(Sql::param), ", ");
        sql!(operand, Sql::raw(keyword), placeholders, ")")
    }

    fn limit_offset(&self, limit: Option<Sql>, offset: Option<Sql>) -> Sql {
        limit_offset_clause(limit, offset)
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn supports_full_join(&self) -> bool {
        true
    }

    fn supports_nulls_order(&self) -> bool {
        true
    }

    fn supports_delete_using(&self) -> bool {
        true
    }

    fn supports_update_from(&self) -> bool {
        true
    }

    /// Multi-table UPDATE places joins between the target and SET.
    fn update_joins_before_set(&self) -> bool {
        false
    }

    /// Statement head of an INSERT, which may depend on its conflict handling.
    fn insert_keyword(&self, _conflict: Option<&ConflictClause>) -> &'static str {
        "INSERT INTO"
    }

    /// Conflict handling appended after the row source.
    fn on_conflict(&self, clause: &ConflictClause) -> QuarryResult<Sql> {
        dml::insert::on_conflict_clause(self, clause)
    }

    /// Reference to a column of the row proposed for insertion.
    fn excluded(&self, column: &str) -> QuarryResult<Sql> {
        Ok(sql!("EXCLUDED.", Sql::raw(self.identifiers().escape(column)?)))
    }

    fn marshaller(&self) -> Marshaller;
}

/// The surface a caller uses to talk to one database.
///
/// Implemented for every [`SqlGenerator`], boxed or not.
pub trait DialectAdapter {
    /// Compile a statement into SQL text and its ordered parameters.
    fn translate_query(&self, query: &Query) -> QuarryResult<CompiledSql>;

    /// Compile a statement into an unrendered fragment, for embedding.
    fn translate(&self, query: &Query) -> QuarryResult<Sql>;

    fn escape_identifier(&self, ident: &str) -> QuarryResult<String>;

    fn to_database(&self, value: &Value, field: FieldType) -> QuarryResult<Value>;

    fn from_database(&self, value: &Value, field: FieldType) -> QuarryResult<Value>;
}

impl<G: SqlGenerator + ?Sized> DialectAdapter for G {
    fn translate_query(&self, query: &Query) -> QuarryResult<CompiledSql> {
        let compiled = self.translate(query)?.into_compiled(self.placeholder_style());
        tracing::debug!(
            dialect = %self.dialect(),
            kind = query.kind(),
            params = compiled.parameters.len(),
            "compiled statement"
        );
        Ok(compiled)
    }

    fn translate(&self, query: &Query) -> QuarryResult<Sql> {
        match query {
            Query::Select(select) => dml::select::build_select(self, select),
            Query::Insert(insert) => dml::insert::build_insert(self, insert),
            Query::Update(update) => dml::update::build_update(self, update),
            Query::Delete(delete) => dml::delete::build_delete(self, delete),
        }
    }

    fn escape_identifier(&self, ident: &str) -> QuarryResult<String> {
        self.identifiers().escape(ident)
    }

    fn to_database(&self, value: &Value, field: FieldType) -> QuarryResult<Value> {
        self.marshaller().to_database(value, field)
    }

    fn from_database(&self, value: &Value, field: FieldType) -> QuarryResult<Value> {
        self.marshaller().from_database(value, field)
    }
}

/// Shorthand for a capability-gap error.
pub(crate) fn unsupported<G, T>(generator: &G, construct: &str) -> QuarryResult<T>
where
    G: SqlGenerator + ?Sized,
{
    Err(QuarryError::unsupported(format!(
        "{} is not supported by {}",
        construct,
        generator.dialect()
    )))
}
