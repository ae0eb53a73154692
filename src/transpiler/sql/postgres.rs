use crate::ast::{BinaryOperator, Value};
use crate::error::QuarryResult;
use crate::fragment::{PlaceholderStyle, Sql};
use crate::marshal::{BigIntWire, DateTimeFormat, Marshaller};
use crate::sql;
use crate::transpiler::dialect::Dialect;
use crate::transpiler::escape::IdentifierEscaper;
use crate::transpiler::traits::{SqlGenerator, standard_operator};

/// PostgreSQL: `"quoted"` identifiers, `$n` placeholders, native arrays.
#[derive(Debug, Clone)]
pub struct PostgresGenerator {
    identifiers: IdentifierEscaper,
}

impl PostgresGenerator {
    pub fn new() -> Self {
        Self {
            identifiers: IdentifierEscaper::new('"'),
        }
    }

    pub fn with_identifier_pattern(pattern: &str) -> QuarryResult<Self> {
        Ok(Self {
            identifiers: IdentifierEscaper::with_pattern('"', pattern)?,
        })
    }
}

impl Default for PostgresGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlGenerator for PostgresGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn identifiers(&self) -> &IdentifierEscaper {
        &self.identifiers
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Dollar
    }

    fn binary_operator(&self, op: BinaryOperator) -> Option<&'static str> {
        match op {
            BinaryOperator::ILike => Some("ILIKE"),
            BinaryOperator::ArrayContains => Some("@>"),
            BinaryOperator::ArrayOverlap => Some("&&"),
            BinaryOperator::RegexMatch => Some("~"),
            _ => standard_operator(op),
        }
    }

    fn cast(&self, expr: Sql, compound: bool, target_type: &str) -> Sql {
        let expr = if compound { expr.parenthesized() } else { expr };
        sql!(expr, "::", Sql::raw(target_type))
    }

    fn array_literal(&self, elements: Vec<Sql>) -> Sql {
        sql!("ARRAY[", Sql::join(elements, ", "), "]")
    }

    /// The whole list travels as one array parameter.
    fn in_array_param(&self, operand: Sql, items: &[Value], negated: bool) -> Sql {
        let param = Sql::param(Value::Array(items.to_vec()));
        if negated {
            sql!(operand, " <> ALL(", param, ")")
        } else {
            sql!(operand, " = ANY(", param, ")")
        }
    }

    fn marshaller(&self) -> Marshaller {
        Marshaller {
            datetime: DateTimeFormat::Iso8601,
            bigint: BigIntWire::DecimalString,
        }
    }
}
