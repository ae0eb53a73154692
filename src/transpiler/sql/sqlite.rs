use crate::ast::BinaryOperator;
use crate::error::QuarryResult;
use crate::fragment::{PlaceholderStyle, Sql};
use crate::marshal::{BigIntWire, DateTimeFormat, Marshaller};
use crate::sql;
use crate::transpiler::dialect::Dialect;
use crate::transpiler::escape::IdentifierEscaper;
use crate::transpiler::traits::{SqlGenerator, limit_offset_clause, standard_operator};

/// SQLite: `"quoted"` identifiers, `?n` placeholders, JSON1 arrays.
#[derive(Debug, Clone)]
pub struct SqliteGenerator {
    identifiers: IdentifierEscaper,
}

impl SqliteGenerator {
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

impl Default for SqliteGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlGenerator for SqliteGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    fn identifiers(&self) -> &IdentifierEscaper {
        &self.identifiers
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::NumberedQuestion
    }

    fn binary_operator(&self, op: BinaryOperator) -> Option<&'static str> {
        match op {
            // LIKE is case-insensitive for ASCII; GLOB is the case-sensitive match.
            BinaryOperator::Like => Some("GLOB"),
            BinaryOperator::ILike => Some("LIKE"),
            _ => standard_operator(op),
        }
    }

    fn binary_expression(&self, op: BinaryOperator, lhs: Sql, symbol: &str, rhs: Sql) -> Sql {
        match op {
            BinaryOperator::Like => sql!(lhs, " GLOB ", like_to_glob(rhs)),
            _ => sql!(lhs, " ", Sql::raw(symbol), " ", rhs),
        }
    }

    fn array_literal(&self, elements: Vec<Sql>) -> Sql {
        sql!("json_array(", Sql::join(elements, ", "), ")")
    }

    fn limit_offset(&self, limit: Option<Sql>, offset: Option<Sql>) -> Sql {
        // OFFSET is only valid after LIMIT; -1 means unbounded.
        let limit = match (limit, &offset) {
            (None, Some(_)) => Some(Sql::raw("-1")),
            (limit, _) => limit,
        };
        limit_offset_clause(limit, offset)
    }

    fn supports_delete_using(&self) -> bool {
        false
    }

    fn marshaller(&self) -> Marshaller {
        Marshaller {
            datetime: DateTimeFormat::Iso8601,
            bigint: BigIntWire::NativeWhenFits,
        }
    }
}

/// Rewrite a LIKE pattern into a GLOB pattern at query time. GLOB
/// metacharacters are bracketed first, then `%` and `_` become `*` and `?`.
fn like_to_glob(pattern: Sql) -> Sql {
    const REWRITES: [(&str, &str); 5] = [
        ("'['", "'[[]'"),
        ("'*'", "'[*]'"),
        ("'?'", "'[?]'"),
        ("'%'", "'*'"),
        ("'_'", "'?'"),
    ];
    REWRITES.iter().fold(pattern, |inner, (from, to)| {
        sql!("replace(", inner, ", ", Sql::raw(*from), ", ", Sql::raw(*to), ")")
    })
}
