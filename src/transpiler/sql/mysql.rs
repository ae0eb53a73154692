use crate::ast::{BinaryOperator, ConflictAction, ConflictClause};
use crate::error::QuarryResult;
use crate::fragment::{PlaceholderStyle, Sql};
use crate::marshal::{BigIntWire, DateTimeFormat, Marshaller};
use crate::sql;
use crate::transpiler::clauses;
use crate::transpiler::dialect::Dialect;
use crate::transpiler::escape::IdentifierEscaper;
use crate::transpiler::traits::{SqlGenerator, limit_offset_clause, standard_operator, unsupported};

/// Largest LIMIT MySQL accepts, used when only an OFFSET is given.
const UNBOUNDED_LIMIT: &str = "18446744073709551615";

/// MySQL: backtick identifiers, `?` placeholders.
#[derive(Debug, Clone)]
pub struct MysqlGenerator {
    identifiers: IdentifierEscaper,
}

impl MysqlGenerator {
    pub fn new() -> Self {
        Self {
            identifiers: IdentifierEscaper::new('`'),
        }
    }

    pub fn with_identifier_pattern(pattern: &str) -> QuarryResult<Self> {
        Ok(Self {
            identifiers: IdentifierEscaper::with_pattern('`', pattern)?,
        })
    }
}

impl Default for MysqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlGenerator for MysqlGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL
    }

    fn identifiers(&self) -> &IdentifierEscaper {
        &self.identifiers
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Question
    }

    fn binary_operator(&self, op: BinaryOperator) -> Option<&'static str> {
        match op {
            // Default collations compare case-insensitively.
            BinaryOperator::Like => Some("LIKE BINARY"),
            BinaryOperator::ILike => Some("LIKE"),
            BinaryOperator::RegexMatch => Some("REGEXP"),
            // `||` is logical OR unless PIPES_AS_CONCAT is set.
            BinaryOperator::Concat => None,
            _ => standard_operator(op),
        }
    }

    fn array_literal(&self, elements: Vec<Sql>) -> Sql {
        sql!("JSON_ARRAY(", Sql::join(elements, ", "), ")")
    }

    fn limit_offset(&self, limit: Option<Sql>, offset: Option<Sql>) -> Sql {
        let limit = match (limit, &offset) {
            (None, Some(_)) => Some(Sql::raw(UNBOUNDED_LIMIT)),
            (limit, _) => limit,
        };
        limit_offset_clause(limit, offset)
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn supports_full_join(&self) -> bool {
        false
    }

    fn supports_nulls_order(&self) -> bool {
        false
    }

    fn supports_delete_using(&self) -> bool {
        false
    }

    fn supports_update_from(&self) -> bool {
        false
    }

    fn update_joins_before_set(&self) -> bool {
        true
    }

    fn insert_keyword(&self, conflict: Option<&ConflictClause>) -> &'static str {
        match conflict {
            Some(ConflictClause {
                action: ConflictAction::DoNothing,
                ..
            }) => "INSERT IGNORE INTO",
            _ => "INSERT INTO",
        }
    }

    /// The conflict target is implied by the table's unique keys.
    fn on_conflict(&self, clause: &ConflictClause) -> QuarryResult<Sql> {
        match &clause.action {
            ConflictAction::DoNothing => Ok(Sql::empty()),
            ConflictAction::DoUpdate { where_clause: Some(_), .. } => {
                unsupported(self, "ON DUPLICATE KEY UPDATE with a WHERE filter")
            }
            ConflictAction::DoUpdate { sets, .. } => Ok(sql!(
                "ON DUPLICATE KEY UPDATE ",
                clauses::assignments(self, sets)?
            )),
        }
    }

    fn excluded(&self, column: &str) -> QuarryResult<Sql> {
        Ok(sql!("VALUES(", Sql::raw(self.identifiers.escape(column)?), ")"))
    }

    fn marshaller(&self) -> Marshaller {
        Marshaller {
            datetime: DateTimeFormat::MySql,
            bigint: BigIntWire::DecimalString,
        }
    }
}
