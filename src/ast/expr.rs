use serde::{Deserialize, Serialize};

use crate::ast::{BinaryOperator, Select, UnaryOperator, Value};

/// A possibly table-qualified column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub name: String,
}

impl ColumnRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }
}

impl From<&str> for ColumnRef {
    /// `"users.id"` becomes a qualified reference, `"id"` a bare one.
    fn from(s: &str) -> Self {
        match s.split_once('.') {
            Some((table, name)) => ColumnRef::qualified(table, name),
            None => ColumnRef::new(s),
        }
    }
}

/// One `WHEN … THEN …` arm of a CASE expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhenClause {
    pub when: Expression,
    pub then: Expression,
}

/// An expression node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    /// Column reference
    Column(ColumnRef),
    /// Inline value; still compiled to a placeholder
    Literal { value: Value },
    /// Bound parameter
    Parameter { value: Value },
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    FunctionCall {
        name: String,
        #[serde(default)]
        args: Vec<Expression>,
        /// `COUNT(DISTINCT x)`
        #[serde(default)]
        distinct: bool,
    },
    /// `CASE [operand] WHEN … THEN … [ELSE …] END`
    Case {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operand: Option<Box<Expression>>,
        whens: Vec<WhenClause>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        else_result: Option<Box<Expression>>,
    },
    /// Parenthesized scalar or set subquery
    Subquery { select: Box<Select> },
    Array { elements: Vec<Expression> },
    Cast {
        expr: Box<Expression>,
        target_type: String,
    },
    /// `*`, as in `COUNT(*)`
    Star,
    /// The row proposed for insertion inside an upsert's update arm
    Excluded { column: String },
}

impl Expression {
    /// Binding strength of the node when it appears as an operand.
    /// Non-operator nodes never need parentheses.
    pub(crate) fn precedence(&self) -> Option<u8> {
        match self {
            Expression::BinaryOp { op, .. } => Some(op.precedence()),
            Expression::UnaryOp { op, .. } => match op {
                UnaryOperator::Not => Some(2),
                UnaryOperator::IsNull | UnaryOperator::IsNotNull => Some(3),
                UnaryOperator::Negate | UnaryOperator::Exists => None,
            },
            _ => None,
        }
    }

    /// Tag name, for error messages.
    pub fn tag(&self) -> &'static str {
        match self {
            Expression::Column(_) => "Column",
            Expression::Literal { .. } => "Literal",
            Expression::Parameter { .. } => "Parameter",
            Expression::BinaryOp { .. } => "BinaryOp",
            Expression::UnaryOp { .. } => "UnaryOp",
            Expression::FunctionCall { .. } => "FunctionCall",
            Expression::Case { .. } => "Case",
            Expression::Subquery { .. } => "Subquery",
            Expression::Array { .. } => "Array",
            Expression::Cast { .. } => "Cast",
            Expression::Star => "Star",
            Expression::Excluded { .. } => "Excluded",
        }
    }
}
