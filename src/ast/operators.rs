use serde::{Deserialize, Serialize};

/// Binary operators. The SQL spelling of each one is chosen per dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BinaryOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    And,
    Or,
    /// Case-sensitive pattern match
    Like,
    /// Case-insensitive pattern match
    #[serde(rename = "ILIKE")]
    ILike,
    In,
    NotIn,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    /// String concatenation
    Concat,
    /// Array containment (@>)
    ArrayContains,
    /// Array overlap (&&)
    ArrayOverlap,
    /// POSIX regular expression match
    RegexMatch,
}

impl BinaryOperator {
    /// Binding strength, higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Gt
            | BinaryOperator::Gte
            | BinaryOperator::Lt
            | BinaryOperator::Lte
            | BinaryOperator::Like
            | BinaryOperator::ILike
            | BinaryOperator::In
            | BinaryOperator::NotIn
            | BinaryOperator::ArrayContains
            | BinaryOperator::ArrayOverlap
            | BinaryOperator::RegexMatch => 3,
            BinaryOperator::Add | BinaryOperator::Subtract | BinaryOperator::Concat => 4,
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => 5,
        }
    }

    /// `a op (b op c)` means the same as `(a op b) op c`.
    pub fn is_associative(&self) -> bool {
        matches!(
            self,
            BinaryOperator::And
                | BinaryOperator::Or
                | BinaryOperator::Add
                | BinaryOperator::Multiply
                | BinaryOperator::Concat
        )
    }

    /// Symbolic name as it appears in serialized ASTs.
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOperator::Eq => "EQ",
            BinaryOperator::Ne => "NE",
            BinaryOperator::Gt => "GT",
            BinaryOperator::Gte => "GTE",
            BinaryOperator::Lt => "LT",
            BinaryOperator::Lte => "LTE",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Like => "LIKE",
            BinaryOperator::ILike => "ILIKE",
            BinaryOperator::In => "IN",
            BinaryOperator::NotIn => "NOT_IN",
            BinaryOperator::Add => "ADD",
            BinaryOperator::Subtract => "SUBTRACT",
            BinaryOperator::Multiply => "MULTIPLY",
            BinaryOperator::Divide => "DIVIDE",
            BinaryOperator::Modulo => "MODULO",
            BinaryOperator::Concat => "CONCAT",
            BinaryOperator::ArrayContains => "ARRAY_CONTAINS",
            BinaryOperator::ArrayOverlap => "ARRAY_OVERLAP",
            BinaryOperator::RegexMatch => "REGEX_MATCH",
        }
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnaryOperator {
    Not,
    Negate,
    /// Rendered postfix: `expr IS NULL`
    IsNull,
    /// Rendered postfix: `expr IS NOT NULL`
    IsNotNull,
    Exists,
}

impl UnaryOperator {
    pub fn name(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "NOT",
            UnaryOperator::Negate => "NEGATE",
            UnaryOperator::IsNull => "IS_NULL",
            UnaryOperator::IsNotNull => "IS_NOT_NULL",
            UnaryOperator::Exists => "EXISTS",
        }
    }
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    /// The keyword placed before `JOIN`.
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Full => "FULL",
            JoinType::Cross => "CROSS",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Placement of NULLs in an ORDER BY item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NullsOrder {
    First,
    Last,
}
