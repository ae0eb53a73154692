//! Dialect-agnostic query AST.
//!
//! The tree is plain data: upstream components build it, the transpiler reads
//! it, nothing mutates it. Every node derives `Serialize`/`Deserialize` with
//! an internal `"type"` tag so ASTs can be handed over as JSON.

pub mod builders;
pub mod expr;
pub mod operators;
pub mod query;
pub mod values;

pub use self::expr::{ColumnRef, Expression, WhenClause};
pub use self::operators::{BinaryOperator, JoinType, NullsOrder, SortOrder, UnaryOperator};
pub use self::query::{
    Assignment, ConflictAction, ConflictClause, Cte, Delete, FromClause, Insert, InsertSource,
    Join, JoinClause, JoinCondition, OrderBy, Query, Select, SelectField, TableRef, Update,
};
pub use self::values::Value;
