use serde::{Deserialize, Serialize};

use crate::ast::{ColumnRef, Expression, JoinType, NullsOrder, SortOrder};

/// A complete statement. The compiler dispatches on this tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Query {
    Select(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl Query {
    pub fn kind(&self) -> &'static str {
        match self {
            Query::Select(_) => "SELECT",
            Query::Insert(_) => "INSERT",
            Query::Update(_) => "UPDATE",
            Query::Delete(_) => "DELETE",
        }
    }
}

impl From<Select> for Query {
    fn from(s: Select) -> Self {
        Query::Select(s)
    }
}

impl From<Insert> for Query {
    fn from(i: Insert) -> Self {
        Query::Insert(i)
    }
}

impl From<Update> for Query {
    fn from(u: Update) -> Self {
        Query::Update(u)
    }
}

impl From<Delete> for Query {
    fn from(d: Delete) -> Self {
        Query::Delete(d)
    }
}

/// A named common table expression (`WITH name AS (…)`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cte {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<String>,
    pub select: Select,
    /// Marks the whole WITH list as `WITH RECURSIVE`.
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    #[serde(default)]
    pub with: Vec<Cte>,
    #[serde(default)]
    pub distinct: bool,
    pub fields: Vec<SelectField>,
    pub from: FromClause,
    #[serde(default)]
    pub joins: Vec<JoinClause>,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Expression>,
    #[serde(default)]
    pub group_by: Vec<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub having: Option<Expression>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insert {
    pub table: TableRef,
    #[serde(default)]
    pub fields: Vec<ColumnRef>,
    pub values: InsertSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_conflict: Option<ConflictClause>,
    #[serde(default)]
    pub returning: Vec<SelectField>,
}

/// Row source of an INSERT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InsertSource {
    /// `VALUES (…), (…)`
    Values { rows: Vec<Vec<Expression>> },
    /// `INSERT … SELECT`
    Select(Box<Select>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub table: TableRef,
    pub sets: Vec<Assignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<FromClause>,
    #[serde(default)]
    pub joins: Vec<JoinClause>,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Expression>,
    #[serde(default)]
    pub returning: Vec<SelectField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delete {
    pub from: TableRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using: Option<FromClause>,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Expression>,
    #[serde(default)]
    pub returning: Vec<SelectField>,
}

/// `column = value` inside SET.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub column: ColumnRef,
    pub value: Expression,
}

/// One item of a projection or RETURNING list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SelectField {
    /// `*` or `table.*`
    Wildcard {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table: Option<String>,
    },
    ColumnSelect {
        column: ColumnRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
    ExpressionSelect {
        expression: Expression,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
}

/// A table name with optional schema and alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

/// Operand of FROM / USING / a join side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FromClause {
    Table(TableRef),
    SubqueryFrom { select: Box<Select>, alias: String },
    /// A nested join used as a from-item.
    Join(Box<Join>),
}

impl From<TableRef> for FromClause {
    fn from(t: TableRef) -> Self {
        FromClause::Table(t)
    }
}

/// A self-contained join tree: `left TYPE JOIN right ON …`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub join_type: JoinType,
    pub left: FromClause,
    pub right: FromClause,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<JoinCondition>,
}

/// An entry of a statement's `joins` list, chained onto the FROM item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub target: FromClause,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<JoinCondition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JoinCondition {
    On { expression: Expression },
    Using { columns: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub expression: Expression,
    #[serde(default)]
    pub direction: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nulls: Option<NullsOrder>,
}

/// `ON CONFLICT` / `ON DUPLICATE KEY` handling for INSERT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictClause {
    /// Conflict target columns. MySQL ignores the target.
    #[serde(default)]
    pub target: Vec<ColumnRef>,
    pub action: ConflictAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConflictAction {
    DoNothing,
    DoUpdate {
        sets: Vec<Assignment>,
        #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
        where_clause: Option<Expression>,
    },
}
