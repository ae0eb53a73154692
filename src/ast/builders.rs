//! Ergonomic builder functions for Quarry AST nodes.
//!
//! Upstream components usually assemble the AST themselves; these helpers
//! exist so tests, the CLI and hand-written callers can build queries without
//! spelling out every struct.
//!
//! # Example
//! ```
//! use quarry::ast::builders::*;
//! use quarry::ast::Select;
//!
//! let query = Select::from_table("users")
//!     .columns(["id", "email"])
//!     .filter(gt(col("age"), param(18)))
//!     .order_desc("created_at")
//!     .limit(10);
//! assert_eq!(query.fields.len(), 2);
//! ```

use crate::ast::*;

// ==================== Expressions ====================

/// Column reference. `"users.id"` is split into table and column.
pub fn col(name: &str) -> Expression {
    Expression::Column(ColumnRef::from(name))
}

/// Bound parameter.
pub fn param(value: impl Into<Value>) -> Expression {
    Expression::Parameter {
        value: value.into(),
    }
}

/// Inline literal (still compiled to a placeholder).
pub fn lit(value: impl Into<Value>) -> Expression {
    Expression::Literal {
        value: value.into(),
    }
}

pub fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Expression {
    Expression::BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn unary(op: UnaryOperator, operand: Expression) -> Expression {
    Expression::UnaryOp {
        op,
        operand: Box::new(operand),
    }
}

pub fn eq(left: Expression, right: Expression) -> Expression {
    binary(BinaryOperator::Eq, left, right)
}

pub fn ne(left: Expression, right: Expression) -> Expression {
    binary(BinaryOperator::Ne, left, right)
}

pub fn gt(left: Expression, right: Expression) -> Expression {
    binary(BinaryOperator::Gt, left, right)
}

pub fn gte(left: Expression, right: Expression) -> Expression {
    binary(BinaryOperator::Gte, left, right)
}

pub fn lt(left: Expression, right: Expression) -> Expression {
    binary(BinaryOperator::Lt, left, right)
}

pub fn lte(left: Expression, right: Expression) -> Expression {
    binary(BinaryOperator::Lte, left, right)
}

pub fn like(left: Expression, pattern: Expression) -> Expression {
    binary(BinaryOperator::Like, left, pattern)
}

pub fn ilike(left: Expression, pattern: Expression) -> Expression {
    binary(BinaryOperator::ILike, left, pattern)
}

pub fn and(left: Expression, right: Expression) -> Expression {
    binary(BinaryOperator::And, left, right)
}

pub fn or(left: Expression, right: Expression) -> Expression {
    binary(BinaryOperator::Or, left, right)
}

pub fn not(operand: Expression) -> Expression {
    unary(UnaryOperator::Not, operand)
}

pub fn is_null(operand: Expression) -> Expression {
    unary(UnaryOperator::IsNull, operand)
}

pub fn is_not_null(operand: Expression) -> Expression {
    unary(UnaryOperator::IsNotNull, operand)
}

pub fn exists(select: Select) -> Expression {
    unary(UnaryOperator::Exists, subquery(select))
}

/// `left IN (v1, v2, …)` with every value bound as a parameter.
pub fn is_in<V: Into<Value>>(left: Expression, values: impl IntoIterator<Item = V>) -> Expression {
    binary(
        BinaryOperator::In,
        left,
        array(values.into_iter().map(param).collect()),
    )
}

/// `left NOT IN (v1, v2, …)`
pub fn not_in<V: Into<Value>>(left: Expression, values: impl IntoIterator<Item = V>) -> Expression {
    binary(
        BinaryOperator::NotIn,
        left,
        array(values.into_iter().map(param).collect()),
    )
}

pub fn func(name: &str, args: Vec<Expression>) -> Expression {
    Expression::FunctionCall {
        name: name.to_string(),
        args,
        distinct: false,
    }
}

/// `COUNT(*)`
pub fn count_star() -> Expression {
    func("COUNT", vec![Expression::Star])
}

pub fn cast(expr: Expression, target_type: &str) -> Expression {
    Expression::Cast {
        expr: Box::new(expr),
        target_type: target_type.to_string(),
    }
}

pub fn array(elements: Vec<Expression>) -> Expression {
    Expression::Array { elements }
}

pub fn subquery(select: Select) -> Expression {
    Expression::Subquery {
        select: Box::new(select),
    }
}

pub fn excluded(column: &str) -> Expression {
    Expression::Excluded {
        column: column.to_string(),
    }
}

/// Searched CASE: `CASE WHEN c1 THEN r1 … [ELSE e] END`.
pub fn case_when(
    whens: Vec<(Expression, Expression)>,
    else_result: Option<Expression>,
) -> Expression {
    Expression::Case {
        operand: None,
        whens: whens
            .into_iter()
            .map(|(when, then)| WhenClause { when, then })
            .collect(),
        else_result: else_result.map(Box::new),
    }
}

// ==================== Clause helpers ====================

/// Projection item for a (possibly qualified) column.
pub fn field(name: &str) -> SelectField {
    SelectField::ColumnSelect {
        column: ColumnRef::from(name),
        alias: None,
    }
}

/// Aliased expression projection.
pub fn field_as(expression: Expression, alias: &str) -> SelectField {
    SelectField::ExpressionSelect {
        expression,
        alias: Some(alias.to_string()),
    }
}

pub fn wildcard() -> SelectField {
    SelectField::Wildcard { table: None }
}

pub fn table(name: &str) -> FromClause {
    FromClause::Table(TableRef::new(name))
}

pub fn on(expression: Expression) -> Option<JoinCondition> {
    Some(JoinCondition::On { expression })
}

pub fn using<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Option<JoinCondition> {
    Some(JoinCondition::Using {
        columns: columns.into_iter().map(Into::into).collect(),
    })
}

pub fn assign(column: &str, value: Expression) -> Assignment {
    Assignment {
        column: ColumnRef::from(column),
        value,
    }
}

/// AND `extra` onto an optional predicate.
fn conjoin(existing: Option<Expression>, extra: Expression) -> Option<Expression> {
    Some(match existing {
        Some(e) => and(e, extra),
        None => extra,
    })
}

// ==================== Statement builders ====================

impl Select {
    /// `SELECT * FROM <table>`
    pub fn from_table(name: &str) -> Self {
        Self::from_clause(table(name))
    }

    pub fn from_clause(from: FromClause) -> Self {
        Self {
            with: Vec::new(),
            distinct: false,
            fields: vec![wildcard()],
            from,
            joins: Vec::new(),
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Replace the projection with the given columns.
    pub fn columns<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.fields = names.into_iter().map(field).collect();
        self
    }

    /// Replace the projection.
    pub fn fields(mut self, fields: Vec<SelectField>) -> Self {
        self.fields = fields;
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Add a WHERE predicate, AND-ed with any existing one.
    pub fn filter(mut self, predicate: Expression) -> Self {
        self.where_clause = conjoin(self.where_clause.take(), predicate);
        self
    }

    pub fn join(
        mut self,
        join_type: JoinType,
        target: FromClause,
        condition: Option<JoinCondition>,
    ) -> Self {
        self.joins.push(JoinClause {
            join_type,
            target,
            condition,
        });
        self
    }

    pub fn group_by(mut self, expr: Expression) -> Self {
        self.group_by.push(expr);
        self
    }

    pub fn having(mut self, predicate: Expression) -> Self {
        self.having = conjoin(self.having.take(), predicate);
        self
    }

    pub fn order_by(mut self, expression: Expression, direction: SortOrder) -> Self {
        self.order_by.push(OrderBy {
            expression,
            direction,
            nulls: None,
        });
        self
    }

    pub fn order_asc(self, column: &str) -> Self {
        self.order_by(col(column), SortOrder::Asc)
    }

    pub fn order_desc(self, column: &str) -> Self {
        self.order_by(col(column), SortOrder::Desc)
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(param(n));
        self
    }

    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(param(n));
        self
    }

    /// Prepend a common table expression.
    pub fn with_cte(mut self, name: &str, select: Select) -> Self {
        self.with.push(Cte {
            name: name.to_string(),
            columns: Vec::new(),
            select,
            recursive: false,
        });
        self
    }
}

impl Insert {
    /// `INSERT INTO <table>` with no rows yet.
    pub fn into_table(name: &str) -> Self {
        Self {
            table: TableRef::new(name),
            fields: Vec::new(),
            values: InsertSource::Values { rows: Vec::new() },
            on_conflict: None,
            returning: Vec::new(),
        }
    }

    pub fn columns<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.fields = names.into_iter().map(ColumnRef::new).collect();
        self
    }

    /// Append one row of bound values.
    pub fn row<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        let row: Vec<Expression> = values.into_iter().map(param).collect();
        if let InsertSource::Values { rows } = &mut self.values {
            rows.push(row);
        } else {
            self.values = InsertSource::Values { rows: vec![row] };
        }
        self
    }

    /// Use `INSERT … SELECT` as the row source.
    pub fn select(mut self, select: Select) -> Self {
        self.values = InsertSource::Select(Box::new(select));
        self
    }

    pub fn on_conflict_do_nothing<'a>(mut self, target: impl IntoIterator<Item = &'a str>) -> Self {
        self.on_conflict = Some(ConflictClause {
            target: target.into_iter().map(ColumnRef::new).collect(),
            action: ConflictAction::DoNothing,
        });
        self
    }

    pub fn on_conflict_update<'a>(
        mut self,
        target: impl IntoIterator<Item = &'a str>,
        sets: Vec<Assignment>,
    ) -> Self {
        self.on_conflict = Some(ConflictClause {
            target: target.into_iter().map(ColumnRef::new).collect(),
            action: ConflictAction::DoUpdate {
                sets,
                where_clause: None,
            },
        });
        self
    }

    pub fn returning<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.returning = names.into_iter().map(field).collect();
        self
    }
}

impl Update {
    pub fn table(name: &str) -> Self {
        Self {
            table: TableRef::new(name),
            sets: Vec::new(),
            from: None,
            joins: Vec::new(),
            where_clause: None,
            returning: Vec::new(),
        }
    }

    pub fn set(mut self, column: &str, value: Expression) -> Self {
        self.sets.push(assign(column, value));
        self
    }

    pub fn filter(mut self, predicate: Expression) -> Self {
        self.where_clause = conjoin(self.where_clause.take(), predicate);
        self
    }

    pub fn from_item(mut self, from: FromClause) -> Self {
        self.from = Some(from);
        self
    }

    pub fn join(
        mut self,
        join_type: JoinType,
        target: FromClause,
        condition: Option<JoinCondition>,
    ) -> Self {
        self.joins.push(JoinClause {
            join_type,
            target,
            condition,
        });
        self
    }

    pub fn returning<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.returning = names.into_iter().map(field).collect();
        self
    }
}

impl Delete {
    pub fn from_table(name: &str) -> Self {
        Self {
            from: TableRef::new(name),
            using: None,
            where_clause: None,
            returning: Vec::new(),
        }
    }

    pub fn using(mut self, using: FromClause) -> Self {
        self.using = Some(using);
        self
    }

    pub fn filter(mut self, predicate: Expression) -> Self {
        self.where_clause = conjoin(self.where_clause.take(), predicate);
        self
    }

    pub fn returning<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.returning = names.into_iter().map(field).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_splits_qualified_names() {
        assert_eq!(
            col("users.id"),
            Expression::Column(ColumnRef::qualified("users", "id"))
        );
        assert_eq!(col("id"), Expression::Column(ColumnRef::new("id")));
    }

    #[test]
    fn test_filter_conjoins() {
        let select = Select::from_table("users")
            .filter(eq(col("a"), param(1)))
            .filter(eq(col("b"), param(2)));
        match select.where_clause {
            Some(Expression::BinaryOp { op, .. }) => assert_eq!(op, BinaryOperator::And),
            other => panic!("expected AND, got {:?}", other),
        }
    }

    #[test]
    fn test_insert_rows_accumulate() {
        let insert = Insert::into_table("users")
            .columns(["name", "age"])
            .row([Value::from("John"), Value::from(30)])
            .row([Value::from("Jane"), Value::from(25)]);
        match insert.values {
            InsertSource::Values { rows } => assert_eq!(rows.len(), 2),
            other => panic!("expected VALUES, got {:?}", other),
        }
    }
}
