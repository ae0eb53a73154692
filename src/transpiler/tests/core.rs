//! Core SQL transpiler tests (SELECT, UPDATE, DELETE, INSERT).

use pretty_assertions::assert_eq;

use crate::ast::builders::*;
use crate::ast::*;
use crate::transpiler::ToSql;

#[test]
fn test_simple_select() {
    let sql = Select::from_table("users").to_sql().unwrap();
    assert_eq!(sql.text, "SELECT * FROM \"users\"");
    assert!(sql.parameters.is_empty());
}

#[test]
fn test_select_with_where() {
    let sql = Select::from_table("users")
        .filter(gt(col("age"), param(18)))
        .to_sql()
        .unwrap();
    assert_eq!(sql.text, "SELECT * FROM \"users\" WHERE \"age\" > $1");
    assert_eq!(sql.parameters, vec![Value::Int(18)]);
}

#[test]
fn test_select_complex() {
    let sql = Select::from_table("users")
        .columns(["id", "email"])
        .filter(eq(col("active"), param(true)))
        .order_desc("created_at")
        .limit(10)
        .to_sql()
        .unwrap();
    assert_eq!(
        sql.text,
        "SELECT \"id\", \"email\" FROM \"users\" WHERE \"active\" = $1 ORDER BY \"created_at\" DESC LIMIT $2"
    );
    assert_eq!(sql.parameters, vec![Value::Bool(true), Value::Int(10)]);
}

#[test]
fn test_select_distinct_with_offset() {
    let sql = Select::from_table("users")
        .columns(["city"])
        .distinct()
        .order_asc("city")
        .limit(20)
        .offset(40)
        .to_sql()
        .unwrap();
    assert_eq!(
        sql.text,
        "SELECT DISTINCT \"city\" FROM \"users\" ORDER BY \"city\" ASC LIMIT $1 OFFSET $2"
    );
}

#[test]
fn test_select_join_with_aliases() {
    let sql = Select::from_clause(FromClause::Table(TableRef::new("users").alias("u")))
        .fields(vec![field("u.id"), field_as(col("o.total"), "order_total")])
        .join(
            JoinType::Left,
            FromClause::Table(TableRef::new("orders").alias("o")),
            on(eq(col("o.user_id"), col("u.id"))),
        )
        .to_sql()
        .unwrap();
    assert_eq!(
        sql.text,
        "SELECT \"u\".\"id\", \"o\".\"total\" AS \"order_total\" FROM \"users\" AS \"u\" LEFT JOIN \"orders\" AS \"o\" ON \"o\".\"user_id\" = \"u\".\"id\""
    );
}

#[test]
fn test_group_by_having() {
    let sql = Select::from_table("orders")
        .fields(vec![field("user_id"), field_as(count_star(), "n")])
        .group_by(col("user_id"))
        .having(gt(count_star(), param(5)))
        .to_sql()
        .unwrap();
    assert_eq!(
        sql.text,
        "SELECT \"user_id\", COUNT(*) AS \"n\" FROM \"orders\" GROUP BY \"user_id\" HAVING COUNT(*) > $1"
    );
    assert_eq!(sql.parameters, vec![Value::Int(5)]);
}

#[test]
fn test_in_subquery_numbering_continues() {
    let orders = Select::from_table("orders")
        .columns(["user_id"])
        .filter(gt(col("total"), param(100)));
    let sql = Select::from_table("users")
        .filter(eq(col("active"), param(true)))
        .filter(binary(BinaryOperator::In, col("id"), subquery(orders)))
        .to_sql()
        .unwrap();
    assert_eq!(
        sql.text,
        "SELECT * FROM \"users\" WHERE \"active\" = $1 AND \"id\" IN (SELECT \"user_id\" FROM \"orders\" WHERE \"total\" > $2)"
    );
    assert_eq!(sql.parameters, vec![Value::Bool(true), Value::Int(100)]);
}

#[test]
fn test_exists_subquery() {
    let sql = Select::from_table("users")
        .filter(exists(
            Select::from_table("orders").filter(eq(col("orders.user_id"), col("users.id"))),
        ))
        .to_sql()
        .unwrap();
    assert_eq!(
        sql.text,
        "SELECT * FROM \"users\" WHERE EXISTS (SELECT * FROM \"orders\" WHERE \"orders\".\"user_id\" = \"users\".\"id\")"
    );
}

#[test]
fn test_from_subquery_and_schema() {
    let inner = Select::from_clause(FromClause::Table(TableRef::new("users").schema("auth")));
    let sql = Select::from_clause(FromClause::SubqueryFrom {
        select: Box::new(inner),
        alias: "u".to_string(),
    })
    .to_sql()
    .unwrap();
    assert_eq!(
        sql.text,
        "SELECT * FROM (SELECT * FROM \"auth\".\"users\") AS \"u\""
    );
}

#[test]
fn test_literals_are_bound_too() {
    let sql = Select::from_table("users")
        .filter(eq(col("role"), lit("admin")))
        .to_sql()
        .unwrap();
    assert_eq!(sql.text, "SELECT * FROM \"users\" WHERE \"role\" = $1");
    assert_eq!(sql.parameters, vec![Value::from("admin")]);
}

#[test]
fn test_insert_multi_row() {
    let sql = Insert::into_table("users")
        .columns(["name", "age"])
        .row([Value::from("John"), Value::from(30)])
        .row([Value::from("Jane"), Value::from(25)])
        .to_sql()
        .unwrap();
    assert_eq!(
        sql.text,
        "INSERT INTO \"users\" (\"name\", \"age\") VALUES ($1, $2), ($3, $4)"
    );
    assert_eq!(
        sql.parameters,
        vec![
            Value::from("John"),
            Value::Int(30),
            Value::from("Jane"),
            Value::Int(25)
        ]
    );
}

#[test]
fn test_insert_select() {
    let sql = Insert::into_table("archive")
        .columns(["id"])
        .select(Select::from_table("users").columns(["id"]))
        .to_sql()
        .unwrap();
    assert_eq!(
        sql.text,
        "INSERT INTO \"archive\" (\"id\") SELECT \"id\" FROM \"users\""
    );
}

#[test]
fn test_insert_rejects_ragged_rows() {
    let insert = Insert::into_table("users")
        .columns(["name", "age"])
        .row([Value::from("John")]);
    assert!(insert.to_sql().is_err());
    assert!(Insert::into_table("users").to_sql().is_err());
}

#[test]
fn test_update_returning() {
    let sql = Update::table("users")
        .set("name", param("Jane Doe"))
        .filter(eq(col("id"), param(1)))
        .returning(["id"])
        .to_sql()
        .unwrap();
    assert_eq!(
        sql.text,
        "UPDATE \"users\" SET \"name\" = $1 WHERE \"id\" = $2 RETURNING \"id\""
    );
    assert_eq!(sql.parameters, vec![Value::from("Jane Doe"), Value::Int(1)]);
}

#[test]
fn test_update_from() {
    let sql = Update::table("orders")
        .set("status", param("vip"))
        .from_item(table("users"))
        .filter(and(
            eq(col("orders.user_id"), col("users.id")),
            eq(col("users.tier"), param("gold")),
        ))
        .to_sql()
        .unwrap();
    assert_eq!(
        sql.text,
        "UPDATE \"orders\" SET \"status\" = $1 FROM \"users\" WHERE \"orders\".\"user_id\" = \"users\".\"id\" AND \"users\".\"tier\" = $2"
    );
}

#[test]
fn test_update_without_sets_fails() {
    assert!(Update::table("users").to_sql().is_err());
}

#[test]
fn test_delete() {
    let sql = Delete::from_table("users")
        .filter(eq(col("id"), param(1)))
        .to_sql()
        .unwrap();
    assert_eq!(sql.text, "DELETE FROM \"users\" WHERE \"id\" = $1");
}

#[test]
fn test_delete_using_returning() {
    let sql = Delete::from_table("orders")
        .using(table("users"))
        .filter(and(
            eq(col("orders.user_id"), col("users.id")),
            eq(col("users.banned"), param(true)),
        ))
        .returning(["orders.id"])
        .to_sql()
        .unwrap();
    assert_eq!(
        sql.text,
        "DELETE FROM \"orders\" USING \"users\" WHERE \"orders\".\"user_id\" = \"users\".\"id\" AND \"users\".\"banned\" = $1 RETURNING \"orders\".\"id\""
    );
}

#[test]
fn test_query_enum_dispatch() {
    let query = Query::from(Delete::from_table("sessions"));
    assert_eq!(query.to_sql().unwrap().text, "DELETE FROM \"sessions\"");
}

#[test]
fn test_invalid_identifiers_abort() {
    let err = Select::from_table("users; DROP TABLE users")
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, crate::error::QuarryError::InvalidIdentifier(_)));

    let err = Select::from_table("users")
        .fields(vec![field_as(col("id"), "my alias")])
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, crate::error::QuarryError::InvalidIdentifier(_)));
}
