use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use quarry::prelude::*;
use regex::Regex;

fn users_over(age: i64) -> Select {
    Select::from_table("users").filter(gt(col("age"), param(age)))
}

fn sample_queries() -> Vec<Query> {
    vec![
        Select::from_table("users").into(),
        users_over(18).into(),
        Select::from_table("orders")
            .fields(vec![field("user_id"), field_as(count_star(), "n")])
            .filter(is_in(col("status"), ["paid", "shipped"]))
            .filter(binary(
                BinaryOperator::In,
                col("user_id"),
                subquery(users_over(21).columns(["id"])),
            ))
            .group_by(col("user_id"))
            .having(gt(count_star(), param(2)))
            .order_desc("user_id")
            .limit(10)
            .offset(5)
            .into(),
        Insert::into_table("users")
            .columns(["name", "age"])
            .row([Value::from("John"), Value::from(30)])
            .row([Value::from("Jane"), Value::from(25)])
            .into(),
        Update::table("users")
            .set("name", param("Jane Doe"))
            .set("age", binary(BinaryOperator::Add, col("age"), lit(1)))
            .filter(eq(col("id"), param(1)))
            .into(),
        Delete::from_table("sessions")
            .filter(or(lt(col("expires_at"), param(0)), is_null(col("user_id"))))
            .into(),
    ]
}

/// Placeholder indices as they appear in the text, in order.
fn placeholders(text: &str, dialect: Dialect) -> Vec<usize> {
    match dialect {
        Dialect::Postgres => Regex::new(r"\$(\d+)")
            .unwrap()
            .captures_iter(text)
            .map(|c| c[1].parse().unwrap())
            .collect(),
        Dialect::SQLite => Regex::new(r"\?(\d+)")
            .unwrap()
            .captures_iter(text)
            .map(|c| c[1].parse().unwrap())
            .collect(),
        Dialect::MySQL => (1..=text.matches('?').count()).collect(),
    }
}

#[test]
fn scenario_select_all() {
    let sql = quarry::compile(&Select::from_table("users").into(), Dialect::Postgres).unwrap();
    assert_eq!(sql.text, "SELECT * FROM \"users\"");
    assert_eq!(sql.parameters, vec![]);
}

#[test]
fn scenario_select_with_filter() {
    let sql = quarry::compile(&users_over(18).into(), Dialect::Postgres).unwrap();
    assert_eq!(sql.text, "SELECT * FROM \"users\" WHERE \"age\" > $1");
    assert_eq!(sql.parameters, vec![Value::Int(18)]);
}

#[test]
fn scenario_multi_row_insert() {
    let query = &sample_queries()[3];
    let sql = quarry::compile(query, Dialect::Postgres).unwrap();
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
fn scenario_update_returning() {
    let query: Query = Update::table("users")
        .set("name", param("Jane Doe"))
        .filter(eq(col("id"), param(1)))
        .returning(["id"])
        .into();
    let sql = quarry::compile(&query, Dialect::Postgres).unwrap();
    assert_eq!(
        sql.text,
        "UPDATE \"users\" SET \"name\" = $1 WHERE \"id\" = $2 RETURNING \"id\""
    );
    assert_eq!(sql.parameters, vec![Value::from("Jane Doe"), Value::Int(1)]);
}

#[test]
fn scenario_invalid_identifier() {
    for dialect in Dialect::ALL {
        match dialect.generator().escape_identifier("user-name") {
            Err(QuarryError::InvalidIdentifier(id)) => assert_eq!(id, "user-name"),
            other => panic!("{}: expected InvalidIdentifier, got {:?}", dialect, other),
        }
    }
}

#[test]
fn scenario_datetime_round_trip() {
    let adapter = Dialect::Postgres.generator();
    let field = FieldType::scalar(ScalarType::DateTime);
    let dt = Value::DateTime(Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap());

    let wire = adapter.to_database(&dt, field).unwrap();
    assert_eq!(wire, Value::from("2023-01-01T12:00:00.000Z"));
    assert_eq!(adapter.from_database(&wire, field).unwrap(), dt);

    let mysql = Dialect::MySQL.generator();
    let wire = mysql.to_database(&dt, field).unwrap();
    assert_eq!(wire, Value::from("2023-01-01 12:00:00.000"));
    assert_eq!(mysql.from_database(&wire, field).unwrap(), dt);
}

#[test]
fn placeholders_match_parameters() {
    for dialect in Dialect::ALL {
        let adapter = dialect.generator();
        for query in sample_queries() {
            let sql = adapter.translate_query(&query).unwrap();
            let found = placeholders(&sql.text, dialect);
            let expected: Vec<usize> = (1..=sql.parameters.len()).collect();
            assert_eq!(found, expected, "{} / {}", dialect, sql.text);
        }
    }
}

#[test]
fn values_never_reach_sql_text() {
    let hostile = "'; DROP TABLE users; --";
    let query: Query = Select::from_table("users")
        .filter(eq(col("name"), param(hostile)))
        .filter(like(col("bio"), lit(hostile)))
        .into();
    for dialect in Dialect::ALL {
        let sql = quarry::compile(&query, dialect).unwrap();
        assert!(!sql.text.contains("DROP"), "{}: {}", dialect, sql.text);
        assert_eq!(sql.parameters, vec![Value::from(hostile), Value::from(hostile)]);
    }
}

#[test]
fn hostile_identifiers_are_rejected() {
    let queries: Vec<Query> = vec![
        Select::from_table("users\"; DROP TABLE x; --").into(),
        Select::from_table("users").columns(["id`"]).into(),
        Update::table("users").set("a b", param(1)).into(),
    ];
    for dialect in Dialect::ALL {
        for query in &queries {
            assert!(matches!(
                quarry::compile(query, dialect),
                Err(QuarryError::InvalidIdentifier(_))
            ));
        }
    }
}

#[test]
fn absent_clauses_leave_no_trace() {
    let re = Regex::new(r"  |^ | $").unwrap();
    for dialect in Dialect::ALL {
        for query in sample_queries() {
            let sql = quarry::compile(&query, dialect).unwrap();
            assert!(!re.is_match(&sql.text), "{}: {:?}", dialect, sql.text);
        }
    }
    let bare = quarry::compile(&Select::from_table("users").into(), Dialect::MySQL).unwrap();
    for keyword in ["WHERE", "GROUP BY", "HAVING", "ORDER BY", "LIMIT", "OFFSET"] {
        assert!(!bare.text.contains(keyword));
    }
}

#[test]
fn compilation_is_deterministic() {
    for dialect in Dialect::ALL {
        for query in sample_queries() {
            assert_eq!(
                quarry::compile(&query, dialect).unwrap(),
                quarry::compile(&query, dialect).unwrap()
            );
        }
    }
}

#[test]
fn marshalling_round_trips_on_every_dialect() {
    let samples = vec![
        (Value::from("hello"), ScalarType::String),
        (Value::Bool(true), ScalarType::Boolean),
        (Value::Int(42), ScalarType::Int),
        (Value::Float(3.14), ScalarType::Float),
        (Value::BigInt(123456789012345678901), ScalarType::BigInt),
        (
            Value::DateTime(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()),
            ScalarType::DateTime,
        ),
        (Value::Json(serde_json::json!({"a": 1})), ScalarType::Json),
        (Value::Bytes(vec![0xde, 0xad, 0xbe, 0xef]), ScalarType::Blob),
    ];
    for dialect in Dialect::ALL {
        let adapter = dialect.generator();
        for (value, scalar) in &samples {
            let field = FieldType::scalar(*scalar);
            let wire = adapter.to_database(value, field).unwrap();
            assert_eq!(
                &adapter.from_database(&wire, field).unwrap(),
                value,
                "{} {}",
                dialect,
                scalar
            );
        }
    }
}

#[test]
fn bigint_wire_form_differs_on_sqlite() {
    let field = FieldType::scalar(ScalarType::BigInt);
    let small = Value::BigInt(42);
    assert_eq!(
        Dialect::SQLite.generator().to_database(&small, field).unwrap(),
        Value::Int(42)
    );
    assert_eq!(
        Dialect::Postgres.generator().to_database(&small, field).unwrap(),
        Value::from("42")
    );
}
