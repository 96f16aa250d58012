use super::*;
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

fn pg(value: impl Into<SqlValue>) -> String {
    Dialect::Postgres.render_literal(&value.into()).unwrap()
}

fn ora(value: impl Into<SqlValue>) -> String {
    Dialect::Oracle.render_literal(&value.into()).unwrap()
}

#[test]
fn scalars() {
    assert_eq!(pg(SqlValue::Null), "NULL");
    assert_eq!(ora(None::<i32>), "NULL");
    assert_eq!(pg(42), "42");
    assert_eq!(pg(-7i64), "-7");
    assert_eq!(pg(1.5), "1.5");
    assert_eq!(pg(Decimal::new(12345, 2)), "123.45");
    assert_eq!(pg(true), "true");
    assert_eq!(ora(false), "0");
}

#[test]
fn text_doubles_single_quotes() {
    assert_eq!(pg("O'Brien"), "'O''Brien'");
    assert_eq!(ora("a''b"), "'a''''b'");
    assert_eq!(pg(""), "''");
    assert_eq!(pg("back\\slash"), "'back\\slash'");
}

#[test]
fn non_finite_floats() {
    assert_eq!(pg(f64::NAN), "'NaN'::float8");
    assert_eq!(pg(f64::INFINITY), "'Infinity'::float8");
    assert_eq!(pg(f64::NEG_INFINITY), "'-Infinity'::float8");
    assert_eq!(ora(f64::NAN), "BINARY_DOUBLE_NAN");
    assert_eq!(ora(f64::NEG_INFINITY), "-BINARY_DOUBLE_INFINITY");
}

#[test]
fn bytes() {
    assert_eq!(pg(vec![0xde_u8, 0xad]), "'\\xdead'::bytea");
    assert_eq!(ora(vec![0xde_u8, 0xad]), "HEXTORAW('DEAD')");
}

#[test]
fn uuid_and_json() {
    let id = Uuid::nil();
    assert_eq!(pg(id), "'00000000-0000-0000-0000-000000000000'::uuid");
    assert_eq!(ora(id), "'00000000-0000-0000-0000-000000000000'");

    let doc = serde_json::json!({"k": "it's"});
    assert_eq!(pg(doc.clone()), r#"'{"k":"it''s"}'::jsonb"#);
    assert_eq!(ora(doc), r#"'{"k":"it''s"}'"#);
}

#[test]
fn dates_and_times() {
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    assert_eq!(pg(date), "DATE '2024-02-29'");
    assert_eq!(ora(date), "DATE '2024-02-29'");

    let ts = date.and_hms_milli_opt(13, 5, 9, 250).unwrap();
    assert_eq!(pg(ts), "TIMESTAMP '2024-02-29 13:05:09.250'");
    assert_eq!(pg(ts.time()), "TIME '13:05:09.250'");
    assert_eq!(ora(ts.time()), "'13:05:09.250'");

    let tz = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(pg(tz), "TIMESTAMPTZ '2024-01-02 03:04:05 +00:00'");
    assert_eq!(ora(tz), "TIMESTAMP '2024-01-02 03:04:05 +00:00'");
}

#[test]
fn arrays() {
    let arr = SqlValue::Array(vec![1.into(), SqlValue::Null, 3.into()]);
    assert_eq!(pg(arr.clone()), "ARRAY[1, NULL, 3]");
    assert_eq!(pg(SqlValue::Array(vec![])), "'{}'");

    let err = Dialect::Oracle.render_literal(&arr).unwrap_err();
    assert!(matches!(
        err,
        SnapError::UnsupportedLiteral {
            dialect: "oracle",
            kind: "array"
        }
    ));
}

#[test]
fn identifiers() {
    let d = Dialect::Postgres;
    assert_eq!(d.quote_ident("name"), "name");
    assert_eq!(d.quote_ident("_x$1"), "_x$1");
    assert_eq!(d.quote_ident("Name"), "\"Name\"");
    assert_eq!(d.quote_ident("user"), "\"user\"");
    assert_eq!(d.quote_ident("has space"), "\"has space\"");
    assert_eq!(d.quote_ident("a\"b"), "\"a\"\"b\"");
    assert_eq!(d.quote_ident("1st"), "\"1st\"");
}

#[test]
fn insert_statement() {
    let table = TableName::parse("items").unwrap();
    let id = SqlValue::Int(1);
    let name = SqlValue::from("a");
    let sql = Dialect::Postgres
        .render_insert(&table, &[("id", &id), ("name", &name)])
        .unwrap();
    assert_eq!(sql, "INSERT INTO items (id, name) VALUES (1, 'a')");

    let quoted = TableName::parse(r#"app."Orders""#).unwrap();
    let sql = Dialect::Oracle
        .render_insert(&quoted, &[("order", &id)])
        .unwrap();
    assert_eq!(sql, r#"INSERT INTO app."Orders" ("order") VALUES (1)"#);
}

#[test]
fn wide_and_non_finite_values() {
    let wide = SqlValue::BigNumeric(format!("-1{}.5", "0".repeat(30)));
    assert_eq!(pg(wide.clone()), format!("-1{}.5", "0".repeat(30)));
    assert_eq!(ora(wide), format!("-1{}.5", "0".repeat(30)));

    let inf = SqlValue::NonFinite {
        type_name: "timestamptz",
        text: "-infinity",
    };
    assert_eq!(pg(inf.clone()), "'-infinity'::timestamptz");
    assert!(matches!(
        Dialect::Oracle.render_literal(&inf),
        Err(SnapError::UnsupportedLiteral {
            dialect: "oracle",
            kind: "non-finite value"
        })
    ));
    assert_eq!(
        pg(SqlValue::NonFinite {
            type_name: "numeric",
            text: "NaN"
        }),
        "'NaN'::numeric"
    );
}

#[test]
fn reserved_column_names_are_quoted() {
    for word in ["window", "left", "like", "returning", "current_role", "order", "user"] {
        assert_eq!(
            Dialect::Postgres.quote_ident(word),
            format!("\"{word}\""),
            "postgres {word}"
        );
    }
    for word in ORACLE_RESERVED_WORDS {
        assert_eq!(
            Dialect::Oracle.quote_ident(word),
            format!("\"{word}\""),
            "oracle {word}"
        );
    }
    // Unreserved in one dialect, reserved in the other.
    assert_eq!(Dialect::Postgres.quote_ident("start"), "start");
    assert_eq!(Dialect::Oracle.quote_ident("window"), "window");
}

#[test]
fn insert_quotes_reserved_columns() {
    let table = TableName::parse("events").unwrap();
    let one = SqlValue::Int(1);
    assert_eq!(
        Dialect::Postgres
            .render_insert(&table, &[("window", &one), ("left", &one)])
            .unwrap(),
        r#"INSERT INTO events ("window", "left") VALUES (1, 1)"#
    );
    assert_eq!(
        Dialect::Oracle
            .render_insert(&table, &[("start", &one), ("rows", &one)])
            .unwrap(),
        r#"INSERT INTO events ("start", "rows") VALUES (1, 1)"#
    );
}

#[test]
fn insert_without_columns() {
    let table = TableName::parse("counters").unwrap();
    assert_eq!(
        Dialect::Postgres.render_insert(&table, &[]).unwrap(),
        "INSERT INTO counters DEFAULT VALUES"
    );
    assert!(Dialect::Oracle.render_insert(&table, &[]).is_err());
}

#[test]
fn parse_and_display() {
    assert_eq!("Oracle".parse::<Dialect>().unwrap(), Dialect::Oracle);
    assert_eq!(" postgresql ".parse::<Dialect>().unwrap(), Dialect::Postgres);
    assert!("mysql".parse::<Dialect>().is_err());
    assert_eq!(Dialect::default().to_string(), "postgres");
    assert_eq!(
        serde_json::to_string(&Dialect::Oracle).unwrap(),
        "\"oracle\""
    );
}
