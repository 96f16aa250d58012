use sqlsnap_check::{
    QueryValidator, Strictness, TableName, Violation, analyze_select, check_predicate_balance,
    extract_table_name, is_predicate_char, sanitize_where_clause, validate_query_for_sql_injection,
    validate_select_query,
};

fn violation_of(query: &str) -> Option<Violation> {
    validate_select_query(query).err().and_then(|e| e.violation())
}

#[test]
fn non_select_prefix_is_rejected() {
    for q in [
        "INSERT INTO t VALUES (1)",
        "with x as (select 1) select * from x",
        "  select * from t",
    ] {
        assert_eq!(violation_of(q), Some(Violation::MissingSelect), "{q}");
    }
}

#[test]
fn plain_select_passes() {
    for q in [
        "SELECT * FROM t",
        "select id, name from items where id > 3",
        "SELECT a FROM b WHERE c = 'd' ORDER BY a",
    ] {
        assert!(validate_select_query(q).is_ok(), "{q}");
    }
}

#[test]
fn forbidden_words_fail_everywhere() {
    assert_eq!(
        violation_of("SELECT * FROM t WHERE note = 'please truncate'"),
        Some(Violation::UnsafePattern("truncate"))
    );
    // Rules run in order: no SELECT wins over the keyword.
    assert_eq!(violation_of("DROP TABLE users"), Some(Violation::MissingSelect));
    assert!(validate_query_for_sql_injection("DROP TABLE users").is_err());
}

#[test]
fn statement_chaining_is_rejected_before_extraction() {
    let err = extract_table_name("; DROP TABLE users").unwrap_err();
    assert_eq!(err.violation(), Some(Violation::MissingSelect));

    let err = extract_table_name("SELECT * FROM users; DROP TABLE users").unwrap_err();
    assert_eq!(err.violation(), Some(Violation::UnsafePattern("drop")));
}

#[test]
fn extracts_lowercased_table() {
    let table = extract_table_name("SELECT * FROM Users WHERE id = 1").unwrap();
    assert_eq!(table, TableName::parse("users").unwrap());
    assert_eq!(table.to_string(), "users");
}

#[test]
fn hardened_validator_blocks_comments() {
    let validator = QueryValidator::new(Strictness::Hardened);
    let err = validator
        .analyze("SELECT * FROM users WHERE id = 1 -- AND tenant = 2")
        .unwrap_err();
    assert_eq!(err.violation(), Some(Violation::SuspiciousSequence("--")));

    let parts = QueryValidator::structural()
        .analyze("SELECT * FROM users WHERE id = 1 -- AND tenant = 2")
        .unwrap();
    assert_eq!(parts.predicate, "id = 1");
}

#[test]
fn sanitized_predicates_only_hold_whitelisted_chars() {
    let queries = [
        "SELECT * FROM t WHERE a = 1; DELETE FROM t",
        "SELECT * FROM t WHERE a <> 'x' || chr(59)",
        "SELECT * FROM t WHERE j->>'k' = 'v'",
        "SELECT * FROM t WHERE n BETWEEN -1 AND 1.5",
    ];
    for q in queries {
        let parts = analyze_select(q).unwrap();
        let clean = sanitize_where_clause(&parts.predicate);
        assert!(clean.chars().all(is_predicate_char), "{q}");
        assert!(!clean.contains(';') && !clean.contains("--"), "{q}");
        assert_eq!(sanitize_where_clause(&clean), clean);
    }
}

#[test]
fn subquery_predicates_stay_balanced() {
    let parts =
        analyze_select("SELECT * FROM orders WHERE id IN (SELECT order_id FROM lines) LIMIT 10")
            .unwrap();
    let clean = sanitize_where_clause(&parts.predicate);
    assert_eq!(clean, "id IN (SELECT order_id FROM lines)");
    assert!(check_predicate_balance(&clean).is_ok());
}

#[test]
fn nested_comment_cannot_widen_the_predicate() {
    let parts = QueryValidator::structural()
        .analyze("SELECT * FROM accounts WHERE id = 1 /* note /* inner */ OR 1=1 */")
        .unwrap();
    assert_eq!(parts.predicate, "id = 1");
    assert_eq!(sanitize_where_clause(&parts.predicate), "id = 1");
}

#[test]
fn unterminated_comment_is_rejected() {
    let err = QueryValidator::structural()
        .analyze("SELECT * FROM accounts WHERE id = 1 /* a /* b */ OR 1=1")
        .unwrap_err();
    assert_eq!(
        err.violation(),
        Some(Violation::MalformedText("unterminated comment"))
    );
}

#[test]
fn quoted_bodies_keep_their_keywords() {
    let parts = analyze_select("SELECT * FROM notes WHERE body = $$ it's ORDER BY $$ ORDER BY id")
        .unwrap();
    assert_eq!(parts.predicate, "body = $$ it's ORDER BY $$");

    let parts = analyze_select(r"SELECT * FROM paths WHERE p = E'C:\\' LIMIT 1").unwrap();
    assert_eq!(parts.table.to_string(), "paths");
    assert_eq!(parts.predicate, r"p = E'C:\\'");
}
