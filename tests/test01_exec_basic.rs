use serde_json::json;
use sqlite_bridge::prelude::*;

async fn memory_db() -> Database {
    let db = Database::new();
    assert_eq!(db.open(":memory:").await, SQLITE_OK);
    db
}

#[tokio::test]
async fn select_literal_yields_compact_integer() -> Result<(), SqliteBridgeError> {
    let db = memory_db().await;
    let rows = db.exec("SELECT 1 AS a").await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.results[0].get("a"), Some(&CellValue::Integer(1)));
    assert_eq!(rows.to_json(), json!([{ "a": 1 }]));
    Ok(())
}

#[tokio::test]
async fn select_null_yields_null() -> Result<(), SqliteBridgeError> {
    let db = memory_db().await;
    let rows = db.exec("SELECT NULL AS a").await?;
    assert_eq!(rows.results[0].get("a"), Some(&CellValue::Null));
    assert_eq!(rows.to_json(), json!([{ "a": null }]));
    Ok(())
}

#[tokio::test]
async fn side_effect_statements_contribute_no_rows() -> Result<(), SqliteBridgeError> {
    let db = memory_db().await;
    let rows = db
        .exec("CREATE TABLE t(x); INSERT INTO t VALUES (1); SELECT x FROM t")
        .await?;
    assert_eq!(rows.to_json(), json!([{ "x": 1 }]));

    let none = db.exec("INSERT INTO t VALUES (2); UPDATE t SET x = x + 1").await?;
    assert!(none.is_empty());
    assert!(none.columns().is_none());
    Ok(())
}

#[tokio::test]
async fn two_table_batch_matches_host_expectation() -> Result<(), SqliteBridgeError> {
    let db = memory_db().await;
    let rows = db
        .exec(
            "CREATE TABLE test (id INTEGER, name TEXT); \
             INSERT INTO test VALUES (1, 'Alice'), (2, 'Bob'); \
             SELECT * FROM test;",
        )
        .await?;
    assert_eq!(
        rows.to_json(),
        json!([{ "id": 1, "name": "Alice" }, { "id": 2, "name": "Bob" }])
    );
    Ok(())
}

#[tokio::test]
async fn malformed_third_statement_fails_without_partial_rows() -> Result<(), SqliteBridgeError> {
    let db = memory_db().await;
    db.exec("CREATE TABLE t(x)").await?;

    let err = db
        .exec("INSERT INTO t VALUES (1); SELECT x FROM t; SELEC x FROM t")
        .await
        .expect_err("third statement is malformed");
    assert_eq!(err.to_string(), r#"near "SELEC": syntax error"#);
    assert_eq!(err.sqlite_code(), Some(1));
    assert!(err.diagnostic().is_some());

    // The INSERT before the failure still happened.
    let rows = db.exec("SELECT count(*) AS n FROM t").await?;
    assert_eq!(rows.results[0].get("n"), Some(&CellValue::Integer(1)));
    Ok(())
}

#[tokio::test]
async fn malformed_second_of_two_statements_keeps_first_side_effect() -> Result<(), SqliteBridgeError>
{
    let db = memory_db().await;
    db.exec("CREATE TABLE t(x)").await?;

    let err = db
        .exec("INSERT INTO t VALUES (1); SELEC x FROM t")
        .await
        .expect_err("second statement is malformed");
    match &err {
        SqliteBridgeError::Statement { index, sql, .. } => {
            assert_eq!(*index, 1);
            assert!(sql.is_none());
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.to_string(), r#"near "SELEC": syntax error"#);
    // SQLITE_ERROR
    assert_eq!(err.sqlite_code(), Some(1));

    let rows = db.exec("SELECT x FROM t").await?;
    assert_eq!(rows.to_json(), json!([{ "x": 1 }]));
    Ok(())
}

#[tokio::test]
async fn runtime_error_mid_batch_reports_engine_text() -> Result<(), SqliteBridgeError> {
    let db = memory_db().await;
    let err = db
        .exec("CREATE TABLE t(x NOT NULL); INSERT INTO t VALUES (NULL)")
        .await
        .expect_err("constraint should fail");
    assert!(err.to_string().contains("NOT NULL constraint failed"), "{err}");
    assert_eq!(
        err.diagnostic().as_deref(),
        Some("statement #1: INSERT INTO t VALUES (NULL)")
    );
    Ok(())
}

#[tokio::test]
async fn exec_before_open_is_not_initialized() {
    let db = Database::new();
    let err = db.exec("SELECT 1").await.expect_err("nothing is open");
    assert!(matches!(err, SqliteBridgeError::NotInitialized));
    assert_eq!(err.to_string(), "database not initialized");
    assert_eq!(err.sqlite_code(), None);
}

#[tokio::test]
async fn exec_after_close_is_not_initialized() {
    let db = memory_db().await;
    assert_eq!(db.close().await, SQLITE_OK);
    let err = db.exec("SELECT 1").await.expect_err("closed");
    assert!(matches!(err, SqliteBridgeError::NotInitialized));
}

#[tokio::test]
async fn close_twice_returns_ok_both_times() {
    let db = memory_db().await;
    assert_eq!(db.close().await, SQLITE_OK);
    assert_eq!(db.close().await, SQLITE_OK);
}

#[tokio::test]
async fn reopen_after_close_gets_a_fresh_database() -> Result<(), SqliteBridgeError> {
    let db = memory_db().await;
    db.exec("CREATE TABLE gone(x)").await?;
    assert_eq!(db.close().await, SQLITE_OK);
    assert_eq!(db.open(":memory:").await, SQLITE_OK);
    let err = db.exec("SELECT * FROM gone").await.expect_err("new memory db");
    assert!(err.to_string().contains("no such table"), "{err}");
    Ok(())
}

#[tokio::test]
async fn generic_executor_seam() -> Result<(), SqliteBridgeError> {
    async fn count_rows<E: AsyncSqlExecutor + Sync>(
        executor: &E,
        sql: &str,
    ) -> Result<usize, SqliteBridgeError> {
        Ok(executor.execute(sql).await?.len())
    }

    let db = memory_db().await;
    let n = count_rows(&db, "SELECT 1 UNION ALL SELECT 2 UNION ALL SELECT 3").await?;
    assert_eq!(n, 3);
    Ok(())
}
