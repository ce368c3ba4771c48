//! Terminal operations against a recording executor.

mod common;

use common::Recorder;
use fluentsql::prelude::*;

fn users() -> Table {
    Table::aliased("users", "u")
}

#[tokio::test]
async fn query_sends_compiled_statement() {
    let exe = Recorder::new().returning(vec![
        Record::from_pairs([("id", Value::Int(1))]),
        Record::from_pairs([("id", Value::Int(2))]),
    ]);
    let db = Database::new(exe, Dialect::Mssql2005);
    let u = users();

    let rows = db
        .select(u.columns(&["id"]))
        .from(u.clone())
        .filter(Filters::new().add_on(&u, "active", Op::Eq, true))
        .order_by(u.sort(SortOrder::Asc, &["id"]))
        .limit(0, 2)
        .query()
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    let sent = db.executor().last();
    assert_eq!(
        sent.sql,
        "SELECT TOP 2 [u].[id] FROM [users] AS [u] WHERE [u].[active]=? ORDER BY [u].[id] ASC"
    );
    assert_eq!(sent.params, vec![Value::Bool(true)]);
}

#[tokio::test]
async fn query_one_returns_first_row_or_not_found() {
    let exe = Recorder::new()
        .returning(vec![
            Record::from_pairs([("name", "ann")]),
            Record::from_pairs([("name", "bob")]),
        ])
        .returning(vec![]);
    let db = Database::new(exe, Dialect::Mysql);
    let t = Table::new("users");

    let first = db
        .select(t.columns(&["name"]))
        .from(t.clone())
        .query_one()
        .await
        .unwrap();
    assert_eq!(first.try_get::<String>("name").unwrap(), "ann");

    let err = db
        .select(t.columns(&["name"]))
        .from(t.clone())
        .filter(Filters::new().eq("id", -1))
        .query_one()
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn build_errors_never_reach_the_executor() {
    let db = Database::new(Recorder::new(), Dialect::Mssql);
    let u = users();
    let o = Table::new("orders");

    let err = db
        .select(u.columns(&["id"]))
        .from(u.clone())
        .filter(Filters::new().on(&u, "id", Op::In, &o, "user_id"))
        .query()
        .await
        .unwrap_err();

    assert!(err.is_build_error());
    assert_eq!(db.executor().count(), 0);

    let err = db
        .insert("users")
        .values(InsertValues::new())
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, SqlError::InvalidStatement(_)));
    assert_eq!(db.executor().count(), 0);
}

#[tokio::test]
async fn execution_errors_propagate_verbatim() {
    let db = Database::new(Recorder::new().failing("deadlock victim"), Dialect::Mssql);
    let err = db
        .delete("users")
        .filter(Filters::new().eq("id", 1))
        .execute()
        .await
        .unwrap_err();
    match err {
        SqlError::Execution(inner) => assert_eq!(inner.to_string(), "deadlock victim"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn execute_reports_affected_rows() {
    let db = Database::new(Recorder::new().affecting(3), Dialect::Postgres);
    let result = db
        .update("users")
        .set(UpdateValues::new().increment("visits", 1).raw("seen_at", "now()"))
        .filter(Filters::new().lt("visits", 10))
        .execute()
        .await
        .unwrap();
    assert_eq!(result.rows_affected, 3);
    assert_eq!(result.last_insert_id, Some(42));
    assert_eq!(
        db.executor().last().sql,
        "UPDATE \"users\" SET \"seen_at\"=now(),\"visits\"=\"visits\"+$1 WHERE \"visits\"<$2"
    );
}

#[tokio::test]
async fn raw_statements_run_unchanged() {
    let exe = Recorder::new().returning(vec![Record::from_pairs([("n", Value::Int(5))])]);
    let db = Database::new(exe, Dialect::Mysql);
    let row = db
        .execute("SELECT COUNT(*) AS n FROM users WHERE age > ?", vec![Value::Int(18)])
        .query_one()
        .await
        .unwrap();
    assert_eq!(row.try_get::<i64>("N").unwrap(), 5);
    assert_eq!(db.executor().last().params, vec![Value::Int(18)]);
}
