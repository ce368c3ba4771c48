//! `transaction!` commit/rollback behavior.

mod common;

use common::{Log, Recorder};
use fluentsql::prelude::*;

fn order(total: i64) -> InsertValues {
    InsertValues::new().set("total", total)
}

fn database(exe: Recorder) -> (Database<Recorder>, Log) {
    let log = exe.log.clone();
    (Database::new(exe, Dialect::Mysql), log)
}

async fn place_order(db: &mut Database<Recorder>, fail: bool) -> SqlResult<u64> {
    fluentsql::transaction!(db, tx, {
        let inserted = tx.insert("orders").values(order(30)).execute().await?;
        if fail {
            return Err(SqlError::Other("out of stock".into()));
        }
        tx.update("stock")
            .set(UpdateValues::new().increment("qty", -1))
            .filter(Filters::new().eq("sku", "A1"))
            .execute()
            .await?;
        Ok(inserted.rows_affected)
    })
}

#[tokio::test]
async fn ok_commits() {
    let (mut db, log) = database(Recorder::new().affecting(1));
    assert_eq!(place_order(&mut db, false).await.unwrap(), 1);
    assert_eq!(
        log.events(),
        [
            "BEGIN",
            "INSERT INTO `orders`(`total`) VALUES(?)",
            "UPDATE `stock` SET `qty`=`qty`+? WHERE `sku`=?",
            "COMMIT",
        ]
    );
}

#[tokio::test]
async fn err_rolls_back_and_returns_the_error() {
    let (mut db, log) = database(Recorder::new());
    let err = place_order(&mut db, true).await.unwrap_err();
    assert!(matches!(err, SqlError::Other(msg) if msg == "out of stock"));
    assert_eq!(log.events().last().map(String::as_str), Some("ROLLBACK"));
    assert!(!log.events().iter().any(|e| e == "COMMIT"));
}

#[tokio::test]
async fn statement_failure_rolls_back() {
    let (mut db, log) = database(Recorder::new().failing("constraint violated"));
    let err = place_order(&mut db, false).await.unwrap_err();
    assert!(matches!(err, SqlError::Execution(_)));
    assert_eq!(log.events().len(), 3);
    assert_eq!(log.events()[2], "ROLLBACK");
}

async fn panicking(db: &mut Database<Recorder>) -> SqlResult<()> {
    fluentsql::transaction!(db, tx, {
        tx.delete("orders").execute().await?;
        if tx.dialect() == Dialect::Mysql {
            panic!("invariant broken");
        }
        Ok(())
    })
}

#[tokio::test]
async fn panic_is_captured_and_rolled_back() {
    let (mut db, log) = database(Recorder::new());
    let err = panicking(&mut db).await.unwrap_err();
    assert!(matches!(err, SqlError::Panicked(msg) if msg == "invariant broken"));
    assert_eq!(log.events(), ["BEGIN", "DELETE FROM `orders`", "ROLLBACK"]);
}

#[tokio::test]
async fn failed_rollback_reports_both_errors() {
    let mut exe = Recorder::new();
    exe.fail_rollback = true;
    let (mut db, _log) = database(exe);
    let err = place_order(&mut db, true).await.unwrap_err();
    match err {
        SqlError::Other(msg) => {
            assert!(msg.contains("out of stock"));
            assert!(msg.contains("rollback failed"));
            assert!(msg.contains("connection lost"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn failed_commit_is_returned() {
    let mut exe = Recorder::new();
    exe.fail_commit = true;
    let (mut db, log) = database(exe);
    let err = place_order(&mut db, false).await.unwrap_err();
    assert!(matches!(err, SqlError::Other(msg) if msg == "commit refused"));
    assert!(!log.events().iter().any(|e| e == "COMMIT" || e == "ROLLBACK"));
}

#[tokio::test]
async fn manual_begin_and_commit() {
    let (mut db, log) = database(Recorder::new());
    let tx = db.begin().await.unwrap();
    tx.execute("SELECT 1", Vec::new()).execute().await.unwrap();
    tx.commit().await.unwrap();
    assert_eq!(log.events(), ["BEGIN", "SELECT 1", "COMMIT"]);
}
