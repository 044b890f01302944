//! Both key-value handlers must agree on typed semantics and atomicity.

use tempfile::TempDir;
use warden_core::{KeyValueEffects, StorageError, WriteBatch};
use warden_effects::{FileKvHandler, MemoryKvHandler};

async fn exercise(store: &dyn KeyValueEffects) {
    assert!(!store.exists("minqlx:players:100").await.unwrap());
    assert!(store.list_range("minqlx:players:100", 0, -1).await.unwrap().is_empty());

    store
        .commit(
            WriteBatch::new()
                .list_push("minqlx:players:100", "first")
                .list_push("minqlx:players:100", "second")
                .list_trim("minqlx:players:100", 0, 0)
                .set_add("minqlx:players", "100")
                .set("minqlx:players:100:last_seen", "2020-01-01 00:00:00"),
        )
        .await
        .unwrap();

    assert_eq!(
        store.list_range("minqlx:players:100", 0, -1).await.unwrap(),
        ["second"]
    );

    let err = store
        .commit(
            WriteBatch::new()
                .set("minqlx:players:100:last_seen", "2030-01-01 00:00:00")
                .list_push("minqlx:players", "not-a-list"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::WrongType { .. }));
    assert_eq!(
        store
            .get("minqlx:players:100:last_seen")
            .await
            .unwrap()
            .as_deref(),
        Some("2020-01-01 00:00:00")
    );

    assert!(matches!(
        store.get("minqlx:players:100").await,
        Err(StorageError::WrongType {
            expected: "scalar",
            ..
        })
    ));
}

#[tokio::test]
async fn memory_handler_conforms() {
    exercise(&MemoryKvHandler::new()).await;
}

#[tokio::test]
async fn file_handler_conforms() {
    let temp_dir = TempDir::new().unwrap();
    let handler = FileKvHandler::open(temp_dir.path().join("kv.json"))
        .await
        .unwrap();
    exercise(&handler).await;

    let reopened = FileKvHandler::open(handler.path()).await.unwrap();
    assert_eq!(
        reopened
            .get("minqlx:players:100:last_seen")
            .await
            .unwrap()
            .as_deref(),
        Some("2020-01-01 00:00:00")
    );
}
