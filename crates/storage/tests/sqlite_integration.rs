use chrono::Duration;
use fraction_core::model::{ErrorLog, Progress, Session, SessionId, SessionNumber};
use fraction_core::time::fixed_now;
use serde_json::json;
use storage::repository::{KeyValueStore, Storage, StorageKey};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_kv_roundtrip() {
    let repo = connect("memdb_kv_roundtrip").await;

    assert_eq!(repo.load(StorageKey::Progress).await.unwrap(), None);

    repo.save(StorageKey::Progress, json!({"current": 1}))
        .await
        .unwrap();
    repo.save(StorageKey::Progress, json!({"current": 2}))
        .await
        .unwrap();
    assert_eq!(
        repo.load(StorageKey::Progress).await.unwrap(),
        Some(json!({"current": 2}))
    );

    repo.remove(StorageKey::Progress).await.unwrap();
    repo.remove(StorageKey::Progress).await.unwrap();
    assert_eq!(repo.load(StorageKey::Progress).await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn curriculum_state_survives_sqlite() {
    let storage = Storage::sqlite("sqlite:file:memdb_curriculum?mode=memory&cache=shared")
        .await
        .expect("storage");
    let repo = storage.curriculum();

    let mut progress = Progress::default();
    progress.record_practice(86.0, 2.0);
    progress.record_pass(SessionNumber::FIRST);
    repo.save_progress(&progress).await.unwrap();

    let mut session = Session::start(SessionId::random(), SessionNumber::FIRST, fixed_now());
    repo.save_session(&session).await.unwrap();
    session
        .finalize(fixed_now() + Duration::minutes(35), 91.67, true)
        .unwrap();
    repo.save_session(&session).await.unwrap();

    let entry = ErrorLog::new(
        SessionNumber::FIRST,
        "00000000-0000-0000-0000-000000000001".parse().unwrap(),
        "incorrect-comparison",
        fixed_now(),
    );
    repo.append_error_log(entry.clone()).await.unwrap();

    assert_eq!(repo.load_progress().await.unwrap(), progress);
    assert_eq!(repo.load_sessions().await.unwrap(), vec![session]);
    assert_eq!(repo.load_error_logs().await.unwrap(), vec![entry]);

    repo.reset_all().await.unwrap();
    assert_eq!(repo.load_progress().await.unwrap(), Progress::default());
    assert!(repo.load_sessions().await.unwrap().is_empty());
}
