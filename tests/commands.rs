//! End-to-end command behaviour through `dispatch` and the in-memory backend.

use std::sync::Arc;

use cidstore::command::{Command, dispatch};
use cidstore::reply::{ExistReply, SelectAllReply, SelectRowReply};
use cidstore::storage::{MemoryStore, StorageAdapter};
use cidstore::{ContentId, QueryService, ReplyEnvelope};
use serde_json::{Value, json};

struct Fixture {
    service: QueryService,
    store: Arc<MemoryStore>,
    _staging: tempfile::TempDir,
}

fn fixture() -> Fixture {
    let staging = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let service = QueryService::new(StorageAdapter::with_staging_dir(store.clone(), staging.path()));
    Fixture { service, store, _staging: staging }
}

impl Fixture {
    async fn run(&self, command: Command, parameters: Value) -> ReplyEnvelope {
        dispatch(&self.service, command, parameters).await
    }

    async fn insert(&self, file_name: &str, content: &str) -> String {
        let envelope = self
            .run(Command::Insert, json!({ "fields": [file_name], "arguments": [content] }))
            .await;
        assert!(envelope.is_ok(), "{}", envelope.message);
        envelope.parameters["id"].as_str().unwrap().to_string()
    }

    async fn exists(&self, file_name: &str, id: &str) -> bool {
        let envelope = self
            .run(Command::Exist, json!({ "fields": [file_name], "tables": [id] }))
            .await;
        envelope.parameters_as::<ExistReply>().unwrap().exists
    }
}

#[tokio::test]
async fn written_identifier_decodes_to_itself() {
    let f = fixture();
    let id = f.insert("a.txt", "hello").await;
    assert_eq!(ContentId::decode(&id).unwrap().to_string(), id);
}

#[tokio::test]
async fn insert_then_select_row_roundtrip() {
    let f = fixture();
    let id = f.insert("a.txt", "hello").await;

    let envelope = f
        .run(Command::SelectRow, json!({ "fields": ["a.txt"], "tables": [id] }))
        .await;
    let reply: SelectRowReply = envelope.parameters_as().unwrap();
    assert_eq!(reply.outputs.get("a.txt"), Some("hello"));
}

#[tokio::test]
async fn empty_content_reads_back_but_does_not_exist() {
    let f = fixture();
    let id = f.insert("b.txt", "").await;

    let envelope = f
        .run(Command::SelectRow, json!({ "fields": ["b.txt"], "tables": [id] }))
        .await;
    let reply: SelectRowReply = envelope.parameters_as().unwrap();
    assert_eq!(reply.outputs.get("b.txt"), Some(""));
    assert!(!f.exists("b.txt", &id).await);
}

#[tokio::test]
async fn delete_always_yields_the_empty_object() {
    let f = fixture();
    let existing = f.insert("a.txt", "hello").await;
    let empty = f.insert("a.txt", "").await;
    assert!(f.exists("a.txt", &existing).await);
    assert!(!f.exists("a.txt", &empty).await);

    let mut deleted = Vec::new();
    for id in [&existing, &empty] {
        let envelope = f
            .run(Command::Delete, json!({ "fields": ["a.txt"], "tables": [id] }))
            .await;
        assert!(envelope.is_ok(), "{}", envelope.message);
        deleted.push(envelope.parameters["id"].as_str().unwrap().to_string());
    }

    assert_eq!(deleted[0], deleted[1]);
    assert_eq!(deleted[0], empty);
    assert!(!f.exists("a.txt", &deleted[0]).await);
}

#[tokio::test]
async fn update_and_insert_share_addresses() {
    let f = fixture();
    let parameters = json!({ "fields": ["a.txt"], "arguments": ["hello"] });

    let inserted = f.run(Command::Insert, parameters.clone()).await;
    let updated = f.run(Command::Update, parameters).await;
    assert_eq!(inserted.parameters, updated.parameters);
    assert_eq!(f.store.object_count(), 1);
}

#[tokio::test]
async fn select_all_is_ordered_and_atomic() {
    let f = fixture();
    let a = f.insert("a", "first").await;
    let b = f.insert("b", "second").await;

    let envelope = f
        .run(Command::SelectAll, json!({ "fields": ["b", "a"], "tables": [b, a] }))
        .await;
    let reply: SelectAllReply = envelope.parameters_as().unwrap();
    assert_eq!(reply.rows.len(), 2);
    assert_eq!(reply.rows[0].get("b"), Some("second"));
    assert_eq!(reply.rows[1].get("a"), Some("first"));

    // Second row names an entry its object does not hold.
    let envelope = f
        .run(Command::SelectAll, json!({ "fields": ["a", "b"], "tables": [a, a] }))
        .await;
    assert!(!envelope.is_ok());
    assert!(envelope.parameters.is_empty());
    assert!(envelope.message.starts_with("read: "), "{}", envelope.message);
}

#[tokio::test]
async fn select_all_requires_matching_tables() {
    let f = fixture();
    let a = f.insert("a", "first").await;

    let envelope = f
        .run(Command::SelectAll, json!({ "fields": ["a", "b"], "tables": [a] }))
        .await;
    assert!(!envelope.is_ok());
    assert!(envelope.message.starts_with("validate_shape: "));

    let envelope = f.run(Command::SelectAll, json!({})).await;
    assert_eq!(envelope.message, "validate_shape: required at least 1 field, but query is empty");
}

#[tokio::test]
async fn insert_with_non_string_argument_writes_nothing() {
    let f = fixture();
    for argument in [json!(1), json!(true), json!(null), json!(["x"])] {
        let envelope = f
            .run(Command::Insert, json!({ "fields": ["a.txt"], "arguments": [argument] }))
            .await;
        assert!(!envelope.is_ok());
        assert!(envelope.message.starts_with("extract_payload: "));
    }
    assert_eq!(f.store.object_count(), 0);
}

#[tokio::test]
async fn point_commands_reject_invalid_cids() {
    let f = fixture();
    for command in [Command::Exist, Command::SelectRow, Command::Delete] {
        let envelope = f
            .run(command, json!({ "fields": ["abi_id"], "tables": ["storage_abi"] }))
            .await;
        assert!(!envelope.is_ok(), "{}", command);
        assert!(envelope.message.starts_with("resolve_reference: "), "{}", envelope.message);
    }
    assert_eq!(f.store.object_count(), 0);
}

#[tokio::test]
async fn uninitialized_service_fails_every_command() {
    let service = QueryService::uninitialized();
    for command in Command::ALL {
        let envelope = dispatch(&service, command, json!({ "fields": ["a"], "tables": ["b"] })).await;
        assert!(!envelope.is_ok());
        assert_eq!(envelope.message, "backend: storage backend is not initialized");
    }
}

#[tokio::test]
async fn root_file_names_are_rejected_by_every_command() {
    let f = fixture();
    let id = f.insert("a.txt", "hello").await;

    for name in ["", ".", ".."] {
        let envelope = f
            .run(Command::Insert, json!({ "fields": [name], "arguments": ["x"] }))
            .await;
        assert!(envelope.message.starts_with("extract_payload: "), "{}", envelope.message);

        for command in [Command::Exist, Command::SelectRow, Command::Delete] {
            let envelope = f.run(command, json!({ "fields": [name], "tables": [id] })).await;
            assert!(!envelope.is_ok(), "{} {:?}", command, name);
            assert!(envelope.message.starts_with("resolve_reference: "), "{}", envelope.message);
        }
    }
    assert_eq!(f.store.object_count(), 1);
}
