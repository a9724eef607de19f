//! Tier 3: Search, allow-list and dispatch errors.

use crudtable::{Args, CrudConfig, ErrorKind, LocalTransport, RemoteClient};

use crate::test_utils::{crud, list_len, record};

#[test]
fn search_requires_an_indexed_field_and_equals() {
    let (crud, _) = crud(CrudConfig::new("t"));
    assert_eq!(
        crud.search("color=red").error_kind(),
        Some(ErrorKind::InvalidQuery)
    );
    assert_eq!(
        crud.search("status").error_kind(),
        Some(ErrorKind::InvalidQuery)
    );
    assert!(crud.search("status=active").is_successful());
}

#[test]
fn search_by_identity_uses_table_key() {
    let (crud, _) = crud(CrudConfig::new("t"));
    crud.create(record(serde_json::json!({"id": "abc"})));
    assert_eq!(list_len(&crud.search("id=abc")), 1);
    assert_eq!(list_len(&crud.search("id=xyz")), 0);
}

#[test]
fn restricted_allow_list_rejects_create() {
    let (crud, table) = crud(CrudConfig::new("t").with_supported_ops(["list", "get"]));
    let direct = crud.create(record(serde_json::json!({"id": "a"})));
    assert_eq!(direct.error_kind(), Some(ErrorKind::UnsupportedOperation));

    let reply = crud.handle_payload(serde_json::json!({"operation": "create", "item": {"id": "a"}}));
    assert_eq!(reply["error_type"], "UnsupportedOperation");
    assert!(table.is_empty());
}

#[test]
fn dispatch_error_taxonomy() {
    let (crud, _) = crud(CrudConfig::new("t"));
    let cases = [
        (serde_json::json!({}), "MissingOperation"),
        (serde_json::json!({"operation": "teleport"}), "UnsupportedOperation"),
        (serde_json::json!({"operation": "get"}), "MissingParameter"),
        (serde_json::json!({"operation": "get", "id": null}), "IDRequired"),
        (serde_json::json!({"operation": "get", "id": "none"}), "NotFound"),
        (serde_json::json!({"operation": "search", "query": "x=1"}), "InvalidQuery"),
        (serde_json::json!({"operation": "update", "item": {}}), "MissingRequiredAttributes"),
    ];
    for (payload, expected) in cases {
        let reply = crud.handle_payload(payload.clone());
        assert_eq!(reply["status"], "error", "{}", payload);
        assert_eq!(reply["error_type"], expected, "{}", payload);
    }
}

#[test]
fn remote_client_matches_direct_calls() {
    let (crud, _) = crud(CrudConfig::new("t"));
    let client = RemoteClient::new(LocalTransport::new(crud.clone()));

    let created = client
        .create(record(serde_json::json!({"id": "r1", "status": "new", "n": 2.0})))
        .unwrap();
    assert!(created.is_successful());

    let remote = client.get("r1", false).unwrap();
    let direct = crud.get("r1", false);
    assert_eq!(remote.data, direct.data);

    let reply = client
        .call_operation("GET", {
            let mut args = Args::new();
            args.insert("id".into(), "r1".into());
            args
        })
        .unwrap();
    assert_eq!(reply.data, direct.data);
}
