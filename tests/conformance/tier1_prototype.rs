//! Tier 1: Prototype resolution through create and update.

use crudtable::{
    CrudConfig, ErrorKind, Lifecycle, PrototypeTemplate, Value, ValueType,
};
use proptest::prelude::*;

use crate::test_utils::{crud, data, record};

#[test]
fn create_fills_computed_id_and_static_default() {
    let (crud, _) = crud(CrudConfig::new("t").with_prototype(record(
        serde_json::json!({"id": "<on-create:uuid>", "fie": 1}),
    )));

    let created = data(&crud.create(record(serde_json::json!({}))));
    let id = created["id"].as_str().expect("id should be a string").to_string();
    assert!(uuid::Uuid::parse_str(&id).is_ok());
    assert_eq!(created["fie"], Value::Int(1));

    let mut item = created.clone();
    item.insert("fie".into(), Value::Int(2));
    let updated = data(&crud.update(item));
    assert_eq!(updated["id"], Value::from(id.as_str()));
    assert_eq!(updated["fie"], Value::Int(2));
}

#[test]
fn on_create_uuid_differs_between_creates() {
    let (crud, table) = crud(
        CrudConfig::new("t").with_prototype(record(serde_json::json!({"id": "<on-create:uuid>"}))),
    );
    let a = data(&crud.create(record(serde_json::json!({}))));
    let b = data(&crud.create(record(serde_json::json!({}))));
    assert_ne!(a["id"], b["id"]);
    assert_eq!(table.len(), 2);
}

#[test]
fn on_update_timestamp_absent_after_create_and_refreshed_on_update() {
    let (crud, _) = crud(CrudConfig::new("t").with_prototype(record(serde_json::json!({
        "id": "<on-create:uuid>",
        "modified_at": "<on-update:timestamp>",
    }))));
    let created = data(&crud.create(record(serde_json::json!({}))));
    assert!(!created.contains_key("modified_at"));

    let mut item = created.clone();
    item.insert("modified_at".into(), Value::Int(0));
    let first = data(&crud.update(item.clone()));
    let stamp = first["modified_at"].as_i64().expect("timestamp");
    assert!(stamp > 0);

    let second = data(&crud.update(item));
    assert!(second["modified_at"].as_i64().expect("timestamp") >= stamp);
}

#[test]
fn unknown_token_is_a_literal_default() {
    let template = PrototypeTemplate::from_definition(record(
        serde_json::json!({"tag": "<on-foobar:uuid>"}),
    ))
    .unwrap();
    let outcome = template.check(record(serde_json::json!({})), Lifecycle::Create);
    assert!(outcome.is_ok());
    assert_eq!(outcome.record["tag"], Value::from("<on-foobar:uuid>"));
}

#[test]
fn type_mismatch_through_facade() {
    let (crud, table) = crud(CrudConfig::new("t").with_prototype(record(
        serde_json::json!({"id": "<on-create:uuid>", "count": "<type:int>"}),
    )));
    let response = crud.create(record(serde_json::json!({"count": "many"})));
    assert_eq!(response.error_kind(), Some(ErrorKind::InvalidType));
    assert!(response
        .error_message
        .as_deref()
        .unwrap_or_default()
        .contains("count"));
    assert!(table.is_empty());
}

fn arb_typed() -> impl Strategy<Value = (ValueType, Value)> {
    prop_oneof![
        any::<i64>().prop_map(|i| (ValueType::Integer, Value::Int(i))),
        any::<bool>().prop_map(|b| (ValueType::Bool, Value::Bool(b))),
        "[a-z]{0,8}".prop_map(|s| (ValueType::String, Value::String(s))),
    ]
}

proptest! {
    #[test]
    fn type_constraint_keeps_or_rejects((declared, _) in arb_typed(), (actual, value) in arb_typed()) {
        let template = PrototypeTemplate::from_definition(record(
            serde_json::json!({ "f": format!("<type:{}>", declared) }),
        ))
        .unwrap();

        let mut input = crudtable::Record::new();
        input.insert("f".into(), value.clone());
        let present = template.check(input, Lifecycle::Create);
        if declared == actual {
            prop_assert!(present.is_ok());
            prop_assert_eq!(&present.record["f"], &value);
        } else {
            prop_assert!(present.result.is_err());
        }

        let absent = template.check(crudtable::Record::new(), Lifecycle::Update);
        prop_assert!(absent.is_ok());
        prop_assert_eq!(&absent.record["f"], &declared.zero_value());
    }
}
