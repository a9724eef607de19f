//! Tier 2: Read path normalization and envelope shape.

use crudtable::{CrudConfig, ErrorKind, Response, Status, Value};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::test_utils::{crud, data, record};

#[test]
fn stored_numbers_read_back_normalized() {
    let (crud, _) = crud(CrudConfig::new("t"));
    crud.create(record(serde_json::json!({
        "id": "n",
        "whole": 4.0,
        "fraction": 4.5,
        "nested": {"list": [1.0, 2.5, {"deep": 3.0}]},
    })));
    let item = data(&crud.get("n", false));
    assert_eq!(item["whole"], Value::Int(4));
    assert_eq!(item["fraction"], Value::Float(4.5));
    assert_eq!(
        item["nested"],
        Value::Map(record(serde_json::json!({"list": [1, 2.5, {"deep": 3}]})))
    );
}

#[test]
fn list_is_normalized_too() {
    let (crud, _) = crud(CrudConfig::new("t"));
    crud.create(record(serde_json::json!({"id": "a", "v": 10.0})));
    match crud.list().data {
        Value::List(items) => {
            assert_eq!(items[0].as_map().unwrap()["v"], Value::Int(10));
        }
        other => panic!("expected list, got {:?}", other),
    }
}

#[test]
fn get_missing_identity_is_not_found() {
    let (crud, _) = crud(CrudConfig::new("t"));
    let response = crud.get("ghost", false);
    assert_eq!(response.status, Status::Error);
    assert_eq!(response.error_kind(), Some(ErrorKind::NotFound));
    assert!(response.data.is_null());
}

#[test]
fn successful_calls_carry_metadata_not_raw() {
    let (crud, _) = crud(CrudConfig::new("t"));
    let response = crud.list();
    let metadata = response.metadata.as_ref().expect("metadata");
    assert_eq!(metadata.http_status_code, 200);
    assert!(uuid::Uuid::parse_str(&metadata.request_id).is_ok());
    assert!(response.raw_response.is_none());
}

#[test]
fn wire_envelope_survives_json_text() {
    let (crud, _) = crud(CrudConfig::new("t"));
    crud.create(record(serde_json::json!({"id": "a", "x": 1})));
    let response = crud.get("a", false);
    let text = serde_json::to_string(&response.flatten()).unwrap();
    let back = Response::from_json(serde_json::from_str(&text).unwrap()).unwrap();
    assert_eq!(back, response);
}

proptest! {
    #[test]
    fn normalization_of_decimals(mantissa in -1_000_000i64..1_000_000, scale in 0u32..4) {
        let decimal = Decimal::new(mantissa, scale);
        let normalized = Value::Decimal(decimal).normalize();
        if decimal.fract().is_zero() {
            prop_assert_eq!(normalized, Value::Int(mantissa / 10i64.pow(scale)));
        } else {
            prop_assert!(matches!(normalized, Value::Float(_)));
        }
    }
}
