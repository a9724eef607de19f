//! Tier 4: Concurrency and bulk operations.

use std::sync::{Arc, Barrier};
use std::thread;

use crudtable::{CrudConfig, Value};

use crate::test_utils::{crud, data, list_len, record};

#[test]
fn concurrent_increments_are_not_lost() {
    let (crud, _) = crud(CrudConfig::new("t"));
    data(&crud.create(record(serde_json::json!({"id": "page", "views": 0}))));

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let crud = Arc::clone(&crud);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                crud.increment_counter("page", "views", 1)
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().is_successful());
    }
    assert_eq!(data(&crud.get("page", false))["views"], Value::Int(2));
}

#[test]
fn many_threads_many_increments() {
    let (crud, _) = crud(CrudConfig::new("t"));
    data(&crud.create(record(serde_json::json!({"id": "c", "hits": 0}))));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let crud = Arc::clone(&crud);
            thread::spawn(move || {
                for _ in 0..50 {
                    assert!(crud.increment_counter("c", "hits", 1).is_successful());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(data(&crud.get("c", false))["hits"], Value::Int(400));
}

#[test]
fn bulk_delete_removes_exactly_the_matches() {
    let (crud, table) = crud(CrudConfig::new("t").with_prototype(record(
        serde_json::json!({"id": "<on-create:uuid>", "status": "active"}),
    )));
    for _ in 0..7 {
        data(&crud.create(record(serde_json::json!({"status": "inactive"}))));
    }
    for _ in 0..3 {
        data(&crud.create(record(serde_json::json!({}))));
    }

    let response = crud.bulk_delete("status=inactive");
    assert_eq!(data(&response)["deleted"], Value::Int(7));
    assert_eq!(table.len(), 3);
    assert_eq!(list_len(&crud.search("status=active")), 3);
}
