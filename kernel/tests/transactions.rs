mod common;

use std::sync::Arc;

use anyhow::Result;

use common::{attrs, n, s, Call, MemoryBackend};
use itemstore_kernel::request::ReturnValues;
use itemstore_kernel::txn::RollbackOrder;
use itemstore_kernel::{Action, Datastore, Request, Storer, UpdateAction, Value};

fn store() -> Datastore<Arc<MemoryBackend>> {
    Datastore::new(Arc::new(MemoryBackend::default())).with_table_prefix("dev_")
}

fn last_call(store: &Datastore<Arc<MemoryBackend>>) -> Call {
    store.backend().calls().pop().expect("a backend call")
}

#[test]
fn rollback_of_put_deletes_item() -> Result<()> {
    let mut store = store();

    store.start_transaction();
    store.run(Request::new("users", Action::Put).key("id", "u1").item("name", "Ada"))?;
    let failures = store.rollback();
    assert!(failures.is_empty());

    let Call::Delete(input) = last_call(&store) else {
        panic!("expected a compensating delete");
    };
    assert_eq!(input.table_name, "dev_users");
    assert_eq!(input.key, attrs(&[("id", s("u1"))]));

    let found = store.run(Request::new("users", Action::Get).key("id", "u1").live_data())?;
    assert_eq!(found.item_count(), 0);
    Ok(())
}

#[test]
fn rollback_evicts_cached_reads() -> Result<()> {
    let mut store = store();

    store.start_transaction();
    store.run(Request::new("users", Action::Put).key("id", "u1").item("name", "Ada"))?;
    let before = store.run(Request::new("users", Action::Get).key("id", "u1"))?;
    assert_eq!(before.item_count(), 1);

    assert!(store.rollback().is_empty());

    let after = store.run(Request::new("users", Action::Get).key("id", "u1"))?;
    assert_eq!(after.item_count(), 0);
    assert_eq!(store.backend().table_len("dev_users"), 0);
    Ok(())
}

#[test]
fn rollback_of_delete_restores_item() -> Result<()> {
    let mut store = store();
    store.backend().seed("dev_users", attrs(&[("id", s("u1")), ("age", n(36))]));

    store.start_transaction();
    store.run(Request::new("users", Action::Delete).key("id", "u1"))?;
    assert_eq!(store.backend().table_len("dev_users"), 0);

    assert!(store.rollback().is_empty());
    assert_eq!(
        store.backend().stored("dev_users", &attrs(&[("id", s("u1"))])),
        Some(attrs(&[("id", s("u1")), ("age", n(36))]))
    );
    Ok(())
}

#[test]
fn writes_request_old_values_only_inside_transaction() -> Result<()> {
    let mut store = store();
    let update = || {
        Request::new("users", Action::Update)
            .key("id", "u1")
            .update("name", UpdateAction::Put, "Ada")
    };

    store.run(update())?;
    let Call::Update(outside) = last_call(&store) else {
        panic!("expected an update");
    };
    assert_eq!(outside.return_values, ReturnValues::None);

    store.start_transaction();
    store.run(update())?;
    let Call::Update(inside) = last_call(&store) else {
        panic!("expected an update");
    };
    assert_eq!(inside.return_values, ReturnValues::AllOld);
    Ok(())
}

#[test]
fn rollback_of_update_restores_and_removes_paths() -> Result<()> {
    let mut store = store();
    store.backend().seed("dev_users", attrs(&[("id", s("u1")), ("name", s("Ada"))]));

    store.start_transaction();
    store.run(
        Request::new("users", Action::Update)
            .key("id", "u1")
            .update("name", UpdateAction::Put, "Grace")
            .update("nickname", UpdateAction::Put, "G"),
    )?;
    assert!(store.rollback().is_empty());

    let Call::Update(input) = last_call(&store) else {
        panic!("expected a compensating update");
    };
    assert_eq!(input.table_name, "dev_users");
    assert_eq!(input.update_expression, "SET #0ename0 = :val0 REMOVE #1ename0");
    assert_eq!(input.expression_attribute_names["#0ename0"], "name");
    assert_eq!(input.expression_attribute_names["#1ename0"], "nickname");
    assert_eq!(input.expression_attribute_values[":val0"], s("Ada"));
    Ok(())
}

#[test]
fn rollback_of_creating_update_deletes_item() -> Result<()> {
    let mut store = store();

    store.start_transaction();
    store.run(
        Request::new("users", Action::Update)
            .key("id", "u2")
            .update("name", UpdateAction::Put, "Ada"),
    )?;
    assert_eq!(store.backend().table_len("dev_users"), 1);

    assert!(store.rollback().is_empty());
    assert!(matches!(last_call(&store), Call::Delete(_)));
    assert_eq!(store.backend().table_len("dev_users"), 0);
    Ok(())
}

#[test]
fn reads_are_logged_without_compensation() -> Result<()> {
    let mut store = store();
    store.backend().seed("dev_users", attrs(&[("id", s("u1"))]));

    store.start_transaction();
    store.run(Request::new("users", Action::Get).key("id", "u1"))?;
    store.run(Request::new("users", Action::Query))?;
    assert_eq!(store.pending_operations(), 2);

    store.backend().clear_calls();
    assert!(store.rollback().is_empty());
    assert!(store.backend().calls().is_empty());
    Ok(())
}

#[test]
fn failed_operations_are_not_logged() {
    let mut store = store();
    store.backend().fail("put");

    store.start_transaction();
    assert!(store
        .run(Request::new("users", Action::Put).key("id", "u1"))
        .is_err());
    assert_eq!(store.pending_operations(), 0);
}

#[test]
fn rollback_attempts_every_compensation() -> Result<()> {
    let mut store = store();

    store.start_transaction();
    store.run(Request::new("users", Action::Put).key("id", "u1"))?;
    store.run(Request::new("users", Action::Put).key("id", "u2"))?;

    store.backend().fail("delete");
    let failures = store.rollback();

    assert_eq!(failures.len(), 2);
    assert!(failures.iter().all(|err| err.code() == "DeleteItemFailed"));
    assert!(store.transaction_id().is_none());
    Ok(())
}

#[test]
fn rollback_order_is_configurable() -> Result<()> {
    let deleted_keys = |order: RollbackOrder| -> Result<Vec<Value>> {
        let mut store = store();
        store.set_rollback_order(order);

        store.start_transaction();
        store.run(Request::new("users", Action::Put).key("id", "a"))?;
        store.run(Request::new("users", Action::Put).key("id", "b"))?;
        store.backend().clear_calls();
        assert!(store.rollback().is_empty());

        Ok(store
            .backend()
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete(input) => input
                    .key
                    .get("id")
                    .and_then(|v| v.as_s().ok())
                    .map(|id| Value::from(id.as_str())),
                _ => None,
            })
            .collect())
    };

    assert_eq!(
        deleted_keys(RollbackOrder::Recorded)?,
        vec![Value::from("a"), Value::from("b")]
    );
    assert_eq!(
        deleted_keys(RollbackOrder::Reverse)?,
        vec![Value::from("b"), Value::from("a")]
    );
    Ok(())
}

#[test]
fn finish_forgets_the_log() -> Result<()> {
    let mut store = store();

    store.start_transaction();
    assert!(store.transaction_id().is_some());
    store.run(Request::new("users", Action::Put).key("id", "u1"))?;
    store.finish_transaction();

    store.backend().clear_calls();
    assert!(store.rollback().is_empty());
    assert!(store.backend().calls().is_empty());
    assert_eq!(store.backend().table_len("dev_users"), 1);
    Ok(())
}

#[test]
fn restart_drops_recorded_operations() -> Result<()> {
    let mut store = store();

    store.start_transaction();
    let first = store.transaction_id();
    store.run(Request::new("users", Action::Put).key("id", "u1"))?;

    store.start_transaction();
    assert_ne!(store.transaction_id(), first);
    assert_eq!(store.pending_operations(), 0);
    Ok(())
}
