//! Bindings, acquisition and transactions.

use compono_runtime::*;
use compono_types::test_utils::{CALC_NAMESPACE, CALC_REPO, FixtureLoader, calculator_catalog};
use compono_types::*;
use serde_json::json;

fn runtime() -> Runtime {
    let config = RuntimeConfig::default().with_repo(CALC_NAMESPACE, CALC_REPO);
    Runtime::with_config(calculator_catalog(), FixtureLoader::calculator(), config)
}

fn id(s: &str) -> EntityId {
    EntityId::new(s)
}

/// Root composite `Root` holding `calc`, `adder` and `subtractor`.
fn calculator_system() -> (Runtime, Composite, Component) {
    let rt = runtime();
    let root = rt.create_root_composite("Root").unwrap();
    let calc = root.create_component("Calc.Calculator", "calc").unwrap();
    root.create_component("Calc.Adder", "adder").unwrap();
    root.create_component("Calc.Subtractor", "subtractor").unwrap();
    (rt, root, calc)
}

// --- Calls through bindings ---

#[tokio::test]
async fn bound_calculator_adds_and_subtracts() {
    let (_rt, root, calc) = calculator_system();
    root.bind("calc", "adder", "Calc.IAdd").unwrap();
    root.bind("calc", "subtractor", "Calc.ISubtract").unwrap();

    assert_eq!(calc.invoke("add", args![5, 3]).await.unwrap(), json!(8));
    assert_eq!(calc.invoke("subtract", args![5, 3]).await.unwrap(), json!(2));
    assert_eq!(calc.custom_metadata()["calls"], json!(2));
}

#[tokio::test]
async fn unbound_acquisitor_fails_the_call() {
    let (_rt, _root, calc) = calculator_system();
    let err = calc.invoke("add", args![5, 3]).await.unwrap_err();
    assert_eq!(
        err,
        CallError::Composition(CompositionError::NoBindingFound {
            interface: "Calc.IAdd".into(),
            component: id("calc"),
        })
    );
}

#[tokio::test]
async fn invoke_with_delivers_the_result_to_the_callback() {
    let (_rt, root, calc) = calculator_system();
    root.bind("calc", "adder", "Calc.IAdd").unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel();
    calc.invoke_with("add", args![20, 22], move |outcome| {
        let _ = tx.send(outcome);
    })
    .await
    .unwrap();
    assert_eq!(rx.await.unwrap().unwrap(), json!(42));
}

#[tokio::test]
async fn multiple_acquisitor_reaches_every_logger() {
    let (rt, root, calc) = calculator_system();
    root.create_component("Calc.ConsoleLogger", "log1").unwrap();
    root.create_component("Calc.ConsoleLogger", "log2").unwrap();
    root.bind("calc", "subtractor", "Calc.ISubtract").unwrap();
    root.bind("calc", "log1", "Calc.ILog").unwrap();
    root.bind("calc", "log2", "Calc.ILog").unwrap();
    root.bind("calc", "log2", "Calc.ILog").unwrap();

    calc.invoke("subtract", args![9, 4]).await.unwrap();

    for logger in ["log1", "log2"] {
        let records = rt.get_component(&id(logger)).unwrap().custom_metadata()["records"].clone();
        assert_eq!(records, json!(["9 - 4 = 5"]), "{logger}");
    }
    let log_bindings: Vec<_> = rt
        .service_providers(&id("calc"))
        .into_iter()
        .filter(|b| b.interface == "Calc.ILog")
        .collect();
    assert_eq!(log_bindings.len(), 2);
    assert!(log_bindings.iter().all(|b| b.cardinality == Cardinality::Multiple));
}

#[tokio::test]
async fn multiple_acquisitor_with_no_bindings_is_empty() {
    let (_rt, root, calc) = calculator_system();
    root.bind("calc", "subtractor", "Calc.ISubtract").unwrap();
    assert_eq!(calc.invoke("subtract", args![1, 1]).await.unwrap(), json!(0));
}

// --- Binding semantics ---

#[tokio::test]
async fn single_binding_is_replaced_by_rebinding() {
    let (rt, root, calc) = calculator_system();
    root.create_component("Calc.Adder", "adder2").unwrap();
    root.bind("calc", "adder", "Calc.IAdd").unwrap();
    root.bind("calc", "adder2", "Calc.IAdd").unwrap();

    let providers = rt.service_providers(&id("calc"));
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].target, id("adder2"));
    assert!(rt.service_consumers(&id("adder")).is_empty());
    assert_eq!(calc.invoke("add", args![1, 2]).await.unwrap(), json!(3));
}

#[tokio::test]
async fn unbind_removes_the_binding() {
    let (rt, root, calc) = calculator_system();
    root.bind("calc", "adder", "Calc.IAdd").unwrap();
    root.unbind("calc", "adder", "Calc.IAdd").unwrap();

    assert!(rt.bindings().is_empty());
    let err = calc.invoke("add", args![1, 2]).await.unwrap_err();
    assert!(matches!(
        err,
        CallError::Composition(CompositionError::NoBindingFound { .. })
    ));
}

#[test]
fn providers_and_consumers_are_introspectable() {
    let (rt, root, _calc) = calculator_system();
    root.bind("calc", "adder", "Calc.IAdd").unwrap();
    root.bind("calc", "subtractor", "Calc.ISubtract").unwrap();

    let providers = rt.service_providers(&id("calc"));
    assert_eq!(providers.len(), 2);
    assert_eq!(
        rt.service_consumers(&id("adder")),
        vec![Binding {
            source: id("calc"),
            target: id("adder"),
            interface: "Calc.IAdd".into(),
            cardinality: Cardinality::Single,
        }]
    );
    assert!(rt.service_providers(&id("adder")).is_empty());
}

// --- Validation ---

#[test]
fn bind_rejects_a_missing_acquisitor() {
    let (rt, root, _calc) = calculator_system();
    let err = root.bind("adder", "subtractor", "Calc.ISubtract").unwrap_err();
    assert_eq!(
        err,
        CompositionError::BindingFailureAcquisitor {
            entity: id("adder"),
            interface: "Calc.ISubtract".into(),
        }
    );
    assert!(rt.bindings().is_empty());
}

#[test]
fn bind_rejects_a_target_without_the_interface() {
    let (_rt, root, _calc) = calculator_system();
    let err = root.bind("calc", "subtractor", "Calc.IAdd").unwrap_err();
    assert_eq!(
        err,
        CompositionError::BindingFailureInterface {
            entity: id("subtractor"),
            interface: "Calc.IAdd".into(),
        }
    );
}

#[test]
fn bind_requires_direct_children() {
    let (rt, root, _calc) = calculator_system();
    let other = rt.create_root_composite("Other").unwrap();
    other.create_component("Calc.Adder", "far_adder").unwrap();

    let err = root.bind("calc", "far_adder", "Calc.IAdd").unwrap_err();
    assert_eq!(err.code(), ErrorCode::ChildEntityNotExist);
    let err = other.bind("calc", "far_adder", "Calc.IAdd").unwrap_err();
    assert_eq!(
        err,
        CompositionError::ChildEntityNotExist {
            entity: id("calc"),
            composite: id("Other"),
        }
    );
    let err = root.unbind("ghost", "adder", "Calc.IAdd").unwrap_err();
    assert_eq!(err.code(), ErrorCode::ChildEntityNotExist);
}

// --- Transactions ---

#[test]
fn transaction_state_errors() {
    let rt = runtime();
    assert_eq!(rt.commit().unwrap_err(), CompositionError::NotTransactionStarted);
    assert_eq!(rt.rollback().unwrap_err(), CompositionError::NotTransactionStarted);

    rt.init_transaction().unwrap();
    assert!(rt.in_transaction());
    assert_eq!(
        rt.init_transaction().unwrap_err(),
        CompositionError::TransactionAlreadyStarted
    );
    rt.commit().unwrap();
    assert!(!rt.in_transaction());
    assert_eq!(rt.commit().unwrap_err(), CompositionError::NotTransactionStarted);
}

#[tokio::test]
async fn buffered_bindings_are_invisible_until_commit() {
    let (rt, root, calc) = calculator_system();
    rt.init_transaction().unwrap();
    root.bind("calc", "adder", "Calc.IAdd").unwrap();
    root.bind("calc", "subtractor", "Calc.ISubtract").unwrap();

    assert!(rt.service_providers(&id("calc")).is_empty());
    assert_eq!(rt.pending_operations().len(), 2);
    assert!(calc.invoke("add", args![1, 1]).await.is_err());

    rt.commit().unwrap();
    assert_eq!(rt.service_providers(&id("calc")).len(), 2);
    assert!(rt.pending_operations().is_empty());
    assert_eq!(calc.invoke("add", args![1, 1]).await.unwrap(), json!(2));
}

#[test]
fn commit_applies_operations_in_order() {
    let (rt, root, _calc) = calculator_system();
    root.bind("calc", "adder", "Calc.IAdd").unwrap();

    rt.init_transaction().unwrap();
    root.unbind("calc", "adder", "Calc.IAdd").unwrap();
    root.bind("calc", "subtractor", "Calc.ISubtract").unwrap();
    let ops: Vec<_> = rt.pending_operations().into_iter().map(|op| op.commit_type).collect();
    assert_eq!(ops, vec![CommitType::Unbind, CommitType::Bind]);
    assert_eq!(rt.bindings().len(), 1);

    rt.commit().unwrap();
    let bindings = rt.bindings();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].interface, "Calc.ISubtract");
}

#[test]
fn rollback_restores_the_pre_transaction_bindings() {
    let (rt, root, _calc) = calculator_system();
    root.bind("calc", "adder", "Calc.IAdd").unwrap();
    let before = rt.bindings();

    rt.init_transaction().unwrap();
    root.unbind("calc", "adder", "Calc.IAdd").unwrap();
    root.bind("calc", "subtractor", "Calc.ISubtract").unwrap();
    rt.rollback().unwrap();

    assert!(!rt.in_transaction());
    assert_eq!(rt.bindings(), before);
}

#[test]
fn failed_wiring_inside_a_transaction_is_rolled_back() {
    let (rt, root, _calc) = calculator_system();

    let wire = || -> Result<(), CompositionError> {
        rt.init_transaction()?;
        root.bind("calc", "adder", "Calc.IAdd")?;
        root.bind("calc", "subtractor", "Calc.IBad")?;
        rt.commit()
    };
    let err = wire().unwrap_err();
    assert_eq!(err.code(), ErrorCode::BindingFailureAcquisitor);
    assert!(rt.in_transaction());
    assert_eq!(rt.pending_operations().len(), 1);

    rt.rollback().unwrap();
    assert!(rt.service_providers(&id("calc")).is_empty());
    assert!(rt.bindings().is_empty());
}
