//! Deferred completion: no call finishes inside its caller's first poll.

use compono_runtime::*;
use compono_types::test_utils::{CALC_NAMESPACE, CALC_REPO, FixtureLoader, calculator_catalog};
use compono_types::*;
use serde_json::json;
use std::future::Future;
use std::pin::{Pin, pin};
use std::task::{Context, Poll, Waker};

fn runtime(defer_completion: bool) -> Runtime {
    let mut config = RuntimeConfig::default().with_repo(CALC_NAMESPACE, CALC_REPO);
    config.defer_completion = defer_completion;
    Runtime::with_config(calculator_catalog(), FixtureLoader::calculator(), config)
}

fn first_poll<F: Future + ?Sized>(fut: Pin<&mut F>) -> Poll<F::Output> {
    fut.poll(&mut Context::from_waker(Waker::noop()))
}

#[tokio::test]
async fn component_calls_complete_after_a_yield() {
    let rt = runtime(true);
    let root = rt.create_root_composite("Root").unwrap();
    let adder = root.create_component("Calc.Adder", "adder").unwrap();

    let mut ok = pin!(adder.invoke("add", args![1, 2]));
    assert!(first_poll(ok.as_mut()).is_pending());
    assert_eq!(ok.await.unwrap(), json!(3));

    let mut missing = pin!(adder.invoke("nope", args![1]));
    assert!(first_poll(missing.as_mut()).is_pending());
    assert!(matches!(missing.await, Err(CallError::MethodNotFound { .. })));
}

#[tokio::test]
async fn forwarded_calls_complete_after_a_yield() {
    let rt = runtime(true);
    let root = rt.create_root_composite("Root").unwrap();
    root.create_component("Calc.Adder", "adder").unwrap();
    root.expose_interface("Calc.IAdd", "adder").unwrap();
    let provider = root.interface("adder").unwrap();

    let mut ok = provider.invoke("add", args![2, 2]);
    assert!(first_poll(ok.as_mut()).is_pending());
    assert_eq!(ok.await.unwrap(), json!(4));

    let mut missing = provider.invoke("nope", args![1]);
    assert!(first_poll(missing.as_mut()).is_pending());
    assert!(matches!(missing.await, Err(CallError::MethodNotFound { .. })));
}

#[tokio::test]
async fn immediate_completion_when_deferral_is_off() {
    let rt = runtime(false);
    let root = rt.create_root_composite("Root").unwrap();
    root.create_component("Calc.Adder", "adder").unwrap();
    root.expose_interface("Calc.IAdd", "adder").unwrap();
    let provider = root.interface("adder").unwrap();

    let mut missing = provider.invoke("nope", args![1]);
    assert!(matches!(
        first_poll(missing.as_mut()),
        Poll::Ready(Err(CallError::MethodNotFound { .. }))
    ));
}
