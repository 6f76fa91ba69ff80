//! The calculator fixture system.

use crate::advice::{AdaptorClass, JoinPoint};
use crate::class::{Cardinality, ClassCatalog, ComponentClass};
use crate::error::CallError;
use crate::service::InstanceState;
use crate::value::{Args, CallResult};
use serde_json::{Value, json};

/// Base URI the calculator interface documents are served under.
pub const CALC_REPO: &str = "fixtures";

/// Namespace root of every calculator class and interface.
pub const CALC_NAMESPACE: &str = "Calc";

/// Interface documents, keyed by relative path.
pub fn calculator_documents() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Calc/IAdd.json", r#"{"add": {"params": ["a", "b"]}}"#),
        ("Calc/ISubtract.json", r#"{"subtract": {"params": ["a", "b"]}}"#),
        (
            "Calc/ICalculator.json",
            r#"{"add": {"params": ["a", "b"]}, "subtract": {"params": ["a", "b"]}}"#,
        ),
        ("Calc/ILog.json", r#"{"log": ["record"]}"#),
    ]
}

/// Every calculator class, plus the `Calc.CalcAdaptor` adaptor class.
///
/// | Class | Implements | Acquires |
/// |-------|------------|----------|
/// | `Calc.Adder` | `Calc.IAdd` | |
/// | `Calc.Subtractor` | `Calc.ISubtract` | |
/// | `Calc.ParentCalculator` | `Calc.ICalculator` | `Calc.IAdd` single |
/// | `Calc.Calculator` | (inherited) | `Calc.ISubtract` single, `Calc.ILog` multiple |
/// | `Calc.ConsoleLogger` | `Calc.ILog` | |
/// | `Calc.BrokenAdder` | `Calc.IAdd`, without `add` | |
///
/// `Calc.Calculator` counts body executions in its `calls` state field.
pub fn calculator_catalog() -> ClassCatalog {
    let mut catalog = ClassCatalog::new();

    catalog.register(
        ComponentClass::new("Calc.Adder")
            .implements("Calc.IAdd")
            .method("add", |_this, args: Args| async move {
                Ok(json!(args.int(0)? + args.int(1)?))
            }),
    );

    catalog.register(
        ComponentClass::new("Calc.Subtractor")
            .implements("Calc.ISubtract")
            .method("subtract", |_this, args: Args| async move {
                Ok(json!(args.int(0)? - args.int(1)?))
            }),
    );

    catalog.register(
        ComponentClass::new("Calc.ParentCalculator")
            .implements("Calc.ICalculator")
            .acquires("Calc.IAdd", Cardinality::Single)
            .constructor(|state| {
                state.set("calls", json!(0));
            })
            .method("add", |this, args: Args| async move {
                bump(this.state(), "calls");
                this.acquire("Calc.IAdd")?.invoke("add", args).await
            })
            .method("subtract", |_this, _args| async move {
                Err(CallError::failed("subtract is not implemented"))
            }),
    );

    catalog.register(
        ComponentClass::new("Calc.Calculator")
            .extends("Calc.ParentCalculator")
            .acquires("Calc.ISubtract", Cardinality::Single)
            .acquires("Calc.ILog", Cardinality::Multiple)
            .constructor(|state| {
                state.set("name", json!("Calculator"));
            })
            .method("subtract", |this, args: Args| async move {
                bump(this.state(), "calls");
                let result = this
                    .acquire("Calc.ISubtract")?
                    .invoke("subtract", args.clone())
                    .await?;
                let record = format!("{} - {} = {result}", args.require(0)?, args.require(1)?);
                for logger in this.acquire_all("Calc.ILog")? {
                    logger.invoke("log", Args::new(vec![json!(record)])).await?;
                }
                Ok(result)
            }),
    );

    catalog.register(
        ComponentClass::new("Calc.ConsoleLogger")
            .implements("Calc.ILog")
            .constructor(|state| {
                state.set("records", json!([]));
            })
            .method("log", |this, args: Args| async move {
                let record = args.require(0)?.clone();
                let mut records = match this.state().get("records") {
                    Some(Value::Array(records)) => records,
                    _ => Vec::new(),
                };
                records.push(record.clone());
                this.state().set("records", Value::Array(records));
                Ok(record)
            }),
    );

    catalog.register(ComponentClass::new("Calc.BrokenAdder").implements("Calc.IAdd"));

    catalog.register_adaptor(calc_adaptor());
    catalog
}

/// The `Calc.CalcAdaptor` adaptor class.
///
/// | Function | Intended type | Behavior |
/// |----------|---------------|----------|
/// | `isInteger` | Before | fails unless every argument is an integer |
/// | `doubleArgs` | Before | returns the arguments doubled |
/// | `isWithinRange` | After | fails when the result exceeds 100 |
/// | `negate` | AfterReturn | returns the negated result |
/// | `returnDefaultValue` | AfterThrow | recovers with 50 |
/// | `addTen` | Around | proceeds, then adds 10 |
/// | `answer` | Introduce | returns 42 |
pub fn calc_adaptor() -> AdaptorClass {
    AdaptorClass::new("Calc.CalcAdaptor")
        .advice("isInteger", |jp: JoinPoint| async move {
            for (i, arg) in jp.args.iter().enumerate() {
                if arg.as_i64().is_none() {
                    return Err(CallError::failed(format!("Arg {i} is not an integer: {arg}")));
                }
            }
            Ok(Value::Null)
        })
        .advice("doubleArgs", |jp: JoinPoint| async move {
            let doubled = jp
                .args
                .iter()
                .map(|arg| arg.as_i64().map_or(arg.clone(), |n| json!(n * 2)))
                .collect();
            Ok(Value::Array(doubled))
        })
        .advice("isWithinRange", |jp: JoinPoint| async move {
            match jp.outcome {
                Some(Ok(value)) => match value.as_i64() {
                    Some(n) if n > 100 => Err(CallError::failed(format!(
                        "Result is greater than 100: {n}"
                    ))),
                    _ => Ok(value),
                },
                Some(Err(e)) => Err(e),
                None => Ok(Value::Null),
            }
        })
        .advice("negate", |jp: JoinPoint| async move {
            match jp.outcome {
                Some(Ok(value)) => Ok(value.as_i64().map_or(value, |n| json!(-n))),
                Some(Err(e)) => Err(e),
                None => Ok(Value::Null),
            }
        })
        .advice("returnDefaultValue", |_jp: JoinPoint| async move { Ok(json!(50)) })
        .advice("addTen", |jp: JoinPoint| async move {
            let Some(proceed) = jp.proceed else {
                return Err(CallError::failed("addTen needs a proceed handle"));
            };
            let value = proceed.call(jp.args).await?;
            Ok(value.as_i64().map_or(value, |n| json!(n + 10)))
        })
        .advice("answer", |_jp: JoinPoint| async move { Ok(json!(42)) })
}

fn bump(state: &InstanceState, key: &str) {
    let next = state.get(key).and_then(|v| v.as_i64()).unwrap_or(0) + 1;
    state.set(key, json!(next));
}
