//! A calculator assembled from components, wired in a transaction and
//! guarded by an adaptor.
//!
//! Set RUST_LOG=debug to see composition events.
//!
//! Run with: RUST_LOG=debug cargo run --example calculator -p compono

use compono::prelude::*;
use serde_json::{Value, json};

const REPO: &str = "memory";

fn catalog() -> ClassCatalog {
    let mut catalog = ClassCatalog::new();
    catalog
        .register(
            ComponentClass::new("Calc.Adder")
                .implements("Calc.IAdd")
                .method("add", |_this, args: Args| async move {
                    Ok(json!(args.int(0)? + args.int(1)?))
                }),
        )
        .register(
            ComponentClass::new("Calc.Calculator")
                .implements("Calc.ICalculator")
                .acquires("Calc.IAdd", Cardinality::Single)
                .method("add", |this, args: Args| async move {
                    this.acquire("Calc.IAdd")?.invoke("add", args).await
                }),
        );
    catalog.register_adaptor(AdaptorClass::new("Calc.Guard").advice(
        "isInteger",
        |jp: JoinPoint| async move {
            match jp.args.iter().find(|a| a.as_i64().is_none()) {
                Some(bad) => Err(CallError::failed(format!("{bad} is not an integer"))),
                None => Ok(Value::Null),
            }
        },
    ));
    catalog
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Respects RUST_LOG.
    tracing_subscriber::fmt::init();

    let loader = MemoryLoader::new()
        .with_document(REPO, "Calc/IAdd.json", r#"{"add": ["a", "b"]}"#)
        .with_document(REPO, "Calc/ICalculator.json", r#"{"add": ["a", "b"]}"#);
    let config = RuntimeConfig::default().with_repo("Calc", REPO);
    let runtime = Runtime::with_config(catalog(), loader, config);

    let app = runtime.create_root_composite("App")?;
    let calc = app.create_component("Calc.Calculator", "calc")?;
    app.create_component("Calc.Adder", "adder")?;

    runtime.init_transaction()?;
    app.bind("calc", "adder", "Calc.IAdd")?;
    runtime.commit()?;
    println!("5 + 3 = {}", calc.invoke("add", args![5, 3]).await?);

    runtime.create_adaptor("Calc.Guard", "guard")?;
    runtime.apply_adaptor(
        "guard-add",
        vec![Advice::before("guard", "isInteger")],
        &Scope::new().include("Calc.Calculator@add"),
    )?;
    match calc.invoke("add", args![5, "x"]).await {
        Ok(value) => println!("unexpected result: {value}"),
        Err(e) => println!("rejected: {e}"),
    }

    for binding in runtime.service_providers(calc.id()) {
        println!(
            "{} --{}--> {}",
            binding.source, binding.interface, binding.target
        );
    }
    Ok(())
}
