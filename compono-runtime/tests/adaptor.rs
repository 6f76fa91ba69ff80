//! Adaptor instances and advice injection.

use compono_runtime::*;
use compono_types::test_utils::{CALC_NAMESPACE, CALC_REPO, FixtureLoader, calculator_catalog};
use compono_types::*;
use serde_json::json;
use std::collections::BTreeMap;

const ADAPTOR: &str = "calcAdaptor";

fn id(s: &str) -> EntityId {
    EntityId::new(s)
}

/// A bound calculator system with a `Calc.CalcAdaptor` instance.
fn adapted_system() -> (Runtime, Composite, Component) {
    let config = RuntimeConfig::default().with_repo(CALC_NAMESPACE, CALC_REPO);
    let rt = Runtime::with_config(calculator_catalog(), FixtureLoader::calculator(), config);
    let root = rt.create_root_composite("Root").unwrap();
    let calc = root.create_component("Calc.Calculator", "calc").unwrap();
    root.create_component("Calc.Adder", "adder").unwrap();
    root.create_component("Calc.Subtractor", "subtractor").unwrap();
    root.bind("calc", "adder", "Calc.IAdd").unwrap();
    root.bind("calc", "subtractor", "Calc.ISubtract").unwrap();
    rt.create_adaptor("Calc.CalcAdaptor", ADAPTOR).unwrap();
    (rt, root, calc)
}

fn advice(function: &str, advice_type: AdviceType) -> Advice {
    Advice::new(ADAPTOR, function, advice_type)
}

fn calls(calc: &Component) -> serde_json::Value {
    calc.custom_metadata()["calls"].clone()
}

// --- Instances ---

#[test]
fn adaptor_ids_are_unique() {
    let (rt, _root, _calc) = adapted_system();
    let err = rt.create_adaptor("Calc.CalcAdaptor", ADAPTOR).unwrap_err();
    assert_eq!(err, CompositionError::AdaptorAlreadyExists(AdaptorId::new(ADAPTOR)));

    let instance = rt.adaptor(&AdaptorId::new(ADAPTOR)).unwrap();
    assert_eq!(instance.class_name(), "Calc.CalcAdaptor");
    assert!(rt.adaptor(&AdaptorId::new("other")).is_none());
}

#[test]
fn unknown_adaptor_class_is_a_loading_error() {
    let (rt, _root, _calc) = adapted_system();
    let err = rt.create_adaptor("Calc.NoSuchAdaptor", "x").unwrap_err();
    assert_eq!(err.code(), ErrorCode::EntityLoadingError);
}

// --- Before ---

#[tokio::test]
async fn failing_before_advice_skips_the_method_body() {
    let (rt, _root, calc) = adapted_system();
    let matched = rt
        .apply_adaptor(
            "validate",
            vec![advice("isInteger", AdviceType::Before)],
            &Scope::new().include("Calc.Calculator@add"),
        )
        .unwrap();
    assert_eq!(matched, vec!["Calc.Calculator@add"]);

    let err = calc.invoke("add", args![5, "x"]).await.unwrap_err();
    assert!(err.to_string().contains("is not an integer"), "{err}");
    assert_eq!(calls(&calc), json!(0));

    assert_eq!(calc.invoke("add", args![5, 3]).await.unwrap(), json!(8));
    assert_eq!(calls(&calc), json!(1));
}

#[tokio::test]
async fn before_advice_can_rewrite_arguments() {
    let (rt, _root, calc) = adapted_system();
    rt.apply_adaptor(
        "double",
        vec![advice("doubleArgs", AdviceType::Before)],
        &Scope::new().include("Calc.Calculator@*"),
    )
    .unwrap();
    assert_eq!(calc.invoke("add", args![2, 3]).await.unwrap(), json!(10));
    assert_eq!(calc.invoke("subtract", args![5, 1]).await.unwrap(), json!(8));
}

// --- After variants ---

#[tokio::test]
async fn after_advice_sees_and_rewrites_the_outcome() {
    let (rt, _root, calc) = adapted_system();
    rt.apply_adaptor(
        "range",
        vec![advice("isWithinRange", AdviceType::After)],
        &Scope::new().include("**@add"),
    )
    .unwrap();
    assert_eq!(calc.invoke("add", args![40, 2]).await.unwrap(), json!(42));
    let err = calc.invoke("add", args![60, 50]).await.unwrap_err();
    assert_eq!(err, CallError::failed("Result is greater than 100: 110"));
}

#[tokio::test]
async fn after_throw_recovers_from_a_missing_binding() {
    let (rt, root, calc) = adapted_system();
    root.unbind("calc", "subtractor", "Calc.ISubtract").unwrap();
    rt.apply_adaptor(
        "recover",
        vec![
            advice("negate", AdviceType::AfterReturn),
            advice("returnDefaultValue", AdviceType::AfterThrow),
        ],
        &Scope::new().include("Calc.Calculator@subtract"),
    )
    .unwrap();

    assert_eq!(calc.invoke("subtract", args![9, 4]).await.unwrap(), json!(50));
    assert_eq!(calc.invoke("add", args![9, 4]).await.unwrap(), json!(13));
}

#[tokio::test]
async fn after_return_only_runs_on_success() {
    let (rt, _root, calc) = adapted_system();
    rt.apply_adaptor(
        "negate",
        vec![
            advice("isInteger", AdviceType::Before),
            advice("negate", AdviceType::AfterReturn),
        ],
        &Scope::new().include("Calc.Calculator@add"),
    )
    .unwrap();
    assert_eq!(calc.invoke("add", args![5, 3]).await.unwrap(), json!(-8));
    assert!(calc.invoke("add", args![5, "x"]).await.is_err());
}

// --- Around and Introduce ---

#[tokio::test]
async fn around_advice_wraps_the_method() {
    let (rt, _root, calc) = adapted_system();
    rt.apply_adaptor(
        "around",
        vec![advice("addTen", AdviceType::Around)],
        &Scope::new().include("Calc.Calculator@add"),
    )
    .unwrap();
    assert_eq!(calc.invoke("add", args![1, 2]).await.unwrap(), json!(13));
    assert_eq!(calls(&calc), json!(1));
}

#[tokio::test]
async fn introduce_replaces_the_method() {
    let (rt, _root, calc) = adapted_system();
    rt.apply_adaptor(
        "intro",
        vec![advice("answer", AdviceType::Introduce)],
        &Scope::new().include("Calc.Calculator@add"),
    )
    .unwrap();
    assert_eq!(calc.invoke("add", args![1, 2]).await.unwrap(), json!(42));
    assert_eq!(calls(&calc), json!(0));
}

#[tokio::test]
async fn later_advices_wrap_earlier_ones() {
    let (rt, _root, calc) = adapted_system();
    // addTen runs inside negate: -(3 + 10).
    rt.apply_adaptor(
        "stacked",
        vec![
            advice("addTen", AdviceType::Around),
            advice("negate", AdviceType::AfterReturn),
        ],
        &Scope::new().include("Calc.Calculator@add"),
    )
    .unwrap();
    assert_eq!(calc.invoke("add", args![1, 2]).await.unwrap(), json!(-13));
}

// --- Reapplication ---

#[tokio::test]
async fn reapplying_restores_the_pristine_method_first() {
    let (rt, _root, calc) = adapted_system();
    let scope = Scope::new().include("Calc.Calculator@add");
    rt.apply_adaptor("a", vec![advice("doubleArgs", AdviceType::Before)], &scope)
        .unwrap();
    rt.apply_adaptor("b", vec![advice("addTen", AdviceType::Around)], &scope)
        .unwrap();

    assert_eq!(calc.invoke("add", args![1, 2]).await.unwrap(), json!(13));
    assert_eq!(
        calc.adaptor_advices("Calc.ICalculator"),
        BTreeMap::from([("add".to_owned(), vec![advice("addTen", AdviceType::Around)])])
    );
}

#[tokio::test]
async fn empty_advice_list_restores_the_method() {
    let (rt, _root, calc) = adapted_system();
    let scope = Scope::new().include("Calc.Calculator@add");
    rt.apply_adaptor("a", vec![advice("answer", AdviceType::Introduce)], &scope)
        .unwrap();
    rt.apply_adaptor("a", Vec::new(), &scope).unwrap();

    assert_eq!(calc.invoke("add", args![1, 2]).await.unwrap(), json!(3));
    assert!(calc.adaptor_advices("Calc.ICalculator").is_empty());
}

#[tokio::test]
async fn partial_restore_keeps_advices_reported_for_untouched_methods() {
    let (rt, _root, calc) = adapted_system();
    let answer = advice("answer", AdviceType::Introduce);
    rt.apply_adaptor(
        "inj",
        vec![answer.clone()],
        &Scope::new().include("Calc.Calculator@*"),
    )
    .unwrap();
    rt.apply_adaptor(
        "inj",
        Vec::new(),
        &Scope::new().include("Calc.Calculator@add"),
    )
    .unwrap();

    assert_eq!(calc.invoke("add", args![1, 2]).await.unwrap(), json!(3));
    assert_eq!(calc.invoke("subtract", args![5, 2]).await.unwrap(), json!(42));
    assert_eq!(
        calc.adaptor_advices("Calc.ICalculator"),
        BTreeMap::from([("subtract".to_owned(), vec![answer])])
    );
}

#[tokio::test]
async fn reused_injection_id_reports_each_scope_separately() {
    let (rt, _root, calc) = adapted_system();
    let answer = advice("answer", AdviceType::Introduce);
    let add_ten = advice("addTen", AdviceType::Around);
    rt.apply_adaptor(
        "inj",
        vec![answer.clone()],
        &Scope::new().include("Calc.Calculator@subtract"),
    )
    .unwrap();
    rt.apply_adaptor(
        "inj",
        vec![add_ten.clone()],
        &Scope::new().include("Calc.Calculator@add"),
    )
    .unwrap();

    assert_eq!(calc.invoke("subtract", args![5, 2]).await.unwrap(), json!(42));
    assert_eq!(calc.invoke("add", args![1, 2]).await.unwrap(), json!(13));
    assert_eq!(
        calc.adaptor_advices("Calc.ICalculator"),
        BTreeMap::from([
            ("add".to_owned(), vec![add_ten]),
            ("subtract".to_owned(), vec![answer]),
        ])
    );
}

// --- Scope ---

#[tokio::test]
async fn chains_are_shared_by_every_instance_of_a_class() {
    let (rt, root, calc) = adapted_system();
    let other = root.create_component("Calc.Calculator", "calc2").unwrap();
    root.bind("calc2", "adder", "Calc.IAdd").unwrap();
    rt.apply_adaptor(
        "intro",
        vec![advice("answer", AdviceType::Introduce)],
        &Scope::new().include("Calc.Calculator@add"),
    )
    .unwrap();

    assert_eq!(calc.invoke("add", args![1, 1]).await.unwrap(), json!(42));
    assert_eq!(other.invoke("add", args![1, 1]).await.unwrap(), json!(42));
}

#[tokio::test]
async fn exclusion_wins_over_inclusion() {
    let (rt, _root, calc) = adapted_system();
    let adder = rt.get_component(&id("adder")).unwrap();
    let matched = rt
        .apply_adaptor(
            "intro",
            vec![advice("answer", AdviceType::Introduce)],
            &Scope::new().include("Calc.**@*").exclude("Calc.Adder@*"),
        )
        .unwrap();
    assert!(matched.contains(&"Calc.Calculator@add".to_owned()));
    assert!(!matched.iter().any(|p| p.starts_with("Calc.Adder@")));

    assert_eq!(adder.invoke("add", args![1, 1]).await.unwrap(), json!(2));
    assert_eq!(calc.invoke("subtract", args![1, 1]).await.unwrap(), json!(42));
}

#[tokio::test]
async fn only_loaded_classes_are_in_scope() {
    let (rt, root, _calc) = adapted_system();
    let matched = rt
        .apply_adaptor(
            "intro",
            vec![advice("answer", AdviceType::Introduce)],
            &Scope::new().include("Calc.*@log"),
        )
        .unwrap();
    assert!(matched.is_empty());

    let logger = root.create_component("Calc.ConsoleLogger", "log").unwrap();
    assert_eq!(logger.invoke("log", args!["hi"]).await.unwrap(), json!("hi"));
}

// --- Validation ---

#[test]
fn missing_adaptor_or_function_changes_nothing() {
    let (rt, _root, calc) = adapted_system();
    let scope = Scope::new().include("Calc.Calculator@add");

    let err = rt
        .apply_adaptor("x", vec![Advice::before("ghost", "isInteger")], &scope)
        .unwrap_err();
    assert_eq!(err, CompositionError::AdaptorNotFound(AdaptorId::new("ghost")));

    let err = rt
        .apply_adaptor(
            "x",
            vec![
                advice("isInteger", AdviceType::Before),
                advice("nope", AdviceType::After),
            ],
            &scope,
        )
        .unwrap_err();
    assert_eq!(
        err,
        CompositionError::IncompleteAdaptor {
            adaptor: AdaptorId::new(ADAPTOR),
            function: "nope".into(),
        }
    );
    assert!(calc.adaptor_advices("Calc.ICalculator").is_empty());
}
