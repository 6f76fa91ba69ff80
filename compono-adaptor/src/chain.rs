//! Per-method dispatch chains.
//!
//! A chain is a stack of advice stages over a pristine [`MethodFn`]. Calling
//! the chain enters the outermost stage (the last one pushed); each stage
//! decides whether and how to reach the stage below it, the way a middleware
//! decides whether to call `next`.

use compono_types::{
    AdaptorId, AdviceFn, AdviceType, Args, BoxFuture, CallResult, Instance, JoinPoint, MethodFn,
    Proceed,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// One advice applied to a method.
#[derive(Clone)]
pub struct Stage {
    /// The adaptor instance providing the advice.
    pub adaptor: AdaptorId,
    /// Advice function name on that adaptor.
    pub function: String,
    /// How the advice wraps the stage below.
    pub advice_type: AdviceType,
    advice: AdviceFn,
}

impl Stage {
    /// Create a stage.
    pub fn new(
        adaptor: AdaptorId,
        function: impl Into<String>,
        advice_type: AdviceType,
        advice: AdviceFn,
    ) -> Self {
        Self {
            adaptor,
            function: function.into(),
            advice_type,
            advice,
        }
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("adaptor", &self.adaptor)
            .field("function", &self.function)
            .field("advice_type", &self.advice_type)
            .finish()
    }
}

/// The call path of one component method.
#[derive(Clone)]
pub struct DispatchChain {
    original: MethodFn,
    stages: Arc<[Stage]>,
}

impl DispatchChain {
    /// A chain with no stages.
    pub fn new(original: MethodFn) -> Self {
        Self {
            original,
            stages: Arc::from(Vec::new()),
        }
    }

    /// The same pristine method under a new stage list.
    #[must_use]
    pub fn with_stages(&self, stages: Vec<Stage>) -> Self {
        Self {
            original: Arc::clone(&self.original),
            stages: Arc::from(stages),
        }
    }

    /// The pristine method with every stage removed.
    #[must_use]
    pub fn pristine(&self) -> Self {
        Self::new(Arc::clone(&self.original))
    }

    /// Stages, innermost first.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Whether any advice is layered on the method.
    pub fn is_adapted(&self) -> bool {
        !self.stages.is_empty()
    }

    /// Run the chain against `target`.
    pub fn invoke(
        &self,
        target: Instance,
        method: &str,
        args: Args,
    ) -> BoxFuture<'static, CallResult> {
        Next {
            original: Arc::clone(&self.original),
            stages: Arc::clone(&self.stages),
            depth: self.stages.len(),
            target,
            method: Arc::from(method),
        }
        .run(args)
    }
}

impl fmt::Debug for DispatchChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchChain")
            .field("stages", &self.stages)
            .finish_non_exhaustive()
    }
}

/// The part of a chain below some depth. Depth 0 is the pristine method.
#[derive(Clone)]
struct Next {
    original: MethodFn,
    stages: Arc<[Stage]>,
    depth: usize,
    target: Instance,
    method: Arc<str>,
}

impl Next {
    fn below(&self) -> Self {
        Self {
            depth: self.depth - 1,
            ..self.clone()
        }
    }

    fn join_point(&self, stage: &Stage, args: Args) -> JoinPoint {
        JoinPoint::new(
            stage.adaptor.clone(),
            Arc::clone(&self.target),
            &*self.method,
            args,
        )
    }

    fn run(self, args: Args) -> BoxFuture<'static, CallResult> {
        Box::pin(async move {
            if self.depth == 0 {
                return (self.original)(self.target, args).await;
            }
            let stage = self.stages[self.depth - 1].clone();
            let inner = self.below();
            tracing::debug!(
                adaptor = %stage.adaptor,
                function = %stage.function,
                advice = %stage.advice_type,
                method = %self.method,
                "compono.adaptor.stage"
            );

            match stage.advice_type {
                AdviceType::Before => {
                    let jp = self.join_point(&stage, args.clone());
                    let verdict = (stage.advice)(jp).await?;
                    inner.run(rewrite_args(verdict, args)).await
                }
                AdviceType::After => {
                    let outcome = inner.run(args.clone()).await;
                    let jp = self.join_point(&stage, args).with_outcome(outcome);
                    (stage.advice)(jp).await
                }
                AdviceType::AfterReturn => match inner.run(args.clone()).await {
                    Ok(value) => {
                        let jp = self.join_point(&stage, args).with_outcome(Ok(value));
                        (stage.advice)(jp).await
                    }
                    Err(e) => Err(e),
                },
                AdviceType::AfterThrow => match inner.run(args.clone()).await {
                    Ok(value) => Ok(value),
                    Err(e) => {
                        let jp = self.join_point(&stage, args).with_outcome(Err(e));
                        (stage.advice)(jp).await
                    }
                },
                AdviceType::Around => {
                    let proceed = Proceed::new(move |args| inner.clone().run(args));
                    let jp = self.join_point(&stage, args).with_proceed(proceed);
                    (stage.advice)(jp).await
                }
                AdviceType::Introduce => {
                    let jp = self.join_point(&stage, args);
                    (stage.advice)(jp).await
                }
            }
        })
    }
}

/// Map a `Before` advice's result to the arguments passed inward.
///
/// Falsy results (`null`, `false`, `0`, `""`) keep the original arguments.
/// An array replaces them; anything else becomes the single argument.
fn rewrite_args(verdict: Value, original: Args) -> Args {
    match verdict {
        v if is_falsy(&v) => original,
        Value::Array(values) => Args::new(values),
        other => Args::new(vec![other]),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compono_types::{
        AcquisitorDecl, CallError, ComponentContext, CompositionError, EntityId, InstanceState,
        Service,
    };
    use serde_json::json;
    use std::sync::Mutex;

    struct Stub {
        id: EntityId,
        state: InstanceState,
    }

    impl ComponentContext for Stub {
        fn id(&self) -> &EntityId {
            &self.id
        }
        fn class_name(&self) -> &str {
            "Test.Stub"
        }
        fn acquire(&self, interface: &str) -> Result<Arc<dyn Service>, CompositionError> {
            Err(CompositionError::NoBindingFound {
                interface: interface.to_owned(),
                component: self.id.clone(),
            })
        }
        fn acquire_all(&self, _interface: &str) -> Result<Vec<Arc<dyn Service>>, CompositionError> {
            Ok(Vec::new())
        }
        fn acquisitors(&self) -> Vec<AcquisitorDecl> {
            Vec::new()
        }
        fn state(&self) -> &InstanceState {
            &self.state
        }
    }

    fn stub() -> Instance {
        Arc::new(Stub {
            id: EntityId::new("stub"),
            state: InstanceState::new(),
        })
    }

    type Log = Arc<Mutex<Vec<String>>>;

    fn sum(log: Log) -> MethodFn {
        Arc::new(move |_this: Instance, args: Args| -> BoxFuture<'static, CallResult> {
            let log = log.clone();
            Box::pin(async move {
                log.lock().unwrap().push("body".into());
                Ok(json!(args.int(0)? + args.int(1)?))
            })
        })
    }

    fn advice<F>(log: Log, tag: &'static str, f: F) -> AdviceFn
    where
        F: Fn(JoinPoint) -> BoxFuture<'static, CallResult> + Send + Sync + 'static,
    {
        Arc::new(move |jp: JoinPoint| -> BoxFuture<'static, CallResult> {
            log.lock().unwrap().push(tag.into());
            f(jp)
        })
    }

    fn stage(advice_type: AdviceType, f: AdviceFn) -> Stage {
        Stage::new(AdaptorId::new("a"), "f", advice_type, f)
    }

    fn new_log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    // --- Pristine ---

    #[tokio::test]
    async fn pristine_chain_calls_original() {
        let log = new_log();
        let chain = DispatchChain::new(sum(log.clone()));
        let out = chain.invoke(stub(), "add", Args::new(vec![json!(5), json!(3)])).await;
        assert_eq!(out.unwrap(), json!(8));
        assert!(!chain.is_adapted());
    }

    // --- Before ---

    #[tokio::test]
    async fn before_error_skips_body() {
        let log = new_log();
        let check = advice(log.clone(), "check", |_jp| {
            Box::pin(async { Err(CallError::failed("Arg 1 is not an integer: \"x\"")) })
        });
        let chain =
            DispatchChain::new(sum(log.clone())).with_stages(vec![stage(AdviceType::Before, check)]);
        let err = chain
            .invoke(stub(), "add", Args::new(vec![json!(5), json!("x")]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("is not an integer"));
        assert_eq!(*log.lock().unwrap(), vec!["check"]);
    }

    #[tokio::test]
    async fn before_result_rewrites_arguments() {
        let log = new_log();
        let double = advice(log.clone(), "double", |jp| {
            Box::pin(async move {
                Ok(Value::Array(
                    jp.args.iter().map(|a| json!(a.as_i64().unwrap_or(0) * 2)).collect(),
                ))
            })
        });
        let keep = advice(log.clone(), "keep", |_jp| Box::pin(async { Ok(json!(false)) }));
        let chain = DispatchChain::new(sum(log.clone())).with_stages(vec![
            stage(AdviceType::Before, double),
            stage(AdviceType::Before, keep),
        ]);
        let out = chain.invoke(stub(), "add", Args::new(vec![json!(2), json!(3)])).await;
        assert_eq!(out.unwrap(), json!(10));
        // last stage is outermost
        assert_eq!(*log.lock().unwrap(), vec!["keep", "double", "body"]);
    }

    #[test]
    fn before_scalar_becomes_single_argument() {
        let args = rewrite_args(json!(7), Args::new(vec![json!(1), json!(2)]));
        assert_eq!(args.into_vec(), vec![json!(7)]);
        let args = rewrite_args(Value::Null, Args::new(vec![json!(1)]));
        assert_eq!(args.into_vec(), vec![json!(1)]);
    }

    #[test]
    fn before_falsy_scalars_keep_arguments() {
        for verdict in [json!(false), json!(0), json!(0.0), json!("")] {
            let args = rewrite_args(verdict, Args::new(vec![json!(4), json!(5)]));
            assert_eq!(args.into_vec(), vec![json!(4), json!(5)]);
        }
        // empty containers are truthy
        let args = rewrite_args(json!([]), Args::new(vec![json!(4)]));
        assert!(args.into_vec().is_empty());
    }

    // --- After ---

    #[tokio::test]
    async fn after_sees_outcome_and_decides_result() {
        let log = new_log();
        let range = advice(log.clone(), "range", |jp| {
            Box::pin(async move {
                match jp.outcome {
                    Some(Ok(v)) if v.as_i64().unwrap_or(0) > 100 => {
                        Err(CallError::failed(format!("Result is greater than 100: {v}")))
                    }
                    Some(outcome) => outcome,
                    None => Ok(Value::Null),
                }
            })
        });
        let chain =
            DispatchChain::new(sum(log.clone())).with_stages(vec![stage(AdviceType::After, range)]);
        let ok = chain.invoke(stub(), "add", Args::new(vec![json!(5), json!(3)])).await;
        assert_eq!(ok.unwrap(), json!(8));
        let err = chain
            .invoke(stub(), "add", Args::new(vec![json!(99), json!(3)]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("greater than 100"));
        assert_eq!(*log.lock().unwrap(), vec!["body", "range", "body", "range"]);
    }

    #[tokio::test]
    async fn before_then_after_brackets_the_body() {
        let log = new_log();
        let a = advice(log.clone(), "a", |_jp| Box::pin(async { Ok(Value::Null) }));
        let b = advice(log.clone(), "b", |jp| {
            Box::pin(async move { jp.outcome.unwrap_or(Ok(Value::Null)) })
        });
        let chain = DispatchChain::new(sum(log.clone()))
            .with_stages(vec![stage(AdviceType::Before, a), stage(AdviceType::After, b)]);
        chain
            .invoke(stub(), "add", Args::new(vec![json!(1), json!(1)]))
            .await
            .unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["a", "body", "b"]);
    }

    // --- AfterReturn / AfterThrow ---

    #[tokio::test]
    async fn after_return_fires_only_on_success() {
        let log = new_log();
        let negate = advice(log.clone(), "negate", |jp| {
            Box::pin(async move {
                let v = jp.outcome.unwrap_or(Ok(Value::Null))?;
                Ok(json!(-v.as_i64().unwrap_or(0)))
            })
        });
        let chain = DispatchChain::new(sum(log.clone()))
            .with_stages(vec![stage(AdviceType::AfterReturn, negate)]);
        let ok = chain.invoke(stub(), "add", Args::new(vec![json!(2), json!(3)])).await;
        assert_eq!(ok.unwrap(), json!(-5));
        let err = chain.invoke(stub(), "add", Args::new(vec![json!("x")])).await;
        assert!(err.is_err());
        assert_eq!(*log.lock().unwrap(), vec!["body", "negate", "body"]);
    }

    #[tokio::test]
    async fn after_throw_recovers_failures_only() {
        let log = new_log();
        let recover = advice(log.clone(), "recover", |_jp| Box::pin(async { Ok(json!(50)) }));
        let chain = DispatchChain::new(sum(log.clone()))
            .with_stages(vec![stage(AdviceType::AfterThrow, recover)]);
        let ok = chain.invoke(stub(), "add", Args::new(vec![json!(2), json!(3)])).await;
        assert_eq!(ok.unwrap(), json!(5));
        let recovered = chain.invoke(stub(), "add", Args::new(vec![json!("x")])).await;
        assert_eq!(recovered.unwrap(), json!(50));
        assert_eq!(*log.lock().unwrap(), vec!["body", "body", "recover"]);
    }

    // --- Around / Introduce ---

    #[tokio::test]
    async fn around_may_proceed_repeatedly() {
        let log = new_log();
        let twice = advice(log.clone(), "twice", |jp| {
            Box::pin(async move {
                let proceed = jp.proceed.clone().ok_or_else(|| CallError::failed("no proceed"))?;
                let first = proceed.call(jp.args.clone()).await?;
                let second = proceed.call(jp.args).await?;
                Ok(json!(first.as_i64().unwrap_or(0) + second.as_i64().unwrap_or(0)))
            })
        });
        let chain =
            DispatchChain::new(sum(log.clone())).with_stages(vec![stage(AdviceType::Around, twice)]);
        let out = chain.invoke(stub(), "add", Args::new(vec![json!(2), json!(3)])).await;
        assert_eq!(out.unwrap(), json!(10));
        assert_eq!(*log.lock().unwrap(), vec!["twice", "body", "body"]);
    }

    #[tokio::test]
    async fn introduce_never_reaches_body() {
        let log = new_log();
        let answer = advice(log.clone(), "answer", |_jp| Box::pin(async { Ok(json!(42)) }));
        let chain = DispatchChain::new(sum(log.clone()))
            .with_stages(vec![stage(AdviceType::Introduce, answer)]);
        let out = chain.invoke(stub(), "add", Args::empty()).await;
        assert_eq!(out.unwrap(), json!(42));
        assert_eq!(*log.lock().unwrap(), vec!["answer"]);
    }

    // --- Reset ---

    #[tokio::test]
    async fn pristine_drops_every_stage() {
        let log = new_log();
        let answer = advice(log.clone(), "answer", |_jp| Box::pin(async { Ok(json!(42)) }));
        let adapted = DispatchChain::new(sum(log.clone()))
            .with_stages(vec![stage(AdviceType::Introduce, answer)]);
        assert!(adapted.is_adapted());
        let restored = adapted.pristine();
        assert!(!restored.is_adapted());
        let out = restored.invoke(stub(), "add", Args::new(vec![json!(1), json!(2)])).await;
        assert_eq!(out.unwrap(), json!(3));
    }
}
