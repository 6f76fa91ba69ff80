//! The adaptor protocol: advice types, advice functions and join points.
//!
//! An adaptor class is a named bag of advice functions. Every advice function
//! has the same shape, `JoinPoint -> CallResult`; the [`AdviceType`] it is
//! applied with decides when it runs and how its result is interpreted:
//!
//! | Type | Runs | Result means |
//! |------|------|--------------|
//! | `Before` | on entry | falsy (`null`, `false`, `0`, `""`): keep args; array: new args; other: single arg; `Err`: fail the call, skip the method |
//! | `After` | on every completion | what the caller sees |
//! | `AfterReturn` | on success only | the replacement value |
//! | `AfterThrow` | on failure only | recovery value, or a new error |
//! | `Around` | instead of the method, with [`JoinPoint::proceed`] | what the caller sees |
//! | `Introduce` | instead of the method, never calls it | what the caller sees |

use crate::id::AdaptorId;
use crate::service::Instance;
use crate::value::{Args, BoxFuture, CallResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// When an advice runs relative to the target method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdviceType {
    /// Before the method; may rewrite arguments or fail the call.
    Before,
    /// After the method completes, successfully or not.
    After,
    /// After a successful completion.
    AfterReturn,
    /// After a failed completion.
    AfterThrow,
    /// Instead of the method, with a handle to it.
    Around,
    /// Instead of the method, without a handle to it.
    Introduce,
}

impl fmt::Display for AdviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Before => "Before",
            Self::After => "After",
            Self::AfterReturn => "AfterReturn",
            Self::AfterThrow => "AfterThrow",
            Self::Around => "Around",
            Self::Introduce => "Introduce",
        };
        f.write_str(s)
    }
}

/// One entry of an injection's ordered advice list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Advice {
    /// The adaptor instance providing the function.
    pub adaptor: AdaptorId,
    /// The advice function name on that adaptor.
    pub function: String,
    /// How the function is applied.
    #[serde(rename = "type")]
    pub advice_type: AdviceType,
}

impl Advice {
    /// Create an advice entry.
    pub fn new(
        adaptor: impl Into<AdaptorId>,
        function: impl Into<String>,
        advice_type: AdviceType,
    ) -> Self {
        Self {
            adaptor: adaptor.into(),
            function: function.into(),
            advice_type,
        }
    }

    /// A `Before` advice.
    pub fn before(adaptor: impl Into<AdaptorId>, function: impl Into<String>) -> Self {
        Self::new(adaptor, function, AdviceType::Before)
    }

    /// An `After` advice.
    pub fn after(adaptor: impl Into<AdaptorId>, function: impl Into<String>) -> Self {
        Self::new(adaptor, function, AdviceType::After)
    }
}

/// A re-entrant handle to the next stage of a dispatch chain.
#[derive(Clone)]
pub struct Proceed(Arc<dyn Fn(Args) -> BoxFuture<'static, CallResult> + Send + Sync>);

impl Proceed {
    /// Wrap a stage invoker.
    pub fn new(f: impl Fn(Args) -> BoxFuture<'static, CallResult> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invoke the wrapped stage with `args`.
    pub fn call(&self, args: Args) -> BoxFuture<'static, CallResult> {
        (self.0)(args)
    }
}

impl fmt::Debug for Proceed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Proceed(..)")
    }
}

/// Everything an advice function sees about the intercepted call.
#[non_exhaustive]
pub struct JoinPoint {
    /// The adaptor instance running this advice.
    pub adaptor: AdaptorId,
    /// The component whose method is intercepted.
    pub target: Instance,
    /// The intercepted method name.
    pub method: String,
    /// Call arguments as they reached this stage.
    pub args: Args,
    /// The completion being observed. Set for `After`, `AfterReturn` and
    /// `AfterThrow`; `None` otherwise.
    pub outcome: Option<CallResult>,
    /// The next stage. Set for `Around` only.
    pub proceed: Option<Proceed>,
}

impl JoinPoint {
    /// Build a join point with no outcome and no proceed handle.
    pub fn new(adaptor: AdaptorId, target: Instance, method: impl Into<String>, args: Args) -> Self {
        Self {
            adaptor,
            target,
            method: method.into(),
            args,
            outcome: None,
            proceed: None,
        }
    }

    /// Attach an observed completion.
    #[must_use]
    pub fn with_outcome(mut self, outcome: CallResult) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Attach a proceed handle.
    #[must_use]
    pub fn with_proceed(mut self, proceed: Proceed) -> Self {
        self.proceed = Some(proceed);
        self
    }
}

impl fmt::Debug for JoinPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinPoint")
            .field("adaptor", &self.adaptor)
            .field("target", self.target.id())
            .field("method", &self.method)
            .field("args", &self.args)
            .field("outcome", &self.outcome)
            .field("proceed", &self.proceed.is_some())
            .finish()
    }
}

/// An advice function.
pub type AdviceFn = Arc<dyn Fn(JoinPoint) -> BoxFuture<'static, CallResult> + Send + Sync>;

/// A named set of advice functions.
#[derive(Clone)]
pub struct AdaptorClass {
    name: String,
    advices: HashMap<String, AdviceFn>,
}

impl AdaptorClass {
    /// Start an adaptor class with no advice functions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            advices: HashMap::new(),
        }
    }

    /// Add an advice function.
    #[must_use]
    pub fn advice<F, Fut>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(JoinPoint) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallResult> + Send + 'static,
    {
        let advice: AdviceFn =
            Arc::new(move |jp: JoinPoint| -> BoxFuture<'static, CallResult> { Box::pin(f(jp)) });
        self.advices.insert(name.into(), advice);
        self
    }

    /// Class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an advice function.
    pub fn function(&self, name: &str) -> Option<AdviceFn> {
        self.advices.get(name).cloned()
    }
}

impl fmt::Debug for AdaptorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut advices: Vec<_> = self.advices.keys().collect();
        advices.sort();
        f.debug_struct("AdaptorClass")
            .field("name", &self.name)
            .field("advices", &advices)
            .finish()
    }
}
