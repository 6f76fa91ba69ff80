#![deny(missing_docs)]
//! # compono: umbrella crate
//!
//! A single import surface for the compono component framework. Re-exports
//! the protocol and the runtime behind feature flags, plus a `prelude` for
//! the happy path.
//!
//! | Feature | Crate | What it brings |
//! |---------|-------|----------------|
//! | `core` | `compono-types` | classes, interfaces, advices, errors |
//! | `adaptor` | `compono-adaptor` | dispatch chains and scope globs |
//! | `schema` | `compono-schema` | typed object schemas |
//! | `runtime` | `compono-runtime` | the registry, bindings and transactions |
//! | `loader` | `compono-loader` | in-memory and filesystem document loaders |
//!
//! ```no_run
//! use compono::prelude::*;
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let mut catalog = ClassCatalog::new();
//! catalog.register(
//!     ComponentClass::new("Calc.Adder")
//!         .implements("Calc.IAdd")
//!         .method("add", |_this, args: Args| async move {
//!             Ok(json!(args.int(0)? + args.int(1)?))
//!         }),
//! );
//! let loader = MemoryLoader::new().with_document("repo", "Calc/IAdd.json", r#"{"add": ["a", "b"]}"#);
//! let runtime = Runtime::with_config(catalog, loader, RuntimeConfig::default().with_repo("Calc", "repo"));
//!
//! let root = runtime.create_root_composite("App")?;
//! let adder = root.create_component("Calc.Adder", "adder")?;
//! assert_eq!(adder.invoke("add", args![2, 3]).await?, json!(5));
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "adaptor")]
pub use compono_adaptor;
#[cfg(feature = "loader")]
pub use compono_loader;
#[cfg(feature = "runtime")]
pub use compono_runtime;
#[cfg(feature = "schema")]
pub use compono_schema;
#[cfg(feature = "core")]
pub use compono_types;

#[cfg(feature = "core")]
pub use compono_types::args;

/// Happy-path imports for composing compono systems.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use compono_types::{
        AdaptorClass, AdaptorId, Advice, AdviceType, Args, CallError, CallResult, Cardinality,
        ClassCatalog, ComponentClass, ComponentContext, CompositionError, ContentLoader, EntityId,
        ErrorCode, Instance, JoinPoint, Scope, Service, args,
    };

    #[cfg(feature = "runtime")]
    pub use compono_runtime::{
        Binding, Component, Composite, Entity, EntityKind, Provider, Runtime, RuntimeConfig,
    };

    #[cfg(feature = "schema")]
    pub use compono_schema::{EntityObject, Schema, SchemaError};

    #[cfg(feature = "loader")]
    pub use compono_loader::{FsLoader, MemoryLoader};
}
