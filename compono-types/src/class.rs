//! Component classes, acquisitor declarations and the class catalog.
//!
//! A class is an explicit record: a parent name, the interfaces it
//! implements, the acquisitors it requires, a method table and an optional
//! constructor. Inheritance is resolved by walking parent names through the
//! [`ClassCatalog`]; nothing is generated at runtime.

use crate::error::CompositionError;
use crate::service::{Instance, InstanceState};
use crate::value::{Args, BoxFuture, CallResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

/// A method implementation.
pub type MethodFn = Arc<dyn Fn(Instance, Args) -> BoxFuture<'static, CallResult> + Send + Sync>;

/// A constructor run against a fresh instance's state.
pub type Constructor = Arc<dyn Fn(&InstanceState) + Send + Sync>;

/// How many providers an acquisitor accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    /// At most one bound provider.
    #[serde(rename = "ACQUISITOR_SINGLE")]
    Single,
    /// Zero or more bound providers.
    #[serde(rename = "ACQUISITOR_MULTIPLE")]
    Multiple,
}

impl Cardinality {
    /// The declaration-surface name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "ACQUISITOR_SINGLE",
            Self::Multiple => "ACQUISITOR_MULTIPLE",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cardinality {
    type Err = CompositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACQUISITOR_SINGLE" | "single" => Ok(Self::Single),
            "ACQUISITOR_MULTIPLE" | "multiple" => Ok(Self::Multiple),
            other => Err(CompositionError::UndefinedAcquisitorType(other.to_owned())),
        }
    }
}

/// A declared dependency on an interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AcquisitorDecl {
    /// The required interface.
    pub interface: String,
    /// How many providers it accepts.
    pub cardinality: Cardinality,
}

impl AcquisitorDecl {
    /// Create an acquisitor declaration.
    pub fn new(interface: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            interface: interface.into(),
            cardinality,
        }
    }
}

/// One `{name, type}` entry of a class declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitorEntry {
    /// The required interface.
    pub name: String,
    /// Cardinality name, e.g. `ACQUISITOR_SINGLE`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// The declaration object authors write for a class.
///
/// ```json
/// {"component": "Calc.ParentCalculator", "extend": null,
///  "interfaces": ["Calc.ICalculator"],
///  "acquisitors": [{"name": "Calc.IAdd", "type": "ACQUISITOR_SINGLE"}],
///  "objects": []}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    /// Class name.
    pub component: String,
    /// Parent class name, if any.
    #[serde(default)]
    pub extend: Option<String>,
    /// Implemented interfaces.
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Required interfaces.
    #[serde(default)]
    pub acquisitors: Vec<AcquisitorEntry>,
    /// Object-schema documents the class works with.
    #[serde(default)]
    pub objects: Vec<String>,
}

/// A component class: declaration plus method table.
#[derive(Clone)]
pub struct ComponentClass {
    name: String,
    parent: Option<String>,
    interfaces: Vec<String>,
    acquisitors: Vec<AcquisitorDecl>,
    objects: Vec<String>,
    methods: HashMap<String, MethodFn>,
    constructor: Option<Constructor>,
}

impl ComponentClass {
    /// Start a class with no parent, interfaces or methods.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            interfaces: Vec::new(),
            acquisitors: Vec::new(),
            objects: Vec::new(),
            methods: HashMap::new(),
            constructor: None,
        }
    }

    /// Start a class from a declaration object.
    ///
    /// Fails with `UndefinedAcquisitorType` if an acquisitor names an
    /// unknown cardinality.
    pub fn from_declaration(decl: ClassDeclaration) -> Result<Self, CompositionError> {
        let acquisitors = decl
            .acquisitors
            .into_iter()
            .map(|a| -> Result<AcquisitorDecl, CompositionError> {
                Ok(AcquisitorDecl::new(a.name, a.kind.parse()?))
            })
            .collect::<Result<Vec<_>, CompositionError>>()?;
        Ok(Self {
            name: decl.component,
            parent: decl.extend,
            interfaces: decl.interfaces,
            acquisitors,
            objects: decl.objects,
            methods: HashMap::new(),
            constructor: None,
        })
    }

    /// Set the parent class.
    #[must_use]
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Declare an implemented interface.
    #[must_use]
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Declare a required interface.
    #[must_use]
    pub fn acquires(mut self, interface: impl Into<String>, cardinality: Cardinality) -> Self {
        self.acquisitors
            .push(AcquisitorDecl::new(interface, cardinality));
        self
    }

    /// Declare an object-schema document.
    #[must_use]
    pub fn uses_objects(mut self, schema: impl Into<String>) -> Self {
        self.objects.push(schema.into());
        self
    }

    /// Add a method implementation.
    #[must_use]
    pub fn method<F, Fut>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Instance, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallResult> + Send + 'static,
    {
        let method: MethodFn = Arc::new(
            move |this: Instance, args: Args| -> BoxFuture<'static, CallResult> {
                Box::pin(f(this, args))
            },
        );
        self.methods.insert(name.into(), method);
        self
    }

    /// Set the constructor.
    #[must_use]
    pub fn constructor(mut self, f: impl Fn(&InstanceState) + Send + Sync + 'static) -> Self {
        self.constructor = Some(Arc::new(f));
        self
    }

    /// Class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent class name.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Interfaces declared on this class only.
    pub fn own_interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// Acquisitors declared on this class only.
    pub fn own_acquisitors(&self) -> &[AcquisitorDecl] {
        &self.acquisitors
    }

    /// Object-schema documents declared on this class only.
    pub fn own_objects(&self) -> &[String] {
        &self.objects
    }

    /// A method defined on this class only.
    pub fn own_method(&self, name: &str) -> Option<&MethodFn> {
        self.methods.get(name)
    }

    /// The constructor defined on this class only.
    pub fn own_constructor(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("ComponentClass")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("interfaces", &self.interfaces)
            .field("acquisitors", &self.acquisitors)
            .field("objects", &self.objects)
            .field("methods", &methods)
            .finish()
    }
}

/// Registry of component and adaptor classes, keyed by name.
///
/// This is where the runtime "loads" classes from: a class is loaded the
/// first time an instance of it (or of a subclass) is created.
#[derive(Default, Clone)]
pub struct ClassCatalog {
    components: HashMap<String, Arc<ComponentClass>>,
    adaptors: HashMap<String, Arc<crate::advice::AdaptorClass>>,
}

impl ClassCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component class, replacing any class of the same name.
    pub fn register(&mut self, class: ComponentClass) -> &mut Self {
        self.components
            .insert(class.name().to_owned(), Arc::new(class));
        self
    }

    /// Register an adaptor class, replacing any class of the same name.
    pub fn register_adaptor(&mut self, class: crate::advice::AdaptorClass) -> &mut Self {
        self.adaptors
            .insert(class.name().to_owned(), Arc::new(class));
        self
    }

    /// Look up a component class.
    pub fn component(&self, name: &str) -> Option<Arc<ComponentClass>> {
        self.components.get(name).cloned()
    }

    /// Look up an adaptor class.
    pub fn adaptor(&self, name: &str) -> Option<Arc<crate::advice::AdaptorClass>> {
        self.adaptors.get(name).cloned()
    }

    /// The class and its ancestors, nearest first.
    ///
    /// Fails with `EntityLoadingError` if any class in the chain is missing
    /// or the chain loops.
    pub fn lineage(&self, name: &str) -> Result<Vec<Arc<ComponentClass>>, CompositionError> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(name.to_owned());
        while let Some(current) = next {
            if !seen.insert(current.clone()) {
                return Err(CompositionError::loading(
                    name,
                    format!("cyclic inheritance through {current}"),
                ));
            }
            let class = self
                .component(&current)
                .ok_or_else(|| CompositionError::loading(&current, "class is not registered"))?;
            next = class.parent().map(str::to_owned);
            chain.push(class);
        }
        Ok(chain)
    }

    /// Interfaces of a class and all its ancestors, own first, without duplicates.
    pub fn resolve_interfaces(&self, name: &str) -> Result<Vec<String>, CompositionError> {
        Ok(collect_unique(
            self.lineage(name)?
                .iter()
                .flat_map(|c| c.own_interfaces().iter().cloned()),
        ))
    }

    /// Acquisitors of a class and all its ancestors, own first.
    ///
    /// A subclass redeclaring an interface shadows its ancestor's declaration.
    pub fn resolve_acquisitors(&self, name: &str) -> Result<Vec<AcquisitorDecl>, CompositionError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for class in self.lineage(name)? {
            for acq in class.own_acquisitors() {
                if seen.insert(acq.interface.clone()) {
                    out.push(acq.clone());
                }
            }
        }
        Ok(out)
    }

    /// Object-schema documents of a class and all its ancestors.
    pub fn resolve_objects(&self, name: &str) -> Result<Vec<String>, CompositionError> {
        Ok(collect_unique(
            self.lineage(name)?
                .iter()
                .flat_map(|c| c.own_objects().iter().cloned()),
        ))
    }
}

impl fmt::Debug for ClassCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut components: Vec<_> = self.components.keys().collect();
        components.sort();
        let mut adaptors: Vec<_> = self.adaptors.keys().collect();
        adaptors.sort();
        f.debug_struct("ClassCatalog")
            .field("components", &components)
            .field("adaptors", &adaptors)
            .finish()
    }
}

/// Method lookup along a resolved lineage, nearest class first.
pub fn find_method(lineage: &[Arc<ComponentClass>], name: &str) -> Option<MethodFn> {
    lineage.iter().find_map(|c| c.own_method(name).cloned())
}

/// Run constructors along a resolved lineage, root ancestor first.
pub fn construct(lineage: &[Arc<ComponentClass>], state: &InstanceState) {
    for class in lineage.iter().rev() {
        if let Some(ctor) = class.own_constructor() {
            ctor(state);
        }
    }
}

fn collect_unique(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.filter(|i| seen.insert(i.clone())).collect()
}
