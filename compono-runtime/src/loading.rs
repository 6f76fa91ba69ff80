//! Class, interface and object-schema loading.
//!
//! Everything a class needs is fetched and checked before any table is
//! touched, so a failed load leaves the registry as it was.

use crate::runtime::Runtime;
use crate::state::{LoadedClass, State};
use compono_adaptor::DispatchChain;
use compono_schema::Schema;
use compono_types::{CompositionError, EntityId, InterfaceDef, class, method_path};
use std::sync::Arc;

impl Runtime {
    /// Repository base URI and relative path of a dotted document name.
    pub(crate) fn locate(
        &self,
        state: &State,
        name: &str,
    ) -> Result<(String, String), CompositionError> {
        let namespace = name.split('.').next().unwrap_or(name);
        let base = state.repos.get(namespace).ok_or_else(|| {
            CompositionError::loading(
                name,
                format!("no component repository for namespace {namespace}"),
            )
        })?;
        let path = format!(
            "{}.{}",
            name.replace('.', "/"),
            self.config().document_extension
        );
        Ok((base.clone(), path))
    }

    fn fetch(&self, state: &State, name: &str) -> Result<String, CompositionError> {
        let (base, path) = self.locate(state, name)?;
        self.loader()
            .load(&base, &path)
            .map_err(|e| CompositionError::loading(name, e))
    }

    /// Load a component class once: resolve its lineage, load its
    /// interfaces and object schemas, check every interface method is
    /// implemented and back up the pristine methods.
    pub(crate) fn load_class(
        &self,
        state: &mut State,
        class_name: &str,
        component: &EntityId,
    ) -> Result<Arc<LoadedClass>, CompositionError> {
        if let Some(loaded) = state.classes.get(class_name) {
            return Ok(Arc::clone(loaded));
        }

        let catalog = self.catalog();
        let lineage = catalog.lineage(class_name)?;
        let interfaces = catalog.resolve_interfaces(class_name)?;
        let acquisitors = catalog.resolve_acquisitors(class_name)?;
        let objects = catalog.resolve_objects(class_name)?;

        let mut fresh_interfaces = Vec::new();
        let mut methods: Vec<String> = Vec::new();
        let mut originals = Vec::new();
        for interface in &interfaces {
            let def = match state.interfaces.get(interface) {
                Some(def) => Arc::clone(def),
                None => {
                    let text = self.fetch(state, interface)?;
                    let def = InterfaceDef::parse(interface.clone(), &text)
                        .map_err(|e| CompositionError::loading(interface, e))?;
                    let def = Arc::new(def);
                    fresh_interfaces.push(Arc::clone(&def));
                    def
                }
            };
            for method in def.method_names() {
                if methods.iter().any(|m| m == method) {
                    continue;
                }
                let original = class::find_method(&lineage, method).ok_or_else(|| {
                    CompositionError::FunctionNotImplemented {
                        interface: interface.clone(),
                        function: method.to_owned(),
                        component: component.clone(),
                    }
                })?;
                methods.push(method.to_owned());
                originals.push((method_path(class_name, method), original));
            }
        }

        let mut fresh_schemas = Vec::new();
        for document in &objects {
            if state.loaded_schemas.contains(document) {
                continue;
            }
            let text = self.fetch(state, document)?;
            let schema =
                Schema::parse(&text).map_err(|e| CompositionError::loading(document, e))?;
            fresh_schemas.push((document.clone(), schema));
        }

        for def in fresh_interfaces {
            tracing::debug!(
                interface = %def.name,
                methods = def.methods.len(),
                "compono.interface.loaded"
            );
            state.interfaces.insert(def.name.clone(), def);
        }
        for (document, schema) in fresh_schemas {
            tracing::debug!(document = %document, types = schema.len(), "compono.schema.loaded");
            state.schema.merge(schema);
            state.loaded_schemas.insert(document);
        }
        for (path, original) in originals {
            state
                .chains
                .entry(path)
                .or_insert_with(|| DispatchChain::new(original));
        }

        let loaded = Arc::new(LoadedClass {
            name: class_name.to_owned(),
            lineage,
            interfaces,
            acquisitors,
            methods,
        });
        tracing::debug!(
            class = %class_name,
            parent = ?loaded.lineage.get(1).map(|c| c.name().to_owned()),
            interfaces = ?loaded.interfaces,
            "compono.class.loaded"
        );
        state
            .classes
            .insert(class_name.to_owned(), Arc::clone(&loaded));
        Ok(loaded)
    }
}
