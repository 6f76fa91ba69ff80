//! Adaptor registration and injection.

use crate::runtime::Runtime;
use crate::state::AdaptorInstance;
use compono_adaptor::{ScopeMatcher, Stage};
use compono_types::{AdaptorId, Advice, CompositionError, InjectionId, Scope, method_path};

impl Runtime {
    /// Register an adaptor instance of `class_name` under `id`.
    ///
    /// Fails with `AdaptorAlreadyExists` if `id` is taken and with
    /// `EntityLoadingError` if the catalog has no such adaptor class.
    pub fn create_adaptor(
        &self,
        class_name: &str,
        id: impl Into<AdaptorId>,
    ) -> Result<AdaptorInstance, CompositionError> {
        let id = id.into();
        let mut state = self.write();
        if state.adaptors.contains_key(&id) {
            return Err(CompositionError::AdaptorAlreadyExists(id));
        }
        let class = self
            .catalog()
            .adaptor(class_name)
            .ok_or_else(|| CompositionError::loading(class_name, "adaptor class is not registered"))?;
        if state.adaptor_classes.insert(class_name.to_owned()) {
            tracing::debug!(class = %class_name, "compono.adaptor.class_loaded");
        }
        let instance = AdaptorInstance::new(id.clone(), class);
        state.adaptors.insert(id.clone(), instance.clone());
        tracing::debug!(adaptor = %id, class = %class_name, "compono.adaptor.created");
        Ok(instance)
    }

    /// Look up an adaptor instance.
    pub fn adaptor(&self, id: &AdaptorId) -> Option<AdaptorInstance> {
        self.read().adaptors.get(id).cloned()
    }

    /// Apply an ordered advice list to every loaded interface method in
    /// `scope`, returning the matched `Class@method` paths.
    ///
    /// Every matched method is first restored to its pristine
    /// implementation, then wrapped by the advices in list order, so the
    /// last advice is outermost. Injections do not accumulate: the latest
    /// one to match a method wins. An empty advice list only restores.
    ///
    /// Every advice is resolved before anything changes; a missing adaptor
    /// fails with `AdaptorNotFound`, a missing function with
    /// `IncompleteAdaptor`.
    pub fn apply_adaptor(
        &self,
        injection_id: impl Into<InjectionId>,
        advices: Vec<Advice>,
        scope: &Scope,
    ) -> Result<Vec<String>, CompositionError> {
        let injection_id = injection_id.into();
        let matcher = ScopeMatcher::compile(scope)?;
        let mut state = self.write();

        let mut stages = Vec::with_capacity(advices.len());
        for advice in &advices {
            let instance = state
                .adaptors
                .get(&advice.adaptor)
                .ok_or_else(|| CompositionError::AdaptorNotFound(advice.adaptor.clone()))?;
            let function = instance.class().function(&advice.function).ok_or_else(|| {
                CompositionError::IncompleteAdaptor {
                    adaptor: advice.adaptor.clone(),
                    function: advice.function.clone(),
                }
            })?;
            stages.push(Stage::new(
                advice.adaptor.clone(),
                advice.function.clone(),
                advice.advice_type,
                function,
            ));
        }

        let candidates: Vec<String> = state
            .classes
            .values()
            .flat_map(|class| class.methods.iter().map(|m| method_path(&class.name, m)))
            .collect();
        let matched = matcher.filter(candidates.iter().map(String::as_str));

        for path in &matched {
            let Some(chain) = state.chains.get(path) else {
                continue;
            };
            let rebuilt = if stages.is_empty() {
                chain.pristine()
            } else {
                chain.with_stages(stages.clone())
            };
            state.chains.insert(path.clone(), rebuilt);
            if advices.is_empty() {
                state.method_injections.remove(path);
            } else {
                state
                    .method_injections
                    .insert(path.clone(), (injection_id.clone(), advices.clone()));
            }
        }

        tracing::info!(
            injection = %injection_id,
            stages = stages.len(),
            methods = ?matched,
            "compono.adaptor.applied"
        );
        Ok(matched)
    }
}
