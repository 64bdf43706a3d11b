use ahash::{HashMap, HashMapExt};
use indexmap::{IndexMap, IndexSet};

use crate::compiler::analyses::component_bindings::ComponentBindings;
use crate::compiler::analyses::linked_interface::{LinkedComponent, LinkedInterface};
use crate::compiler::component::CanonicalProvider;
use crate::diagnostic::{DiagnosticSink, ResolutionError};
use crate::language::TypeKey;

/// A global index from a key to the modules whose providers could satisfy
/// it, anywhere in the linked interface, installed or not.
///
/// It backs the remediation hint attached to every missing-provider
/// diagnostic. It is a hint about what *exists*, not an assertion about what
/// is in scope, so it's computed once per resolver run and shared across
/// components.
pub(crate) struct ProviderSuggestions {
    by_key: IndexMap<TypeKey, IndexSet<String>>,
}

impl ProviderSuggestions {
    pub(crate) fn index(interface: &LinkedInterface) -> Self {
        let mut by_key: IndexMap<TypeKey, IndexSet<String>> = IndexMap::new();
        for module in interface.modules() {
            for raw in &module.providers {
                let provider = CanonicalProvider::new(raw, module.name.clone());
                by_key
                    .entry(provider.target().clone())
                    .or_default()
                    .insert(module.name.clone());
            }
        }
        Self { by_key }
    }

    /// Module names able to satisfy `key`, deduplicated, in first-occurrence
    /// order.
    pub(crate) fn for_key(&self, key: &TypeKey) -> Vec<String> {
        self.by_key
            .get(key)
            .map(|modules| modules.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Verify that every dependency declared by a provider *defined in this
/// scope* is satisfied somewhere along the scope chain, and that the
/// component's root object itself can be built.
///
/// Weak and lazy dependencies get no exemption here: the provider must exist
/// in the chain either way. Their special status only matters to the cycle
/// detector.
pub(crate) fn verify_dependencies(
    component: &LinkedComponent,
    bindings: &ComponentBindings<'_>,
    suggestions: &ProviderSuggestions,
    diagnostics: &DiagnosticSink,
) {
    // One chain walk per distinct key; diagnostics still fire once per
    // unsatisfied occurrence.
    let mut satisfiable: HashMap<TypeKey, bool> = HashMap::new();
    let mut is_satisfiable = |key: &TypeKey| {
        *satisfiable
            .entry(key.clone())
            .or_insert_with(|| bindings.lookup(key).is_some())
    };

    for (_, group) in bindings.iter_local() {
        for provider in group {
            for dependency in provider.dependencies() {
                if !is_satisfiable(dependency) {
                    diagnostics.push(ResolutionError::MissingProvider {
                        dependency: dependency.clone(),
                        depended_upon: Some(provider.clone()),
                        suggested_modules: suggestions.for_key(dependency),
                    });
                }
            }
        }
    }

    // The root object is a synthetic external dependency of the component.
    let root_type = TypeKey::parse(&component.root_type);
    if !is_satisfiable(&root_type) {
        diagnostics.push(ResolutionError::MissingProvider {
            dependency: root_type.clone(),
            depended_upon: None,
            suggested_modules: suggestions.for_key(&root_type),
        });
    }
}
