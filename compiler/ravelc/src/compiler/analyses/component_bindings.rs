use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};

use crate::compiler::analyses::linked_interface::{
    LinkedComponent, LinkedInterface, LinkedModule,
};
use crate::compiler::component::CanonicalProvider;
use crate::diagnostic::{DiagnosticSink, ResolutionError};
use crate::language::TypeKey;

/// The bindings visible from one component: its own provider map plus a
/// reference to the parent component's bindings, if any.
///
/// Scopes form a tree, so the parent references make up an immutable,
/// singly-linked chain; lookups walk the component itself first, then its
/// ancestors. A `ComponentBindings` is never mutated after construction and
/// lives for the resolution of its component and all of its descendants.
pub(crate) struct ComponentBindings<'a> {
    providers: IndexMap<TypeKey, Vec<CanonicalProvider>>,
    parent: Option<&'a ComponentBindings<'a>>,
}

impl<'a> ComponentBindings<'a> {
    /// Build the scope for `component`.
    ///
    /// This flattens the component's transitive module closure, resolves its
    /// installed subcomponents, and assembles the provider map:
    ///
    /// - the component's own providers come first;
    /// - then each closure module's providers, in BFS discovery order;
    /// - then the synthesized entries: the seed provider and one component
    ///   factory per installed subcomponent.
    ///
    /// Unknown module or subcomponent names and non-collection key clashes
    /// are pushed into `diagnostics`; construction itself never fails.
    ///
    /// Returns the scope together with the installed subcomponents, in
    /// discovery order, so the caller can recurse into them with this scope
    /// chained as their parent.
    pub(crate) fn build<'i>(
        component: &'i LinkedComponent,
        interface: &'i LinkedInterface,
        parent: Option<&'a ComponentBindings<'a>>,
        diagnostics: &DiagnosticSink,
    ) -> (Self, Vec<&'i LinkedComponent>) {
        let module_closure = module_closure(component, interface, diagnostics);
        let subcomponents = subcomponents(component, &module_closure, interface, diagnostics);

        let mut providers: IndexMap<TypeKey, Vec<CanonicalProvider>> = IndexMap::new();
        let mut insert = |provider: CanonicalProvider| {
            providers
                .entry(provider.target().clone())
                .or_default()
                .push(provider);
        };
        for raw in &component.providers {
            insert(CanonicalProvider::new(raw, component.name.clone()));
        }
        for module in &module_closure {
            for raw in &module.providers {
                insert(CanonicalProvider::new(raw, module.name.clone()));
            }
        }
        insert(CanonicalProvider::new(
            &component.seed_provider,
            component.name.clone(),
        ));
        for subcomponent in &subcomponents {
            insert(CanonicalProvider::new(
                &subcomponent.component_factory_provider,
                subcomponent.name.clone(),
            ));
        }

        for (key, group) in &providers {
            if group.len() > 1 && group.iter().any(|p| !p.is_collection_provider()) {
                diagnostics.push(ResolutionError::DuplicateProvider {
                    key: key.clone(),
                    providers: group.clone(),
                });
            }
        }

        (Self { providers, parent }, subcomponents)
    }

    /// The providers bound to `key` in this component's own map, ignoring
    /// ancestors.
    pub(crate) fn get_local(&self, key: &TypeKey) -> Option<&[CanonicalProvider]> {
        self.providers.get(key).map(Vec::as_slice)
    }

    /// Walk the scope chain, self first and then ancestors, for the
    /// providers bound to `key`.
    pub(crate) fn lookup(&self, key: &TypeKey) -> Option<&[CanonicalProvider]> {
        let mut scope = Some(self);
        while let Some(bindings) = scope {
            if let Some(group) = bindings.get_local(key) {
                return Some(group);
            }
            scope = bindings.parent;
        }
        None
    }

    /// Iterate over this component's own provider map, in insertion order.
    pub(crate) fn iter_local(
        &self,
    ) -> impl Iterator<Item = (&TypeKey, &[CanonicalProvider])> {
        self.providers.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Surrender the provider map, e.g. to move it into a resolved node.
    pub(crate) fn into_providers(self) -> IndexMap<TypeKey, Vec<CanonicalProvider>> {
        self.providers
    }
}

/// BFS over `included_modules`, component first, suppressing duplicate
/// visits. The queue order makes diagnostic order deterministic with respect
/// to input order.
fn module_closure<'i>(
    component: &'i LinkedComponent,
    interface: &'i LinkedInterface,
    diagnostics: &DiagnosticSink,
) -> Vec<&'i LinkedModule> {
    let mut queue: VecDeque<&str> = component
        .included_modules
        .iter()
        .map(|m| m.as_str())
        .collect();
    let mut seen: IndexSet<&str> = IndexSet::new();
    let mut closure = Vec::new();
    while let Some(name) = queue.pop_front() {
        if !seen.insert(name) {
            continue;
        }
        match interface.module(name) {
            Some(module) => {
                queue.extend(module.included_modules.iter().map(|m| m.as_str()));
                closure.push(module);
            }
            None => diagnostics.push(ResolutionError::MissingModule {
                module: name.to_owned(),
            }),
        }
    }
    closure
}

/// The union of the component's subcomponent installations with those of its
/// module closure, in discovery order. A subcomponent installed from several
/// places still contributes a single factory provider.
fn subcomponents<'i>(
    component: &'i LinkedComponent,
    module_closure: &[&'i LinkedModule],
    interface: &'i LinkedInterface,
    diagnostics: &DiagnosticSink,
) -> Vec<&'i LinkedComponent> {
    let names: IndexSet<&str> = component
        .subcomponents
        .iter()
        .map(|s| s.as_str())
        .chain(
            module_closure
                .iter()
                .flat_map(|m| m.subcomponents.iter().map(|s| s.as_str())),
        )
        .collect();
    let mut installed = Vec::with_capacity(names.len());
    for name in names {
        match interface.component(name) {
            Some(subcomponent) => installed.push(subcomponent),
            None => diagnostics.push(ResolutionError::MissingSubcomponent {
                component: name.to_owned(),
            }),
        }
    }
    installed
}
