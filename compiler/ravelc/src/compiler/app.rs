use ravel_schema::RawInterface;

use crate::compiler::analyses::component_bindings::ComponentBindings;
use crate::compiler::analyses::cycles::detect_cycles;
use crate::compiler::analyses::linked_interface::{LinkedComponent, LinkedInterface};
use crate::compiler::analyses::missing_providers::{ProviderSuggestions, verify_dependencies};
use crate::compiler::analyses::resolved_components::{
    ResolvedComponent, ResolvedComponentId, ResolvedForest,
};
use crate::diagnostic::DiagnosticSink;
use crate::language::TypeKey;

/// Resolve a raw interface into one [`ResolvedComponent`] tree per root
/// component.
///
/// Many different things can go wrong along the way: every defect is
/// reported as a diagnostic on the resolved component it was found in, and
/// resolution always runs to completion so that the user sees all of them in
/// a single pass. An interface with no root components yields an empty
/// forest.
#[tracing::instrument(name = "Resolve raw interface", skip_all)]
pub fn resolve(raw: RawInterface) -> ResolvedForest {
    resolve_linked(&LinkedInterface::link(raw))
}

/// Resolve an already-linked interface.
///
/// A pure function: scopes flow only downward, and no state survives the
/// call, so distinct roots could just as well be resolved in parallel.
pub fn resolve_linked(interface: &LinkedInterface) -> ResolvedForest {
    let suggestions = ProviderSuggestions::index(interface);
    let mut forest = ResolvedForest::default();
    for root in interface.roots() {
        let _span = tracing::info_span!("Resolve root component", name = %root.name).entered();
        let id = resolve_component(root, interface, &suggestions, None, &mut forest);
        forest.mark_root(id);
    }
    forest
}

/// Run the per-component pipeline (scope construction, dependency
/// verification, cycle detection), then recurse into the installed
/// subcomponents with this component's bindings chained as their parent
/// scope.
fn resolve_component(
    component: &LinkedComponent,
    interface: &LinkedInterface,
    suggestions: &ProviderSuggestions,
    parent: Option<&ComponentBindings<'_>>,
    forest: &mut ResolvedForest,
) -> ResolvedComponentId {
    let diagnostics = DiagnosticSink::new();
    let (bindings, subcomponents) =
        ComponentBindings::build(component, interface, parent, &diagnostics);
    verify_dependencies(component, &bindings, suggestions, &diagnostics);
    detect_cycles(&TypeKey::parse(&component.root_type), &bindings, &diagnostics);

    let children: Vec<_> = subcomponents
        .into_iter()
        .map(|subcomponent| {
            resolve_component(subcomponent, interface, suggestions, Some(&bindings), forest)
        })
        .collect();

    let id = forest.alloc(ResolvedComponent {
        name: component.name.clone(),
        providers_by_type: bindings.into_providers(),
        children: children.clone(),
        parent: None,
        diagnostics: diagnostics.drain(),
    });
    for child in children {
        forest.set_parent(child, id);
    }
    id
}
