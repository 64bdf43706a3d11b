use indexmap::IndexSet;
use petgraph::graphmap::DiGraphMap;

use crate::compiler::analyses::component_bindings::ComponentBindings;
use crate::diagnostic::{DiagnosticSink, ResolutionError};
use crate::language::TypeKey;

/// Detect cycles in a component's local dependency graph, starting from the
/// key of the object the component builds.
///
/// Only the component's own provider map is walked: a dependency satisfied
/// by an ancestor scope is treated as external, since scopes form a tree and
/// a cross-scope edge can never close a cycle. Weak edges are skipped; lazy
/// indirections are walked like any other edge; only weakness breaks a
/// cycle.
///
/// The detector never mutates the scope; it only appends to `diagnostics`.
pub(crate) fn detect_cycles(
    root_type: &TypeKey,
    bindings: &ComponentBindings<'_>,
    diagnostics: &DiagnosticSink,
) {
    if root_type.is_weak() {
        return;
    }
    let (keys, graph) = local_dependency_graph(bindings);
    let Some(root) = keys.get_index_of(root_type) else {
        // The root object is satisfied by an ancestor scope, or not at all;
        // either way there is nothing local to walk.
        return;
    };
    CycleDetector {
        keys: &keys,
        graph: &graph,
        resolved: IndexSet::new(),
        ancestors: Vec::new(),
        diagnostics,
    }
    .visit(root);
}

/// Collapse the local provider map into a graph over interned key ids.
///
/// An edge is marked weak only if *every* declaration of that edge is weak:
/// a single strong occurrence is enough for the detector to walk it. Edges
/// pointing outside the local map are omitted.
fn local_dependency_graph(
    bindings: &ComponentBindings<'_>,
) -> (IndexSet<TypeKey>, DiGraphMap<usize, bool>) {
    let mut keys: IndexSet<TypeKey> = IndexSet::new();
    let mut graph: DiGraphMap<usize, bool> = DiGraphMap::new();
    for (key, providers) in bindings.iter_local() {
        let (from, _) = keys.insert_full(key.clone());
        graph.add_node(from);
        for provider in providers {
            for dependency in provider.dependencies() {
                if bindings.get_local(dependency).is_none() {
                    continue;
                }
                let (to, _) = keys.insert_full(dependency.clone());
                match graph.edge_weight_mut(from, to) {
                    Some(weak) => *weak = *weak && dependency.is_weak(),
                    None => {
                        graph.add_edge(from, to, dependency.is_weak());
                    }
                }
            }
        }
    }
    (keys, graph)
}

struct CycleDetector<'a> {
    keys: &'a IndexSet<TypeKey>,
    graph: &'a DiGraphMap<usize, bool>,
    /// Keys that can no longer be part of an unreported cycle: fully
    /// explored, or already reported through.
    resolved: IndexSet<usize>,
    /// The current DFS path.
    ancestors: Vec<usize>,
    diagnostics: &'a DiagnosticSink,
}

impl CycleDetector<'_> {
    fn visit(&mut self, key: usize) {
        if self.resolved.contains(&key) {
            return;
        }
        if let Some(position) = self.ancestors.iter().position(|&a| a == key) {
            let chain = self.ancestors[position..]
                .iter()
                .chain(std::iter::once(&key))
                .map(|&id| self.keys[id].clone())
                .collect();
            self.diagnostics
                .push(ResolutionError::CyclicalDependency { chain });
            // Marking the key resolved records the cycle once and prevents
            // re-reporting it through other paths.
            self.resolved.insert(key);
            return;
        }
        self.ancestors.push(key);
        for (_, dependency, &weak) in self.graph.edges(key) {
            if !weak {
                self.visit(dependency);
            }
        }
        self.ancestors.pop();
        self.resolved.insert(key);
    }
}

#[cfg(test)]
mod tests {
    use super::detect_cycles;
    use crate::compiler::analyses::component_bindings::ComponentBindings;
    use crate::compiler::analyses::linked_interface::LinkedInterface;
    use crate::diagnostic::{DiagnosticSink, ResolutionError};
    use crate::language::TypeKey;
    use ravel_schema::{ProviderKind, RawComponent, RawInterface, RawModule, RawProvider};

    fn provider(target: &str, dependencies: &[&str]) -> RawProvider {
        RawProvider {
            target: target.into(),
            dependencies: dependencies.iter().copied().map(Into::into).collect(),
            debug_origin: format!("provides_{target}"),
            kind: ProviderKind::Standard,
        }
    }

    fn cycles_for(providers: Vec<RawProvider>, root_type: &str) -> Vec<ResolutionError> {
        let interface = LinkedInterface::link(RawInterface {
            modules: vec![RawModule {
                name: "M1".into(),
                providers,
                included_modules: vec![],
                subcomponents: vec![],
            }],
            components: vec![RawComponent {
                name: "Root".into(),
                is_root: true,
                root_type: root_type.into(),
                providers: vec![],
                included_modules: vec!["M1".into()],
                subcomponents: vec![],
                seed_provider: provider("Root.Seed", &[]),
                component_factory_provider: provider("Root.Factory", &[]),
            }],
        });
        let diagnostics = DiagnosticSink::new();
        let component = interface.component("Root").unwrap();
        let (bindings, _) = ComponentBindings::build(component, &interface, None, &diagnostics);
        diagnostics.drain();
        detect_cycles(&TypeKey::parse(&component.root_type), &bindings, &diagnostics);
        diagnostics.drain()
    }

    fn chain_names(error: &ResolutionError) -> Vec<&str> {
        let ResolutionError::CyclicalDependency { chain } = error else {
            panic!("expected a cycle diagnostic");
        };
        chain.iter().map(|k| k.name()).collect()
    }

    #[test]
    fn a_three_step_cycle_is_reported_with_its_exact_chain() {
        let errors = cycles_for(
            vec![
                provider("A", &["B"]),
                provider("B", &["C"]),
                provider("C", &["A"]),
            ],
            "A",
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(chain_names(&errors[0]), ["A", "B", "C", "A"]);
    }

    #[test]
    fn a_weak_edge_breaks_the_cycle() {
        let errors = cycles_for(
            vec![
                provider("A", &["B"]),
                provider("B", &["C"]),
                provider("C", &["W:A"]),
            ],
            "A",
        );
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn a_lazy_edge_does_not_break_the_cycle() {
        let errors = cycles_for(
            vec![
                provider("A", &["B"]),
                provider("B", &["C"]),
                provider("C", &["P:A"]),
            ],
            "A",
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(chain_names(&errors[0]), ["A", "B", "C", "A"]);
    }

    #[test]
    fn a_diamond_is_not_a_cycle() {
        // D is reachable along two paths; revisiting a fully-explored key
        // must not be confused with revisiting an ancestor.
        let errors = cycles_for(
            vec![
                provider("A", &["B", "C"]),
                provider("B", &["D"]),
                provider("C", &["D"]),
                provider("D", &[]),
            ],
            "A",
        );
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn a_self_loop_is_a_cycle_of_length_one() {
        let errors = cycles_for(vec![provider("A", &["A"])], "A");
        assert_eq!(errors.len(), 1);
        assert_eq!(chain_names(&errors[0]), ["A", "A"]);
    }

    #[test]
    fn a_cycle_is_reported_once_even_when_reachable_along_two_paths() {
        // Both A -> B and A -> C lead into the B <-> C cycle.
        let errors = cycles_for(
            vec![
                provider("A", &["B", "C"]),
                provider("B", &["C"]),
                provider("C", &["B"]),
            ],
            "A",
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(chain_names(&errors[0]), ["B", "C", "B"]);
    }

    #[test]
    fn keys_satisfied_by_an_ancestor_scope_are_not_descended_into() {
        // `A` depends on `Ext`, which only the parent provides; even if the
        // parent's `Ext` depended on `A`, scopes forming a tree means no
        // local cycle can close through it.
        let interface = LinkedInterface::link(RawInterface {
            modules: vec![
                RawModule {
                    name: "MParent".into(),
                    providers: vec![provider("Ext", &["A"])],
                    included_modules: vec![],
                    subcomponents: vec![],
                },
                RawModule {
                    name: "MChild".into(),
                    providers: vec![provider("A", &["Ext"])],
                    included_modules: vec![],
                    subcomponents: vec![],
                },
            ],
            components: vec![
                RawComponent {
                    name: "Root".into(),
                    is_root: true,
                    root_type: "Ext".into(),
                    providers: vec![],
                    included_modules: vec!["MParent".into()],
                    subcomponents: vec![],
                    seed_provider: provider("Root.Seed", &[]),
                    component_factory_provider: provider("Root.Factory", &[]),
                },
                RawComponent {
                    name: "Child".into(),
                    is_root: false,
                    root_type: "A".into(),
                    providers: vec![],
                    included_modules: vec!["MChild".into()],
                    subcomponents: vec![],
                    seed_provider: provider("Child.Seed", &[]),
                    component_factory_provider: provider("Child.Factory", &[]),
                },
            ],
        });
        let diagnostics = DiagnosticSink::new();
        let root = interface.component("Root").unwrap();
        let (parent_bindings, _) =
            ComponentBindings::build(root, &interface, None, &diagnostics);
        let child = interface.component("Child").unwrap();
        let (child_bindings, _) =
            ComponentBindings::build(child, &interface, Some(&parent_bindings), &diagnostics);
        diagnostics.drain();

        detect_cycles(
            &TypeKey::parse(&child.root_type),
            &child_bindings,
            &diagnostics,
        );
        assert_eq!(diagnostics.drain(), vec![]);
    }
}
