use indexmap::IndexMap;

use ravel_schema::{RawInterface, RawProvider, TypeSpec};

/// All module and component declarations, deduplicated and merged by
/// canonical type name.
///
/// A front-end may emit several partial declarations for the same module or
/// component, one per compilation unit; linking folds them into a single
/// record per name.
///
/// Invariants: every distinct name occurs at most once per namespace, and
/// the record stored under a name carries that name. Module and component
/// namespaces are disjoint.
#[derive(Debug, Clone)]
pub struct LinkedInterface {
    modules: IndexMap<String, LinkedModule>,
    components: IndexMap<String, LinkedComponent>,
}

/// A module declaration, after merging.
#[derive(Debug, Clone)]
pub struct LinkedModule {
    pub name: String,
    pub providers: Vec<RawProvider>,
    pub included_modules: Vec<TypeSpec>,
    pub subcomponents: Vec<TypeSpec>,
}

/// A component declaration, after merging.
#[derive(Debug, Clone)]
pub struct LinkedComponent {
    pub name: String,
    pub is_root: bool,
    pub root_type: TypeSpec,
    pub providers: Vec<RawProvider>,
    pub included_modules: Vec<TypeSpec>,
    pub subcomponents: Vec<TypeSpec>,
    pub seed_provider: RawProvider,
    pub component_factory_provider: RawProvider,
}

impl LinkedInterface {
    /// Fold a raw interface into one record per unique name.
    ///
    /// When a name is declared more than once, the list-valued fields of the
    /// later declaration are appended to the earlier one's, preserving
    /// left-to-right order; scalar fields keep the first-seen value. Linking
    /// never fails and emits no diagnostics.
    #[tracing::instrument(name = "Link raw interface", skip_all)]
    pub fn link(raw: RawInterface) -> Self {
        let mut modules: IndexMap<String, LinkedModule> = IndexMap::new();
        for module in raw.modules {
            match modules.entry(module.name.0.clone()) {
                indexmap::map::Entry::Occupied(mut existing) => {
                    let existing = existing.get_mut();
                    existing.providers.extend(module.providers);
                    existing.included_modules.extend(module.included_modules);
                    existing.subcomponents.extend(module.subcomponents);
                }
                indexmap::map::Entry::Vacant(slot) => {
                    slot.insert(LinkedModule {
                        name: module.name.0,
                        providers: module.providers,
                        included_modules: module.included_modules,
                        subcomponents: module.subcomponents,
                    });
                }
            }
        }

        let mut components: IndexMap<String, LinkedComponent> = IndexMap::new();
        for component in raw.components {
            match components.entry(component.name.0.clone()) {
                indexmap::map::Entry::Occupied(mut existing) => {
                    let existing = existing.get_mut();
                    existing.providers.extend(component.providers);
                    existing.included_modules.extend(component.included_modules);
                    existing.subcomponents.extend(component.subcomponents);
                }
                indexmap::map::Entry::Vacant(slot) => {
                    slot.insert(LinkedComponent {
                        name: component.name.0,
                        is_root: component.is_root,
                        root_type: component.root_type,
                        providers: component.providers,
                        included_modules: component.included_modules,
                        subcomponents: component.subcomponents,
                        seed_provider: component.seed_provider,
                        component_factory_provider: component.component_factory_provider,
                    });
                }
            }
        }

        Self {
            modules,
            components,
        }
    }

    /// Look up a module by name.
    pub fn module(&self, name: &str) -> Option<&LinkedModule> {
        self.modules.get(name)
    }

    /// Look up a component by name.
    pub fn component(&self, name: &str) -> Option<&LinkedComponent> {
        self.components.get(name)
    }

    /// Iterate over all modules, in first-declaration order.
    pub fn modules(&self) -> impl ExactSizeIterator<Item = &LinkedModule> {
        self.modules.values()
    }

    /// Iterate over the root components, in first-declaration order.
    pub fn roots(&self) -> impl Iterator<Item = &LinkedComponent> {
        self.components.values().filter(|c| c.is_root)
    }
}
