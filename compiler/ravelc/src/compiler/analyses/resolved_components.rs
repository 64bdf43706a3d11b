use indexmap::IndexMap;

use crate::compiler::component::CanonicalProvider;
use crate::diagnostic::ResolutionError;
use crate::language::TypeKey;

/// The id of a [`ResolvedComponent`] inside its [`ResolvedForest`].
pub type ResolvedComponentId = la_arena::Idx<ResolvedComponent>;

/// A fully resolved component scope.
///
/// Ownership flows downward: a node owns its provider map and (through the
/// arena) its children. The `parent` edge is the only upward pointer and it
/// is a plain arena id, so the resolved data itself is acyclic.
#[derive(Debug)]
pub struct ResolvedComponent {
    /// The component's canonical type name.
    pub name: String,
    /// Every provider visible in this component's own scope, grouped by key,
    /// in discovery order. Multi-entry groups are collection aggregates
    /// (or duplicates, flagged in `diagnostics`).
    pub providers_by_type: IndexMap<TypeKey, Vec<CanonicalProvider>>,
    /// Installed subcomponents, in discovery order.
    pub children: Vec<ResolvedComponentId>,
    /// The installing component. `None` iff this component was resolved as
    /// a root.
    pub parent: Option<ResolvedComponentId>,
    /// Every defect produced while resolving this component and its
    /// module/subcomponent closure. Child defects live on child nodes.
    pub diagnostics: Vec<ResolutionError>,
}

/// The output of a resolver run: one resolved tree per root component, all
/// allocated in a single arena.
#[derive(Debug, Default)]
pub struct ResolvedForest {
    arena: la_arena::Arena<ResolvedComponent>,
    roots: Vec<ResolvedComponentId>,
}

impl ResolvedForest {
    /// The ids of the root components, in resolution order.
    pub fn roots(&self) -> &[ResolvedComponentId] {
        &self.roots
    }

    /// Iterate over every resolved component, roots and descendants alike.
    pub fn iter(
        &self,
    ) -> impl ExactSizeIterator<Item = (ResolvedComponentId, &ResolvedComponent)> {
        self.arena.iter()
    }

    /// All defects in `root`'s subtree, depth-first, each node's own
    /// diagnostics in production order.
    ///
    /// A non-empty result means code generation should not run for this
    /// root.
    pub fn diagnostics(&self, root: ResolvedComponentId) -> Vec<&ResolutionError> {
        let mut collected = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &self.arena[id];
            collected.extend(node.diagnostics.iter());
            // Reversed so that children pop in installation order.
            stack.extend(node.children.iter().rev().copied());
        }
        collected
    }

    pub(crate) fn alloc(&mut self, component: ResolvedComponent) -> ResolvedComponentId {
        self.arena.alloc(component)
    }

    pub(crate) fn mark_root(&mut self, id: ResolvedComponentId) {
        self.roots.push(id);
    }

    pub(crate) fn set_parent(&mut self, child: ResolvedComponentId, parent: ResolvedComponentId) {
        self.arena[child].parent = Some(parent);
    }
}

impl std::ops::Index<ResolvedComponentId> for ResolvedForest {
    type Output = ResolvedComponent;

    fn index(&self, index: ResolvedComponentId) -> &Self::Output {
        &self.arena[index]
    }
}
