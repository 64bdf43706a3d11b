//! The schema used by Ravel's front-ends to hand dependency-injection
//! declarations over to `ravelc`, the resolver.
//!
//! There are no guarantees that this schema will remain stable across Ravel
//! versions: it is considered (for the time being) an internal implementation
//! detail of the extraction pipeline.
use std::fmt;
use std::fmt::Formatter;

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
/// Everything a front-end extracted from one or more compilation units:
/// module and component declarations, still unlinked.
///
/// The same type name may appear multiple times across `modules` (or across
/// `components`); partial declarations are merged by the resolver's linker.
pub struct RawInterface {
    /// All module declarations, in extraction order.
    pub modules: Vec<RawModule>,
    /// All component declarations, in extraction order.
    pub components: Vec<RawComponent>,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
/// A reusable bundle of bindings and subcomponent installations.
pub struct RawModule {
    /// The canonical type name of the module.
    pub name: TypeSpec,
    /// The bindings declared directly on this module.
    pub providers: Vec<RawProvider>,
    /// Names of the modules this module includes.
    pub included_modules: Vec<TypeSpec>,
    /// Names of the subcomponents this module installs.
    pub subcomponents: Vec<TypeSpec>,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
/// A named scope owning a set of bindings.
pub struct RawComponent {
    /// The canonical type name of the component.
    pub name: TypeSpec,
    /// `true` if the component is constructed externally, rather than
    /// installed as a subcomponent of another component.
    pub is_root: bool,
    /// The type of the object this component builds.
    pub root_type: TypeSpec,
    /// The bindings declared directly on this component.
    pub providers: Vec<RawProvider>,
    /// Names of the modules this component includes.
    pub included_modules: Vec<TypeSpec>,
    /// Names of the subcomponents this component installs.
    pub subcomponents: Vec<TypeSpec>,
    /// The binding for the external input to this component's scope.
    pub seed_provider: RawProvider,
    /// A binding injected into the parent scope so that ancestors can
    /// instantiate this component.
    pub component_factory_provider: RawProvider,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
/// A declaration that produces an instance of a target type, possibly from
/// dependencies.
pub struct RawProvider {
    /// The type this binding produces.
    pub target: TypeSpec,
    /// The types this binding consumes, in declaration order.
    pub dependencies: Vec<TypeSpec>,
    /// A human-readable label pointing back at the declaration site,
    /// carried verbatim into diagnostics.
    pub debug_origin: String,
    /// How the binding contributes to the graph.
    pub kind: ProviderKind,
}

#[derive(serde::Serialize, serde::Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
/// The flavour of a [`RawProvider`].
pub enum ProviderKind {
    /// A plain binding: one provider, one target type.
    Standard,
    /// Contributes one element to the collection bound to the target's
    /// aggregate key.
    CollectionElement,
    /// Contributes one key-value pair to the map bound to the target's
    /// aggregate key.
    MapEntry,
    /// Produces a weak reference to the target.
    Weak,
    /// Produces a lazy handle that resolves the target on demand.
    LazyIndirection,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderKind::Standard => "standard",
            ProviderKind::CollectionElement => "collection element",
            ProviderKind::MapEntry => "map entry",
            ProviderKind::Weak => "weak",
            ProviderKind::LazyIndirection => "lazy indirection",
        };
        write!(f, "{s}")
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
/// An opaque canonical type name.
///
/// The front-end is responsible for normalizing generics and namespaces into
/// this form. A name may be prefixed by at most one wrapper marker, `W:`
/// (weak reference), `P:` (lazy indirection) or `C:` (collection aggregate),
/// which the resolver unwraps exactly one level deep.
pub struct TypeSpec(pub String);

impl TypeSpec {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TypeSpec {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TypeSpec {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
