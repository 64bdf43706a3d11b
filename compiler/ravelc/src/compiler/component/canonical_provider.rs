use std::fmt;
use std::fmt::Formatter;

use ravel_schema::{ProviderKind, RawProvider};

use crate::language::TypeKey;

/// A binding, after canonicalization.
///
/// Canonicalization rewrites declaration variants such as "lazy reference
/// to X" or "collection element of X" into a uniform key
/// space, so that the scope resolver can group bindings by [`TypeKey`]
/// without caring how each one was declared.
///
/// All behavior downstream switches on the flags carried here and on the
/// key predicates; there is no further polymorphism over provider kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalProvider {
    target: TypeKey,
    dependencies: Vec<TypeKey>,
    is_collection_provider: bool,
    is_weak: bool,
    origin: ProviderOrigin,
}

impl CanonicalProvider {
    /// Canonicalize a raw provider declaration.
    ///
    /// Applied whenever a raw provider enters a scope. The rules are ordered,
    /// first match wins:
    ///
    /// 1. a lazy-indirection binding unwraps once and marks the key as a
    ///    provider handle;
    /// 2. a weak binding unwraps once and marks the key weak;
    /// 3. a collection contribution (element or map entry) retargets the
    ///    binding at the aggregate key for its element type;
    /// 4. anything else maps through unchanged.
    ///
    /// Dependencies are canonicalized by the same rules, driven by the
    /// wrapper markers on their type specs.
    pub(crate) fn new(raw: &RawProvider, source: impl Into<String>) -> Self {
        let parsed = TypeKey::parse(&raw.target);
        let (target, is_collection_provider) = match raw.kind {
            ProviderKind::LazyIndirection => (parsed.lazy(), false),
            ProviderKind::Weak => (parsed.weak(), false),
            ProviderKind::CollectionElement => (parsed.into_aggregate(), true),
            ProviderKind::MapEntry => (parsed.into_aggregate().map_entry(), true),
            ProviderKind::Standard => {
                let is_collection = parsed.is_collection();
                (parsed, is_collection)
            }
        };
        let is_weak = target.is_weak();
        Self {
            target,
            dependencies: raw.dependencies.iter().map(TypeKey::parse).collect(),
            is_collection_provider,
            is_weak,
            origin: ProviderOrigin {
                source: source.into(),
                label: raw.debug_origin.clone(),
            },
        }
    }

    /// The key this binding is bound to in the provider map.
    pub fn target(&self) -> &TypeKey {
        &self.target
    }

    /// The keys this binding consumes, in declaration order.
    pub fn dependencies(&self) -> &[TypeKey] {
        &self.dependencies
    }

    /// `true` if this binding contributes one entry to a collection
    /// aggregate. Multiple collection providers may share a key.
    pub fn is_collection_provider(&self) -> bool {
        self.is_collection_provider
    }

    /// `true` if this binding produces a weak reference.
    pub fn is_weak(&self) -> bool {
        self.is_weak
    }

    /// Where the binding was declared.
    pub fn origin(&self) -> &ProviderOrigin {
        &self.origin
    }
}

impl fmt::Display for CanonicalProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`, registered by {}", self.target, self.origin)
    }
}

/// The declaration site of a binding, for error reporting purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderOrigin {
    /// The module or component the binding was declared in.
    pub source: String,
    /// The human label the front-end attached to the declaration.
    pub label: String,
}

impl fmt::Display for ProviderOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` in `{}`", self.label, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::CanonicalProvider;
    use ravel_schema::{ProviderKind, RawProvider};

    fn raw(target: &str, deps: &[&str], kind: ProviderKind) -> RawProvider {
        RawProvider {
            target: target.into(),
            dependencies: deps.iter().map(|d| (*d).into()).collect(),
            debug_origin: format!("provides_{}", target.to_lowercase()),
            kind,
        }
    }

    #[test]
    fn a_standard_binding_maps_through_unchanged() {
        let p = CanonicalProvider::new(&raw("App", &["Svc"], ProviderKind::Standard), "M1");
        assert_eq!(p.target().name(), "App");
        assert!(!p.is_collection_provider());
        assert!(!p.is_weak());
        assert_eq!(p.dependencies().len(), 1);
    }

    #[test]
    fn a_collection_element_retargets_at_the_aggregate_key() {
        let p = CanonicalProvider::new(&raw("Plugin", &[], ProviderKind::CollectionElement), "M1");
        assert!(p.target().is_collection());
        assert!(p.is_collection_provider());
        assert_eq!(p.target().name(), "Plugin");
    }

    #[test]
    fn a_map_entry_is_a_collection_contribution() {
        let p = CanonicalProvider::new(&raw("Plugin", &[], ProviderKind::MapEntry), "M1");
        assert!(p.target().is_collection());
        assert!(p.target().is_map_entry());
        assert!(p.is_collection_provider());
    }

    #[test]
    fn weak_and_lazy_bindings_unwrap_onto_the_plain_key() {
        let weak = CanonicalProvider::new(&raw("Cache", &[], ProviderKind::Weak), "M1");
        assert!(weak.is_weak());
        let lazy = CanonicalProvider::new(&raw("Cache", &[], ProviderKind::LazyIndirection), "M1");
        assert!(lazy.target().is_provider());
        // Both are bound to the same key as a standard `Cache` binding.
        let plain = CanonicalProvider::new(&raw("Cache", &[], ProviderKind::Standard), "M1");
        assert_eq!(weak.target(), plain.target());
        assert_eq!(lazy.target(), plain.target());
    }

    #[test]
    fn dependency_markers_are_parsed() {
        let p = CanonicalProvider::new(
            &raw("App", &["W:Cache", "P:Db", "C:Plugin"], ProviderKind::Standard),
            "M1",
        );
        let deps = p.dependencies();
        assert!(deps[0].is_weak());
        assert!(deps[1].is_provider());
        assert!(deps[2].is_collection());
    }
}
