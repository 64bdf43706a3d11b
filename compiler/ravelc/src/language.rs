//! The resolver's view of type identities.
//!
//! The front-end normalizes every type it encounters into an opaque
//! canonical-name string (see [`ravel_schema::TypeSpec`]); this module turns
//! those strings into [`TypeKey`]s, the value-equal identifiers that provider
//! maps and dependency edges are keyed by.
use std::fmt;
use std::fmt::Formatter;
use std::hash::{Hash, Hasher};

use ravel_schema::TypeSpec;

/// A value-equal identifier for a bound type.
///
/// Identity is the unwrapped canonical name plus collection-aggregate-ness:
/// a weak or lazy reference to `X` is *the same key* as `X`, so a dependency
/// on `W:X` is satisfied by whichever provider is bound to `X`. The
/// collection aggregate `C:X` is a distinct key: element contributions
/// target the aggregate, not the element type.
///
/// The wrapper predicates ([`is_weak`](Self::is_weak),
/// [`is_provider`](Self::is_provider), [`is_map_entry`](Self::is_map_entry))
/// are carried along for the cycle detector but excluded from equality and
/// hashing.
#[derive(Debug, Clone)]
pub struct TypeKey {
    name: String,
    is_collection: bool,
    is_weak: bool,
    is_provider: bool,
    is_map_entry: bool,
}

impl TypeKey {
    /// Parse a [`TypeSpec`] into a key, unwrapping at most one level of
    /// wrapper marker.
    pub fn parse(spec: &TypeSpec) -> Self {
        let raw = spec.as_str();
        if let Some(inner) = raw.strip_prefix("W:") {
            Self::new(inner).weak()
        } else if let Some(inner) = raw.strip_prefix("P:") {
            Self::new(inner).lazy()
        } else if let Some(inner) = raw.strip_prefix("C:") {
            Self::new(inner).into_aggregate()
        } else {
            Self::new(raw)
        }
    }

    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_collection: false,
            is_weak: false,
            is_provider: false,
            is_map_entry: false,
        }
    }

    /// The unwrapped canonical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Retarget this key at the collection aggregate for its name.
    ///
    /// Wrapper predicates don't survive the retargeting: the aggregate is a
    /// fresh key in its own right.
    pub(crate) fn into_aggregate(self) -> Self {
        Self {
            is_collection: true,
            ..Self::new(self.name)
        }
    }

    pub(crate) fn weak(mut self) -> Self {
        self.is_weak = true;
        self
    }

    pub(crate) fn lazy(mut self) -> Self {
        self.is_provider = true;
        self
    }

    pub(crate) fn map_entry(mut self) -> Self {
        self.is_map_entry = true;
        self
    }

    /// `true` if this key is a collection aggregate. Part of the key's
    /// identity.
    pub fn is_collection(&self) -> bool {
        self.is_collection
    }

    /// `true` if this occurrence of the key came through a weak reference.
    /// Excluded from identity; the cycle detector refuses to walk through
    /// weak occurrences.
    pub fn is_weak(&self) -> bool {
        self.is_weak
    }

    /// `true` if this occurrence of the key came through a lazy indirection.
    /// Excluded from identity.
    pub fn is_provider(&self) -> bool {
        self.is_provider
    }

    /// `true` if this occurrence was declared as a map-entry contribution
    /// rather than a plain element. Excluded from identity.
    pub fn is_map_entry(&self) -> bool {
        self.is_map_entry
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.is_collection == other.is_collection
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.is_collection.hash(state);
    }
}

impl fmt::Display for TypeKey {
    /// The canonical serialized form: the unwrapped name prefixed by the
    /// wrapper markers that apply to this occurrence.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_weak {
            write!(f, "W:")?;
        }
        if self.is_provider {
            write!(f, "P:")?;
        }
        if self.is_collection {
            write!(f, "C:")?;
        }
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::TypeKey;
    use ravel_schema::TypeSpec;

    fn parse(s: &str) -> TypeKey {
        TypeKey::parse(&TypeSpec::from(s))
    }

    #[test]
    fn wrapper_markers_set_the_matching_predicate() {
        assert!(parse("W:App").is_weak());
        assert!(parse("P:App").is_provider());
        assert!(parse("C:App").is_collection());
        let plain = parse("App");
        assert!(!plain.is_weak() && !plain.is_provider() && !plain.is_collection());
    }

    #[test]
    fn unwrapping_is_one_level_deep() {
        // The inner `P:` is part of the name, not a second wrapper.
        let key = parse("W:P:App");
        assert!(key.is_weak());
        assert!(!key.is_provider());
        assert_eq!(key.name(), "P:App");
    }

    #[test]
    fn weak_and_lazy_occurrences_are_the_same_key_as_the_plain_type() {
        assert_eq!(parse("W:App"), parse("App"));
        assert_eq!(parse("P:App"), parse("App"));
    }

    #[test]
    fn the_collection_aggregate_is_a_distinct_key() {
        assert_ne!(parse("C:Plugin"), parse("Plugin"));
        assert_eq!(parse("C:Plugin"), parse("C:Plugin"));
    }

    #[test]
    fn display_round_trips_the_marker_form() {
        for raw in ["App", "W:App", "P:App", "C:Plugin"] {
            assert_eq!(parse(raw).to_string(), raw);
        }
    }
}
