//! The resolver's binding model: raw provider declarations, normalized into
//! a uniform key space.
pub use canonical_provider::{CanonicalProvider, ProviderOrigin};

mod canonical_provider;
