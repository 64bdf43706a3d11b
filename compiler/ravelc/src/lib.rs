//! `ravelc` resolves a language-neutral description of dependency-injection
//! declarations (components, subcomponents, modules, providers) into one
//! fully resolved DAG per root component, validating the graph along the way.
//!
//! The entry point is [`resolve`]: it links partial declarations across
//! compilation units, flattens each component's transitive module and
//! subcomponent closure, checks that every binding's dependencies are
//! satisfied within the visible scope chain, and detects dependency cycles,
//! honouring their legitimate break points (weak references, cross-scope
//! edges, collection bindings).
//!
//! Nothing here ever aborts on a graph defect: every problem becomes a
//! [`ResolutionError`] attached to the [`ResolvedComponent`] it was found
//! in, so one run surfaces every defect in the interface. Deciding what to
//! do about them, typically refusing to generate code for that root, is the
//! caller's job.
pub use compiler::analyses::linked_interface::{LinkedComponent, LinkedInterface, LinkedModule};
pub use compiler::analyses::resolved_components::{
    ResolvedComponent, ResolvedComponentId, ResolvedForest,
};
pub use compiler::app::{resolve, resolve_linked};
pub use compiler::component::{CanonicalProvider, ProviderOrigin};
pub use diagnostic::{DiagnosticSink, ResolutionError};
pub use language::TypeKey;

mod compiler;
mod diagnostic;
mod language;
