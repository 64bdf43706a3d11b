//! A toolkit to assemble and report graph defects to the user.
//!
//! Defects are collected, never thrown: resolution keeps going after every
//! diagnostic so that a single run surfaces all the problems in the
//! interface, and each diagnostic ends up attached to the resolved component
//! it was produced for.
pub use errors::ResolutionError;
pub use sink::DiagnosticSink;

mod errors;
mod sink;
