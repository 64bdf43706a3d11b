use std::ops::DerefMut;
use std::sync::{Arc, Mutex};

use super::ResolutionError;

/// An accumulator for graph defects.
///
/// The sink can be cheaply cloned, since it's a wrapper around a
/// reference-counted vector. Each component resolution drains the sink it
/// was handed, so defects always land on the nearest resolved component.
#[derive(Clone, Default)]
pub struct DiagnosticSink {
    diagnostics: Arc<Mutex<Vec<ResolutionError>>>,
}

impl DiagnosticSink {
    /// Create a new, empty [`DiagnosticSink`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new defect into the sink.
    pub fn push(&self, diagnostic: ResolutionError) {
        self.lock().push(diagnostic);
    }

    /// Drain the sink, retrieving all the defects accumulated so far.
    pub fn drain(&self) -> Vec<ResolutionError> {
        std::mem::take(self.lock().deref_mut())
    }

    /// Check if the sink is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The number of defects accumulated so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ResolutionError>> {
        self.diagnostics
            .lock()
            .expect("The lock around the diagnostic sink was poisoned")
    }
}
