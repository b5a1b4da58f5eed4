use crate::model::SampleRef;
use crate::registry::Descriptor;

/// Change notification emitted by a repository after its indexes are updated.
#[derive(Debug, Clone)]
pub enum RepositoryEvent {
    SampleAdded { sample: SampleRef, sheet: String },
    SampleRemoved { sample: SampleRef, sheet: String },
    SheetRemoved { descriptor: Descriptor },
}

/// Trait implemented by observers of repository changes (sample browsers, counters).
pub trait RepositoryListener {
    fn on_event(&mut self, event: &RepositoryEvent);
}

impl<F> RepositoryListener for F
where
    F: FnMut(&RepositoryEvent),
{
    fn on_event(&mut self, event: &RepositoryEvent) {
        self(event)
    }
}

/// Handle returned by `add_listener`, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Progress callbacks of a repository load.
pub trait LoadListener {
    /// Number of descriptors declared by the archive.
    fn total_sheets(&mut self, _count: usize) {}

    /// Called once per sheet materialized from the archive.
    fn loaded_sheet(&mut self, _name: &str) {}
}

/// No progress reporting.
impl LoadListener for () {}
