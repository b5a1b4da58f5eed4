//! The sample repository: sheets, their samples and the descriptor registry.
//!
//! A repository owns every `SampleSheet` it knows, and three indexes over them:
//! - by canonical sheet name,
//! - by loaded sheet image,
//! - by sample identity (sample -> owning sheet).
//!
//! All mutations go through `SampleRepository` methods, which keep the three indexes
//! and the registry consistent before returning. Sheets are handed out by reference;
//! their sample lists can only be changed through the repository.
//!
//! Several repositories may coexist (the global one and one per book). They only
//! interact through `include_repository`.

mod check;
mod events;
mod persist;
mod resolve;
mod training;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{PixelSource, RunTable, Sample, SampleId, SampleRef, Shape, Tribe};
use crate::registry::{Descriptor, RegistryError, SheetRegistry};
use crate::sheet::{ImageStatus, SampleSheet};
use crate::store::{ArchiveError, RepositoryConfig, RepositoryLayout};

pub use check::SampleCheck;
pub use events::{ListenerId, LoadListener, RepositoryEvent, RepositoryListener};
pub use persist::{LoadReport, StoreReport};
pub use resolve::IncludeReport;
pub use training::TrainTestSplit;

/// Name prefix of the sheets holding font-derived samples.
pub const SYMBOLS_PREFIX: &str = "# SYMBOLS FROM FONT # ";

/// Radix used when a sheet is found by image only.
pub const DEFAULT_SHEET_RADIX: &str = "sheet";

/// Error type for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Unknown sample sheet: {0}")]
    UnknownSheet(String),

    /// A sheet can only be found from a name, an image, or both.
    #[error("A sample sheet needs a name or an image")]
    MissingIdentity,

    #[error("Not a samples archive: {}", .0.display())]
    InvalidArchiveName(PathBuf),

    #[error("Unknown sample: {0}")]
    UnknownSample(SampleId),

    /// The archived samples of this sheet could not be read at load time; writing to it
    /// would replace them.
    #[error("Sample sheet {0} could not be loaded and is read-only")]
    UnreadableSheet(String),

    #[error("Sample {0} is already in the repository")]
    SampleAlreadyPresent(SampleId),

    /// Font-derived samples are rebuilt, never edited.
    #[error("Font-based samples cannot be removed from {0}")]
    SymbolSheet(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Does this sheet name designate a font-derived symbols sheet?
pub fn is_symbols(name: &str) -> bool {
    name.starts_with(SYMBOLS_PREFIX)
}

/// Sheet name used for the symbols of a font family.
pub fn symbols_sheet_name(family: &str) -> String {
    format!("{SYMBOLS_PREFIX}{family}")
}

/// Store of training samples, grouped by source sheet.
pub struct SampleRepository {
    layout: RepositoryLayout,
    config: RepositoryConfig,
    registry: SheetRegistry,
    /// Resident sheets by canonical name.
    sheets: BTreeMap<String, SampleSheet>,
    /// Loaded sheet images -> canonical name.
    image_index: HashMap<Arc<RunTable>, String>,
    /// Sample -> canonical name of its sheet.
    sample_index: HashMap<SampleId, String>,
    /// Redundant font-based samples, left out of training splits.
    ignored: HashSet<SampleId>,
    /// Declared sheets whose samples entry failed to decode at load.
    unreadable: BTreeSet<String>,
    listeners: Vec<(ListenerId, Box<dyn RepositoryListener>)>,
    next_listener: u64,
    loaded: bool,
}

impl SampleRepository {
    /// Create an empty, not yet loaded repository. Nothing is read from disk.
    pub fn open(layout: RepositoryLayout, config: RepositoryConfig) -> Self {
        Self {
            layout,
            config,
            registry: SheetRegistry::new(),
            sheets: BTreeMap::new(),
            image_index: HashMap::new(),
            sample_index: HashMap::new(),
            ignored: HashSet::new(),
            unreadable: BTreeSet::new(),
            listeners: Vec::new(),
            next_listener: 0,
            loaded: false,
        }
    }

    pub fn layout(&self) -> &RepositoryLayout {
        &self.layout
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn registry(&self) -> &SheetRegistry {
        &self.registry
    }

    pub fn is_global(&self) -> bool {
        self.layout.is_global()
    }

    /// True once a load completed (an absent archive counts as loaded).
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Unsaved registry or sheet changes?
    pub fn is_modified(&self) -> bool {
        self.registry.is_modified() || self.sheets.values().any(SampleSheet::is_modified)
    }

    fn set_modified(&mut self, modified: bool) {
        self.registry.set_modified(modified);
        for sheet in self.sheets.values_mut() {
            sheet.set_modified(modified);
        }
    }

    // ----- listeners -----

    pub fn add_listener<L: RepositoryListener + 'static>(&mut self, listener: L) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns true if the listener was registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn fire(&mut self, event: RepositoryEvent) {
        for (_, listener) in &mut self.listeners {
            listener.on_event(&event);
        }
    }

    // ----- samples -----

    /// Add a sample to the sheet named `sheet` (canonical name, as returned by
    /// [`Self::find_sample_sheet`]).
    pub fn add_sample(&mut self, sample: SampleRef, sheet: &str) -> RepositoryResult<()> {
        if self.sample_index.contains_key(&sample.id()) {
            return Err(RepositoryError::SampleAlreadyPresent(sample.id()));
        }
        let target = self
            .sheets
            .get_mut(sheet)
            .ok_or_else(|| RepositoryError::UnknownSheet(sheet.to_string()))?;
        target.add_sample(Arc::clone(&sample));
        self.sample_index.insert(sample.id(), sheet.to_string());

        info!("{} added {} to {}", self, sample, sheet);
        self.fire(RepositoryEvent::SampleAdded { sample, sheet: sheet.to_string() });
        Ok(())
    }

    /// Build a sample from a recognized glyph and add it to `sheet`.
    ///
    /// This is the entry point of the recognition pipeline; `sheet` comes from
    /// [`Self::find_sample_sheet`].
    pub fn add_glyph_sample(
        &mut self,
        shape: Shape,
        glyph: &dyn PixelSource,
        interline: u32,
        sheet: &str,
        pitch: Option<f64>,
    ) -> RepositoryResult<SampleRef> {
        let sample = Arc::new(Sample::from_glyph(shape, glyph, interline, pitch));
        self.add_sample(Arc::clone(&sample), sheet)?;
        Ok(sample)
    }

    pub fn remove_sample(&mut self, sample: &SampleRef) -> RepositoryResult<()> {
        let sheet_name = self
            .sample_index
            .get(&sample.id())
            .cloned()
            .ok_or(RepositoryError::UnknownSample(sample.id()))?;
        if is_symbols(&sheet_name) {
            return Err(RepositoryError::SymbolSheet(sheet_name));
        }
        let sheet = self
            .sheets
            .get_mut(&sheet_name)
            .ok_or_else(|| RepositoryError::UnknownSheet(sheet_name.clone()))?;
        if !sheet.remove_sample(sample) {
            return Err(RepositoryError::UnknownSample(sample.id()));
        }
        self.sample_index.remove(&sample.id());
        self.ignored.remove(&sample.id());

        info!("{} removed {} from {}", self, sample, sheet_name);
        self.fire(RepositoryEvent::SampleRemoved { sample: Arc::clone(sample), sheet: sheet_name });
        Ok(())
    }

    // ----- sheets -----

    /// Remove a sheet (by name or alias) with its samples and image.
    ///
    /// Its descriptor stays pending deletion until the next store, which deletes its
    /// archive material.
    pub fn remove_sheet(&mut self, name: &str) -> RepositoryResult<Descriptor> {
        let canonical = self
            .registry
            .descriptor(name)
            .map(|desc| desc.name().to_string())
            .ok_or_else(|| RepositoryError::UnknownSheet(name.to_string()))?;

        if let Some(sheet) = self.sheets.remove(&canonical) {
            if let Some(image) = sheet.image() {
                self.image_index.remove(&**image);
            }
            for sample in sheet.all_samples() {
                self.sample_index.remove(&sample.id());
                self.ignored.remove(&sample.id());
            }
        }
        let descriptor = self.registry.remove_descriptor(&canonical)?;
        self.unreadable.remove(&canonical);

        info!("{} removed sheet {}", self, descriptor);
        self.fire(RepositoryEvent::SheetRemoved { descriptor: descriptor.clone() });
        Ok(descriptor)
    }

    /// Resident sheet designated by a name or an alias.
    pub fn sheet(&self, name_or_alias: &str) -> Option<&SampleSheet> {
        let desc = self.registry.descriptor(name_or_alias)?;
        self.sheets.get(desc.name())
    }

    /// Resident sheet whose image equals `image`. Unlike [`Self::find_sample_sheet`],
    /// nothing is created or registered.
    pub fn poke_sample_sheet(&self, image: &RunTable) -> Option<&SampleSheet> {
        self.image_index.get(image).and_then(|name| self.sheets.get(name))
    }

    pub fn sheets(&self) -> impl Iterator<Item = &SampleSheet> {
        self.sheets.values()
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// The tribe headed by `best` in `sheet`, created on first request.
    pub fn tribe(&mut self, sheet: &str, best: &SampleRef) -> RepositoryResult<&mut Tribe> {
        let target = self
            .sheets
            .get_mut(sheet)
            .ok_or_else(|| RepositoryError::UnknownSheet(sheet.to_string()))?;
        Ok(target.tribe(best))
    }

    pub fn image_status(&self, sheet: &str) -> Option<ImageStatus> {
        self.sheet(sheet).map(SampleSheet::image_status)
    }

    // ----- queries -----

    /// Every descriptor, sorted by name.
    pub fn all_descriptors(&self) -> Vec<&Descriptor> {
        self.registry.all_descriptors()
    }

    pub fn descriptor(&self, name_or_alias: &str) -> Option<&Descriptor> {
        self.registry.descriptor(name_or_alias)
    }

    /// Every sample of every sheet, in sheet name order.
    pub fn all_samples(&self) -> Vec<SampleRef> {
        self.sheets.values().flat_map(SampleSheet::all_samples).collect()
    }

    pub fn all_tribes(&self) -> Vec<&Tribe> {
        self.sheets.values().flat_map(SampleSheet::tribes).collect()
    }

    /// Samples of one shape in one sheet (name or alias).
    pub fn samples(&self, sheet: &str, shape: &Shape) -> Vec<SampleRef> {
        self.sheet(sheet).map(|s| s.samples(shape).to_vec()).unwrap_or_default()
    }

    /// Samples of the given sheets, restricted to the given shapes.
    pub fn samples_of(&self, sheets: &[&str], shapes: &[Shape]) -> Vec<SampleRef> {
        let mut found = Vec::new();
        for name in sheets {
            let Some(sheet) = self.sheet(name) else {
                debug!("{} has no resident sheet {}", self, name);
                continue;
            };
            for shape in shapes {
                found.extend(sheet.samples(shape).iter().cloned());
            }
        }
        found
    }

    /// Sheet holding `sample`, if the sample belongs to this repository.
    pub fn sample_sheet(&self, sample: &Sample) -> Option<&SampleSheet> {
        self.sample_index.get(&sample.id()).and_then(|name| self.sheets.get(name))
    }

    pub fn sheet_name(&self, sample: &Sample) -> Option<&str> {
        self.sample_index.get(&sample.id()).map(String::as_str)
    }

    pub fn descriptor_of(&self, sample: &Sample) -> Option<&Descriptor> {
        self.sheet_name(sample).and_then(|name| self.registry.descriptor_by_name(name))
    }

    /// Shapes present in one sheet.
    pub fn shapes(&self, sheet: &str) -> BTreeSet<Shape> {
        self.sheet(sheet).map(|s| s.shapes().cloned().collect()).unwrap_or_default()
    }

    pub fn sample_count(&self) -> usize {
        self.sample_index.len()
    }

    /// Sample count per shape, across all sheets.
    pub fn shape_counts(&self) -> BTreeMap<Shape, usize> {
        let mut counts = BTreeMap::new();
        for sheet in self.sheets.values() {
            for shape in sheet.shapes() {
                *counts.entry(shape.clone()).or_insert(0) += sheet.samples(shape).len();
            }
        }
        counts
    }

    /// Declared sheets left out of the last load because their samples were unreadable.
    ///
    /// They cannot be resolved, written or purged; only [`Self::remove_sheet`] drops them.
    pub fn unreadable_sheets(&self) -> impl Iterator<Item = &str> {
        self.unreadable.iter().map(String::as_str)
    }

    pub fn is_unreadable(&self, name: &str) -> bool {
        self.unreadable.contains(name)
    }

    /// Was this sample flagged as a redundant font-based sample?
    pub fn is_ignored(&self, sample: &Sample) -> bool {
        self.ignored.contains(&sample.id())
    }

    /// Drop every sheet, index and descriptor held in memory, font symbol sheets excepted.
    fn clear(&mut self) {
        self.loaded = false;
        self.registry = SheetRegistry::new();
        self.sheets.retain(|name, _| is_symbols(name));
        self.image_index.clear();
        self.sample_index.retain(|_, sheet| is_symbols(sheet));
        let index = &self.sample_index;
        self.ignored.retain(|id| index.contains_key(id));
        self.unreadable.clear();
        self.register_symbol_sheets();
    }

    /// Declare resident font symbol sheets in the registry, leaving its modified flag alone.
    fn register_symbol_sheets(&mut self) {
        let was_modified = self.registry.is_modified();
        let names: Vec<String> =
            self.sheets.keys().filter(|name| is_symbols(name)).cloned().collect();
        for name in names {
            if self.registry.descriptor_by_name(&name).is_some() {
                continue;
            }
            if let Err(err) = self.registry.add_descriptor(Descriptor::new(name, None)) {
                warn!("{} could not declare symbol sheet: {}", self, err);
            }
        }
        self.registry.set_modified(was_modified);
    }

    /// Insert a sheet built off-line (load), indexing its samples and image.
    fn insert_sheet(&mut self, sheet: SampleSheet) {
        for sample in sheet.all_samples() {
            self.sample_index.insert(sample.id(), sheet.name().to_string());
        }
        if let Some(image) = sheet.image() {
            self.image_index.insert(Arc::clone(image), sheet.name().to_string());
        }
        self.sheets.insert(sheet.name().to_string(), sheet);
    }
}

impl fmt::Display for SampleRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.layout.radix {
            Some(radix) => write!(f, "{radix} repository"),
            None => f.write_str("GLOBAL repository"),
        }
    }
}

impl fmt::Debug for SampleRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleRepository")
            .field("layout", &self.layout)
            .field("sheets", &self.sheets.len())
            .field("samples", &self.sample_index.len())
            .field("descriptors", &self.registry.descriptor_count())
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}
