//! Sample sheets: every sample (and tribe) that came from one source image.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::model::{RunTable, Sample, SampleRef, Shape, Tribe};

/// Where the image of a sheet currently lives.
///
/// Status only moves forward (`NoImage` -> `OnDisk` -> `Loaded`), except through an
/// explicit image assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageStatus {
    /// No image known for this sheet.
    NoImage,
    /// An image exists in the image archive but has not been read.
    OnDisk,
    /// The image is in memory.
    Loaded,
}

/// Samples, tribes and (optionally) the image of one source sheet.
#[derive(Debug)]
pub struct SampleSheet {
    name: String,
    samples: BTreeMap<Shape, Vec<SampleRef>>,
    image: Option<Arc<RunTable>>,
    image_status: ImageStatus,
    /// False while an in-memory image has not reached the image archive.
    image_saved: bool,
    tribes: Vec<Tribe>,
    modified: bool,
}

impl SampleSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: BTreeMap::new(),
            image: None,
            image_status: ImageStatus::NoImage,
            image_saved: true,
            tribes: Vec::new(),
            modified: false,
        }
    }

    /// Canonical name of the descriptor this sheet is bound to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every sample, grouped by shape order.
    pub fn all_samples(&self) -> Vec<SampleRef> {
        self.samples.values().flatten().cloned().collect()
    }

    pub fn samples(&self, shape: &Shape) -> &[SampleRef] {
        self.samples.get(shape).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.samples.keys()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Is there a sample with the same pixels, interline and shape?
    pub fn contains_content(&self, sample: &Sample) -> bool {
        self.samples(sample.shape()).iter().any(|s| s.same_content(sample))
    }

    /// Synthetic samples leave the sheet unmodified.
    pub(crate) fn add_sample(&mut self, sample: SampleRef) {
        if !sample.is_symbol() {
            self.modified = true;
        }
        self.samples.entry(sample.shape().clone()).or_default().push(sample);
    }

    /// Returns false (and logs) when the sample is not in this sheet.
    pub(crate) fn remove_sample(&mut self, sample: &Sample) -> bool {
        let shape = sample.shape();
        let Some(list) = self.samples.get_mut(shape) else {
            warn!("{} not found in sheet {}", sample, self.name);
            return false;
        };
        let Some(index) = list.iter().position(|s| s.same_instance(sample)) else {
            warn!("{} not found in sheet {}", sample, self.name);
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            self.samples.remove(shape);
        }
        self.modified = true;
        true
    }

    pub fn tribes(&self) -> &[Tribe] {
        &self.tribes
    }

    /// The tribe headed by `best`, created on first request.
    ///
    /// Creation marks the sheet as modified.
    pub fn tribe(&mut self, best: &SampleRef) -> &mut Tribe {
        let index = match self.tribes.iter().position(|tribe| tribe.is_headed_by(best)) {
            Some(index) => index,
            None => {
                info!("Created tribe on {} in {}", best, self);
                self.tribes.push(Tribe::new(Arc::clone(best)));
                self.modified = true;
                self.tribes.len() - 1
            }
        };
        &mut self.tribes[index]
    }

    pub(crate) fn set_tribes(&mut self, tribes: Vec<Tribe>) {
        self.tribes = tribes;
    }

    pub fn image(&self) -> Option<&Arc<RunTable>> {
        self.image.as_ref()
    }

    pub fn image_status(&self) -> ImageStatus {
        self.image_status
    }

    /// `saved` tells whether the image archive already holds this image.
    pub(crate) fn set_image(&mut self, image: Arc<RunTable>, saved: bool) {
        self.image = Some(image);
        self.image_saved = saved;
        self.image_status = ImageStatus::Loaded;
    }

    pub(crate) fn mark_image_on_disk(&mut self) {
        if self.image_status == ImageStatus::NoImage {
            self.image_status = ImageStatus::OnDisk;
        }
    }

    pub fn is_image_saved(&self) -> bool {
        self.image_saved
    }

    pub(crate) fn mark_image_saved(&mut self) {
        self.image_saved = true;
    }

    /// Unsaved sample changes, tribe changes, or an image not yet flushed.
    pub fn is_modified(&self) -> bool {
        self.modified || !self.image_saved || self.tribes.iter().any(Tribe::is_modified)
    }

    pub(crate) fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
        for tribe in &mut self.tribes {
            tribe.set_modified(modified);
        }
    }
}

impl fmt::Display for SampleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SampleSheet{{{}}}", self.name)
    }
}
