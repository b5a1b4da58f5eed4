use serde::{Deserialize, Serialize};

use crate::model::{Sample, SampleRef};

/// A head sample with the candidates competing against it.
///
/// `goods` are expected to score comparably to the head, `members` strictly lower.
/// Both behave as sets keyed by sample content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tribe {
    head: SampleRef,
    #[serde(default)]
    goods: Vec<SampleRef>,
    #[serde(default)]
    members: Vec<SampleRef>,
    #[serde(skip)]
    modified: bool,
}

impl Tribe {
    pub fn new(head: SampleRef) -> Self {
        Self { head, goods: Vec::new(), members: Vec::new(), modified: false }
    }

    pub fn head(&self) -> &SampleRef {
        &self.head
    }

    pub fn goods(&self) -> &[SampleRef] {
        &self.goods
    }

    pub fn members(&self) -> &[SampleRef] {
        &self.members
    }

    /// Does this tribe belong to `best` (same pixels and shape)?
    pub fn is_headed_by(&self, best: &Sample) -> bool {
        self.head.run_table() == best.run_table() && self.head.shape() == best.shape()
    }

    /// Add a good candidate; returns false if an equal sample is already there.
    pub fn add_good(&mut self, sample: SampleRef) -> bool {
        if self.head.same_content(&sample) || contains_content(&self.goods, &sample) {
            return false;
        }
        self.goods.push(sample);
        self.modified = true;
        true
    }

    /// Add a lower-scoring member; returns false if an equal sample is already there.
    pub fn add_member(&mut self, sample: SampleRef) -> bool {
        if self.head.same_content(&sample) || contains_content(&self.members, &sample) {
            return false;
        }
        self.members.push(sample);
        self.modified = true;
        true
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub(crate) fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }
}

fn contains_content(list: &[SampleRef], sample: &Sample) -> bool {
    list.iter().any(|s| s.same_content(sample))
}
