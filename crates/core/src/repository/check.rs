use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::model::{SampleId, SampleRef};
use crate::repository::SampleRepository;

/// Result of [`SampleRepository::check_all_samples`]. The two lists are disjoint.
#[derive(Debug, Clone, Default)]
pub struct SampleCheck {
    /// Samples with identical pixels and interline but different shapes.
    pub conflictings: Vec<SampleRef>,
    /// Later copies of an identical sample (shape included), candidates for removal.
    pub redundants: Vec<SampleRef>,
}

impl SampleCheck {
    pub fn is_clean(&self) -> bool {
        self.conflictings.is_empty() && self.redundants.is_empty()
    }
}

impl SampleRepository {
    /// Look for conflicting and redundant samples across all sheets.
    ///
    /// Samples are sorted by weight then sheet name, and each one is only compared with
    /// the following samples of the same weight. Nothing is removed here.
    pub fn check_all_samples(&self) -> SampleCheck {
        let all = self.sorted_by_weight(self.all_samples());
        let n = all.len();
        debug!("Checking {} samples...", n);

        let mut check = SampleCheck::default();
        let mut conflicting_ids: HashSet<SampleId> = HashSet::new();
        let mut deleted = vec![false; n];

        for i in 0..n {
            if deleted[i] {
                continue;
            }
            let sample = &all[i];

            for j in (i + 1)..n {
                if deleted[j] {
                    continue;
                }
                let other = &all[j];
                if other.weight() != sample.weight() {
                    break;
                }
                if !sample.same_pixels(other) {
                    continue;
                }

                if sample.shape() != other.shape() {
                    warn!(
                        "Conflicting shapes between {}/{} and {}/{}",
                        self.sheet_label(sample),
                        sample,
                        self.sheet_label(other),
                        other
                    );
                    for s in [sample, other] {
                        if conflicting_ids.insert(s.id()) {
                            check.conflictings.push(SampleRef::clone(s));
                        }
                    }
                } else {
                    debug!(
                        "Same runtable for {}/{} & {}/{}",
                        self.sheet_label(sample),
                        sample,
                        self.sheet_label(other),
                        other
                    );
                    if !other.is_symbol() {
                        check.redundants.push(SampleRef::clone(other));
                    }
                    deleted[j] = true;
                }
            }
        }

        // A sample may have conflicted before turning out redundant.
        check.redundants.retain(|s| !conflicting_ids.contains(&s.id()));

        if !check.conflictings.is_empty() {
            warn!("Conflicting samples: {} / {}", check.conflictings.len(), n);
        }
        if !check.redundants.is_empty() {
            info!("Redundant samples: {} / {}", check.redundants.len(), n);
        }
        check
    }

    /// Flag redundant font-based samples as ignored; returns how many were flagged.
    pub fn check_font_samples(&mut self) -> usize {
        let fonts: Vec<SampleRef> =
            self.all_samples().into_iter().filter(|sample| sample.is_symbol()).collect();
        let fonts = self.sorted_by_weight(fonts);
        let n = fonts.len();
        debug!("Checking {} font samples...", n);

        let mut deleted = vec![false; n];
        let mut ignored = Vec::new();

        for i in 0..n {
            if deleted[i] {
                continue;
            }
            let sample = &fonts[i];

            for j in (i + 1)..n {
                if deleted[j] {
                    continue;
                }
                let other = &fonts[j];
                if other.weight() != sample.weight() {
                    break;
                }
                if !sample.same_pixels(other) {
                    continue;
                }

                if sample.shape() != other.shape() {
                    warn!(
                        "Conflicting shapes between {}/{} and {}/{}",
                        self.sheet_label(sample),
                        sample,
                        self.sheet_label(other),
                        other
                    );
                } else {
                    debug!("Ignoring redundant {}/{}", self.sheet_label(other), other);
                    ignored.push(other.id());
                    deleted[j] = true;
                }
            }
        }

        let count = ignored.iter().filter(|id| !self.ignored.contains(*id)).count();
        self.ignored.extend(ignored);
        if count > 0 {
            info!("Ignored redundant font-based samples: {}", count);
        }
        count
    }

    /// Stable sort by weight, then by owning sheet name.
    fn sorted_by_weight(&self, mut samples: Vec<SampleRef>) -> Vec<SampleRef> {
        samples.sort_by(|a, b| {
            a.weight().cmp(&b.weight()).then_with(|| self.sheet_name(a).cmp(&self.sheet_name(b)))
        });
        samples
    }

    fn sheet_label(&self, sample: &SampleRef) -> &str {
        self.sheet_name(sample).unwrap_or("?")
    }
}
