use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::model::RunTable;
use crate::registry::Descriptor;
use crate::repository::{
    is_symbols, RepositoryError, RepositoryResult, SampleRepository, DEFAULT_SHEET_RADIX,
};
use crate::sheet::SampleSheet;
use crate::store::{decode_raster, ArchiveDb, RepositoryLayout, IMAGE_FILE};

/// Counts of what an include actually copied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeReport {
    /// Source sheets processed.
    pub sheets: usize,
    /// Samples copied.
    pub samples: usize,
    /// Samples already present locally, hence skipped.
    pub skipped: usize,
    /// Aliases recorded on local descriptors.
    pub aliases: usize,
    /// Tribe goods and members copied.
    pub tribe_samples: usize,
}

impl SampleRepository {
    /// Find (or create) the sheet for a name and/or image.
    ///
    /// With an image, identity is the image content: its hash selects candidate
    /// descriptors and an exact comparison decides. A new sheet gets a unique name
    /// forged from `name`. Without an image, `name` is looked up among names and
    /// aliases; two unrelated sheets sharing a name cannot be told apart on this path.
    ///
    /// `name` and `long_name` are recorded as aliases of the sheet found.
    pub fn find_sample_sheet(
        &mut self,
        name: &str,
        long_name: Option<&str>,
        image: Option<Arc<RunTable>>,
    ) -> RepositoryResult<&mut SampleSheet> {
        let sheet_name = self.resolve_sheet(name, long_name, image)?;
        self.sheets.get_mut(&sheet_name).ok_or(RepositoryError::UnknownSheet(sheet_name))
    }

    /// Canonical name of the sheet for a name and/or image, creating it if needed.
    pub(crate) fn resolve_sheet(
        &mut self,
        name: &str,
        long_name: Option<&str>,
        image: Option<Arc<RunTable>>,
    ) -> RepositoryResult<String> {
        match image {
            Some(image) => self.resolve_by_image(name, long_name, image),
            None if name.is_empty() => Err(RepositoryError::MissingIdentity),
            None => self.resolve_by_name(name, long_name),
        }
    }

    fn resolve_by_image(
        &mut self,
        name: &str,
        long_name: Option<&str>,
        image: Arc<RunTable>,
    ) -> RepositoryResult<String> {
        if let Some(resident) = self.image_index.get(&*image).cloned() {
            self.record_aliases(&resident, name, long_name)?;
            return Ok(resident);
        }

        let hash = image.persistent_hash();
        if let Some(matched) = self.match_disk_image(&hash, &image)? {
            if self.unreadable.contains(&matched) {
                return Err(RepositoryError::UnreadableSheet(matched));
            }
            debug!("{} found image of {} on disk", self, matched);
            self.record_aliases(&matched, name, long_name)?;
            let sheet =
                self.sheets.entry(matched.clone()).or_insert_with(|| SampleSheet::new(&matched));
            sheet.set_image(Arc::clone(&image), true);
            self.image_index.insert(image, matched.clone());
            return Ok(matched);
        }

        let radix = if name.is_empty() { DEFAULT_SHEET_RADIX } else { name };
        let unique = self.registry.forge_unique(radix)?;
        self.registry.add_descriptor(Descriptor::new(unique.clone(), Some(hash)))?;
        self.record_aliases(&unique, "", long_name)?;

        let mut sheet = SampleSheet::new(&unique);
        sheet.set_image(Arc::clone(&image), false);
        self.sheets.insert(unique.clone(), sheet);
        self.image_index.insert(image, unique.clone());

        info!("{} created sheet {} for a new image", self, unique);
        Ok(unique)
    }

    fn resolve_by_name(&mut self, name: &str, long_name: Option<&str>) -> RepositoryResult<String> {
        let canonical = match self.registry.descriptor(name) {
            Some(desc) if self.unreadable.contains(desc.name()) => {
                return Err(RepositoryError::UnreadableSheet(desc.name().to_string()));
            }
            Some(desc) => desc.name().to_string(),
            None => {
                self.registry.add_descriptor(Descriptor::new(name, None))?;
                info!("{} created sheet {} without image", self, name);
                name.to_string()
            }
        };
        self.record_aliases(&canonical, "", long_name)?;
        self.sheets.entry(canonical.clone()).or_insert_with(|| SampleSheet::new(&canonical));
        Ok(canonical)
    }

    fn record_aliases(
        &mut self,
        canonical: &str,
        name: &str,
        long_name: Option<&str>,
    ) -> RepositoryResult<()> {
        for alias in std::iter::once(name).chain(long_name) {
            if !alias.is_empty() {
                self.registry.add_alias(canonical, alias)?;
            }
        }
        Ok(())
    }

    /// Compare `image` with the stored images of descriptors sharing `hash`.
    ///
    /// Candidates whose image is already in memory were ruled out by the image index.
    fn match_disk_image(&self, hash: &str, image: &RunTable) -> RepositoryResult<Option<String>> {
        let candidates: Vec<&str> = self
            .registry
            .descriptors(hash)
            .iter()
            .map(Descriptor::name)
            .filter(|name| self.sheets.get(*name).map_or(true, |s| s.image().is_none()))
            .collect();
        if candidates.is_empty() || !self.layout.images_exist() {
            return Ok(None);
        }

        let images = ArchiveDb::open(&self.layout.images_path)?;
        for candidate in candidates {
            if let Some(body) = images.entry(candidate, IMAGE_FILE)? {
                if decode_raster(&body)? == *image {
                    return Ok(Some(candidate.to_string()));
                }
            }
        }
        Ok(None)
    }

    /// Copy the sheets, aliases, samples and tribes of `source` into this repository.
    ///
    /// Source images should be loaded beforehand, they are the identity of the sheets.
    /// Samples and tribe entries whose content is already present are skipped, so a
    /// repeated include changes nothing. Font-derived sheets are not included.
    pub fn include_repository(
        &mut self,
        source: &SampleRepository,
    ) -> RepositoryResult<IncludeReport> {
        let mut report = IncludeReport::default();
        for ext in source.sheets.values() {
            if is_symbols(ext.name()) {
                continue;
            }
            self.include_sample_sheet(source, ext, &mut report)?;
        }

        info!(
            "{} included {}: {} sheets, {} samples ({} skipped)",
            self, source, report.sheets, report.samples, report.skipped
        );
        Ok(report)
    }

    fn include_sample_sheet(
        &mut self,
        source: &SampleRepository,
        ext: &SampleSheet,
        report: &mut IncludeReport,
    ) -> RepositoryResult<String> {
        let local = self.resolve_sheet(ext.name(), None, ext.image().cloned())?;
        report.sheets += 1;

        if let Some(desc) = source.registry.descriptor_by_name(ext.name()) {
            let names = std::iter::once(desc.name()).chain(desc.aliases().iter().map(String::as_str));
            for alias in names {
                if self.registry.add_alias(&local, alias)? {
                    report.aliases += 1;
                }
            }
        }

        for sample in ext.all_samples() {
            let present = self.sample_index.contains_key(&sample.id())
                || self.sheets.get(&local).is_some_and(|s| s.contains_content(&sample));
            if present {
                report.skipped += 1;
                continue;
            }
            self.add_sample(sample, &local)?;
            report.samples += 1;
        }

        if self.config.use_tribes && !ext.tribes().is_empty() {
            let sheet = self
                .sheets
                .get_mut(&local)
                .ok_or_else(|| RepositoryError::UnknownSheet(local.clone()))?;
            for tribe in ext.tribes() {
                let local_tribe = sheet.tribe(tribe.head());
                for good in tribe.goods() {
                    if local_tribe.add_good(Arc::clone(good)) {
                        report.tribe_samples += 1;
                    }
                }
                for member in tribe.members() {
                    if local_tribe.add_member(Arc::clone(member)) {
                        report.tribe_samples += 1;
                    }
                }
            }
        }

        Ok(local)
    }

    /// Load the repository stored at `path` (a `samples.db` or `<radix>-samples.db`),
    /// with its images, and include it.
    pub fn include_samples_file(&mut self, path: &Path) -> RepositoryResult<IncludeReport> {
        let layout = RepositoryLayout::from_samples_file(path)?;
        if !layout.samples_exist() {
            return Err(RepositoryError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )));
        }

        let mut source = SampleRepository::open(layout, self.config.clone());
        let load = source.load_repository();
        if let Some(failure) = load.failure {
            return Err(RepositoryError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                failure,
            )));
        }
        source.load_sheet_images()?;
        self.include_repository(&source)
    }
}
