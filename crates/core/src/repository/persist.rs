use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::model::{RunTable, SampleRef, Tribe};
use crate::registry::SheetRegistry;
use crate::repository::{
    is_symbols, LoadListener, RepositoryError, RepositoryResult, SampleRepository,
};
use crate::sheet::{ImageStatus, SampleSheet};
use crate::store::{
    decode_json, decode_raster, encode_json, encode_raster, ArchiveDb, ArchiveError, ArchiveResult,
    ContainerRecord, ManifestRecord, SampleList, TribeList, CONTAINER_FILE, CONTAINER_FOLDER,
    IMAGE_FILE, SAMPLES_FILE, TRIBES_FILE,
};

/// What a store wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreReport {
    pub container_stored: bool,
    pub sheets_stored: usize,
    pub images_stored: usize,
    /// Sheets whose archive material was deleted.
    pub sheets_deleted: usize,
}

/// Outcome of a load. Loads never fail: problems are logged and reported here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Sheets materialized.
    pub loaded: usize,
    /// Sheets whose samples could not be decoded.
    pub skipped: Vec<String>,
    /// Manifest entries not declared by the registry.
    pub orphans: Vec<String>,
    /// Set when the archive itself could not be read; the repository is then empty.
    pub failure: Option<String>,
}

impl SampleRepository {
    /// Write the modified parts of the repository to its two archives.
    ///
    /// Both archives are updated inside a transaction each; the image archive commits
    /// first. Dirty flags are cleared only once both commits succeeded.
    pub fn store_repository(&mut self) -> RepositoryResult<StoreReport> {
        std::fs::create_dir_all(&self.layout.root)?;
        let samples_db = ArchiveDb::open(&self.layout.samples_path)?;
        let images_db = ArchiveDb::open(&self.layout.images_path)?;
        let samples_tx = samples_db.begin()?;
        let images_tx = images_db.begin()?;
        let stored_at = Utc::now().to_rfc3339();
        let mut report = StoreReport::default();

        for desc in self.registry.defunct() {
            samples_db.delete_folder(desc.name())?;
            samples_db.delete_manifest(desc.name())?;
            images_db.delete_folder(desc.name())?;
            debug!("{} deleted archive material of {}", self, desc);
            report.sheets_deleted += 1;
        }

        if self.registry.is_modified() {
            let record = ContainerRecord {
                stored_at: stored_at.clone(),
                sheets: self
                    .registry
                    .all_descriptors()
                    .into_iter()
                    .filter(|desc| !is_symbols(desc.name()))
                    .cloned()
                    .collect(),
            };
            samples_db.put_entry(CONTAINER_FOLDER, CONTAINER_FILE, &encode_json(&record)?)?;
            report.container_stored = true;
        }

        for sheet in self.sheets.values() {
            if is_symbols(sheet.name()) || !sheet.is_modified() {
                continue;
            }
            if self.unreadable.contains(sheet.name()) {
                return Err(RepositoryError::UnreadableSheet(sheet.name().to_string()));
            }
            if self.store_sheet(&samples_db, &images_db, sheet, &stored_at)? {
                report.images_stored += 1;
            }
            report.sheets_stored += 1;
        }

        images_tx.commit().map_err(ArchiveError::from)?;
        samples_tx.commit().map_err(ArchiveError::from)?;

        self.registry.take_defunct();
        self.set_modified(false);
        for sheet in self.sheets.values_mut() {
            sheet.mark_image_saved();
        }

        info!("{} stored to {}", self, self.layout.samples_path.display());
        Ok(report)
    }

    /// Write one sheet; returns whether its image was written.
    fn store_sheet(
        &self,
        samples_db: &ArchiveDb,
        images_db: &ArchiveDb,
        sheet: &SampleSheet,
        stored_at: &str,
    ) -> ArchiveResult<bool> {
        let name = sheet.name();
        let samples = SampleList { sheet: name.to_string(), samples: sheet.all_samples() };
        samples_db.put_entry(name, SAMPLES_FILE, &encode_json(&samples)?)?;

        let has_tribes = self.config.use_tribes && !sheet.tribes().is_empty();
        if has_tribes {
            let tribes = TribeList { sheet: name.to_string(), tribes: sheet.tribes().to_vec() };
            samples_db.put_entry(name, TRIBES_FILE, &encode_json(&tribes)?)?;
        } else {
            samples_db.delete_entry(name, TRIBES_FILE)?;
        }

        let mut image_written = false;
        if !sheet.is_image_saved() {
            if let Some(image) = sheet.image() {
                images_db.put_entry(name, IMAGE_FILE, &encode_raster(image)?)?;
                image_written = true;
            }
        }

        samples_db.upsert_manifest(&ManifestRecord {
            sheet: name.to_string(),
            has_samples: !samples.samples.is_empty(),
            has_tribes,
            has_image: image_written || sheet.image_status() != ImageStatus::NoImage,
            stored_at: stored_at.to_string(),
        })?;
        Ok(image_written)
    }

    /// Store only when there is something to store.
    pub fn check_for_save(&mut self) -> RepositoryResult<Option<StoreReport>> {
        if self.loaded && self.is_modified() {
            self.store_repository().map(Some)
        } else {
            info!("No need to save {}", self);
            Ok(None)
        }
    }

    /// Replace the in-memory content with the archived registry, samples and tribes.
    ///
    /// Images are not read; see [`Self::load_sheet_images`].
    pub fn load_repository(&mut self) -> LoadReport {
        self.load_repository_with(&mut ())
    }

    pub fn load_repository_with(&mut self, listener: &mut dyn LoadListener) -> LoadReport {
        self.clear();
        let mut report = LoadReport::default();

        if !self.layout.samples_exist() {
            info!(
                "No {} in folder {}",
                self.layout.samples_path.display(),
                self.layout.root.display()
            );
            self.loaded = true;
            return report;
        }

        match self.load_metadata(listener, &mut report) {
            Ok(()) => {
                self.set_modified(false);
                self.loaded = true;
                info!("{} loaded: {} sheets, {} samples", self, report.loaded, self.sample_count());
            }
            Err(err) => {
                warn!("Error loading {}: {}", self, err);
                self.clear();
                report = LoadReport { failure: Some(err.to_string()), ..LoadReport::default() };
            }
        }
        report
    }

    fn load_metadata(
        &mut self,
        listener: &mut dyn LoadListener,
        report: &mut LoadReport,
    ) -> RepositoryResult<()> {
        let mut stage = Instant::now();
        let db = ArchiveDb::open(&self.layout.samples_path)?;
        self.stage_done("open samples archive", &mut stage);

        let container = match db.entry(CONTAINER_FOLDER, CONTAINER_FILE)? {
            Some(body) => decode_json::<ContainerRecord>(&body)?,
            None => {
                warn!("{} has no {}/{}", self, CONTAINER_FOLDER, CONTAINER_FILE);
                ContainerRecord { stored_at: String::new(), sheets: Vec::new() }
            }
        };
        self.registry = SheetRegistry::from_descriptors(container.sheets);
        listener.total_sheets(self.registry.descriptor_count());
        self.register_symbol_sheets();
        self.stage_done("load container", &mut stage);

        let mut with_tribes = Vec::new();
        for record in db.manifest()? {
            if self.registry.descriptor_by_name(&record.sheet).is_none() {
                warn!("Samples entry {} not declared in {} is ignored", record.sheet, CONTAINER_FILE);
                report.orphans.push(record.sheet);
                continue;
            }
            if is_symbols(&record.sheet) {
                info!("Skipping symbols entry {}", record.sheet);
                continue;
            }

            let samples = if record.has_samples {
                match read_samples(&db, &record.sheet) {
                    Ok(samples) => samples,
                    Err(err) => {
                        warn!("Skipping sheet {}: {}", record.sheet, err);
                        self.unreadable.insert(record.sheet.clone());
                        report.skipped.push(record.sheet);
                        continue;
                    }
                }
            } else {
                Vec::new()
            };

            let mut sheet = SampleSheet::new(&record.sheet);
            for sample in samples {
                sheet.add_sample(sample);
            }
            if record.has_image {
                sheet.mark_image_on_disk();
            }
            if record.has_tribes {
                with_tribes.push(record.sheet.clone());
            }
            self.insert_sheet(sheet);
            listener.loaded_sheet(&record.sheet);
            report.loaded += 1;
        }
        self.stage_done("load samples", &mut stage);

        if self.config.use_tribes {
            for name in with_tribes {
                match read_tribes(&db, &name) {
                    Ok(tribes) => {
                        if let Some(sheet) = self.sheets.get_mut(&name) {
                            sheet.set_tribes(tribes);
                        }
                    }
                    Err(err) => warn!("Tribes of {} ignored: {}", name, err),
                }
            }
            self.stage_done("load tribes", &mut stage);
        }
        Ok(())
    }

    fn stage_done(&self, stage: &str, started: &mut Instant) {
        if self.config.log_stage_timings {
            debug!(
                stage,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "{} load stage done",
                self
            );
        }
        *started = Instant::now();
    }

    /// Attach every archived image to its resident sheet; returns how many were loaded.
    pub fn load_sheet_images(&mut self) -> RepositoryResult<usize> {
        if !self.has_sheet_images() {
            info!("Images file {} not found", self.layout.images_path.display());
            return Ok(0);
        }
        let db = ArchiveDb::open(&self.layout.images_path)?;
        let mut count = 0;
        for folder in db.folders_with(IMAGE_FILE)? {
            let pending = self.sheets.get(&folder).map(|s| s.image().is_none());
            match pending {
                None => debug!("Image of unknown sheet {} ignored", folder),
                Some(false) => {}
                Some(true) => match read_image(&db, &folder) {
                    Ok(Some(image)) => {
                        self.attach_image(&folder, Arc::new(image));
                        count += 1;
                    }
                    Ok(None) => {}
                    Err(err) => warn!("Image of {} ignored: {}", folder, err),
                },
            }
        }
        info!("{} loaded {} sheet images", self, count);
        Ok(count)
    }

    /// Image of one sheet, read from the image archive on first request.
    pub fn load_image(&mut self, sheet: &str) -> RepositoryResult<Option<Arc<RunTable>>> {
        let canonical = self
            .sheet(sheet)
            .map(|s| s.name().to_string())
            .ok_or_else(|| RepositoryError::UnknownSheet(sheet.to_string()))?;
        if let Some(image) = self.sheets.get(&canonical).and_then(|s| s.image()) {
            return Ok(Some(Arc::clone(image)));
        }
        if !self.has_sheet_images() {
            return Ok(None);
        }

        let db = ArchiveDb::open(&self.layout.images_path)?;
        match read_image(&db, &canonical)? {
            Some(image) => {
                let image = Arc::new(image);
                self.attach_image(&canonical, Arc::clone(&image));
                Ok(Some(image))
            }
            None => Ok(None),
        }
    }

    fn attach_image(&mut self, name: &str, image: Arc<RunTable>) {
        if let Some(sheet) = self.sheets.get_mut(name) {
            sheet.set_image(Arc::clone(&image), true);
            self.image_index.insert(image, name.to_string());
        }
    }

    /// Does the image archive hold an image for this sheet?
    pub fn disk_image_exists(&self, sheet: &str) -> bool {
        if !self.has_sheet_images() {
            return false;
        }
        let name = self.descriptor(sheet).map_or(sheet, |desc| desc.name());
        match ArchiveDb::open(&self.layout.images_path).and_then(|db| db.has_entry(name, IMAGE_FILE))
        {
            Ok(exists) => exists,
            Err(err) => {
                debug!("Could not check image of {}: {}", name, err);
                false
            }
        }
    }

    /// Is there an image archive at all?
    pub fn has_sheet_images(&self) -> bool {
        self.layout.images_exist()
    }
}

fn read_samples(db: &ArchiveDb, sheet: &str) -> ArchiveResult<Vec<SampleRef>> {
    match db.entry(sheet, SAMPLES_FILE)? {
        Some(body) => Ok(decode_json::<SampleList>(&body)?.samples),
        None => Ok(Vec::new()),
    }
}

fn read_tribes(db: &ArchiveDb, sheet: &str) -> ArchiveResult<Vec<Tribe>> {
    match db.entry(sheet, TRIBES_FILE)? {
        Some(body) => Ok(decode_json::<TribeList>(&body)?.tribes),
        None => Ok(Vec::new()),
    }
}

fn read_image(db: &ArchiveDb, sheet: &str) -> ArchiveResult<Option<RunTable>> {
    db.entry(sheet, IMAGE_FILE)?.map(|body| decode_raster(&body)).transpose()
}
