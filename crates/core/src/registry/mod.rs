//! Descriptor registry: the identity side of the repository.
//!
//! Descriptors are bucketed by content hash so that a sheet image can be matched
//! against a handful of candidates, and looked up by name or alias for the name-only
//! path. The registry also remembers deleted descriptors until the next store, which is
//! when their archive material is actually removed.

mod descriptor;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, warn};

pub use descriptor::Descriptor;

/// Highest numeric suffix tried by [`SheetRegistry::forge_unique`].
pub const MAX_UNIQUE_SUFFIX: u32 = 99;

/// Error type for registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Every `<radix>_01` .. `<radix>_99` slot is taken.
    #[error("No unique name could be forged for radix '{radix}'")]
    NameExhausted { radix: String },

    /// A descriptor with this name (or alias) already exists.
    #[error("Descriptor name already in use: {0}")]
    DuplicateName(String),

    /// No descriptor answers to this name.
    #[error("Unknown descriptor: {0}")]
    UnknownDescriptor(String),
}

/// Convenience result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry of sheet descriptors.
#[derive(Debug, Default)]
pub struct SheetRegistry {
    /// Hash bucket -> descriptors; `None` collects sheets known by name only.
    buckets: BTreeMap<Option<String>, Vec<Descriptor>>,
    /// Removed descriptors whose archive material is still to be deleted.
    defunct: Vec<Descriptor>,
    modified: bool,
}

impl SheetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted descriptors.
    ///
    /// Duplicated names are dropped (first one wins). The result is not modified.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = Descriptor>) -> Self {
        let mut registry = Self::new();
        for desc in descriptors {
            if registry.descriptor_by_name(desc.name()).is_some() {
                warn!("Duplicated descriptor {} ignored", desc);
                continue;
            }
            registry.buckets.entry(desc.hash().map(str::to_string)).or_default().push(desc);
        }
        registry
    }

    /// Insert a descriptor in the bucket of its hash.
    pub fn add_descriptor(&mut self, desc: Descriptor) -> RegistryResult<()> {
        if self.descriptor(desc.name()).is_some() {
            return Err(RegistryError::DuplicateName(desc.name().to_string()));
        }
        debug!("Registering descriptor {}", desc);
        self.buckets.entry(desc.hash().map(str::to_string)).or_default().push(desc);
        self.modified = true;
        Ok(())
    }

    /// Look up a descriptor by name or alias (case-insensitive).
    pub fn descriptor(&self, name_or_alias: &str) -> Option<&Descriptor> {
        self.iter().find(|desc| desc.is_alias(name_or_alias))
    }

    /// Look up a descriptor by its exact canonical name.
    pub fn descriptor_by_name(&self, name: &str) -> Option<&Descriptor> {
        self.iter().find(|desc| desc.name() == name)
    }

    fn descriptor_by_name_mut(&mut self, name: &str) -> Option<&mut Descriptor> {
        self.buckets.values_mut().flatten().find(|desc| desc.name() == name)
    }

    /// All descriptors sharing `hash`, candidates for an exact image comparison.
    pub fn descriptors(&self, hash: &str) -> &[Descriptor] {
        self.buckets.get(&Some(hash.to_string())).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All descriptors, sorted by name.
    pub fn all_descriptors(&self) -> Vec<&Descriptor> {
        let mut all: Vec<&Descriptor> = self.iter().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    pub fn descriptor_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        self.buckets.values().flatten()
    }

    /// Derive a name no descriptor answers to yet.
    ///
    /// `name` itself is returned when free. Otherwise any trailing `_nn` suffix is
    /// stripped and `<radix>_01` .. `<radix>_99` are tried in order.
    pub fn forge_unique(&self, name: &str) -> RegistryResult<String> {
        if self.descriptor(name).is_none() {
            return Ok(name.to_string());
        }

        let radix = strip_unique_suffix(name);
        for i in 1..=MAX_UNIQUE_SUFFIX {
            let candidate = format!("{radix}_{i:02}");
            if self.descriptor(&candidate).is_none() {
                return Ok(candidate);
            }
        }

        warn!("No unique name could be forged for {}", name);
        Err(RegistryError::NameExhausted { radix: radix.to_string() })
    }

    /// Record `alias` on the descriptor named `name`.
    ///
    /// Returns `Ok(false)` when nothing changed: the alias is already known there, or it
    /// already designates another descriptor (lookups must stay unambiguous).
    pub fn add_alias(&mut self, name: &str, alias: &str) -> RegistryResult<bool> {
        if let Some(owner) = self.descriptor(alias) {
            if owner.name() != name {
                debug!("Alias {} already designates {}, not added to {}", alias, owner, name);
            }
            return Ok(false);
        }
        let desc = self
            .descriptor_by_name_mut(name)
            .ok_or_else(|| RegistryError::UnknownDescriptor(name.to_string()))?;
        let added = desc.add_alias(alias);
        if added {
            self.modified = true;
        }
        Ok(added)
    }

    /// Remove a descriptor; it stays pending deletion until [`Self::take_defunct`].
    pub fn remove_descriptor(&mut self, name: &str) -> RegistryResult<Descriptor> {
        let mut found = None;
        for (key, bucket) in self.buckets.iter_mut() {
            if let Some(index) = bucket.iter().position(|desc| desc.name() == name) {
                found = Some((key.clone(), bucket.remove(index)));
                break;
            }
        }
        let (key, desc) = found.ok_or_else(|| RegistryError::UnknownDescriptor(name.to_string()))?;
        if self.buckets.get(&key).is_some_and(Vec::is_empty) {
            self.buckets.remove(&key);
        }

        self.defunct.push(desc.clone());
        self.modified = true;
        Ok(desc)
    }

    /// Descriptors removed since the last store.
    pub fn defunct(&self) -> &[Descriptor] {
        &self.defunct
    }

    /// Hand over the pending deletions, leaving none behind.
    pub fn take_defunct(&mut self) -> Vec<Descriptor> {
        std::mem::take(&mut self.defunct)
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }
}

/// `foo_07` -> `foo`; anything else is returned unchanged.
fn strip_unique_suffix(name: &str) -> &str {
    let bytes = name.as_bytes();
    let n = bytes.len();
    if n >= 3 && bytes[n - 3] == b'_' && bytes[n - 2].is_ascii_digit() && bytes[n - 1].is_ascii_digit()
    {
        &name[..n - 3]
    } else {
        name
    }
}
