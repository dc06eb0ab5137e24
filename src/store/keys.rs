//! The persisted key store and its scan reconciliation pass.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::{EngineError, Result};
use crate::model::{Key, KeyPatch, NewKey};
use crate::store::{read_json, save_json};

pub const KEYS_FILE_NAME: &str = "keys.json";

pub type KeyMap = IndexMap<String, Key>;

/// Outcome of reconciling stored keys against a fresh scan. The id lists are
/// in store order; useful for logging and for tests.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub new_keys: Vec<String>,
    pub unused_keys: Vec<String>,
}

#[derive(Debug)]
pub struct KeyStore {
    path: PathBuf,
    keys: KeyMap,
}

impl KeyStore {
    /// Load `keys.json` from the locale directory, creating an empty file if
    /// none exists yet.
    pub fn load(locale_dir: &Path) -> Result<Self> {
        let path = locale_dir.join(KEYS_FILE_NAME);
        if !path.exists() {
            save_json(&path, &KeyMap::new())?;
        }
        info!(path = %path.display(), "reading keys");
        let keys = read_json(&path)?;
        Ok(Self { path, keys })
    }

    pub fn map(&self) -> &KeyMap {
        &self.keys
    }

    /// Snapshot of all key records, in store order.
    pub fn all(&self) -> Vec<Key> {
        self.keys.values().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<&Key> {
        self.keys.get(id)
    }

    /// Create (or re-create) a key. The id is derived from `(context, text)`;
    /// creating an identical pair twice collapses onto the existing record,
    /// keeping its `firstUsed`.
    pub fn create(&mut self, new: NewKey, now: DateTime<Utc>) -> Result<Key> {
        let id = Key::derive_id(new.context.as_deref(), &new.text);
        let first_used = self
            .keys
            .get(&id)
            .and_then(|existing| existing.first_used)
            .or(Some(now));
        let key = Key {
            id: id.clone(),
            context: new.context,
            text: new.text,
            react_intl_id: new.react_intl_id,
            description: new.description,
            first_used,
            unused_since: None,
            sources: Vec::new(),
        };
        self.keys.insert(id.clone(), key);
        self.save()?;
        Ok(self.keys[&id].clone())
    }

    /// Apply a patch. When `context` or `text` change, the id is re-derived
    /// so the identity invariant holds; the record keeps its timestamps.
    pub fn update(&mut self, id: &str, patch: KeyPatch) -> Result<Key> {
        let mut key = self
            .keys
            .shift_remove(id)
            .ok_or_else(|| EngineError::Validation(format!("unknown key id: {id}")))?;

        if let Some(text) = patch.text {
            key.text = text;
        }
        if let Some(context) = patch.context {
            key.context = context;
        }
        if let Some(react_intl_id) = patch.react_intl_id {
            key.react_intl_id = react_intl_id;
        }
        if let Some(description) = patch.description {
            key.description = description;
        }
        key.id = Key::derive_id(key.context.as_deref(), &key.text);

        let new_id = key.id.clone();
        self.keys.insert(new_id.clone(), key);
        self.save()?;
        Ok(self.keys[&new_id].clone())
    }

    /// Remove a key and return the removed record. Translations referencing
    /// it are not cascaded.
    pub fn delete(&mut self, id: &str) -> Result<Key> {
        let key = self
            .keys
            .shift_remove(id)
            .ok_or_else(|| EngineError::Validation(format!("unknown key id: {id}")))?;
        self.save()?;
        Ok(key)
    }

    /// Merge a freshly scanned key set into the store:
    ///
    /// - present in both: stored `firstUsed` is carried forward (never
    ///   regressed), everything else — sources in particular — comes from
    ///   the fresh scan, and `unusedSince` clears;
    /// - stored only: retained with `unusedSince` set (once) and sources
    ///   emptied;
    /// - fresh only: `firstUsed` stamped now.
    ///
    /// The merged set replaces the store and is persisted.
    pub fn reconcile(&mut self, fresh: KeyMap, now: DateTime<Utc>) -> Result<ReconcileReport> {
        let mut merged = fresh;
        let mut report = ReconcileReport::default();

        for (id, stored) in std::mem::take(&mut self.keys) {
            match merged.get_mut(&id) {
                Some(rescanned) => {
                    rescanned.first_used = stored.first_used;
                }
                None => {
                    report.unused_keys.push(id.clone());
                    let mut stored = stored;
                    stored.unused_since = stored.unused_since.or(Some(now));
                    stored.sources = Vec::new();
                    merged.insert(id, stored);
                }
            }
        }

        for (id, key) in merged.iter_mut() {
            if key.first_used.is_none() {
                report.new_keys.push(id.clone());
                key.first_used = Some(now);
            }
        }

        if !report.unused_keys.is_empty() {
            debug!(count = report.unused_keys.len(), "unused keys");
        }
        if !report.new_keys.is_empty() {
            debug!(count = report.new_keys.len(), "new keys");
        }

        self.keys = merged;
        self.save()?;
        Ok(report)
    }

    fn save(&self) -> Result<()> {
        save_json(&self.path, &self.keys)
    }
}
