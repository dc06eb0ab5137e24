//! The engine facade: owns the stores for one locale directory and runs the
//! sequential mutate → resolve → compile pipeline.
//!
//! Mutating entry points take `&mut self`, which is the serialization the
//! engine promises: one in-flight mutation at a time per engine handle.
//! Every mutation persists its store, regenerates all output bundles, and
//! only then returns the post-mutation record. Read accessors return owned
//! snapshots, never live views.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::compiler::{self, OutputOptions};
use crate::config::{ConfigPatch, DB_VERSION, EngineConfig};
use crate::error::{EngineError, Result};
use crate::model::{
    Key, KeyPatch, NewKey, NewTranslation, Translation, TranslationPatch, split_context,
};
use crate::resolver;
use crate::scanner::{self, CatalogSupport, ScanOptions};
use crate::store::{KeyMap, KeyStore, TranslationMap, TranslationStore, read_json, save_json};

#[derive(Debug, Clone, Copy)]
pub struct InitOptions {
    /// Regenerate all outputs at startup even when nothing migrated.
    pub recompile: bool,
    /// Structured extraction: scan ICU catalog JSON instead of source
    /// patterns.
    pub read_icu_messages: bool,
    /// Whether embedded catalog extraction may run during pattern scans.
    pub catalog_support: CatalogSupport,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            recompile: false,
            read_icu_messages: false,
            catalog_support: CatalogSupport::Available,
        }
    }
}

/// What a legacy import brought in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub langs_added: usize,
    pub keys_added: usize,
    pub translations_added: usize,
}

pub struct TranslationEngine {
    locale_dir: PathBuf,
    config: EngineConfig,
    keys: KeyStore,
    translations: TranslationStore,
    read_icu_messages: bool,
    catalog_support: CatalogSupport,
}

impl TranslationEngine {
    /// Open (or create) a locale directory and load its database.
    ///
    /// An on-disk schema older than [`DB_VERSION`] is migrated in place
    /// before the stores load; a newer one is fatal.
    pub fn init(locale_dir: impl Into<PathBuf>, options: InitOptions) -> Result<Self> {
        let locale_dir = locale_dir.into();
        if !locale_dir.exists() {
            debug!(path = %locale_dir.display(), "creating locale directory");
            fs::create_dir_all(&locale_dir)
                .map_err(|e| EngineError::write(locale_dir.clone(), e))?;
        }

        let loaded = EngineConfig::load(&locale_dir)?;
        let mut config = loaded.config;
        let mut migrated = false;
        if loaded.stored_version > DB_VERSION {
            return Err(EngineError::Migration {
                found: loaded.stored_version,
                supported: DB_VERSION,
            });
        }
        if loaded.stored_version < DB_VERSION {
            info!(
                from = loaded.stored_version,
                to = DB_VERSION,
                "upgrading database"
            );
            migrate_to_v2(&locale_dir, &config.langs)?;
            config.db_version = DB_VERSION;
            config.save(&locale_dir)?;
            migrated = true;
        }

        let keys = KeyStore::load(&locale_dir)?;
        let translations = TranslationStore::load(&locale_dir, &config.langs)?;

        if options.catalog_support == CatalogSupport::Disabled && !options.read_icu_messages {
            warn!("catalog toolchain unavailable: embedded message declarations will not be extracted");
        }

        let engine = Self {
            locale_dir,
            config,
            keys,
            translations,
            read_icu_messages: options.read_icu_messages,
            catalog_support: options.catalog_support,
        };
        if migrated || options.recompile {
            engine.compile_now()?;
        }
        Ok(engine)
    }

    pub fn locale_dir(&self) -> &Path {
        &self.locale_dir
    }

    // ============================================================
    // Config
    // ============================================================

    pub fn config(&self) -> EngineConfig {
        self.config.clone()
    }

    /// Apply a partial config update, persist it, and regenerate outputs.
    pub fn update_config(&mut self, patch: ConfigPatch) -> Result<EngineConfig> {
        let mut next = self.config.clone();
        next.apply(patch);
        next.validate()?;
        self.config = next;
        debug!(config = ?self.config, "new config");

        // Newly activated languages may have translations persisted from an
        // earlier activation.
        self.translations.ensure_langs(&self.config.langs)?;
        self.config.save(&self.locale_dir)?;
        self.compile_now()?;
        Ok(self.config.clone())
    }

    // ============================================================
    // Keys
    // ============================================================

    pub fn keys(&self) -> Vec<Key> {
        self.keys.all()
    }

    pub fn key(&self, id: &str) -> Option<Key> {
        self.keys.get(id).cloned()
    }

    pub fn create_key(&mut self, new: NewKey) -> Result<Key> {
        let key = self.keys.create(new, Utc::now())?;
        self.compile_now()?;
        Ok(key)
    }

    pub fn update_key(&mut self, id: &str, patch: KeyPatch) -> Result<Key> {
        let key = self.keys.update(id, patch)?;
        self.compile_now()?;
        Ok(key)
    }

    /// Delete a key. Its translations are kept; they simply stop appearing
    /// in compiled outputs until the key returns.
    pub fn delete_key(&mut self, id: &str) -> Result<Key> {
        let key = self.keys.delete(id)?;
        self.compile_now()?;
        Ok(key)
    }

    // ============================================================
    // Translations
    // ============================================================

    pub fn translations(&self) -> Vec<Translation> {
        self.translations.all()
    }

    pub fn lang_translations(&self, lang: &str) -> Vec<Translation> {
        self.translations.by_lang(lang)
    }

    pub fn key_translations(&self, key_id: &str) -> Vec<Translation> {
        self.translations.by_key(key_id)
    }

    pub fn translation(&self, id: &str) -> Option<Translation> {
        self.translations.get(id).cloned()
    }

    pub fn create_translation(&mut self, new: NewTranslation) -> Result<Translation> {
        let translation = self.translations.create(new)?;
        self.compile_now()?;
        Ok(translation)
    }

    pub fn update_translation(&mut self, id: &str, patch: TranslationPatch) -> Result<Translation> {
        let translation = self.translations.update(id, patch)?;
        self.compile_now()?;
        Ok(translation)
    }

    pub fn delete_translation(&mut self, id: &str) -> Result<Translation> {
        let translation = self.translations.delete(id)?;
        self.compile_now()?;
        Ok(translation)
    }

    // ============================================================
    // Scan / compile
    // ============================================================

    /// Run the source scanner, reconcile the fresh keys into the store, and
    /// regenerate outputs. Returns the post-reconcile key set.
    pub fn scan(&mut self) -> Result<Vec<Key>> {
        let span = info_span!("scan");
        let _enter = span.enter();

        let options = ScanOptions::from_config(
            &self.config,
            self.read_icu_messages,
            self.catalog_support,
        );
        let outcome = scanner::scan(&options)?;
        for warning in &outcome.warnings {
            warn!(file = %warning.file_path, error = %warning.error, "extraction problem");
        }

        let report = self.keys.reconcile(outcome.keys, Utc::now())?;
        info!(
            new = report.new_keys.len(),
            unused = report.unused_keys.len(),
            total = self.keys.map().len(),
            "scan reconciled"
        );
        self.compile_now()?;
        Ok(self.keys.all())
    }

    /// Regenerate all output bundles from the current stores.
    pub fn compile(&self) -> Result<()> {
        self.compile_now()
    }

    fn compile_now(&self) -> Result<()> {
        let span = info_span!("compile");
        let _enter = span.enter();

        let lists = resolver::candidate_lists(&self.config.langs, self.translations.map());
        compiler::compile_all(
            &self.locale_dir,
            self.keys.map(),
            &lists,
            &OutputOptions::from_config(&self.config),
        )
    }

    // ============================================================
    // Legacy import
    // ============================================================

    /// One-shot merge of a legacy locale directory: flat
    /// `text -> translation` maps, one `<lang>.json` per language. Unknown
    /// languages join the active set; existing `(key, lang)` pairs are left
    /// alone.
    pub fn import_legacy(&mut self, dir: &Path) -> Result<ImportSummary> {
        let span = info_span!("import_legacy");
        let _enter = span.enter();

        let mut summary = ImportSummary::default();
        let now = Utc::now();

        for (lang, entries) in read_legacy_dir(dir)? {
            if !self.config.langs.contains(&lang) {
                self.config.langs.push(lang.clone());
                self.config.save(&self.locale_dir)?;
                self.translations.ensure_langs(&self.config.langs)?;
                summary.langs_added += 1;
            }
            for (raw, translated) in entries {
                let (context, text) = split_context(&raw);
                let key_id = Key::derive_id(context.as_deref(), &text);
                if self.keys.get(&key_id).is_none() {
                    self.keys.create(
                        NewKey {
                            context,
                            text,
                            ..NewKey::default()
                        },
                        now,
                    )?;
                    summary.keys_added += 1;
                }
                if !self.translations.has_for(&key_id, &lang) {
                    self.translations.create(NewTranslation {
                        lang: lang.clone(),
                        key_id,
                        translation: translated,
                        fuzzy: false,
                    })?;
                    summary.translations_added += 1;
                }
            }
        }

        info!(?summary, "legacy import finished");
        self.compile_now()?;
        Ok(summary)
    }
}

/// Read every legacy `<lang>.json` flat map in a directory. Files that are
/// not flat string maps are skipped with a warning.
fn read_legacy_dir(dir: &Path) -> Result<Vec<(String, Vec<(String, String)>)>> {
    let mut out = Vec::new();
    let entries = fs::read_dir(dir).map_err(|e| EngineError::read(dir, e))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();

    for path in paths {
        let Some(lang) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
            continue;
        };
        let value: Value = read_json(&path)?;
        match flat_string_map(&value) {
            Some(entries) => out.push((lang, entries)),
            None => warn!(path = %path.display(), "not a flat translation map, skipping"),
        }
    }
    Ok(out)
}

/// Interpret a JSON value as a legacy flat `text -> translation` map.
fn flat_string_map(value: &Value) -> Option<Vec<(String, String)>> {
    let obj = value.as_object()?;
    let mut out = Vec::new();
    for (text, translated) in obj {
        out.push((text.clone(), translated.as_str()?.to_string()));
    }
    Some(out)
}

/// In-place upgrade of a pre-v2 locale directory: each active language's
/// flat map becomes a translation partition, and the keys it references are
/// merged into `keys.json`.
fn migrate_to_v2(locale_dir: &Path, langs: &[String]) -> Result<()> {
    let now = Utc::now();
    let keys_path = locale_dir.join(crate::store::KEYS_FILE_NAME);
    let mut keys: KeyMap = if keys_path.exists() {
        read_json(&keys_path)?
    } else {
        KeyMap::new()
    };

    for lang in langs {
        let lang_path = locale_dir.join(format!("{lang}.json"));
        if !lang_path.exists() {
            continue;
        }
        let value: Value = read_json(&lang_path)?;
        let Some(entries) = flat_string_map(&value) else {
            // Already v2 (or unrecognizable): leave the file alone.
            continue;
        };
        if entries.is_empty() {
            continue;
        }

        info!(lang = %lang, count = entries.len(), "migrating legacy translations");
        let mut partition = TranslationMap::new();
        for (raw, translated) in entries {
            let (context, text) = split_context(&raw);
            let id = Key::derive_id(context.as_deref(), &text);
            keys.entry(id.clone()).or_insert_with(|| Key {
                id: id.clone(),
                context,
                text,
                react_intl_id: None,
                description: None,
                first_used: Some(now),
                unused_since: None,
                sources: Vec::new(),
            });
            let translation_id = Uuid::new_v4().to_string();
            partition.insert(
                translation_id.clone(),
                Translation {
                    id: translation_id,
                    key_id: id,
                    lang: lang.clone(),
                    translation: translated,
                    fuzzy: false,
                },
            );
        }
        save_json(&lang_path, &partition)?;
    }

    save_json(&keys_path, &keys)
}
