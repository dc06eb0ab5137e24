//! The persisted translation store.
//!
//! Storage is partitioned by language — `<lang>.json` holds exactly the
//! translations whose `lang` matches — but the in-memory map is global so
//! the hierarchy resolver can query across languages.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::model::{NewTranslation, Translation, TranslationPatch};
use crate::store::{read_json, save_json};

pub type TranslationMap = IndexMap<String, Translation>;

#[derive(Debug)]
pub struct TranslationStore {
    locale_dir: PathBuf,
    translations: TranslationMap,
    loaded_langs: HashSet<String>,
}

impl TranslationStore {
    /// Load `<lang>.json` for every active language, creating empty files
    /// for languages that have none yet.
    pub fn load(locale_dir: &Path, langs: &[String]) -> Result<Self> {
        let mut store = Self {
            locale_dir: locale_dir.to_path_buf(),
            translations: TranslationMap::new(),
            loaded_langs: HashSet::new(),
        };
        store.ensure_langs(langs)?;
        Ok(store)
    }

    /// Load any languages not yet in memory. Called at init and again when
    /// the active language list grows, so translations persisted for a
    /// previously deactivated language come back.
    pub fn ensure_langs(&mut self, langs: &[String]) -> Result<()> {
        for lang in langs {
            if self.loaded_langs.contains(lang) {
                continue;
            }
            let path = self.lang_path(lang);
            if !path.exists() {
                save_json(&path, &TranslationMap::new())?;
            }
            info!(path = %path.display(), "reading translations");
            let loaded: TranslationMap = read_json(&path)?;
            self.translations.extend(loaded);
            self.loaded_langs.insert(lang.clone());
        }
        Ok(())
    }

    pub fn lang_path(&self, lang: &str) -> PathBuf {
        self.locale_dir.join(format!("{lang}.json"))
    }

    pub fn map(&self) -> &TranslationMap {
        &self.translations
    }

    /// Snapshot of every translation, in store order.
    pub fn all(&self) -> Vec<Translation> {
        self.translations.values().cloned().collect()
    }

    pub fn by_lang(&self, lang: &str) -> Vec<Translation> {
        self.translations
            .values()
            .filter(|t| t.lang == lang)
            .cloned()
            .collect()
    }

    pub fn by_key(&self, key_id: &str) -> Vec<Translation> {
        self.translations
            .values()
            .filter(|t| t.key_id == key_id)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Translation> {
        self.translations.get(id)
    }

    /// Create a translation with a fresh random id. Fails before any write
    /// when `lang` or `keyId` is missing.
    pub fn create(&mut self, new: NewTranslation) -> Result<Translation> {
        if new.lang.is_empty() {
            return Err(EngineError::Validation(
                "translation language must be specified".to_string(),
            ));
        }
        if new.key_id.is_empty() {
            return Err(EngineError::Validation(
                "translation key must be specified".to_string(),
            ));
        }
        let id = Uuid::new_v4().to_string();
        let translation = Translation {
            id: id.clone(),
            key_id: new.key_id,
            lang: new.lang.clone(),
            translation: new.translation,
            fuzzy: new.fuzzy,
        };
        self.translations.insert(id.clone(), translation);
        self.save_lang(&new.lang)?;
        Ok(self.translations[&id].clone())
    }

    pub fn update(&mut self, id: &str, patch: TranslationPatch) -> Result<Translation> {
        let translation = self
            .translations
            .get_mut(id)
            .ok_or_else(|| EngineError::Validation(format!("unknown translation id: {id}")))?;
        if let Some(text) = patch.translation {
            translation.translation = text;
        }
        if let Some(fuzzy) = patch.fuzzy {
            translation.fuzzy = fuzzy;
        }
        let lang = translation.lang.clone();
        let updated = translation.clone();
        self.save_lang(&lang)?;
        Ok(updated)
    }

    pub fn delete(&mut self, id: &str) -> Result<Translation> {
        let translation = self
            .translations
            .shift_remove(id)
            .ok_or_else(|| EngineError::Validation(format!("unknown translation id: {id}")))?;
        self.save_lang(&translation.lang)?;
        Ok(translation)
    }

    /// Insert an already-built record (legacy imports). The caller persists
    /// affected languages afterwards via [`TranslationStore::save_lang`].
    pub fn insert_unsaved(&mut self, translation: Translation) {
        self.translations.insert(translation.id.clone(), translation);
    }

    /// True when some translation already targets `(key_id, lang)`. Used by
    /// imports to avoid stacking duplicates; normal creates intentionally do
    /// not enforce this.
    pub fn has_for(&self, key_id: &str, lang: &str) -> bool {
        self.translations
            .values()
            .any(|t| t.key_id == key_id && t.lang == lang)
    }

    /// Persist the partition for one language.
    pub fn save_lang(&self, lang: &str) -> Result<()> {
        let partition: TranslationMap = self
            .translations
            .iter()
            .filter(|(_, t)| t.lang == lang)
            .map(|(id, t)| (id.clone(), t.clone()))
            .collect();
        save_json(&self.lang_path(lang), &partition)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{NewTranslation, TranslationPatch};
    use crate::store::translations::*;
    use tempfile::tempdir;

    fn langs(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_load_creates_files_for_active_langs() {
        let dir = tempdir().unwrap();
        let store = TranslationStore::load(dir.path(), &langs(&["en", "es"])).unwrap();
        assert!(dir.path().join("en.json").exists());
        assert!(dir.path().join("es.json").exists());
        assert!(store.all().is_empty());
    }

    #[test]
    fn test_create_requires_lang_and_key() {
        let dir = tempdir().unwrap();
        let mut store = TranslationStore::load(dir.path(), &langs(&["en"])).unwrap();

        let missing_lang = store.create(NewTranslation {
            lang: String::new(),
            key_id: "k".to_string(),
            translation: "Hi".to_string(),
            fuzzy: false,
        });
        assert!(matches!(
            missing_lang,
            Err(crate::error::EngineError::Validation(_))
        ));

        let missing_key = store.create(NewTranslation {
            lang: "en".to_string(),
            key_id: String::new(),
            translation: "Hi".to_string(),
            fuzzy: false,
        });
        assert!(matches!(
            missing_key,
            Err(crate::error::EngineError::Validation(_))
        ));
        assert!(store.all().is_empty());
    }

    #[test]
    fn test_translations_partition_by_lang_on_disk() {
        let dir = tempdir().unwrap();
        let mut store = TranslationStore::load(dir.path(), &langs(&["en", "es"])).unwrap();

        let en = store
            .create(NewTranslation {
                lang: "en".to_string(),
                key_id: "k1".to_string(),
                translation: "Hello".to_string(),
                fuzzy: false,
            })
            .unwrap();
        let es = store
            .create(NewTranslation {
                lang: "es".to_string(),
                key_id: "k1".to_string(),
                translation: "Hola".to_string(),
                fuzzy: true,
            })
            .unwrap();

        let en_file: TranslationMap =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("en.json")).unwrap())
                .unwrap();
        assert_eq!(en_file.len(), 1);
        assert_eq!(en_file[&en.id], en);

        let es_file: TranslationMap =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("es.json")).unwrap())
                .unwrap();
        assert_eq!(es_file.len(), 1);
        assert_eq!(es_file[&es.id], es);
    }

    #[test]
    fn test_reload_restores_all_langs() {
        let dir = tempdir().unwrap();
        {
            let mut store = TranslationStore::load(dir.path(), &langs(&["en", "es"])).unwrap();
            for (lang, text) in [("en", "Hello"), ("es", "Hola")] {
                store
                    .create(NewTranslation {
                        lang: lang.to_string(),
                        key_id: "k1".to_string(),
                        translation: text.to_string(),
                        fuzzy: false,
                    })
                    .unwrap();
            }
        }

        let store = TranslationStore::load(dir.path(), &langs(&["en", "es"])).unwrap();
        assert_eq!(store.all().len(), 2);
        assert_eq!(store.by_lang("en").len(), 1);
        assert_eq!(store.by_lang("es")[0].translation, "Hola");
    }

    #[test]
    fn test_update_and_delete() {
        let dir = tempdir().unwrap();
        let mut store = TranslationStore::load(dir.path(), &langs(&["en"])).unwrap();
        let created = store
            .create(NewTranslation {
                lang: "en".to_string(),
                key_id: "k1".to_string(),
                translation: "Helo".to_string(),
                fuzzy: true,
            })
            .unwrap();

        let updated = store
            .update(
                &created.id,
                TranslationPatch {
                    translation: Some("Hello".to_string()),
                    fuzzy: Some(false),
                },
            )
            .unwrap();
        assert_eq!(updated.translation, "Hello");
        assert!(!updated.fuzzy);

        let deleted = store.delete(&created.id).unwrap();
        assert_eq!(deleted.id, created.id);
        assert!(store.all().is_empty());

        // The partition file was rewritten empty.
        let en_file: TranslationMap =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("en.json")).unwrap())
                .unwrap();
        assert!(en_file.is_empty());
    }

    #[test]
    fn test_by_key_spans_languages() {
        let dir = tempdir().unwrap();
        let mut store = TranslationStore::load(dir.path(), &langs(&["en", "es"])).unwrap();
        for (lang, text) in [("en", "Hello"), ("es", "Hola")] {
            store
                .create(NewTranslation {
                    lang: lang.to_string(),
                    key_id: "shared".to_string(),
                    translation: text.to_string(),
                    fuzzy: false,
                })
                .unwrap();
        }
        store
            .create(NewTranslation {
                lang: "en".to_string(),
                key_id: "other".to_string(),
                translation: "Bye".to_string(),
                fuzzy: false,
            })
            .unwrap();

        assert_eq!(store.by_key("shared").len(), 2);
        assert!(store.has_for("shared", "en"));
        assert!(!store.has_for("other", "es"));
    }
}
