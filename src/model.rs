//! Records persisted by the translation database.
//!
//! Field names are serialized in camelCase to match the on-disk JSON layout
//! (`keys.json`, `<lang>.json`) that front ends and older tooling consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec;

/// A message identity extracted from source code.
///
/// Two keys with the same `(context, text)` collapse to a single record:
/// [`Key::derive_id`] is a pure function of that pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    pub id: String,
    pub context: Option<String>,
    pub text: String,
    /// External catalog id, when the key came from an annotated message
    /// declaration or a structured catalog. Feeds the reactIntl output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub react_intl_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Set once, the first time the key is discovered. Never regresses.
    pub first_used: Option<DateTime<Utc>>,
    /// Set on the first scan that no longer references the key; cleared when
    /// the key reappears.
    pub unused_since: Option<DateTime<Utc>>,
    /// Human-readable source locations, fully replaced on every scan.
    #[serde(default)]
    pub sources: Vec<String>,
}

impl Key {
    /// Recombine `(context, text)` into the raw candidate string and encode
    /// it. Keys created through the API and keys found by the scanner agree
    /// on ids because both go through this function.
    pub fn derive_id(context: Option<&str>, text: &str) -> String {
        match context {
            Some(context) => codec::encode(&format!("{context}_{text}")),
            None => codec::encode(text),
        }
    }
}

/// Split a raw extracted candidate into `(context, text)`.
///
/// The underscore convention: two or more `_`-separated tokens mean the
/// first is a context and the rest (rejoined with `_`) are the text. A text
/// that legitimately starts with a context-like prefix is indistinguishable;
/// the split is applied as-is rather than guessing intent.
pub fn split_context(raw: &str) -> (Option<String>, String) {
    match raw.split_once('_') {
        Some((context, text)) => (Some(context.to_string()), text.to_string()),
        None => (None, raw.to_string()),
    }
}

/// Payload for creating a key through the API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewKey {
    pub context: Option<String>,
    pub text: String,
    #[serde(default)]
    pub react_intl_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update for a key. `None` leaves a field untouched; for nullable
/// fields an explicit JSON `null` (outer `Some(None)`) clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPatch {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, with = "double_option")]
    pub context: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub react_intl_id: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
}

/// One language's rendering of a [`Key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub id: String,
    pub key_id: String,
    pub lang: String,
    pub translation: String,
    /// Needs review: set by producers such as machine translation.
    #[serde(default)]
    pub fuzzy: bool,
}

/// Payload for creating a translation. `lang` and `key_id` are validated as
/// non-empty before any write.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTranslation {
    pub lang: String,
    pub key_id: String,
    pub translation: String,
    #[serde(default)]
    pub fuzzy: bool,
}

/// Partial update for a translation. Language and key are identity; to move
/// a translation, delete and recreate it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationPatch {
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub fuzzy: Option<bool>,
}

/// Serde helper distinguishing "absent" from "explicitly null".
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Format a source reference: normalized path, plus the extracted range when
/// one is known.
pub fn format_source(path: &str, range: Option<&SourceRange>) -> String {
    let normalized = path.replace('\\', "/");
    match range {
        Some(range) => format!(
            "{normalized} ({}:{}-{}:{})",
            range.start_line, range.start_col, range.end_line, range.end_col
        ),
        None => normalized,
    }
}

/// Line/column range of an extracted message (lines 1-based, columns
/// 0-based, as reported by the source parsers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRange {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

#[cfg(test)]
mod tests {
    use crate::model::*;

    #[test]
    fn test_split_context_with_separator() {
        assert_eq!(
            split_context("greeting_Hello there"),
            (Some("greeting".to_string()), "Hello there".to_string())
        );
    }

    #[test]
    fn test_split_context_keeps_later_separators() {
        assert_eq!(
            split_context("menu_File_Open"),
            (Some("menu".to_string()), "File_Open".to_string())
        );
    }

    #[test]
    fn test_split_context_without_separator() {
        assert_eq!(split_context("Hello"), (None, "Hello".to_string()));
    }

    #[test]
    fn test_split_context_trailing_separator() {
        // The split is applied even when it yields an empty text. Stored ids
        // encode the raw string, so nothing is lost.
        assert_eq!(
            split_context("Save_"),
            (Some("Save".to_string()), String::new())
        );
    }

    #[test]
    fn test_derive_id_matches_scanner_round_trip() {
        let raw = "greeting_Hello there";
        let (context, text) = split_context(raw);
        assert_eq!(
            Key::derive_id(context.as_deref(), &text),
            crate::codec::encode(raw)
        );
    }

    #[test]
    fn test_derive_id_is_stable_per_pair() {
        let a = Key::derive_id(Some("menu"), "Save");
        let b = Key::derive_id(Some("menu"), "Save");
        let c = Key::derive_id(None, "Save");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_format_source_with_range() {
        let range = SourceRange {
            start_line: 3,
            start_col: 10,
            end_line: 3,
            end_col: 42,
        };
        assert_eq!(
            format_source("src\\app\\menu.js", Some(&range)),
            "src/app/menu.js (3:10-3:42)"
        );
    }

    #[test]
    fn test_key_serializes_camel_case() {
        let key = Key {
            id: "aWQ".to_string(),
            context: None,
            text: "Hi".to_string(),
            react_intl_id: None,
            description: None,
            first_used: None,
            unused_since: None,
            sources: vec!["src/a.js".to_string()],
        };
        let json = serde_json::to_value(&key).unwrap();
        assert!(json.get("firstUsed").is_some());
        assert!(json.get("unusedSince").is_some());
        // Absent catalog fields are omitted entirely.
        assert!(json.get("reactIntlId").is_none());
    }

    #[test]
    fn test_key_patch_distinguishes_null_from_absent() {
        let patch: KeyPatch = serde_json::from_str(r#"{ "context": null }"#).unwrap();
        assert_eq!(patch.context, Some(None));
        assert_eq!(patch.text, None);

        let patch: KeyPatch = serde_json::from_str(r#"{ "text": "New" }"#).unwrap();
        assert_eq!(patch.context, None);
        assert_eq!(patch.text, Some("New".to_string()));
    }
}
