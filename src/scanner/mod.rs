//! Source scanning: walk the configured directories and extract message
//! keys.
//!
//! The scan is a pure read — it returns the fresh key set and leaves
//! reconciliation against the stored keys to the key store. Problems with
//! individual files (unreadable, unparseable) become warnings and never
//! abort the walk.

mod catalog;
mod patterns;

pub use catalog::CatalogMessage;

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::codec;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::{Key, format_source, split_context};
use crate::store::KeyMap;

/// Extension used in structured scan mode; all other extensions are treated
/// as not configured.
pub const STRUCTURED_EXTENSION: &str = ".json";

/// Extensions the embedded-catalog parser understands.
const PARSEABLE_EXTENSIONS: &[&str] = &[".js", ".jsx", ".ts", ".tsx"];

/// Whether the annotated-catalog toolchain is usable. Resolved once at
/// engine startup and passed down, never probed mid-scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSupport {
    Available,
    Disabled,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub src_paths: Vec<PathBuf>,
    pub src_extensions: Vec<String>,
    pub msg_function_names: Vec<String>,
    pub msg_regexps: Vec<String>,
    /// Structured mode: read ICU catalog JSON instead of matching patterns.
    pub structured: bool,
    pub catalog_support: CatalogSupport,
}

impl ScanOptions {
    pub fn from_config(
        config: &EngineConfig,
        structured: bool,
        catalog_support: CatalogSupport,
    ) -> Self {
        Self {
            src_paths: config.src_paths.iter().map(PathBuf::from).collect(),
            src_extensions: config.src_extensions.clone(),
            msg_function_names: config.msg_function_names.clone(),
            msg_regexps: config.msg_regexps.clone(),
            structured,
            catalog_support,
        }
    }
}

/// A non-fatal problem encountered while scanning.
#[derive(Debug, Clone)]
pub struct ScanWarning {
    pub file_path: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub keys: KeyMap,
    pub warnings: Vec<ScanWarning>,
}

/// Walk the source paths and extract the fresh key set.
pub fn scan(options: &ScanOptions) -> Result<ScanOutcome> {
    let regexps = if options.structured {
        Vec::new()
    } else {
        patterns::build_regexps(&options.msg_function_names, &options.msg_regexps)?
    };
    let extensions: Vec<String> = if options.structured {
        vec![STRUCTURED_EXTENSION.to_string()]
    } else {
        options.src_extensions.clone()
    };

    let mut outcome = ScanOutcome::default();
    for src_path in &options.src_paths {
        for entry in WalkDir::new(src_path) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    outcome.warnings.push(ScanWarning {
                        file_path: e
                            .path()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| src_path.display().to_string()),
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(extension) = file_extension(path) else {
                continue;
            };
            if !extensions.iter().any(|e| e == &extension) {
                continue;
            }
            scan_file(path, &extension, options, &regexps, &mut outcome);
        }
    }
    Ok(outcome)
}

fn scan_file(
    path: &Path,
    extension: &str,
    options: &ScanOptions,
    regexps: &[regex::Regex],
    outcome: &mut ScanOutcome,
) {
    let file_path = path.display().to_string();
    debug!(path = %file_path, "processing");

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            outcome.warnings.push(ScanWarning {
                file_path,
                error: format!("failed to read file: {e}"),
            });
            return;
        }
    };

    if options.structured {
        match catalog::extract_icu_json(&content) {
            Ok(messages) => {
                for message in &messages {
                    add_message(&mut outcome.keys, &message.text, &file_path, Some(message));
                }
            }
            Err(e) => outcome.warnings.push(ScanWarning {
                file_path,
                error: format!("failed to parse catalog: {e}"),
            }),
        }
        return;
    }

    for candidate in patterns::extract(&content, regexps) {
        add_message(&mut outcome.keys, &candidate, &file_path, None);
    }

    if options.catalog_support == CatalogSupport::Available
        && PARSEABLE_EXTENSIONS.contains(&extension)
    {
        match catalog::extract_embedded(content, &file_path) {
            Ok(messages) => {
                for message in &messages {
                    add_message(&mut outcome.keys, &message.text, &file_path, Some(message));
                }
            }
            Err(e) => outcome.warnings.push(ScanWarning {
                file_path,
                error: e.to_string(),
            }),
        }
    }
}

fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
}

/// Fold one extracted occurrence into the fresh key set. The first
/// occurrence of an id initializes the record; later ones only append
/// sources. Catalog annotations put the external id in `context`, so
/// annotated messages stay distinct from plain-text twins at the catalog
/// level while sharing the text-derived id.
fn add_message(keys: &mut KeyMap, raw: &str, file_path: &str, catalog: Option<&CatalogMessage>) {
    let (mut context, text) = split_context(raw);
    if let Some(catalog) = catalog
        && catalog.id.is_some()
    {
        context = catalog.id.clone();
    }

    let id = codec::encode(raw);
    let key = keys.entry(id.clone()).or_insert_with(|| Key {
        id,
        context,
        text,
        react_intl_id: catalog.and_then(|c| c.id.clone()),
        description: catalog.and_then(|c| c.description.clone()),
        first_used: None,
        unused_since: None,
        sources: Vec::new(),
    });
    key.sources.push(format_source(
        file_path,
        catalog.and_then(|c| c.range.as_ref()),
    ));
}
