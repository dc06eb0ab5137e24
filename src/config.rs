//! Engine configuration: one `config.json` per locale directory.
//!
//! Loading is forgiving — a missing or unreadable file falls back to the
//! built-in defaults and is written back immediately, so the directory is
//! self-initializing. A schema version the engine cannot migrate is the one
//! fatal startup condition.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EngineError, Result};
use crate::store::{read_json, save_json};

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Current on-disk schema version.
pub const DB_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Directories scanned for message extraction, relative to the caller's
    /// working directory.
    #[serde(default = "default_src_paths")]
    pub src_paths: Vec<String>,
    /// File extensions visited by the scanner, with leading dots.
    #[serde(default = "default_src_extensions")]
    pub src_extensions: Vec<String>,
    /// Active language tags, hierarchy-delimited (`en`, `en-US`, ...).
    #[serde(default = "default_langs")]
    pub langs: Vec<String>,
    /// Message function names matched in pattern mode.
    #[serde(default = "default_msg_function_names")]
    pub msg_function_names: Vec<String>,
    /// Additional raw extraction regexes; the first capture group is the
    /// candidate message.
    #[serde(default)]
    pub msg_regexps: Vec<String>,
    #[serde(default)]
    pub f_minify: bool,
    #[serde(default = "default_true")]
    pub f_js_output: bool,
    #[serde(default = "default_true")]
    pub f_json_output: bool,
    #[serde(default = "default_true")]
    pub f_react_intl_output: bool,
    #[serde(default = "default_db_version")]
    pub db_version: u32,
}

fn default_src_paths() -> Vec<String> {
    vec!["src".to_string()]
}

fn default_src_extensions() -> Vec<String> {
    [".js", ".jsx", ".coffee", ".cjsx"].map(String::from).to_vec()
}

fn default_langs() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_msg_function_names() -> Vec<String> {
    vec!["_t".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_db_version() -> u32 {
    DB_VERSION
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            src_paths: default_src_paths(),
            src_extensions: default_src_extensions(),
            langs: default_langs(),
            msg_function_names: default_msg_function_names(),
            msg_regexps: Vec::new(),
            f_minify: false,
            f_js_output: true,
            f_json_output: true,
            f_react_intl_output: true,
            db_version: DB_VERSION,
        }
    }
}

impl EngineConfig {
    /// Validate configuration values.
    ///
    /// Returns an error if any custom extraction regex fails to compile.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.msg_regexps {
            Regex::new(pattern).map_err(|e| {
                EngineError::Validation(format!("invalid extraction regex {pattern:?}: {e}"))
            })?;
        }
        Ok(())
    }

    pub fn path_in(locale_dir: &Path) -> PathBuf {
        locale_dir.join(CONFIG_FILE_NAME)
    }

    /// Load the config from a locale directory, filling missing fields from
    /// defaults and writing the result back. A malformed file is replaced by
    /// the defaults (the warning names it), matching the self-initializing
    /// behavior of the rest of the directory.
    pub fn load(locale_dir: &Path) -> Result<LoadedConfig> {
        let path = Self::path_in(locale_dir);
        let config = if path.exists() {
            info!(path = %path.display(), "reading config");
            match read_json::<EngineConfig>(&path) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unreadable config, using defaults");
                    EngineConfig::default()
                }
            }
        } else {
            EngineConfig::default()
        };
        config.validate()?;

        let stored_version = config.db_version;
        let loaded = LoadedConfig {
            config,
            stored_version,
        };
        save_json(&path, &loaded.config)?;
        Ok(loaded)
    }

    pub fn save(&self, locale_dir: &Path) -> Result<()> {
        save_json(&Self::path_in(locale_dir), self)
    }

    /// Apply a partial update in place. The schema version is not patchable.
    pub fn apply(&mut self, patch: ConfigPatch) {
        if let Some(src_paths) = patch.src_paths {
            self.src_paths = src_paths;
        }
        if let Some(src_extensions) = patch.src_extensions {
            self.src_extensions = src_extensions;
        }
        if let Some(langs) = patch.langs {
            self.langs = langs;
        }
        if let Some(msg_function_names) = patch.msg_function_names {
            self.msg_function_names = msg_function_names;
        }
        if let Some(msg_regexps) = patch.msg_regexps {
            self.msg_regexps = msg_regexps;
        }
        if let Some(f_minify) = patch.f_minify {
            self.f_minify = f_minify;
        }
        if let Some(f_js_output) = patch.f_js_output {
            self.f_js_output = f_js_output;
        }
        if let Some(f_json_output) = patch.f_json_output {
            self.f_json_output = f_json_output;
        }
        if let Some(f_react_intl_output) = patch.f_react_intl_output {
            self.f_react_intl_output = f_react_intl_output;
        }
    }
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: EngineConfig,
    /// The `dbVersion` found on disk before defaulting, for the migration
    /// check at startup.
    pub stored_version: u32,
}

/// Partial configuration update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default)]
    pub src_paths: Option<Vec<String>>,
    #[serde(default)]
    pub src_extensions: Option<Vec<String>>,
    #[serde(default)]
    pub langs: Option<Vec<String>>,
    #[serde(default)]
    pub msg_function_names: Option<Vec<String>>,
    #[serde(default)]
    pub msg_regexps: Option<Vec<String>>,
    #[serde(default)]
    pub f_minify: Option<bool>,
    #[serde(default)]
    pub f_js_output: Option<bool>,
    #[serde(default)]
    pub f_json_output: Option<bool>,
    #[serde(default)]
    pub f_react_intl_output: Option<bool>,
}
