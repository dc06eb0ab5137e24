//! Flattening and output generation.
//!
//! For every language node the resolver produced a candidate list; the
//! compiler folds it into a single winning translation per key (last
//! candidate wins) and projects the result into up to three artifacts per
//! language. Each artifact is an independent, idempotent projection:
//! regenerating with unchanged inputs produces byte-identical files.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rayon::prelude::*;
use serde_json::{Map, Value, json};
use tracing::{debug, error};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::model::Translation;
use crate::msgfmt;
use crate::store::KeyMap;
use crate::store::save_json;

/// Which artifacts to produce, lifted out of the config toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    pub js: bool,
    pub json: bool,
    pub react_intl: bool,
    pub minify: bool,
}

impl OutputOptions {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            js: config.f_js_output,
            json: config.f_json_output,
            react_intl: config.f_react_intl_output,
            minify: config.f_minify,
        }
    }
}

pub fn compiled_js_path(locale_dir: &Path, lang: &str) -> PathBuf {
    locale_dir.join(format!("{lang}.js"))
}

pub fn json_output_path(locale_dir: &Path, lang: &str) -> PathBuf {
    locale_dir.join(format!("{lang}.out.json"))
}

pub fn react_intl_path(locale_dir: &Path, lang: &str) -> PathBuf {
    locale_dir.join(format!("{lang}.reactIntl.json"))
}

/// Compile every language's artifacts. Languages are independent, so they
/// compile in parallel; failures are logged per language and the first one
/// is re-raised after the whole pass (already-written files stay).
pub fn compile_all(
    locale_dir: &Path,
    keys: &KeyMap,
    lists: &IndexMap<String, Vec<&Translation>>,
    options: &OutputOptions,
) -> Result<()> {
    let entries: Vec<(&String, &Vec<&Translation>)> = lists.iter().collect();
    let results: Vec<(String, Result<()>)> = entries
        .par_iter()
        .map(|&(lang, candidates)| {
            let result = compile_lang(locale_dir, lang, keys, candidates, options);
            (lang.clone(), result)
        })
        .collect();

    let mut first_error = None;
    for (lang, result) in results {
        if let Err(e) = result {
            error!(lang = %lang, error = %e, "could not compile translations");
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn compile_lang(
    locale_dir: &Path,
    lang: &str,
    keys: &KeyMap,
    candidates: &[&Translation],
    options: &OutputOptions,
) -> Result<()> {
    let flattened = flatten(keys, candidates);

    if options.js {
        let bundle = render_bundle(lang, keys, &flattened, options.minify)?;
        let path = compiled_js_path(locale_dir, lang);
        debug!(path = %path.display(), "writing file");
        fs::write(&path, bundle).map_err(|e| EngineError::write(path.clone(), e))?;
    }

    if options.react_intl {
        let mut out = Map::new();
        for (key_id, translation) in &flattened {
            let key = &keys[*key_id];
            if let Some(id) = &key.react_intl_id {
                out.insert(
                    id.clone(),
                    json!({
                        "translation": translation.translation,
                        "description": key.description,
                    }),
                );
            }
        }
        save_json(&react_intl_path(locale_dir, lang), &out)?;
    }

    if options.json {
        let mut out = Map::new();
        for (key_id, translation) in &flattened {
            let key = &keys[*key_id];
            let name = key.react_intl_id.clone().unwrap_or_else(|| key.text.clone());
            out.insert(name, Value::String(translation.translation.clone()));
        }
        save_json(&json_output_path(locale_dir, lang), &out)?;
    }

    Ok(())
}

/// Apply the ordered candidate list: the last candidate targeting a key
/// wins. Candidates for keys no longer in the store are dropped — they have
/// no text to be emitted under.
fn flatten<'a>(keys: &KeyMap, candidates: &[&'a Translation]) -> IndexMap<&'a str, &'a Translation> {
    let mut flattened: IndexMap<&str, &Translation> = IndexMap::new();
    for translation in candidates {
        if keys.contains_key(&translation.key_id) {
            flattened.insert(translation.key_id.as_str(), translation);
        }
    }
    flattened
}

/// Render the loadable message-function bundle: a CommonJS module mapping
/// each key's source text to a compiled formatter.
fn render_bundle(
    lang: &str,
    keys: &KeyMap,
    flattened: &IndexMap<&str, &Translation>,
    minify: bool,
) -> Result<String> {
    let mut entries = Vec::new();
    for (key_id, translation) in flattened {
        let key = &keys[*key_id];
        let expr = msgfmt::compile_expr(&translation.translation).map_err(|source| {
            EngineError::Compilation {
                lang: lang.to_string(),
                source,
            }
        })?;
        let name = serde_json::to_string(&key.text).expect("string serialization cannot fail");
        entries.push((name, expr));
    }

    let mut out = String::new();
    if minify {
        out.push_str("module.exports={");
        for (i, (name, expr)) in entries.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&format!("{name}:function(args){{return {expr};}}"));
        }
        out.push_str("};");
    } else {
        out.push_str("/* Generated message bundle. Do not edit. */\n");
        out.push_str("module.exports = {\n");
        for (name, expr) in &entries {
            out.push_str(&format!(
                "  {name}: function (args) {{ return {expr}; }},\n"
            ));
        }
        out.push_str("};\n");
    }
    Ok(out)
}
