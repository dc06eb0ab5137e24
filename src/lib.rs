//! Lingot - translation database engine
//!
//! Lingot manages a localization database: message keys extracted from
//! application source code, per-language translations with inheritance
//! across related locales (`en` → `en-US` → `en-US-posix`), and compiled
//! output bundles ready for distribution.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line front end (thin dispatcher over the engine)
//! - `codec`: Reversible message-id ↔ storage-token encoding
//! - `compiler`: Flattening and per-language output generation
//! - `config`: Engine configuration with defaulting and schema versioning
//! - `engine`: The facade owning the stores and the compile pipeline
//! - `error`: Engine error taxonomy
//! - `model`: Persisted key/translation records
//! - `msgfmt`: Message-to-formatter compilation
//! - `resolver`: Locale hierarchy and fallback candidate ordering
//! - `scanner`: Source walking and message extraction
//! - `store`: Write-through persisted key/translation stores

pub mod cli;
pub mod codec;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod msgfmt;
pub mod resolver;
pub mod scanner;
pub mod store;
