//! Command-line front end over the engine.
//!
//! The CLI is a thin dispatcher: it opens the engine for the requested
//! locale directory, calls one entry point, and prints a short summary.
//! Everything interesting happens in [`crate::engine`].

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use colored::Colorize;

use crate::engine::{InitOptions, TranslationEngine};
use crate::scanner::CatalogSupport;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Locale directory holding the translation database
    #[arg(long, env = "LINGOT_DIR", default_value = "locales")]
    pub locale_dir: PathBuf,

    /// Scan ICU message catalogs (JSON) instead of matching source patterns
    #[arg(long)]
    pub read_icu_messages: bool,

    /// Skip embedded message declaration extraction during scans
    #[arg(long)]
    pub no_catalog: bool,
}

impl CommonArgs {
    fn init_options(&self, recompile: bool) -> InitOptions {
        InitOptions {
            recompile,
            read_icu_messages: self.read_icu_messages,
            catalog_support: if self.no_catalog {
                CatalogSupport::Disabled
            } else {
                CatalogSupport::Available
            },
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan the configured source paths and refresh the key database
    Scan {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Regenerate all compiled output bundles
    Compile {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Print the effective configuration
    Config {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Merge a legacy locale directory into the database
    Import {
        #[command(flatten)]
        common: CommonArgs,

        /// Directory holding legacy flat `<lang>.json` maps
        dir: PathBuf,
    },
}

/// Exit status for CLI commands.
///
/// - `Success` (0): Command completed successfully
/// - `Error` (1): Command failed (bad config, I/O failure, compile error)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Error => ExitCode::from(1),
        }
    }
}

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };

    match args.command.expect("checked above") {
        Command::Scan { common } => {
            let mut engine =
                TranslationEngine::init(&common.locale_dir, common.init_options(false))?;
            let keys = engine.scan()?;
            let unused = keys.iter().filter(|k| k.unused_since.is_some()).count();
            println!(
                "{} {} keys ({} unused)",
                "scanned:".bold().green(),
                keys.len(),
                unused
            );
        }
        Command::Compile { common } => {
            let engine = TranslationEngine::init(&common.locale_dir, common.init_options(true))?;
            let langs = engine.config().langs;
            println!(
                "{} {} language(s): {}",
                "compiled:".bold().green(),
                langs.len(),
                langs.join(", ")
            );
        }
        Command::Config { common } => {
            let engine = TranslationEngine::init(&common.locale_dir, common.init_options(false))?;
            println!("{}", serde_json::to_string_pretty(&engine.config())?);
        }
        Command::Import { common, dir } => {
            let mut engine =
                TranslationEngine::init(&common.locale_dir, common.init_options(false))?;
            let summary = engine.import_legacy(&dir)?;
            println!(
                "{} {} key(s), {} translation(s), {} language(s)",
                "imported:".bold().green(),
                summary.keys_added,
                summary.translations_added,
                summary.langs_added
            );
        }
    }

    Ok(ExitStatus::Success)
}
