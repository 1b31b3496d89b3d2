//! filemover - sort a directory's files into category folders
//!
//! This library classifies directory entries by file-name extension, lays out
//! the destination tree (`Music`, `Pictures`, `Docs`, `Docs/PDFs`,
//! `Docs/PowerPoints`, `ZipFiles`, `video`) and moves every entry of a source
//! directory into it. The extension registry and entry filters can be
//! configured via TOML configuration files.

pub mod cli;
pub mod config;
pub mod directory_plan;
pub mod file_category;
pub mod file_organizer;
pub mod output;

pub use config::{CompiledFilters, Config, ConfigError};
pub use directory_plan::{DirectoryPlan, ensure_tree};
pub use file_category::{Category, ExtensionTable};
pub use file_organizer::{FileOrganizer, MoveResult, Operation, OrganizeError};

pub use cli::{OrganizeCommand, RunSummary, run_cli, run_cli_with_config};
