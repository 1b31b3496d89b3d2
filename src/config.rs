//! Configuration: extension registry overrides and entry filters.
//!
//! Configuration is loaded from a TOML file. Every section is optional; an
//! empty file yields the standard extension registry and no filtering, so
//! every entry of the source directory is organized.
//!
//! # Configuration File Format
//!
//! ```toml
//! [categories]
//! audio = [".mp3", ".flac", "opus"]
//! video = [".mp4", ".mkv"]
//!
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["*.part"]
//! extensions = ["crdownload"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```
//!
//! A category listed under `[categories]` has its extensions replaced; the
//! others keep the standard registry. Filters are matched against entry names.

use crate::file_category::{Category, ExtensionTable, normalize_extension};
use crate::file_organizer::FileOrganizer;
use glob::Pattern;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = ".filemoverrc.toml";

/// Errors that can occur during configuration loading and compilation.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// An extension list entry that names no extension.
    InvalidExtension {
        /// Configuration key of the category.
        category: String,
        /// The offending entry.
        value: String,
    },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::InvalidExtension { category, value } => {
                write!(
                    f,
                    "Invalid extension '{}' in categories.{}",
                    value, category
                )
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Per-category extension overrides.
    #[serde(default)]
    pub categories: CategoryOverrides,

    /// Entry filters.
    #[serde(default)]
    pub filters: FilterRules,
}

/// Replacement extension lists, one optional list per category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryOverrides {
    pub audio: Option<Vec<String>>,
    pub pictures: Option<Vec<String>>,
    pub archives: Option<Vec<String>>,
    pub documents: Option<Vec<String>>,
    pub presentations: Option<Vec<String>>,
    pub pdf_like: Option<Vec<String>>,
    pub video: Option<Vec<String>>,
}

impl CategoryOverrides {
    fn get(&self, category: Category) -> Option<&Vec<String>> {
        match category {
            Category::Audio => self.audio.as_ref(),
            Category::Pictures => self.pictures.as_ref(),
            Category::Archives => self.archives.as_ref(),
            Category::Documents => self.documents.as_ref(),
            Category::Presentations => self.presentations.as_ref(),
            Category::PdfLike => self.pdf_like.as_ref(),
            Category::Video => self.video.as_ref(),
            Category::General => None,
        }
    }

    /// Builds the extension registry: the standard table with overrides
    /// applied.
    pub fn build_table(&self) -> Result<ExtensionTable, ConfigError> {
        let mut table = ExtensionTable::default();
        for category in Category::PRIORITY {
            if let Some(extensions) = self.get(category) {
                if let Some(bad) = extensions
                    .iter()
                    .find(|ext| normalize_extension(ext).is_none())
                {
                    return Err(ConfigError::InvalidExtension {
                        category: category.config_key().to_string(),
                        value: bad.clone(),
                    });
                }
                debug!(
                    "Overriding {} extensions: {:?}",
                    category.config_key(),
                    extensions
                );
                table.set_extensions(category, extensions);
            }
        }
        Ok(table)
    }
}

/// Entry filter rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether entries starting with "." are organized. Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    /// Rules for leaving entries in place.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including entries (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_enable_hidden_files() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Rules for leaving entries in the source directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact entry names (e.g., "Thumbs.db", "desktop.ini").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns (e.g., "*.part").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions without the leading dot (e.g., "crdownload", "tmp").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the entry name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including entries, overriding exclude rules (whitelist).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that override exclude rules.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Config {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.filemoverrc.toml` in the current directory
    /// 3. Look for `~/.config/filemover/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read, or if any file found cannot be parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("filemover")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails.
    /// Returns `ConfigError::IoError` if file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compiles the configuration into a ready-to-use organizer.
    ///
    /// # Errors
    ///
    /// Returns an error if an extension entry is empty or if any regex or glob
    /// pattern is invalid.
    pub fn into_organizer(self) -> Result<FileOrganizer, ConfigError> {
        let table = self.categories.build_table()?;
        let filters = CompiledFilters::new(self.filters)?;
        Ok(FileOrganizer::new(table, filters))
    }
}

/// Compiled filter structures for matching entry names.
///
/// Patterns are validated and compiled once so each entry is matched without
/// reparsing.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    /// Create compiled filters from filter rules.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex patterns are invalid.
    pub fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Check if an entry should be organized (not excluded).
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Include patterns (whitelist) - if matched, always include
    /// 2. Hidden entry filter - if hidden and disabled, exclude
    /// 3. Exact name match - if matched, exclude
    /// 4. Extension match - if matched, exclude
    /// 5. Glob pattern match - if matched, exclude
    /// 6. Regex pattern match - if matched, exclude
    /// 7. Default: include
    pub fn should_include(&self, entry_name: &Path) -> bool {
        let file_name = entry_name
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.matches_any(&self.include_patterns, entry_name) {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = entry_name.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self.matches_any(&self.exclude_patterns, entry_name) {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }

    fn matches_any(&self, patterns: &[Pattern], entry_name: &Path) -> bool {
        patterns
            .iter()
            .any(|pattern| pattern.matches_path(entry_name))
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(rules: FilterRules) -> CompiledFilters {
        CompiledFilters::new(rules).unwrap()
    }

    #[test]
    fn test_default_config_includes_everything() {
        let filters = compile(FilterRules::default());
        assert!(filters.should_include(Path::new(".hidden")));
        assert!(filters.should_include(Path::new("Thumbs.db")));
        assert!(filters.should_include(Path::new("notes")));
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = Config::from_toml("").unwrap();
        assert!(config.filters.enable_hidden_files);
        assert!(config.categories.audio.is_none());
        assert_eq!(
            config.categories.build_table().unwrap(),
            ExtensionTable::default()
        );
    }

    #[test]
    fn test_category_override_replaces_list() {
        let config = Config::from_toml(
            r#"
[categories]
audio = ["opus", ".MKA"]
"#,
        )
        .unwrap();
        let table = config.categories.build_table().unwrap();

        assert_eq!(table.classify("song.opus"), Category::Audio);
        assert_eq!(table.classify("song.mka"), Category::Audio);
        assert_eq!(table.classify("song.mp3"), Category::General);
        // Untouched categories keep the standard list.
        assert_eq!(table.classify("photo.png"), Category::Pictures);
    }

    #[test]
    fn test_category_override_rejects_empty_extension() {
        let config = Config::from_toml(
            r#"
[categories]
video = [".mp4", "."]
"#,
        )
        .unwrap();
        match config.categories.build_table() {
            Err(ConfigError::InvalidExtension { category, value }) => {
                assert_eq!(category, "video");
                assert_eq!(value, ".");
            }
            other => panic!("Expected InvalidExtension, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_category_is_invalid() {
        let result = Config::from_toml(
            r#"
[categories]
fonts = [".ttf"]
"#,
        );
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_hidden_files_excluded_when_disabled() {
        let filters = compile(FilterRules {
            enable_hidden_files: false,
            ..Default::default()
        });
        assert!(!filters.should_include(Path::new(".DS_Store")));
        assert!(filters.should_include(Path::new("photo.jpg")));
    }

    #[test]
    fn test_exclude_exact_filename() {
        let filters = compile(FilterRules {
            exclude: ExcludeRules {
                filenames: vec!["Thumbs.db".to_string(), "desktop.ini".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(!filters.should_include(Path::new("Thumbs.db")));
        assert!(filters.should_include(Path::new("image.jpg")));
    }

    #[test]
    fn test_exclude_extensions() {
        let filters = compile(FilterRules {
            exclude: ExcludeRules {
                extensions: vec!["crdownload".to_string(), ".part".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(!filters.should_include(Path::new("movie.mkv.crdownload")));
        assert!(!filters.should_include(Path::new("song.PART")));
        assert!(filters.should_include(Path::new("movie.mkv")));
    }

    #[test]
    fn test_exclude_glob_patterns() {
        let filters = compile(FilterRules {
            exclude: ExcludeRules {
                patterns: vec!["*.tmp".to_string(), "draft_*".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(!filters.should_include(Path::new("file.tmp")));
        assert!(!filters.should_include(Path::new("draft_report.docx")));
        assert!(filters.should_include(Path::new("report.docx")));
    }

    #[test]
    fn test_exclude_regex() {
        let filters = compile(FilterRules {
            exclude: ExcludeRules {
                regex: vec![r"^~\$".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(!filters.should_include(Path::new("~$report.docx")));
        assert!(filters.should_include(Path::new("report.docx")));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let filters = compile(FilterRules {
            enable_hidden_files: false,
            exclude: ExcludeRules {
                extensions: vec!["log".to_string()],
                ..Default::default()
            },
            include: IncludeRules {
                patterns: vec!["keep*.log".to_string(), ".important".to_string()],
            },
        });
        assert!(filters.should_include(Path::new("keep_me.log")));
        assert!(!filters.should_include(Path::new("debug.log")));
        assert!(filters.should_include(Path::new(".important")));
        assert!(!filters.should_include(Path::new(".other")));
    }

    #[test]
    fn test_invalid_regex_returns_error() {
        let result = CompiledFilters::new(FilterRules {
            exclude: ExcludeRules {
                regex: vec!["[invalid(".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRegexPattern { .. })
        ));
    }

    #[test]
    fn test_invalid_glob_pattern_returns_error() {
        let result = CompiledFilters::new(FilterRules {
            exclude: ExcludeRules {
                patterns: vec!["[invalid".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(matches!(result, Err(ConfigError::InvalidGlobPattern(_))));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/non/existent/filemover.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_into_organizer_uses_overrides() {
        let config = Config::from_toml(
            r#"
[categories]
documents = [".md"]
"#,
        )
        .unwrap();
        let organizer = config.into_organizer().unwrap();
        assert_eq!(organizer.classify("README.md"), Category::Documents);
        assert_eq!(organizer.classify("notes.txt"), Category::General);
    }
}
