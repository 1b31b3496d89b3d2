//! Extension-based file categorization.
//!
//! This module holds the fixed set of destination categories and the extension
//! registry that routes a file name to one of them. Matching is a
//! case-insensitive suffix test walked in a fixed priority order, so the first
//! category claiming a suffix wins.
//!
//! # Examples
//!
//! ```
//! use filemover::file_category::{Category, ExtensionTable};
//!
//! let table = ExtensionTable::default();
//! assert_eq!(table.classify("song.mp3"), Category::Audio);
//! assert_eq!(table.classify("SONG.MP3"), Category::Audio);
//! assert_eq!(table.classify("notes"), Category::General);
//! ```

/// A destination bucket for organized files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Audio files (MP3, WAV, FLAC, etc.)
    Audio,
    /// Image files (JPG, PNG, HEIC, etc.)
    Pictures,
    /// Text and word-processor documents (DOCX, DOC, TXT)
    Documents,
    /// Slide decks (PPTX, PPT)
    Presentations,
    /// PDFs and e-books (PDF, EPUB, MOBI, etc.)
    PdfLike,
    /// Archives and disk images (ZIP, RAR, ISO, etc.)
    Archives,
    /// Video files (MP4, MKV, AVI, etc.)
    Video,
    /// Anything no other category claims
    General,
}

impl Category {
    /// Categories in the order the classifier tests them. `General` is the
    /// fallback and never appears here.
    pub const PRIORITY: [Category; 7] = [
        Category::Audio,
        Category::Pictures,
        Category::Archives,
        Category::Documents,
        Category::Presentations,
        Category::PdfLike,
        Category::Video,
    ];

    /// Every category, fallback included.
    pub const ALL: [Category; 8] = [
        Category::Audio,
        Category::Pictures,
        Category::Archives,
        Category::Documents,
        Category::Presentations,
        Category::PdfLike,
        Category::Video,
        Category::General,
    ];

    /// Path components of this category's directory, relative to the
    /// destination root. `General` files land in the root itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use filemover::file_category::Category;
    ///
    /// assert_eq!(Category::Audio.dir_components(), &["Music"]);
    /// assert_eq!(Category::PdfLike.dir_components(), &["Docs", "PDFs"]);
    /// assert!(Category::General.dir_components().is_empty());
    /// ```
    pub fn dir_components(&self) -> &'static [&'static str] {
        match self {
            Category::Audio => &["Music"],
            Category::Pictures => &["Pictures"],
            Category::Documents => &["Docs"],
            Category::Presentations => &["Docs", "PowerPoints"],
            Category::PdfLike => &["Docs", "PDFs"],
            Category::Archives => &["ZipFiles"],
            Category::Video => &["video"],
            Category::General => &[],
        }
    }

    /// Relative directory as a display string, `.` for the root.
    pub fn dir_label(&self) -> String {
        let components = self.dir_components();
        if components.is_empty() {
            ".".to_string()
        } else {
            components.join("/")
        }
    }

    /// Key naming this category in configuration files.
    pub fn config_key(&self) -> &'static str {
        match self {
            Category::Audio => "audio",
            Category::Pictures => "pictures",
            Category::Documents => "documents",
            Category::Presentations => "presentations",
            Category::PdfLike => "pdf_like",
            Category::Archives => "archives",
            Category::Video => "video",
            Category::General => "general",
        }
    }
}

/// Lower-cases an extension and gives it a leading `.`.
///
/// Returns `None` for input that names no extension at all (empty, only
/// whitespace, or a bare dot).
///
/// ```
/// use filemover::file_category::normalize_extension;
///
/// assert_eq!(normalize_extension("MP3"), Some(".mp3".to_string()));
/// assert_eq!(normalize_extension(".Flac"), Some(".flac".to_string()));
/// assert_eq!(normalize_extension("."), None);
/// ```
pub fn normalize_extension(ext: &str) -> Option<String> {
    let trimmed = ext.trim();
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if bare.is_empty() {
        return None;
    }
    Some(format!(".{}", bare.to_lowercase()))
}

/// The extension registry: an ordered table of category to suffixes.
///
/// The table is an ordinary value. `ExtensionTable::default()` carries the
/// standard registry; configuration can replace any category's list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionTable {
    entries: Vec<(Category, Vec<String>)>,
}

impl ExtensionTable {
    /// Creates a table in which no category claims any extension.
    pub fn empty() -> Self {
        Self {
            entries: Category::PRIORITY
                .iter()
                .map(|category| (*category, Vec::new()))
                .collect(),
        }
    }

    /// Creates a table with the standard registry.
    pub fn new() -> Self {
        let mut table = Self::empty();
        table.populate_standard_mappings();
        table
    }

    fn populate_standard_mappings(&mut self) {
        self.set_extensions(
            Category::Audio,
            [
                ".mp3", ".wav", ".ogg", ".flac", ".aac", ".wma", ".m4a", ".ape", ".pcm", ".aiff",
                ".au", ".midi", ".ac3",
            ],
        );
        self.set_extensions(
            Category::Pictures,
            [
                ".jpg", ".png", ".gif", ".bmp", ".svg", ".jpeg", ".heic", ".tif", ".tiff", ".webp",
                ".ico",
            ],
        );
        self.set_extensions(
            Category::Archives,
            [".zip", ".rar", ".tar", ".gz", ".z", ".iso"],
        );
        self.set_extensions(Category::Documents, [".docx", ".doc", ".txt"]);
        self.set_extensions(Category::Presentations, [".pptx", ".ppt"]);
        self.set_extensions(
            Category::PdfLike,
            [".pdf", ".epub", ".mobi", ".azw", ".djvu", ".xps"],
        );
        self.set_extensions(
            Category::Video,
            [
                ".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm", ".mpeg", ".3gp", ".m4v",
                ".rmvb", ".ts", ".vob", ".ogv", ".mpg", ".m2ts", ".divx",
            ],
        );
    }

    fn slot_mut(&mut self, category: Category) -> Option<&mut Vec<String>> {
        self.entries
            .iter_mut()
            .find(|(c, _)| *c == category)
            .map(|(_, exts)| exts)
    }

    /// Replaces the extensions a category claims.
    ///
    /// Entries are normalized with [`normalize_extension`]; entries naming no
    /// extension are dropped. `General` owns no extensions, so setting it has
    /// no effect.
    pub fn set_extensions<I, S>(&mut self, category: Category, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(slot) = self.slot_mut(category) {
            slot.clear();
            for ext in extensions {
                if let Some(normalized) = normalize_extension(ext.as_ref())
                    && !slot.contains(&normalized)
                {
                    slot.push(normalized);
                }
            }
        }
    }

    /// Adds one extension to a category.
    pub fn add_extension(&mut self, category: Category, ext: &str) {
        if let Some(slot) = self.slot_mut(category)
            && let Some(normalized) = normalize_extension(ext)
            && !slot.contains(&normalized)
        {
            slot.push(normalized);
        }
    }

    /// Extensions claimed by a category, in registration order.
    pub fn extensions(&self, category: Category) -> &[String] {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, exts)| exts.as_slice())
            .unwrap_or(&[])
    }

    /// Classifies a file name by its suffix.
    ///
    /// The name is lower-cased and tested against each category in
    /// [`Category::PRIORITY`] order; the first category owning a matching
    /// suffix wins. Names matching nothing, including empty names and names
    /// without a dot, are `General`.
    ///
    /// # Examples
    ///
    /// ```
    /// use filemover::file_category::{Category, ExtensionTable};
    ///
    /// let table = ExtensionTable::default();
    /// assert_eq!(table.classify("report.docx"), Category::Documents);
    /// assert_eq!(table.classify("deck.PPTX"), Category::Presentations);
    /// assert_eq!(table.classify("archive.xyz"), Category::General);
    /// assert_eq!(table.classify(""), Category::General);
    /// ```
    pub fn classify(&self, file_name: &str) -> Category {
        let lowered = file_name.to_lowercase();
        self.entries
            .iter()
            .find(|(_, exts)| exts.iter().any(|ext| lowered.ends_with(ext.as_str())))
            .map(|(category, _)| *category)
            .unwrap_or(Category::General)
    }
}

impl Default for ExtensionTable {
    fn default() -> Self {
        Self::new()
    }
}
