//! Extension-based file categorization.
//!
//! Maps a file name's extension to one of a small set of category folders
//! (`Images`, `Documents`, ...). Anything not in the table lands in `Others`.
//!
//! # Examples
//!
//! ```
//! use file_sorter::file_category::{Category, FileMapper};
//!
//! let mapper = FileMapper::default();
//! assert_eq!(mapper.category_for("photo.PNG"), Category::Images);
//! assert_eq!(mapper.category_for("notes.txt"), Category::Text);
//! assert_eq!(mapper.category_for("archive.zip"), Category::Others);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A destination category. The variant name doubles as the folder name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Image files (PNG, JPG, GIF)
    Images,
    /// Document files (PDF, DOCX)
    Documents,
    /// Plain text files
    Text,
    /// Audio files
    Music,
    /// Video files
    Videos,
    /// Fallback for unmapped or missing extensions
    Others,
}

impl Category {
    /// Every category, in folder-listing order.
    pub const ALL: [Category; 6] = [
        Category::Images,
        Category::Documents,
        Category::Text,
        Category::Music,
        Category::Videos,
        Category::Others,
    ];

    /// Returns the directory name for this category.
    ///
    /// ```
    /// use file_sorter::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "Images");
    /// assert_eq!(Category::Others.dir_name(), "Others");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Documents => "Documents",
            Category::Text => "Text",
            Category::Music => "Music",
            Category::Videos => "Videos",
            Category::Others => "Others",
        }
    }

    /// Looks a category up by its directory name.
    pub fn from_dir_name(name: &str) -> Option<Category> {
        Self::ALL.into_iter().find(|c| c.dir_name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Splits a file name into `(base, extension)`.
///
/// The extension runs from the last `.` to the end and keeps its case.
/// Leading dots belong to the base, so `.bashrc` has no extension.
///
/// ```
/// use file_sorter::file_category::split_extension;
///
/// assert_eq!(split_extension("report.final.PDF"), ("report.final", ".PDF"));
/// assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
/// assert_eq!(split_extension("README"), ("README", ""));
/// ```
pub fn split_extension(file_name: &str) -> (&str, &str) {
    let leading_dots = file_name.len() - file_name.trim_start_matches('.').len();
    match file_name[leading_dots..].rfind('.') {
        Some(idx) => file_name.split_at(leading_dots + idx),
        None => (file_name, ""),
    }
}

/// Returns the lower-cased extension of `file_name`, including the dot.
pub fn extension_of(file_name: &str) -> String {
    split_extension(file_name).1.to_lowercase()
}

/// Maps file extensions to categories.
#[derive(Debug, Clone)]
pub struct FileMapper {
    extension_map: HashMap<String, Category>,
}

impl FileMapper {
    /// Creates a mapper holding the built-in extension table.
    pub fn new() -> Self {
        let mut mapper = Self {
            extension_map: HashMap::new(),
        };
        mapper.populate_standard_mappings();
        mapper
    }

    fn populate_standard_mappings(&mut self) {
        for ext in [".jpg", ".jpeg", ".png", ".gif"] {
            self.add_extension_mapping(ext, Category::Images);
        }
        self.add_extension_mapping(".pdf", Category::Documents);
        self.add_extension_mapping(".docx", Category::Documents);
        self.add_extension_mapping(".txt", Category::Text);
        self.add_extension_mapping(".mp3", Category::Music);
        self.add_extension_mapping(".mp4", Category::Videos);
        self.add_extension_mapping(".avi", Category::Videos);
    }

    /// Adds or replaces an extension mapping.
    ///
    /// The leading dot is optional and matching is case-insensitive, so
    /// `"webp"`, `".webp"` and `".WEBP"` all register the same key.
    pub fn add_extension_mapping(&mut self, ext: &str, category: Category) {
        let ext = ext.trim().to_lowercase();
        let key = if ext.starts_with('.') {
            ext
        } else {
            format!(".{}", ext)
        };
        self.extension_map.insert(key, category);
    }

    /// Maps an extension (with leading dot) to a category, if known.
    pub fn extension_to_category(&self, ext: &str) -> Option<Category> {
        self.extension_map.get(&ext.to_lowercase()).copied()
    }

    /// Returns the category a file named `file_name` belongs to.
    ///
    /// Never fails: unknown and missing extensions map to [`Category::Others`].
    pub fn category_for(&self, file_name: &str) -> Category {
        self.extension_to_category(&extension_of(file_name))
            .unwrap_or(Category::Others)
    }
}

impl Default for FileMapper {
    fn default() -> Self {
        Self::new()
    }
}
