//! CV file checks
//!
//! Runs on every pick or drop, before the file is attached to the form.

use crate::config::FileRules;
use crate::error::FileRejection;

/// Extensions the analysis endpoint can extract text from
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "txt"];

/// 10 MiB, matching the server's request body limit
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Name and size of a picked file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Lowercased text after the last dot, or the whole name without one
    pub fn extension(&self) -> String {
        self.name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

/// What the file display shows after an accepted pick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub name: String,
    /// Human readable size, e.g. "1.5 KB"
    pub size_label: String,
}

/// Check a picked file against the configured rules
pub fn check_file(file: &SelectedFile, rules: &FileRules) -> Result<FileSummary, FileRejection> {
    let extension = file.extension();
    if !rules
        .allowed_extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
    {
        return Err(FileRejection::UnsupportedType { extension });
    }

    if file.size > rules.max_size_bytes {
        return Err(FileRejection::TooLarge {
            size: file.size,
            max: rules.max_size_bytes,
        });
    }

    Ok(FileSummary {
        name: file.name.clone(),
        size_label: format_file_size(file.size),
    })
}

/// Format a byte count with binary units, at most two decimals
///
/// ```
/// use cvmatch_core::file_check::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes;
    while scaled >= 1024 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024;
        unit += 1;
    }

    // Ties round up, not to even
    let value = bytes as f64 / 1024f64.powi(unit as i32);
    let rounded = format!("{:.2}", (value * 100.0).round() / 100.0);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}
