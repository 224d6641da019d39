//! Bill file selection (extension filter only; content is never read).

use serde::Serialize;

/// Extensions accepted by the upload step, lowercase without the dot.
pub const SUPPORTED_EXTENSIONS: [&str; 7] = ["xlsx", "xls", "csv", "pdf", "jpg", "jpeg", "png"];

/// Whether `file_name` carries a supported extension (case-insensitive).
pub fn is_supported(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// A user's file selection split by the extension filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileSelection {
    pub accepted: Vec<String>,
    pub rejected: Vec<String>,
}

impl FileSelection {
    pub fn filter<I, S>(file_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::default();
        for name in file_names {
            let name = name.into();
            if is_supported(&name) {
                selection.accepted.push(name);
            } else {
                selection.rejected.push(name);
            }
        }
        selection
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}
