//! Results handed back to the caller.
//!
//! Only these outlive a pipeline run; the caller persists the paths.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output of [`crate::calibrate()`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Text extracted from page 1, unmodified.
    pub full_text: String,
    /// Suggested name offset: char index of the first alphabetic character
    /// in `full_text`. Callers may override it before splitting.
    pub auto_offset: usize,
    /// PNG preview of page 1. Owned by the caller; never cleaned up here.
    pub preview_image_path: PathBuf,
}

impl CalibrationResult {
    /// `full_text` from the suggested offset on, for showing a human where
    /// the name is expected to start.
    pub fn text_from_offset(&self) -> &str {
        let start = self
            .full_text
            .char_indices()
            .nth(self.auto_offset)
            .map_or(self.full_text.len(), |(byte, _)| byte);
        &self.full_text[start..]
    }
}

/// One page of a finished split job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedPage {
    /// 0-based index in the source document.
    pub page_index: usize,
    /// Name derived from the page text, before collision numbering.
    pub sanitized_name: String,
    /// File name inside the archive (`<name>[_N].pdf`).
    pub file_name: String,
}

/// Output of [`crate::split()`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitArchive {
    /// The ZIP archive. Owned by the caller.
    pub path: PathBuf,
    /// One entry per source page, in page order.
    pub pages: Vec<NamedPage>,
}

impl SplitArchive {
    pub fn entry_count(&self) -> usize {
        self.pages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_from_offset_slices_by_char() {
        let r = CalibrationResult {
            full_text: "\n\n\n \nIbrahim\n".into(),
            auto_offset: 5,
            preview_image_path: PathBuf::from("p.png"),
        };
        assert_eq!(r.text_from_offset(), "Ibrahim\n");
    }

    #[test]
    fn split_archive_serialises_pages() {
        let a = SplitArchive {
            path: PathBuf::from("/m/x.zip"),
            pages: vec![NamedPage {
                page_index: 0,
                sanitized_name: "Ibrahim".into(),
                file_name: "Ibrahim.pdf".into(),
            }],
        };
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"file_name\":\"Ibrahim.pdf\""));
        assert_eq!(a.entry_count(), 1);
    }
}
