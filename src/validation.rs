//! Local prechecks applied to a submission before any network call

use crate::error::{AnalysisClientError, Result};
use crate::types::TextFile;
use std::path::Path;

/// Per-file size ceiling for submissions (10 MiB)
pub const MAX_FILE_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Validate a submission's file list
///
/// Rejects an empty list, files over the size ceiling, unnamed files,
/// and files that are neither named `*.txt` nor valid UTF-8 text. Fails
/// on the first offending file so the error names it.
pub fn validate_files(files: &[TextFile]) -> Result<()> {
    if files.is_empty() {
        return Err(AnalysisClientError::validation("no files provided"));
    }

    for file in files {
        if file.name.trim().is_empty() {
            return Err(AnalysisClientError::validation(
                "file name must not be empty",
            ));
        }
        if file.size() > MAX_FILE_SIZE_BYTES {
            return Err(AnalysisClientError::validation(format!(
                "file '{}' exceeds the {} MiB per-file limit",
                file.name,
                MAX_FILE_SIZE_BYTES / (1024 * 1024)
            )));
        }
        if !is_text_file(file) {
            return Err(AnalysisClientError::validation(format!(
                "file '{}' is not a text file",
                file.name
            )));
        }
    }

    Ok(())
}

/// A file qualifies as text by its `.txt` extension or by its content
fn is_text_file(file: &TextFile) -> bool {
    has_txt_extension(&file.name) || std::str::from_utf8(&file.bytes).is_ok()
}

fn has_txt_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}
