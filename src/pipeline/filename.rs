//! Filename policy: turn extracted page text into a safe, unique file name.
//!
//! Offsets are counted in `char`s, both here and in calibration, so an
//! offset suggested by [`first_alphabetic_index`] can be fed straight back
//! into [`trim_to_newline`].
//!
//! [`resolve_collision`] asks the filesystem, not a counter, whether a name
//! is taken. It has to be called right before each page is written so that
//! every page sees the files written before it.

use std::path::{Path, PathBuf};

/// Char index of the first alphabetic character in `text`.
pub fn first_alphabetic_index(text: &str) -> Option<usize> {
    text.chars().position(char::is_alphabetic)
}

/// Text from char `offset` up to (not including) the first newline after it.
///
/// An offset past the end of `text` yields an empty string.
pub fn trim_to_newline(text: &str, offset: usize) -> &str {
    let start = text
        .char_indices()
        .nth(offset)
        .map_or(text.len(), |(byte, _)| byte);
    let rest = &text[start..];
    rest.split('\n').next().unwrap_or(rest)
}

/// Make `raw` usable as a file stem.
///
/// Trims surrounding whitespace, turns spaces into underscores and drops
/// every `/`. The result may be empty.
pub fn sanitize(raw: &str) -> String {
    raw.trim().replace(' ', "_").replace('/', "")
}

/// `directory/base_name.extension`
pub fn desired_path(directory: &Path, base_name: &str, extension: &str) -> PathBuf {
    directory.join(format!("{base_name}.{extension}"))
}

/// Return `desired` if nothing exists there, otherwise the first free
/// `base_name_N.extension` in `directory` for N = 1, 2, ….
pub fn resolve_collision(
    desired: &Path,
    directory: &Path,
    base_name: &str,
    extension: &str,
) -> PathBuf {
    if !desired.exists() {
        return desired.to_path_buf();
    }

    let mut n: u64 = 1;
    loop {
        let candidate = directory.join(format!("{base_name}_{n}.{extension}"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
