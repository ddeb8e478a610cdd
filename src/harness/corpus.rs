//! Labeled test corpus layout: `{expected_label}_test_{W}x{H}.png`.

use crate::template::image_files;
use std::path::{Path, PathBuf};

/// Expected label for corpus files that do not follow the naming scheme.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Extension (case-insensitive) of corpus images.
pub const CORPUS_EXTENSION: &str = "png";

const TEST_MARKER: &str = "_test_";

/// Derives the expected label from a corpus file name.
///
/// `salmon_test_1920x1080.png` yields `salmon`; anything that does not end in
/// `_test_{W}x{H}.png` yields [`UNKNOWN_LABEL`].
pub fn expected_label(file_name: &str) -> String {
    parse_expected_label(file_name)
        .unwrap_or(UNKNOWN_LABEL)
        .to_owned()
}

fn parse_expected_label(file_name: &str) -> Option<&str> {
    let dot = file_name.len().checked_sub(CORPUS_EXTENSION.len() + 1)?;
    let stem = file_name.get(..dot)?;
    let ext = file_name.get(dot..)?.strip_prefix('.')?;
    if !ext.eq_ignore_ascii_case(CORPUS_EXTENSION) {
        return None;
    }
    let (label, dims) = stem.rsplit_once(TEST_MARKER)?;
    let (w, h) = dims.split_once('x')?;
    let is_number = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if label.is_empty() || !is_number(w) || !is_number(h) {
        return None;
    }
    Some(label)
}

/// Lists corpus images directly inside `dir`, sorted by path.
pub fn corpus_images(dir: &Path) -> Vec<PathBuf> {
    image_files(dir, CORPUS_EXTENSION)
}
