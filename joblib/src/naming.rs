//! Naming of the asset a worker produces from its input.
//!
//! The worker writes its output next to the input, with `_Processed` spliced in
//! before the extension: `<id>.png` becomes `<id>_Processed.png`.

use crate::error::{JobError, Result};
use regex::Regex;
use std::sync::LazyLock;

const PROCESSED_SUFFIX: &str = "_Processed";

static IMAGE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png)$").expect("valid extension pattern"));

/// Derive the produced asset name for `input`.
///
/// Only `jpg`, `jpeg` and `png` (any case) are recognised; the extension keeps its
/// original case. Any other name is rejected with [`JobError::UnsupportedAsset`].
pub fn processed_name(input: &str) -> Result<String> {
    if !IMAGE_EXTENSION.is_match(input) {
        return Err(JobError::UnsupportedAsset(input.to_string()));
    }
    let replacement = format!("{PROCESSED_SUFFIX}.${{1}}");
    Ok(IMAGE_EXTENSION
        .replace(input, replacement.as_str())
        .into_owned())
}
