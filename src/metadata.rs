//! Metadata derived from path and filename conventions.
//!
//! Documents are organised as `<NN_Category_Name>/<optional year dir>/<file>.pdf`.
//! Everything here is pure and total.

use once_cell::sync::Lazy;
use regex::Regex;

// ASCII digits only; `\d` in `regex` also matches other Unicode decimal digits.
static NUMERIC_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+_").unwrap());
static YEAR_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}$").unwrap());
static FILENAME_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{4})-").unwrap());

const SEPARATOR: char = '_';

/// `"01_Badania_Krwi"` -> `"Badania Krwi"`. Inputs without a numeric prefix only
/// get their separators replaced.
pub fn derive_category_label(category: &str) -> String {
    NUMERIC_PREFIX
        .replace(category, "")
        .replace(SEPARATOR, " ")
}

/// First bare four-digit path segment wins; otherwise a leading `YYYY-` in the filename.
pub fn derive_year(relative_path: &str, filename: &str) -> Option<String> {
    relative_path
        .split('/')
        .find(|segment| YEAR_SEGMENT.is_match(segment))
        .map(str::to_string)
        .or_else(|| {
            FILENAME_YEAR
                .captures(filename)
                .map(|caps| caps[1].to_string())
        })
}

/// First segment of a `/`-separated relative path, or `""` for files at the root.
pub fn derive_category(relative_path: &str) -> &str {
    match relative_path.split_once('/') {
        Some((first, _)) => first,
        None => "",
    }
}

/// Base name of a `/`-separated relative path.
pub fn derive_filename(relative_path: &str) -> &str {
    relative_path.rsplit('/').next().unwrap_or(relative_path)
}
