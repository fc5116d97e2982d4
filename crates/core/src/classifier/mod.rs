//! Filename classification into media families.
//!
//! Classification is a pure lookup of the lowercased extension against a
//! static table. Families are checked in a fixed order (document, image,
//! video, audio) and the first match wins.

mod types;

pub use types::MediaFamily;

/// Returns the lowercased extension of `filename` with a leading dot.
///
/// The extension is whatever follows the last `.`. A name without any dot
/// yields the whole lowercased name, so `"README"` becomes `".readme"`.
pub fn extension_of(filename: &str) -> String {
    let tail = filename.rsplit('.').next().unwrap_or(filename);
    format!(".{}", tail.to_lowercase())
}

/// Maps a filename to its media family.
pub fn classify(filename: &str) -> MediaFamily {
    let ext = extension_of(filename);
    MediaFamily::RECOGNIZED
        .into_iter()
        .find(|family| family.extensions().contains(&ext.as_str()))
        .unwrap_or(MediaFamily::Unsupported)
}

/// Every recognized family together with its extensions, in lookup order.
pub fn supported_extensions() -> Vec<(MediaFamily, &'static [&'static str])> {
    MediaFamily::RECOGNIZED
        .into_iter()
        .map(|family| (family, family.extensions()))
        .collect()
}
