use indexmap::IndexMap;
use tracing::warn;

/// Insertion-ordered mapping: package name -> file names in listing order.
///
/// Package order is the order of first appearance in the listing; the root
/// page sorts names at render time. Per-package file order is whatever the
/// storage API returned.
pub type PackageIndex = IndexMap<String, Vec<String>>;

/// Group object keys of the form `<package>/<file>` into a package index.
///
/// Splits each key on the first `/`. Keys with an empty file part are
/// folder markers and are silently skipped, so a package only exists in the
/// index if it has at least one real file. Keys without a separator or with
/// an empty package part do not match the bucket layout and are skipped
/// with a warning.
pub fn build_index<I, S>(keys: I) -> PackageIndex
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut packages = PackageIndex::new();
    for key in keys {
        let key = key.as_ref();
        let Some((package, file)) = key.split_once('/') else {
            warn!(key, "Object key has no package separator, skipping");
            continue;
        };
        if package.is_empty() {
            warn!(key, "Object key has an empty package name, skipping");
            continue;
        }
        if file.is_empty() {
            // Folder marker, not a downloadable file.
            continue;
        }
        packages
            .entry(package.to_string())
            .or_insert_with(Vec::new)
            .push(file.to_string());
    }
    packages
}
