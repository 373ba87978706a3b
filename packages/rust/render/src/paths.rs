//! Output path computation for rendered pages.

use std::path::{Path, PathBuf};

/// Namespace used when a plugin name has fewer than two dot-separated
/// components.
pub const DEFAULT_NAMESPACE: &str = "core.builtin";

/// Filename extension for rendered pages.
pub const PAGE_EXTENSION: &str = "rst";

/// Split a fully qualified plugin name into its collection namespace and
/// page stem.
///
/// The namespace is the first two dot-separated components of the name;
/// anything after them is the stem. Names with fewer than two components
/// fall back to [`DEFAULT_NAMESPACE`] with the whole name as the stem.
pub fn split_namespace(name: &str) -> (String, String) {
    let mut parts = name.splitn(3, '.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(namespace), Some(collection), Some(stem)) => {
            (format!("{namespace}.{collection}"), stem.to_string())
        }
        (Some(namespace), Some(collection), None) => {
            (format!("{namespace}.{collection}"), collection.to_string())
        }
        _ => (DEFAULT_NAMESPACE.to_string(), name.to_string()),
    }
}

/// Compute the output file path for one plugin page:
/// `<dest_root>/collections/<namespace>/<stem>_<kind>.rst`.
///
/// The path depends only on the identity and destination root. Two
/// distinct plugins that map to the same path race on the final write and
/// the last writer wins.
pub fn page_path(dest_root: &Path, kind: &str, name: &str) -> PathBuf {
    let (namespace, stem) = split_namespace(name);
    dest_root
        .join("collections")
        .join(namespace)
        .join(format!("{stem}_{kind}.{PAGE_EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_qualified_name_splits_into_namespace_and_stem() {
        assert_eq!(
            split_namespace("ns.coll.foo"),
            ("ns.coll".to_string(), "foo".to_string())
        );
    }

    #[test]
    fn deep_names_keep_their_tail_intact() {
        assert_eq!(
            split_namespace("ns.coll.sub.foo"),
            ("ns.coll".to_string(), "sub.foo".to_string())
        );
    }

    #[test]
    fn short_names_use_the_default_namespace() {
        assert_eq!(
            split_namespace("ping"),
            (DEFAULT_NAMESPACE.to_string(), "ping".to_string())
        );
    }

    #[test]
    fn page_path_is_deterministic() {
        let path = page_path(Path::new("/dest"), "module", "ns.coll.foo");
        assert_eq!(
            path,
            Path::new("/dest/collections/ns.coll/foo_module.rst")
        );
    }

    #[test]
    fn page_path_for_short_name() {
        let path = page_path(Path::new("/dest"), "lookup", "env");
        assert_eq!(
            path,
            Path::new("/dest/collections/core.builtin/env_lookup.rst")
        );
    }
}
