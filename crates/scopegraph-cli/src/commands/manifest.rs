// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Project manifest parsing.
//!
//! An optional `scopegraph.toml` configures resolution and declares records
//! that live outside the analysed units:
//!
//! ```toml
//! [resolve]
//! report_unresolved = true
//!
//! [[external]]
//! name = "java.lang.Object"
//!
//! [[external]]
//! name = "java.awt.Point"
//! superclass = "java.lang.Object"
//! fields = [
//!     { name = "x", type = "int" },
//!     { name = "ORIGIN", type = "java.awt.Point", static = true },
//! ]
//! ```
//!
//! An `[[external]]` entry without `fields` is opaque: member lookups that
//! reach it stay unresolved.

use camino::Utf8Path;
use miette::{Context, IntoDiagnostic, Result};
use scopegraph_core::semantic_analysis::{ExternalRecord, ResolveOptions};
use serde::Deserialize;
use std::fs;

/// File name looked up in the working directory when no path is given.
pub const MANIFEST_FILE: &str = "scopegraph.toml";

/// The top-level manifest structure parsed from `scopegraph.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// The `[resolve]` section.
    #[serde(default)]
    pub resolve: ResolveOptions,
    /// The `[[external]]` entries.
    #[serde(default)]
    pub external: Vec<ExternalRecord>,
}

/// Parse a `scopegraph.toml` manifest file.
///
/// Returns an error if the file cannot be read or contains invalid TOML or
/// unknown keys.
pub fn parse_manifest(path: &Utf8Path) -> Result<Manifest> {
    let content = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read manifest '{path}'"))?;

    toml::from_str(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to parse manifest '{path}'"))
}

/// Look for `scopegraph.toml` in `dir` and parse it if found.
///
/// Returns `None` if no manifest file exists.
pub fn find_manifest(dir: &Utf8Path) -> Result<Option<Manifest>> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if manifest_path
        .try_exists()
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to stat manifest '{manifest_path}'"))?
    {
        parse_manifest(&manifest_path).map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn write_manifest(dir: &TempDir, content: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::write(path.join(MANIFEST_FILE), content).unwrap();
        path
    }

    #[test]
    fn test_parse_full_manifest() {
        let temp = TempDir::new().unwrap();
        let path = write_manifest(
            &temp,
            r#"
[resolve]
report_ambiguous_shadows = false
report_unresolved = true

[[external]]
name = "java.lang.Object"

[[external]]
name = "java.awt.Point"
superclass = "java.lang.Object"
fields = [
  { name = "x", type = "int" },
  { name = "ORIGIN", type = "java.awt.Point", static = true },
]
"#,
        );

        let manifest = parse_manifest(&path.join(MANIFEST_FILE)).unwrap();
        assert!(!manifest.resolve.report_ambiguous_shadows);
        assert!(manifest.resolve.report_unresolved);
        assert_eq!(manifest.external.len(), 2);
        assert!(manifest.external[0].fields.is_none());

        let point = &manifest.external[1];
        assert_eq!(point.superclass.as_deref(), Some("java.lang.Object"));
        let fields = point.fields.as_ref().unwrap();
        assert_eq!(fields[0].ty, "int");
        assert!(!fields[0].is_static);
        assert!(fields[1].is_static);
    }

    #[test]
    fn test_empty_manifest_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = write_manifest(&temp, "");

        let manifest = parse_manifest(&path.join(MANIFEST_FILE)).unwrap();
        assert_eq!(manifest.resolve, ResolveOptions::default());
        assert!(manifest.external.is_empty());
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_manifest(&temp, "[package]\nname = \"app\"\n");

        let err = parse_manifest(&path.join(MANIFEST_FILE)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse manifest"));
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_manifest(&temp, "[resolve]\nstrict = true\n");

        assert!(parse_manifest(&path.join(MANIFEST_FILE)).is_err());
    }

    #[test]
    fn test_find_manifest_missing() {
        let temp = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();

        assert!(find_manifest(&path).unwrap().is_none());
    }

    #[test]
    fn test_find_manifest_present() {
        let temp = TempDir::new().unwrap();
        let path = write_manifest(&temp, "[[external]]\nname = \"lib.Opaque\"\n");

        let manifest = find_manifest(&path).unwrap().unwrap();
        assert_eq!(manifest.external[0].name, "lib.Opaque");
    }
}
