//! Application metadata loaded from a manifest file.

#[cfg(feature = "config")]
use anyhow::{Context, Result};
#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "config")]
use std::fs;
#[cfg(feature = "config")]
use std::path::Path;

/// Name, version and links of the embedding application.
///
/// Shown by `--version` and at the bottom of the help text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
pub struct AppMetadata {
    /// Program name as typed by users.
    pub name: String,
    /// Version string.
    pub version: String,
    /// One-line description.
    #[cfg_attr(feature = "config", serde(default))]
    pub description: Option<String>,
    /// Home page URL.
    #[cfg_attr(feature = "config", serde(default))]
    pub homepage: Option<String>,
    /// Bug tracker URL.
    #[cfg_attr(feature = "config", serde(default))]
    pub bugs: Option<String>,
}

#[cfg(feature = "config")]
/// `bugs` in package.json is either a URL or `{ "url": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum BugsField {
    Url(String),
    Object { url: Option<String> },
}

#[cfg(feature = "config")]
#[derive(Deserialize)]
struct JsonManifest {
    name: String,
    version: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    bugs: Option<BugsField>,
}

impl AppMetadata {
    /// Metadata with only a name and a version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
            homepage: None,
            bugs: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the home page.
    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = Some(homepage.into());
        self
    }

    /// Set the bug tracker.
    pub fn with_bugs(mut self, bugs: impl Into<String>) -> Self {
        self.bugs = Some(bugs.into());
        self
    }

    #[cfg(feature = "config")]
    /// Parse TOML: the `[package]` table of a Cargo-style manifest, or a
    /// top-level table with the same keys.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let value: toml::Value = toml::from_str(content).context("Failed to parse TOML")?;
        let table = match value.get("package").cloned() {
            Some(package) => package,
            None => value,
        };
        // Cargo manifests have no `bugs`; issues live under `repository`.
        let repository = table
            .get("repository")
            .and_then(|r| r.as_str())
            .map(|r| format!("{}/issues", r.trim_end_matches('/')));

        let mut metadata = table
            .try_into::<AppMetadata>()
            .context("TOML manifest lacks a name or a version")?;
        if metadata.bugs.is_none() {
            metadata.bugs = repository;
        }
        Ok(metadata)
    }

    #[cfg(feature = "config")]
    /// Parse a package.json-style document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let manifest: JsonManifest =
            serde_json::from_str(content).context("Failed to parse JSON manifest")?;
        Ok(Self {
            name: manifest.name,
            version: manifest.version,
            description: manifest.description,
            homepage: manifest.homepage,
            bugs: manifest.bugs.and_then(|b| match b {
                BugsField::Url(url) => Some(url),
                BugsField::Object { url } => url,
            }),
        })
    }

    #[cfg(feature = "config")]
    /// Load from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read metadata file: {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("In {}", path.display()))
    }

    #[cfg(feature = "config")]
    /// Load from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read metadata file: {}", path.display()))?;
        Self::from_json_str(&content).with_context(|| format!("In {}", path.display()))
    }

    #[cfg(feature = "config")]
    /// Auto-detect format and load: `.json` as JSON, anything else as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Self::from_json_file(path),
            // TOML is the default format
            _ => Self::from_toml_file(path),
        }
    }
}

#[cfg(all(test, feature = "config"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_cargo_manifest() {
        let toml = r#"
            [package]
            name = "xpm"
            version = "0.5.0"
            description = "The xPack project manager"
            homepage = "https://xpack.github.io/xpm/"
            repository = "https://github.com/xpack/xpm/"

            [dependencies]
            cbk = "0.3"
        "#;

        let metadata = AppMetadata::from_toml_str(toml).unwrap();
        assert_eq!(metadata.name, "xpm");
        assert_eq!(metadata.version, "0.5.0");
        assert_eq!(
            metadata.homepage.as_deref(),
            Some("https://xpack.github.io/xpm/")
        );
        assert_eq!(
            metadata.bugs.as_deref(),
            Some("https://github.com/xpack/xpm/issues")
        );
    }

    #[test]
    fn test_parse_flat_toml() {
        let toml = r#"
            name = "tool"
            version = "1.2.3"
            bugs = "https://example.com/bugs"
        "#;
        let metadata = AppMetadata::from_toml_str(toml).unwrap();
        assert_eq!(metadata, AppMetadata::new("tool", "1.2.3").with_bugs("https://example.com/bugs"));
    }

    #[test]
    fn test_toml_without_version_fails() {
        assert!(AppMetadata::from_toml_str("[package]\nname = \"x\"\n").is_err());
    }

    #[test]
    fn test_parse_package_json() {
        let json = r#"{
            "name": "xpm",
            "version": "0.5.0",
            "homepage": "https://xpack.github.io/xpm/",
            "bugs": { "url": "https://github.com/xpack/xpm-js/issues/" }
        }"#;
        let metadata = AppMetadata::from_json_str(json).unwrap();
        assert_eq!(metadata.name, "xpm");
        assert_eq!(
            metadata.bugs.as_deref(),
            Some("https://github.com/xpack/xpm-js/issues/")
        );

        let json = r#"{ "name": "a", "version": "1", "bugs": "https://b" }"#;
        assert_eq!(
            AppMetadata::from_json_str(json).unwrap().bugs.as_deref(),
            Some("https://b")
        );
    }

    #[test]
    fn test_from_file_detects_format() {
        let dir = tempdir().unwrap();

        let toml_path = dir.path().join("Cargo.toml");
        fs::write(&toml_path, "[package]\nname = \"a\"\nversion = \"1.0.0\"\n").unwrap();
        assert_eq!(AppMetadata::from_file(&toml_path).unwrap().name, "a");

        let json_path = dir.path().join("package.json");
        fs::write(&json_path, r#"{ "name": "b", "version": "2.0.0" }"#).unwrap();
        assert_eq!(AppMetadata::from_file(&json_path).unwrap().version, "2.0.0");

        let other = dir.path().join("meta.conf");
        fs::write(&other, "name = \"c\"\nversion = \"3.0.0\"\n").unwrap();
        assert_eq!(AppMetadata::from_file(&other).unwrap().name, "c");

        let yaml_path = dir.path().join("meta.yaml");
        fs::write(&yaml_path, "name: c").unwrap();
        assert!(AppMetadata::from_file(&yaml_path).is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = AppMetadata::from_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("absent.toml"));
    }
}
