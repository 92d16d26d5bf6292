use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{EngineError, Result};

/// Registry information about a package, as reported by `bower info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub latest_version: Option<String>,
    /// Available versions, newest first.
    pub versions: Vec<String>,
    /// Dependency names of the latest version.
    pub dependencies: Vec<String>,
    pub keywords: Vec<String>,
    pub homepage: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    versions: Vec<String>,
    #[serde(default)]
    latest: Option<RawLatest>,
}

#[derive(Debug, Deserialize)]
struct RawLatest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl PackageInfo {
    /// Parse `bower info <name> --json` output. `requested` is used when the
    /// payload does not name the package.
    pub fn from_json(requested: &str, raw: &str) -> Result<Self> {
        let raw: RawInfo = serde_json::from_str(raw)
            .map_err(|e| EngineError::external("info", format!("unexpected output: {}", e)))?;

        let latest = raw.latest;
        let name = raw
            .name
            .or_else(|| latest.as_ref().and_then(|l| l.name.clone()))
            .unwrap_or_else(|| requested.to_string());

        Ok(match latest {
            Some(latest) => PackageInfo {
                name,
                latest_version: latest.version,
                versions: raw.versions,
                dependencies: latest.dependencies.into_keys().collect(),
                keywords: latest.keywords,
                homepage: latest.homepage,
                description: latest.description,
            },
            None => PackageInfo {
                name,
                latest_version: raw.versions.first().cloned(),
                versions: raw.versions,
                ..Default::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info() {
        let raw = r#"{
            "name": "angular-material",
            "versions": ["0.10.1", "0.10.0", "0.9.8"],
            "latest": {
                "name": "angular-material",
                "version": "0.10.1",
                "dependencies": { "angular": "^1.3.0", "angular-aria": "^1.3.0" },
                "keywords": ["material", "angular"],
                "homepage": "https://material.angularjs.org"
            }
        }"#;

        let info = PackageInfo::from_json("angular-material", raw).unwrap();
        assert_eq!(info.name, "angular-material");
        assert_eq!(info.latest_version.as_deref(), Some("0.10.1"));
        assert_eq!(info.versions.len(), 3);
        assert_eq!(info.dependencies, vec!["angular", "angular-aria"]);
        assert_eq!(info.keywords, vec!["material", "angular"]);
        assert_eq!(info.description, None);
    }

    #[test]
    fn test_parse_info_without_latest() {
        let raw = r#"{ "versions": ["1.1.0", "1.0.0"] }"#;

        let info = PackageInfo::from_json("tiny", raw).unwrap();
        assert_eq!(info.name, "tiny");
        assert_eq!(info.latest_version.as_deref(), Some("1.1.0"));
        assert!(info.dependencies.is_empty());
    }

    #[test]
    fn test_parse_info_rejects_garbage() {
        let err = PackageInfo::from_json("x", "not json").unwrap_err();
        assert!(matches!(err, EngineError::ExternalTool { .. }));
    }
}
