use log::{debug, info};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{ManifestChanges, ManifestSnapshot, ManifestStore, pinned_range};
use crate::error::{EngineError, Result};
use crate::package::{DependencyType, Package};
use crate::runtime::Runtime;

pub const BOWER_JSON: &str = "bower.json";

const DEPENDENCIES: &str = "dependencies";
const DEV_DEPENDENCIES: &str = "devDependencies";

/// File-backed manifest store.
///
/// Unknown top-level fields of `bower.json` are preserved across rewrites.
pub struct BowerJsonStore<R: Runtime> {
    runtime: Arc<R>,
}

impl<R: Runtime> BowerJsonStore<R> {
    pub fn new(runtime: Arc<R>) -> Self {
        Self { runtime }
    }

    pub fn path(dir: &Path) -> PathBuf {
        dir.join(BOWER_JSON)
    }

    fn load_document(&self, path: &Path) -> Result<Map<String, Value>> {
        let content = self
            .runtime
            .read_to_string(path)
            .map_err(|e| EngineError::manifest(path, format!("{:#}", e)))?;
        match serde_json::from_str(&content) {
            Ok(Value::Object(doc)) => Ok(doc),
            Ok(_) => Err(EngineError::manifest(path, "expected a JSON object")),
            Err(e) => Err(EngineError::manifest(path, e)),
        }
    }

    /// Write to a temporary sibling then rename over the target.
    fn save_document(&self, path: &Path, doc: &Map<String, Value>) -> Result<()> {
        let mut content = serde_json::to_string_pretty(doc).map_err(|e| EngineError::manifest(path, e))?;
        content.push('\n');

        let tmp = path.with_extension("json.tmp");
        self.runtime
            .write(&tmp, content.as_bytes())
            .map_err(|e| EngineError::manifest(&tmp, format!("{:#}", e)))?;
        self.runtime
            .rename(&tmp, path)
            .map_err(|e| EngineError::manifest(path, format!("{:#}", e)))
    }
}

/// Remove `name` from the `key` section, if both exist. Key order is kept.
fn remove_from(doc: &mut Map<String, Value>, key: &str, name: &str) {
    if let Some(Value::Object(map)) = doc.get_mut(key) {
        map.shift_remove(name);
    }
}

/// The `key` section, created at the end of the document when absent.
fn section<'a>(doc: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let entry = doc
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    match entry {
        Value::Object(map) => map,
        _ => unreachable!("section was just replaced with an object"),
    }
}

impl<R: Runtime> ManifestStore for BowerJsonStore<R> {
    fn exists(&self, dir: &Path) -> bool {
        self.runtime.exists(&Self::path(dir))
    }

    #[tracing::instrument(skip(self))]
    fn read(&self, dir: &Path) -> Result<Option<ManifestSnapshot>> {
        let path = Self::path(dir);
        if !self.runtime.exists(&path) {
            debug!("No manifest at {:?}", path);
            return Ok(None);
        }
        let doc = self.load_document(&path)?;
        let snapshot: ManifestSnapshot =
            serde_json::from_value(Value::Object(doc)).map_err(|e| EngineError::manifest(&path, e))?;
        Ok(Some(snapshot))
    }

    #[tracing::instrument(skip(self, changes))]
    fn write(&self, dir: &Path, changes: &ManifestChanges) -> Result<()> {
        let path = Self::path(dir);
        if !self.runtime.exists(&path) {
            return Err(EngineError::NoManifest);
        }
        let mut doc = self.load_document(&path)?;

        for name in &changes.remove {
            remove_from(&mut doc, DEPENDENCIES, name);
            remove_from(&mut doc, DEV_DEPENDENCIES, name);
        }
        for (name, range) in &changes.add_production {
            remove_from(&mut doc, DEV_DEPENDENCIES, name);
            section(&mut doc, DEPENDENCIES).insert(name.clone(), Value::String(range.clone()));
        }
        for (name, range) in &changes.add_development {
            remove_from(&mut doc, DEPENDENCIES, name);
            section(&mut doc, DEV_DEPENDENCIES).insert(name.clone(), Value::String(range.clone()));
        }

        self.save_document(&path, &doc)?;
        debug!(
            "Updated {:?}: +{} -{}",
            path,
            changes.add_production.len() + changes.add_development.len(),
            changes.remove.len()
        );
        Ok(())
    }

    #[tracing::instrument(skip(self, packages))]
    fn create(&self, dir: &Path, name: &str, packages: &[Package]) -> Result<()> {
        let path = Self::path(dir);
        if self.runtime.exists(&path) {
            return Err(EngineError::manifest(&path, "already exists"));
        }

        let mut doc = Map::new();
        doc.insert("name".into(), Value::String(name.to_string()));
        section(&mut doc, DEPENDENCIES);

        for pkg in packages.iter().filter(|p| p.is_installed() && p.is_project_dependency()) {
            let key = match pkg.dependency_type() {
                DependencyType::Development => DEV_DEPENDENCIES,
                _ => DEPENDENCIES,
            };
            section(&mut doc, key).insert(pkg.name().to_string(), Value::String(pinned_range(pkg)));
        }

        self.save_document(&path, &doc)?;
        info!("Created {:?}", path);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn delete(&self, dir: &Path) -> Result<()> {
        let path = Self::path(dir);
        self.runtime
            .remove_file(&path)
            .map_err(|e| EngineError::manifest(&path, format!("{:#}", e)))
    }
}
