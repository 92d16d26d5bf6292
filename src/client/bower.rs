use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use super::{InstallRequest, PackageManagerClient};
use crate::error::{EngineError, Result};
use crate::package::{ListingNode, PackageInfo};
use crate::runtime::Runtime;

/// Runs the `bower` executable with JSON output.
pub struct BowerClient<R: Runtime> {
    runtime: Arc<R>,
    program: String,
}

impl<R: Runtime> BowerClient<R> {
    pub fn new(runtime: Arc<R>, program: impl Into<String>) -> Self {
        Self {
            runtime,
            program: program.into(),
        }
    }

    /// Run `bower <args> --json` in `cwd` and return stdout.
    async fn run(&self, operation: &str, cwd: &Path, args: Vec<String>) -> Result<String> {
        let mut args = args;
        args.push("--json".into());
        args.push("--config.interactive=false".into());

        debug!("Running {} {}", self.program, args.join(" "));
        let output = self
            .runtime
            .run_command(&self.program, &args, cwd)
            .await
            .map_err(|e| EngineError::external(operation, format!("{:#}", e)))?;

        if !output.success {
            return Err(EngineError::external(operation, output.failure_message()));
        }
        Ok(output.stdout)
    }

    fn parse_object(operation: &str, stdout: &str) -> Result<serde_json::Map<String, Value>> {
        if stdout.trim().is_empty() {
            return Ok(serde_json::Map::new());
        }
        match serde_json::from_str(stdout) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(EngineError::external(operation, "expected a JSON object")),
            Err(e) => Err(EngineError::external(operation, format!("unexpected output: {}", e))),
        }
    }
}

#[async_trait]
impl<R: Runtime> PackageManagerClient for BowerClient<R> {
    #[tracing::instrument(skip(self))]
    async fn list(&self, cwd: &Path, include_latest: bool) -> Result<ListingNode> {
        let mut args = vec!["list".to_string()];
        if !include_latest {
            args.push("--offline".into());
        }
        let stdout = self.run("list", cwd, args).await?;
        ListingNode::from_json(&stdout)
    }

    #[tracing::instrument(skip(self))]
    async fn install_declared(&self, cwd: &Path) -> Result<()> {
        info!("Installing declared dependencies in {:?}", cwd);
        self.run("install", cwd, vec!["install".into()]).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn prune(&self, cwd: &Path) -> Result<()> {
        info!("Pruning extraneous packages in {:?}", cwd);
        self.run("prune", cwd, vec!["prune".into()]).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, requests))]
    async fn install(
        &self,
        cwd: &Path,
        requests: &[InstallRequest],
    ) -> Result<BTreeMap<String, ListingNode>> {
        let mut args = vec!["install".to_string()];
        args.extend(requests.iter().map(ToString::to_string));

        let stdout = self.run("install", cwd, args).await?;
        let installed = Self::parse_object("install", &stdout)?;

        let mut nodes = BTreeMap::new();
        for (name, value) in installed {
            let node: ListingNode = serde_json::from_value(value)
                .map_err(|e| EngineError::MalformedListing(format!("{}: {}", name, e)))?;
            nodes.insert(name, node);
        }
        info!("Installed {} package(s)", nodes.len());
        Ok(nodes)
    }

    #[tracing::instrument(skip(self))]
    async fn uninstall(&self, cwd: &Path, names: &[String]) -> Result<Vec<String>> {
        let mut args = vec!["uninstall".to_string()];
        args.extend(names.iter().cloned());

        let stdout = self.run("uninstall", cwd, args).await?;
        let removed: Vec<String> = Self::parse_object("uninstall", &stdout)?
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        info!("Uninstalled {} package(s)", removed.len());
        Ok(removed)
    }

    #[tracing::instrument(skip(self))]
    async fn update(&self, cwd: &Path, name: &str) -> Result<()> {
        self.run("update", cwd, vec!["update".into(), name.to_string()])
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn info(&self, cwd: &Path, name: &str) -> Result<PackageInfo> {
        let stdout = self
            .run("info", cwd, vec!["info".into(), name.to_string()])
            .await?;
        PackageInfo::from_json(name, &stdout)
    }
}
