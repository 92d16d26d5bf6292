use anyhow::Result;
use log::debug;

use crate::config::Config;
use crate::package::{DependencyType, Package, PackageStatus};
use crate::project::ProjectManager;
use crate::runtime::Runtime;

use super::open;

/// List the project's packages. With `offline` the registry is not queried
/// for newer versions.
#[tracing::instrument(skip(config))]
pub async fn list<R: Runtime + 'static>(config: Config<R>, offline: bool) -> Result<()> {
    let manager = open(&config, !offline).await?;
    for line in run(&manager).await? {
        println!("{}", line);
    }
    Ok(())
}

/// Project packages first, then transitive ones.
async fn run(manager: &ProjectManager) -> Result<Vec<String>> {
    let packages = manager.packages().await?;
    debug!("Found {} package(s)", packages.len());

    if packages.is_empty() {
        return Ok(vec!["No packages installed.".to_string()]);
    }

    let (direct, transitive): (Vec<_>, Vec<_>) =
        packages.iter().partition(|p| p.is_project_dependency());
    Ok(direct
        .into_iter()
        .chain(transitive)
        .map(describe)
        .collect())
}

/// One line per package: name, installed version and any flags.
pub(crate) fn describe(pkg: &Package) -> String {
    let mut line = format!(
        "{} {}",
        pkg.name(),
        pkg.version().unwrap_or("(not installed)")
    );

    match pkg.dependency_type() {
        DependencyType::Development => line.push_str(" (dev)"),
        DependencyType::Production => {}
        DependencyType::Untracked if !pkg.is_project_dependency() => {
            line.push_str(" (transitive)")
        }
        DependencyType::Untracked => {}
    }

    match pkg.status() {
        PackageStatus::Missing => line.push_str(" [missing]"),
        PackageStatus::Extraneous => line.push_str(" [not tracked]"),
        PackageStatus::Installed | PackageStatus::Unknown => {}
    }

    if pkg.has_updates()
        && let Some(latest) = pkg.latest_version()
    {
        line.push_str(&format!(" (latest: {})", latest));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockPackageManagerClient;
    use crate::commands::test_support::open_with;
    use crate::manifest::MockManifestStore;
    use crate::test_utils::{listing_node, manifest, missing_node, project_root};

    #[test]
    fn test_describe_flags() {
        let mut dev = Package::new("mocha")
            .with_installed(Some("2.2.0".into()))
            .with_latest_version(Some("2.3.0".into()));
        dev.set_dependency_type(DependencyType::Development, Some("~2.2.0".into()));
        dev.mark_project_dependency(true);
        assert_eq!(describe(&dev), "mocha 2.2.0 (dev) (latest: 2.3.0)");

        let mut missing = Package::new("lodash");
        missing.set_dependency_type(DependencyType::Production, Some("*".into()));
        missing.mark_project_dependency(true);
        assert_eq!(describe(&missing), "lodash (not installed) [missing]");

        let mut extra = Package::new("zepto").with_installed(Some("1.1.6".into()));
        extra.mark_project_dependency(true);
        assert_eq!(describe(&extra), "zepto 1.1.6 [not tracked]");

        let nested = Package::new("sizzle").with_installed(Some("2.1.1".into()));
        assert_eq!(describe(&nested), "sizzle 2.1.1 (transitive)");
    }

    #[test]
    fn test_describe_hides_older_latest() {
        let pkg = Package::new("jquery")
            .with_installed(Some("2.1.4".into()))
            .with_latest_version(Some("2.1.3".into()));
        assert!(!describe(&pkg).contains("latest"));
    }

    #[tokio::test]
    async fn test_run_lists_direct_before_transitive() {
        let mut client = MockPackageManagerClient::new();
        client.expect_list().returning(|_, _| {
            Ok(project_root(vec![
                listing_node("bootstrap", "3.3.5", vec![listing_node("jquery", "2.1.4", vec![])]),
                missing_node("angular"),
            ]))
        });
        let mut store = MockManifestStore::new();
        store
            .expect_read()
            .returning(|_| Ok(Some(manifest(&[("angular", "*"), ("bootstrap", "~3.3.5")], &[]))));
        let manager = open_with(client, store).await;

        let lines = run(&manager).await.unwrap();

        assert_eq!(
            lines,
            vec![
                "angular (not installed) [missing]",
                "bootstrap 3.3.5",
                "jquery 2.1.4 (transitive)",
            ]
        );
    }

    #[tokio::test]
    async fn test_run_empty_project() {
        let mut client = MockPackageManagerClient::new();
        client.expect_list().returning(|_, _| Ok(project_root(vec![])));
        let mut store = MockManifestStore::new();
        store.expect_read().returning(|_| Ok(None));
        let manager = open_with(client, store).await;

        assert_eq!(run(&manager).await.unwrap(), vec!["No packages installed."]);
    }
}
