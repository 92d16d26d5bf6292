use anyhow::Result;
use log::debug;

use crate::client::InstallRequest;
use crate::config::Config;
use crate::package::Package;
use crate::project::ProjectManager;
use crate::runtime::Runtime;

use super::list::describe;
use super::open;

/// Install `specs` (`name` or `name#range`) and declare them in bower.json
/// when it exists.
#[tracing::instrument(skip(config))]
pub async fn install<R: Runtime + 'static>(
    config: Config<R>,
    specs: &[String],
    save_dev: bool,
) -> Result<()> {
    let manager = open(&config, false).await?;
    for line in run_install(&manager, specs, save_dev).await? {
        println!("{}", line);
    }
    Ok(())
}

async fn run_install(
    manager: &ProjectManager,
    specs: &[String],
    save_dev: bool,
) -> Result<Vec<String>> {
    let requests: Vec<InstallRequest> = specs
        .iter()
        .map(|s| InstallRequest::parse(s, save_dev))
        .collect();
    debug!("Install requests: {:?}", requests);

    let (installed, updated) = manager.install_packages(&requests).await?;
    let mut lines = prefixed("Installed", &installed);
    lines.extend(prefixed("Updated", &updated));
    if lines.is_empty() {
        lines.push("Nothing to install.".to_string());
    }
    Ok(lines)
}

/// Uninstall `names` and drop them from bower.json.
#[tracing::instrument(skip(config))]
pub async fn uninstall<R: Runtime + 'static>(config: Config<R>, names: &[String]) -> Result<()> {
    let manager = open(&config, false).await?;
    let removed = manager.uninstall_packages(names).await?;
    if removed.is_empty() {
        println!("Nothing to uninstall.");
    }
    for pkg in &removed {
        println!("Uninstalled {}", pkg.name());
    }
    Ok(())
}

/// Update one installed package within its declared range.
#[tracing::instrument(skip(config))]
pub async fn update<R: Runtime + 'static>(config: Config<R>, name: &str) -> Result<()> {
    let manager = open(&config, false).await?;
    let pkg = manager.update_package(name).await?;
    println!("Updated {}", describe(&pkg));
    Ok(())
}

fn prefixed(verb: &str, packages: &[Package]) -> Vec<String> {
    packages
        .iter()
        .map(|p| format!("{} {}", verb, describe(p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockPackageManagerClient;
    use crate::commands::test_support::open_with;
    use crate::manifest::MockManifestStore;
    use crate::test_utils::{listing_node, manifest, project_root};
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_run_install_reports_new_and_updated() {
        let mut client = MockPackageManagerClient::new();
        client
            .expect_list()
            .returning(|_, _| Ok(project_root(vec![listing_node("jquery", "2.1.3", vec![])])));
        client
            .expect_install()
            .withf(|_, requests| {
                requests.len() == 2
                    && requests[0] == InstallRequest::new("jquery", Some("2.1.4".into()), true)
                    && requests[1] == InstallRequest::new("mocha", None, true)
            })
            .returning(|_, _| {
                let mut nodes = BTreeMap::new();
                nodes.insert("jquery".to_string(), listing_node("jquery", "2.1.4", vec![]));
                nodes.insert("mocha".to_string(), listing_node("mocha", "2.2.5", vec![]));
                Ok(nodes)
            });
        let mut store = MockManifestStore::new();
        store.expect_read().returning(|_| Ok(None));
        let manager = open_with(client, store).await;

        let lines = run_install(
            &manager,
            &["jquery#2.1.4".to_string(), "mocha".to_string()],
            true,
        )
        .await
        .unwrap();

        assert_eq!(lines, vec!["Installed mocha 2.2.5 (dev)", "Updated jquery 2.1.4 (dev)"]);
    }

    #[tokio::test]
    async fn test_run_install_writes_manifest() {
        let mut client = MockPackageManagerClient::new();
        client.expect_list().returning(|_, _| Ok(project_root(vec![])));
        client.expect_install().returning(|_, _| {
            let mut nodes = BTreeMap::new();
            nodes.insert("lodash".to_string(), listing_node("lodash", "3.9.3", vec![]));
            Ok(nodes)
        });
        let mut store = MockManifestStore::new();
        store.expect_read().returning(|_| Ok(Some(manifest(&[], &[]))));
        store
            .expect_write()
            .withf(|_, changes| {
                changes.add_production.get("lodash").map(String::as_str) == Some("~3.9.3")
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let manager = open_with(client, store).await;

        let lines = run_install(&manager, &["lodash".to_string()], false)
            .await
            .unwrap();

        assert_eq!(lines, vec!["Installed lodash 3.9.3"]);
    }
}
