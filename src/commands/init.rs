use anyhow::{Result, bail};

use crate::config::Config;
use crate::manifest::BOWER_JSON;
use crate::runtime::Runtime;

use super::open;

/// Create bower.json declaring every installed project package
#[tracing::instrument(skip(config))]
pub async fn init<R: Runtime + 'static>(config: Config<R>) -> Result<()> {
    let manager = open(&config, false).await?;
    let dir = manager.working_dir().await?;
    if manager.collaborators().manifest.exists(&dir) {
        bail!("{} already exists in {}", BOWER_JSON, dir.display());
    }

    manager.create_manifest().await?;
    let declared = manager
        .with_state(|s| s.manifest().map(|m| m.declared().count()).unwrap_or(0))
        .await?;
    println!(
        "Created {} with {} dependencies",
        dir.join(BOWER_JSON).display(),
        declared
    );
    Ok(())
}
