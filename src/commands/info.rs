use anyhow::Result;

use crate::config::Config;
use crate::package::PackageInfo;
use crate::runtime::Runtime;

use super::open;

/// Show registry information about a package
#[tracing::instrument(skip(config))]
pub async fn info<R: Runtime + 'static>(config: Config<R>, name: &str) -> Result<()> {
    let manager = open(&config, false).await?;
    let info = manager.info(name).await?;
    for line in render(&info) {
        println!("{}", line);
    }
    Ok(())
}

fn render(info: &PackageInfo) -> Vec<String> {
    let mut lines = vec![format!("Package: {}", info.name)];
    if let Some(latest) = &info.latest_version {
        lines.push(format!("Latest version: {}", latest));
    }
    if let Some(description) = &info.description {
        lines.push(format!("Description: {}", description));
    }
    if let Some(homepage) = &info.homepage {
        lines.push(format!("Homepage: {}", homepage));
    }
    if !info.keywords.is_empty() {
        lines.push(format!("Keywords: {}", info.keywords.join(", ")));
    }
    if !info.dependencies.is_empty() {
        lines.push(format!("Dependencies: {}", info.dependencies.join(", ")));
    }
    if !info.versions.is_empty() {
        lines.push(String::new());
        lines.push("Available versions:".to_string());
        lines.extend(info.versions.iter().map(|v| format!("  {}", v)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_full() {
        let info = PackageInfo {
            name: "jquery".into(),
            latest_version: Some("2.1.4".into()),
            versions: vec!["2.1.4".into(), "2.1.3".into()],
            dependencies: vec![],
            keywords: vec!["dom".into(), "ajax".into()],
            homepage: Some("https://jquery.com".into()),
            description: None,
        };

        assert_eq!(
            render(&info),
            vec![
                "Package: jquery",
                "Latest version: 2.1.4",
                "Homepage: https://jquery.com",
                "Keywords: dom, ajax",
                "",
                "Available versions:",
                "  2.1.4",
                "  2.1.3",
            ]
        );
    }

    #[test]
    fn test_render_minimal() {
        let info = PackageInfo {
            name: "private-lib".into(),
            ..Default::default()
        };
        assert_eq!(render(&info), vec!["Package: private-lib"]);
    }
}
