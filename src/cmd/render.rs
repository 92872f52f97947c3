//! Headless render command: `issueboard render`.

use std::path::Path;

use anyhow::{Context, Result};

use issueboard::config::AppConfig;

pub async fn cmd_render(
    config: &AppConfig,
    route: &str,
    output: Option<&Path>,
    page: bool,
) -> Result<()> {
    let mut app = super::live_app(config)?;
    app.navigate(route)
        .await
        .with_context(|| format!("Failed to render route '{}'", route))?;

    let html = if page {
        app.page_html()?
    } else {
        app.content_html()
    };

    match output {
        Some(path) => {
            std::fs::write(path, &html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", html),
    }
    Ok(())
}
