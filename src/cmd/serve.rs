//! Static asset server command: `issueboard serve`.

use std::path::PathBuf;

use anyhow::Result;

use issueboard::server::{ServerConfig, start_server};

pub async fn cmd_serve(dir: PathBuf, open: bool) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Directory {} does not exist", dir.display());
    }
    let config = ServerConfig::from_env(dir)?;

    if open {
        let url = format!("http://localhost:{}", config.port);
        tokio::spawn(async move {
            // Give the listener a moment to bind.
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            if let Err(e) = open::that(&url) {
                eprintln!("Failed to open browser: {}", e);
            }
        });
    }

    start_server(config).await
}
