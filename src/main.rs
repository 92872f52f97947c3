use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use issueboard::config::{AppConfig, CliOverrides};
use issueboard::logging::{self, LogFormat};

mod cmd;

#[derive(Parser)]
#[command(name = "issueboard")]
#[command(version, about = "Browse a GitHub repository's issues")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Repository to browse: owner/name or a GitHub URL
    #[arg(long, global = true)]
    pub repo: Option<String>,

    /// Request JSONP-enveloped responses (`callback=?`)
    #[arg(long, global = true)]
    pub jsonp: bool,

    /// Log output format: text or json
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the static browser build. The port comes from PORT (default 3000)
    Serve {
        /// Directory to serve
        #[arg(long, default_value = "public")]
        dir: PathBuf,

        /// Open the browser after the server starts
        #[arg(long)]
        open: bool,
    },
    /// Render a route headlessly once its data has loaded
    Render {
        /// Route fragment, e.g. `issues/2` or `issue/42`
        #[arg(default_value = "")]
        route: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit a complete HTML document instead of the content region
        #[arg(long)]
        page: bool,
    },
    /// Browse issues interactively in the terminal
    Browse {
        /// Route fragment to start from
        #[arg(default_value = "")]
        route: String,
    },
}

impl Cli {
    fn app_config(&self) -> Result<AppConfig> {
        let dir = std::env::current_dir().context("Failed to get current directory")?;
        AppConfig::load(
            &dir,
            &CliOverrides {
                repo: self.repo.clone(),
                jsonp: self.jsonp,
            },
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_format);

    match &cli.command {
        Commands::Serve { dir, open } => cmd::cmd_serve(dir.clone(), *open).await?,
        Commands::Render {
            route,
            output,
            page,
        } => {
            let config = cli.app_config()?;
            cmd::cmd_render(&config, route, output.as_deref(), *page).await?;
        }
        Commands::Browse { route } => {
            let config = cli.app_config()?;
            cmd::cmd_browse(&config, route).await?;
        }
    }

    Ok(())
}
