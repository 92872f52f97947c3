//! CLI command implementations.
//!
//! | Module   | Commands handled |
//! |----------|------------------|
//! | `serve`  | `Serve`          |
//! | `render` | `Render`         |
//! | `browse` | `Browse`         |

pub mod browse;
pub mod render;
pub mod serve;

use std::rc::Rc;

use anyhow::{Context, Result};

use issueboard::app::App;
use issueboard::config::AppConfig;
use issueboard::github::GitHubTransport;

pub use browse::cmd_browse;
pub use render::cmd_render;
pub use serve::cmd_serve;

/// Build the application against the live GitHub API.
fn live_app(config: &AppConfig) -> Result<App> {
    let transport = GitHubTransport::new(&config.user_agent)?;
    App::new(config, Rc::new(transport)).context("Failed to initialize application")
}
