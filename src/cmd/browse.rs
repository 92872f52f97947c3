//! Interactive terminal browser: `issueboard browse`.

use anyhow::{Context, Result};
use console::style;
use dialoguer::Select;

use issueboard::app::{App, Route};
use issueboard::config::AppConfig;
use issueboard::view::ActionItem;

pub async fn cmd_browse(config: &AppConfig, route: &str) -> Result<()> {
    let mut app = super::live_app(config)?;
    app.navigate(route)
        .await
        .with_context(|| format!("Failed to open route '{}'", route))?;

    println!();
    println!("{} {}", style("Issues for").bold(), style(&config.repo).cyan());

    loop {
        print_heading(&app);

        let actions = app.actions();
        if actions.is_empty() {
            println!("{}", style("Nothing loaded. The request may have failed.").yellow());
        }
        let Some(action) = choose(&actions)? else {
            break;
        };
        if !app.perform(&action.action).await? {
            println!("{}", style("That action is not available here.").dim());
        }
    }

    Ok(())
}

fn print_heading(app: &App) {
    let title = app
        .current_route()
        .map(Route::title)
        .unwrap_or_else(|| "Issues".to_string());
    println!();
    println!("{}", style(title).bold().cyan());
}

/// Let the user pick an action. `None` means quit.
fn choose(actions: &[ActionItem]) -> Result<Option<ActionItem>> {
    let mut labels: Vec<String> = actions.iter().map(|a| a.label.clone()).collect();
    labels.push("Quit".to_string());

    let selection = Select::new()
        .with_prompt("Choose")
        .items(&labels)
        .default(0)
        .interact()
        .context("Failed to read selection")?;

    Ok(actions.get(selection).cloned())
}
