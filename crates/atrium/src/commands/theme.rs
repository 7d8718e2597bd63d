//! Theme commands

use anyhow::Result;
use atrium_core::RequestContext;
use atrium_registry::{ModuleSource, ThemeRegistry};
use console::style;
use std::path::Path;

use crate::cli::{ListArgs, SelectArgs, ThemeCommands};
use crate::commands::common::{dispatch, ListEnv};
use crate::output;

const LIST_TYPE: &str = "themes";

pub async fn run(command: ThemeCommands, config: Option<&Path>) -> Result<()> {
    let env = ListEnv::open(LIST_TYPE, config)?;

    match command {
        ThemeCommands::List(args) => list(&env, args),
        ThemeCommands::Select(args) => select(&env, args).await,
    }
}

fn list(env: &ListEnv, args: ListArgs) -> Result<()> {
    let prefs = env.prefs();
    let mut themes = ThemeRegistry::with_prefs(&prefs);
    themes.set_modules(env.source().scan()?);
    themes.registry_mut().set_sort(&args.sort, !args.desc);

    let sorted = themes.sorted();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&sorted)?);
        return Ok(());
    }

    if sorted.is_empty() {
        output::info("No themes installed");
        return Ok(());
    }

    for theme in &sorted {
        let marker = if themes.is_current(&theme.id) {
            style("current").cyan().bold().to_string()
        } else if theme.is_enabled() {
            "enabled".to_string()
        } else {
            style("disabled").yellow().to_string()
        };
        let mut flags = Vec::new();
        if theme.distributed {
            flags.push("distributed");
        }
        if !theme.cannot_disable.is_empty() {
            flags.push("required");
        }
        println!(
            "  {:<24} {:<10} {:<10} {} {}",
            style(&theme.id).bold(),
            theme.version,
            marker,
            theme.author,
            style(flags.join(" ")).dim()
        );
    }
    Ok(())
}

async fn select(env: &ListEnv, args: SelectArgs) -> Result<()> {
    let ctx = RequestContext::new("atrium://cli").with_post("select", args.id);
    dispatch(env, ctx, true).await
}
