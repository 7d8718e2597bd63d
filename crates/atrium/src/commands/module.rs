//! Plugin module commands

use anyhow::{Context, Result};
use atrium_core::types::ModuleInfo;
use atrium_core::RequestContext;
use atrium_filters::Pager;
use atrium_registry::IndexKey;
use console::style;
use dialoguer::{Confirm, Password};
use std::path::Path;

use crate::cli::{DeleteArgs, FetchArgs, ListArgs, ModuleCommands, SearchArgs, UpdateArgs};
use crate::commands::common::{dispatch, ListEnv};
use crate::output;

const LIST_TYPE: &str = "plugins";

pub async fn run(command: ModuleCommands, config: Option<&Path>) -> Result<()> {
    let env = ListEnv::open(LIST_TYPE, config)?;

    match command {
        ModuleCommands::List(args) => list(&env, args).await,
        ModuleCommands::Search(args) => search(&env, args),
        ModuleCommands::Install(args) => batch(&env, "install", args.ids).await,
        ModuleCommands::Update(args) => update(&env, args).await,
        ModuleCommands::Activate(args) => batch(&env, "activate", args.ids).await,
        ModuleCommands::Deactivate(args) => batch(&env, "deactivate", args.ids).await,
        ModuleCommands::Delete(args) => delete(&env, args).await,
        ModuleCommands::Clone(args) => batch(&env, "clone", args.ids).await,
        ModuleCommands::Fetch(args) => fetch(&env, args).await,
    }
}

async fn list(env: &ListEnv, args: ListArgs) -> Result<()> {
    let mut registry = env.registry()?;
    registry.set_sort(&args.sort, !args.desc);

    let items: Vec<ModuleInfo> = if args.updates {
        let store = env
            .store()?
            .context("no plugins_feed configured; cannot check for updates")?;
        let spinner = output::spinner("Fetching repository feed...");
        let feed = store.get(false).await;
        spinner.finish_and_clear();
        registry.merge_feed(&feed?);
        registry
            .updatable_modules()
            .into_iter()
            .cloned()
            .collect()
    } else if let Some(c) = args.index {
        let key = match c.to_ascii_lowercase() {
            c if c.is_ascii_lowercase() || c.is_ascii_digit() => IndexKey::Char(c),
            _ => IndexKey::Other,
        };
        registry.set_index(Some(key));
        registry.index_results()
    } else {
        registry.sorted()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        output::info(if args.updates {
            "Every module is up to date"
        } else {
            "No modules found"
        });
        return Ok(());
    }

    let pager = Pager::new(
        args.page as i64,
        items.len() as i64,
        args.page_size as i64,
        10,
    );
    let window = &items[pager.index_start as usize..=pager.index_end as usize];
    print_table(window, args.updates);

    if pager.total_pages > 1 {
        println!(
            "\n  page {} of {} ({} modules)",
            pager.current_page, pager.total_pages, pager.total_elements
        );
    }
    Ok(())
}

fn search(env: &ListEnv, args: SearchArgs) -> Result<()> {
    let mut registry = env.registry()?;
    registry.set_search(Some(&args.query));

    let results = registry.search_results();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if registry.search_query().is_none() {
        output::warning("Search needs at least two characters");
        return Ok(());
    }

    if results.is_empty() {
        output::info(&format!("No modules match '{}'", args.query));
    } else {
        print_table(&results, false);
        println!("\n  {} result(s)", results.len());
    }
    Ok(())
}

async fn update(env: &ListEnv, args: UpdateArgs) -> Result<()> {
    let ids = if args.ids.is_empty() {
        // No explicit targets: update everything the feed advertises.
        let store = env
            .store()?
            .context("no plugins_feed configured; cannot update")?;
        let spinner = output::spinner("Fetching repository feed...");
        let feed = store.get(false).await;
        spinner.finish_and_clear();

        let mut registry = env.registry()?;
        registry.merge_feed(&feed?);
        let ids: Vec<String> = registry
            .updatable_modules()
            .into_iter()
            .map(|m| m.id.clone())
            .collect();
        if ids.is_empty() {
            output::success("Every module is up to date");
            return Ok(());
        }
        ids
    } else {
        args.ids
    };

    batch(env, "update", ids).await
}

async fn delete(env: &ListEnv, args: DeleteArgs) -> Result<()> {
    if !args.yes {
        let prompt = format!(
            "Delete {} and all module files?",
            args.ids.join(", ")
        );
        if !Confirm::new().with_prompt(prompt).default(false).interact()? {
            output::info("Aborted");
            return Ok(());
        }
    }
    batch(env, "delete", args.ids).await
}

async fn fetch(env: &ListEnv, args: FetchArgs) -> Result<()> {
    let password = Password::new()
        .with_prompt("Confirm your password to install a remote package")
        .interact()?;

    let ctx = RequestContext::new("atrium://cli")
        .with_post("fetch_pkg", args.url)
        .with_post("your_pwd", password);

    let spinner = output::spinner("Downloading package...");
    let result = dispatch(env, ctx, false).await;
    spinner.finish_and_clear();
    result
}

/// Dispatch one batch command over the given ids
async fn batch(env: &ListEnv, command: &str, ids: Vec<String>) -> Result<()> {
    let ctx = RequestContext::new("atrium://cli").with_post_list(command, ids);

    let needs_feed = matches!(command, "install" | "update");
    let spinner = needs_feed.then(|| output::spinner("Contacting repository..."));
    let result = dispatch(env, ctx, false).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    result
}

fn print_table(modules: &[ModuleInfo], show_updates: bool) {
    for m in modules {
        let state = if m.is_enabled() {
            style("enabled").green()
        } else {
            style("disabled").yellow()
        };
        let mut line = format!(
            "  {:<24} {:<10} {:<10} {}",
            style(&m.id).bold(),
            m.version,
            state,
            m.author
        );
        if show_updates && !m.current_version.is_empty() {
            line.push_str(&format!("  {}", style(format!("-> {}", m.current_version)).cyan()));
        }
        println!("{line}");
    }
}
