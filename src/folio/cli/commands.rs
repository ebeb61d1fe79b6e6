//! # CLI Layer
//!
//! This module is **one possible UI client** for folio. It is the only place
//! that parses arguments, writes to stdout/stderr and decides exit codes.
//!
//! ## Flow
//!
//! 1. Parse arguments with clap ([`Cli`])
//! 2. Install the log subscriber (`FOLIO_LOG`, or `-v` for debug)
//! 3. Load config: `--config-dir`, else `./.folio`, else the OS config dir
//! 4. Pick a root (`--root`, else `FOLIO_ROOT`, else the first one)
//! 5. Dispatch to [`FolioApi`] and print the `CmdResult`
//!
//! `browse` keeps one open file across commands read from stdin.

use super::render::{
    print_messages, render_config, render_entries, render_page, render_roots,
    render_search_status, render_values, terminal_width,
};
use super::setup::{Cli, Commands};
use clap::Parser;
use directories::ProjectDirs;
use folio::api::FolioApi;
use folio::commands::config::ConfigAction;
use folio::commands::view::{BrowseAction, ViewTarget};
use folio::commands::CmdResult;
use folio::config::FolioConfig;
use folio::error::{FolioError, Result};
use folio::provider::fs::FsProvider;
use serde::Serialize;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const ROOT_ENV: &str = "FOLIO_ROOT";
const LOG_ENV: &str = "FOLIO_LOG";

struct AppContext {
    api: FolioApi<FsProvider>,
    json: bool,
    use_color: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_dir = resolve_config_dir(&cli)?;
    tracing::debug!(config_dir = %config_dir.display(), "using config directory");

    // Config edits must work even when no root is reachable.
    if let Commands::Config { key, value } = &cli.command {
        return handle_config(&config_dir, key.clone(), value.clone());
    }

    let config = FolioConfig::load(&config_dir)?;
    if let Commands::Roots = &cli.command {
        return handle_roots(&config, cli.json);
    }

    let mut ctx = init_context(&cli, config)?;
    match cli.command {
        Commands::Ls { dir } => handle_ls(&ctx, dir),
        Commands::View { file, page, line } => {
            let target = match (page, line) {
                (Some(p), _) => ViewTarget::Page(p),
                (None, Some(l)) => ViewTarget::Line(l),
                (None, None) => ViewTarget::Start,
            };
            handle_view(&ctx, &file, target)
        }
        Commands::Search { file, query, hit } => handle_search(&ctx, &file, &query, hit),
        Commands::Browse { file } => handle_browse(&ctx, &file),
        Commands::Get { file, path } => {
            let result = ctx.api.get_value(&file, path.as_deref().unwrap_or(""))?;
            print_values(&ctx, &result)
        }
        Commands::Leaves { file } => {
            let result = ctx.api.leaves(&file)?;
            print_values(&ctx, &result)
        }
        Commands::Set { file, assignments } => handle_set(&mut ctx, &file, assignments),
        Commands::Del { file, path } => {
            let result = ctx.api.delete_value(&file, &path)?;
            print_done(&ctx, &result)
        }
        Commands::AddField {
            file,
            parent,
            key,
            value,
        } => {
            let result = ctx.api.add_field(&file, &parent, &key, &value)?;
            print_done(&ctx, &result)
        }
        Commands::AddItem {
            file,
            parent,
            value,
        } => {
            let result = ctx.api.add_item(&file, &parent, &value)?;
            print_done(&ctx, &result)
        }
        Commands::Touch { dir, name } => print_done(&ctx, &ctx.api.touch(&dir, &name)?),
        Commands::Mkdir { dir, name } => print_done(&ctx, &ctx.api.mkdir(&dir, &name)?),
        Commands::Rm { file } => print_done(&ctx, &ctx.api.remove(&file)?),
        Commands::Config { .. } | Commands::Roots => Ok(()),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn resolve_config_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.config_dir {
        return Ok(dir.clone());
    }
    let project = std::env::current_dir()?.join(".folio");
    if project.is_dir() {
        return Ok(project);
    }
    ProjectDirs::from("com", "folio", "folio")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| FolioError::Config("could not determine config directory".to_string()))
}

fn init_context(cli: &Cli, config: FolioConfig) -> Result<AppContext> {
    let selector = cli.root.clone().or_else(|| std::env::var(ROOT_ENV).ok());
    let root = config.root(selector.as_deref())?;
    tracing::debug!(root = %root.name, path = %root.path, "selected root");
    let provider = FsProvider::new(&root.path)?;

    Ok(AppContext {
        api: FolioApi::new(provider, config),
        json: cli.json,
        use_color: io::stdout().is_terminal(),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_view(ctx: &AppContext, result: &CmdResult) -> Result<()> {
    if ctx.json {
        return print_json(&serde_json::json!({
            "view": result.view,
            "search": result.search,
        }));
    }
    if let Some(view) = &result.view {
        let highlight = ctx.api.config().highlight;
        print!(
            "{}",
            render_page(view, highlight, terminal_width(), ctx.use_color)
        );
    }
    if let Some(search) = &result.search {
        print!("{}", render_search_status(search, ctx.use_color));
    }
    print_messages(&result.messages);
    Ok(())
}

fn print_values(ctx: &AppContext, result: &CmdResult) -> Result<()> {
    if ctx.json {
        let map: serde_json::Map<String, serde_json::Value> =
            result.values.iter().cloned().collect();
        return print_json(&map);
    }
    print!("{}", render_values(&result.values, ctx.use_color));
    Ok(())
}

/// Reports a change: the touched paths and new values as JSON, else the
/// messages.
fn print_done(ctx: &AppContext, result: &CmdResult) -> Result<()> {
    if ctx.json {
        let values: serde_json::Map<String, serde_json::Value> =
            result.values.iter().cloned().collect();
        return print_json(&serde_json::json!({
            "affected_paths": result.affected_paths,
            "values": values,
        }));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_roots(config: &FolioConfig, json: bool) -> Result<()> {
    let result = FolioApi::roots(config)?;
    if json {
        return print_json(&result.roots);
    }
    print!("{}", render_roots(&result.roots, io::stdout().is_terminal()));
    Ok(())
}

fn handle_ls(ctx: &AppContext, dir: Option<String>) -> Result<()> {
    let result = ctx.api.list(dir.as_deref().unwrap_or(""))?;
    if ctx.json {
        return print_json(&result.entries);
    }
    print!("{}", render_entries(&result.entries, ctx.use_color));
    Ok(())
}

fn handle_view(ctx: &AppContext, file: &str, target: ViewTarget) -> Result<()> {
    let result = ctx.api.view(file, target)?;
    print_view(ctx, &result)
}

fn handle_search(ctx: &AppContext, file: &str, query: &str, hit: Option<usize>) -> Result<()> {
    let result = ctx.api.search(file, query, hit)?;
    print_view(ctx, &result)
}

fn handle_set(ctx: &mut AppContext, file: &str, assignments: Vec<String>) -> Result<()> {
    let changes = pair_up(assignments)?;
    let result = ctx.api.set_values(file, &changes)?;
    print_done(ctx, &result)
}

fn pair_up(assignments: Vec<String>) -> Result<Vec<(String, String)>> {
    if assignments.len() % 2 != 0 {
        return Err(FolioError::InvalidInput(
            "set expects PATH VALUE pairs".to_string(),
        ));
    }
    let mut iter = assignments.into_iter();
    let mut pairs = Vec::new();
    while let (Some(path), Some(value)) = (iter.next(), iter.next()) {
        pairs.push((path, value));
    }
    Ok(pairs)
}

fn handle_config(dir: &std::path::Path, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };
    let result = FolioApi::configure(dir, action)?;
    if let (Some(config), true) = (&result.config, result.messages.is_empty()) {
        print!("{}", render_config(config));
    }
    print_messages(&result.messages);
    Ok(())
}

/// What one line typed into `browse` asks for.
#[derive(Debug, PartialEq, Eq)]
enum BrowseInput {
    Quit,
    Help,
    Action(BrowseAction),
}

const BROWSE_HELP: &str = "n next page · p previous page · g N go to page · l N go to line · \
/text search · ] next match · [ previous match · q quit";

fn parse_browse_input(input: &str) -> Result<BrowseInput> {
    let input = input.trim();
    if let Some(query) = input.strip_prefix('/') {
        return Ok(BrowseInput::Action(BrowseAction::Search(query.to_string())));
    }
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or("n");
    let number = |arg: Option<&str>| -> Result<usize> {
        arg.and_then(|a| a.parse().ok())
            .ok_or_else(|| FolioError::InvalidInput(format!("'{}' needs a number", command)))
    };
    let parsed = match command {
        "q" | "quit" => BrowseInput::Quit,
        "?" | "h" | "help" => BrowseInput::Help,
        "n" => BrowseInput::Action(BrowseAction::NextPage),
        "p" => BrowseInput::Action(BrowseAction::PreviousPage),
        "g" => BrowseInput::Action(BrowseAction::Page(number(parts.next())?)),
        "l" => BrowseInput::Action(BrowseAction::Line(number(parts.next())?)),
        "]" => BrowseInput::Action(BrowseAction::NextHit),
        "[" => BrowseInput::Action(BrowseAction::PreviousHit),
        "." => BrowseInput::Action(BrowseAction::Show),
        other => {
            return Err(FolioError::InvalidInput(format!(
                "unknown command '{}' (? for help)",
                other
            )))
        }
    };
    Ok(parsed)
}

fn handle_browse(ctx: &AppContext, file: &str) -> Result<()> {
    let mut open = ctx.api.open(file)?;
    print_view(ctx, &ctx.api.browse(&mut open, BrowseAction::Show)?)?;

    let interactive = io::stdin().is_terminal();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!(": ");
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line?;

        match parse_browse_input(&line) {
            Ok(BrowseInput::Quit) => return Ok(()),
            Ok(BrowseInput::Help) => println!("{}", BROWSE_HELP),
            Ok(BrowseInput::Action(action)) => match ctx.api.browse(&mut open, action) {
                Ok(result) => print_view(ctx, &result)?,
                Err(e) => eprintln!("Error: {}", e),
            },
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}
