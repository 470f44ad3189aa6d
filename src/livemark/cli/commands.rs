//! # CLI Layer
//!
//! One possible client of the livemark library. This is the only place that
//! knows about stdout/stderr, exit codes and argument parsing.
//!
//! Every invocation opens the data directory, runs one command through
//! [`LivemarkApi`] and exits. Notes are addressed by 1-based position or by
//! id prefix (see `livemark::index`).
//!
//! ## Structure
//!
//! - `run()`: parse, set up logging and context, dispatch
//! - `handle_*()`: per-command handlers that call the API and print
//! - `print_*()` (in `print.rs`): output formatting

use super::print::{print_full_note, print_messages, print_notes, print_stats};
use super::setup::{Cli, Commands, ThemeArg};
use clap::Parser;
use colored::Colorize;
use directories::ProjectDirs;
use livemark::api::LivemarkApi;
use livemark::commands::export::ExportFormat;
use livemark::config::LivemarkConfig;
use livemark::error::{LivemarkError, Result};
use livemark::index::{resolve_all, NoteSelector};
use livemark::model::{Note, NoteId, Theme};
use livemark::store::fs_backend::FsBackend;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

const HOME_ENV: &str = "LIVEMARK_HOME";

struct AppContext {
    api: LivemarkApi<FsBackend>,
    data_dir: PathBuf,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context()?;

    match cli.command {
        Some(Commands::List { search }) => handle_list(&ctx, search),
        Some(Commands::New) => handle_new(&mut ctx),
        Some(Commands::Show { note }) => handle_show(&ctx, &note),
        Some(Commands::Write { note, content }) => handle_write(&mut ctx, &note, content),
        Some(Commands::Rename { note, title }) => handle_rename(&mut ctx, &note, title),
        Some(Commands::Delete { notes }) => handle_delete(&mut ctx, &notes),
        Some(Commands::Move { from, to }) => handle_move(&mut ctx, &from, &to),
        Some(Commands::Import { paths }) => handle_import(&mut ctx, &paths),
        Some(Commands::Export { notes, format, out }) => handle_export(&ctx, &notes, format, out),
        Some(Commands::Stats { note }) => handle_stats(&ctx, &note),
        Some(Commands::Theme { mode }) => handle_theme(&mut ctx, mode),
        Some(Commands::Config { key, value }) => handle_config(&ctx, key, value),
        None => handle_list(&ctx, None),
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // A second init (e.g. from tests) is harmless.
    let _ = builder.try_init();
}

fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "livemark", "livemark")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| LivemarkError::Config("Could not determine data directory".into()))
}

fn init_context() -> Result<AppContext> {
    let data_dir = data_dir()?;
    let config = LivemarkConfig::load(&data_dir).unwrap_or_else(|e| {
        log::warn!("ignoring unreadable config: {}", e);
        LivemarkConfig::default()
    });
    log::debug!("data dir: {}", data_dir.display());

    let api = LivemarkApi::open(FsBackend::new(data_dir.clone()), config)?;
    Ok(AppContext { api, data_dir })
}

/// Resolve one selector to the note and its 1-based position.
fn resolve<'a>(ctx: &'a AppContext, input: &str) -> Result<(usize, &'a Note)> {
    let selector: NoteSelector = input.parse()?;
    let note = selector.resolve(ctx.api.notes())?;
    let position = ctx
        .api
        .store()
        .position(&note.id)
        .map_or(0, |p| p + 1);
    Ok((position, note))
}

fn resolve_id(ctx: &AppContext, input: &str) -> Result<NoteId> {
    resolve(ctx, input).map(|(_, note)| note.id.clone())
}

fn handle_list(ctx: &AppContext, search: Option<String>) -> Result<()> {
    let query = search.unwrap_or_default();
    let listed: Vec<(usize, &Note)> = ctx
        .api
        .filter(&query)
        .into_iter()
        .filter_map(|note| {
            ctx.api
                .store()
                .position(&note.id)
                .map(|p| (p + 1, note))
        })
        .collect();
    print_notes(&listed, ctx.api.store().current_id());
    Ok(())
}

fn handle_new(ctx: &mut AppContext) -> Result<()> {
    let id = ctx.api.create_note()?;
    let title = ctx
        .api
        .store()
        .get(&id)
        .map(|n| n.title.clone())
        .unwrap_or_default();
    println!("{}", format!("Created note 1. {} ({})", title, id.short()).green());
    Ok(())
}

fn handle_show(ctx: &AppContext, input: &str) -> Result<()> {
    let (position, note) = resolve(ctx, input)?;
    print_full_note(position, note);
    Ok(())
}

fn handle_write(ctx: &mut AppContext, input: &str, content: Option<String>) -> Result<()> {
    let id = resolve_id(ctx, input)?;
    let content = match content {
        Some(content) => content,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(LivemarkError::Io)?;
            buffer
        }
    };

    ctx.api.update_note_content(&id, content, Instant::now())?;
    println!("{}", format!("Saved note {}", id.short()).green());
    Ok(())
}

fn handle_rename(ctx: &mut AppContext, input: &str, title: Vec<String>) -> Result<()> {
    let title = title.join(" ");
    if title.trim().is_empty() {
        return Err(LivemarkError::Api("Title cannot be empty".into()));
    }
    let id = resolve_id(ctx, input)?;
    ctx.api.rename_note(&id, &title)?;
    println!("{}", format!("Renamed to {}", title.trim()).green());
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, inputs: &[String]) -> Result<()> {
    let ids = resolve_all(ctx.api.notes(), inputs)?;

    let removed = if let [id] = ids.as_slice() {
        usize::from(ctx.api.delete_note(id)?)
    } else {
        ctx.api.toggle_selection_mode();
        for id in &ids {
            ctx.api.toggle_note_selection(id);
        }
        let selected = ctx.api.store().selected().to_vec();
        ctx.api.delete_selected_notes(&selected)?
    };

    let noun = if removed == 1 { "note" } else { "notes" };
    println!("{}", format!("Deleted {} {}", removed, noun).green());
    Ok(())
}

fn handle_move(ctx: &mut AppContext, from: &str, to: &str) -> Result<()> {
    let from_id = resolve_id(ctx, from)?;
    let (to_position, to_note) = resolve(ctx, to)?;
    let to_id = to_note.id.clone();

    if ctx.api.reorder_notes(&from_id, &to_id)? {
        println!("{}", format!("Moved to position {}", to_position).green());
    } else {
        println!("{}", "Nothing to move.".dimmed());
    }
    Ok(())
}

fn handle_import(ctx: &mut AppContext, paths: &[PathBuf]) -> Result<()> {
    let result = ctx.api.import_files(paths)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(
    ctx: &AppContext,
    inputs: &[String],
    format: Option<ExportFormat>,
    out: Option<PathBuf>,
) -> Result<()> {
    let ids = resolve_all(ctx.api.notes(), inputs)?;
    let dir = match out {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(LivemarkError::Io)?,
    };
    if !dir.is_dir() {
        return Err(LivemarkError::Api(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let result = ctx.api.export_notes(&ids, format, &dir)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_stats(ctx: &AppContext, input: &str) -> Result<()> {
    let (_, note) = resolve(ctx, input)?;
    let stats = ctx
        .api
        .note_stats(&note.id)
        .ok_or_else(|| LivemarkError::NoteNotFound(input.to_string()))?;
    print_stats(note, &stats);
    Ok(())
}

fn handle_theme(ctx: &mut AppContext, mode: Option<ThemeArg>) -> Result<()> {
    let theme = match mode {
        None => ctx.api.theme(),
        Some(ThemeArg::Toggle) => ctx.api.toggle_theme()?,
        Some(ThemeArg::Light) => {
            ctx.api.set_theme(Theme::Light)?;
            ctx.api.theme()
        }
        Some(ThemeArg::Dark) => {
            ctx.api.set_theme(Theme::Dark)?;
            ctx.api.theme()
        }
    };
    println!("theme = {}", theme);
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let mut config = ctx.api.config().clone();

    match (key.as_deref(), value) {
        (None, _) => {
            for key in LivemarkConfig::KEYS {
                println!("{} = {}", key, config.get(key)?);
            }
        }
        (Some(key), None) => println!("{} = {}", key, config.get(key)?),
        (Some(key), Some(value)) => {
            config.set(key, &value)?;
            config.save(&ctx.data_dir)?;
            println!("{}", format!("{} = {}", key, config.get(key)?).green());
        }
    }
    Ok(())
}
