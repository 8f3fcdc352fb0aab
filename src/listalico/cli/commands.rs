//! # CLI dispatch
//!
//! Turns a parsed [`Cli`] into calls on [`ListalicoApi`] and prints what comes
//! back. Everything terminal-specific lives at this level: resolving the data
//! directory, installing the tracing subscriber, confirmation prompts, and
//! choosing stdout or stderr.
//!
//! `run()` is called by `main.rs`. Each `handle_*` fn covers one command;
//! formatting is delegated to `render.rs`.

use super::render::{
    print_messages, render_config, render_folder_list, render_full_notes, render_import_summary,
    render_note_list, render_trash,
};
use super::setup::{
    command_path, print_grouped_help, print_help_for_command, Cli, Commands, CoreCommands,
    DataCommands, FolderCommands, MiscCommands, NoteCommands,
};
use clap::{CommandFactory, FromArgMatches};
use directories::ProjectDirs;
use listalico::api::{ConfigAction, ListalicoApi, ListalicoPaths};
use listalico::commands::import::ImportSummary;
use listalico::commands::update::NotePatch;
use listalico::config::ListalicoConfig;
use listalico::error::{ListalicoError, Result};
use listalico::model::Priority;
use listalico::store::fs_backend::FsBackend;
use listalico::store::NoteStore;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "LISTALICO_DATA";

struct AppContext {
    api: ListalicoApi<FsBackend>,
}

pub fn run() -> Result<()> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if cli.help {
        let path = command_path(&matches);
        if path.is_empty() {
            print_grouped_help();
        } else {
            print_help_for_command(&path.join(" "));
        }
        return Ok(());
    }
    if let Some(Commands::Misc(MiscCommands::Help { command })) = &cli.command {
        return handle_help(command.clone());
    }

    init_tracing(cli.verbose);
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Core(cmd)) => match cmd {
            CoreCommands::Create { folder, title } => {
                let title = if title.is_empty() {
                    None
                } else {
                    Some(title.join(" "))
                };
                handle_create(&mut ctx, folder, title)
            }
            CoreCommands::List {
                folder,
                search,
                trash,
            } => {
                if trash {
                    handle_trash(&mut ctx)
                } else {
                    handle_list(&mut ctx, folder, search)
                }
            }
            CoreCommands::Search { term } => handle_list(&mut ctx, None, Some(term.join(" "))),
        },
        Some(Commands::Note(cmd)) => match cmd {
            NoteCommands::View { indexes } => handle_view(&mut ctx, indexes),
            NoteCommands::Edit {
                index,
                title,
                content,
                priority,
                task,
                no_task,
                tags,
                untags,
                folder,
                unfile,
            } => {
                let edit = EditArgs {
                    title,
                    content,
                    priority,
                    task: task.then_some(true).or(no_task.then_some(false)),
                    tags,
                    untags,
                    folder: if unfile { Some(None) } else { folder.map(Some) },
                };
                handle_edit(&mut ctx, index, edit)
            }
            NoteCommands::Done { indexes } => handle_done(&mut ctx, indexes),
            NoteCommands::Move {
                indexes,
                to,
                unfile,
            } => handle_move(&mut ctx, indexes, if unfile { None } else { to }),
            NoteCommands::Delete { indexes } => handle_delete(&mut ctx, indexes),
            NoteCommands::Restore { indexes } => handle_restore(&mut ctx, indexes),
        },
        Some(Commands::Folder(cmd)) => handle_folder(&mut ctx, cmd),
        Some(Commands::Data(cmd)) => match cmd {
            DataCommands::Purge {
                indexes,
                folder,
                yes,
            } => handle_purge(&mut ctx, indexes, folder, yes),
            DataCommands::Export { dir } => handle_export(&mut ctx, dir),
            DataCommands::Import { file, yes } => handle_import(&mut ctx, file, yes),
        },
        Some(Commands::Misc(cmd)) => match cmd {
            MiscCommands::Config { key, value } => handle_config(&mut ctx, key, value),
            MiscCommands::Help { command } => handle_help(command),
        },
        None => handle_list(&mut ctx, None, None),
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "listalico=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn resolve_data_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(dir.clone());
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "listalico", "listalico")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ListalicoError::Store("Could not determine a data directory".into()))
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = resolve_data_dir(cli)?;
    tracing::debug!(data_dir = %data_dir.display(), "using data directory");

    let config = match ListalicoConfig::load(&data_dir) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "could not read config, using defaults");
            ListalicoConfig::default()
        }
    };
    let store = NoteStore::open(FsBackend::new(data_dir.clone()));
    let api = ListalicoApi::new(store, config, ListalicoPaths { data_dir });

    Ok(AppContext { api })
}

fn handle_create(ctx: &mut AppContext, folder: Option<String>, title: Option<String>) -> Result<()> {
    let result = ctx.api.create_note(folder.as_deref(), title)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_list(ctx: &mut AppContext, folder: Option<String>, search: Option<String>) -> Result<()> {
    let result = ctx.api.list_notes(folder.as_deref(), search)?;
    print!("{}", render_note_list(&result.listed_notes, result.total_notes));
    print_messages(&result.messages);
    Ok(())
}

fn handle_trash(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.list_trash()?;
    print!(
        "{}",
        render_trash(&result.trashed_folders, &result.trashed_notes)
    );
    print_messages(&result.messages);
    Ok(())
}

fn handle_view(ctx: &mut AppContext, indexes: Vec<String>) -> Result<()> {
    let result = ctx.api.view_notes(&indexes)?;
    print!(
        "{}",
        render_full_notes(&result.listed_notes, &result.trashed_notes)
    );
    print_messages(&result.messages);
    Ok(())
}

struct EditArgs {
    title: Option<String>,
    content: Option<String>,
    priority: Option<String>,
    task: Option<bool>,
    tags: Vec<String>,
    untags: Vec<String>,
    folder: Option<Option<String>>,
}

fn handle_edit(ctx: &mut AppContext, index: String, edit: EditArgs) -> Result<()> {
    let priority = edit
        .priority
        .map(|p| p.parse::<Priority>())
        .transpose()
        .map_err(ListalicoError::Validation)?;
    let folder_id = match edit.folder {
        Some(Some(sel)) => Some(Some(ctx.api.resolve_folder(&sel)?)),
        Some(None) => Some(None),
        None => None,
    };
    let patch = NotePatch {
        title: edit.title,
        content: edit.content,
        folder_id,
        priority,
        is_task: edit.task,
        add_categories: edit.tags,
        remove_categories: edit.untags,
        ..Default::default()
    };

    if patch.is_empty() {
        println!("Nothing to change. See `listalico edit --help`.");
        return Ok(());
    }

    // One call: each touch re-sorts the list, so the index is only valid once.
    let result = ctx.api.update_note(&index, patch)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_done(ctx: &mut AppContext, indexes: Vec<String>) -> Result<()> {
    let result = ctx.api.toggle_tasks(&indexes)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_move(ctx: &mut AppContext, indexes: Vec<String>, to: Option<String>) -> Result<()> {
    let result = ctx.api.move_notes(&indexes, to.as_deref())?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, indexes: Vec<String>) -> Result<()> {
    let result = ctx.api.trash_notes(&indexes)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_restore(ctx: &mut AppContext, indexes: Vec<String>) -> Result<()> {
    let result = ctx.api.restore_notes(&indexes)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_folder(ctx: &mut AppContext, cmd: FolderCommands) -> Result<()> {
    let result = match cmd {
        FolderCommands::List => {
            let result = ctx.api.list_folders()?;
            print!(
                "{}",
                render_folder_list(&result.listed_folders, result.total_notes)
            );
            result
        }
        FolderCommands::Create { color, name } => {
            let name = if name.is_empty() {
                None
            } else {
                Some(name.join(" "))
            };
            ctx.api.create_folder(name, color.as_deref())?
        }
        FolderCommands::Rename { folder, name } => {
            ctx.api.rename_folder(&folder, &name.join(" "))?
        }
        FolderCommands::Color { folder, color } => ctx.api.recolor_folder(&folder, &color)?,
        FolderCommands::Delete { folder } => ctx.api.trash_folder(&folder)?,
        FolderCommands::Restore { folder } => ctx.api.restore_folder(&folder)?,
    };
    print_messages(&result.messages);
    Ok(())
}

fn handle_purge(
    ctx: &mut AppContext,
    indexes: Vec<String>,
    folder: Option<String>,
    yes: bool,
) -> Result<()> {
    let what = match (&folder, indexes.is_empty()) {
        (Some(f), true) => format!("trashed folder {}", f),
        (Some(f), false) => format!("trashed folder {} and notes {}", f, indexes.join(" ")),
        (None, false) => format!("trashed notes {}", indexes.join(" ")),
        (None, true) => "everything in the trash".to_string(),
    };
    if !yes && !confirm(&format!("Permanently delete {}?", what))? {
        println!("Aborted.");
        return Ok(());
    }

    if !indexes.is_empty() {
        let result = ctx.api.purge_notes(&indexes)?;
        print_messages(&result.messages);
    }
    if let Some(folder) = folder {
        let result = ctx.api.purge_folder(&folder)?;
        print_messages(&result.messages);
    } else if indexes.is_empty() {
        let result = ctx.api.empty_trash()?;
        print_messages(&result.messages);
    }
    Ok(())
}

fn handle_export(ctx: &mut AppContext, dir: Option<PathBuf>) -> Result<()> {
    let result = ctx.api.export(dir.as_deref())?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_import(ctx: &mut AppContext, file: PathBuf, yes: bool) -> Result<()> {
    let raw = std::fs::read_to_string(&file)?;
    let doc = ctx.api.parse_import(&raw)?;

    if !yes {
        print!("{}", render_import_summary(&ImportSummary::of(&doc)));
        if !confirm("Replace ALL current folders and notes with this backup?")? {
            println!("Aborted.");
            return Ok(());
        }
    }

    let result = ctx.api.import(doc)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let show_all = key.is_none();
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let result = ctx.api.config(action)?;
    if show_all {
        if let Some(config) = &result.config {
            print!("{}", render_config(&config.list_all()));
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_help(command: Option<String>) -> Result<()> {
    match command {
        Some(cmd) => print_help_for_command(&cmd),
        None => print_grouped_help(),
    }
    Ok(())
}

/// Asks a yes/no question on stdin. Anything but y/yes is a no.
fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}
