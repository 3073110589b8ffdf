use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use notes_core::constants::{HOME_PATH, LOGIN_PATH};
use notes_core::{AuthResponse, AuthResult, CoreConfig, GuardDecision, NotePatch, NotesApp};
use notes_id::parse_id;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;

#[derive(Parser)]
#[command(name = "notes")]
#[command(about = "Local notes organiser with folders, tags and pinning")]
struct Cli {
    /// Directory holding the note store (overrides NOTES_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Storage namespace prefix (overrides NOTES_STORAGE_PREFIX)
    #[arg(long, global = true)]
    prefix: Option<String>,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the local account and sign in
    Register { email: String, password: String },
    /// Sign in to the local account
    Login { email: String, password: String },
    /// Sign out, keeping the account
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Create a note
    New {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// List notes, pinned first then most recently modified
    List {
        /// Case-insensitive text to find in title, content or tags
        #[arg(long)]
        search: Option<String>,
        /// Only notes in this folder id
        #[arg(long)]
        folder: Option<String>,
        /// Only notes carrying this exact tag
        #[arg(long)]
        tag: Option<String>,
        /// Only pinned (true) or unpinned (false) notes
        #[arg(long)]
        pinned: Option<bool>,
        /// Only notes without tags
        #[arg(long)]
        untagged: bool,
    },
    /// Show one note
    Show { id: String },
    /// Change a note's title or content
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a note
    Delete { id: String },
    /// Toggle a note's pinned flag
    Pin { id: String },
    /// Replace a note's tags (no tags clears them)
    Tag {
        id: String,
        #[arg(num_args = 0..)]
        tags: Vec<String>,
    },
    /// Move a note into a folder, or out of any folder when --folder is omitted
    Move {
        id: String,
        #[arg(long)]
        folder: Option<String>,
    },
    /// List folders
    Folders,
    /// Create a folder
    FolderAdd { name: String },
    /// Rename a folder
    FolderRename { id: String, name: String },
    /// Delete a folder; its notes are kept and become unfiled
    FolderDelete { id: String },
    /// List every tag in use
    Tags,
    /// Show note counts
    Counts,
}

impl Commands {
    /// The view each command stands in for, checked against the navigation guard.
    fn route(&self) -> &'static str {
        match self {
            Commands::Register { .. } | Commands::Login { .. } => LOGIN_PATH,
            _ => HOME_PATH,
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("notes=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'notes --help' for commands");
        return Ok(());
    };

    let config = resolve_config(cli.data_dir, cli.prefix.as_deref())?;
    tracing::debug!(
        data_dir = %config.data_dir().display(),
        prefix = config.storage_prefix(),
        "configuration resolved"
    );
    let mut app = NotesApp::open(&config)
        .with_context(|| format!("opening note store at {}", config.data_dir().display()))?;

    match app.navigate(command.route()) {
        GuardDecision::Proceed => {}
        GuardDecision::Redirect(path) if path == LOGIN_PATH => {
            bail!("Not signed in. Run 'notes login' or 'notes register' first.")
        }
        GuardDecision::Redirect(_) => {
            let email = app
                .auth()
                .current_user()
                .map(|u| u.email.as_str())
                .unwrap_or_default();
            println!("Already signed in as {email}.");
            return Ok(());
        }
    }

    run(&mut app, &config, command, cli.json)
}

fn resolve_config(
    data_dir: Option<PathBuf>,
    prefix: Option<&str>,
) -> anyhow::Result<CoreConfig> {
    let mut config = CoreConfig::from_env_values(
        std::env::var("NOTES_DATA_DIR").ok(),
        std::env::var("NOTES_STORAGE_PREFIX").ok(),
        std::env::var("NOTES_APP_NAME").ok(),
        std::env::var("NOTES_MAX_ENTRY_BYTES").ok(),
    )?;
    if let Some(dir) = data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(prefix) = prefix {
        config = config.with_storage_prefix(prefix)?;
    }
    Ok(config)
}

fn run(
    app: &mut NotesApp,
    config: &CoreConfig,
    command: Commands,
    json: bool,
) -> anyhow::Result<()> {
    match command {
        Commands::Register { email, password } => {
            let result = app.auth_mut().register(&email, &password);
            report_auth(result, json, &format!("Registered and signed in as {email}."))
        }
        Commands::Login { email, password } => {
            let result = app.auth_mut().login(&email, &password);
            report_auth(result, json, &format!("Signed in as {email}."))
        }
        Commands::Logout => {
            app.auth_mut().logout();
            report_auth(Ok(()), json, "Signed out.")
        }
        Commands::Whoami => {
            let user = app.auth().current_user().context("no account loaded")?;
            if json {
                output::json(&serde_json::json!({
                    "id": user.id,
                    "email": user.email,
                    "createdAt": user.created_at,
                }))
            } else {
                println!("{}: signed in as {}", config.app_name(), user.email);
                Ok(())
            }
        }
        Commands::New { title, content } => {
            let notes = app.notes_mut();
            let id = notes.create_note();
            if title.is_some() || content.is_some() {
                notes.update_note(NotePatch {
                    title,
                    content,
                    ..NotePatch::new(&id)
                });
            }
            let note = notes.note(&id).context("created note is missing")?;
            if json {
                output::json(note)
            } else {
                println!("{id}");
                Ok(())
            }
        }
        Commands::List {
            search,
            folder,
            tag,
            pinned,
            untagged,
        } => {
            let notes = app.notes_mut();
            if let Some(search) = search {
                notes.set_search(search);
            }
            notes.set_folder_filter(folder);
            notes.set_tag_filter(tag);
            notes.set_pinned_filter(pinned);
            if untagged {
                notes.show_untagged();
            }

            let notes = app.notes();
            let visible = notes.filtered_notes();
            if json {
                return output::json(&visible);
            }
            if visible.is_empty() {
                println!("No notes found.");
            }
            for note in visible {
                println!("{}", output::note_line(notes, note));
            }
            Ok(())
        }
        Commands::Show { id } => {
            let id = parse_id(&id)?;
            let notes = app.notes();
            let note = notes
                .note(&id)
                .with_context(|| format!("no note with id {id}"))?;
            if json {
                output::json(note)
            } else {
                output::note_detail(notes, note);
                Ok(())
            }
        }
        Commands::Edit { id, title, content } => {
            let id = require_note(app, &id)?;
            app.notes_mut().update_note(NotePatch {
                title,
                content,
                ..NotePatch::new(&id)
            });
            print_note(app, &id, json)
        }
        Commands::Delete { id } => {
            let id = require_note(app, &id)?;
            app.notes_mut().delete_note(&id);
            if json {
                output::json(&serde_json::json!({ "deleted": id }))
            } else {
                println!("Deleted {id}.");
                Ok(())
            }
        }
        Commands::Pin { id } => {
            let id = require_note(app, &id)?;
            app.notes_mut().toggle_pinned(&id);
            print_note(app, &id, json)
        }
        Commands::Tag { id, tags } => {
            let id = require_note(app, &id)?;
            app.notes_mut().set_tags(&id, &tags);
            print_note(app, &id, json)
        }
        Commands::Move { id, folder } => {
            let id = require_note(app, &id)?;
            let folder = match folder.as_deref().filter(|f| !f.trim().is_empty()) {
                Some(raw) => Some(require_folder(app, raw)?),
                None => None,
            };
            app.notes_mut().move_to_folder(&id, folder.as_deref());
            print_note(app, &id, json)
        }
        Commands::Folders => {
            let notes = app.notes();
            if json {
                return output::json(notes.folders());
            }
            if notes.folders().is_empty() {
                println!("No folders.");
            }
            for folder in notes.folders() {
                let count = notes
                    .notes()
                    .iter()
                    .filter(|n| n.folder_id.as_deref() == Some(folder.id.as_str()))
                    .count();
                println!("{}", output::folder_line(folder, count));
            }
            Ok(())
        }
        Commands::FolderAdd { name } => {
            let id = app.notes_mut().add_folder(name);
            print_folder(app, &id, json)
        }
        Commands::FolderRename { id, name } => {
            let id = require_folder(app, &id)?;
            app.notes_mut().rename_folder(&id, name);
            print_folder(app, &id, json)
        }
        Commands::FolderDelete { id } => {
            let id = require_folder(app, &id)?;
            app.notes_mut().delete_folder(&id);
            if json {
                output::json(&serde_json::json!({ "deleted": id }))
            } else {
                println!("Deleted folder {id}.");
                Ok(())
            }
        }
        Commands::Tags => {
            let tags = app.notes().unique_tags();
            if json {
                return output::json(&tags);
            }
            for tag in tags {
                println!("{tag}");
            }
            Ok(())
        }
        Commands::Counts => {
            let counts = app.notes().counts();
            if json {
                output::json(&counts)
            } else {
                println!("{}", output::counts_line(counts));
                Ok(())
            }
        }
    }
}

fn report_auth(result: AuthResult<()>, json: bool, success: &str) -> anyhow::Result<()> {
    if json {
        output::json(&AuthResponse::from(result.clone()))?;
    } else if result.is_ok() {
        println!("{success}");
    }
    result.map_err(Into::into)
}

/// Parses `raw` as an identifier and checks that a note with that id exists.
fn require_note(app: &NotesApp, raw: &str) -> anyhow::Result<String> {
    let id = parse_id(raw)?;
    if app.notes().note(&id).is_none() {
        bail!("no note with id {id}");
    }
    Ok(id)
}

fn require_folder(app: &NotesApp, raw: &str) -> anyhow::Result<String> {
    let id = parse_id(raw)?;
    if app.notes().folder(&id).is_none() {
        bail!("no folder with id {id}");
    }
    Ok(id)
}

fn print_note(app: &NotesApp, id: &str, json: bool) -> anyhow::Result<()> {
    let notes = app.notes();
    let note = notes
        .note(id)
        .with_context(|| format!("no note with id {id}"))?;
    if json {
        output::json(note)
    } else {
        println!("{}", output::note_line(notes, note));
        Ok(())
    }
}

fn print_folder(app: &NotesApp, id: &str, json: bool) -> anyhow::Result<()> {
    let folder = app
        .notes()
        .folder(id)
        .with_context(|| format!("no folder with id {id}"))?;
    if json {
        output::json(folder)
    } else {
        println!("{}  {}", folder.id, folder.name);
        Ok(())
    }
}
