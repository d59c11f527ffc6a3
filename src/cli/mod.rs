//! Command-line interface for tt
//!
//! This module defines the CLI structure using clap derive macros.
//! Command groups live in their own submodules.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::identity;
use crate::output::OutputOptions;
use crate::session::Session;
use crate::storage::FileStore;

mod draft;
mod task;
mod user;
mod view;

/// tt - personal task tracker
///
/// Add tasks, complete them, archive them to history, and watch progress.
/// Each signed-in user gets their own lists.
#[derive(Parser, Debug)]
#[command(name = "tt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the stored lists
    #[arg(long, global = true, env = "TT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// User identity selecting the storage partition
    #[arg(long, global = true, env = "TT_USER")]
    pub user: Option<String>,

    /// Path to config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a pending task from the draft (text and flags are merged into it)
    Add {
        /// Task text (at least 3 characters); defaults to the draft's text
        text: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Priority: low, medium, high
        #[arg(long)]
        priority: Option<String>,

        /// Category (General, Work, Study, Personal, or anything else)
        #[arg(long)]
        category: Option<String>,

        /// Subtask to append (repeatable, at most 5 in total)
        #[arg(long = "subtask")]
        subtasks: Vec<String>,
    },

    /// Move a pending task back into the draft for editing (removes it)
    Edit {
        /// Task id or unique prefix
        id: String,
    },

    /// Mark a pending task completed
    Done {
        /// Task id or unique prefix
        id: String,
    },

    /// Move a completed task to history
    Archive {
        /// Task id or unique prefix
        id: String,
    },

    /// Delete a task permanently
    Rm {
        /// Task id or unique prefix
        id: String,

        /// List to delete from: pending, completed, history
        #[arg(long, default_value = "pending")]
        from: String,
    },

    /// Reorder the pending list
    Mv {
        /// Current position (0-based)
        from: usize,

        /// New position (0-based)
        to: usize,
    },

    /// Show pending tasks
    List {
        /// Filter: pending or all
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show completed tasks
    Completed,

    /// Show history
    History {
        /// Only tasks completed on this day (YYYY-MM-DD, UTC)
        #[arg(long)]
        date: Option<String>,

        /// Sort: date-asc, date-desc, priority-asc, priority-desc
        #[arg(long)]
        sort: Option<String>,
    },

    /// Show completion progress
    Progress,

    /// Show the pending-tasks chart series
    Chart,

    /// Print a task as shareable text
    Share {
        /// Task id or unique prefix
        id: String,
    },

    /// Draft (input form) management
    #[command(subcommand)]
    Draft(DraftCommands),

    /// Sign in, sign out, or show the active user
    #[command(subcommand)]
    User(UserCommands),
}

/// Draft subcommands
#[derive(Subcommand, Debug)]
pub enum DraftCommands {
    /// Show the draft
    Show,

    /// Reset the draft to an empty form
    Clear,

    /// Append a subtask
    Subtask {
        /// Subtask text
        text: String,
    },

    /// Remove the subtask at an index (0-based)
    Unsubtask {
        index: usize,
    },

    /// Stage a file attachment
    Attach {
        /// File to attach
        path: PathBuf,

        /// Mark the attachment as an image
        #[arg(long)]
        image: bool,
    },

    /// Remove staged attachments by name
    Detach {
        /// Attachment file name
        name: String,
    },
}

/// User subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Show the active identity
    Show,

    /// Remember a user id as the active identity
    SignIn {
        /// User id
        id: String,
    },

    /// Forget the remembered identity
    SignOut,
}

/// Flags shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub data_dir: Option<PathBuf>,
    pub user: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl GlobalArgs {
    pub fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }

    pub fn config(&self) -> Result<Config> {
        Config::resolve(self.config.as_deref())
    }

    /// File store rooted at the resolved data directory.
    pub fn store(&self, config: &Config) -> FileStore {
        FileStore::new(config.data_dir(self.data_dir.as_deref()))
            .with_lock_timeout(config.storage.lock_timeout_ms)
    }

    /// Open the session of the resolved identity.
    pub fn session(&self, config: &Config) -> Session<FileStore> {
        let store = self.store(config);
        let identity = identity::resolve_identity(&store, self.user.as_deref());
        tracing::debug!(identity = %identity, dir = %store.dir().display(), "opening session");
        Session::open(store, identity)
    }
}

impl Commands {
    /// Name reported in output envelopes, e.g. `add` or `draft show`.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Add { .. } => "add",
            Commands::Edit { .. } => "edit",
            Commands::Done { .. } => "done",
            Commands::Archive { .. } => "archive",
            Commands::Rm { .. } => "rm",
            Commands::Mv { .. } => "mv",
            Commands::List { .. } => "list",
            Commands::Completed => "completed",
            Commands::History { .. } => "history",
            Commands::Progress => "progress",
            Commands::Chart => "chart",
            Commands::Share { .. } => "share",
            Commands::Draft(cmd) => match cmd {
                DraftCommands::Show => "draft show",
                DraftCommands::Clear => "draft clear",
                DraftCommands::Subtask { .. } => "draft subtask",
                DraftCommands::Unsubtask { .. } => "draft unsubtask",
                DraftCommands::Attach { .. } => "draft attach",
                DraftCommands::Detach { .. } => "draft detach",
            },
            Commands::User(cmd) => match cmd {
                UserCommands::Show => "user show",
                UserCommands::SignIn { .. } => "user sign-in",
                UserCommands::SignOut => "user sign-out",
            },
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let global = GlobalArgs {
            data_dir: self.data_dir,
            user: self.user,
            config: self.config,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Add {
                text,
                due,
                priority,
                category,
                subtasks,
            } => task::run_add(task::AddOptions {
                text,
                due,
                priority,
                category,
                subtasks,
                global,
            }),
            Commands::Edit { id } => task::run_edit(task::IdOptions { id, global }),
            Commands::Done { id } => task::run_done(task::IdOptions { id, global }),
            Commands::Archive { id } => task::run_archive(task::IdOptions { id, global }),
            Commands::Rm { id, from } => task::run_rm(task::RmOptions { id, from, global }),
            Commands::Mv { from, to } => task::run_mv(task::MvOptions { from, to, global }),
            Commands::Share { id } => task::run_share(task::IdOptions { id, global }),
            Commands::List { filter } => view::run_list(view::ListOptions { filter, global }),
            Commands::Completed => view::run_completed(global),
            Commands::History { date, sort } => {
                view::run_history(view::HistoryOptions { date, sort, global })
            }
            Commands::Progress => view::run_progress(global),
            Commands::Chart => view::run_chart(global),
            Commands::Draft(cmd) => match cmd {
                DraftCommands::Show => draft::run_show(global),
                DraftCommands::Clear => draft::run_clear(global),
                DraftCommands::Subtask { text } => draft::run_subtask(text, global),
                DraftCommands::Unsubtask { index } => draft::run_unsubtask(index, global),
                DraftCommands::Attach { path, image } => {
                    draft::run_attach(draft::AttachOptions { path, image, global })
                }
                DraftCommands::Detach { name } => draft::run_detach(name, global),
            },
            Commands::User(cmd) => match cmd {
                UserCommands::Show => user::run_show(global),
                UserCommands::SignIn { id } => user::run_sign_in(id, global),
                UserCommands::SignOut => user::run_sign_out(global),
            },
        }
    }
}
