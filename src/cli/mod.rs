//! Command-line interface for todopad
//!
//! This module defines the CLI structure using clap derive macros.
//! Command implementations live in [`task`].

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

mod task;

/// todopad - a local to-do list
///
/// Create, edit, complete and delete tasks. Each task has text, a category,
/// a priority and a due date, and the list is saved locally after every change.
#[derive(Parser, Debug)]
#[command(name = "todopad")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data dir)
    #[arg(long, global = true, env = "TODOPAD_DIR")]
    pub dir: Option<PathBuf>,

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
    /// List all tasks in order
    #[command(alias = "ls")]
    List,

    /// Show one task
    Show {
        /// Task ID
        id: String,
    },

    /// Add a task
    Add {
        /// Task text (may be empty)
        #[arg(default_value = "")]
        text: String,

        /// Category: Work or Personal
        #[arg(short, long)]
        category: Option<String>,

        /// Priority: High, Medium or Low
        #[arg(short, long)]
        priority: Option<String>,

        /// Due date: YYYY-MM-DD, today, tomorrow, +N days
        #[arg(short, long)]
        due: Option<String>,
    },

    /// Edit a task's text, category, priority or due date
    Edit {
        /// Task ID
        id: String,

        /// New text
        #[arg(short, long)]
        text: Option<String>,

        /// New category: Work or Personal
        #[arg(short, long)]
        category: Option<String>,

        /// New priority: High, Medium or Low
        #[arg(short, long)]
        priority: Option<String>,

        /// New due date
        #[arg(short, long)]
        due: Option<String>,
    },

    /// Delete a task
    #[command(alias = "delete")]
    Rm {
        /// Task ID
        id: String,
    },

    /// Mark a task done, or not done again
    Toggle {
        /// Task ID
        id: String,
    },

    /// Open the interactive task list
    Ui,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::List => task::run_list(task::ListOptions {
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Show { id } => task::run_show(task::ShowOptions {
                id,
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Add {
                text,
                category,
                priority,
                due,
            } => task::run_add(task::AddOptions {
                text,
                category,
                priority,
                due,
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Edit {
                id,
                text,
                category,
                priority,
                due,
            } => task::run_edit(task::EditOptions {
                id,
                text,
                category,
                priority,
                due,
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Rm { id } => task::run_rm(task::IdOptions {
                id,
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Toggle { id } => task::run_toggle(task::IdOptions {
                id,
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Ui => task::run_ui(self.dir),
        }
    }
}
