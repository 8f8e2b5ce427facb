//! todopad task command implementations.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::kv::FileKv;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store::{LoadOutcome, TaskStore};
use crate::task::{Category, Draft, DueDate, Priority, Task, TaskId};

pub struct ListOptions {
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: String,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct AddOptions {
    pub text: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: String,
    pub text: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct IdOptions {
    pub id: String,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct TaskListOutput<'a> {
    count: usize,
    completed: usize,
    tasks: &'a [Task],
}

#[derive(Serialize)]
struct TaskRemovedOutput {
    id: TaskId,
    remaining: usize,
}

struct TaskContext {
    store: TaskStore<FileKv>,
    config: Config,
    warnings: Vec<String>,
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.dir)?;
    let tasks = ctx.store.tasks();

    let completed = tasks.iter().filter(|task| task.completed).count();
    let mut human = HumanOutput::new(format!("Tasks ({})", tasks.len()));
    for warning in &ctx.warnings {
        human.push_warning(warning.clone());
    }
    if tasks.is_empty() {
        human.push_detail("no tasks");
    }
    for task in tasks {
        human.push_detail(task_line(task));
    }
    if !tasks.is_empty() {
        human.push_summary("done", format!("{completed}/{}", tasks.len()));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "list",
        &TaskListOutput {
            count: tasks.len(),
            completed,
            tasks,
        },
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = load_context(options.dir)?;
    let id = parse_id(&options.id)?;
    let task = require_task(&ctx.store, id)?;

    let mut human = task_human("Task", task);
    for warning in &ctx.warnings {
        human.push_warning(warning.clone());
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "show",
        task,
        Some(&human),
    )
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let mut ctx = load_context(options.dir)?;
    let today = DueDate::today().date();

    let mut draft = Draft::new(DueDate::new(today))
        .with_text(options.text)
        .with_category(ctx.config.defaults.category)
        .with_priority(ctx.config.defaults.priority);
    if let Some(category) = options.category.as_deref() {
        draft.category = category.parse::<Category>()?;
    }
    if let Some(priority) = options.priority.as_deref() {
        draft.priority = priority.parse::<Priority>()?;
    }
    if let Some(due) = options.due.as_deref() {
        draft.due_date = DueDate::parse_input(due, today)?;
    }

    let tasks = ctx.store.add(draft)?;
    let task = tasks
        .last()
        .ok_or_else(|| Error::OperationFailed("added task missing from list".to_string()))?;

    let mut human = task_human("Task added", task);
    for warning in &ctx.warnings {
        human.push_warning(warning.clone());
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "add",
        task,
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let mut ctx = load_context(options.dir)?;
    let id = parse_id(&options.id)?;
    let today = DueDate::today().date();

    let mut draft = Draft::from_task(require_task(&ctx.store, id)?);
    if let Some(text) = options.text {
        draft.text = text;
    }
    if let Some(category) = options.category.as_deref() {
        draft.category = category.parse::<Category>()?;
    }
    if let Some(priority) = options.priority.as_deref() {
        draft.priority = priority.parse::<Priority>()?;
    }
    if let Some(due) = options.due.as_deref() {
        draft.due_date = DueDate::parse_input(due, today)?;
    }

    ctx.store.edit(id, draft)?;
    let task = require_task(&ctx.store, id)?;

    let mut human = task_human("Task updated", task);
    for warning in &ctx.warnings {
        human.push_warning(warning.clone());
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "edit",
        task,
        Some(&human),
    )
}

pub fn run_rm(options: IdOptions) -> Result<()> {
    let mut ctx = load_context(options.dir)?;
    let id = parse_id(&options.id)?;
    let removed = require_task(&ctx.store, id)?.clone();

    let remaining = ctx.store.delete(id)?.len();

    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", id.to_string());
    human.push_summary("Text", removed.text);
    human.push_summary("Remaining", remaining.to_string());
    for warning in &ctx.warnings {
        human.push_warning(warning.clone());
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "rm",
        &TaskRemovedOutput { id, remaining },
        Some(&human),
    )
}

pub fn run_toggle(options: IdOptions) -> Result<()> {
    let mut ctx = load_context(options.dir)?;
    let id = parse_id(&options.id)?;
    require_task(&ctx.store, id)?;

    ctx.store.toggle_completion(id)?;
    let task = require_task(&ctx.store, id)?;

    let header = if task.completed {
        "Task completed"
    } else {
        "Task reopened"
    };
    let mut human = task_human(header, task);
    for warning in &ctx.warnings {
        human.push_warning(warning.clone());
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "toggle",
        task,
        Some(&human),
    )
}

pub fn run_ui(dir: Option<PathBuf>) -> Result<()> {
    let ctx = load_context(dir)?;
    crate::ui::run(ctx.store, ctx.config, ctx.warnings)
}

fn load_context(dir: Option<PathBuf>) -> Result<TaskContext> {
    let dir = match dir {
        Some(dir) => dir,
        None => config::default_data_dir().ok_or_else(|| {
            Error::InvalidArgument(
                "no data directory found; pass --dir or set TODOPAD_DIR".to_string(),
            )
        })?,
    };
    let (config, config_warning) = Config::load_from_dir(&dir);
    let kv = FileKv::new(dir.clone()).with_lock_timeout(config.storage.lock_timeout_ms);
    let mut store = TaskStore::new(kv, config.storage.key.clone());

    let mut warnings: Vec<String> = config_warning.into_iter().collect();
    match store.load() {
        LoadOutcome::Reset { reason } => {
            warnings.push(format!("{reason}; starting with an empty list"));
        }
        LoadOutcome::Loaded { repaired, .. } if repaired > 0 => {
            warnings.push(format!("{repaired} task(s) had duplicate ids and were renumbered"));
        }
        _ => {}
    }

    Ok(TaskContext {
        store,
        config,
        warnings,
    })
}

fn parse_id(raw: &str) -> Result<TaskId> {
    raw.parse::<TaskId>()
}

fn require_task(store: &TaskStore<FileKv>, id: TaskId) -> Result<&Task> {
    store.get(id).ok_or(Error::TaskNotFound(id))
}

fn task_line(task: &Task) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    format!("{check} {} {} (Due: {})", task.id, task.summary(), task.due_date)
}

fn task_human(header: &str, task: &Task) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    human.push_summary("ID", task.id.to_string());
    human.push_summary("Text", task.text.clone());
    human.push_summary("Category", task.category.to_string());
    human.push_summary("Priority", task.priority.to_string());
    human.push_summary("Due", task.due_date.to_string());
    human.push_summary("Done", if task.completed { "yes" } else { "no" });
    human
}
