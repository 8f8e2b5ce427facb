use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::kv::KvStore;
use crate::store::TaskStore;
use crate::task::{Draft, DueDate, Task};

use super::form::{DraftForm, FormAction, FormKind};
use super::view;

const EVENT_POLL_MS: u64 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

/// Everything the screen shows.
///
/// Store calls run synchronously inside [`AppState::handle_key`], so no key
/// is handled while a write is in flight.
pub struct AppState<K> {
    store: TaskStore<K>,
    config: Config,
    today: NaiveDate,
    selected: usize,
    pub(crate) form: Option<DraftForm>,
    pub(crate) show_help: bool,
    status: Option<(String, StatusKind)>,
}

impl<K: KvStore> AppState<K> {
    pub fn new(store: TaskStore<K>, config: Config, today: NaiveDate) -> Self {
        Self {
            store,
            config,
            today,
            selected: 0,
            form: None,
            show_help: false,
            status: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn selected_index(&self) -> Option<usize> {
        if self.tasks().is_empty() {
            None
        } else {
            Some(self.selected.min(self.tasks().len() - 1))
        }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected_index().and_then(|idx| self.tasks().get(idx))
    }

    pub(crate) fn status_line(&self) -> Option<(&str, StatusKind)> {
        self.status
            .as_ref()
            .map(|(message, kind)| (message.as_str(), *kind))
    }

    pub(crate) fn set_info(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), StatusKind::Info));
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), StatusKind::Error));
    }

    pub(crate) fn footer_hint(&self) -> &'static str {
        if self.form.is_some() {
            "tab next  enter save  esc cancel"
        } else {
            "a add  e edit  space done  d delete  ? help  q quit"
        }
    }

    pub(crate) fn count_summary(&self) -> String {
        let total = self.tasks().len();
        let done = self.tasks().iter().filter(|task| task.completed).count();
        format!("{done}/{total} done")
    }

    /// Handle one key press. Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        if let Some(form) = self.form.as_mut() {
            match form.handle_key(key) {
                FormAction::None => {}
                FormAction::Cancel => {
                    self.form = None;
                }
                FormAction::Submit => self.submit_form(),
            }
            return false;
        }

        if self.show_help {
            self.show_help = false;
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('g') | KeyCode::Home => self.selected = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.selected = self.tasks().len().saturating_sub(1);
            }
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit_form(),
            KeyCode::Char(' ') | KeyCode::Char('x') => self.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
        false
    }

    fn open_add_form(&mut self) {
        let draft = Draft::new(DueDate::new(self.today))
            .with_category(self.config.defaults.category)
            .with_priority(self.config.defaults.priority);
        self.form = Some(DraftForm::add(draft, self.today));
        self.status = None;
    }

    fn open_edit_form(&mut self) {
        let form = self
            .selected_task()
            .map(|task| DraftForm::edit(task, self.today));
        if form.is_some() {
            self.form = form;
            self.status = None;
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.take() else {
            return;
        };
        let (kind, draft) = form.into_parts();
        let result = match kind {
            FormKind::Add => self.store.add(draft).map(|tasks| tasks.len()),
            FormKind::Edit(id) => self.store.edit(id, draft).map(|tasks| tasks.len()),
        };
        match result {
            Ok(len) => {
                if kind == FormKind::Add {
                    self.selected = len.saturating_sub(1);
                    self.set_info("task added");
                } else {
                    self.set_info("task saved");
                }
            }
            Err(err) => self.report_failure(err),
        }
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task().map(|task| task.id) else {
            return;
        };
        let result = self.store.toggle_completion(id).map(|_| ());
        match result {
            Ok(()) => {
                let done = self.store.get(id).map(|task| task.completed).unwrap_or(false);
                self.set_info(if done { "marked done" } else { "marked not done" });
            }
            Err(err) => self.report_failure(err),
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected_task().map(|task| task.id) else {
            return;
        };
        let result = self.store.delete(id).map(|tasks| tasks.len());
        match result {
            Ok(len) => {
                self.selected = self.selected.min(len.saturating_sub(1));
                self.set_info("task deleted");
            }
            Err(err) => self.report_failure(err),
        }
    }

    fn report_failure(&mut self, err: Error) {
        self.set_error(format!("{err} (changes not saved)"));
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.tasks().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let current = self.selected.min(len - 1) as isize;
        self.selected = (current + delta).clamp(0, len as isize - 1) as usize;
    }
}

/// Run the interactive list until the user quits.
pub fn run<K: KvStore>(store: TaskStore<K>, config: Config, warnings: Vec<String>) -> Result<()> {
    let mut app = AppState::new(store, config, DueDate::today().date());
    if let Some(warning) = warnings.into_iter().next() {
        app.set_error(warning);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop<K: KvStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState<K>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }
    }
    Ok(())
}
