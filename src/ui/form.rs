use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::task::{Category, Draft, DueDate, Priority, Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Add,
    Edit(TaskId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Text,
    Category,
    Priority,
    DueDate,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Text,
        FormField::Category,
        FormField::Priority,
        FormField::DueDate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Text => "Task",
            FormField::Category => "Category",
            FormField::Priority => "Priority",
            FormField::DueDate => "Due",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Cancel,
    Submit,
}

/// Dialog state for adding or editing one task.
#[derive(Debug, Clone)]
pub struct DraftForm {
    kind: FormKind,
    draft: Draft,
    active: usize,
    today: NaiveDate,
    due_input: String,
    error: Option<String>,
}

impl DraftForm {
    pub fn add(draft: Draft, today: NaiveDate) -> Self {
        Self {
            kind: FormKind::Add,
            draft,
            active: 0,
            today,
            due_input: String::new(),
            error: None,
        }
    }

    pub fn edit(task: &Task, today: NaiveDate) -> Self {
        Self {
            kind: FormKind::Edit(task.id),
            draft: Draft::from_task(task),
            active: 0,
            today,
            due_input: String::new(),
            error: None,
        }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn active_field(&self) -> FormField {
        FormField::ALL[self.active]
    }

    /// Date being typed into the due field, if any.
    pub fn due_input(&self) -> &str {
        &self.due_input
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn into_parts(self) -> (FormKind, Draft) {
        (self.kind, self.draft)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        let leaves_field = matches!(
            key.code,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down | KeyCode::Enter
        );
        if leaves_field && !self.due_input.is_empty() && !self.commit_due_input() {
            return FormAction::None;
        }

        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Tab | KeyCode::Down => {
                self.move_active(1);
                return FormAction::None;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_active(-1);
                return FormAction::None;
            }
            KeyCode::Enter => {
                if self.active + 1 >= FormField::ALL.len() {
                    return FormAction::Submit;
                }
                self.move_active(1);
                return FormAction::None;
            }
            _ => {}
        }

        match self.active_field() {
            FormField::Text => self.handle_text_key(key),
            FormField::Category => self.handle_category_key(key),
            FormField::Priority => self.handle_priority_key(key),
            FormField::DueDate => self.handle_due_key(key),
        }
        FormAction::None
    }

    fn handle_text_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('u') {
                self.draft.text.clear();
            }
            return;
        }
        match key.code {
            KeyCode::Backspace => {
                self.draft.text.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => self.draft.text.push(ch),
            _ => {}
        }
    }

    fn handle_category_key(&mut self, key: KeyEvent) {
        let current = Category::ALL
            .iter()
            .position(|entry| *entry == self.draft.category)
            .unwrap_or(0);
        self.draft.category = match key.code {
            KeyCode::Char('w') => Category::Work,
            KeyCode::Char('p') => Category::Personal,
            KeyCode::Left | KeyCode::Char('h') => Category::ALL[cycle(current, -1, Category::ALL.len())],
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                Category::ALL[cycle(current, 1, Category::ALL.len())]
            }
            _ => return,
        };
    }

    fn handle_priority_key(&mut self, key: KeyEvent) {
        let current = Priority::ALL
            .iter()
            .position(|entry| *entry == self.draft.priority)
            .unwrap_or(1);
        self.draft.priority = match key.code {
            KeyCode::Char('1') => Priority::High,
            KeyCode::Char('2') => Priority::Medium,
            KeyCode::Char('3') => Priority::Low,
            KeyCode::Left | KeyCode::Char('h') => Priority::ALL[cycle(current, -1, Priority::ALL.len())],
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                Priority::ALL[cycle(current, 1, Priority::ALL.len())]
            }
            _ => return,
        };
    }

    fn handle_due_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(ch) if ch.is_ascii_digit() => {
                self.due_input.push(ch);
                return;
            }
            KeyCode::Char('-') if !self.due_input.is_empty() => {
                self.due_input.push('-');
                return;
            }
            KeyCode::Backspace => {
                self.due_input.pop();
                return;
            }
            _ => {}
        }

        self.due_input.clear();
        self.error = None;
        let due = self.draft.due_date;
        self.draft.due_date = match key.code {
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char('l') => {
                due.shift_days(1)
            }
            KeyCode::Left | KeyCode::Char('-') | KeyCode::Char('h') => due.shift_days(-1),
            KeyCode::Char(']') => due.shift_days(7),
            KeyCode::Char('[') => due.shift_days(-7),
            KeyCode::Char('t') => DueDate::new(self.today),
            _ => return,
        };
    }

    /// Apply the typed date. Returns false and records an error if it does not parse.
    fn commit_due_input(&mut self) -> bool {
        match DueDate::parse_input(&self.due_input, self.today) {
            Ok(due) => {
                self.draft.due_date = due;
                self.due_input.clear();
                self.error = None;
                true
            }
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }

    fn move_active(&mut self, delta: isize) {
        self.active = cycle(self.active, delta, FormField::ALL.len());
    }
}

fn cycle(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (current as isize + delta).rem_euclid(len as isize) as usize
}
