//! Task records and their stored form.
//!
//! The whole task list is stored as one JSON array. Field names, enum strings
//! and the due date layout (`Mon Jan 01 2024`) are fixed so lists written by
//! earlier versions of the app load unchanged.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Local, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Layout of `dueDate` in stored lists
pub const DUE_DATE_FORMAT: &str = "%a %b %d %Y";
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Task identifier, shaped like a millisecond timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        value
            .trim()
            .parse::<u64>()
            .map(TaskId)
            .map_err(|_| Error::InvalidArgument(format!("invalid task id '{}'", value.trim())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Work,
    Personal,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Work, Category::Personal];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        Category::ALL
            .into_iter()
            .find(|entry| entry.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "category must be Work or Personal, got '{trimmed}'"
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        Priority::ALL
            .into_iter()
            .find(|entry| entry.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "priority must be High, Medium or Low, got '{trimmed}'"
                ))
            })
    }
}

/// Calendar date a task is due on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DueDate(NaiveDate);

impl DueDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today in the local timezone
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Parse a stored value: the `Mon Jan 01 2024` layout, or ISO `2024-01-01`.
    pub fn parse_stored(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        NaiveDate::parse_from_str(trimmed, DUE_DATE_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT))
            .map(Self)
            .map_err(|_| Error::InvalidDate(trimmed.to_string()))
    }

    /// Parse user input relative to `today`.
    ///
    /// Accepts `today`, `tomorrow`, `yesterday`, `+N`/`-N` days, ISO dates and
    /// the stored layout.
    pub fn parse_input(value: &str, today: NaiveDate) -> Result<Self> {
        let trimmed = value.trim();
        let base = Self(today);
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "today" => return Ok(base),
            "tomorrow" => return Ok(base.shift_days(1)),
            "yesterday" => return Ok(base.shift_days(-1)),
            _ => {}
        }

        if let Some(rest) = trimmed.strip_prefix('+').or_else(|| trimmed.strip_prefix('-')) {
            if let Ok(days) = rest.parse::<i64>() {
                let days = if trimmed.starts_with('-') { -days } else { days };
                return Ok(base.shift_days(days));
            }
        }

        Self::parse_stored(trimmed)
    }

    /// Move by whole days; stays put if the result is out of range.
    pub fn shift_days(self, days: i64) -> Self {
        let shifted = if days >= 0 {
            self.0.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.0.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        shifted.map(Self).unwrap_or(self)
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DUE_DATE_FORMAT))
    }
}

impl Serialize for DueDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DueDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DueDate::parse_stored(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub category: Category,
    pub priority: Priority,
    pub due_date: DueDate,
    pub completed: bool,
}

impl Task {
    pub fn from_draft(id: TaskId, draft: Draft) -> Self {
        Self {
            id,
            text: draft.text,
            category: draft.category,
            priority: draft.priority,
            due_date: draft.due_date,
            completed: false,
        }
    }

    /// Copy the editable fields from `draft`; `id` and `completed` stay.
    pub fn apply(&mut self, draft: &Draft) {
        self.text = draft.text.clone();
        self.category = draft.category;
        self.priority = draft.priority;
        self.due_date = draft.due_date;
    }

    /// `text - category - priority`, the one-line list label
    pub fn summary(&self) -> String {
        format!("{} - {} - {}", self.text, self.category, self.priority)
    }
}

/// Uncommitted task fields under creation or edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub category: Category,
    pub priority: Priority,
    pub due_date: DueDate,
}

impl Draft {
    pub fn new(due_date: DueDate) -> Self {
        Self {
            text: String::new(),
            category: Category::default(),
            priority: Priority::default(),
            due_date,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            text: task.text.clone(),
            category: task.category,
            priority: task.priority,
            due_date: task.due_date,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: DueDate) -> Self {
        self.due_date = due_date;
        self
    }
}

/// Hands out strictly increasing ids.
///
/// An id is the current time in milliseconds unless that would not exceed the
/// last id handed out or observed, in which case it is `last + 1`.
#[derive(Debug, Clone, Default)]
pub struct IdSequence {
    last: u64,
}

impl IdSequence {
    /// Sequence whose ids all exceed those in `tasks`
    pub fn after(tasks: &[Task]) -> Self {
        Self {
            last: tasks.iter().map(|task| task.id.0).max().unwrap_or(0),
        }
    }

    /// `None` once `u64::MAX` has been handed out or observed.
    pub fn next_id(&mut self) -> Option<TaskId> {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        self.next_at(now)
    }

    pub fn next_at(&mut self, now_ms: u64) -> Option<TaskId> {
        let id = now_ms.max(self.last.checked_add(1)?);
        self.last = id;
        Some(TaskId(id))
    }
}

pub fn encode_tasks(tasks: &[Task]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(tasks)?)
}

pub fn decode_tasks(bytes: &[u8]) -> Result<Vec<Task>> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_task() -> Task {
        Task {
            id: TaskId(1704067200000),
            text: "Buy milk".to_string(),
            category: Category::Work,
            priority: Priority::Medium,
            due_date: DueDate::new(date(2024, 1, 1)),
            completed: false,
        }
    }

    #[test]
    fn encodes_stored_layout() {
        let encoded = encode_tasks(&[sample_task()]).unwrap();
        assert_eq!(
            String::from_utf8(encoded).unwrap(),
            r#"[{"id":1704067200000,"text":"Buy milk","category":"Work","priority":"Medium","dueDate":"Mon Jan 01 2024","completed":false}]"#
        );
    }

    #[test]
    fn decodes_existing_lists() {
        let raw = br#"[
            {"id":1,"text":"a","category":"Personal","priority":"High","dueDate":"Fri Mar 15 2024","completed":true,"extra":42},
            {"id":2,"text":"","category":"Work","priority":"Low","dueDate":"2024-03-16","completed":false}
        ]"#;
        let tasks = decode_tasks(raw).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].category, Category::Personal);
        assert_eq!(tasks[0].priority, Priority::High);
        assert_eq!(tasks[0].due_date.date(), date(2024, 3, 15));
        assert!(tasks[0].completed);
        assert_eq!(tasks[1].text, "");
        assert_eq!(tasks[1].due_date.date(), date(2024, 3, 16));
    }

    #[test]
    fn decode_rejects_unknown_enum_strings() {
        let raw = br#"[{"id":1,"text":"a","category":"work","priority":"High","dueDate":"Fri Mar 15 2024","completed":false}]"#;
        assert!(decode_tasks(raw).is_err());
    }

    #[test]
    fn decode_rejects_non_list() {
        assert!(decode_tasks(br#"{"tasks":[]}"#).is_err());
        assert!(decode_tasks(b"not json").is_err());
    }

    #[test]
    fn parse_input_accepts_relative_and_absolute() {
        let today = date(2024, 1, 31);
        let parse = |value: &str| DueDate::parse_input(value, today).unwrap().date();
        assert_eq!(parse("today"), today);
        assert_eq!(parse(""), today);
        assert_eq!(parse("Tomorrow"), date(2024, 2, 1));
        assert_eq!(parse("yesterday"), date(2024, 1, 30));
        assert_eq!(parse("+7"), date(2024, 2, 7));
        assert_eq!(parse("-31"), date(2023, 12, 31));
        assert_eq!(parse("2024-06-01"), date(2024, 6, 1));
        assert_eq!(parse("Sat Jun 01 2024"), date(2024, 6, 1));
        assert!(matches!(
            DueDate::parse_input("someday", today),
            Err(Error::InvalidDate(_))
        ));
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("personal".parse::<Category>().unwrap(), Category::Personal);
        assert_eq!(" LOW ".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Category::default(), Category::Work);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn id_sequence_is_strictly_increasing() {
        let mut ids = IdSequence::default();
        assert_eq!(ids.next_at(100), Some(TaskId(100)));
        assert_eq!(ids.next_at(100), Some(TaskId(101)));
        assert_eq!(ids.next_at(50), Some(TaskId(102)));
        assert_eq!(ids.next_at(500), Some(TaskId(500)));

        let mut after = IdSequence::after(&[sample_task()]);
        assert_eq!(after.next_at(10), Some(TaskId(1704067200001)));
    }

    #[test]
    fn id_sequence_stops_at_max() {
        let mut ids = IdSequence::default();
        assert_eq!(ids.next_at(u64::MAX), Some(TaskId(u64::MAX)));
        assert_eq!(ids.next_at(u64::MAX), None);
        assert_eq!(ids.next_at(5), None);

        let mut task = sample_task();
        task.id = TaskId(u64::MAX);
        assert_eq!(IdSequence::after(&[task]).next_at(0), None);
    }

    #[test]
    fn apply_keeps_identity_and_completion() {
        let mut task = sample_task();
        task.completed = true;
        let draft = Draft::new(DueDate::new(date(2025, 5, 5)))
            .with_text("Call mom")
            .with_category(Category::Personal)
            .with_priority(Priority::High);
        task.apply(&draft);
        assert_eq!(task.id, TaskId(1704067200000));
        assert!(task.completed);
        assert_eq!(Draft::from_task(&task), draft);
        assert_eq!(task.summary(), "Call mom - Personal - High");
    }
}
