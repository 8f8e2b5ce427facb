use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::kv::KvStore;
use crate::task::{Category, Priority, Task};

use super::app::{AppState, StatusKind};
use super::form::{DraftForm, FormField, FormKind};

const LABEL_WIDTH: usize = 10;
const HELP_KEY_WIDTH: usize = 14;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);

pub fn render<K: KvStore>(frame: &mut Frame, app: &AppState<K>) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(area);

    render_list(frame, app, chunks[0]);
    render_footer(frame, app, chunks[1]);

    if let Some(form) = app.form.as_ref() {
        render_form_modal(frame, area, form);
    } else if app.show_help {
        render_help_modal(frame, area);
    }
}

fn render_list<K: KvStore>(frame: &mut Frame, app: &AppState<K>, area: Rect) {
    let inner_height = area.height.saturating_sub(2) as usize;
    let width = area.width.saturating_sub(2) as usize;
    let tasks = app.tasks();
    let selected = app.selected_index();

    let mut lines = Vec::new();
    if tasks.is_empty() {
        lines.push(Line::from(Span::styled(
            "No tasks yet. Press a to add one.",
            Style::default().fg(COLOR_MUTED),
        )));
    } else {
        let (start, end) = list_window(tasks.len(), selected, inner_height);
        for (idx, task) in tasks.iter().enumerate().take(end).skip(start) {
            lines.push(render_task_row(task, selected == Some(idx), width));
        }
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER_LIST))
            .title(format!("Tasks ({})", tasks.len())),
    );
    frame.render_widget(widget, area);
}

fn render_task_row(task: &Task, selected: bool, width: usize) -> Line<'static> {
    let check = if task.completed { "[x] " } else { "[ ] " };
    let due = format!("  Due: {}", task.due_date);
    let summary_width = width.saturating_sub(check.len() + due.chars().count());
    let summary = truncate_text(&task.summary(), summary_width);

    let mut summary_style = Style::default().fg(COLOR_TEXT);
    if task.completed {
        summary_style = summary_style
            .fg(COLOR_MUTED_DARK)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    let check_style = if task.completed {
        Style::default().fg(COLOR_SUCCESS)
    } else {
        Style::default().fg(priority_color(task.priority))
    };

    let mut spans = vec![
        Span::styled(check.to_string(), check_style),
        Span::styled(summary, summary_style),
        Span::styled(due, Style::default().fg(COLOR_MUTED)),
    ];
    if selected {
        for span in &mut spans {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
    }
    Line::from(spans)
}

fn render_footer<K: KvStore>(frame: &mut Frame, app: &AppState<K>, area: Rect) {
    let hint_span = Span::styled(app.footer_hint(), Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = app.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status.to_string(), status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let counts_line = Line::from(Span::styled(
        app.count_summary(),
        Style::default().fg(COLOR_ACCENT),
    ));
    let widget = Paragraph::new(vec![line, counts_line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        );
    frame.render_widget(widget, area);
}

fn render_form_modal(frame: &mut Frame, area: Rect, form: &DraftForm) {
    let modal = centered_rect(64, 10, area);
    frame.render_widget(Clear, modal);

    let title = match form.kind() {
        FormKind::Add => "Add Task",
        FormKind::Edit(_) => "Edit Task",
    };
    let width = modal.width.saturating_sub(2) as usize;
    let widget = Paragraph::new(build_form_lines(form, width))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(widget, modal);
}

fn build_form_lines(form: &DraftForm, width: usize) -> Vec<Line<'static>> {
    let draft = form.draft();
    let value_width = width.saturating_sub(LABEL_WIDTH + 2);
    let mut lines = Vec::new();

    for field in FormField::ALL {
        let active = form.active_field() == field;
        let marker = if active { "> " } else { "  " };
        let mut spans = vec![
            Span::styled(marker.to_string(), Style::default().fg(COLOR_ACCENT)),
            label_span(field.label(), active),
        ];
        match field {
            FormField::Text => {
                let mut text = truncate_text(&draft.text, value_width.saturating_sub(1));
                if active {
                    text.push('_');
                }
                spans.push(Span::styled(text, Style::default().fg(COLOR_TEXT)));
            }
            FormField::Category => {
                for category in Category::ALL {
                    spans.extend(radio_spans(category.as_str(), category == draft.category));
                }
            }
            FormField::Priority => {
                for priority in Priority::ALL {
                    spans.extend(radio_spans(priority.as_str(), priority == draft.priority));
                }
            }
            FormField::DueDate => {
                let value = if form.due_input().is_empty() {
                    draft.due_date.to_string()
                } else {
                    format!("{}_", form.due_input())
                };
                spans.push(Span::styled(value, Style::default().fg(COLOR_TEXT)));
                if active && form.due_input().is_empty() {
                    spans.push(Span::styled(
                        "  -/+ day  [/] week  t today",
                        Style::default().fg(COLOR_MUTED_DARK),
                    ));
                }
            }
        }
        lines.push(Line::from(spans));
    }

    match form.error() {
        Some(error) => lines.push(Line::from(Span::styled(
            truncate_text(error, width),
            Style::default().fg(COLOR_ERROR),
        ))),
        None => lines.push(Line::from("")),
    }
    let action = match form.kind() {
        FormKind::Add => "add",
        FormKind::Edit(_) => "save",
    };
    lines.push(Line::from(Span::styled(
        format!("enter on Due to {action}, esc to cancel"),
        Style::default().fg(COLOR_MUTED),
    )));
    lines
}

fn render_help_modal(frame: &mut Frame, area: Rect) {
    let lines = build_help_lines(40);
    let modal = centered_rect(44, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, modal);
    let widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Help"));
    frame.render_widget(widget, modal);
}

fn build_help_lines(width: usize) -> Vec<Line<'static>> {
    vec![
        help_header("List"),
        help_line("j/k or up/down", "move selection", width),
        help_line("g/G", "first or last task", width),
        help_line("a", "add task", width),
        help_line("e/enter", "edit task", width),
        help_line("space/x", "toggle done", width),
        help_line("d", "delete task", width),
        help_line("q/esc", "quit", width),
        help_header("Dialog"),
        help_line("tab/shift+tab", "next or previous field", width),
        help_line("enter", "next field, save on Due", width),
        help_line("w/p 1/2/3", "pick category or priority", width),
        help_line("-/+ [/] t", "move due date, or type it", width),
        help_line("esc", "cancel", width),
    ]
}

fn help_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD),
    ))
}

fn help_line(keys: &str, desc: &str, width: usize) -> Line<'static> {
    let key_text = pad_text(keys, HELP_KEY_WIDTH.min(width));
    let desc_text = truncate_text(desc, width.saturating_sub(HELP_KEY_WIDTH + 1));
    Line::from(vec![
        Span::styled(
            key_text,
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(desc_text, Style::default().fg(COLOR_MUTED)),
    ])
}

fn radio_spans(label: &str, checked: bool) -> Vec<Span<'static>> {
    let (mark, style) = if checked {
        ("(o) ", Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD))
    } else {
        ("( ) ", Style::default().fg(COLOR_MUTED))
    };
    vec![
        Span::styled(format!("{mark}{label}"), style),
        Span::raw("  "),
    ]
}

fn label_span(label: &str, active: bool) -> Span<'static> {
    let style = if active {
        Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_MUTED_DARK)
    };
    Span::styled(pad_text(label, LABEL_WIDTH), style)
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => COLOR_ERROR,
        Priority::Medium => COLOR_WARNING,
        Priority::Low => COLOR_INFO,
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn list_window(total: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let selected = selected.unwrap_or(0);
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn pad_text(value: &str, width: usize) -> String {
    let text = truncate_text(value, width);
    format!("{text:width$}")
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Draft, DueDate, TaskId};
    use chrono::NaiveDate;

    fn sample_task(completed: bool) -> Task {
        let due = DueDate::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let mut task = Task::from_draft(TaskId(7), Draft::new(due).with_text("Buy milk"));
        task.completed = completed;
        task
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn list_window_keeps_selection_visible() {
        assert_eq!(list_window(0, None, 5), (0, 0));
        assert_eq!(list_window(3, Some(2), 5), (0, 3));
        assert_eq!(list_window(20, Some(10), 5), (8, 13));
        assert_eq!(list_window(20, Some(19), 5), (15, 20));
    }

    #[test]
    fn truncate_text_marks_cut() {
        assert_eq!(truncate_text("abcdef", 10), "abcdef");
        assert_eq!(truncate_text("abcdef", 5), "ab...");
        assert_eq!(truncate_text("abcdef", 2), "ab");
        assert_eq!(truncate_text("abcdef", 0), "");
    }

    #[test]
    fn task_row_shows_summary_and_due() {
        let line = render_task_row(&sample_task(false), false, 80);
        assert_eq!(
            line_text(&line),
            "[ ] Buy milk - Work - Medium  Due: Mon Jan 01 2024"
        );
    }

    #[test]
    fn completed_row_is_struck_through() {
        let line = render_task_row(&sample_task(true), true, 80);
        assert!(line_text(&line).starts_with("[x] "));
        assert!(line.spans[1]
            .style
            .add_modifier
            .contains(Modifier::CROSSED_OUT));
        assert!(line.spans[0].style.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn form_lines_mark_checked_radio() {
        let form = DraftForm::edit(&sample_task(false), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let lines = build_form_lines(&form, 60);
        assert!(line_text(&lines[0]).contains("Buy milk_"));
        assert!(line_text(&lines[1]).contains("(o) Work"));
        assert!(line_text(&lines[1]).contains("( ) Personal"));
        assert!(line_text(&lines[2]).contains("(o) Medium"));
        assert!(line_text(&lines[3]).contains("Mon Jan 01 2024"));
        assert!(line_text(&lines[5]).contains("to save"));
    }
}
