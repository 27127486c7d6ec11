//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use ticklist_core::{Priority, Todo};

use super::app::{ActivePane, App, Filter, InputMode, Page};
use crate::output::{priority_label, truncate};

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    // Tabs on top, page in the middle, status bar at the bottom
    let outer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_tabs(frame, app, outer_chunks[0]);

    match app.page {
        Page::Todos => draw_todos_page(frame, app, outer_chunks[1]),
        Page::Stats => draw_stats_page(frame, app, outer_chunks[1]),
    }

    match app.input_mode {
        InputMode::Normal => draw_status_bar(frame, app, outer_chunks[2]),
        InputMode::Add => draw_input(frame, app, outer_chunks[2], "add: ", Color::Yellow),
        InputMode::Search => draw_input(frame, app, outer_chunks[2], "/", Color::Cyan),
    }

    if app.show_help {
        draw_help_overlay(frame);
    }
}

fn draw_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tab = |label: &'static str, page: Page| {
        if app.page == page {
            Span::styled(
                label,
                Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED),
            )
        } else {
            Span::styled(label, Style::default().add_modifier(Modifier::DIM))
        }
    };

    let line = Line::from(vec![
        tab(" 1 Todos ", Page::Todos),
        Span::raw(" "),
        tab(" 2 Statistics ", Page::Stats),
        Span::styled(
            format!("   sort: {}", app.sort),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_todos_page(frame: &mut Frame, app: &App, area: Rect) {
    let pane_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(45),
            Constraint::Percentage(35),
        ])
        .split(area);

    draw_filters_pane(frame, app, pane_chunks[0]);
    draw_items_pane(frame, app, pane_chunks[1]);
    draw_detail_pane(frame, app, pane_chunks[2]);
}

fn pane_block(title: String, is_active: bool) -> Block<'static> {
    let border_style = if is_active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn highlight_style(is_active: bool) -> Style {
    if is_active {
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    }
}

/// Draw the filters pane (left)
fn draw_filters_pane(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = app.active_pane == ActivePane::Filters;

    let items: Vec<ListItem> = app
        .filters
        .iter()
        .map(|filter| {
            let name = match filter {
                Filter::All => "All".to_string(),
                Filter::Pending => "○ Pending".to_string(),
                Filter::Completed => "✓ Completed".to_string(),
                Filter::Overdue => "! Overdue".to_string(),
                Filter::Category(name) => format!("  #{}", name),
            };
            ListItem::new(name)
        })
        .collect();

    let list = List::new(items)
        .block(pane_block(" Filters ".to_string(), is_active))
        .highlight_style(highlight_style(is_active));

    let mut state = ListState::default();
    state.select(Some(app.filter_index));

    frame.render_stateful_widget(list, area, &mut state);
}

fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::High => Style::default().fg(Color::Red),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::Low => Style::default().fg(Color::Green),
    }
}

/// Draw the items pane (middle)
fn draw_items_pane(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = app.active_pane == ActivePane::Items;
    let max_len = area.width.saturating_sub(12) as usize;

    let items: Vec<ListItem> = app
        .todos
        .iter()
        .map(|todo| {
            let check = if todo.completed { "[x] " } else { "[ ] " };
            let mut text_style = Style::default();
            if todo.completed {
                text_style = text_style.add_modifier(Modifier::DIM | Modifier::CROSSED_OUT);
            } else if todo.is_overdue(app.today) {
                text_style = text_style.fg(Color::Red);
            }

            ListItem::new(Line::from(vec![
                Span::raw(check),
                Span::styled(
                    format!("{:<4} ", priority_label(todo.priority)),
                    priority_style(todo.priority),
                ),
                Span::styled(truncate(&todo.text, max_len), text_style),
            ]))
        })
        .collect();

    let title = format!(" Todos ({}) ", app.todos.len());
    let list = List::new(items)
        .block(pane_block(title, is_active))
        .highlight_style(highlight_style(is_active));

    let mut state = ListState::default();
    if !app.todos.is_empty() {
        state.select(Some(app.todo_index));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn field(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(value),
    ])
}

fn detail_lines(todo: &Todo, app: &App) -> Vec<Line<'static>> {
    let due = match todo.due_date {
        Some(due) if todo.is_overdue(app.today) => format!("{} (overdue)", due.format("%Y-%m-%d")),
        Some(due) => due.format("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    };

    vec![
        field("Text: ", todo.text.clone()),
        Line::from(""),
        field(
            "Status: ",
            if todo.completed { "done" } else { "pending" }.to_string(),
        ),
        field("Category: ", todo.category.clone()),
        field("Priority: ", todo.priority.to_string()),
        field("Due: ", due),
        Line::from(""),
        field(
            "Created: ",
            todo.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ),
        field("ID: ", todo.id.to_string()),
    ]
}

/// Draw the detail pane (right)
fn draw_detail_pane(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = app.active_pane == ActivePane::Detail;

    let content = match app.current_todo() {
        Some(todo) => detail_lines(todo, app),
        None => vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Press a to add a todo",
                Style::default().add_modifier(Modifier::DIM),
            )]),
        ],
    };

    let paragraph = Paragraph::new(content)
        .block(pane_block(" Detail ".to_string(), is_active))
        .wrap(Wrap { trim: true })
        .scroll((app.detail_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn draw_stats_page(frame: &mut Frame, app: &App, area: Rect) {
    let stats = &app.stats;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(6),
        ])
        .split(area);

    let summary = vec![
        field("Total:     ", stats.total.to_string()),
        field("Completed: ", stats.completed.to_string()),
        field("Pending:   ", stats.pending.to_string()),
    ];
    frame.render_widget(
        Paragraph::new(summary).block(pane_block(" Summary ".to_string(), false)),
        rows[0],
    );

    let gauge = Gauge::default()
        .block(pane_block(" Completion ".to_string(), false))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(stats.completion_rate.round().clamp(0.0, 100.0) as u16)
        .label(format!("{:.1}%", stats.completion_rate));
    frame.render_widget(gauge, rows[1]);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[2]);

    let category_data: Vec<(&str, u64)> = stats
        .by_category
        .iter()
        .map(|(name, count)| (name.as_str(), *count as u64))
        .collect();
    let category_chart = BarChart::default()
        .block(pane_block(" By category ".to_string(), false))
        .data(category_data.as_slice())
        .bar_width(7)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan));
    frame.render_widget(category_chart, charts[0]);

    let priority_data: Vec<(&str, u64)> = Priority::ALL
        .iter()
        .map(|level| {
            let count = stats.by_priority.get(level).copied().unwrap_or(0);
            (level.as_str(), count as u64)
        })
        .collect();
    let priority_chart = BarChart::default()
        .block(pane_block(" By priority ".to_string(), false))
        .data(priority_data.as_slice())
        .bar_width(7)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Magenta));
    frame.render_widget(priority_chart, charts[1]);
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else if !app.search_text.is_empty() {
        format!("search: {}  (Esc in / to clear)", app.search_text)
    } else {
        "a:add  space:done  e:edit  p:priority  d:del  s:sort  /:search  ?:help  q:quit"
            .to_string()
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Draw add/search input at the bottom
fn draw_input(frame: &mut Frame, app: &App, area: Rect, prefix: &'static str, color: Color) {
    let mut spans = vec![
        Span::styled(prefix, Style::default().fg(color)),
        Span::raw(app.input.as_str()),
    ];
    if app.input_mode == InputMode::Search {
        spans.push(Span::styled(
            format!("  ({} matches)", app.todos.len()),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);

    let cursor_x = area.x + prefix.len() as u16 + app.cursor as u16;
    frame.set_cursor_position((cursor_x, area.y));
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    let popup_width = 50.min(area.width.saturating_sub(4));
    let popup_height = 22.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  h/l, ←/→    Switch panes"),
        Line::from("  Tab         Cycle panes"),
        Line::from("  1 / 2       Todos / Statistics page"),
        Line::from(""),
        Line::from("Commands:"),
        Line::from("  a           Add todo"),
        Line::from("  space       Toggle done"),
        Line::from("  e           Edit in $EDITOR"),
        Line::from("  p           Cycle priority"),
        Line::from("  d d         Delete todo"),
        Line::from("  s           Cycle sort order"),
        Line::from("  /           Search"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, popup_area);
}
