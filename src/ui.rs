use std::io;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};

use crate::app::{App, Form, FormField, Mode};
use crate::storage::KeyValueStore;
use crate::task::{Clock, Priority, Todo};

pub fn run_app<B: Backend, S: KeyValueStore, C: Clock>(
    terminal: &mut Terminal<B>,
    app: &mut App<S, C>,
) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key);
            }
        }
    }
    Ok(())
}

pub fn draw<S: KeyValueStore, C: Clock>(f: &mut Frame, app: &App<S, C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_filters(f, app, chunks[1]);
    draw_list(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);

    if let Mode::Form(form) = &app.mode {
        draw_form(f, form);
    }
}

fn draw_header<S: KeyValueStore, C: Clock>(f: &mut Frame, app: &App<S, C>, area: Rect) {
    let stats = app.stats();
    let line = Line::from(vec![
        Span::raw(format!("Total: {}  ", stats.total)),
        Span::styled(format!("Active: {}  ", stats.active), Style::default().fg(Color::Yellow)),
        Span::styled(format!("Completed: {}", stats.completed), Style::default().fg(Color::Green)),
    ]);
    let header = Paragraph::new(line).block(Block::default().title("Todos").borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_filters<S: KeyValueStore, C: Clock>(f: &mut Frame, app: &App<S, C>, area: Rect) {
    let filter = &app.filter;
    let searching = app.mode == Mode::Search;
    let search = if searching {
        format!("{}_", filter.search)
    } else {
        filter.search.clone()
    };

    let line = Line::from(vec![
        Span::raw("Search: "),
        Span::styled(
            search,
            if searching {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            },
        ),
        Span::raw(format!(
            "  Priority: {}  Category: {}  Status: {}",
            filter.priority.map_or("all", Priority::label),
            filter.category.as_deref().unwrap_or("all"),
            filter.status.label(),
        )),
    ]);
    let border = if searching {
        Style::default().fg(Color::Cyan)
    } else if filter.is_active() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let title = if filter.is_active() { "Filters (x to clear)" } else { "Filters" };
    let bar = Paragraph::new(line).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border),
    );
    f.render_widget(bar, area);
}

fn draw_list<S: KeyValueStore, C: Clock>(f: &mut Frame, app: &App<S, C>, area: Rect) {
    let visible = app.visible();
    let block = Block::default().borders(Borders::ALL);

    if visible.is_empty() {
        let message = if app.todos.is_empty() {
            "No todos yet. Press 'a' to add one."
        } else {
            "No todos match the current filters."
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = visible.iter().map(|t| todo_item(t)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray));

    let mut state = ListState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn todo_item(todo: &Todo) -> ListItem<'_> {
    let text_style = if todo.completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(Color::White)
    };

    let mut first = vec![
        Span::raw(if todo.completed { "[x] " } else { "[ ] " }),
        Span::styled(todo.title.as_str(), text_style),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", todo.priority),
            Style::default().fg(priority_color(todo.priority)),
        ),
    ];
    if let Some(category) = &todo.category {
        first.push(Span::styled(
            format!(" #{category}"),
            Style::default().fg(Color::Blue),
        ));
    }

    let mut lines = vec![Line::from(first)];
    if let Some(description) = &todo.description {
        lines.push(Line::from(Span::styled(
            format!("    {description}"),
            text_style.fg(Color::Gray),
        )));
    }
    ListItem::new(lines)
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn draw_footer<S: KeyValueStore, C: Clock>(f: &mut Frame, app: &App<S, C>, area: Rect) {
    let text = match (&app.status, &app.mode) {
        (Some(status), _) => status.clone(),
        (None, Mode::Normal) => {
            "a add  e edit  space toggle  d delete  / search  p/c/s filter  x clear  q quit".to_string()
        }
        (None, Mode::Search) => "type to search  enter done  esc clear".to_string(),
        (None, Mode::Form(_)) => "tab next field  \u{2190}/\u{2192}/space priority  enter save  esc cancel".to_string(),
    };
    let footer = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

fn draw_form(f: &mut Frame, form: &Form) {
    let area = centered(f.area(), 60, 12);
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(form.title())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(FormField::ALL.map(|_| Constraint::Length(2)))
        .split(inner);

    for (field, row) in FormField::ALL.into_iter().zip(rows.iter()) {
        let value = match field {
            FormField::Title => form.draft.title.clone(),
            FormField::Description => form.draft.description.clone(),
            FormField::Category => form.draft.category.clone(),
            FormField::Priority => format!("< {} >", form.draft.priority),
        };
        let focused = form.field == field;
        let style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let cursor = if focused && field != FormField::Priority { "_" } else { "" };
        let line = Line::from(vec![
            Span::styled(format!("{:<12}", field.label()), style),
            Span::raw(value),
            Span::styled(cursor, style),
        ]);
        f.render_widget(Paragraph::new(line), *row);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    rect
}
