//! TUI rendering.
//!
//! Everything here reads [`App`] and draws; nothing mutates state. The
//! screen geometry lives in [`layout`] so mouse hit-testing in
//! [`App::handle_mouse`](crate::app::App::handle_mouse) agrees with what
//! was drawn.

use crate::app::{App, Focus};
use crate::models::Category;
use ratatui::{
    prelude::*,
    widgets::{canvas::*, *}, // Imports Points, Circle, Map, etc.
};

use ratatui::text::Line;

/// Screen regions of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Areas {
    pub map: Rect,
    pub map_canvas: Rect,
    pub location: Rect,
    pub help: Rect,
    pub form: Rect,
    pub title_field: Rect,
    pub date_field: Rect,
    pub trigger: Rect,
    pub results: Rect,
    pub history: Rect,
    pub history_list: Rect,
}

/// Map and location on the left (60%), form, results and history on the right.
pub fn layout(area: Rect) -> Areas {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(12),
            Constraint::Min(4),
        ])
        .split(columns[1]);

    let form_inner = Block::bordered().inner(right[0]);
    let form_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(form_inner);

    Areas {
        map: left[0],
        map_canvas: Block::bordered().inner(left[0]),
        location: left[1],
        help: left[2],
        form: right[0],
        title_field: form_rows[0],
        date_field: form_rows[1],
        trigger: form_rows[2],
        results: right[1],
        history: right[2],
        history_list: Block::bordered().inner(right[2]),
    }
}

/// Each history entry takes two lines: title, then date and place.
pub const HISTORY_ROW_HEIGHT: u16 = 2;

/// First history entry drawn so that `selected` stays visible.
pub fn history_offset(selected: usize, list_height: u16) -> usize {
    let visible = (list_height / HISTORY_ROW_HEIGHT).max(1) as usize;
    selected.saturating_sub(visible - 1)
}

/// Renders one frame of the TUI based on current application state.
pub fn render(f: &mut Frame, app: &App) {
    let areas = layout(f.size());

    render_map(f, app, areas.map);
    render_location(f, app, areas.location);
    render_help(f, areas.help);
    render_form(f, app, &areas);
    render_results(f, app, areas.results);
    render_history(f, app, areas.history);

    if let Some(ref notice) = app.notice {
        render_notice(f, notice);
    }
}

fn focus_border(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_map(f: &mut Frame, app: &App, area: Rect) {
    let view = app.map.viewport();
    let inner = Block::bordered().inner(area);
    let (x_bounds, y_bounds) = view.bounds(inner);
    let (m_lat, m_lon) = app.map.marker();
    let dragging = app.map.is_dragging();

    let canvas = Canvas::default()
        .block(
            Block::bordered()
                .title(format!(" Map  zoom {} ", view.zoom))
                .border_type(BorderType::Rounded)
                .border_style(focus_border(app, Focus::Map)),
        )
        .marker(symbols::Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: Color::Rgb(70, 90, 70),
                resolution: MapResolution::High,
            });
            ctx.layer();

            let marker_style = if dragging {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            };
            ctx.print(m_lon, m_lat, Line::from(Span::styled("◉", marker_style)));
        });

    f.render_widget(canvas, area);
}

fn render_location(f: &mut Frame, app: &App, area: Rect) {
    let label = app.map.label();
    let line = Line::from(vec![
        Span::styled(" ⌖ ", Style::default().fg(Color::Cyan)),
        Span::styled(
            label.name.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  │  "),
        Span::styled(label.coordinates.as_str(), Style::default().fg(Color::Yellow)),
    ]);
    let p = Paragraph::new(line).block(
        Block::bordered()
            .title(" Location ")
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(p, area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        " click/drag map  ←↑↓→ move  +/- zoom  Tab focus  Enter analyze  r history  q quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, area);
}

fn render_form(f: &mut Frame, app: &App, areas: &Areas) {
    let block = Block::bordered()
        .title(" Event ")
        .border_type(BorderType::Rounded)
        .border_style(
            if matches!(app.focus, Focus::Title | Focus::Date) {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            },
        );
    f.render_widget(block, areas.form);

    let field = |label: &'static str, value: &str, focused: bool| {
        let cursor = if focused { "▏" } else { "" };
        let value_style = if focused {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        };
        Line::from(vec![
            Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("{}{}", value, cursor), value_style),
        ])
    };

    let date_value = if app.form.date.is_empty() && app.focus != Focus::Date {
        "YYYY-MM-DD"
    } else {
        app.form.date.as_str()
    };

    f.render_widget(
        Paragraph::new(field("Title: ", &app.form.title, app.focus == Focus::Title)),
        areas.title_field,
    );
    f.render_widget(
        Paragraph::new(field("Date:  ", date_value, app.focus == Focus::Date)),
        areas.date_field,
    );

    let trigger = app.analysis.trigger();
    let trigger_style = if trigger.enabled {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray).bg(Color::Rgb(30, 30, 30))
    };
    f.render_widget(
        Paragraph::new(Span::styled(format!(" {} ", trigger.label), trigger_style))
            .alignment(Alignment::Center),
        areas.trigger,
    );
}

fn render_results(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::bordered()
        .title(" Historical Weather ")
        .border_type(BorderType::Rounded);

    if let Some(text) = app.analysis.placeholder() {
        let style = if text.starts_with("Error") {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let p = Paragraph::new(text)
            .style(style)
            .wrap(Wrap { trim: true })
            .block(block.padding(Padding::new(1, 1, 1, 0)));
        f.render_widget(p, area);
        return;
    }

    let Some(view) = app.analysis.results() else {
        f.render_widget(block, area);
        return;
    };

    let row = |label: &'static str, value: &str| {
        Line::from(vec![
            Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(value.to_string()),
        ])
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Pleasant score: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                view.pleasant_score.clone(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
        row("Avg max temp:   ", &view.avg_temp),
        row("Record low:     ", &view.min_temp),
        row("Record high:    ", &view.max_temp),
        row("Avg rainfall:   ", &view.avg_precip),
        row("Avg wind:       ", &view.avg_wind),
    ];

    if let Some(alert) = app.analysis.alert() {
        let color = category_color(alert.category);
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {} ", alert.title),
            Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            alert.recommendation.as_str(),
            Style::default().fg(color),
        )));
    }

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(block.padding(Padding::new(1, 1, 0, 0)));
    f.render_widget(p, area);
}

fn render_history(f: &mut Frame, app: &App, area: Rect) {
    let title = if app.history.is_unavailable() {
        " History (unavailable) "
    } else {
        " History "
    };
    let block = Block::bordered()
        .title(title)
        .border_type(BorderType::Rounded)
        .border_style(focus_border(app, Focus::History));

    let inner = block.inner(area);
    let offset = history_offset(app.history.selected_index(), inner.height);
    let items = app.history.items();

    let rows: Vec<ListItem> = app
        .history
        .rows()
        .into_iter()
        .enumerate()
        .skip(if items.is_empty() { 0 } else { offset })
        .map(|(i, row)| {
            let color = items
                .get(i)
                .and_then(|item| item.status_color)
                .map(category_color)
                .unwrap_or(Color::White);
            let selected = !items.is_empty()
                && i == app.history.selected_index()
                && app.focus == Focus::History;
            let title_style = if selected {
                Style::default()
                    .fg(Color::Cyan)
                    .bg(Color::Rgb(30, 30, 60))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            };
            ListItem::new(vec![
                Line::from(Span::styled(row.title, title_style)),
                Line::from(Span::styled(row.details, Style::default().fg(Color::DarkGray))),
            ])
        })
        .collect();

    f.render_widget(List::new(rows).block(block), area);
}

/// Blocking message box in the middle of the screen.
fn render_notice(f: &mut Frame, notice: &str) {
    let area = f.size();
    let width = (notice.chars().count() as u16 + 6).min(area.width);
    let height = 5.min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };
    f.render_widget(Clear, popup);
    let p = Paragraph::new(vec![
        Line::from(Span::styled(notice, Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled("press any key", Style::default().fg(Color::DarkGray))),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::bordered()
            .title(" Notice ")
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(p, popup);
}

/// Colors for the server's weather categories.
fn category_color(category: Category) -> Color {
    match category {
        Category::Danger => Color::Red,
        Category::Warning => Color::Yellow,
        Category::Info => Color::Cyan,
        Category::Secondary => Color::Gray,
        Category::Success => Color::Green,
        Category::Normal | Category::Other => Color::White,
    }
}
