use ratatui::{
    prelude::*,
    symbols,
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap,
        canvas::{Canvas, Map, MapResolution, Points},
    },
};
use sooptime_core::{
    model::{ClassifiedRecord, DATE_FORMAT, Status},
    render::{detail, marker, status_color},
    timestamp::format_opening,
};

use crate::app::{App, Screen};

// Viewport around the Korean peninsula, in degrees.
const LONGITUDE_BOUNDS: [f64; 2] = [124.5, 131.0];
const LATITUDE_BOUNDS: [f64; 2] = [33.0, 38.8];

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: controls, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    draw_controls(frame, app, *header_area);
    draw_overview(frame, app, *content_area);

    if app.screen == Screen::Detail
        && let Some(record) = app.selected_record()
    {
        draw_detail(frame, record, *content_area);
    }

    draw_status(frame, app, *status_area);
}

fn draw_controls(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let today_only = if app.filter.today_only { "on" } else { "off" };
    let reference = if app.screen == Screen::DateInput {
        format!("{}_", app.date_input)
    } else {
        app.filter.reference.format(DATE_FORMAT).to_string()
    };

    let controls = Line::from(vec![
        Span::raw("월: "),
        Span::styled(app.filter.month.label(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" · 오늘만: "),
        Span::styled(today_only, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" · 기준일: "),
        Span::styled(reference, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" · 표시 {}", app.pass.len())),
    ]);

    let title = format!(
        "sooptime – {} + {}",
        app.schedule_location, app.coords_location
    );
    let header = Paragraph::new(controls).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(header, area);
}

fn draw_overview(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [map_area, list_area] = chunks else {
        return;
    };

    draw_map(frame, app, *map_area);

    if let Some(notice) = app.notice() {
        let paragraph = Paragraph::new(notice.to_owned())
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title("Facilities"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, *list_area);
        return;
    }

    if app.is_loading {
        let paragraph = Paragraph::new("Loading datasets…")
            .block(Block::default().borders(Borders::ALL).title("Facilities"));
        frame.render_widget(paragraph, *list_area);
        return;
    }

    draw_facility_list(frame, app, *list_area);
}

fn draw_map(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let selected = app.selected_record().map(marker);

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title("Map"))
        .marker(symbols::Marker::Braille)
        .x_bounds(LONGITUDE_BOUNDS)
        .y_bounds(LATITUDE_BOUNDS)
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();

            // Later layers cover earlier ones, so today's markers stay on top.
            for status in [Status::Past, Status::Upcoming, Status::Today] {
                let coords = app
                    .pass
                    .records
                    .iter()
                    .filter(|record| record.status == status)
                    .map(|record| {
                        let position = marker(record);
                        (position.longitude, position.latitude)
                    })
                    .collect::<Vec<_>>();
                ctx.draw(&Points {
                    coords: &coords,
                    color: marker_color(status),
                });
                ctx.layer();
            }

            if let Some(position) = &selected {
                ctx.print(
                    position.longitude,
                    position.latitude,
                    Span::styled("◉", Style::default().fg(Color::Yellow)),
                );
            }
        });

    frame.render_widget(canvas, area);
}

fn draw_facility_list(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items = app
        .pass
        .records
        .iter()
        .map(|record| {
            let style = Style::default().fg(marker_color(record.status));
            ListItem::new(Line::from(vec![
                Span::styled("● ", style),
                Span::raw(record.entry.name.clone()),
                Span::styled(
                    format!("  {} · {}", status_label(record.status), format_opening(&record.representative)),
                    style,
                ),
            ]))
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Facilities (↑/↓, Enter for details)"),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

    let mut state = ListState::default();
    if !app.pass.is_empty() {
        state.select(Some(app.list_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_detail(frame: &mut Frame<'_>, record: &ClassifiedRecord, area: Rect) {
    let details = detail(record);
    let popup = centered(area, 60, 70);

    let mut lines = vec![
        Line::from(Span::styled(
            details.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(details.meta.clone(), Style::default().fg(Color::Gray))),
    ];
    if let Some(url) = &details.home_url {
        lines.push(Line::from(format!("공식홈페이지: {url}")));
    }
    lines.push(Line::from(Span::styled(
        format!(
            "{} · {}",
            status_label(record.status),
            format_opening(&record.representative)
        ),
        Style::default().fg(marker_color(record.status)),
    )));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "오픈일시",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.extend(
        details
            .openings
            .iter()
            .map(|opening| Line::from(format!("  • {opening}"))),
    );

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Details (Esc/←/b to close)"),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

fn draw_status(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let nav_hint = match app.screen {
        Screen::Overview => {
            "←/→ month · 0 all months · t today-only · d date · ↑/↓ move · Enter details · q/Ctrl-C quit"
        }
        Screen::Detail => "Esc/←/b close · q/Ctrl-C quit",
        Screen::DateInput => "Type YYYY-MM-DD · Enter apply · Esc cancel",
    };

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else {
        let skipped = app.pass.skipped.total();
        format!("{skipped} rows skipped · {nav_hint}")
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, area);
}

fn marker_color(status: Status) -> Color {
    status_color(status).parse().unwrap_or(Color::White)
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Past => "지남",
        Status::Today => "오늘",
        Status::Upcoming => "예정",
    }
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let Some(middle) = vertical.get(1) else {
        return area;
    };

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(*middle);
    horizontal.get(1).copied().unwrap_or(area)
}
