use {
    crate::{
        query::{efficiency_rate, route_progress, routes_for_driver, urgent_bins},
        state::FleetStore,
        ui::{
            renderer::{
                format_battery, format_eta, format_fill, format_temperature, format_time,
                status_color,
            },
            terminal::ViewState,
        },
    },
    ratatui::{
        layout::{Constraint, Direction, Layout as RatLayout, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Paragraph, Row, Table, TableState},
        Frame,
    },
};

/// Render the main UI layout
pub fn render_layout(f: &mut Frame, area: Rect, store: &FleetStore, view: &ViewState) {
    let chunks = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header + analytics
            Constraint::Min(0),    // Bins table
            Constraint::Length(6), // Routes
            Constraint::Length(3), // Footer/Status
        ])
        .split(area);

    render_header(f, chunks[0], store);

    if store.is_loading() {
        let loading = Paragraph::new("Loading fleet...")
            .block(Block::default().borders(Borders::ALL).title("Bins"));
        f.render_widget(loading, chunks[1]);
    } else {
        render_bins_table(f, chunks[1], store, view);
    }

    render_routes(f, chunks[2], store);
    render_footer(f, chunks[3], store, view);
}

fn render_header(f: &mut Frame, area: Rect, store: &FleetStore) {
    let analytics = store.analytics();

    let text = vec![
        Line::from(vec![
            Span::styled("Bins: ", Style::default().fg(Color::Cyan)),
            Span::raw(analytics.total_bins.to_string()),
            Span::raw(" | "),
            Span::styled("Empty: ", Style::default().fg(Color::Green)),
            Span::raw(analytics.empty_bins.to_string()),
            Span::raw(" | "),
            Span::styled("Half: ", Style::default().fg(Color::Yellow)),
            Span::raw(analytics.half_full_bins.to_string()),
            Span::raw(" | "),
            Span::styled("Full: ", Style::default().fg(Color::Red)),
            Span::raw(analytics.full_bins.to_string()),
            Span::raw(" | "),
            Span::styled("Avg fill: ", Style::default().fg(Color::Cyan)),
            Span::raw(format_fill(analytics.average_fill_rate)),
        ]),
        Line::from(vec![
            Span::styled("Collections 24h/7d: ", Style::default().fg(Color::Cyan)),
            Span::raw(format!("{}/{}", analytics.daily_collections, analytics.weekly_collections)),
            Span::raw(" | "),
            Span::styled("Predicted overflows: ", Style::default().fg(Color::Magenta)),
            Span::raw(analytics.predicted_overflows.to_string()),
            Span::raw(" | "),
            Span::styled("Efficiency: ", Style::default().fg(Color::Cyan)),
            Span::raw(format!("{:.1}%", efficiency_rate(&analytics))),
            Span::raw(" | "),
            Span::styled("Urgent: ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(urgent_bins(store.bins(), store.now()).len().to_string()),
        ]),
    ];

    let header = Block::default()
        .borders(Borders::ALL)
        .title("binflow - Fleet Monitor");

    f.render_widget(Paragraph::new(text).block(header), area);
}

fn render_bins_table(f: &mut Frame, area: Rect, store: &FleetStore, view: &ViewState) {
    let now = store.now();

    let header = Row::new(vec![
        "Bin", "Area", "Address", "Fill", "Status", "Battery", "Temp", "Full in", "Updated",
    ])
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = view
        .visible_bins(store.bins())
        .into_iter()
        .map(|bin| {
            Row::new(vec![
                bin.id.clone(),
                bin.location.area.clone(),
                bin.location.address.clone(),
                format_fill(bin.fill_level),
                bin.status.as_str().to_string(),
                format_battery(bin.battery_level),
                format_temperature(bin.temperature),
                format_eta(bin.predicted_full_time, now),
                format_time(bin.last_updated),
            ])
            .style(Style::default().fg(status_color(bin.status)))
        })
        .collect();

    let widths = [
        Constraint::Length(8),  // Bin
        Constraint::Length(18), // Area
        Constraint::Length(16), // Address
        Constraint::Length(7),  // Fill
        Constraint::Length(9),  // Status
        Constraint::Length(8),  // Battery
        Constraint::Length(6),  // Temp
        Constraint::Length(8),  // Full in
        Constraint::Length(9),  // Updated
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Bins ({})", view.filter_label())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = TableState::default().with_selected(Some(view.selected));
    f.render_stateful_widget(table, area, &mut state);
}

fn render_routes(f: &mut Frame, area: Rect, store: &FleetStore) {
    let rows: Vec<Row> = store
        .routes()
        .iter()
        .map(|route| {
            let progress = route_progress(route, store.bins());
            let driver = route
                .driver_id
                .as_deref()
                .and_then(|id| store.driver(id))
                .map(|d| d.name.clone())
                .unwrap_or_else(|| "unassigned".to_string());

            Row::new(vec![
                route.name.clone(),
                driver,
                route.status.as_str().to_string(),
                format!(
                    "{}/{} ({:.0}%)",
                    progress.collected_bins, progress.total_bins, progress.percent
                ),
                format!("{:.1} km", route.distance),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(20),
        Constraint::Length(16),
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Route", "Driver", "Status", "Collected", "Distance"]))
        .block(Block::default().borders(Borders::ALL).title("Routes"));

    f.render_widget(table, area);
}

fn render_footer(f: &mut Frame, area: Rect, store: &FleetStore, view: &ViewState) {
    let mut spans = vec![
        Span::styled("Driver: ", Style::default().fg(Color::Cyan)),
        Span::raw(view.driver_id.clone()),
        Span::raw(format!(
            " ({} routes)",
            routes_for_driver(store.routes(), &view.driver_id).len()
        )),
        Span::raw(" | "),
        Span::styled("Ticks: ", Style::default().fg(Color::Cyan)),
        Span::raw(store.ticks_applied().to_string()),
        Span::raw(" | "),
        Span::raw("↑/↓ select, f status, a area, c collect, q quit"),
    ];
    if let Some(message) = &view.message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(message.clone(), Style::default().fg(Color::Magenta)));
    }

    let footer = Block::default().borders(Borders::ALL).title("Status");
    f.render_widget(Paragraph::new(Line::from(spans)).block(footer), area);
}
