//! TUI views and rendering
//!
//! All rendering logic is contained here. The views module is responsible
//! for drawing the UI based on AppState, but never modifies state. Every
//! cost figure comes from the derived `CostBreakdown` - no view computes
//! or fetches an alternate total.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap};

use super::state::{ALL_VIEWS, AppState, FilterField, InteractionMode, SearchForm, View};
use crate::booking::BookingStage;
use crate::conversation::ConversationStage;
use crate::domain::Role;
use crate::history::HistoryTab;

/// Status colors
mod colors {
    use ratatui::style::Color;

    pub const HEADER: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const USER: Color = Color::Rgb(0, 255, 127); // Spring green
    pub const AGENT: Color = Color::Rgb(100, 149, 237); // Cornflower blue
    pub const THOUGHT: Color = Color::Rgb(255, 215, 0); // Gold
    pub const READY: Color = Color::Rgb(50, 205, 50); // Lime green
    pub const ERROR: Color = Color::Rgb(220, 20, 60); // Crimson
    pub const OVER_BUDGET: Color = Color::Rgb(255, 69, 0); // Orange red
    pub const DIM: Color = Color::DarkGray;
}

/// Main render function
pub fn render(state: &AppState, frame: &mut Frame) {
    // Create main layout: header, content, footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(state, frame, chunks[0]);

    match state.current_view {
        View::Search => render_search_view(state, frame, chunks[1]),
        View::Chat => render_chat_view(state, frame, chunks[1]),
        View::Plan => render_plan_view(state, frame, chunks[1]),
        View::History => render_history_view(state, frame, chunks[1]),
    }

    render_footer(state, frame, chunks[2]);

    if let InteractionMode::PassengerForm { ref for_flight } = state.interaction_mode {
        render_passenger_form(state, for_flight.is_some(), frame, frame.area());
    }
}

/// Render header with view tabs and conversation stage
fn render_header(state: &AppState, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::raw(" "),
        Span::styled("Waypoint", Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD)),
        Span::raw(" │ "),
    ];

    for (i, view) in ALL_VIEWS.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" · ", Style::default().fg(colors::DIM)));
        }
        if *view == state.current_view {
            spans.push(Span::styled(
                view.display_name(),
                Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(view.display_name(), Style::default().fg(colors::DIM)));
        }
    }

    spans.push(Span::styled(" │ ", Style::default().fg(colors::DIM)));
    let (stage_text, stage_color) = match state.stage {
        ConversationStage::Idle => ("online", colors::DIM),
        ConversationStage::AwaitingReply => ("thinking...", colors::THOUGHT),
        ConversationStage::ReadyToPlan => ("ready to plan", colors::READY),
        ConversationStage::PlanRequested => ("generating plan...", colors::THOUGHT),
        ConversationStage::PlanReady => ("plan ready", colors::READY),
    };
    spans.push(Span::styled(stage_text, Style::default().fg(stage_color)));

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

/// Render the chat view: conversation history plus the input line
fn render_chat_view(state: &AppState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Chat ")
        .border_style(Style::default().fg(colors::HEADER));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Messages
            Constraint::Length(1), // Ready banner
            Constraint::Length(1), // Input
        ])
        .split(inner);

    let mut lines: Vec<Line> = Vec::new();
    if state.messages.is_empty() {
        lines.push(Line::from(Span::styled(
            "Tell me where you'd like to go and I'll help plan everything.",
            Style::default().fg(colors::DIM),
        )));
    }
    for msg in &state.messages {
        let (prefix, color) = match msg.role {
            Role::User => ("> ", colors::USER),
            Role::Agent => ("  ", colors::AGENT),
        };
        for (i, content_line) in msg.content.lines().enumerate() {
            let lead = if i == 0 { prefix } else { "  " };
            lines.push(Line::from(Span::styled(
                format!("{lead}{content_line}"),
                Style::default().fg(color),
            )));
        }
    }
    if state.stage == ConversationStage::AwaitingReply {
        lines.push(Line::from(Span::styled("  ...", Style::default().fg(colors::DIM))));
    }

    // Keep the tail visible
    let visible = chunks[0].height as usize;
    let skip = lines.len().saturating_sub(visible);
    let messages = Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<_>>()).wrap(Wrap { trim: false });
    frame.render_widget(messages, chunks[0]);

    if state.plan_available() {
        let banner = Paragraph::new(Span::styled(
            " Ctrl+G: generate your travel plan",
            Style::default().fg(colors::READY).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(banner, chunks[1]);
    }

    let input = Paragraph::new(format!("> {}_", state.chat_input));
    frame.render_widget(input, chunks[2]);
}

/// Render the search view: form, reasoning trace, results
fn render_search_view(state: &AppState, frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(SearchForm::FIELD_COUNT as u16 + 2),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(columns[0]);

    // Form
    let editing = state.interaction_mode == InteractionMode::SearchForm;
    let mut form_lines: Vec<Line> = Vec::new();
    let form = &state.search_form;
    let values = [
        &form.origin,
        &form.destination,
        &form.departure_date,
        &form.return_date,
        &form.passengers,
        &form.cabin_class,
    ];
    for (i, value) in values.iter().enumerate() {
        let selected = editing && state.search_field == i;
        let style = if selected {
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let cursor = if selected { "_" } else { "" };
        form_lines.push(Line::from(Span::styled(
            format!("{:<24} {}{}", SearchForm::field_label(i), value, cursor),
            style,
        )));
    }
    let form_title = if editing { " Search (editing) " } else { " Search " };
    let form_widget = Paragraph::new(form_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(form_title)
            .border_style(Style::default().fg(colors::HEADER)),
    );
    frame.render_widget(form_widget, left[0]);

    // Agent summary line, replaced by the confirmation once a booking lands
    let status_line = if let Some(confirmation) = &state.flight_confirmation {
        Span::styled(format!(" {confirmation}"), Style::default().fg(colors::READY))
    } else {
        Span::styled(format!(" {}", state.search_message), Style::default().fg(colors::DIM))
    };
    frame.render_widget(Paragraph::new(Line::from(status_line)), left[1]);

    // Results
    let rows: Vec<Row> = state
        .search_results
        .iter()
        .enumerate()
        .map(|(i, offer)| {
            let row = Row::new(vec![
                format!("{} {}", offer.airline, offer.flight_number),
                offer.duration.clone(),
                format!("{}", offer.stops),
                format!("{:.0}", offer.price),
            ]);
            if i == state.search_selected {
                row.style(Style::default().bg(Color::Rgb(40, 40, 40)))
            } else {
                row
            }
        })
        .collect();
    let results_title = if state.search_results.is_empty() {
        " Results ".to_string()
    } else {
        format!(" Results ({}) ", state.search_results.len())
    };
    let results = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(20),
            Constraint::Percentage(15),
            Constraint::Percentage(25),
        ],
    )
    .header(Row::new(vec!["Flight", "Duration", "Stops", "Price"]).style(Style::default().fg(colors::DIM)))
    .block(Block::default().borders(Borders::ALL).title(results_title));
    frame.render_widget(results, left[2]);

    // Reasoning trace; renders nothing at all when idle
    let mut thought_lines: Vec<Line> = Vec::new();
    for step in &state.visible_thoughts {
        thought_lines.push(Line::from(vec![
            Span::styled(format!("Step {} ", step.sequence), Style::default().fg(colors::DIM)),
            Span::styled(format!("[{}]", step.action), Style::default().fg(colors::THOUGHT)),
        ]));
        thought_lines.push(Line::from(format!("  {}", step.text)));
    }
    if state.thinking {
        thought_lines.push(Line::from(Span::styled(
            "Thinking...",
            Style::default().fg(colors::THOUGHT).add_modifier(Modifier::BOLD),
        )));
    }
    if !thought_lines.is_empty() {
        let thoughts = Paragraph::new(thought_lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Agent thinking ")
                .border_style(Style::default().fg(colors::THOUGHT)),
        );
        frame.render_widget(thoughts, columns[1]);
    }
}

/// Render the plan view: summary, legs, itinerary, and the cost breakdown
fn render_plan_view(state: &AppState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Travel plan ")
        .border_style(Style::default().fg(colors::HEADER));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(plan) = &state.plan else {
        let placeholder = Paragraph::new(Span::styled(
            "No plan yet. Chat with the agent until it offers to create one.",
            Style::default().fg(colors::DIM),
        ));
        frame.render_widget(placeholder, inner);
        return;
    };

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            format!("{} → {}, {} nights", plan.origin, plan.destination, plan.days),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(plan.summary.clone()),
        Line::from(""),
        Line::from(vec![
            Span::styled("Flight  ", Style::default().fg(colors::DIM)),
            Span::raw(format!(
                "{} {} · {} · dep {}",
                plan.flight.airline, plan.flight.flight_number, plan.flight.duration, plan.departure_date
            )),
        ]),
        Line::from(vec![
            Span::styled("Hotel   ", Style::default().fg(colors::DIM)),
            Span::raw(format!(
                "{} ({:.1}★) · {} · {} to {}",
                plan.hotel.name, plan.hotel.rating, plan.hotel.location, plan.departure_date, plan.return_date
            )),
        ]),
        Line::from(""),
    ];

    for day in &plan.itinerary {
        lines.push(Line::from(Span::styled(
            format!("Day {} - {}", day.day, day.title),
            Style::default().fg(colors::HEADER),
        )));
        lines.push(Line::from(format!(
            "  morning: {} · afternoon: {} · evening: {}",
            day.activities.morning, day.activities.afternoon, day.activities.evening
        )));
    }
    lines.push(Line::from(""));

    // Cost breakdown - every figure from the single derived source
    if let Some(costs) = &state.costs {
        lines.push(Line::from(Span::styled(
            "Cost breakdown",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("  Round trip flights   {:>12.0}", costs.round_trip_flight)));
        lines.push(Line::from(format!(
            "  Hotel ({} nights)     {:>12.0}",
            costs.nights, costs.hotel_total
        )));
        lines.push(Line::from(Span::styled(
            format!("  Total                {:>12.0}", costs.total),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        let remaining_color = if costs.remaining_budget >= 0.0 {
            colors::READY
        } else {
            colors::OVER_BUDGET
        };
        lines.push(Line::from(Span::styled(
            format!("  Remaining budget     {:>12.0}", costs.remaining_budget),
            Style::default().fg(remaining_color),
        )));
    }

    match &state.booking_stage {
        BookingStage::Confirmed {
            confirmation_code,
            message,
        } => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Booked! Confirmation: {confirmation_code}"),
                Style::default().fg(colors::READY).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(message.clone()));
        }
        BookingStage::Submitting => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Submitting booking...",
                Style::default().fg(colors::THOUGHT),
            )));
        }
        BookingStage::Editing => {}
    }

    let content = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(content, inner);
}

/// Render the history view: filters, records table, page controls
fn render_history_view(state: &AppState, frame: &mut Frame, area: Rect) {
    let title = match state.history_tab {
        HistoryTab::Searches => " History · [Searches] | Bookings ",
        HistoryTab::Bookings => " History · Searches | [Bookings] ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(colors::HEADER));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Filter line
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Page line
        ])
        .split(inner);

    // Filter line (with live edit buffer when applicable)
    let filter_text = match state.history_tab {
        HistoryTab::Searches => {
            let mut origin = state.search_filters.origin.clone();
            let mut destination = state.search_filters.destination.clone();
            if let InteractionMode::FilterInput { field, ref buffer } = state.interaction_mode {
                match field {
                    FilterField::Origin => origin = format!("{buffer}_"),
                    FilterField::Destination => destination = format!("{buffer}_"),
                }
            }
            let status = state
                .search_filters
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "any".to_string());
            format!(" origin: {origin:<12} destination: {destination:<12} status: {status}")
        }
        HistoryTab::Bookings => {
            let status = state
                .bookings_status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "any".to_string());
            format!(" status: {status}")
        }
    };
    frame.render_widget(
        Paragraph::new(Span::styled(filter_text, Style::default().fg(colors::DIM))),
        chunks[0],
    );

    // Records table - the two record kinds are never merged into one list
    match state.history_tab {
        HistoryTab::Searches => {
            let rows: Vec<Row> = state
                .search_items
                .iter()
                .map(|item| {
                    Row::new(vec![
                        format!("{} → {}", item.origin, item.destination),
                        item.departure_date.clone(),
                        item.passengers.to_string(),
                        item.cabin_class.clone(),
                        item.search_status.to_string(),
                        format!("{} flights", item.result_count),
                    ])
                })
                .collect();
            let table = Table::new(
                rows,
                [
                    Constraint::Percentage(28),
                    Constraint::Percentage(16),
                    Constraint::Percentage(10),
                    Constraint::Percentage(14),
                    Constraint::Percentage(12),
                    Constraint::Percentage(20),
                ],
            )
            .header(
                Row::new(vec!["Route", "Departure", "Pax", "Cabin", "Status", "Results"])
                    .style(Style::default().fg(colors::DIM)),
            );
            frame.render_widget(table, chunks[1]);
        }
        HistoryTab::Bookings => {
            let rows: Vec<Row> = state
                .booking_items
                .iter()
                .map(|item| {
                    Row::new(vec![
                        item.booking_id.clone(),
                        item.booking_type.clone(),
                        item.passenger_name.clone(),
                        item.status.to_string(),
                        format!("{:.0} {}", item.total_amount, item.currency),
                        item.confirmation_code.clone(),
                    ])
                })
                .collect();
            let table = Table::new(
                rows,
                [
                    Constraint::Percentage(22),
                    Constraint::Percentage(16),
                    Constraint::Percentage(20),
                    Constraint::Percentage(12),
                    Constraint::Percentage(14),
                    Constraint::Percentage(16),
                ],
            )
            .header(
                Row::new(vec!["Booking", "Type", "Passenger", "Status", "Amount", "Confirmation"])
                    .style(Style::default().fg(colors::DIM)),
            );
            frame.render_widget(table, chunks[1]);
        }
    }

    // Page line: label plus enablement, from the active tab's own state
    let mut page_spans = vec![Span::raw(format!(" {}", state.page_label))];
    page_spans.push(Span::styled(
        format!(
            "  [p]rev{}  [n]ext{}",
            if state.can_prev { "" } else { " ✗" },
            if state.can_next { "" } else { " ✗" }
        ),
        Style::default().fg(colors::DIM),
    ));
    if let Some(error) = &state.history_error {
        page_spans.push(Span::styled(
            format!("  {error}"),
            Style::default().fg(colors::ERROR),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(page_spans)), chunks[2]);
}

/// Render the passenger form as a centered overlay
fn render_passenger_form(state: &AppState, for_flight: bool, frame: &mut Frame, area: Rect) {
    let width = 46.min(area.width);
    let height = 8.min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, popup);

    let title = if for_flight { " Book flight " } else { " Book this plan " };
    let fields = [
        &state.passenger.first_name,
        &state.passenger.last_name,
        &state.passenger.email,
        &state.passenger.phone,
    ];
    let mut lines: Vec<Line> = Vec::new();
    for (i, value) in fields.iter().enumerate() {
        let selected = state.passenger_field == i;
        let style = if selected {
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let cursor = if selected { "_" } else { "" };
        lines.push(Line::from(Span::styled(
            format!("{:<12} {}{}", AppState::passenger_field_label(i), value, cursor),
            style,
        )));
    }
    let hint = if state.passenger.is_complete() {
        Span::styled("Enter: confirm booking", Style::default().fg(colors::READY))
    } else {
        Span::styled("All four fields are required", Style::default().fg(colors::DIM))
    };
    lines.push(Line::from(""));
    lines.push(Line::from(hint));

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(colors::READY)),
    );
    frame.render_widget(form, popup);
}

/// Render footer with context-sensitive keybinds or the current error
fn render_footer(state: &AppState, frame: &mut Frame, area: Rect) {
    let text = if let Some(error) = &state.error {
        Span::styled(format!(" {error}"), Style::default().fg(colors::ERROR))
    } else {
        let hints = match (&state.interaction_mode, state.current_view) {
            (InteractionMode::SearchForm, _) => "Tab: next field · Enter: search · Esc: done",
            (InteractionMode::FilterInput { .. }, _) => "Enter: apply filter · Esc: cancel",
            (InteractionMode::PassengerForm { .. }, _) => "Tab: next field · Enter: confirm · Esc: close",
            (_, View::Search) => "e: edit search · Enter: run · j/k: select · b: book · Tab: view · q: quit",
            (_, View::Chat) => "Enter: send · Ctrl+G: plan · Tab: view · Ctrl+C: quit",
            (_, View::Plan) => "b: book plan · Tab: view · q: quit",
            (_, View::History) => "t: tab · n/p: page · o/d/f: filters · r: refresh · Tab: view · q: quit",
        };
        Span::styled(format!(" {hints}"), Style::default().fg(colors::DIM))
    };
    let footer = Paragraph::new(Line::from(text)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
