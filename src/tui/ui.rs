//! UI rendering for the TUI

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
    Frame,
};
use tokio::time::Instant;
use unicode_width::UnicodeWidthStr;

use super::app::{App, Pane};
use super::balloons::{self, BoardView};
use super::compose;
use super::debug_log;
use super::help;
use super::overlays;
use super::roster;
use crate::feedback::ToastKind;

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Layout: header (1 line) + main content + status bar (1 line)
    let [header_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(header_area, frame.buffer_mut(), app);

    let main_area = if app.debug_log.visible {
        let [top, log_area] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(debug_log::DEBUG_LOG_HEIGHT),
        ])
        .areas(main_area);
        debug_log::render(log_area, frame.buffer_mut(), &app.debug_log);
        top
    } else {
        main_area
    };

    let [roster_area, content_area] = Layout::horizontal([
        Constraint::Length(roster::ROSTER_WIDTH),
        Constraint::Fill(1),
    ])
    .areas(main_area);

    roster::render(
        roster_area,
        frame.buffer_mut(),
        &app.roster,
        app.compose.recipient.as_ref().map(|p| p.id),
        app.active_pane == Pane::Roster,
    );

    let [board_area, compose_area] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(compose::COMPOSE_HEIGHT),
    ])
    .areas(content_area);

    let view = BoardView {
        board: &app.board,
        open: app.board_open(),
        loading: app.board_loading,
        error: app.board_error.as_deref(),
        voting: &app.voting,
    };
    balloons::render(
        board_area,
        frame.buffer_mut(),
        &view,
        app.active_pane == Pane::Board,
    );

    compose::render(
        compose_area,
        frame,
        &app.compose,
        app.active_pane == Pane::Compose,
    );

    render_status(status_area, frame.buffer_mut(), app);

    overlays::render(frame, &app.overlay, app.roster.people());

    if let Some(view) = &app.notification {
        overlays::render_notification(frame, view, Instant::now());
    }

    // Help goes on top of everything else
    if app.show_help {
        help::render_help_popup(frame);
    }
}

fn render_header(area: Rect, buf: &mut Buffer, app: &App) {
    let title = " 💌 Correio Elegante";
    let who = match app.voter() {
        Some(p) => format!("votando como {}", p.name),
        None => "não identificado [w]".to_string(),
    };
    let right = format!("[?] Ajuda  {} ", who);

    let padding = (area.width as usize).saturating_sub(title.width() + right.width());
    let line = Line::from(vec![
        Span::styled(
            title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(padding)),
        Span::styled("[?] Ajuda  ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{} ", who),
            Style::default().fg(if app.voter().is_some() {
                Color::Cyan
            } else {
                Color::DarkGray
            }),
        ),
    ]);

    Paragraph::new(line)
        .style(Style::default().bg(Color::DarkGray))
        .render(area, buf);
}

fn render_status(area: Rect, buf: &mut Buffer, app: &App) {
    if let Some((toast, _)) = &app.toast {
        let color = match toast.kind {
            ToastKind::Success => Color::Green,
            ToastKind::Info => Color::Cyan,
            ToastKind::Error => Color::Red,
        };
        let line = Line::from(Span::styled(
            format!(" {} ", toast.line()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        Paragraph::new(line)
            .style(Style::default().bg(Color::DarkGray))
            .render(area, buf);
        return;
    }

    let sep = Span::styled(" | ", Style::default().fg(Color::Gray));
    let hint = |s: &'static str| Span::styled(s, Style::default().fg(Color::Gray));
    let line = Line::from(vec![
        Span::styled(
            format!(" Tab: {} ", app.active_pane.as_str()),
            Style::default().fg(Color::Cyan),
        ),
        sep.clone(),
        hint("s: sugestões"),
        sep.clone(),
        hint("b: balões"),
        sep.clone(),
        hint("r: ranking"),
        sep,
        hint("?: ajuda"),
    ]);

    Paragraph::new(line)
        .style(Style::default().bg(Color::DarkGray))
        .render(area, buf);
}
