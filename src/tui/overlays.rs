//! Popups drawn over the main layout.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tokio::time::Instant;

use crate::models::{
    display_timestamp, InboxMessage, Medal, Person, Ranking, Suggestion, TopMessage,
};
use crate::notify::NotificationView;

/// The popup currently open, if any. The notification is tracked apart so
/// it can appear over any of these.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Overlay {
    #[default]
    None,
    /// Pick your own roster entry before voting.
    Identify { selected: usize },
    Suggestions {
        items: Vec<Suggestion>,
        selected: usize,
    },
    Inbox {
        person: Person,
        messages: Vec<InboxMessage>,
        scroll: usize,
    },
    Ranking(Ranking),
    Popular {
        top_only: bool,
        messages: Vec<TopMessage>,
        scroll: usize,
    },
}

impl Overlay {
    pub fn is_open(&self) -> bool {
        !matches!(self, Overlay::None)
    }

    /// Move the cursor or scroll position; `len` bounds pickers.
    pub fn move_by(&mut self, delta: isize, roster_len: usize) {
        let (pos, len) = match self {
            Overlay::Identify { selected } => (selected, roster_len),
            Overlay::Suggestions { items, selected } => (selected, items.len()),
            Overlay::Inbox {
                messages, scroll, ..
            } => (scroll, messages.len()),
            Overlay::Popular {
                messages, scroll, ..
            } => (scroll, messages.len()),
            Overlay::None | Overlay::Ranking(_) => return,
        };
        let max = len.saturating_sub(1) as isize;
        *pos = (*pos as isize + delta).clamp(0, max.max(0)) as usize;
    }
}

/// Return a centered sub-rect of the given size within `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

fn popup(frame: &mut Frame, width: u16, height: u16, title: &str, color: Color) -> Rect {
    let area = centered_rect(width, height, frame.area());
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(Span::styled(
            " Esc fechar ",
            Style::default().fg(Color::Gray),
        )));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

fn picker_line(text: String, selected: bool) -> Line<'static> {
    if selected {
        Line::from(Span::styled(
            format!("\u{25BA} {}", text),
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(
            format!("  {}", text),
            Style::default().fg(Color::Gray),
        ))
    }
}

/// Visible window of `len` rows keeping `pos` on screen.
fn window(pos: usize, height: usize, len: usize) -> std::ops::Range<usize> {
    let start = if height == 0 || pos < height {
        0
    } else {
        pos + 1 - height
    };
    start..(start + height).min(len)
}

pub fn render(frame: &mut Frame, overlay: &Overlay, people: &[Person]) {
    match overlay {
        Overlay::None => {}
        Overlay::Identify { selected } => render_identify(frame, people, *selected),
        Overlay::Suggestions { items, selected } => render_suggestions(frame, items, *selected),
        Overlay::Inbox {
            person,
            messages,
            scroll,
        } => render_inbox(frame, person, messages, *scroll),
        Overlay::Ranking(ranking) => render_ranking(frame, ranking),
        Overlay::Popular {
            top_only,
            messages,
            scroll,
        } => render_popular(frame, *top_only, messages, *scroll),
    }
}

fn render_identify(frame: &mut Frame, people: &[Person], selected: usize) {
    let inner = popup(frame, 44, 16, "Quem é você?", Color::Cyan);
    let mut lines = vec![
        Line::from(Span::styled(
            "Escolha seu nome para votar:",
            Style::default().fg(Color::White),
        )),
        Line::from(""),
    ];
    if people.is_empty() {
        lines.push(Line::from(Span::styled(
            "Carregando pessoas...",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        let rows = window(selected, inner.height.saturating_sub(2) as usize, people.len());
        for idx in rows {
            lines.push(picker_line(people[idx].name.clone(), idx == selected));
        }
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_suggestions(frame: &mut Frame, items: &[Suggestion], selected: usize) {
    let inner = popup(frame, 70, 18, "💡 Sugestões", Color::Yellow);
    let rows = window(selected, inner.height as usize, items.len());
    let lines: Vec<Line> = rows
        .map(|idx| picker_line(items[idx].text.clone(), idx == selected))
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_inbox(frame: &mut Frame, person: &Person, messages: &[InboxMessage], scroll: usize) {
    let title = format!("📬 Mensagens para {}", person.name);
    let inner = popup(frame, 72, 20, &title, Color::Magenta);

    let mut lines = Vec::new();
    for msg in messages.iter().skip(scroll) {
        let when = msg
            .sent_at
            .as_deref()
            .map(display_timestamp)
            .unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(
                format!("De: {}", msg.sender),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", when), Style::default().fg(Color::DarkGray)),
        ]));
        lines.push(Line::from(Span::styled(
            format!("\"{}\"", msg.body),
            Style::default().fg(Color::White),
        )));
        lines.push(Line::from(""));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn medal_style(medal: Option<Medal>, count: u32) -> Style {
    match medal {
        Some(Medal::Gold) => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        Some(Medal::Silver) => Style::default().fg(Color::White),
        Some(Medal::Bronze) => Style::default().fg(Color::LightRed),
        None if count == 0 => Style::default().fg(Color::DarkGray),
        None => Style::default().fg(Color::Gray),
    }
}

fn render_ranking(frame: &mut Frame, ranking: &Ranking) {
    let inner = popup(frame, 56, 20, "🏆 Ranking", Color::Yellow);
    if ranking.people.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Ninguém recebeu mensagens ainda",
                Style::default().fg(Color::DarkGray),
            ))),
            inner,
        );
        return;
    }

    let mut lines = Vec::new();
    if ranking.has_leader() {
        if let Some(leader) = ranking.people.first() {
            lines.push(Line::from(Span::styled(
                format!("👑 {} lidera o arraiá!", leader.name),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
        }
    }
    let name_width = inner.width.saturating_sub(12) as usize;
    for (person, medal) in ranking.people.iter().zip(ranking.medals()) {
        let symbol = medal.map_or("  ", |m| m.symbol());
        lines.push(Line::from(Span::styled(
            format!(
                "{} {:<width$} {:>4}",
                symbol,
                person.name,
                person.message_count,
                width = name_width
            ),
            medal_style(medal, person.message_count),
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_popular(frame: &mut Frame, top_only: bool, messages: &[TopMessage], scroll: usize) {
    let title = if top_only {
        "⭐ Top 10"
    } else {
        "🔥 Mensagens populares"
    };
    let inner = popup(frame, 72, 20, title, Color::LightRed);
    if messages.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Nenhuma mensagem curtida ainda",
                Style::default().fg(Color::DarkGray),
            ))),
            inner,
        );
        return;
    }

    let mut lines = Vec::new();
    for (idx, msg) in messages.iter().enumerate().skip(scroll) {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:>2}. para {}", idx + 1, msg.recipient_name),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  👍 {}", msg.likes), Style::default().fg(Color::Yellow)),
        ]));
        lines.push(Line::from(Span::styled(
            format!("    \"{}\"", msg.body),
            Style::default().fg(Color::White),
        )));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

/// The new-message popup with its auto-close countdown.
pub fn render_notification(frame: &mut Frame, view: &NotificationView, now: Instant) {
    let msg = view.message();
    let bell = if view.chiming() { " 🔔" } else { "" };
    let title = format!("💌 Nova Mensagem de Amor!{}", bell);
    let inner = popup(frame, 60, 12, &title, Color::Magenta);

    let lines = vec![
        Line::from(vec![
            Span::styled("Para: ", Style::default().fg(Color::Gray)),
            Span::styled(
                msg.recipient_name.clone(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("\"{}\"", msg.body),
            Style::default().fg(Color::Magenta),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("- {}", msg.sender),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "[Enter] fechar  (fecha em {}s)",
                view.remaining(now).as_secs() + 1
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picker_movement_is_clamped() {
        let mut overlay = Overlay::Suggestions {
            items: vec![Suggestion::new(1, "a"), Suggestion::new(2, "b")],
            selected: 0,
        };
        overlay.move_by(-1, 0);
        overlay.move_by(5, 0);
        assert!(matches!(overlay, Overlay::Suggestions { selected: 1, .. }));

        let mut identify = Overlay::Identify { selected: 0 };
        identify.move_by(1, 0);
        assert_eq!(identify, Overlay::Identify { selected: 0 });
        identify.move_by(2, 3);
        assert_eq!(identify, Overlay::Identify { selected: 2 });
    }

    #[test]
    fn test_window_follows_cursor() {
        assert_eq!(window(0, 5, 20), 0..5);
        assert_eq!(window(9, 5, 20), 5..10);
        assert_eq!(window(1, 5, 3), 0..3);
    }

    #[test]
    fn test_centered_rect_is_clamped() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered_rect(20, 4, area), Rect::new(10, 3, 20, 4));
        assert_eq!(centered_rect(80, 30, area), area);
    }
}
