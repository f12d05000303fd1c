//! Roster pane: the people who can receive messages.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::models::Person;

/// Width of the roster column.
pub const ROSTER_WIDTH: u16 = 26;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterStatus {
    Loading,
    Loaded,
    /// Load failed; the message is shown above the retry affordance.
    Failed(String),
}

pub struct RosterState {
    pub status: RosterStatus,
    people: Vec<Person>,
    pub selected: usize,
}

impl Default for RosterState {
    fn default() -> Self {
        Self {
            status: RosterStatus::Loading,
            people: Vec::new(),
            selected: 0,
        }
    }
}

impl RosterState {
    pub fn begin_load(&mut self) {
        self.status = RosterStatus::Loading;
    }

    pub fn loaded(&mut self, people: Vec<Person>) {
        self.people = people;
        self.status = RosterStatus::Loaded;
        self.selected = self.selected.min(self.people.len().saturating_sub(1));
    }

    /// Keep whatever was loaded before; the pane shows the retry row.
    pub fn failed(&mut self, message: impl Into<String>) {
        self.status = RosterStatus::Failed(message.into());
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, RosterStatus::Failed(_))
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn selected_person(&self) -> Option<&Person> {
        self.people.get(self.selected)
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.people.len() {
            self.selected += 1;
        }
    }
}

/// Render the roster. `recipient` marks the person the draft is addressed to.
pub fn render(
    area: Rect,
    buf: &mut Buffer,
    state: &RosterState,
    recipient: Option<i64>,
    focused: bool,
) {
    let (border_style, border_type) = if focused {
        (Style::default().fg(Color::Yellow), BorderType::Double)
    } else {
        (Style::default().fg(Color::DarkGray), BorderType::Plain)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(Span::styled(
            " Pessoas ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    block.render(area, buf);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    match &state.status {
        RosterStatus::Loading if state.people.is_empty() => {
            lines.push(Line::from(Span::styled(
                " Carregando...",
                Style::default().fg(Color::DarkGray),
            )));
        }
        RosterStatus::Failed(message) => {
            lines.push(Line::from(Span::styled(
                format!(" {}", message),
                Style::default().fg(Color::Red),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                " [Enter] Tentar novamente",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        _ if state.people.is_empty() => {
            lines.push(Line::from(Span::styled(
                " Ninguém por aqui ainda",
                Style::default().fg(Color::DarkGray),
            )));
        }
        _ => {
            let height = inner.height as usize;
            let offset = scroll_offset(state.selected, height, state.people.len());
            for (idx, person) in state.people.iter().enumerate().skip(offset).take(height) {
                lines.push(person_line(
                    person,
                    idx == state.selected && focused,
                    recipient == Some(person.id),
                ));
            }
        }
    }

    Paragraph::new(lines).render(inner, buf);
}

fn person_line(person: &Person, selected: bool, is_recipient: bool) -> Line<'static> {
    let cursor = if selected { "\u{25BA}" } else { " " };
    let mark = if is_recipient { "\u{2709}" } else { " " };
    let style = if selected {
        Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else if is_recipient {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(Span::styled(
        format!("{}{} {}", cursor, mark, person.name),
        style,
    ))
}

/// First visible row that keeps `selected` on screen.
fn scroll_offset(selected: usize, height: usize, total: usize) -> usize {
    if height == 0 || total <= height || selected < height {
        return 0;
    }
    (selected + 1 - height).min(total - height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(state: &RosterState, width: u16, height: u16) -> Vec<String> {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        render(area, &mut buf, state, None, true);
        (0..height)
            .map(|y| (0..width).map(|x| buf[(x, y)].symbol()).collect())
            .collect()
    }

    #[test]
    fn test_failed_roster_shows_retry() {
        let mut state = RosterState::default();
        state.failed("Erro de conexão.");
        let rows = rendered(&state, 30, 6);
        assert!(rows.iter().any(|r| r.contains("Tentar novamente")));
        assert!(rows.iter().any(|r| r.contains("Erro de conex")));
    }

    #[test]
    fn test_loaded_roster_lists_people() {
        let mut state = RosterState::default();
        state.loaded(vec![Person::new(1, "Ana"), Person::new(2, "Bia")]);
        let rows = rendered(&state, 30, 6);
        assert!(rows[1].contains("Ana"));
        assert!(rows[2].contains("Bia"));
        assert!(!rows.iter().any(|r| r.contains("Tentar novamente")));
    }

    #[test]
    fn test_selection_is_clamped_on_reload() {
        let mut state = RosterState::default();
        state.loaded((1..=5).map(|i| Person::new(i, format!("P{}", i))).collect());
        state.selected = 4;
        state.loaded(vec![Person::new(1, "Ana")]);
        assert_eq!(state.selected_person().map(|p| p.id), Some(1));
        state.move_down();
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_scroll_offset_keeps_selection_visible() {
        assert_eq!(scroll_offset(0, 5, 20), 0);
        assert_eq!(scroll_offset(7, 5, 20), 3);
        assert_eq!(scroll_offset(19, 5, 20), 15);
    }
}
