//! Balloon board pane: one card per received message, a page at a time.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

use crate::board::{Balloon, BalloonBoard};
use crate::voting::VotingSession;

/// Everything the pane shows besides the board itself.
pub struct BoardView<'a> {
    pub board: &'a BalloonBoard,
    /// Timers running; a closed board is not refreshed.
    pub open: bool,
    pub loading: bool,
    pub error: Option<&'a str>,
    pub voting: &'a VotingSession,
}

pub fn render(area: Rect, buf: &mut Buffer, view: &BoardView, focused: bool) {
    let (border_style, border_type) = if focused {
        (Style::default().fg(Color::Yellow), BorderType::Double)
    } else {
        (Style::default().fg(Color::DarkGray), BorderType::Plain)
    };

    let board = view.board;
    let title = if view.open && !board.is_empty() {
        format!(
            " 🎈 Balões  {}/{} ({}){} ",
            board.page() + 1,
            board.page_count(),
            board.len(),
            if board.rotates() { " \u{27F3}" } else { "" }
        )
    } else {
        " 🎈 Balões ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    block.render(area, buf);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let notice = if !view.open {
        Some((" Painel fechado. [b] abrir".to_string(), Color::DarkGray))
    } else if let Some(err) = view.error.filter(|_| board.is_empty()) {
        Some((format!(" {}", err), Color::Red))
    } else if board.is_empty() && view.loading {
        Some((" Carregando balões...".to_string(), Color::DarkGray))
    } else if board.is_empty() {
        Some((" Nenhuma mensagem recebida ainda".to_string(), Color::DarkGray))
    } else {
        None
    };
    if let Some((text, color)) = notice {
        Paragraph::new(Line::from(Span::styled(text, Style::default().fg(color))))
            .render(inner, buf);
        return;
    }

    let cells = grid(inner, board.page_size());
    for (idx, (balloon, cell)) in board.visible().iter().zip(cells).enumerate() {
        let selected = focused && idx == board.selected_index();
        render_card(cell, buf, balloon, selected, view.voting);
    }
}

/// Split `area` into one cell per balloon slot, two columns when there is room.
fn grid(area: Rect, page_size: usize) -> Vec<Rect> {
    let columns = if page_size <= 2 || area.width < 40 { 1 } else { 2 };
    let rows = page_size.div_ceil(columns).max(1);

    let row_areas = Layout::vertical(vec![Constraint::Ratio(1, rows as u32); rows]).split(area);
    row_areas
        .iter()
        .flat_map(|row| {
            Layout::horizontal(vec![Constraint::Ratio(1, columns as u32); columns])
                .split(*row)
                .to_vec()
        })
        .collect()
}

fn render_card(
    area: Rect,
    buf: &mut Buffer,
    balloon: &Balloon,
    selected: bool,
    voting: &VotingSession,
) {
    let border = if selected {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Magenta)
    };
    let mut footer = vec![Span::styled(
        format!(" 👍 {} ", balloon.likes),
        Style::default().fg(Color::Cyan),
    )];
    if voting.has_liked(balloon.message_id) {
        footer.push(Span::styled("curtido ", Style::default().fg(Color::Green)));
    }
    if voting.has_voted(balloon.message_id) {
        footer.push(Span::styled("✓ votado ", Style::default().fg(Color::Green)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .title(Span::styled(
            format!(" para {} ", balloon.recipient_name),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(footer));

    Paragraph::new(format!("\"{}\"", balloon.body))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Gray))
        .block(block)
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balloon(id: i64, to: &str) -> Balloon {
        Balloon {
            message_id: id,
            recipient_id: 1,
            recipient_name: to.to_string(),
            photo_url: String::new(),
            sender: "Anônimo".to_string(),
            body: format!("mensagem {}", id),
            likes: 3,
        }
    }

    fn text(buf: &Buffer, area: Rect) -> String {
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_grid_cells_match_page_size() {
        let area = Rect::new(0, 0, 100, 30);
        assert_eq!(grid(area, 2).len(), 2);
        assert_eq!(grid(area, 6).len(), 6);
        assert_eq!(grid(area, 10).len(), 10);
        assert_eq!(grid(Rect::new(0, 0, 30, 30), 6).len(), 6);
    }

    #[test]
    fn test_renders_current_page_only() {
        let mut board = BalloonBoard::new(2);
        board.replace(vec![
            balloon(1, "Ana"),
            balloon(2, "Bia"),
            balloon(3, "Caio"),
        ]);
        let voting = VotingSession::default();
        let view = BoardView {
            board: &board,
            open: true,
            loading: false,
            error: None,
            voting: &voting,
        };

        let area = Rect::new(0, 0, 40, 16);
        let mut buf = Buffer::empty(area);
        render(area, &mut buf, &view, false);
        let out = text(&buf, area);
        assert!(out.contains("1/2"));
        assert!(out.contains("para Ana"));
        assert!(out.contains("para Bia"));
        assert!(!out.contains("Caio"));
    }

    #[test]
    fn test_closed_board_shows_notice() {
        let board = BalloonBoard::new(6);
        let voting = VotingSession::default();
        let view = BoardView {
            board: &board,
            open: false,
            loading: false,
            error: None,
            voting: &voting,
        };
        let area = Rect::new(0, 0, 40, 5);
        let mut buf = Buffer::empty(area);
        render(area, &mut buf, &view, true);
        assert!(text(&buf, area).contains("Painel fechado"));
    }
}
