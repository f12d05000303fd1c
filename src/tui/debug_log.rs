//! Debug log pane: captured tracing output, toggled with Ctrl+D.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::log_capture::LogBuffer;

/// Scrollback kept by the pane.
const MAX_LINES: usize = 1000;

/// Height of the pane when visible.
pub const DEBUG_LOG_HEIGHT: u16 = 10;

pub struct DebugLogState {
    source: LogBuffer,
    lines: Vec<String>,
    pub visible: bool,
    /// Lines scrolled back from the newest (0 = follow).
    scroll_back: usize,
}

impl DebugLogState {
    pub fn new(source: LogBuffer) -> Self {
        Self {
            source,
            lines: Vec::new(),
            visible: false,
            scroll_back: 0,
        }
    }

    /// Pull new lines from the capture buffer.
    pub fn refresh(&mut self) {
        self.lines.extend(self.source.drain());
        if self.lines.len() > MAX_LINES {
            let excess = self.lines.len() - MAX_LINES;
            self.lines.drain(..excess);
            self.scroll_back = self.scroll_back.min(self.lines.len().saturating_sub(1));
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        self.scroll_back = 0;
    }

    pub fn scroll_up(&mut self, n: usize) {
        let max = self.lines.len().saturating_sub(1);
        self.scroll_back = (self.scroll_back + n).min(max);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(n);
    }

    /// Lines that fit in `height` rows at the current scroll position.
    fn window(&self, height: usize) -> &[String] {
        let end = self.lines.len().saturating_sub(self.scroll_back);
        let start = end.saturating_sub(height);
        &self.lines[start..end]
    }
}

pub fn render(area: Rect, buf: &mut Buffer, state: &DebugLogState) {
    let title = if state.scroll_back > 0 {
        format!(" Log (-{}) ", state.scroll_back)
    } else {
        " Log ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    block.render(area, buf);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let lines: Vec<Line> = state
        .window(inner.height as usize)
        .iter()
        .map(|l| Line::from(Span::styled(l.clone(), level_style(l))))
        .collect();
    Paragraph::new(lines).render(inner, buf);
}

/// Color by the level column of the fmt layer.
fn level_style(line: &str) -> Style {
    let color = if line.contains("ERROR") {
        Color::Red
    } else if line.contains(" WARN ") {
        Color::Yellow
    } else if line.contains(" INFO ") {
        Color::Green
    } else if line.contains(" DEBUG ") || line.contains(" TRACE ") {
        Color::DarkGray
    } else {
        Color::White
    };
    Style::default().fg(color)
}
