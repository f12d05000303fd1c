//! Compose box: recipient, message input and voice options.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::api::ApiError;
use crate::compose::{Draft, SenderPolicy, VoicePrefs};
use crate::feedback::Toast;
use crate::models::{OutgoingMessage, Person, VoiceGender};

/// Border + options row + input row + border.
pub const COMPOSE_HEIGHT: u16 = 4;

#[derive(Default)]
pub struct ComposeState {
    pub input: String,
    /// Cursor position in characters.
    pub cursor_pos: usize,
    pub recipient: Option<Person>,
    pub voice: VoicePrefs,
    sender: SenderPolicy,
    /// Configured signature, offered by `toggle_signature`.
    signature: Option<String>,
    /// Draft handed to the backend; editing is locked until it answers.
    in_flight: Option<Draft>,
}

impl ComposeState {
    pub fn new(signature: Option<String>) -> Self {
        Self {
            sender: SenderPolicy::from_signature(signature.as_deref()),
            signature,
            ..Self::default()
        }
    }

    pub fn sender(&self) -> &SenderPolicy {
        &self.sender
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn set_recipient(&mut self, person: Person) {
        self.recipient = Some(person);
    }

    /// Replace the text, e.g. with a suggestion.
    pub fn prefill(&mut self, text: &str) {
        if self.is_sending() {
            return;
        }
        self.input = text.to_string();
        self.cursor_pos = self.input.chars().count();
    }

    /// Switch between anonymous and the configured signature.
    /// Returns false when no signature is configured.
    pub fn toggle_signature(&mut self) -> bool {
        let Some(name) = self.signature.clone() else {
            return false;
        };
        self.sender = match self.sender {
            SenderPolicy::Anonymous => SenderPolicy::Named(name),
            SenderPolicy::Named(_) => SenderPolicy::Anonymous,
        };
        true
    }

    pub fn toggle_read_aloud(&mut self) {
        self.voice.read_aloud = !self.voice.read_aloud;
    }

    pub fn toggle_voice(&mut self) {
        self.voice.voice = match self.voice.voice {
            VoiceGender::Female => VoiceGender::Male,
            VoiceGender::Male => VoiceGender::Female,
        };
    }

    /// Start sending. `None` without a recipient, with blank text or while a
    /// send is already running.
    pub fn begin_send(&mut self) -> Option<OutgoingMessage> {
        if self.is_sending() {
            return None;
        }
        let recipient = self.recipient.clone()?;
        let draft = Draft {
            recipient,
            text: self.input.clone(),
            sender: self.sender.clone(),
            voice: self.voice,
        };
        let request = draft.request()?;
        self.in_flight = Some(draft);
        Some(request)
    }

    /// Apply the send result. Success clears the input; failure keeps it.
    pub fn on_sent(&mut self, result: &Result<(), ApiError>) -> Option<Toast> {
        let mut draft = self.in_flight.take()?;
        let toast = draft.on_sent(result);
        if draft.text.is_empty() {
            self.clear();
        }
        Some(toast)
    }

    pub fn insert_char(&mut self, c: char) {
        if self.is_sending() {
            return;
        }
        let at = self.byte_offset(self.cursor_pos);
        self.input.insert(at, c);
        self.cursor_pos += 1;
    }

    pub fn backspace(&mut self) {
        if self.is_sending() || self.cursor_pos == 0 {
            return;
        }
        let end = self.byte_offset(self.cursor_pos);
        let start = self.byte_offset(self.cursor_pos - 1);
        self.input.replace_range(start..end, "");
        self.cursor_pos -= 1;
    }

    pub fn delete(&mut self) {
        if self.is_sending() || self.cursor_pos >= self.input.chars().count() {
            return;
        }
        let start = self.byte_offset(self.cursor_pos);
        let end = self.byte_offset(self.cursor_pos + 1);
        self.input.replace_range(start..end, "");
    }

    pub fn move_left(&mut self) {
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor_pos = (self.cursor_pos + 1).min(self.input.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_pos = self.input.chars().count();
    }

    pub fn clear(&mut self) {
        if self.is_sending() {
            return;
        }
        self.input.clear();
        self.cursor_pos = 0;
    }

    fn byte_offset(&self, char_pos: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_pos)
            .map_or(self.input.len(), |(i, _)| i)
    }
}

pub fn render(area: Rect, frame: &mut Frame, state: &ComposeState, focused: bool) {
    let (border_style, border_type) = if focused {
        (Style::default().fg(Color::Yellow), BorderType::Double)
    } else {
        (Style::default().fg(Color::DarkGray), BorderType::Plain)
    };

    let title = match &state.recipient {
        Some(p) => format!(" 💌 Para: {} ", p.name),
        None => " 💌 Escolha um destinatário ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(Span::styled(title, Style::default().fg(Color::Magenta)));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    render_options(
        Rect::new(inner.x, inner.y, inner.width, 1),
        frame.buffer_mut(),
        state,
    );

    if inner.height >= 2 {
        let input_area = Rect::new(inner.x, inner.y + 1, inner.width, 1);
        let view = visible_input(&state.input, state.cursor_pos, input_area.width as usize);
        render_input(input_area, frame.buffer_mut(), state, &view);
        if focused && !state.is_sending() {
            frame.set_cursor_position((input_area.x + 1 + view.cursor_col as u16, input_area.y));
        }
    }
}

/// Sender, voice and read-aloud toggles.
fn render_options(area: Rect, buf: &mut Buffer, state: &ComposeState) {
    let on = Style::default().fg(Color::Cyan);
    let off = Style::default().fg(Color::DarkGray);
    let from = match state.sender() {
        SenderPolicy::Anonymous => "De: Anônimo".to_string(),
        SenderPolicy::Named(name) => format!("De: {}", name),
    };
    let voice = match state.voice.voice {
        VoiceGender::Female => "Voz: feminina",
        VoiceGender::Male => "Voz: masculina",
    };
    let (aloud, aloud_style) = if state.voice.read_aloud {
        ("🔊 ler em voz alta", on)
    } else {
        ("🔇 silenciosa", off)
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", from), on),
        Span::styled("F4", off),
        Span::raw("  "),
        Span::styled(aloud, aloud_style),
        Span::styled(" F2", off),
        Span::raw("  "),
        Span::styled(voice, if state.voice.read_aloud { on } else { off }),
        Span::styled(" F3", off),
    ];
    if state.is_sending() {
        spans.push(Span::styled(
            "  enviando...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    }
    Paragraph::new(Line::from(spans)).render(area, buf);
}

fn render_input(area: Rect, buf: &mut Buffer, state: &ComposeState, view: &InputView) {
    let line = if state.input.is_empty() {
        let hint = match &state.recipient {
            Some(p) => format!(" Escreva algo bonito para {}...", p.name),
            None => " Selecione alguém na lista de pessoas (Enter)".to_string(),
        };
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(Span::styled(
            format!(" {}", view.text),
            Style::default().fg(Color::White),
        ))
    };
    Paragraph::new(line).render(area, buf);
}

/// The slice of input that fits, and where the cursor lands in it.
struct InputView {
    text: String,
    cursor_col: usize,
}

/// Scroll horizontally so the cursor stays inside `width - 1` columns.
fn visible_input(input: &str, cursor_pos: usize, width: usize) -> InputView {
    let avail = width.saturating_sub(2);
    let chars: Vec<char> = input.chars().collect();
    let cursor_pos = cursor_pos.min(chars.len());

    let mut start = 0;
    while start < cursor_pos && col_width(&chars[start..cursor_pos]) > avail {
        start += 1;
    }

    let mut text = String::new();
    for &c in &chars[start..] {
        text.push(c);
        if text.width() > avail {
            text.pop();
            break;
        }
    }
    InputView {
        text,
        cursor_col: col_width(&chars[start..cursor_pos]),
    }
}

fn col_width(chars: &[char]) -> usize {
    chars.iter().collect::<String>().width()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use pretty_assertions::assert_eq;

    fn ready() -> ComposeState {
        let mut state = ComposeState::new(None);
        state.set_recipient(Person::new(1, "Ana"));
        for c in "Parabéns!".chars() {
            state.insert_char(c);
        }
        state
    }

    #[test]
    fn test_editing_handles_multibyte_chars() {
        let mut state = ready();
        assert_eq!(state.input, "Parabéns!");
        state.move_left();
        state.move_left();
        state.backspace();
        assert_eq!(state.input, "Parabés!");
        state.move_home();
        state.delete();
        assert_eq!(state.input, "arabés!");
    }

    #[test]
    fn test_begin_send_requires_recipient_and_text() {
        let mut state = ComposeState::new(None);
        state.prefill("Oi");
        assert!(state.begin_send().is_none());

        state.set_recipient(Person::new(1, "Ana"));
        state.prefill("   ");
        assert!(state.begin_send().is_none());
    }

    #[test]
    fn test_send_success_clears_and_locks_meanwhile() {
        let mut state = ready();
        let request = state.begin_send().unwrap();
        assert_eq!(request.recipient_name, "Ana");
        assert_eq!(request.body, "Parabéns!");
        assert!(state.begin_send().is_none());

        state.insert_char('x');
        assert_eq!(state.input, "Parabéns!");

        let toast = state.on_sent(&Ok(())).unwrap();
        assert!(!toast.is_error());
        assert!(state.input.is_empty());
        assert!(!state.is_sending());
    }

    #[test]
    fn test_send_failure_keeps_text() {
        let mut state = ready();
        state.begin_send().unwrap();
        let toast = state
            .on_sent(&Err(ApiError::Server { status: 500 }))
            .unwrap();
        assert!(toast.is_error());
        assert_eq!(state.input, "Parabéns!");
        assert!(state.on_sent(&Ok(())).is_none());
    }

    #[test]
    fn test_signature_toggle() {
        let mut anonymous = ComposeState::new(None);
        assert!(!anonymous.toggle_signature());
        assert_eq!(anonymous.sender(), &SenderPolicy::Anonymous);

        let mut signed = ComposeState::new(Some("Caio".to_string()));
        assert_eq!(signed.sender(), &SenderPolicy::Named("Caio".to_string()));
        assert!(signed.toggle_signature());
        assert_eq!(signed.sender(), &SenderPolicy::Anonymous);
    }

    #[test]
    fn test_visible_input_scrolls_to_cursor() {
        let view = visible_input("abcdefghij", 10, 6);
        assert_eq!(view.text, "ghij");
        assert_eq!(view.cursor_col, 4);

        let view = visible_input("abcdefghij", 0, 6);
        assert_eq!(view.text, "abcd");
        assert_eq!(view.cursor_col, 0);
    }
}
