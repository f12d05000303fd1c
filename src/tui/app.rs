//! TUI application state and main event loop

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::{FutureExt, StreamExt};
use ratatui::DefaultTerminal;
use std::panic::AssertUnwindSafe;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::backend::{Backend, BackendCommand, BackendResponse};
use super::compose::ComposeState;
use super::debug_log::DebugLogState;
use super::log_capture::LogBuffer;
use super::overlays::Overlay;
use super::roster::RosterState;
use super::ui;
use crate::api::error::DUPLICATE_VOTE_MESSAGE;
use crate::api::MailApi;
use crate::board::{self, BalloonBoard, BoardTick, BoardTimers};
use crate::config::Config;
use crate::feedback::Toast;
use crate::models::{LatestMessage, Person};
use crate::notify::{NotificationCoordinator, NotificationView, SpeechEngine};
use crate::voting::{VoteIntent, VotingSession};

/// Housekeeping cadence: toast expiry, notification auto-close, log refresh.
const FRAME_TICK_MS: u64 = 250;

/// How long a toast stays in the status bar.
const TOAST_SECS: u64 = 5;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    #[default]
    Roster,
    Board,
    Compose,
}

impl Pane {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pane::Roster => "pessoas",
            Pane::Board => "balões",
            Pane::Compose => "mensagem",
        }
    }

    fn next(self) -> Self {
        match self {
            Pane::Roster => Pane::Board,
            Pane::Board => Pane::Compose,
            Pane::Compose => Pane::Roster,
        }
    }

    fn prev(self) -> Self {
        match self {
            Pane::Roster => Pane::Compose,
            Pane::Board => Pane::Roster,
            Pane::Compose => Pane::Board,
        }
    }
}

/// A vote or like on one balloon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ballot {
    Vote(i64),
    Like(i64),
}

/// Application state. Network work is queued in `outbox` and handed to the
/// backend by the event loop; results come back through `handle_response`.
pub struct App {
    pub should_exit: bool,
    pub active_pane: Pane,
    pub roster: RosterState,
    pub compose: ComposeState,
    pub board: BalloonBoard,
    pub board_timers: Option<BoardTimers>,
    pub board_loading: bool,
    pub board_error: Option<String>,
    pub voting: VotingSession,
    pub overlay: Overlay,
    pub show_help: bool,
    pub toast: Option<(Toast, Instant)>,
    pub notification: Option<NotificationView>,
    pub debug_log: DebugLogState,
    coordinator: NotificationCoordinator,
    speech: SpeechEngine,
    config: Config,
    /// Ballot waiting for the user to identify.
    pending_ballot: Option<Ballot>,
    ballots_in_flight: HashSet<Ballot>,
    poll_in_flight: bool,
    outbox: Vec<BackendCommand>,
}

impl App {
    pub fn new(config: Config, speech: SpeechEngine, logs: LogBuffer) -> Self {
        Self {
            should_exit: false,
            active_pane: Pane::default(),
            roster: RosterState::default(),
            compose: ComposeState::new(config.sender_name.clone()),
            board: BalloonBoard::new(board::PAGE_SIZE_WIDE),
            board_timers: None,
            board_loading: false,
            board_error: None,
            voting: VotingSession::default(),
            overlay: Overlay::None,
            show_help: false,
            toast: None,
            notification: None,
            debug_log: DebugLogState::new(logs),
            coordinator: NotificationCoordinator::default(),
            speech,
            config,
            pending_ballot: None,
            ballots_in_flight: HashSet::new(),
            poll_in_flight: false,
            outbox: Vec::new(),
        }
    }

    /// Initial loads: roster and board.
    pub fn start(&mut self) {
        self.load_people();
        self.open_board();
    }

    /// Commands queued since the last call.
    pub fn take_commands(&mut self) -> Vec<BackendCommand> {
        std::mem::take(&mut self.outbox)
    }

    fn queue(&mut self, cmd: BackendCommand) {
        tracing::debug!("queue {:?}", cmd);
        self.outbox.push(cmd);
    }

    pub fn set_toast(&mut self, toast: Toast) {
        if toast.is_error() {
            tracing::warn!("{}", toast.line());
        }
        self.toast = Some((toast, Instant::now()));
    }

    /// Adapt the board page size to the terminal width.
    pub fn resize(&mut self, cols: u16) {
        self.board.set_page_size(board::page_size_for_width(cols));
    }

    pub fn voter(&self) -> Option<&Person> {
        self.voting.voter()
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Latest-message poll tick. Overlapping polls are skipped.
    pub fn on_poll_tick(&mut self) {
        if self.poll_in_flight {
            return;
        }
        self.poll_in_flight = true;
        self.queue(BackendCommand::PollLatest);
    }

    pub fn on_board_tick(&mut self, tick: BoardTick) {
        match tick {
            BoardTick::Refresh => self.refresh_board(),
            // Paused while the user browses the board by hand.
            BoardTick::Carousel => {
                if self.active_pane != Pane::Board {
                    self.board.advance();
                }
            }
        }
    }

    pub fn on_frame(&mut self, now: Instant) {
        if let Some((_, shown_at)) = &self.toast {
            if now.duration_since(*shown_at) >= Duration::from_secs(TOAST_SECS) {
                self.toast = None;
            }
        }
        if self.notification.as_ref().is_some_and(|v| v.expired(now)) {
            tracing::debug!("Notification auto-closed");
            self.dismiss_notification();
        }
        self.debug_log.refresh();
    }

    /// Release held resources before leaving the terminal.
    pub fn shutdown(&mut self) {
        if let Some(view) = self.notification.take() {
            view.release(&mut self.speech);
        }
        self.speech.stop();
        self.board_timers = None;
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    fn load_people(&mut self) {
        self.roster.begin_load();
        self.queue(BackendCommand::LoadPeople);
    }

    pub fn board_open(&self) -> bool {
        self.board_timers.is_some()
    }

    fn open_board(&mut self) {
        self.board_timers = Some(BoardTimers::start(
            self.config.polling.board_refresh(),
            self.config.polling.carousel(),
        ));
        self.refresh_board();
    }

    /// Closing drops both timers.
    fn close_board(&mut self) {
        self.board_timers = None;
        self.board_loading = false;
        self.board.reset();
    }

    fn refresh_board(&mut self) {
        if !self.board_open() || self.board_loading {
            return;
        }
        self.board_loading = true;
        self.queue(BackendCommand::LoadBalloons);
    }

    fn show_notification(&mut self, message: LatestMessage) {
        if let Some(previous) = self.notification.take() {
            previous.release(&mut self.speech);
        }
        self.notification = Some(NotificationView::mount(
            message,
            &self.config.notification,
            &mut self.speech,
        ));
    }

    /// Close the notification: resources released, one read acknowledgment.
    pub fn dismiss_notification(&mut self) {
        if let Some(view) = self.notification.take() {
            view.release(&mut self.speech);
        }
        if let Some(id) = self.coordinator.begin_dismiss() {
            self.queue(BackendCommand::MarkRead(id));
        }
    }

    fn send_draft(&mut self) {
        if self.compose.is_sending() {
            return;
        }
        if self.compose.recipient.is_none() {
            self.set_toast(Toast::info(
                "Escolha um destinatário",
                "Selecione alguém na lista de pessoas.",
            ));
            self.active_pane = Pane::Roster;
            return;
        }
        if let Some(message) = self.compose.begin_send() {
            tracing::info!("Sending message to {}", message.recipient_name);
            self.queue(BackendCommand::SendMessage(message));
        }
    }

    /// Vote or like, asking for identity first when needed.
    pub fn request_ballot(&mut self, ballot: Ballot) {
        if self.ballots_in_flight.contains(&ballot) {
            return;
        }
        if self.voting.voter().is_none() {
            self.pending_ballot = Some(ballot);
            self.open_identify();
            return;
        }
        match ballot {
            Ballot::Vote(message_id) => match self.voting.intent(message_id) {
                VoteIntent::NeedsIdentity => {
                    self.pending_ballot = Some(ballot);
                    self.open_identify();
                }
                VoteIntent::AlreadyVoted => {
                    self.set_toast(Toast::info(DUPLICATE_VOTE_MESSAGE, ""));
                }
                VoteIntent::Ready(request) => {
                    self.ballots_in_flight.insert(ballot);
                    self.queue(BackendCommand::Vote(request));
                }
            },
            Ballot::Like(message_id) => match self.voting.like_request(message_id) {
                Some(request) => {
                    self.ballots_in_flight.insert(ballot);
                    self.queue(BackendCommand::Like(request));
                }
                None => self.set_toast(Toast::info("Você já curtiu esta mensagem.", "")),
            },
        }
    }

    fn open_identify(&mut self) {
        if self.roster.people().is_empty() && !self.roster.is_failed() {
            self.load_people();
        }
        let selected = self
            .voter()
            .and_then(|v| self.roster.people().iter().position(|p| p.id == v.id))
            .unwrap_or(0);
        self.overlay = Overlay::Identify { selected };
    }

    /// Adopt `person` as the voter and resume the waiting ballot.
    pub fn identify(&mut self, person: Person) {
        tracing::info!("Identified as {} ({})", person.name, person.id);
        self.set_toast(Toast::info(
            format!("Olá, {}!", person.name),
            "Agora você pode votar.",
        ));
        self.voting.identify(person);
        self.overlay = Overlay::None;
        if let Some(ballot) = self.pending_ballot.take() {
            self.request_ballot(ballot);
        }
    }

    fn selected_balloon_id(&self) -> Option<i64> {
        self.board.selected().map(|b| b.message_id)
    }

    // -----------------------------------------------------------------------
    // Backend responses
    // -----------------------------------------------------------------------

    pub fn handle_response(&mut self, response: BackendResponse) {
        match response {
            BackendResponse::People(Ok(people)) => {
                tracing::debug!("Loaded {} people", people.len());
                self.roster.loaded(people);
            }
            BackendResponse::People(Err(e)) => {
                tracing::warn!("Failed to load people: {}", e);
                self.roster.failed(e.user_message());
            }
            BackendResponse::MessageSent(result) => {
                if let Some(toast) = self.compose.on_sent(&result) {
                    self.set_toast(toast);
                }
            }
            BackendResponse::Suggestions(items) => {
                self.overlay = Overlay::Suggestions { items, selected: 0 };
            }
            BackendResponse::Inbox { person, result } => match result {
                Ok(messages) if messages.is_empty() => self.set_toast(Toast::info(
                    "📭 Caixa vazia",
                    format!("Nenhuma mensagem para {}.", person.name),
                )),
                Ok(messages) => {
                    self.overlay = Overlay::Inbox {
                        person,
                        messages,
                        scroll: 0,
                    };
                }
                Err(e) => self.set_toast(Toast::from_api_error("Erro ao buscar mensagens", &e)),
            },
            BackendResponse::Balloons(result) => {
                self.board_loading = false;
                // Late answer for a board that was closed meanwhile.
                if !self.board_open() {
                    return;
                }
                match result {
                    Ok(balloons) => {
                        self.board.replace(balloons);
                        self.board_error = None;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load balloons: {}", e);
                        self.board_error = Some(e.user_message());
                    }
                }
            }
            BackendResponse::Latest(result) => {
                self.poll_in_flight = false;
                match result {
                    Ok(polled) => {
                        if let Some(message) = self.coordinator.observe(polled) {
                            self.show_notification(message);
                        }
                    }
                    Err(e) => tracing::debug!("Latest message poll failed: {}", e),
                }
            }
            BackendResponse::MarkedRead { message_id, result } => match result {
                Ok(()) => tracing::debug!("Message {} marked as read", message_id),
                Err(e) => tracing::warn!("Failed to mark message {} as read: {}", message_id, e),
            },
            BackendResponse::Popular { top_only, result } => match result {
                Ok(messages) => {
                    self.overlay = Overlay::Popular {
                        top_only,
                        messages,
                        scroll: 0,
                    };
                }
                Err(e) => self.set_toast(Toast::from_api_error("Erro ao carregar", &e)),
            },
            BackendResponse::Voted { message_id, result } => {
                self.ballots_in_flight.remove(&Ballot::Vote(message_id));
                let toast = self.voting.record(message_id, &result);
                self.set_toast(toast);
            }
            BackendResponse::Liked { message_id, result } => {
                self.ballots_in_flight.remove(&Ballot::Like(message_id));
                let toast = self.voting.record_like(message_id, &result);
                if result.is_ok() {
                    self.refresh_board();
                }
                self.set_toast(toast);
            }
            BackendResponse::Ranking(result) => match result {
                Ok(ranking) => self.overlay = Overlay::Ranking(ranking),
                Err(e) => self.set_toast(Toast::from_api_error("Erro ao carregar ranking", &e)),
            },
        }
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Resize(cols, _) => self.resize(cols),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            self.should_exit = true;
            return;
        }

        // The notification takes every key until dismissed.
        if self.notification.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.dismiss_notification();
            }
            return;
        }

        if self.show_help {
            self.show_help = false;
            return;
        }

        if ctrl {
            match key.code {
                KeyCode::Char('d') => {
                    self.debug_log.toggle();
                    return;
                }
                KeyCode::Char('r') => {
                    self.load_people();
                    self.refresh_board();
                    return;
                }
                _ => {}
            }
        }

        if self.debug_log.visible {
            match key.code {
                KeyCode::PageUp => {
                    self.debug_log.scroll_up(5);
                    return;
                }
                KeyCode::PageDown => {
                    self.debug_log.scroll_down(5);
                    return;
                }
                _ => {}
            }
        }

        if self.overlay.is_open() {
            self.handle_overlay_key(key);
            return;
        }

        match key.code {
            KeyCode::Tab => {
                self.active_pane = self.active_pane.next();
                return;
            }
            KeyCode::BackTab => {
                self.active_pane = self.active_pane.prev();
                return;
            }
            _ => {}
        }

        if self.active_pane == Pane::Compose {
            self.handle_compose_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_exit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('s') => self.queue(BackendCommand::LoadSuggestions),
            KeyCode::Char('r') => self.queue(BackendCommand::LoadRanking),
            KeyCode::Char('p') => self.queue(BackendCommand::LoadPopular { top_only: false }),
            KeyCode::Char('t') => self.queue(BackendCommand::LoadPopular { top_only: true }),
            KeyCode::Char('w') => self.open_identify(),
            KeyCode::Char('c') => self.active_pane = Pane::Compose,
            KeyCode::Char('b') => {
                if self.board_open() {
                    self.close_board();
                } else {
                    self.open_board();
                }
            }
            _ => match self.active_pane {
                Pane::Roster => self.handle_roster_key(key),
                Pane::Board => self.handle_board_key(key),
                Pane::Compose => {}
            },
        }
    }

    fn handle_roster_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.roster.move_up(),
            KeyCode::Down | KeyCode::Char('j') => self.roster.move_down(),
            KeyCode::Enter if self.roster.is_failed() => self.load_people(),
            KeyCode::Enter => {
                if let Some(person) = self.roster.selected_person().cloned() {
                    self.compose.set_recipient(person);
                    self.active_pane = Pane::Compose;
                }
            }
            KeyCode::Char('i') => {
                if let Some(person) = self.roster.selected_person().cloned() {
                    self.queue(BackendCommand::SearchInbox(person));
                }
            }
            _ => {}
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left => self.board.go_back(),
            KeyCode::Right => self.board.advance(),
            KeyCode::Up | KeyCode::Char('k') => self.board.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.board.select_next(),
            KeyCode::Char('v') | KeyCode::Enter => {
                if let Some(id) = self.selected_balloon_id() {
                    self.request_ballot(Ballot::Vote(id));
                }
            }
            KeyCode::Char('l') => {
                if let Some(id) = self.selected_balloon_id() {
                    self.request_ballot(Ballot::Like(id));
                }
            }
            _ => {}
        }
    }

    fn handle_compose_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.active_pane = Pane::Roster,
            KeyCode::Enter => self.send_draft(),
            KeyCode::Char('u') if ctrl => self.compose.clear(),
            KeyCode::Char(c) if !ctrl => self.compose.insert_char(c),
            KeyCode::Backspace => self.compose.backspace(),
            KeyCode::Delete => self.compose.delete(),
            KeyCode::Left => self.compose.move_left(),
            KeyCode::Right => self.compose.move_right(),
            KeyCode::Home => self.compose.move_home(),
            KeyCode::End => self.compose.move_end(),
            KeyCode::F(2) => self.compose.toggle_read_aloud(),
            KeyCode::F(3) => self.compose.toggle_voice(),
            KeyCode::F(4) => {
                if !self.compose.toggle_signature() {
                    self.set_toast(Toast::info(
                        "Sem assinatura configurada",
                        "Use `correio configure --sender-name NOME`.",
                    ));
                }
            }
            _ => {}
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) {
        let roster_len = self.roster.people().len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                if matches!(self.overlay, Overlay::Identify { .. }) {
                    self.pending_ballot = None;
                }
                self.overlay = Overlay::None;
            }
            KeyCode::Up | KeyCode::Char('k') => self.overlay.move_by(-1, roster_len),
            KeyCode::Down | KeyCode::Char('j') => self.overlay.move_by(1, roster_len),
            KeyCode::Enter => match std::mem::take(&mut self.overlay) {
                Overlay::Identify { selected } => match self.roster.people().get(selected) {
                    Some(person) => self.identify(person.clone()),
                    // Roster not loaded yet; keep waiting.
                    None => self.overlay = Overlay::Identify { selected },
                },
                Overlay::Suggestions { items, selected } => {
                    if let Some(s) = items.get(selected) {
                        self.compose.prefill(&s.text);
                    }
                    self.active_pane = if self.compose.recipient.is_some() {
                        Pane::Compose
                    } else {
                        Pane::Roster
                    };
                }
                _ => {}
            },
            _ => {}
        }
    }
}

/// Run the TUI with panic-safe terminal restore.
pub async fn run(api: Arc<dyn MailApi>, config: Config, logs: LogBuffer) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = AssertUnwindSafe(run_app(&mut terminal, api, config, logs))
        .catch_unwind()
        .await;
    ratatui::restore();

    match result {
        Ok(r) => r,
        Err(e) => std::panic::resume_unwind(e),
    }
}

async fn run_app(
    terminal: &mut DefaultTerminal,
    api: Arc<dyn MailApi>,
    config: Config,
    logs: LogBuffer,
) -> Result<()> {
    let mut poll = time::interval(config.polling.latest());
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frame_tick = time::interval(Duration::from_millis(FRAME_TICK_MS));
    frame_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let speech = SpeechEngine::new(config.speech.clone());
    let mut app = App::new(config, speech, logs);
    let mut backend = Backend::start(api);
    let mut events = EventStream::new();

    if let Ok((cols, _)) = crossterm::terminal::size() {
        app.resize(cols);
    }
    app.start();
    tracing::info!("TUI started");

    while !app.should_exit {
        for cmd in app.take_commands() {
            backend.send(cmd);
        }
        terminal.draw(|frame| ui::render(frame, &app))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(event)) => app.handle_event(event),
                Some(Err(e)) => {
                    app.shutdown();
                    return Err(e.into());
                }
                None => break,
            },
            Some(response) = backend.recv() => app.handle_response(response),
            _ = poll.tick() => app.on_poll_tick(),
            tick = board::next_tick(&mut app.board_timers) => app.on_board_tick(tick),
            _ = frame_tick.tick() => app.on_frame(Instant::now()),
        }
    }

    app.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::config::NotificationSettings;
    use crate::models::{LatestMessage, VoteRequest};
    use crate::tui::roster::RosterStatus;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn quiet_config() -> Config {
        Config {
            notification: NotificationSettings {
                bell: false,
                ..NotificationSettings::default()
            },
            ..Config::default()
        }
    }

    fn app() -> App {
        App::new(quiet_config(), SpeechEngine::disabled(), LogBuffer::new())
    }

    fn latest(id: i64) -> LatestMessage {
        LatestMessage {
            id,
            sender: "Anônimo".to_string(),
            recipient_name: "Ana".to_string(),
            body: "Parabéns!".to_string(),
            sent_at: "2024-06-24T20:00:00Z".to_string(),
            read: false,
            read_aloud: Some(false),
            voice: None,
        }
    }

    fn identified(app: &mut App) {
        app.handle_response(BackendResponse::People(Ok(vec![Person::new(7, "Bia")])));
        app.identify(Person::new(7, "Bia"));
        app.take_commands();
    }

    #[tokio::test]
    async fn test_start_loads_roster_and_board() {
        let mut app = app();
        app.start();
        assert_eq!(
            app.take_commands(),
            vec![BackendCommand::LoadPeople, BackendCommand::LoadBalloons]
        );
        assert!(app.board_open());
    }

    #[tokio::test]
    async fn test_roster_failure_offers_retry() {
        let mut app = app();
        app.start();
        app.take_commands();

        app.handle_response(BackendResponse::People(Err(ApiError::Server { status: 503 })));
        assert!(app.roster.is_failed());

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.roster.status, RosterStatus::Loading);
        assert_eq!(app.take_commands(), vec![BackendCommand::LoadPeople]);
    }

    #[test]
    fn test_vote_without_identity_asks_first() {
        let mut app = app();
        app.handle_response(BackendResponse::People(Ok(vec![Person::new(7, "Bia")])));
        app.request_ballot(Ballot::Vote(42));
        assert_eq!(app.overlay, Overlay::Identify { selected: 0 });
        assert!(app.take_commands().is_empty());

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.overlay, Overlay::None);
        assert_eq!(
            app.take_commands(),
            vec![BackendCommand::Vote(VoteRequest {
                voter_id: 7,
                message_id: 42,
            })]
        );
    }

    #[test]
    fn test_second_vote_sends_nothing() {
        let mut app = app();
        identified(&mut app);

        app.request_ballot(Ballot::Vote(42));
        assert_eq!(app.take_commands().len(), 1);
        // Pressed again before the answer arrives.
        app.request_ballot(Ballot::Vote(42));
        assert!(app.take_commands().is_empty());

        app.handle_response(BackendResponse::Voted {
            message_id: 42,
            result: Ok(()),
        });
        assert!(app.voting.has_voted(42));

        app.request_ballot(Ballot::Vote(42));
        assert!(app.take_commands().is_empty());
        let (toast, _) = app.toast.clone().unwrap();
        assert_eq!(toast.title, DUPLICATE_VOTE_MESSAGE);
    }

    #[test]
    fn test_conflict_vote_is_not_recorded() {
        let mut app = app();
        identified(&mut app);
        app.request_ballot(Ballot::Vote(42));
        app.take_commands();

        app.handle_response(BackendResponse::Voted {
            message_id: 42,
            result: Err(ApiError::DuplicateVote),
        });
        let (toast, _) = app.toast.clone().unwrap();
        assert!(toast.is_error());
        assert_eq!(toast.description, DUPLICATE_VOTE_MESSAGE);
        assert!(!app.voting.has_voted(42));
    }

    #[test]
    fn test_notification_shown_once_and_acked_once() {
        let mut app = app();
        app.on_poll_tick();
        app.on_poll_tick();
        assert_eq!(app.take_commands(), vec![BackendCommand::PollLatest]);

        app.handle_response(BackendResponse::Latest(Ok(Some(latest(5)))));
        assert!(app.notification.is_some());

        // Any other key is swallowed while the notification is up.
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_exit);

        app.handle_key(key(KeyCode::Enter));
        assert!(app.notification.is_none());
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.take_commands(), vec![BackendCommand::MarkRead(5)]);

        // Same id again: no reopen even though the ack may have failed.
        app.handle_response(BackendResponse::MarkedRead {
            message_id: 5,
            result: Err(ApiError::Server { status: 500 }),
        });
        app.handle_response(BackendResponse::Latest(Ok(Some(latest(5)))));
        assert!(app.notification.is_none());
    }

    #[test]
    fn test_notification_auto_close_dismisses() {
        let mut app = app();
        app.handle_response(BackendResponse::Latest(Ok(Some(latest(8)))));
        assert!(app.notification.is_some());

        app.on_frame(Instant::now() + Duration::from_secs(8));
        assert!(app.notification.is_none());
        assert_eq!(app.take_commands(), vec![BackendCommand::MarkRead(8)]);
    }

    #[test]
    fn test_send_from_compose() {
        let mut app = app();
        app.handle_response(BackendResponse::People(Ok(vec![Person::new(1, "Ana")])));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.active_pane, Pane::Compose);

        for c in "Parabéns!".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        let commands = app.take_commands();
        match commands.as_slice() {
            [BackendCommand::SendMessage(msg)] => {
                assert_eq!(msg.recipient_name, "Ana");
                assert_eq!(msg.body, "Parabéns!");
                assert_eq!(msg.sender, "Anônimo");
            }
            other => panic!("unexpected commands {:?}", other),
        }

        app.handle_response(BackendResponse::MessageSent(Ok(())));
        assert!(app.compose.input.is_empty());
        let (toast, _) = app.toast.clone().unwrap();
        assert_eq!(toast.title, "🎉 Mensagem enviada!");
    }

    #[test]
    fn test_empty_inbox_shows_toast() {
        let mut app = app();
        app.handle_response(BackendResponse::Inbox {
            person: Person::new(1, "Ana"),
            result: Ok(Vec::new()),
        });
        assert_eq!(app.overlay, Overlay::None);
        let (toast, _) = app.toast.clone().unwrap();
        assert_eq!(toast.title, "📭 Caixa vazia");
    }

    #[tokio::test]
    async fn test_closed_board_ignores_late_balloons() {
        let mut app = app();
        app.start();
        app.take_commands();
        app.handle_key(key(KeyCode::Char('b')));
        assert!(!app.board_open());

        app.handle_response(BackendResponse::Balloons(Ok(vec![crate::board::Balloon {
            message_id: 1,
            recipient_id: 1,
            recipient_name: "Ana".to_string(),
            photo_url: String::new(),
            sender: "Anônimo".to_string(),
            body: "oi".to_string(),
            likes: 0,
        }])));
        assert!(app.board.is_empty());
    }

    #[test]
    fn test_suggestion_prefills_draft() {
        let mut app = app();
        app.handle_response(BackendResponse::Suggestions(
            crate::api::suggestions::fallback(),
        ));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.overlay, Overlay::None);
        assert_eq!(
            app.compose.input,
            crate::api::suggestions::fallback()[1].text
        );
    }
}
