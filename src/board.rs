//! Balloon board: every received message with its like count, paginated to
//! the terminal width and rotated by a carousel timer.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::api::{ApiError, MailApi};
use crate::models::{ReceivedMessage, TopMessage};

/// Balloons per page below `MEDIUM_MIN_COLS` columns.
pub const PAGE_SIZE_NARROW: usize = 2;
/// Balloons per page below `WIDE_MIN_COLS` columns.
pub const PAGE_SIZE_MEDIUM: usize = 6;
pub const PAGE_SIZE_WIDE: usize = 10;

const MEDIUM_MIN_COLS: u16 = 80;
const WIDE_MIN_COLS: u16 = 120;

/// One received message as shown on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balloon {
    pub message_id: i64,
    pub recipient_id: i64,
    pub recipient_name: String,
    pub photo_url: String,
    pub sender: String,
    pub body: String,
    pub likes: u32,
}

impl Balloon {
    fn from_received(msg: ReceivedMessage, likes: u32) -> Self {
        Self {
            message_id: msg.message_id,
            recipient_id: msg.recipient_id,
            recipient_name: msg.recipient_name,
            photo_url: msg.photo_url,
            sender: msg.sender,
            body: msg.body,
            likes,
        }
    }
}

/// Attach like counts from the popular listing, by message id. Unknown ids get 0.
pub fn merge_likes(received: Vec<ReceivedMessage>, popular: &[TopMessage]) -> Vec<Balloon> {
    let likes: HashMap<i64, u32> = popular.iter().map(|m| (m.id, m.likes)).collect();
    received
        .into_iter()
        .map(|msg| {
            let count = likes.get(&msg.message_id).copied().unwrap_or(0);
            Balloon::from_received(msg, count)
        })
        .collect()
}

/// Fetch every received message with its like count.
///
/// A failed like-count lookup degrades to zero likes instead of failing the board.
pub async fn fetch_balloons<A: MailApi + ?Sized>(api: &A) -> Result<Vec<Balloon>, ApiError> {
    let received = api.received_messages().await?;
    let popular = match api.popular_messages().await {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!("Popular messages unavailable, showing zero likes: {}", e);
            Vec::new()
        }
    };
    Ok(merge_likes(received, &popular))
}

/// Page size for a viewport `cols` columns wide.
pub fn page_size_for_width(cols: u16) -> usize {
    if cols < MEDIUM_MIN_COLS {
        PAGE_SIZE_NARROW
    } else if cols < WIDE_MIN_COLS {
        PAGE_SIZE_MEDIUM
    } else {
        PAGE_SIZE_WIDE
    }
}

/// Paginated balloon grid with a carousel cursor.
#[derive(Debug, Clone)]
pub struct BalloonBoard {
    balloons: Vec<Balloon>,
    page: usize,
    page_size: usize,
    /// Highlighted balloon, as an index into the visible page.
    selected: usize,
}

impl BalloonBoard {
    pub fn new(page_size: usize) -> Self {
        Self {
            balloons: Vec::new(),
            page: 0,
            page_size: page_size.max(1),
            selected: 0,
        }
    }

    /// Swap in a fresh listing, dropping repeated message ids (first wins).
    ///
    /// The current page survives a refresh when it still exists.
    pub fn replace(&mut self, balloons: Vec<Balloon>) {
        let mut seen = HashSet::new();
        self.balloons = balloons
            .into_iter()
            .filter(|b| seen.insert(b.message_id))
            .collect();
        if self.page >= self.page_count() {
            self.page = 0;
        }
        self.clamp_selection();
    }

    pub fn balloons(&self) -> &[Balloon] {
        &self.balloons
    }

    pub fn len(&self) -> usize {
        self.balloons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balloons.is_empty()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `ceil(len / page_size)`.
    pub fn page_count(&self) -> usize {
        self.balloons.len().div_ceil(self.page_size)
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        let page_size = page_size.max(1);
        if page_size == self.page_size {
            return;
        }
        self.page_size = page_size;
        if self.page >= self.page_count() {
            self.page = 0;
        }
        self.clamp_selection();
    }

    /// Whether the carousel has more than one page to rotate through.
    pub fn rotates(&self) -> bool {
        self.balloons.len() > self.page_size
    }

    /// Next page, wrapping to the first after the last.
    pub fn advance(&mut self) {
        let pages = self.page_count();
        self.page = if pages == 0 || self.page + 1 >= pages {
            0
        } else {
            self.page + 1
        };
        self.selected = 0;
    }

    /// Previous page, wrapping to the last before the first.
    pub fn go_back(&mut self) {
        let pages = self.page_count();
        self.page = if pages == 0 {
            0
        } else if self.page == 0 {
            pages - 1
        } else {
            self.page - 1
        };
        self.selected = 0;
    }

    pub fn reset(&mut self) {
        self.page = 0;
        self.selected = 0;
    }

    /// Balloons on the current page.
    pub fn visible(&self) -> &[Balloon] {
        let start = (self.page * self.page_size).min(self.balloons.len());
        let end = (start + self.page_size).min(self.balloons.len());
        &self.balloons[start..end]
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&Balloon> {
        self.visible().get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible().len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let visible = self.visible().len();
        if self.selected >= visible {
            self.selected = visible.saturating_sub(1);
        }
    }
}

/// What fired on the board's timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardTick {
    Refresh,
    Carousel,
}

/// Refresh and carousel intervals of an open board.
///
/// The two run unsynchronized. Dropping the value clears both.
pub struct BoardTimers {
    refresh: Interval,
    carousel: Interval,
}

impl BoardTimers {
    /// Start both timers; the first ticks arrive one period from now.
    pub fn start(refresh_every: Duration, carousel_every: Duration) -> Self {
        Self {
            refresh: lossy_interval(refresh_every),
            carousel: lossy_interval(carousel_every),
        }
    }

    pub async fn tick(&mut self) -> BoardTick {
        tokio::select! {
            _ = self.refresh.tick() => BoardTick::Refresh,
            _ = self.carousel.tick() => BoardTick::Carousel,
        }
    }
}

/// Interval that skips missed ticks instead of bursting to catch up.
pub fn lossy_interval(period: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Next tick of an open board; never resolves while the board is closed.
pub async fn next_tick(timers: &mut Option<BoardTimers>) -> BoardTick {
    match timers {
        Some(t) => t.tick().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use reqwest::StatusCode;
    use tokio_test::{assert_pending, task};

    fn balloon(id: i64) -> Balloon {
        Balloon {
            message_id: id,
            recipient_id: 1,
            recipient_name: "Ana".to_string(),
            photo_url: String::new(),
            sender: "Anônimo".to_string(),
            body: format!("msg {}", id),
            likes: 0,
        }
    }

    fn received(message_id: i64) -> ReceivedMessage {
        ReceivedMessage {
            recipient_id: 1,
            recipient_name: "Ana".to_string(),
            photo_url: String::new(),
            sender: "Anônimo".to_string(),
            body: "Oi".to_string(),
            message_id,
            likes: None,
        }
    }

    fn top(id: i64, likes: u32) -> TopMessage {
        TopMessage {
            id,
            sender: String::new(),
            recipient_name: String::new(),
            body: String::new(),
            sent_at: String::new(),
            likes,
        }
    }

    fn board(n: i64, page_size: usize) -> BalloonBoard {
        let mut b = BalloonBoard::new(page_size);
        b.replace((1..=n).map(balloon).collect());
        b
    }

    #[test]
    fn test_page_count_is_ceiling() {
        for (n, p, expected) in [(0, 10, 0), (1, 10, 1), (10, 10, 1), (11, 10, 2), (7, 2, 4), (12, 6, 2)] {
            assert_eq!(board(n, p).page_count(), expected, "n={} p={}", n, p);
        }
    }

    #[test]
    fn test_advance_wraps_to_first_page() {
        let mut b = board(7, 2);
        for expected in [1, 2, 3, 0, 1] {
            b.advance();
            assert_eq!(b.page(), expected);
        }
        b.go_back();
        assert_eq!(b.page(), 0);
        b.go_back();
        assert_eq!(b.page(), 3);
    }

    #[test]
    fn test_visible_slice_and_last_page() {
        let mut b = board(7, 2);
        assert_eq!(b.visible().iter().map(|x| x.message_id).collect::<Vec<_>>(), vec![1, 2]);
        b.advance();
        b.advance();
        b.advance();
        assert_eq!(b.visible().iter().map(|x| x.message_id).collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn test_single_page_does_not_rotate() {
        let mut b = board(3, 10);
        assert!(!b.rotates());
        b.advance();
        assert_eq!(b.page(), 0);

        let mut empty = BalloonBoard::new(10);
        empty.advance();
        assert_eq!(empty.page(), 0);
        assert!(empty.visible().is_empty());
    }

    #[test]
    fn test_replace_deduplicates_by_message_id() {
        let mut b = BalloonBoard::new(10);
        let mut dup = balloon(2);
        dup.body = "later copy".to_string();
        b.replace(vec![balloon(1), balloon(2), dup, balloon(3)]);
        assert_eq!(b.len(), 3);
        assert_eq!(b.balloons()[1].body, "msg 2");
    }

    #[test]
    fn test_refresh_keeps_valid_page_and_resets_invalid() {
        let mut b = board(7, 2);
        b.advance();
        b.replace((1..=8).map(balloon).collect());
        assert_eq!(b.page(), 1);

        b.advance();
        b.advance();
        assert_eq!(b.page(), 3);
        b.replace((1..=3).map(balloon).collect());
        assert_eq!(b.page(), 0);
    }

    #[test]
    fn test_page_size_breakpoints() {
        assert_eq!(page_size_for_width(60), PAGE_SIZE_NARROW);
        assert_eq!(page_size_for_width(80), PAGE_SIZE_MEDIUM);
        assert_eq!(page_size_for_width(119), PAGE_SIZE_MEDIUM);
        assert_eq!(page_size_for_width(200), PAGE_SIZE_WIDE);
    }

    #[test]
    fn test_selection_stays_on_page() {
        let mut b = board(3, 2);
        b.select_next();
        b.select_next();
        assert_eq!(b.selected().map(|x| x.message_id), Some(2));
        b.advance();
        assert_eq!(b.selected().map(|x| x.message_id), Some(3));
        b.select_prev();
        assert_eq!(b.selected_index(), 0);
    }

    #[test]
    fn test_merge_likes_by_message_id() {
        let balloons = merge_likes(vec![received(10), received(11)], &[top(11, 4), top(99, 1)]);
        assert_eq!(balloons[0].likes, 0);
        assert_eq!(balloons[1].likes, 4);
    }

    #[tokio::test]
    async fn test_fetch_tolerates_popular_failure() {
        let api = FakeApi::default();
        api.with(|s| {
            s.received = vec![received(1), received(2)];
            s.popular = vec![top(1, 3)];
        });
        api.fail("popular", StatusCode::INTERNAL_SERVER_ERROR);

        let balloons = fetch_balloons(&api).await.unwrap();
        assert_eq!(balloons.len(), 2);
        assert!(balloons.iter().all(|b| b.likes == 0));

        api.recover("popular");
        let balloons = fetch_balloons(&api).await.unwrap();
        assert_eq!(balloons[0].likes, 3);
    }

    #[tokio::test]
    async fn test_fetch_fails_without_received_messages() {
        let api = FakeApi::default();
        api.fail("received", StatusCode::BAD_GATEWAY);
        assert!(fetch_balloons(&api).await.is_err());
    }

    #[test]
    fn test_closed_board_never_ticks() {
        let mut timers: Option<BoardTimers> = None;
        let mut tick = task::spawn(next_tick(&mut timers));
        assert_pending!(tick.poll());
        assert_pending!(tick.poll());
    }

    #[tokio::test]
    async fn test_open_board_waits_a_full_period() {
        let mut timers = Some(BoardTimers::start(
            Duration::from_secs(60),
            Duration::from_secs(60),
        ));
        let mut tick = task::spawn(next_tick(&mut timers));
        assert_pending!(tick.poll());
    }

    #[tokio::test]
    async fn test_open_board_ticks() {
        let mut timers = Some(BoardTimers::start(
            Duration::from_secs(60),
            Duration::from_millis(5),
        ));
        let tick = time::timeout(Duration::from_secs(1), next_tick(&mut timers))
            .await
            .unwrap();
        assert_eq!(tick, BoardTick::Carousel);
    }
}
