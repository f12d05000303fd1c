//! One-shot CLI commands: call the API once and print the result.

use anyhow::{bail, Context, Result};
use tokio::time::{self, Duration, Instant, MissedTickBehavior};

use crate::api::{self, MailApi};
use crate::board::{self, BalloonBoard};
use crate::compose::{self, Draft, SenderPolicy, VoicePrefs};
use crate::config::Config;
use crate::feedback::Toast;
use crate::models::{display_timestamp, LatestMessage, Person};
use crate::notify::{Dismissal, NotificationCoordinator, NotificationView, SpeechEngine};
use crate::voting::{self, VoteOutcome, VotingSession};

/// Housekeeping cadence of `watch` (auto-close checks).
const WATCH_TICK_MS: u64 = 250;

/// Print the roster.
pub async fn list_people(api: &dyn MailApi) -> Result<()> {
    let people = api.people().await.context("Failed to load people")?;

    println!("\nPessoas:");
    println!("{:-<60}", "");
    if people.is_empty() {
        println!("  (nenhuma pessoa disponível)");
        return Ok(());
    }
    for p in &people {
        match p.photo() {
            Some(url) => println!("  {:>4}  {:<30} {}", p.id, p.name, url),
            None => println!("  {:>4}  {}", p.id, p.name),
        }
    }
    Ok(())
}

/// Find a roster entry by id or (case-insensitive) name.
pub fn find_person<'a>(people: &'a [Person], key: &str) -> Option<&'a Person> {
    let key = key.trim();
    if let Ok(id) = key.parse::<i64>() {
        if let Some(p) = people.iter().find(|p| p.id == id) {
            return Some(p);
        }
    }
    people
        .iter()
        .find(|p| p.name.trim().eq_ignore_ascii_case(key))
        .or_else(|| {
            let lower = key.to_lowercase();
            people.iter().find(|p| p.name.trim().to_lowercase() == lower)
        })
}

async fn roster_person(api: &dyn MailApi, key: &str) -> Result<Person> {
    let people = api.people().await.context("Failed to load people")?;
    match find_person(&people, key) {
        Some(p) => Ok(p.clone()),
        None => bail!("No one named or numbered {:?} in the roster", key),
    }
}

fn print_toast(toast: &Toast) -> Result<()> {
    if toast.is_error() {
        bail!("{}", toast.line());
    }
    println!("{}", toast.line());
    Ok(())
}

/// Send one message to a roster entry.
pub async fn send(
    api: &dyn MailApi,
    to: &str,
    text: &str,
    sender: SenderPolicy,
    voice: VoicePrefs,
) -> Result<()> {
    let recipient = roster_person(api, to).await?;
    let mut draft = Draft::new(recipient, sender);
    draft.voice = voice;
    draft.prefill(text);

    match compose::submit(api, &mut draft).await {
        Some(toast) => print_toast(&toast),
        None => bail!("Message is empty"),
    }
}

pub async fn list_suggestions(api: &dyn MailApi) -> Result<()> {
    let suggestions = api::suggestions::load(api).await;
    println!("\nSugestões:");
    println!("{:-<60}", "");
    for s in &suggestions {
        println!("  \"{}\"", s.text);
    }
    Ok(())
}

/// Messages received by one roster person.
pub async fn inbox(api: &dyn MailApi, person_id: i64) -> Result<()> {
    let messages = api
        .my_messages(person_id)
        .await
        .context("Failed to search messages")?;

    if messages.is_empty() {
        println!("📭 Caixa vazia: nenhuma mensagem encontrada.");
        return Ok(());
    }
    for m in &messages {
        let when = m.sent_at.as_deref().map(display_timestamp).unwrap_or_default();
        println!("[{}] {} -> {}", when, m.sender, m.recipient_name);
        println!("  \"{}\"", m.body);
    }
    Ok(())
}

/// One page of the balloon board.
pub async fn show_board(api: &dyn MailApi, page: usize, page_size: usize) -> Result<()> {
    let balloons = board::fetch_balloons(api)
        .await
        .context("Failed to load received messages")?;

    let mut board = BalloonBoard::new(page_size);
    board.replace(balloons);
    if board.is_empty() {
        println!("(nenhuma mensagem recebida)");
        return Ok(());
    }
    for _ in 0..page.min(board.page_count().saturating_sub(1)) {
        board.advance();
    }

    println!(
        "\n🎈 Balões (página {}/{}, {} mensagens)",
        board.page() + 1,
        board.page_count(),
        board.len()
    );
    println!("{:-<60}", "");
    for b in board.visible() {
        println!("#{} para {} ({} 👍)", b.message_id, b.recipient_name, b.likes);
        println!("  \"{}\"", b.body);
    }
    Ok(())
}

fn print_latest(msg: &LatestMessage) {
    println!("\n💌 Nova Mensagem de Amor! (#{})", msg.id);
    println!("  Para: {}", msg.recipient_name);
    println!("  \"{}\"", msg.body);
    println!("  - {}", msg.sender);
}

pub async fn latest(api: &dyn MailApi) -> Result<()> {
    match api
        .latest_message()
        .await
        .context("Failed to fetch the latest message")?
    {
        Some(msg) => {
            print_latest(&msg);
            println!("  lida: {}", if msg.read { "sim" } else { "não" });
        }
        None => println!("(nenhuma mensagem pendente)"),
    }
    Ok(())
}

pub async fn mark_read(api: &dyn MailApi, message_id: i64) -> Result<()> {
    api.mark_read(message_id)
        .await
        .with_context(|| format!("Failed to mark message {} as read", message_id))?;
    println!("Mensagem {} marcada como lida.", message_id);
    Ok(())
}

/// Popular (all) or top-10 messages by likes.
pub async fn popular(api: &dyn MailApi, top_only: bool) -> Result<()> {
    let messages = if top_only {
        api.top_messages().await
    } else {
        api.popular_messages().await
    }
    .context("Failed to load popular messages")?;

    if messages.is_empty() {
        println!("(nenhuma mensagem votada ainda)");
        return Ok(());
    }
    for (idx, m) in messages.iter().enumerate() {
        println!("{:>2}. para {} ({} 👍)", idx + 1, m.recipient_name, m.likes);
        println!("    \"{}\"", m.body);
    }
    Ok(())
}

pub async fn vote(api: &dyn MailApi, voter: &str, message_id: i64, like: bool) -> Result<()> {
    let mut session = VotingSession::default();
    session.identify(roster_person(api, voter).await?);

    let outcome = if like {
        voting::like(api, &mut session, message_id).await
    } else {
        voting::cast(api, &mut session, message_id).await
    };
    match outcome {
        VoteOutcome::Counted(toast) | VoteOutcome::Rejected(toast) => print_toast(&toast),
        VoteOutcome::NeedsIdentity | VoteOutcome::AlreadyVoted => {
            bail!("Vote was not sent")
        }
    }
}

pub async fn ranking(api: &dyn MailApi) -> Result<()> {
    let ranking = api.ranking().await.context("Failed to load the ranking")?;
    if ranking.people.is_empty() {
        println!("(ranking vazio)");
        return Ok(());
    }

    println!("\nRanking de Mensagens Recebidas");
    println!("{:-<60}", "");
    for (p, medal) in ranking.people.iter().zip(ranking.medals()) {
        let medal = medal.map(|m| m.symbol()).unwrap_or("  ");
        println!("{} {:<30} {:>4}", medal, p.name, p.message_count);
    }
    if let Some(leader) = ranking.people.first().filter(|_| ranking.has_leader()) {
        println!("\n👑 {} lidera o arraiá!", leader.name);
    }
    Ok(())
}

/// Poll for new messages until Ctrl+C, announcing each one.
pub async fn watch(api: &dyn MailApi, config: &Config) -> Result<()> {
    let mut coordinator = NotificationCoordinator::default();
    let mut speech = SpeechEngine::new(config.speech.clone());
    let mut view: Option<NotificationView> = None;

    let mut poll = time::interval(config.polling.latest());
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut housekeeping = time::interval(Duration::from_millis(WATCH_TICK_MS));

    tracing::info!(
        "Watching for new messages every {}s (Ctrl+C to stop)",
        config.polling.latest().as_secs()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                if let Some(v) = view.take() {
                    v.release(&mut speech);
                }
                println!("Shutting down...");
                return Ok(());
            }
            _ = poll.tick() => {
                match coordinator.poll_once(api).await {
                    Ok(Some(msg)) => {
                        if let Some(old) = view.take() {
                            old.release(&mut speech);
                        }
                        print_latest(&msg);
                        view = Some(NotificationView::mount(msg, &config.notification, &mut speech));
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Latest message poll failed: {}", e),
                }
            }
            _ = housekeeping.tick() => {
                let now = Instant::now();
                if view.as_ref().is_some_and(|v| v.expired(now)) {
                    if let Some(v) = view.take() {
                        v.release(&mut speech);
                    }
                    if let Dismissal::AckFailed(id) = coordinator.dismiss(api).await {
                        println!("(não foi possível marcar a mensagem {} como lida)", id);
                    }
                }
            }
        }
    }
}
