//! Suggestion phrases, with a built-in fallback list

use serde::Deserialize;

use super::client::CorreioClient;
use super::error::ApiError;
use super::MailApi;
use crate::models::Suggestion;

const SUGGESTIONS_PATH: &str = "/sugestoes";

/// Phrases shown whenever the backend has none to offer.
pub const FALLBACK_SUGGESTIONS: [&str; 20] = [
    "Se eu fosse um correio elegante, te entregava flores todo dia!",
    "Você não é fogueira, mas fez meu coração pular!",
    "Se São João visse esse sorriso, mandava até mais balão!",
    "Queria ser milho pra virar pamonha e te conquistar no arraial.",
    "Se beleza fosse festa junina, você era o forró a noite toda!",
    "Me chama de quadrilha e me deixa dançar do seu lado!",
    "Você é o quentão que faltava no meu inverno.",
    "Se eu fosse balão, queria voar só pra te ver sorrir.",
    "Topa ser meu par na quadrilha do coração?",
    "Cuidado: risco de se apaixonar nesse arraiá!",
    "Se eu fosse bandeirinha, queria enfeitar seu caminho.",
    "Você é mais doce que canjica!",
    "Se eu fosse correio elegante, só entregava mensagem pra você.",
    "Me chama de fogueira e deixa eu te esquentar!",
    "Você é o xote do meu coração.",
    "Se eu fosse chapéu, queria estar na sua cabeça o tempo todo.",
    "Você é o prêmio da pescaria do meu coração.",
    "Se eu fosse paçoca, queria derreter na sua boca.",
    "Me chama de bandeirinha e deixa eu colorir sua vida.",
    "Você é o balão mais bonito desse São João!",
];

/// Suggestion as the backend sends it; older deployments use `mensagem`.
#[derive(Debug, Deserialize)]
struct RawSuggestion {
    id: Option<i64>,
    texto: Option<String>,
    mensagem: Option<String>,
}

/// Give every suggestion an id (its position when missing) and a text.
fn normalize(raw: Vec<RawSuggestion>) -> Vec<Suggestion> {
    raw.into_iter()
        .enumerate()
        .map(|(idx, s)| Suggestion {
            id: s.id.unwrap_or(idx as i64),
            text: s.texto.or(s.mensagem).unwrap_or_default(),
        })
        .collect()
}

pub fn fallback() -> Vec<Suggestion> {
    FALLBACK_SUGGESTIONS
        .iter()
        .enumerate()
        .map(|(idx, text)| Suggestion::new(idx as i64, *text))
        .collect()
}

/// Fetch the remote suggestion list as is (possibly empty).
pub async fn fetch_suggestions(client: &CorreioClient) -> Result<Vec<Suggestion>, ApiError> {
    let raw: Vec<RawSuggestion> = client.get_json(SUGGESTIONS_PATH).await?;
    Ok(normalize(raw))
}

/// Suggestions to show. Never empty: an empty or failed fetch yields the fallback list.
pub async fn load<A: MailApi + ?Sized>(api: &A) -> Vec<Suggestion> {
    match api.suggestions().await {
        Ok(list) if !list.is_empty() => list,
        Ok(_) => {
            tracing::info!("No remote suggestions, using built-in phrases");
            fallback()
        }
        Err(e) => {
            tracing::warn!("Failed to load suggestions: {}", e);
            fallback()
        }
    }
}
