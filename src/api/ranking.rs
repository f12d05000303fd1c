//! Ranking endpoint

use super::client::CorreioClient;
use super::error::ApiError;
use crate::models::Ranking;

const RANKING_PATH: &str = "/ranking";

pub async fn fetch_ranking(client: &CorreioClient) -> Result<Ranking, ApiError> {
    client.get_json(RANKING_PATH).await
}
