//! Roster endpoint

use super::client::CorreioClient;
use super::error::ApiError;
use crate::models::Person;

const PEOPLE_PATH: &str = "/pessoas";

/// Fetch the roster of people who can receive messages.
pub async fn fetch_people(client: &CorreioClient) -> Result<Vec<Person>, ApiError> {
    let people: Vec<Person> = client.get_json(PEOPLE_PATH).await?;
    tracing::debug!("Loaded {} people", people.len());
    Ok(people)
}
