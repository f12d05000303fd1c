//! Ranking of people by received messages

use serde::Deserialize;

/// Response of the ranking endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Ranking {
    #[serde(rename = "pessoas", default, deserialize_with = "super::null_as_default")]
    pub people: Vec<RankedPerson>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RankedPerson {
    #[serde(rename = "nome", default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(rename = "foto", default, deserialize_with = "super::null_as_default")]
    pub photo_url: String,
    #[serde(rename = "mensagemCount", default, deserialize_with = "super::null_as_default")]
    pub message_count: u32,
}

/// Podium position of a ranking entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    pub fn symbol(&self) -> &'static str {
        match self {
            Medal::Gold => "🥇",
            Medal::Silver => "🥈",
            Medal::Bronze => "🥉",
        }
    }
}

impl Ranking {
    /// Medal of every entry, in order.
    ///
    /// The three highest distinct counts earn a medal and ties share it.
    /// People with no messages never get one.
    pub fn medals(&self) -> Vec<Option<Medal>> {
        let mut distinct: Vec<u32> = self.people.iter().map(|p| p.message_count).collect();
        distinct.sort_unstable_by(|a, b| b.cmp(a));
        distinct.dedup();

        self.people
            .iter()
            .map(|p| {
                if p.message_count == 0 {
                    return None;
                }
                match distinct.iter().position(|&c| c == p.message_count) {
                    Some(0) => Some(Medal::Gold),
                    Some(1) => Some(Medal::Silver),
                    Some(2) => Some(Medal::Bronze),
                    _ => None,
                }
            })
            .collect()
    }

    /// Whether anyone has received a message yet.
    pub fn has_leader(&self) -> bool {
        self.people.first().is_some_and(|p| p.message_count > 0)
    }
}
