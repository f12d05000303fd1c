//! Data models for the Correio Elegante API

mod message;
mod person;
mod ranking;
mod suggestion;

pub use message::*;
pub use person::*;
pub use ranking::*;
pub use suggestion::*;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Read a field the backend may send as `null`, using the type's default instead.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Format a backend timestamp for display (`dd/mm/yyyy HH:MM`).
///
/// Accepts RFC 3339 and offset-less ISO timestamps; anything else is shown as is.
pub fn display_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%d/%m/%Y %H:%M").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%d/%m/%Y %H:%M").to_string();
    }
    raw.to_string()
}
