use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub cancel_token: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    pub date: String,
    pub time: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn holds_slot(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }

    pub fn slot(&self) -> Slot {
        Slot {
            date: self.date.clone(),
            time: self.time.clone(),
        }
    }

    pub fn occupies(&self, date: &str, time: &str) -> bool {
        self.holds_slot() && self.date == date && self.time == time
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

/// A bookable `(date, time)` pair. Compared by exact string match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Slot {
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBooking {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
}

/// Booking id as sent by clients, who may post it as a number or a string.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BookingRef {
    Number(i64),
    Text(String),
}

impl BookingRef {
    pub fn matches(&self, id: i64) -> bool {
        match self {
            BookingRef::Number(n) => *n == id,
            BookingRef::Text(s) => s.trim() == id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub id: Option<BookingRef>,
}
