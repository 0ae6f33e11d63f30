use serde::{Deserialize, Serialize};

use super::{Booking, Contact};

/// The whole persisted state. Every mutation rewrites all of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreDocument {
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub subscribers: Vec<String>,
}

impl StoreDocument {
    /// Next record id: the current time in milliseconds, bumped past every
    /// id already in use so ids stay unique within one millisecond.
    pub fn next_id(&self, now_millis: i64) -> i64 {
        let highest = self
            .bookings
            .iter()
            .map(|b| b.id)
            .chain(self.contacts.iter().map(|c| c.id))
            .max()
            .unwrap_or(0);
        now_millis.max(highest.saturating_add(1))
    }
}
