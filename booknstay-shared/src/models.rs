use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::Document;

/// A stay offered in the `hotels` collection. Read-only to this system and
/// replaced wholesale on every catalog update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub location: String,
    pub price: String,
    pub city: String,
}

impl Hotel {
    /// Decode a catalog document. A document without a `name` is not a
    /// hotel we can show; callers drop it from the result set. Every other
    /// field defaults to the empty string.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let name = doc.get_str("name")?.to_string();
        Some(Self {
            id: doc.id.clone(),
            name,
            location: doc.str_or_empty("location"),
            price: doc.str_or_empty("price"),
            city: doc.str_or_empty("city"),
        })
    }
}

/// How the guest chose to pay. Stored as display text on the wire; anything
/// unrecognized falls back to card, matching the payment screen default.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    #[default]
    Card,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Card",
            PaymentMethod::Cash => "Cash",
        }
    }

    pub fn from_wire(value: &str) -> Self {
        match value {
            "Cash" => PaymentMethod::Cash,
            _ => PaymentMethod::Card,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One confirmed booking. Immutable after creation; the hotel fields are a
/// snapshot taken at booking time and are never synced with later catalog
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub hotel_id: String,
    pub hotel_name: String,
    pub city: String,
    pub check_in: String,
    pub check_out: String,
    pub guests: String,
    pub price: String,
    pub payment_method: PaymentMethod,
    /// Server-assigned commit time. Lenient on decode: a document written
    /// before the server stamped it shows up without one.
    pub created_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// Decode a booking document. History rows tolerate anything: every
    /// missing field renders as empty text.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            user_id: doc.str_or_empty("userId"),
            hotel_id: doc.str_or_empty("hotelId"),
            hotel_name: doc.str_or_empty("hotelName"),
            city: doc.str_or_empty("city"),
            check_in: doc.str_or_empty("checkIn"),
            check_out: doc.str_or_empty("checkOut"),
            guests: doc.str_or_empty("guests"),
            price: doc.str_or_empty("price"),
            payment_method: PaymentMethod::from_wire(&doc.str_or_empty("paymentMethod")),
            created_at: doc
                .get_i64("createdAt")
                .and_then(DateTime::<Utc>::from_timestamp_millis),
        }
    }
}
