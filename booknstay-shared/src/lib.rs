pub mod document;
pub mod models;
pub mod pii;

pub use document::{Document, Snapshot};
pub use models::{Booking, Hotel, PaymentMethod};
pub use pii::Masked;
