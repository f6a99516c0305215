pub mod store;

pub use store::{BookingError, BookingEvent, BookingForm, BookingStore};
