use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use booknstay_core::auth::AuthProvider;
use booknstay_core::store::{
    DocumentStore, Query, SortDirection, StoreError, Subscription,
};
use booknstay_shared::models::{Booking, Hotel, PaymentMethod};

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("User not logged in")]
    NotSignedIn,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Booking details the guest fills in on the payment screen. Free-form
/// text throughout; only non-blank checks apply, and those happen in the
/// screen controller before a booking is attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingForm {
    pub check_in: String,
    pub check_out: String,
    pub guests: String,
    pub payment_method: PaymentMethod,
}

impl BookingForm {
    pub fn has_blank_field(&self) -> bool {
        self.check_in.trim().is_empty()
            || self.check_out.trim().is_empty()
            || self.guests.trim().is_empty()
    }
}

/// One booking-history change, newest first.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingEvent {
    Updated(Vec<Booking>),
}

/// The two booking responsibilities: a live history view filtered to the
/// current user, and the append that creates a booking. Both backends are
/// injected; tests substitute the in-memory ones.
pub struct BookingStore {
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthProvider>,
    subscription: Option<Subscription>,
    subscribed_user: Option<String>,
}

impl BookingStore {
    /// Wires the store and opens the history view for whoever is currently
    /// signed in. With nobody signed in the view stays empty and no
    /// subscription is opened.
    pub async fn open(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Result<Self, StoreError> {
        let mut this = Self {
            store,
            auth,
            subscription: None,
            subscribed_user: None,
        };
        this.reopen().await?;
        Ok(this)
    }

    /// Re-establishes the history subscription for the current user,
    /// releasing the previous one first. Called again whenever the signed-in
    /// user changes.
    pub async fn reopen(&mut self) -> Result<(), StoreError> {
        if let Some(subscription) = self.subscription.as_mut() {
            subscription.release();
        }
        self.subscription = None;
        self.subscribed_user = self.auth.current_user();

        let Some(user_id) = self.subscribed_user.clone() else {
            return Ok(());
        };

        let query = Query::collection("bookings")
            .where_eq("userId", user_id.clone())
            .order_by("createdAt", SortDirection::Descending);
        self.subscription = Some(self.store.subscribe(query).await?);
        info!(user = %user_id, "booking history view opened");
        Ok(())
    }

    /// The user the current subscription was opened for.
    pub fn subscribed_user(&self) -> Option<&str> {
        self.subscribed_user.as_deref()
    }

    /// Awaits the next history change. Subscription errors are swallowed
    /// (the last delivered list stays on screen), so only updates come
    /// out. None when unsubscribed, released, or the backend is gone.
    pub async fn next_event(&mut self) -> Option<BookingEvent> {
        let subscription = self.subscription.as_mut()?;
        loop {
            match subscription.recv().await? {
                Ok(snapshot) => {
                    let bookings: Vec<Booking> =
                        snapshot.iter().map(Booking::from_document).collect();
                    return Some(BookingEvent::Updated(bookings));
                }
                Err(error) => {
                    warn!(error = %error, "booking subscription error, keeping last list");
                }
            }
        }
    }

    /// Appends one booking carrying the full denormalized hotel snapshot
    /// plus the form fields. Requires a signed-in user; never retried, and
    /// the history view converges on its own.
    pub async fn create_booking(
        &self,
        hotel: &Hotel,
        form: &BookingForm,
    ) -> Result<String, BookingError> {
        let user_id = self.auth.current_user().ok_or(BookingError::NotSignedIn)?;

        let mut fields = Map::new();
        fields.insert("userId".to_string(), Value::String(user_id.clone()));
        fields.insert("hotelId".to_string(), Value::String(hotel.id.clone()));
        fields.insert("hotelName".to_string(), Value::String(hotel.name.clone()));
        fields.insert("city".to_string(), Value::String(hotel.city.clone()));
        fields.insert("checkIn".to_string(), Value::String(form.check_in.clone()));
        fields.insert("checkOut".to_string(), Value::String(form.check_out.clone()));
        fields.insert("guests".to_string(), Value::String(form.guests.clone()));
        fields.insert("price".to_string(), Value::String(hotel.price.clone()));
        fields.insert(
            "paymentMethod".to_string(),
            Value::String(form.payment_method.as_str().to_string()),
        );

        let receipt = self.store.append("bookings", fields).await?;
        info!(booking = %receipt.id, user = %user_id, hotel = %hotel.id, "booking created");
        Ok(receipt.id)
    }

    /// Releases the history view. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(subscription) = self.subscription.as_mut() {
            subscription.release();
        }
    }
}
