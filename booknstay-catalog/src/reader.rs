use tracing::{debug, warn};

use booknstay_core::store::{DocumentStore, Query, SortDirection, StoreError, Subscription};
use booknstay_shared::models::Hotel;

/// How many popular stays the home screen shows.
pub const POPULAR_PAGE_SIZE: usize = 10;

/// One catalog change, already decoded for display.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    /// Fresh snapshot of the popular-hotels list. Documents without a name
    /// were dropped; missing optional fields default to empty text.
    Updated(Vec<Hotel>),
    /// The subscription reported an error. The previously delivered list
    /// stays valid; the screen only stops showing its loading state.
    Failed(StoreError),
}

/// Live view over the top-rated hotels. Opens exactly one subscription and
/// keeps it for the owning screen's lifetime; the screen releases it on
/// teardown.
pub struct CatalogReader {
    subscription: Subscription,
}

impl CatalogReader {
    pub async fn open(store: &dyn DocumentStore) -> Result<Self, StoreError> {
        Self::open_with_page_size(store, POPULAR_PAGE_SIZE).await
    }

    pub async fn open_with_page_size(
        store: &dyn DocumentStore,
        page_size: usize,
    ) -> Result<Self, StoreError> {
        let query = Query::collection("hotels")
            .order_by("rating", SortDirection::Descending)
            .limit(page_size);
        let subscription = store.subscribe(query).await?;
        debug!(page_size, "popular-hotels view opened");
        Ok(Self { subscription })
    }

    /// Awaits the next catalog change. None once the view has been released
    /// or the backend has gone away.
    pub async fn next_event(&mut self) -> Option<CatalogEvent> {
        match self.subscription.recv().await? {
            Ok(snapshot) => {
                let hotels: Vec<Hotel> = snapshot.iter().filter_map(Hotel::from_document).collect();
                debug!(count = hotels.len(), "catalog snapshot");
                Some(CatalogEvent::Updated(hotels))
            }
            Err(error) => {
                warn!(error = %error, "catalog subscription error");
                Some(CatalogEvent::Failed(error))
            }
        }
    }

    /// Releases the live view. Safe to call more than once.
    pub fn release(&mut self) {
        self.subscription.release();
    }

    pub fn is_released(&self) -> bool {
        self.subscription.is_released()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booknstay_core::store::DocumentStore;
    use booknstay_store::MemoryBackend;
    use serde_json::{json, Map, Value};

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[tokio::test]
    async fn nameless_documents_are_dropped_from_the_view() {
        let backend = MemoryBackend::new();
        backend
            .append(
                "hotels",
                fields(json!({ "name": "City Hotel", "city": "London", "price": "£100", "rating": 4.5 })),
            )
            .await
            .expect("append");
        backend
            .append("hotels", fields(json!({ "city": "Paris", "rating": 4.9 })))
            .await
            .expect("append");

        let mut reader = CatalogReader::open(&backend).await.expect("open");
        let event = reader.next_event().await.expect("initial");

        match event {
            CatalogEvent::Updated(hotels) => {
                assert_eq!(hotels.len(), 1);
                assert_eq!(hotels[0].name, "City Hotel");
                assert_eq!(hotels[0].city, "London");
                assert_eq!(hotels[0].price, "£100");
                assert_eq!(hotels[0].location, "");
            }
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn view_is_capped_at_the_page_size_by_rating() {
        let backend = MemoryBackend::new();
        for i in 0..4 {
            backend
                .append(
                    "hotels",
                    fields(json!({ "name": format!("Hotel {}", i), "rating": i as f64 })),
                )
                .await
                .expect("append");
        }

        let mut reader = CatalogReader::open_with_page_size(&backend, 2)
            .await
            .expect("open");
        match reader.next_event().await.expect("initial") {
            CatalogEvent::Updated(hotels) => {
                let names: Vec<_> = hotels.iter().map(|h| h.name.as_str()).collect();
                assert_eq!(names, vec!["Hotel 3", "Hotel 2"]);
            }
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn subscription_errors_surface_as_failed_events() {
        let backend = MemoryBackend::new();
        let mut reader = CatalogReader::open(&backend).await.expect("open");
        let _ = reader.next_event().await.expect("initial");

        backend
            .emit_error("hotels", StoreError::SubscriptionLost("offline".to_string()))
            .await;

        assert_eq!(
            reader.next_event().await,
            Some(CatalogEvent::Failed(StoreError::SubscriptionLost(
                "offline".to_string()
            )))
        );
    }

    #[tokio::test]
    async fn release_ends_the_event_stream() {
        let backend = MemoryBackend::new();
        let mut reader = CatalogReader::open(&backend).await.expect("open");

        reader.release();
        reader.release();
        assert!(reader.is_released());
        assert!(reader.next_event().await.is_none());
    }
}
