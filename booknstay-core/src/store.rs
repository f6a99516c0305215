use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use booknstay_shared::document::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Collection unavailable: {0}")]
    Unavailable(String),

    #[error("Write rejected: {0}")]
    WriteRejected(String),

    #[error("Subscription lost: {0}")]
    SubscriptionLost(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Equality filter on one string field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub equals: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// A live query against one collection: optional equality filter, optional
/// sort, optional page limit. The two queries this application issues are
/// `hotels order by rating desc limit N` and
/// `bookings where userId == .. order by createdAt desc`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Query {
    pub collection: String,
    pub filter: Option<FieldFilter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filter: None,
            order_by: None,
            limit: None,
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, equals: impl Into<String>) -> Self {
        self.filter = Some(FieldFilter {
            field: field.into(),
            equals: equals.into(),
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// What a subscription delivers: the current full match set, or the error
/// that interrupted it. Errors do not close the subscription.
pub type SnapshotResult = Result<Snapshot, StoreError>;

/// Handle to one live query. Holds the delivery channel; `release` detaches
/// it from the backend. A subscription that is never released keeps
/// consuming backend resources for as long as the handle lives, so screens
/// release theirs on teardown.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<SnapshotResult>,
    released: bool,
}

impl Subscription {
    pub fn new(id: u64, rx: mpsc::UnboundedReceiver<SnapshotResult>) -> Self {
        Self {
            id,
            rx,
            released: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Awaits the next delivery. None once the subscription has been
    /// released or the backend has gone away.
    pub async fn recv(&mut self) -> Option<SnapshotResult> {
        if self.released {
            return None;
        }
        self.rx.recv().await
    }

    /// Detaches this subscription. Releasing an already-released
    /// subscription is a no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.rx.close();
        self.released = true;
        tracing::debug!(subscription = self.id, "subscription released");
    }
}

/// Receipt for one committed append.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppendReceipt {
    /// Backend-assigned document id.
    pub id: String,
    /// Server-assigned commit time, strictly monotonic per store.
    pub created_at: DateTime<Utc>,
}

/// The document-database capability this application is written against.
/// The hosted SDK and the in-memory test backend both live behind this.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Opens one live subscription. The first delivery is the current match
    /// set; every commit touching the collection triggers another. Delivery
    /// is in order per subscription; nothing is guaranteed across two
    /// subscriptions or between a write completion and the next delivery.
    async fn subscribe(&self, query: Query) -> Result<Subscription, StoreError>;

    /// Commits one new document with a backend-assigned id and a server
    /// `createdAt` timestamp. At-most-once: callers never retry.
    async fn append(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<AppendReceipt, StoreError>;
}
