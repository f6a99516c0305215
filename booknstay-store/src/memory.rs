use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

use booknstay_core::store::{
    AppendReceipt, DocumentStore, Query, SnapshotResult, SortDirection, StoreError, Subscription,
};
use booknstay_shared::document::{Document, Snapshot};

struct Subscriber {
    id: u64,
    query: Query,
    tx: mpsc::UnboundedSender<SnapshotResult>,
}

struct Inner {
    collections: HashMap<String, Vec<Document>>,
    subscribers: Vec<Subscriber>,
    /// Last `createdAt` handed out, in epoch milliseconds. Commit stamps
    /// are strictly increasing even when the wall clock is not.
    last_commit_millis: i64,
}

/// In-memory document backend with live query re-evaluation. Stands in for
/// the hosted document database in tests and the demo binary; the wire
/// contract (server timestamps, ordering, wholesale snapshots) matches what
/// the application expects from the real one.
pub struct MemoryBackend {
    inner: RwLock<Inner>,
    next_subscription_id: AtomicU64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                collections: HashMap::new(),
                subscribers: Vec::new(),
                last_commit_millis: 0,
            }),
            next_subscription_id: AtomicU64::new(1),
        }
    }

    /// Pushes a subscription error to every live subscriber on
    /// `collection`. Fault injection for exercising the degraded paths;
    /// the subscriptions stay open afterwards.
    pub async fn emit_error(&self, collection: &str, error: StoreError) {
        let mut inner = self.inner.write().await;
        inner.subscribers.retain(|sub| {
            if sub.query.collection != collection {
                return true;
            }
            sub.tx.send(Err(error.clone())).is_ok()
        });
    }

    /// Number of subscriptions still attached. Released handles are pruned
    /// here before counting.
    pub async fn live_subscriptions(&self) -> usize {
        let mut inner = self.inner.write().await;
        inner.subscribers.retain(|sub| !sub.tx.is_closed());
        inner.subscribers.len()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn subscribe(&self, query: Query) -> Result<Subscription, StoreError> {
        let id = self.next_subscription_id.fetch_add(1, AtomicOrdering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        let mut inner = self.inner.write().await;
        let initial = evaluate(&inner.collections, &query);
        // The opening snapshot cannot fail to deliver: the receiver is
        // still in scope right here.
        let _ = tx.send(Ok(initial));
        inner.subscribers.push(Subscriber { id, query, tx });

        debug!(subscription = id, "subscription opened");
        Ok(Subscription::new(id, rx))
    }

    async fn append(
        &self,
        collection: &str,
        mut fields: Map<String, Value>,
    ) -> Result<AppendReceipt, StoreError> {
        if collection.is_empty() {
            return Err(StoreError::WriteRejected(
                "collection name is empty".to_string(),
            ));
        }

        let mut inner = self.inner.write().await;

        let mut millis = Utc::now().timestamp_millis();
        if millis <= inner.last_commit_millis {
            millis = inner.last_commit_millis + 1;
        }
        inner.last_commit_millis = millis;
        let created_at = DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| StoreError::WriteRejected("commit clock out of range".to_string()))?;

        // The server owns createdAt; a client-supplied value is overwritten.
        fields.insert("createdAt".to_string(), Value::from(millis));

        let id = Uuid::new_v4().to_string();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id.clone(), fields));

        publish(&mut inner, collection);
        debug!(collection, document = %id, "document appended");

        Ok(AppendReceipt { id, created_at })
    }
}

/// Re-evaluates and delivers the match set to every subscriber on the
/// touched collection, pruning subscribers whose handles have gone away.
fn publish(inner: &mut Inner, collection: &str) {
    let Inner {
        collections,
        subscribers,
        ..
    } = inner;
    subscribers.retain(|sub| {
        if sub.query.collection != collection {
            return true;
        }
        let snapshot = evaluate(collections, &sub.query);
        match sub.tx.send(Ok(snapshot)) {
            Ok(()) => true,
            Err(_) => {
                debug!(subscription = sub.id, "pruning detached subscriber");
                false
            }
        }
    });
}

fn evaluate(collections: &HashMap<String, Vec<Document>>, query: &Query) -> Snapshot {
    let mut docs: Snapshot = collections.get(&query.collection).cloned().unwrap_or_default();

    if let Some(filter) = &query.filter {
        docs.retain(|doc| doc.get_str(&filter.field) == Some(filter.equals.as_str()));
    }

    if let Some(order) = &query.order_by {
        docs.sort_by(|a, b| compare_by_field(a, b, &order.field, &order.direction));
    }

    if let Some(limit) = query.limit {
        docs.truncate(limit);
    }

    docs
}

/// Sort key for one document field. Numbers order before strings; other
/// value types are treated as missing.
#[derive(PartialEq, PartialOrd)]
enum FieldKey {
    Number(f64),
    Text(String),
}

fn field_key(doc: &Document, field: &str) -> Option<FieldKey> {
    match doc.fields.get(field)? {
        Value::Number(n) => n.as_f64().map(FieldKey::Number),
        Value::String(s) => Some(FieldKey::Text(s.clone())),
        _ => None,
    }
}

fn compare_by_field(a: &Document, b: &Document, field: &str, direction: &SortDirection) -> Ordering {
    let ordering = match (field_key(a, field), field_key(b, field)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        // Documents missing the sort field go last either direction.
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    fn hotel(name: &str, rating: f64) -> Map<String, Value> {
        fields(json!({ "name": name, "rating": rating }))
    }

    #[tokio::test]
    async fn subscription_gets_initial_snapshot_then_updates() {
        let backend = MemoryBackend::new();
        backend
            .append("hotels", hotel("City Hotel", 4.5))
            .await
            .expect("append");

        let mut sub = backend
            .subscribe(Query::collection("hotels"))
            .await
            .expect("subscribe");

        let first = sub.recv().await.expect("initial").expect("snapshot");
        assert_eq!(first.len(), 1);

        backend
            .append("hotels", hotel("Harbor Inn", 4.1))
            .await
            .expect("append");

        let second = sub.recv().await.expect("update").expect("snapshot");
        assert_eq!(second.len(), 2);
    }

    #[tokio::test]
    async fn ordering_limit_and_filter_follow_the_query() {
        let backend = MemoryBackend::new();
        backend.append("hotels", hotel("Low", 2.0)).await.expect("append");
        backend.append("hotels", hotel("High", 4.9)).await.expect("append");
        backend.append("hotels", hotel("Mid", 3.5)).await.expect("append");
        backend
            .append("hotels", fields(json!({ "name": "Unrated" })))
            .await
            .expect("append");

        let mut sub = backend
            .subscribe(
                Query::collection("hotels")
                    .order_by("rating", SortDirection::Descending)
                    .limit(3),
            )
            .await
            .expect("subscribe");

        let snapshot = sub.recv().await.expect("initial").expect("snapshot");
        let names: Vec<_> = snapshot
            .iter()
            .map(|d| d.str_or_empty("name"))
            .collect();
        assert_eq!(names, vec!["High", "Mid", "Low"]);

        let mut filtered = backend
            .subscribe(Query::collection("hotels").where_eq("name", "Mid"))
            .await
            .expect("subscribe");
        let snapshot = filtered.recv().await.expect("initial").expect("snapshot");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].str_or_empty("name"), "Mid");
    }

    #[tokio::test]
    async fn missing_sort_field_goes_last() {
        let backend = MemoryBackend::new();
        backend
            .append("hotels", fields(json!({ "name": "Unrated" })))
            .await
            .expect("append");
        backend.append("hotels", hotel("Rated", 1.0)).await.expect("append");

        let mut sub = backend
            .subscribe(
                Query::collection("hotels").order_by("rating", SortDirection::Descending),
            )
            .await
            .expect("subscribe");

        let snapshot = sub.recv().await.expect("initial").expect("snapshot");
        assert_eq!(snapshot[0].str_or_empty("name"), "Rated");
        assert_eq!(snapshot[1].str_or_empty("name"), "Unrated");
    }

    #[tokio::test]
    async fn created_at_is_strictly_monotonic() {
        let backend = MemoryBackend::new();
        let mut previous = None;
        for _ in 0..50 {
            let receipt = backend
                .append("bookings", fields(json!({ "userId": "u-1" })))
                .await
                .expect("append");
            if let Some(last) = previous {
                assert!(receipt.created_at > last, "commit stamps must increase");
            }
            previous = Some(receipt.created_at);
        }
    }

    #[tokio::test]
    async fn server_overwrites_client_created_at() {
        let backend = MemoryBackend::new();
        backend
            .append("bookings", fields(json!({ "createdAt": 1 })))
            .await
            .expect("append");

        let mut sub = backend
            .subscribe(Query::collection("bookings"))
            .await
            .expect("subscribe");
        let snapshot = sub.recv().await.expect("initial").expect("snapshot");
        let stamped = snapshot[0].get_i64("createdAt").expect("stamped");
        assert!(stamped > 1, "server stamp replaces the client value");
    }

    #[tokio::test]
    async fn released_subscribers_are_pruned() {
        let backend = MemoryBackend::new();
        let mut sub = backend
            .subscribe(Query::collection("hotels"))
            .await
            .expect("subscribe");
        assert_eq!(backend.live_subscriptions().await, 1);

        sub.release();
        sub.release();
        assert_eq!(backend.live_subscriptions().await, 0);

        // Appending after release must not deliver anything.
        backend.append("hotels", hotel("Late", 1.0)).await.expect("append");
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn emitted_errors_reach_subscribers_without_closing_them() {
        let backend = MemoryBackend::new();
        let mut sub = backend
            .subscribe(Query::collection("hotels"))
            .await
            .expect("subscribe");
        let _ = sub.recv().await.expect("initial");

        backend
            .emit_error("hotels", StoreError::SubscriptionLost("backend hiccup".to_string()))
            .await;

        assert_eq!(
            sub.recv().await,
            Some(Err(StoreError::SubscriptionLost(
                "backend hiccup".to_string()
            )))
        );

        // Still live: the next commit is delivered normally.
        backend.append("hotels", hotel("After", 3.0)).await.expect("append");
        let snapshot = sub.recv().await.expect("update").expect("snapshot");
        assert_eq!(snapshot.len(), 1);
    }
}
