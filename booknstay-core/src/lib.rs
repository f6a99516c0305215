pub mod auth;
pub mod store;

pub use auth::{AuthError, AuthProvider, SignupRequest};
pub use store::{
    AppendReceipt, DocumentStore, FieldFilter, OrderBy, Query, SnapshotResult, SortDirection,
    StoreError, Subscription,
};
