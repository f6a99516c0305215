use async_trait::async_trait;
use serde::Serialize;

use booknstay_shared::pii::Masked;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account already exists for {0}")]
    AccountExists(String),

    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// New-account request, assembled by the signup screen after its local
/// checks passed. The password stays masked in logs.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub password: Masked<String>,
}

/// The identity-provider capability. Returns opaque user-id strings; the
/// session itself lives inside the provider and this system only observes
/// it. No call here is retried on failure.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<String, AuthError>;

    async fn sign_up(&self, request: SignupRequest) -> Result<String, AuthError>;

    fn sign_out(&self);

    fn current_user(&self) -> Option<String>;
}
