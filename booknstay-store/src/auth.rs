use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use booknstay_core::auth::{AuthError, AuthProvider, SignupRequest};

struct Account {
    user_id: String,
    full_name: String,
    password: String,
}

#[derive(Default)]
struct AuthState {
    /// Accounts keyed by normalized email.
    accounts: HashMap<String, Account>,
    current: Option<String>,
}

/// In-memory identity provider: registered accounts plus the single
/// current-session user id. Signup is fully wired: it creates the account
/// and signs the new user in, the way the hosted provider does.
#[derive(Default)]
pub struct MemoryAuth {
    state: Mutex<AuthState>,
}

fn normalize(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account without signing it in. Seeding for demos and
    /// tests.
    pub fn register(&self, full_name: &str, email: &str, password: &str) -> String {
        let user_id = Uuid::new_v4().to_string();
        self.lock().accounts.insert(
            normalize(email),
            Account {
                user_id: user_id.clone(),
                full_name: full_name.to_string(),
                password: password.to_string(),
            },
        );
        user_id
    }

    /// Display name for a registered user id, if any.
    pub fn display_name(&self, user_id: &str) -> Option<String> {
        self.lock()
            .accounts
            .values()
            .find(|account| account.user_id == user_id)
            .map(|account| account.full_name.clone())
    }

    fn lock(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let mut state = self.lock();
        let key = normalize(email);
        match state.accounts.get(&key) {
            Some(account) if account.password == password => {
                let user_id = account.user_id.clone();
                state.current = Some(user_id.clone());
                info!(user = %user_id, "sign-in succeeded");
                Ok(user_id)
            }
            _ => {
                warn!(email = %key, "sign-in rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    async fn sign_up(&self, request: SignupRequest) -> Result<String, AuthError> {
        let mut state = self.lock();
        let key = normalize(&request.email);
        if state.accounts.contains_key(&key) {
            warn!(email = %key, "signup rejected, account exists");
            return Err(AuthError::AccountExists(request.email));
        }

        let user_id = Uuid::new_v4().to_string();
        state.accounts.insert(
            key,
            Account {
                user_id: user_id.clone(),
                full_name: request.full_name,
                password: request.password.into_inner(),
            },
        );
        state.current = Some(user_id.clone());
        info!(user = %user_id, "account created");
        Ok(user_id)
    }

    fn sign_out(&self) {
        let mut state = self.lock();
        if state.current.take().is_some() {
            info!("signed out");
        }
    }

    fn current_user(&self) -> Option<String> {
        self.lock().current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booknstay_shared::pii::Masked;

    fn signup(email: &str) -> SignupRequest {
        SignupRequest {
            full_name: "Ada Guest".to_string(),
            email: email.to_string(),
            password: Masked::new("hunter2".to_string()),
        }
    }

    #[tokio::test]
    async fn sign_up_then_sign_in_round_trip() {
        let auth = MemoryAuth::new();
        let created = auth.sign_up(signup("Ada@Example.com")).await.expect("sign up");
        assert_eq!(auth.current_user(), Some(created.clone()));

        auth.sign_out();
        assert_eq!(auth.current_user(), None);

        // Email matching is case- and whitespace-insensitive.
        let signed_in = auth
            .sign_in(" ada@example.com ", "hunter2")
            .await
            .expect("sign in");
        assert_eq!(signed_in, created);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let auth = MemoryAuth::new();
        auth.sign_up(signup("ada@example.com")).await.expect("sign up");
        let err = auth.sign_up(signup("ADA@example.com")).await.expect_err("dup");
        assert!(matches!(err, AuthError::AccountExists(_)));
    }

    #[tokio::test]
    async fn wrong_password_fails_and_leaves_session_empty() {
        let auth = MemoryAuth::new();
        auth.register("Ada Guest", "ada@example.com", "hunter2");

        let err = auth
            .sign_in("ada@example.com", "wrong")
            .await
            .expect_err("bad password");
        assert_eq!(err, AuthError::InvalidCredentials);
        assert_eq!(auth.current_user(), None);
    }

    #[tokio::test]
    async fn sign_out_when_signed_out_is_harmless() {
        let auth = MemoryAuth::new();
        auth.sign_out();
        assert_eq!(auth.current_user(), None);
    }
}
