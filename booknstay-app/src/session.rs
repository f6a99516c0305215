use std::sync::Arc;

use tracing::{info, warn};

use booknstay_core::auth::{AuthProvider, SignupRequest};
use booknstay_shared::pii::Masked;

/// What the login and signup screens tell the user. The Display text is
/// the toast, verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("Please enter all fields")]
    MissingFields,

    #[error("Please fill all fields")]
    MissingSignupFields,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Login failed: {0}")]
    SignInFailed(String),

    #[error("Signup failed: {0}")]
    SignUpFailed(String),
}

/// What the signup screen collects before anything goes near the provider.
#[derive(Debug, Clone)]
pub struct SignupForm {
    pub full_name: String,
    pub email: String,
    pub password: Masked<String>,
    pub confirm_password: Masked<String>,
}

/// Thin gateway over the injected identity provider: local non-blank
/// checks, trimming, and message shaping. Nothing here retries.
pub struct SessionGateway {
    auth: Arc<dyn AuthProvider>,
}

impl SessionGateway {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self { auth }
    }

    /// Sign in with trimmed credentials. Blank fields never reach the
    /// provider.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<String, GatewayError> {
        let email = email.trim();
        let password = password.trim();
        if email.is_empty() || password.is_empty() {
            return Err(GatewayError::MissingFields);
        }

        match self.auth.sign_in(email, password).await {
            Ok(user_id) => {
                info!(user = %user_id, "login succeeded");
                Ok(user_id)
            }
            Err(error) => {
                warn!(error = %error, "login failed");
                Err(GatewayError::SignInFailed(error.to_string()))
            }
        }
    }

    /// Create an account. All four fields are required and the passwords
    /// must match; only then does the provider get called.
    pub async fn sign_up(&self, form: SignupForm) -> Result<String, GatewayError> {
        let full_name = form.full_name.trim();
        let email = form.email.trim();
        if full_name.is_empty()
            || email.is_empty()
            || form.password.expose().is_empty()
            || form.confirm_password.expose().is_empty()
        {
            return Err(GatewayError::MissingSignupFields);
        }
        if form.password.expose() != form.confirm_password.expose() {
            return Err(GatewayError::PasswordMismatch);
        }

        let request = SignupRequest {
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: form.password,
        };
        match self.auth.sign_up(request).await {
            Ok(user_id) => {
                info!(user = %user_id, "account created");
                Ok(user_id)
            }
            Err(error) => {
                warn!(error = %error, "signup failed");
                Err(GatewayError::SignUpFailed(error.to_string()))
            }
        }
    }

    /// Safe when nobody is signed in.
    pub fn sign_out(&self) {
        self.auth.sign_out();
    }

    pub fn current_user(&self) -> Option<String> {
        self.auth.current_user()
    }
}
