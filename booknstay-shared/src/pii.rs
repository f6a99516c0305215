use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wrapper for credentials that masks the value in Debug and Display output.
/// Sign-in and signup requests carry their password in this, so a
/// `tracing::debug!("{:?}", request)` can never leak it.
#[derive(Clone, Deserialize)]
pub struct Masked<T>(T);

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Masked(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }

    /// The real value, for handing to the identity provider.
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> From<T> for Masked<T> {
    fn from(value: T) -> Self {
        Masked(value)
    }
}

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Masking is for log formatting only; serialization keeps the real
        // value so a wire request still carries the credential.
        self.0.serialize(serializer)
    }
}
