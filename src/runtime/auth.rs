//! Shared-secret bearer token gate.

use hyper::header::{HeaderMap, AUTHORIZATION};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Why a request was turned away. Logged, never sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("missing Authorization header")]
    Missing,
    #[error("invalid bearer token")]
    Invalid,
}

/// Checks `Authorization: Bearer <token>` when a token is configured.
#[derive(Clone, Default)]
pub struct AccessGate {
    /// Full expected header value, `Bearer <token>`.
    expected: Option<Vec<u8>>,
}

impl AccessGate {
    /// An empty token leaves the gate open.
    pub fn new(token: Option<&str>) -> Self {
        let expected = token
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {}", t).into_bytes());
        Self { expected }
    }

    /// A gate that lets everything through.
    pub fn open() -> Self {
        Self::default()
    }

    /// Whether a token is configured.
    pub fn is_enabled(&self) -> bool {
        self.expected.is_some()
    }

    /// Check a request's headers.
    pub fn check(&self, headers: &HeaderMap) -> Result<(), AccessDenied> {
        let Some(expected) = &self.expected else {
            return Ok(());
        };

        let presented = headers
            .get(AUTHORIZATION)
            .ok_or(AccessDenied::Missing)?
            .as_bytes();

        if bool::from(expected.as_slice().ct_eq(presented)) {
            Ok(())
        } else {
            Err(AccessDenied::Invalid)
        }
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
