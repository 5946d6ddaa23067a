//! Opaque gateway session identifiers.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

/// Random bytes per identifier (256 bits).
const ID_BYTES: usize = 32;

/// Length of the base64url encoding of [`ID_BYTES`] without padding.
const ID_LENGTH: usize = 43;

/// Characters of an identifier that may appear in logs.
const LOG_PREFIX_LENGTH: usize = 8;

/// A gateway session identifier handed to clients.
///
/// Unguessable and unrelated to the remote ERP token. `Debug` shows
/// only a short prefix so identifiers do not leak through log fields.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh identifier from the OS random source.
    pub fn generate() -> Self {
        let mut bytes = [0u8; ID_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Parses a client-supplied identifier. Anything that could not have
    /// been produced by [`SessionId::generate`] is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let well_formed = raw.len() == ID_LENGTH
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        well_formed.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix safe to put in log lines.
    pub fn short(&self) -> &str {
        &self.0[..LOG_PREFIX_LENGTH]
    }
}

impl std::fmt::Debug for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionId({}..)", self.short())
    }
}
