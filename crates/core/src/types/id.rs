//! Newtype IDs for type-safe entity references.

use core::fmt;

use serde::Serialize;
use uuid::Uuid;

/// Identifier of a generated profile.
///
/// Sent to Klaviyo as the profile's `external_id`. Built from caller-supplied
/// random bytes so a seeded run reproduces the same IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProfileId(Uuid);

impl ProfileId {
    /// Create a v4 ID from 16 random bytes.
    #[must_use]
    pub const fn from_random_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
