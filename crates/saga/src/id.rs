use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one saga run in the emitted event stream.
///
/// Generated when the saga is constructed; hosts use it to correlate the
/// events of a run across concurrent sagas. Serializes as a bare UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SagaId(Uuid);

impl SagaId {
    /// Generates a fresh run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SagaId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SagaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
