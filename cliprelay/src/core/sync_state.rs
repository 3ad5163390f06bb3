//! Last observed repository revision.

/// Tracks the revision seen after the most recent pull, so that changes
/// pushed by the other side of the exchange can be detected and logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState {
    last_revision: String,
}

impl SyncState {
    pub fn new(initial_revision: impl Into<String>) -> Self {
        Self {
            last_revision: initial_revision.into(),
        }
    }

    pub fn last_revision(&self) -> &str {
        &self.last_revision
    }

    /// Record `revision` if it differs from the stored one.
    ///
    /// Returns `true` when the stored revision changed.
    pub fn observe(&mut self, revision: &str) -> bool {
        if revision == self.last_revision {
            return false;
        }
        self.last_revision = revision.to_string();
        true
    }
}
