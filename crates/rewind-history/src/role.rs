//! Network role of an entity on this peer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who owns the truth about an entity's movement, from this peer's view.
///
/// History recorded under one role is not directly comparable with history
/// recorded under another; go through the rewind query rather than reading
/// raw samples across a role change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetRole {
    /// Driven by local input with client-side prediction.
    LocallyControlled,
    /// This peer is the source of truth (the server).
    ServerAuthoritative,
    /// Reconstructed from periodic authoritative snapshots plus forward
    /// prediction.
    RemotelySimulated,
}

impl NetRole {
    /// Only remotely simulated entities take authoritative position updates.
    pub fn accepts_authoritative_updates(self) -> bool {
        matches!(self, Self::RemotelySimulated)
    }

    /// The history is produced by this peer's own movement simulation.
    pub fn is_local_authority(self) -> bool {
        !self.accepts_authoritative_updates()
    }

    /// The history is ground truth for hit validation.
    pub fn history_is_ground_truth(self) -> bool {
        matches!(self, Self::ServerAuthoritative)
    }
}

impl fmt::Display for NetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LocallyControlled => "locally-controlled",
            Self::ServerAuthoritative => "server-authoritative",
            Self::RemotelySimulated => "remotely-simulated",
        };
        f.write_str(name)
    }
}
