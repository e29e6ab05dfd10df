//! Dialogue event types

use serde::{Deserialize, Serialize};

use crate::advice::{Advice, EpisodeState};
use crate::facts::{Platform, Slot};
use crate::resolution::EscalationReason;

/// Events emitted while a turn is processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogueEvent {
    /// A turn started
    TurnStart { state: EpisodeState },

    /// A form field was filled
    FieldAccepted { slot: Slot },

    /// An answer did not fit the field and was discarded
    FieldRejected { slot: Slot },

    /// A form field was asked for
    FieldPrompted { slot: Slot },

    /// An instruction was given
    AdviceGiven { advice: Advice, attempt: u32 },

    /// The IP/DNS sub-flow asked for the platform
    PlatformRequested,

    /// The platform answer was understood
    PlatformDetected { platform: Platform },

    /// The last instruction did not help; the ladder moved up
    AttemptFailed { attempt: u32 },

    /// The captive-portal guess was ruled out
    PortalRejected,

    /// The problem is fixed
    Resolved,

    /// The episode ended without a fix
    Escalated { reason: EscalationReason },

    /// All slots were cleared on request
    Reset,

    /// A turn completed
    TurnEnd { state: EpisodeState },
}

impl DialogueEvent {
    /// Check if this event ends an episode
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DialogueEvent::Resolved | DialogueEvent::Escalated { .. }
        )
    }
}
