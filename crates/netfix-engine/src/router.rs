//! Advice routing: picks the next instruction from the collected facts and the
//! position on the retry ladder.
//!
//! [`route`] takes the episode by value and hands back the updated episode with
//! what to do next, so every branch can be tested without any shared state.

use tracing::debug;

use crate::advice::Advice;
use crate::episode::Episode;
use crate::facts::{DeviceType, Platform, Scope, Slot};
use crate::interpret::{self, Interpretation};

/// What the router decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// An instruction was recorded in `last_advice`; ask whether it worked next
    Advice(Advice),
    /// The IP/DNS sub-flow started; wait for the user's platform
    AskPlatform,
    /// The platform answer was not understood; ask again
    PlatformRetry,
    /// The platform is known; hand off to the DNS dispatcher
    Dispatch(Platform),
    /// A fact needed to pick a branch is unset; ask for it
    Clarify(Slot),
}

/// Run one routing decision. `utterance` is only read in the platform sub-flow.
pub fn route(mut episode: Episode, utterance: &str) -> (Episode, Routed) {
    if episode.last_advice == Some(Advice::AskPlatformForDns) {
        return route_platform_answer(episode, utterance);
    }

    let routed = match episode.facts.loads_example {
        Some(true) => Routed::Advice(loads_branch(&episode)),
        Some(false) => no_load_branch(&episode),
        None => Routed::Clarify(Slot::LoadsExample),
    };

    match routed {
        Routed::Advice(advice) => {
            episode.last_advice = Some(advice);
            episode.resolved = None;
        }
        Routed::AskPlatform => {
            episode.last_advice = Some(Advice::AskPlatformForDns);
            episode.facts.platform = None;
            episode.resolved = None;
            episode.requested = None;
        }
        Routed::Clarify(slot) => {
            episode.last_advice = None;
            episode.requested = Some(slot);
        }
        Routed::PlatformRetry | Routed::Dispatch(_) => {}
    }

    debug!(
        attempt = episode.attempt_count,
        ?routed,
        "Routed advice"
    );
    (episode, routed)
}

fn route_platform_answer(mut episode: Episode, utterance: &str) -> (Episode, Routed) {
    episode.resolved = None;
    match interpret::platform(utterance) {
        Interpretation::Label(platform) => {
            debug!(platform = platform.name(), "Platform detected");
            episode.facts.platform = Some(platform);
            (episode, Routed::Dispatch(platform))
        }
        _ => {
            debug!(utterance, "Platform not recognized");
            episode.facts.platform = None;
            episode.last_advice = Some(Advice::AskPlatformForDns);
            (episode, Routed::PlatformRetry)
        }
    }
}

/// Reference site loads: the connection works but is degraded or app-specific.
fn loads_branch(episode: &Episode) -> Advice {
    let facts = &episode.facts;
    match episode.attempt_count {
        0 => {
            if facts.scope_issue == Some(Scope::One) {
                return if facts.device_type == Some(DeviceType::Computer) {
                    Advice::LoadsOneSiteComputerBasic
                } else {
                    Advice::LoadsOneSitePhoneBasic
                };
            }
            // Anything else is treated as "everything"; other devices take priority.
            if facts.other_devices == Some(true) {
                Advice::LoadsPauseOthers
            } else if facts.random_failures == Some(true) {
                Advice::LoadsSwitchBand
            } else {
                Advice::LoadsToggleWifi
            }
        }
        1 => Advice::LoadsForgetRejoin,
        _ => {
            if facts.can_restart_router == Some(true) {
                Advice::LoadsRestartRouter
            } else {
                Advice::LoadsNoRouter
            }
        }
    }
}

/// Reference site does not load: portal check, then the tier ladder.
fn no_load_branch(episode: &Episode) -> Routed {
    let facts = &episode.facts;
    if facts.sees_login == Some(true) {
        return Routed::Advice(Advice::Portal);
    }

    match episode.attempt_count {
        0 => Routed::Advice(if facts.device_type == Some(DeviceType::Phone) {
            Advice::TierAirplane
        } else {
            Advice::TierToggleAdapter
        }),
        1 => Routed::Advice(if facts.can_restart_router == Some(true) {
            Advice::TierRestartRouter
        } else {
            Advice::TierForgetRejoinNoRouter
        }),
        _ => {
            if facts.device_type == Some(DeviceType::Computer) {
                Routed::AskPlatform
            } else {
                Routed::Advice(Advice::TierPhoneResetNetwork)
            }
        }
    }
}
