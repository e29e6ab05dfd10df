//! Instruction tags and the episode states they imply.
//!
//! The most recent [`Advice`] doubles as the episode's program counter:
//!
//! | last advice              | state                |
//! |--------------------------|----------------------|
//! | unset                    | collecting fields    |
//! | `ask_platform_for_dns`   | awaiting platform    |
//! | any other tag            | awaiting resolution  |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

macro_rules! ask_platform {
    () => {
        "Which platform are you on: **Windows**, **macOS**, or **Linux**?"
    };
}

/// Lowercase phrase clients watch for to arm their platform guard
pub const PLATFORM_CUE: &str = "which platform are you on";

/// Asked again when the DNS step has no platform to work with
pub const ASK_PLATFORM: &str = ask_platform!();

/// Question that opens the IP/DNS reset sub-flow
pub const PLATFORM_QUESTION: &str = concat!("We'll reset your IP + DNS. ", ask_platform!());

/// Reply when a platform answer was not understood
pub const PLATFORM_REPROMPT: &str = "Just say **Windows**, **macOS**, or **Linux**.";

/// Every instruction the engine can give
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advice {
    // Reference site loads
    LoadsOneSiteComputerBasic,
    LoadsOneSitePhoneBasic,
    LoadsPauseOthers,
    LoadsSwitchBand,
    LoadsToggleWifi,
    LoadsForgetRejoin,
    LoadsRestartRouter,
    LoadsNoRouter,
    // Reference site does not load
    Portal,
    TierAirplane,
    TierToggleAdapter,
    TierRestartRouter,
    TierForgetRejoinNoRouter,
    TierPhoneResetNetwork,
    // IP/DNS sub-flow
    AskPlatformForDns,
    TierForgetRejoinDns,
}

impl Advice {
    pub const ALL: [Advice; 16] = [
        Advice::LoadsOneSiteComputerBasic,
        Advice::LoadsOneSitePhoneBasic,
        Advice::LoadsPauseOthers,
        Advice::LoadsSwitchBand,
        Advice::LoadsToggleWifi,
        Advice::LoadsForgetRejoin,
        Advice::LoadsRestartRouter,
        Advice::LoadsNoRouter,
        Advice::Portal,
        Advice::TierAirplane,
        Advice::TierToggleAdapter,
        Advice::TierRestartRouter,
        Advice::TierForgetRejoinNoRouter,
        Advice::TierPhoneResetNetwork,
        Advice::AskPlatformForDns,
        Advice::TierForgetRejoinDns,
    ];

    /// Stable wire name of the tag
    pub fn tag(&self) -> &'static str {
        match self {
            Advice::LoadsOneSiteComputerBasic => "loads_one_site_computer_basic",
            Advice::LoadsOneSitePhoneBasic => "loads_one_site_phone_basic",
            Advice::LoadsPauseOthers => "loads_pause_others",
            Advice::LoadsSwitchBand => "loads_switch_band",
            Advice::LoadsToggleWifi => "loads_toggle_wifi",
            Advice::LoadsForgetRejoin => "loads_forget_rejoin",
            Advice::LoadsRestartRouter => "loads_restart_router",
            Advice::LoadsNoRouter => "loads_no_router",
            Advice::Portal => "portal",
            Advice::TierAirplane => "tier_airplane",
            Advice::TierToggleAdapter => "tier_toggle_adapter",
            Advice::TierRestartRouter => "tier_restart_router",
            Advice::TierForgetRejoinNoRouter => "tier_forget_rejoin_no_router",
            Advice::TierPhoneResetNetwork => "tier_phone_reset_network",
            Advice::AskPlatformForDns => "ask_platform_for_dns",
            Advice::TierForgetRejoinDns => "tier_forget_rejoin_dns",
        }
    }

    /// Fixed text spoken for this instruction.
    ///
    /// `None` for the DNS instruction, whose text depends on the platform.
    pub fn utterance(&self) -> Option<&'static str> {
        let text = match self {
            Advice::LoadsOneSiteComputerBasic => {
                "If it's only one app/site, it's usually not the Wi-Fi.\n\
                 Try another browser, and disable your VPN if you have one.\n\
                 Then test again."
            }
            Advice::LoadsOneSitePhoneBasic => {
                "Force close the app and reopen it.\n\
                 Toggle Wi-Fi.\n\
                 Then test again."
            }
            Advice::LoadsPauseOthers => {
                "So the internet works, but it's degraded. If other devices are streaming or \
                 downloading, pause them for a minute, then test again."
            }
            Advice::LoadsSwitchBand => {
                "Random drops usually mean poor Wi-Fi quality. Move closer to the router, and if \
                 you see 2.4G/5G networks, switch bands and test again."
            }
            Advice::LoadsToggleWifi => {
                "If it's consistently slow across everything: disable your VPN if you have one, \
                 then toggle Wi-Fi off and on and test again."
            }
            Advice::LoadsForgetRejoin => {
                "Next: forget the Wi-Fi network, reconnect, then test again."
            }
            Advice::LoadsRestartRouter => {
                "Restart the router or modem: unplug it for 10 seconds, plug it back in, wait \
                 about a minute, then test."
            }
            Advice::LoadsNoRouter => {
                "Since you don't have router access, this is likely upstream congestion or a \
                 network policy. Try another Wi-Fi or a hotspot to confirm."
            }
            Advice::Portal => {
                "That's probably a captive portal. Open the login/terms page, accept it, then \
                 test again."
            }
            Advice::TierAirplane => "Turn airplane mode ON for 5 seconds, then OFF.",
            Advice::TierToggleAdapter => {
                "Turn Wi-Fi off and on. If you can, disable and re-enable the network adapter, \
                 then test again."
            }
            Advice::TierRestartRouter => {
                "Restart the router/modem. Unplug it for 10 seconds, plug it back in, wait about \
                 a minute, then test."
            }
            Advice::TierForgetRejoinNoRouter => {
                "Forget this Wi-Fi network, reconnect, and re-enter the password, then test."
            }
            Advice::TierPhoneResetNetwork => {
                "Try **Reset Network Settings** (this clears saved Wi-Fi + Bluetooth). Then \
                 reconnect to Wi-Fi and test again."
            }
            Advice::AskPlatformForDns => PLATFORM_QUESTION,
            Advice::TierForgetRejoinDns => return None,
        };
        Some(text)
    }

    /// One-line description for status displays
    pub fn summary(&self) -> &'static str {
        match self {
            Advice::LoadsOneSiteComputerBasic => "other browser / VPN off",
            Advice::LoadsOneSitePhoneBasic => "reopen app / toggle Wi-Fi",
            Advice::LoadsPauseOthers => "pause other devices",
            Advice::LoadsSwitchBand => "move closer / switch band",
            Advice::LoadsToggleWifi => "VPN off / toggle Wi-Fi",
            Advice::LoadsForgetRejoin => "forget and rejoin network",
            Advice::LoadsRestartRouter => "restart router",
            Advice::LoadsNoRouter => "try another network",
            Advice::Portal => "captive portal login",
            Advice::TierAirplane => "airplane mode toggle",
            Advice::TierToggleAdapter => "toggle Wi-Fi adapter",
            Advice::TierRestartRouter => "restart router",
            Advice::TierForgetRejoinNoRouter => "forget network, re-enter password",
            Advice::TierPhoneResetNetwork => "reset network settings",
            Advice::AskPlatformForDns => "waiting for platform",
            Advice::TierForgetRejoinDns => "renew IP + flush DNS",
        }
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Advice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Advice::ALL
            .into_iter()
            .find(|advice| advice.tag() == s)
            .ok_or_else(|| Error::invalid_value("last_advice", s))
    }
}

/// Resting state of an episode between turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeState {
    CollectingFields,
    AwaitingResolution,
    AwaitingPlatform,
}

impl EpisodeState {
    pub fn from_last_advice(last_advice: Option<Advice>) -> Self {
        match last_advice {
            None => EpisodeState::CollectingFields,
            Some(Advice::AskPlatformForDns) => EpisodeState::AwaitingPlatform,
            Some(_) => EpisodeState::AwaitingResolution,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EpisodeState::CollectingFields => "collecting-fields",
            EpisodeState::AwaitingResolution => "awaiting-resolution",
            EpisodeState::AwaitingPlatform => "awaiting-platform",
        }
    }
}
