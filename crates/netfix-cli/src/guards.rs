//! Client-side answer guards for speech front ends.
//!
//! When the bot has just asked a yes/no or platform question, free speech is
//! mapped to an explicit intent before it is sent, so a mis-heard word never
//! reaches the engine as a field answer.

use netfix_engine::advice::PLATFORM_CUE;
use netfix_engine::interpret::{self, Interpretation};
use tracing::debug;

pub const YES_NO_HINT: &str = "Just say yes or no.";
pub const PLATFORM_HINT: &str = "Just say Windows, macOS, or Linux.";

/// What to do with one line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardAction {
    /// Send this message to the engine
    Send(String),
    /// Answer locally without contacting the engine
    Reply(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientGuards {
    pub awaiting_yes_no: bool,
    pub awaiting_platform: bool,
}

impl ClientGuards {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preprocess(&mut self, text: &str) -> GuardAction {
        if self.awaiting_yes_no {
            return match interpret::yes_no(text) {
                Interpretation::Label(yes) => {
                    self.awaiting_yes_no = false;
                    let intent = if yes { "/affirm" } else { "/deny" };
                    debug!(intent, "Yes/no guard matched");
                    GuardAction::Send(intent.to_string())
                }
                _ => GuardAction::Reply(YES_NO_HINT),
            };
        }

        if self.awaiting_platform {
            return match interpret::platform(text) {
                Interpretation::Label(platform) => {
                    self.awaiting_platform = false;
                    GuardAction::Send(format!("/platform_{}", platform.name()))
                }
                _ => GuardAction::Reply(PLATFORM_HINT),
            };
        }

        GuardAction::Send(text.to_string())
    }

    /// Arm guards from what the bot just said
    pub fn observe(&mut self, bot_text: &str) {
        let lower = bot_text.to_lowercase();
        if lower.contains(PLATFORM_CUE) {
            self.awaiting_platform = true;
        }
        if lower.contains("did that fix it") || lower.contains("did that help") {
            self.awaiting_yes_no = true;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
