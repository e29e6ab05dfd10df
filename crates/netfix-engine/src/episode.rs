//! The per-conversation episode value that every engine step threads through.

use serde::{Deserialize, Serialize};

use crate::advice::{Advice, EpisodeState};
use crate::error::{Error, Result};
use crate::facts::{DeviceType, Facts, Platform, Scope, Slot, SlotValue};

/// One troubleshooting episode: collected facts plus the retry ladder position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Episode {
    pub facts: Facts,
    /// Advice given so far on the current failure path
    pub attempt_count: u32,
    /// Most recent instruction; drives where the next turn is routed
    pub last_advice: Option<Advice>,
    /// Answer to "did that fix it?"
    pub resolved: Option<bool>,
    /// Field most recently prompted while the form is active
    pub requested: Option<Slot>,
}

impl Episode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EpisodeState {
        EpisodeState::from_last_advice(self.last_advice)
    }

    /// Whether nothing has been collected or asked yet
    pub fn is_pristine(&self) -> bool {
        *self == Self::default()
    }

    /// Clear every slot and return to field collection.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Read a slot by name with tri-state semantics.
    pub fn get_slot(&self, slot: Slot) -> SlotValue {
        let f = &self.facts;
        match slot {
            Slot::DeviceType => text_or_unset(f.device_type.map(|d| d.name())),
            Slot::LoadsExample => f.loads_example.into(),
            Slot::ScopeIssue => text_or_unset(f.scope_issue.map(|s| s.name())),
            Slot::RandomFailures => f.random_failures.into(),
            Slot::OtherDevices => f.other_devices.into(),
            Slot::SeesLogin => f.sees_login.into(),
            Slot::CanRestartRouter => f.can_restart_router.into(),
            Slot::Platform => text_or_unset(f.platform.map(|p| p.name())),
            Slot::AttemptCount => SlotValue::Count(self.attempt_count),
            Slot::LastAdvice => text_or_unset(self.last_advice.map(|a| a.tag())),
            Slot::Resolved => self.resolved.into(),
        }
    }

    /// Write a slot by name. The value must match the slot's type; `Unset` clears it.
    pub fn set_slot(&mut self, slot: Slot, value: SlotValue) -> Result<()> {
        let mismatch = || Error::invalid_value(slot.name(), value.to_string());

        if slot.is_flag() {
            let flag = match &value {
                SlotValue::Unset => None,
                SlotValue::Bool(b) => Some(*b),
                _ => return Err(mismatch()),
            };
            match self.facts.flag_mut(slot) {
                Some(target) => *target = flag,
                None => self.resolved = flag,
            }
            return Ok(());
        }

        match (slot, &value) {
            (Slot::AttemptCount, SlotValue::Count(n)) => self.attempt_count = *n,
            (Slot::AttemptCount, SlotValue::Unset) => self.attempt_count = 0,
            (_, SlotValue::Unset) => match slot {
                Slot::DeviceType => self.facts.device_type = None,
                Slot::ScopeIssue => self.facts.scope_issue = None,
                Slot::Platform => self.facts.platform = None,
                Slot::LastAdvice => self.last_advice = None,
                _ => return Err(mismatch()),
            },
            (Slot::DeviceType, SlotValue::Text(s)) => {
                self.facts.device_type = Some(match s.as_str() {
                    "phone" => DeviceType::Phone,
                    "computer" => DeviceType::Computer,
                    _ => return Err(mismatch()),
                });
            }
            (Slot::ScopeIssue, SlotValue::Text(s)) => {
                self.facts.scope_issue = Some(match s.as_str() {
                    "everything" => Scope::Everything,
                    "one" => Scope::One,
                    _ => return Err(mismatch()),
                });
            }
            (Slot::Platform, SlotValue::Text(s)) => {
                self.facts.platform = Some(s.parse::<Platform>()?);
            }
            (Slot::LastAdvice, SlotValue::Text(s)) => {
                self.last_advice = Some(s.parse::<Advice>()?);
            }
            _ => return Err(mismatch()),
        }
        Ok(())
    }
}

fn text_or_unset(value: Option<&str>) -> SlotValue {
    value.map(SlotValue::text).unwrap_or(SlotValue::Unset)
}
