//! User-reported facts about the broken connection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The kind of device the user is troubleshooting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Phone,
    Computer,
}

impl DeviceType {
    pub fn name(&self) -> &'static str {
        match self {
            DeviceType::Phone => "phone",
            DeviceType::Computer => "computer",
        }
    }
}

/// How much of the internet is affected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Everything,
    One,
}

impl Scope {
    pub fn name(&self) -> &'static str {
        match self {
            Scope::Everything => "everything",
            Scope::One => "one",
        }
    }
}

/// Operating system, only asked for in the IP/DNS reset sub-flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Windows,
    Macos,
    Linux,
}

impl Platform {
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Macos => "macos",
            Platform::Linux => "linux",
        }
    }

    /// Name as shown to the user
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Macos => "macOS",
            Platform::Linux => "Linux",
        }
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "windows" => Ok(Platform::Windows),
            "macos" => Ok(Platform::Macos),
            "linux" => Ok(Platform::Linux),
            other => Err(Error::invalid_value("platform", other)),
        }
    }
}

/// Every fact the form can collect. `None` means unset, which is distinct from `Some(false)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Facts {
    pub device_type: Option<DeviceType>,
    pub loads_example: Option<bool>,
    pub scope_issue: Option<Scope>,
    pub random_failures: Option<bool>,
    pub other_devices: Option<bool>,
    pub sees_login: Option<bool>,
    pub can_restart_router: Option<bool>,
    pub platform: Option<Platform>,
}

impl Facts {
    /// Whether a form slot currently holds a value
    pub fn is_set(&self, slot: Slot) -> bool {
        match slot {
            Slot::DeviceType => self.device_type.is_some(),
            Slot::LoadsExample => self.loads_example.is_some(),
            Slot::ScopeIssue => self.scope_issue.is_some(),
            Slot::RandomFailures => self.random_failures.is_some(),
            Slot::OtherDevices => self.other_devices.is_some(),
            Slot::SeesLogin => self.sees_login.is_some(),
            Slot::CanRestartRouter => self.can_restart_router.is_some(),
            Slot::Platform => self.platform.is_some(),
            Slot::AttemptCount | Slot::LastAdvice | Slot::Resolved => false,
        }
    }

    /// Mutable access to a yes/no fact, `None` for non-boolean slots
    pub fn flag_mut(&mut self, slot: Slot) -> Option<&mut Option<bool>> {
        match slot {
            Slot::LoadsExample => Some(&mut self.loads_example),
            Slot::RandomFailures => Some(&mut self.random_failures),
            Slot::OtherDevices => Some(&mut self.other_devices),
            Slot::SeesLogin => Some(&mut self.sees_login),
            Slot::CanRestartRouter => Some(&mut self.can_restart_router),
            _ => None,
        }
    }
}

/// Names of every persisted slot of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    DeviceType,
    LoadsExample,
    ScopeIssue,
    RandomFailures,
    OtherDevices,
    SeesLogin,
    CanRestartRouter,
    Platform,
    AttemptCount,
    LastAdvice,
    Resolved,
}

impl Slot {
    pub const ALL: [Slot; 11] = [
        Slot::DeviceType,
        Slot::LoadsExample,
        Slot::ScopeIssue,
        Slot::RandomFailures,
        Slot::OtherDevices,
        Slot::SeesLogin,
        Slot::CanRestartRouter,
        Slot::Platform,
        Slot::AttemptCount,
        Slot::LastAdvice,
        Slot::Resolved,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Slot::DeviceType => "device_type",
            Slot::LoadsExample => "loads_example",
            Slot::ScopeIssue => "scope_issue",
            Slot::RandomFailures => "random_failures",
            Slot::OtherDevices => "other_devices",
            Slot::SeesLogin => "sees_login",
            Slot::CanRestartRouter => "can_restart_router",
            Slot::Platform => "platform",
            Slot::AttemptCount => "attempt_count",
            Slot::LastAdvice => "last_advice",
            Slot::Resolved => "resolved",
        }
    }

    /// Whether the slot holds a tri-state yes/no value
    pub fn is_flag(&self) -> bool {
        matches!(
            self,
            Slot::LoadsExample
                | Slot::RandomFailures
                | Slot::OtherDevices
                | Slot::SeesLogin
                | Slot::CanRestartRouter
                | Slot::Resolved
        )
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Slot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.name() == s)
            .ok_or_else(|| Error::UnknownSlot(s.to_string()))
    }
}

/// A slot value as seen through the name-based fact interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SlotValue {
    Unset,
    Bool(bool),
    Text(String),
    Count(u32),
}

impl SlotValue {
    pub fn text(s: impl Into<String>) -> Self {
        SlotValue::Text(s.into())
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, SlotValue::Unset)
    }
}

impl From<Option<bool>> for SlotValue {
    fn from(value: Option<bool>) -> Self {
        value.map(SlotValue::Bool).unwrap_or(SlotValue::Unset)
    }
}

impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotValue::Unset => f.write_str("unset"),
            SlotValue::Bool(b) => write!(f, "{}", b),
            SlotValue::Text(s) => f.write_str(s),
            SlotValue::Count(n) => write!(f, "{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_names_round_trip() {
        for slot in Slot::ALL {
            assert_eq!(slot.name().parse::<Slot>().unwrap(), slot);
        }
    }

    #[test]
    fn test_unknown_slot_name() {
        let err = "favorite_color".parse::<Slot>().unwrap_err();
        assert!(matches!(err, Error::UnknownSlot(name) if name == "favorite_color"));
    }

    #[test]
    fn test_unset_is_not_false() {
        let mut facts = Facts::default();
        assert!(!facts.is_set(Slot::SeesLogin));
        facts.sees_login = Some(false);
        assert!(facts.is_set(Slot::SeesLogin));
        assert_eq!(SlotValue::from(facts.sees_login), SlotValue::Bool(false));
        assert_eq!(SlotValue::from(None), SlotValue::Unset);
    }

    #[test]
    fn test_flag_mut_only_for_booleans() {
        let mut facts = Facts::default();
        assert!(facts.flag_mut(Slot::DeviceType).is_none());
        *facts.flag_mut(Slot::OtherDevices).unwrap() = Some(true);
        assert_eq!(facts.other_devices, Some(true));
    }

    #[test]
    fn test_facts_serde_snake_case() {
        let facts = Facts {
            device_type: Some(DeviceType::Computer),
            platform: Some(Platform::Macos),
            ..Default::default()
        };
        let json = serde_json::to_value(&facts).unwrap();
        assert_eq!(json["device_type"], "computer");
        assert_eq!(json["platform"], "macos");
        assert!(json["loads_example"].is_null());
    }
}
