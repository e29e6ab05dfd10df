//! The dynamic troubleshooting form: which facts are still needed, how to ask
//! for them, and how answers are validated.

use crate::facts::{Facts, Slot};
use crate::interpret::{self, Interpretation};

pub const DEVICE_REPROMPT: &str = "Just say **phone** or **computer**.";
pub const SCOPE_REPROMPT: &str = "Just say **everything** or **one app/site**.";
pub const YES_NO_REPROMPT: &str = "Just say **yes** or **no**.";

/// Ordered list of the facts the form needs before advice can be given.
///
/// The branch on `loads_example` happens before the router question is
/// appended, so the loads-specific questions always come first.
pub fn required_slots(facts: &Facts) -> Vec<Slot> {
    let mut req = vec![Slot::DeviceType, Slot::LoadsExample];

    match facts.loads_example {
        Some(true) => req.extend([Slot::ScopeIssue, Slot::RandomFailures, Slot::OtherDevices]),
        Some(false) => req.push(Slot::SeesLogin),
        None => {}
    }

    req.push(Slot::CanRestartRouter);
    req
}

/// The first required fact that is still unset
pub fn next_outstanding(facts: &Facts) -> Option<Slot> {
    required_slots(facts)
        .into_iter()
        .find(|slot| !facts.is_set(*slot))
}

/// Question asked to collect a field
pub fn prompt(slot: Slot) -> &'static str {
    match slot {
        Slot::DeviceType => "Are you on a **phone** or a **computer**?",
        Slot::LoadsExample => "Open example.com in a browser. Does it load?",
        Slot::ScopeIssue => "Is it **everything** that's broken, or just **one app/site**?",
        Slot::RandomFailures => "Does it cut out randomly, working one minute and not the next?",
        Slot::OtherDevices => "Are other devices on this network streaming or downloading right now?",
        Slot::SeesLogin => "When you open a site, do you get a login or terms page?",
        Slot::CanRestartRouter => "Can you get to the router to restart it?",
        Slot::Platform => crate::advice::PLATFORM_QUESTION,
        Slot::Resolved => crate::resolution::RESOLVED_QUESTION,
        Slot::AttemptCount | Slot::LastAdvice => "",
    }
}

/// Outcome of validating one answer for a form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The value was stored
    Accepted,
    /// Nothing usable was said; ask again without complaint
    Empty,
    /// The value was refused; the message explains what is accepted
    Rejected(&'static str),
}

/// Validate a free-text answer for `slot` and store it in `facts` when accepted.
/// Rejected answers never touch `facts`.
pub fn validate(slot: Slot, text: &str, facts: &mut Facts) -> Validation {
    match slot {
        Slot::DeviceType => match interpret::device_type(text) {
            Interpretation::Label(device) => {
                facts.device_type = Some(device);
                Validation::Accepted
            }
            _ => Validation::Rejected(DEVICE_REPROMPT),
        },
        Slot::ScopeIssue => match interpret::scope(text) {
            Interpretation::Label(scope) => {
                facts.scope_issue = Some(scope);
                Validation::Accepted
            }
            Interpretation::Empty => Validation::Empty,
            Interpretation::Unrecognized => Validation::Rejected(SCOPE_REPROMPT),
        },
        _ => match interpret::yes_no(text) {
            Interpretation::Label(answer) => accept_flag(slot, answer, facts),
            _ => Validation::Rejected(YES_NO_REPROMPT),
        },
    }
}

/// Store an explicit yes/no answer (an `/affirm` or `/deny` intent) for `slot`.
pub fn accept_flag(slot: Slot, answer: bool, facts: &mut Facts) -> Validation {
    match facts.flag_mut(slot) {
        Some(target) => {
            *target = Some(answer);
            Validation::Accepted
        }
        None => Validation::Rejected(match slot {
            Slot::DeviceType => DEVICE_REPROMPT,
            Slot::ScopeIssue => SCOPE_REPROMPT,
            _ => YES_NO_REPROMPT,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{DeviceType, Scope};

    #[test]
    fn test_required_when_loads_unset() {
        let facts = Facts::default();
        assert_eq!(
            required_slots(&facts),
            vec![Slot::DeviceType, Slot::LoadsExample, Slot::CanRestartRouter]
        );
    }

    #[test]
    fn test_required_when_loads_true() {
        let facts = Facts {
            loads_example: Some(true),
            ..Default::default()
        };
        assert_eq!(
            required_slots(&facts),
            vec![
                Slot::DeviceType,
                Slot::LoadsExample,
                Slot::ScopeIssue,
                Slot::RandomFailures,
                Slot::OtherDevices,
                Slot::CanRestartRouter,
            ]
        );
    }

    #[test]
    fn test_required_when_loads_false() {
        let facts = Facts {
            loads_example: Some(false),
            ..Default::default()
        };
        let req = required_slots(&facts);
        assert_eq!(
            req,
            vec![
                Slot::DeviceType,
                Slot::LoadsExample,
                Slot::SeesLogin,
                Slot::CanRestartRouter,
            ]
        );
        assert!(!req.contains(&Slot::ScopeIssue));
    }

    #[test]
    fn test_next_outstanding_follows_order() {
        let mut facts = Facts::default();
        assert_eq!(next_outstanding(&facts), Some(Slot::DeviceType));
        facts.device_type = Some(DeviceType::Phone);
        assert_eq!(next_outstanding(&facts), Some(Slot::LoadsExample));
        facts.loads_example = Some(true);
        assert_eq!(next_outstanding(&facts), Some(Slot::ScopeIssue));
        facts.scope_issue = Some(Scope::One);
        facts.random_failures = Some(false);
        facts.other_devices = Some(false);
        assert_eq!(next_outstanding(&facts), Some(Slot::CanRestartRouter));
        facts.can_restart_router = Some(true);
        assert_eq!(next_outstanding(&facts), None);
    }

    #[test]
    fn test_device_validator_rejects_without_mutation() {
        let mut facts = Facts::default();
        assert_eq!(
            validate(Slot::DeviceType, "tablet", &mut facts),
            Validation::Rejected(DEVICE_REPROMPT)
        );
        assert_eq!(facts.device_type, None);
        assert_eq!(
            validate(Slot::DeviceType, "computer", &mut facts),
            Validation::Accepted
        );
        assert_eq!(facts.device_type, Some(DeviceType::Computer));
    }

    #[test]
    fn test_scope_validator_empty_is_silent() {
        let mut facts = Facts::default();
        assert_eq!(validate(Slot::ScopeIssue, "  ", &mut facts), Validation::Empty);
        assert_eq!(
            validate(Slot::ScopeIssue, "dunno", &mut facts),
            Validation::Rejected(SCOPE_REPROMPT)
        );
        assert_eq!(facts.scope_issue, None);
        assert_eq!(
            validate(Slot::ScopeIssue, "just discord", &mut facts),
            Validation::Accepted
        );
        assert_eq!(facts.scope_issue, Some(Scope::One));
    }

    #[test]
    fn test_flag_validator() {
        let mut facts = Facts::default();
        assert_eq!(validate(Slot::SeesLogin, "nope", &mut facts), Validation::Accepted);
        assert_eq!(facts.sees_login, Some(false));
        assert_eq!(
            validate(Slot::CanRestartRouter, "maybe", &mut facts),
            Validation::Rejected(YES_NO_REPROMPT)
        );
        assert_eq!(facts.can_restart_router, None);
    }

    #[test]
    fn test_accept_flag_refuses_categorical_slots() {
        let mut facts = Facts::default();
        assert_eq!(
            accept_flag(Slot::DeviceType, true, &mut facts),
            Validation::Rejected(DEVICE_REPROMPT)
        );
        assert_eq!(accept_flag(Slot::LoadsExample, true, &mut facts), Validation::Accepted);
        assert_eq!(facts.loads_example, Some(true));
    }
}
