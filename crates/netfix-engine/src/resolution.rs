//! Resolution tracking: decides what happens after "did that fix it?".

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::advice::{Advice, PLATFORM_REPROMPT};
use crate::episode::Episode;

pub const RESOLVED_QUESTION: &str = "Did that fix it?";
pub const SUCCESS_MESSAGE: &str = "LET'S GO. Glad that sorted it.";
pub const PORTAL_REJECTED_MESSAGE: &str = "So the portal wasn't it.";
pub const RETRY_MESSAGE: &str = "Alright. That didn't work.";
pub const DNS_EXHAUSTED_MESSAGE: &str =
    "If an IP renew and DNS flush didn't help, this is network-admin territory. Give them a call.";
pub const ATTEMPTS_EXHAUSTED_MESSAGE: &str =
    "I'm out of ideas on this one. Contact your network admin.";

/// Why an episode ended without a fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationReason {
    /// The IP/DNS reset was the last resort and it failed
    DnsExhausted,
    /// The retry ladder ran out
    AttemptsExhausted,
}

impl EscalationReason {
    pub fn message(&self) -> &'static str {
        match self {
            EscalationReason::DnsExhausted => DNS_EXHAUSTED_MESSAGE,
            EscalationReason::AttemptsExhausted => ATTEMPTS_EXHAUSTED_MESSAGE,
        }
    }
}

/// Fate of the episode after the resolution answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Still waiting for the platform; `resolved` was not consulted
    AwaitPlatform,
    /// Fixed. The episode has been reset.
    Success,
    /// Gave up. The episode has been reset.
    Escalated(EscalationReason),
    /// The captive-portal guess was wrong; route again without using an attempt
    PortalRejected,
    /// Try the next rung of the ladder
    Retry { attempt: u32 },
}

impl Resolution {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Resolution::Success | Resolution::Escalated(_))
    }

    /// Whether the router runs again within the same turn
    pub fn reroutes(&self) -> bool {
        matches!(self, Resolution::PortalRejected | Resolution::Retry { .. })
    }

    pub fn message(&self) -> &'static str {
        match self {
            Resolution::AwaitPlatform => PLATFORM_REPROMPT,
            Resolution::Success => SUCCESS_MESSAGE,
            Resolution::Escalated(reason) => reason.message(),
            Resolution::PortalRejected => PORTAL_REJECTED_MESSAGE,
            Resolution::Retry { .. } => RETRY_MESSAGE,
        }
    }
}

/// Decide the episode's fate from `resolved` and `last_advice`.
///
/// `max_attempts` is the highest attempt count that still gets advice; going
/// past it escalates.
pub fn resolve(mut episode: Episode, max_attempts: u32) -> (Episode, Resolution) {
    if episode.last_advice == Some(Advice::AskPlatformForDns) {
        episode.resolved = None;
        return (episode, Resolution::AwaitPlatform);
    }

    if episode.resolved == Some(true) {
        info!(attempt = episode.attempt_count, "Episode resolved");
        episode.reset();
        return (episode, Resolution::Success);
    }

    if episode.resolved == Some(false) && episode.last_advice == Some(Advice::TierForgetRejoinDns) {
        info!("DNS reset failed, escalating");
        episode.reset();
        return (episode, Resolution::Escalated(EscalationReason::DnsExhausted));
    }

    if episode.last_advice == Some(Advice::Portal) {
        debug!("Captive portal ruled out");
        episode.resolved = None;
        episode.facts.sees_login = Some(false);
        episode.last_advice = None;
        episode.facts.platform = None;
        return (episode, Resolution::PortalRejected);
    }

    let attempt = episode.attempt_count + 1;
    if attempt > max_attempts {
        info!(attempt, "Attempts exhausted, escalating");
        episode.reset();
        return (
            episode,
            Resolution::Escalated(EscalationReason::AttemptsExhausted),
        );
    }

    debug!(attempt, "Advice failed, moving up the ladder");
    episode.attempt_count = attempt;
    episode.resolved = None;
    (episode, Resolution::Retry { attempt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{DeviceType, Platform, Scope};

    const MAX: u32 = 2;

    fn after(advice: Advice, attempt: u32, resolved: Option<bool>) -> Episode {
        let mut ep = Episode::new();
        ep.facts.device_type = Some(DeviceType::Computer);
        ep.facts.loads_example = Some(true);
        ep.facts.scope_issue = Some(Scope::Everything);
        ep.facts.platform = Some(Platform::Windows);
        ep.attempt_count = attempt;
        ep.last_advice = Some(advice);
        ep.resolved = resolved;
        ep
    }

    fn assert_cleared(ep: &Episode) {
        assert_eq!(ep.attempt_count, 0);
        assert_eq!(ep.resolved, None);
        assert_eq!(ep.last_advice, None);
        assert_eq!(ep.facts.platform, None);
        assert_eq!(ep.facts.scope_issue, None);
    }

    #[test]
    fn test_awaiting_platform_ignores_resolved() {
        let ep = after(Advice::AskPlatformForDns, 2, Some(true));
        let (ep, res) = resolve(ep, MAX);
        assert_eq!(res, Resolution::AwaitPlatform);
        assert_eq!(ep.last_advice, Some(Advice::AskPlatformForDns));
        assert_eq!(ep.resolved, None);
        assert_eq!(ep.attempt_count, 2);
    }

    #[test]
    fn test_success_clears_episode() {
        for advice in [Advice::LoadsToggleWifi, Advice::Portal, Advice::TierForgetRejoinDns] {
            let (ep, res) = resolve(after(advice, 1, Some(true)), MAX);
            assert_eq!(res, Resolution::Success);
            assert!(res.is_terminal());
            assert_cleared(&ep);
        }
    }

    #[test]
    fn test_dns_failure_escalates_regardless_of_attempt() {
        for attempt in [0, 1, 2, 7] {
            let (ep, res) = resolve(after(Advice::TierForgetRejoinDns, attempt, Some(false)), MAX);
            assert_eq!(res, Resolution::Escalated(EscalationReason::DnsExhausted));
            assert_cleared(&ep);
        }
    }

    #[test]
    fn test_portal_failure_is_free() {
        let mut ep = after(Advice::Portal, 1, Some(false));
        ep.facts.sees_login = Some(true);
        let (ep, res) = resolve(ep, MAX);
        assert_eq!(res, Resolution::PortalRejected);
        assert!(res.reroutes());
        assert_eq!(ep.attempt_count, 1);
        assert_eq!(ep.facts.sees_login, Some(false));
        assert_eq!(ep.last_advice, None);
        assert_eq!(ep.facts.platform, None);
        assert_eq!(ep.resolved, None);
    }

    #[test]
    fn test_failure_increments_attempt() {
        let (ep, res) = resolve(after(Advice::LoadsToggleWifi, 0, Some(false)), MAX);
        assert_eq!(res, Resolution::Retry { attempt: 1 });
        assert_eq!(ep.attempt_count, 1);
        assert_eq!(ep.resolved, None);
        assert_eq!(ep.last_advice, Some(Advice::LoadsToggleWifi));
    }

    #[test]
    fn test_third_failure_escalates() {
        let (ep, res) = resolve(after(Advice::LoadsRestartRouter, 2, Some(false)), MAX);
        assert_eq!(res, Resolution::Escalated(EscalationReason::AttemptsExhausted));
        assert_eq!(res.message(), ATTEMPTS_EXHAUSTED_MESSAGE);
        assert_cleared(&ep);
    }

    #[test]
    fn test_max_attempts_is_configurable() {
        let (_, res) = resolve(after(Advice::LoadsRestartRouter, 2, Some(false)), 4);
        assert_eq!(res, Resolution::Retry { attempt: 3 });
    }
}
