//! Platform-specific IP renew and DNS flush instructions.

use tracing::debug;

use crate::advice::Advice;
use crate::episode::Episode;
use crate::facts::Platform;

/// The two-step reset for one platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DnsSteps {
    pub platform: Platform,
    pub renew_ip: &'static str,
    pub flush_dns: &'static str,
}

impl DnsSteps {
    pub fn for_platform(platform: Platform) -> Self {
        let (renew_ip, flush_dns) = match platform {
            Platform::Windows => (
                "`ipconfig /release` then `ipconfig /renew`",
                "`ipconfig /flushdns`",
            ),
            Platform::Linux => (
                "`sudo dhclient -r` then `sudo dhclient`",
                "`sudo resolvectl flush-caches`",
            ),
            Platform::Macos => (
                "toggle Wi-Fi off and on, or renew the DHCP lease in Network settings",
                "`sudo dscacheutil -flushcache; sudo killall -HUP mDNSResponder`",
            ),
        };
        Self {
            platform,
            renew_ip,
            flush_dns,
        }
    }

    pub fn text(&self) -> String {
        format!(
            "To renew your IP: {}\nTo flush DNS: {}",
            self.renew_ip, self.flush_dns
        )
    }
}

/// What the dispatcher produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsOutcome {
    Instructions(DnsSteps),
    /// No usable platform; the platform question goes out again
    AskAgain,
}

/// Give the reset steps for the episode's platform.
pub fn dispatch(mut episode: Episode) -> (Episode, DnsOutcome) {
    episode.resolved = None;
    match episode.facts.platform {
        Some(platform) => {
            debug!(platform = platform.name(), "Dispatching DNS reset");
            episode.last_advice = Some(Advice::TierForgetRejoinDns);
            episode.requested = None;
            (episode, DnsOutcome::Instructions(DnsSteps::for_platform(platform)))
        }
        None => {
            episode.last_advice = Some(Advice::AskPlatformForDns);
            (episode, DnsOutcome::AskAgain)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_linux() {
        let mut ep = Episode::new();
        ep.facts.platform = Some(Platform::Linux);
        ep.last_advice = Some(Advice::AskPlatformForDns);
        ep.resolved = Some(false);

        let (ep, outcome) = dispatch(ep);
        let DnsOutcome::Instructions(steps) = outcome else {
            panic!("expected instructions");
        };
        assert!(steps.text().contains("dhclient"));
        assert!(steps.text().contains("resolvectl flush-caches"));
        assert_eq!(ep.last_advice, Some(Advice::TierForgetRejoinDns));
        assert_eq!(ep.resolved, None);
    }

    #[test]
    fn test_each_platform_has_distinct_steps() {
        let win = DnsSteps::for_platform(Platform::Windows);
        let mac = DnsSteps::for_platform(Platform::Macos);
        assert!(win.flush_dns.contains("ipconfig /flushdns"));
        assert!(mac.flush_dns.contains("mDNSResponder"));
        assert_ne!(win.renew_ip, mac.renew_ip);
    }

    #[test]
    fn test_dispatch_without_platform_asks_again() {
        let mut ep = Episode::new();
        ep.last_advice = Some(Advice::TierForgetRejoinDns);
        let (ep, outcome) = dispatch(ep);
        assert_eq!(outcome, DnsOutcome::AskAgain);
        assert_eq!(ep.last_advice, Some(Advice::AskPlatformForDns));
        assert_eq!(ep.facts.platform, None);
    }
}
