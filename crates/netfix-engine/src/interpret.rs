//! Free-text interpretation of user answers.
//!
//! Each category is an ordered list of [`Rule`]s. Rules are evaluated top to
//! bottom and the first match wins, so the order of the tables below is the
//! tie-break order. Everything here is pure.

use crate::facts::{DeviceType, Platform, Scope};

/// Result of interpreting one utterance against a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpretation<L> {
    /// A label of the category was recognized
    Label(L),
    /// Nothing was said; the field stays outstanding without a complaint
    Empty,
    /// Text was present but matched no label (or matched conflicting labels)
    Unrecognized,
}

impl<L> Interpretation<L> {
    pub fn label(self) -> Option<L> {
        match self {
            Interpretation::Label(l) => Some(l),
            _ => None,
        }
    }
}

/// A keyword set mapped to a label
#[derive(Debug)]
pub struct Rule<L: 'static> {
    pub label: L,
    /// Whole utterances accepted as-is
    pub exact: &'static [&'static str],
    /// Keywords looked for inside the utterance
    pub keywords: &'static [&'static str],
}

impl<L: Copy> Rule<L> {
    fn matches_exact(&self, text: &str) -> bool {
        self.exact.contains(&text)
    }

    fn matches_substring(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k))
    }
}

pub const SCOPE_RULES: &[Rule<Scope>] = &[
    Rule {
        label: Scope::Everything,
        exact: &[],
        keywords: &["everything", "all", "every", "whole", "all sites", "all apps"],
    },
    Rule {
        label: Scope::One,
        exact: &[],
        keywords: &[
            "one",
            "only",
            "just",
            "youtube",
            "spotify",
            "discord",
            "instagram",
            "tiktok",
            "one site",
            "one app",
        ],
    },
];

pub const PLATFORM_RULES: &[Rule<Platform>] = &[
    Rule {
        label: Platform::Linux,
        exact: &[],
        keywords: &["linux", "ubuntu", "debian", "arch", "fedora", "mint", "kali"],
    },
    Rule {
        label: Platform::Windows,
        exact: &["win"],
        keywords: &["windows", "win", "win10", "win11", "windows 10", "windows 11"],
    },
    Rule {
        label: Platform::Macos,
        exact: &[],
        keywords: &["macos", "osx", "mac", "macbook", "apple", "mac book"],
    },
];

pub const YES_NO_RULES: &[Rule<bool>] = &[
    Rule {
        label: true,
        exact: &["yes", "yeah", "yep", "yup"],
        keywords: &[
            "yes",
            "yeah",
            "yep",
            "yup",
            "sure",
            "correct",
            "fixed",
            "works",
            "working",
            "it works",
            "it worked",
            "now works",
            "now it works",
        ],
    },
    Rule {
        label: false,
        exact: &["no", "nope", "nah"],
        keywords: &[
            "no",
            "nope",
            "nah",
            "not",
            "still",
            "still broken",
            "doesn't",
            "doesnt",
            "not working",
            "no change",
            "didn't",
            "didnt",
        ],
    },
];

/// Lowercase and trim an utterance
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Only the literal words "phone" and "computer" are accepted.
pub fn device_type(text: &str) -> Interpretation<DeviceType> {
    match normalize(text).trim_end_matches(['.', '!', '?']) {
        "phone" => Interpretation::Label(DeviceType::Phone),
        "computer" => Interpretation::Label(DeviceType::Computer),
        "" => Interpretation::Empty,
        _ => Interpretation::Unrecognized,
    }
}

pub fn scope(text: &str) -> Interpretation<Scope> {
    first_substring_match(SCOPE_RULES, &normalize(text))
}

pub fn platform(text: &str) -> Interpretation<Platform> {
    let text = normalize(text);
    if let Some(rule) = PLATFORM_RULES.iter().find(|r| r.matches_exact(&text)) {
        return Interpretation::Label(rule.label);
    }
    first_substring_match(PLATFORM_RULES, &text)
}

/// Yes/no answers. Exact short answers win; otherwise both keyword sets are
/// searched as substrings and anything but exactly one match is unrecognized.
pub fn yes_no(text: &str) -> Interpretation<bool> {
    let text = normalize(text);
    let bare = text.trim_end_matches(['.', '!', '?', ',']);
    if bare.is_empty() {
        return Interpretation::Empty;
    }
    if let Some(rule) = YES_NO_RULES.iter().find(|r| r.matches_exact(bare)) {
        return Interpretation::Label(rule.label);
    }

    let mut matched = YES_NO_RULES.iter().filter(|r| r.matches_substring(&text));
    match (matched.next(), matched.next()) {
        (Some(rule), None) => Interpretation::Label(rule.label),
        _ => Interpretation::Unrecognized,
    }
}

fn first_substring_match<L: Copy>(rules: &[Rule<L>], text: &str) -> Interpretation<L> {
    if text.is_empty() {
        return Interpretation::Empty;
    }
    rules
        .iter()
        .find(|r| r.matches_substring(text))
        .map(|r| Interpretation::Label(r.label))
        .unwrap_or(Interpretation::Unrecognized)
}
