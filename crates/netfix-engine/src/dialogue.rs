//! Turn driver: runs one user turn through the form, the router and the
//! resolution tracker.
//!
//! A turn can chain several engine steps without new user input (a failed
//! attempt re-routes immediately, a portal rejection re-routes for free). The
//! chain is an explicit bounded queue of [`Step`]s, drained until empty.

use std::collections::VecDeque;
use tracing::{debug, warn};

use crate::advice::{ASK_PLATFORM, EpisodeState, PLATFORM_QUESTION, PLATFORM_REPROMPT};
use crate::dns::{self, DnsOutcome};
use crate::episode::Episode;
use crate::error::{Error, Result};
use crate::events::DialogueEvent;
use crate::facts::Platform;
use crate::form::{self, Validation, YES_NO_REPROMPT};
use crate::interpret;
use crate::resolution::{self, RESOLVED_QUESTION, Resolution};
use crate::router::{self, Routed};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Highest attempt count that still gets advice before escalating
    pub max_attempts: u32,
    /// Upper bound on chained steps within one turn
    pub max_steps_per_turn: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            max_steps_per_turn: 16,
        }
    }
}

/// Explicit intents, sent as `/name` by clients that classify speech themselves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Affirm,
    Deny,
    Platform(Platform),
    Reset,
    Greet,
}

impl Intent {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "affirm" => Intent::Affirm,
            "deny" => Intent::Deny,
            "platform_windows" => Intent::Platform(Platform::Windows),
            "platform_macos" => Intent::Platform(Platform::Macos),
            "platform_linux" => Intent::Platform(Platform::Linux),
            "reset" => Intent::Reset,
            "greet" => Intent::Greet,
            _ => return None,
        })
    }
}

/// One incoming user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    Text(String),
    Intent(Intent),
}

impl UserInput {
    /// Parse a raw message. Unknown `/words` are kept as free text.
    pub fn parse(message: &str) -> Self {
        let trimmed = message.trim();
        if let Some(name) = trimmed.strip_prefix('/') {
            if let Some(intent) = Intent::parse(&name.to_lowercase()) {
                return UserInput::Intent(intent);
            }
        }
        UserInput::Text(trimmed.to_string())
    }

    /// Text the router sees in the platform sub-flow
    fn utterance(&self) -> String {
        match self {
            UserInput::Text(text) => text.clone(),
            UserInput::Intent(Intent::Platform(p)) => p.name().to_string(),
            UserInput::Intent(_) => String::new(),
        }
    }
}

/// Result of one processed turn
#[derive(Debug, Clone)]
pub struct Turn {
    /// Episode to persist for the next turn
    pub episode: Episode,
    /// Replies in the order they should be shown or spoken
    pub replies: Vec<String>,
    pub events: Vec<DialogueEvent>,
}

impl Turn {
    pub fn state(&self) -> EpisodeState {
        self.episode.state()
    }

    /// Whether this turn ended the episode
    pub fn is_terminal(&self) -> bool {
        self.events.iter().any(DialogueEvent::is_terminal)
    }
}

/// A pending engine invocation within a turn
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    CollectFields { answer: Option<Answer> },
    RouteAdvice,
    DispatchDns,
    AskResolved,
    ResolveOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Answer {
    Text(String),
    Flag(bool),
}

/// Working state of a turn in progress
struct TurnRun {
    episode: Episode,
    utterance: String,
    replies: Vec<String>,
    events: Vec<DialogueEvent>,
    queue: VecDeque<Step>,
}

impl TurnRun {
    fn say(&mut self, text: impl Into<String>) {
        self.replies.push(text.into());
    }

    fn emit(&mut self, event: DialogueEvent) {
        self.events.push(event);
    }

    fn then(&mut self, step: Step) {
        self.queue.push_back(step);
    }
}

/// The dialogue controller. Stateless between turns: the episode is passed in
/// and the updated episode handed back.
#[derive(Debug, Clone, Default)]
pub struct Dialogue {
    config: EngineConfig,
}

impl Dialogue {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process one user turn. On error the caller's episode is untouched.
    pub fn handle_turn(&self, episode: &Episode, input: &UserInput) -> Result<Turn> {
        let state = episode.state();
        debug!(state = state.name(), ?input, "Turn start");

        let mut run = TurnRun {
            episode: episode.clone(),
            utterance: input.utterance(),
            replies: Vec::new(),
            events: vec![DialogueEvent::TurnStart { state }],
            queue: VecDeque::new(),
        };
        self.plan(&mut run, input);

        let mut steps = 0;
        while let Some(step) = run.queue.pop_front() {
            steps += 1;
            if steps > self.config.max_steps_per_turn {
                warn!(limit = self.config.max_steps_per_turn, "Turn step limit exceeded");
                return Err(Error::StepLimit(self.config.max_steps_per_turn));
            }
            self.run_step(step, &mut run);
        }

        let state = run.episode.state();
        run.emit(DialogueEvent::TurnEnd { state });
        debug!(state = state.name(), replies = run.replies.len(), "Turn end");

        Ok(Turn {
            episode: run.episode,
            replies: run.replies,
            events: run.events,
        })
    }

    /// Pick the first step of a turn from the episode state and the input.
    fn plan(&self, run: &mut TurnRun, input: &UserInput) {
        if *input == UserInput::Intent(Intent::Reset) {
            run.episode.reset();
            run.emit(DialogueEvent::Reset);
            run.then(Step::CollectFields { answer: None });
            return;
        }

        match run.episode.state() {
            EpisodeState::CollectingFields => {
                let answer = match input {
                    _ if run.episode.requested.is_none() => None,
                    UserInput::Intent(Intent::Greet) => None,
                    UserInput::Intent(Intent::Affirm) => Some(Answer::Flag(true)),
                    UserInput::Intent(Intent::Deny) => Some(Answer::Flag(false)),
                    other => Some(Answer::Text(other.utterance())),
                };
                run.then(Step::CollectFields { answer });
            }
            EpisodeState::AwaitingPlatform => match input {
                UserInput::Intent(Intent::Affirm | Intent::Deny) => run.then(Step::ResolveOutcome),
                _ => run.then(Step::RouteAdvice),
            },
            EpisodeState::AwaitingResolution => {
                let answer = match input {
                    UserInput::Intent(Intent::Affirm) => Some(true),
                    UserInput::Intent(Intent::Deny) => Some(false),
                    UserInput::Text(text) => interpret::yes_no(text).label(),
                    UserInput::Intent(_) => None,
                };
                match answer {
                    Some(resolved) => {
                        run.episode.resolved = Some(resolved);
                        run.then(Step::ResolveOutcome);
                    }
                    None => run.say(YES_NO_REPROMPT),
                }
            }
        }
    }

    fn run_step(&self, step: Step, run: &mut TurnRun) {
        debug!(?step, "Running step");
        match step {
            Step::CollectFields { answer } => self.collect_fields(answer, run),
            Step::RouteAdvice => self.route_advice(run),
            Step::DispatchDns => self.dispatch_dns(run),
            Step::AskResolved => {
                run.episode.resolved = None;
                run.episode.requested = None;
                run.say(RESOLVED_QUESTION);
            }
            Step::ResolveOutcome => self.resolve_outcome(run),
        }
    }

    fn collect_fields(&self, answer: Option<Answer>, run: &mut TurnRun) {
        if let (Some(answer), Some(slot)) = (answer, run.episode.requested) {
            if !run.episode.facts.is_set(slot) {
                let facts = &mut run.episode.facts;
                let validation = match answer {
                    Answer::Text(text) => form::validate(slot, &text, facts),
                    Answer::Flag(flag) => form::accept_flag(slot, flag, facts),
                };
                match validation {
                    Validation::Accepted => run.emit(DialogueEvent::FieldAccepted { slot }),
                    Validation::Empty => {}
                    Validation::Rejected(reprompt) => {
                        warn!(slot = slot.name(), "Answer rejected");
                        run.say(reprompt);
                        run.emit(DialogueEvent::FieldRejected { slot });
                    }
                }
            }
        }

        match form::next_outstanding(&run.episode.facts) {
            Some(slot) => {
                run.episode.requested = Some(slot);
                run.say(form::prompt(slot));
                run.emit(DialogueEvent::FieldPrompted { slot });
            }
            None => {
                run.episode.requested = None;
                run.then(Step::RouteAdvice);
            }
        }
    }

    fn route_advice(&self, run: &mut TurnRun) {
        let (episode, routed) = router::route(std::mem::take(&mut run.episode), &run.utterance);
        run.episode = episode;

        match routed {
            Routed::Advice(advice) => {
                if let Some(text) = advice.utterance() {
                    run.say(text);
                }
                let attempt = run.episode.attempt_count;
                run.emit(DialogueEvent::AdviceGiven { advice, attempt });
                run.then(Step::AskResolved);
            }
            Routed::AskPlatform => {
                run.say(PLATFORM_QUESTION);
                run.emit(DialogueEvent::PlatformRequested);
            }
            Routed::PlatformRetry => run.say(PLATFORM_REPROMPT),
            Routed::Dispatch(platform) => {
                run.emit(DialogueEvent::PlatformDetected { platform });
                run.then(Step::DispatchDns);
            }
            Routed::Clarify(slot) => {
                run.say(form::prompt(slot));
                run.emit(DialogueEvent::FieldPrompted { slot });
            }
        }
    }

    fn dispatch_dns(&self, run: &mut TurnRun) {
        let (episode, outcome) = dns::dispatch(std::mem::take(&mut run.episode));
        run.episode = episode;

        match outcome {
            DnsOutcome::Instructions(steps) => {
                run.say(steps.text());
                if let Some(advice) = run.episode.last_advice {
                    let attempt = run.episode.attempt_count;
                    run.emit(DialogueEvent::AdviceGiven { advice, attempt });
                }
                run.then(Step::AskResolved);
            }
            DnsOutcome::AskAgain => {
                run.say(ASK_PLATFORM);
                run.emit(DialogueEvent::PlatformRequested);
            }
        }
    }

    fn resolve_outcome(&self, run: &mut TurnRun) {
        let (episode, resolution) =
            resolution::resolve(std::mem::take(&mut run.episode), self.config.max_attempts);
        run.episode = episode;
        run.say(resolution.message());

        match resolution {
            Resolution::AwaitPlatform => {}
            Resolution::Success => run.emit(DialogueEvent::Resolved),
            Resolution::Escalated(reason) => run.emit(DialogueEvent::Escalated { reason }),
            Resolution::PortalRejected => run.emit(DialogueEvent::PortalRejected),
            Resolution::Retry { attempt } => run.emit(DialogueEvent::AttemptFailed { attempt }),
        }
        if resolution.reroutes() {
            run.then(Step::RouteAdvice);
        }
    }
}
