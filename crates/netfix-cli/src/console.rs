//! Interactive stdin/stdout console

use crate::commands::{self, CommandResult};
use crate::guards::{ClientGuards, GuardAction};
use crate::session::{Role, SessionLog};
use crate::transport::Transport;
use tracing::warn;

pub const INTRO: &str = "What's up? What's wrong?";
pub const UNREACHABLE_MESSAGE: &str = "I can't reach the server right now.";
pub const EMPTY_REPLY_MESSAGE: &str = "Say that again but, like, clearer.";

/// Leading part of a transcript id for display; ids from `--resume` may be short
fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub struct Console {
    transport: Box<dyn Transport>,
    sender: String,
    guards: ClientGuards,
    log: Option<SessionLog>,
}

impl Console {
    pub fn new(transport: Box<dyn Transport>, sender: impl Into<String>, log: Option<SessionLog>) -> Self {
        Self {
            transport,
            sender: sender.into(),
            guards: ClientGuards::new(),
            log,
        }
    }

    fn record(&mut self, role: Role, text: &str) {
        if let Some(log) = self.log.as_mut() {
            if let Err(e) = log.append(role, text) {
                warn!("Failed to write transcript: {}", e);
            }
        }
    }

    /// One user utterance in, one bot line out. `None` for blank input.
    pub async fn exchange(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.record(Role::User, text);

        let before = self.guards.clone();
        let reply = match self.guards.preprocess(text) {
            GuardAction::Reply(hint) => hint.to_string(),
            GuardAction::Send(message) => {
                if message.eq_ignore_ascii_case("/reset") {
                    self.guards.clear();
                }
                match self.transport.send(&self.sender, &message).await {
                    Ok(replies) if replies.is_empty() => EMPTY_REPLY_MESSAGE.to_string(),
                    Ok(replies) => {
                        let joined = replies.join(" ");
                        self.guards.observe(&joined);
                        joined
                    }
                    Err(e) => {
                        self.guards = before;
                        if e.is_transport() {
                            warn!("Transport failure: {}", e);
                            UNREACHABLE_MESSAGE.to_string()
                        } else {
                            warn!("Turn failed: {}", e);
                            format!("Something broke on my end: {}", e)
                        }
                    }
                }
            }
        };

        self.record(Role::Bot, &reply);
        Some(reply)
    }

    /// Handle a console-local slash command, if `input` is one
    async fn local_command(&self, input: &str) -> Option<CommandResult> {
        if !input.trim_start().starts_with('/') {
            return None;
        }
        let episode = self.transport.episode(&self.sender).await;
        commands::execute_command(input, episode.as_ref(), &self.transport.backend())
    }

    /// Send a single message and print the reply
    pub async fn run_command(&mut self, command: &str) -> anyhow::Result<()> {
        if let Some(CommandResult::Message(msg)) = self.local_command(command).await {
            println!("{}", msg);
            return Ok(());
        }
        if let Some(reply) = self.exchange(command).await {
            println!("{}", reply);
        }
        Ok(())
    }

    pub async fn run_interactive(&mut self) -> anyhow::Result<()> {
        use std::io::{self, Write};

        if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
            match self.log.as_ref() {
                Some(log) => eprintln!(
                    "netfix ({}) session: {}",
                    self.transport.backend(),
                    short_id(log.id())
                ),
                None => eprintln!("netfix ({})", self.transport.backend()),
            }
            eprintln!();
        }
        println!("{}", INTRO);
        self.record(Role::Bot, INTRO);

        loop {
            print!("> ");
            io::stdout().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                // EOF
                break;
            }

            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            match self.local_command(input).await {
                Some(CommandResult::Exit) => break,
                Some(CommandResult::Message(msg)) => {
                    println!("{}", msg);
                    continue;
                }
                None => {}
            }

            if let Some(reply) = self.exchange(input).await {
                println!("{}", reply);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guards::YES_NO_HINT;
    use crate::service::ConversationService;
    use crate::transport::{ClientError, LocalTransport};
    use async_trait::async_trait;
    use netfix_engine::resolution::RESOLVED_QUESTION;
    use netfix_engine::{EngineConfig, MemoryStore};
    use std::sync::Arc;

    fn local_console() -> Console {
        let service = Arc::new(ConversationService::new(
            EngineConfig::default(),
            Arc::new(MemoryStore::new()),
        ));
        Console::new(Box::new(LocalTransport::new(service)), "voice_user", None)
    }

    struct Offline;

    #[async_trait]
    impl Transport for Offline {
        async fn send(&self, _sender: &str, _message: &str) -> Result<Vec<String>, ClientError> {
            Err(ClientError::Status {
                status: 502,
                body: "bad gateway".into(),
            })
        }

        fn backend(&self) -> String {
            "offline".into()
        }
    }

    struct Silent;

    #[async_trait]
    impl Transport for Silent {
        async fn send(&self, _sender: &str, _message: &str) -> Result<Vec<String>, ClientError> {
            Ok(vec![])
        }

        fn backend(&self) -> String {
            "silent".into()
        }
    }

    #[tokio::test]
    async fn test_guard_arms_after_instruction() {
        let mut console = local_console();
        for line in ["hi", "phone", "no", "no"] {
            console.exchange(line).await;
        }
        let reply = console.exchange("yes").await.unwrap();
        assert!(reply.ends_with(RESOLVED_QUESTION));
        assert!(console.guards.awaiting_yes_no);

        assert_eq!(console.exchange("banana").await.unwrap(), YES_NO_HINT);
        let reply = console.exchange("yeah").await.unwrap();
        assert!(reply.contains("Glad"));
        assert!(!console.guards.awaiting_yes_no);
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_guards() {
        let mut console = Console::new(Box::new(Offline), "u", None);
        console.guards.awaiting_yes_no = true;

        let reply = console.exchange("yes").await.unwrap();
        assert_eq!(reply, UNREACHABLE_MESSAGE);
        assert!(console.guards.awaiting_yes_no);
    }

    #[test]
    fn test_short_id_handles_short_ids() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id(""), "");
    }

    #[tokio::test]
    async fn test_empty_reply_fallback() {
        let mut console = Console::new(Box::new(Silent), "u", None);
        assert_eq!(console.exchange("hello").await.unwrap(), EMPTY_REPLY_MESSAGE);
        assert_eq!(console.exchange("   ").await, None);
    }

    #[tokio::test]
    async fn test_status_is_local() {
        let console = local_console();
        let result = console.local_command("/status").await;
        assert!(matches!(result, Some(CommandResult::Message(_))));
        assert_eq!(console.local_command("/reset").await, None);
        assert_eq!(console.local_command("phone").await, None);
    }

    #[tokio::test]
    async fn test_transcript_records_both_sides() {
        let data_dir = std::env::temp_dir().join(format!("netfix-console-{}", uuid::Uuid::new_v4()));
        let log = SessionLog::create(&data_dir, "local", "u").unwrap();
        let id = log.id().to_string();

        let service = Arc::new(ConversationService::new(
            EngineConfig::default(),
            Arc::new(MemoryStore::new()),
        ));
        let mut console = Console::new(Box::new(LocalTransport::new(service)), "u", Some(log));
        console.exchange("my wifi is broken").await;
        drop(console);

        let (_, messages) = SessionLog::open(&data_dir, &id).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].0, Role::User);
        assert_eq!(messages[1].0, Role::Bot);
        let _ = std::fs::remove_dir_all(&data_dir);
    }
}
