//! Console slash commands.
//!
//! Only console-local commands are handled here. Everything else starting
//! with `/` (`/reset`, `/affirm`, ...) goes to the engine untouched.

use netfix_engine::{Episode, Slot};

/// Result of executing a slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Show a message to the user (not sent to the engine)
    Message(String),
    /// Exit the console
    Exit,
}

/// Parse and execute a console command. `None` means the input should be sent on.
pub fn execute_command(
    input: &str,
    episode: Option<&Episode>,
    backend: &str,
) -> Option<CommandResult> {
    let input = input.trim();
    let command = input.strip_prefix('/')?.split_whitespace().next()?.to_lowercase();

    match command.as_str() {
        "help" | "h" | "?" => Some(CommandResult::Message(help_message())),
        "status" => Some(CommandResult::Message(status_message(episode, backend))),
        "quit" | "exit" | "q" => Some(CommandResult::Exit),
        _ => None,
    }
}

fn help_message() -> String {
    r#"Describe your Wi-Fi problem and answer the questions.

Console commands:
  /help, /h, /?       Show this help message
  /status             Show what netfix knows so far
  /quit, /exit, /q    Exit netfix

Sent to the troubleshooter:
  /reset              Start over
  /affirm, /deny      Answer yes or no
  /platform_windows   Pick a platform (also _macos, _linux)"#
        .to_string()
}

fn status_message(episode: Option<&Episode>, backend: &str) -> String {
    let Some(episode) = episode else {
        return format!("Backend: {}\nStatus is not available from a remote webhook.", backend);
    };

    let mut lines = vec![
        format!("Backend: {}", backend),
        format!("State: {}", episode.state().name()),
        format!("Attempts: {}", episode.attempt_count),
    ];
    if let Some(advice) = episode.last_advice {
        lines.push(format!("Last advice: {}", advice.summary()));
    }
    for slot in Slot::ALL {
        if matches!(slot, Slot::AttemptCount | Slot::LastAdvice) {
            continue;
        }
        let value = episode.get_slot(slot);
        if !value.is_unset() {
            lines.push(format!("  {}: {}", slot, value));
        }
    }
    lines.join("\n")
}
