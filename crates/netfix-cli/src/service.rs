//! Conversation service: loads an episode, runs one turn, saves the result.
//!
//! Shared by the webhook server and the local console. At most one turn per
//! sender runs at a time.

use netfix_engine::{Dialogue, EngineConfig, Episode, EpisodeStore, Turn, UserInput};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const BUSY_MESSAGE: &str = "Still processing, hang on.";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Another turn for this sender is still running
    #[error("conversation {0} is busy")]
    Busy(String),

    #[error(transparent)]
    Engine(#[from] netfix_engine::Error),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

pub struct ConversationService {
    dialogue: Dialogue,
    store: Arc<dyn EpisodeStore>,
    in_flight: Mutex<HashSet<String>>,
}

/// Marks a sender busy until dropped
struct InFlight<'a> {
    set: &'a Mutex<HashSet<String>>,
    sender: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.sender);
    }
}

impl ConversationService {
    pub fn new(config: EngineConfig, store: Arc<dyn EpisodeStore>) -> Self {
        Self {
            dialogue: Dialogue::new(config),
            store,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    fn claim(&self, sender: &str) -> Result<InFlight<'_>> {
        if !self.in_flight.lock().insert(sender.to_string()) {
            warn!(sender, "Rejecting overlapping turn");
            return Err(ServiceError::Busy(sender.to_string()));
        }
        Ok(InFlight {
            set: &self.in_flight,
            sender: sender.to_string(),
        })
    }

    /// Run one turn for `sender`. The episode is saved only when the turn succeeds.
    pub fn handle(&self, sender: &str, message: &str) -> Result<Turn> {
        let _guard = self.claim(sender)?;

        let episode = self.store.load(sender)?;
        let input = UserInput::parse(message);
        let turn = self.dialogue.handle_turn(&episode, &input)?;
        self.store.save(sender, &turn.episode)?;

        if turn.is_terminal() {
            info!(sender, "Conversation finished");
        }
        debug!(sender, state = turn.state().name(), "Turn saved");
        Ok(turn)
    }

    /// Current episode for `sender` (fresh if unknown)
    pub fn episode(&self, sender: &str) -> Result<Episode> {
        Ok(self.store.load(sender)?)
    }

    /// Forget a conversation entirely
    pub fn reset(&self, sender: &str) -> Result<()> {
        let _guard = self.claim(sender)?;
        self.store.remove(sender)?;
        info!(sender, "Conversation removed");
        Ok(())
    }

    pub fn conversation_count(&self) -> Result<usize> {
        Ok(self.store.ids()?.len())
    }
}
