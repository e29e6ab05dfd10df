//! Episode storage keyed by conversation id.

use parking_lot::Mutex;
use std::collections::HashMap;

use crate::episode::Episode;
use crate::error::Result;

/// Persistence for conversation episodes.
///
/// `load` of an unknown id yields a fresh episode, never an error.
pub trait EpisodeStore: Send + Sync {
    fn load(&self, conversation_id: &str) -> Result<Episode>;

    fn save(&self, conversation_id: &str, episode: &Episode) -> Result<()>;

    fn remove(&self, conversation_id: &str) -> Result<()>;

    /// Ids of every stored conversation
    fn ids(&self) -> Result<Vec<String>>;
}

/// In-memory store, lost on exit
#[derive(Default)]
pub struct MemoryStore {
    episodes: Mutex<HashMap<String, Episode>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EpisodeStore for MemoryStore {
    fn load(&self, conversation_id: &str) -> Result<Episode> {
        Ok(self
            .episodes
            .lock()
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    fn save(&self, conversation_id: &str, episode: &Episode) -> Result<()> {
        self.episodes
            .lock()
            .insert(conversation_id.to_string(), episode.clone());
        Ok(())
    }

    fn remove(&self, conversation_id: &str) -> Result<()> {
        self.episodes.lock().remove(conversation_id);
        Ok(())
    }

    fn ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.episodes.lock().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
