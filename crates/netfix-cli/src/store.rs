//! File-backed episode store: one JSON document per conversation.

use netfix_engine::{Episode, EpisodeStore, Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, conversation_id: &str) -> Result<PathBuf> {
        let valid = !conversation_id.is_empty()
            && conversation_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !conversation_id.starts_with('.');
        if !valid {
            return Err(Error::Store(format!(
                "invalid conversation id: {:?}",
                conversation_id
            )));
        }
        Ok(self.dir.join(format!("{}.json", conversation_id)))
    }
}

impl EpisodeStore for FileStore {
    fn load(&self, conversation_id: &str) -> Result<Episode> {
        let path = self.path_for(conversation_id)?;
        if !path.exists() {
            return Ok(Episode::new());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, conversation_id: &str, episode: &Episode) -> Result<()> {
        let path = self.path_for(conversation_id)?;
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(episode)?;
        // Replace atomically; readers never see a partial file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, conversation_id: &str) -> Result<()> {
        let path = self.path_for(conversation_id)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn ids(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netfix_engine::{Advice, DeviceType};

    fn temp_store() -> FileStore {
        let dir = std::env::temp_dir().join(format!("netfix-store-{}", uuid::Uuid::new_v4()));
        FileStore::new(dir)
    }

    #[test]
    fn test_round_trip_on_disk() {
        let store = temp_store();
        let mut ep = Episode::new();
        ep.facts.device_type = Some(DeviceType::Phone);
        ep.last_advice = Some(Advice::TierAirplane);

        store.save("voice_user", &ep).unwrap();
        assert_eq!(store.load("voice_user").unwrap(), ep);
        assert_eq!(store.ids().unwrap(), vec!["voice_user"]);

        store.remove("voice_user").unwrap();
        assert!(store.load("voice_user").unwrap().is_pristine());
        store.remove("voice_user").unwrap();
        let _ = fs::remove_dir_all(store.dir());
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let store = temp_store();
        assert!(store.load("../etc/passwd").is_err());
        assert!(store.save("", &Episode::new()).is_err());
        assert!(store.load(".hidden").is_err());
    }

    #[test]
    fn test_missing_dir_has_no_ids() {
        let store = temp_store();
        assert!(store.ids().unwrap().is_empty());
    }
}
