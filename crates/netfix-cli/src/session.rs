//! Conversation transcripts as JSONL files

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Who said a transcript line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Bot,
}

/// Transcript entry types for JSONL format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEntry {
    /// Transcript metadata
    Metadata {
        id: String,
        created_at: i64,
        /// "local" or the webhook URL
        backend: String,
        /// Conversation id the episode is stored under
        #[serde(default)]
        sender: String,
    },
    /// One line of the conversation
    Message {
        role: Role,
        text: String,
        timestamp: i64,
    },
}

/// Append-only transcript of one conversation
pub struct SessionLog {
    id: String,
    sender: String,
    writer: BufWriter<File>,
}

impl SessionLog {
    /// Get the transcripts directory under a data dir
    pub fn sessions_dir(data_dir: &Path) -> PathBuf {
        data_dir.join("sessions")
    }

    /// Start a new transcript with a fresh id
    pub fn create(data_dir: &Path, backend: &str, sender: &str) -> std::io::Result<Self> {
        let id = uuid::Uuid::new_v4().to_string();
        let dir = Self::sessions_dir(data_dir);
        fs::create_dir_all(&dir)?;

        let file = File::create(dir.join(format!("{}.jsonl", id)))?;
        let mut writer = BufWriter::new(file);

        let metadata = SessionEntry::Metadata {
            id: id.clone(),
            created_at: chrono::Utc::now().timestamp_millis(),
            backend: backend.to_string(),
            sender: sender.to_string(),
        };
        writeln!(writer, "{}", serde_json::to_string(&metadata)?)?;
        writer.flush()?;

        Ok(Self {
            id,
            sender: sender.to_string(),
            writer,
        })
    }

    /// Reopen an existing transcript for appending, returning its messages so far
    pub fn open(data_dir: &Path, id: &str) -> std::io::Result<(Self, Vec<(Role, String)>)> {
        let path = Self::sessions_dir(data_dir).join(format!("{}.jsonl", id));
        if !path.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Session not found: {}", id),
            ));
        }

        let reader = BufReader::new(File::open(&path)?);
        let mut sender = String::new();
        let mut messages = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<SessionEntry>(&line) {
                Ok(SessionEntry::Metadata { sender: s, .. }) => sender = s,
                Ok(SessionEntry::Message { role, text, .. }) => messages.push((role, text)),
                Err(_) => {}
            }
        }

        let file = File::options().append(true).open(&path)?;
        Ok((
            Self {
                id: id.to_string(),
                sender,
                writer: BufWriter::new(file),
            },
            messages,
        ))
    }

    /// Get session ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Conversation id recorded when the transcript was created (empty for old files)
    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn append(&mut self, role: Role, text: &str) -> std::io::Result<()> {
        let entry = SessionEntry::Message {
            role,
            text: text.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        writeln!(self.writer, "{}", serde_json::to_string(&entry)?)?;
        self.writer.flush()
    }

    /// List all transcripts, newest first
    pub fn list(data_dir: &Path) -> std::io::Result<Vec<SessionInfo>> {
        let dir = Self::sessions_dir(data_dir);
        if !dir.exists() {
            return Ok(vec![]);
        }

        let mut sessions = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
                if let Some(info) = Self::read_info(&path) {
                    sessions.push(info);
                }
            }
        }

        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    fn read_info(path: &Path) -> Option<SessionInfo> {
        let reader = BufReader::new(File::open(path).ok()?);
        let mut lines = reader.lines().map_while(Result::ok);

        let SessionEntry::Metadata {
            id,
            created_at,
            backend,
            ..
        } = serde_json::from_str::<SessionEntry>(&lines.next()?).ok()?
        else {
            return None;
        };

        let message_count = lines
            .filter(|l| l.contains("\"type\":\"message\""))
            .count();

        Some(SessionInfo {
            id,
            created_at,
            backend,
            message_count,
        })
    }
}

/// Information about a saved transcript
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub id: String,
    pub created_at: i64,
    pub backend: String,
    pub message_count: usize,
}

impl SessionInfo {
    /// Format the created_at timestamp for display
    pub fn created_at_display(&self) -> String {
        use chrono::{TimeZone, Utc};
        Utc.timestamp_millis_opt(self.created_at)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_data_dir() -> PathBuf {
        std::env::temp_dir().join(format!("netfix-sessions-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_create_append_reopen() {
        let data_dir = temp_data_dir();
        let mut log = SessionLog::create(&data_dir, "local", "voice_user").unwrap();
        log.append(Role::User, "my wifi is dead").unwrap();
        log.append(Role::Bot, "Are you on a **phone** or a **computer**?").unwrap();
        let id = log.id().to_string();
        drop(log);

        let (mut log, messages) = SessionLog::open(&data_dir, &id).unwrap();
        assert_eq!(log.sender(), "voice_user");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], (Role::User, "my wifi is dead".to_string()));
        log.append(Role::User, "phone").unwrap();
        drop(log);

        let sessions = SessionLog::list(&data_dir).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, id);
        assert_eq!(sessions[0].backend, "local");
        assert_eq!(sessions[0].message_count, 3);
        let _ = fs::remove_dir_all(&data_dir);
    }

    #[test]
    fn test_open_missing_session() {
        let err = SessionLog::open(&temp_data_dir(), "nope").err().unwrap();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_created_at_display() {
        let info = SessionInfo {
            id: "x".into(),
            created_at: 0,
            backend: "local".into(),
            message_count: 0,
        };
        assert_eq!(info.created_at_display(), "1970-01-01 00:00");
    }
}
