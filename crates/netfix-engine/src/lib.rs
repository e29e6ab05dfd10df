//! netfix-engine: Wi-Fi troubleshooting dialogue engine
//!
//! This crate turns user-reported facts about a broken connection into one
//! troubleshooting instruction per turn, tracks the retry ladder, and decides
//! when the problem is solved or needs a human.

pub mod advice;
pub mod dialogue;
pub mod dns;
pub mod episode;
pub mod error;
pub mod events;
pub mod facts;
pub mod form;
pub mod interpret;
pub mod resolution;
pub mod router;
pub mod store;

pub use advice::{Advice, EpisodeState};
pub use dialogue::{Dialogue, EngineConfig, Intent, Turn, UserInput};
pub use episode::Episode;
pub use error::{Error, Result};
pub use events::DialogueEvent;
pub use facts::{DeviceType, Facts, Platform, Scope, Slot, SlotValue};
pub use resolution::{EscalationReason, Resolution};
pub use store::{EpisodeStore, MemoryStore};
