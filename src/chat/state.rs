//! Shared chat state.
//!
//! [`ChatState`] is the single source of truth for the UI: the message log,
//! the active configuration and the last error.  [`SharedChat`] is
//! `Arc<Mutex<ChatState>>` — cheap to clone and safe to share across threads.

use std::sync::{Arc, Mutex};

use crate::config::AppConfig;

use super::message::{Direction, Message};

/// Shared chat state — read by the UI, mutated by the orchestrator.
#[derive(Debug)]
pub struct ChatState {
    /// Conversation in arrival order.
    pub messages: Vec<Message>,

    /// Current configuration.  The orchestrator reads the callsign and
    /// keying settings from here on every send.
    pub config: AppConfig,

    /// Most recent error, cleared by the next successful send.
    pub last_error: Option<String>,

    next_id: u64,
}

impl ChatState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            messages: Vec::new(),
            config,
            last_error: None,
            next_id: 1,
        }
    }

    /// Append a message and return its id.
    pub fn push(&mut self, text: impl Into<String>, direction: Direction, snr_db: i32) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message::new(id, text, direction, snr_db));
        id
    }

    pub fn message(&self, id: u64) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Flag whether message `id` is still being keyed.
    pub fn set_transmitting(&mut self, id: u64, transmitting: bool) {
        if let Some(msg) = self.messages.iter_mut().find(|m| m.id == id) {
            msg.transmitting = transmitting;
        }
    }

    /// The message currently on air, if any.
    pub fn on_air(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.transmitting)
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

/// Thread-safe handle to [`ChatState`].
///
/// Lock for a short critical section; do **not** hold the lock across
/// `.await` points.
pub type SharedChat = Arc<Mutex<ChatState>>;

/// Construct a new [`SharedChat`] wrapping an empty [`ChatState`].
pub fn new_shared_chat(config: AppConfig) -> SharedChat {
    Arc::new(Mutex::new(ChatState::new(config)))
}
