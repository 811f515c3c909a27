//! Chat orchestrator — turns UI commands into transmissions and log entries.
//!
//! # Flow
//!
//! ```text
//! ChatCommand::Send(text)
//!   └─▶ sanitize → callsign check → Transmitter::transmit
//!         ├─ suppressed → ChatError::Busy (nothing logged)
//!         └─ accepted   → push Sent message (transmitting = true)
//!                           └─ watcher task: handle.wait() → transmitting = false
//!
//! ChatCommand::Receive(text)  → push Received message with a random SNR
//! ChatCommand::Stop           → Transmitter::stop_current
//! ChatCommand::UpdateKeying   → validate, store in config, save
//! ChatCommand::UpdateStation  → validate callsign, store in config, save
//! ```

use std::path::PathBuf;
use std::sync::{Arc, MutexGuard};

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::callsign::is_valid_callsign;
use crate::config::KeyingConfig;
use crate::morse::sanitize;
use crate::transmit::{JobOutcome, TransmitError, Transmitter};

use super::message::{simulated_snr, Direction};
use super::state::{ChatState, SharedChat};

// ---------------------------------------------------------------------------
// ChatCommand
// ---------------------------------------------------------------------------

/// Requests from the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Key a message from this station.
    Send(String),
    /// Log a simulated incoming message.
    Receive(String),
    /// Stop the transmission on air.
    Stop,
    /// Change rate and pitch for later sends.
    UpdateKeying { wpm: f64, tone_hz: f64 },
    /// Change this station's callsign.
    UpdateStation { callsign: String },
}

// ---------------------------------------------------------------------------
// ChatError
// ---------------------------------------------------------------------------

/// Reasons a command was refused.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("nothing to send")]
    EmptyMessage,

    #[error("a valid callsign is required to transmit")]
    NoCallsign,

    #[error("{0:?} is not a valid callsign")]
    InvalidCallsign(String),

    #[error("still transmitting the previous message")]
    Busy,

    #[error(transparent)]
    Transmit(#[from] TransmitError),
}

// ---------------------------------------------------------------------------
// ChatOrchestrator
// ---------------------------------------------------------------------------

/// Drives the chat log from a command channel.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use morse_messenger::audio::CpalOutput;
/// use morse_messenger::chat::{new_shared_chat, ChatCommand, ChatOrchestrator};
/// use morse_messenger::config::AppConfig;
/// use morse_messenger::transmit::Transmitter;
///
/// # async fn example() {
/// let chat = new_shared_chat(AppConfig::default());
/// let tx = Arc::new(Transmitter::new(Arc::new(CpalOutput::default())));
/// let (command_tx, command_rx) = tokio::sync::mpsc::channel(16);
///
/// tokio::spawn(ChatOrchestrator::new(chat.clone(), tx).run(command_rx));
/// command_tx.send(ChatCommand::Send("CQ DE W2ASM".into())).await.unwrap();
/// # }
/// ```
pub struct ChatOrchestrator {
    state: SharedChat,
    transmitter: Arc<Transmitter>,
    watchers: JoinSet<()>,
    settings_path: Option<PathBuf>,
}

impl ChatOrchestrator {
    pub fn new(state: SharedChat, transmitter: Arc<Transmitter>) -> Self {
        Self {
            state,
            transmitter,
            watchers: JoinSet::new(),
            settings_path: None,
        }
    }

    /// Save the configuration to `path` whenever a settings command changes it.
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// Process commands until `command_rx` closes, then wait for every
    /// transmission already on air to finish.
    pub async fn run(mut self, mut command_rx: mpsc::Receiver<ChatCommand>) {
        while let Some(command) = command_rx.recv().await {
            let result = match command {
                ChatCommand::Send(text) => self.handle_send(&text).map(|_| ()),
                ChatCommand::Receive(text) => {
                    self.handle_receive(&text);
                    Ok(())
                }
                ChatCommand::Stop => {
                    self.transmitter.stop_current();
                    Ok(())
                }
                ChatCommand::UpdateKeying { wpm, tone_hz } => {
                    self.handle_update_keying(KeyingConfig { wpm, tone_hz })
                }
                ChatCommand::UpdateStation { callsign } => self.handle_update_station(&callsign),
            };
            if let Err(e) = result {
                self.set_error(e.to_string());
            }

            // Reap finished watchers so the set does not grow unbounded.
            while self.watchers.try_join_next().is_some() {}
        }

        log::info!("chat: command channel closed, waiting for transmissions to finish");
        while self.watchers.join_next().await.is_some() {}
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    fn handle_send(&mut self, raw: &str) -> Result<u64, ChatError> {
        let text = sanitize(raw).trim().to_string();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let keying = {
            let st = self.lock();
            if !st.config.station.has_valid_callsign() {
                return Err(ChatError::NoCallsign);
            }
            st.config.keying.clone()
        };

        let handle = self
            .transmitter
            .transmit(&text, keying.wpm, keying.tone_hz)?;
        if handle.was_suppressed() {
            return Err(ChatError::Busy);
        }

        let id = {
            let mut st = self.lock();
            let id = st.push(text, Direction::Sent, simulated_snr(&mut rand::thread_rng()));
            st.set_transmitting(id, true);
            st.last_error = None;
            id
        };
        log::debug!("chat: message {id} on air as job {}", handle.id());

        let state = Arc::clone(&self.state);
        self.watchers.spawn(async move {
            let outcome = handle.wait().await;
            let mut st = state.lock().unwrap_or_else(|p| p.into_inner());
            st.set_transmitting(id, false);
            if let JobOutcome::Failed(e) = outcome {
                st.last_error = Some(e.to_string());
            }
        });

        Ok(id)
    }

    fn handle_receive(&mut self, raw: &str) {
        let text = sanitize(raw).trim().to_string();
        if text.is_empty() {
            return;
        }
        let snr = simulated_snr(&mut rand::thread_rng());
        let id = self.lock().push(text, Direction::Received, snr);
        log::debug!("chat: received message {id} at {snr} dB");
    }

    fn handle_update_keying(&mut self, keying: KeyingConfig) -> Result<(), ChatError> {
        keying.validate()?;
        log::info!("chat: keying set to {} wpm, {} Hz", keying.wpm, keying.tone_hz);
        self.lock().config.keying = keying;
        self.persist();
        Ok(())
    }

    fn handle_update_station(&mut self, raw: &str) -> Result<(), ChatError> {
        let callsign = raw.trim().to_uppercase();
        if !is_valid_callsign(&callsign) {
            return Err(ChatError::InvalidCallsign(raw.trim().to_string()));
        }
        log::info!("chat: station callsign set to {callsign}");
        self.lock().config.station.callsign = callsign;
        self.persist();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Write the current configuration out.  A failed save is logged and
    /// the in-memory change kept.
    fn persist(&self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        let config = self.lock().config.clone();
        match config.save_to(path) {
            Ok(()) => log::debug!("chat: settings saved to {}", path.display()),
            Err(e) => log::warn!("chat: failed to save settings to {}: {e:#}", path.display()),
        }
    }

    fn set_error(&self, message: String) {
        log::warn!("chat: {message}");
        self.lock().last_error = Some(message);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
