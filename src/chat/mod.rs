//! Chat layer — message log, simulated incoming traffic and the command loop
//! that keys outgoing messages.
//!
//! # Architecture
//!
//! ```text
//! ChatCommand (mpsc)
//!        │
//!        ▼
//! ChatOrchestrator::run()  ← async tokio task
//!        │
//!        ├─ Send     → Transmitter::transmit → watcher task awaits JobHandle
//!        ├─ Receive  → simulated message with SNR
//!        ├─ Stop     → Transmitter::stop_current
//!        └─ UpdateKeying
//!
//! SharedChat (Arc<Mutex<ChatState>>) ←─── read by the front end
//! ```

pub mod message;
pub mod runner;
pub mod state;

pub use message::{simulated_snr, Direction, Message, SNR_RANGE_DB};
pub use runner::{ChatCommand, ChatError, ChatOrchestrator};
pub use state::{new_shared_chat, ChatState, SharedChat};
