//! Transmission engine — schedules Morse elements onto an audio output with
//! cooperative cancellation and a single-fire completion per job.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use morse_messenger::audio::CpalOutput;
//! use morse_messenger::transmit::{JobOutcome, Transmitter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tx = Transmitter::new(Arc::new(CpalOutput::default()));
//!     let handle = tx.transmit("SOS", 15.0, 650.0).unwrap();
//!
//!     // From the UI: tx.stop(&handle) or handle.cancel()
//!     match handle.wait().await {
//!         JobOutcome::Completed => println!("sent"),
//!         JobOutcome::Cancelled => println!("stopped"),
//!         JobOutcome::Failed(e) => eprintln!("{e}"),
//!     }
//! }
//! ```

pub mod job;
pub mod schedule;
pub mod transmitter;

pub use job::{CancelToken, JobHandle, JobOutcome, JobState, Progress};
pub use schedule::{Element, Interval, Keying, Schedule};
pub use transmitter::{TransmitError, Transmitter};
