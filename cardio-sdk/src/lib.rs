//! # cardio-sdk
//!
//! Vital-sign generators and output dispatchers for simulating streams of
//! patient readings.
//!
//! Generators own per-patient state and emit at most one reading per call.
//! Dispatchers deliver those readings through a channel: the console, one
//! file per label, a single TCP client, or every connected WebSocket client.
//! Delivery is fire-and-forget; no failure ever travels back to the caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use cardio_sdk::{
//!     AlertGenerator, ConsoleDispatcher, Generator, SaturationGenerator, SeededRandom,
//! };
//!
//! let random = Arc::new(SeededRandom::new(42));
//! let generators: Vec<Box<dyn Generator>> = vec![
//!     Box::new(AlertGenerator::with_random(3, random.clone())),
//!     Box::new(SaturationGenerator::with_random(3, random)),
//! ];
//! let console = ConsoleDispatcher::new();
//!
//! for patient_id in 1..=3 {
//!     for generator in &generators {
//!         generator.generate(patient_id, &console);
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! - `tokio` (default): the socket dispatchers, [`StreamSocketDispatcher`]
//!   and [`BroadcastSocketDispatcher`]

mod dispatch;
mod error;
mod generator;
mod random;

pub use dispatch::{CaptureDispatcher, ConsoleDispatcher, Dispatcher, FileDispatcher};
pub use error::{Error, Result};
pub use generator::{
    AlertGenerator, Generator, SaturationGenerator, ALERT_RATE, RESOLVE_PROBABILITY,
};
pub use random::{RandomSource, SeededRandom, ThreadRandom};

#[cfg(feature = "tokio")]
pub use dispatch::{BroadcastSocketDispatcher, StreamSocketDispatcher};

// Re-export types for convenience
pub use cardio_types::{labels, AlertState, PatientId, Reading};
