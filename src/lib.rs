//! # cardio-sim
//!
//! Simulated patient vital-sign streams for exercising monitoring tooling.
//!
//! The simulator ticks a set of generators (alerts and oxygen saturation by
//! default) for every patient and delivers each reading through a single
//! dispatcher: the console, one file per label, a TCP client, or every
//! connected WebSocket client.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐  tick   ┌────────────┐ output  ┌────────────┐
//! │ Simulator │────────▶│ Generators │────────▶│ Dispatcher │───▶ console / files / sockets
//! └───────────┘         └────────────┘         └────────────┘
//!       ▲
//!       │ SimulatorConfig (defaults ◀ TOML + CARDIO_* env ◀ CLI flags)
//! ```
//!
//! - **[`simulator`]**: the driver, synchronous [`Simulator::tick`] or one
//!   tokio task per patient with [`Simulator::start`]
//! - **[`config`]**: layered settings and the command-line arguments
//! - **[`output`]**: the `console`, `file:<dir>`, `tcp:<port>` and
//!   `websocket:<port>` output specs
//!
//! Generators and dispatchers live in `cardio-sdk`; the reading model and
//! wire formats live in `cardio-types`.
//!
//! ## Usage
//!
//! ```bash
//! # 50 patients, one tick per second, printed to stdout
//! cardio-sim
//!
//! # 10 patients streamed to the first TCP client on port 9000
//! cardio-sim --patient-count 10 --output tcp:9000
//!
//! # Reproducible run written to ./readings/Alert.txt and ./readings/Saturation.txt
//! cardio-sim --seed 42 --output file:./readings
//! ```

pub mod config;
mod duration;
pub mod output;
pub mod simulator;

pub use config::{Args, SimulatorConfig};
pub use duration::parse_duration;
pub use output::OutputSpec;
pub use simulator::{SimulationHandle, Simulator, SimulatorBuilder, MIN_INTERVAL};
