//! Alert generator: a two-state trigger/resolve machine per patient.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cardio_types::{current_timestamp_ms, labels, AlertState, PatientId};
use tracing::warn;

use super::{Generator, PatientSlots};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::random::{RandomSource, ThreadRandom};

/// Mean alert arrivals per tick while resolved.
pub const ALERT_RATE: f64 = 0.1;

/// Chance per tick that an active alert resolves.
pub const RESOLVE_PROBABILITY: f64 = 0.9;

/// Simulates patient alerts that are triggered and later resolved.
///
/// Each patient starts `Resolved`. Every call performs one Bernoulli trial:
///
/// - while resolved, an alert triggers with probability `1 - e^-λ`
///   (`λ` = [`ALERT_RATE`]), the chance of at least one Poisson arrival
///   in the tick, and emits `Alert` / `triggered`;
/// - while active, the alert resolves with probability
///   [`RESOLVE_PROBABILITY`] and emits `Alert` / `resolved`.
///
/// A call that does not change state emits nothing.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use cardio_sdk::{AlertGenerator, CaptureDispatcher, Generator, SeededRandom};
///
/// let alerts = AlertGenerator::with_random(5, Arc::new(SeededRandom::new(1)));
/// let capture = CaptureDispatcher::new();
///
/// for _ in 0..100 {
///     alerts.generate(3, &capture);
/// }
/// assert!(capture.readings().iter().all(|r| r.patient_id == 3));
/// ```
#[derive(Debug)]
pub struct AlertGenerator {
    /// `true` while a patient's alert is active
    states: PatientSlots<AtomicBool>,
    random: Arc<dyn RandomSource>,
}

impl AlertGenerator {
    /// Create a generator for patients `1..=patient_count` using thread-local randomness.
    pub fn new(patient_count: u32) -> Self {
        Self::with_random(patient_count, Arc::new(ThreadRandom::new()))
    }

    /// Create a generator drawing from the given random source.
    pub fn with_random(patient_count: u32, random: Arc<dyn RandomSource>) -> Self {
        Self {
            states: PatientSlots::new(patient_count, |_| AtomicBool::new(false)),
            random,
        }
    }

    /// Probability that a resolved patient triggers an alert on one tick.
    pub fn trigger_probability() -> f64 {
        -(-ALERT_RATE).exp_m1()
    }

    /// Current state of a patient, or `None` for an invalid ID.
    pub fn state(&self, patient_id: PatientId) -> Option<AlertState> {
        self.states
            .get(patient_id)
            .ok()
            .map(|slot| AlertState::from(slot.load(Ordering::Relaxed)))
    }

    /// Number of patients this generator covers.
    pub fn patient_count(&self) -> u32 {
        self.states.patient_count()
    }

    fn try_generate(&self, patient_id: PatientId, dispatcher: &dyn Dispatcher) -> Result<()> {
        let slot = self.states.get(patient_id)?;
        let current = AlertState::from(slot.load(Ordering::Relaxed));

        let threshold = match current {
            AlertState::Resolved => Self::trigger_probability(),
            AlertState::Active => RESOLVE_PROBABILITY,
        };

        if self.random.next_f64() < threshold {
            let next = current.flipped();
            slot.store(next.is_active(), Ordering::Relaxed);
            dispatcher.output(
                patient_id,
                current_timestamp_ms(),
                labels::ALERT,
                next.transition_data(),
            );
        }

        Ok(())
    }
}

impl Generator for AlertGenerator {
    fn generate(&self, patient_id: PatientId, dispatcher: &dyn Dispatcher) {
        if let Err(e) = self.try_generate(patient_id, dispatcher) {
            warn!(error = %e, "alert generation abandoned");
        }
    }

    fn label(&self) -> &'static str {
        labels::ALERT
    }
}
