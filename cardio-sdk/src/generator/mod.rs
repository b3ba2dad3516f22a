//! Per-patient reading generators.
//!
//! A [`Generator`] owns one piece of state per patient and, on each call,
//! advances that patient's state and emits at most one reading through the
//! dispatcher it is handed.

mod alert;
mod saturation;

pub use alert::{AlertGenerator, ALERT_RATE, RESOLVE_PROBABILITY};
pub use saturation::SaturationGenerator;

use std::fmt::Debug;

use cardio_types::PatientId;

use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};

/// Produces readings for patients, one tick at a time.
///
/// Calls for different patients may run concurrently on the same instance.
/// Calls for the same patient are expected to be serialized by the caller.
pub trait Generator: Send + Sync + Debug {
    /// Advance `patient_id` by one tick and emit any resulting reading.
    ///
    /// Invalid patient IDs are logged and otherwise ignored.
    fn generate(&self, patient_id: PatientId, dispatcher: &dyn Dispatcher);

    /// Label of the readings this generator emits.
    fn label(&self) -> &'static str;
}

/// Fixed-size per-patient state, indexed by 1-based patient ID.
///
/// Never resized after construction.
#[derive(Debug)]
pub(crate) struct PatientSlots<T> {
    slots: Box<[T]>,
}

impl<T> PatientSlots<T> {
    /// Build `patient_count` slots, calling `init` with each patient ID.
    pub(crate) fn new(patient_count: u32, init: impl FnMut(PatientId) -> T) -> Self {
        Self {
            slots: (1..=patient_count).map(init).collect(),
        }
    }

    /// Number of patients covered.
    pub(crate) fn patient_count(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Slot for `patient_id`, or an out-of-range error.
    pub(crate) fn get(&self, patient_id: PatientId) -> Result<&T> {
        patient_id
            .checked_sub(1)
            .and_then(|index| self.slots.get(index as usize))
            .ok_or(Error::PatientOutOfRange {
                patient_id,
                patient_count: self.patient_count(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_one_based() {
        let slots = PatientSlots::new(3, |id| id * 10);

        assert_eq!(*slots.get(1).unwrap(), 10);
        assert_eq!(*slots.get(3).unwrap(), 30);
        assert_eq!(slots.patient_count(), 3);
    }

    #[test]
    fn zero_and_past_end_are_out_of_range() {
        let slots = PatientSlots::new(3, |_| ());

        assert!(matches!(
            slots.get(0),
            Err(Error::PatientOutOfRange {
                patient_id: 0,
                patient_count: 3
            })
        ));
        assert!(matches!(
            slots.get(4),
            Err(Error::PatientOutOfRange { patient_id: 4, .. })
        ));
    }

    #[test]
    fn empty_slots_reject_everything() {
        let slots = PatientSlots::new(0, |_| ());
        assert!(slots.get(1).is_err());
    }
}
