//! Blood oxygen saturation generator: a clamped random walk per patient.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use cardio_types::{
    current_timestamp_ms, format_saturation, labels, PatientId, SATURATION_INITIAL_MAX,
    SATURATION_INITIAL_MIN, SATURATION_MAX, SATURATION_MIN,
};
use tracing::warn;

use super::{Generator, PatientSlots};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::random::{RandomSource, ThreadRandom};

/// Simulates blood oxygen saturation.
///
/// Each patient starts at a uniform value in 95..=100. Every call moves the
/// value by -1, 0 or +1 (uniformly), clamps it to 90..=100 and emits it as
/// `Saturation` / `"<value>%"`.
#[derive(Debug)]
pub struct SaturationGenerator {
    levels: PatientSlots<AtomicU8>,
    random: Arc<dyn RandomSource>,
}

impl SaturationGenerator {
    /// Create a generator for patients `1..=patient_count` using thread-local randomness.
    pub fn new(patient_count: u32) -> Self {
        Self::with_random(patient_count, Arc::new(ThreadRandom::new()))
    }

    /// Create a generator drawing from the given random source.
    ///
    /// Initial levels are drawn from `random` here, in patient order.
    pub fn with_random(patient_count: u32, random: Arc<dyn RandomSource>) -> Self {
        let span = u32::from(SATURATION_INITIAL_MAX - SATURATION_INITIAL_MIN) + 1;
        let levels = PatientSlots::new(patient_count, |_| {
            AtomicU8::new(SATURATION_INITIAL_MIN + random.next_below(span) as u8)
        });
        Self { levels, random }
    }

    /// Last value emitted (or the initial value), or `None` for an invalid ID.
    pub fn level(&self, patient_id: PatientId) -> Option<u8> {
        self.levels
            .get(patient_id)
            .ok()
            .map(|slot| slot.load(Ordering::Relaxed))
    }

    /// Number of patients this generator covers.
    pub fn patient_count(&self) -> u32 {
        self.levels.patient_count()
    }

    fn try_generate(&self, patient_id: PatientId, dispatcher: &dyn Dispatcher) -> Result<()> {
        let slot = self.levels.get(patient_id)?;

        let step = self.random.next_below(3) as i16 - 1;
        let next = (i16::from(slot.load(Ordering::Relaxed)) + step)
            .clamp(i16::from(SATURATION_MIN), i16::from(SATURATION_MAX)) as u8;
        slot.store(next, Ordering::Relaxed);

        dispatcher.output(
            patient_id,
            current_timestamp_ms(),
            labels::SATURATION,
            &format_saturation(next),
        );
        Ok(())
    }
}

impl Generator for SaturationGenerator {
    fn generate(&self, patient_id: PatientId, dispatcher: &dyn Dispatcher) {
        if let Err(e) = self.try_generate(patient_id, dispatcher) {
            warn!(error = %e, "saturation generation abandoned");
        }
    }

    fn label(&self) -> &'static str {
        labels::SATURATION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::CaptureDispatcher;
    use crate::random::SeededRandom;

    /// Always steps the same way.
    #[derive(Debug)]
    struct FixedStep(u32);

    impl RandomSource for FixedStep {
        fn next_f64(&self) -> f64 {
            0.0
        }

        fn next_below(&self, bound: u32) -> u32 {
            self.0.min(bound - 1)
        }
    }

    fn parse(data: &str) -> u8 {
        data.strip_suffix('%').unwrap().parse().unwrap()
    }

    #[test]
    fn initial_levels_in_range() {
        let sat = SaturationGenerator::with_random(200, Arc::new(SeededRandom::new(1)));
        for id in 1..=200 {
            let level = sat.level(id).unwrap();
            assert!((95..=100).contains(&level), "patient {} at {}", id, level);
        }
    }

    #[test]
    fn emits_percentage_without_decimal() {
        let sat = SaturationGenerator::with_random(1, Arc::new(SeededRandom::new(3)));
        let capture = CaptureDispatcher::new();

        sat.generate(1, &capture);

        let readings = capture.readings();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].label, "Saturation");
        assert!(readings[0].data.ends_with('%'));
        assert!(!readings[0].data.contains('.'));
        assert_eq!(parse(&readings[0].data), sat.level(1).unwrap());
    }

    #[test]
    fn always_within_bounds() {
        let sat = SaturationGenerator::with_random(3, Arc::new(SeededRandom::new(77)));
        let capture = CaptureDispatcher::new();

        for _ in 0..5000 {
            for id in 1..=3 {
                sat.generate(id, &capture);
            }
        }

        assert_eq!(capture.len(), 15_000);
        for reading in capture.readings() {
            let value = parse(&reading.data);
            assert!((90..=100).contains(&value), "out of range: {}", value);
        }
    }

    #[test]
    fn steps_by_at_most_one() {
        let sat = SaturationGenerator::with_random(1, Arc::new(SeededRandom::new(8)));
        let capture = CaptureDispatcher::new();
        let mut previous = sat.level(1).unwrap();

        for _ in 0..500 {
            sat.generate(1, &capture);
            let current = sat.level(1).unwrap();
            assert!((i16::from(current) - i16::from(previous)).abs() <= 1);
            previous = current;
        }
    }

    #[test]
    fn clamps_at_floor() {
        // next_below(6) -> 0 gives an initial 95; next_below(3) -> 0 steps down
        let sat = SaturationGenerator::with_random(1, Arc::new(FixedStep(0)));
        let capture = CaptureDispatcher::new();
        assert_eq!(sat.level(1), Some(95));

        for _ in 0..20 {
            sat.generate(1, &capture);
        }

        assert_eq!(sat.level(1), Some(90));
        let last = capture.readings().pop().unwrap();
        assert_eq!(last.data, "90%");
    }

    #[test]
    fn clamps_at_ceiling() {
        // Large draws: initial 100, every step +1
        let sat = SaturationGenerator::with_random(1, Arc::new(FixedStep(u32::MAX)));
        let capture = CaptureDispatcher::new();
        assert_eq!(sat.level(1), Some(100));

        for _ in 0..5 {
            sat.generate(1, &capture);
        }

        assert_eq!(sat.level(1), Some(100));
        assert_eq!(capture.count_where("Saturation", "100%"), 5);
    }

    #[test]
    fn invalid_patient_is_swallowed() {
        let sat = SaturationGenerator::new(2);
        let capture = CaptureDispatcher::new();

        sat.generate(0, &capture);
        sat.generate(3, &capture);

        assert!(capture.is_empty());
        assert_eq!(sat.level(3), None);
        assert_eq!(sat.patient_count(), 2);
    }
}
