//! The driver that ticks generators for every patient.

use std::sync::Arc;
use std::time::Duration;

use cardio_sdk::{
    AlertGenerator, ConsoleDispatcher, Dispatcher, Generator, PatientId, RandomSource,
    SaturationGenerator, ThreadRandom,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Shortest tick period; `tokio::time::interval` rejects zero.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Runs generators for a fixed set of patients on a fixed cadence.
///
/// Each tick calls every generator once per patient. In the background
/// mode started by [`Simulator::start`], each patient gets its own task,
/// so calls for one patient are serialized while different patients run
/// in parallel.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use cardio_sdk::{CaptureDispatcher, SeededRandom};
/// use cardio_sim::Simulator;
///
/// let capture = Arc::new(CaptureDispatcher::new());
/// let simulator = Simulator::builder()
///     .patient_count(4)
///     .random(Arc::new(SeededRandom::new(7)))
///     .dispatcher(capture.clone())
///     .build();
///
/// simulator.tick();
///
/// // Saturation emits on every tick, alerts only on transitions
/// assert!(capture.len() >= 4);
/// ```
#[derive(Debug)]
pub struct Simulator {
    generators: Arc<Vec<Arc<dyn Generator>>>,
    dispatcher: Arc<dyn Dispatcher>,
    random: Arc<dyn RandomSource>,
    patient_count: u32,
    interval: Duration,
}

impl Simulator {
    /// Create a builder for configuring the simulator.
    pub fn builder() -> SimulatorBuilder {
        SimulatorBuilder::new()
    }

    /// Number of simulated patients.
    pub fn patient_count(&self) -> u32 {
        self.patient_count
    }

    /// Time between ticks in background mode.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Generators run on every tick.
    pub fn generators(&self) -> &[Arc<dyn Generator>] {
        &self.generators
    }

    /// All patient IDs in a freshly shuffled order.
    pub fn patient_order(&self) -> Vec<PatientId> {
        let mut ids: Vec<PatientId> = (1..=self.patient_count).collect();
        // Fisher-Yates
        for i in (1..ids.len()).rev() {
            let j = self.random.next_below(i as u32 + 1) as usize;
            ids.swap(i, j);
        }
        ids
    }

    /// Run one tick for every patient, synchronously.
    pub fn tick(&self) {
        for patient_id in self.patient_order() {
            for generator in self.generators.iter() {
                generator.generate(patient_id, self.dispatcher.as_ref());
            }
        }
    }

    /// Start one background task per patient.
    ///
    /// Must be called from within a tokio runtime. Returns a handle that
    /// stops the tasks when told to, or when dropped.
    pub fn start(&self) -> SimulationHandle {
        let (stop_tx, stop_rx) = watch::channel(false);

        let tasks = self
            .patient_order()
            .into_iter()
            .map(|patient_id| {
                let generators = self.generators.clone();
                let dispatcher = self.dispatcher.clone();
                let mut stop_rx = stop_rx.clone();
                let interval = self.interval;

                tokio::spawn(async move {
                    let mut interval_timer = tokio::time::interval(interval);

                    loop {
                        tokio::select! {
                            _ = interval_timer.tick() => {
                                for generator in generators.iter() {
                                    generator.generate(patient_id, dispatcher.as_ref());
                                }
                            }
                            changed = stop_rx.changed() => {
                                if changed.is_err() || *stop_rx.borrow() {
                                    break;
                                }
                            }
                        }
                    }
                })
            })
            .collect();

        info!(
            patients = self.patient_count,
            generators = self.generators.len(),
            interval = ?self.interval,
            "Simulation started"
        );

        SimulationHandle { stop_tx, tasks }
    }
}

/// Builder for configuring a [`Simulator`].
#[derive(Debug, Default)]
pub struct SimulatorBuilder {
    generators: Vec<Arc<dyn Generator>>,
    dispatcher: Option<Arc<dyn Dispatcher>>,
    random: Option<Arc<dyn RandomSource>>,
    patient_count: Option<u32>,
    interval: Option<Duration>,
}

impl SimulatorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of patients. Defaults to 50.
    pub fn patient_count(mut self, count: u32) -> Self {
        self.patient_count = Some(count);
        self
    }

    /// Tick interval for background mode. Defaults to 1 second.
    ///
    /// Intervals shorter than [`MIN_INTERVAL`] are raised to it.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Where readings go. Defaults to the console.
    pub fn dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Random source for patient ordering and the default generators.
    ///
    /// Defaults to thread-local randomness.
    pub fn random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = Some(random);
        self
    }

    /// Add a generator.
    ///
    /// If none are added, an alert and a saturation generator are used.
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generators.push(generator);
        self
    }

    /// Build the simulator.
    pub fn build(self) -> Simulator {
        let patient_count = self.patient_count.unwrap_or(50);
        let random = self
            .random
            .unwrap_or_else(|| Arc::new(ThreadRandom::new()));

        let generators = if self.generators.is_empty() {
            vec![
                Arc::new(AlertGenerator::with_random(patient_count, random.clone()))
                    as Arc<dyn Generator>,
                Arc::new(SaturationGenerator::with_random(patient_count, random.clone())),
            ]
        } else {
            self.generators
        };

        let mut interval = self.interval.unwrap_or(Duration::from_secs(1));
        if interval < MIN_INTERVAL {
            warn!(requested = ?interval, "interval too short, using {:?}", MIN_INTERVAL);
            interval = MIN_INTERVAL;
        }

        Simulator {
            generators: Arc::new(generators),
            dispatcher: self
                .dispatcher
                .unwrap_or_else(|| Arc::new(ConsoleDispatcher::new())),
            random,
            patient_count,
            interval,
        }
    }
}

/// Handle for controlling a running simulation.
///
/// Drop this handle to stop the simulation, or call `stop()` explicitly.
#[derive(Debug)]
pub struct SimulationHandle {
    stop_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SimulationHandle {
    /// Signal every patient task to stop.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Stop and wait for every patient task to finish.
    pub async fn shutdown(self) {
        self.stop();
        for task in self.tasks {
            let _ = task.await;
        }
        info!("Simulation stopped");
    }

    /// Number of patient tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}
