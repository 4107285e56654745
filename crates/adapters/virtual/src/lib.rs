//! # wothub-adapter-virtual
//!
//! Virtual/demo integration that provides simulated things for testing and
//! demonstration purposes.
//!
//! ## Provided things
//!
//! | Thing | Id | Behaviour |
//! |-------|----|-----------|
//! | My Lamp | `urn:dev:ops:my-lamp-1234` | `on`, `level` (0-100), `fade` action, `overheated` event |
//! | My Humidity Sensor | `urn:dev:ops:my-humidity-sensor-1234` | `on`, read-only `level` refreshed periodically |
//!
//! ## Dependency rule
//!
//! Depends on `wothub-app` (thing model) and `wothub-domain` only.

mod devices;

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use wothub_app::registry::ThingRegistry;
use wothub_app::thing::Thing;
use wothub_domain::error::ThingError;
use wothub_domain::event::EventRetention;

pub use devices::{HUMIDITY_SENSOR_ID, LIGHT_ID, read_humidity};

/// Tunables of the simulation.
#[derive(Debug, Clone, Copy)]
pub struct VirtualOptions {
    /// Delay between two humidity readings.
    pub sensor_interval: Duration,
    pub event_retention: EventRetention,
}

impl Default for VirtualOptions {
    fn default() -> Self {
        Self {
            sensor_interval: Duration::from_secs(3),
            event_retention: EventRetention::default(),
        }
    }
}

/// Virtual integration owning the simulated things and their background
/// tasks.
pub struct VirtualIntegration {
    light: Thing,
    sensor: Thing,
    options: VirtualOptions,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl VirtualIntegration {
    /// Create the things. Nothing runs until [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns a validation error if a thing fails to build.
    pub fn new(options: VirtualOptions) -> Result<Self, ThingError> {
        Ok(Self {
            light: devices::dimmable_light(options.event_retention)?,
            sensor: devices::humidity_sensor(options.event_retention)?,
            options,
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        "virtual"
    }

    #[must_use]
    pub fn light(&self) -> &Thing {
        &self.light
    }

    #[must_use]
    pub fn sensor(&self) -> &Thing {
        &self.sensor
    }

    /// Both things under one collection title.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `title` is empty.
    pub fn registry(&self, title: impl Into<String>) -> Result<ThingRegistry, ThingError> {
        ThingRegistry::multiple(title, [self.light.clone(), self.sensor.clone()])
    }

    /// Spawn the sensor update loop on the current tokio runtime.
    ///
    /// Calling it again while the loop runs does nothing.
    pub fn start(&mut self) {
        if !self.tasks.is_empty() {
            return;
        }
        tracing::info!(
            integration = self.name(),
            interval = ?self.options.sensor_interval,
            "starting background tasks"
        );
        self.tasks.push(tokio::spawn(devices::run_sensor_updates(
            self.sensor.clone(),
            self.options.sensor_interval,
            self.cancel.child_token(),
        )));
    }

    /// Stop the background tasks and wait for them to finish.
    pub async fn teardown(&mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            if let Err(err) = task.await {
                tracing::warn!(integration = "virtual", error = %err, "background task failed");
            }
        }
        tracing::info!(integration = "virtual", "stopped");
    }
}
