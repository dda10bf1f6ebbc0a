//! Replays a recorded log of gyroscope and tag events through the estimator.
//!
//! Every row of the log is one event:
//! - `gyro` rows carry body angular rates and trigger a prediction,
//! - `tag` rows carry one range reading and are collected into a batch,
//! - `end` rows close the batch and trigger an update, or register a dropout
//!   if no tag was seen.
//!
//! Run with `RUST_LOG=debug cargo run --example replay` to see the filter's own logs.

use std::error::Error;

use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tag_ranging_ekf::{AngularRates, FilterConfig, SimulatedClock, StateEstimator, TagMeasurement};

const DATASET: &str = "demos/data/stationary-four-tags.csv";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum EventKind {
    Gyro,
    Tag,
    End,
}

/// One row of the log.
#[derive(Debug, Deserialize)]
struct Event {
    /// The event time, in seconds since the start of the recording.
    time: f64,
    kind: EventKind,
    #[serde(default)]
    omega_x: Option<f64>,
    #[serde(default)]
    omega_y: Option<f64>,
    #[serde(default)]
    omega_z: Option<f64>,
    #[serde(default)]
    range: Option<f64>,
    #[serde(default)]
    tag_x: Option<f64>,
    #[serde(default)]
    tag_y: Option<f64>,
    #[serde(default)]
    tag_z: Option<f64>,
}

impl Event {
    fn angular_rates(&self) -> Option<AngularRates<f64>> {
        Some(AngularRates::new(self.omega_x?, self.omega_y?, self.omega_z?))
    }

    fn tag(&self) -> Option<TagMeasurement<f64>> {
        Some(TagMeasurement::new(
            self.range?,
            self.tag_x?,
            self.tag_y?,
            self.tag_z?,
        ))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let events = read_csv(DATASET)?;
    info!(count = events.len(), "Loaded events from {DATASET}");

    let start = events.first().map(|event| event.time).unwrap_or_default();
    let mut estimator = StateEstimator::new(SimulatedClock::new(start), FilterConfig::default());
    let mut batch = Vec::new();

    for event in &events {
        estimator.clock_mut().set(event.time);

        match event.kind {
            EventKind::Gyro => match event.angular_rates() {
                Some(rates) => estimator.predict(&rates),
                None => warn!(time = event.time, "Skipping incomplete gyro row"),
            },
            EventKind::Tag => match event.tag() {
                Some(tag) => batch.push(tag),
                None => warn!(time = event.time, "Skipping incomplete tag row"),
            },
            EventKind::End => {
                if batch.is_empty() {
                    estimator.mark_no_measurement();
                } else {
                    let report = estimator.update(&batch)?;
                    let state = estimator.estimated_state();
                    info!(
                        time = event.time,
                        x = state.x,
                        y = state.y,
                        z = state.z,
                        speed = state.speed,
                        accepted = report.accepted_tags,
                        "Estimate"
                    );
                }
                batch.clear();
            }
        }
    }

    let state = estimator.estimated_state();
    info!(
        x = state.x,
        y = state.y,
        z = state.z,
        speed = state.speed,
        yaw = estimator.yaw(),
        "Final estimate"
    );

    Ok(())
}

fn read_csv(file_path: &str) -> Result<Vec<Event>, Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().from_path(file_path)?;
    let mut data = Vec::new();

    for result in rdr.deserialize() {
        let record: Event = result?;
        data.push(record);
    }

    Ok(data)
}
