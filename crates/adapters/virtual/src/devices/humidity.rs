//! Virtual humidity sensor — a read-only `level` fed by a polling task.

use std::time::Duration;

use rand::Rng;
use serde_json::json;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use wothub_app::property::Property;
use wothub_app::thing::Thing;
use wothub_app::value::Value;
use wothub_domain::error::ThingError;
use wothub_domain::event::EventRetention;
use wothub_domain::property::PropertyMetadata;
use wothub_domain::schema::{DataSchema, NumericSchema};

pub const HUMIDITY_SENSOR_ID: &str = "urn:dev:ops:my-humidity-sensor-1234";

/// Build the sensor.
///
/// # Errors
///
/// Returns a validation error if the builder fails (should not happen
/// with hardcoded inputs).
pub fn humidity_sensor(retention: EventRetention) -> Result<Thing, ThingError> {
    Thing::builder(HUMIDITY_SENSOR_ID, "My Humidity Sensor")
        .semantic_type("MultiLevelSensor")
        .description("A web connected humidity sensor")
        .property(Property::new(
            "on",
            Value::new(true),
            PropertyMetadata::new(DataSchema::Boolean)
                .title("On/Off")
                .description("Whether the sensor is on")
                .semantic_type("OnOffProperty"),
        ))
        .property(Property::new(
            "level",
            Value::new(0.0),
            PropertyMetadata::new(DataSchema::Number(NumericSchema::default().unit("percent")))
                .title("Humidity")
                .description("The current humidity in %")
                .semantic_type("LevelProperty")
                .read_only(),
        ))
        .event_retention(retention)
        .build()
}

/// Mimic a sensor on a GPIO pin: a noisy reading around zero.
#[must_use]
pub fn read_humidity() -> f64 {
    let mut rng = rand::thread_rng();
    70.0 * rng.r#gen::<f64>() * (-0.5 + rng.r#gen::<f64>())
}

/// Push a fresh reading into the sensor's `level` every `interval` until
/// `cancel` fires.
pub async fn run_sensor_updates(thing: Thing, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::debug!(thing = thing.id(), ?interval, "starting sensor update loop");

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let reading = read_humidity();
                match thing.update_property("level", json!(reading)) {
                    Ok(changed) => {
                        tracing::trace!(thing = thing.id(), reading, changed, "sensor reading");
                    }
                    Err(err) => {
                        tracing::warn!(thing = thing.id(), error = %err, "rejected sensor reading");
                    }
                }
            }
        }
    }

    tracing::debug!(thing = thing.id(), "sensor update loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use wothub_app::channel_subscriber::ChannelSubscriber;

    #[test]
    fn should_keep_reading_within_plausible_range() {
        for _ in 0..100 {
            let reading = read_humidity();
            assert!((-35.0..=35.0).contains(&reading));
        }
    }

    #[test]
    fn should_refuse_client_write_on_level() {
        let sensor = humidity_sensor(EventRetention::default()).unwrap();
        assert!(matches!(
            sensor.set_property_value("level", json!(12.0)),
            Err(ThingError::ReadOnly { .. })
        ));
    }

    #[tokio::test]
    async fn should_publish_readings_until_cancelled() {
        let sensor = humidity_sensor(EventRetention::default()).unwrap();
        let (subscriber, mut rx) = ChannelSubscriber::new(64);
        sensor.subscribe(subscriber);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_sensor_updates(
            sensor.clone(),
            Duration::from_millis(5),
            cancel.clone(),
        ));
        let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        cancel.cancel();
        task.await.unwrap();

        assert_eq!(first.thing_id(), HUMIDITY_SENSOR_ID);
    }
}
