//! Virtual device implementations — dimmable light and humidity sensor.
//!
//! Each constructor returns a fully described [`Thing`](wothub_app::thing::Thing)
//! with fixed ids so they remain stable across restarts.

mod humidity;
mod light;

pub use humidity::{HUMIDITY_SENSOR_ID, humidity_sensor, read_humidity, run_sensor_updates};
pub use light::{LIGHT_ID, dimmable_light};
