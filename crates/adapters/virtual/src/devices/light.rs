//! Virtual dimmable light — `on`/`level` properties, a `fade` action and an
//! `overheated` event.

use std::time::Duration;

use serde_json::{Value as JsonValue, json};
use wothub_app::action::ActionContext;
use wothub_app::property::Property;
use wothub_app::thing::Thing;
use wothub_app::value::Value;
use wothub_domain::action::ActionMetadata;
use wothub_domain::error::{ExecutionError, ThingError};
use wothub_domain::event::{EventMetadata, EventRetention};
use wothub_domain::property::PropertyMetadata;
use wothub_domain::schema::{DataSchema, NumericSchema, ObjectSchema};

pub const LIGHT_ID: &str = "urn:dev:ops:my-lamp-1234";

/// Temperature reported by `overheated` once a fade ends.
const OVERHEAT_CELSIUS: i64 = 102;

/// Build the light.
///
/// # Errors
///
/// Returns a validation error if the builder fails (should not happen
/// with hardcoded inputs).
pub fn dimmable_light(retention: EventRetention) -> Result<Thing, ThingError> {
    Thing::builder(LIGHT_ID, "My Lamp")
        .semantic_type("OnOffSwitch")
        .semantic_type("Light")
        .description("A web connected lamp")
        .property(on_property())
        .property(level_property())
        .action("fade", fade_metadata(), fade)
        .event(
            "overheated",
            EventMetadata::default()
                .description("The lamp has exceeded its safe operating temperature")
                .data(DataSchema::Number(
                    NumericSchema::default().unit("degree celsius"),
                )),
        )
        .event_retention(retention)
        .build()
}

fn on_property() -> Property {
    Property::new(
        "on",
        Value::new(true).on_update(|value| {
            tracing::info!(%value, "on-state is now");
            Ok(())
        }),
        PropertyMetadata::new(DataSchema::Boolean)
            .title("On/Off")
            .description("Whether the lamp is turned on")
            .semantic_type("OnOffProperty"),
    )
}

fn level_property() -> Property {
    Property::new(
        "level",
        Value::new(50).on_update(|value| {
            tracing::info!(%value, "new light level");
            Ok(())
        }),
        PropertyMetadata::new(DataSchema::Number(
            NumericSchema::default()
                .minimum(0.0)
                .maximum(100.0)
                .unit("percent"),
        ))
        .title("Brightness")
        .description("The level of light from 0-100")
        .semantic_type("BrightnessProperty"),
    )
}

fn fade_metadata() -> ActionMetadata {
    let input = ObjectSchema::default()
        .required_property(
            "level",
            DataSchema::Number(NumericSchema::default().minimum(0.0).maximum(100.0)),
        )
        .required_property(
            "duration",
            DataSchema::Number(
                NumericSchema::default()
                    .minimum(0.0)
                    .unit("milliseconds"),
            ),
        );
    ActionMetadata::default()
        .title("Fade")
        .description("Fade the lamp to a given level")
        .semantic_type("FadeAction")
        .input(DataSchema::Object(input))
}

/// Wait `duration` milliseconds, apply `level`, then report overheating.
async fn fade(ctx: ActionContext) -> Result<(), ExecutionError> {
    let duration = ctx
        .input_field("duration")
        .and_then(JsonValue::as_f64)
        .and_then(|millis| Duration::try_from_secs_f64(millis / 1000.0).ok())
        .unwrap_or_default();
    let level = ctx.input_field("level").cloned().unwrap_or(JsonValue::Null);

    ctx.sleep(duration).await?;
    ctx.thing().set_property_value("level", level)?;
    ctx.thing()
        .add_event("overheated", Some(json!(OVERHEAT_CELSIUS)))?;
    Ok(())
}
