//! Fixtures shared by the handler tests.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value as JsonValue, json};
use tower::ServiceExt;
use wothub_app::action::ActionContext;
use wothub_app::property::Property;
use wothub_app::registry::ThingRegistry;
use wothub_app::thing::Thing;
use wothub_app::value::Value;
use wothub_domain::action::ActionMetadata;
use wothub_domain::error::{ActuationError, ExecutionError};
use wothub_domain::event::EventMetadata;
use wothub_domain::property::PropertyMetadata;
use wothub_domain::schema::{DataSchema, NumericSchema, ObjectSchema};

use crate::state::AppState;

pub(crate) const LAMP_ID: &str = "urn:dev:lamp";

async fn fade(ctx: ActionContext) -> Result<(), ExecutionError> {
    let duration = ctx
        .input_field("duration")
        .and_then(JsonValue::as_u64)
        .unwrap_or(0);
    ctx.sleep(Duration::from_millis(duration)).await?;
    let level = ctx.input_field("level").cloned().unwrap_or(json!(0));
    ctx.thing().set_property_value("level", level)?;
    ctx.thing().add_event("overheated", Some(json!(102)))?;
    Ok(())
}

pub(crate) fn lamp() -> Thing {
    let fade_input = ObjectSchema::default()
        .required_property(
            "level",
            DataSchema::Number(NumericSchema::default().minimum(0.0).maximum(100.0)),
        )
        .required_property("duration", DataSchema::integer());
    Thing::builder(LAMP_ID, "Lamp")
        .semantic_type("Light")
        .property(Property::new(
            "on",
            Value::new(true),
            PropertyMetadata::new(DataSchema::Boolean),
        ))
        .property(Property::new(
            "level",
            Value::new(50),
            PropertyMetadata::new(DataSchema::Number(
                NumericSchema::default().minimum(0.0).maximum(100.0),
            )),
        ))
        .property(Property::new(
            "temperature",
            Value::new(21.5),
            PropertyMetadata::new(DataSchema::number()).read_only(),
        ))
        .property(Property::new(
            "color",
            Value::new("#ffffff").with_forwarder(
                |_: &JsonValue| -> Result<(), ActuationError> {
                    Err(ActuationError::msg("bulb unreachable"))
                },
            ),
            PropertyMetadata::new(DataSchema::string()),
        ))
        .action(
            "fade",
            ActionMetadata::default().input(DataSchema::Object(fade_input)),
            fade,
        )
        .event("overheated", EventMetadata::default().data(DataSchema::number()))
        .build()
        .unwrap()
}

pub(crate) fn app(registry: ThingRegistry) -> Router {
    crate::router::build(AppState::new(registry))
}

pub(crate) fn lamp_app() -> (Router, Thing) {
    let lamp = lamp();
    (app(ThingRegistry::single(lamp.clone())), lamp)
}

/// Send one request and decode the JSON response (`null` for empty bodies).
pub(crate) async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
