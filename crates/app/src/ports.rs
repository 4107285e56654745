//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the thing model and the outside world:
//! hardware that receives writes, network sinks that receive notifications,
//! and the bodies that carry out requested actions.

pub mod action_handler;
pub mod forwarder;
pub mod subscriber;

pub use action_handler::ActionHandler;
pub use forwarder::Forwarder;
pub use subscriber::{DeliveryError, Subscriber};
