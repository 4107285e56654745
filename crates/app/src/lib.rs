//! # wothub-app
//!
//! Application layer — the live thing model and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement:
//!   - `Forwarder` — pushes accepted property writes to hardware
//!   - `Subscriber` — receives live notifications
//!   - `ActionHandler` — the body run for each requested action
//! - Provide the **thing aggregate** (`Thing`): properties, action
//!   instances, event log and subscriber fan-out behind one lock
//! - Schedule action bodies on tokio tasks and drive their lifecycle
//! - Group things into a `ThingRegistry`
//! - Provide **in-process infrastructure** (`ChannelSubscriber`) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `wothub-domain` only (plus `tokio` for tasks and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod action;
pub mod channel_subscriber;
pub mod ports;
pub mod property;
pub mod registry;
pub mod thing;
pub mod value;
