//! # wothub-domain
//!
//! Pure domain model for the wothub Web of Things gateway.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **data schemas** and their structural validation
//! - Define **property metadata** (what a Thing Description advertises)
//! - Define **events** and the bounded, ordered event log
//! - Define **actions** and their lifecycle state machine
//! - Define **notifications** pushed to live subscribers
//! - Define the **Thing Description** snapshot
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! Concurrency, scheduling and delivery live in the `app` crate.

pub mod error;
pub mod id;
pub mod time;

pub mod action;
pub mod event;
pub mod notification;
pub mod property;
pub mod schema;
pub mod thing;
