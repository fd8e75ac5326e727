//! # acbridge-domain
//!
//! Pure domain model for the acbridge climate bridge.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (physical units exposing one or more entities)
//! - Define **Entities** (state holders with identity: a climate control, …)
//! - Define **Climate** value types (HVAC mode, fan mode, preset, swing)
//! - Define **Events** (state-change records)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod climate;
pub mod device;
pub mod entity;
pub mod event;
