//! # acbridge-app
//!
//! Application layer: **port definitions** (traits) and in-process
//! infrastructure.
//!
//! ## Responsibilities
//! - Define the [`Integration`](ports::Integration) port that device
//!   integrations implement, and the
//!   [`IntegrationContext`](ports::IntegrationContext) port they report
//!   discoveries and state changes through
//! - Provide an in-process event bus ([`event_bus::InProcessEventBus`])
//! - Provide an in-memory [`StateStore`](services::state_store::StateStore)
//!   standing in for the hub's entity and device registries
//!
//! ## Dependency rule
//! Depends on `acbridge-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod services;
