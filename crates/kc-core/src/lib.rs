//! # kc-core
//!
//! Core utilities, configuration, and error handling shared by the SAML
//! trust-evaluation and artifact crates.
//!
//! This crate provides foundational types used across the workspace:
//!
//! - [`Error`] - Top-level error type for construction and configuration failures
//! - [`SecurityConfig`] - Clock skew, message lifetime and artifact settings
//! - [`Clock`] - Injectable time source for every time-bounded check
//! - [`SecurityEvent`] - Structured audit events and their [`EventListener`]
//!
//! ## NIST 800-53 Rev5 Controls
//!
//! - AU-2: Event logging framework
//! - SI-11: Error handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod error;
pub mod event;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::SecurityConfig;
pub use error::{Error, Result};
pub use event::{
    EventListener, EventOutcome, EventType, NoopEventListener, SecurityEvent,
    TracingEventListener,
};
