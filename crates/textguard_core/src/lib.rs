//! Core data types for the TextGuard analysis client.
//!
//! This crate provides the request, result and payload types shared by the
//! cache, executor and facade crates, plus the fingerprinting used as the
//! cache key.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analysis;
mod clock;
mod fingerprint;
mod message;
mod role;
mod telemetry;

pub use analysis::{AnalysisOptions, AnalysisOptionsBuilder, AnalysisResult};
pub use clock::{Clock, ManualClock, SystemClock};
pub use fingerprint::{Fingerprint, normalize_text};
pub use message::{ChatPayload, Message};
pub use role::Role;
pub use telemetry::init_tracing;
