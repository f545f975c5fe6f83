//! Analysis service integration for TextGuard.
//!
//! This crate owns everything that touches the wire: the
//! [`AnalysisTransport`] seam, its reqwest-backed [`HttpTransport`],
//! payload construction, status classification and parsing of the
//! service's chat-completions answer into an
//! [`AnalysisResult`](textguard_core::AnalysisResult).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod metrics;
mod payload;
mod response;
mod transport;

pub use config::{UpstreamConfig, UpstreamConfigBuilder};
pub use metrics::{ClientMetrics, classify_error};
pub use payload::build_payload;
pub use response::{
    StatusClass, TransportResponse, classify_status, detect_spam, extract_confidence,
    parse_analysis,
};
pub use transport::{AnalysisTransport, HttpTransport, parse_retry_after};
