//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing, config and http produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON or pretty)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the HTTP layer's spans
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
