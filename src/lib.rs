//! dialroute: outbound call routing resolution.
//!
//! Determines which voice routes a subscriber's call to a dialed number would
//! use. The dialed number is first normalized with the subscriber's dial plan
//! (first matching translation rule wins), then the subscriber's routing
//! policy is walked usage by usage until one has a matching route; that
//! usage's matching routes are returned in priority order.

pub mod config;
pub mod directory;
pub mod error;
pub mod normalizer;
pub mod router;
pub mod service;
pub mod telemetry;

pub use error::{PatternKind, RoutingError};
pub use service::{CallRequest, PolicySource, Resolution, RoutingService};
