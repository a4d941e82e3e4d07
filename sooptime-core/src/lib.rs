//! Core types, engine, and service wiring for the sooptime reservation-opening map.

/// Representative opening selection and status classification.
pub mod classify;
/// Coordinate lookup and the schedule/coordinates join.
pub mod join;
/// Domain models shared by all crates.
pub mod model;
/// Registry for plugging dataset sources into the service.
pub mod plugin;
/// Traits describing the dataset source interfaces.
pub mod ports;
/// Marker descriptors, popup details, and GeoJSON output.
pub mod render;
/// Month-keyed opening selection.
pub mod select;
/// High-level service facade used by clients.
pub mod service;
/// CSV tokenizing into rows.
pub mod table;
/// Opening timestamp parsing.
pub mod timestamp;

pub use model::*;
pub use plugin::*;
pub use ports::*;
pub use service::*;
