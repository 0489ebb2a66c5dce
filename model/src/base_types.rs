pub mod seconds;

pub use seconds::Seconds;

/// Node identifiers are dense indices into the network's matrices, 0-indexed
/// in memory (the on-disk file formats are 1-indexed; loaders decrement).
pub type NodeId = u32;

pub type Cost = f64;

pub type RequestId = u32;

pub type VehicleId = u32;

pub type PassengerCount = u8;

pub const COST_ZERO: Cost = 0.0;

/// Sentinel "node" fed to [`crate::network::Network`] queries to mean
/// "the dwell time at a pickup", rather than a real travel leg.
pub const DWELL_PICKUP_SENTINEL: i64 = -10;

/// Sentinel "node" fed to [`crate::network::Network`] queries to mean
/// "the dwell time at an alighting", rather than a real travel leg.
pub const DWELL_ALIGHT_SENTINEL: i64 = -20;
