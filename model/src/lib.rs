pub mod base_types;
pub mod config;
pub mod error;
pub mod loaders;
pub mod network;
pub mod nodestop;
pub mod request;
pub mod trip;
pub mod vehicle;

pub use config::Config;
pub use error::{SimError, SimResult};
pub use network::Network;
pub use nodestop::NodeStop;
pub use request::Request;
pub use trip::Trip;
pub use vehicle::{Position, Vehicle, VehicleState};
