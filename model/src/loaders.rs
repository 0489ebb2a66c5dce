use std::path::Path;

use crate::base_types::{NodeId, PassengerCount, RequestId, Seconds, VehicleId};
use crate::config::{FleetConfig, ServiceConfig};
use crate::error::{SimError, SimResult};
use crate::network::Network;
use crate::request::Request;
use crate::vehicle::Vehicle;

/// Parses `HH:MM:SS` into a second-of-day offset.
fn parse_hhmmss(path: &Path, field: &str) -> SimResult<Seconds> {
    let parts: Vec<&str> = field.trim().split(':').collect();
    if parts.len() != 3 {
        return Err(SimError::InputFile {
            path: path.to_path_buf(),
            reason: format!("'{}' is not an HH:MM:SS timestamp", field),
        });
    }
    let bad = |_| SimError::InputFile {
        path: path.to_path_buf(),
        reason: format!("'{}' is not an HH:MM:SS timestamp", field),
    };
    let h: i64 = parts[0].parse().map_err(bad)?;
    let m: i64 = parts[1].parse().map_err(bad)?;
    let s: i64 = parts[2].parse().map_err(bad)?;
    Ok(Seconds(h * 3600 + m * 60 + s))
}

/// Loads the request file: `request_id, origin_node, origin_lon,
/// origin_lat, destination_node, destination_lon, destination_lat,
/// requested_time_HH:MM:SS`. Nodes are 1-indexed on disk.
pub fn load_requests(
    path: &Path,
    network: &Network,
    service: &ServiceConfig,
) -> SimResult<Vec<Request>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| SimError::InputFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let mut requests = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SimError::InputFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let field_err = |reason: String| SimError::InputFile {
            path: path.to_path_buf(),
            reason,
        };
        let id: RequestId = record[0]
            .trim()
            .parse()
            .map_err(|_| field_err(format!("bad request id '{}'", &record[0])))?;
        let origin: usize = record[1]
            .trim()
            .parse()
            .map_err(|_| field_err(format!("bad origin node '{}'", &record[1])))?;
        let origin_lon: f64 = record[2].trim().parse().unwrap_or(0.0);
        let origin_lat: f64 = record[3].trim().parse().unwrap_or(0.0);
        let destination: usize = record[4]
            .trim()
            .parse()
            .map_err(|_| field_err(format!("bad destination node '{}'", &record[4])))?;
        let destination_lon: f64 = record[5].trim().parse().unwrap_or(0.0);
        let destination_lat: f64 = record[6].trim().parse().unwrap_or(0.0);
        let entry_time = parse_hhmmss(path, &record[7])?;

        let origin_node = (origin - 1) as NodeId;
        let destination_node = (destination - 1) as NodeId;
        let ideal_traveltime = Seconds(network.time(origin_node as i64, destination_node));

        requests.push(Request::new(
            id,
            origin_node,
            origin_lon,
            origin_lat,
            destination_node,
            destination_lon,
            destination_lat,
            entry_time,
            ideal_traveltime,
            service.max_waiting,
            service.max_detour,
        ));
    }
    requests.sort_by_key(|r| r.entry_time);
    Ok(requests)
}

/// Loads the vehicle file: `driver_id, starting_node, latitude, longitude,
/// time_string, capacity`. `fleet.carsize`, when set, overrides every
/// row's on-disk capacity; `fleet.vehicle_limit` truncates the fleet.
pub fn load_vehicles(path: &Path, fleet: &FleetConfig) -> SimResult<Vec<Vehicle>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| SimError::InputFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let mut vehicles = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SimError::InputFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let field_err = |reason: String| SimError::InputFile {
            path: path.to_path_buf(),
            reason,
        };
        let id: VehicleId = record[0]
            .trim()
            .parse()
            .map_err(|_| field_err(format!("bad driver id '{}'", &record[0])))?;
        let starting_node: usize = record[1]
            .trim()
            .parse()
            .map_err(|_| field_err(format!("bad starting node '{}'", &record[1])))?;
        let on_disk_capacity: PassengerCount = record[5].trim().parse().unwrap_or(4);
        let capacity = fleet.carsize.unwrap_or(on_disk_capacity);

        vehicles.push(Vehicle::new(id, capacity, (starting_node - 1) as NodeId));

        if let Some(limit) = fleet.vehicle_limit {
            if vehicles.len() >= limit {
                break;
            }
        }
    }
    Ok(vehicles)
}
