use std::collections::HashMap;

use rayon::prelude::*;

use model::base_types::{RequestId, Seconds};
use model::config::Config;
use model::network::Network;
use model::request::Request;
use model::vehicle::{Vehicle, VehicleState};

enum Event {
    Boarded { request: RequestId, at: Seconds, shared: bool },
    Alighted { request: RequestId, at: Seconds, shared: bool },
}

/// Advances every active vehicle by one tick interval along its chosen
/// (or frozen, if untouched this tick) `order_record`, dwelling at
/// pickups/dropoffs, boarding and alighting passengers, and updating
/// per-state time bookkeeping. Vehicles are partitioned across the same
/// worker pool used by graph construction; since no two vehicles ever
/// serve the same request, each vehicle's share of the request pool is
/// disjoint, but the pool itself is applied in one sequential pass after
/// the parallel movement step to keep the whole phase free of unsafe
/// aliasing.
pub fn advance_vehicles(
    vehicles: &mut [Vehicle],
    requests: &mut HashMap<RequestId, Request>,
    network: &Network,
    config: &Config,
    tick_clock: Seconds,
) {
    let events: Vec<Event> = vehicles
        .par_iter_mut()
        .flat_map_iter(|vehicle| advance_one(vehicle, network, config, tick_clock))
        .collect();

    for event in events {
        match event {
            Event::Boarded { request, at, shared } => {
                if let Some(r) = requests.get_mut(&request) {
                    r.boarding_time = Some(at);
                    r.shared |= shared;
                }
            }
            Event::Alighted { request, at, shared } => {
                if let Some(r) = requests.get_mut(&request) {
                    r.alighting_time = Some(at);
                    r.shared |= shared;
                }
            }
        }
    }
}

fn advance_one(
    vehicle: &mut Vehicle,
    network: &Network,
    config: &Config,
    tick_clock: Seconds,
) -> Vec<Event> {
    vehicle.begin_tick();
    let mut remaining = config.clock.interval;
    let mut events = Vec::new();

    loop {
        if remaining <= Seconds::ZERO {
            break;
        }
        if vehicle.position.offset > Seconds::ZERO {
            let step = remaining.min(vehicle.position.offset);
            vehicle.position.offset = vehicle.position.offset - step;
            remaining = remaining - step;
            if vehicle.position.offset == Seconds::ZERO {
                vehicle.total_distance +=
                    network.distance(vehicle.position.prev_node as i64, vehicle.position.node) as f64;
                vehicle.position.prev_node = vehicle.position.node;
            }
            continue;
        }

        let Some(next_stop) = vehicle.order_record.first().copied() else {
            break;
        };

        if next_stop.node == vehicle.position.node {
            let dwell = if next_stop.is_pickup {
                config.service.dwell_pickup
            } else {
                config.service.dwell_alight
            };
            if remaining < dwell {
                break;
            }
            let arrival_instant = tick_clock + (config.clock.interval - remaining);
            remaining = remaining - dwell;

            if next_stop.is_pickup {
                vehicle.passengers.insert(next_stop.request);
                vehicle.pending_requests.remove(&next_stop.request);
                vehicle.just_boarded.push(next_stop.request);
                events.push(Event::Boarded {
                    request: next_stop.request,
                    at: arrival_instant,
                    shared: vehicle.passengers.len() > 1,
                });
            } else {
                let shared = vehicle.passengers.len() > 1;
                vehicle.passengers.remove(&next_stop.request);
                vehicle.just_alighted.push(next_stop.request);
                events.push(Event::Alighted {
                    request: next_stop.request,
                    at: arrival_instant,
                    shared,
                });
            }
            vehicle.order_record.remove(0);
            continue;
        }

        // cross the waypoint graph one hop at a time rather than jumping
        // straight to next_stop.node, so prev_node/node actually advance and
        // the arrival check above can eventually trigger.
        let waypoints = network.path(vehicle.position.node, next_stop.node);
        let hop = waypoints.get(1).copied().unwrap_or(next_stop.node);
        let leg = network.time(vehicle.position.node as i64, hop);
        vehicle.position.prev_node = vehicle.position.node;
        vehicle.position.node = hop;
        vehicle.position.offset = Seconds(leg);
    }

    let busy = !vehicle.order_record.is_empty() || vehicle.position.offset > Seconds::ZERO;
    let state = if !vehicle.passengers.is_empty() {
        VehicleState::InUse
    } else if busy {
        VehicleState::EnRoute
    } else {
        VehicleState::Idle
    };
    vehicle.set_state(state);
    vehicle.accrue_state_time(state, config.clock.interval);
    events
}
