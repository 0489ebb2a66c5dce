use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;

use model::base_types::{Cost, RequestId, Seconds, VehicleId};
use model::config::{Config, CtspObjective, CtspPolicy};
use model::network::Network;
use model::request::Request;
use model::vehicle::Vehicle;

/// The vehicle-request shareability graph: for each request, the vehicles
/// that could serve it alone, nearest first, pruned to the top
/// `pruning_rv_k` (or all of them, when that knob is zero).
pub struct RvGraph {
    pub by_request: HashMap<RequestId, Vec<(VehicleId, Cost)>>,
}

impl RvGraph {
    pub fn neighbors_of_request(&self, request: RequestId) -> &[(VehicleId, Cost)] {
        self.by_request
            .get(&request)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

/// Builds the RV graph in parallel, partitioning the active request set
/// across the shared worker pool. Each worker computes its shortlist
/// independently; the shared map is only touched for the brief insert.
pub fn build_rv_graph(
    requests: &[&Request],
    vehicles: &[&Vehicle],
    all_requests: &HashMap<RequestId, &Request>,
    clock: Seconds,
    network: &Network,
    config: &Arc<Config>,
) -> RvGraph {
    let result: Mutex<HashMap<RequestId, Vec<(VehicleId, Cost)>>> = Mutex::new(HashMap::new());

    requests.par_iter().for_each(|request| {
        let mut candidates: Vec<&&Vehicle> = vehicles
            .iter()
            .filter(|v| {
                clock + Seconds(network.vehicle_time(&v.position, request.origin))
                    <= request.latest_boarding
            })
            .collect();
        candidates.sort_by_key(|v| network.vehicle_time(&v.position, request.origin));

        let mut edges = Vec::new();
        for vehicle in candidates {
            if config.search.pruning_rv_k != 0 && edges.len() >= config.search.pruning_rv_k {
                break;
            }
            if let Some((cost, _)) = search::search(vehicle, &[*request], all_requests, clock, network, config, None)
            {
                edges.push((vehicle.id, cost));
            }
        }
        if !edges.is_empty() {
            result.lock().insert(request.id, edges);
        }
    });

    RvGraph {
        by_request: result.into_inner(),
    }
}

/// The request-request shareability graph: a directed edge `a -> b` means
/// a hypothetical empty vehicle could pick up `a` then `b` (in that
/// order) within both requests' deadlines. Scored by detour factor and
/// pruned to the top `pruning_rr_k` partners per source request.
pub struct RrGraph {
    pub edges: HashMap<RequestId, Vec<RequestId>>,
}

impl RrGraph {
    pub fn connected(&self, a: RequestId, b: RequestId) -> bool {
        self.edges.get(&a).map(|v| v.contains(&b)).unwrap_or(false)
            || self.edges.get(&b).map(|v| v.contains(&a)).unwrap_or(false)
    }
}

/// A dummy capacity-4 vehicle used purely to gauge pairwise shareability;
/// independent of any vehicle in the real fleet. This mirrors the source
/// system's graph-density knob and is not meant to reflect real capacity.
const RR_DUMMY_CAPACITY: model::base_types::PassengerCount = 4;

pub fn build_rr_graph(
    requests: &[&Request],
    all_requests: &HashMap<RequestId, &Request>,
    clock: Seconds,
    network: &Network,
    config: &Arc<Config>,
) -> RrGraph {
    let result: Mutex<HashMap<RequestId, Vec<RequestId>>> = Mutex::new(HashMap::new());

    requests.par_iter().for_each(|r1| {
        let mut scored: Vec<(RequestId, Cost)> = Vec::new();
        for r2 in requests {
            if r1.id == r2.id {
                continue;
            }
            let gate = network.time(r1.origin as i64, r2.origin)
                + std::cmp::max(clock.0, r1.entry_time.0);
            if gate > r2.latest_boarding.0 {
                continue;
            }
            let dummy = Vehicle::new(u32::MAX, RR_DUMMY_CAPACITY, r1.origin);
            if search::search_with_policy(
                &dummy,
                &[*r1, *r2],
                all_requests,
                clock,
                network,
                CtspPolicy::Full,
                CtspObjective::Vtt,
                usize::MAX,
                None,
            )
            .is_some()
            {
                scored.push((r2.id, detour_factor(r1, r2, network)));
            }
        }
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
        if config.search.pruning_rr_k != 0 {
            scored.truncate(config.search.pruning_rr_k);
        }
        if !scored.is_empty() {
            result
                .lock()
                .insert(r1.id, scored.into_iter().map(|(id, _)| id).collect());
        }
    });

    RrGraph {
        edges: result.into_inner(),
    }
}

/// How much longer `r1` and `r2` would ride if picked up and dropped off one
/// after another, relative to each riding alone: the smaller of "detour
/// through r2's origin on the way to r1's destination" and "detour through
/// r1's origin on the way to r2's destination", each as a ratio over the
/// respective solo direct time. Independent of whatever stop order the
/// feasibility search above happened to settle on.
fn detour_factor(r1: &Request, r2: &Request, network: &Network) -> Cost {
    let mut best = Cost::INFINITY;
    let onedist = network.time(r1.origin as i64, r1.destination) as Cost;
    if onedist != 0.0 {
        let ratio = (network.time(r1.origin as i64, r2.origin) + network.time(r2.origin as i64, r1.destination))
            as Cost
            / onedist;
        best = best.min(ratio);
    }
    let twodist = network.time(r2.origin as i64, r2.destination) as Cost;
    if twodist != 0.0 {
        let ratio = (network.time(r2.origin as i64, r1.origin) + network.time(r1.origin as i64, r2.destination))
            as Cost
            / twodist;
        best = best.min(ratio);
    }
    if onedist == 0.0 && twodist == 0.0 {
        best = 0.0;
    }
    best
}
