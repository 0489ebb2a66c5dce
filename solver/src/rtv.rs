use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;

use model::base_types::{RequestId, Seconds, VehicleId};
use model::config::Config;
use model::error::{SimError, SimResult};
use model::network::Network;
use model::request::Request;
use model::trip::Trip;
use model::vehicle::Vehicle;

use crate::rv::{RrGraph, RvGraph};

pub struct RtvGraph {
    /// Trips per vehicle, grouped by the size of the request set they
    /// serve (`trips_by_level[v][k]` holds every size-`k` trip for `v`).
    pub trips_by_level: HashMap<VehicleId, Vec<Vec<Trip>>>,
}

impl RtvGraph {
    pub fn all_trips(&self) -> impl Iterator<Item = &Trip> {
        self.trips_by_level
            .values()
            .flat_map(|levels| levels.iter().flat_map(|l| l.iter()))
    }

    pub fn trips_for_vehicle(&self, vehicle: VehicleId) -> impl Iterator<Item = &Trip> {
        self.trips_by_level
            .get(&vehicle)
            .into_iter()
            .flat_map(|levels| levels.iter().flat_map(|l| l.iter()))
    }
}

fn invert_rv(rv: &RvGraph, vehicles: &[&Vehicle]) -> HashMap<VehicleId, Vec<RequestId>> {
    let mut inverted: HashMap<VehicleId, Vec<RequestId>> =
        vehicles.iter().map(|v| (v.id, Vec::new())).collect();
    for (&request, edges) in &rv.by_request {
        for &(vehicle, _) in edges {
            inverted.entry(vehicle).or_default().push(request);
        }
    }
    inverted
}

/// Builds the RTV graph for the active fleet, growing feasible request
/// groups bottom-up per vehicle from size 1 up to that vehicle's
/// capacity, pruned by RR-connectivity and subset closure, and always
/// guaranteeing that a vehicle's previously committed trip reappears
/// (replayed from memory if necessary).
pub fn build_rtv_graph(
    vehicles: &[&Vehicle],
    all_requests: &HashMap<RequestId, &Request>,
    rv: &RvGraph,
    rr: &RrGraph,
    clock: Seconds,
    network: &Network,
    config: &Arc<Config>,
) -> SimResult<RtvGraph> {
    let rv_by_vehicle = invert_rv(rv, vehicles);
    let result: Mutex<HashMap<VehicleId, Vec<Vec<Trip>>>> = Mutex::new(HashMap::new());
    let error: Mutex<Option<SimError>> = Mutex::new(None);

    vehicles.par_iter().for_each(|vehicle| {
        match build_for_vehicle(vehicle, all_requests, &rv_by_vehicle, rr, clock, network, config) {
            Ok(levels) => {
                result.lock().insert(vehicle.id, levels);
            }
            Err(e) => {
                *error.lock() = Some(e);
            }
        }
    });

    if let Some(e) = error.into_inner() {
        return Err(e);
    }

    Ok(RtvGraph {
        trips_by_level: result.into_inner(),
    })
}

fn build_for_vehicle(
    vehicle: &Vehicle,
    all_requests: &HashMap<RequestId, &Request>,
    rv_by_vehicle: &HashMap<VehicleId, Vec<RequestId>>,
    rr: &RrGraph,
    clock: Seconds,
    network: &Network,
    config: &Arc<Config>,
) -> SimResult<Vec<Vec<Trip>>> {
    let mut levels: Vec<Vec<Trip>> = Vec::new();

    // level 0: baseline, deliver whoever is already onboard.
    let baseline = search::search(vehicle, &[], all_requests, clock, network, config, None);
    let level0 = match baseline {
        Some((cost, order)) => vec![Trip::new(vehicle.id, cost, order, BTreeSet::new())],
        None => Vec::new(),
    };
    levels.push(level0);

    // level 1: RV-neighbors union pending (already committed) requests.
    let mut candidate_ids: BTreeSet<RequestId> = rv_by_vehicle
        .get(&vehicle.id)
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .collect();
    candidate_ids.extend(vehicle.pending_requests.iter().copied());

    let mut level1 = Vec::new();
    for &rid in &candidate_ids {
        let request = all_requests[&rid];
        if let Some((cost, order)) = search::search(
            vehicle,
            &[request],
            all_requests,
            clock,
            network,
            config,
            Some(std::time::Duration::from_secs(
                config.search.rtv_timelimit.0.max(0) as u64,
            )),
        ) {
            let mut reqs = BTreeSet::new();
            reqs.insert(rid);
            level1.push(Trip::new(vehicle.id, cost, order, reqs));
        }
    }
    levels.push(level1);

    let mut k = 2usize;
    while k <= vehicle.capacity as usize {
        let prev = levels[k - 1].clone();
        if prev.is_empty() {
            break;
        }
        let mut seen: BTreeSet<BTreeSet<RequestId>> = BTreeSet::new();
        let mut this_level = Vec::new();

        for (i, t1) in prev.iter().enumerate() {
            for t2 in prev.iter().skip(i + 1) {
                let union: BTreeSet<RequestId> = t1.requests.union(&t2.requests).copied().collect();
                if union.len() != k || seen.contains(&union) {
                    continue;
                }
                let new_count = union
                    .iter()
                    .filter(|r| !vehicle.pending_requests.contains(r))
                    .count();
                if 2 * new_count > config.search.max_new {
                    continue;
                }
                if !rr_connected_pair(&t1.requests, &t2.requests, rr) {
                    continue;
                }
                if !subset_closure_holds(&union, &levels[k - 1]) {
                    continue;
                }
                seen.insert(union.clone());

                let union_requests: Vec<&Request> = union.iter().map(|r| all_requests[r]).collect();
                if let Some((cost, order)) = search::search(
                    vehicle,
                    &union_requests,
                    all_requests,
                    clock,
                    network,
                    config,
                    Some(std::time::Duration::from_secs(
                        config.search.rtv_timelimit.0.max(0) as u64,
                    )),
                ) {
                    this_level.push(Trip::new(vehicle.id, cost, order, union));
                }
            }
        }
        if this_level.is_empty() {
            break;
        }
        levels.push(this_level);
        k += 1;
    }

    guarantee_commitment(vehicle, all_requests, clock, network, &mut levels)?;
    Ok(levels)
}

fn rr_connected_pair(a: &BTreeSet<RequestId>, b: &BTreeSet<RequestId>, rr: &RrGraph) -> bool {
    for &x in a {
        for &y in b {
            if x == y {
                continue;
            }
            if !rr.connected(x, y) {
                return false;
            }
        }
    }
    true
}

fn subset_closure_holds(union: &BTreeSet<RequestId>, prev_level: &[Trip]) -> bool {
    for excluded in union {
        let mut subset = union.clone();
        subset.remove(excluded);
        if !prev_level.iter().any(|t| t.requests == subset) {
            return false;
        }
    }
    true
}

fn guarantee_commitment(
    vehicle: &Vehicle,
    all_requests: &HashMap<RequestId, &Request>,
    clock: Seconds,
    network: &Network,
    levels: &mut Vec<Vec<Trip>>,
) -> SimResult<()> {
    if vehicle.order_record.is_empty() {
        return Ok(());
    }
    let committed: BTreeSet<RequestId> = vehicle.order_record.iter().map(|s| s.request).collect();
    let level_idx = vehicle.pending_requests.len();
    if level_idx < levels.len() && levels[level_idx].iter().any(|t| t.requests == committed) {
        return Ok(());
    }
    match search::replay(
        vehicle,
        all_requests,
        clock,
        network,
        model::config::CtspObjective::Vtt,
    ) {
        Some((cost, order)) => {
            let trip = Trip::new(vehicle.id, cost, order, committed).with_memory();
            while levels.len() <= level_idx {
                levels.push(Vec::new());
            }
            levels[level_idx].push(trip);
            Ok(())
        }
        None => Err(SimError::InvariantViolation(format!(
            "vehicle {} could not replay its committed trip",
            vehicle.id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(requests: &[RequestId]) -> Trip {
        Trip::new(1, 0.0, Vec::new(), requests.iter().copied().collect())
    }

    #[test]
    fn subset_closure_requires_every_k_minus_one_subset() {
        let union: BTreeSet<RequestId> = [1, 2, 3].into_iter().collect();
        let prev_level = vec![trip(&[1, 2]), trip(&[1, 3]), trip(&[2, 3])];
        assert!(subset_closure_holds(&union, &prev_level));

        let incomplete = vec![trip(&[1, 2]), trip(&[1, 3])];
        assert!(!subset_closure_holds(&union, &incomplete));
    }

    #[test]
    fn rr_connectivity_needs_at_least_one_direction_per_pair() {
        let mut edges = HashMap::new();
        edges.insert(1, vec![2]);
        let rr = RrGraph { edges };
        let a: BTreeSet<RequestId> = [1].into_iter().collect();
        let b: BTreeSet<RequestId> = [2].into_iter().collect();
        assert!(rr_connected_pair(&a, &b, &rr));

        let c: BTreeSet<RequestId> = [3].into_iter().collect();
        assert!(!rr_connected_pair(&a, &c, &rr));
    }
}
