use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use good_lp::{constraint, variable, Expression, ProblemVariables, Solution, SolverModel, Variable};
use tracing::warn;

use model::base_types::{RequestId, VehicleId};
use model::config::{AssignmentObjective, Config};
use model::request::Request;
use model::trip::Trip;

use crate::rtv::RtvGraph;

/// The outcome of one tick's assignment: at most one trip chosen per
/// vehicle, plus the set of new requests the solver left unassigned.
pub struct Assignment {
    pub chosen: HashMap<VehicleId, Trip>,
    pub unassigned: BTreeSet<RequestId>,
}

/// Solves the per-tick assignment ILP over the RTV trip set: select at
/// most one trip per vehicle, cover every committed request exactly, and
/// either cover or formally drop every new request, minimizing route
/// cost plus the configured penalty for unserved new requests.
///
/// A solver status that is neither optimal nor an accepted time-limited
/// incumbent yields an empty assignment here; this can silently leave a
/// committed request unserved for this tick; it remains committed and is
/// expected to be re-offered (and re-covered) by the next tick's RTV via
/// memory replay, so this is logged rather than treated as fatal.
pub fn solve(
    rtv: &RtvGraph,
    all_requests: &HashMap<RequestId, &Request>,
    config: &Arc<Config>,
) -> Assignment {
    let trips: Vec<&Trip> = rtv.all_trips().collect();
    if trips.is_empty() {
        return Assignment {
            chosen: HashMap::new(),
            unassigned: BTreeSet::new(),
        };
    }

    let mut vars = ProblemVariables::new();
    let e: Vec<Variable> = trips.iter().map(|_| vars.add(variable().binary())).collect();

    let new_requests: Vec<RequestId> = all_requests
        .values()
        .filter(|r| !r.assigned)
        .map(|r| r.id)
        .collect();
    let mut x: HashMap<RequestId, Variable> = HashMap::new();
    for &rid in &new_requests {
        x.insert(rid, vars.add(variable().binary()));
    }

    let mut objective = Expression::from(0.0);
    for (i, trip) in trips.iter().enumerate() {
        objective += trip.cost * e[i];
    }
    match config.assignment.objective {
        AssignmentObjective::ServiceRate => {
            for &rid in &new_requests {
                objective += config.assignment.miss_cost * x[&rid];
            }
        }
        AssignmentObjective::Rmt => {
            for &rid in &new_requests {
                let reward =
                    config.assignment.rmt_reward * all_requests[&rid].ideal_traveltime.0 as f64;
                objective += reward * x[&rid];
            }
        }
    }

    let mut problem = vars.minimise(objective).using(good_lp::microlp);

    for vehicle in rtv.trips_by_level.keys() {
        let mut vehicle_sum = Expression::from(0.0);
        for (i, trip) in trips.iter().enumerate() {
            if trip.vehicle == *vehicle {
                vehicle_sum += e[i];
            }
        }
        problem = problem.with(constraint!(vehicle_sum == 1.0));
    }

    for request in all_requests.values() {
        let mut cover = Expression::from(0.0);
        for (i, trip) in trips.iter().enumerate() {
            if trip.requests.contains(&request.id) {
                cover += e[i];
            }
        }
        if request.assigned {
            problem = problem.with(constraint!(cover == 1.0));
        } else if let Some(&xk) = x.get(&request.id) {
            problem = problem.with(constraint!(cover + xk == 1.0));
        }
    }

    match problem.solve() {
        Ok(solution) => {
            let mut chosen = HashMap::new();
            for (i, trip) in trips.iter().enumerate() {
                if solution.value(e[i]) > 0.5 {
                    chosen.insert(trip.vehicle, (*trip).clone());
                }
            }
            let unassigned = new_requests
                .iter()
                .filter(|rid| solution.value(x[rid]) > 0.5)
                .copied()
                .collect();
            Assignment { chosen, unassigned }
        }
        Err(e) => {
            warn!(error = %e, "assignment solver returned no usable solution; proceeding with an empty assignment this tick");
            Assignment {
                chosen: HashMap::new(),
                unassigned: new_requests.into_iter().collect(),
            }
        }
    }
}
