pub mod cost;
pub mod meta_stop;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use model::base_types::{Cost, NodeId, RequestId, Seconds};
use model::config::{Config, CtspObjective, CtspPolicy};
use model::network::Network;
use model::nodestop::NodeStop;
use model::request::Request;
use model::vehicle::Vehicle;

use meta_stop::{build_replay_graph, build_stop_graph, deadline_of, MetaStop, StopGraph};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum LastAction {
    Pickup,
    Dropoff,
}

struct SearchCtx<'a> {
    stops: &'a [MetaStop],
    requests: HashMap<RequestId, &'a Request>,
    network: &'a Network,
    capacity: usize,
    objective: CtspObjective,
    deadline: Option<Instant>,
}

/// Runs the feasibility / insertion search described for this system under
/// the fleet's configured prefix-lock policy and objective: a depth-first
/// branch-and-bound over meta-stops that respects capacity, pickup/dropoff
/// deadlines, and precedence, returning the cheapest feasible visit order,
/// or `None` if no order is feasible.
pub fn search(
    vehicle: &Vehicle,
    new_requests: &[&Request],
    all_requests: &HashMap<RequestId, &Request>,
    clock: Seconds,
    network: &Network,
    config: &Arc<Config>,
    time_budget: Option<Duration>,
) -> Option<(Cost, Vec<NodeStop>)> {
    search_with_policy(
        vehicle,
        new_requests,
        all_requests,
        clock,
        network,
        config.search.ctsp,
        config.search.ctsp_objective,
        config.search.lp_limitvalue,
        time_budget,
    )
}

/// Runs the same search bypassing the fleet's configured policy/objective,
/// for callers that need an explicit override. Used by the RR-graph
/// shareability check, which always wants an unconstrained full-order
/// feasibility check regardless of how the live fleet is configured.
#[allow(clippy::too_many_arguments)]
pub fn search_with_policy(
    vehicle: &Vehicle,
    new_requests: &[&Request],
    all_requests: &HashMap<RequestId, &Request>,
    clock: Seconds,
    network: &Network,
    policy: CtspPolicy,
    objective: CtspObjective,
    lp_limitvalue: usize,
    time_budget: Option<Duration>,
) -> Option<(Cost, Vec<NodeStop>)> {
    let graph = build_stop_graph(vehicle, new_requests, policy, lp_limitvalue)?;
    run(&graph, vehicle, all_requests, clock, network, objective, time_budget)
}

/// Replays `vehicle.order_record` verbatim, certifying it is still
/// feasible at `clock`. The stop graph is a single chain, so the only
/// candidate order is the stored one.
pub fn replay(
    vehicle: &Vehicle,
    all_requests: &HashMap<RequestId, &Request>,
    clock: Seconds,
    network: &Network,
    objective: CtspObjective,
) -> Option<(Cost, Vec<NodeStop>)> {
    if vehicle.order_record.is_empty() {
        return Some((0.0, Vec::new()));
    }
    let graph = build_replay_graph(&vehicle.order_record);
    run(&graph, vehicle, all_requests, clock, network, objective, None)
}

fn run(
    graph: &StopGraph,
    vehicle: &Vehicle,
    all_requests: &HashMap<RequestId, &Request>,
    clock: Seconds,
    network: &Network,
    objective: CtspObjective,
    time_budget: Option<Duration>,
) -> Option<(Cost, Vec<NodeStop>)> {
    let requests: HashMap<RequestId, &Request> = graph
        .stops
        .iter()
        .map(|m| m.stop.request)
        .collect::<std::collections::HashSet<_>>()
        .into_iter()
        .filter_map(|rid| all_requests.get(&rid).map(|r| (rid, *r)))
        .collect();

    let ctx = SearchCtx {
        stops: &graph.stops,
        requests,
        network,
        capacity: vehicle.capacity as usize,
        objective,
        deadline: time_budget.map(|b| Instant::now() + b),
    };

    let mut indegree = vec![0usize; graph.stops.len()];
    for stop in &graph.stops {
        for &u in &stop.unlocks {
            indegree[u] += 1;
        }
    }
    for &i in &graph.initially_available {
        indegree[i] = 0;
    }

    let mut visited = vec![false; graph.stops.len()];
    let mut best: Option<(Seconds, Vec<usize>)> = None;
    let mut path = Vec::with_capacity(graph.stops.len());

    recurse(
        &ctx,
        graph.initially_available.clone(),
        indegree,
        &mut visited,
        vehicle.position.node,
        clock + vehicle.position.offset,
        None,
        vehicle.passengers.len(),
        &mut path,
        &mut best,
    );

    let (_, order_idx) = best?;
    let order: Vec<NodeStop> = order_idx.iter().map(|&i| graph.stops[i].stop).collect();
    let cost = cost::objective_cost(
        &order,
        vehicle.position.node,
        clock + vehicle.position.offset,
        network,
        &ctx.requests,
        objective,
    );
    Some((cost, order))
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    ctx: &SearchCtx,
    available: Vec<usize>,
    indegree: Vec<usize>,
    visited: &mut [bool],
    loc: NodeId,
    clock: Seconds,
    last_action: Option<LastAction>,
    onboard: usize,
    path: &mut Vec<usize>,
    best: &mut Option<(Seconds, Vec<usize>)>,
) {
    if let Some(deadline) = ctx.deadline {
        if Instant::now() >= deadline {
            return;
        }
    }

    if available.is_empty() {
        if path.len() == ctx.stops.len() {
            if best.as_ref().map(|(c, _)| clock < *c).unwrap_or(true) {
                *best = Some((clock, path.clone()));
            }
        }
        return;
    }

    let mut sorted = available.clone();
    sorted.sort_by_key(|&i| {
        let s = &ctx.stops[i].stop;
        (s.node, !s.is_pickup, i)
    });

    let mut prev_dropoff_node: Option<NodeId> = None;
    for &candidate in &sorted {
        let stop = ctx.stops[candidate].stop;

        if !stop.is_pickup {
            if let Some(n) = prev_dropoff_node {
                if n == stop.node {
                    continue;
                }
            }
        }
        prev_dropoff_node = if !stop.is_pickup { Some(stop.node) } else { None };

        let mut arrive = clock + Seconds(ctx.network.time(loc as i64, stop.node));
        match last_action {
            Some(LastAction::Dropoff) if stop.node != loc || stop.is_pickup => {
                arrive = arrive
                    + Seconds(ctx.network.time(model::base_types::DWELL_ALIGHT_SENTINEL, stop.node));
            }
            Some(LastAction::Pickup) if stop.node != loc || !stop.is_pickup => {
                arrive = arrive
                    + Seconds(ctx.network.time(model::base_types::DWELL_PICKUP_SENTINEL, stop.node));
            }
            _ => {}
        }

        let request = ctx.requests[&stop.request];
        let new_onboard;
        if stop.is_pickup {
            arrive = arrive.max(request.entry_time);
            if arrive > request.latest_boarding {
                continue;
            }
            if onboard >= ctx.capacity {
                continue;
            }
            new_onboard = onboard + 1;
        } else {
            if arrive > request.latest_alighting {
                continue;
            }
            new_onboard = onboard.saturating_sub(1);
        }

        if let Some((best_clock, _)) = best {
            if arrive >= *best_clock {
                continue;
            }
        }

        // forward reachability: every still-unvisited stop must remain
        // reachable by its own deadline from here.
        let mut reachable = true;
        for (idx, v) in visited.iter().enumerate() {
            if *v || idx == candidate {
                continue;
            }
            let other = &ctx.stops[idx].stop;
            let deadline = deadline_of(other, &ctx.requests);
            if arrive + Seconds(ctx.network.time(stop.node as i64, other.node)) > deadline {
                reachable = false;
                break;
            }
        }
        if !reachable {
            continue;
        }

        let mut next_available: Vec<usize> = available
            .iter()
            .copied()
            .filter(|&i| i != candidate)
            .collect();
        let mut next_indegree = indegree.clone();
        for &u in &ctx.stops[candidate].unlocks {
            next_indegree[u] = next_indegree[u].saturating_sub(1);
            if next_indegree[u] == 0 {
                next_available.push(u);
            }
        }

        visited[candidate] = true;
        path.push(candidate);
        recurse(
            ctx,
            next_available,
            next_indegree,
            visited,
            stop.node,
            arrive,
            Some(if stop.is_pickup {
                LastAction::Pickup
            } else {
                LastAction::Dropoff
            }),
            new_onboard,
            path,
            best,
        );
        path.pop();
        visited[candidate] = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::config::CtspPolicy;
    use model::network::Network;

    /// A straight line of `n` nodes, `step` seconds apart, times equal to
    /// distances, with the full chain plus its reverse as edges.
    fn line_network(n: usize, step: i64) -> Network {
        let mut times = vec![vec![0i64; n]; n];
        for i in 0..n {
            for j in 0..n {
                times[i][j] = (j as i64 - i as i64).abs() * step;
            }
        }
        let distances = times.clone();
        let mut edges = Vec::new();
        for i in 0..n - 1 {
            edges.push((i as NodeId, (i + 1) as NodeId, step));
            edges.push(((i + 1) as NodeId, i as NodeId, step));
        }
        Network::from_matrices(times, distances, edges, 0, 0)
    }

    fn request(id: RequestId, origin: NodeId, dest: NodeId, entry: i64, network: &Network) -> Request {
        Request::new(
            id,
            origin,
            0.0,
            0.0,
            dest,
            0.0,
            0.0,
            Seconds(entry),
            Seconds(network.time(origin as i64, dest)),
            Seconds(300),
            Seconds(600),
        )
    }

    #[test]
    fn trivial_single_rider() {
        let network = line_network(3, 60);
        let r = request(1, 0, 2, 0, &network);
        let vehicle = Vehicle::new(1, 4, 0);
        let mut all = HashMap::new();
        all.insert(r.id, &r);

        let (cost, order) = search_with_policy(
            &vehicle,
            &[&r],
            &all,
            Seconds(0),
            &network,
            CtspPolicy::Full,
            CtspObjective::Vtt,
            usize::MAX,
            None,
        )
        .expect("should be feasible");

        assert_eq!(cost, 120.0);
        assert_eq!(order, vec![NodeStop::pickup(1, 0), NodeStop::dropoff(1, 2)]);
    }

    #[test]
    fn shared_ride_pickup_chain() {
        let network = line_network(4, 60);
        let r1 = request(1, 0, 3, 0, &network);
        let r2 = request(2, 1, 2, 0, &network);
        let vehicle = Vehicle::new(1, 4, 0);
        let mut all = HashMap::new();
        all.insert(r1.id, &r1);
        all.insert(r2.id, &r2);

        let (_, order) = search_with_policy(
            &vehicle,
            &[&r1, &r2],
            &all,
            Seconds(0),
            &network,
            CtspPolicy::Full,
            CtspObjective::Vtt,
            usize::MAX,
            None,
        )
        .expect("joint pickup chain should be feasible");

        assert_eq!(
            order,
            vec![
                NodeStop::pickup(1, 0),
                NodeStop::pickup(2, 1),
                NodeStop::dropoff(2, 2),
                NodeStop::dropoff(1, 3),
            ]
        );
    }

    #[test]
    fn capacity_block_forces_rejection() {
        let network = line_network(4, 60);
        // both deadlines are only reachable by the simultaneous-onboard
        // order (pick both, drop both); either sequential order a
        // capacity-1 vehicle is limited to blows one of the two deadlines.
        let mut r1 = request(1, 0, 3, 0, &network);
        r1.latest_boarding = Seconds(50);
        let mut r2 = request(2, 1, 2, 0, &network);
        r2.latest_boarding = Seconds(100);
        let vehicle = Vehicle::new(1, 1, 0);
        let mut all = HashMap::new();
        all.insert(r1.id, &r1);
        all.insert(r2.id, &r2);

        let result = search_with_policy(
            &vehicle,
            &[&r1, &r2],
            &all,
            Seconds(0),
            &network,
            CtspPolicy::Full,
            CtspObjective::Vtt,
            usize::MAX,
            None,
        );
        assert!(result.is_none());
    }

    #[test]
    fn deadline_block_rejects_late_pickup() {
        let network = line_network(4, 60);
        let r1 = request(1, 0, 3, 0, &network);
        let mut r2 = request(2, 1, 2, 0, &network);
        r2.latest_boarding = Seconds(30);
        let vehicle = Vehicle::new(1, 4, 0);
        let mut all = HashMap::new();
        all.insert(r1.id, &r1);
        all.insert(r2.id, &r2);

        let result = search_with_policy(
            &vehicle,
            &[&r1, &r2],
            &all,
            Seconds(0),
            &network,
            CtspPolicy::Full,
            CtspObjective::Vtt,
            usize::MAX,
            None,
        );
        assert!(result.is_none());
    }
}
