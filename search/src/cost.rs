use std::collections::HashMap;

use model::base_types::{Cost, RequestId, Seconds};
use model::config::CtspObjective;
use model::network::Network;
use model::nodestop::NodeStop;
use model::request::Request;

/// Replays `order` through the same arrival-time arithmetic the search
/// uses, returning the final clock and, for each dropoff, the delay
/// relative to that request's ideal direct travel time. This is a
/// deliberate second pass rather than folding delay accounting into the
/// branch-and-bound itself, mirroring the two-pass shape of the system
/// this was ported from.
pub fn replay_arrivals(
    order: &[NodeStop],
    start_node: model::base_types::NodeId,
    start_clock: Seconds,
    network: &Network,
    requests: &HashMap<RequestId, &Request>,
) -> (Seconds, Vec<(RequestId, Seconds)>) {
    let mut clock = start_clock;
    let mut loc = start_node;
    let mut last_pickup: Option<bool> = None;
    let mut delays = Vec::new();

    for stop in order {
        let mut arrive = clock + Seconds(network.time(loc as i64, stop.node));
        match last_pickup {
            Some(true) if stop.node != loc || !stop.is_pickup => {
                arrive = arrive + Seconds(network.time(model::base_types::DWELL_PICKUP_SENTINEL, stop.node));
            }
            Some(false) if stop.node != loc || stop.is_pickup => {
                arrive = arrive + Seconds(network.time(model::base_types::DWELL_ALIGHT_SENTINEL, stop.node));
            }
            _ => {}
        }
        if stop.is_pickup {
            let r = requests[&stop.request];
            arrive = arrive.max(r.entry_time);
        } else {
            let r = requests[&stop.request];
            let delay = (arrive - r.entry_time).saturating_sub(r.ideal_traveltime);
            delays.push((stop.request, delay));
        }
        clock = arrive;
        loc = stop.node;
        last_pickup = Some(stop.is_pickup);
    }
    (clock, delays)
}

pub fn objective_cost(
    order: &[NodeStop],
    start_node: model::base_types::NodeId,
    start_clock: Seconds,
    network: &Network,
    requests: &HashMap<RequestId, &Request>,
    objective: CtspObjective,
) -> Cost {
    let (final_clock, delays) = replay_arrivals(order, start_node, start_clock, network, requests);
    match objective {
        CtspObjective::Vtt => final_clock.0 as Cost,
        CtspObjective::Delay => delays.iter().map(|(_, d)| d.0 as Cost).sum(),
    }
}
