use model::base_types::RequestId;
use model::config::CtspPolicy;
use model::nodestop::NodeStop;
use model::request::Request;
use model::vehicle::Vehicle;

/// One visit atom plus the precedence it imposes: a pickup unlocks its own
/// dropoff; entries in a prefix-locked chain unlock the next chain entry.
/// Indices are positions into the `Vec<MetaStop>` the search works on.
#[derive(Debug, Clone)]
pub struct MetaStop {
    pub stop: NodeStop,
    pub unlocks: Vec<usize>,
}

/// The built stop graph for one feasibility search call: every meta-stop,
/// which indices are available before anything has been visited, and a
/// cap on how many new requests may be boarded (used by `FixPrefix`).
pub struct StopGraph {
    pub stops: Vec<MetaStop>,
    pub initially_available: Vec<usize>,
}

/// Builds the stop graph for a fresh (non-replay) search over `vehicle`'s
/// current passengers plus `new_requests`, honoring the configured
/// prefix-lock policy. See the feasibility-search contract for the exact
/// rules each policy encodes.
pub fn build_stop_graph(
    vehicle: &Vehicle,
    new_requests: &[&Request],
    policy: CtspPolicy,
    lp_limitvalue: usize,
) -> Option<StopGraph> {
    let mut stops = Vec::new();
    let mut pickup_idx = std::collections::HashMap::new();
    let mut dropoff_idx = std::collections::HashMap::new();

    for r in new_requests {
        let p = stops.len();
        stops.push(MetaStop {
            stop: NodeStop::pickup(r.id, r.origin),
            unlocks: Vec::new(),
        });
        pickup_idx.insert(r.id, p);
        let d = stops.len();
        stops.push(MetaStop {
            stop: NodeStop::dropoff(r.id, r.destination),
            unlocks: Vec::new(),
        });
        dropoff_idx.insert(r.id, d);
        stops[p].unlocks.push(d);
    }

    // onboard passengers only need a dropoff; their order is taken from
    // the vehicle's previous order_record so a prefix-lock policy can
    // honor the order already committed to passengers.
    let onboard_dropoffs: Vec<usize> = vehicle
        .order_record
        .iter()
        .filter(|ns| !ns.is_pickup && vehicle.passengers.contains(&ns.request))
        .map(|ns| {
            let idx = stops.len();
            stops.push(MetaStop {
                stop: *ns,
                unlocks: Vec::new(),
            });
            idx
        })
        .collect();

    let new_count = new_requests.len();
    let total_meta_stops = stops.len();

    let initially_available = match policy {
        CtspPolicy::Full => {
            let mut avail: Vec<usize> = new_requests.iter().map(|r| pickup_idx[&r.id]).collect();
            avail.extend(onboard_dropoffs.iter().copied());
            avail
        }
        CtspPolicy::FixOnboard => {
            if new_count + vehicle.passengers.len() > vehicle.capacity as usize
                && !onboard_dropoffs.is_empty()
            {
                chain(&mut stops, &onboard_dropoffs);
                let mut avail: Vec<usize> =
                    new_requests.iter().map(|r| pickup_idx[&r.id]).collect();
                avail.push(onboard_dropoffs[0]);
                avail
            } else {
                let mut avail: Vec<usize> =
                    new_requests.iter().map(|r| pickup_idx[&r.id]).collect();
                avail.extend(onboard_dropoffs.iter().copied());
                avail
            }
        }
        CtspPolicy::FixPrefix => {
            if total_meta_stops > lp_limitvalue {
                if new_count > lp_limitvalue / 2 {
                    return None;
                }
                let prefix_len = (total_meta_stops - lp_limitvalue).min(onboard_dropoffs.len());
                let (locked, free) = onboard_dropoffs.split_at(prefix_len);
                chain(&mut stops, locked);
                let mut avail: Vec<usize> = Vec::new();
                match locked.last() {
                    // free dropoffs and new pickups only unlock once the
                    // locked prefix chain has been walked to its end; only
                    // the first locked stop is initially available.
                    Some(&last) => {
                        avail.push(locked[0]);
                        for &idx in free {
                            stops[last].unlocks.push(idx);
                        }
                        for r in new_requests {
                            stops[last].unlocks.push(pickup_idx[&r.id]);
                        }
                    }
                    None => {
                        avail.extend(free.iter().copied());
                        avail.extend(new_requests.iter().map(|r| pickup_idx[&r.id]));
                    }
                }
                avail
            } else {
                let mut avail: Vec<usize> =
                    new_requests.iter().map(|r| pickup_idx[&r.id]).collect();
                avail.extend(onboard_dropoffs.iter().copied());
                avail
            }
        }
    };

    Some(StopGraph {
        stops,
        initially_available,
    })
}

/// Builds a single fully chained stop graph replaying `order` verbatim:
/// every meta-stop unlocks only the next one, so the only feasible visit
/// order is the stored one. Used to certify a committed trip is still
/// feasible at a later clock.
pub fn build_replay_graph(order: &[NodeStop]) -> StopGraph {
    let stops: Vec<MetaStop> = order
        .iter()
        .map(|ns| MetaStop {
            stop: *ns,
            unlocks: Vec::new(),
        })
        .collect();
    let mut stops = stops;
    let indices: Vec<usize> = (0..stops.len()).collect();
    chain(&mut stops, &indices);
    StopGraph {
        initially_available: indices.first().copied().into_iter().collect(),
        stops,
    }
}

fn chain(stops: &mut [MetaStop], indices: &[usize]) {
    for w in indices.windows(2) {
        stops[w[0]].unlocks.push(w[1]);
    }
}

pub fn deadline_of(stop: &NodeStop, requests: &std::collections::HashMap<RequestId, &Request>) -> model::base_types::Seconds {
    let r = requests[&stop.request];
    if stop.is_pickup {
        r.latest_boarding
    } else {
        r.latest_alighting
    }
}
