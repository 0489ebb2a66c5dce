use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use model::base_types::{RequestId, Seconds};
use model::config::Config;
use model::error::{SimError, SimResult};
use model::network::Network;
use model::request::Request;
use model::vehicle::Vehicle;
use model::{loaders, Trip};
use tracing::info;

use crate::movement::advance_vehicles;
use crate::resultlog::{ResultLog, Stats};

/// Drives the simulation from `config.clock.initial_time` to
/// `config.clock.final_time` in steps of `config.clock.interval`: admit
/// new requests, run the batch assignment core, apply the chosen routes,
/// advance vehicles, and roll statistics forward.
pub fn run(config: Arc<Config>) -> SimResult<()> {
    let network = Network::load(
        &config.paths.timefile,
        &config.paths.distance_file,
        &config.paths.edgecost_file,
        config.service.dwell_pickup.0,
        config.service.dwell_alight.0,
    )?;

    let mut requests_vec = loaders::load_requests(
        &config.paths.request_data_file,
        &network,
        &config.service,
    )?;
    let mut vehicles = loaders::load_vehicles(&config.paths.vehicle_data_file, &config.fleet)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.runtime.threads)
        .build()
        .map_err(|e| SimError::Configuration(e.to_string()))?;

    let mut requests: HashMap<RequestId, Request> =
        requests_vec.drain(..).map(|r| (r.id, r)).collect();

    let mut stats = Stats::default();
    let mut result_log = ResultLog::create(&config)?;
    let mut flagged_errors: HashSet<RequestId> = HashSet::new();

    let mut clock = config.clock.initial_time;
    while clock < config.clock.final_time {
        pool.install(|| run_tick(&config, &network, &mut requests, &mut vehicles, clock))?;

        advance_vehicles(&mut vehicles, &mut requests, &network, &config, clock);

        let (tick_served, tick_shared) = harvest(&vehicles, &requests, &mut stats);
        result_log.write_tick(clock, tick_served, tick_shared, requests.len() as u64);

        for r in requests.values() {
            if !r.is_boarded() && !flagged_errors.contains(&r.id) && clock + config.clock.interval > r.latest_boarding
            {
                flagged_errors.insert(r.id);
                stats.errors += 1;
            }
        }

        info!(clock = clock.0, served = tick_served, "tick complete");
        clock = clock + config.clock.interval;
    }

    result_log.write_summary(&stats, &requests, &vehicles);
    Ok(())
}

fn run_tick(
    config: &Arc<Config>,
    network: &Network,
    requests: &mut HashMap<RequestId, Request>,
    vehicles: &mut [Vehicle],
    clock: Seconds,
) -> SimResult<()> {
    let all_requests: HashMap<RequestId, &Request> = requests.iter().map(|(k, v)| (*k, v)).collect();

    let new_requests: Vec<&Request> = requests
        .values()
        .filter(|r| !r.assigned && !r.is_boarded() && r.entry_time <= clock)
        .collect();
    let vehicle_refs: Vec<&Vehicle> = vehicles.iter().collect();

    let rv = solver::build_rv_graph(&new_requests, &vehicle_refs, &all_requests, clock, network, config);
    let rr = solver::build_rr_graph(&new_requests, &all_requests, clock, network, config);
    let rtv = solver::build_rtv_graph(&vehicle_refs, &all_requests, &rv, &rr, clock, network, config)?;
    let assignment = solver::solve_assignment(&rtv, &all_requests, config);

    let mut chosen_by_vehicle: HashMap<u32, Trip> = assignment.chosen;
    for vehicle in vehicles.iter_mut() {
        if let Some(trip) = chosen_by_vehicle.remove(&vehicle.id) {
            for &rid in &trip.requests {
                if !vehicle.passengers.contains(&rid) {
                    vehicle.pending_requests.insert(rid);
                }
                if let Some(r) = requests.get_mut(&rid) {
                    r.assigned = true;
                }
            }
            vehicle.order_record = trip.order_record;
        }
    }

    Ok(())
}

fn harvest(vehicles: &[Vehicle], requests: &HashMap<RequestId, Request>, stats: &mut Stats) -> (u64, u64) {
    let mut tick_served = 0u64;
    let mut tick_shared = 0u64;
    for vehicle in vehicles {
        for &rid in &vehicle.just_alighted {
            if let Some(r) = requests.get(&rid) {
                stats.served += 1;
                tick_served += 1;
                if let (Some(boarding), Some(alighting)) = (r.boarding_time, r.alighting_time) {
                    stats.total_wait += (boarding - r.entry_time).0;
                    stats.total_ride += (alighting - boarding).0;
                }
                stats.total_delay += r.delay().0;
                if r.shared {
                    stats.total_shared += 1;
                    tick_shared += 1;
                }
            }
        }
    }
    (tick_served, tick_shared)
}
