use std::path::PathBuf;

use crate::base_types::{Cost, PassengerCount, Seconds};

/// Prefix-lock policy for the feasibility search: how much of a vehicle's
/// previously planned order must be replayed verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtspPolicy {
    Full,
    FixOnboard,
    FixPrefix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtspObjective {
    Vtt,
    Delay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentObjective {
    ServiceRate,
    Rmt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    IlpFull,
}

pub struct Config {
    pub paths: PathsConfig,
    pub fleet: FleetConfig,
    pub service: ServiceConfig,
    pub clock: ClockConfig,
    pub search: SearchConfig,
    pub assignment: AssignmentConfig,
    pub runtime: RuntimeConfig,
}

pub struct PathsConfig {
    pub dataroot: PathBuf,
    pub results_directory: PathBuf,
    pub log_file: PathBuf,
    pub timefile: PathBuf,
    pub distance_file: PathBuf,
    pub edgecost_file: PathBuf,
    pub request_data_file: PathBuf,
    pub vehicle_data_file: PathBuf,
}

pub struct FleetConfig {
    pub vehicle_limit: Option<usize>,
    /// Overrides every vehicle's on-disk capacity when `Some` and positive.
    pub carsize: Option<PassengerCount>,
}

pub struct ServiceConfig {
    pub max_waiting: Seconds,
    pub max_detour: Seconds,
    pub dwell_pickup: Seconds,
    pub dwell_alight: Seconds,
    pub last_minute_service: bool,
}

pub struct ClockConfig {
    pub initial_time: Seconds,
    pub final_time: Seconds,
    pub interval: Seconds,
}

pub struct SearchConfig {
    pub algorithm: Algorithm,
    pub ctsp: CtspPolicy,
    pub ctsp_objective: CtspObjective,
    pub max_new: usize,
    pub lp_limitvalue: usize,
    pub rtv_timelimit: Seconds,
    pub pruning_rv_k: usize,
    pub pruning_rr_k: usize,
}

pub struct AssignmentConfig {
    pub objective: AssignmentObjective,
    pub miss_cost: Cost,
    pub rmt_reward: Cost,
}

pub struct RuntimeConfig {
    pub threads: usize,
}

impl Config {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        paths: PathsConfig,
        fleet: FleetConfig,
        service: ServiceConfig,
        clock: ClockConfig,
        search: SearchConfig,
        assignment: AssignmentConfig,
        runtime: RuntimeConfig,
    ) -> Config {
        Config {
            paths,
            fleet,
            service,
            clock,
            search,
            assignment,
            runtime,
        }
    }
}
