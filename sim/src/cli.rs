use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use model::base_types::Seconds;
use model::config::{
    AssignmentConfig, AssignmentObjective, Algorithm, ClockConfig, Config, CtspObjective,
    CtspPolicy, FleetConfig, PathsConfig, RuntimeConfig, SearchConfig, ServiceConfig,
};

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum CtspArg {
    Full,
    FixOnboard,
    FixPrefix,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum CtspObjectiveArg {
    Vtt,
    Delay,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum AssignmentObjectiveArg {
    ServiceRate,
    Rmt,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum AlgorithmArg {
    IlpFull,
}

/// Command-line / environment configuration for one simulation run. Every
/// flag has an environment-variable fallback (`clap`'s `env` feature), so
/// the binary can be driven identically from a shell script or a batch
/// scheduler.
#[derive(Parser, Debug)]
#[command(name = "rideshare_sim", about = "Batch ride-pooling assignment simulator")]
pub struct Cli {
    #[arg(long, env = "DATAROOT", default_value = "data")]
    pub dataroot: PathBuf,
    #[arg(long, env = "RESULTS_DIRECTORY", default_value = "results")]
    pub results_directory: PathBuf,
    #[arg(long, env = "LOG_FILE", default_value = "run.log")]
    pub log_file: PathBuf,
    #[arg(long, env = "TIMEFILE", default_value = "time.csv")]
    pub timefile: PathBuf,
    #[arg(long, env = "DISTANCE_FILE", default_value = "distance.csv")]
    pub distance_file: PathBuf,
    #[arg(long, env = "EDGECOST_FILE", default_value = "edges.csv")]
    pub edgecost_file: PathBuf,
    #[arg(long, env = "REQUEST_DATA_FILE", default_value = "requests.csv")]
    pub request_data_file: PathBuf,
    #[arg(long, env = "VEHICLE_DATA_FILE", default_value = "vehicles.csv")]
    pub vehicle_data_file: PathBuf,

    #[arg(long, env = "VEHICLE_LIMIT")]
    pub vehicle_limit: Option<usize>,
    #[arg(long, env = "CARSIZE")]
    pub carsize: Option<u8>,

    #[arg(long, env = "MAX_WAITING", default_value_t = 300)]
    pub max_waiting: i64,
    #[arg(long, env = "MAX_DETOUR", default_value_t = 600)]
    pub max_detour: i64,
    #[arg(long, env = "DWELL_PICKUP", default_value_t = 30)]
    pub dwell_pickup: i64,
    #[arg(long, env = "DWELL_ALIGHT", default_value_t = 30)]
    pub dwell_alight: i64,
    #[arg(long, env = "LAST_MINUTE_SERVICE", default_value_t = false)]
    pub last_minute_service: bool,

    #[arg(long, env = "INITIAL_TIME", default_value_t = 0)]
    pub initial_time: i64,
    #[arg(long, env = "FINAL_TIME", default_value_t = 86400)]
    pub final_time: i64,
    #[arg(long, env = "INTERVAL", default_value_t = 30)]
    pub interval: i64,

    #[arg(long, env = "ALGORITHM", value_enum, default_value_t = AlgorithmArg::IlpFull)]
    pub algorithm: AlgorithmArg,
    #[arg(long, env = "CTSP", value_enum, default_value_t = CtspArg::Full)]
    pub ctsp: CtspArg,
    #[arg(long, env = "CTSP_OBJECTIVE", value_enum, default_value_t = CtspObjectiveArg::Vtt)]
    pub ctsp_objective: CtspObjectiveArg,
    #[arg(long, env = "MAX_NEW", default_value_t = 8)]
    pub max_new: usize,
    #[arg(long, env = "LP_LIMITVALUE", default_value_t = 10)]
    pub lp_limitvalue: usize,
    #[arg(long, env = "RTV_TIMELIMIT", default_value_t = 0)]
    pub rtv_timelimit: i64,
    #[arg(long, env = "PRUNING_RV_K", default_value_t = 30)]
    pub pruning_rv_k: usize,
    #[arg(long, env = "PRUNING_RR_K", default_value_t = 10)]
    pub pruning_rr_k: usize,

    #[arg(long, env = "ASSIGNMENT_OBJECTIVE", value_enum, default_value_t = AssignmentObjectiveArg::ServiceRate)]
    pub assignment_objective: AssignmentObjectiveArg,
    #[arg(long, env = "MISS_COST", default_value_t = 1_000_000.0)]
    pub miss_cost: f64,
    #[arg(long, env = "RMT_REWARD", default_value_t = 1.0)]
    pub rmt_reward: f64,

    #[arg(long, env = "THREADS", default_value_t = 4)]
    pub threads: usize,
}

impl Cli {
    pub fn into_config(self) -> Config {
        Config::new(
            PathsConfig {
                dataroot: self.dataroot.clone(),
                results_directory: self.results_directory,
                log_file: self.log_file,
                timefile: self.dataroot.join(&self.timefile),
                distance_file: self.dataroot.join(&self.distance_file),
                edgecost_file: self.dataroot.join(&self.edgecost_file),
                request_data_file: self.dataroot.join(&self.request_data_file),
                vehicle_data_file: self.dataroot.join(&self.vehicle_data_file),
            },
            FleetConfig {
                vehicle_limit: self.vehicle_limit,
                carsize: self.carsize,
            },
            ServiceConfig {
                max_waiting: Seconds(self.max_waiting),
                max_detour: Seconds(self.max_detour),
                dwell_pickup: Seconds(self.dwell_pickup),
                dwell_alight: Seconds(self.dwell_alight),
                last_minute_service: self.last_minute_service,
            },
            ClockConfig {
                initial_time: Seconds(self.initial_time),
                final_time: Seconds(self.final_time),
                interval: Seconds(self.interval),
            },
            SearchConfig {
                algorithm: match self.algorithm {
                    AlgorithmArg::IlpFull => Algorithm::IlpFull,
                },
                ctsp: match self.ctsp {
                    CtspArg::Full => CtspPolicy::Full,
                    CtspArg::FixOnboard => CtspPolicy::FixOnboard,
                    CtspArg::FixPrefix => CtspPolicy::FixPrefix,
                },
                ctsp_objective: match self.ctsp_objective {
                    CtspObjectiveArg::Vtt => CtspObjective::Vtt,
                    CtspObjectiveArg::Delay => CtspObjective::Delay,
                },
                max_new: self.max_new,
                lp_limitvalue: self.lp_limitvalue,
                rtv_timelimit: Seconds(self.rtv_timelimit),
                pruning_rv_k: self.pruning_rv_k,
                pruning_rr_k: self.pruning_rr_k,
            },
            AssignmentConfig {
                objective: match self.assignment_objective {
                    AssignmentObjectiveArg::ServiceRate => AssignmentObjective::ServiceRate,
                    AssignmentObjectiveArg::Rmt => AssignmentObjective::Rmt,
                },
                miss_cost: self.miss_cost,
                rmt_reward: self.rmt_reward,
            },
            RuntimeConfig {
                threads: self.threads,
            },
        )
    }
}
