use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};

use model::base_types::{RequestId, Seconds};
use model::config::Config;
use model::error::{SimError, SimResult};
use model::request::Request;
use model::vehicle::Vehicle;

/// Accumulates the statistics the result log reports: how many requests
/// have been served, how long they waited/rode/were delayed, how full
/// vehicles ran, and how often rides were shared.
#[derive(Default)]
pub struct Stats {
    pub served: u64,
    pub errors: u64,
    pub total_wait: i64,
    pub total_ride: i64,
    pub total_delay: i64,
    pub total_shared: u64,
}

pub struct ResultLog {
    writer: BufWriter<File>,
}

impl ResultLog {
    pub fn create(config: &Config) -> SimResult<ResultLog> {
        std::fs::create_dir_all(&config.paths.results_directory).map_err(|e| SimError::InputFile {
            path: config.paths.results_directory.clone(),
            reason: e.to_string(),
        })?;
        let path = config.paths.results_directory.join(&config.paths.log_file);
        let file = File::create(&path).map_err(|e| SimError::InputFile {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "# rideshare_sim run").ok();
        writeln!(writer, "max_waiting={}", config.service.max_waiting).ok();
        writeln!(writer, "max_detour={}", config.service.max_detour).ok();
        writeln!(writer, "interval={}", config.clock.interval).ok();
        Ok(ResultLog { writer })
    }

    pub fn write_tick(&mut self, clock: Seconds, tick_served: u64, tick_shared: u64, total_requests: u64) {
        let service_rate = if total_requests > 0 {
            100.0 * tick_served as f64 / total_requests as f64
        } else {
            0.0
        };
        writeln!(
            self.writer,
            "tick={} service_rate={:.2}% served={} shared={}",
            clock, service_rate, tick_served, tick_shared
        )
        .ok();
    }

    pub fn write_summary(&mut self, stats: &Stats, requests: &HashMap<RequestId, Request>, vehicles: &[Vehicle]) {
        let total = requests.len() as u64;
        let service_rate = if total > 0 {
            100.0 * stats.served as f64 / total as f64
        } else {
            0.0
        };
        let avg_wait = avg(stats.total_wait, stats.served);
        let avg_ride = avg(stats.total_ride, stats.served);
        let avg_delay = avg(stats.total_delay, stats.served);
        let mean_passengers = if !vehicles.is_empty() {
            vehicles.iter().map(|v| v.passengers.len()).sum::<usize>() as f64 / vehicles.len() as f64
        } else {
            0.0
        };
        let shared_rate = if stats.served > 0 {
            100.0 * stats.total_shared as f64 / stats.served as f64
        } else {
            0.0
        };
        writeln!(self.writer, "--- summary ---").ok();
        writeln!(self.writer, "total_requests={}", total).ok();
        writeln!(self.writer, "served={}", stats.served).ok();
        writeln!(self.writer, "errors={}", stats.errors).ok();
        writeln!(self.writer, "service_rate={:.2}%", service_rate).ok();
        writeln!(self.writer, "avg_waiting={:.1}s", avg_wait).ok();
        writeln!(self.writer, "avg_riding={:.1}s", avg_ride).ok();
        writeln!(self.writer, "avg_delay={:.1}s", avg_delay).ok();
        writeln!(self.writer, "mean_passengers={:.2}", mean_passengers).ok();
        writeln!(self.writer, "shared_rate={:.2}%", shared_rate).ok();
        writeln!(self.writer, "total_shared={}", stats.total_shared).ok();
        for v in vehicles {
            writeln!(
                self.writer,
                "vehicle={} idle_s={} enroute_s={} inuse_s={} rebalancing_s={} distance_m={:.1}",
                v.id,
                v.time_in_state[0],
                v.time_in_state[1],
                v.time_in_state[2],
                v.time_in_state[3],
                v.total_distance
            )
            .ok();
        }
    }
}

fn avg(total: i64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}
