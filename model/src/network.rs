use std::collections::{HashMap, VecDeque};
use std::path::Path;

use dashmap::DashMap;
use tracing::warn;

use crate::base_types::{NodeId, DWELL_ALIGHT_SENTINEL, DWELL_PICKUP_SENTINEL};
use crate::error::{SimError, SimResult};
use crate::vehicle::Position;

/// The maximum number of hops the bounded greedy walk takes before giving
/// up and returning whatever partial path it has built so far. Mirrors the
/// original system's defensive step cap.
const MAX_HOPS: usize = 200;

struct Edge {
    to: NodeId,
    weight: i64,
}

/// The read-only travel-time/distance/shortest-path oracle. Loaded once at
/// startup from the travel-time matrix, distance matrix, and edge-list
/// files; every query thereafter is pure except for the path memo, which
/// is a concurrent map shared across the worker pool.
pub struct Network {
    times: Vec<Vec<i64>>,
    distances: Vec<Vec<i64>>,
    adjacency: Vec<Vec<Edge>>,
    dwell_pickup: i64,
    dwell_alight: i64,
    path_memo: DashMap<(NodeId, NodeId), Vec<NodeId>>,
}

impl Network {
    pub fn node_count(&self) -> usize {
        self.times.len()
    }

    /// Builds a `Network` directly from in-memory matrices, bypassing the
    /// CSV loaders. Used by tests and by callers that already hold the
    /// data in memory.
    pub fn from_matrices(
        times: Vec<Vec<i64>>,
        distances: Vec<Vec<i64>>,
        edges: Vec<(NodeId, NodeId, i64)>,
        dwell_pickup: i64,
        dwell_alight: i64,
    ) -> Network {
        let mut adjacency: Vec<Vec<Edge>> = (0..times.len()).map(|_| Vec::new()).collect();
        for (from, to, weight) in edges {
            adjacency[from as usize].push(Edge { to, weight });
        }
        Network {
            times,
            distances,
            adjacency,
            dwell_pickup,
            dwell_alight,
            path_memo: DashMap::new(),
        }
    }

    pub fn load(
        timefile: &Path,
        distance_file: &Path,
        edgecost_file: &Path,
        dwell_pickup: i64,
        dwell_alight: i64,
    ) -> SimResult<Network> {
        let times = read_dense_matrix(timefile)?;
        let distances = read_dense_matrix(distance_file)?;
        if times.is_empty() {
            return Err(SimError::Configuration(
                "travel-time matrix has zero nodes".to_string(),
            ));
        }
        let adjacency = read_edge_list(edgecost_file, times.len())?;
        Ok(Network {
            times,
            distances,
            adjacency,
            dwell_pickup,
            dwell_alight,
            path_memo: DashMap::new(),
        })
    }

    pub fn time(&self, a: i64, b: NodeId) -> i64 {
        if a == DWELL_PICKUP_SENTINEL {
            return self.dwell_pickup;
        }
        if a == DWELL_ALIGHT_SENTINEL {
            return self.dwell_alight;
        }
        self.times[a as usize][b as usize]
    }

    pub fn distance(&self, a: i64, b: NodeId) -> i64 {
        if a == DWELL_PICKUP_SENTINEL || a == DWELL_ALIGHT_SENTINEL {
            return 0;
        }
        self.distances[a as usize][b as usize]
    }

    pub fn vehicle_time(&self, position: &Position, x: NodeId) -> i64 {
        position.offset.0 + self.time(position.node as i64, x)
    }

    pub fn vehicle_distance(&self, position: &Position, x: NodeId) -> i64 {
        self.distance(position.node as i64, x)
    }

    /// The ordered node sequence from `a` to `b`, `a` first and `b` last.
    /// Memoized per `(a, b)`. Computed by a bounded best-first walk over
    /// the adjacency list, using `time(., b)` as the remaining-cost
    /// estimate, falling back to a zero-weight-edge breadth-first
    /// expansion to break ties among equal-cost candidates.
    pub fn path(&self, a: NodeId, b: NodeId) -> Vec<NodeId> {
        if let Some(cached) = self.path_memo.get(&(a, b)) {
            return cached.clone();
        }
        let computed = self.search_path(a, b);
        self.path_memo.insert((a, b), computed.clone());
        computed
    }

    /// Walks one hop at a time from `a`, at each step greedily taking
    /// either a direct edge to `b` or the neighbor that strictly improves on
    /// the current best (weight to neighbor plus `time(neighbor, b)` as
    /// heuristic), mirroring the original system's single-path walk rather
    /// than a globally-relaxed shortest-path search: there is no `best_cost`
    /// table over every node, only a local one-hop decision at `here` each
    /// step, bounded by `MAX_HOPS` steps total.
    fn search_path(&self, a: NodeId, b: NodeId) -> Vec<NodeId> {
        let mut path = vec![a];
        let mut here = a;
        let mut count = 0usize;

        while here != b && count < MAX_HOPS {
            let mut best = self.time(here as i64, b) + 1;
            let mut next: Option<NodeId> = None;

            for edge in &self.adjacency[here as usize] {
                if edge.to == b {
                    next = Some(edge.to);
                    break;
                }
                let follow_up = self.time(edge.to as i64, b);
                if edge.weight > 0 && edge.weight + follow_up < best {
                    best = edge.weight + follow_up;
                    next = Some(edge.to);
                }
            }

            let next = match next {
                Some(n) => n,
                None => match self.zero_weight_fallback(here, b, &mut path) {
                    Some(n) => n,
                    None => break,
                },
            };

            path.push(next);
            here = next;
            count += 1;
        }

        if here != b {
            warn!(
                origin = a,
                destination = b,
                hops = count,
                "bounded path walk exhausted its hop budget without reaching the destination; returning partial path"
            );
        }
        path
    }

    /// Escapes a stall (no strictly-improving or direct hop from `here`) by
    /// locally expanding edges that don't worsen the estimate to `b`,
    /// splicing whatever intermediate hops it had to walk through onto
    /// `path` before returning the first node that either resumes progress
    /// (positive weight) or reaches `b` outright. Mirrors the original's
    /// zero-weight "heritage" chain, which resumes the walk from wherever it
    /// got stuck rather than restarting the whole search from `a`.
    fn zero_weight_fallback(&self, here: NodeId, b: NodeId, path: &mut Vec<NodeId>) -> Option<NodeId> {
        let comparison = self.time(here as i64, b);
        let mut heritage: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut queue: VecDeque<&Edge> = VecDeque::new();

        for edge in &self.adjacency[here as usize] {
            if edge.weight + self.time(edge.to as i64, b) <= comparison {
                heritage.insert(edge.to, vec![edge.to]);
                queue.push_back(edge);
            }
        }

        while let Some(n) = queue.pop_front() {
            for child in &self.adjacency[n.to as usize] {
                if child.weight + self.time(child.to as i64, b) > comparison {
                    continue;
                }
                if child.weight > 0 || child.to == b {
                    path.extend(heritage.get(&n.to).cloned().unwrap_or_default());
                    return Some(child.to);
                }
                if !heritage.contains_key(&child.to) {
                    let mut chain = heritage.get(&n.to).cloned().unwrap_or_default();
                    chain.push(child.to);
                    heritage.insert(child.to, chain);
                    queue.push_back(child);
                }
            }
        }
        None
    }
}

fn read_dense_matrix(path: &Path) -> SimResult<Vec<Vec<i64>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| SimError::InputFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SimError::InputFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut row = Vec::with_capacity(record.len());
        for field in record.iter() {
            let value: f64 = field.trim().parse().map_err(|_| SimError::InputFile {
                path: path.to_path_buf(),
                reason: format!("could not parse '{}' as a number", field),
            })?;
            row.push(value.round() as i64);
        }
        rows.push(row);
    }
    Ok(rows)
}

fn read_edge_list(path: &Path, node_count: usize) -> SimResult<Vec<Vec<Edge>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| SimError::InputFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let mut adjacency: Vec<Vec<Edge>> = (0..node_count).map(|_| Vec::new()).collect();
    for record in reader.records() {
        let record = record.map_err(|e| SimError::InputFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if record.len() < 3 {
            continue;
        }
        let origin: usize = record[0].trim().parse().map_err(|_| SimError::InputFile {
            path: path.to_path_buf(),
            reason: format!("bad origin node '{}'", &record[0]),
        })?;
        let dest: usize = record[1].trim().parse().map_err(|_| SimError::InputFile {
            path: path.to_path_buf(),
            reason: format!("bad destination node '{}'", &record[1]),
        })?;
        let weight: f64 = record[2].trim().parse().map_err(|_| SimError::InputFile {
            path: path.to_path_buf(),
            reason: format!("bad edge weight '{}'", &record[2]),
        })?;
        // on-disk nodes are 1-indexed; the in-memory matrices are 0-indexed.
        let origin = origin - 1;
        let dest = dest - 1;
        adjacency[origin].push(Edge {
            to: dest as NodeId,
            weight: weight.round() as i64,
        });
    }
    Ok(adjacency)
}
