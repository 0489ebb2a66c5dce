use std::collections::BTreeSet;

use crate::base_types::{NodeId, PassengerCount, RequestId, Seconds, VehicleId};
use crate::nodestop::NodeStop;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleState {
    Idle,
    EnRoute,
    InUse,
    Rebalancing,
}

/// A vehicle's in-flight position: travelling from `prev_node` toward
/// `node`, with `offset` seconds still to run before it arrives at `node`.
/// `offset == 0` means the vehicle is parked at `node` (and then
/// `prev_node == node`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub prev_node: NodeId,
    pub node: NodeId,
    pub offset: Seconds,
}

impl Position {
    pub fn parked(node: NodeId) -> Position {
        Position {
            prev_node: node,
            node,
            offset: Seconds::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub capacity: PassengerCount,
    pub position: Position,
    pub passengers: BTreeSet<RequestId>,
    pub pending_requests: BTreeSet<RequestId>,
    pub order_record: Vec<NodeStop>,

    pub state: VehicleState,
    pub time_in_state: [Seconds; 4],
    pub total_distance: f64,
    pub rebalancing_distance: f64,

    pub just_boarded: Vec<RequestId>,
    pub just_alighted: Vec<RequestId>,
}

impl Vehicle {
    pub fn new(id: VehicleId, capacity: PassengerCount, start_node: NodeId) -> Vehicle {
        Vehicle {
            id,
            capacity,
            position: Position::parked(start_node),
            passengers: BTreeSet::new(),
            pending_requests: BTreeSet::new(),
            order_record: Vec::new(),
            state: VehicleState::Idle,
            time_in_state: [Seconds::ZERO; 4],
            total_distance: 0.0,
            rebalancing_distance: 0.0,
            just_boarded: Vec::new(),
            just_alighted: Vec::new(),
        }
    }

    pub fn occupancy(&self) -> usize {
        self.passengers.len()
    }

    pub fn has_free_seat(&self) -> bool {
        self.occupancy() < self.capacity as usize
    }

    pub fn accrue_state_time(&mut self, state: VehicleState, elapsed: Seconds) {
        self.time_in_state[state as usize] = self.time_in_state[state as usize] + elapsed;
    }

    pub fn set_state(&mut self, state: VehicleState) {
        self.state = state;
    }

    pub fn begin_tick(&mut self) {
        self.just_boarded.clear();
        self.just_alighted.clear();
    }
}
