use std::collections::BTreeSet;

use crate::base_types::{Cost, RequestId, VehicleId};
use crate::nodestop::NodeStop;

/// One candidate route for a vehicle: a visit order together with its cost
/// under the active objective and the set of requests it serves. Trips are
/// value types, keyed logically by `(vehicle, requests)` — there is no
/// back-reference from a `Trip` to the vehicle or requests it touches
/// beyond the plain ids stored here, so trips never form reference cycles.
#[derive(Debug, Clone)]
pub struct Trip {
    pub vehicle: VehicleId,
    pub cost: Cost,
    pub order_record: Vec<NodeStop>,
    pub requests: BTreeSet<RequestId>,
    /// True when this trip was not found by a fresh search but carried
    /// over verbatim (via feasibility replay) from the vehicle's previous
    /// `order_record`, to satisfy the commitment invariant.
    pub use_memory: bool,
    /// Reserved for a future rebalancing trip kind; always false today,
    /// since rebalancing is not implemented.
    pub is_fake: bool,
}

impl Trip {
    pub fn new(
        vehicle: VehicleId,
        cost: Cost,
        order_record: Vec<NodeStop>,
        requests: BTreeSet<RequestId>,
    ) -> Trip {
        Trip {
            vehicle,
            cost,
            order_record,
            requests,
            use_memory: false,
            is_fake: false,
        }
    }

    pub fn with_memory(mut self) -> Trip {
        self.use_memory = true;
        self
    }

    pub fn is_baseline(&self) -> bool {
        self.requests.is_empty()
    }
}
