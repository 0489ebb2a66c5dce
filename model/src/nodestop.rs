use crate::base_types::{NodeId, RequestId};

/// A single visit atom in a route: either the pickup or the dropoff of one
/// request. Ordering is lexicographic on `(request, is_pickup)` so that a
/// request's pickup (`is_pickup = true`, sorts before `false`... see
/// [`NodeStop::cmp`]) always precedes its dropoff when both are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeStop {
    pub request: RequestId,
    pub is_pickup: bool,
    pub node: NodeId,
}

impl NodeStop {
    pub fn pickup(request: RequestId, node: NodeId) -> NodeStop {
        NodeStop {
            request,
            is_pickup: true,
            node,
        }
    }

    pub fn dropoff(request: RequestId, node: NodeId) -> NodeStop {
        NodeStop {
            request,
            is_pickup: false,
            node,
        }
    }
}

impl PartialOrd for NodeStop {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeStop {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // pickup (true) sorts before dropoff (false) for the same request.
        self.request
            .cmp(&other.request)
            .then_with(|| other.is_pickup.cmp(&self.is_pickup))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pickup_sorts_before_its_own_dropoff() {
        let pickup = NodeStop::pickup(1, 0);
        let dropoff = NodeStop::dropoff(1, 2);
        assert!(pickup < dropoff);
    }

    #[test]
    fn ordering_is_stable_across_requests() {
        let mut stops = vec![
            NodeStop::dropoff(2, 5),
            NodeStop::pickup(1, 0),
            NodeStop::pickup(2, 1),
            NodeStop::dropoff(1, 3),
        ];
        stops.sort();
        assert_eq!(
            stops,
            vec![
                NodeStop::pickup(1, 0),
                NodeStop::dropoff(1, 3),
                NodeStop::pickup(2, 1),
                NodeStop::dropoff(2, 5),
            ]
        );
    }
}
