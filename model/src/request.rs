use crate::base_types::{NodeId, RequestId, Seconds};

/// A single passenger's trip request, from admission until it is dropped
/// off. Identity, origin/destination, and deadlines are fixed at
/// construction; `boarding_time`/`alighting_time`/`shared`/`assigned` are
/// the only fields later phases mutate.
#[derive(Debug, Clone)]
pub struct Request {
    pub id: RequestId,
    pub origin: NodeId,
    pub destination: NodeId,
    pub origin_lon: f64,
    pub origin_lat: f64,
    pub destination_lon: f64,
    pub destination_lat: f64,
    pub entry_time: Seconds,
    pub ideal_traveltime: Seconds,
    pub latest_boarding: Seconds,
    pub latest_alighting: Seconds,

    pub boarding_time: Option<Seconds>,
    pub alighting_time: Option<Seconds>,
    pub shared: bool,
    /// Set once this request has been selected in some tick's assignment.
    /// A committed request must reappear in every subsequent RTV graph
    /// until it boards.
    pub assigned: bool,
}

impl Request {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: RequestId,
        origin: NodeId,
        origin_lon: f64,
        origin_lat: f64,
        destination: NodeId,
        destination_lon: f64,
        destination_lat: f64,
        entry_time: Seconds,
        ideal_traveltime: Seconds,
        max_waiting: Seconds,
        max_detour: Seconds,
    ) -> Request {
        Request {
            id,
            origin,
            destination,
            origin_lon,
            origin_lat,
            destination_lon,
            destination_lat,
            entry_time,
            ideal_traveltime,
            latest_boarding: entry_time + max_waiting,
            latest_alighting: entry_time + ideal_traveltime + max_detour,
            boarding_time: None,
            alighting_time: None,
            shared: false,
            assigned: false,
        }
    }

    pub fn is_boarded(&self) -> bool {
        self.boarding_time.is_some()
    }

    pub fn is_alighted(&self) -> bool {
        self.alighting_time.is_some()
    }

    /// Delay beyond the ideal, direct travel time; zero until dropped off.
    pub fn delay(&self) -> Seconds {
        match self.alighting_time {
            Some(t) => (t - self.entry_time).saturating_sub(self.ideal_traveltime),
            None => Seconds::ZERO,
        }
    }
}

impl PartialEq for Request {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Request {}

impl PartialOrd for Request {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Request {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::hash::Hash for Request {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
