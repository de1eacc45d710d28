use crate::schedule::Schedule;
use crate::RoadId;
use smallvec::SmallVec;

/// A signal controlled intersection; a vertex in the road graph.
#[derive(Clone)]
pub struct Junction {
    /// The roads entering the junction, in connection order.
    roads_in: SmallVec<[RoadId; 2]>,
    /// The roads leaving the junction, in connection order.
    roads_out: SmallVec<[RoadId; 2]>,
    /// The signal schedule controlling releases at this junction.
    schedule: Schedule,
}

impl Junction {
    /// Creates a junction with no connected roads and the baseline random
    /// release schedule.
    pub(crate) fn new() -> Self {
        Self {
            roads_in: SmallVec::new(),
            roads_out: SmallVec::new(),
            schedule: Schedule::Random,
        }
    }

    /// The roads entering this junction.
    pub fn roads_in(&self) -> &[RoadId] {
        &self.roads_in
    }

    /// The roads leaving this junction.
    pub fn roads_out(&self) -> &[RoadId] {
        &self.roads_out
    }

    /// The active schedule.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Replaces the active schedule. Callers check the schedule against the
    /// incoming road count first; see [Schedule::validate].
    pub(crate) fn set_schedule(&mut self, schedule: Schedule) {
        self.schedule = schedule;
    }

    /// Registers an incoming road.
    pub(crate) fn add_road_in(&mut self, road: RoadId) {
        self.roads_in.push(road);
    }

    /// Registers an outgoing road.
    pub(crate) fn add_road_out(&mut self, road: RoadId) {
        self.roads_out.push(road);
    }
}
