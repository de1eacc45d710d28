use crate::{RoadId, RoadSet};

/// A car following a fixed route through the network.
///
/// On each road of its route the car is either *in transit* (remaining
/// distance above zero) or *queued* at the road's destination junction
/// (remaining distance exactly zero). Reward counts ticks of actual travel
/// and never ticks spent waiting in a queue.
#[derive(Clone)]
pub struct Car {
    /// The ordered roads the car will travel, fixed at creation.
    route: Vec<RoadId>,
    /// The index of the car's current road within the route. Equal to the
    /// route length once the car has completed its journey.
    idx: usize,
    /// The remaining distance on the current road, in ticks.
    remaining: u32,
    /// The value `remaining` is restored to by a reset; zero for cars that
    /// begin queued at the end of their first road.
    start_remaining: u32,
    /// The ticks of forward progress accrued so far.
    reward: u64,
}

impl Car {
    /// Creates a new car at the start of the given route.
    pub(crate) fn new(route: Vec<RoadId>, start_remaining: u32) -> Self {
        Self {
            route,
            idx: 0,
            remaining: start_remaining,
            start_remaining,
            reward: 0,
        }
    }

    /// The car's route.
    pub fn route(&self) -> &[RoadId] {
        &self.route
    }

    /// The index of the car's current road within its route.
    pub fn route_index(&self) -> usize {
        self.idx
    }

    /// The road the car is currently on, or `None` once the route is complete.
    pub fn road(&self) -> Option<RoadId> {
        self.route.get(self.idx).copied()
    }

    /// The remaining distance on the current road, in ticks.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// The ticks of forward progress accrued so far.
    pub fn reward(&self) -> u64 {
        self.reward
    }

    /// Whether the car has completed its route.
    pub fn is_terminal(&self) -> bool {
        self.idx == self.route.len()
    }

    /// Makes the car's tick of progress. A car in transit travels one tick
    /// of distance and earns one unit of reward; a queued or terminal car
    /// does nothing. Returns the road the car must be queued on when this
    /// tick brings it to the end of the road.
    pub(crate) fn step(&mut self) -> Option<RoadId> {
        if self.is_terminal() || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.reward += 1;
        if self.remaining == 0 {
            self.road()
        } else {
            None
        }
    }

    /// Moves the car past a junction onto the next road of its route, or to
    /// the terminal state when no roads remain.
    pub(crate) fn advance(&mut self, roads: &RoadSet) {
        self.idx += 1;
        if let Some(road) = self.road() {
            self.remaining = roads[road].length();
        }
    }

    /// Returns the car to the start of its route with no accrued reward.
    pub(crate) fn reset(&mut self) {
        self.idx = 0;
        self.remaining = self.start_remaining;
        self.reward = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::road::Road;
    use crate::JunctionId;

    fn road_set(lengths: &[u32]) -> (RoadSet, Vec<RoadId>) {
        let mut roads = RoadSet::with_key();
        let ids = lengths
            .iter()
            .map(|&len| roads.insert(Road::new(JunctionId::default(), JunctionId::default(), len)))
            .collect();
        (roads, ids)
    }

    #[test]
    fn reward_counts_only_travel() {
        let (roads, ids) = road_set(&[3]);
        let mut car = Car::new(ids.clone(), 3);

        assert_eq!(car.step(), None);
        assert_eq!(car.step(), None);
        assert_eq!(car.step(), Some(ids[0]));
        assert_eq!(car.reward(), 3);

        // Queued: no distance left to travel, no reward.
        assert_eq!(car.step(), None);
        assert_eq!(car.reward(), 3);

        car.advance(&roads);
        assert!(car.is_terminal());
        assert_eq!(car.step(), None);
        assert_eq!(car.reward(), 3);
    }

    #[test]
    fn length_one_road_arrives_in_one_tick() {
        let (_, ids) = road_set(&[1]);
        let mut car = Car::new(ids.clone(), 1);

        assert_eq!(car.step(), Some(ids[0]));
        assert_eq!(car.remaining(), 0);
        assert_eq!(car.reward(), 1);
    }

    #[test]
    fn advance_takes_the_next_road_length() {
        let (roads, ids) = road_set(&[1, 4]);
        let mut car = Car::new(ids.clone(), 1);

        car.step();
        car.advance(&roads);
        assert_eq!(car.road(), Some(ids[1]));
        assert_eq!(car.remaining(), 4);
        assert!(!car.is_terminal());
    }

    #[test]
    fn reset_restores_the_initial_state() {
        let (roads, ids) = road_set(&[2, 2]);
        let mut car = Car::new(ids, 2);

        car.step();
        car.step();
        car.advance(&roads);
        car.reset();

        assert_eq!(car.route_index(), 0);
        assert_eq!(car.remaining(), 2);
        assert_eq!(car.reward(), 0);
    }
}
