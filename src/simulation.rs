use crate::car::Car;
use crate::network::{Network, TopologyAttributes, TopologyError};
use crate::schedule::{Schedule, ScheduleError};
use crate::{CarId, CarSet, JunctionId, RoadId};
use itertools::izip;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use slotmap::SecondaryMap;

/// A discrete time traffic simulation over a road network.
///
/// The topology and every car's route are fixed at construction. The road
/// queues, car progress, clock and random state are the only per-run state,
/// and [reset](Self::reset) restores all of it, which makes one simulation
/// cheap to evaluate repeatedly under different schedules. This is the
/// intended use: the evaluation oracle of an external schedule search.
#[derive(Clone)]
pub struct Simulation {
    /// The road network.
    network: Network,
    /// The cars being simulated.
    cars: CarSet,
    /// The number of ticks one [simulate](Self::simulate) call runs for.
    sim_len: usize,
    /// The current tick.
    clock: usize,
    /// The seed the random state is rebuilt from on every reset.
    seed: u64,
    /// The random state consumed by [Schedule::Random] resolution and by
    /// route synthesis.
    rng: StdRng,
}

impl Simulation {
    /// Creates a simulation over the given network with an empty car roster.
    pub fn new(network: Network, sim_len: usize, seed: u64) -> Self {
        Self {
            network,
            cars: CarSet::default(),
            sim_len,
            clock: 0,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a simulation over a random ring network carrying `car_num`
    /// randomly routed cars of `hops` roads each.
    pub fn random_ring(
        attribs: &TopologyAttributes,
        car_num: usize,
        hops: usize,
        sim_len: usize,
        seed: u64,
    ) -> Result<Self, TopologyError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let network = Network::ring(attribs, &mut rng)?;
        let mut sim = Self::new(network, sim_len, seed);
        for _ in 0..car_num {
            sim.add_random_car(hops);
        }
        Ok(sim)
    }

    /// Creates a simulation over a random connected network carrying
    /// `car_num` randomly routed cars of `hops` roads each.
    pub fn random_connected(
        attribs: &TopologyAttributes,
        car_num: usize,
        hops: usize,
        sim_len: usize,
        seed: u64,
    ) -> Result<Self, TopologyError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let network = Network::random_connected(attribs, &mut rng)?;
        let mut sim = Self::new(network, sim_len, seed);
        for _ in 0..car_num {
            sim.add_random_car(hops);
        }
        Ok(sim)
    }

    /// Adds a car at the start of the first road of `route`. The route must
    /// not be empty.
    pub fn add_car(&mut self, route: Vec<RoadId>) -> CarId {
        assert!(!route.is_empty(), "car route must not be empty");
        let start = self.network.get_road(route[0]).length();
        self.cars.insert(Car::new(route, start))
    }

    /// Adds a car already queued at the end of the first road of `route`,
    /// waiting to be released across that road's destination junction. The
    /// route must not be empty.
    pub fn add_car_queued(&mut self, route: Vec<RoadId>) -> CarId {
        assert!(!route.is_empty(), "car route must not be empty");
        let first = route[0];
        let id = self.cars.insert(Car::new(route, 0));
        self.network.roads[first].enqueue(id);
        id
    }

    /// Adds a car with a randomly synthesised route of `hops` roads.
    pub fn add_random_car(&mut self, hops: usize) -> CarId {
        let route = self.network.random_route(hops, &mut self.rng);
        self.add_car(route)
    }

    /// Advances the simulation by one tick.
    ///
    /// Every junction first resolves its schedule at the current clock and
    /// releases at most the first queued car of the chosen incoming road;
    /// an empty queue is a normal no-op. Only once every junction has been
    /// processed does every car make its tick of travel progress, so a car
    /// released this tick also travels this tick and no car is ever stepped
    /// twice in one tick.
    pub fn step(&mut self) {
        for (_, junction) in &self.network.junctions {
            let roads_in = junction.roads_in();
            let choice = junction
                .schedule()
                .resolve(self.clock, roads_in.len(), &mut self.rng);
            let road = match choice {
                Some(idx) => roads_in[idx],
                None => continue,
            };
            if let Some(car) = self.network.roads[road].dequeue() {
                self.cars[car].advance(&self.network.roads);
            }
        }

        for (id, car) in &mut self.cars {
            if let Some(road) = car.step() {
                self.network.roads[road].enqueue(id);
            }
        }

        self.clock += 1;
    }

    /// Installs one schedule per junction and runs the simulation for
    /// [sim_len](Self::sim_len) ticks, returning the aggregate reward.
    ///
    /// The whole assignment is validated before anything is installed;
    /// junctions absent from it keep their current schedule. Call
    /// [reset](Self::reset) first to evaluate from the initial state: reset
    /// followed by simulate with identical schedules and an identical seed
    /// always reproduces an identical reward.
    pub fn simulate(
        &mut self,
        assignment: SecondaryMap<JunctionId, Schedule>,
    ) -> Result<u64, ScheduleError> {
        for (id, schedule) in &assignment {
            schedule.validate(self.network.junctions[id].roads_in().len())?;
        }
        debug!(
            "simulating {} ticks over {} junctions",
            self.sim_len,
            self.network.num_junctions()
        );
        for (id, schedule) in assignment {
            self.network.junctions[id].set_schedule(schedule);
        }
        for _ in 0..self.sim_len {
            self.step();
        }
        Ok(self.get_reward())
    }

    /// Runs [simulate](Self::simulate) with the same periodic
    /// `[red, green]` cycle at every junction.
    pub fn simulate_uniform(&mut self, red: u32, green: u32) -> Result<u64, ScheduleError> {
        let assignment = self
            .network
            .junctions
            .keys()
            .map(|id| {
                (
                    id,
                    Schedule::Periodic {
                        durations: vec![red, green],
                    },
                )
            })
            .collect();
        self.simulate(assignment)
    }

    /// Runs [simulate](Self::simulate) with a distinct periodic cycle per
    /// junction: the junction at position `i` of the arena order runs
    /// `[reds[i], greens[i]]`. Both slices must hold one entry per junction.
    pub fn simulate_distinct(&mut self, reds: &[u32], greens: &[u32]) -> Result<u64, ScheduleError> {
        self.check_arity(reds.len())?;
        self.check_arity(greens.len())?;
        let assignment = izip!(self.network.junctions.keys(), reds, greens)
            .map(|(id, &red, &green)| {
                (
                    id,
                    Schedule::Periodic {
                        durations: vec![red, green],
                    },
                )
            })
            .collect();
        self.simulate(assignment)
    }

    /// Runs [simulate](Self::simulate) with a shared mode table built by
    /// zipping `reds` and `greens`, the junction at position `i` of the
    /// arena order running the `modes[i]`th mode. `modes` must hold one
    /// entry per junction.
    pub fn simulate_preset(
        &mut self,
        reds: &[u32],
        greens: &[u32],
        modes: &[usize],
    ) -> Result<u64, ScheduleError> {
        if reds.len() != greens.len() {
            return Err(ScheduleError::ArityMismatch {
                expected: reds.len(),
                got: greens.len(),
            });
        }
        self.check_arity(modes.len())?;
        let table: Vec<(u32, u32)> = izip!(reds, greens)
            .map(|(&red, &green)| (red, green))
            .collect();
        let assignment = izip!(self.network.junctions.keys(), modes)
            .map(|(id, &mode)| {
                (
                    id,
                    Schedule::Preset {
                        table: table.clone(),
                        mode,
                    },
                )
            })
            .collect();
        self.simulate(assignment)
    }

    /// Installs a schedule at a single junction.
    pub fn set_schedule(
        &mut self,
        junction: JunctionId,
        schedule: Schedule,
    ) -> Result<(), ScheduleError> {
        schedule.validate(self.network.junctions[junction].roads_in().len())?;
        self.network.junctions[junction].set_schedule(schedule);
        Ok(())
    }

    /// The sum of every car's accrued reward: the scalar objective the
    /// external optimiser maximises.
    pub fn get_reward(&self) -> u64 {
        self.cars.values().map(Car::reward).sum()
    }

    /// Returns every car and every road queue to its initial state, zeroes
    /// the clock and rewinds the random state to the seed. The topology and
    /// the car routes are never regenerated, so repeated evaluation under
    /// different schedules stays cheap.
    pub fn reset(&mut self) {
        for (_, road) in &mut self.network.roads {
            road.reset();
        }
        for (id, car) in &mut self.cars {
            car.reset();
            // Cars that begin queued re-enter their first road in roster
            // order.
            if car.remaining() == 0 {
                self.network.roads[car.route()[0]].enqueue(id);
            }
        }
        self.clock = 0;
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    /// The network being simulated.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// The number of ticks one [simulate](Self::simulate) call runs for.
    pub fn sim_len(&self) -> usize {
        self.sim_len
    }

    /// The current tick.
    pub fn clock(&self) -> usize {
        self.clock
    }

    /// Returns an iterator over all the cars in the simulation.
    pub fn iter_cars(&self) -> impl Iterator<Item = (CarId, &Car)> {
        self.cars.iter()
    }

    /// Gets a reference to the car with the given ID.
    pub fn get_car(&self, id: CarId) -> &Car {
        &self.cars[id]
    }

    fn check_arity(&self, got: usize) -> Result<(), ScheduleError> {
        let expected = self.network.num_junctions();
        if got != expected {
            return Err(ScheduleError::ArityMismatch { expected, got });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_single_road_junction_releases_the_queue_head() {
        let mut network = Network::new();
        let j0 = network.add_junction();
        let j1 = network.add_junction();
        let road = network.connect(j0, j1, 2);

        let mut sim = Simulation::new(network, 10, 0);
        let car = sim.add_car(vec![road]);

        // Two ticks of travel, then the car waits at the junction.
        sim.step();
        sim.step();
        assert_eq!(sim.get_car(car).remaining(), 0);
        assert_eq!(sim.network().get_road(road).queue_len(), 1);

        // The only incoming road is always chosen, releasing the car.
        sim.step();
        assert!(sim.get_car(car).is_terminal());
        assert_eq!(sim.network().get_road(road).queue_len(), 0);
        assert_eq!(sim.get_car(car).reward(), 2);
    }

    #[test]
    fn junctions_without_incoming_roads_are_skipped() {
        let mut network = Network::new();
        let j0 = network.add_junction();
        let j1 = network.add_junction();
        network.connect(j0, j1, 1);

        let mut sim = Simulation::new(network, 5, 0);
        sim.step();
        assert_eq!(sim.clock(), 1);
    }
}
