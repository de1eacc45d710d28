use crate::junction::Junction;
use crate::road::Road;
use crate::{JunctionId, JunctionSet, RoadId, RoadSet};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Parameters for the random topology generators.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopologyAttributes {
    /// The number of junctions in the network.
    pub junction_num: usize,
    /// The maximum road length; lengths are drawn uniformly from
    /// `1..=max_road_length`.
    pub max_road_length: u32,
    /// Whether a road may start and end at the same junction.
    pub allow_cyclic: bool,
}

/// An error raised when a topology cannot be generated.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("cannot build a network of {junction_num} junctions; at least 2 are required")]
    TooFewJunctions { junction_num: usize },
    #[error("maximum road length must be at least 1")]
    ZeroRoadLength,
}

/// A road network: a directed graph with junctions as its vertices and
/// roads as its edges.
///
/// The network owns both arenas; junctions and roads refer to each other by
/// ID only, and all wiring goes through [connect](Self::connect), which
/// keeps the two sides consistent. Once an experiment starts the topology
/// is never changed; only the road queues mutate between ticks.
#[derive(Clone, Default)]
pub struct Network {
    /// The junctions in the network.
    pub(crate) junctions: JunctionSet,
    /// The roads in the network.
    pub(crate) roads: RoadSet,
}

impl Network {
    /// Creates an empty network.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a junction to the network.
    pub fn add_junction(&mut self) -> JunctionId {
        self.junctions.insert(Junction::new())
    }

    /// Adds a road of the given length from `origin` to `dest`, wiring it
    /// into both endpoint junctions.
    pub fn connect(&mut self, origin: JunctionId, dest: JunctionId, length: u32) -> RoadId {
        let road = self.roads.insert(Road::new(origin, dest, length));
        self.junctions[origin].add_road_out(road);
        self.junctions[dest].add_road_in(road);
        road
    }

    /// Generates a network in which every junction is the destination of
    /// exactly two roads. Origins are drawn by popping a shuffled pool of
    /// the junctions, so each junction also originates at least one road,
    /// and uniformly at random once the pool is exhausted. When self loops
    /// are disallowed, an offending draw is swapped with the next available
    /// candidate.
    pub fn random_paired(
        attribs: &TopologyAttributes,
        rng: &mut StdRng,
    ) -> Result<Self, TopologyError> {
        let mut network = Self::with_junctions(attribs)?;
        let ids: Vec<JunctionId> = network.junctions.keys().collect();
        let n = ids.len();

        let mut pool: Vec<usize> = (0..n).collect();
        pool.shuffle(rng);

        for i in 0..2 * n {
            let dest = i / 2;
            let origin = match pool.pop() {
                Some(candidate) if attribs.allow_cyclic || candidate != dest => candidate,
                Some(candidate) => match pool.pop() {
                    Some(swap) => {
                        pool.push(candidate);
                        swap
                    }
                    None => {
                        // The pool holds only the destination itself; leave
                        // it for a later road and substitute a uniform draw.
                        pool.push(candidate);
                        uniform_origin(dest, n, attribs.allow_cyclic, rng)
                    }
                },
                None => uniform_origin(dest, n, attribs.allow_cyclic, rng),
            };
            let length = rng.gen_range(1..=attribs.max_road_length);
            network.connect(ids[origin], ids[dest], length);
        }

        debug!("generated paired network: {} junctions, {} roads", n, 2 * n);
        Ok(network)
    }

    /// Generates a connected network in which every junction receives one
    /// road from the currently isolated junctions and one from the
    /// currently connected junctions, falling back to same pool draws once
    /// either pool runs dry. Every junction ends with exactly two incoming
    /// roads and the graph is connected by construction.
    pub fn random_connected(
        attribs: &TopologyAttributes,
        rng: &mut StdRng,
    ) -> Result<Self, TopologyError> {
        let mut network = Self::with_junctions(attribs)?;
        let ids: Vec<JunctionId> = network.junctions.keys().collect();

        let mut isolated: Vec<JunctionId> = ids.clone();
        let mut connected: Vec<JunctionId> = Vec::new();

        for &dest in &ids {
            let mut used: Option<JunctionId> = None;
            for turn in 0..2 {
                let eligible = |pool: &[JunctionId], used: Option<JunctionId>| {
                    pool.iter()
                        .copied()
                        .filter(|&j| (attribs.allow_cyclic || j != dest) && Some(j) != used)
                        .collect::<Vec<_>>()
                };
                let (first, second): (&[JunctionId], &[JunctionId]) = if turn == 0 {
                    (&isolated, &connected)
                } else {
                    (&connected, &isolated)
                };
                let mut candidates = eligible(first, used);
                if candidates.is_empty() {
                    candidates = eligible(second, used);
                }
                if candidates.is_empty() {
                    // Doubling up on one origin is all that is left in the
                    // smallest acyclic networks.
                    candidates = eligible(first, None);
                }
                if candidates.is_empty() {
                    candidates = eligible(second, None);
                }
                let origin = *candidates.choose(rng).expect("junction pools exhausted");

                let length = rng.gen_range(1..=attribs.max_road_length);
                network.connect(origin, dest, length);

                if let Some(idx) = isolated.iter().position(|&j| j == origin) {
                    isolated.remove(idx);
                    connected.push(origin);
                }
                used = Some(origin);
            }
        }

        debug!(
            "generated connected network: {} junctions, {} roads",
            ids.len(),
            2 * ids.len()
        );
        Ok(network)
    }

    /// Generates a ring network: every junction is connected to its
    /// predecessor and successor under the cyclic ordering, in both
    /// directions, so every junction has exactly two incoming and two
    /// outgoing roads.
    pub fn ring(attribs: &TopologyAttributes, rng: &mut StdRng) -> Result<Self, TopologyError> {
        let mut network = Self::with_junctions(attribs)?;
        let ids: Vec<JunctionId> = network.junctions.keys().collect();
        let n = ids.len();

        for i in 0..n {
            let prev = ids[(i + n - 1) % n];
            let next = ids[(i + 1) % n];
            for origin in [prev, next] {
                let length = rng.gen_range(1..=attribs.max_road_length);
                network.connect(origin, ids[i], length);
            }
        }

        debug!("generated ring network: {} junctions, {} roads", n, 2 * n);
        Ok(network)
    }

    /// Synthesises a random route of `hops` roads: a uniformly random
    /// starting road, then repeated uniform draws among the outgoing roads
    /// at each destination junction. Revisits are permitted. The generated
    /// topologies give every junction at least one outgoing road, so on
    /// them the walk always reaches the requested length.
    pub fn random_route(&self, hops: usize, rng: &mut StdRng) -> Vec<RoadId> {
        let mut route = Vec::with_capacity(hops);
        if hops == 0 {
            return route;
        }
        let roads: Vec<RoadId> = self.roads.keys().collect();
        let mut road = match roads.choose(rng) {
            Some(&road) => road,
            None => return route,
        };
        route.push(road);
        while route.len() < hops {
            let dest = self.roads[road].dest();
            road = match self.junctions[dest].roads_out().choose(rng) {
                Some(&next) => next,
                None => break,
            };
            route.push(road);
        }
        route
    }

    /// The number of junctions in the network.
    pub fn num_junctions(&self) -> usize {
        self.junctions.len()
    }

    /// The number of roads in the network.
    pub fn num_roads(&self) -> usize {
        self.roads.len()
    }

    /// Returns an iterator over all the junctions in the network.
    pub fn iter_junctions(&self) -> impl Iterator<Item = (JunctionId, &Junction)> {
        self.junctions.iter()
    }

    /// Returns an iterator over all the roads in the network.
    pub fn iter_roads(&self) -> impl Iterator<Item = (RoadId, &Road)> {
        self.roads.iter()
    }

    /// Gets a reference to the junction with the given ID.
    pub fn get_junction(&self, id: JunctionId) -> &Junction {
        &self.junctions[id]
    }

    /// Gets a reference to the road with the given ID.
    pub fn get_road(&self, id: RoadId) -> &Road {
        &self.roads[id]
    }

    /// Creates the junction arena for a generator after checking the
    /// attributes. No network with fewer than two junctions can satisfy the
    /// degree requirements without self loops.
    fn with_junctions(attribs: &TopologyAttributes) -> Result<Self, TopologyError> {
        if attribs.junction_num < 2 {
            return Err(TopologyError::TooFewJunctions {
                junction_num: attribs.junction_num,
            });
        }
        if attribs.max_road_length == 0 {
            return Err(TopologyError::ZeroRoadLength);
        }
        let mut network = Self::new();
        for _ in 0..attribs.junction_num {
            network.add_junction();
        }
        Ok(network)
    }
}

/// Draws a uniformly random origin index, substituting the neighbouring
/// index when the draw would create a disallowed self loop.
fn uniform_origin(dest: usize, n: usize, allow_cyclic: bool, rng: &mut StdRng) -> usize {
    let candidate = rng.gen_range(0..n);
    if allow_cyclic || candidate != dest {
        candidate
    } else if candidate + 1 < n {
        candidate + 1
    } else {
        candidate - 1
    }
}
