//! Import of experiment definitions from the plain text format.
//!
//! The first line is `<duration> <junctions> <roads> <cars> <bonus>`. The
//! next `<roads>` lines are `<origin> <dest> <name> <length>`, naming each
//! road and giving its endpoints as zero based junction indices. The next
//! `<cars>` lines are `<hop_count> <road_name>...`, giving each car's route
//! by road name. The bonus field rewards cars that finish early in the
//! format's original setting and is parsed but ignored here.

use crate::network::Network;
use crate::simulation::Simulation;
use crate::RoadId;
use std::collections::HashMap;
use std::str::FromStr;

/// An error raised when an experiment file cannot be parsed. Parsing fails
/// as a whole; no partially built simulation is ever returned.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("unexpected end of input")]
    Truncated,
    #[error("malformed line: {0:?}")]
    Malformed(String),
    #[error("junction index {idx} out of range ({num} junctions)")]
    BadJunctionIndex { idx: usize, num: usize },
    #[error("road {0:?} must have a length of at least 1")]
    ZeroRoadLength(String),
    #[error("duplicate road name {0:?}")]
    DuplicateRoad(String),
    #[error("unknown road name {0:?}")]
    UnknownRoad(String),
    #[error("route lists {got} roads where {expected} were declared")]
    BadRouteLength { expected: usize, got: usize },
    #[error("car route must contain at least one road")]
    EmptyRoute,
}

impl Simulation {
    /// Builds a simulation from the text experiment format described in the
    /// module documentation. The header's duration becomes the simulation
    /// horizon. Every imported car begins queued at the end of the first
    /// road of its route, waiting for a release across that road's
    /// destination junction, and [reset](Simulation::reset) restores
    /// exactly that state.
    pub fn from_text(input: &str, seed: u64) -> Result<Self, ImportError> {
        let mut lines = input.lines().filter(|line| !line.trim().is_empty());

        let header = lines.next().ok_or(ImportError::Truncated)?;
        let fields: Vec<&str> = header.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(ImportError::Malformed(header.to_string()));
        }
        let duration: usize = parse_field(fields[0], header)?;
        let junction_num: usize = parse_field(fields[1], header)?;
        let road_num: usize = parse_field(fields[2], header)?;
        let car_num: usize = parse_field(fields[3], header)?;
        let _bonus: u64 = parse_field(fields[4], header)?;

        let mut network = Network::new();
        let junctions: Vec<_> = (0..junction_num).map(|_| network.add_junction()).collect();

        let mut roads_by_name: HashMap<String, RoadId> = HashMap::new();
        for _ in 0..road_num {
            let line = lines.next().ok_or(ImportError::Truncated)?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 4 {
                return Err(ImportError::Malformed(line.to_string()));
            }
            let origin_idx: usize = parse_field(fields[0], line)?;
            let dest_idx: usize = parse_field(fields[1], line)?;
            let name = fields[2];
            let length: u32 = parse_field(fields[3], line)?;

            let origin = *junctions.get(origin_idx).ok_or(ImportError::BadJunctionIndex {
                idx: origin_idx,
                num: junction_num,
            })?;
            let dest = *junctions.get(dest_idx).ok_or(ImportError::BadJunctionIndex {
                idx: dest_idx,
                num: junction_num,
            })?;
            if length == 0 {
                return Err(ImportError::ZeroRoadLength(name.to_string()));
            }
            if roads_by_name.contains_key(name) {
                return Err(ImportError::DuplicateRoad(name.to_string()));
            }

            let road = network.connect(origin, dest, length);
            roads_by_name.insert(name.to_string(), road);
        }

        let mut sim = Simulation::new(network, duration, seed);
        for _ in 0..car_num {
            let line = lines.next().ok_or(ImportError::Truncated)?;
            let mut fields = line.split_whitespace();
            let hop_count: usize =
                parse_field(fields.next().ok_or(ImportError::Truncated)?, line)?;
            if hop_count == 0 {
                return Err(ImportError::EmptyRoute);
            }
            let names: Vec<&str> = fields.collect();
            if names.len() != hop_count {
                return Err(ImportError::BadRouteLength {
                    expected: hop_count,
                    got: names.len(),
                });
            }
            let route = names
                .into_iter()
                .map(|name| {
                    roads_by_name
                        .get(name)
                        .copied()
                        .ok_or_else(|| ImportError::UnknownRoad(name.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            sim.add_car_queued(route);
        }

        Ok(sim)
    }
}

fn parse_field<T: FromStr>(field: &str, line: &str) -> Result<T, ImportError> {
    field
        .parse()
        .map_err(|_| ImportError::Malformed(line.to_string()))
}
