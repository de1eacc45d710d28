pub use car::Car;
pub use import::ImportError;
pub use junction::Junction;
pub use network::{Network, TopologyAttributes, TopologyError};
pub use road::Road;
pub use schedule::{Schedule, ScheduleError, DEFAULT_MODE_TABLE};
pub use simulation::Simulation;
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData, SecondaryMap};

mod car;
#[cfg(feature = "debug")]
mod debug;
mod import;
mod junction;
mod network;
mod road;
mod schedule;
mod simulation;

new_key_type! {
    /// Unique ID of a [Junction].
    pub struct JunctionId;
    /// Unique ID of a [Road].
    pub struct RoadId;
    /// Unique ID of a [Car].
    pub struct CarId;
}

type JunctionSet = SlotMap<JunctionId, Junction>;
type RoadSet = SlotMap<RoadId, Road>;
type CarSet = SlotMap<CarId, Car>;
