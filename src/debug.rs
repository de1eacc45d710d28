use crate::Simulation;
use serde_json::json;

impl Simulation {
    /// Captures the mutable state of the simulation as a JSON frame for an
    /// external inspector: the clock, per road queue depths and per car
    /// progress.
    pub fn debug_frame(&self) -> serde_json::Value {
        let roads = self
            .network()
            .iter_roads()
            .map(|(id, road)| {
                json!({
                    "road": format!("{:?}", id),
                    "length": road.length(),
                    "queue": road.queue_len(),
                })
            })
            .collect::<Vec<_>>();
        let cars = self
            .iter_cars()
            .map(|(id, car)| {
                json!({
                    "car": format!("{:?}", id),
                    "index": car.route_index(),
                    "remaining": car.remaining(),
                    "reward": car.reward(),
                })
            })
            .collect::<Vec<_>>();
        json!({
            "clock": self.clock(),
            "roads": roads,
            "cars": cars,
        })
    }
}
