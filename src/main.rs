use signal_sim::{Simulation, TopologyAttributes};

fn main() {
    let attribs = TopologyAttributes {
        junction_num: 8,
        max_road_length: 5,
        allow_cyclic: false,
    };
    let mut sim = Simulation::random_connected(&attribs, 100, 10, 200, 42)
        .expect("network generation failed");

    println!("Sweeping uniform schedules...");
    let mut best: Option<(u64, u32, u32)> = None;
    for red in 1..=10 {
        for green in 1..=10 {
            sim.reset();
            let reward = sim
                .simulate_uniform(red, green)
                .expect("uniform schedule rejected");
            if best.map_or(true, |(r, _, _)| reward > r) {
                best = Some((reward, red, green));
            }
        }
    }

    let (reward, red, green) = best.unwrap();
    println!("best uniform schedule: red={red} green={green} reward={reward}");
}
