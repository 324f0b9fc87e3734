use tileflip::*;

const MAP: &str = "\
..........
..........
.@...B....
###AA#####
";

fn main() {
    env_logger::init();

    let desc = LevelDesc::from_ascii(MAP, 1.0).expect("valid map");
    let mut sim = Simulation::new(SimConfig::default(), &desc).expect("valid config");
    let stats = sim.level().stats();
    println!("tiles: A={} B={} static={}", stats.tiles_a, stats.tiles_b, stats.tiles_static);

    let mut sink = RecordingSink::default();
    let walk = FrameInput { move_right: true, ..FrameInput::default() };

    // Walk into the B block, flip it away, walk on until the A gap opens under us
    for frame in 0..240 {
        let input = if frame == 40 {
            FrameInput { jump_requested: true, ..walk }
        } else {
            walk
        };
        sim.frame(&input, 1.0 / 60.0, &mut sink);
        if frame == 90 {
            sim.flip(&mut sink);
        }
        if frame % 30 == 0 {
            let body = &sim.actor().body;
            println!(
                "frame {frame:3} tick {:3} pos=({:.2},{:.2}) vel=({:.3},{:.3}) {:?}",
                sim.ticks(),
                body.position.x,
                body.position.y,
                body.velocity.x,
                body.velocity.y,
                sim.actor().state()
            );
        }
    }

    let corrections = sink
        .events
        .iter()
        .filter(|e| matches!(e, TraceEvent::Correction { .. }))
        .count();
    let unresolved = sink
        .events
        .iter()
        .filter(|e| matches!(e, TraceEvent::Unresolved { .. }))
        .count();
    println!("{} trace events, {corrections} corrections, {unresolved} unresolved steps", sink.events.len());
}
