use glam::Vec2;
use tileflip::*;

fn main() {
    env_logger::init();

    let mut level = Level::new(LevelConfig { cell_size: 1.0 });
    level
        .register_tiles(
            &[TileDesc::new(10, Vec2::new(2.0, 0.0), Vec2::splat(0.5))],
            &[TileDesc::new(20, Vec2::new(4.0, 0.0), Vec2::splat(0.5))],
            &[TileDesc::new(30, Vec2::new(6.0, 0.0), Vec2::splat(0.5))],
        )
        .expect("valid level");

    for _ in 0..3 {
        match level.raycast(Vec2::ZERO, Vec2::X, 100.0) {
            Some((id, hit)) => {
                let key = level.tile(id).map(|t| t.key);
                println!(
                    "active={:?} ray hit {} key={:?} t={:.3} n=({:.2},{:.2})",
                    level.active_group(),
                    id,
                    key,
                    hit.toi,
                    hit.normal.x,
                    hit.normal.y
                );
            }
            None => println!("active={:?} no hit", level.active_group()),
        }
        level.flip();
    }

    let shape = BoxCollider::new(Vec2::splat(0.4));
    let raw = level.cast_all(&shape, Vec2::ZERO, Vec2::X, 10.0);
    let solid = level.filter_collisions(&raw);
    println!("cast_all: {} hits, {} against solid tiles", raw.len(), solid.len());
}
