use bevy::prelude::*;
use std::collections::BTreeSet;
use std::time::Duration;
use tileroute::game::config::{GameConfigPlugin, WorldConfig};
use tileroute::game::pathfinding::PathfindingPlugin;
use tileroute::game::world::{ChunkStreamer, ChunkViewer, TilePosition, TileWorld, WorldPlugin};

fn test_config() -> WorldConfig {
    WorldConfig {
        chunk_size: 16,
        divisions: 2,
        view_distance_chunks: 2,
        max_chunks_to_process: 8,
        ..default()
    }
}

fn build_app(config: WorldConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(config);
    app.add_plugins(GameConfigPlugin);
    app.add_plugins(WorldPlugin);
    app.add_plugins(PathfindingPlugin);
    // Startup: world, loader thread, blocking prefill
    app.update();
    app
}

/// Chunk coordinates whose centre lies within view distance of `target`.
fn expected_chunks(config: &WorldConfig, target: IVec2) -> BTreeSet<(i32, i32)> {
    let layout = config.layout();
    let center = layout.tile_to_chunk(target);
    let r = config.view_distance_chunks;
    let mut set = BTreeSet::new();
    for dy in -r..=r {
        for dx in -r..=r {
            let coord = center + IVec2::new(dx, dy);
            if layout.chunk_center(coord).distance_squared(target.as_vec2()) <= config.view_distance_sqr() {
                set.insert((coord.x, coord.y));
            }
        }
    }
    set
}

fn resident_set(app: &App) -> BTreeSet<(i32, i32)> {
    app.world()
        .resource::<TileWorld>()
        .resident_coords()
        .into_iter()
        .map(|c| (c.x, c.y))
        .collect()
}

fn assert_pool_conserved(app: &App) {
    let world = app.world().resource::<TileWorld>();
    assert_eq!(world.resident_count() + world.pooled_count(), world.total_chunks());
}

#[test]
fn test_prefill_loads_view_square_around_origin() {
    let config = test_config();
    let app = build_app(config.clone());

    let world = app.world().resource::<TileWorld>();
    assert_eq!(world.total_chunks(), 25);
    assert_eq!(resident_set(&app), expected_chunks(&config, IVec2::ZERO));
    assert_eq!(world.resident_count(), 12);
    assert_pool_conserved(&app);

    let stats = app.world().resource::<ChunkStreamer>().stats();
    assert_eq!(stats.loads, 12);
    assert_eq!(stats.unloads, 0);
}

#[test]
fn test_regions_become_fresh_after_dirty_walks() {
    let mut app = build_app(test_config());
    for _ in 0..4 {
        app.update();
    }

    let world = app.world().resource::<TileWorld>();
    for coord in world.resident_coords() {
        let chunk = world.chunk(coord).unwrap();
        assert!(chunk.regions_fresh(), "chunk {} still dirty", coord);
        for region in world.layout().chunk_regions(coord) {
            assert!(world.fresh_region(region).is_some());
        }
    }
}

#[test]
fn test_streaming_follows_viewer() {
    let config = test_config();
    let mut app = build_app(config.clone());
    let target = IVec2::new(200, -40);
    app.world_mut().spawn((ChunkViewer, TilePosition(target)));

    let expected = expected_chunks(&config, target);
    let mut settled = false;
    for _ in 0..2000 {
        app.update();
        assert_pool_conserved(&app);
        if resident_set(&app) == expected {
            settled = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(settled, "streaming never converged on the viewer");

    let world = app.world().resource::<TileWorld>();
    assert!(!world.is_resident(IVec2::ZERO));
    assert!(world.regions().region_at_tile(IVec2::ZERO).is_none());

    let stats = app.world().resource::<ChunkStreamer>().stats();
    assert_eq!(stats.loads - stats.unloads, expected.len() as u64);
}
