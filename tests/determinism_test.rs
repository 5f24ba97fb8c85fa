use bevy::prelude::*;
use tileroute::game::config::{GameConfigPlugin, WorldConfig};
use tileroute::game::pathfinding::{MovePath, MoveRequest, PathfindingPlugin};
use tileroute::game::world::{TilePosition, TileWorld, WorldPlugin};

fn build_app(config: WorldConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(config);
    app.add_plugins(GameConfigPlugin);
    app.add_plugins(WorldPlugin);
    app.add_plugins(PathfindingPlugin);
    for _ in 0..4 {
        app.update();
    }
    app
}

fn config() -> WorldConfig {
    WorldConfig {
        seed: 2024,
        chunk_size: 16,
        divisions: 2,
        view_distance_chunks: 2,
        ..default()
    }
}

#[test]
fn test_generated_world_and_regions_are_deterministic() {
    let app1 = build_app(config());
    let app2 = build_app(config());
    let world1 = app1.world().resource::<TileWorld>();
    let world2 = app2.world().resource::<TileWorld>();

    assert_eq!(world1.resident_coords(), world2.resident_coords());
    for coord in world1.resident_coords() {
        let a = world1.chunk(coord).unwrap();
        let b = world2.chunk(coord).unwrap();
        assert_eq!(a.tiles, b.tiles, "tiles differ in chunk {}", coord);
        for region in world1.layout().chunk_regions(coord) {
            assert_eq!(
                world1.fresh_region(region),
                world2.fresh_region(region),
                "region {} differs",
                region
            );
        }
    }
}

#[test]
fn test_routes_are_deterministic() {
    let mut paths = Vec::new();
    for _ in 0..2 {
        let mut app = build_app(config());
        let start = IVec2::new(-12, -3);
        let goal = IVec2::new(14, 9);
        let entity = app.world_mut().spawn(TilePosition(start)).id();
        app.world_mut().write_message(MoveRequest { entity, start, goal });
        app.update();
        paths.push(app.world().get::<MovePath>(entity).cloned());
    }
    assert_eq!(paths[0], paths[1]);
}
