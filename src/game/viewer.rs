use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;

use super::pathfinding::{MovePath, MoveRequest};
use super::world::{ChunkViewer, TilePosition, TileWorld};

/// On-screen size of one tile, in world units.
pub const TILE_PIXELS: f32 = 16.0;

pub struct ViewerPlugin;

impl Plugin for ViewerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_viewer).add_systems(
            Update,
            (
                move_viewer,
                request_probe_path,
                draw_chunk_gizmos.run_if(resource_exists::<TileWorld>),
            ),
        );
    }
}

/// Entity that receives routes from the viewer to the clicked tile.
#[derive(Component)]
pub struct PathProbe;

fn spawn_viewer(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Transform::default(),
        ChunkViewer,
        TilePosition(IVec2::ZERO),
    ));
    commands.spawn((PathProbe, TilePosition(IVec2::ZERO)));
}

pub fn tile_to_world(tile: IVec2) -> Vec2 {
    (tile.as_vec2() + Vec2::splat(0.5)) * TILE_PIXELS
}

pub fn world_to_tile(pos: Vec2) -> IVec2 {
    (pos / TILE_PIXELS).floor().as_ivec2()
}

fn move_viewer(
    mut query: Query<(&mut Transform, &mut TilePosition, &mut Projection), With<ChunkViewer>>,
    keys: Res<ButtonInput<KeyCode>>,
    mut scroll_evr: MessageReader<MouseWheel>,
    time: Res<Time>,
) {
    let Ok((mut transform, mut tile, mut projection)) = query.single_mut() else { return };
    let mut velocity = Vec2::ZERO;
    let speed = 400.0;

    if keys.pressed(KeyCode::KeyW) {
        velocity.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        velocity.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        velocity.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        velocity.x += 1.0;
    }
    if velocity.length_squared() > 0.0 {
        velocity = velocity.normalize();
    }

    transform.translation.x += velocity.x * speed * time.delta_secs();
    transform.translation.y += velocity.y * speed * time.delta_secs();

    let current = world_to_tile(transform.translation.truncate());
    if tile.0 != current {
        tile.0 = current;
    }

    for ev in scroll_evr.read() {
        if let Projection::Orthographic(ortho) = projection.as_mut() {
            ortho.scale = (ortho.scale * (1.0 - ev.y * 0.1)).clamp(0.25, 8.0);
        }
    }
}

/// Right click routes the probe from the viewer's tile to the clicked tile.
fn request_probe_path(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform, &TilePosition), With<ChunkViewer>>,
    probes: Query<Entity, With<PathProbe>>,
    mut requests: MessageWriter<MoveRequest>,
) {
    if !buttons.just_pressed(MouseButton::Right) {
        return;
    }
    let Ok(window) = windows.single() else { return };
    let Ok((camera, camera_transform, viewer_tile)) = cameras.single() else { return };
    let Some(cursor) = window.cursor_position() else { return };
    let Ok(world_pos) = camera.viewport_to_world_2d(camera_transform, cursor) else { return };

    for entity in probes.iter() {
        requests.write(MoveRequest {
            entity,
            start: viewer_tile.0,
            goal: world_to_tile(world_pos),
        });
    }
}

fn draw_chunk_gizmos(mut gizmos: Gizmos, world: Res<TileWorld>, paths: Query<&MovePath>) {
    let chunk_pixels = world.layout().chunk_size as f32 * TILE_PIXELS;
    for coord in world.resident_coords() {
        let Some(chunk) = world.chunk(coord) else { continue };
        let color = if chunk.regions_fresh() {
            Color::srgba(0.3, 0.8, 0.3, 0.5)
        } else {
            Color::srgba(0.9, 0.6, 0.2, 0.8)
        };
        gizmos.rect_2d(chunk.center_position * TILE_PIXELS, Vec2::splat(chunk_pixels), color);
    }

    for path in paths.iter() {
        let points = path.waypoints().into_iter().map(tile_to_world);
        gizmos.linestrip_2d(points, Color::srgb(0.2, 0.6, 1.0));
    }
}
