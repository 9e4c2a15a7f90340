//! Platform Box Example
//!
//! A playable example with a character in a box environment featuring:
//! - A floor and a ceiling
//! - Walls on both sides
//! - Floating platforms at different heights
//! - A narrow shaft for wall pinches
//!
//! ## Controls
//! - **A/D** or **Left/Right**: Move horizontally
//! - **Space**, **W** or **Up**: Jump (release early for a short hop)
//! - **R**: Respawn
//!
//! The controller is tuned from `demos/platform_box.ron` when the file loads
//! and validates, otherwise the built-in player preset is used.
//!
//! The camera follows the player.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use msg_platformer_controller::prelude::*;

// ==================== Constants ====================

const PLAYER_HALF_HEIGHT: f32 = 0.5;
const PLAYER_RADIUS: f32 = 0.4;

const BOX_WIDTH: f32 = 48.0;
const BOX_HEIGHT: f32 = 24.0;
const WALL_THICKNESS: f32 = 1.0;

const PIXELS_PER_UNIT: f32 = 32.0;

const CONFIG_PATH: &str = "demos/platform_box.ron";

/// Marker component for the player entity.
#[derive(Component)]
struct Player;

// ==================== Main ====================

fn spawn_position() -> Vec2 {
    Vec2::new(-BOX_WIDTH / 4.0, -BOX_HEIGHT / 2.0 + 3.0)
}

fn player_config() -> ControllerConfig {
    match ControllerConfig::load(CONFIG_PATH) {
        Ok(config) => {
            info!("loaded controller config from {}", CONFIG_PATH);
            config
        }
        Err(e) => {
            warn!("{}; using the player preset", e);
            ControllerConfig::player()
        }
    }
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Platform Box - Platformer Controller Example".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        .add_plugins(RapierDebugRenderPlugin::default())
        // Character controller
        .add_plugins(PlatformerControllerPlugin::<Rapier2dBackend>::default())
        .insert_resource(Time::<Fixed>::from_hz(50.0))
        // Systems
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (handle_input, respawn)
                .chain()
                .before(PlatformerControllerSet::Input),
        )
        .add_systems(Update, (camera_follow, tint_by_state, log_transitions))
        .run();
}

// ==================== Setup ====================

fn setup(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale: 1.0 / PIXELS_PER_UNIT,
            ..OrthographicProjection::default_2d()
        }),
    ));

    spawn_box(&mut commands);
    spawn_platforms(&mut commands);
    spawn_player(&mut commands);

    // UI instructions - use Pickable::IGNORE to prevent blocking mouse events
    commands.spawn((
        Text::new("A/D: Move | Space/W: Jump (tap for a short hop) | R: Respawn"),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        Pickable::IGNORE,
    ));
}

fn spawn_box(commands: &mut Commands) {
    let half_width = BOX_WIDTH / 2.0;
    let half_height = BOX_HEIGHT / 2.0;
    let half_wall = WALL_THICKNESS / 2.0;
    let color = Color::srgb(0.3, 0.3, 0.3);

    // Floor and ceiling
    spawn_static_block(
        commands,
        Vec2::new(0.0, -half_height - half_wall),
        Vec2::new(half_width, half_wall),
        color,
    );
    spawn_static_block(
        commands,
        Vec2::new(0.0, half_height + half_wall),
        Vec2::new(half_width, half_wall),
        color,
    );

    // Side walls
    spawn_static_block(
        commands,
        Vec2::new(-half_width - half_wall, 0.0),
        Vec2::new(half_wall, half_height),
        color,
    );
    spawn_static_block(
        commands,
        Vec2::new(half_width + half_wall, 0.0),
        Vec2::new(half_wall, half_height),
        color,
    );
}

fn spawn_platforms(commands: &mut Commands) {
    let color = Color::srgb(0.4, 0.5, 0.3);
    let floor = -BOX_HEIGHT / 2.0;

    for (i, x) in [-12.0, 0.0, 12.0].into_iter().enumerate() {
        spawn_static_block(
            commands,
            Vec2::new(x, floor + 3.5 + 3.0 * i as f32),
            Vec2::new(3.0, 0.25),
            color,
        );
    }

    // Narrow shaft: two pillars slightly wider apart than the player.
    let gap = PLAYER_RADIUS * 2.0 + 0.1;
    for side in [-1.0, 1.0] {
        spawn_static_block(
            commands,
            Vec2::new(18.0 + side * (gap / 2.0 + 0.5), floor + 6.0),
            Vec2::new(0.5, 4.0),
            Color::srgb(0.5, 0.4, 0.3),
        );
    }
}

fn spawn_static_block(commands: &mut Commands, position: Vec2, half_size: Vec2, color: Color) {
    commands.spawn((
        Sprite::from_color(color, half_size * 2.0),
        Transform::from_translation(position.extend(0.0)),
        RigidBody::Fixed,
        Collider::cuboid(half_size.x, half_size.y),
    ));
}

fn spawn_player(commands: &mut Commands) {
    let size = Vec2::new(PLAYER_RADIUS * 2.0, (PLAYER_HALF_HEIGHT + PLAYER_RADIUS) * 2.0);

    commands.spawn((
        Player,
        Sprite::from_color(Color::srgb(0.2, 0.6, 0.9), size),
        Transform::from_translation(spawn_position().extend(1.0)),
        CharacterController::new(),
        player_config(),
        Rapier2dCharacterBundle::new(),
        Collider::capsule_y(PLAYER_HALF_HEIGHT, PLAYER_RADIUS),
    ));
}

// ==================== Input ====================

/// Forwards keyboard state into `MovementIntent`.
///
/// The jump button state is passed through as-is; the controller detects
/// press and release edges itself.
fn handle_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<&mut MovementIntent, With<Player>>,
) {
    for mut movement in &mut query {
        let mut horizontal = 0.0;
        if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
            horizontal -= 1.0;
        }
        if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
            horizontal += 1.0;
        }
        movement.set_horizontal(horizontal);

        let wants_to_jump = keyboard.pressed(KeyCode::Space)
            || keyboard.pressed(KeyCode::KeyW)
            || keyboard.pressed(KeyCode::ArrowUp);
        movement.set_jump_pressed(wants_to_jump);
    }
}

/// Puts the player back at the spawn point with fresh controller state.
fn respawn(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<(&mut Transform, &mut Velocity, &mut CharacterController), With<Player>>,
) {
    if !keyboard.just_pressed(KeyCode::KeyR) {
        return;
    }

    for (mut transform, mut velocity, mut controller) in &mut query {
        transform.translation = spawn_position().extend(1.0);
        *velocity = Velocity::zero();
        let facing = controller.facing();
        *controller = CharacterController::new().with_facing(facing);
    }
}

// ==================== Presentation ====================

/// Smoothly follows the player with the camera.
fn camera_follow(
    player_query: Query<&Transform, (With<Player>, Without<Camera2d>)>,
    mut camera_query: Query<&mut Transform, With<Camera2d>>,
) {
    let Ok(player_transform) = player_query.single() else {
        return;
    };

    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    let target = player_transform.translation.xy();
    let current = camera_transform.translation.xy();
    let smoothed = current.lerp(target, 0.1);
    camera_transform.translation.x = smoothed.x;
    camera_transform.translation.y = smoothed.y;
}

/// Colors the player by state: grounded, airborne, or against a wall.
fn tint_by_state(
    mut query: Query<(&mut Sprite, Has<Grounded>, Option<&TouchingWall>), With<Player>>,
) {
    for (mut sprite, grounded, wall) in &mut query {
        sprite.color = match (grounded, wall) {
            (_, Some(_)) => Color::srgb(0.9, 0.6, 0.2),
            (true, None) => Color::srgb(0.2, 0.6, 0.9),
            (false, None) => Color::srgb(0.5, 0.8, 1.0),
        };
    }
}

fn log_transitions(
    mut grounded: EventReader<GroundedChanged>,
    mut jumped: EventReader<Jumped>,
    mut walls: EventReader<WallTouchChanged>,
) {
    for event in grounded.read() {
        if event.grounded {
            info!("landed (impact speed {:.1})", event.impact_speed);
        } else {
            info!("left the ground");
        }
    }
    for _ in jumped.read() {
        info!("jumped");
    }
    for event in walls.read() {
        info!("wall touch: {:?}", event.state);
    }
}
