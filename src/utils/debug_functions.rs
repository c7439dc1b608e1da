//! Debug functions for the game.
use bevy::{prelude::*, window::*};

use crate::utils::objects::{DeadZone, LightCycle, Ride, TrackedPointMarker};

/// Toggles VSync when the 'V' key is pressed.
pub fn toggle_vsync(input: Res<ButtonInput<KeyCode>>, mut window: Query<&mut Window>) {
    if input.just_pressed(KeyCode::KeyV) {
        let Ok(mut window) = window.single_mut() else {
            return;
        };

        window.present_mode = if matches!(window.present_mode, PresentMode::AutoVsync) {
            PresentMode::AutoNoVsync
        } else {
            PresentMode::AutoVsync
        };

        info!("PRESENT_MODE: {:?}", window.present_mode);
    }
}

/// Draws the tracked points and trigger volumes when the 'G' key is toggled.
/// Tracked points turn red while the doll is watching.
pub fn visualize_trigger_volumes(
    mut gizmos: Gizmos,
    input: Res<ButtonInput<KeyCode>>,
    mut show_volumes: Local<bool>,
    light_cycle: Res<LightCycle>,
    points: Query<(&TrackedPointMarker, &GlobalTransform)>,
    rides: Query<(&Ride, &GlobalTransform)>,
    dead_zones: Query<(&DeadZone, &GlobalTransform)>,
) {
    if input.just_pressed(KeyCode::KeyG) {
        *show_volumes = !*show_volumes;
        info!("Trigger volume visualization: {}", *show_volumes);
    }

    if !*show_volumes {
        return;
    }

    let point_color = if light_cycle.0.phase() == shared::LightPhase::Red {
        Color::srgb(1.0, 0.1, 0.1)
    } else {
        Color::srgb(0.1, 1.0, 0.1)
    };
    for (_, transform) in &points {
        gizmos.sphere(transform.translation(), 0.05, point_color);
    }

    for (ride, transform) in &rides {
        let color = if ride.zone.is_player_inside() {
            Color::srgb(1.0, 0.8, 0.0)
        } else {
            Color::WHITE
        };
        gizmos.cube(
            Transform::from_translation(transform.translation()).with_scale(ride.half_extents * 2.0),
            color,
        );
    }

    for (zone, transform) in &dead_zones {
        gizmos.cube(
            Transform::from_translation(transform.translation()).with_scale(zone.half_extents * 2.0),
            Color::BLACK,
        );
    }
}
