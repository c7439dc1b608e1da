//! First person controls for the player rig: walk with WASD, look around
//! with the mouse or the arrow keys.
use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;

use crate::utils::objects::{PlayerRig, TrackedPointMarker};
use shared::TrackedPoint;

const WALK_SPEED: f32 = 2.5; // m/s
const TURN_SPEED: f32 = 1.5; // rad/s
const MOUSE_SENSITIVITY: f32 = 0.002; // rad per pixel
const MAX_PITCH: f32 = 1.4;

/// Moves the rig on the ground plane along the head's heading.
pub fn player_walk_inputs(
    keyboard: Res<ButtonInput<KeyCode>>,
    timer: Res<Time>,
    mut rig_query: Query<&mut Transform, With<PlayerRig>>,
    head_query: Query<(&TrackedPointMarker, &GlobalTransform)>,
) {
    let Ok(mut rig) = rig_query.single_mut() else {
        return;
    };
    let Some(head) = head_query
        .iter()
        .find(|(marker, _)| marker.0 == TrackedPoint::Head)
        .map(|(_, transform)| transform)
    else {
        return;
    };

    let mut direction = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        direction.z -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        direction.z += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        direction.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        direction.x += 1.0;
    }

    if direction == Vec3::ZERO {
        return;
    }

    // Heading on the XZ plane only
    let (yaw, _, _) = head.to_scale_rotation_translation().1.to_euler(EulerRot::YXZ);
    let heading = Quat::from_rotation_y(yaw) * direction.normalize();
    rig.translation += heading * WALK_SPEED * timer.delta_secs();
}

/// Turns the head camera: yaw and pitch from mouse motion and arrow keys.
pub fn head_look_inputs(
    keyboard: Res<ButtonInput<KeyCode>>,
    timer: Res<Time>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut camera_query: Query<&mut Transform, (With<Camera3d>, With<TrackedPointMarker>)>,
) {
    let Ok(mut transform) = camera_query.single_mut() else {
        mouse_motion.clear();
        return;
    };

    let mut delta = mouse_motion
        .read()
        .fold(Vec2::ZERO, |acc, motion| acc + motion.delta)
        * MOUSE_SENSITIVITY;

    let turn = TURN_SPEED * timer.delta_secs();
    if keyboard.pressed(KeyCode::ArrowLeft) {
        delta.x -= turn;
    }
    if keyboard.pressed(KeyCode::ArrowRight) {
        delta.x += turn;
    }
    if keyboard.pressed(KeyCode::ArrowUp) {
        delta.y -= turn;
    }
    if keyboard.pressed(KeyCode::ArrowDown) {
        delta.y += turn;
    }

    if delta == Vec2::ZERO {
        return;
    }

    let (mut yaw, mut pitch, _) = transform.rotation.to_euler(EulerRot::YXZ);
    yaw -= delta.x;
    pitch = (pitch - delta.y).clamp(-MAX_PITCH, MAX_PITCH);
    transform.rotation = Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0);
}
