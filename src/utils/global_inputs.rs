//! Input handling for the game, specifically the always-on host controls.
use bevy::prelude::*;

use bevy::window::{
    CursorGrabMode, CursorOptions, MonitorSelection, PrimaryWindow, VideoModeSelection, WindowMode,
};

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::utils::objects::{LightCycle, StartPanel};

const ADDED_TIME_SECS: f32 = 10.0;
const MOVEMENT_SENSITIVITY_STEP: f32 = 0.005;
const ROTATION_SENSITIVITY_STEP: f32 = 0.1;

/// Atomic index to cycle different display and cursor modes
static DISPLAY_RING_IDX: AtomicUsize = AtomicUsize::new(0);

/// Cycle between windowed and fullscreen/locked cursor modes (ESC)
pub fn toggle_display_cursor_mode_ring(window: &mut Window, cursor: &mut CursorOptions) {
    // Compute the next index in a cycle of 2 (0, 1, 0, 1, ...)
    let next = (DISPLAY_RING_IDX.load(Ordering::SeqCst) + 1) % 2;
    DISPLAY_RING_IDX.store(next, Ordering::SeqCst);

    let (mode, grab, visible) = if next == 1 {
        (
            WindowMode::Fullscreen(MonitorSelection::Current, VideoModeSelection::Current),
            CursorGrabMode::Locked,
            false,
        )
    } else {
        (WindowMode::Windowed, CursorGrabMode::None, true)
    };

    #[cfg(not(target_arch = "wasm32"))]
    {
        window.mode = mode;
    }
    #[cfg(target_arch = "wasm32")]
    let _ = (window, mode);

    cursor.grab_mode = grab;
    cursor.visible = visible;
}

/// ESC toggles display and cursor modes, Q quits.
pub fn handle_window_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut cursor: Query<&mut CursorOptions>,
    mut exit: MessageWriter<AppExit>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        let (Ok(mut window), Ok(mut cursor)) = (windows.single_mut(), cursor.single_mut()) else {
            return;
        };
        toggle_display_cursor_mode_ring(&mut window, &mut cursor);
        debug!("Window mode is now {:?}", window.mode);
    }

    if keyboard.just_pressed(KeyCode::KeyQ) {
        info!("Quit requested");
        exit.write(AppExit::Success);
    }
}

/// Host operations on the light cycle bound to keys.
pub fn handle_game_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut light_cycle: ResMut<LightCycle>,
    mut start_panel: Query<&mut Visibility, With<StartPanel>>,
) {
    let controller = &mut light_cycle.0;

    if keyboard.just_pressed(KeyCode::Enter) {
        // The start panel makes way for the game view on first start
        if let Ok(mut visibility) = start_panel.single_mut() {
            *visibility = Visibility::Hidden;
        }
        controller.start_game();
    }
    if keyboard.just_pressed(KeyCode::Backspace) {
        controller.stop_game();
        info!("Game stopped");
    }
    if keyboard.just_pressed(KeyCode::KeyP) {
        if controller.session().timer_enabled {
            controller.pause_timer();
            info!("Timer paused at {:.1}s", controller.remaining_time());
        } else {
            controller.resume_timer();
            info!("Timer resumed");
        }
    }
    if keyboard.just_pressed(KeyCode::KeyT) {
        controller.add_time(ADDED_TIME_SECS);
    }
    if keyboard.just_pressed(KeyCode::KeyR) && !controller.request_rotation() {
        debug!("Doll still turning, rotation request dropped");
    }

    let movement = if keyboard.just_pressed(KeyCode::BracketRight) {
        Some(MOVEMENT_SENSITIVITY_STEP)
    } else if keyboard.just_pressed(KeyCode::BracketLeft) {
        Some(-MOVEMENT_SENSITIVITY_STEP)
    } else {
        None
    };
    if let Some(step) = movement {
        let value = controller.movement_sensitivity() + step;
        controller.set_movement_sensitivity(value);
        info!("Movement sensitivity: {:.3}m", controller.movement_sensitivity());
    }

    let rotation = if keyboard.just_pressed(KeyCode::Equal) {
        Some(ROTATION_SENSITIVITY_STEP)
    } else if keyboard.just_pressed(KeyCode::Minus) {
        Some(-ROTATION_SENSITIVITY_STEP)
    } else {
        None
    };
    if let Some(step) = rotation {
        let value = controller.rotation_sensitivity() + step;
        controller.set_rotation_sensitivity(value);
        info!("Rotation sensitivity: {:.2}deg", controller.rotation_sensitivity());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{LightCycleConfig, LightCycleController};

    fn press(app: &mut App, key: KeyCode) {
        let mut input = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        input.reset_all();
        input.press(key);
        app.update();
    }

    #[test]
    fn keys_drive_the_host_operations() {
        let mut app = App::new();
        app.init_resource::<ButtonInput<KeyCode>>()
            .insert_resource(LightCycle(LightCycleController::new(LightCycleConfig {
                seed: Some(1),
                ..Default::default()
            })))
            .add_systems(Update, handle_game_input);
        let panel = app.world_mut().spawn((StartPanel, Visibility::Visible)).id();

        press(&mut app, KeyCode::Enter);
        assert!(app.world().resource::<LightCycle>().0.is_active());
        assert_eq!(app.world().get::<Visibility>(panel), Some(&Visibility::Hidden));

        press(&mut app, KeyCode::KeyP);
        assert!(!app.world().resource::<LightCycle>().0.session().timer_enabled);
        press(&mut app, KeyCode::KeyP);
        assert!(app.world().resource::<LightCycle>().0.session().timer_enabled);

        let before = app.world().resource::<LightCycle>().0.remaining_time();
        press(&mut app, KeyCode::KeyT);
        let after = app.world().resource::<LightCycle>().0.remaining_time();
        assert!((after - before - ADDED_TIME_SECS).abs() < 1e-4);

        let before = app.world().resource::<LightCycle>().0.movement_sensitivity();
        press(&mut app, KeyCode::BracketRight);
        let after = app.world().resource::<LightCycle>().0.movement_sensitivity();
        assert!((after - before - MOVEMENT_SENSITIVITY_STEP).abs() < 1e-6);

        press(&mut app, KeyCode::Backspace);
        assert!(!app.world().resource::<LightCycle>().0.is_active());
    }
}
