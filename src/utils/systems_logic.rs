//! Systems logic: scene setup at startup, then the per-frame light cycle.

use crate::utils::camera::{head_look_inputs, player_walk_inputs};
use crate::utils::debug_functions::{toggle_vsync, visualize_trigger_volumes};
use crate::utils::gadgets::{
    animate_recoil, animate_rides, dead_zone_teleport, fire_blaster, move_projectiles,
    pop_balloons, update_rides,
};
use crate::utils::game_functions::{
    apply_doll_rotation, apply_game_events, drive_light_cycle, update_ui_scale,
};
use crate::utils::global_inputs::{handle_game_input, handle_window_input};
use crate::utils::objects::{DollSounds, PendingGameEvents};
use crate::utils::setup::{
    auto_start, setup_doll, setup_environment, setup_gadgets, setup_player, setup_sounds, setup_ui,
};
use bevy::prelude::*;

// Plugin for managing all the game systems.
pub struct SystemsLogicPlugin;

impl Plugin for SystemsLogicPlugin {
    /// Builds the plugin by adding the systems to the app.
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingGameEvents>()
            .init_resource::<DollSounds>()
            .add_systems(
                Startup,
                (
                    setup_environment,
                    setup_player,
                    setup_doll,
                    setup_gadgets,
                    setup_ui,
                    setup_sounds,
                    auto_start,
                )
                    .chain(),
            )
            // Global UI responsiveness system (runs every frame)
            .add_systems(Update, (update_ui_scale, toggle_vsync, visualize_trigger_volumes))
            .add_systems(
                Update,
                (
                    // Host inputs land in the same frame's tick
                    (handle_window_input, handle_game_input, player_walk_inputs, head_look_inputs),
                    drive_light_cycle,
                    apply_game_events,
                    apply_doll_rotation,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    (update_rides, animate_rides).chain(),
                    (fire_blaster, animate_recoil).chain(),
                    dead_zone_teleport,
                ),
            )
            .add_systems(FixedUpdate, (move_projectiles, pop_balloons).chain());
    }
}
