use bevy::prelude::*;

use doll_game::log;
use doll_game::utils::objects::{LightCycle, RandomGen};
use doll_game::utils::systems_logic::SystemsLogicPlugin;
use shared::constants::game_constants::{CONFIG_PATH, REFRESH_RATE_HZ, SEED};
use shared::{LightCycleConfig, LightCycleController};

/// Main application function
fn main() {
    let config = match LightCycleConfig::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(err) => {
            log!("⚠️ Falling back to default settings: {}", err);
            LightCycleConfig::default()
        }
    };
    let layout_seed = config.seed.unwrap_or(SEED);

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Doll Game".into(),
                fit_canvas_to_parent: true,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(Time::<Fixed>::from_hz(REFRESH_RATE_HZ))
        .insert_resource(RandomGen::from_seed(layout_seed))
        .insert_resource(LightCycle(LightCycleController::new(config)))
        .add_plugins(SystemsLogicPlugin)
        .run();
}
