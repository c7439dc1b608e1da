// Constants used by the doll game and shared across libraries.

/// Generic game constants
pub mod game_constants {
    pub const REFRESH_RATE_HZ: f64 = 60.0; // Hz

    // Seed for the random number generator when the config does not pin one.
    pub const SEED: u64 = 69;

    // Round length
    pub const GAME_DURATION_SECS: f32 = 120.0; // 2 minutes

    // Start the round as soon as the scene is ready
    pub const AUTO_START: bool = true;

    // UI responsive design reference
    pub const UI_REFERENCE_HEIGHT: f32 = 1080.0; // 1080p as reference

    // Default config location, relative to the working directory
    pub const CONFIG_PATH: &str = "assets/doll_config.toml";
}

/// Light cycle timing
pub mod light_constants {
    pub const MIN_GREEN_LIGHT_SECS: f32 = 3.0;
    pub const MAX_GREEN_LIGHT_SECS: f32 = 8.0;
    pub const MIN_RED_LIGHT_SECS: f32 = 2.0;
    pub const MAX_RED_LIGHT_SECS: f32 = 5.0;

    // Short grace period when the light changes to red
    pub const GRACE_TIME_SECS: f32 = 0.5;
}

/// Doll head animation
pub mod doll_constants {
    pub const ROTATION_RATE_DEG: f32 = 90.0; // degrees per second

    // Yaw of the head when watching the players / when looking away
    pub const FRONT_ANGLE_DEG: f32 = 0.0;
    pub const BACK_ANGLE_DEG: f32 = 180.0;

    // Remaining gap under which the head snaps onto its target
    pub const ROTATION_SNAP_EPSILON_DEG: f32 = 0.1;
}

/// Movement detection on the tracked points
pub mod movement_constants {
    pub const MOVEMENT_SENSITIVITY_M: f32 = 0.01;
    pub const ROTATION_SENSITIVITY_DEG: f32 = 0.5;

    // Lowest accepted values when tuning at runtime
    pub const MIN_MOVEMENT_SENSITIVITY_M: f32 = 0.001;
    pub const MIN_ROTATION_SENSITIVITY_DEG: f32 = 0.1;
}

/// Timer and end-of-round audio sequencing
pub mod audio_constants {
    pub const TICK_INTERVAL_SECS: f32 = 1.0;
    // Tick sounds only play in the last seconds of the round
    pub const TICK_WARNING_THRESHOLD_SECS: f32 = 10.0;

    pub const GUNSHOT_DELAY_SECS: f32 = 3.0;
    pub const CONCLUSION_PANEL_DELAY_SECS: f32 = 1.0;
}

/// Scene gadgets
pub mod gadget_constants {
    pub const FIRECRACKER_DELAY_SECS: f32 = 5.0;

    pub const PROJECTILE_SPEED: f32 = 20.0;
    pub const PROJECTILE_RADIUS: f32 = 0.05;
    pub const PROJECTILE_LIFETIME_SECS: f32 = 4.0;
    pub const BALLOON_RADIUS: f32 = 0.3;

    pub const RECOIL_DISTANCE: f32 = 0.1;
    pub const RECOIL_SPEED: f32 = 5.0; // normalized progress per second
}
