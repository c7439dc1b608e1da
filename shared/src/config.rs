//! Game configuration, loaded from TOML with every field defaulted.
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{
    audio_constants::*, doll_constants::*, gadget_constants::*, game_constants::*,
    light_constants::*, movement_constants::*,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid range for {name}: min {min} > max {max}")]
    InvertedRange { name: &'static str, min: f32, max: f32 },

    #[error("{name} must be non-negative, got {value}")]
    Negative { name: &'static str, value: f32 },

    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f32 },
}

/// Optional asset path per sound cue. A missing path mutes the cue.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioClips {
    pub green_light: Option<String>,
    pub red_light: Option<String>,
    pub rotation: Option<String>,
    pub elimination: Option<String>,
    pub gunshot: Option<String>,
    pub timer_end: Option<String>,
    pub timer_tick: Option<String>,
}

/// Tuning for the scene gadgets around the doll.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GadgetConfig {
    pub firecracker_delay: f32,
    pub projectile_speed: f32,
    pub recoil_distance: f32,
    pub recoil_speed: f32,
}

impl Default for GadgetConfig {
    fn default() -> Self {
        Self {
            firecracker_delay: FIRECRACKER_DELAY_SECS,
            projectile_speed: PROJECTILE_SPEED,
            recoil_distance: RECOIL_DISTANCE,
            recoil_speed: RECOIL_SPEED,
        }
    }
}

/// Everything the light cycle needs at construction. Times are in seconds,
/// angles in degrees, distances in meters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightCycleConfig {
    pub min_green_time: f32,
    pub max_green_time: f32,
    pub min_red_time: f32,
    pub max_red_time: f32,
    pub game_duration: f32,
    pub grace_time: f32,
    pub movement_sensitivity: f32,
    pub rotation_sensitivity: f32,
    pub rotation_rate: f32,
    pub front_angle: f32,
    pub back_angle: f32,
    pub tick_interval: f32,
    pub tick_warning_threshold: f32,
    pub gunshot_delay: f32,
    pub panel_delay: f32,
    pub auto_start: bool,
    pub seed: Option<u64>,
    pub audio: AudioClips,
    pub gadgets: GadgetConfig,
}

impl Default for LightCycleConfig {
    fn default() -> Self {
        Self {
            min_green_time: MIN_GREEN_LIGHT_SECS,
            max_green_time: MAX_GREEN_LIGHT_SECS,
            min_red_time: MIN_RED_LIGHT_SECS,
            max_red_time: MAX_RED_LIGHT_SECS,
            game_duration: GAME_DURATION_SECS,
            grace_time: GRACE_TIME_SECS,
            movement_sensitivity: MOVEMENT_SENSITIVITY_M,
            rotation_sensitivity: ROTATION_SENSITIVITY_DEG,
            rotation_rate: ROTATION_RATE_DEG,
            front_angle: FRONT_ANGLE_DEG,
            back_angle: BACK_ANGLE_DEG,
            tick_interval: TICK_INTERVAL_SECS,
            tick_warning_threshold: TICK_WARNING_THRESHOLD_SECS,
            gunshot_delay: GUNSHOT_DELAY_SECS,
            panel_delay: CONCLUSION_PANEL_DELAY_SECS,
            auto_start: AUTO_START,
            seed: None,
            audio: AudioClips::default(),
            gadgets: GadgetConfig::default(),
        }
    }
}

impl LightCycleConfig {
    /// Parses and validates a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: LightCycleConfig = toml::from_str(text)?;
        config.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Rejects non-finite values, inverted or negative ranges and clamps the
    /// sensitivities onto their floors.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        for (name, value) in [
            ("min_green_time", self.min_green_time),
            ("max_green_time", self.max_green_time),
            ("min_red_time", self.min_red_time),
            ("max_red_time", self.max_red_time),
            ("game_duration", self.game_duration),
            ("grace_time", self.grace_time),
            ("movement_sensitivity", self.movement_sensitivity),
            ("rotation_sensitivity", self.rotation_sensitivity),
            ("rotation_rate", self.rotation_rate),
            ("front_angle", self.front_angle),
            ("back_angle", self.back_angle),
            ("tick_interval", self.tick_interval),
            ("tick_warning_threshold", self.tick_warning_threshold),
            ("gunshot_delay", self.gunshot_delay),
            ("panel_delay", self.panel_delay),
            ("gadgets.firecracker_delay", self.gadgets.firecracker_delay),
            ("gadgets.projectile_speed", self.gadgets.projectile_speed),
            ("gadgets.recoil_distance", self.gadgets.recoil_distance),
            ("gadgets.recoil_speed", self.gadgets.recoil_speed),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name, value });
            }
        }

        for (name, value) in [
            ("min_green_time", self.min_green_time),
            ("min_red_time", self.min_red_time),
            ("game_duration", self.game_duration),
            ("grace_time", self.grace_time),
            ("rotation_rate", self.rotation_rate),
            ("tick_interval", self.tick_interval),
            ("gunshot_delay", self.gunshot_delay),
            ("panel_delay", self.panel_delay),
            ("gadgets.firecracker_delay", self.gadgets.firecracker_delay),
            ("gadgets.recoil_speed", self.gadgets.recoil_speed),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative { name, value });
            }
        }

        for (name, min, max) in [
            ("green light", self.min_green_time, self.max_green_time),
            ("red light", self.min_red_time, self.max_red_time),
        ] {
            if min > max {
                return Err(ConfigError::InvertedRange { name, min, max });
            }
        }

        self.movement_sensitivity = clamp_movement_sensitivity(self.movement_sensitivity);
        self.rotation_sensitivity = clamp_rotation_sensitivity(self.rotation_sensitivity);
        Ok(self)
    }
}

/// Non-finite values fall back to the floor.
pub fn clamp_movement_sensitivity(value: f32) -> f32 {
    if value.is_finite() {
        value.max(MIN_MOVEMENT_SENSITIVITY_M)
    } else {
        MIN_MOVEMENT_SENSITIVITY_M
    }
}

pub fn clamp_rotation_sensitivity(value: f32) -> f32 {
    if value.is_finite() {
        value.max(MIN_ROTATION_SENSITIVITY_DEG)
    } else {
        MIN_ROTATION_SENSITIVITY_DEG
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = LightCycleConfig::from_toml_str("").unwrap();
        assert_eq!(config, LightCycleConfig::default());
    }

    #[test]
    fn partial_document_overrides_only_given_keys() {
        let config = LightCycleConfig::from_toml_str(
            r#"
            min_green_time = 3.0
            max_green_time = 3.0
            seed = 7

            [audio]
            gunshot = "sounds/gunshot.ogg"
            "#,
        )
        .unwrap();

        assert_eq!(config.max_green_time, 3.0);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.audio.gunshot.as_deref(), Some("sounds/gunshot.ogg"));
        assert_eq!(config.audio.elimination, None);
        assert_eq!(config.game_duration, GAME_DURATION_SECS);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = LightCycleConfig::from_toml_str("min_red_time = 6.0\nmax_red_time = 2.0")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvertedRange { name: "red light", .. }));
    }

    #[test]
    fn negative_duration_is_rejected() {
        let err = LightCycleConfig::from_toml_str("grace_time = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Negative { name: "grace_time", .. }));
    }

    #[test]
    fn sensitivities_are_clamped_not_rejected() {
        let config = LightCycleConfig::from_toml_str(
            "movement_sensitivity = -4.0\nrotation_sensitivity = 0.0",
        )
        .unwrap();
        assert_eq!(config.movement_sensitivity, MIN_MOVEMENT_SENSITIVITY_M);
        assert_eq!(config.rotation_sensitivity, MIN_ROTATION_SENSITIVITY_DEG);
    }

    #[test]
    fn infinite_bound_is_rejected() {
        let err = LightCycleConfig::from_toml_str("max_green_time = inf").unwrap_err();
        assert!(matches!(err, ConfigError::NotFinite { name: "max_green_time", .. }));
    }

    #[test]
    fn nan_is_rejected() {
        let err = LightCycleConfig::from_toml_str("min_red_time = nan").unwrap_err();
        assert!(matches!(err, ConfigError::NotFinite { name: "min_red_time", .. }));

        let err = LightCycleConfig::from_toml_str("rotation_sensitivity = nan").unwrap_err();
        assert!(matches!(err, ConfigError::NotFinite { name: "rotation_sensitivity", .. }));
    }

    #[test]
    fn non_finite_runtime_sensitivity_falls_to_the_floor() {
        assert_eq!(clamp_movement_sensitivity(f32::INFINITY), MIN_MOVEMENT_SENSITIVITY_M);
        assert_eq!(clamp_rotation_sensitivity(f32::NAN), MIN_ROTATION_SENSITIVITY_DEG);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = LightCycleConfig::from_toml_str("min_green_time = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn shipped_config_matches_the_defaults() {
        let text = include_str!("../../assets/doll_config.toml");
        let config = LightCycleConfig::from_toml_str(text).unwrap();
        assert_eq!(config, LightCycleConfig::default());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = LightCycleConfig::load("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
