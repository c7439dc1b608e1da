//! This file defines the various objects, resources, and components used in the game.
use std::collections::HashMap;

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use shared::constants::game_constants::SEED;
use shared::gadgets::{RecoilSlider, RideZone};
use shared::{GameEvent, LightCycleController, SoundCue, TrackedPoint};

/// The red light / green light state machine driving the round
#[derive(Resource)]
pub struct LightCycle(pub LightCycleController);

/// Events returned by the controller, waiting for the presentation systems
#[derive(Resource, Default)]
pub struct PendingGameEvents(pub Vec<GameEvent>);

/// Loaded clip per sound cue. Cues without a clip stay silent.
#[derive(Resource, Default)]
pub struct DollSounds {
    pub clips: HashMap<SoundCue, Handle<AudioSource>>,
}

/// Random number generator for scene layout
#[derive(Resource)]
pub struct RandomGen {
    pub random_gen: ChaCha8Rng,
}

impl RandomGen {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            random_gen: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomGen {
    fn default() -> Self {
        Self::from_seed(SEED)
    }
}

/// Doll head, rotated from the controller every frame
#[derive(Component)]
pub struct DollHead;

/// Entity whose global transform is sampled as one of the tracked VR points
#[derive(Component, Clone, Copy, Debug)]
pub struct TrackedPointMarker(pub TrackedPoint);

/// Root of the player: moved by the keyboard, carried by rides, teleported by dead zones
#[derive(Component)]
pub struct PlayerRig;

/// Audio entity started with "interrupt" semantics; only one plays at a time
#[derive(Component)]
pub struct MainAudioChannel;

// UI markers
#[derive(Component)]
pub struct TimerText;

#[derive(Component)]
pub struct PhaseText;

#[derive(Component)]
pub struct ConclusionPanel;

#[derive(Component)]
pub struct ConclusionText;

/// Panel shown before the first round when the game does not auto start
#[derive(Component)]
pub struct StartPanel;

/// Cabin or roller car with its trigger volume
#[derive(Component)]
pub struct Ride {
    pub zone: RideZone,
    pub half_extents: Vec3,
}

/// Circular back and forth motion played when a ride starts
#[derive(Component)]
pub struct RideMotion {
    pub anchor: Vec3,
    pub radius: f32,
    pub duration: f32,
    pub elapsed: Option<f32>,
}

/// Firecracker owned by a ride, toggled by the ride's fuse
#[derive(Component)]
pub struct Firecracker {
    pub ride: Entity,
}

/// Blaster held in the right hand
#[derive(Component)]
pub struct Blaster {
    pub recoil: RecoilSlider,
    pub slider: Entity,
    pub muzzle: Entity,
}

#[derive(Component)]
pub struct Projectile {
    pub velocity: Vec3,
    pub lifetime: f32,
}

#[derive(Component)]
pub struct Balloon;

/// Trigger volume sending the player back to the respawn point
#[derive(Component)]
pub struct DeadZone {
    pub half_extents: Vec3,
}

#[derive(Component)]
pub struct RespawnPoint;

/// A component that marks an entity as a UI entity.
#[derive(Component)]
pub struct UIEntity;

/// True when `point` lies in the axis aligned box centered on `center`.
pub fn inside_box(point: Vec3, center: Vec3, half_extents: Vec3) -> bool {
    (point - center).abs().cmple(half_extents).all()
}
