//! Engine-independent core of the doll game.
//!
//! Everything here is plain data and state machines ticked with a delta time:
//! the red light / green light controller, the movement monitor over the
//! tracked VR points, the doll head animator, delayed sequences and the scene
//! gadgets. The Bevy application feeds these with poses and frame time and
//! turns their events into sound and UI.
//!
//! ## Tick order
//!
//! LightCycleController::tick {
//!     pending sequences          // elimination sounds, timer ticks
//!     countdown                  // may end the round as a win
//!     light phase deadline       // flips GREEN <-> RED
//!     movement check             // RED only, after the grace window
//!     doll rotation
//! }
//!
pub mod config;
pub mod constants;
pub mod controller;
pub mod gadgets;
pub mod pose;
pub mod rotation;
pub mod sequence;

pub use config::{AudioClips, ConfigError, GadgetConfig, LightCycleConfig};
pub use controller::{GameEvent, LightCycleController, LightPhase, Outcome, SoundCue};
pub use pose::{PoseProvider, PoseSample, TrackedPoint, TrackedPose};
