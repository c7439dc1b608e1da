//! Red light / green light state machine.
//!
//! The [`LightCycleController`] is ticked once per frame with the frame's delta
//! time and the current pose samples. It never talks to an engine directly:
//! everything the host has to present (sounds, timer text, the conclusion
//! panel) comes back as [`GameEvent`]s, and the doll head orientation is read
//! with [`LightCycleController::doll_rotation`].
use bevy_math::Quat;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{clamp_movement_sensitivity, clamp_rotation_sensitivity, LightCycleConfig};
use crate::pose::{MotionMonitor, MovementViolation, PoseProvider};
use crate::rotation::{yaw, RotationAnimator};
use crate::sequence::{DelayedSequence, SequenceSlot, Step};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightPhase {
    /// Doll looking away, moving is allowed
    #[default]
    Green,
    /// Doll watching, moving eliminates
    Red,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    GreenLight,
    RedLight,
    Rotation,
    Elimination,
    Gunshot,
    TimerEnd,
    TimerTick,
}

/// Side effects requested from the host.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// Stop whatever is playing and play this cue.
    PlaySound(SoundCue),
    /// Play on top of the current sound.
    PlaySoundOverlapped(SoundCue),
    TimerDisplay(String),
    ShowConclusionPanel,
    HideConclusionPanel,
    PhaseChanged(LightPhase),
    GameEnded(Outcome),
}

/// State of the round in progress.
#[derive(Clone, Debug, Default)]
pub struct GameSession {
    pub phase: LightPhase,
    pub is_active: bool,
    pub timer_enabled: bool,
    pub remaining_time: f32,
    pub phase_deadline: f32,
    pub red_phase_start: f32,
    pub outcome: Option<Outcome>,
}

/// Formats seconds as `MM:SS`, truncating to the second.
pub fn format_timer(seconds: f32) -> String {
    let total = seconds.max(0.0).floor() as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Repeats the timer tick while time remains, audible only near the end.
#[derive(Clone, Debug)]
struct TickSoundLoop {
    until_next: f32,
}

pub struct LightCycleController {
    config: LightCycleConfig,
    rng: ChaCha8Rng,
    session: GameSession,
    monitor: MotionMonitor,
    doll: RotationAnimator,
    facing_front: bool,
    tick_loop: Option<TickSoundLoop>,
    elimination: SequenceSlot<GameEvent>,
    resync_poses: bool,
    clock: f32,
    events: Vec<GameEvent>,
}

impl LightCycleController {
    pub fn new(config: LightCycleConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let front = yaw(config.front_angle);
        let doll = RotationAnimator::new(front, config.rotation_rate);
        let session = GameSession {
            remaining_time: config.game_duration,
            ..Default::default()
        };

        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            session,
            monitor: MotionMonitor::default(),
            doll,
            facing_front: true,
            tick_loop: None,
            elimination: SequenceSlot::default(),
            resync_poses: true,
            clock: 0.0,
            events: vec![GameEvent::TimerDisplay(format_timer(config.game_duration))],
            config,
        }
    }

    pub fn config(&self) -> &LightCycleConfig {
        &self.config
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn phase(&self) -> LightPhase {
        self.session.phase
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active
    }

    pub fn remaining_time(&self) -> f32 {
        self.session.remaining_time
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.session.outcome
    }

    /// Seconds since the current round started, advanced by [`Self::tick`].
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn doll_rotation(&self) -> Quat {
        self.doll.current()
    }

    pub fn doll_target(&self) -> Quat {
        self.doll.target()
    }

    pub fn is_doll_rotating(&self) -> bool {
        self.doll.is_rotating()
    }

    pub fn movement_sensitivity(&self) -> f32 {
        self.config.movement_sensitivity
    }

    pub fn rotation_sensitivity(&self) -> f32 {
        self.config.rotation_sensitivity
    }

    pub fn is_elimination_pending(&self) -> bool {
        self.elimination.is_running()
    }

    pub fn is_tick_loop_running(&self) -> bool {
        self.tick_loop.is_some()
    }

    /// Events produced by host calls since the last tick or drain.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn start_game(&mut self) {
        self.stop_game();

        self.session.is_active = true;
        self.session.timer_enabled = true;
        self.session.remaining_time = self.config.game_duration;
        self.session.outcome = None;
        // Grace windows are measured on the round clock
        self.clock = 0.0;
        self.display_timer();
        self.events.push(GameEvent::HideConclusionPanel);

        // Every round opens with the doll watching, then turning away
        self.doll.reset(yaw(self.config.front_angle));
        self.facing_front = true;

        self.tick_loop = Some(TickSoundLoop { until_next: 0.0 });
        self.poll_tick_loop(0.0);

        self.set_green_light();
        log::info!("Game started: {:.0}s on the clock", self.config.game_duration);
    }

    /// Deactivates the round and drops pending sequences without touching
    /// the presentation.
    pub fn stop_game(&mut self) {
        self.session.is_active = false;
        self.session.timer_enabled = false;
        self.tick_loop = None;
        self.elimination.cancel();
    }

    pub fn pause_timer(&mut self) {
        self.session.timer_enabled = false;
    }

    pub fn resume_timer(&mut self) {
        self.session.timer_enabled = true;
    }

    pub fn add_time(&mut self, seconds: f32) {
        self.session.remaining_time = (self.session.remaining_time + seconds).max(0.0);
        self.display_timer();
    }

    pub fn set_movement_sensitivity(&mut self, value: f32) {
        self.config.movement_sensitivity = clamp_movement_sensitivity(value);
    }

    pub fn set_rotation_sensitivity(&mut self, value: f32) {
        self.config.rotation_sensitivity = clamp_rotation_sensitivity(value);
    }

    /// Manual turn toward the opposite facing. Dropped while a turn is in flight.
    pub fn request_rotation(&mut self) -> bool {
        let facing_front = !self.facing_front;
        let target = self.facing_target(facing_front);
        if !self.doll.request_rotation(target) {
            return false;
        }
        self.facing_front = facing_front;
        // The creak only plays when the doll turns to watch during red light
        if facing_front && self.session.phase == LightPhase::Red {
            self.events.push(GameEvent::PlaySound(SoundCue::Rotation));
        }
        log::debug!("Manual doll rotation, facing front: {}", facing_front);
        true
    }

    /// Ends the round as an elimination. Ignored while no round is active.
    pub fn game_over(&mut self) {
        if !self.session.is_active {
            return;
        }
        log::info!("Game over: player eliminated");
        self.session.is_active = false;
        self.session.timer_enabled = false;
        self.session.outcome = Some(Outcome::Lose);
        self.tick_loop = None;
        self.events.push(GameEvent::GameEnded(Outcome::Lose));

        let sequence = DelayedSequence::new([
            Step::Fire(GameEvent::PlaySound(SoundCue::Elimination)),
            Step::Wait(self.config.gunshot_delay),
            Step::Fire(GameEvent::PlaySound(SoundCue::Gunshot)),
            Step::Wait(self.config.panel_delay),
            Step::Fire(GameEvent::ShowConclusionPanel),
        ]);
        self.elimination.start(sequence, &mut self.events);
    }

    /// Advances the game by `dt` seconds and returns every event produced
    /// since the previous call.
    pub fn tick(&mut self, dt: f32, poses: &impl PoseProvider) -> Vec<GameEvent> {
        self.clock += dt;

        self.elimination.poll(dt, &mut self.events);
        self.poll_tick_loop(dt);

        if self.session.is_active {
            self.step_session(dt, poses);
        }

        self.take_events()
    }

    fn step_session(&mut self, dt: f32, poses: &impl PoseProvider) {
        if self.resync_poses {
            self.monitor.snapshot(poses);
            self.resync_poses = false;
        }

        if self.session.timer_enabled {
            self.session.remaining_time = (self.session.remaining_time - dt).max(0.0);
            self.display_timer();
            if self.session.remaining_time <= 0.0 {
                self.complete_timer();
                return;
            }
        }

        self.session.phase_deadline -= dt;
        if self.session.phase_deadline <= 0.0 {
            match self.session.phase {
                LightPhase::Green => self.set_red_light(),
                LightPhase::Red => self.set_green_light(),
            }
            self.monitor.snapshot(poses);
            self.resync_poses = false;
        }

        if let Some(violation) = self.check_movement(poses) {
            log::info!(
                "{:?} moved during red light: position {:.4}m, rotation {:.2}deg",
                violation.point,
                violation.position_delta,
                violation.rotation_delta
            );
            self.game_over();
        }

        self.doll.advance(dt);
    }

    fn check_movement(&mut self, poses: &impl PoseProvider) -> Option<MovementViolation> {
        if self.session.phase != LightPhase::Red || self.doll.is_rotating() {
            return None;
        }
        if self.clock <= self.session.red_phase_start + self.config.grace_time {
            return None;
        }
        self.monitor.detect(
            poses,
            self.config.movement_sensitivity,
            self.config.rotation_sensitivity,
        )
    }

    fn set_green_light(&mut self) {
        self.session.phase = LightPhase::Green;
        self.session.phase_deadline = self.draw(self.config.min_green_time, self.config.max_green_time);
        self.turn_doll(false);
        self.events.push(GameEvent::PlaySound(SoundCue::GreenLight));
        self.events.push(GameEvent::PhaseChanged(LightPhase::Green));
        // Poses get re-sampled on the next tick if no sample is at hand
        self.resync_poses = true;
        log::debug!("Green light for {:.2}s", self.session.phase_deadline);
    }

    fn set_red_light(&mut self) {
        self.session.phase = LightPhase::Red;
        self.session.phase_deadline = self.draw(self.config.min_red_time, self.config.max_red_time);
        self.session.red_phase_start = self.clock;
        self.turn_doll(true);
        self.events.push(GameEvent::PlaySound(SoundCue::RedLight));
        self.events.push(GameEvent::PhaseChanged(LightPhase::Red));
        self.resync_poses = true;
        log::debug!("Red light for {:.2}s", self.session.phase_deadline);
    }

    fn turn_doll(&mut self, facing_front: bool) {
        self.facing_front = facing_front;
        let target = self.facing_target(facing_front);
        self.doll.retarget(target);
    }

    fn facing_target(&self, facing_front: bool) -> Quat {
        if facing_front {
            yaw(self.config.front_angle)
        } else {
            yaw(self.config.back_angle)
        }
    }

    fn draw(&mut self, min: f32, max: f32) -> f32 {
        if !min.is_finite() {
            return 0.0;
        }
        if !max.is_finite() || min >= max {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    fn complete_timer(&mut self) {
        log::info!("Time's up! Player survived the full time");
        self.events.push(GameEvent::PlaySound(SoundCue::TimerEnd));
        self.stop_game();
        self.session.outcome = Some(Outcome::Win);
        self.events.push(GameEvent::GameEnded(Outcome::Win));
        self.events.push(GameEvent::ShowConclusionPanel);
    }

    fn display_timer(&mut self) {
        self.events
            .push(GameEvent::TimerDisplay(format_timer(self.session.remaining_time)));
    }

    fn poll_tick_loop(&mut self, dt: f32) {
        let Some(tick_loop) = self.tick_loop.as_mut() else {
            return;
        };
        tick_loop.until_next -= dt;
        if tick_loop.until_next > 0.0 {
            return;
        }
        if self.session.remaining_time <= 0.0 {
            self.tick_loop = None;
            return;
        }
        tick_loop.until_next = self.config.tick_interval;
        if self.session.remaining_time <= self.config.tick_warning_threshold {
            self.events
                .push(GameEvent::PlaySoundOverlapped(SoundCue::TimerTick));
        }
    }
}
