//! State machines for the scene gadgets around the doll: ride cabins with an
//! optional delayed firecracker, and the blaster's recoiling slider.
use bevy_math::Vec3;

use crate::sequence::{DelayedSequence, SequenceSlot, Step};

/// What a ride asks its host to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RideAction {
    /// Parent the player to the ride so it carries them along.
    AttachPlayer,
    DetachPlayer,
    /// Fire the ride's start animation.
    StartAnimation,
    ActivateFirecracker,
    DeactivateFirecracker,
}

/// Cabin or roller coaster car the player can step into.
#[derive(Clone, Debug)]
pub struct RideZone {
    player_inside: bool,
    /// `None` for rides without a firecracker.
    firecracker_delay: Option<f32>,
    firecracker: SequenceSlot<RideAction>,
}

impl RideZone {
    pub fn cabin() -> Self {
        Self {
            player_inside: false,
            firecracker_delay: None,
            firecracker: SequenceSlot::default(),
        }
    }

    pub fn with_firecracker(delay: f32) -> Self {
        Self {
            firecracker_delay: Some(delay),
            ..Self::cabin()
        }
    }

    pub fn is_player_inside(&self) -> bool {
        self.player_inside
    }

    pub fn has_firecracker(&self) -> bool {
        self.firecracker_delay.is_some()
    }

    pub fn is_firecracker_armed(&self) -> bool {
        self.firecracker.is_running()
    }

    pub fn player_entered(&mut self) -> Vec<RideAction> {
        let mut actions = vec![RideAction::AttachPlayer];
        self.player_inside = true;
        actions.push(RideAction::StartAnimation);

        if let Some(delay) = self.firecracker_delay {
            let fuse = DelayedSequence::new([
                Step::Wait(delay),
                Step::Fire(RideAction::ActivateFirecracker),
            ]);
            self.firecracker.start(fuse, &mut actions);
        }
        actions
    }

    pub fn player_exited(&mut self) -> Vec<RideAction> {
        self.player_inside = false;
        self.firecracker.cancel();

        let mut actions = vec![RideAction::DetachPlayer];
        if self.firecracker_delay.is_some() {
            actions.push(RideAction::DeactivateFirecracker);
        }
        actions
    }

    /// Re-triggers the ride animation, only while someone is aboard.
    pub fn start_animation(&self) -> Option<RideAction> {
        self.player_inside.then_some(RideAction::StartAnimation)
    }

    pub fn tick(&mut self, dt: f32) -> Vec<RideAction> {
        let mut fired = Vec::new();
        self.firecracker.poll(dt, &mut fired);
        // The fuse only lights the firecracker for a rider still aboard
        fired.retain(|action| *action != RideAction::ActivateFirecracker || self.player_inside);
        fired
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum RecoilStage {
    Back(f32),
    Forward(f32),
}

/// Slider kick-back: lerp to the back position, then return to rest.
#[derive(Clone, Debug)]
pub struct RecoilSlider {
    rest: Vec3,
    back: Vec3,
    /// Normalized progress per second
    speed: f32,
    stage: Option<RecoilStage>,
}

impl RecoilSlider {
    pub fn new(rest: Vec3, distance: f32, speed: f32) -> Self {
        Self {
            rest,
            back: rest - Vec3::new(0.0, distance, 0.0),
            speed,
            stage: None,
        }
    }

    pub fn is_recoiling(&self) -> bool {
        self.stage.is_some()
    }

    /// Restarts the kick from the rest position.
    pub fn kick(&mut self) {
        self.stage = Some(RecoilStage::Back(0.0));
    }

    /// Returns the slider's local position after `dt`.
    pub fn tick(&mut self, dt: f32) -> Vec3 {
        let step = dt * self.speed;
        match self.stage {
            None => self.rest,
            Some(RecoilStage::Back(progress)) => {
                let progress = progress + step;
                if progress >= 1.0 {
                    self.stage = Some(RecoilStage::Forward(0.0));
                    self.back
                } else {
                    self.stage = Some(RecoilStage::Back(progress));
                    self.rest.lerp(self.back, progress)
                }
            }
            Some(RecoilStage::Forward(progress)) => {
                let progress = progress + step;
                if progress >= 1.0 {
                    self.stage = None;
                    self.rest
                } else {
                    self.stage = Some(RecoilStage::Forward(progress));
                    self.back.lerp(self.rest, progress)
                }
            }
        }
    }
}

/// True when two spheres overlap.
pub fn spheres_touch(a: Vec3, radius_a: f32, b: Vec3, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cabin_attaches_and_animates_on_enter() {
        let mut cabin = RideZone::cabin();
        assert_eq!(cabin.start_animation(), None);
        assert_eq!(
            cabin.player_entered(),
            vec![RideAction::AttachPlayer, RideAction::StartAnimation]
        );
        assert_eq!(cabin.start_animation(), Some(RideAction::StartAnimation));
        assert_eq!(cabin.player_exited(), vec![RideAction::DetachPlayer]);
        assert!(!cabin.is_player_inside());
    }

    #[test]
    fn firecracker_lights_after_the_delay() {
        let mut roller = RideZone::with_firecracker(5.0);
        roller.player_entered();
        assert!(roller.is_firecracker_armed());

        let mut fired = Vec::new();
        for _ in 0..9 {
            fired.extend(roller.tick(0.5));
        }
        assert!(fired.is_empty());
        assert_eq!(roller.tick(0.5), vec![RideAction::ActivateFirecracker]);
        assert!(!roller.is_firecracker_armed());
    }

    #[test]
    fn leaving_early_defuses_the_firecracker() {
        let mut roller = RideZone::with_firecracker(5.0);
        roller.player_entered();
        roller.tick(2.0);

        let actions = roller.player_exited();
        assert!(actions.contains(&RideAction::DeactivateFirecracker));
        assert!(roller.tick(10.0).is_empty());
    }

    #[test]
    fn re_entering_restarts_the_fuse() {
        let mut roller = RideZone::with_firecracker(5.0);
        roller.player_entered();
        roller.tick(4.0);
        roller.player_entered();

        assert!(roller.tick(4.0).is_empty());
        assert_eq!(roller.tick(1.0), vec![RideAction::ActivateFirecracker]);
    }

    #[test]
    fn recoil_goes_back_and_returns_to_rest() {
        let rest = Vec3::new(0.0, 0.2, 0.0);
        let mut slider = RecoilSlider::new(rest, 0.1, 5.0);
        slider.kick();

        let halfway = slider.tick(0.1);
        assert!((halfway.y - 0.15).abs() < 1e-5);
        let back = slider.tick(0.1);
        assert!((back.y - 0.1).abs() < 1e-5);

        let mut position = back;
        while slider.is_recoiling() {
            position = slider.tick(0.05);
        }
        assert_eq!(position, rest);
        assert_eq!(slider.tick(0.05), rest);
    }

    #[test]
    fn kicking_mid_recoil_restarts_from_rest() {
        let rest = Vec3::ZERO;
        let mut slider = RecoilSlider::new(rest, 0.1, 5.0);
        slider.kick();
        slider.tick(0.3);
        slider.kick();
        let first = slider.tick(0.02);
        assert!((first.y + 0.01).abs() < 1e-5);
    }

    #[test]
    fn sphere_contact() {
        assert!(spheres_touch(Vec3::ZERO, 0.3, Vec3::new(0.3, 0.0, 0.0), 0.05));
        assert!(!spheres_touch(Vec3::ZERO, 0.3, Vec3::new(1.0, 0.0, 0.0), 0.05));
    }
}
