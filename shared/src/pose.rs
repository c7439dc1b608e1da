//! Tracked VR points and the movement check run while the doll is watching.
use bevy_math::{Quat, Vec3};

/// The three points followed for movement, in evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackedPoint {
    Head,
    LeftHand,
    RightHand,
}

impl TrackedPoint {
    pub const ALL: [TrackedPoint; 3] = [
        TrackedPoint::Head,
        TrackedPoint::LeftHand,
        TrackedPoint::RightHand,
    ];

    fn index(self) -> usize {
        match self {
            TrackedPoint::Head => 0,
            TrackedPoint::LeftHand => 1,
            TrackedPoint::RightHand => 2,
        }
    }
}

/// Position and orientation sample of one tracked point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl TrackedPose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

/// Source of the current pose samples. `None` means the point is not bound.
pub trait PoseProvider {
    fn pose(&self, point: TrackedPoint) -> Option<TrackedPose>;
}

/// A plain snapshot of all three points, usable as a provider.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PoseSample {
    pub head: Option<TrackedPose>,
    pub left_hand: Option<TrackedPose>,
    pub right_hand: Option<TrackedPose>,
}

impl PoseSample {
    pub fn set(&mut self, point: TrackedPoint, pose: Option<TrackedPose>) {
        match point {
            TrackedPoint::Head => self.head = pose,
            TrackedPoint::LeftHand => self.left_hand = pose,
            TrackedPoint::RightHand => self.right_hand = pose,
        }
    }
}

impl PoseProvider for PoseSample {
    fn pose(&self, point: TrackedPoint) -> Option<TrackedPose> {
        match point {
            TrackedPoint::Head => self.head,
            TrackedPoint::LeftHand => self.left_hand,
            TrackedPoint::RightHand => self.right_hand,
        }
    }
}

/// The movement that got a player eliminated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementViolation {
    pub point: TrackedPoint,
    pub position_delta: f32,
    /// Degrees
    pub rotation_delta: f32,
}

/// Remembers the last sample of every point and compares new ones against it.
#[derive(Clone, Debug, Default)]
pub struct MotionMonitor {
    last: [Option<TrackedPose>; 3],
}

impl MotionMonitor {
    /// Forgets the previous samples and records the current ones.
    pub fn snapshot(&mut self, provider: &impl PoseProvider) {
        for point in TrackedPoint::ALL {
            self.last[point.index()] = provider.pose(point);
        }
    }

    pub fn last(&self, point: TrackedPoint) -> Option<TrackedPose> {
        self.last[point.index()]
    }

    /// Checks head, left hand then right hand against the previous tick and
    /// stops at the first point that moved. Every evaluated point keeps its
    /// new sample; points after a violation are left untouched.
    pub fn detect(
        &mut self,
        provider: &impl PoseProvider,
        movement_sensitivity: f32,
        rotation_sensitivity: f32,
    ) -> Option<MovementViolation> {
        for point in TrackedPoint::ALL {
            let Some(current) = provider.pose(point) else {
                continue;
            };
            let previous = self.last[point.index()].replace(current);
            let Some(previous) = previous else {
                continue;
            };

            let position_delta = current.position.distance(previous.position);
            let rotation_delta = current.rotation.angle_between(previous.rotation).to_degrees();

            if position_delta > movement_sensitivity || rotation_delta > rotation_sensitivity {
                return Some(MovementViolation {
                    point,
                    position_delta,
                    rotation_delta,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still() -> PoseSample {
        PoseSample {
            head: Some(TrackedPose::at(Vec3::new(0.0, 1.7, 0.0))),
            left_hand: Some(TrackedPose::at(Vec3::new(-0.3, 1.2, 0.2))),
            right_hand: Some(TrackedPose::at(Vec3::new(0.3, 1.2, 0.2))),
        }
    }

    #[test]
    fn unchanged_poses_do_not_move() {
        let mut monitor = MotionMonitor::default();
        monitor.snapshot(&still());
        assert_eq!(monitor.detect(&still(), 0.01, 0.5), None);
    }

    #[test]
    fn small_jitter_under_thresholds_is_tolerated() {
        let mut monitor = MotionMonitor::default();
        monitor.snapshot(&still());

        let mut jitter = still();
        jitter.head = Some(TrackedPose::new(
            Vec3::new(0.005, 1.7, 0.0),
            Quat::from_rotation_y(0.2_f32.to_radians()),
        ));
        assert_eq!(monitor.detect(&jitter, 0.01, 0.5), None);
    }

    #[test]
    fn hand_translation_is_reported() {
        let mut monitor = MotionMonitor::default();
        monitor.snapshot(&still());

        let mut moved = still();
        moved.left_hand = Some(TrackedPose::at(Vec3::new(-0.3, 1.25, 0.2)));
        let violation = monitor.detect(&moved, 0.01, 0.5).unwrap();

        assert_eq!(violation.point, TrackedPoint::LeftHand);
        assert!((violation.position_delta - 0.05).abs() < 1e-4);
    }

    #[test]
    fn head_rotation_is_reported() {
        let mut monitor = MotionMonitor::default();
        monitor.snapshot(&still());

        let mut turned = still();
        turned.head = Some(TrackedPose::new(
            Vec3::new(0.0, 1.7, 0.0),
            Quat::from_rotation_y(5.0_f32.to_radians()),
        ));
        let violation = monitor.detect(&turned, 0.01, 0.5).unwrap();

        assert_eq!(violation.point, TrackedPoint::Head);
        assert!((violation.rotation_delta - 5.0).abs() < 0.01);
    }

    #[test]
    fn head_violation_short_circuits_the_hands() {
        let mut monitor = MotionMonitor::default();
        monitor.snapshot(&still());

        let mut everything = still();
        everything.head = Some(TrackedPose::at(Vec3::new(1.0, 1.7, 0.0)));
        everything.right_hand = Some(TrackedPose::at(Vec3::new(1.3, 1.2, 0.2)));
        let violation = monitor.detect(&everything, 0.01, 0.5).unwrap();

        assert_eq!(violation.point, TrackedPoint::Head);
        assert_eq!(monitor.last(TrackedPoint::Head), everything.head);
        // not evaluated, so still holding the old sample
        assert_eq!(monitor.last(TrackedPoint::RightHand), still().right_hand);
    }

    #[test]
    fn comparison_is_against_the_previous_tick() {
        let mut monitor = MotionMonitor::default();
        monitor.snapshot(&still());

        // Creep 8mm per tick: each step is under 1cm even though the total is not
        let mut pose = still();
        for step in 1..=5 {
            pose.head = Some(TrackedPose::at(Vec3::new(0.008 * step as f32, 1.7, 0.0)));
            assert_eq!(monitor.detect(&pose, 0.01, 0.5), None);
        }
    }

    #[test]
    fn untracked_points_are_skipped() {
        let mut monitor = MotionMonitor::default();
        let mut partial = still();
        partial.right_hand = None;
        monitor.snapshot(&partial);

        assert_eq!(monitor.detect(&PoseSample::default(), 0.01, 0.5), None);
        assert_eq!(monitor.detect(&partial, 0.01, 0.5), None);
    }

    #[test]
    fn newly_bound_point_records_without_eliminating() {
        let mut monitor = MotionMonitor::default();
        monitor.snapshot(&PoseSample::default());

        assert_eq!(monitor.detect(&still(), 0.01, 0.5), None);
        assert_eq!(monitor.last(TrackedPoint::Head), still().head);
    }
}
