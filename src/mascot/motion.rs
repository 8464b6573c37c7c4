//! Per-tick motion toward a target point, plus cosmetic dust puffs.
use std::time::Duration;

use bevy::prelude::*;

use super::layout::AnchorId;

/// What the behavior machine should do once the active motion arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    Walked,
    ReachedHidingSpot(AnchorId),
    ReachedSummonControl,
    LeftScreen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub target: Vec2,
    pub speed: f32,
    pub arrival: Arrival,
    /// Ordinary strolls kick up dust; errands and exits don't.
    pub dusty: bool,
}

/// Result of advancing the planner by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionStep {
    Stationary,
    Moving { dusty: bool },
    Arrived(Arrival),
}

/// Owns the single in-flight motion. Starting a new motion drops the old
/// one, so two movement loops can never run at once.
#[derive(Debug, Clone)]
pub struct MotionPlanner {
    current: Option<Motion>,
    arrival_factor: f32,
}

impl MotionPlanner {
    pub fn new(arrival_factor: f32) -> Self {
        Self {
            current: None,
            arrival_factor,
        }
    }

    pub fn move_towards(&mut self, motion: Motion) {
        if let Some(previous) = self.current.replace(motion) {
            debug!(
                "Motion toward ({:.0}, {:.0}) superseded by ({:.0}, {:.0})",
                previous.target.x, previous.target.y, motion.target.x, motion.target.y
            );
        }
    }

    /// Drops the in-flight motion without snapping and without reporting
    /// its arrival. Returns the cancelled motion, if any.
    pub fn cancel(&mut self) -> Option<Motion> {
        self.current.take()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Motion> {
        self.current.as_ref()
    }

    pub fn target(&self) -> Option<Vec2> {
        self.current.map(|motion| motion.target)
    }

    /// Moves `position` one step toward the target. Each axis advances by at
    /// most `speed` and never past the target; once both axes are within
    /// `speed * arrival_factor` the position snaps to the target and the
    /// arrival is reported exactly once.
    pub fn step(&mut self, position: &mut Vec2) -> MotionStep {
        let Some(motion) = self.current else {
            return MotionStep::Stationary;
        };

        let delta = motion.target - *position;
        position.x += axis_step(delta.x, motion.speed);
        position.y += axis_step(delta.y, motion.speed);

        let remaining = motion.target - *position;
        let threshold = motion.speed * self.arrival_factor;
        if remaining.x.abs() < threshold && remaining.y.abs() < threshold {
            *position = motion.target;
            self.current = None;
            return MotionStep::Arrived(motion.arrival);
        }

        MotionStep::Moving {
            dusty: motion.dusty,
        }
    }
}

fn axis_step(delta: f32, speed: f32) -> f32 {
    if delta == 0.0 {
        0.0
    } else {
        delta.signum() * speed.min(delta.abs())
    }
}

/// Short-lived particle left at the character's feet while strolling.
#[derive(Debug, Clone)]
pub struct DustPuff {
    position: Vec2,
    lifetime: Timer,
}

impl DustPuff {
    pub fn new(position: Vec2, lifetime: Duration) -> Self {
        Self {
            position,
            lifetime: Timer::new(lifetime, TimerMode::Once),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn tick(&mut self, delta: Duration) {
        self.lifetime.tick(delta);
    }

    pub fn is_finished(&self) -> bool {
        self.lifetime.is_finished()
    }

    /// 1.0 when fresh, falling to 0.0 as the puff expires.
    pub fn fade_alpha(&self) -> f32 {
        1.0 - self.lifetime.fraction()
    }
}
