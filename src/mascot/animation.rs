//! Sprite animation catalog and the fixed-cadence frame clock.
use std::{fmt, str::FromStr, time::Duration};

use bevy::prelude::*;

use super::errors::MascotError;

const FRAME_STRIDE: i32 = 24;

const IDLE_FRAMES: [IVec2; 6] = sheet_row(0);
const WALK_FRAMES: [IVec2; 6] = sheet_row(-FRAME_STRIDE);
const RUN_FRAMES: [IVec2; 6] = sheet_row(-2 * FRAME_STRIDE);
const SIT_FRAMES: [IVec2; 2] = [IVec2::new(0, -120), IVec2::new(-FRAME_STRIDE, -120)];

const fn sheet_row(y: i32) -> [IVec2; 6] {
    [
        IVec2::new(0, y),
        IVec2::new(-FRAME_STRIDE, y),
        IVec2::new(-2 * FRAME_STRIDE, y),
        IVec2::new(-3 * FRAME_STRIDE, y),
        IVec2::new(-4 * FRAME_STRIDE, y),
        IVec2::new(-5 * FRAME_STRIDE, y),
    ]
}

/// Named sprite sequences available on the character's sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Animation {
    Idle,
    Walk,
    Run,
    Sit,
}

impl Animation {
    pub const ALL: [Animation; 4] = [Self::Idle, Self::Walk, Self::Run, Self::Sit];

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Walk => "WALK",
            Self::Run => "RUN",
            Self::Sit => "SIT",
        }
    }

    /// Sprite-sheet offsets, one per frame, in playback order.
    pub fn frames(self) -> &'static [IVec2] {
        match self {
            Self::Idle => &IDLE_FRAMES,
            Self::Walk => &WALK_FRAMES,
            Self::Run => &RUN_FRAMES,
            Self::Sit => &SIT_FRAMES,
        }
    }

    pub fn frame_count(self) -> usize {
        self.frames().len()
    }
}

impl fmt::Display for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Animation {
    type Err = MascotError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|animation| animation.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| MascotError::unknown_animation(trimmed))
    }
}

/// Cycles frames of the active animation at a fixed cadence, independent of
/// how often it is ticked.
#[derive(Debug, Clone)]
pub struct SpriteClock {
    animation: Option<Animation>,
    frame_index: usize,
    cadence: Timer,
    running: bool,
}

impl SpriteClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            animation: None,
            frame_index: 0,
            cadence: Timer::new(interval, TimerMode::Repeating),
            running: false,
        }
    }

    /// Switches to `animation`, restarting at its first frame with a fresh
    /// cadence. `None` stops the clock entirely.
    pub fn set_animation(&mut self, animation: Option<Animation>) {
        self.animation = animation;
        self.frame_index = 0;
        self.cadence.reset();
        self.running = animation.is_some();
    }

    /// Looks up `name` in the catalog and plays it. An unknown name leaves
    /// the current animation untouched.
    pub fn play(&mut self, name: &str) -> Result<Animation, MascotError> {
        let animation = name.parse::<Animation>()?;
        self.set_animation(Some(animation));
        Ok(animation)
    }

    /// Stops advancing but keeps the current animation and frame on screen.
    pub fn freeze(&mut self) {
        self.running = false;
    }

    /// Advances the frame index by however many cadence periods elapsed.
    /// Returns true when the visible frame changed.
    pub fn tick(&mut self, delta: Duration) -> bool {
        let Some(animation) = self.animation else {
            return false;
        };
        if !self.running {
            return false;
        }

        self.cadence.tick(delta);
        let steps = self.cadence.times_finished_this_tick() as usize;
        if steps == 0 {
            return false;
        }

        let previous = self.frame_index;
        self.frame_index = (self.frame_index + steps) % animation.frame_count();
        previous != self.frame_index
    }

    pub fn animation(&self) -> Option<Animation> {
        self.animation
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_offset(&self) -> Option<IVec2> {
        self.animation
            .and_then(|animation| animation.frames().get(self.frame_index).copied())
    }
}
