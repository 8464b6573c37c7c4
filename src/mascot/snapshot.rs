//! Read-only view of the character handed to renderers each frame.
use bevy::prelude::*;

use super::{
    animation::Animation,
    dialogue::DialogueBubble,
    machine::BehaviorMachine,
    state::BehaviorFlags,
};

/// A dust puff as the renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DustSnapshot {
    pub position: Vec2,
    pub alpha: f32,
}

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct MascotSnapshot {
    pub behavior: &'static str,
    pub animation: Option<Animation>,
    pub frame_index: usize,
    /// Sprite-sheet offset of the current frame, if an animation is set.
    pub sheet_offset: Option<IVec2>,
    pub position: Vec2,
    pub sprite_size: Vec2,
    pub target: Option<Vec2>,
    pub visible: bool,
    pub z_lowered: bool,
    pub peek_offset: f32,
    pub bubble: Option<DialogueBubble>,
    pub dust: Vec<DustSnapshot>,
    pub flags: BehaviorFlags,
    pub toggle_visible: bool,
}

impl MascotSnapshot {
    pub fn capture(machine: &BehaviorMachine) -> Self {
        let state = machine.state();
        Self {
            behavior: state.behavior().label(),
            animation: state.animation(),
            frame_index: state.frame_index(),
            sheet_offset: state.sprite().current_offset(),
            position: state.position(),
            sprite_size: machine.config().sprite.size,
            target: state.target(),
            visible: state.is_visible(),
            z_lowered: state.z_lowered(),
            peek_offset: state.peek_offset(),
            bubble: state.bubble().cloned(),
            dust: state
                .dust()
                .iter()
                .map(|puff| DustSnapshot {
                    position: puff.position(),
                    alpha: puff.fade_alpha(),
                })
                .collect(),
            flags: state.flags(),
            toggle_visible: state.toggle_visible(),
        }
    }

    /// Top-left corner to draw the sprite at, including the peek lift.
    pub fn draw_position(&self) -> Vec2 {
        self.position - Vec2::new(0.0, self.peek_offset)
    }

    /// Whether a page-space point lands on the visible sprite.
    pub fn contains(&self, point: Vec2) -> bool {
        if !self.visible {
            return false;
        }
        let min = self.draw_position();
        Rect::from_corners(min, min + self.sprite_size).contains(point)
    }
}
