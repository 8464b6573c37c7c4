//! Dialogue bubble placement next to the character.
use bevy::prelude::*;

use super::config::DialogueConfig;

/// Which way the bubble's tail points toward the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubblePointer {
    /// Bubble sits above the character, tail pointing down.
    Down,
    /// Bubble sits below the character, tail pointing up.
    Up,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueBubble {
    pub text: String,
    /// Top-left corner of the bubble in page coordinates.
    pub origin: Vec2,
    pub pointer: BubblePointer,
}

impl DialogueBubble {
    /// Places a bubble beside the character: above when there is room,
    /// otherwise below, horizontally centred and clamped to the viewport.
    pub fn place(
        text: impl Into<String>,
        character: Vec2,
        sprite: Vec2,
        viewport: Vec2,
        config: &DialogueConfig,
    ) -> Self {
        let size = config.bubble_size;

        let above = character.y - config.gap - size.y;
        let (top, pointer) = if above >= config.margin {
            (above, BubblePointer::Down)
        } else {
            (character.y + sprite.y + config.gap, BubblePointer::Up)
        };

        let centred = character.x + sprite.x / 2.0 - size.x / 2.0;
        let max_left = (viewport.x - size.x - config.margin).max(config.margin);
        let left = centred.clamp(config.margin, max_left);

        Self {
            text: text.into(),
            origin: Vec2::new(left, top),
            pointer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mascot::config::MascotConfig;

    const SPRITE: Vec2 = Vec2::new(24.0, 24.0);
    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn prefers_above_the_character() {
        let config = MascotConfig::default();
        let bubble = DialogueBubble::place(
            "Hi",
            Vec2::new(300.0, 300.0),
            SPRITE,
            VIEWPORT,
            &config.dialogue,
        );

        assert_eq!(bubble.pointer, BubblePointer::Down);
        assert_eq!(bubble.origin, Vec2::new(222.0, 236.0));
    }

    #[test]
    fn falls_back_below_near_the_top_edge() {
        let config = MascotConfig::default();
        let bubble = DialogueBubble::place(
            "Hi",
            Vec2::new(300.0, 20.0),
            SPRITE,
            VIEWPORT,
            &config.dialogue,
        );

        assert_eq!(bubble.pointer, BubblePointer::Up);
        assert_eq!(bubble.origin.y, 52.0);
    }

    #[test]
    fn clamps_horizontally_to_the_viewport() {
        let config = MascotConfig::default();
        let left_edge =
            DialogueBubble::place("Hi", Vec2::new(0.0, 300.0), SPRITE, VIEWPORT, &config.dialogue);
        let right_edge = DialogueBubble::place(
            "Hi",
            Vec2::new(790.0, 300.0),
            SPRITE,
            VIEWPORT,
            &config.dialogue,
        );

        assert_eq!(left_edge.origin.x, 8.0);
        assert_eq!(right_edge.origin.x, 800.0 - 180.0 - 8.0);
    }
}
