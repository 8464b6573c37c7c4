//! Character state record owned by the behavior machine.
use std::time::Duration;

use bevy::prelude::*;

use super::{
    animation::{Animation, SpriteClock},
    dialogue::DialogueBubble,
    layout::{AnchorId, TabId},
    motion::{DustPuff, MotionPlanner},
    timers::TimerRegistry,
};

/// Progress of the peek sequence while settled behind an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HidePhase {
    Resting,
    Peeking,
    Returning,
}

/// Where a conversation was started from, which decides what follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TalkOrigin {
    Settled,
    SummonWindow,
}

/// The single top-level activity of the character.
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Idle,
    Walking,
    Hiding {
        spot: AnchorId,
    },
    Hidden {
        spot: AnchorId,
        phase: HidePhase,
    },
    Talking {
        bubble: DialogueBubble,
        resume: Animation,
        origin: TalkOrigin,
    },
    RespondingToSummon,
    SummonedInteraction,
    RunningOffScreen,
    OffScreen,
}

impl Behavior {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walking => "walking",
            Self::Hiding { .. } => "hiding",
            Self::Hidden { .. } => "hidden",
            Self::Talking { .. } => "talking",
            Self::RespondingToSummon => "responding-to-summon",
            Self::SummonedInteraction => "summoned-interaction",
            Self::RunningOffScreen => "running-off-screen",
            Self::OffScreen => "off-screen",
        }
    }

    pub fn hiding_spot(&self) -> Option<AnchorId> {
        match self {
            Self::Hiding { spot } | Self::Hidden { spot, .. } => Some(*spot),
            _ => None,
        }
    }

    /// Settled states accept a click to start talking.
    pub fn accepts_conversation(&self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Hidden { .. } | Self::SummonedInteraction | Self::Talking { .. }
        )
    }
}

/// Flattened boolean view of [`Behavior`] for renderers and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BehaviorFlags {
    pub moving: bool,
    pub hiding: bool,
    pub hidden: bool,
    pub talking: bool,
    pub responding_to_summon: bool,
    pub off_screen: bool,
    pub summon_enabled: bool,
}

impl BehaviorFlags {
    /// At most one exclusive activity, and `hidden` only while hiding.
    pub fn is_consistent(&self) -> bool {
        let exclusive = [
            self.moving,
            self.hiding,
            self.talking,
            self.responding_to_summon,
        ]
        .into_iter()
        .filter(|flag| *flag)
        .count();
        exclusive <= 1 && (!self.hidden || self.hiding)
    }
}

#[derive(Debug, Clone)]
pub struct CharacterState {
    pub(super) behavior: Behavior,
    pub(super) position: Vec2,
    pub(super) sprite: SpriteClock,
    pub(super) motion: MotionPlanner,
    pub(super) timers: TimerRegistry,
    pub(super) active_tab: TabId,
    pub(super) summon_enabled: bool,
    pub(super) toggle_visible: bool,
    pub(super) visible: bool,
    pub(super) z_lowered: bool,
    pub(super) peek_offset: f32,
    pub(super) last_was_hidden: bool,
    pub(super) dust: Vec<DustPuff>,
}

impl CharacterState {
    pub(super) fn new(
        position: Vec2,
        frame_interval: Duration,
        arrival_factor: f32,
        active_tab: TabId,
    ) -> Self {
        let mut sprite = SpriteClock::new(frame_interval);
        sprite.set_animation(Some(Animation::Idle));
        Self {
            behavior: Behavior::Idle,
            position,
            sprite,
            motion: MotionPlanner::new(arrival_factor),
            timers: TimerRegistry::default(),
            active_tab,
            summon_enabled: false,
            toggle_visible: false,
            visible: true,
            z_lowered: false,
            peek_offset: 0.0,
            last_was_hidden: false,
            dust: Vec::new(),
        }
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn target(&self) -> Option<Vec2> {
        self.motion.target()
    }

    pub fn animation(&self) -> Option<Animation> {
        self.sprite.animation()
    }

    pub fn frame_index(&self) -> usize {
        self.sprite.frame_index()
    }

    pub fn sprite(&self) -> &SpriteClock {
        &self.sprite
    }

    pub fn motion(&self) -> &MotionPlanner {
        &self.motion
    }

    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }

    pub fn active_tab(&self) -> &TabId {
        &self.active_tab
    }

    pub fn summon_enabled(&self) -> bool {
        self.summon_enabled
    }

    pub fn toggle_visible(&self) -> bool {
        self.toggle_visible
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn z_lowered(&self) -> bool {
        self.z_lowered
    }

    /// Upward translation applied while peeking, in pixels.
    pub fn peek_offset(&self) -> f32 {
        self.peek_offset
    }

    pub fn dust(&self) -> &[DustPuff] {
        &self.dust
    }

    pub fn bubble(&self) -> Option<&DialogueBubble> {
        match &self.behavior {
            Behavior::Talking { bubble, .. } => Some(bubble),
            _ => None,
        }
    }

    pub fn hiding_spot(&self) -> Option<AnchorId> {
        self.behavior.hiding_spot()
    }

    pub fn flags(&self) -> BehaviorFlags {
        BehaviorFlags {
            moving: matches!(
                self.behavior,
                Behavior::Walking | Behavior::RunningOffScreen
            ),
            hiding: matches!(
                self.behavior,
                Behavior::Hiding { .. } | Behavior::Hidden { .. }
            ),
            hidden: matches!(self.behavior, Behavior::Hidden { .. }),
            talking: matches!(self.behavior, Behavior::Talking { .. }),
            responding_to_summon: matches!(self.behavior, Behavior::RespondingToSummon),
            off_screen: matches!(self.behavior, Behavior::OffScreen),
            summon_enabled: self.summon_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mascot::dialogue::BubblePointer;

    fn state() -> CharacterState {
        CharacterState::new(
            Vec2::new(100.0, 100.0),
            Duration::from_millis(150),
            1.1,
            TabId::new("main"),
        )
    }

    #[test]
    fn starts_idle_and_visible() {
        let state = state();
        assert_eq!(state.behavior(), &Behavior::Idle);
        assert_eq!(state.animation(), Some(Animation::Idle));
        assert!(state.is_visible());
        assert!(state.timers().is_empty());
        assert!(state.flags().is_consistent());
    }

    #[test]
    fn flags_follow_behavior() {
        let mut state = state();
        let spot = AnchorId::new(3);

        state.behavior = Behavior::Hidden {
            spot,
            phase: HidePhase::Peeking,
        };
        let flags = state.flags();
        assert!(flags.hiding && flags.hidden && !flags.moving);
        assert_eq!(state.hiding_spot(), Some(spot));

        state.behavior = Behavior::Talking {
            bubble: DialogueBubble {
                text: "Hi".into(),
                origin: Vec2::ZERO,
                pointer: BubblePointer::Down,
            },
            resume: Animation::Idle,
            origin: TalkOrigin::Settled,
        };
        assert!(state.flags().talking);
        assert!(state.bubble().is_some());
        assert_eq!(state.hiding_spot(), None);
    }

    #[test]
    fn inconsistent_flags_are_detected() {
        let flags = BehaviorFlags {
            moving: true,
            talking: true,
            ..Default::default()
        };
        assert!(!flags.is_consistent());

        let orphan_hidden = BehaviorFlags {
            hidden: true,
            ..Default::default()
        };
        assert!(!orphan_hidden.is_consistent());
    }
}
