//! Read-only snapshot of the host page the character lives on.
//!
//! Coordinates are page coordinates: origin top-left, y grows downward.
use std::fmt;

use bevy::prelude::*;

/// Identifier of a hiding-spot anchor on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorId(u32);

impl AnchorId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor-{}", self.0)
    }
}

/// Page element the character can hide behind.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub id: AnchorId,
    pub rect: Rect,
}

impl Anchor {
    pub fn new(id: AnchorId, rect: Rect) -> Self {
        Self { id, rect }
    }
}

/// Identifier of a page tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TabId(String);

impl TabId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Resource, Debug, Clone)]
pub struct PageLayout {
    pub viewport: Vec2,
    pub anchors: Vec<Anchor>,
    pub summon_control: Option<Rect>,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            viewport: Vec2::new(1280.0, 720.0),
            anchors: Vec::new(),
            summon_control: None,
        }
    }
}

impl PageLayout {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    pub fn with_anchor(mut self, rect: Rect) -> Self {
        let id = AnchorId::new(self.anchors.len() as u32);
        self.anchors.push(Anchor::new(id, rect));
        self
    }

    pub fn with_summon_control(mut self, rect: Rect) -> Self {
        self.summon_control = Some(rect);
        self
    }

    /// Where the character rests while away from any errand.
    pub fn home(&self, sprite: Vec2) -> Vec2 {
        (self.viewport - sprite) / 2.0
    }

    /// Clamps a sprite's top-left corner so the whole sprite stays visible.
    pub fn clamp_on_screen(&self, position: Vec2, sprite: Vec2) -> Vec2 {
        let max = (self.viewport - sprite).max(Vec2::ZERO);
        position.clamp(Vec2::ZERO, max)
    }
}
