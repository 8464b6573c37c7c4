// src/page/components.rs
//
// Components and resources for the demo page hosting the mascot.

use bevy::prelude::*;

use crate::mascot::{HostCommand, PageLayout, TabId};

/// Tab the F2 key switches to.
pub const SECONDARY_TAB: &str = "notes";

/// Search field the summon keyword is typed into (page coordinates).
pub const SEARCH_FIELD: Rect = Rect {
    min: Vec2::new(920.0, 24.0),
    max: Vec2::new(1180.0, 52.0),
};

/// The bell button beside the search field.
pub const TOGGLE_BUTTON: Rect = Rect {
    min: Vec2::new(1190.0, 24.0),
    max: Vec2::new(1256.0, 52.0),
};

const MAX_SEARCH_CHARS: usize = 32;

/// Marker for the character sprite.
#[derive(Component, Debug)]
pub struct CharacterSprite;

/// Marker for dust puff sprites, respawned every frame.
#[derive(Component, Debug)]
pub struct DustSprite;

/// Marker for the dialogue bubble UI node.
#[derive(Component, Debug)]
pub struct BubbleNode;

/// Text labels the page keeps in sync with [`PageState`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLabel {
    Tab,
    Search,
    Toggle,
}

/// Host-side page state: what the page chrome currently shows.
#[derive(Resource, Debug, Clone)]
pub struct PageState {
    pub tab: TabId,
    search: String,
    pub toggle_visible: bool,
    pub toggle_enabled: bool,
}

impl PageState {
    pub fn new(tab: TabId) -> Self {
        Self {
            tab,
            search: String::new(),
            toggle_visible: false,
            toggle_enabled: false,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Appends typed text, dropping control characters and anything past
    /// the field's capacity.
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            if self.search.chars().count() >= MAX_SEARCH_CHARS {
                break;
            }
            self.search.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        self.search.pop();
    }

    /// Mirrors a controller side effect in the page chrome.
    pub fn apply(&mut self, command: &HostCommand) {
        match command {
            HostCommand::SwitchTab(tab) => self.tab = tab.clone(),
            HostCommand::ClearSummonField => self.search.clear(),
            HostCommand::ShowToggle(visible) => self.toggle_visible = *visible,
            HostCommand::ToggleLabel { enabled } => self.toggle_enabled = *enabled,
        }
    }
}

/// The demo page: three panels to hide behind and a search field.
pub fn demo_layout() -> PageLayout {
    PageLayout::default()
        .with_anchor(Rect::new(120.0, 200.0, 460.0, 280.0))
        .with_anchor(Rect::new(700.0, 360.0, 1040.0, 440.0))
        .with_anchor(Rect::new(260.0, 540.0, 640.0, 620.0))
        .with_summon_control(SEARCH_FIELD)
}

/// Converts a page-space rectangle (top-left origin, y down) into the
/// centre translation of a 2D sprite under a default `Camera2d`.
pub fn page_to_world(top_left: Vec2, size: Vec2, viewport: Vec2, z: f32) -> Vec3 {
    let centre = top_left + size / 2.0;
    Vec3::new(centre.x - viewport.x / 2.0, viewport.y / 2.0 - centre.y, z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_respects_capacity_and_control_chars() {
        let mut page = PageState::new(TabId::new("main"));
        page.type_text("co\u{8}me");
        assert_eq!(page.search(), "come");

        page.type_text(&"x".repeat(64));
        assert_eq!(page.search().chars().count(), MAX_SEARCH_CHARS);

        page.backspace();
        assert_eq!(page.search().chars().count(), MAX_SEARCH_CHARS - 1);
    }

    #[test]
    fn host_commands_update_chrome() {
        let mut page = PageState::new(TabId::new(SECONDARY_TAB));
        page.type_text("come");

        page.apply(&HostCommand::SwitchTab(TabId::new("main")));
        page.apply(&HostCommand::ClearSummonField);
        page.apply(&HostCommand::ShowToggle(true));
        page.apply(&HostCommand::ToggleLabel { enabled: true });

        assert_eq!(page.tab, TabId::new("main"));
        assert!(page.search().is_empty());
        assert!(page.toggle_visible && page.toggle_enabled);
    }

    #[test]
    fn page_coordinates_map_to_centred_world_space() {
        let viewport = Vec2::new(800.0, 600.0);
        let world = page_to_world(Vec2::ZERO, Vec2::new(100.0, 50.0), viewport, 1.0);
        assert_eq!(world, Vec3::new(-350.0, 275.0, 1.0));

        let centre = page_to_world(Vec2::new(388.0, 288.0), Vec2::splat(24.0), viewport, 0.0);
        assert_eq!(centre, Vec3::ZERO);
    }

    #[test]
    fn demo_layout_has_every_collaborator() {
        let layout = demo_layout();
        assert_eq!(layout.anchors.len(), 3);
        assert_eq!(layout.summon_control, Some(SEARCH_FIELD));
    }
}
