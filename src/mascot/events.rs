//! Messages exchanged between the mascot controller and the host page.
use bevy::prelude::Message;

use super::layout::TabId;

/// The host switched to another tab.
#[derive(Message, Debug, Clone)]
pub struct TabChanged {
    pub tab: TabId,
}

/// The summon toggle ("bell") was clicked.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ToggleClicked;

/// The search field now holds exactly the summon keyword.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct SummonKeywordEntered;

/// The pointer clicked the character sprite.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct CharacterClicked;

/// The host asked for the character to leave right away.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct DismissRequested;

/// Side effects the controller asks the host page to perform.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    SwitchTab(TabId),
    ClearSummonField,
    ShowToggle(bool),
    ToggleLabel { enabled: bool },
}
