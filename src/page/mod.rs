// src/page/mod.rs
//
// Demo page hosting the mascot: panels to hide behind, a search field with
// the bell toggle, and a second tab the character refuses to appear on.
//
// Input:
// - Left click on the character talks to it; on the bell flips the toggle
// - F1 / F2 switch between the primary tab and "notes"
// - F3 rings the bell, Escape sends the character away
// - Typing fills the search field; the summon keyword calls the character

pub mod components;
pub mod plugin;
pub mod systems;

pub use components::{demo_layout, PageState};
pub use plugin::PagePlugin;
