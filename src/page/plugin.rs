// src/page/plugin.rs
//
// Plugin registration for the demo page.

use bevy::prelude::*;

use crate::mascot::systems::{apply_mascot_inputs, refresh_mascot_snapshot};

use super::components::demo_layout;
use super::systems::{
    apply_host_commands, draw_bubble, draw_character, draw_dust, draw_labels,
    read_keyboard_input, read_pointer_input, spawn_page, sync_viewport,
};

/// Plugin providing a minimal 2D page for the mascot to live on.
///
/// # System Ordering
///
/// 1. `sync_viewport`, `read_keyboard_input`, `read_pointer_input` - before the
///    mascot reads its messages
/// 2. `apply_host_commands` and the `draw_*` systems - after the mascot
///    snapshot is refreshed
///
/// # Dependencies
///
/// - `MascotPlugin` must be registered (provides messages, config and snapshot)
pub struct PagePlugin;

impl Plugin for PagePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(demo_layout())
            .add_systems(Startup, spawn_page)
            .add_systems(
                Update,
                (sync_viewport, read_keyboard_input, read_pointer_input)
                    .before(apply_mascot_inputs),
            )
            .add_systems(
                Update,
                (
                    apply_host_commands,
                    draw_character,
                    draw_dust,
                    draw_bubble,
                    draw_labels,
                )
                    .after(refresh_mascot_snapshot),
            );

        info!("PagePlugin registered");
    }
}
