use bevy::prelude::*;

use pagemascot::{mascot::MascotPlugin, page::PagePlugin};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            MascotPlugin::default(),
            PagePlugin, // After MascotPlugin so the demo layout replaces the empty default
        ))
        .run();
}
