//! Mascot module: the behavior controller for the page character and the
//! plugin that drives it from Bevy's frame clock.
pub mod animation;
pub mod config;
pub mod dialogue;
pub mod errors;
pub mod events;
pub mod layout;
pub mod machine;
pub mod motion;
pub mod plugin;
pub mod snapshot;
pub mod state;
pub mod summon;
pub mod systems;
pub mod tabs;
pub mod timers;

pub use animation::Animation;
pub use config::MascotConfig;
pub use errors::MascotError;
pub use events::{
    CharacterClicked, DismissRequested, HostCommand, SummonKeywordEntered, TabChanged,
    ToggleClicked,
};
pub use layout::{PageLayout, TabId};
pub use machine::BehaviorMachine;
pub use plugin::MascotPlugin;
pub use snapshot::MascotSnapshot;
pub use summon::SummonDecision;
