//! MascotPlugin wires the behavior machine into the frame loop.
use bevy::prelude::*;
#[cfg(feature = "mascot_debug")]
use bevy::time::TimerMode;

use super::{
    config::MascotConfig,
    events::{
        CharacterClicked, DismissRequested, HostCommand, SummonKeywordEntered, TabChanged,
        ToggleClicked,
    },
    layout::PageLayout,
    snapshot::MascotSnapshot,
    systems::{
        advance_behavior_machine, apply_mascot_inputs, publish_host_commands,
        refresh_mascot_snapshot, setup_behavior_machine,
    },
};
#[cfg(feature = "mascot_debug")]
use super::machine::BehaviorMachine;

#[cfg(feature = "mascot_debug")]
#[derive(Resource)]
struct DebugStateTimer {
    timer: Timer,
}

#[cfg(feature = "mascot_debug")]
impl Default for DebugStateTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(1.0, TimerMode::Repeating),
        }
    }
}

/// Registers the mascot controller, its messages and its per-frame systems.
///
/// # System Ordering
///
/// 1. `apply_mascot_inputs` - host messages into the machine
/// 2. `advance_behavior_machine` - timers, motion, sprite clock
/// 3. `publish_host_commands` - outbox to [`HostCommand`] messages
/// 4. `refresh_mascot_snapshot` - render view for the host
///
/// Insert a [`PageLayout`] before startup; an empty default layout is used
/// otherwise, which disables hiding and summoning.
#[derive(Debug, Clone)]
pub struct MascotPlugin {
    config: MascotConfig,
}

impl MascotPlugin {
    pub fn with_config(config: MascotConfig) -> Self {
        Self { config }
    }
}

impl Default for MascotPlugin {
    /// Reads `config/mascot.toml`, falling back to built-in defaults.
    fn default() -> Self {
        Self::with_config(MascotConfig::load_or_default())
    }
}

impl Plugin for MascotPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PageLayout>()
            .insert_resource(self.config.clone())
            .init_resource::<MascotSnapshot>()
            .add_message::<TabChanged>()
            .add_message::<ToggleClicked>()
            .add_message::<SummonKeywordEntered>()
            .add_message::<CharacterClicked>()
            .add_message::<DismissRequested>()
            .add_message::<HostCommand>()
            .add_systems(Startup, (setup_behavior_machine, log_mascot_config))
            .add_systems(
                Update,
                (
                    apply_mascot_inputs,
                    advance_behavior_machine,
                    publish_host_commands,
                    refresh_mascot_snapshot,
                )
                    .chain(),
            );

        #[cfg(feature = "mascot_debug")]
        {
            app.insert_resource(DebugStateTimer::default())
                .add_systems(Update, log_mascot_state.after(advance_behavior_machine));
        }

        info!("MascotPlugin registered");
    }
}

fn log_mascot_config(config: Res<MascotConfig>) {
    info!(
        "Mascot config: sprite {}x{}, walk {:.1} px/tick, run {:.1} px/tick, idle {:?}..{:?}, summon keyword \"{}\" on tab {}",
        config.sprite.size.x,
        config.sprite.size.y,
        config.motion.base_speed,
        config.run_speed(),
        config.idle.delay.min(),
        config.idle.delay.max(),
        config.summon.keyword,
        config.summon.primary_tab
    );
}

#[cfg(feature = "mascot_debug")]
fn log_mascot_state(
    mut timer: ResMut<DebugStateTimer>,
    time: Res<Time>,
    machine: Res<BehaviorMachine>,
) {
    if timer.timer.tick(time.delta()).just_finished() {
        let state = machine.state();
        info!(
            target: "mascot_debug",
            "Mascot {} at ({:.0}, {:.0}) | anim: {:?} | timers: {:?}",
            state.behavior().label(),
            state.position().x,
            state.position().y,
            state.animation(),
            state.timers().keys().collect::<Vec<_>>(),
        );
    }
}
