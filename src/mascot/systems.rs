//! Systems feeding host messages into the behavior machine and publishing
//! its output.
use bevy::prelude::*;

use super::{
    config::MascotConfig,
    events::{
        CharacterClicked, DismissRequested, HostCommand, SummonKeywordEntered, TabChanged,
        ToggleClicked,
    },
    layout::PageLayout,
    machine::BehaviorMachine,
    snapshot::MascotSnapshot,
};

/// Creates the behavior machine once the page layout is known.
pub fn setup_behavior_machine(
    mut commands: Commands,
    config: Res<MascotConfig>,
    layout: Res<PageLayout>,
) {
    for missing in BehaviorMachine::missing_collaborators(&layout) {
        warn!("{}", missing);
    }

    let machine = BehaviorMachine::new(config.clone(), &layout);
    info!(
        "Mascot ready at ({:.0}, {:.0}) on tab {} with {} hiding spots",
        machine.state().position().x,
        machine.state().position().y,
        machine.primary_tab(),
        layout.anchors.len()
    );
    commands.insert_resource(MascotSnapshot::capture(&machine));
    commands.insert_resource(machine);
}

/// Applies this frame's host messages. Tab changes go first so that a click
/// or summon in the same frame sees the new tab.
pub fn apply_mascot_inputs(
    mut machine: ResMut<BehaviorMachine>,
    layout: Res<PageLayout>,
    mut tabs: MessageReader<TabChanged>,
    mut toggles: MessageReader<ToggleClicked>,
    mut summons: MessageReader<SummonKeywordEntered>,
    mut clicks: MessageReader<CharacterClicked>,
    mut dismissals: MessageReader<DismissRequested>,
) {
    for event in tabs.read() {
        machine.on_tab_changed(event.tab.clone(), &layout);
    }
    for _ in toggles.read() {
        machine.on_toggle_clicked();
    }
    for _ in summons.read() {
        let decision = machine.on_summon_keyword_entered(&layout);
        debug!("Mascot summon decision: {:?}", decision);
    }
    for _ in clicks.read() {
        machine.on_character_clicked(&layout);
    }
    if dismissals.read().count() > 0 {
        machine.dismiss();
    }
}

pub fn advance_behavior_machine(
    mut machine: ResMut<BehaviorMachine>,
    layout: Res<PageLayout>,
    time: Res<Time>,
) {
    machine.update(time.delta(), &layout);
}

/// Forwards queued side effects to the host as [`HostCommand`] messages.
pub fn publish_host_commands(
    mut machine: ResMut<BehaviorMachine>,
    mut writer: MessageWriter<HostCommand>,
) {
    for command in machine.drain_commands() {
        debug!("Mascot host command: {:?}", command);
        writer.write(command);
    }
}

pub fn refresh_mascot_snapshot(
    machine: Res<BehaviorMachine>,
    mut snapshot: ResMut<MascotSnapshot>,
) {
    let next = MascotSnapshot::capture(&machine);
    if *snapshot != next {
        *snapshot = next;
    }
}
