//! Tab gate: keeps the character on the primary tab only.
use bevy::prelude::*;

use super::{
    events::HostCommand,
    layout::{PageLayout, TabId},
    machine::{BehaviorMachine, InterruptMode},
    state::Behavior,
    timers::TimerKey,
};

impl BehaviorMachine {
    /// The host switched tabs. Resets the summon toggle, shows or hides the
    /// toggle control, and sends the character away from secondary tabs.
    pub fn on_tab_changed(&mut self, tab: TabId, layout: &PageLayout) {
        if tab == self.state.active_tab {
            return;
        }
        info!("Mascot tab change: {} -> {}", self.state.active_tab, tab);
        self.state.active_tab = tab;
        self.set_summon_enabled(false);

        if self.on_primary_tab() {
            self.set_toggle_visible(false);
        } else {
            self.set_toggle_visible(true);
            if self.stays_put_on_tab_change() {
                debug!(
                    "Mascot stays while {} on tab {}",
                    self.state.behavior.label(),
                    self.state.active_tab
                );
            } else {
                self.run_off_screen(layout);
            }
        }

        self.state
            .timers
            .schedule(TimerKey::TabSettle, self.config.tabs.settle);
    }

    pub(super) fn set_toggle_visible(&mut self, visible: bool) {
        self.state.toggle_visible = visible;
        self.outbox.push(HostCommand::ShowToggle(visible));
    }

    fn stays_put_on_tab_change(&self) -> bool {
        matches!(
            self.state.behavior,
            Behavior::Talking { .. }
                | Behavior::RespondingToSummon
                | Behavior::Hidden { .. }
                | Behavior::OffScreen
                | Behavior::RunningOffScreen
        )
    }

    /// Runs once layout has settled after a tab change; brings the character
    /// back when the primary tab is showing again.
    pub(super) fn settle_after_tab_change(&mut self, layout: &PageLayout) {
        if !self.on_primary_tab() {
            return;
        }

        match self.state.behavior {
            Behavior::OffScreen => {
                self.state.visible = true;
                self.state.position = layout.home(self.config.sprite.size);
                info!("Mascot returns on tab {}", self.state.active_tab);
                self.enter_idle();
            }
            Behavior::RunningOffScreen => {
                self.interrupt(InterruptMode::KeepVisible);
                self.enter_idle();
            }
            Behavior::Idle if !self.state.timers.is_armed(TimerKey::NextAction) => {
                self.schedule_next_action();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::mascot::{
        animation::Animation,
        machine::tests::{bare_layout, fire, full_layout, machine, run_until, test_config, FRAME},
        motion::{Arrival, Motion},
    };

    fn notes() -> TabId {
        TabId::new("notes")
    }

    #[test]
    fn leaving_mid_walk_cancels_motion_and_runs_off() {
        let layout = bare_layout();
        let mut machine = machine(test_config(), &layout);
        machine.state.timers.cancel_all();
        machine.set_behavior(Behavior::Walking);
        machine.state.sprite.set_animation(Some(Animation::Walk));
        machine.state.motion.move_towards(Motion {
            target: Vec2::new(500.0, 300.0),
            speed: 2.0,
            arrival: Arrival::Walked,
            dusty: false,
        });
        for _ in 0..3 {
            machine.update(FRAME, &layout);
        }
        let mid_flight = machine.state().position();
        assert_eq!(mid_flight, Vec2::new(394.0, 294.0));

        machine.on_tab_changed(TabId::new("other"), &layout);
        assert_eq!(machine.state().behavior(), &Behavior::RunningOffScreen);
        assert_eq!(machine.state().animation(), Some(Animation::Run));
        assert_eq!(machine.state().target(), Some(Vec2::new(810.0, 294.0)));

        assert!(run_until(&mut machine, &layout, Duration::from_secs(10), |m| {
            assert_ne!(m.state().position(), Vec2::new(500.0, 300.0));
            m.state().flags().off_screen
        }));
        assert!(!machine.state().is_visible());
        assert_eq!(machine.state().animation(), None);
    }

    #[test]
    fn tab_change_resets_toggle_and_shows_control() {
        let layout = full_layout();
        let mut machine = machine(test_config(), &layout);

        machine.on_tab_changed(notes(), &layout);
        assert!(machine.state().toggle_visible());
        assert!(!machine.state().summon_enabled());
        let commands = machine.drain_commands();
        assert!(commands.contains(&HostCommand::ShowToggle(true)));
        assert!(commands.contains(&HostCommand::ToggleLabel { enabled: false }));

        machine.on_toggle_clicked();
        assert!(machine.state().summon_enabled());

        machine.on_tab_changed(TabId::new("archive"), &layout);
        assert!(!machine.state().summon_enabled());

        machine.on_toggle_clicked();
        machine.on_tab_changed(TabId::new("main"), &layout);
        assert!(!machine.state().summon_enabled());
        assert!(!machine.state().toggle_visible());
        assert!(machine
            .drain_commands()
            .contains(&HostCommand::ShowToggle(false)));
    }

    #[test]
    fn same_tab_is_ignored() {
        let layout = full_layout();
        let mut machine = machine(test_config(), &layout);
        machine.on_tab_changed(TabId::new("main"), &layout);
        assert!(machine.drain_commands().is_empty());
        assert!(!machine.state().timers().is_armed(TimerKey::TabSettle));
        assert_eq!(machine.state().behavior(), &Behavior::Idle);
    }

    #[test]
    fn hidden_character_stays_put_then_leaves_later() {
        let layout = full_layout();
        let mut machine = machine(test_config().with_hide_chance(1.0), &layout);
        fire(&mut machine, &layout, TimerKey::NextAction);
        assert!(run_until(&mut machine, &layout, Duration::from_secs(10), |m| {
            m.state().flags().hidden
        }));

        machine.on_tab_changed(notes(), &layout);
        assert!(machine.state().flags().hidden);
        assert!(machine.state().timers().is_armed(TimerKey::PeekStart));

        assert!(run_until(&mut machine, &layout, Duration::from_secs(30), |m| {
            matches!(m.state().behavior(), Behavior::RunningOffScreen)
        }));
    }

    #[test]
    fn returning_to_primary_brings_character_home() {
        let layout = bare_layout();
        let mut machine = machine(test_config(), &layout);
        machine.on_tab_changed(notes(), &layout);
        assert!(run_until(&mut machine, &layout, Duration::from_secs(10), |m| {
            m.state().flags().off_screen
        }));

        machine.on_tab_changed(TabId::new("main"), &layout);
        assert!(!machine.state().is_visible());
        fire(&mut machine, &layout, TimerKey::TabSettle);

        assert!(machine.state().is_visible());
        assert_eq!(machine.state().behavior(), &Behavior::Idle);
        assert_eq!(machine.state().position(), Vec2::new(388.0, 288.0));
        assert_eq!(machine.state().animation(), Some(Animation::Idle));
        assert!(machine.state().timers().is_armed(TimerKey::NextAction));
    }

    #[test]
    fn quick_return_stops_the_exit_run() {
        let layout = bare_layout();
        let mut machine = machine(test_config(), &layout);
        machine.on_tab_changed(notes(), &layout);
        machine.on_tab_changed(TabId::new("main"), &layout);
        assert_eq!(machine.state().behavior(), &Behavior::RunningOffScreen);

        fire(&mut machine, &layout, TimerKey::TabSettle);
        assert_eq!(machine.state().behavior(), &Behavior::Idle);
        assert!(machine.state().is_visible());
        assert!(!machine.state().motion().is_active());
        assert!(machine.state().timers().is_armed(TimerKey::NextAction));
    }

    #[test]
    fn autonomous_action_on_secondary_tab_leaves_screen() {
        let layout = full_layout();
        let mut machine = machine(test_config(), &layout);
        machine.state.active_tab = notes();
        fire(&mut machine, &layout, TimerKey::NextAction);
        assert_eq!(machine.state().behavior(), &Behavior::RunningOffScreen);
    }
}
