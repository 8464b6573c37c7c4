//! Summon protocol: calling the character to the search control by keyword.
use bevy::prelude::*;

use super::{
    animation::Animation,
    events::HostCommand,
    layout::PageLayout,
    machine::{BehaviorMachine, InterruptMode},
    motion::{Arrival, Motion},
    state::Behavior,
    timers::TimerKey,
};

const CONTROL_GAP: f32 = 5.0;

/// Outcome of a summon request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummonDecision {
    Approved,
    /// Not on the primary tab and the toggle is off.
    RejectedToggleOff,
    /// The page has no summon control to run to.
    Unavailable,
}

/// Summons are always honoured on the primary tab; elsewhere only while the
/// toggle is enabled.
pub fn summon_allowed(on_primary_tab: bool, toggle_enabled: bool) -> bool {
    on_primary_tab || toggle_enabled
}

/// Resting point beside the summon control: to its left when there is room,
/// otherwise to its right, vertically centred on it.
pub fn summon_target(control: Rect, sprite: Vec2, layout: &PageLayout) -> Vec2 {
    let left = control.min.x - sprite.x - CONTROL_GAP;
    let x = if left >= 0.0 {
        left
    } else {
        control.max.x + CONTROL_GAP
    };
    let y = control.center().y - sprite.y / 2.0;
    layout.clamp_on_screen(Vec2::new(x, y), sprite)
}

impl BehaviorMachine {
    pub fn on_summon_keyword_entered(&mut self, layout: &PageLayout) -> SummonDecision {
        let Some(control) = layout.summon_control else {
            warn!("Mascot summon ignored: page has no summon control");
            return SummonDecision::Unavailable;
        };

        let on_primary = self.on_primary_tab();
        if !summon_allowed(on_primary, self.state.summon_enabled) {
            info!(
                "Mascot summon rejected on tab {}: toggle is off",
                self.state.active_tab
            );
            return SummonDecision::RejectedToggleOff;
        }

        if !on_primary {
            self.force_primary_tab();
        }
        self.set_summon_enabled(false);

        let was_away = !self.state.visible || matches!(self.state.behavior, Behavior::OffScreen);
        self.interrupt(InterruptMode::KeepVisible);

        let sprite = self.config.sprite.size;
        let target = summon_target(control, sprite, layout);
        self.state.visible = true;
        if was_away {
            let entry_x = self.edge_x(self.exit_side(layout), layout);
            self.state.position = Vec2::new(entry_x, target.y);
        }

        info!("Mascot summoned to ({:.0}, {:.0})", target.x, target.y);
        self.set_behavior(Behavior::RespondingToSummon);
        self.state.sprite.set_animation(Some(Animation::Run));
        self.state.motion.move_towards(Motion {
            target,
            speed: self.run_speed(),
            arrival: Arrival::ReachedSummonControl,
            dusty: false,
        });
        SummonDecision::Approved
    }

    /// Flips the summon toggle. Ignored while the toggle control is hidden.
    pub fn on_toggle_clicked(&mut self) {
        if !self.state.toggle_visible {
            debug!("Mascot toggle click ignored: control hidden");
            return;
        }
        let enabled = !self.state.summon_enabled;
        self.set_summon_enabled(enabled);
        info!(
            "Mascot summon toggle {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    pub(super) fn set_summon_enabled(&mut self, enabled: bool) {
        self.state.summon_enabled = enabled;
        self.outbox.push(HostCommand::ToggleLabel { enabled });
    }

    fn force_primary_tab(&mut self) {
        let primary = self.primary_tab.clone();
        info!("Mascot summon switches to tab {}", primary);
        self.state.active_tab = primary.clone();
        self.set_toggle_visible(false);
        self.outbox.push(HostCommand::SwitchTab(primary));
    }

    pub(super) fn arrive_at_summon_control(&mut self) {
        if !matches!(self.state.behavior, Behavior::RespondingToSummon) {
            return;
        }
        self.outbox.push(HostCommand::ClearSummonField);
        self.open_summon_window();
    }

    /// Opens (or restarts) the window during which a click keeps the
    /// summoned character around. Never armed while the character is away.
    pub(super) fn open_summon_window(&mut self) {
        if !self.state.visible || matches!(self.state.behavior, Behavior::OffScreen) {
            self.state.timers.cancel(TimerKey::SummonWindow);
            debug!("Mascot summon window not opened: character is away");
            return;
        }
        self.set_behavior(Behavior::SummonedInteraction);
        self.state.sprite.set_animation(Some(Animation::Idle));
        self.state
            .timers
            .schedule(TimerKey::SummonWindow, self.config.summon.window);
    }

    pub(super) fn summon_window_expired(&mut self, layout: &PageLayout) {
        match self.state.behavior {
            Behavior::Talking { .. } | Behavior::RespondingToSummon => {
                debug!("Mascot busy when summon window expired; restarting it");
                self.state
                    .timers
                    .schedule(TimerKey::SummonWindow, self.config.summon.window);
            }
            Behavior::SummonedInteraction => {
                info!("Mascot summon window expired with no interaction");
                self.run_off_screen(layout);
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
        layout::TabId,
        machine::tests::{bare_layout, fire, full_layout, machine, run_until, test_config},
        state::TalkOrigin,
    };

    #[test]
    fn approval_rule() {
        assert!(summon_allowed(true, false));
        assert!(summon_allowed(true, true));
        assert!(summon_allowed(false, true));
        assert!(!summon_allowed(false, false));
    }

    #[test]
    fn target_sits_beside_the_control() {
        let layout = full_layout();
        let control = layout.summon_control.expect("control present");
        let target = summon_target(control, Vec2::splat(24.0), &layout);
        assert_eq!(target, Vec2::new(571.0, 20.0));

        let hugging_left =
            summon_target(Rect::new(0.0, 100.0, 50.0, 124.0), Vec2::splat(24.0), &layout);
        assert_eq!(hugging_left, Vec2::new(55.0, 100.0));
    }

    #[test]
    fn summon_without_control_is_unavailable() {
        let layout = bare_layout();
        let mut machine = machine(test_config(), &layout);
        assert_eq!(
            machine.on_summon_keyword_entered(&layout),
            SummonDecision::Unavailable
        );
        assert_eq!(machine.state().behavior(), &Behavior::Idle);
    }

    #[test]
    fn rejected_on_secondary_tab_with_toggle_off() {
        let layout = full_layout();
        let mut machine = machine(test_config(), &layout);
        machine.on_tab_changed(TabId::new("notes"), &layout);
        let before = machine.state().behavior().clone();
        machine.drain_commands();

        assert_eq!(
            machine.on_summon_keyword_entered(&layout),
            SummonDecision::RejectedToggleOff
        );
        assert_eq!(machine.state().behavior(), &before);
        assert!(!machine.state().summon_enabled());
        assert_eq!(machine.state().active_tab(), &TabId::new("notes"));
        assert!(machine.drain_commands().is_empty());
    }

    #[test]
    fn toggle_on_secondary_tab_allows_summon() {
        let layout = full_layout();
        let mut machine = machine(test_config(), &layout);
        machine.on_tab_changed(TabId::new("notes"), &layout);
        machine.on_toggle_clicked();
        assert!(machine.state().summon_enabled());
        machine.drain_commands();

        assert_eq!(
            machine.on_summon_keyword_entered(&layout),
            SummonDecision::Approved
        );
        assert!(machine.on_primary_tab());
        assert!(!machine.state().summon_enabled());
        assert!(!machine.state().toggle_visible());
        let flags = machine.state().flags();
        assert!(flags.responding_to_summon);
        assert_eq!(machine.state().animation(), Some(Animation::Run));
        assert_eq!(
            machine.state().motion().current().map(|motion| motion.speed),
            Some(3.0)
        );

        let commands = machine.drain_commands();
        assert!(commands.contains(&HostCommand::SwitchTab(TabId::new("main"))));
        assert!(commands.contains(&HostCommand::ToggleLabel { enabled: false }));

        assert!(run_until(&mut machine, &layout, Duration::from_secs(20), |m| {
            matches!(m.state().behavior(), Behavior::SummonedInteraction)
        }));
        assert_eq!(machine.state().position(), Vec2::new(571.0, 20.0));
        assert_eq!(machine.state().animation(), Some(Animation::Idle));
        assert_eq!(
            machine.state().timers().remaining(TimerKey::SummonWindow),
            Some(Duration::from_secs(5))
        );
        assert!(machine
            .drain_commands()
            .contains(&HostCommand::ClearSummonField));
    }

    #[test]
    fn toggle_click_ignored_while_control_hidden() {
        let layout = full_layout();
        let mut machine = machine(test_config(), &layout);
        machine.on_toggle_clicked();
        assert!(!machine.state().summon_enabled());
        assert!(machine.drain_commands().is_empty());
    }

    #[test]
    fn unattended_window_sends_character_away() {
        let layout = full_layout();
        let mut machine = machine(test_config(), &layout);
        machine.on_summon_keyword_entered(&layout);
        assert!(run_until(&mut machine, &layout, Duration::from_secs(20), |m| {
            matches!(m.state().behavior(), Behavior::SummonedInteraction)
        }));

        fire(&mut machine, &layout, TimerKey::SummonWindow);
        assert_eq!(machine.state().behavior(), &Behavior::RunningOffScreen);
        let exit = machine.state().target().expect("exit target");
        assert_eq!(exit.x, 810.0);

        assert!(run_until(&mut machine, &layout, Duration::from_secs(20), |m| {
            m.state().flags().off_screen
        }));
        assert!(!machine.state().is_visible());
        assert_eq!(machine.state().animation(), None);
        assert!(!machine.state().motion().is_active());
    }

    #[test]
    fn conversation_keeps_summoned_character_around() {
        let layout = full_layout();
        let mut machine = machine(test_config(), &layout);
        machine.on_summon_keyword_entered(&layout);
        assert!(run_until(&mut machine, &layout, Duration::from_secs(20), |m| {
            matches!(m.state().behavior(), Behavior::SummonedInteraction)
        }));

        machine.on_character_clicked(&layout);
        assert!(matches!(
            machine.state().behavior(),
            Behavior::Talking {
                origin: TalkOrigin::SummonWindow,
                ..
            }
        ));
        assert!(!machine.state().timers().is_armed(TimerKey::SummonWindow));

        fire(&mut machine, &layout, TimerKey::DialogueClose);
        assert_eq!(machine.state().behavior(), &Behavior::SummonedInteraction);
        assert_eq!(
            machine.state().timers().remaining(TimerKey::SummonWindow),
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn summoned_from_off_screen_enters_from_the_control_side() {
        let layout = full_layout();
        let mut machine = machine(test_config(), &layout);
        machine.dismiss();

        assert_eq!(
            machine.on_summon_keyword_entered(&layout),
            SummonDecision::Approved
        );
        assert!(machine.state().is_visible());
        assert_eq!(machine.state().position(), Vec2::new(810.0, 20.0));
        assert!(machine.state().flags().is_consistent());
    }

    #[test]
    fn busy_character_restarts_the_window() {
        let layout = full_layout();
        let mut machine = machine(test_config(), &layout);
        machine.on_summon_keyword_entered(&layout);
        machine.summon_window_expired(&layout);

        assert_eq!(machine.state().behavior(), &Behavior::RespondingToSummon);
        assert!(machine.state().timers().is_armed(TimerKey::SummonWindow));
    }
}
