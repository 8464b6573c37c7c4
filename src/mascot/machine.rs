//! Behavior state machine: the only writer of [`CharacterState`].
//!
//! Every external trigger funnels through [`BehaviorMachine::interrupt`]
//! before a new behavior is armed, so stale timers and motion loops never
//! survive a transition.
use std::time::Duration;

use bevy::prelude::*;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use super::{
    animation::Animation,
    config::{DelayRange, MascotConfig},
    dialogue::DialogueBubble,
    errors::{Collaborator, MascotError},
    events::HostCommand,
    layout::{AnchorId, PageLayout, TabId},
    motion::{Arrival, DustPuff, Motion, MotionStep},
    state::{Behavior, CharacterState, HidePhase, TalkOrigin},
    timers::TimerKey,
};

const EXIT_MARGIN: f32 = 10.0;

/// Whether the interrupt protocol also removes the character from view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptMode {
    KeepVisible,
    MakeInvisible,
}

/// Horizontal edge the character leaves (or re-enters) through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitSide {
    Left,
    Right,
}

#[derive(Resource)]
pub struct BehaviorMachine {
    pub(super) config: MascotConfig,
    pub(super) primary_tab: TabId,
    pub(super) state: CharacterState,
    pub(super) rng: StdRng,
    pub(super) outbox: Vec<HostCommand>,
}

impl BehaviorMachine {
    /// Creates the character at the page's home point, idle, with the first
    /// autonomous action already scheduled.
    pub fn new(config: MascotConfig, layout: &PageLayout) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let primary_tab = TabId::new(config.summon.primary_tab.clone());
        let state = CharacterState::new(
            layout.home(config.sprite.size),
            config.sprite.frame_interval,
            config.motion.arrival_factor,
            primary_tab.clone(),
        );

        let mut machine = Self {
            config,
            primary_tab,
            state,
            rng,
            outbox: Vec::new(),
        };
        machine.schedule_next_action();
        machine
    }

    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    pub fn config(&self) -> &MascotConfig {
        &self.config
    }

    pub fn primary_tab(&self) -> &TabId {
        &self.primary_tab
    }

    pub fn on_primary_tab(&self) -> bool {
        self.state.active_tab == self.primary_tab
    }

    /// Takes the host commands queued since the last call.
    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.outbox)
    }

    /// Lists the optional collaborators missing from `layout`; each one
    /// disables its feature for the session.
    pub fn missing_collaborators(layout: &PageLayout) -> Vec<MascotError> {
        let mut missing = Vec::new();
        if layout.anchors.is_empty() {
            missing.push(MascotError::missing(Collaborator::HidingAnchors));
        }
        if layout.summon_control.is_none() {
            missing.push(MascotError::missing(Collaborator::SummonControl));
        }
        missing
    }

    /// Plays the named animation on the sprite clock. An unknown name is
    /// reported and the current animation keeps playing.
    pub fn play_animation(&mut self, name: &str) -> Result<Animation, MascotError> {
        self.state.sprite.play(name).inspect_err(|err| {
            error!("Mascot animation request rejected: {}", err);
        })
    }

    /// Advances timers, the motion loop, the sprite clock and dust puffs by
    /// one frame.
    pub fn update(&mut self, delta: Duration, layout: &PageLayout) {
        self.state.timers.tick(delta);
        while let Some(key) = self.state.timers.pop_expired() {
            self.on_timer(key, layout);
        }

        match self.state.motion.step(&mut self.state.position) {
            MotionStep::Stationary => {}
            MotionStep::Moving { dusty } => {
                if dusty && self.rng.gen_bool(self.config.motion.dust_chance) {
                    self.emit_dust();
                }
            }
            MotionStep::Arrived(arrival) => self.on_arrival(arrival, layout),
        }

        self.state.sprite.tick(delta);

        for puff in &mut self.state.dust {
            puff.tick(delta);
        }
        self.state.dust.retain(|puff| !puff.is_finished());
    }

    /// Cancels every timer and the motion in flight, restores z-order and
    /// peek offset, closes any dialogue and freezes the sprite. Safe to call
    /// from any state; calling it twice equals calling it once.
    pub fn interrupt(&mut self, mode: InterruptMode) {
        let cancelled = self.state.timers.cancel_all();
        let halted = self.state.motion.cancel().is_some();
        self.state.z_lowered = false;
        self.state.peek_offset = 0.0;
        self.state.sprite.freeze();

        let vanish = mode == InterruptMode::MakeInvisible
            || matches!(self.state.behavior, Behavior::OffScreen);
        if vanish {
            self.state.visible = false;
            self.state.sprite.set_animation(None);
            self.set_behavior(Behavior::OffScreen);
        } else {
            self.set_behavior(Behavior::Idle);
        }

        if cancelled > 0 || halted {
            debug!(
                "Mascot interrupted ({} timers cancelled, motion halted: {})",
                cancelled, halted
            );
        }
    }

    /// Host-requested immediate exit.
    pub fn dismiss(&mut self) {
        self.interrupt(InterruptMode::MakeInvisible);
    }

    /// Click on the character: opens a dialogue when settled, closes it when
    /// already talking, otherwise does nothing.
    pub fn on_character_clicked(&mut self, layout: &PageLayout) {
        if !self.state.visible {
            return;
        }

        if matches!(self.state.behavior, Behavior::Talking { .. }) {
            self.close_dialogue();
        } else if self.state.behavior.accepts_conversation() {
            self.start_talking(layout);
        } else {
            debug!(
                "Mascot ignores click while {}",
                self.state.behavior.label()
            );
        }
    }

    pub(super) fn set_behavior(&mut self, next: Behavior) {
        if self.state.behavior.label() != next.label() {
            debug!(
                "Mascot behavior: {} -> {}",
                self.state.behavior.label(),
                next.label()
            );
        }
        self.state.behavior = next;
    }

    pub(super) fn random_delay(&mut self, range: DelayRange) -> Duration {
        Duration::from_millis(self.rng.gen_range(range.millis()))
    }

    pub(super) fn run_speed(&self) -> f32 {
        self.config.run_speed()
    }

    fn on_timer(&mut self, key: TimerKey, layout: &PageLayout) {
        match key {
            TimerKey::NextAction => self.next_action(layout),
            TimerKey::DialogueClose => self.close_dialogue(),
            TimerKey::PeekStart => self.start_peek(),
            TimerKey::PeekEnd => self.end_peek(),
            TimerKey::FinishHiding => self.finish_hiding(),
            TimerKey::SummonWindow => self.summon_window_expired(layout),
            TimerKey::TabSettle => self.settle_after_tab_change(layout),
        }
    }

    fn on_arrival(&mut self, arrival: Arrival, layout: &PageLayout) {
        match arrival {
            Arrival::Walked => {
                if matches!(self.state.behavior, Behavior::Walking) {
                    self.enter_idle();
                }
            }
            Arrival::ReachedHidingSpot(spot) => {
                if self.state.behavior == (Behavior::Hiding { spot }) {
                    self.settle_hidden(spot);
                }
            }
            Arrival::ReachedSummonControl => self.arrive_at_summon_control(),
            Arrival::LeftScreen => self.finish_off_screen(layout),
        }
    }

    pub(super) fn enter_idle(&mut self) {
        self.set_behavior(Behavior::Idle);
        self.state.sprite.set_animation(Some(Animation::Idle));
        self.schedule_next_action();
    }

    pub(super) fn schedule_next_action(&mut self) {
        let range = if self.state.last_was_hidden {
            self.config.idle.after_hidden_delay
        } else {
            self.config.idle.delay
        };
        self.state.last_was_hidden = false;
        let delay = self.random_delay(range);
        self.state.timers.schedule(TimerKey::NextAction, delay);
    }

    fn next_action(&mut self, layout: &PageLayout) {
        if !matches!(self.state.behavior, Behavior::Idle) {
            debug!(
                "Mascot skips next action while {}",
                self.state.behavior.label()
            );
            return;
        }

        if !self.on_primary_tab() {
            self.run_off_screen(layout);
            return;
        }

        let can_hide = !layout.anchors.is_empty();
        if can_hide && self.rng.gen_bool(self.config.idle.hide_chance) {
            self.start_hiding(layout);
        } else {
            self.start_walking(layout);
        }
    }

    fn start_walking(&mut self, layout: &PageLayout) {
        let sprite = self.config.sprite.size;
        let bounds = (layout.viewport - sprite).max(Vec2::ZERO);
        let mut target = self.state.position;
        if self.rng.gen_bool(0.5) {
            target.x = self.rng.gen_range(0.0..=bounds.x);
        } else {
            target.y = self.rng.gen_range(0.0..=bounds.y);
        }
        let target = layout.clamp_on_screen(target, sprite);

        self.set_behavior(Behavior::Walking);
        self.state.sprite.set_animation(Some(Animation::Walk));
        self.state.motion.move_towards(Motion {
            target,
            speed: self.config.motion.base_speed,
            arrival: Arrival::Walked,
            dusty: true,
        });
    }

    fn start_hiding(&mut self, layout: &PageLayout) {
        let Some(anchor) = layout.anchors.choose(&mut self.rng) else {
            self.start_walking(layout);
            return;
        };
        let spot = anchor.id;
        let sprite = self.config.sprite.size;
        let nestle = self.config.hiding.nestle_offset;
        let target = layout.clamp_on_screen(
            Vec2::new(
                anchor.rect.min.x + nestle.x,
                anchor.rect.min.y - sprite.y + nestle.y,
            ),
            sprite,
        );

        debug!("Mascot heads behind {}", spot);
        self.set_behavior(Behavior::Hiding { spot });
        self.state.sprite.set_animation(Some(Animation::Walk));
        self.state.motion.move_towards(Motion {
            target,
            speed: self.config.motion.base_speed,
            arrival: Arrival::ReachedHidingSpot(spot),
            dusty: false,
        });
    }

    fn settle_hidden(&mut self, spot: AnchorId) {
        self.set_behavior(Behavior::Hidden {
            spot,
            phase: HidePhase::Resting,
        });
        self.state.sprite.set_animation(Some(Animation::Sit));
        self.state.z_lowered = true;
        let delay = self.random_delay(self.config.hiding.peek_delay);
        self.state.timers.schedule(TimerKey::PeekStart, delay);
    }

    fn start_peek(&mut self) {
        let Behavior::Hidden {
            spot,
            phase: HidePhase::Resting,
        } = self.state.behavior
        else {
            return;
        };
        self.set_behavior(Behavior::Hidden {
            spot,
            phase: HidePhase::Peeking,
        });
        self.state.peek_offset = self.config.hiding.peek_offset;
        self.state
            .timers
            .schedule(TimerKey::PeekEnd, self.config.hiding.peek_duration);
    }

    fn end_peek(&mut self) {
        let Behavior::Hidden {
            spot,
            phase: HidePhase::Peeking,
        } = self.state.behavior
        else {
            return;
        };
        self.set_behavior(Behavior::Hidden {
            spot,
            phase: HidePhase::Returning,
        });
        self.state.peek_offset = 0.0;
        let delay = self.random_delay(self.config.hiding.finish_delay)
            + self.config.hiding.return_transition;
        self.state.timers.schedule(TimerKey::FinishHiding, delay);
    }

    fn finish_hiding(&mut self) {
        if !matches!(self.state.behavior, Behavior::Hidden { .. }) {
            return;
        }
        self.state.z_lowered = false;
        self.state.peek_offset = 0.0;
        self.state.last_was_hidden = true;
        self.enter_idle();
    }

    fn start_talking(&mut self, layout: &PageLayout) {
        let origin = if matches!(self.state.behavior, Behavior::SummonedInteraction) {
            TalkOrigin::SummonWindow
        } else {
            TalkOrigin::Settled
        };
        let resume = self.state.sprite.animation().unwrap_or(Animation::Idle);

        self.interrupt(InterruptMode::KeepVisible);

        let text = self
            .config
            .dialogue
            .lines
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default();
        let bubble = DialogueBubble::place(
            text,
            self.state.position,
            self.config.sprite.size,
            layout.viewport,
            &self.config.dialogue,
        );

        info!("Mascot says: \"{}\"", bubble.text);
        self.set_behavior(Behavior::Talking {
            bubble,
            resume,
            origin,
        });
        let delay = self.random_delay(self.config.dialogue.close_delay);
        self.state.timers.schedule(TimerKey::DialogueClose, delay);
    }

    fn close_dialogue(&mut self) {
        let Behavior::Talking { resume, origin, .. } = self.state.behavior else {
            return;
        };
        self.state.timers.cancel(TimerKey::DialogueClose);

        match origin {
            TalkOrigin::Settled => {
                self.set_behavior(Behavior::Idle);
                self.state.sprite.set_animation(Some(resume));
                self.schedule_next_action();
            }
            TalkOrigin::SummonWindow => self.open_summon_window(),
        }
    }

    /// Horizontal edge used for leaving: the summon control's side when the
    /// page has one, otherwise the edge nearest the character.
    pub(super) fn exit_side(&self, layout: &PageLayout) -> ExitSide {
        let half = layout.viewport.x / 2.0;
        let reference = match layout.summon_control {
            Some(control) => control.center().x,
            None => self.state.position.x + self.config.sprite.size.x / 2.0,
        };
        if reference < half {
            ExitSide::Left
        } else {
            ExitSide::Right
        }
    }

    pub(super) fn edge_x(&self, side: ExitSide, layout: &PageLayout) -> f32 {
        match side {
            ExitSide::Left => -self.config.sprite.size.x - EXIT_MARGIN,
            ExitSide::Right => layout.viewport.x + EXIT_MARGIN,
        }
    }

    pub(super) fn run_off_screen(&mut self, layout: &PageLayout) {
        self.interrupt(InterruptMode::KeepVisible);
        if matches!(self.state.behavior, Behavior::OffScreen) {
            return;
        }

        let side = self.exit_side(layout);
        let target = Vec2::new(self.edge_x(side, layout), self.state.position.y);
        info!("Mascot runs off screen ({:?})", side);

        self.set_behavior(Behavior::RunningOffScreen);
        self.state.sprite.set_animation(Some(Animation::Run));
        self.state.motion.move_towards(Motion {
            target,
            speed: self.run_speed(),
            arrival: Arrival::LeftScreen,
            dusty: false,
        });
    }

    fn finish_off_screen(&mut self, layout: &PageLayout) {
        if !matches!(self.state.behavior, Behavior::RunningOffScreen) {
            return;
        }
        self.set_behavior(Behavior::OffScreen);
        self.state.visible = false;
        self.state.sprite.set_animation(None);
        self.state.position = layout.home(self.config.sprite.size);
    }

    fn emit_dust(&mut self) {
        let sprite = self.config.sprite.size;
        let feet = self.state.position + Vec2::new(sprite.x / 2.0, sprite.y);
        self.state
            .dust
            .push(DustPuff::new(feet, self.config.motion.dust_lifetime));
    }
}
