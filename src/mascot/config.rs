use std::{fs, ops::RangeInclusive, path::Path, time::Duration};

use bevy::prelude::*;
use serde::Deserialize;

const CONFIG_PATH: &str = "config/mascot.toml";

#[derive(Debug, Clone, Deserialize, Default)]
struct RawMascotConfig {
    #[serde(default)]
    sprite: RawSprite,
    #[serde(default)]
    motion: RawMotion,
    #[serde(default)]
    idle: RawIdle,
    #[serde(default)]
    hiding: RawHiding,
    #[serde(default)]
    dialogue: RawDialogue,
    #[serde(default)]
    summon: RawSummon,
    #[serde(default)]
    tabs: RawTabs,
    #[serde(default)]
    rng: RawRng,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawSprite {
    width: f32,
    height: f32,
    frame_interval_ms: u64,
}

impl Default for RawSprite {
    fn default() -> Self {
        Self {
            width: 24.0,
            height: 24.0,
            frame_interval_ms: 150,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawMotion {
    base_speed: f32,
    run_multiplier: f32,
    arrival_factor: f32,
    dust_chance: f64,
    dust_lifetime_ms: u64,
}

impl Default for RawMotion {
    fn default() -> Self {
        Self {
            base_speed: 2.0,
            run_multiplier: 1.5,
            arrival_factor: 1.1,
            dust_chance: 0.3,
            dust_lifetime_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawIdle {
    min_ms: u64,
    max_ms: u64,
    after_hidden_min_ms: u64,
    after_hidden_max_ms: u64,
    hide_chance: f64,
}

impl Default for RawIdle {
    fn default() -> Self {
        Self {
            min_ms: 5000,
            max_ms: 10000,
            after_hidden_min_ms: 3000,
            after_hidden_max_ms: 6000,
            hide_chance: 0.25,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawHiding {
    nestle_offset_x: f32,
    nestle_offset_y: f32,
    peek_delay_min_ms: u64,
    peek_delay_max_ms: u64,
    peek_offset: f32,
    peek_duration_ms: u64,
    finish_delay_min_ms: u64,
    finish_delay_max_ms: u64,
    return_transition_ms: u64,
}

impl Default for RawHiding {
    fn default() -> Self {
        Self {
            nestle_offset_x: 10.0,
            nestle_offset_y: 10.0,
            peek_delay_min_ms: 2000,
            peek_delay_max_ms: 3000,
            peek_offset: 10.0,
            peek_duration_ms: 500,
            finish_delay_min_ms: 1000,
            finish_delay_max_ms: 2000,
            return_transition_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawDialogue {
    close_min_ms: u64,
    close_max_ms: u64,
    bubble_width: f32,
    bubble_height: f32,
    gap: f32,
    margin: f32,
    lines: Vec<String>,
}

impl Default for RawDialogue {
    fn default() -> Self {
        Self {
            close_min_ms: 4000,
            close_max_ms: 7000,
            bubble_width: 180.0,
            bubble_height: 56.0,
            gap: 8.0,
            margin: 8.0,
            lines: default_lines(),
        }
    }
}

fn default_lines() -> Vec<String> {
    vec![
        "Hi there!".to_string(),
        "Looking for something?".to_string(),
        "Type the magic word and I'll come running.".to_string(),
        "I like hiding behind the paragraphs.".to_string(),
        "Don't mind me, just stretching my legs.".to_string(),
    ]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawSummon {
    keyword: String,
    window_ms: u64,
    primary_tab: String,
}

impl Default for RawSummon {
    fn default() -> Self {
        Self {
            keyword: "come".to_string(),
            window_ms: 5000,
            primary_tab: "main".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawTabs {
    settle_ms: u64,
}

impl Default for RawTabs {
    fn default() -> Self {
        Self { settle_ms: 100 }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRng {
    seed: Option<u64>,
}

/// Runtime configuration derived from `config/mascot.toml`.
#[derive(Resource, Debug, Clone)]
pub struct MascotConfig {
    pub sprite: SpriteConfig,
    pub motion: MotionConfig,
    pub idle: IdleConfig,
    pub hiding: HidingConfig,
    pub dialogue: DialogueConfig,
    pub summon: SummonConfig,
    pub tabs: TabConfig,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct SpriteConfig {
    pub size: Vec2,
    pub frame_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct MotionConfig {
    pub base_speed: f32,
    pub run_multiplier: f32,
    pub arrival_factor: f32,
    pub dust_chance: f64,
    pub dust_lifetime: Duration,
}

#[derive(Debug, Clone)]
pub struct IdleConfig {
    pub delay: DelayRange,
    pub after_hidden_delay: DelayRange,
    pub hide_chance: f64,
}

#[derive(Debug, Clone)]
pub struct HidingConfig {
    pub nestle_offset: Vec2,
    pub peek_delay: DelayRange,
    pub peek_offset: f32,
    pub peek_duration: Duration,
    pub finish_delay: DelayRange,
    pub return_transition: Duration,
}

#[derive(Debug, Clone)]
pub struct DialogueConfig {
    pub close_delay: DelayRange,
    pub bubble_size: Vec2,
    pub gap: f32,
    pub margin: f32,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SummonConfig {
    pub keyword: String,
    pub window: Duration,
    pub primary_tab: String,
}

#[derive(Debug, Clone)]
pub struct TabConfig {
    pub settle: Duration,
}

/// Inclusive millisecond range a random delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min_ms: u64,
    max_ms: u64,
}

impl DelayRange {
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: max_ms.max(min_ms),
        }
    }

    pub fn millis(&self) -> RangeInclusive<u64> {
        self.min_ms..=self.max_ms
    }

    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }
}

/// Probability in [0, 1]; NaN and infinities fall back to `default`.
fn probability_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        default
    }
}

fn finite_or(value: f32, default: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

impl MascotConfig {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw).unwrap_or_else(|err| {
                warn!(
                    "Failed to parse {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                Self::default()
            }),
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                Self::default()
            }
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<RawMascotConfig>(raw).map(Into::into)
    }

    /// Returns a copy with a fixed rng seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns a copy with the idle hide probability replaced.
    pub fn with_hide_chance(mut self, chance: f64) -> Self {
        self.idle.hide_chance = probability_or(chance, RawIdle::default().hide_chance);
        self
    }

    /// Returns a copy with dust puffs switched off.
    pub fn without_dust(mut self) -> Self {
        self.motion.dust_chance = 0.0;
        self
    }

    pub fn run_speed(&self) -> f32 {
        self.motion.base_speed * self.motion.run_multiplier
    }
}

impl SummonConfig {
    /// Whether `input` is exactly the keyword, ignoring case and surrounding
    /// whitespace.
    pub fn matches(&self, input: &str) -> bool {
        input.trim().to_lowercase() == self.keyword
    }
}

impl Default for MascotConfig {
    fn default() -> Self {
        RawMascotConfig::default().into()
    }
}

impl From<RawMascotConfig> for MascotConfig {
    fn from(value: RawMascotConfig) -> Self {
        let sprite = SpriteConfig {
            size: Vec2::new(value.sprite.width.max(1.0), value.sprite.height.max(1.0)),
            frame_interval: Duration::from_millis(value.sprite.frame_interval_ms.max(1)),
        };

        let motion = MotionConfig {
            base_speed: if value.motion.base_speed > 0.0 {
                value.motion.base_speed
            } else {
                RawMotion::default().base_speed
            },
            run_multiplier: value.motion.run_multiplier.max(1.0),
            arrival_factor: value.motion.arrival_factor.max(1.0),
            dust_chance: probability_or(
                value.motion.dust_chance,
                RawMotion::default().dust_chance,
            ),
            dust_lifetime: Duration::from_millis(value.motion.dust_lifetime_ms),
        };

        let idle = IdleConfig {
            delay: DelayRange::from_millis(value.idle.min_ms, value.idle.max_ms),
            after_hidden_delay: DelayRange::from_millis(
                value.idle.after_hidden_min_ms,
                value.idle.after_hidden_max_ms,
            ),
            hide_chance: probability_or(value.idle.hide_chance, RawIdle::default().hide_chance),
        };

        let hiding = HidingConfig {
            nestle_offset: Vec2::new(
                finite_or(value.hiding.nestle_offset_x, RawHiding::default().nestle_offset_x),
                finite_or(value.hiding.nestle_offset_y, RawHiding::default().nestle_offset_y),
            ),
            peek_delay: DelayRange::from_millis(
                value.hiding.peek_delay_min_ms,
                value.hiding.peek_delay_max_ms,
            ),
            peek_offset: finite_or(value.hiding.peek_offset, RawHiding::default().peek_offset)
                .abs(),
            peek_duration: Duration::from_millis(value.hiding.peek_duration_ms),
            finish_delay: DelayRange::from_millis(
                value.hiding.finish_delay_min_ms,
                value.hiding.finish_delay_max_ms,
            ),
            return_transition: Duration::from_millis(value.hiding.return_transition_ms),
        };

        let lines: Vec<String> = value
            .dialogue
            .lines
            .iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        let dialogue = DialogueConfig {
            close_delay: DelayRange::from_millis(
                value.dialogue.close_min_ms,
                value.dialogue.close_max_ms,
            ),
            bubble_size: Vec2::new(
                value.dialogue.bubble_width.max(1.0),
                value.dialogue.bubble_height.max(1.0),
            ),
            gap: value.dialogue.gap.max(0.0),
            margin: value.dialogue.margin.max(0.0),
            lines: if lines.is_empty() { default_lines() } else { lines },
        };

        let keyword = value.summon.keyword.trim().to_lowercase();
        let primary_tab = value.summon.primary_tab.trim().to_string();
        let summon = SummonConfig {
            keyword: if keyword.is_empty() {
                RawSummon::default().keyword
            } else {
                keyword
            },
            window: Duration::from_millis(value.summon.window_ms),
            primary_tab: if primary_tab.is_empty() {
                RawSummon::default().primary_tab
            } else {
                primary_tab
            },
        };

        let tabs = TabConfig {
            settle: Duration::from_millis(value.tabs.settle_ms),
        };

        Self {
            sprite,
            motion,
            idle,
            hiding,
            dialogue,
            summon,
            tabs,
            seed: value.rng.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_falls_back_to_defaults() {
        let config = MascotConfig::default();
        assert_eq!(config.sprite.frame_interval, Duration::from_millis(150));
        assert_eq!(config.idle.delay.millis(), 5000..=10000);
        assert_eq!(config.idle.after_hidden_delay.millis(), 3000..=6000);
        assert_eq!(config.summon.window, Duration::from_secs(5));
        assert_eq!(config.summon.primary_tab, "main");
        assert!((config.run_speed() - 3.0).abs() < f32::EPSILON);
        assert!(!config.dialogue.lines.is_empty());
    }

    #[test]
    fn repairs_invalid_values() {
        let config = MascotConfig::from_toml_str(
            r#"
            [motion]
            base_speed = -4.0
            dust_chance = 3.0

            [idle]
            min_ms = 9000
            max_ms = 1000
            hide_chance = -1.0

            [dialogue]
            lines = ["   ", ""]

            [summon]
            keyword = "  Here Boy "
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.motion.base_speed, 2.0);
        assert_eq!(config.motion.dust_chance, 1.0);
        assert_eq!(config.idle.delay.millis(), 1000..=9000);
        assert_eq!(config.idle.hide_chance, 0.0);
        assert!(!config.dialogue.lines.is_empty());
        assert_eq!(config.summon.keyword, "here boy");
        assert!(config.summon.matches("HERE BOY\n"));
        assert!(!config.summon.matches("here boy!"));
    }

    #[test]
    fn non_finite_values_fall_back_to_defaults() {
        let config = MascotConfig::from_toml_str(
            r#"
            [motion]
            dust_chance = nan

            [idle]
            hide_chance = nan

            [hiding]
            peek_offset = inf
            nestle_offset_x = -nan
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.motion.dust_chance, 0.3);
        assert_eq!(config.idle.hide_chance, 0.25);
        assert_eq!(config.hiding.peek_offset, 10.0);
        assert_eq!(config.hiding.nestle_offset, Vec2::new(10.0, 10.0));
        assert_eq!(
            MascotConfig::default().with_hide_chance(f64::NAN).idle.hide_chance,
            0.25
        );
    }

    #[test]
    fn reads_seed_section() {
        let config = MascotConfig::from_toml_str("[rng]\nseed = 42\n").expect("valid toml");
        assert_eq!(config.seed, Some(42));
    }
}
