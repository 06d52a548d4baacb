use crate::event::AssignmentTable;

/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Event used when a requested template is unknown and when chests or
    /// traps run dry.
    pub default_event: String,
    /// Registry name of the ailment applied when a stance breaks.
    pub stagger_effect: String,
    /// Requirement used when the floor provider cannot supply one.
    pub fallback_memoria_requirement: i32,
    /// Flat base of every basic attack.
    pub base_attack: i32,
    /// Stance points recovered at the start of each of a unit's turns.
    pub stance_recovery: i32,
    /// Max health gained per level.
    pub level_up_health: i32,
    /// Memoria per level spent by a rest site to level up.
    pub level_up_cost_per_level: i32,
    /// Memoria per level spent by a rest site to heal.
    pub rest_cost_per_level: i32,
    /// Seconds a message stays up when none is given.
    pub message_duration: f32,
    /// Color hint of message borders.
    pub border_color: String,
    /// Seconds between battle phases when paced by `tick`.
    pub phase_delay: f32,
    /// Base seed mixed into every random roll.
    pub game_seed: u64,
    /// Two-stage weighted table used to assign events to rooms.
    pub assignment: AssignmentTable,
}

impl GameConfig {
    // ===== compile-time constants =====
    pub const MAX_STATUS_EFFECTS: usize = 8;
    /// Incoming damage multiplier against a unit whose defenses are down.
    pub const VULNERABLE_DAMAGE_MULTIPLIER: i32 = 2;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_EVENT: &'static str = "Quartz";
    pub const DEFAULT_STAGGER_EFFECT: &'static str = "Staggered";
    pub const DEFAULT_FALLBACK_MEMORIA_REQUIREMENT: i32 = 100;
    pub const DEFAULT_BASE_ATTACK: i32 = 5;
    pub const DEFAULT_STANCE_RECOVERY: i32 = 1;
    pub const DEFAULT_LEVEL_UP_HEALTH: i32 = 10;
    pub const DEFAULT_LEVEL_UP_COST_PER_LEVEL: i32 = 50;
    pub const DEFAULT_REST_COST_PER_LEVEL: i32 = 20;
    pub const DEFAULT_MESSAGE_DURATION: f32 = 2.0;
    pub const DEFAULT_BORDER_COLOR: &'static str = "gray";
    pub const DEFAULT_PHASE_DELAY: f32 = 1.0;
    pub const DEFAULT_GAME_SEED: u64 = 0x5eed_cafe;

    pub fn new() -> Self {
        Self {
            default_event: Self::DEFAULT_EVENT.to_owned(),
            stagger_effect: Self::DEFAULT_STAGGER_EFFECT.to_owned(),
            fallback_memoria_requirement: Self::DEFAULT_FALLBACK_MEMORIA_REQUIREMENT,
            base_attack: Self::DEFAULT_BASE_ATTACK,
            stance_recovery: Self::DEFAULT_STANCE_RECOVERY,
            level_up_health: Self::DEFAULT_LEVEL_UP_HEALTH,
            level_up_cost_per_level: Self::DEFAULT_LEVEL_UP_COST_PER_LEVEL,
            rest_cost_per_level: Self::DEFAULT_REST_COST_PER_LEVEL,
            message_duration: Self::DEFAULT_MESSAGE_DURATION,
            border_color: Self::DEFAULT_BORDER_COLOR.to_owned(),
            phase_delay: Self::DEFAULT_PHASE_DELAY,
            game_seed: Self::DEFAULT_GAME_SEED,
            assignment: AssignmentTable::default(),
        }
    }

    pub fn with_seed(game_seed: u64) -> Self {
        Self {
            game_seed,
            ..Self::new()
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
