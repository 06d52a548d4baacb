//! Rules of the dungeon crawler: units, events and battles.
//!
//! `game-core` holds everything that decides outcomes and nothing that talks
//! to a screen or a file. Events run through [`event::EventManager`], battles
//! through [`battle::BattleSystem`]; both reach the outside world only through
//! the oracles bundled in [`env::Env`].
//!
//! Content crates build [`event::EventTemplate`]s and fill the [`Registry`];
//! the runtime owns the unit records and feeds player input back in.
pub mod battle;
pub mod combat;
pub mod config;
pub mod env;
pub mod error;
pub mod event;
pub mod registry;
pub mod state;
pub mod stats;
pub mod status;
pub mod symptom;

pub use battle::{BattleError, BattleOutcome, BattleState, BattleSystem, TurnReport, take_turn};
pub use combat::{AttackReport, basic_attack, break_stance, calculate_damage, is_staggered};
pub use config::GameConfig;
pub use env::{
    EnemyFactory, EnemyTemplate, Env, FloorOracle, GameEnv, OracleError, PcgRng,
    PresentationSink, RngOracle, compute_seed,
};
pub use error::{ErrorSeverity, GameError};
pub use event::{
    Await, ContextValue, Directive, EventContext, EventDef, EventError, EventManager,
    EventNotice, EventStep, EventTemplate, RunPhase, StepContext, StepDef, TemplateSource,
};
pub use registry::Registry;
pub use state::{EventSubState, FloorId, MainState, RoomId, UnitId, UnitRecord};
pub use stats::{Attribute, Attributes, HealthPool, MemoriaPool, StancePool, StatModifier};
pub use status::{Ailment, AilmentEffect, AilmentFlags, StatusEffect, StatusLedger};
pub use symptom::{Manifestation, ManifestationSet, Symptom, SymptomLedger};
