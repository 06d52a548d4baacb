//! Execution context handed to every behavior step.

use behavior_tree::{Behavior, ChainControl};
use tracing::warn;

use super::context::{ContextType, ContextValue, EventContext, keys};
use super::messages::{QueuedMessage, show};
use super::scope::scoped_key;
use super::template::InstanceState;
use crate::config::GameConfig;
use crate::env::{GameEnv, OracleError, compute_seed};
use crate::registry::Registry;
use crate::state::UnitRecord;

/// A behavior step usable in any event.
pub type StepBehavior = dyn for<'a> Behavior<StepContext<'a>>;

/// Boxed behavior step.
pub type EventStep = Box<StepBehavior>;

/// Request a step leaves for the event manager.
#[derive(Clone, Debug)]
pub enum Directive {
    /// Finish the event now with the given result.
    Complete { success: bool },
    /// Replace the event of the unit's room with another template. With
    /// `restart` the new event runs right away with the same context;
    /// otherwise the current run finishes.
    Transform { into: String, restart: bool },
    /// Start a battle against `enemy` on behalf of the event's unit.
    StartBattle { enemy: Box<UnitRecord> },
}

/// External signal a suspended event waits for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Await {
    /// Queued messages finishing their display time.
    Messages,
    /// A player pick among `options`.
    Choice { options: Vec<String> },
    /// The outcome of a battle the event started.
    Battle,
}

impl Await {
    pub fn name(&self) -> &'static str {
        match self {
            Await::Messages => "messages",
            Await::Choice { .. } => "a choice",
            Await::Battle => "a battle",
        }
    }
}

/// Everything the steps of one run left behind for the manager.
#[derive(Debug, Default)]
pub struct Outbox {
    pub directives: Vec<Directive>,
    pub awaiting: Option<Await>,
    pub messages: Vec<QueuedMessage>,
}

/// Mutable view of one event run, passed to each step in turn.
pub struct StepContext<'a> {
    pub unit: &'a mut UnitRecord,
    pub context: &'a mut EventContext,
    pub state: &'a mut InstanceState,
    pub env: GameEnv<'a>,
    pub registry: &'a Registry,
    pub config: &'a GameConfig,
    scope: u32,
    nonce: u64,
    rolls: u32,
    outbox: Outbox,
}

impl<'a> StepContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        unit: &'a mut UnitRecord,
        context: &'a mut EventContext,
        state: &'a mut InstanceState,
        env: GameEnv<'a>,
        registry: &'a Registry,
        config: &'a GameConfig,
        scope: u32,
        nonce: u64,
    ) -> Self {
        Self {
            unit,
            context,
            state,
            env,
            registry,
            config,
            scope,
            nonce,
            rolls: 0,
            outbox: Outbox::default(),
        }
    }

    pub fn scope(&self) -> u32 {
        self.scope
    }

    pub fn scoped(&self, key: &str) -> String {
        scoped_key(self.scope, key)
    }

    // ===== context access =====

    /// Reads the unit's scoped value, falling back to the event-wide key.
    pub fn lookup(&self, key: &str) -> Option<&ContextValue> {
        self.context.lookup(self.scope, key)
    }

    pub fn lookup_as<T: ContextType>(&self, key: &str, default: T) -> T {
        self.context.lookup_as(self.scope, key, default)
    }

    /// Writes a value for this unit, scoped and bare.
    pub fn publish(&mut self, key: &str, value: impl Into<ContextValue>) {
        self.context.publish(self.scope, key, value);
    }

    /// Refreshes the memoria keys after the unit's memoria changed.
    pub fn publish_memoria(&mut self) {
        let memoria = self.unit.memoria();
        self.publish(keys::CURRENT_MEMORIA, memoria.current());
        self.publish(keys::TOTAL_MEMORIA, memoria.total());
    }

    // ===== presentation =====

    /// Shows a message right away.
    pub fn display(&self, text: &str, color: &str) {
        match self.env.presentation() {
            Ok(sink) => sink.display_message(text, color),
            Err(err) => warn!(unit = %self.unit.id, error = %err, text, "message dropped"),
        }
    }

    /// Shows a message right away, framed when it has a border.
    pub fn display_message(&self, message: &QueuedMessage) {
        match self.env.presentation() {
            Ok(sink) => show(message, sink),
            Err(err) => warn!(unit = %self.unit.id, error = %err, text = %message.text, "message dropped"),
        }
    }

    /// Queues a message for timed display while the event is suspended.
    pub fn queue_message(&mut self, message: QueuedMessage) {
        self.outbox.messages.push(message);
    }

    pub fn update_health_display(&self) {
        if let Ok(sink) = self.env.presentation() {
            let health = self.unit.health();
            sink.update_health_display(health.current(), health.max());
        }
    }

    pub fn update_memoria_display(&self, is_gain: bool) {
        if let Ok(sink) = self.env.presentation() {
            let memoria = self.unit.memoria();
            sink.update_memoria_display(memoria.current(), memoria.total(), is_gain);
        }
    }

    // ===== manager requests =====

    pub fn direct(&mut self, directive: Directive) {
        self.outbox.directives.push(directive);
    }

    /// Records what the event waits for once the chain suspends.
    pub fn await_signal(&mut self, signal: Await) {
        self.outbox.awaiting = Some(signal);
    }

    /// Falls back to the configured default event for transformations.
    pub fn fallback_event(&self, configured: Option<&str>) -> String {
        configured
            .map(str::to_owned)
            .unwrap_or_else(|| self.config.default_event.clone())
    }

    pub fn into_outbox(self) -> Outbox {
        self.outbox
    }

    // ===== randomness =====

    fn next_seed(&mut self) -> u64 {
        let seed = compute_seed(self.config.game_seed, self.nonce, self.unit.id.0, self.rolls);
        self.rolls += 1;
        seed
    }

    /// Rolls a value in `[0, bound)`.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng oracle was provided.
    pub fn roll_below(&mut self, bound: u32) -> Result<u32, OracleError> {
        let rng = self.env.rng()?;
        let seed = self.next_seed();
        Ok(rng.below(seed, bound))
    }

    /// Rolls a d100 (1-100 inclusive).
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng oracle was provided.
    pub fn roll_d100(&mut self) -> Result<u32, OracleError> {
        let rng = self.env.rng()?;
        let seed = self.next_seed();
        Ok(rng.roll_d100(seed))
    }
}

impl ChainControl for StepContext<'_> {
    fn halt_requested(&self) -> bool {
        self.outbox.directives.iter().any(|directive| {
            matches!(
                directive,
                Directive::Complete { .. } | Directive::Transform { .. }
            )
        })
    }
}
