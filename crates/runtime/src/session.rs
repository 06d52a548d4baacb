//! Session orchestration.
//!
//! [`GameSession`] owns the unit roster, the event manager and the battle
//! system, and answers the manager's battle requests itself: an encounter
//! event suspends, the session runs the battle, and the result flows back
//! into the event that asked for it. Every notice ends up on the
//! [`EventBus`].

use std::collections::HashMap;
use std::sync::Arc;

use game_content::ContentFactory;
use game_core::{
    Await, BattleOutcome, BattleState, BattleSystem, ContextValue, EventError, EventManager,
    EventNotice, EventTemplate, FloorId, GameConfig, GameEnv, Registry, RoomId, RunPhase,
    TemplateSource, UnitId, UnitRecord,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::api::{Result, RuntimeError};
use crate::events::{BattleEvent, Event, EventBus, LifecycleEvent, Topic};
use crate::oracle::{EnemyCatalog, FloorLayout, MessageLog, OracleManager};

/// How battles requested by events are played out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BattlePacing {
    /// The battle resolves inside the call that requested it.
    #[default]
    Instant,
    /// Phases advance from [`GameSession::tick`], one per phase delay.
    Paced,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub game: GameConfig,
    pub pacing: BattlePacing,
    pub event_buffer_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            pacing: BattlePacing::default(),
            event_buffer_size: 100,
        }
    }
}

/// Composition root for one play session.
pub struct GameSession {
    config: SessionConfig,
    roster: HashMap<UnitId, UnitRecord>,
    events: EventManager,
    battles: BattleSystem,
    registry: Arc<Registry>,
    oracles: OracleManager,
    bus: EventBus,
}

impl GameSession {
    /// Create a new session builder
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn events(&self) -> &EventManager {
        &self.events
    }

    pub fn battles(&self) -> &BattleSystem {
        &self.battles
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn oracles(&self) -> &OracleManager {
        &self.oracles
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.bus.subscribe(topic)
    }

    // ===== roster =====

    /// Adds a unit to the session.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::DuplicateUnit`] when the id is taken.
    pub fn add_unit(&mut self, unit: UnitRecord) -> Result<()> {
        if self.roster.contains_key(&unit.id) {
            return Err(RuntimeError::DuplicateUnit(unit.id));
        }
        debug!(unit = %unit.id, name = %unit.name, "unit joined session");
        self.roster.insert(unit.id, unit);
        Ok(())
    }

    /// Takes a unit out of the session.
    ///
    /// # Errors
    ///
    /// Refuses units that are in an event or a battle.
    pub fn remove_unit(&mut self, unit: UnitId) -> Result<UnitRecord> {
        if self.events.is_in_active_event(unit) || self.battles.player() == Some(unit) {
            return Err(EventError::AlreadyInEvent(unit).into());
        }
        let record = self
            .roster
            .remove(&unit)
            .ok_or(RuntimeError::UnknownUnit(unit))?;
        self.oracles.floors.remove(unit);
        Ok(record)
    }

    pub fn unit(&self, unit: UnitId) -> Option<&UnitRecord> {
        self.roster.get(&unit)
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitRecord> {
        self.roster.values()
    }

    /// Moves a unit without running the room's event.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownUnit`] for units outside the session.
    pub fn place_unit(&mut self, unit: UnitId, floor: FloorId, room: RoomId) -> Result<()> {
        if !self.roster.contains_key(&unit) {
            return Err(RuntimeError::UnknownUnit(unit));
        }
        self.oracles.floors.place(unit, floor, room);
        Ok(())
    }

    // ===== event flow =====

    /// Places `unit` in `room` and runs the room's event.
    ///
    /// `event` picks the event of a room that has none yet; without it the
    /// assignment table decides.
    ///
    /// # Errors
    ///
    /// Fails for unknown units and with the event manager's errors.
    pub fn enter_room(
        &mut self,
        unit: UnitId,
        floor: FloorId,
        room: RoomId,
        event: Option<&str>,
    ) -> Result<RunPhase> {
        self.place_unit(unit, floor, room)?;
        debug!(%unit, %floor, %room, "entering room");
        let phase = self.drive(unit, |events, record, env| {
            events.handle_room_event(record, event, room, env)
        })?;
        self.settle(unit, phase)
    }

    /// Starts an event by name outside any room.
    ///
    /// # Errors
    ///
    /// Fails for unknown units and with the event manager's errors.
    pub fn start_event(&mut self, unit: UnitId, event: &str) -> Result<RunPhase> {
        let phase = self.drive(unit, |events, record, env| {
            events.start_event(record, event, env)
        })?;
        self.settle(unit, phase)
    }

    /// Answers the choice the unit's event waits for.
    ///
    /// # Errors
    ///
    /// Fails for unknown units and with the event manager's errors.
    pub fn submit_choice(&mut self, unit: UnitId, index: usize) -> Result<RunPhase> {
        let phase = self.drive(unit, |events, record, env| {
            events.submit_choice(record, index, env)
        })?;
        self.settle(unit, phase)
    }

    /// Resumes a suspended event.
    ///
    /// # Errors
    ///
    /// Fails for unknown units and with the event manager's errors.
    pub fn continue_event(&mut self, unit: UnitId) -> Result<RunPhase> {
        let phase = self.drive(unit, |events, record, env| {
            events.continue_processing(record, env)
        })?;
        self.settle(unit, phase)
    }

    /// Ends the unit's event right away.
    ///
    /// # Errors
    ///
    /// Returns the event manager's error when the unit has no event.
    pub fn finish_event(&mut self, unit: UnitId, success: bool) -> Result<()> {
        self.events.finish_event(unit, success)?;
        self.dispatch()
    }

    /// Advances battle pacing and queued messages by `dt` seconds, resuming
    /// every event whose messages have all been shown.
    ///
    /// # Errors
    ///
    /// Returns battle errors from a paced battle.
    pub fn tick(&mut self, dt: f32) -> Result<()> {
        if let Some(player) = self.battles.player() {
            let env = self.oracles.as_game_env();
            let outcome = match self.roster.get_mut(&player) {
                Some(record) => self.battles.tick(dt, record, env)?,
                None => None,
            };
            if let Some(outcome) = outcome {
                self.conclude_battle(outcome)?;
            }
        }

        let ready = self.events.tick(dt, self.oracles.as_game_env());
        for unit in ready {
            if let Err(err) = self.drive(unit, |events, record, env| {
                events.continue_processing(record, env)
            }) {
                warn!(%unit, %err, "event could not resume after its messages");
            }
        }
        self.dispatch()
    }

    pub fn run_phase(&self, unit: UnitId) -> RunPhase {
        self.events.run_phase(unit)
    }

    pub fn awaiting(&self, unit: UnitId) -> Option<&Await> {
        self.events.awaiting(unit)
    }

    pub fn active_event(&self, unit: UnitId) -> Option<&str> {
        self.events.active_event(unit)
    }

    /// Value of `key` in the unit's active event context.
    pub fn lookup(&self, unit: UnitId, key: &str) -> Option<&ContextValue> {
        self.events.lookup(unit, key)
    }

    pub fn battle_state(&self) -> Option<BattleState> {
        self.battles.state()
    }

    // ===== internals =====

    fn drive<T, F>(&mut self, unit: UnitId, op: F) -> Result<T>
    where
        F: FnOnce(&mut EventManager, &mut UnitRecord, GameEnv<'_>) -> std::result::Result<T, EventError>,
    {
        let record = self
            .roster
            .get_mut(&unit)
            .ok_or(RuntimeError::UnknownUnit(unit))?;
        let env = self.oracles.as_game_env();
        Ok(op(&mut self.events, record, env)?)
    }

    /// Publishes pending notices, then reports where the unit's run stands.
    fn settle(&mut self, unit: UnitId, phase: RunPhase) -> Result<RunPhase> {
        self.dispatch()?;
        if phase == RunPhase::Completed || !self.events.is_in_active_event(unit) {
            return Ok(RunPhase::Completed);
        }
        Ok(self.events.run_phase(unit))
    }

    /// Drains manager notices until none are left, answering battle
    /// requests along the way.
    fn dispatch(&mut self) -> Result<()> {
        loop {
            let notices = self.events.drain_notices();
            if notices.is_empty() {
                return Ok(());
            }
            for notice in notices {
                match notice {
                    EventNotice::BattleRequested { unit, enemy } => {
                        self.begin_battle(unit, *enemy)?;
                    }
                    other => {
                        if let Some(event) = LifecycleEvent::from_notice(&other) {
                            self.bus.publish(Event::Lifecycle(event));
                        }
                    }
                }
            }
        }
    }

    fn begin_battle(&mut self, unit: UnitId, enemy: UnitRecord) -> Result<()> {
        let Some(record) = self.roster.get_mut(&unit) else {
            warn!(%unit, "battle requested for a unit outside the session");
            return Ok(());
        };
        let env = self.oracles.as_game_env();
        let enemy_name = enemy.name.clone();

        match self.battles.start_battle(record, enemy, env) {
            Ok(Some(outcome)) => self.conclude_battle(outcome),
            Ok(None) => {
                info!(player = %unit, enemy = %enemy_name, "battle started");
                self.bus.publish(Event::Battle(BattleEvent::Started {
                    player: unit,
                    enemy: enemy_name,
                }));
                if self.config.pacing == BattlePacing::Instant {
                    let outcome = self.battles.resolve(record, env)?;
                    self.conclude_battle(outcome)?;
                }
                Ok(())
            }
            Err(err) => {
                warn!(player = %unit, enemy = %enemy_name, %err, "battle rejected, event treats it as lost");
                self.bus.publish(Event::Battle(BattleEvent::Rejected {
                    player: unit,
                    enemy: enemy_name,
                    reason: err.to_string(),
                }));
                self.events.resolve_battle(record, false, env)?;
                Ok(())
            }
        }
    }

    fn conclude_battle(&mut self, outcome: BattleOutcome) -> Result<()> {
        info!(
            player = %outcome.player,
            enemy = %outcome.enemy.name,
            won = outcome.won,
            reward = outcome.reward,
            "battle concluded"
        );
        self.bus.publish(Event::Battle(BattleEvent::from(&outcome)));

        let won = outcome.won;
        if let Err(err) = self.drive(outcome.player, |events, record, env| {
            events.resolve_battle(record, won, env)
        }) {
            warn!(player = %outcome.player, %err, "battle result had no event to resume");
        }
        Ok(())
    }
}

/// Builder for [`GameSession`]
pub struct SessionBuilder {
    config: SessionConfig,
    templates: Vec<EventTemplate>,
    source: Option<Box<dyn TemplateSource>>,
    registry: Option<Registry>,
    floors: Option<FloorLayout>,
    enemies: Option<EnemyCatalog>,
    bus: Option<EventBus>,
}

impl SessionBuilder {
    fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            templates: Vec::new(),
            source: None,
            registry: None,
            floors: None,
            enemies: None,
            bus: None,
        }
    }

    /// Override session configuration
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn game_config(mut self, game: GameConfig) -> Self {
        self.config.game = game;
        self
    }

    pub fn pacing(mut self, pacing: BattlePacing) -> Self {
        self.config.pacing = pacing;
        self
    }

    pub fn templates(mut self, templates: Vec<EventTemplate>) -> Self {
        self.templates = templates;
        self
    }

    /// Source consulted when no templates were given
    pub fn template_source(mut self, source: impl TemplateSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn floors(mut self, floors: FloorLayout) -> Self {
        self.floors = Some(floors);
        self
    }

    pub fn enemies(mut self, enemies: EnemyCatalog) -> Self {
        self.enemies = Some(enemies);
        self
    }

    /// Share an existing bus instead of creating one
    pub fn bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Loads configuration, events, ailments, symptoms and enemies from
    /// `factory`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Content`] when either file fails to load.
    pub fn content(mut self, factory: &ContentFactory) -> Result<Self> {
        let (game, manifest) = factory
            .load_all()
            .map_err(|err| RuntimeError::Content(format!("{err:#}")))?;
        self.config.game = game;
        self.templates = manifest.templates();
        self.registry = Some(manifest.registry());
        self.enemies = Some(EnemyCatalog::from_templates(manifest.enemies));
        self.source = Some(Box::new(factory.template_source()));
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns the template source's error when it has to be consulted and
    /// fails.
    pub fn build(self) -> Result<GameSession> {
        let config = self.config;
        let registry = Arc::new(
            self.registry
                .unwrap_or_else(|| Registry::with_stagger(&config.game.stagger_effect)),
        );
        let bus = self
            .bus
            .unwrap_or_else(|| EventBus::with_capacity(config.event_buffer_size));

        let events = match &self.source {
            Some(source) => EventManager::with_source(
                self.templates,
                source.as_ref(),
                config.game.clone(),
                Arc::clone(&registry),
            )?,
            None => EventManager::new(self.templates, config.game.clone(), Arc::clone(&registry)),
        };
        let battles = BattleSystem::new(config.game.clone(), Arc::clone(&registry));

        let oracles = OracleManager::new(
            Arc::new(self.floors.unwrap_or_default()),
            Arc::new(MessageLog::with_bus(bus.clone())),
            Arc::new(self.enemies.unwrap_or_default()),
        );

        debug!(
            templates = events.template_count(),
            ailments = registry.ailment_count(),
            symptoms = registry.symptom_count(),
            enemies = oracles.enemies().len(),
            "session built"
        );

        Ok(GameSession {
            config,
            roster: HashMap::new(),
            events,
            battles,
            registry,
            oracles,
            bus,
        })
    }
}
