//! Event templates, per-unit runs and room assignment.
//!
//! The [`EventManager`] owns every template, every live instance and every
//! event context. Units stay with the caller and are lent to the manager for
//! the duration of each call, so one manager can serve any number of units.
//!
//! A unit has at most one active run. A run walks its instance's chain until
//! it completes or a blocking step suspends it; the caller resumes it with
//! [`continue_processing`](EventManager::continue_processing),
//! [`submit_choice`](EventManager::submit_choice) or
//! [`resolve_battle`](EventManager::resolve_battle).

use std::collections::HashMap;
use std::sync::Arc;

use behavior_tree::{ChainCursor, ChainOutcome};
use tracing::{debug, error, warn};

use super::context::{ContextValue, EventContext, keys};
use super::error::EventError;
use super::messages::{MessageQueue, QueuedMessage, show};
use super::scope::{UnitScopes, scope_prefix};
use super::step::{Await, Directive, StepContext};
use super::template::{
    EventInstance, EventTemplate, InstanceId, InstanceState, RunPhase, TemplateSource,
};
use crate::config::GameConfig;
use crate::env::{GameEnv, compute_seed};
use crate::registry::Registry;
use crate::state::{EventSubState, RoomId, UnitId, UnitRecord};

/// Lifecycle notification for subscribers of the manager.
#[derive(Clone, Debug)]
pub enum EventNotice {
    Started {
        unit: UnitId,
        event: String,
    },
    Finished {
        unit: UnitId,
        event: String,
        success: bool,
    },
    Transformed {
        unit: UnitId,
        from: String,
        into: String,
    },
    /// An encounter wants a battle; the caller runs it and reports back
    /// through [`EventManager::resolve_battle`].
    BattleRequested {
        unit: UnitId,
        enemy: Box<UnitRecord>,
    },
}

#[derive(Debug)]
struct ActiveRun {
    instance: InstanceId,
    cursor: ChainCursor,
    phase: RunPhase,
    awaiting: Option<Await>,
    messages: Option<MessageQueue>,
}

impl ActiveRun {
    fn new(instance: InstanceId) -> Self {
        Self {
            instance,
            cursor: ChainCursor::new(),
            phase: RunPhase::Idle,
            awaiting: None,
            messages: None,
        }
    }
}

/// Registry of event templates and driver of per-unit event runs.
pub struct EventManager {
    config: GameConfig,
    registry: Arc<Registry>,
    /// Keyed by lowercase name.
    templates: HashMap<String, Arc<EventTemplate>>,
    /// Lowercase names in registration order.
    order: Vec<String>,
    instances: HashMap<InstanceId, EventInstance>,
    next_instance: u32,
    rooms: HashMap<RoomId, InstanceId>,
    contexts: HashMap<InstanceId, EventContext>,
    runs: HashMap<UnitId, ActiveRun>,
    scopes: UnitScopes,
    notices: Vec<EventNotice>,
    nonce: u64,
}

impl EventManager {
    /// Restarting transformations allowed within one call.
    pub const MAX_RESTARTS: usize = 8;

    pub fn new(templates: Vec<EventTemplate>, config: GameConfig, registry: Arc<Registry>) -> Self {
        let mut manager = Self {
            config,
            registry,
            templates: HashMap::new(),
            order: Vec::new(),
            instances: HashMap::new(),
            next_instance: 0,
            rooms: HashMap::new(),
            contexts: HashMap::new(),
            runs: HashMap::new(),
            scopes: UnitScopes::new(),
            notices: Vec::new(),
            nonce: 0,
        };
        for template in templates {
            manager.register_template(template);
        }
        manager
    }

    /// Builds a manager from `templates`, or from `source` when the list is empty.
    ///
    /// # Errors
    ///
    /// Returns the source's error when it has to be consulted and fails.
    pub fn with_source(
        templates: Vec<EventTemplate>,
        source: &dyn TemplateSource,
        config: GameConfig,
        registry: Arc<Registry>,
    ) -> Result<Self, EventError> {
        let templates = if templates.is_empty() {
            source.load_templates()?
        } else {
            templates
        };
        Ok(Self::new(templates, config, registry))
    }

    /// Registers a template. A template with the same name is replaced.
    pub fn register_template(&mut self, template: EventTemplate) {
        let key = template.name().to_lowercase();
        if self.templates.contains_key(&key) {
            warn!(event = template.name(), "duplicate event template, replacing");
        } else {
            self.order.push(key.clone());
        }
        self.templates.insert(key, Arc::new(template));
    }

    pub fn template(&self, name: &str) -> Option<&Arc<EventTemplate>> {
        self.templates.get(&name.to_lowercase())
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Template for `name`, falling back to the default event, then to the
    /// first registered template.
    fn resolve_template(&self, name: &str) -> Result<Arc<EventTemplate>, EventError> {
        if let Some(template) = self.template(name) {
            return Ok(Arc::clone(template));
        }
        let fallback = &self.config.default_event;
        if let Some(template) = self.template(fallback) {
            warn!(event = name, fallback = %fallback, "unknown event, using default");
            return Ok(Arc::clone(template));
        }
        let first = self
            .order
            .first()
            .and_then(|key| self.templates.get(key))
            .ok_or(EventError::NoTemplates)?;
        warn!(event = name, fallback = first.name(), "unknown event and default, using first template");
        Ok(Arc::clone(first))
    }

    fn spawn(&mut self, template: Arc<EventTemplate>, room: Option<RoomId>) -> InstanceId {
        let id = InstanceId(self.next_instance);
        self.next_instance += 1;
        debug!(instance = %id, event = template.name(), ?room, "event instance created");
        self.instances
            .insert(id, EventInstance::new(id, template, room));
        if let Some(room) = room {
            self.rooms.insert(room, id);
        }
        id
    }

    /// Frees the context of an instance nobody runs anymore, and the instance
    /// itself unless its room still points at it.
    fn release(&mut self, instance: InstanceId) {
        if self.runs.values().any(|run| run.instance == instance) {
            return;
        }
        self.contexts.remove(&instance);

        let bound = self
            .instances
            .get(&instance)
            .and_then(|inst| inst.room)
            .is_some_and(|room| self.rooms.get(&room) == Some(&instance));
        if !bound {
            self.instances.remove(&instance);
        }
    }

    // ===== queries =====

    /// Per-unit scoped form of `base`.
    pub fn scoped_key(&mut self, unit: UnitId, base: &str) -> String {
        self.scopes.key(unit, base)
    }

    pub fn is_in_active_event(&self, unit: UnitId) -> bool {
        self.runs.contains_key(&unit)
    }

    /// Name of the unit's active event.
    pub fn active_event(&self, unit: UnitId) -> Option<&str> {
        let run = self.runs.get(&unit)?;
        self.instances.get(&run.instance).map(EventInstance::name)
    }

    pub fn run_phase(&self, unit: UnitId) -> RunPhase {
        self.runs
            .get(&unit)
            .map_or(RunPhase::Idle, |run| run.phase)
    }

    pub fn awaiting(&self, unit: UnitId) -> Option<&Await> {
        self.runs.get(&unit)?.awaiting.as_ref()
    }

    pub fn context_for(&self, unit: UnitId) -> Option<&EventContext> {
        let run = self.runs.get(&unit)?;
        self.contexts.get(&run.instance)
    }

    /// Name of the event bound to `room`.
    pub fn room_event(&self, room: RoomId) -> Option<&str> {
        let id = self.rooms.get(&room)?;
        self.instances.get(id).map(EventInstance::name)
    }

    /// Runtime state of the event bound to `room`.
    pub fn room_state(&self, room: RoomId) -> Option<&InstanceState> {
        let id = self.rooms.get(&room)?;
        self.instances.get(id).map(|instance| &instance.state)
    }

    pub fn drain_notices(&mut self) -> Vec<EventNotice> {
        std::mem::take(&mut self.notices)
    }

    // ===== lifecycle =====

    /// Starts `event` for `unit` outside any room.
    ///
    /// # Errors
    ///
    /// Returns `EventError::MissingEvent` for an empty name,
    /// `EventError::AlreadyInEvent` when the unit has an active run and
    /// `EventError::NoTemplates` when nothing is registered.
    pub fn start_event(
        &mut self,
        unit: &mut UnitRecord,
        event: &str,
        env: GameEnv<'_>,
    ) -> Result<RunPhase, EventError> {
        if event.trim().is_empty() {
            warn!(unit = %unit.id, "start requested without an event");
            return Err(EventError::MissingEvent);
        }
        if self.runs.contains_key(&unit.id) {
            warn!(unit = %unit.id, event, "unit is already in an event");
            return Err(EventError::AlreadyInEvent(unit.id));
        }

        let template = self.resolve_template(event)?;
        let instance = self.spawn(template, None);
        self.begin(unit, instance, None, env)
    }

    /// Runs the event of `room` for a unit that just entered it.
    ///
    /// The room keeps its event across visits, including one it was
    /// transformed into; `event` is ignored then. A room without one gets
    /// `event` when given, otherwise an event from the assignment table.
    ///
    /// # Errors
    ///
    /// Returns `EventError::AlreadyInEvent` when the unit has an active run
    /// and `EventError::NoTemplates` when nothing is registered.
    pub fn handle_room_event(
        &mut self,
        unit: &mut UnitRecord,
        event: Option<&str>,
        room: RoomId,
        env: GameEnv<'_>,
    ) -> Result<RunPhase, EventError> {
        if self.runs.contains_key(&unit.id) {
            debug!(unit = %unit.id, %room, "room entered mid-event, ignored");
            return Err(EventError::AlreadyInEvent(unit.id));
        }

        let requested = event.map(str::trim).filter(|name| !name.is_empty());
        let existing = self
            .rooms
            .get(&room)
            .copied()
            .filter(|id| self.instances.contains_key(id));

        let instance = match existing {
            Some(id) => {
                if let Some(name) = requested
                    && let Some(bound) = self.instances.get(&id)
                    && !bound.name().eq_ignore_ascii_case(name)
                {
                    debug!(%room, requested = name, bound = bound.name(), "room keeps its event");
                }
                id
            }
            None => {
                let name = match requested {
                    Some(name) => name.to_owned(),
                    None => self.assign(unit.id, room, env),
                };
                let template = self.resolve_template(&name)?;
                self.spawn(template, Some(room))
            }
        };
        self.begin(unit, instance, Some(room), env)
    }

    /// Rolls an event for a fresh room.
    fn assign(&mut self, unit: UnitId, room: RoomId, env: GameEnv<'_>) -> String {
        self.nonce += 1;
        let rolled = env.rng().ok().and_then(|rng| {
            let category_seed = compute_seed(self.config.game_seed, self.nonce, unit.0, room.0);
            let event_seed =
                compute_seed(self.config.game_seed, self.nonce, unit.0, room.0 ^ 0x8000_0000);
            self.config
                .assignment
                .roll(rng, category_seed, event_seed)
                .map(str::to_owned)
        });

        match rolled {
            Some(name) => {
                debug!(unit = %unit, %room, event = %name, "room event assigned");
                name
            }
            None => {
                warn!(unit = %unit, %room, "room assignment failed, using default event");
                self.config.default_event.clone()
            }
        }
    }

    fn begin(
        &mut self,
        unit: &mut UnitRecord,
        instance: InstanceId,
        room: Option<RoomId>,
        env: GameEnv<'_>,
    ) -> Result<RunPhase, EventError> {
        let scope = self.scopes.scope_of(unit.id);
        self.runs.insert(unit.id, ActiveRun::new(instance));

        let floors = env.floors().ok();
        let room = room.or_else(|| floors.and_then(|floors| floors.current_room(unit.id)));
        let floor = floors.and_then(|floors| floors.current_floor(unit.id));
        let floor_number = floors
            .zip(floor)
            .and_then(|(floors, floor)| floors.floor_number(floor));
        let requirement = floors
            .zip(floor)
            .and_then(|(floors, floor)| floors.memoria_requirement(floor))
            .unwrap_or_else(|| {
                let fallback = self.config.fallback_memoria_requirement;
                warn!(unit = %unit.id, fallback, "no floor memoria requirement, using fallback");
                fallback
            });

        let memoria = unit.memoria();
        let context = self.contexts.entry(instance).or_default();
        context.publish(scope, keys::UNIT, unit.id);
        context.publish(scope, keys::UNIT_NAME, unit.name.as_str());
        context.publish(scope, keys::TOTAL_MEMORIA, memoria.total());
        context.publish(scope, keys::CURRENT_MEMORIA, memoria.current());
        context.publish(scope, keys::LEVEL, unit.level);
        if let Some(room) = room {
            context.publish(scope, keys::ROOM, room);
        }
        if let Some(floor) = floor {
            context.publish(scope, keys::FLOOR, floor);
        }
        if let Some(number) = floor_number {
            context.publish(scope, keys::FLOOR_NUMBER, number);
        }
        context.publish(scope, keys::MEMORIA_REQUIRED, requirement);

        let event = self
            .instances
            .get(&instance)
            .map(|inst| inst.name().to_owned())
            .unwrap_or_default();
        debug!(unit = %unit.id, event = %event, %instance, "event started");
        self.notices.push(EventNotice::Started {
            unit: unit.id,
            event,
        });

        self.process(unit, env)
    }

    /// Runs the unit's chain from its cursor and acts on what the steps left.
    fn process(&mut self, unit: &mut UnitRecord, env: GameEnv<'_>) -> Result<RunPhase, EventError> {
        let mut restarts = 0;

        loop {
            self.nonce += 1;
            let scope = self.scopes.scope_of(unit.id);
            let run = self
                .runs
                .get_mut(&unit.id)
                .ok_or(EventError::NotInEvent(unit.id))?;
            let Some(instance) = self.instances.get_mut(&run.instance) else {
                error!(unit = %unit.id, instance = %run.instance, "active run lost its instance");
                self.runs.remove(&unit.id);
                return Err(EventError::NotInEvent(unit.id));
            };
            let template = Arc::clone(&instance.template);
            let context = self.contexts.entry(run.instance).or_default();

            run.phase = RunPhase::Running;
            run.awaiting = None;
            run.messages = None;

            let mut ctx = StepContext::new(
                unit,
                context,
                &mut instance.state,
                env,
                &self.registry,
                &self.config,
                scope,
                self.nonce,
            );
            let outcome = template.chain().run(&mut ctx, &mut run.cursor);
            if outcome.is_finished() {
                template.chain().cleanup(&mut ctx);
            }
            let outbox = ctx.into_outbox();
            let cursor_success = run.cursor.success();

            let mut complete = None;
            let mut transform = None;
            for directive in outbox.directives {
                match directive {
                    Directive::StartBattle { enemy } => {
                        debug!(unit = %unit.id, enemy = %enemy.name, "battle requested");
                        self.notices.push(EventNotice::BattleRequested {
                            unit: unit.id,
                            enemy,
                        });
                    }
                    Directive::Complete { success } => {
                        complete.get_or_insert(success);
                    }
                    Directive::Transform { into, restart } => {
                        transform.get_or_insert((into, restart));
                    }
                }
            }

            if let Some((into, restart)) = transform {
                self.swap(unit.id, &into)?;
                self.flush(&outbox.messages, env);
                if restart && restarts < Self::MAX_RESTARTS {
                    restarts += 1;
                    continue;
                }
                if restart {
                    error!(unit = %unit.id, into = %into, "transformation loop, finishing event");
                    self.finish_event(unit.id, false)?;
                    return Ok(RunPhase::Completed);
                }
                self.finish_event(unit.id, complete.unwrap_or(cursor_success))?;
                return Ok(RunPhase::Completed);
            }

            let finished = match (complete, outcome) {
                (Some(success), _) => Some(success),
                (None, ChainOutcome::Completed { success })
                | (None, ChainOutcome::Halted { success, .. }) => Some(success),
                (None, ChainOutcome::Suspended { .. }) => None,
            };

            if let Some(success) = finished {
                self.flush(&outbox.messages, env);
                self.finish_event(unit.id, success)?;
                return Ok(RunPhase::Completed);
            }

            let Some(run) = self.runs.get_mut(&unit.id) else {
                return Err(EventError::NotInEvent(unit.id));
            };
            run.phase = RunPhase::Suspended;
            run.awaiting = outbox.awaiting;
            match run.awaiting {
                Some(Await::Messages) => {
                    let mut queue = MessageQueue::new(outbox.messages);
                    queue.begin(env.presentation().ok());
                    run.messages = Some(queue);
                }
                Some(_) => self.flush(&outbox.messages, env),
                None => {
                    warn!(unit = %unit.id, "event suspended without naming a signal");
                    self.flush(&outbox.messages, env);
                }
            }
            debug!(unit = %unit.id, awaiting = ?self.awaiting(unit.id), "event suspended");
            return Ok(RunPhase::Suspended);
        }
    }

    fn flush(&self, messages: &[QueuedMessage], env: GameEnv<'_>) {
        if messages.is_empty() {
            return;
        }
        match env.presentation() {
            Ok(sink) => messages.iter().for_each(|message| show(message, sink)),
            Err(err) => warn!(error = %err, count = messages.len(), "messages dropped"),
        }
    }

    /// Shows the timed messages of the unit's run that are still waiting.
    fn flush_pending(&mut self, unit: UnitId, env: GameEnv<'_>) {
        let Some(mut queue) = self
            .runs
            .get_mut(&unit)
            .and_then(|run| run.messages.take())
        else {
            return;
        };
        if queue.pending() > 0 {
            debug!(unit = %unit, count = queue.pending(), "resumed early, showing queued messages");
        }
        queue.flush(env.presentation().ok());
    }

    /// Moves the unit's run onto a fresh instance of `into`, bound to the
    /// same room, keeping the context.
    fn swap(&mut self, unit: UnitId, into: &str) -> Result<(), EventError> {
        let template = self.resolve_template(into)?;
        let run = self.runs.get(&unit).ok_or(EventError::NotInEvent(unit))?;
        let old = run.instance;
        let (from, room) = self
            .instances
            .get(&old)
            .map(|inst| (inst.name().to_owned(), inst.room))
            .unwrap_or_default();

        let new = self.spawn(template, room);
        let shared = self
            .runs
            .iter()
            .any(|(id, run)| *id != unit && run.instance == old);
        let context = if shared {
            self.contexts.get(&old).cloned()
        } else {
            self.contexts.remove(&old)
        };
        if let Some(context) = context {
            self.contexts.insert(new, context);
        }

        if let Some(run) = self.runs.get_mut(&unit) {
            run.instance = new;
            run.cursor.reset();
            run.awaiting = None;
            run.messages = None;
        }
        self.release(old);

        let into = self
            .instances
            .get(&new)
            .map(|inst| inst.name().to_owned())
            .unwrap_or_default();
        debug!(unit = %unit, from = %from, into = %into, "event transformed");
        self.notices
            .push(EventNotice::Transformed { unit, from, into });
        Ok(())
    }

    /// Replaces the unit's active event with `into` and runs it from the top.
    ///
    /// # Errors
    ///
    /// Returns `EventError::NotInEvent` when the unit has no active run.
    pub fn transform_event(
        &mut self,
        unit: &mut UnitRecord,
        into: &str,
        env: GameEnv<'_>,
    ) -> Result<RunPhase, EventError> {
        self.flush_pending(unit.id, env);
        self.swap(unit.id, into)?;
        self.process(unit, env)
    }

    /// Ends the unit's run and drops its scoped context entries.
    ///
    /// # Errors
    ///
    /// Returns `EventError::NotInEvent` when the unit has no active run; a
    /// second call for the same run is therefore a no-op.
    pub fn finish_event(&mut self, unit: UnitId, success: bool) -> Result<(), EventError> {
        let Some(run) = self.runs.remove(&unit) else {
            return Err(EventError::NotInEvent(unit));
        };

        let event = self
            .instances
            .get(&run.instance)
            .map(|inst| inst.name().to_owned())
            .unwrap_or_default();
        if let Some(scope) = self.scopes.get(unit)
            && let Some(context) = self.contexts.get_mut(&run.instance)
        {
            context.remove_prefix(&scope_prefix(scope));
        }
        self.release(run.instance);

        debug!(unit = %unit, event = %event, success, "event finished");
        self.notices.push(EventNotice::Finished {
            unit,
            event,
            success,
        });
        Ok(())
    }

    // ===== resumption =====

    /// Resumes a suspended run at the step after the one it waited on.
    ///
    /// # Errors
    ///
    /// Returns `EventError::NotInEvent` without a run and
    /// `EventError::NotAwaiting` when the run is not suspended.
    pub fn continue_processing(
        &mut self,
        unit: &mut UnitRecord,
        env: GameEnv<'_>,
    ) -> Result<RunPhase, EventError> {
        let run = self
            .runs
            .get(&unit.id)
            .ok_or(EventError::NotInEvent(unit.id))?;
        if run.phase != RunPhase::Suspended {
            return Err(EventError::NotAwaiting {
                unit: unit.id,
                signal: "a resume",
            });
        }
        self.flush_pending(unit.id, env);
        self.process(unit, env)
    }

    /// Records the player's pick and resumes the run.
    ///
    /// # Errors
    ///
    /// Returns `EventError::NotAwaiting` unless the run waits for a choice
    /// and `EventError::InvalidChoice` for an index out of range.
    pub fn submit_choice(
        &mut self,
        unit: &mut UnitRecord,
        index: usize,
        env: GameEnv<'_>,
    ) -> Result<RunPhase, EventError> {
        let scope = self.scopes.scope_of(unit.id);
        let run = self
            .runs
            .get(&unit.id)
            .ok_or(EventError::NotInEvent(unit.id))?;
        let Some(Await::Choice { options }) = &run.awaiting else {
            return Err(EventError::NotAwaiting {
                unit: unit.id,
                signal: "a choice",
            });
        };
        let Some(picked) = options.get(index).cloned() else {
            return Err(EventError::InvalidChoice {
                unit: unit.id,
                index,
                options: options.len(),
            });
        };

        let context = self.contexts.entry(run.instance).or_default();
        context.publish(scope, keys::PLAYER_CHOICE, picked.as_str());
        context.publish(scope, keys::PLAYER_CHOICE_INDEX, index as i64);
        unit.event_state = EventSubState::Idle;
        debug!(unit = %unit.id, index, choice = %picked, "choice submitted");

        self.process(unit, env)
    }

    /// Records a battle result and resumes the run that started it.
    ///
    /// # Errors
    ///
    /// Returns `EventError::NotAwaiting` unless the run waits for a battle.
    pub fn resolve_battle(
        &mut self,
        unit: &mut UnitRecord,
        won: bool,
        env: GameEnv<'_>,
    ) -> Result<RunPhase, EventError> {
        let scope = self.scopes.scope_of(unit.id);
        let run = self
            .runs
            .get(&unit.id)
            .ok_or(EventError::NotInEvent(unit.id))?;
        if run.awaiting != Some(Await::Battle) {
            return Err(EventError::NotAwaiting {
                unit: unit.id,
                signal: "a battle",
            });
        }

        let context = self.contexts.entry(run.instance).or_default();
        context.publish(scope, keys::BATTLE_WON, won);
        debug!(unit = %unit.id, won, "battle result received");

        self.process(unit, env)
    }

    /// Advances queued messages by `dt` seconds.
    ///
    /// Returns the units whose messages have all been shown; they are ready
    /// for [`continue_processing`](Self::continue_processing).
    pub fn tick(&mut self, dt: f32, env: GameEnv<'_>) -> Vec<UnitId> {
        let sink = env.presentation().ok();
        let mut ready = Vec::new();
        for (unit, run) in &mut self.runs {
            let Some(queue) = run.messages.as_mut() else {
                continue;
            };
            if queue.advance(dt, sink) {
                run.messages = None;
                ready.push(*unit);
            }
        }
        ready.sort();
        ready
    }

    /// Value of `key` for `unit` in its active event.
    pub fn lookup(&self, unit: UnitId, key: &str) -> Option<&ContextValue> {
        let scope = self.scopes.get(unit)?;
        self.context_for(unit)?.lookup(scope, key)
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("templates", &self.order)
            .field("instances", &self.instances.len())
            .field("runs", &self.runs.len())
            .finish()
    }
}
