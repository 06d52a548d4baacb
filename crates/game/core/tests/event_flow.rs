//! Event manager runs against in-memory oracles.

use std::sync::{Arc, Mutex};

use game_core::event::behavior::{
    Branches, Choice, Comparator, Comparison, CompleteEvent, EncounterEntry, LootChest, LootEntry,
    MemoriaChange, MemoriaCheck, MemoriaKind, MemoriaOperation, MemoriaTarget, MessageLine,
    MessageStep, Operand, ResolveEncounter, StartEncounter, StateChange,
};
use game_core::event::{EventCategory, InstanceState, keys};
use game_core::{
    Attributes, Await, BattleSystem, ContextValue, EnemyFactory, EnemyTemplate, Env, EventError,
    EventManager, EventNotice, EventSubState, EventTemplate, FloorId, FloorOracle, GameConfig,
    GameEnv, MainState, OracleError, PcgRng, PresentationSink, Registry, RoomId, RunPhase, UnitId,
    UnitRecord,
};

struct Floors {
    requirement: Option<i32>,
}

impl FloorOracle for Floors {
    fn memoria_requirement(&self, _floor: FloorId) -> Option<i32> {
        self.requirement
    }

    fn floor_number(&self, floor: FloorId) -> Option<u32> {
        Some(floor.0 + 1)
    }

    fn current_room(&self, _unit: UnitId) -> Option<RoomId> {
        None
    }

    fn current_floor(&self, _unit: UnitId) -> Option<FloorId> {
        Some(FloorId(0))
    }
}

#[derive(Default)]
struct Screen {
    lines: Mutex<Vec<String>>,
}

impl Screen {
    fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }
}

impl PresentationSink for Screen {
    fn display_message(&self, text: &str, _color: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(text.to_owned());
        }
    }

    fn update_health_display(&self, _current: i32, _max: i32) {}

    fn update_memoria_display(&self, _current: i32, _total: i32, _is_gain: bool) {}
}

struct Bestiary;

impl EnemyFactory for Bestiary {
    fn create_enemy(&self, template: &str, level: Option<u32>) -> Result<UnitRecord, OracleError> {
        match template {
            "Slime" => Ok(EnemyTemplate::new("Slime", 30, Attributes::uniform(1))
                .instantiate(UnitId(900), level)),
            other => Err(OracleError::EnemyTemplateNotFound(other.to_owned())),
        }
    }
}

struct Oracles {
    floors: Floors,
    screen: Screen,
    bestiary: Bestiary,
    rng: PcgRng,
}

impl Oracles {
    fn new(requirement: Option<i32>) -> Self {
        Self {
            floors: Floors { requirement },
            screen: Screen::default(),
            bestiary: Bestiary,
            rng: PcgRng,
        }
    }

    fn env(&self) -> GameEnv<'_> {
        Env::with_all(&self.floors, &self.screen, &self.bestiary, &self.rng).into_game_env()
    }
}

fn player(memoria: i32, total: i32) -> UnitRecord {
    UnitRecord::new(UnitId(1), "Aria", Attributes::uniform(2), 100).with_memoria(memoria, total)
}

fn quartz() -> EventTemplate {
    EventTemplate::new(
        "Quartz",
        EventCategory::default(),
        vec![Box::new(MessageStep::text("Nothing but quartz."))],
    )
}

fn manager(templates: Vec<EventTemplate>) -> EventManager {
    let config = GameConfig::default();
    let registry = Arc::new(Registry::with_stagger(&config.stagger_effect));
    EventManager::new(templates, config, registry)
}

fn loot_left(state: Option<&InstanceState>) -> Option<usize> {
    state?.loot.get("loot").map(Vec::len)
}

fn single_coin_gold() -> EventTemplate {
    EventTemplate::new(
        "Gold",
        EventCategory::default(),
        vec![Box::new(LootChest::new(vec![LootEntry::new("coins", 1, 1, 10)]))],
    )
}

fn text(value: &str) -> ContextValue {
    ContextValue::Text(value.to_owned())
}

#[test]
fn memoria_check_reads_the_floor_requirement() {
    let oracles = Oracles::new(Some(100));
    let check = EventTemplate::new(
        "Gate",
        EventCategory::default(),
        vec![
            Box::new(MemoriaCheck::new(MemoriaKind::Total, Comparison::GreaterOrEqual)),
            Box::new(Choice::default()),
        ],
    );
    let mut manager = manager(vec![quartz(), check]);
    let mut unit = player(10, 120);

    let phase = manager.start_event(&mut unit, "Gate", oracles.env());
    assert_eq!(phase, Ok(RunPhase::Suspended));

    assert_eq!(
        manager.lookup(unit.id, keys::MEMORIA_CHECK_PASSED),
        Some(&ContextValue::Bool(true))
    );
    assert_eq!(
        manager.lookup(unit.id, keys::MEMORIA_CHECK_FAILED),
        Some(&ContextValue::Bool(false))
    );
    assert_eq!(
        manager.lookup(unit.id, keys::REQUIRED_MEMORIA),
        Some(&ContextValue::Int(100))
    );
}

#[test]
fn depleted_loot_table_turns_into_the_default_event() {
    let oracles = Oracles::new(Some(100));
    let mut manager = manager(vec![quartz(), single_coin_gold()]);
    let mut unit = player(0, 0);
    let room = RoomId(7);

    let phase = manager.handle_room_event(&mut unit, Some("Gold"), room, oracles.env());
    assert_eq!(phase, Ok(RunPhase::Completed));
    assert_eq!(unit.memoria().current(), 10);
    assert_eq!(manager.room_event(room), Some("Gold"));
    assert_eq!(loot_left(manager.room_state(room)), Some(0));

    let phase = manager.handle_room_event(&mut unit, None, room, oracles.env());
    assert_eq!(phase, Ok(RunPhase::Completed));
    assert_eq!(manager.room_event(room), Some("Quartz"));
    assert_eq!(unit.memoria().current(), 10);
    assert!(!manager.is_in_active_event(unit.id));

    let transformed = manager.drain_notices().into_iter().any(|notice| {
        matches!(
            notice,
            EventNotice::Transformed { ref from, ref into, .. } if from == "Gold" && into == "Quartz"
        )
    });
    assert!(transformed);
    assert!(oracles.screen.lines().iter().any(|line| line == "Nothing but quartz."));
}

#[test]
fn finishing_twice_is_a_no_op() {
    let oracles = Oracles::new(None);
    let waiting = EventTemplate::new(
        "Waiting",
        EventCategory::default(),
        vec![Box::new(Choice::default())],
    );
    let mut manager = manager(vec![quartz(), waiting]);
    let mut unit = player(0, 0);

    manager
        .start_event(&mut unit, "Waiting", oracles.env())
        .expect("event starts");
    assert!(manager.is_in_active_event(unit.id));

    assert_eq!(manager.finish_event(unit.id, true), Ok(()));
    assert_eq!(
        manager.finish_event(unit.id, true),
        Err(EventError::NotInEvent(unit.id))
    );

    let finished = manager
        .drain_notices()
        .into_iter()
        .filter(|notice| matches!(notice, EventNotice::Finished { .. }))
        .count();
    assert_eq!(finished, 1);
}

#[test]
fn choice_index_drives_a_comparator_branch() {
    let oracles = Oracles::new(None);
    let fork = EventTemplate::new(
        "Fork",
        EventCategory::default(),
        vec![
            Box::new(Choice::default()),
            Box::new(
                Comparator::new(
                    keys::PLAYER_CHOICE_INDEX,
                    Comparison::Equals,
                    Operand::Value("0".to_owned()),
                )
                .with_branches(Branches::new(
                    vec![Box::new(MessageStep::text("You said yes."))],
                    vec![Box::new(CompleteEvent { success: false })],
                ))
                .blocking(true),
            ),
        ],
    );
    let mut manager = manager(vec![quartz(), fork]);
    let mut unit = player(0, 0);

    let phase = manager.start_event(&mut unit, "Fork", oracles.env());
    assert_eq!(phase, Ok(RunPhase::Suspended));
    assert!(matches!(
        manager.awaiting(unit.id),
        Some(Await::Choice { options }) if options.len() == 2
    ));

    assert!(matches!(
        manager.submit_choice(&mut unit, 5, oracles.env()),
        Err(EventError::InvalidChoice { index: 5, .. })
    ));

    let phase = manager.submit_choice(&mut unit, 0, oracles.env());
    assert_eq!(phase, Ok(RunPhase::Completed));
    assert!(oracles.screen.lines().iter().any(|line| line == "You said yes."));
}

#[test]
fn encounter_waits_for_the_battle_result() {
    let oracles = Oracles::new(None);
    let encounter = EventTemplate::new(
        "Copper",
        EventCategory::default(),
        vec![
            Box::new(StartEncounter::new(vec![EncounterEntry::new("Slime", 1)])),
            Box::new(ResolveEncounter::default()),
            Box::new(MessageStep::text("{EnemyName} falls.")),
        ],
    );
    let mut manager = manager(vec![quartz(), encounter]);
    let mut unit = player(0, 0);

    let phase = manager.start_event(&mut unit, "Copper", oracles.env());
    assert_eq!(phase, Ok(RunPhase::Suspended));
    assert_eq!(manager.awaiting(unit.id), Some(&Await::Battle));

    let requested = manager.drain_notices().into_iter().find_map(|notice| match notice {
        EventNotice::BattleRequested { enemy, .. } => Some(enemy),
        _ => None,
    });
    let enemy = requested.expect("battle requested");
    assert_eq!(enemy.name, "Slime");

    let mut battles = BattleSystem::new(
        manager.config().clone(),
        Arc::new(Registry::with_stagger(&manager.config().stagger_effect)),
    );
    let outcome = match battles
        .start_battle(&mut unit, *enemy, oracles.env())
        .expect("battle starts")
    {
        Some(outcome) => outcome,
        None => battles.resolve(&mut unit, oracles.env()).expect("battle ends"),
    };

    assert!(outcome.won);
    assert!(outcome.reward >= 0);

    let phase = manager.resolve_battle(&mut unit, outcome.won, oracles.env());
    assert_eq!(phase, Ok(RunPhase::Completed));
    assert!(oracles.screen.lines().iter().any(|line| line == "Slime falls."));
}

#[test]
fn timed_messages_hold_the_event_until_shown() {
    let oracles = Oracles::new(None);
    let story = EventTemplate::new(
        "Story",
        EventCategory::default(),
        vec![
            Box::new(MessageStep::text("First.").timed()),
            Box::new(MessageStep::text("Second.")),
        ],
    );
    let mut manager = manager(vec![quartz(), story]);
    let mut unit = player(0, 0);

    let phase = manager.start_event(&mut unit, "Story", oracles.env());
    assert_eq!(phase, Ok(RunPhase::Suspended));
    assert_eq!(manager.awaiting(unit.id), Some(&Await::Messages));

    let duration = manager.config().message_duration;
    assert!(manager.tick(duration / 2.0, oracles.env()).is_empty());
    let ready = manager.tick(duration, oracles.env());
    assert_eq!(ready, vec![unit.id]);

    let phase = manager.continue_processing(&mut unit, oracles.env());
    assert_eq!(phase, Ok(RunPhase::Completed));
    assert_eq!(oracles.screen.lines(), vec!["First.", "Second."]);
}

#[test]
fn unknown_event_falls_back_to_the_default() {
    let oracles = Oracles::new(None);
    let mut manager = manager(vec![quartz()]);
    let mut unit = player(0, 0);

    let phase = manager.start_event(&mut unit, "Obsidian", oracles.env());
    assert_eq!(phase, Ok(RunPhase::Completed));
    assert!(oracles.screen.lines().iter().any(|line| line == "Nothing but quartz."));

    let mut empty = manager_without_templates();
    assert_eq!(
        empty.start_event(&mut unit, "Quartz", oracles.env()),
        Err(EventError::NoTemplates)
    );
}

fn manager_without_templates() -> EventManager {
    manager(Vec::new())
}

#[test]
fn transformed_room_keeps_its_new_event_when_revisited() {
    let oracles = Oracles::new(None);
    let mut manager = manager(vec![quartz(), single_coin_gold()]);
    let mut unit = player(0, 0);
    let room = RoomId(4);

    manager
        .handle_room_event(&mut unit, Some("Gold"), room, oracles.env())
        .expect("chest opens");
    manager
        .handle_room_event(&mut unit, None, room, oracles.env())
        .expect("empty chest transforms");
    assert_eq!(manager.room_event(room), Some("Quartz"));

    let phase = manager.handle_room_event(&mut unit, Some("Gold"), room, oracles.env());
    assert_eq!(phase, Ok(RunPhase::Completed));
    assert_eq!(manager.room_event(room), Some("Quartz"));
    assert_eq!(unit.memoria().current(), 10);
}

#[test]
fn memoria_change_clamps_at_zero_and_honours_its_gate() {
    let oracles = Oracles::new(None);
    let tithe = EventTemplate::new(
        "Tithe",
        EventCategory::default(),
        vec![
            Box::new(MemoriaChange::new(
                MemoriaOperation::Subtract,
                MemoriaTarget::Current,
                50,
            )),
            Box::new(MemoriaChange::new(MemoriaOperation::Add, MemoriaTarget::Current, 5).when("Blessed")),
            Box::new(MemoriaChange::new(MemoriaOperation::Add, MemoriaTarget::Current, 7).unless("Blessed")),
            Box::new(Choice::default()),
        ],
    );
    let mut manager = manager(vec![quartz(), tithe]);
    let mut unit = player(20, 40);

    let phase = manager.start_event(&mut unit, "Tithe", oracles.env());
    assert_eq!(phase, Ok(RunPhase::Suspended));

    assert_eq!(unit.memoria().current(), 7);
    assert_eq!(unit.memoria().total(), 40);
    assert_eq!(
        manager.lookup(unit.id, keys::LAST_MEMORIA_SUBTRACTED),
        Some(&ContextValue::Int(20))
    );
    assert_eq!(
        manager.lookup(unit.id, keys::LAST_MEMORIA_ADDED),
        Some(&ContextValue::Int(7))
    );
}

#[test]
fn choice_publishes_text_and_index_and_state_change_reverts() {
    let oracles = Oracles::new(None);
    let crossroads = EventTemplate::new(
        "Crossroads",
        EventCategory::default(),
        vec![
            Box::new(StateChange::enter(MainState::InEvent, EventSubState::Idle)),
            Box::new(Choice::new(vec![
                "Left".to_owned(),
                "Right".to_owned(),
                "Back".to_owned(),
            ])),
            Box::new(StateChange::revert()),
            Box::new(Choice::default()),
        ],
    );
    let mut manager = manager(vec![quartz(), crossroads]);
    let mut unit = player(0, 0);

    let phase = manager.start_event(&mut unit, "Crossroads", oracles.env());
    assert_eq!(phase, Ok(RunPhase::Suspended));
    assert_eq!(unit.main_state, MainState::InEvent);
    assert_eq!(unit.event_state, EventSubState::Choosing);
    assert_eq!(
        manager.lookup(unit.id, keys::PREVIOUS_MAIN_STATE),
        Some(&text("idle"))
    );

    let phase = manager.submit_choice(&mut unit, 1, oracles.env());
    assert_eq!(phase, Ok(RunPhase::Suspended));
    assert_eq!(manager.lookup(unit.id, keys::PLAYER_CHOICE), Some(&text("Right")));
    assert_eq!(
        manager.lookup(unit.id, keys::PLAYER_CHOICE_INDEX),
        Some(&ContextValue::Int(1))
    );
    assert_eq!(unit.main_state, MainState::Idle);
}

#[test]
fn busy_units_cannot_enter_rooms_or_resume_without_a_run() {
    let oracles = Oracles::new(None);
    let waiting = EventTemplate::new(
        "Waiting",
        EventCategory::default(),
        vec![Box::new(Choice::default())],
    );
    let mut manager = manager(vec![quartz(), waiting]);
    let mut unit = player(0, 0);

    assert_eq!(
        manager.continue_processing(&mut unit, oracles.env()),
        Err(EventError::NotInEvent(unit.id))
    );

    manager
        .start_event(&mut unit, "Waiting", oracles.env())
        .expect("event starts");
    assert_eq!(
        manager.handle_room_event(&mut unit, Some("Quartz"), RoomId(2), oracles.env()),
        Err(EventError::AlreadyInEvent(unit.id))
    );
    assert_eq!(manager.room_event(RoomId(2)), None);
    assert_eq!(manager.active_event(unit.id), Some("Waiting"));
}

#[test]
fn resuming_early_shows_the_queued_messages() {
    let oracles = Oracles::new(None);
    let story = EventTemplate::new(
        "Story",
        EventCategory::default(),
        vec![
            Box::new(
                MessageStep::new(vec![
                    MessageLine::new("One."),
                    MessageLine::new("Two."),
                    MessageLine::new("Three."),
                ])
                .timed(),
            ),
            Box::new(MessageStep::text("Done.")),
        ],
    );
    let mut manager = manager(vec![quartz(), story]);
    let mut unit = player(0, 0);

    manager
        .start_event(&mut unit, "Story", oracles.env())
        .expect("event starts");
    assert_eq!(oracles.screen.lines(), vec!["One."]);

    let phase = manager.continue_processing(&mut unit, oracles.env());
    assert_eq!(phase, Ok(RunPhase::Completed));
    assert_eq!(oracles.screen.lines(), vec!["One.", "Two.", "Three.", "Done."]);
}

#[test]
fn waiting_step_ends_its_branch() {
    let oracles = Oracles::new(None);
    let omen = EventTemplate::new(
        "Omen",
        EventCategory::default(),
        vec![Box::new(
            Comparator::new(
                keys::LEVEL,
                Comparison::GreaterOrEqual,
                Operand::Value("1".to_owned()),
            )
            .with_branches(Branches::new(
                vec![
                    Box::new(MessageStep::text("The air grows cold.").timed()),
                    Box::new(MessageStep::text("Too soon.")),
                ],
                Vec::new(),
            ))
            .blocking(true),
        )],
    );
    let mut manager = manager(vec![quartz(), omen]);
    let mut unit = player(0, 0);

    let phase = manager.start_event(&mut unit, "Omen", oracles.env());
    assert_eq!(phase, Ok(RunPhase::Suspended));
    assert_eq!(manager.awaiting(unit.id), Some(&Await::Messages));
    assert_eq!(oracles.screen.lines(), vec!["The air grows cold."]);
}
