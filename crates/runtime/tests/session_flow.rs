//! Sessions driving events and battles end to end.

use game_content::ContentFactory;
use game_core::event::behavior::{EncounterEntry, MessageStep, ResolveEncounter, StartEncounter};
use game_core::event::EventCategory;
use game_core::{
    Attributes, Await, BattleState, EnemyTemplate, EventTemplate, FloorId, RoomId, RunPhase,
    UnitId, UnitRecord,
};
use runtime::{
    BattleEvent, BattlePacing, EnemyCatalog, Event, FloorInfo, FloorLayout, GameSession,
    LifecycleEvent, PresentationEvent, RuntimeError, Topic,
};
use tokio::sync::broadcast::Receiver;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn drain(rx: &mut Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn player(id: u32, memoria: i32) -> UnitRecord {
    UnitRecord::new(UnitId(id), "Aria", Attributes::uniform(2), 100).with_memoria(memoria, memoria)
}

fn quartz() -> EventTemplate {
    EventTemplate::new(
        "Quartz",
        EventCategory::default(),
        vec![Box::new(MessageStep::text("Nothing but quartz."))],
    )
}

fn ambush() -> EventTemplate {
    EventTemplate::new(
        "Ambush",
        EventCategory::default(),
        vec![
            Box::new(StartEncounter::new(vec![EncounterEntry::new("Slime", 1)])),
            Box::new(ResolveEncounter::default()),
            Box::new(MessageStep::text("{EnemyName} falls.")),
        ],
    )
}

fn session(pacing: BattlePacing) -> GameSession {
    GameSession::builder()
        .templates(vec![quartz(), ambush()])
        .enemies(EnemyCatalog::from_templates([EnemyTemplate::new(
            "Slime",
            30,
            Attributes::uniform(1),
        )]))
        .floors(FloorLayout::new().with_floor(FloorId(0), FloorInfo::new(1, Some(100))))
        .pacing(pacing)
        .build()
        .expect("session builds")
}

#[test]
fn arte_kill_spends_memoria_and_skips_the_turn_loop() {
    init_tracing();
    let mut session = session(BattlePacing::Instant);
    let mut battles = session.subscribe(Topic::Battle);
    session.add_unit(player(1, 50)).expect("unit joins");

    let phase = session.start_event(UnitId(1), "Ambush");
    assert_eq!(phase.ok(), Some(RunPhase::Completed));

    let events = drain(&mut battles);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        Event::Battle(BattleEvent::Completed {
            won: true,
            arte_cost: Some(30),
            turns: 0,
            reward: 0,
            ..
        })
    ));

    let unit = session.unit(UnitId(1)).expect("unit present");
    assert_eq!(unit.memoria().current(), 20);
    assert!(
        session
            .oracles()
            .presentation()
            .lines()
            .iter()
            .any(|line| line == "Slime falls.")
    );
}

#[test]
fn instant_battle_resumes_the_encounter_event() {
    init_tracing();
    let mut session = session(BattlePacing::Instant);
    let mut battles = session.subscribe(Topic::Battle);
    let mut lifecycle = session.subscribe(Topic::Lifecycle);
    session.add_unit(player(1, 0)).expect("unit joins");

    let phase = session.start_event(UnitId(1), "Ambush");
    assert_eq!(phase.ok(), Some(RunPhase::Completed));
    assert!(session.battle_state().is_none());

    let events = drain(&mut battles);
    assert!(matches!(
        events.first(),
        Some(Event::Battle(BattleEvent::Started { enemy, .. })) if enemy == "Slime"
    ));
    assert!(matches!(
        events.last(),
        Some(Event::Battle(BattleEvent::Completed { won: true, arte_cost: None, turns, .. })) if *turns > 0
    ));

    let finished = drain(&mut lifecycle).into_iter().any(|event| {
        matches!(
            event,
            Event::Lifecycle(LifecycleEvent::Finished { ref event, success: true, .. }) if event == "Ambush"
        )
    });
    assert!(finished);
}

#[test]
fn paced_battle_advances_with_ticks() {
    init_tracing();
    let mut session = session(BattlePacing::Paced);
    session.add_unit(player(1, 0)).expect("unit joins");

    let phase = session.start_event(UnitId(1), "Ambush");
    assert_eq!(phase.ok(), Some(RunPhase::Suspended));
    assert_eq!(session.awaiting(UnitId(1)), Some(&Await::Battle));
    assert_eq!(session.battle_state(), Some(BattleState::Start));

    session.tick(0.5).expect("tick");
    assert_eq!(session.battle_state(), Some(BattleState::Start));

    session.tick(1_000.0).expect("tick");
    assert!(session.battle_state().is_none());
    assert!(!session.events().is_in_active_event(UnitId(1)));
    assert_eq!(session.run_phase(UnitId(1)), RunPhase::Idle);
}

#[test]
fn second_battle_is_rejected_and_counts_as_lost() {
    init_tracing();
    let mut session = session(BattlePacing::Paced);
    let mut battles = session.subscribe(Topic::Battle);
    let mut lifecycle = session.subscribe(Topic::Lifecycle);
    session.add_unit(player(1, 0)).expect("unit joins");
    session.add_unit(player(2, 0)).expect("unit joins");

    session.start_event(UnitId(1), "Ambush").expect("first event");
    let phase = session.start_event(UnitId(2), "Ambush");
    assert_eq!(phase.ok(), Some(RunPhase::Completed));

    let rejected = drain(&mut battles).into_iter().any(|event| {
        matches!(event, Event::Battle(BattleEvent::Rejected { player, .. }) if player == UnitId(2))
    });
    assert!(rejected);

    let lost = drain(&mut lifecycle).into_iter().any(|event| {
        matches!(
            event,
            Event::Lifecycle(LifecycleEvent::Finished { unit, success: false, .. }) if unit == UnitId(2)
        )
    });
    assert!(lost);
    assert!(session.events().is_in_active_event(UnitId(1)));
}

#[test]
fn roster_guards_unknown_and_busy_units() {
    let mut session = session(BattlePacing::Paced);

    assert!(matches!(
        session.start_event(UnitId(9), "Quartz"),
        Err(RuntimeError::UnknownUnit(UnitId(9)))
    ));

    session.add_unit(player(1, 0)).expect("unit joins");
    assert!(matches!(
        session.add_unit(player(1, 0)),
        Err(RuntimeError::DuplicateUnit(UnitId(1)))
    ));

    session.start_event(UnitId(1), "Ambush").expect("event starts");
    assert!(session.remove_unit(UnitId(1)).is_err());

    session.tick(1_000.0).expect("tick");
    let removed = session.remove_unit(UnitId(1)).expect("idle unit leaves");
    assert_eq!(removed.id, UnitId(1));
    assert!(session.unit(UnitId(1)).is_none());
}

#[test]
fn entering_a_room_places_the_unit() {
    let mut session = session(BattlePacing::Instant);
    session.add_unit(player(1, 0)).expect("unit joins");

    let phase = session.enter_room(UnitId(1), FloorId(0), RoomId(3), Some("Quartz"));
    assert_eq!(phase.ok(), Some(RunPhase::Completed));

    assert_eq!(
        session.oracles().floors().position(UnitId(1)),
        Some((FloorId(0), RoomId(3)))
    );
    assert_eq!(session.events().room_event(RoomId(3)), Some("Quartz"));
}

#[test]
fn bundled_gold_room_draws_from_its_chest() {
    init_tracing();
    let factory = ContentFactory::bundled();
    let mut session = GameSession::builder()
        .content(&factory)
        .expect("bundled content loads")
        .floors(FloorLayout::linear(3, 100))
        .build()
        .expect("session builds");
    let mut lifecycle = session.subscribe(Topic::Lifecycle);
    let mut screen = session.subscribe(Topic::Presentation);
    session.add_unit(player(1, 0)).expect("unit joins");

    let room = RoomId(1);
    let phase = session.enter_room(UnitId(1), FloorId(0), room, Some("Gold"));
    assert_eq!(phase.ok(), Some(RunPhase::Suspended));
    assert_eq!(session.awaiting(UnitId(1)), Some(&Await::Messages));

    for _ in 0..10 {
        if !session.events().is_in_active_event(UnitId(1)) {
            break;
        }
        session.tick(10.0).expect("tick");
    }
    assert!(!session.events().is_in_active_event(UnitId(1)));

    let remaining: u32 = session
        .events()
        .room_state(room)
        .and_then(|state| state.loot.get("loot"))
        .map(|table| table.iter().map(|entry| entry.remaining).sum())
        .unwrap_or_default();
    assert_eq!(remaining, 29);

    let lifecycle = drain(&mut lifecycle);
    assert!(matches!(
        lifecycle.first(),
        Some(Event::Lifecycle(LifecycleEvent::Started { event, .. })) if event == "Gold"
    ));
    assert!(matches!(
        lifecycle.last(),
        Some(Event::Lifecycle(LifecycleEvent::Finished { event, .. })) if event == "Gold"
    ));

    let shown = drain(&mut screen).into_iter().any(|event| {
        matches!(
            event,
            Event::Presentation(PresentationEvent::Message { ref color, .. }) if color == "gold"
        )
    });
    assert!(shown);
}

const CONFIG: &str = r#"
default_event = "Quartz"
message_duration = 0.5
"#;

const MANIFEST: &str = r#"(
    events: [
        (name: "Quartz", steps: [Message((lines: [(text: "Dust and quartz.")]))]),
        (name: "Shrine", category: GoodOmen, steps: [
            MemoriaChange((operation: Add, target: Total, amount: 10)),
        ]),
    ],
    ailments: [
        (name: "Staggered", duration: 1, flags: "BLOCKS_ACTIONS | VULNERABLE", on_remove: [ResetStance]),
    ],
    enemies: [(name: "Rat", max_health: 20, attributes: (aggressiveness: 2), memoria: 5)],
)"#;

#[test]
fn content_directory_feeds_the_session_and_rooms_keep_their_event() {
    init_tracing();
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("config.toml"), CONFIG).expect("config written");
    std::fs::write(dir.path().join("manifest.ron"), MANIFEST).expect("manifest written");

    let factory = ContentFactory::new(dir.path());
    let mut session = GameSession::builder()
        .content(&factory)
        .expect("content loads")
        .floors(FloorLayout::linear(1, 100))
        .build()
        .expect("session builds");
    assert_eq!(session.config().game.message_duration, 0.5);
    assert_eq!(session.oracles().enemies().len(), 1);
    session.add_unit(player(1, 0)).expect("unit joins");

    let phase = session.start_event(UnitId(1), "Shrine");
    assert_eq!(phase.ok(), Some(RunPhase::Completed));
    assert_eq!(session.unit(UnitId(1)).map(|unit| unit.memoria().total()), Some(10));

    let room = RoomId(5);
    session
        .enter_room(UnitId(1), FloorId(0), room, Some("Quartz"))
        .expect("quiet room");
    session
        .enter_room(UnitId(1), FloorId(0), room, Some("Shrine"))
        .expect("room revisited");
    assert_eq!(session.events().room_event(room), Some("Quartz"));
    assert_eq!(session.unit(UnitId(1)).map(|unit| unit.memoria().total()), Some(10));
}

#[tokio::test]
async fn subscribers_see_lifecycle_events_as_they_happen() {
    let mut session = session(BattlePacing::Instant);
    let mut lifecycle = session.subscribe(Topic::Lifecycle);
    session.add_unit(player(1, 0)).expect("unit joins");

    session.start_event(UnitId(1), "Quartz").expect("event runs");

    let started = lifecycle.recv().await.expect("started event");
    assert_eq!(
        started,
        Event::Lifecycle(LifecycleEvent::Started {
            unit: UnitId(1),
            event: "Quartz".to_owned(),
        })
    );
    let finished = lifecycle.recv().await.expect("finished event");
    assert!(matches!(
        finished,
        Event::Lifecycle(LifecycleEvent::Finished { success: true, .. })
    ));
}
