//! Dungeon layout served through [`game_core::FloorOracle`].
use game_core::{FloorId, FloorOracle, RoomId, UnitId};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::warn;

/// Static facts about one floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorInfo {
    /// One-based depth.
    pub number: u32,
    /// Memoria needed to leave; `None` lets the configured fallback apply.
    pub memoria_requirement: Option<i32>,
}

impl FloorInfo {
    pub fn new(number: u32, memoria_requirement: Option<i32>) -> Self {
        Self {
            number,
            memoria_requirement,
        }
    }
}

/// FloorOracle implementation with static floors and tracked positions
///
/// The floors never change during a session. Unit positions move as the
/// session places units into rooms.
#[derive(Debug, Default)]
pub struct FloorLayout {
    floors: HashMap<FloorId, FloorInfo>,
    positions: RwLock<HashMap<UnitId, (FloorId, RoomId)>>,
}

impl FloorLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a floor
    pub fn add_floor(&mut self, floor: FloorId, info: FloorInfo) {
        self.floors.insert(floor, info);
    }

    pub fn with_floor(mut self, floor: FloorId, info: FloorInfo) -> Self {
        self.add_floor(floor, info);
        self
    }

    /// Creates `count` floors numbered from one whose requirement grows by
    /// `step` memoria per floor.
    pub fn linear(count: u32, step: i32) -> Self {
        let mut layout = Self::new();
        for index in 0..count {
            let number = index + 1;
            let requirement = step.saturating_mul(i32::try_from(number).unwrap_or(i32::MAX));
            layout.add_floor(FloorId(index), FloorInfo::new(number, Some(requirement)));
        }
        layout
    }

    pub fn floor(&self, floor: FloorId) -> Option<FloorInfo> {
        self.floors.get(&floor).copied()
    }

    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    /// Moves `unit` into `room` on `floor`.
    pub fn place(&self, unit: UnitId, floor: FloorId, room: RoomId) {
        match self.positions.write() {
            Ok(mut positions) => {
                positions.insert(unit, (floor, room));
            }
            Err(_) => warn!(%unit, %floor, %room, "unit positions poisoned, placement dropped"),
        }
    }

    /// Forgets where `unit` stands.
    pub fn remove(&self, unit: UnitId) {
        if let Ok(mut positions) = self.positions.write() {
            positions.remove(&unit);
        }
    }

    pub fn position(&self, unit: UnitId) -> Option<(FloorId, RoomId)> {
        self.positions.read().ok()?.get(&unit).copied()
    }
}

impl FloorOracle for FloorLayout {
    fn memoria_requirement(&self, floor: FloorId) -> Option<i32> {
        self.floors.get(&floor)?.memoria_requirement
    }

    fn floor_number(&self, floor: FloorId) -> Option<u32> {
        self.floors.get(&floor).map(|info| info.number)
    }

    fn current_room(&self, unit: UnitId) -> Option<RoomId> {
        self.position(unit).map(|(_, room)| room)
    }

    fn current_floor(&self, unit: UnitId) -> Option<FloorId> {
        self.position(unit).map(|(floor, _)| floor)
    }
}
