use crate::state::{FloorId, RoomId, UnitId};

/// Read-only view of the dungeon layout.
///
/// Lookups answer `None` when the provider has nothing for the reference;
/// callers fall back to configured defaults.
pub trait FloorOracle: Send + Sync {
    /// Memoria a unit needs to leave the floor.
    fn memoria_requirement(&self, floor: FloorId) -> Option<i32>;

    /// One-based depth of the floor.
    fn floor_number(&self, floor: FloorId) -> Option<u32>;

    /// Room the unit currently stands in.
    fn current_room(&self, unit: UnitId) -> Option<RoomId>;

    /// Floor the unit is currently on.
    fn current_floor(&self, unit: UnitId) -> Option<FloorId>;

    /// Requirement of the floor the unit is currently on.
    fn requirement_for(&self, unit: UnitId) -> Option<i32> {
        self.current_floor(unit)
            .and_then(|floor| self.memoria_requirement(floor))
    }
}
