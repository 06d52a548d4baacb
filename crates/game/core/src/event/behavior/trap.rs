use behavior_tree::{Behavior, Status};
use tracing::{debug, error, warn};

use crate::event::context::keys;
use crate::event::step::{Await, Directive, StepContext};

/// Live state of a numbered-panel trap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrapState {
    /// Trapped panel, rolled on the first visit.
    pub trap: Option<u32>,
    pub defused: Vec<u32>,
    /// Springs left before the trap is spent.
    pub remaining: u32,
}

impl TrapState {
    pub fn new(remaining: u32) -> Self {
        Self {
            trap: None,
            defused: Vec::new(),
            remaining,
        }
    }

    /// Panels not yet defused.
    pub fn open_panels(&self, numbers: u32) -> Vec<u32> {
        (0..numbers)
            .filter(|number| !self.defused.contains(number))
            .collect()
    }
}

/// Rounded `percent` of `max_health`, times `multiplier`.
pub fn trap_damage(max_health: i32, percent: i32, multiplier: i32) -> i32 {
    let scaled = i64::from(max_health) * i64::from(percent) * i64::from(multiplier);
    i32::try_from((scaled + 50) / 100).unwrap_or(i32::MAX)
}

/// Offers the open panels of a trap room.
///
/// With at most one panel left the trap springs on its own for a tenth of
/// the unit's max health and the event ends. A spent trap turns into the
/// fallback event.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrapPrompt {
    pub slot: String,
    pub numbers: u32,
    /// Springs before the trap is spent.
    pub charges: u32,
    pub damage_percent: i32,
    pub fallback: Option<String>,
}

impl Default for TrapPrompt {
    fn default() -> Self {
        Self {
            slot: "trap".to_owned(),
            numbers: 10,
            charges: 10,
            damage_percent: 10,
            fallback: None,
        }
    }
}

impl TrapPrompt {
    fn spring(&self, ctx: &mut StepContext<'_>) {
        let damage = trap_damage(ctx.unit.health().max(), self.damage_percent, 1);
        ctx.unit.take_damage(damage);
        ctx.update_health_display();
        ctx.publish(keys::TRAP_DAMAGE, damage);
        if let Some(state) = ctx.state.traps.get_mut(&self.slot) {
            state.remaining = state.remaining.saturating_sub(1);
        }
        debug!(unit = %ctx.unit.id, damage, "trap sprang on entry");
    }
}

impl Behavior<StepContext<'_>> for TrapPrompt {
    fn tick(&self, ctx: &mut StepContext<'_>) -> Status {
        let state = ctx
            .state
            .traps
            .entry(self.slot.clone())
            .or_insert_with(|| TrapState::new(self.charges))
            .clone();

        if state.remaining == 0 {
            let into = ctx.fallback_event(self.fallback.as_deref());
            debug!(unit = %ctx.unit.id, into = %into, "trap is spent");
            ctx.direct(Directive::Transform {
                into,
                restart: true,
            });
            return Status::Failure;
        }

        if state.trap.is_none() {
            let trap = match ctx.roll_below(self.numbers) {
                Ok(trap) => trap,
                Err(err) => {
                    error!(unit = %ctx.unit.id, error = %err, "cannot arm trap");
                    return Status::Failure;
                }
            };
            if let Some(state) = ctx.state.traps.get_mut(&self.slot) {
                state.trap = Some(trap);
            }
        }

        let open = state.open_panels(self.numbers);
        ctx.publish(keys::REMAINING_CHOICES, open.len() as i64);

        if open.len() <= 1 {
            self.spring(ctx);
            ctx.direct(Directive::Complete { success: true });
            return Status::Success;
        }

        let listing = open
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        ctx.display(&format!("Available panels: {listing}"), "white");
        ctx.await_signal(Await::Choice {
            options: open.iter().map(u32::to_string).collect(),
        });
        Status::Running
    }

    fn is_blocking(&self) -> bool {
        true
    }
}

/// Resolves the panel picked after a [`TrapPrompt`].
///
/// The trapped panel deals `damage_percent` of max health per open panel
/// and turns the room into the fallback event. Any other panel is defused.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrapResolve {
    pub slot: String,
    pub numbers: u32,
    pub damage_percent: i32,
    pub fallback: Option<String>,
}

impl Default for TrapResolve {
    fn default() -> Self {
        Self {
            slot: "trap".to_owned(),
            numbers: 10,
            damage_percent: 10,
            fallback: None,
        }
    }
}

impl Behavior<StepContext<'_>> for TrapResolve {
    fn tick(&self, ctx: &mut StepContext<'_>) -> Status {
        let picked = ctx.lookup_as(keys::PLAYER_CHOICE, String::new());
        let Ok(picked) = picked.trim().parse::<u32>() else {
            warn!(unit = %ctx.unit.id, picked = %picked, "trap pick is not a panel");
            return Status::Failure;
        };
        let Some(state) = ctx.state.traps.get_mut(&self.slot) else {
            warn!(unit = %ctx.unit.id, slot = %self.slot, "trap resolved before it was armed");
            return Status::Failure;
        };

        if state.trap == Some(picked) {
            let open = i32::try_from(state.open_panels(self.numbers).len()).unwrap_or(i32::MAX);
            state.remaining = state.remaining.saturating_sub(1);

            let damage = trap_damage(ctx.unit.health().max(), self.damage_percent, open);
            ctx.unit.take_damage(damage);
            ctx.update_health_display();
            ctx.publish(keys::TRAP_DAMAGE, damage);

            let into = ctx.fallback_event(self.fallback.as_deref());
            debug!(unit = %ctx.unit.id, picked, damage, into = %into, "trap triggered");
            ctx.direct(Directive::Transform {
                into,
                restart: false,
            });
            return Status::Success;
        }

        if !state.defused.contains(&picked) {
            state.defused.push(picked);
        }
        let open = state.open_panels(self.numbers).len();
        ctx.publish(keys::TRAP_DAMAGE, 0_i32);
        ctx.publish(keys::REMAINING_CHOICES, open as i64);
        debug!(unit = %ctx.unit.id, picked, open, "panel defused");
        Status::Success
    }

    fn is_blocking(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_rounds_to_nearest() {
        assert_eq!(trap_damage(100, 10, 1), 10);
        assert_eq!(trap_damage(45, 10, 1), 5);
        assert_eq!(trap_damage(44, 10, 1), 4);
        assert_eq!(trap_damage(100, 10, 7), 70);
    }

    #[test]
    fn open_panels_skip_defused() {
        let mut state = TrapState::new(1);
        state.defused = vec![0, 3, 9];
        assert_eq!(state.open_panels(10), vec![1, 2, 4, 5, 6, 7, 8]);
    }
}
