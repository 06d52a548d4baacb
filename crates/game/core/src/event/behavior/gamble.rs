use behavior_tree::{Behavior, Status};
use tracing::{debug, error};

use crate::event::context::keys;
use crate::event::step::StepContext;

/// Bets the unit's life against a memoria reward.
///
/// A roll below `lethal_percent` takes all current health; otherwise the
/// unit gains `reward`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Gamble {
    pub lethal_percent: u32,
    pub reward: i32,
}

impl Default for Gamble {
    fn default() -> Self {
        Self {
            lethal_percent: 50,
            reward: 100,
        }
    }
}

impl Behavior<StepContext<'_>> for Gamble {
    fn tick(&self, ctx: &mut StepContext<'_>) -> Status {
        let roll = match ctx.roll_below(100) {
            Ok(roll) => roll,
            Err(err) => {
                error!(unit = %ctx.unit.id, error = %err, "cannot roll gamble");
                return Status::Failure;
            }
        };

        let lost = roll < self.lethal_percent;
        if lost {
            let health = ctx.unit.health().current();
            ctx.unit.take_damage(health);
            ctx.update_health_display();
        } else {
            ctx.unit.gain_memoria(self.reward);
            ctx.update_memoria_display(true);
            ctx.publish(keys::LAST_MEMORIA_ADDED, self.reward);
            ctx.publish_memoria();
        }

        debug!(unit = %ctx.unit.id, roll, lost, "gamble resolved");
        ctx.publish(keys::GAMBLE_LOST, lost);
        Status::from_bool(!lost)
    }
}
