use behavior_tree::{Behavior, Status};
use tracing::debug;

use crate::event::context::keys;
use crate::event::step::StepContext;

/// Trades memoria for levels, then for a full heal.
///
/// Levels are bought while current memoria covers the per-level cost at the
/// unit's level; whatever is left pays for a rest when it covers the rest cost.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RestSite {
    /// Overrides the configured cost per level of one level-up.
    pub level_up_cost: Option<i32>,
    /// Overrides the configured cost per level of one rest.
    pub rest_cost: Option<i32>,
}

impl Behavior<StepContext<'_>> for RestSite {
    fn tick(&self, ctx: &mut StepContext<'_>) -> Status {
        let level_up_cost = self
            .level_up_cost
            .unwrap_or(ctx.config.level_up_cost_per_level)
            .max(1);
        let rest_cost = self
            .rest_cost
            .unwrap_or(ctx.config.rest_cost_per_level)
            .max(1);
        let level_cost = |level: u32| level_up_cost.saturating_mul(level as i32);

        let mut gained: i32 = 0;
        while ctx.unit.memoria().current() >= level_cost(ctx.unit.level) {
            let cost = level_cost(ctx.unit.level);
            ctx.unit.level_up(ctx.config.level_up_health);
            ctx.unit.lose_memoria(cost);
            gained += 1;
        }

        let cost = rest_cost.saturating_mul(ctx.unit.level as i32);
        let rested = ctx.unit.memoria().current() >= cost;
        if rested {
            ctx.unit.restore_health();
            ctx.unit.lose_memoria(cost);
        }

        debug!(unit = %ctx.unit.id, gained, rested, level = ctx.unit.level, "rest site used");

        ctx.publish(keys::LEVELS_GAINED, gained);
        ctx.publish(keys::RESTED, rested);
        ctx.publish(keys::LEVEL, i64::from(ctx.unit.level));
        ctx.publish_memoria();
        ctx.update_health_display();
        ctx.update_memoria_display(false);
        Status::Success
    }
}
