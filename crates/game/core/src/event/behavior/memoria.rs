use behavior_tree::{Behavior, Status};
use strum::{AsRefStr, Display, EnumString};
use tracing::{debug, warn};

use super::compare::{Branches, Comparison};
use crate::event::context::keys;
use crate::event::step::StepContext;

/// Which memoria figure a step reads or writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemoriaKind {
    #[default]
    Current,
    Total,
}

/// Compares the unit's memoria against the floor requirement.
///
/// The requirement comes from the explicit override, then the floor oracle,
/// then the event context, then the configured fallback. The result, its
/// complement and the requirement are published for later steps.
pub struct MemoriaCheck {
    pub kind: MemoriaKind,
    pub comparison: Comparison,
    pub required: Option<i32>,
    pub passed_key: String,
    pub failed_key: String,
    pub branches: Branches,
    pub blocking: bool,
}

impl MemoriaCheck {
    pub fn new(kind: MemoriaKind, comparison: Comparison) -> Self {
        Self {
            kind,
            comparison,
            required: None,
            passed_key: keys::MEMORIA_CHECK_PASSED.to_owned(),
            failed_key: keys::MEMORIA_CHECK_FAILED.to_owned(),
            branches: Branches::default(),
            blocking: false,
        }
    }

    pub fn requiring(mut self, required: i32) -> Self {
        self.required = Some(required);
        self
    }

    pub fn with_branches(mut self, branches: Branches) -> Self {
        self.branches = branches;
        self
    }

    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    fn requirement(&self, ctx: &StepContext<'_>) -> i32 {
        if let Some(required) = self.required {
            return required;
        }
        if let Some(required) = ctx
            .env
            .floors()
            .ok()
            .and_then(|floors| floors.requirement_for(ctx.unit.id))
        {
            return required;
        }
        if let Some(required) = ctx.context.memoria_required() {
            return required;
        }
        let fallback = ctx.config.fallback_memoria_requirement;
        warn!(unit = %ctx.unit.id, fallback, "no floor memoria requirement, using fallback");
        fallback
    }

    fn value(&self, ctx: &StepContext<'_>) -> i32 {
        let memoria = ctx.unit.memoria();
        match self.kind {
            MemoriaKind::Current => memoria.current(),
            MemoriaKind::Total => memoria.total(),
        }
    }
}

impl Behavior<StepContext<'_>> for MemoriaCheck {
    fn tick(&self, ctx: &mut StepContext<'_>) -> Status {
        let required = self.requirement(ctx);
        let value = self.value(ctx);
        let passed = self
            .comparison
            .compare_ints(i64::from(value), i64::from(required));

        debug!(
            unit = %ctx.unit.id,
            kind = %self.kind,
            value,
            required,
            passed,
            "memoria check"
        );

        ctx.publish(&self.passed_key, passed);
        ctx.publish(&self.failed_key, !passed);
        ctx.publish(keys::REQUIRED_MEMORIA, required);

        self.branches.run(passed, ctx)
    }

    fn is_blocking(&self) -> bool {
        self.blocking
    }

    fn cleanup(&self, ctx: &mut StepContext<'_>) {
        self.branches.cleanup(ctx);
    }
}

/// Arithmetic applied by [`MemoriaChange`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemoriaOperation {
    #[default]
    Add,
    Subtract,
    Set,
}

/// Memoria figures touched by [`MemoriaChange`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemoriaTarget {
    #[default]
    Current,
    Total,
    Both,
}

impl MemoriaTarget {
    fn current(self) -> bool {
        matches!(self, MemoriaTarget::Current | MemoriaTarget::Both)
    }

    fn total(self) -> bool {
        matches!(self, MemoriaTarget::Total | MemoriaTarget::Both)
    }
}

/// Adds, subtracts or sets memoria, optionally gated by a boolean context key.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MemoriaChange {
    pub operation: MemoriaOperation,
    pub target: MemoriaTarget,
    pub amount: i32,
    /// Boolean key that must be true for the change to run.
    pub condition: Option<String>,
    /// Runs when the condition key is false instead.
    pub invert: bool,
}

impl MemoriaChange {
    pub const DEFAULT_AMOUNT: i32 = 10;

    pub fn new(operation: MemoriaOperation, target: MemoriaTarget, amount: i32) -> Self {
        Self {
            operation,
            target,
            amount,
            condition: None,
            invert: false,
        }
    }

    pub fn when(mut self, key: impl Into<String>) -> Self {
        self.condition = Some(key.into());
        self
    }

    pub fn unless(mut self, key: impl Into<String>) -> Self {
        self.condition = Some(key.into());
        self.invert = true;
        self
    }
}

impl Default for MemoriaChange {
    fn default() -> Self {
        Self::new(
            MemoriaOperation::Add,
            MemoriaTarget::Current,
            Self::DEFAULT_AMOUNT,
        )
    }
}

impl Behavior<StepContext<'_>> for MemoriaChange {
    fn tick(&self, ctx: &mut StepContext<'_>) -> Status {
        let amount = self.amount.max(0);
        match self.operation {
            MemoriaOperation::Add => {
                if self.target.current() {
                    ctx.unit.add_current_memoria(amount);
                }
                if self.target.total() {
                    ctx.unit.add_total_memoria(amount);
                }
                ctx.publish(keys::LAST_MEMORIA_ADDED, amount);
            }
            MemoriaOperation::Subtract => {
                let mut removed = 0;
                if self.target.current() {
                    removed = ctx.unit.lose_memoria(amount);
                }
                if self.target.total() {
                    removed = removed.max(ctx.unit.subtract_total_memoria(amount));
                }
                ctx.publish(keys::LAST_MEMORIA_SUBTRACTED, removed);
            }
            MemoriaOperation::Set => {
                if self.target.current() {
                    ctx.unit.set_current_memoria(amount);
                }
                if self.target.total() {
                    ctx.unit.set_total_memoria(amount);
                }
            }
        }

        debug!(
            unit = %ctx.unit.id,
            operation = %self.operation,
            target = %self.target,
            amount,
            "memoria changed"
        );

        ctx.update_memoria_display(self.operation != MemoriaOperation::Subtract);
        ctx.publish_memoria();
        Status::Success
    }

    fn can_execute(&self, ctx: &StepContext<'_>) -> bool {
        match &self.condition {
            Some(key) => ctx.lookup_as(key, false) != self.invert,
            None => true,
        }
    }
}
