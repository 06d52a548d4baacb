//! Core behavior trait.
//!
//! This module defines the [`Behavior`] trait, the unit of work executed by a
//! [`Chain`](crate::Chain). The trait is generic over a context type `C` so
//! steps can read and mutate whatever blackboard their owner provides.

use crate::Status;

/// A step that can be evaluated against a context.
pub trait Behavior<C>: Send + Sync {
    /// Evaluate this step against the given context.
    ///
    /// # Returns
    ///
    /// - `Status::Success` if the step finished and the chain may continue
    /// - `Status::Failure` if the step failed
    /// - `Status::Running` if the step is waiting on an external signal
    fn tick(&self, ctx: &mut C) -> Status;

    /// Whether a `Failure` or `Running` result from this step holds up the chain.
    ///
    /// Non-blocking steps never stop their chain, whatever they return.
    fn is_blocking(&self) -> bool {
        false
    }

    /// Whether this step should run at all. Skipped steps count as success.
    fn can_execute(&self, _ctx: &C) -> bool {
        true
    }

    /// Releases anything the step left behind once its chain is finished.
    fn cleanup(&self, _ctx: &mut C) {}
}

/// Blanket implementation for boxed behaviors.
///
/// This allows `Box<dyn Behavior<C>>` to also implement `Behavior<C>`,
/// enabling dynamic dispatch and heterogeneous collections of steps.
impl<C> Behavior<C> for Box<dyn Behavior<C>> {
    #[inline]
    fn tick(&self, ctx: &mut C) -> Status {
        (**self).tick(ctx)
    }

    #[inline]
    fn is_blocking(&self) -> bool {
        (**self).is_blocking()
    }

    #[inline]
    fn can_execute(&self, ctx: &C) -> bool {
        (**self).can_execute(ctx)
    }

    #[inline]
    fn cleanup(&self, ctx: &mut C) {
        (**self).cleanup(ctx)
    }
}
