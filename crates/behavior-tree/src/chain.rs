//! Resumable ordered step execution.
//!
//! A [`Chain`] runs its steps strictly in list order. Unlike a plain sequence
//! it can stop part-way through and pick up again later: the position and the
//! running success flag live in a [`ChainCursor`] owned by the caller, so one
//! immutable chain can drive any number of independent runs.

use crate::{Behavior, Status};

/// Lets the context stop a chain between two steps.
pub trait ChainControl {
    /// Returns `true` once a step has asked for the chain to stop early.
    fn halt_requested(&self) -> bool {
        false
    }
}

/// Resume point and accumulated result of one chain run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainCursor {
    next: usize,
    success: bool,
}

impl ChainCursor {
    /// A cursor positioned before the first step.
    pub const fn new() -> Self {
        Self {
            next: 0,
            success: true,
        }
    }

    /// Index of the next step to execute.
    pub const fn next(&self) -> usize {
        self.next
    }

    /// Whether every blocking step so far has succeeded.
    pub const fn success(&self) -> bool {
        self.success
    }

    /// Rewinds to the first step and clears the failure flag.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ChainCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// How a call to [`Chain::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainOutcome {
    /// Every step ran, or a blocking step failed.
    Completed { success: bool },

    /// A blocking step at `at` is waiting. Resuming continues at `at + 1`.
    Suspended { at: usize },

    /// The context requested a stop after the step at `at`.
    Halted { at: usize, success: bool },
}

impl ChainOutcome {
    /// Returns `true` unless the chain is waiting on a blocking step.
    pub fn is_finished(self) -> bool {
        !matches!(self, ChainOutcome::Suspended { .. })
    }
}

/// Ordered list of steps executed with blocking/non-blocking semantics.
///
/// # Semantics
///
/// For each step from the cursor position onwards:
/// - If `can_execute` is `false`, the step is skipped
/// - `Success` moves on to the next step
/// - `Failure` from a blocking step **ends the chain** with `success = false`;
///   from a non-blocking step it is ignored
/// - `Running` from a blocking step **suspends** the chain; from a
///   non-blocking step it is ignored
/// - After every executed step the context may halt the chain
pub struct Chain<B: ?Sized> {
    steps: Vec<Box<B>>,
}

impl<B: ?Sized> Chain<B> {
    /// Creates a chain from the given steps. An empty chain completes at once.
    pub fn new(steps: Vec<Box<B>>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Box<B>] {
        &self.steps
    }

    /// Runs steps from the cursor position until the chain completes,
    /// suspends, or is halted. The cursor is left at the resume point.
    pub fn run<C>(&self, ctx: &mut C, cursor: &mut ChainCursor) -> ChainOutcome
    where
        B: Behavior<C>,
        C: ChainControl,
    {
        while let Some(step) = self.steps.get(cursor.next) {
            let index = cursor.next;
            cursor.next += 1;

            if !step.can_execute(ctx) {
                continue;
            }

            let status = step.tick(ctx);

            if ctx.halt_requested() {
                return ChainOutcome::Halted {
                    at: index,
                    success: cursor.success,
                };
            }

            match status {
                Status::Failure if step.is_blocking() => {
                    cursor.success = false;
                    return ChainOutcome::Completed { success: false };
                }
                Status::Running if step.is_blocking() => {
                    return ChainOutcome::Suspended { at: index };
                }
                _ => {}
            }
        }

        ChainOutcome::Completed {
            success: cursor.success,
        }
    }

    /// Gives every step a chance to release what it left behind.
    pub fn cleanup<C>(&self, ctx: &mut C)
    where
        B: Behavior<C>,
    {
        for step in &self.steps {
            step.cleanup(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct TestContext {
        value: i32,
        halt: bool,
        cleaned: u32,
    }

    impl ChainControl for TestContext {
        fn halt_requested(&self) -> bool {
            self.halt
        }
    }

    struct Increment;
    impl Behavior<TestContext> for Increment {
        fn tick(&self, ctx: &mut TestContext) -> Status {
            ctx.value += 1;
            Status::Success
        }

        fn cleanup(&self, ctx: &mut TestContext) {
            ctx.cleaned += 1;
        }
    }

    struct Fail {
        blocking: bool,
    }
    impl Behavior<TestContext> for Fail {
        fn tick(&self, _ctx: &mut TestContext) -> Status {
            Status::Failure
        }

        fn is_blocking(&self) -> bool {
            self.blocking
        }
    }

    struct Wait {
        blocking: bool,
    }
    impl Behavior<TestContext> for Wait {
        fn tick(&self, _ctx: &mut TestContext) -> Status {
            Status::Running
        }

        fn is_blocking(&self) -> bool {
            self.blocking
        }
    }

    struct Halt;
    impl Behavior<TestContext> for Halt {
        fn tick(&self, ctx: &mut TestContext) -> Status {
            ctx.halt = true;
            Status::Success
        }
    }

    struct Never;
    impl Behavior<TestContext> for Never {
        fn tick(&self, ctx: &mut TestContext) -> Status {
            ctx.value += 100;
            Status::Success
        }

        fn can_execute(&self, _ctx: &TestContext) -> bool {
            false
        }
    }

    type Step = dyn Behavior<TestContext>;

    #[test]
    fn runs_all_steps_in_order() {
        let chain: Chain<Step> = Chain::new(vec![Box::new(Increment), Box::new(Increment)]);
        let mut ctx = TestContext::default();
        let mut cursor = ChainCursor::new();

        let outcome = chain.run(&mut ctx, &mut cursor);
        assert_eq!(outcome, ChainOutcome::Completed { success: true });
        assert_eq!(ctx.value, 2);
    }

    #[test]
    fn blocking_failure_aborts() {
        let chain: Chain<Step> = Chain::new(vec![
            Box::new(Increment),
            Box::new(Fail { blocking: true }),
            Box::new(Increment),
        ]);
        let mut ctx = TestContext::default();
        let mut cursor = ChainCursor::new();

        let outcome = chain.run(&mut ctx, &mut cursor);
        assert_eq!(outcome, ChainOutcome::Completed { success: false });
        assert_eq!(ctx.value, 1);
        assert!(!cursor.success());
    }

    #[test]
    fn non_blocking_results_never_stop_the_chain() {
        let chain: Chain<Step> = Chain::new(vec![
            Box::new(Fail { blocking: false }),
            Box::new(Wait { blocking: false }),
            Box::new(Increment),
        ]);
        let mut ctx = TestContext::default();
        let mut cursor = ChainCursor::new();

        let outcome = chain.run(&mut ctx, &mut cursor);
        assert_eq!(outcome, ChainOutcome::Completed { success: true });
        assert_eq!(ctx.value, 1);
    }

    #[test]
    fn suspends_and_resumes_after_the_waiting_step() {
        let chain: Chain<Step> = Chain::new(vec![
            Box::new(Increment),
            Box::new(Wait { blocking: true }),
            Box::new(Increment),
        ]);
        let mut ctx = TestContext::default();
        let mut cursor = ChainCursor::new();

        assert_eq!(
            chain.run(&mut ctx, &mut cursor),
            ChainOutcome::Suspended { at: 1 }
        );
        assert_eq!(cursor.next(), 2);
        assert_eq!(ctx.value, 1);

        assert_eq!(
            chain.run(&mut ctx, &mut cursor),
            ChainOutcome::Completed { success: true }
        );
        assert_eq!(ctx.value, 2);
    }

    #[test]
    fn halt_stops_after_current_step() {
        let chain: Chain<Step> = Chain::new(vec![Box::new(Halt), Box::new(Increment)]);
        let mut ctx = TestContext::default();
        let mut cursor = ChainCursor::new();

        let outcome = chain.run(&mut ctx, &mut cursor);
        assert_eq!(outcome, ChainOutcome::Halted { at: 0, success: true });
        assert_eq!(ctx.value, 0);
    }

    #[test]
    fn skipped_steps_do_not_run() {
        let chain: Chain<Step> = Chain::new(vec![Box::new(Never), Box::new(Increment)]);
        let mut ctx = TestContext::default();
        let mut cursor = ChainCursor::new();

        chain.run(&mut ctx, &mut cursor);
        assert_eq!(ctx.value, 1);
    }

    #[test]
    fn empty_chain_completes() {
        let chain: Chain<Step> = Chain::new(Vec::new());
        let mut ctx = TestContext::default();
        let mut cursor = ChainCursor::new();

        assert!(chain.is_empty());
        assert_eq!(
            chain.run(&mut ctx, &mut cursor),
            ChainOutcome::Completed { success: true }
        );
    }

    #[test]
    fn reset_restarts_from_the_top() {
        let chain: Chain<Step> = Chain::new(vec![
            Box::new(Fail { blocking: true }),
            Box::new(Increment),
        ]);
        let mut ctx = TestContext::default();
        let mut cursor = ChainCursor::new();

        chain.run(&mut ctx, &mut cursor);
        cursor.reset();
        assert_eq!(cursor, ChainCursor::new());
        assert!(cursor.success());
    }

    #[test]
    fn cleanup_visits_every_step() {
        let chain: Chain<Step> = Chain::new(vec![
            Box::new(Increment),
            Box::new(Fail { blocking: false }),
            Box::new(Increment),
        ]);
        let mut ctx = TestContext::default();

        chain.cleanup(&mut ctx);
        assert_eq!(ctx.cleaned, 2);
    }
}
