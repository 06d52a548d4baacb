use std::cmp::Ordering;

use behavior_tree::{Behavior, ChainControl, Status};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::debug;

use crate::event::context::ContextValue;
use crate::event::step::{EventStep, StepContext};

/// Equality tolerance of numeric comparisons.
pub const NUMERIC_EPSILON: f64 = 1e-4;

/// Comparison operator.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Comparison {
    #[default]
    Equals,
    NotEquals,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
}

impl Comparison {
    /// Whether an ordering satisfies the operator.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Equals => ordering == Ordering::Equal,
            Comparison::NotEquals => ordering != Ordering::Equal,
            Comparison::GreaterThan => ordering == Ordering::Greater,
            Comparison::GreaterOrEqual => ordering != Ordering::Less,
            Comparison::LessThan => ordering == Ordering::Less,
            Comparison::LessOrEqual => ordering != Ordering::Greater,
        }
    }

    pub fn compare_ints(self, left: i64, right: i64) -> bool {
        self.holds(left.cmp(&right))
    }

    /// Numeric comparison. Only equality uses the [`NUMERIC_EPSILON`]
    /// tolerance; the ordering operators compare the raw numbers.
    pub fn compare_numbers(self, left: f64, right: f64) -> bool {
        match self {
            Comparison::Equals => (left - right).abs() < NUMERIC_EPSILON,
            Comparison::NotEquals => (left - right).abs() >= NUMERIC_EPSILON,
            _ => left
                .partial_cmp(&right)
                .is_some_and(|ordering| self.holds(ordering)),
        }
    }

    /// Compares two texts: numerically when both parse as numbers,
    /// ordinally otherwise.
    pub fn compare_text(self, left: &str, right: &str) -> bool {
        match (left.trim().parse::<f64>(), right.trim().parse::<f64>()) {
            (Ok(left), Ok(right)) => self.compare_numbers(left, right),
            _ => self.holds(left.cmp(right)),
        }
    }

    /// Compares two context values, treating [`ContextValue::Empty`] as null.
    ///
    /// Null equals null under `Equals`, `GreaterOrEqual` and `LessOrEqual`;
    /// null against a value only satisfies `NotEquals`.
    pub fn compare_values(self, left: &ContextValue, right: &ContextValue) -> bool {
        match (left.is_empty(), right.is_empty()) {
            (true, true) => matches!(
                self,
                Comparison::Equals | Comparison::GreaterOrEqual | Comparison::LessOrEqual
            ),
            (true, false) | (false, true) => self == Comparison::NotEquals,
            (false, false) => self.compare_text(&left.to_string(), &right.to_string()),
        }
    }
}

/// Success/failure sub-chains run after a condition is evaluated.
pub struct Branches {
    pub on_success: Vec<EventStep>,
    pub on_failure: Vec<EventStep>,
    /// A failed condition fails the step (and a blocking parent chain).
    pub stop_on_failure: bool,
    /// A failing blocking sub-step stops the rest of its branch. On by default.
    pub stop_on_sub_failure: bool,
}

impl Default for Branches {
    fn default() -> Self {
        Self {
            on_success: Vec::new(),
            on_failure: Vec::new(),
            stop_on_failure: false,
            stop_on_sub_failure: true,
        }
    }
}

impl Branches {
    pub fn new(on_success: Vec<EventStep>, on_failure: Vec<EventStep>) -> Self {
        Self {
            on_success,
            on_failure,
            ..Self::default()
        }
    }

    /// Runs the branch matching `passed` and folds it into one status.
    ///
    /// Sub-steps run within this call. A waiting blocking sub-step ends the
    /// branch there and the whole step reports `Running`; the sub-steps after
    /// it are not run.
    pub fn run(&self, passed: bool, ctx: &mut StepContext<'_>) -> Status {
        let (ok, waiting) = if passed {
            let (ok, waiting) = self.run_branch(&self.on_success, ctx);
            (self.on_success.is_empty() || ok, waiting)
        } else if self.on_failure.is_empty() {
            (!self.stop_on_failure, false)
        } else {
            let (ok, waiting) = self.run_branch(&self.on_failure, ctx);
            (!self.stop_on_failure || ok, waiting)
        };

        if waiting {
            Status::Running
        } else {
            Status::from_bool(ok)
        }
    }

    fn run_branch(&self, steps: &[EventStep], ctx: &mut StepContext<'_>) -> (bool, bool) {
        let mut ok = true;
        let mut waiting = false;

        for step in steps {
            if !step.can_execute(ctx) {
                continue;
            }
            match step.tick(ctx) {
                Status::Failure if step.is_blocking() => {
                    ok = false;
                    if self.stop_on_sub_failure {
                        break;
                    }
                }
                Status::Running if step.is_blocking() => {
                    waiting = true;
                    break;
                }
                _ => {}
            }
            if ctx.halt_requested() {
                break;
            }
        }
        (ok, waiting)
    }

    pub(crate) fn cleanup(&self, ctx: &mut StepContext<'_>) {
        for step in self.on_success.iter().chain(&self.on_failure) {
            step.cleanup(ctx);
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    /// Read from the context.
    Key(String),
    /// Literal text.
    Value(String),
}

/// Compares a context value against another value and branches.
pub struct Comparator {
    pub first_key: String,
    pub second: Operand,
    pub comparison: Comparison,
    pub branches: Branches,
    pub blocking: bool,
}

impl Comparator {
    pub fn new(first_key: impl Into<String>, comparison: Comparison, second: Operand) -> Self {
        Self {
            first_key: first_key.into(),
            second,
            comparison,
            branches: Branches::default(),
            blocking: false,
        }
    }

    pub fn with_branches(mut self, branches: Branches) -> Self {
        self.branches = branches;
        self
    }

    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    /// Evaluates the condition. Missing operands count as a failed condition.
    pub fn evaluate(&self, ctx: &StepContext<'_>) -> bool {
        let Some(first) = ctx.lookup(&self.first_key) else {
            debug!(key = %self.first_key, "comparator operand missing");
            return false;
        };
        let second = match &self.second {
            Operand::Key(key) => match ctx.lookup(key) {
                Some(value) => value.clone(),
                None => {
                    debug!(key = %key, "comparator operand missing");
                    return false;
                }
            },
            Operand::Value(text) => ContextValue::Text(text.clone()),
        };
        self.comparison.compare_values(first, &second)
    }
}

impl Behavior<StepContext<'_>> for Comparator {
    fn tick(&self, ctx: &mut StepContext<'_>) -> Status {
        let passed = self.evaluate(ctx);
        self.branches.run(passed, ctx)
    }

    fn is_blocking(&self) -> bool {
        self.blocking
    }

    fn cleanup(&self, ctx: &mut StepContext<'_>) {
        self.branches.cleanup(ctx);
    }
}
