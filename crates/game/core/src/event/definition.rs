//! Data form of event templates.
//!
//! Content files describe events as [`EventDef`]s; [`EventDef::build`] turns
//! one into an [`EventTemplate`] with boxed steps.

use super::behavior::{
    Afflict, Branches, Choice, Comparator, Comparison, CompleteEvent, Gamble, LootChest,
    MemoriaChange, MemoriaCheck, MemoriaKind, MessageStep, Operand, ResolveEncounter, RestSite,
    StartEncounter, StateChange, TransformInto, TrapPrompt, TrapResolve,
};
use super::context::keys;
use super::step::EventStep;
use super::template::{EventCategory, EventTemplate};

/// One step of an event as written in content files.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepDef {
    Message(MessageStep),
    Compare(CompareDef),
    MemoriaCheck(MemoriaCheckDef),
    MemoriaChange(MemoriaChange),
    StateChange(StateChange),
    Choice(Choice),
    LootChest(LootChest),
    TrapPrompt(TrapPrompt),
    TrapResolve(TrapResolve),
    StartEncounter(StartEncounter),
    ResolveEncounter(ResolveEncounter),
    RestSite(RestSite),
    Gamble(Gamble),
    Afflict(Afflict),
    TransformInto(TransformInto),
    CompleteEvent(CompleteEvent),
}

impl StepDef {
    pub fn build(self) -> EventStep {
        match self {
            StepDef::Message(step) => Box::new(step),
            StepDef::Compare(def) => Box::new(def.build()),
            StepDef::MemoriaCheck(def) => Box::new(def.build()),
            StepDef::MemoriaChange(step) => Box::new(step),
            StepDef::StateChange(step) => Box::new(step),
            StepDef::Choice(step) => Box::new(step),
            StepDef::LootChest(step) => Box::new(step),
            StepDef::TrapPrompt(step) => Box::new(step),
            StepDef::TrapResolve(step) => Box::new(step),
            StepDef::StartEncounter(step) => Box::new(step),
            StepDef::ResolveEncounter(step) => Box::new(step),
            StepDef::RestSite(step) => Box::new(step),
            StepDef::Gamble(step) => Box::new(step),
            StepDef::Afflict(step) => Box::new(step),
            StepDef::TransformInto(step) => Box::new(step),
            StepDef::CompleteEvent(step) => Box::new(step),
        }
    }
}

fn build_all(steps: Vec<StepDef>) -> Vec<EventStep> {
    steps.into_iter().map(StepDef::build).collect()
}

/// Branch lists shared by the conditional steps.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BranchesDef {
    pub on_success: Vec<StepDef>,
    pub on_failure: Vec<StepDef>,
    pub stop_on_failure: bool,
    pub stop_on_sub_failure: bool,
}

impl Default for BranchesDef {
    fn default() -> Self {
        Self {
            on_success: Vec::new(),
            on_failure: Vec::new(),
            stop_on_failure: false,
            stop_on_sub_failure: true,
        }
    }
}

impl BranchesDef {
    pub fn build(self) -> Branches {
        Branches {
            on_success: build_all(self.on_success),
            on_failure: build_all(self.on_failure),
            stop_on_failure: self.stop_on_failure,
            stop_on_sub_failure: self.stop_on_sub_failure,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompareDef {
    pub key: String,
    pub comparison: Comparison,
    pub against: Operand,
    pub branches: BranchesDef,
    pub blocking: bool,
}

impl Default for CompareDef {
    fn default() -> Self {
        Self {
            key: String::new(),
            comparison: Comparison::Equals,
            against: Operand::Value("true".to_owned()),
            branches: BranchesDef::default(),
            blocking: false,
        }
    }
}

impl CompareDef {
    pub fn build(self) -> Comparator {
        Comparator::new(self.key, self.comparison, self.against)
            .with_branches(self.branches.build())
            .blocking(self.blocking)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MemoriaCheckDef {
    pub kind: MemoriaKind,
    pub comparison: Comparison,
    pub required: Option<i32>,
    pub passed_key: String,
    pub failed_key: String,
    pub branches: BranchesDef,
    pub blocking: bool,
}

impl Default for MemoriaCheckDef {
    fn default() -> Self {
        Self {
            kind: MemoriaKind::Total,
            comparison: Comparison::GreaterOrEqual,
            required: None,
            passed_key: keys::MEMORIA_CHECK_PASSED.to_owned(),
            failed_key: keys::MEMORIA_CHECK_FAILED.to_owned(),
            branches: BranchesDef::default(),
            blocking: false,
        }
    }
}

impl MemoriaCheckDef {
    pub fn build(self) -> MemoriaCheck {
        let mut check = MemoriaCheck::new(self.kind, self.comparison)
            .with_branches(self.branches.build())
            .blocking(self.blocking);
        check.required = self.required;
        check.passed_key = self.passed_key;
        check.failed_key = self.failed_key;
        check
    }
}

/// An event as written in content files.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventDef {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: EventCategory,
    #[cfg_attr(feature = "serde", serde(default))]
    pub steps: Vec<StepDef>,
}

impl EventDef {
    pub fn new(name: impl Into<String>, category: EventCategory, steps: Vec<StepDef>) -> Self {
        Self {
            name: name.into(),
            category,
            steps,
        }
    }

    pub fn build(self) -> EventTemplate {
        EventTemplate::new(self.name, self.category, build_all(self.steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::behavior::MessageLine;

    #[test]
    fn nested_branches_are_built() {
        let def = EventDef::new(
            "Check",
            EventCategory::Progression,
            vec![StepDef::MemoriaCheck(MemoriaCheckDef {
                branches: BranchesDef {
                    on_success: vec![StepDef::Message(MessageStep::new(vec![
                        MessageLine::new("ok"),
                    ]))],
                    on_failure: vec![StepDef::CompleteEvent(CompleteEvent { success: false })],
                    ..BranchesDef::default()
                },
                ..MemoriaCheckDef::default()
            })],
        );

        let template = def.build();
        assert_eq!(template.name(), "Check");
        assert_eq!(template.chain().len(), 1);
    }

    #[test]
    fn branch_defaults_stop_on_a_failed_sub_step() {
        let branches = BranchesDef::default().build();
        assert!(branches.stop_on_sub_failure);
        assert!(!branches.stop_on_failure);
    }
}
